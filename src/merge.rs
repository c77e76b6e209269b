//! Merging translation records into a localization file.
//!
//! A merge is a single pass: parse the source file, validate every record
//! against the source text, overwrite the values of keys that exist, and
//! write the result. Validation is advisory; error diagnostics are reported
//! but never stop the merge. Keys missing from the source are collected and
//! reported, not treated as failures.

use crate::backup::{copy_preserving_mtime, is_same_file, Backup, BackupManager};
use crate::error::{LocError, Result};
use crate::game;
use crate::kv_store::KeyValueStore;
use crate::translation::TranslationRecord;
use crate::validation::{Diagnostic, SeverityCounts, TranslationValidator};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Result of applying records to a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub applied: usize,
    /// Record keys absent from the store, in input order
    pub not_found: Vec<String>,
}

/// Everything a merge produced.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub merged: KeyValueStore,
    pub diagnostics: Vec<Diagnostic>,
    pub applied: usize,
    pub not_found: Vec<String>,
}

impl MergeOutcome {
    pub fn counts(&self) -> SeverityCounts {
        SeverityCounts::tally(&self.diagnostics)
    }

    pub fn has_errors(&self) -> bool {
        self.counts().has_errors()
    }
}

/// Where [`TranslationMerger::apply_to_game`] wrote, and what it saved first.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub target: PathBuf,
    pub backup: Option<Backup>,
}

/// Validate every record against its source text, in input order.
///
/// Records whose key is not in `source` are validated against an empty
/// original.
pub fn validate_all(source: &KeyValueStore, translations: &[TranslationRecord]) -> Vec<Diagnostic> {
    translations
        .iter()
        .flat_map(|record| {
            let original = source.get(&record.key).unwrap_or("");
            TranslationValidator::validate(record, original)
        })
        .collect()
}

/// Overwrite existing keys in `store` with translated text.
pub fn apply_translations(
    store: &mut KeyValueStore,
    translations: &[TranslationRecord],
) -> ApplySummary {
    let mut summary = ApplySummary::default();
    for record in translations {
        if store.set_existing(&record.key, &record.translated) {
            summary.applied += 1;
        } else {
            summary.not_found.push(record.key.clone());
        }
    }
    summary
}

/// Merge-and-apply pipeline bound to one game install.
#[derive(Debug, Clone)]
pub struct TranslationMerger {
    game_path: PathBuf,
    backups: BackupManager,
}

impl TranslationMerger {
    pub fn new(game_path: impl Into<PathBuf>, backups: BackupManager) -> Self {
        Self {
            game_path: game_path.into(),
            backups,
        }
    }

    pub fn game_path(&self) -> &Path {
        &self.game_path
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Merge `translations` into `source_file` and write the result to
    /// `output_file`.
    pub fn merge(
        &self,
        source_file: &Path,
        translations: &[TranslationRecord],
        output_file: &Path,
        validate: bool,
    ) -> Result<MergeOutcome> {
        info!("Reading source file: {}", source_file.display());
        let source = KeyValueStore::parse(source_file)?;
        info!("Found {} keys", source.len());

        let diagnostics = if validate {
            info!("Validating {} translations", translations.len());
            validate_all(&source, translations)
        } else {
            Vec::new()
        };

        let mut merged = source;
        let summary = apply_translations(&mut merged, translations);
        info!("Applied {} translations", summary.applied);
        if !summary.not_found.is_empty() {
            warn!("{} keys not found in source", summary.not_found.len());
        }

        info!("Writing merged file: {}", output_file.display());
        merged.write(output_file)?;

        Ok(MergeOutcome {
            merged,
            diagnostics,
            applied: summary.applied,
            not_found: summary.not_found,
        })
    }

    /// Path of `game_file_name` inside the live localization directory.
    pub fn game_target(&self, game_file_name: &str) -> PathBuf {
        game::localization_dir(&self.game_path).join(game_file_name)
    }

    /// Copy `merged_file` over the game's localization file, backing up the
    /// current one first.
    pub fn apply_to_game(&self, merged_file: &Path, game_file_name: &str) -> Result<ApplyOutcome> {
        let target = self.game_target(game_file_name);
        if is_same_file(merged_file, &target) {
            return Err(LocError::SameFile { path: target });
        }

        info!("Creating backup of {}", target.display());
        let backup = self.backups.create_backup(&target)?;

        if let Some(loc_dir) = target.parent() {
            fs::create_dir_all(loc_dir).map_err(|e| LocError::io(loc_dir, e))?;
        }

        info!("Copying {} to game directory", merged_file.display());
        copy_preserving_mtime(merged_file, &target)?;
        info!("Applied to: {}", target.display());

        Ok(ApplyOutcome { target, backup })
    }
}
