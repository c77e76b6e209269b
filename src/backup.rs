//! Timestamped backups of game files.
//!
//! Before a localization file in the game directory is overwritten, a copy is
//! dropped into the backup directory as `{stem}_{YYYYMMDD_HHMMSS}{suffix}`.
//! Only the newest [`MAX_BACKUPS_PER_FILE`] copies of each file are kept.

use crate::error::{LocError, Result};
use chrono::{Local, NaiveDateTime};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// Number of backups retained per source file stem
pub const MAX_BACKUPS_PER_FILE: usize = 5;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A backup created by [`BackupManager::create_backup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub source_stem: String,
    pub timestamp: NaiveDateTime,
    pub path: PathBuf,
}

/// Creates, prunes, lists and restores backups in one directory.
#[derive(Debug, Clone)]
pub struct BackupManager {
    backup_dir: PathBuf,
}

impl BackupManager {
    /// Open (and create if needed) a backup directory.
    pub fn new(backup_dir: impl Into<PathBuf>) -> Result<Self> {
        let backup_dir = backup_dir.into();
        fs::create_dir_all(&backup_dir).map_err(|e| LocError::io(&backup_dir, e))?;
        Ok(Self { backup_dir })
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Back up `file_path` using the current local time.
    ///
    /// Returns `Ok(None)` when there is nothing to back up.
    pub fn create_backup(&self, file_path: &Path) -> Result<Option<Backup>> {
        self.create_backup_at(file_path, Local::now().naive_local())
    }

    /// Back up `file_path` stamped with `timestamp`.
    pub fn create_backup_at(
        &self,
        file_path: &Path,
        timestamp: NaiveDateTime,
    ) -> Result<Option<Backup>> {
        if !file_path.exists() {
            debug!("Nothing to back up at {}", file_path.display());
            return Ok(None);
        }

        let stem = file_stem(file_path);
        let suffix = file_path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let stamp = timestamp.format(TIMESTAMP_FORMAT).to_string();

        // Continue after the highest counter already used in this second, so a
        // pruned name is never handed out again
        let mut counter = self
            .ranked_backups(&stem)?
            .into_iter()
            .filter(|((taken_at, _), _)| taken_at.format(TIMESTAMP_FORMAT).to_string() == stamp)
            .map(|((_, n), _)| n)
            .max()
            .unwrap_or(0);
        let mut backup_path;
        loop {
            counter += 1;
            backup_path = if counter == 1 {
                self.backup_dir.join(format!("{}_{}{}", stem, stamp, suffix))
            } else {
                self.backup_dir
                    .join(format!("{}_{}_{}{}", stem, stamp, counter, suffix))
            };
            if !backup_path.exists() {
                break;
            }
        }

        copy_preserving_mtime(file_path, &backup_path)?;
        info!("Backup saved: {}", backup_path.display());

        self.prune(&stem, MAX_BACKUPS_PER_FILE, &backup_path)?;

        Ok(Some(Backup {
            source_stem: stem,
            timestamp,
            path: backup_path,
        }))
    }

    /// All backups in the directory, most recent first.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        let read_dir = fs::read_dir(&self.backup_dir).map_err(|e| LocError::io(&self.backup_dir, e))?;
        for entry in read_dir {
            let entry = entry.map_err(|e| LocError::io(&self.backup_dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .map_err(|e| LocError::io(&path, e))?;
            entries.push((modified, path));
        }

        // Newest first; names carry the timestamp, so they break mtime ties
        entries.sort_by(|a, b| b.cmp(a));
        Ok(entries.into_iter().map(|(_, path)| path).collect())
    }

    /// Backups of files named `{stem}.*`, most recent first.
    ///
    /// Ranked by the timestamp and counter in the file name, not by mtime:
    /// copies keep the source's mtime, which says nothing about when the
    /// backup was taken.
    pub fn backups_for(&self, stem: &str) -> Result<Vec<PathBuf>> {
        Ok(self
            .ranked_backups(stem)?
            .into_iter()
            .map(|(_, path)| path)
            .collect())
    }

    fn ranked_backups(&self, stem: &str) -> Result<Vec<((NaiveDateTime, u32), PathBuf)>> {
        let prefix = format!("{}_", stem);
        let mut ranked: Vec<((NaiveDateTime, u32), PathBuf)> = self
            .list_backups()?
            .into_iter()
            .filter_map(|path| {
                let rank = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| name.strip_prefix(&prefix))
                    .and_then(backup_rank)?;
                Some((rank, path))
            })
            .collect();

        ranked.sort_by(|a, b| b.cmp(a));
        Ok(ranked)
    }

    /// Copy `backup_path` over `target_path`. The current target is not
    /// backed up first.
    pub fn restore(&self, backup_path: &Path, target_path: &Path) -> Result<()> {
        if !backup_path.exists() {
            return Err(LocError::NotFound {
                path: backup_path.to_path_buf(),
            });
        }

        if let Some(parent) = target_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| LocError::io(parent, e))?;
        }
        copy_preserving_mtime(backup_path, target_path)?;
        info!(
            "Restored {} from {}",
            target_path.display(),
            backup_path.display()
        );
        Ok(())
    }

    /// Delete all but the newest `keep` backups of `stem`. The backup just
    /// written is always one of the survivors.
    fn prune(&self, stem: &str, keep: usize, current: &Path) -> Result<()> {
        let older = self
            .backups_for(stem)?
            .into_iter()
            .filter(|path| path != current);
        for old in older.skip(keep.saturating_sub(1)) {
            fs::remove_file(&old).map_err(|e| LocError::io(&old, e))?;
            debug!("Pruned old backup {}", old.display());
        }
        Ok(())
    }
}

/// Parse `YYYYMMDD_HHMMSS[_n].ext` (the part after `{stem}_`) into a
/// sortable key. Names without a counter rank as counter 1.
fn backup_rank(rest: &str) -> Option<(NaiveDateTime, u32)> {
    let stamp = rest.get(..15)?;
    let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;

    let tail = &rest[15..];
    let counter = match tail.strip_prefix('_') {
        Some(after) => {
            let digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()?
        }
        None => 1,
    };
    Some((timestamp, counter))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Copy a file and carry its modification time over to the copy.
///
/// Refuses to copy a file onto itself, which would truncate it.
pub(crate) fn copy_preserving_mtime(from: &Path, to: &Path) -> Result<()> {
    if is_same_file(from, to) {
        return Err(LocError::SameFile {
            path: to.to_path_buf(),
        });
    }
    fs::copy(from, to).map_err(|e| LocError::io(from, e))?;

    let modified: SystemTime = fs::metadata(from)
        .and_then(|m| m.modified())
        .map_err(|e| LocError::io(from, e))?;
    File::options()
        .write(true)
        .open(to)
        .and_then(|f| f.set_modified(modified))
        .map_err(|e| LocError::io(to, e))?;
    Ok(())
}

pub(crate) fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(hour, min, sec)
            .unwrap()
    }

    fn setup() -> (TempDir, BackupManager, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = BackupManager::new(temp_dir.path().join("backups")).expect("manager");
        let source = temp_dir.path().join("global.ini");
        fs::write(&source, "ui_ok=OK\r\n").unwrap();
        (temp_dir, manager, source)
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_new_creates_directory_idempotently() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("a/b/backups");
        BackupManager::new(&dir).expect("first");
        BackupManager::new(&dir).expect("second");
        assert!(dir.is_dir());
    }

    #[test]
    fn test_create_backup_missing_file_is_none() {
        let (temp_dir, manager, _) = setup();
        let result = manager
            .create_backup(&temp_dir.path().join("absent.ini"))
            .expect("no error");
        assert!(result.is_none());
        assert!(manager.list_backups().unwrap().is_empty());
    }

    #[test]
    fn test_create_backup_names_and_copies() {
        let (_temp_dir, manager, source) = setup();
        let backup = manager
            .create_backup_at(&source, at(9, 5, 7))
            .expect("backup")
            .expect("file exists");

        assert_eq!(backup.source_stem, "global");
        assert_eq!(
            backup.path.file_name().unwrap().to_string_lossy(),
            "global_20240315_090507.ini"
        );
        assert_eq!(fs::read_to_string(&backup.path).unwrap(), "ui_ok=OK\r\n");
    }

    #[test]
    fn test_create_backup_preserves_mtime() {
        let (_temp_dir, manager, source) = setup();
        let backup = manager.create_backup(&source).unwrap().unwrap();

        let src_mtime = fs::metadata(&source).unwrap().modified().unwrap();
        let dst_mtime = fs::metadata(&backup.path).unwrap().modified().unwrap();
        assert_eq!(src_mtime, dst_mtime);
    }

    #[test]
    fn test_same_second_backups_do_not_collide() {
        let (_temp_dir, manager, source) = setup();
        let first = manager.create_backup_at(&source, at(1, 0, 0)).unwrap().unwrap();
        let second = manager.create_backup_at(&source, at(1, 0, 0)).unwrap().unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(manager.list_backups().unwrap().len(), 2);
    }

    #[test]
    fn test_pruning_keeps_five_most_recent() {
        let (_temp_dir, manager, source) = setup();
        for minute in 0..8 {
            manager
                .create_backup_at(&source, at(10, minute, 0))
                .unwrap()
                .unwrap();
        }

        let remaining = manager.backups_for("global").unwrap();
        assert_eq!(
            names(&remaining),
            vec![
                "global_20240315_100700.ini",
                "global_20240315_100600.ini",
                "global_20240315_100500.ini",
                "global_20240315_100400.ini",
                "global_20240315_100300.ini",
            ]
        );
    }

    #[test]
    fn test_pruning_is_per_stem() {
        let (temp_dir, manager, source) = setup();
        let other = temp_dir.path().join("other.ini");
        fs::write(&other, "x=1\r\n").unwrap();

        manager.create_backup_at(&other, at(8, 0, 0)).unwrap();
        for minute in 0..7 {
            manager.create_backup_at(&source, at(9, minute, 0)).unwrap();
        }

        assert_eq!(manager.backups_for("global").unwrap().len(), 5);
        assert_eq!(manager.backups_for("other").unwrap().len(), 1);
        assert_eq!(manager.list_backups().unwrap().len(), 6);
    }

    #[test]
    fn test_backups_for_does_not_match_longer_stems() {
        let (temp_dir, manager, source) = setup();
        let longer = temp_dir.path().join("global_extra.ini");
        fs::write(&longer, "x=1\r\n").unwrap();

        manager.create_backup_at(&source, at(9, 0, 0)).unwrap();
        manager.create_backup_at(&longer, at(9, 0, 0)).unwrap();

        assert_eq!(manager.backups_for("global").unwrap().len(), 1);
    }

    #[test]
    fn test_restore_overwrites_target() {
        let (temp_dir, manager, source) = setup();
        let backup = manager.create_backup(&source).unwrap().unwrap();

        let target = temp_dir.path().join("live/global.ini");
        manager.restore(&backup.path, &target).expect("restore");
        assert_eq!(fs::read_to_string(&target).unwrap(), "ui_ok=OK\r\n");

        fs::write(&target, "changed=yes\r\n").unwrap();
        manager.restore(&backup.path, &target).expect("restore again");
        assert_eq!(fs::read_to_string(&target).unwrap(), "ui_ok=OK\r\n");
    }

    #[test]
    fn test_restore_missing_backup_is_not_found() {
        let (temp_dir, manager, source) = setup();
        let result = manager.restore(&temp_dir.path().join("gone.ini"), &source);
        assert!(matches!(result, Err(LocError::NotFound { .. })));
        assert_eq!(fs::read_to_string(&source).unwrap(), "ui_ok=OK\r\n");
    }

    #[test]
    fn test_backup_of_old_file_survives_pruning() {
        let (_temp_dir, manager, source) = setup();
        for minute in 0..5 {
            manager.create_backup_at(&source, at(10, minute, 0)).unwrap();
        }

        // A launcher-installed file can carry a build mtime far in the past
        let hour_ago = SystemTime::now() - std::time::Duration::from_secs(3600);
        File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(hour_ago)
            .unwrap();

        let backup = manager
            .create_backup_at(&source, at(11, 0, 0))
            .unwrap()
            .unwrap();

        assert!(backup.path.exists());
        let remaining = manager.backups_for("global").unwrap();
        assert_eq!(remaining.len(), 5);
        assert_eq!(remaining[0], backup.path);
        assert!(!names(&remaining).contains(&"global_20240315_100000.ini".to_string()));
    }

    #[test]
    fn test_same_second_counter_ranks_numerically() {
        let (_temp_dir, manager, source) = setup();
        let created: Vec<PathBuf> = (0..12)
            .map(|_| manager.create_backup_at(&source, at(2, 0, 0)).unwrap().unwrap().path)
            .collect();

        // Pruned names are never reused within the same second
        let distinct: std::collections::HashSet<&PathBuf> = created.iter().collect();
        assert_eq!(distinct.len(), created.len());

        let remaining = manager.backups_for("global").unwrap();
        let newest: Vec<PathBuf> = created.iter().rev().take(5).cloned().collect();
        assert_eq!(remaining, newest);
        assert_eq!(
            remaining[0].file_name().unwrap().to_string_lossy(),
            "global_20240315_020000_12.ini"
        );
    }

    #[test]
    fn test_backup_rank_parses_name() {
        assert_eq!(backup_rank("20240315_100000.ini"), Some((at(10, 0, 0), 1)));
        assert_eq!(backup_rank("20240315_100000_10.ini"), Some((at(10, 0, 0), 10)));
        assert_eq!(backup_rank("extra_20240315_100000.ini"), None);
    }

    #[test]
    fn test_restore_onto_itself_is_refused() {
        let (_temp_dir, manager, source) = setup();
        let result = manager.restore(&source, &source);

        assert!(matches!(result, Err(LocError::SameFile { .. })));
        assert_eq!(fs::read_to_string(&source).unwrap(), "ui_ok=OK\r\n");
    }
}
