//! JSON-backed translation projects.

use crate::error::{LocError, Result};
use crate::translation::TranslationRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectMetadata {
    pub name: String,
    pub author: String,
    pub version: String,
    pub game_version: String,
    pub description: String,
}

impl Default for ProjectMetadata {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
            author: String::new(),
            version: "1.0.0".to_string(),
            game_version: String::new(),
            description: String::new(),
        }
    }
}

/// On-disk shape of a project file
#[derive(Debug, Default, Serialize, Deserialize)]
struct ProjectDocument {
    #[serde(default)]
    metadata: Option<ProjectMetadata>,
    #[serde(default)]
    translations: Vec<TranslationRecord>,
}

/// Summary counts for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStatistics {
    pub total: usize,
    pub categories: BTreeMap<String, usize>,
}

/// A named collection of translation records, unique by key.
#[derive(Debug, Clone)]
pub struct TranslationProject {
    path: PathBuf,
    pub metadata: ProjectMetadata,
    translations: Vec<TranslationRecord>,
}

impl TranslationProject {
    /// An empty project that will be saved to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            metadata: ProjectMetadata::default(),
            translations: Vec::new(),
        }
    }

    /// Open the project at `path`. A missing file yields an empty project.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut project = Self::new(path);
        project.load()?;
        Ok(project)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn translations(&self) -> &[TranslationRecord] {
        &self.translations
    }

    /// Reload from disk. Does nothing if the file does not exist.
    pub fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            debug!("No project file at {}", self.path.display());
            return Ok(());
        }

        let text = fs::read_to_string(&self.path).map_err(|e| LocError::io(&self.path, e))?;
        let doc: ProjectDocument = serde_json::from_str(&text).map_err(|e| LocError::Json {
            path: self.path.clone(),
            source: e,
        })?;

        if let Some(metadata) = doc.metadata {
            self.metadata = metadata;
        }
        self.translations = doc.translations;
        info!(
            "Loaded project '{}' with {} translations",
            self.metadata.name,
            self.translations.len()
        );
        Ok(())
    }

    /// Write the project as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        let doc = ProjectDocument {
            metadata: Some(self.metadata.clone()),
            translations: self.translations.clone(),
        };
        let json = serde_json::to_string_pretty(&doc).map_err(|e| LocError::Json {
            path: self.path.clone(),
            source: e,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| LocError::io(parent, e))?;
        }
        fs::write(&self.path, json).map_err(|e| LocError::io(&self.path, e))?;
        debug!("Saved project to {}", self.path.display());
        Ok(())
    }

    /// Add a record, replacing any existing record with the same key.
    pub fn add_translation(&mut self, record: TranslationRecord) {
        self.translations.retain(|t| t.key != record.key);
        self.translations.push(record);
    }

    pub fn statistics(&self) -> ProjectStatistics {
        let mut categories = BTreeMap::new();
        for record in &self.translations {
            *categories.entry(record.category.clone()).or_insert(0) += 1;
        }

        ProjectStatistics {
            total: self.translations.len(),
            categories,
        }
    }
}
