use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by the localization pipeline.
///
/// Validation findings are never reported through this type; they are
/// returned as [`crate::validation::Diagnostic`] values instead.
#[derive(Debug, Error)]
pub enum LocError {
    /// The source file is not valid UTF-8 (with or without a BOM).
    #[error("{} is not UTF-8 encoded at line {line}", path.display())]
    Decoding { path: PathBuf, line: usize },

    #[error("Backup not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Source and destination of a copy resolve to the same file.
    #[error("Refusing to copy {} onto itself", path.display())]
    SameFile { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid project file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LocError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        LocError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LocError>;
