use serde::Serialize;
use std::fmt;

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(label)
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Localization key the finding refers to, if any
    pub key: Option<String>,
}

impl Diagnostic {
    pub fn error(key: &str, message: impl Into<String>) -> Self {
        Self::keyed(Severity::Error, key, message)
    }

    pub fn warning(key: &str, message: impl Into<String>) -> Self {
        Self::keyed(Severity::Warning, key, message)
    }

    pub fn info(key: &str, message: impl Into<String>) -> Self {
        Self::keyed(Severity::Info, key, message)
    }

    fn keyed(severity: Severity, key: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Per-severity tally of a diagnostic list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn tally(diagnostics: &[Diagnostic]) -> Self {
        diagnostics
            .iter()
            .fold(Self::default(), |mut counts, d| {
                match d.severity {
                    Severity::Error => counts.errors += 1,
                    Severity::Warning => counts.warnings += 1,
                    Severity::Info => counts.info += 1,
                }
                counts
            })
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.info
    }
}
