use serde::{Deserialize, Serialize};

fn default_category() -> String {
    "general".to_string()
}

/// A proposed replacement for one localization key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub key: String,
    pub original: String,
    pub translated: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub comment: String,
}

impl TranslationRecord {
    /// Create a record in the default category with no comment.
    pub fn new(
        key: impl Into<String>,
        original: impl Into<String>,
        translated: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            original: original.into(),
            translated: translated.into(),
            category: default_category(),
            comment: String::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}
