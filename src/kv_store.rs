//! Flat `key=value` localization files.
//!
//! The game reads `global.ini` as one `key=value` pair per line. On load we
//! accept an optional UTF-8 BOM, split lines on `\r\n`, `\n` or a lone `\r`,
//! skip blank lines and `#`/`;` comments, and
//! keep keys in first-seen order. On write we emit UTF-8 without a BOM and
//! CRLF line endings, which is what the client expects. Comments and blank
//! lines are not preserved.

use crate::error::{self, LocError};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Ordered key/value mapping backing a localization file.
#[derive(Debug, Clone, Default)]
pub struct KeyValueStore {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a value. New keys go to the end; existing keys
    /// keep their position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Overwrite the value of an existing key. Returns `false` and leaves the
    /// store untouched when the key is absent.
    pub fn set_existing(&mut self, key: &str, value: &str) -> bool {
        match self.index.get(key) {
            Some(&pos) => {
                self.entries[pos].1 = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Parse a localization file from disk.
    pub fn parse(path: &Path) -> error::Result<Self> {
        let bytes = fs::read(path).map_err(|e| LocError::io(path, e))?;
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);

        let mut store = Self::new();
        for (idx, raw) in split_lines(body).into_iter().enumerate() {
            let line = std::str::from_utf8(raw).map_err(|_| LocError::Decoding {
                path: path.to_path_buf(),
                line: idx + 1,
            })?;
            store.parse_line(line);
        }

        debug!("Parsed {} keys from {}", store.len(), path.display());
        Ok(store)
    }

    /// Parse in-memory text using the same line rules as [`Self::parse`].
    pub fn parse_str(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut store = Self::new();
        for line in text.split("\r\n").flat_map(|chunk| chunk.split(['\r', '\n'])) {
            store.parse_line(line);
        }
        store
    }

    fn parse_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            return;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if !key.is_empty() {
                self.insert(key, value.trim());
            }
        }
    }

    /// Serialize to `key=value` lines as UTF-8 without BOM, CRLF-terminated.
    pub fn to_ini_string(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.iter() {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push_str("\r\n");
        }
        out
    }

    /// Write the store to `path`, creating parent directories and replacing
    /// any existing file.
    pub fn write(&self, path: &Path) -> error::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| LocError::io(parent, e))?;
        }
        fs::write(path, self.to_ini_string()).map_err(|e| LocError::io(path, e))?;
        debug!("Wrote {} keys to {}", self.len(), path.display());
        Ok(())
    }
}

/// Split on `\r\n`, `\n` or a lone `\r`. Neither byte occurs inside a
/// multi-byte UTF-8 sequence, so splitting before decoding is safe.
fn split_lines(body: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < body.len() {
        match body[i] {
            b'\n' => {
                lines.push(&body[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&body[start..i]);
                i += if body.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    lines.push(&body[start..]);
    lines
}

impl PartialEq for KeyValueStore {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for KeyValueStore {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValueStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (k, v) in iter {
            store.insert(k, v);
        }
        store
    }
}
