//! Translation quality checks.
//!
//! Each check looks at one translated string next to the original text it
//! replaces. Checks run in a fixed order (placeholders, length, special
//! characters, encoding) and every one of them runs for every record.

use super::diagnostic::Diagnostic;
use crate::translation::TranslationRecord;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Translations longer than this multiple of the original may overflow
/// fixed-width UI widgets. Stored as a ratio of integers (3/2 = 1.5).
const LENGTH_RATIO_NUM: usize = 3;
const LENGTH_RATIO_DEN: usize = 2;

/// Validator for translation records.
pub struct TranslationValidator;

// `{name}` tokens and `%s` / `%d` directives
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

impl TranslationValidator {
    /// Run every check against `record`, using `original` as the reference
    /// text, and return all findings.
    pub fn validate(record: &TranslationRecord, original: &str) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        diagnostics.extend(Self::check_placeholders(record, original));
        diagnostics.extend(Self::check_length(record, original));
        diagnostics.extend(Self::check_special_chars(record));
        diagnostics.extend(Self::check_encoding(record));

        diagnostics
    }

    /// Extract the set of placeholder tokens from text
    fn extract_placeholders(text: &str) -> BTreeSet<&str> {
        let regex = PLACEHOLDER_REGEX
            .get_or_init(|| Regex::new(r"\{[^}]+\}|%[sd]").expect("valid placeholder regex"));

        regex.find_iter(text).map(|m| m.as_str()).collect()
    }

    fn check_placeholders(record: &TranslationRecord, original: &str) -> Option<Diagnostic> {
        let orig_vars = Self::extract_placeholders(original);
        let trans_vars = Self::extract_placeholders(&record.translated);
        if orig_vars == trans_vars {
            return None;
        }

        let missing: Vec<&str> = orig_vars.difference(&trans_vars).copied().collect();
        let extra: Vec<&str> = trans_vars.difference(&orig_vars).copied().collect();

        let mut message = format!("Variable mismatch in '{}'", record.key);
        if !missing.is_empty() {
            message.push_str(&format!("\n  Missing: {}", missing.join(", ")));
        }
        if !extra.is_empty() {
            message.push_str(&format!("\n  Extra: {}", extra.join(", ")));
        }

        Some(Diagnostic::error(&record.key, message))
    }

    fn check_length(record: &TranslationRecord, original: &str) -> Option<Diagnostic> {
        let translated_len = record.translated.chars().count();
        let original_len = original.chars().count();

        if translated_len * LENGTH_RATIO_DEN > original_len * LENGTH_RATIO_NUM {
            Some(Diagnostic::warning(
                &record.key,
                format!(
                    "'{}' is much longer ({} vs {} chars) - may not fit in UI",
                    record.key, translated_len, original_len
                ),
            ))
        } else {
            None
        }
    }

    fn check_special_chars(record: &TranslationRecord) -> Option<Diagnostic> {
        if record.translated.contains("\\n") || record.translated.contains('\n') {
            Some(Diagnostic::info(
                &record.key,
                format!("'{}' contains newlines - verify formatting", record.key),
            ))
        } else {
            None
        }
    }

    /// A `&str` is always valid UTF-8, so what can still go wrong is text
    /// that was already damaged upstream: replacement characters left by a
    /// lossy decode, or control characters that break the line format.
    fn check_encoding(record: &TranslationRecord) -> Option<Diagnostic> {
        let (position, bad) = record
            .translated
            .chars()
            .enumerate()
            .find(|(_, c)| Self::is_unencodable(*c))?;

        Some(Diagnostic::error(
            &record.key,
            format!(
                "'{}' contains character that can't be encoded: U+{:04X} at position {}",
                record.key, bad as u32, position
            ),
        ))
    }

    // Unpaired surrogates never reach this point: `String` cannot hold them,
    // and serde_json refuses the project file that contains one.
    fn is_unencodable(c: char) -> bool {
        c == char::REPLACEMENT_CHARACTER
            || (c.is_ascii_control() && !matches!(c, '\n' | '\r' | '\t'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Severity;
    use proptest::prelude::*;

    fn record(key: &str, translated: &str) -> TranslationRecord {
        TranslationRecord::new(key, "", translated)
    }

    // ==================== Placeholder Extraction Tests ====================

    #[test]
    fn test_extract_placeholders_braces_and_directives() {
        let vars = TranslationValidator::extract_placeholders("{player} has %d credits, %s");
        assert_eq!(vars, BTreeSet::from(["%d", "%s", "{player}"]));
    }

    #[test]
    fn test_extract_placeholders_ignores_other_directives() {
        let vars = TranslationValidator::extract_placeholders("100%% done, %f, {}");
        assert!(vars.is_empty());
    }

    #[test]
    fn test_extract_placeholders_collapses_duplicates() {
        let vars = TranslationValidator::extract_placeholders("{a} {a} {a}");
        assert_eq!(vars.len(), 1);
    }

    // ==================== Placeholder Check Tests ====================

    #[test]
    fn test_missing_placeholder_is_error() {
        let rec = record("err", "Something went wrong!");
        let diagnostics = TranslationValidator::validate(&rec, "Error: {code}");

        let errors: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].key.as_deref(), Some("err"));
        assert!(errors[0].message.contains("Missing: {code}"));
        assert!(!errors[0].message.contains("Extra"));
    }

    #[test]
    fn test_extra_placeholder_is_listed() {
        let rec = record("greet", "Hi {name} {rank}");
        let diag = TranslationValidator::check_placeholders(&rec, "Hello {name}")
            .expect("mismatch expected");
        assert!(diag.message.contains("Extra: {rank}"));
        assert!(!diag.message.contains("Missing"));
    }

    #[test]
    fn test_reordered_placeholders_pass() {
        let rec = record("trade", "%d uds de {item} por %s");
        assert!(TranslationValidator::check_placeholders(&rec, "{item} x%d for %s").is_none());
    }

    // ==================== Length Check Tests ====================

    #[test]
    fn test_length_warning_above_ratio() {
        let diag = TranslationValidator::check_length(&record("hi", "Hiya"), "Hi")
            .expect("warning expected");
        assert_eq!(diag.severity, Severity::Warning);
        assert!(diag.message.contains("(4 vs 2 chars)"));
    }

    #[test]
    fn test_length_at_ratio_passes() {
        assert!(TranslationValidator::check_length(&record("hi", "Hey"), "Hi").is_none());
        assert!(TranslationValidator::check_length(&record("hi", "Yo"), "Hi").is_none());
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // 3 chars, 9 bytes
        assert!(TranslationValidator::check_length(&record("hi", "こんに"), "Hi").is_none());
    }

    #[test]
    fn test_length_against_empty_original() {
        assert!(TranslationValidator::check_length(&record("k", "x"), "").is_some());
        assert!(TranslationValidator::check_length(&record("k", ""), "").is_none());
    }

    // ==================== Special Character Tests ====================

    #[test]
    fn test_escaped_newline_is_info() {
        let diag = TranslationValidator::check_special_chars(&record("k", r"Line one\nLine two"))
            .expect("info expected");
        assert_eq!(diag.severity, Severity::Info);
    }

    #[test]
    fn test_literal_newline_is_info() {
        assert!(TranslationValidator::check_special_chars(&record("k", "a\nb")).is_some());
        assert!(TranslationValidator::check_special_chars(&record("k", "a b")).is_none());
    }

    // ==================== Encoding Check Tests ====================

    #[test]
    fn test_replacement_char_is_error() {
        let diag = TranslationValidator::check_encoding(&record("k", "Caf\u{FFFD}"))
            .expect("error expected");
        assert_eq!(diag.severity, Severity::Error);
        assert!(diag.message.contains("U+FFFD at position 3"));
    }

    #[test]
    fn test_nul_is_error() {
        assert!(TranslationValidator::check_encoding(&record("k", "a\0b")).is_some());
    }

    #[test]
    fn test_unicode_text_encodes() {
        assert!(TranslationValidator::check_encoding(&record("k", "Größe 船 🚀\tok")).is_none());
    }

    // ==================== Full Validation Tests ====================

    #[test]
    fn test_clean_translation_has_no_diagnostics() {
        let rec = record("ui_welcome_message", "Greetings {player_name}!");
        assert!(TranslationValidator::validate(&rec, "Welcome {player_name}!").is_empty());
    }

    #[test]
    fn test_all_checks_accumulate_in_order() {
        let rec = record("k", "Missing var\\n and far too long \u{FFFD}");
        let diagnostics = TranslationValidator::validate(&rec, "{v}");

        let severities: Vec<_> = diagnostics.iter().map(|d| d.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Error, Severity::Warning, Severity::Info, Severity::Error]
        );
    }

    // ==================== Property Tests ====================

    fn token() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z_]{1,8}".prop_map(|name| format!("{{{}}}", name)),
            Just("%s".to_string()),
            Just("%d".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn prop_same_token_set_never_flags(tokens in prop::collection::vec(token(), 0..6), shift in 0usize..6) {
            let original = tokens.join(" filler ");
            let mut shuffled = tokens.clone();
            if !shuffled.is_empty() {
                let len = shuffled.len();
                shuffled.rotate_left(shift % len);
                shuffled.push(shuffled[0].clone());
            }
            let rec = record("k", &shuffled.join(" - "));
            prop_assert!(TranslationValidator::check_placeholders(&rec, &original).is_none());
        }

        #[test]
        fn prop_dropped_token_is_reported(tokens in prop::collection::btree_set(token(), 1..6)) {
            let tokens: Vec<String> = tokens.into_iter().collect();
            let original = tokens.join(" ");
            let translated = tokens[1..].join(" ");
            let rec = record("k", &translated);

            let diagnostics: Vec<_> = TranslationValidator::validate(&rec, &original)
                .into_iter()
                .filter(|d| d.severity == Severity::Error)
                .collect();
            prop_assert_eq!(diagnostics.len(), 1);
            let expected = format!("Missing: {}", tokens[0]);
            prop_assert!(diagnostics[0].message.contains(&expected));
        }
    }
}
