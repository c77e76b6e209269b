//! Translation validation.
//!
//! Every translation record is run through a fixed battery of checks before
//! it is merged. Findings come back as [`Diagnostic`] values tagged with a
//! [`Severity`]; nothing here ever fails or stops early, so a caller always
//! sees the complete list.
//!
//! # Example
//!
//! ```rust,ignore
//! use sc_loc_tool::translation::TranslationRecord;
//! use sc_loc_tool::validation::{Severity, TranslationValidator};
//!
//! let record = TranslationRecord::new("err", "Error: {code}", "Something went wrong!");
//! let diagnostics = TranslationValidator::validate(&record, "Error: {code}");
//! assert_eq!(diagnostics[0].severity, Severity::Error);
//! ```

mod diagnostic;
mod validator;

pub use diagnostic::{Diagnostic, Severity, SeverityCounts};
pub use validator::TranslationValidator;
