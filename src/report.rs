//! Console rendering of validation and merge results.
//!
//! Output goes to any `io::Write` so it can be captured in tests. Colors are
//! plain ANSI escapes and are turned off when stdout is not a terminal or
//! `NO_COLOR` is set.

use crate::merge::MergeOutcome;
use crate::translation::TranslationRecord;
use crate::validation::{Diagnostic, Severity};
use std::io::{self, IsTerminal, Write};

/// How many not-found keys are listed before the rest are summarised
const NOT_FOUND_PREVIEW: usize = 5;

const RED: &str = "\x1b[91m";
const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const CYAN: &str = "\x1b[96m";
const BOLD: &str = "\x1b[1m";
const END: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Colors on only for an interactive stdout without `NO_COLOR`.
    pub fn for_stdout() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::new(io::stdout().is_terminal() && !no_color)
    }

    fn paint(&self, style: &'static str) -> &'static str {
        if self.color {
            style
        } else {
            ""
        }
    }

    fn end(&self) -> &'static str {
        self.paint(END)
    }

    pub fn banner(&self, w: &mut impl Write, title: &str) -> io::Result<()> {
        let rule = "=".repeat(60);
        writeln!(w, "{}{}{}", self.paint(BOLD), self.paint(CYAN), rule)?;
        writeln!(w, "  {}", title)?;
        writeln!(w, "{}{}", rule, self.end())
    }

    pub fn heading(&self, w: &mut impl Write, text: &str) -> io::Result<()> {
        writeln!(w, "{}{}{}", self.paint(BOLD), text, self.end())
    }

    pub fn success(&self, w: &mut impl Write, text: &str) -> io::Result<()> {
        writeln!(w, "{}✓ {}{}", self.paint(GREEN), text, self.end())
    }

    pub fn warning(&self, w: &mut impl Write, text: &str) -> io::Result<()> {
        writeln!(w, "{}⚠️  {}{}", self.paint(YELLOW), text, self.end())
    }

    pub fn failure(&self, w: &mut impl Write, text: &str) -> io::Result<()> {
        writeln!(w, "{}❌ {}{}", self.paint(RED), text, self.end())
    }

    /// Print diagnostics grouped as errors, warnings, then info.
    pub fn validation_results(&self, w: &mut impl Write, diagnostics: &[Diagnostic]) -> io::Result<()> {
        if diagnostics.is_empty() {
            return self.success(w, "All validations passed!");
        }

        let groups = [
            (Severity::Error, "❌ Errors", RED, true),
            (Severity::Warning, "⚠️  Warnings", YELLOW, true),
            (Severity::Info, "ℹ️  Info", CYAN, false),
        ];

        for (severity, label, color, bold) in groups {
            let matching: Vec<&Diagnostic> =
                diagnostics.iter().filter(|d| d.severity == severity).collect();
            if matching.is_empty() {
                continue;
            }

            let weight = if bold { self.paint(BOLD) } else { "" };
            writeln!(
                w,
                "\n{}{}{} ({}):{}",
                self.paint(color),
                weight,
                label,
                matching.len(),
                self.end()
            )?;
            for d in matching {
                writeln!(w, "{}   {}{}", self.paint(color), d.message, self.end())?;
            }
        }
        Ok(())
    }

    /// Print applied count and the first few keys missing from the source.
    pub fn merge_summary(&self, w: &mut impl Write, outcome: &MergeOutcome) -> io::Result<()> {
        self.success(w, &format!("Applied {} translations", outcome.applied))?;

        if outcome.not_found.is_empty() {
            return Ok(());
        }

        self.warning(
            w,
            &format!("{} keys not found in source:", outcome.not_found.len()),
        )?;
        for key in outcome.not_found.iter().take(NOT_FOUND_PREVIEW) {
            writeln!(w, "   - {}", key)?;
        }
        if outcome.not_found.len() > NOT_FOUND_PREVIEW {
            writeln!(
                w,
                "   ... and {} more",
                outcome.not_found.len() - NOT_FOUND_PREVIEW
            )?;
        }
        Ok(())
    }

    /// Print each record as a `-`/`+` diff against its original text.
    pub fn merge_preview(&self, w: &mut impl Write, records: &[TranslationRecord]) -> io::Result<()> {
        let rule = "─".repeat(60);
        writeln!(w, "{}Changes to be applied:{}", self.paint(CYAN), self.end())?;
        writeln!(w, "{}", rule)?;

        for record in records {
            writeln!(
                w,
                "\n{}[{}] {}{}",
                self.paint(BOLD),
                record.category,
                record.key,
                self.end()
            )?;
            writeln!(w, "{}  - {}{}", self.paint(RED), record.original, self.end())?;
            writeln!(w, "{}  + {}{}", self.paint(GREEN), record.translated, self.end())?;
            if !record.comment.is_empty() {
                writeln!(w, "{}    # {}{}", self.paint(CYAN), record.comment, self.end())?;
            }
        }

        writeln!(w, "\n{}", rule)
    }
}
