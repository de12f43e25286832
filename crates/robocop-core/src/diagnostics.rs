//! Issues reported by the linter

use std::cmp::Ordering;
use std::path::PathBuf;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::linter::rule_id::RuleId;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    AsRefStr,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Severity {
    #[strum(to_string = "I", serialize = "info")]
    Info,
    #[strum(to_string = "W", serialize = "warning", serialize = "warn")]
    Warning,
    #[strum(to_string = "E", serialize = "error")]
    Error,
}

impl Severity {
    /// Upper-case name used in summaries, e.g. `WARNING`.
    pub const fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }

    /// SARIF result level
    pub const fn sarif_level(&self) -> &'static str {
        match self {
            Severity::Info => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub rule_id: RuleId,
    pub rule_name: &'static str,
    pub severity: Severity,
    pub message: String,
    pub source: PathBuf,
    pub range: Range,
}

impl Diagnostic {
    pub fn line(&self) -> usize {
        self.range.start.line
    }

    pub fn column(&self) -> usize {
        self.range.start.column
    }
}

impl Ord for Diagnostic {
    fn cmp(&self, other: &Self) -> Ordering {
        self.source
            .cmp(&other.source)
            .then(self.range.start.cmp(&other.range.start))
            .then(self.rule_id.cmp(&other.rule_id))
    }
}

impl PartialOrd for Diagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use test_case::test_case;

    #[test_case("I", Severity::Info)]
    #[test_case("warning", Severity::Warning)]
    #[test_case("e", Severity::Error)]
    #[test_case("ERROR", Severity::Error)]
    fn parses_severity(value: &str, expected: Severity) {
        assert_eq!(Severity::from_str(value).unwrap(), expected);
    }

    #[test]
    fn severities_are_ordered() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert_eq!(Severity::Warning.to_string(), "W");
    }
}
