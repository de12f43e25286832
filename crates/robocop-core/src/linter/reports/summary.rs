//! Short statistics printed after the issues

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;
use std::path::PathBuf;

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum::IntoEnumIterator;

use super::{invalid_report_param, with_diff, ComparableReport, Report, RunSummary};
use crate::diagnostics::{Diagnostic, Severity};
use crate::errors::{RobocopError, RobocopResult};

/// Stored counts keyed by label; anything else reads as no counts
fn previous_counts(previous: &Value) -> BTreeMap<String, usize> {
    previous
        .as_object()
        .map(|counts| {
            counts
                .iter()
                .filter_map(|(key, count)| Some((key.clone(), count.as_u64()? as usize)))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Default)]
pub struct RulesById {
    counts: BTreeMap<(String, &'static str), usize>,
    previous: Option<BTreeMap<String, usize>>,
}

impl RulesById {
    fn labelled_counts(&self) -> BTreeMap<String, usize> {
        self.counts.iter().map(|((id, name), count)| (format!("{} [{}]", id, name), *count)).collect()
    }
}

impl Report for RulesById {
    fn name(&self) -> &'static str {
        "rules_by_id"
    }

    fn description(&self) -> &'static str {
        "Grouped statistics of found issues by rule id"
    }

    fn add_diagnostic(&mut self, diagnostic: &Diagnostic) {
        *self.counts.entry((diagnostic.rule_id.to_string(), diagnostic.rule_name)).or_default() += 1;
    }

    fn finish(&mut self, _summary: &RunSummary) -> RobocopResult<Option<String>> {
        let mut counts = self.labelled_counts();
        // fixed rules stay listed with 0
        if let Some(previous) = &self.previous {
            for label in previous.keys() {
                counts.entry(label.clone()).or_default();
            }
        }
        if counts.is_empty() {
            return Ok(Some("\nFound 0 issues.".to_string()));
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let width = counts.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let mut output = vec!["\nIssues by ID:".to_string()];
        for (label, count) in &counts {
            let previous = self.previous.as_ref().map(|p| p.get(label).copied().unwrap_or(0));
            output.push(format!("{:width$} : {}", label, with_diff(*count, previous), width = width));
        }
        Ok(Some(output.join("\n")))
    }

    fn as_comparable(&mut self) -> Option<&mut dyn ComparableReport> {
        Some(self)
    }
}

impl ComparableReport for RulesById {
    fn compare_with(&mut self, previous: &Value) {
        self.previous = Some(previous_counts(previous));
    }

    fn persist_result(&self) -> Value {
        json!(self.labelled_counts())
    }
}

const ALL_ISSUES: &str = "all_issues";

#[derive(Default)]
pub struct RulesByErrorType {
    counts: BTreeMap<Severity, usize>,
    previous: Option<BTreeMap<String, usize>>,
}

impl RulesByErrorType {
    fn previous_count(&self, key: &str) -> Option<usize> {
        self.previous.as_ref().map(|p| p.get(key).copied().unwrap_or(0))
    }
}

impl Report for RulesByErrorType {
    fn name(&self) -> &'static str {
        "rules_by_error_type"
    }

    fn description(&self) -> &'static str {
        "Statistics of found issues by severity"
    }

    fn add_diagnostic(&mut self, diagnostic: &Diagnostic) {
        *self.counts.entry(diagnostic.severity).or_default() += 1;
    }

    fn finish(&mut self, _summary: &RunSummary) -> RobocopResult<Option<String>> {
        let total: usize = self.counts.values().sum();
        let all = with_diff(total, self.previous_count(ALL_ISSUES));
        if total == 0 {
            return Ok(Some(format!("\nFound {} issues.", all)));
        }
        let parts: Vec<String> = Severity::iter()
            .rev()
            .filter_map(|severity| {
                let count = self.counts.get(&severity).copied().unwrap_or(0);
                let previous = self.previous_count(&severity.to_string());
                if count == 0 && previous.unwrap_or(0) == 0 {
                    return None;
                }
                let plural = if count == 1 { "" } else { "s" };
                Some(format!("{} {}{}", with_diff(count, previous), severity.label(), plural))
            })
            .collect();
        let plural = if total == 1 { "issue" } else { "issues" };
        Ok(Some(format!("\nFound {} {}: {}.", all, plural, parts.join(", "))))
    }

    fn as_comparable(&mut self) -> Option<&mut dyn ComparableReport> {
        Some(self)
    }
}

impl ComparableReport for RulesByErrorType {
    fn compare_with(&mut self, previous: &Value) {
        self.previous = Some(previous_counts(previous));
    }

    fn persist_result(&self) -> Value {
        let mut counts: BTreeMap<String, usize> =
            Severity::iter().map(|s| (s.to_string(), self.counts.get(&s).copied().unwrap_or(0))).collect();
        counts.insert(ALL_ISSUES.to_string(), self.counts.values().sum());
        json!(counts)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct FileCounts {
    files_count: usize,
    files_with_issues: usize,
}

#[derive(Default)]
pub struct FileStats {
    files_with_issues: HashSet<PathBuf>,
    files: usize,
    previous: Option<FileCounts>,
}

impl FileStats {
    fn counts(&self) -> FileCounts {
        FileCounts { files_count: self.files, files_with_issues: self.files_with_issues.len() }
    }
}

impl Report for FileStats {
    fn name(&self) -> &'static str {
        "file_stats"
    }

    fn description(&self) -> &'static str {
        "Statistics of processed files"
    }

    fn add_diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.files_with_issues.insert(diagnostic.source.clone());
    }

    fn finish(&mut self, summary: &RunSummary) -> RobocopResult<Option<String>> {
        self.files = summary.files;
        let previous = self.previous;
        let files = with_diff(summary.files, previous.map(|p| p.files_count));
        let processed = match summary.files {
            0 => return Ok(Some("\nNo files were processed.".to_string())),
            1 => format!("Processed {} file", files),
            _ => format!("Processed {} files", files),
        };
        let with_issues = self.files_with_issues.len();
        let issues = with_diff(with_issues, previous.map(|p| p.files_with_issues));
        let text = match with_issues {
            0 if previous.is_none() => format!("\n{} but no issues were found.", processed),
            0 => format!("\n{} from which {} files have issues.", processed, issues),
            1 => format!("\n{} from which {} file has issues.", processed, issues),
            _ => format!("\n{} from which {} files have issues.", processed, issues),
        };
        Ok(Some(text))
    }

    fn as_comparable(&mut self) -> Option<&mut dyn ComparableReport> {
        Some(self)
    }
}

impl ComparableReport for FileStats {
    fn compare_with(&mut self, previous: &Value) {
        self.previous = serde_json::from_value(previous.clone()).ok();
    }

    fn persist_result(&self) -> Value {
        serde_json::to_value(self.counts()).unwrap_or(Value::Null)
    }
}

pub struct Timestamp {
    utc: bool,
    format: String,
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp { utc: false, format: "%Y-%m-%d %H:%M:%S %z".to_string() }
    }
}

impl Timestamp {
    /// Current time, or the raw format string when it is not valid strftime.
    pub fn render(&self) -> String {
        let mut rendered = String::new();
        let written = if self.utc {
            write!(rendered, "{}", Utc::now().format(&self.format))
        } else {
            write!(rendered, "{}", Local::now().format(&self.format))
        };
        match written {
            Ok(()) => rendered,
            Err(_) => self.format.clone(),
        }
    }
}

impl Report for Timestamp {
    fn name(&self) -> &'static str {
        "timestamp"
    }

    fn description(&self) -> &'static str {
        "Returns Robocop execution timestamp"
    }

    fn params(&self) -> &'static [&'static str] {
        &["timezone", "format"]
    }

    fn configure(&mut self, param: &str, value: &str) -> RobocopResult<()> {
        match param {
            "timezone" => {
                self.utc = match value.to_lowercase().as_str() {
                    "utc" => true,
                    "local" => false,
                    _ => {
                        return Err(RobocopError::InvalidParamValue {
                            param: param.to_string(),
                            value: value.to_string(),
                            message: "expected local or utc".to_string(),
                            kind: "str".to_string(),
                        })
                    }
                };
            }
            "format" => self.format = value.to_string(),
            _ => return Err(invalid_report_param(self.name(), param, self.params())),
        }
        Ok(())
    }

    fn finish(&mut self, _summary: &RunSummary) -> RobocopResult<Option<String>> {
        Ok(Some(format!("\nReported: {}", self.render())))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::diagnostic;
    use super::*;
    use std::path::Path;

    fn summary(files: usize) -> RunSummary<'static> {
        RunSummary { files, root: Path::new("/w"), cwd: Path::new("/w"), rules: &[] }
    }

    #[test]
    fn counts_rules_by_id_descending() {
        // Arrange
        let mut report = RulesById::default();
        report.add_diagnostic(&diagnostic("line-too-long", Severity::Warning, "/w/a.robot", 1));
        report.add_diagnostic(&diagnostic("missing-doc-keyword", Severity::Warning, "/w/a.robot", 2));
        report.add_diagnostic(&diagnostic("line-too-long", Severity::Warning, "/w/a.robot", 3));

        // Act
        let output = report.finish(&summary(1)).unwrap().unwrap();

        // Assert
        let lines: Vec<&str> = output.lines().skip(2).collect();
        assert_eq!(lines, vec!["LEN08 [line-too-long]       : 2", "DOC01 [missing-doc-keyword] : 1"]);
    }

    #[test]
    fn summarises_by_severity() {
        let mut report = RulesByErrorType::default();
        report.add_diagnostic(&diagnostic("line-too-long", Severity::Error, "/w/a.robot", 1));
        report.add_diagnostic(&diagnostic("line-too-long", Severity::Info, "/w/a.robot", 2));
        report.add_diagnostic(&diagnostic("line-too-long", Severity::Info, "/w/a.robot", 3));

        let output = report.finish(&summary(1)).unwrap().unwrap();

        assert_eq!(output, "\nFound 3 issues: 1 ERROR, 2 INFOs.");
    }

    #[test]
    fn file_stats_counts_files_with_issues() {
        let mut report = FileStats::default();
        report.add_diagnostic(&diagnostic("line-too-long", Severity::Warning, "/w/a.robot", 1));
        report.add_diagnostic(&diagnostic("line-too-long", Severity::Warning, "/w/a.robot", 2));

        let output = report.finish(&summary(3)).unwrap().unwrap();

        assert_eq!(output, "\nProcessed 3 files from which 1 file has issues.");
        assert_eq!(FileStats::default().finish(&summary(0)).unwrap().unwrap(), "\nNo files were processed.");
    }

    #[test]
    fn rules_by_id_lists_fixed_rules_against_previous_run() {
        // Arrange
        let mut report = RulesById::default();
        report.compare_with(&json!({"LEN08 [line-too-long]": 1, "DOC01 [missing-doc-keyword]": 2}));
        report.add_diagnostic(&diagnostic("line-too-long", Severity::Warning, "/w/a.robot", 1));
        report.add_diagnostic(&diagnostic("line-too-long", Severity::Warning, "/w/a.robot", 2));

        // Act
        let output = report.finish(&summary(1)).unwrap().unwrap();

        // Assert
        let lines: Vec<&str> = output.lines().skip(2).collect();
        assert_eq!(lines, vec!["LEN08 [line-too-long]       : 2 (+1)", "DOC01 [missing-doc-keyword] : 0 (-2)"]);
        assert_eq!(report.persist_result(), json!({"LEN08 [line-too-long]": 2}));
    }

    #[test]
    fn error_types_compare_every_stored_severity() {
        let mut report = RulesByErrorType::default();
        report.compare_with(&json!({"all_issues": 3, "E": 1, "W": 2, "I": 0}));
        report.add_diagnostic(&diagnostic("line-too-long", Severity::Warning, "/w/a.robot", 1));

        let output = report.finish(&summary(1)).unwrap().unwrap();

        assert_eq!(output, "\nFound 1 (-2) issue: 0 (-1) ERRORs, 1 (-1) WARNING.");
        assert_eq!(report.persist_result(), json!({"E": 0, "I": 0, "W": 1, "all_issues": 1}));
    }

    #[test]
    fn file_stats_compare_with_stored_counts() {
        let mut report = FileStats::default();
        report.compare_with(&json!({"files_count": 2, "files_with_issues": 1}));

        let output = report.finish(&summary(3)).unwrap().unwrap();

        assert_eq!(output, "\nProcessed 3 (+1) files from which 0 (-1) files have issues.");
        assert_eq!(report.persist_result(), json!({"files_count": 3, "files_with_issues": 0}));
    }

    #[test]
    fn malformed_previous_results_are_ignored() {
        let mut report = FileStats::default();
        report.compare_with(&json!("garbage"));

        let output = report.finish(&summary(1)).unwrap().unwrap();

        assert_eq!(output, "\nProcessed 1 file but no issues were found.");
    }

    #[test]
    fn timestamp_uses_configured_format() {
        let mut report = Timestamp::default();
        report.configure("timezone", "UTC").unwrap();
        report.configure("format", "%Y").unwrap();
        assert_eq!(report.render().len(), 4);
        assert!(report.configure("timezone", "mars").is_err());
    }
}
