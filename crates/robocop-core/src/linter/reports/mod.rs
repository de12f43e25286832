//! Reports produced at the end of a lint run
//!
//! Every diagnostic is fed to each enabled report; when the run ends each
//! report may render a block of text, write files or decide the exit code.
//! `print_issues` is always enabled; the others are selected with `reports`.
//!
//! Comparable reports can store their results in a [`ResultsCache`] when the
//! run is `persistent` and show the difference to the stored results when
//! `compare_runs` is set.

mod cache;
mod json_report;
mod print_issues;
mod return_status;
mod sarif;
mod summary;

use std::path::Path;

use serde_json::{Map, Value};

pub use cache::{ResultsCache, CACHE_FILE};
pub use json_report::JsonReport;
pub use print_issues::{OutputFormat, PrintIssues};
pub use return_status::ReturnStatus;
pub use sarif::SarifReport;
pub use summary::{FileStats, RulesByErrorType, RulesById, Timestamp};

use super::matcher::Configure;
use super::rules::Rule;
use crate::config::LintConfig;
use crate::diagnostics::Diagnostic;
use crate::errors::{did_you_mean, RobocopError, RobocopResult};

pub const REPORT_NAMES: &[&str] = &[
    "print_issues",
    "rules_by_id",
    "rules_by_error_type",
    "file_stats",
    "timestamp",
    "return_status",
    "json_report",
    "sarif",
];

/// Accepted in `reports` to turn on `compare_runs`
pub const COMPARE_RUNS: &str = "compare_runs";

/// Facts about the whole run passed to [`Report::finish`]
pub struct RunSummary<'a> {
    pub files: usize,
    pub root: &'a Path,
    pub cwd: &'a Path,
    /// Rules enabled for at least one source
    pub rules: &'a [&'static Rule],
}

pub trait Report {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;

    /// Enabled by `reports = ["all"]`
    fn is_default(&self) -> bool {
        true
    }

    fn params(&self) -> &'static [&'static str] {
        &[]
    }

    fn configure(&mut self, param: &str, _value: &str) -> RobocopResult<()> {
        Err(invalid_report_param(self.name(), param, self.params()))
    }

    fn add_diagnostic(&mut self, _diagnostic: &Diagnostic) {}

    /// Text to show the user, if any
    fn finish(&mut self, summary: &RunSummary) -> RobocopResult<Option<String>>;

    /// Exit code requested by the report
    fn exit_code(&self) -> Option<i32> {
        None
    }

    fn as_comparable(&mut self) -> Option<&mut dyn ComparableReport> {
        None
    }
}

/// Report whose results can be stored and compared with the next run
pub trait ComparableReport {
    /// Results stored by the previous run, called before `finish`
    fn compare_with(&mut self, previous: &Value);

    /// Results of this run to store, called after `finish`
    fn persist_result(&self) -> Value;
}

/// `count (+diff)` when there is a previous count
pub(crate) fn with_diff(count: usize, previous: Option<usize>) -> String {
    match previous {
        Some(previous) => format!("{} ({:+})", count, count as i64 - previous as i64),
        None => count.to_string(),
    }
}

pub(crate) fn invalid_report_param(name: &str, param: &str, available: &[&str]) -> RobocopError {
    RobocopError::InvalidParam {
        name: name.to_string(),
        param: param.to_string(),
        available: available.join(", "),
    }
}

/// Every report with its default settings
pub fn all_reports(issue_format: &str) -> RobocopResult<Vec<Box<dyn Report>>> {
    Ok(vec![
        Box::new(PrintIssues::new(issue_format)?),
        Box::new(RulesById::default()),
        Box::new(RulesByErrorType::default()),
        Box::new(FileStats::default()),
        Box::new(Timestamp::default()),
        Box::new(ReturnStatus::default()),
        Box::new(JsonReport::default()),
        Box::new(SarifReport::default()),
    ])
}

/// Names requested by `reports`, resolving `all` and `None`.
pub fn selected_report_names(requested: &[String]) -> RobocopResult<Vec<&'static str>> {
    let mut names = vec!["print_issues"];
    for value in requested.iter().flat_map(|v| v.split(',')).map(str::trim).filter(|v| !v.is_empty()) {
        if value.eq_ignore_ascii_case("none") {
            names.truncate(1);
            continue;
        }
        if value == COMPARE_RUNS {
            continue;
        }
        if value == "all" {
            for name in REPORT_NAMES.iter().take(5) {
                if !names.contains(name) {
                    names.push(name);
                }
            }
            continue;
        }
        match REPORT_NAMES.iter().find(|name| **name == value) {
            Some(name) if !names.contains(name) => names.push(name),
            Some(_) => {}
            None => {
                return Err(RobocopError::ReportDoesNotExist {
                    name: value.to_string(),
                    suggestion: did_you_mean(value, REPORT_NAMES.iter().copied()),
                })
            }
        }
    }
    Ok(names)
}

/// Enabled reports of a run
pub struct Reports {
    reports: Vec<Box<dyn Report>>,
    compare_runs: bool,
    persistent: bool,
    cache: Option<ResultsCache>,
}

impl Reports {
    pub fn from_config(config: &LintConfig, configure: &[Configure]) -> RobocopResult<Reports> {
        let names = selected_report_names(&config.reports)?;
        let mut reports = all_reports(&config.issue_format)?;
        for entry in configure {
            if let Some(report) = reports.iter_mut().find(|r| r.name() == entry.name) {
                report.configure(&entry.param, &entry.value)?;
            }
        }
        reports.retain(|report| names.contains(&report.name()));
        let compare_runs = config.compare_runs
            || config.reports.iter().flat_map(|v| v.split(',')).any(|v| v.trim() == COMPARE_RUNS);
        Ok(Reports {
            reports,
            compare_runs,
            persistent: config.persistent,
            cache: ResultsCache::user_default(),
        })
    }

    /// Stores and reads previous results in `cache` instead of the user cache directory
    pub fn with_cache(mut self, cache: ResultsCache) -> Reports {
        self.cache = Some(cache);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.reports.iter().map(|r| r.name()).collect()
    }

    pub fn add_diagnostic(&mut self, diagnostic: &Diagnostic) {
        for report in &mut self.reports {
            report.add_diagnostic(diagnostic);
        }
    }

    pub fn finish(&mut self, summary: &RunSummary) -> RobocopResult<Vec<String>> {
        let previous = match (&self.cache, self.compare_runs) {
            (Some(cache), true) => cache.load(summary.root),
            _ => None,
        };
        let mut output = Vec::new();
        let mut results = Map::new();
        for report in &mut self.reports {
            let name = report.name();
            if let (Some(comparable), Some(previous)) =
                (report.as_comparable(), previous.as_ref().and_then(|p| p.get(name)))
            {
                comparable.compare_with(previous);
            }
            if let Some(text) = report.finish(summary)? {
                output.push(text);
            }
            if let (true, Some(comparable)) = (self.persistent, report.as_comparable()) {
                results.insert(name.to_string(), comparable.persist_result());
            }
        }
        if let (true, Some(cache)) = (self.persistent, &self.cache) {
            cache.save(summary.root, results)?;
        }
        Ok(output)
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.reports.iter().find_map(|r| r.exit_code())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use crate::diagnostics::{Diagnostic, Position, Range, Severity};
    use crate::linter::rules::find_rule;

    pub fn diagnostic(rule: &str, severity: Severity, source: &str, line: usize) -> Diagnostic {
        let rule = find_rule(rule).expect("rule exists");
        Diagnostic {
            rule_id: rule.id,
            rule_name: rule.name,
            severity,
            message: format!("{} message", rule.name),
            source: PathBuf::from(source),
            range: Range {
                start: Position { line, column: 1 },
                end: Position { line, column: 5 },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn names(values: &[&str]) -> Vec<&'static str> {
        selected_report_names(&values.iter().map(|v| v.to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn print_issues_is_always_enabled() {
        assert_eq!(names(&[]), vec!["print_issues"]);
        assert_eq!(names(&["None"]), vec!["print_issues"]);
    }

    #[test]
    fn all_enables_default_reports() {
        assert_eq!(
            names(&["all"]),
            vec!["print_issues", "rules_by_id", "rules_by_error_type", "file_stats", "timestamp"]
        );
        assert_eq!(names(&["all,sarif"]).last(), Some(&"sarif"));
    }

    #[test_case("rules_by_idd", " Did you mean: 'rules_by_id'?")]
    #[test_case("unknown", "")]
    fn unknown_report_is_rejected(name: &str, suggestion: &str) {
        let err = selected_report_names(&[name.to_string()]).unwrap_err();
        match err {
            RobocopError::ReportDoesNotExist { suggestion: actual, .. } => assert_eq!(actual, suggestion),
            other => panic!("unexpected error {}", other),
        }
    }

    #[test]
    fn compare_runs_is_not_a_report() {
        assert_eq!(names(&["compare_runs,rules_by_id"]), vec!["print_issues", "rules_by_id"]);
    }

    #[test_case(0, None, "0")]
    #[test_case(5, Some(3), "5 (+2)")]
    #[test_case(1, Some(4), "1 (-3)")]
    #[test_case(2, Some(2), "2 (+0)")]
    fn diffs_are_signed(count: usize, previous: Option<usize>, expected: &str) {
        assert_eq!(with_diff(count, previous), expected);
    }

    #[test]
    fn persistent_run_is_compared_by_the_next_one() {
        // Arrange
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        let config = LintConfig {
            reports: vec!["rules_by_error_type".into(), "file_stats".into()],
            persistent: true,
            compare_runs: true,
            ..LintConfig::default()
        };
        let summary = RunSummary { files: 2, root, cwd: root, rules: &[] };
        let issue = test_support::diagnostic("line-too-long", crate::diagnostics::Severity::Warning, "/w/a.robot", 1);
        let cache = ResultsCache::new(root.join("cache"));

        // Act
        let mut first = Reports::from_config(&config, &[]).unwrap().with_cache(cache.clone());
        first.add_diagnostic(&issue);
        first.add_diagnostic(&issue);
        let first_output = first.finish(&summary).unwrap();
        let mut second = Reports::from_config(&config, &[]).unwrap().with_cache(cache.clone());
        second.add_diagnostic(&issue);
        let second_output = second.finish(&summary).unwrap();

        // Assert
        assert_eq!(first_output[1], "\nFound 2 issues: 2 WARNINGs.");
        assert_eq!(second_output[1], "\nFound 1 (-1) issue: 1 (-1) WARNING.");
        assert_eq!(second_output[2], "\nProcessed 2 (+0) files from which 1 (+0) file has issues.");
        assert!(cache.load(root).unwrap().contains_key("rules_by_error_type"));
    }

    #[test]
    fn results_are_not_stored_without_persistent() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path();
        let config = LintConfig { reports: vec!["rules_by_id".into()], ..LintConfig::default() };
        let cache = ResultsCache::new(root.join("cache"));
        let mut reports = Reports::from_config(&config, &[]).unwrap().with_cache(cache.clone());

        reports.finish(&RunSummary { files: 0, root, cwd: root, rules: &[] }).unwrap();

        assert!(!cache.path().exists());
    }

    #[test]
    fn default_flags_match_registry() {
        let reports = all_reports(crate::config::DEFAULT_ISSUE_FORMAT).unwrap();
        let defaults: Vec<_> = reports.iter().filter(|r| r.is_default()).map(|r| r.name()).collect();
        assert_eq!(defaults, REPORT_NAMES[..5].to_vec());
    }

    #[test]
    fn report_params_are_configured() {
        let config = LintConfig { reports: vec!["return_status".into()], ..LintConfig::default() };
        let configure = vec![Configure { name: "return_status".into(), param: "nope".into(), value: "1".into() }];
        assert!(matches!(
            Reports::from_config(&config, &configure),
            Err(RobocopError::InvalidParam { .. })
        ));
    }
}
