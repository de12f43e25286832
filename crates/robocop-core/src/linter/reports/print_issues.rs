use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use super::{invalid_report_param, Report, RunSummary};
use crate::diagnostics::Diagnostic;
use crate::errors::{RobocopError, RobocopResult};
use crate::files::display_path;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{(\w+)\}").expect("valid regex");
}

pub const ISSUE_FORMAT_FIELDS: &[&str] =
    &["source", "source_abs", "line", "col", "end_line", "end_col", "severity", "rule_id", "desc", "name"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, Display, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Simple,
    Grouped,
    Extended,
}

/// Validates the placeholders of an issue format.
pub fn validate_issue_format(format: &str) -> RobocopResult<()> {
    for captures in PLACEHOLDER.captures_iter(format) {
        let placeholder = &captures[1];
        if !ISSUE_FORMAT_FIELDS.contains(&placeholder) {
            return Err(RobocopError::InvalidIssueFormat {
                format: format.to_string(),
                placeholder: placeholder.to_string(),
            });
        }
    }
    Ok(())
}

/// Renders one diagnostic with an issue format template.
pub fn format_issue(format: &str, diagnostic: &Diagnostic, cwd: &Path) -> String {
    PLACEHOLDER
        .replace_all(format, |captures: &regex::Captures| match &captures[1] {
            "source" => display_path(&diagnostic.source, cwd).display().to_string(),
            "source_abs" => diagnostic.source.display().to_string(),
            "line" => diagnostic.range.start.line.to_string(),
            "col" => diagnostic.range.start.column.to_string(),
            "end_line" => diagnostic.range.end.line.to_string(),
            "end_col" => diagnostic.range.end.column.to_string(),
            "severity" => diagnostic.severity.to_string(),
            "rule_id" => diagnostic.rule_id.to_string(),
            "desc" => diagnostic.message.clone(),
            "name" => diagnostic.rule_name.to_string(),
            other => format!("{{{}}}", other),
        })
        .into_owned()
}

pub struct PrintIssues {
    issue_format: String,
    output_format: OutputFormat,
    diagnostics: Vec<Diagnostic>,
}

impl PrintIssues {
    pub fn new(issue_format: &str) -> RobocopResult<PrintIssues> {
        validate_issue_format(issue_format)?;
        Ok(PrintIssues {
            issue_format: issue_format.to_string(),
            output_format: OutputFormat::default(),
            diagnostics: Vec::new(),
        })
    }

    fn simple(&self, cwd: &Path) -> String {
        self.diagnostics
            .iter()
            .map(|d| format_issue(&self.issue_format, d, cwd))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn by_source(&self) -> BTreeMap<&PathBuf, Vec<&Diagnostic>> {
        let mut grouped: BTreeMap<&PathBuf, Vec<&Diagnostic>> = BTreeMap::new();
        for diagnostic in &self.diagnostics {
            grouped.entry(&diagnostic.source).or_default().push(diagnostic);
        }
        grouped
    }

    fn grouped(&self, cwd: &Path) -> String {
        let mut output = Vec::new();
        for (source, diagnostics) in self.by_source() {
            output.push(format!("{}:", display_path(source, cwd).display()));
            for d in diagnostics {
                output.push(format!(
                    "    {}:{} [{}] {} {} ({})",
                    d.line(),
                    d.column(),
                    d.severity,
                    d.rule_id,
                    d.message,
                    d.rule_name
                ));
            }
            output.push(String::new());
        }
        output.join("\n").trim_end().to_string()
    }

    /// Source excerpt with the reported range underlined.
    fn extended(&self, cwd: &Path) -> String {
        let mut output = Vec::new();
        for (source, diagnostics) in self.by_source() {
            let text = fs::read_to_string(source).unwrap_or_default();
            let lines: Vec<&str> = text.lines().collect();
            let width = lines.len().to_string().len();
            for d in diagnostics {
                output.push(format!(
                    "{}:{}:{} [{}] {} {}",
                    display_path(source, cwd).display(),
                    d.line(),
                    d.column(),
                    d.severity,
                    d.rule_id,
                    d.rule_name
                ));
                output.push(format!("{:>width$} |", "", width = width));
                if let Some(line) = lines.get(d.line().saturating_sub(1)) {
                    let span = if d.range.end.line == d.line() {
                        d.range.end.column.saturating_sub(d.column()).max(1)
                    } else {
                        line.chars().count().saturating_sub(d.column().saturating_sub(1)).max(1)
                    };
                    output.push(format!("{:>width$} | {}", d.line(), line, width = width));
                    output.push(format!(
                        "{:>width$} | {}{} {}",
                        "",
                        " ".repeat(d.column().saturating_sub(1)),
                        "^".repeat(span),
                        d.message,
                        width = width
                    ));
                }
                output.push(format!("{:>width$} |", "", width = width));
                output.push(String::new());
            }
        }
        output.join("\n").trim_end().to_string()
    }
}

impl Report for PrintIssues {
    fn name(&self) -> &'static str {
        "print_issues"
    }

    fn description(&self) -> &'static str {
        "Collect and print found issues"
    }

    fn params(&self) -> &'static [&'static str] {
        &["output_format"]
    }

    fn configure(&mut self, param: &str, value: &str) -> RobocopResult<()> {
        match param {
            "output_format" => {
                self.output_format = value.parse().map_err(|_| RobocopError::InvalidParamValue {
                    param: param.to_string(),
                    value: value.to_string(),
                    message: "expected simple, grouped or extended".to_string(),
                    kind: "str".to_string(),
                })?;
                Ok(())
            }
            _ => Err(invalid_report_param(self.name(), param, self.params())),
        }
    }

    fn add_diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }

    fn finish(&mut self, summary: &RunSummary) -> RobocopResult<Option<String>> {
        if self.diagnostics.is_empty() {
            return Ok(None);
        }
        self.diagnostics.sort();
        let text = match self.output_format {
            OutputFormat::Simple => self.simple(summary.cwd),
            OutputFormat::Grouped => self.grouped(summary.cwd),
            OutputFormat::Extended => self.extended(summary.cwd),
        };
        Ok(Some(text))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::diagnostic;
    use super::*;
    use crate::config::DEFAULT_ISSUE_FORMAT;
    use crate::diagnostics::Severity;

    fn summary<'a>(cwd: &'a Path) -> RunSummary<'a> {
        RunSummary { files: 1, root: cwd, cwd, rules: &[] }
    }

    #[test]
    fn renders_default_issue_format() {
        let d = diagnostic("missing-doc-keyword", Severity::Warning, "/work/tests/a.robot", 3);
        let line = format_issue(DEFAULT_ISSUE_FORMAT, &d, Path::new("/work"));
        assert_eq!(line, "tests/a.robot:3:1 [W] DOC01 missing-doc-keyword message (missing-doc-keyword)");
    }

    #[test]
    fn rejects_unknown_placeholder() {
        let err = PrintIssues::new("{source}:{lines}").err().unwrap();
        assert!(matches!(err, RobocopError::InvalidIssueFormat { ref placeholder, .. } if placeholder == "lines"));
    }

    #[test]
    fn simple_output_is_sorted() {
        // Arrange
        let mut report = PrintIssues::new("{source}:{line} {rule_id}").unwrap();
        report.add_diagnostic(&diagnostic("line-too-long", Severity::Warning, "/w/b.robot", 1));
        report.add_diagnostic(&diagnostic("missing-doc-keyword", Severity::Warning, "/w/a.robot", 9));
        report.add_diagnostic(&diagnostic("trailing-whitespace", Severity::Warning, "/w/a.robot", 2));

        // Act
        let output = report.finish(&summary(Path::new("/w"))).unwrap().unwrap();

        // Assert
        assert_eq!(output, "a.robot:2 SPC01\na.robot:9 DOC01\nb.robot:1 LEN08");
    }

    #[test]
    fn grouped_output_has_file_headers() {
        let mut report = PrintIssues::new(DEFAULT_ISSUE_FORMAT).unwrap();
        report.configure("output_format", "grouped").unwrap();
        report.add_diagnostic(&diagnostic("missing-doc-keyword", Severity::Warning, "/w/a.robot", 4));

        let output = report.finish(&summary(Path::new("/w"))).unwrap().unwrap();

        assert_eq!(output, "a.robot:\n    4:1 [W] DOC01 missing-doc-keyword message (missing-doc-keyword)");
    }

    #[test]
    fn nothing_to_print_without_issues() {
        let mut report = PrintIssues::new(DEFAULT_ISSUE_FORMAT).unwrap();
        assert_eq!(report.finish(&summary(Path::new("/w"))).unwrap(), None);
    }

    #[test]
    fn rejects_unknown_output_format() {
        let mut report = PrintIssues::new(DEFAULT_ISSUE_FORMAT).unwrap();
        assert!(report.configure("output_format", "fancy").is_err());
    }
}
