use std::fs;
use std::path::PathBuf;

use serde_json::json;

use super::{invalid_report_param, Report, RunSummary};
use crate::diagnostics::Diagnostic;
use crate::errors::{RobocopError, RobocopResult};
use crate::files::display_path;

/// Writes the issues to a JSON file
pub struct JsonReport {
    output_dir: PathBuf,
    report_filename: String,
    diagnostics: Vec<Diagnostic>,
}

impl Default for JsonReport {
    fn default() -> Self {
        JsonReport {
            output_dir: PathBuf::from("."),
            report_filename: "robocop.json".to_string(),
            diagnostics: Vec::new(),
        }
    }
}

impl Report for JsonReport {
    fn name(&self) -> &'static str {
        "json_report"
    }

    fn description(&self) -> &'static str {
        "Produces JSON file with found issues"
    }

    fn is_default(&self) -> bool {
        false
    }

    fn params(&self) -> &'static [&'static str] {
        &["output_dir", "report_filename"]
    }

    fn configure(&mut self, param: &str, value: &str) -> RobocopResult<()> {
        match param {
            "output_dir" => self.output_dir = PathBuf::from(value),
            "report_filename" => self.report_filename = value.to_string(),
            _ => return Err(invalid_report_param(self.name(), param, self.params())),
        }
        Ok(())
    }

    fn add_diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }

    fn finish(&mut self, summary: &RunSummary) -> RobocopResult<Option<String>> {
        self.diagnostics.sort();
        let issues: Vec<_> = self
            .diagnostics
            .iter()
            .map(|d| {
                json!({
                    "source": display_path(&d.source, summary.cwd).display().to_string(),
                    "line": d.range.start.line,
                    "end_line": d.range.end.line,
                    "column": d.range.start.column,
                    "end_column": d.range.end.column,
                    "rule_id": d.rule_id.to_string(),
                    "rule_name": d.rule_name,
                    "severity": d.severity.to_string(),
                    "description": d.message,
                })
            })
            .collect();

        let directory = summary.cwd.join(&self.output_dir);
        fs::create_dir_all(&directory).map_err(|e| RobocopError::io(&directory, e))?;
        let path = directory.join(&self.report_filename);
        let text = serde_json::to_string_pretty(&issues).unwrap_or_else(|_| "[]".to_string());
        fs::write(&path, text).map_err(|e| RobocopError::io(&path, e))?;
        Ok(Some(format!("\nGenerated JSON report at {}", path.display())))
    }
}
