//! SARIF 2.1.0 output for code scanning services

use std::fs;
use std::path::PathBuf;

use serde_json::{json, Value};

use super::{invalid_report_param, Report, RunSummary};
use crate::diagnostics::Diagnostic;
use crate::errors::{RobocopError, RobocopResult};
use crate::files::relative_to;
use crate::linter::rules::Rule;

const SARIF_SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";
const DOCS_URL: &str = "https://robocop.readthedocs.io/en/stable/rules_list.html";

pub struct SarifReport {
    output_dir: PathBuf,
    report_filename: String,
    diagnostics: Vec<Diagnostic>,
}

impl Default for SarifReport {
    fn default() -> Self {
        SarifReport {
            output_dir: PathBuf::from("."),
            report_filename: ".sarif.json".to_string(),
            diagnostics: Vec::new(),
        }
    }
}

fn rule_descriptor(rule: &Rule) -> Value {
    json!({
        "id": rule.id.to_string(),
        "name": rule.name,
        "helpUri": format!("{}#{}", DOCS_URL, rule.name),
        "shortDescription": { "text": rule.message },
        "fullDescription": { "text": rule.docs },
        "defaultConfiguration": { "level": rule.severity.sarif_level() },
        "help": { "text": rule.docs, "markdown": rule.docs },
    })
}

impl SarifReport {
    pub fn document(&self, summary: &RunSummary) -> Value {
        let results: Vec<Value> = self
            .diagnostics
            .iter()
            .map(|d| {
                json!({
                    "ruleId": d.rule_id.to_string(),
                    "level": d.severity.sarif_level(),
                    "message": { "text": d.message },
                    "locations": [{
                        "physicalLocation": {
                            "artifactLocation": {
                                "uri": relative_to(&d.source, summary.root),
                                "uriBaseId": "%SRCROOT%",
                            },
                            "region": {
                                "startLine": d.range.start.line,
                                "endLine": d.range.end.line,
                                "startColumn": d.range.start.column,
                                "endColumn": d.range.end.column,
                            },
                        },
                    }],
                })
            })
            .collect();

        json!({
            "$schema": SARIF_SCHEMA,
            "version": "2.1.0",
            "runs": [{
                "tool": {
                    "driver": {
                        "name": "Robocop",
                        "semanticVersion": env!("CARGO_PKG_VERSION"),
                        "informationUri": "https://robocop.readthedocs.io/",
                        "rules": summary.rules.iter().map(|rule| rule_descriptor(rule)).collect::<Vec<_>>(),
                    },
                },
                "automationDetails": { "id": "robocop/" },
                "results": results,
            }],
        })
    }
}

impl Report for SarifReport {
    fn name(&self) -> &'static str {
        "sarif"
    }

    fn description(&self) -> &'static str {
        "Generate SARIF output file"
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
        let document = self.document(summary);
        let directory = summary.cwd.join(&self.output_dir);
        fs::create_dir_all(&directory).map_err(|e| RobocopError::io(&directory, e))?;
        let path = directory.join(&self.report_filename);
        let text = serde_json::to_string_pretty(&document).unwrap_or_else(|_| "{}".to_string());
        fs::write(&path, text).map_err(|e| RobocopError::io(&path, e))?;
        Ok(Some(format!("\nGenerated SARIF report at {}", path.display())))
    }
}
