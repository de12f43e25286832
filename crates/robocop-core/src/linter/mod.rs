//! Linter: runs the configured rules over every source and feeds the reports

pub mod disablers;
pub mod matcher;
pub mod reports;
pub mod rule_id;
pub mod rules;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ConfigManager, LintConfig};
use crate::diagnostics::{Diagnostic, Position, Range};
use crate::errors::{RobocopError, RobocopResult};
use crate::model::SourceFile;
use disablers::Disablers;
use matcher::RuleSet;
use reports::{ResultsCache, Reports, RunSummary};
use rule_id::RuleId;
use rules::{Rule, RuleContext};

/// Lints one parsed file with a configured rule set.
///
/// Diagnostics disabled inline or below the threshold are dropped; the rest
/// come back sorted by position and rule id.
pub fn check_source(file: &SourceFile, rules: &RuleSet) -> Vec<Diagnostic> {
    let disablers = Disablers::from_source(file);
    if disablers.file_disabled() {
        return Vec::new();
    }
    let mut diagnostics = Vec::new();
    for configured in rules.enabled() {
        let rule = configured.rule;
        if configured.severity < rules.threshold {
            continue;
        }
        let context = RuleContext { file, params: &configured.params };
        for finding in (rule.check)(&context) {
            if disablers.is_disabled(rule, finding.line) {
                continue;
            }
            diagnostics.push(Diagnostic {
                rule_id: rule.id,
                rule_name: rule.name,
                severity: configured.severity,
                message: finding.render(rule.message),
                source: file.path.clone(),
                range: Range {
                    start: Position { line: finding.line, column: finding.column },
                    end: Position { line: finding.end_line, column: finding.end_column },
                },
            });
        }
    }
    diagnostics.sort();
    diagnostics
}

/// Parses and lints source text with a lint configuration.
pub fn lint_text(path: impl Into<PathBuf>, text: &str, config: &LintConfig) -> RobocopResult<Vec<Diagnostic>> {
    let rules = RuleSet::from_config(config)?;
    Ok(check_source(&SourceFile::parse(path, text), &rules))
}

/// Source contents, `None` when the file is not UTF-8.
pub fn read_source(path: &Path) -> RobocopResult<Option<String>> {
    let bytes = fs::read(path).map_err(|e| RobocopError::io(path, e))?;
    Ok(String::from_utf8(bytes).ok())
}

#[derive(Debug, Default)]
pub struct LintOutcome {
    pub files: usize,
    pub issues: usize,
    /// Rendered report blocks, in report order
    pub output: Vec<String>,
    /// Messages for the user that are not issues
    pub notices: Vec<String>,
    pub exit_code: i32,
}

pub struct Linter {
    manager: ConfigManager,
    results_cache: Option<ResultsCache>,
}

impl Linter {
    pub fn new(manager: ConfigManager) -> Linter {
        Linter { manager, results_cache: None }
    }

    /// Keeps `persistent` results in `cache` rather than the user cache directory
    pub fn with_results_cache(mut self, cache: ResultsCache) -> Linter {
        self.results_cache = Some(cache);
        self
    }

    pub fn manager(&self) -> &ConfigManager {
        &self.manager
    }

    pub fn run(&mut self) -> RobocopResult<LintOutcome> {
        let default_config = self.manager.default_config();
        let default_rules = RuleSet::from_config(&default_config.lint)?;
        let mut reports = Reports::from_config(&default_config.lint, &default_rules.report_configure)?;
        if let Some(cache) = &self.results_cache {
            reports = reports.with_cache(cache.clone());
        }
        let mut outcome = LintOutcome { notices: default_rules.notices.clone(), ..LintOutcome::default() };

        let mut rule_sets: HashMap<Option<PathBuf>, RuleSet> = HashMap::new();
        let mut used_rules: BTreeMap<RuleId, &'static Rule> = BTreeMap::new();

        for (path, config) in self.manager.paths()? {
            let Some(text) = read_source(&path)? else {
                outcome.notices.push(format!(
                    "Failed to decode {}. Default supported encoding by Robot Framework is UTF-8. Skipping file",
                    path.display()
                ));
                continue;
            };
            outcome.files += 1;

            if !rule_sets.contains_key(&config.config_source) {
                let rules = RuleSet::from_config(&config.lint)?;
                for notice in &rules.notices {
                    if !outcome.notices.contains(notice) {
                        outcome.notices.push(notice.clone());
                    }
                }
                rule_sets.insert(config.config_source.clone(), rules);
            }
            let Some(rules) = rule_sets.get(&config.config_source) else { continue };
            for configured in rules.enabled() {
                used_rules.insert(configured.rule.id, configured.rule);
            }

            let file = SourceFile::parse(path, &text);
            for diagnostic in check_source(&file, rules) {
                reports.add_diagnostic(&diagnostic);
                outcome.issues += 1;
            }
        }

        let rules: Vec<&'static Rule> = used_rules.into_values().collect();
        let summary = RunSummary {
            files: outcome.files,
            root: self.manager.root(),
            cwd: self.manager.cwd(),
            rules: &rules,
        };
        outcome.output = reports.finish(&summary)?;
        outcome.exit_code = if default_config.lint.exit_zero {
            0
        } else if let Some(code) = reports.exit_code() {
            code
        } else if outcome.issues > 0 {
            1
        } else {
            0
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    fn lint(source: &str, select: &[&str]) -> Vec<Diagnostic> {
        let config = LintConfig { select: select.iter().map(|s| s.to_string()).collect(), ..LintConfig::default() };
        lint_text("suite.robot", source, &config).unwrap()
    }

    #[test]
    fn diagnostics_are_sorted_by_position() {
        let source = "*** Keywords ***\nKeyword  \n    Log    x\n";
        let found: Vec<_> = lint(source, &["DOC01", "SPC01"]).iter().map(|d| d.rule_id.to_string()).collect();
        assert_eq!(found, vec!["DOC01", "SPC01"]);
    }

    #[test]
    fn inline_disabler_drops_diagnostic() {
        let source = "*** Keywords ***\nKeyword    # robocop: off=missing-doc-keyword\n    Log    x\n";
        assert!(lint(source, &["DOC01"]).is_empty());
    }

    #[test]
    fn file_level_disabler_skips_file() {
        let source = "# robocop: off\n*** Keywords ***\nKeyword\n    Log    x\n";
        assert!(lint(source, &[]).is_empty());
    }

    #[test]
    fn configured_severity_is_reported() {
        let config = LintConfig {
            select: vec!["DOC01".into()],
            configure: vec!["DOC01.severity=E".into()],
            ..LintConfig::default()
        };
        let found = lint_text("suite.robot", "*** Keywords ***\nKeyword\n    Log    x\n", &config).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Error);
        assert_eq!(found[0].message, "Missing documentation in 'Keyword' keyword");
    }
}
