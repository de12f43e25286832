use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use robocop_core::config::{Config, ConfigManager, ManagerOptions};
use robocop_core::files::pattern::NamePattern;
use robocop_core::formatter::{builtin_formatters, FormatterSet};
use robocop_core::linter::matcher::{ConfiguredRule, RuleSet};
use robocop_core::linter::reports::{all_reports, selected_report_names};
use robocop_core::{RobocopError, Severity};

use super::{CliResult, Context, ListFilter, ListFormatters, ListReports, ListRules};

pub const RULES_DOCS_URL: &str = "https://robocop.readthedocs.io/en/stable/rules_list.html";

/// Configuration of the current directory, or the one given with `--config`
fn load_config(config: &Option<PathBuf>) -> CliResult<Arc<Config>> {
    let cwd = env::current_dir().map_err(|e| RobocopError::io(".", e))?;
    let options = ManagerOptions { config: config.clone(), ..ManagerOptions::default() };
    let mut manager = ConfigManager::with_cwd(options, cwd.clone())?;
    Ok(manager.config_for_directory(&cwd)?)
}

fn status(enabled: bool, deprecated: bool) -> &'static str {
    match (deprecated, enabled) {
        (true, _) => "deprecated",
        (false, true) => "enabled",
        (false, false) => "disabled",
    }
}

fn passes(filter: ListFilter, enabled: bool, deprecated: bool) -> bool {
    match filter {
        ListFilter::All => !deprecated,
        ListFilter::Deprecated => deprecated,
        ListFilter::Enabled => enabled && !deprecated,
        ListFilter::Disabled => !enabled && !deprecated,
    }
}

pub fn rule_line(configured: &ConfiguredRule) -> String {
    let rule = configured.rule;
    format!(
        "Rule - {} [{}]: {}: {} ({})",
        rule.id,
        configured.severity,
        rule.name,
        rule.message,
        status(configured.enabled, rule.deprecated)
    )
}

pub fn severity_summary(rules: &[&ConfiguredRule]) -> String {
    let count = |severity: Severity| rules.iter().filter(|r| r.severity == severity).count();
    format!(
        "\nAltogether {} with following severity:\n    {} error rule(s),\n    {} warning rule(s),\n    {} info rule(s).\n\nVisit {} page for detailed documentation.",
        pluralize!(rules.len(), "rule"),
        count(Severity::Error),
        count(Severity::Warning),
        count(Severity::Info),
        RULES_DOCS_URL
    )
}

/// Rules shown by `list rules`, sorted by id
pub fn listed_rules<'a>(rules: &'a RuleSet, filter: ListFilter, pattern: Option<&NamePattern>) -> Vec<&'a ConfiguredRule> {
    let mut listed: Vec<&ConfiguredRule> = rules
        .iter()
        .filter(|c| passes(filter, c.enabled, c.rule.deprecated))
        .filter(|c| pattern.map_or(true, |p| p.matches(c.rule.name) || p.matches(&c.rule.id.to_string())))
        .collect();
    listed.sort_by_key(|c| c.rule.id);
    listed
}

pub fn handle_list_rules(cmd: &ListRules, _ctx: &Context) -> CliResult<i32> {
    let config = load_config(&cmd.config)?;
    let rules = RuleSet::from_config(&config.lint)?;
    let pattern = cmd.pattern.as_deref().map(NamePattern::new).transpose()?;

    let listed = listed_rules(&rules, cmd.filter, pattern.as_ref());
    for configured in &listed {
        let line = rule_line(configured);
        if configured.enabled && !configured.rule.deprecated {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
    }
    println!("{}", severity_summary(&listed));
    Ok(0)
}

pub fn handle_list_reports(cmd: &ListReports, _ctx: &Context) -> CliResult<i32> {
    let config = load_config(&cmd.config)?;
    let selected = selected_report_names(&config.lint.reports)?;
    println!("Available reports:");
    for report in all_reports(&config.lint.issue_format)? {
        let enabled = selected.contains(&report.name());
        if (cmd.enabled && !enabled) || (cmd.disabled && enabled) {
            continue;
        }
        let state = if enabled { "enabled".green() } else { "disabled".normal() };
        println!("{:<20} - {} ({})", report.name(), report.description(), state);
    }
    println!("\nEnable report by passing its name with --reports option. Use `all` to enable all default reports.");
    Ok(0)
}

pub fn handle_list_formatters(cmd: &ListFormatters, _ctx: &Context) -> CliResult<i32> {
    let config = load_config(&cmd.config)?;
    let enabled = FormatterSet::from_config(&config.format)?.names();
    for formatter in builtin_formatters() {
        let is_enabled = enabled.contains(&formatter.name());
        if !passes(cmd.filter, is_enabled, false) {
            continue;
        }
        let state = if is_enabled { "enabled".green() } else { "disabled".normal() };
        println!("{} ({})", formatter.name(), state);
    }
    Ok(0)
}
