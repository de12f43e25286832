use robocop_core::config::DEFAULT_ISSUE_FORMAT;
use robocop_core::errors::did_you_mean;
use robocop_core::formatter::{builtin_formatters, Formatter};
use robocop_core::linter::reports::{all_reports, Report};
use robocop_core::linter::rules::{builtin_rules, find_rule, Rule, RuleParam};

use super::{CliError, CliResult, Context, GetDocumentation};

fn params_block(params: &[RuleParam]) -> String {
    let mut block = String::new();
    for param in params {
        block.push_str(&format!(
            "    {} = {} ({}): {}\n",
            param.name, param.default, param.kind, param.description
        ));
    }
    block
}

pub fn rule_docs(rule: &Rule) -> String {
    let mut text = format!(
        "Rule - {} [{}]: {}: {} ({})\n\n{}\n",
        rule.id,
        rule.severity,
        rule.name,
        rule.message,
        if rule.deprecated {
            "deprecated"
        } else if rule.enabled {
            "enabled"
        } else {
            "disabled"
        },
        rule.docs
    );
    if !rule.params.is_empty() {
        text.push_str("\nConfigurable parameters:\n");
        text.push_str(&params_block(rule.params));
    }
    text.push_str(&format!("\nAdded in version {}", rule.added_in_version));
    text
}

fn report_docs(report: &dyn Report) -> String {
    let mut text = format!("Report - {}: {}\n", report.name(), report.description());
    if report.is_default() {
        text.push_str("\nEnabled by default.\n");
    }
    if !report.params().is_empty() {
        text.push_str(&format!("\nConfigurable parameters: {}", report.params().join(", ")));
    }
    text
}

fn formatter_docs(formatter: &dyn Formatter) -> String {
    let state = if formatter.enabled_by_default() { "enabled" } else { "disabled" };
    let mut text = format!("Formatter - {} ({} by default)\n\n{}\n", formatter.name(), state, formatter.docs());
    if !formatter.params().is_empty() {
        text.push_str("\nConfigurable parameters:\n");
        text.push_str(&params_block(formatter.params()));
    }
    text
}

/// Documentation of a rule, report or formatter, looked up in that order
pub fn documentation(name: &str) -> CliResult<String> {
    if let Some(rule) = find_rule(name) {
        return Ok(rule_docs(rule));
    }
    let reports = all_reports(DEFAULT_ISSUE_FORMAT)?;
    if let Some(report) = reports.iter().find(|r| r.name() == name) {
        return Ok(report_docs(report.as_ref()));
    }
    let formatters = builtin_formatters();
    if let Some(formatter) = formatters.iter().find(|f| f.name() == name) {
        return Ok(formatter_docs(formatter.as_ref()));
    }

    let rules = builtin_rules();
    let candidates = rules
        .iter()
        .map(|rule| rule.name)
        .chain(reports.iter().map(|r| r.name()))
        .chain(formatters.iter().map(|f| f.name()));
    Err(CliError::UnknownDocumentation { name: name.to_string(), suggestion: did_you_mean(name, candidates) })
}

pub fn handle_docs_command(cmd: &GetDocumentation, _ctx: &Context) -> CliResult<i32> {
    println!("{}", documentation(&cmd.name)?);
    Ok(0)
}
