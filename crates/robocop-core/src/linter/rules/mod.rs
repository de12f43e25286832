//! Lint rules for Robot Framework sources
//!
//! # Adding New Rules
//!
//! 1. Write a check function in the module of the rule group:
//!    ```rust,ignore
//!    fn check_my_rule(ctx: &RuleContext) -> Vec<Finding>
//!    ```
//! 2. Describe the rule in the group's `RULES` table with a free id, a kebab-case
//!    name, a message template and its parameters.
//!
//! Message templates use `{placeholder}` fields filled from [`Finding::with`].
//! Severity, enablement and parameter values come from the configured
//! [`RuleSet`](super::matcher::RuleSet), never from the check itself.

pub mod deprecated;
pub mod documentation;
pub mod duplications;
pub mod lengths;
pub mod misc;
pub mod naming;
pub mod spacing;
pub mod tags;

use std::collections::HashMap;

use regex::Regex;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use super::rule_id::RuleId;
use crate::diagnostics::Severity;
use crate::errors::{RobocopError, RobocopResult};
use crate::model::{Cell, Line, SourceFile, Statement};

// ============================================================================
// Core Types
// ============================================================================

pub type CheckFn = for<'a> fn(&RuleContext<'a>) -> Vec<Finding>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ParamKind {
    Int,
    Bool,
    Str,
    Regex,
    List,
}

#[derive(Debug, Clone)]
pub struct RuleParam {
    pub name: &'static str,
    pub default: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
}

#[derive(Debug, Clone)]
pub enum ParamValue {
    Int(i64),
    Bool(bool),
    Str(String),
    Regex(Regex),
    List(Vec<String>),
}

impl ParamValue {
    pub fn parse(kind: ParamKind, param: &str, value: &str) -> RobocopResult<ParamValue> {
        let invalid = |message: String| RobocopError::InvalidParamValue {
            param: param.to_string(),
            value: value.to_string(),
            message,
            kind: kind.to_string(),
        };
        match kind {
            ParamKind::Int => {
                value.trim().parse().map(ParamValue::Int).map_err(|e| invalid(format!("{}", e)))
            }
            ParamKind::Bool => parse_bool(value)
                .map(ParamValue::Bool)
                .ok_or_else(|| invalid("expected true or false".to_string())),
            ParamKind::Str => Ok(ParamValue::Str(value.to_string())),
            ParamKind::Regex => {
                Regex::new(value).map(ParamValue::Regex).map_err(|e| invalid(e.to_string()))
            }
            ParamKind::List => Ok(ParamValue::List(
                value.split(',').map(str::trim).filter(|v| !v.is_empty()).map(String::from).collect(),
            )),
        }
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Static description of a rule
pub struct Rule {
    pub id: RuleId,
    pub name: &'static str,
    pub message: &'static str,
    pub severity: Severity,
    pub enabled: bool,
    pub deprecated: bool,
    pub docs: &'static str,
    pub params: &'static [RuleParam],
    pub added_in_version: &'static str,
    pub check: CheckFn,
}

impl Rule {
    pub fn param(&self, name: &str) -> Option<&'static RuleParam> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Matches the kebab-case name, or the id in any case
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || name.to_ascii_uppercase().parse::<RuleId>().map_or(false, |id| id == self.id)
    }

    pub fn default_params(&self) -> HashMap<&'static str, ParamValue> {
        self.params
            .iter()
            .filter_map(|p| ParamValue::parse(p.kind, p.name, p.default).ok().map(|v| (p.name, v)))
            .collect()
    }
}

/// Location and message fields of a single rule violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub fields: Vec<(&'static str, String)>,
}

impl Finding {
    pub fn new(line: usize, column: usize, end_line: usize, end_column: usize) -> Self {
        Finding { line, column, end_line, end_column, fields: Vec::new() }
    }

    pub fn at_cell(line: usize, cell: &Cell) -> Self {
        Finding::new(line, cell.column, line, cell.end_column())
    }

    /// Spans the whole text of the line.
    pub fn at_line(line: &Line) -> Self {
        let end = line.text.chars().count() + 1;
        Finding::new(line.number, 1, line.number, end.max(2))
    }

    pub fn at_statement(statement: &Statement) -> Self {
        Finding::at_cell(statement.line, &statement.name)
    }

    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    pub fn render(&self, template: &str) -> String {
        self.fields
            .iter()
            .fold(template.to_string(), |message, (key, value)| {
                message.replace(&format!("{{{}}}", key), value)
            })
    }
}

/// Input of a rule check: the parsed file and the configured parameters
pub struct RuleContext<'a> {
    pub file: &'a SourceFile,
    pub params: &'a HashMap<&'static str, ParamValue>,
}

impl<'a> RuleContext<'a> {
    pub fn int(&self, name: &str) -> i64 {
        match self.params.get(name) {
            Some(ParamValue::Int(value)) => *value,
            _ => 0,
        }
    }

    pub fn bool(&self, name: &str) -> bool {
        matches!(self.params.get(name), Some(ParamValue::Bool(true)))
    }

    pub fn str(&self, name: &str) -> &str {
        match self.params.get(name) {
            Some(ParamValue::Str(value)) => value.as_str(),
            _ => "",
        }
    }

    pub fn regex(&self, name: &str) -> Option<&Regex> {
        match self.params.get(name) {
            Some(ParamValue::Regex(regex)) => Some(regex),
            _ => None,
        }
    }

    pub fn list(&self, name: &str) -> &[String] {
        match self.params.get(name) {
            Some(ParamValue::List(values)) => values.as_slice(),
            _ => &[],
        }
    }
}

pub(crate) fn no_findings(_: &RuleContext) -> Vec<Finding> {
    Vec::new()
}

// ============================================================================
// Public API
// ============================================================================

/// All built-in rules ordered by id
pub fn builtin_rules() -> Vec<&'static Rule> {
    let mut rules: Vec<&'static Rule> = [
        documentation::RULES,
        duplications::RULES,
        spacing::RULES,
        lengths::RULES,
        tags::RULES,
        naming::RULES,
        deprecated::RULES,
        misc::RULES,
    ]
    .into_iter()
    .flat_map(|group: &'static [Rule]| group.iter())
    .collect();
    rules.sort_by_key(|rule| rule.id);
    rules
}

pub fn find_rule(name: &str) -> Option<&'static Rule> {
    builtin_rules().into_iter().find(|rule| rule.matches(name))
}

/// Runs a single rule with its default parameters, used by rule unit tests.
#[cfg(test)]
pub(crate) fn run_rule(name: &str, path: &str, source: &str) -> Vec<Finding> {
    let rule = find_rule(name).expect("rule exists");
    let file = SourceFile::parse(path, source);
    let params = rule.default_params();
    (rule.check)(&RuleContext { file: &file, params: &params })
}

#[cfg(test)]
pub(crate) fn run_rule_with(name: &str, source: &str, overrides: &[(&str, &str)]) -> Vec<Finding> {
    let rule = find_rule(name).expect("rule exists");
    let file = SourceFile::parse("suite.robot", source);
    let mut params = rule.default_params();
    for (param, value) in overrides {
        let spec = rule.param(param).expect("param exists");
        params.insert(spec.name, ParamValue::parse(spec.kind, param, value).expect("valid value"));
    }
    (rule.check)(&RuleContext { file: &file, params: &params })
}
