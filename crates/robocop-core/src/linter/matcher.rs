//! Rule selection and parameter configuration
//!
//! A [`RuleSet`] is the per-configuration view of the built-in rules: each rule
//! gets its effective severity, parameters and enabled state. Selection follows
//! a fixed precedence, see [`RuleMatcher::is_enabled`].

use std::collections::HashMap;
use std::str::FromStr;

use super::reports::REPORT_NAMES;
use super::rules::{builtin_rules, find_rule, ParamValue, Rule};
use crate::config::LintConfig;
use crate::diagnostics::Severity;
use crate::errors::{did_you_mean, RobocopError, RobocopResult};
use crate::files::pattern::{is_glob, NamePattern};

/// `name.param=value` as given to `--configure`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configure {
    pub name: String,
    pub param: String,
    pub value: String,
}

impl FromStr for Configure {
    type Err = RobocopError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || RobocopError::InvalidConfigure(value.to_string());
        let (name, rest) = value.split_once('.').ok_or_else(invalid)?;
        let (param, param_value) = rest.split_once('=').ok_or_else(invalid)?;
        let (name, param) = (name.trim(), param.trim());
        if name.is_empty() || param.is_empty() {
            return Err(invalid());
        }
        Ok(Configure { name: name.to_string(), param: param.to_string(), value: param_value.trim().to_string() })
    }
}

fn unknown_rule(name: &str) -> RobocopError {
    let rules = builtin_rules();
    let candidates = rules.iter().map(|r| r.name);
    RobocopError::RuleDoesNotExist { name: name.to_string(), suggestion: did_you_mean(name, candidates) }
}

/// Rule name or id as written in `select`, `extend_select` or `ignore`
#[derive(Debug, Clone)]
enum RuleSelector {
    Exact(String),
    Pattern(NamePattern),
}

impl RuleSelector {
    fn parse(value: &str) -> RobocopResult<RuleSelector> {
        let value = value.trim();
        if is_glob(value) {
            return NamePattern::new(value).map(RuleSelector::Pattern);
        }
        match find_rule(value) {
            Some(rule) => Ok(RuleSelector::Exact(rule.name.to_string())),
            None => Err(unknown_rule(value)),
        }
    }

    fn matches(&self, rule: &Rule) -> bool {
        match self {
            RuleSelector::Exact(name) => rule.name == name,
            RuleSelector::Pattern(pattern) => {
                pattern.matches(rule.name) || pattern.matches(&rule.id.to_string())
            }
        }
    }
}

fn selectors(values: &[String]) -> RobocopResult<Vec<RuleSelector>> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .filter(|value| !value.trim().is_empty())
        .map(RuleSelector::parse)
        .collect()
}

pub struct RuleMatcher {
    select: Vec<RuleSelector>,
    extend_select: Vec<RuleSelector>,
    ignore: Vec<RuleSelector>,
    threshold: Severity,
}

impl RuleMatcher {
    pub fn new(config: &LintConfig) -> RobocopResult<RuleMatcher> {
        Ok(RuleMatcher {
            select: selectors(&config.select)?,
            extend_select: selectors(&config.extend_select)?,
            ignore: selectors(&config.ignore)?,
            threshold: config.threshold,
        })
    }

    /// Decides whether `rule` runs with the given configured `severity`.
    ///
    /// In order: deprecated rules never run, `ignore` wins over everything
    /// else, rules below the threshold are off, `select` and `extend_select`
    /// switch rules on, a non-empty `select` switches the rest off, and
    /// otherwise the rule's default applies.
    pub fn is_enabled(&self, rule: &Rule, severity: Severity) -> bool {
        if rule.deprecated {
            return false;
        }
        if self.ignore.iter().any(|s| s.matches(rule)) {
            return false;
        }
        if severity < self.threshold {
            return false;
        }
        if self.select.iter().chain(&self.extend_select).any(|s| s.matches(rule)) {
            return true;
        }
        if !self.select.is_empty() {
            return false;
        }
        rule.enabled
    }
}

/// Built-in rule with its effective configuration
pub struct ConfiguredRule {
    pub rule: &'static Rule,
    pub severity: Severity,
    pub enabled: bool,
    pub params: HashMap<&'static str, ParamValue>,
}

impl ConfiguredRule {
    fn new(rule: &'static Rule) -> Self {
        ConfiguredRule { rule, severity: rule.severity, enabled: rule.enabled, params: rule.default_params() }
    }

    fn configure(&mut self, param: &str, value: &str) -> RobocopResult<()> {
        if param == "severity" {
            self.severity =
                Severity::from_str(value).map_err(|_| RobocopError::InvalidSeverity(value.to_string()))?;
            return Ok(());
        }
        let Some(spec) = self.rule.param(param) else {
            let available = std::iter::once("severity")
                .chain(self.rule.params.iter().map(|p| p.name))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(RobocopError::InvalidParam {
                name: self.rule.name.to_string(),
                param: param.to_string(),
                available,
            });
        };
        self.params.insert(spec.name, ParamValue::parse(spec.kind, param, value)?);
        Ok(())
    }

    /// Current value of a parameter as text, for listings.
    pub fn param_value(&self, name: &str) -> String {
        match self.params.get(name) {
            Some(ParamValue::Int(v)) => v.to_string(),
            Some(ParamValue::Bool(v)) => v.to_string(),
            Some(ParamValue::Str(v)) => v.clone(),
            Some(ParamValue::Regex(v)) => v.as_str().to_string(),
            Some(ParamValue::List(v)) => v.join(","),
            None => String::new(),
        }
    }
}

/// Every built-in rule configured for one lint configuration
pub struct RuleSet {
    rules: Vec<ConfiguredRule>,
    pub threshold: Severity,
    /// `--configure` entries addressed to reports
    pub report_configure: Vec<Configure>,
    /// Messages for the user, e.g. about deprecated rules
    pub notices: Vec<String>,
}

impl RuleSet {
    pub fn from_config(config: &LintConfig) -> RobocopResult<RuleSet> {
        let mut rules: Vec<ConfiguredRule> = builtin_rules().into_iter().map(ConfiguredRule::new).collect();
        let mut report_configure = Vec::new();
        let mut notices = Vec::new();

        for raw in &config.configure {
            let configure: Configure = raw.parse()?;
            let target = rules.iter_mut().find(|c| {
                c.rule.matches(&configure.name) || c.rule.id.to_string() == configure.name.to_uppercase()
            });
            match target {
                Some(configured) if configured.rule.deprecated => notices.push(format!(
                    "Rule {} ({}) is deprecated and its configuration is ignored.",
                    configured.rule.id, configured.rule.name
                )),
                Some(configured) => configured.configure(&configure.param, &configure.value)?,
                None if REPORT_NAMES.contains(&configure.name.as_str()) => report_configure.push(configure),
                None => return Err(unknown_rule(&configure.name)),
            }
        }

        let matcher = RuleMatcher::new(config)?;
        for configured in &mut rules {
            configured.enabled = matcher.is_enabled(configured.rule, configured.severity);
        }
        for value in config.select.iter().chain(&config.extend_select) {
            if let Some(rule) = find_rule(value.trim()).filter(|r| r.deprecated) {
                notices.push(format!("Rule {} ({}) is deprecated and will not be run.", rule.id, rule.name));
            }
        }

        Ok(RuleSet { rules, threshold: config.threshold, report_configure, notices })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfiguredRule> {
        self.rules.iter()
    }

    pub fn enabled(&self) -> impl Iterator<Item = &ConfiguredRule> {
        self.rules.iter().filter(|c| c.enabled)
    }

    pub fn get(&self, name: &str) -> Option<&ConfiguredRule> {
        self.rules.iter().find(|c| c.rule.matches(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn lint(select: &[&str], ignore: &[&str], configure: &[&str]) -> LintConfig {
        LintConfig {
            select: select.iter().map(|s| s.to_string()).collect(),
            ignore: ignore.iter().map(|s| s.to_string()).collect(),
            configure: configure.iter().map(|s| s.to_string()).collect(),
            ..LintConfig::default()
        }
    }

    fn enabled(rules: &RuleSet, name: &str) -> bool {
        rules.get(name).map_or(false, |c| c.enabled)
    }

    #[test_case("line-too-long.line_length=100", "line-too-long", "line_length", "100")]
    #[test_case("LEN08.severity=E", "LEN08", "severity", "E")]
    #[test_case("rule.pattern=a=b", "rule", "pattern", "a=b" ; "value keeps equal signs")]
    fn parses_configure(value: &str, name: &str, param: &str, param_value: &str) {
        let configure: Configure = value.parse().unwrap();
        assert_eq!(configure, Configure { name: name.into(), param: param.into(), value: param_value.into() });
    }

    #[test_case("line-too-long" ; "missing dot")]
    #[test_case("line-too-long.line_length" ; "missing equal sign")]
    #[test_case(".param=1" ; "missing name")]
    fn rejects_malformed_configure(value: &str) {
        assert!(matches!(value.parse::<Configure>(), Err(RobocopError::InvalidConfigure(_))));
    }

    #[test]
    fn defaults_follow_rule_definitions() {
        let rules = RuleSet::from_config(&LintConfig::default()).unwrap();
        assert!(enabled(&rules, "missing-doc-keyword"));
        assert!(!enabled(&rules, "empty-variable"));
        assert!(!enabled(&rules, "uneven-indent"), "deprecated rules never run");
    }

    #[test]
    fn select_restricts_and_enables_disabled_rules() {
        let rules = RuleSet::from_config(&lint(&["empty-variable", "DOC01"], &[], &[])).unwrap();
        assert!(enabled(&rules, "empty-variable"));
        assert!(enabled(&rules, "missing-doc-keyword"));
        assert_eq!(rules.enabled().count(), 2);
    }

    #[test]
    fn ignore_wins_over_select() {
        let rules = RuleSet::from_config(&lint(&["DOC*"], &["DOC01"], &[])).unwrap();
        assert!(!enabled(&rules, "DOC01"));
        assert!(enabled(&rules, "DOC02"));
    }

    #[test]
    fn extend_select_adds_to_defaults() {
        let config = LintConfig { extend_select: vec!["empty-variable".into()], ..LintConfig::default() };
        let rules = RuleSet::from_config(&config).unwrap();
        assert!(enabled(&rules, "empty-variable"));
        assert!(enabled(&rules, "missing-doc-keyword"));
    }

    #[test]
    fn threshold_uses_configured_severity() {
        let config = LintConfig {
            threshold: Severity::Error,
            configure: vec!["line-too-long.severity=E".into()],
            ..LintConfig::default()
        };
        let rules = RuleSet::from_config(&config).unwrap();
        assert!(enabled(&rules, "line-too-long"));
        assert!(!enabled(&rules, "missing-doc-keyword"));
    }

    #[test]
    fn configures_rule_params() {
        let rules = RuleSet::from_config(&lint(&[], &[], &["LEN08.line_length=80"])).unwrap();
        assert_eq!(rules.get("line-too-long").unwrap().param_value("line_length"), "80");
    }

    #[test]
    fn unknown_rule_suggests_name() {
        let err = RuleSet::from_config(&lint(&["line-too-lon"], &[], &[])).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Provided rule 'line-too-lon' does not exist. Did you mean: 'line-too-long'?"
        );
    }

    #[test]
    fn unknown_param_lists_available() {
        let err = RuleSet::from_config(&lint(&[], &[], &["line-too-long.max=1"])).err().unwrap();
        let message = err.to_string();
        assert!(message.contains("Available configurable(s): severity, line_length"), "{}", message);
    }

    #[test]
    fn invalid_param_value_names_type() {
        let err = RuleSet::from_config(&lint(&[], &[], &["line-too-long.line_length=long"])).err().unwrap();
        assert!(err.to_string().ends_with("Parameter type: int"));
    }

    #[test]
    fn report_configure_is_forwarded() {
        let rules = RuleSet::from_config(&lint(&[], &[], &["return_status.quality_gates=E=0"])).unwrap();
        assert_eq!(rules.report_configure.len(), 1);
        assert_eq!(rules.report_configure[0].value, "E=0");
    }

    #[test]
    fn configuring_deprecated_rule_is_a_notice() {
        let rules = RuleSet::from_config(&lint(&[], &[], &["uneven-indent.severity=E"])).unwrap();
        assert_eq!(rules.notices.len(), 1);
        assert!(!enabled(&rules, "uneven-indent"));
    }
}
