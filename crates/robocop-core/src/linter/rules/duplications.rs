//! DUP: duplicated definitions, imports, settings and sections

use std::collections::{HashMap, HashSet};

use super::{Finding, ParamKind, Rule, RuleContext, RuleParam};
use crate::diagnostics::Severity;
use crate::linter::rule_id::{RuleGroup, RuleId};
use crate::model::names::{normalize_robot_name, normalize_robot_var_name};
use crate::model::{Cell, SectionKind, Statement, StatementKind};

const DEFAULT_SECTIONS_ORDER: &str = "settings,variables,testcases,keywords";

const fn dup(number: u8) -> RuleId {
    RuleId::new(RuleGroup::Dup, number)
}

pub static RULES: &[Rule] = &[
    Rule {
        id: dup(1),
        name: "duplicated-test-case",
        message: "Multiple test cases with name '{name}' (first occurrence in line {first_occurrence_line})",
        severity: Severity::Error,
        enabled: true,
        deprecated: false,
        docs: "Test case names should be unique. Names are compared case-insensitively with \
               spaces and underscores ignored.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_duplicated_test_case,
    },
    Rule {
        id: dup(2),
        name: "duplicated-keyword",
        message: "Multiple keywords with name '{name}' (first occurrence in line {first_occurrence_line})",
        severity: Severity::Error,
        enabled: true,
        deprecated: false,
        docs: "Keyword names in one file should be unique. Robot Framework raises an error when \
               a duplicated keyword is called.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_duplicated_keyword,
    },
    Rule {
        id: dup(3),
        name: "duplicated-variable",
        message: "Multiple variables with name '{name}' in Variables section (first occurrence in line \
                  {first_occurrence_line}). Note that Robot Framework is case-insensitive",
        severity: Severity::Error,
        enabled: true,
        deprecated: false,
        docs: "Variable names in the Variables section should be unique. Only the last value is used.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_duplicated_variable,
    },
    Rule {
        id: dup(4),
        name: "duplicated-resource",
        message: "Multiple resource imports with path '{name}' (first occurrence in line {first_occurrence_line})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "The same resource file is imported more than once.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_duplicated_resource,
    },
    Rule {
        id: dup(5),
        name: "duplicated-library",
        message: "Multiple library imports with name '{name}' and identical arguments (first occurrence in line \
                  {first_occurrence_line})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "The same library is imported twice with identical arguments. Use an alias with AS \
               to import a library more than once.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_duplicated_library,
    },
    Rule {
        id: dup(6),
        name: "duplicated-metadata",
        message: "Duplicated metadata '{name}' (first occurrence in line {first_occurrence_line})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "The same metadata entry is defined more than once.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_duplicated_metadata,
    },
    Rule {
        id: dup(7),
        name: "duplicated-variables-import",
        message: "Duplicated variables import with path '{name}' (first occurrence in line {first_occurrence_line})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "The same variables file is imported more than once with identical arguments.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_duplicated_variables_import,
    },
    Rule {
        id: dup(8),
        name: "section-already-defined",
        message: "'{section_name}' section header already defined in file (first occurrence in line \
                  {first_occurrence_line})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "A section of the same type is defined twice. Merge both sections into one.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_section_already_defined,
    },
    Rule {
        id: dup(9),
        name: "section-out-of-order",
        message: "'{section_name}' section header is defined in wrong order: {recommended_order}",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Sections should follow the order given by sections_order. Section names are \
               comments, settings, variables, testcases and keywords. Order of sections that are \
               not listed is ignored.",
        params: &[RuleParam {
            name: "sections_order",
            default: DEFAULT_SECTIONS_ORDER,
            kind: ParamKind::List,
            description: "order of sections in comma-separated list",
        }],
        added_in_version: "1.0.0",
        check: check_section_out_of_order,
    },
    Rule {
        id: dup(10),
        name: "both-tests-and-tasks",
        message: "Both Task(s) and Test Case(s) section headers defined in file",
        severity: Severity::Error,
        enabled: true,
        deprecated: false,
        docs: "The file contains both Test Cases and Tasks sections. Use only one of them.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_both_tests_and_tasks,
    },
    Rule {
        id: dup(11),
        name: "duplicated-argument-name",
        message: "Argument name '{argument_name}' is already used",
        severity: Severity::Error,
        enabled: true,
        deprecated: false,
        docs: "Keyword arguments should have unique names. Default values are not compared.",
        params: &[],
        added_in_version: "1.11.0",
        check: check_duplicated_argument_name,
    },
    Rule {
        id: dup(12),
        name: "duplicated-assigned-var-name",
        message: "Assigned variable name '{variable_name}' is already used",
        severity: Severity::Info,
        enabled: true,
        deprecated: false,
        docs: "The same variable is assigned twice from one keyword call. Use ${_} for values \
               that are not needed.",
        params: &[],
        added_in_version: "1.12.0",
        check: check_duplicated_assigned_var_name,
    },
    Rule {
        id: dup(13),
        name: "duplicated-setting",
        message: "Setting '{setting_name}' is allowed only once. Only the first value is used.",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Some settings can be used only once in the Settings section or in a test case or \
               keyword body.",
        params: &[],
        added_in_version: "2.0.0",
        check: check_duplicated_setting,
    },
];

/// Suite settings that may only appear once, normalized.
const SINGLE_SUITE_SETTINGS: &[&str] = &[
    "documentation",
    "suitesetup",
    "suiteteardown",
    "testsetup",
    "testteardown",
    "testtemplate",
    "testtimeout",
    "tasksetup",
    "taskteardown",
    "tasktemplate",
    "tasktimeout",
    "testtags",
    "forcetags",
    "tasktags",
    "defaulttags",
    "keywordtags",
];

/// Groups items by key and reports every occurrence after the first.
fn report_duplicates<'a, I>(items: I) -> Vec<Finding>
where
    I: IntoIterator<Item = (String, usize, &'a Cell, String)>,
{
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut findings = Vec::new();
    for (key, line, cell, display) in items {
        match first_seen.get(&key) {
            Some(first) => findings.push(
                Finding::at_cell(line, cell)
                    .with("name", display)
                    .with("first_occurrence_line", first),
            ),
            None => {
                first_seen.insert(key, line);
            }
        }
    }
    findings
}

fn check_duplicated_test_case(ctx: &RuleContext) -> Vec<Finding> {
    report_duplicates(ctx.file.tests().map(|block| {
        (normalize_robot_name(&block.name.value), block.line, &block.name, block.name.value.clone())
    }))
}

fn check_duplicated_keyword(ctx: &RuleContext) -> Vec<Finding> {
    report_duplicates(ctx.file.keywords().map(|block| {
        (normalize_robot_name(&block.name.value), block.line, &block.name, block.name.value.clone())
    }))
}

fn check_duplicated_variable(ctx: &RuleContext) -> Vec<Finding> {
    report_duplicates(
        ctx.file
            .variables()
            .filter(|var| !normalize_robot_var_name(&var.name.value).is_empty())
            .map(|var| {
                let display = var.name.value.trim_end_matches('=').trim_end().to_string();
                (normalize_robot_var_name(&var.name.value), var.line, &var.name, display)
            }),
    )
}

fn imports<'a>(ctx: &'a RuleContext, setting: &'a str) -> impl Iterator<Item = &'a Statement> {
    ctx.file.settings().filter(move |s| s.normalized_setting_name() == setting && !s.args.is_empty())
}

fn check_duplicated_resource(ctx: &RuleContext) -> Vec<Finding> {
    report_duplicates(imports(ctx, "resource").map(|import| {
        let path = &import.args[0];
        (path.value.clone(), import.line, &import.name, path.value.clone())
    }))
}

fn check_duplicated_library(ctx: &RuleContext) -> Vec<Finding> {
    report_duplicates(imports(ctx, "library").map(|import| {
        let values = import.arg_values();
        let alias_at = values.iter().position(|v| *v == "AS" || *v == "WITH NAME");
        let (name, arguments): (&str, &[&str]) = match alias_at {
            Some(index) => (
                values.get(index + 1).copied().unwrap_or(values[0]),
                values.get(1..index).unwrap_or_default(),
            ),
            None => (values[0], &values[1..]),
        };
        let key = format!("{}{}", name, arguments.concat());
        (key, import.line, &import.args[0], name.to_string())
    }))
}

fn check_duplicated_metadata(ctx: &RuleContext) -> Vec<Finding> {
    report_duplicates(imports(ctx, "metadata").map(|metadata| {
        let name = &metadata.args[0];
        let key = format!("{}{}", name.value, metadata.arg_values()[1..].join(" "));
        (key, metadata.line, &metadata.name, name.value.clone())
    }))
}

fn check_duplicated_variables_import(ctx: &RuleContext) -> Vec<Finding> {
    report_duplicates(
        imports(ctx, "variables")
            .filter(|import| {
                let path = &import.args[0].value;
                // YAML variable files take no arguments
                !((path.ends_with(".yaml") || path.ends_with(".yml")) && import.args.len() > 1)
            })
            .map(|import| {
                let key = import.arg_values().concat();
                (key, import.line, &import.name, import.args[0].value.clone())
            }),
    )
}

/// Section kind used for order checks, tasks share the test cases slot.
fn order_key(kind: SectionKind) -> Option<&'static str> {
    match kind {
        SectionKind::Settings => Some("settings"),
        SectionKind::Variables => Some("variables"),
        SectionKind::TestCases | SectionKind::Tasks => Some("testcases"),
        SectionKind::Keywords => Some("keywords"),
        SectionKind::Comments => Some("comments"),
        SectionKind::Implicit | SectionKind::Invalid => None,
    }
}

fn check_section_already_defined(ctx: &RuleContext) -> Vec<Finding> {
    let mut seen: HashMap<SectionKind, usize> = HashMap::new();
    let mut findings = Vec::new();
    for section in &ctx.file.sections {
        let (Some(header), Some(line)) = (&section.header, section.header_line) else { continue };
        // only sections with a place in the default order are tracked
        let Some(key) = order_key(section.kind) else { continue };
        if !DEFAULT_SECTIONS_ORDER.split(',').any(|k| k == key) {
            continue;
        }
        match seen.get(&section.kind) {
            Some(first) => findings.push(
                Finding::at_cell(line, header)
                    .with("section_name", &header.value)
                    .with("first_occurrence_line", first),
            ),
            None => {
                seen.insert(section.kind, line);
            }
        }
    }
    findings
}

fn recommended_order(order: &[String]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for key in order {
        let name = match key.as_str() {
            "settings" => "Settings",
            "variables" => "Variables",
            "testcases" => "Test Cases / Tasks",
            "keywords" => "Keywords",
            "comments" => "Comments",
            _ => continue,
        };
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names.join(" > ")
}

fn check_section_out_of_order(ctx: &RuleContext) -> Vec<Finding> {
    let order: Vec<String> = ctx.list("sections_order").iter().map(|s| s.to_lowercase()).collect();
    let mut previous: Vec<usize> = Vec::new();
    let mut findings = Vec::new();
    for section in &ctx.file.sections {
        let (Some(header), Some(line)) = (&section.header, section.header_line) else { continue };
        let Some(key) = order_key(section.kind) else { continue };
        let Some(index) = order.iter().position(|k| k == key) else { continue };
        if previous.iter().any(|p| *p > index) {
            findings.push(
                Finding::at_cell(line, header)
                    .with("section_name", &header.value)
                    .with("recommended_order", recommended_order(&order)),
            );
        }
        previous.push(index);
    }
    findings
}

fn check_both_tests_and_tasks(ctx: &RuleContext) -> Vec<Finding> {
    let mut seen_tests = false;
    let mut seen_tasks = false;
    let mut findings = Vec::new();
    for section in &ctx.file.sections {
        let (Some(header), Some(line)) = (&section.header, section.header_line) else { continue };
        match section.kind {
            SectionKind::TestCases => {
                if seen_tasks {
                    findings.push(Finding::at_cell(line, header));
                }
                seen_tests = true;
            }
            SectionKind::Tasks => {
                if seen_tests {
                    findings.push(Finding::at_cell(line, header));
                }
                seen_tasks = true;
            }
            _ => {}
        }
    }
    findings
}

fn all_blocks<'a>(ctx: &'a RuleContext) -> impl Iterator<Item = &'a crate::model::Block> {
    ctx.file.tests().chain(ctx.file.keywords())
}

fn check_duplicated_argument_name(ctx: &RuleContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for block in ctx.file.keywords() {
        for arguments in block.statements.iter().filter(|s| s.is_setting("arguments")) {
            let mut seen = HashSet::new();
            for arg in &arguments.args {
                let original = arg.value.split('=').next().unwrap_or_default();
                if !seen.insert(normalize_robot_var_name(original)) {
                    let cell = Cell::new(original, arg.column);
                    findings.push(Finding::at_cell(arguments.line, &cell).with("argument_name", original));
                }
            }
        }
    }
    findings
}

fn check_duplicated_assigned_var_name(ctx: &RuleContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for block in all_blocks(ctx) {
        for call in block.statements.iter().filter(|s| s.kind == StatementKind::KeywordCall) {
            let mut seen = HashSet::new();
            for var in &call.assign {
                let name = var.value.split('=').next().unwrap_or_default().trim_end();
                let normalized = normalize_robot_var_name(name);
                if normalized.is_empty() {
                    continue;
                }
                if !seen.insert(normalized) {
                    findings.push(Finding::at_cell(call.line, var).with("variable_name", name));
                }
            }
        }
    }
    findings
}

fn check_duplicated_setting(ctx: &RuleContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen = HashSet::new();
    for setting in ctx.file.settings() {
        let normalized = setting.normalized_setting_name();
        if SINGLE_SUITE_SETTINGS.contains(&normalized.as_str()) && !seen.insert(normalized) {
            findings.push(Finding::at_statement(setting).with("setting_name", &setting.name.value));
        }
    }
    for block in all_blocks(ctx) {
        let mut seen = HashSet::new();
        for setting in block.statements.iter().filter(|s| s.kind == StatementKind::BlockSetting) {
            if !seen.insert(setting.normalized_setting_name()) {
                findings.push(Finding::at_statement(setting).with("setting_name", &setting.name.value));
            }
        }
    }
    findings
}
