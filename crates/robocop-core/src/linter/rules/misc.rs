//! MISC: other code quality checks

use super::{Finding, Rule, RuleContext};
use crate::diagnostics::Severity;
use crate::linter::rule_id::{RuleGroup, RuleId};
use crate::model::names::normalize_robot_name;
use crate::model::{Statement, StatementKind};

const fn misc(number: u8) -> RuleId {
    RuleId::new(RuleGroup::Misc, number)
}

pub static RULES: &[Rule] = &[
    Rule {
        id: misc(1),
        name: "keyword-after-return",
        message: "Keyword call after '{return_statement}' statement",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Statements after a top-level RETURN are never executed.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_keyword_after_return,
    },
    Rule {
        id: misc(2),
        name: "empty-return",
        message: "[Return] is empty",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "[Return] setting without values. Remove it.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_empty_return,
    },
    Rule {
        id: misc(3),
        name: "inconsistent-assignment",
        message: "The assignment sign is not consistent within the file. Expected '{expected_sign}' but got '{actual_sign}' instead",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Variable assignments should use one style in the whole file: `${var}=`, `${var} =` \
               or no sign at all. The first assignment sets the expected style.",
        params: &[],
        added_in_version: "1.7.0",
        check: check_inconsistent_assignment,
    },
    Rule {
        id: misc(4),
        name: "empty-variable",
        message: "Variable '{var_name}' is assigned with empty value",
        severity: Severity::Info,
        enabled: false,
        deprecated: false,
        docs: "Variable in the Variables section without a value. Use ${EMPTY} to make the \
               intent explicit.",
        params: &[],
        added_in_version: "1.10.0",
        check: check_empty_variable,
    },
];

fn returns_from_keyword(statement: &Statement) -> Option<&str> {
    match statement.kind {
        StatementKind::Control if statement.name.value == "RETURN" => Some("RETURN"),
        StatementKind::KeywordCall if normalize_robot_name(&statement.name.value) == "returnfromkeyword" => {
            Some(statement.name.value.as_str())
        }
        _ => None,
    }
}

fn check_keyword_after_return(ctx: &RuleContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for block in ctx.file.keywords() {
        let mut returned: Option<&str> = None;
        for statement in block.statements.iter().filter(|s| s.depth == 0) {
            if let Some(return_statement) = returned {
                let reachable = statement.kind == StatementKind::BlockSetting;
                if !reachable {
                    findings.push(Finding::at_statement(statement).with("return_statement", return_statement));
                }
                continue;
            }
            returned = returns_from_keyword(statement);
        }
    }
    findings
}

fn check_empty_return(ctx: &RuleContext) -> Vec<Finding> {
    ctx.file
        .keywords()
        .flat_map(|block| block.statements.iter())
        .filter(|s| s.is_setting("return") && s.args.is_empty())
        .map(Finding::at_statement)
        .collect()
}

fn assignment_sign(value: &str) -> &'static str {
    if value.ends_with(" =") {
        " ="
    } else if value.ends_with('=') {
        "="
    } else {
        ""
    }
}

fn check_inconsistent_assignment(ctx: &RuleContext) -> Vec<Finding> {
    let mut expected: Option<&'static str> = None;
    let mut findings = Vec::new();
    let calls = ctx
        .file
        .tests()
        .chain(ctx.file.keywords())
        .flat_map(|block| block.statements.iter())
        .filter(|s| s.kind == StatementKind::KeywordCall);
    for call in calls {
        let Some(last) = call.assign.last() else { continue };
        let sign = assignment_sign(&last.value);
        match expected {
            None => expected = Some(sign),
            Some(expected_sign) if expected_sign != sign => findings.push(
                Finding::at_cell(call.line, last)
                    .with("expected_sign", expected_sign)
                    .with("actual_sign", sign),
            ),
            Some(_) => {}
        }
    }
    findings
}

fn check_empty_variable(ctx: &RuleContext) -> Vec<Finding> {
    ctx.file
        .variables()
        .filter(|var| var.args.is_empty())
        .map(|var| {
            let name = var.name.value.trim_end_matches('=').trim_end().to_string();
            Finding::at_cell(var.line, &var.name).with("var_name", name)
        })
        .collect()
}
