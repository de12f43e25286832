//! DEPR: deprecated Robot Framework syntax

use super::{Finding, Rule, RuleContext};
use crate::diagnostics::Severity;
use crate::linter::rule_id::{RuleGroup, RuleId};
use crate::model::names::normalize_robot_name;
use crate::model::StatementKind;

pub static RULES: &[Rule] = &[
    Rule {
        id: RuleId::new(RuleGroup::Depr, 1),
        name: "deprecated-statement",
        message: "'{statement_name}' is deprecated since Robot Framework version {version}, use '{alternative}' instead",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Statement, setting or keyword that is deprecated and will be removed in a future \
               Robot Framework version.",
        params: &[],
        added_in_version: "2.0.0",
        check: check_deprecated_statement,
    },
    Rule {
        id: RuleId::new(RuleGroup::Depr, 2),
        name: "deprecated-with-name",
        message: "'WITH NAME' alias marker is deprecated since Robot Framework 6.0 version, use 'AS' instead",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Library aliases are given with AS.",
        params: &[],
        added_in_version: "2.5.0",
        check: check_deprecated_with_name,
    },
];

/// Normalized keyword name, replacement and version it was deprecated in.
const DEPRECATED_KEYWORDS: &[(&str, &str, &str)] = &[
    ("runkeywordunless", "IF", "5.0"),
    ("returnfromkeyword", "RETURN", "5.0"),
    ("returnfromkeywordif", "IF and RETURN", "5.0"),
    ("exitforloop", "BREAK", "5.0"),
    ("exitforloopif", "IF and BREAK", "5.0"),
    ("continueforloop", "CONTINUE", "5.0"),
    ("continueforloopif", "IF and CONTINUE", "5.0"),
];

fn check_deprecated_statement(ctx: &RuleContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    let deprecated = |statement_name: &str, alternative: &str, version: &str, finding: Finding| {
        finding
            .with("statement_name", statement_name)
            .with("alternative", alternative)
            .with("version", version)
    };

    for setting in ctx.file.settings() {
        if setting.normalized_setting_name() == "forcetags" {
            findings.push(deprecated(&setting.name.value, "Test Tags", "6.0", Finding::at_statement(setting)));
        }
    }
    for block in ctx.file.tests().chain(ctx.file.keywords()) {
        for statement in &block.statements {
            match statement.kind {
                StatementKind::BlockSetting if statement.normalized_setting_name() == "return" => {
                    findings.push(deprecated("[Return]", "RETURN", "5.0", Finding::at_statement(statement)));
                }
                StatementKind::KeywordCall => {
                    let normalized = normalize_robot_name(&statement.name.value);
                    if let Some((_, alternative, version)) =
                        DEPRECATED_KEYWORDS.iter().find(|(name, _, _)| *name == normalized)
                    {
                        findings.push(deprecated(
                            &statement.name.value,
                            alternative,
                            version,
                            Finding::at_statement(statement),
                        ));
                    }
                }
                _ => {}
            }
        }
    }
    findings
}

fn check_deprecated_with_name(ctx: &RuleContext) -> Vec<Finding> {
    ctx.file
        .settings()
        .filter(|s| s.normalized_setting_name() == "library")
        .filter_map(|s| s.args.iter().find(|c| c.value == "WITH NAME").map(|c| (s, c)))
        .map(|(s, cell)| {
            let line = (s.line..=s.end_line)
                .find(|n| ctx.file.line(*n).map_or(false, |l| l.cells.contains(cell)))
                .unwrap_or(s.line);
            Finding::at_cell(line, cell)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::run_rule;

    #[test]
    fn reports_deprecated_settings_and_keywords() {
        let source = "\
*** Settings ***
Force Tags    a
Library    Lib    WITH NAME    Other

*** Keywords ***
Kw
    [Return]    1
    Run Keyword Unless    ${cond}    Log    x
    Exit For Loop
";
        let findings = run_rule("deprecated-statement", "a.robot", source);
        let messages: Vec<_> = findings
            .iter()
            .map(|f| f.render("{statement_name}->{alternative}@{version}"))
            .collect();
        assert_eq!(
            messages,
            vec!["Force Tags->Test Tags@6.0", "[Return]->RETURN@5.0", "Run Keyword Unless->IF@5.0", "Exit For Loop->BREAK@5.0"]
        );
        let with_name = run_rule("deprecated-with-name", "a.robot", source);
        assert_eq!(with_name.len(), 1);
        assert_eq!((with_name[0].line, with_name[0].column), (3, 19));
    }
}
