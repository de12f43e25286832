//! TAG: test and keyword tags

use std::collections::{BTreeSet, HashMap};

use super::{Finding, Rule, RuleContext};
use crate::diagnostics::Severity;
use crate::linter::rule_id::{RuleGroup, RuleId};
use crate::model::names::normalize_robot_name;
use crate::model::{Cell, Statement};

const fn tag(number: u8) -> RuleId {
    RuleId::new(RuleGroup::Tag, number)
}

const RESERVED_TAGS: &[&str] = &[
    "robot:exit",
    "robot:flatten",
    "robot:no-dry-run",
    "robot:continue-on-failure",
    "robot:recursive-continue-on-failure",
    "robot:stop-on-failure",
    "robot:recursive-stop-on-failure",
    "robot:exclude",
    "robot:private",
    "robot:skip",
    "robot:skip-on-failure",
];

const SUITE_TAG_SETTINGS: &[&str] = &["testtags", "forcetags", "tasktags", "defaulttags", "keywordtags"];

pub static RULES: &[Rule] = &[
    Rule {
        id: tag(1),
        name: "tag-with-space",
        message: "Tag '{tag}' should not contain spaces",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Tags with spaces are hard to select from the command line.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_tag_with_space,
    },
    Rule {
        id: tag(2),
        name: "tag-with-or-and",
        message: "Tag '{tag}' with reserved word OR/AND. Hint: make sure to include this tag using lowercase name to avoid issues",
        severity: Severity::Info,
        enabled: true,
        deprecated: false,
        docs: "OR and AND are operators in tag patterns given on the command line.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_tag_with_or_and,
    },
    Rule {
        id: tag(3),
        name: "tag-with-reserved-word",
        message: "Tag '{tag}' prefixed with reserved word `robot:`",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "The robot: prefix is reserved for tags with special meaning in Robot Framework.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_tag_with_reserved_word,
    },
    Rule {
        id: tag(4),
        name: "duplicated-tags",
        message: "Multiple tags with name '{name}' (first occurrence at line {line} column {column})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "The same tag is repeated in one setting. Tags are compared case-insensitively \
               with spaces ignored.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_duplicated_tags,
    },
    Rule {
        id: tag(5),
        name: "empty-tags",
        message: "[Tags] setting without values",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "[Tags] setting without any tag. Remove it or add values.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_empty_tags,
    },
    Rule {
        id: tag(6),
        name: "could-be-test-tags",
        message: "All tests in suite share these tags: '{tags}'. You can define them in 'Test Tags' in suite settings instead",
        severity: Severity::Info,
        enabled: true,
        deprecated: false,
        docs: "Every test case of the suite sets the same tags. Move them to Test Tags.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_could_be_test_tags,
    },
    Rule {
        id: tag(7),
        name: "tag-already-set-in-test-tags",
        message: "Tag '{tag}' is already set by {test_force_tags} in suite settings",
        severity: Severity::Info,
        enabled: true,
        deprecated: false,
        docs: "The tag is set for every test by Test Tags, repeating it in [Tags] has no effect.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_tag_already_set_in_test_tags,
    },
];

/// Every statement that sets tags: suite tag settings and `[Tags]`.
fn tag_statements<'a>(ctx: &'a RuleContext) -> Vec<&'a Statement> {
    let suite = ctx
        .file
        .settings()
        .filter(|s| SUITE_TAG_SETTINGS.contains(&s.normalized_setting_name().as_str()));
    let blocks = ctx
        .file
        .tests()
        .chain(ctx.file.keywords())
        .flat_map(|block| block.statements.iter())
        .filter(|s| s.is_setting("tags"));
    suite.chain(blocks).collect()
}

/// Tags with the line they were written on, continuation lines included.
fn tag_cells<'a>(ctx: &'a RuleContext) -> Vec<(usize, &'a Cell)> {
    let mut cells = Vec::new();
    for statement in tag_statements(ctx) {
        for cell in &statement.args {
            cells.push((line_of(ctx, statement, cell), cell));
        }
    }
    cells
}

/// Resolves which physical line of a multi-line statement holds the cell.
fn line_of(ctx: &RuleContext, statement: &Statement, cell: &Cell) -> usize {
    (statement.line..=statement.end_line)
        .find(|n| ctx.file.line(*n).map_or(false, |line| line.cells.iter().any(|c| c == cell)))
        .unwrap_or(statement.line)
}

fn check_tag_with_space(ctx: &RuleContext) -> Vec<Finding> {
    tag_cells(ctx)
        .into_iter()
        .filter(|(_, cell)| cell.value.contains(' ') && !cell.value.contains("${"))
        .map(|(line, cell)| Finding::at_cell(line, cell).with("tag", &cell.value))
        .collect()
}

fn check_tag_with_or_and(ctx: &RuleContext) -> Vec<Finding> {
    tag_cells(ctx)
        .into_iter()
        .filter(|(_, cell)| cell.value.split(' ').any(|word| word == "OR" || word == "AND"))
        .map(|(line, cell)| Finding::at_cell(line, cell).with("tag", &cell.value))
        .collect()
}

fn check_tag_with_reserved_word(ctx: &RuleContext) -> Vec<Finding> {
    tag_cells(ctx)
        .into_iter()
        .filter(|(_, cell)| {
            let lower = cell.value.to_lowercase();
            lower.starts_with("robot:") && !RESERVED_TAGS.contains(&lower.as_str())
        })
        .map(|(line, cell)| Finding::at_cell(line, cell).with("tag", &cell.value))
        .collect()
}

fn check_duplicated_tags(ctx: &RuleContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for statement in tag_statements(ctx) {
        let mut seen: HashMap<String, (usize, usize)> = HashMap::new();
        for cell in &statement.args {
            let line = line_of(ctx, statement, cell);
            match seen.get(&normalize_robot_name(&cell.value)) {
                Some((first_line, first_column)) => findings.push(
                    Finding::at_cell(line, cell)
                        .with("name", &cell.value)
                        .with("line", first_line)
                        .with("column", first_column),
                ),
                None => {
                    seen.insert(normalize_robot_name(&cell.value), (line, cell.column));
                }
            }
        }
    }
    findings
}

fn check_empty_tags(ctx: &RuleContext) -> Vec<Finding> {
    ctx.file
        .tests()
        .chain(ctx.file.keywords())
        .flat_map(|block| block.statements.iter())
        .filter(|s| s.is_setting("tags") && s.args.is_empty())
        .map(Finding::at_statement)
        .collect()
}

fn check_could_be_test_tags(ctx: &RuleContext) -> Vec<Finding> {
    let tests: Vec<_> = ctx.file.tests().collect();
    if tests.len() < 2 {
        return Vec::new();
    }
    let mut common: Option<BTreeSet<String>> = None;
    for test in &tests {
        let tags: BTreeSet<String> = test
            .setting("tags")
            .map(|s| s.args.iter().map(|c| c.value.clone()).collect())
            .unwrap_or_default();
        common = Some(match common {
            Some(previous) => previous.intersection(&tags).cloned().collect(),
            None => tags,
        });
    }
    let common = common.unwrap_or_default();
    if common.is_empty() {
        return Vec::new();
    }
    let section = ctx.file.sections.iter().find(|s| s.kind.is_test_like());
    let Some((header, line)) = section.and_then(|s| Some((s.header.as_ref()?, s.header_line?))) else {
        return Vec::new();
    };
    let tags = common.into_iter().collect::<Vec<_>>().join(", ");
    vec![Finding::at_cell(line, header).with("tags", tags)]
}

fn check_tag_already_set_in_test_tags(ctx: &RuleContext) -> Vec<Finding> {
    let suite_tags: Vec<(String, String)> = ctx
        .file
        .settings()
        .filter(|s| matches!(s.normalized_setting_name().as_str(), "testtags" | "forcetags" | "tasktags"))
        .flat_map(|s| s.args.iter().map(move |c| (normalize_robot_name(&c.value), s.name.value.clone())))
        .collect();
    if suite_tags.is_empty() {
        return Vec::new();
    }
    let mut findings = Vec::new();
    for test in ctx.file.tests() {
        let Some(tags) = test.setting("tags") else { continue };
        for cell in &tags.args {
            let normalized = normalize_robot_name(&cell.value);
            if let Some((_, setting)) = suite_tags.iter().find(|(tag, _)| *tag == normalized) {
                let line = line_of(ctx, tags, cell);
                findings.push(
                    Finding::at_cell(line, cell).with("tag", &cell.value).with("test_force_tags", setting),
                );
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::super::run_rule;

    const SUITE: &str = "\
*** Settings ***
Test Tags    suite    robot:unknown

*** Test Cases ***
First
    [Tags]    smoke    my tag    a OR b    Smoke
    No Operation

Second
    [Tags]    smoke    SUITE
    ...    robot:skip
    No Operation

Third
    [Tags]
    No Operation
";

    fn lines(findings: &[super::Finding]) -> Vec<usize> {
        findings.iter().map(|f| f.line).collect()
    }

    #[test]
    fn checks_tag_contents() {
        assert_eq!(lines(&run_rule("tag-with-space", "a.robot", SUITE)), vec![6, 6]);
        assert_eq!(lines(&run_rule("tag-with-or-and", "a.robot", SUITE)), vec![6]);
        let reserved = run_rule("tag-with-reserved-word", "a.robot", SUITE);
        assert_eq!(lines(&reserved), vec![2]);
    }

    #[test]
    fn reports_duplicated_and_empty_tags() {
        let duplicated = run_rule("duplicated-tags", "a.robot", SUITE);
        assert_eq!(lines(&duplicated), vec![6]);
        assert_eq!(duplicated[0].render("{name} {line}:{column}"), "Smoke 6:15");
        assert_eq!(lines(&run_rule("empty-tags", "a.robot", SUITE)), vec![15]);
    }

    #[test]
    fn reports_tags_repeated_from_test_tags() {
        let findings = run_rule("tag-already-set-in-test-tags", "a.robot", SUITE);
        assert_eq!(lines(&findings), vec![10]);
        assert_eq!(findings[0].render("{tag} {test_force_tags}"), "SUITE Test Tags");
    }

    #[test]
    fn suggests_test_tags_for_shared_tags() {
        let source = "*** Test Cases ***\nA\n    [Tags]    smoke    a\n    Log  1\nB\n    [Tags]    b    smoke\n    Log  2\n";
        let findings = run_rule("could-be-test-tags", "a.robot", source);
        assert_eq!(lines(&findings), vec![1]);
        assert_eq!(findings[0].render("{tags}"), "smoke");
        assert!(run_rule("could-be-test-tags", "a.robot", SUITE).is_empty());
    }
}
