//! LEN: sizes of keywords, test cases, lines and files

use super::{Finding, ParamKind, Rule, RuleContext, RuleParam};
use crate::diagnostics::Severity;
use crate::linter::rule_id::{RuleGroup, RuleId};
use crate::model::names::normalize_robot_name;
use crate::model::{Block, SectionKind, SourceFile, StatementKind};

const fn len(number: u8) -> RuleId {
    RuleId::new(RuleGroup::Len, number)
}

const fn int_param(name: &'static str, default: &'static str, description: &'static str) -> RuleParam {
    RuleParam { name, default, kind: ParamKind::Int, description }
}

pub static RULES: &[Rule] = &[
    Rule {
        id: len(1),
        name: "too-long-keyword",
        message: "Keyword '{keyword_name}' is too long ({keyword_length}/{allowed_length})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Keyword body has more lines than allowed. Empty lines and comments are not counted.",
        params: &[int_param("max_len", "40", "number of lines allowed in a keyword")],
        added_in_version: "1.0.0",
        check: check_too_long_keyword,
    },
    Rule {
        id: len(2),
        name: "too-few-calls-in-keyword",
        message: "Keyword '{keyword_name}' has too few keywords inside ({keyword_count}/{min_allowed_count})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Keyword calls too few other keywords. Consider inlining it.",
        params: &[int_param("min_calls", "1", "number of keyword calls required in a keyword")],
        added_in_version: "1.0.0",
        check: check_too_few_calls_in_keyword,
    },
    Rule {
        id: len(3),
        name: "too-many-calls-in-keyword",
        message: "Keyword '{keyword_name}' has too many keywords inside ({keyword_count}/{max_allowed_count})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Keyword calls too many other keywords. Consider splitting it.",
        params: &[int_param("max_calls", "10", "number of keyword calls allowed in a keyword")],
        added_in_version: "1.0.0",
        check: check_too_many_calls_in_keyword,
    },
    Rule {
        id: len(4),
        name: "too-long-test-case",
        message: "Test case '{test_name}' is too long ({test_length}/{allowed_length})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Test case body has more lines than allowed. Empty lines and comments are not counted.",
        params: &[int_param("max_len", "20", "number of lines allowed in a test case")],
        added_in_version: "1.0.0",
        check: check_too_long_test_case,
    },
    Rule {
        id: len(5),
        name: "too-many-calls-in-test-case",
        message: "Test case '{test_name}' has too many keywords inside ({keyword_count}/{max_allowed_count})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Test case calls too many keywords. Templated test cases are skipped.",
        params: &[int_param("max_calls", "10", "number of keyword calls allowed in a test case")],
        added_in_version: "1.0.0",
        check: check_too_many_calls_in_test_case,
    },
    Rule {
        id: len(6),
        name: "too-many-arguments",
        message: "Keyword '{keyword_name}' has too many arguments ({arguments_count}/{max_allowed_count})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Keyword takes more arguments than allowed.",
        params: &[int_param("max_args", "5", "number of arguments allowed in a keyword")],
        added_in_version: "1.0.0",
        check: check_too_many_arguments,
    },
    Rule {
        id: len(7),
        name: "file-too-long",
        message: "File has too many lines ({lines_count}/{max_allowed_count})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "File has more lines than allowed. Split it into smaller suites or resources.",
        params: &[int_param("max_lines", "400", "number of lines allowed in a file")],
        added_in_version: "1.0.0",
        check: check_file_too_long,
    },
    Rule {
        id: len(8),
        name: "line-too-long",
        message: "Line is too long ({line_length}/{allowed_length})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Line is longer than allowed. Lines matching ignore_pattern are skipped.",
        params: &[
            int_param("line_length", "120", "number of characters allowed in line"),
            RuleParam {
                name: "ignore_pattern",
                default: r"https?://\S+",
                kind: ParamKind::Regex,
                description: "ignore lines that contain configured pattern",
            },
        ],
        added_in_version: "1.0.0",
        check: check_line_too_long,
    },
    Rule {
        id: len(9),
        name: "empty-section",
        message: "Section '{section_name}' is empty",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Section header without any data below it.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_empty_section,
    },
    Rule {
        id: len(10),
        name: "number-of-returned-values",
        message: "Too many return values ({return_count}/{max_allowed_count})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Keyword returns more values than allowed.",
        params: &[int_param("max_returns", "4", "allowed number of returned values from a keyword")],
        added_in_version: "1.0.0",
        check: check_number_of_returned_values,
    },
];

/// Body lines with data, the name line excluded.
fn body_length(file: &SourceFile, block: &Block) -> usize {
    (block.line + 1..=block.end_line)
        .filter_map(|n| file.line(n))
        .filter(|line| !line.cells.is_empty())
        .count()
}

fn call_count(block: &Block) -> usize {
    block.keyword_calls().count()
}

fn check_too_long_keyword(ctx: &RuleContext) -> Vec<Finding> {
    let allowed = ctx.int("max_len");
    ctx.file
        .keywords()
        .filter_map(|block| {
            let length = body_length(ctx.file, block);
            (length as i64 > allowed).then(|| {
                Finding::at_cell(block.line, &block.name)
                    .with("keyword_name", &block.name.value)
                    .with("keyword_length", length)
                    .with("allowed_length", allowed)
            })
        })
        .collect()
}

fn check_too_few_calls_in_keyword(ctx: &RuleContext) -> Vec<Finding> {
    let allowed = ctx.int("min_calls");
    ctx.file
        .keywords()
        .filter_map(|block| {
            let count = call_count(block);
            ((count as i64) < allowed).then(|| {
                Finding::at_cell(block.line, &block.name)
                    .with("keyword_name", &block.name.value)
                    .with("keyword_count", count)
                    .with("min_allowed_count", allowed)
            })
        })
        .collect()
}

fn check_too_many_calls_in_keyword(ctx: &RuleContext) -> Vec<Finding> {
    let allowed = ctx.int("max_calls");
    ctx.file
        .keywords()
        .filter_map(|block| {
            let count = call_count(block);
            (count as i64 > allowed).then(|| {
                Finding::at_cell(block.line, &block.name)
                    .with("keyword_name", &block.name.value)
                    .with("keyword_count", count)
                    .with("max_allowed_count", allowed)
            })
        })
        .collect()
}

fn check_too_long_test_case(ctx: &RuleContext) -> Vec<Finding> {
    let allowed = ctx.int("max_len");
    ctx.file
        .tests()
        .filter_map(|block| {
            let length = body_length(ctx.file, block);
            (length as i64 > allowed).then(|| {
                Finding::at_cell(block.line, &block.name)
                    .with("test_name", &block.name.value)
                    .with("test_length", length)
                    .with("allowed_length", allowed)
            })
        })
        .collect()
}

fn check_too_many_calls_in_test_case(ctx: &RuleContext) -> Vec<Finding> {
    let allowed = ctx.int("max_calls");
    if ctx.file.is_templated() {
        return Vec::new();
    }
    ctx.file
        .tests()
        .filter(|block| block.setting("template").is_none())
        .filter_map(|block| {
            let count = call_count(block);
            (count as i64 > allowed).then(|| {
                Finding::at_cell(block.line, &block.name)
                    .with("test_name", &block.name.value)
                    .with("keyword_count", count)
                    .with("max_allowed_count", allowed)
            })
        })
        .collect()
}

fn check_too_many_arguments(ctx: &RuleContext) -> Vec<Finding> {
    let allowed = ctx.int("max_args");
    ctx.file
        .keywords()
        .filter_map(|block| {
            let arguments = block.setting("arguments")?;
            let count = arguments.args.len();
            (count as i64 > allowed).then(|| {
                Finding::at_statement(arguments)
                    .with("keyword_name", &block.name.value)
                    .with("arguments_count", count)
                    .with("max_allowed_count", allowed)
            })
        })
        .collect()
}

fn check_file_too_long(ctx: &RuleContext) -> Vec<Finding> {
    let allowed = ctx.int("max_lines");
    let count = ctx.file.lines.len();
    match ctx.file.lines.last() {
        Some(last) if count as i64 > allowed => vec![Finding::at_line(last)
            .with("lines_count", count)
            .with("max_allowed_count", allowed)],
        _ => Vec::new(),
    }
}

fn check_line_too_long(ctx: &RuleContext) -> Vec<Finding> {
    let allowed = ctx.int("line_length");
    let ignore = ctx.regex("ignore_pattern");
    ctx.file
        .lines
        .iter()
        .filter_map(|line| {
            let length = line.text.chars().count();
            if length as i64 <= allowed || ignore.map_or(false, |re| re.is_match(&line.text)) {
                return None;
            }
            let start = allowed.max(0) as usize + 1;
            Some(
                Finding::new(line.number, start, line.number, length + 1)
                    .with("line_length", length)
                    .with("allowed_length", allowed),
            )
        })
        .collect()
}

fn check_empty_section(ctx: &RuleContext) -> Vec<Finding> {
    ctx.file
        .sections
        .iter()
        .filter(|s| !matches!(s.kind, SectionKind::Comments | SectionKind::Invalid | SectionKind::Implicit))
        .filter(|s| !s.has_data())
        .filter_map(|s| {
            let header = s.header.as_ref()?;
            let line = s.header_line?;
            Some(Finding::at_cell(line, header).with("section_name", s.header_name().unwrap_or_default()))
        })
        .collect()
}

fn check_number_of_returned_values(ctx: &RuleContext) -> Vec<Finding> {
    let allowed = ctx.int("max_returns");
    let mut findings = Vec::new();
    for block in ctx.file.keywords() {
        for statement in &block.statements {
            let returns = match statement.kind {
                StatementKind::Control if statement.name.value == "RETURN" => true,
                StatementKind::BlockSetting => statement.normalized_setting_name() == "return",
                StatementKind::KeywordCall => {
                    normalize_robot_name(&statement.name.value) == "returnfromkeyword"
                }
                _ => false,
            };
            let count = statement.args.len();
            if returns && count as i64 > allowed {
                findings.push(
                    Finding::at_statement(statement)
                        .with("return_count", count)
                        .with("max_allowed_count", allowed),
                );
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::super::{run_rule, run_rule_with};

    fn keyword_with_calls(calls: usize) -> String {
        let mut source = String::from("*** Keywords ***\nKw\n    [Documentation]    doc\n");
        for index in 0..calls {
            source.push_str(&format!("    Log    {}\n", index));
        }
        source
    }

    #[test]
    fn counts_keyword_lines_and_calls() {
        let source = keyword_with_calls(3);
        assert_eq!(run_rule_with("too-long-keyword", &source, &[("max_len", "3")]).len(), 1);
        assert!(run_rule_with("too-long-keyword", &source, &[("max_len", "4")]).is_empty());
        assert_eq!(run_rule_with("too-many-calls-in-keyword", &source, &[("max_calls", "2")]).len(), 1);
        assert!(run_rule("too-few-calls-in-keyword", "a.robot", &source).is_empty());
        assert_eq!(run_rule("too-few-calls-in-keyword", "a.robot", &keyword_with_calls(0)).len(), 1);
    }

    #[test]
    fn templated_tests_are_not_counted() {
        let source = "*** Test Cases ***\nT\n    [Template]    Kw\n    1\n    2\n    3\n";
        assert!(run_rule_with("too-many-calls-in-test-case", source, &[("max_calls", "1")]).is_empty());
        assert_eq!(run_rule_with("too-long-test-case", source, &[("max_len", "3")]).len(), 1);
    }

    #[test]
    fn reports_too_many_arguments() {
        let source = "*** Keywords ***\nKw\n    [Arguments]    ${a}    ${b}    ${c}\n    No Operation\n";
        let findings = run_rule_with("too-many-arguments", source, &[("max_args", "2")]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 3);
    }

    #[test]
    fn long_lines_respect_ignore_pattern() {
        let long = "x".repeat(130);
        let source = format!("*** Comments ***\n{}\n# see https://example.com/{}\n", long, long);
        let findings = run_rule("line-too-long", "a.robot", &source);
        assert_eq!(findings.len(), 1);
        assert_eq!((findings[0].line, findings[0].column, findings[0].end_column), (2, 121, 131));
    }

    #[test]
    fn reports_file_and_section_sizes() {
        let source = "*** Settings ***\n\n*** Keywords ***\nKw\n    No Operation\n";
        let empty = run_rule("empty-section", "a.robot", source);
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].render("{section_name}"), "Settings");
        assert_eq!(run_rule_with("file-too-long", source, &[("max_lines", "4")]).len(), 1);
    }

    #[test]
    fn counts_returned_values() {
        let source = "*** Keywords ***\nKw\n    RETURN    1    2    3\nOld\n    [Return]    1    2\n";
        let findings = run_rule_with("number-of-returned-values", source, &[("max_returns", "2")]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 3);
    }
}
