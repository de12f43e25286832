//! NAME: naming conventions

use super::{Finding, ParamKind, Rule, RuleContext, RuleParam};
use crate::diagnostics::Severity;
use crate::linter::rule_id::{RuleGroup, RuleId};
use crate::model::names::{remove_embedded_arguments, strip_variable_syntax};
use crate::model::Block;

const fn name(number: u8) -> RuleId {
    RuleId::new(RuleGroup::Name, number)
}

pub static RULES: &[Rule] = &[
    Rule {
        id: name(1),
        name: "not-allowed-char-in-name",
        message: "Not allowed character '{character}' found in {block_name} name",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Test case or keyword name contains a character matching the configured pattern. \
               Embedded arguments are not checked.",
        params: &[RuleParam {
            name: "pattern",
            default: r"[.?]",
            kind: ParamKind::Regex,
            description: "pattern defining characters (not) allowed in a name",
        }],
        added_in_version: "1.0.0",
        check: check_not_allowed_char_in_name,
    },
    Rule {
        id: name(2),
        name: "wrong-case-in-keyword-name",
        message: "Keyword name '{keyword_name}' does not follow case convention",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Keyword names should follow one case convention: each_word_capitalized (Open Main \
               Page) or first_word_capitalized (Open main page).",
        params: &[RuleParam {
            name: "convention",
            default: "each_word_capitalized",
            kind: ParamKind::Str,
            description: "possible values: 'each_word_capitalized' (default) or 'first_word_capitalized'",
        }],
        added_in_version: "1.0.0",
        check: check_wrong_case_in_keyword_name,
    },
    Rule {
        id: name(3),
        name: "not-capitalized-test-case-title",
        message: "Test case '{test_name}' title should start with capital letter",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Test case and task names should start with an upper-case letter.",
        params: &[],
        added_in_version: "1.4.0",
        check: check_not_capitalized_test_case_title,
    },
    Rule {
        id: name(4),
        name: "section-variable-not-uppercase",
        message: "Section variable '{variable_name}' name should be uppercase",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Variables defined in the Variables section are global to the suite and should be \
               written in upper case.",
        params: &[],
        added_in_version: "1.4.0",
        check: check_section_variable_not_uppercase,
    },
];

fn char_findings(ctx: &RuleContext, block: &Block, kind: &str, out: &mut Vec<Finding>) {
    let Some(pattern) = ctx.regex("pattern") else { return };
    let checked = remove_embedded_arguments_keep_width(&block.name.value);
    for found in pattern.find_iter(&checked) {
        let offset = checked[..found.start()].chars().count();
        let width = found.as_str().chars().count();
        let column = block.name.column + offset;
        out.push(
            Finding::new(block.line, column, block.line, column + width)
                .with("character", found.as_str())
                .with("block_name", kind),
        );
    }
}

/// Blanks embedded arguments with spaces so match offsets stay aligned with the name.
fn remove_embedded_arguments_keep_width(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut depth = 0usize;
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if depth == 0 && matches!(c, '$' | '@' | '&') && chars.peek() == Some(&'{') {
            result.push(' ');
            continue;
        }
        match c {
            '{' => {
                depth += 1;
                result.push(' ');
            }
            '}' if depth > 0 => {
                depth -= 1;
                result.push(' ');
            }
            _ if depth > 0 => result.push(' '),
            _ => result.push(c),
        }
    }
    result
}

fn check_not_allowed_char_in_name(ctx: &RuleContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for block in ctx.file.tests() {
        char_findings(ctx, block, "test case", &mut findings);
    }
    for block in ctx.file.keywords() {
        char_findings(ctx, block, "keyword", &mut findings);
    }
    findings
}

fn starts_upper(word: &str) -> bool {
    word.chars().next().map_or(true, |c| !c.is_alphabetic() || c.is_uppercase())
}

fn starts_lower(word: &str) -> bool {
    word.chars().next().map_or(true, |c| !c.is_alphabetic() || c.is_lowercase())
}

fn follows_convention(name: &str, convention: &str) -> bool {
    let plain = remove_embedded_arguments(name);
    // library prefix such as `Lib.Keyword` only counts the keyword part
    let keyword = plain.rsplit('.').next().unwrap_or(&plain);
    let mut words = keyword.split(' ').filter(|w| !w.is_empty());
    match convention {
        "first_word_capitalized" => {
            words.next().map_or(true, starts_upper) && words.all(starts_lower)
        }
        _ => words.all(starts_upper),
    }
}

fn check_wrong_case_in_keyword_name(ctx: &RuleContext) -> Vec<Finding> {
    let convention = ctx.str("convention");
    ctx.file
        .keywords()
        .filter(|block| !follows_convention(&block.name.value, convention))
        .map(|block| Finding::at_cell(block.line, &block.name).with("keyword_name", &block.name.value))
        .collect()
}

fn check_not_capitalized_test_case_title(ctx: &RuleContext) -> Vec<Finding> {
    ctx.file
        .tests()
        .filter(|block| !starts_upper(&block.name.value))
        .map(|block| Finding::at_cell(block.line, &block.name).with("test_name", &block.name.value))
        .collect()
}

fn check_section_variable_not_uppercase(ctx: &RuleContext) -> Vec<Finding> {
    ctx.file
        .variables()
        .filter(|var| {
            let inner = strip_variable_syntax(&var.name.value);
            inner != var.name.value.trim() && inner.to_uppercase() != inner
        })
        .map(|var| {
            let display = var.name.value.trim_end_matches('=').trim_end().to_string();
            Finding::at_cell(var.line, &var.name).with("variable_name", display)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::{run_rule, run_rule_with};
    use super::follows_convention;
    use test_case::test_case;

    #[test]
    fn reports_not_allowed_characters_with_columns() {
        let source = "*** Keywords ***\nOpen Page.\n    No Operation\nGo To ${url.path}\n    No Operation\n";
        let findings = run_rule("not-allowed-char-in-name", "a.robot", source);
        assert_eq!(findings.len(), 1);
        assert_eq!((findings[0].line, findings[0].column, findings[0].end_column), (2, 10, 11));
        assert_eq!(findings[0].render("{character} in {block_name}"), ". in keyword");
    }

    #[test_case("Open Main Page", "each_word_capitalized", true)]
    #[test_case("Open main page", "each_word_capitalized", false)]
    #[test_case("Open main page", "first_word_capitalized", true)]
    #[test_case("Open Main page", "first_word_capitalized", false)]
    #[test_case("Select ${item} From List", "each_word_capitalized", true)]
    #[test_case("Lib.Run Keyword", "each_word_capitalized", true)]
    fn keyword_case_conventions(name: &str, convention: &str, expected: bool) {
        assert_eq!(follows_convention(name, convention), expected);
    }

    #[test]
    fn convention_is_configurable() {
        let source = "*** Keywords ***\nOpen main page\n    No Operation\n";
        assert_eq!(run_rule("wrong-case-in-keyword-name", "a.robot", source).len(), 1);
        assert!(run_rule_with("wrong-case-in-keyword-name", source, &[("convention", "first_word_capitalized")])
            .is_empty());
    }

    #[test]
    fn test_titles_and_section_variables() {
        let source = "*** Variables ***\n${GOOD}    1\n${bad}    2\n\n*** Test Cases ***\nlower title\n    No Operation\n";
        let titles = run_rule("not-capitalized-test-case-title", "a.robot", source);
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].line, 6);
        let variables = run_rule("section-variable-not-uppercase", "a.robot", source);
        assert_eq!(variables.len(), 1);
        assert_eq!(variables[0].render("{variable_name}"), "${bad}");
    }
}
