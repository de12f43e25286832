//! DOC: missing documentation

use super::{Finding, Rule, RuleContext, RuleParam, ParamKind};
use crate::diagnostics::Severity;
use crate::linter::rule_id::{RuleGroup, RuleId};
use crate::model::{Block, FileKind, SourceFile};

pub static RULES: &[Rule] = &[
    Rule {
        id: RuleId::new(RuleGroup::Doc, 1),
        name: "missing-doc-keyword",
        message: "Missing documentation in '{name}' keyword",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Keyword without documentation. Describe what the keyword does and what it returns \
               using the [Documentation] setting.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_missing_doc_keyword,
    },
    Rule {
        id: RuleId::new(RuleGroup::Doc, 2),
        name: "missing-doc-test-case",
        message: "Missing documentation in '{name}' test case",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Test case without documentation. Templated test cases are skipped unless \
               ignore_templated is disabled.",
        params: &[RuleParam {
            name: "ignore_templated",
            default: "true",
            kind: ParamKind::Bool,
            description: "whether templated tests should be documented or not",
        }],
        added_in_version: "1.0.0",
        check: check_missing_doc_test_case,
    },
    Rule {
        id: RuleId::new(RuleGroup::Doc, 3),
        name: "missing-doc-suite",
        message: "Missing documentation in suite",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Suite file without a Documentation setting in the Settings section.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_missing_doc_suite,
    },
    Rule {
        id: RuleId::new(RuleGroup::Doc, 4),
        name: "missing-doc-resource-file",
        message: "Missing documentation in resource file",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Resource file without a Documentation setting in the Settings section.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_missing_doc_resource_file,
    },
];

fn is_documented(block: &Block) -> bool {
    block.setting("documentation").map_or(false, |doc| !doc.args.is_empty())
}

fn suite_documented(file: &SourceFile) -> bool {
    file.setting("documentation").map_or(false, |doc| !doc.args.is_empty())
}

fn file_start(file: &SourceFile) -> Finding {
    match file.lines.first() {
        Some(line) => Finding::at_line(line),
        None => Finding::new(1, 1, 1, 1),
    }
}

fn check_missing_doc_keyword(ctx: &RuleContext) -> Vec<Finding> {
    ctx.file
        .keywords()
        .filter(|block| !is_documented(block))
        .map(|block| Finding::at_cell(block.line, &block.name).with("name", &block.name.value))
        .collect()
}

fn check_missing_doc_test_case(ctx: &RuleContext) -> Vec<Finding> {
    let ignore_templated = ctx.bool("ignore_templated");
    if ignore_templated && ctx.file.is_templated() {
        return Vec::new();
    }
    ctx.file
        .tests()
        .filter(|block| !(ignore_templated && block.setting("template").is_some()))
        .filter(|block| !is_documented(block))
        .map(|block| Finding::at_cell(block.line, &block.name).with("name", &block.name.value))
        .collect()
}

fn check_missing_doc_suite(ctx: &RuleContext) -> Vec<Finding> {
    if ctx.file.kind == FileKind::Resource || suite_documented(ctx.file) {
        return Vec::new();
    }
    vec![file_start(ctx.file)]
}

fn check_missing_doc_resource_file(ctx: &RuleContext) -> Vec<Finding> {
    if ctx.file.kind != FileKind::Resource || suite_documented(ctx.file) {
        return Vec::new();
    }
    vec![file_start(ctx.file)]
}
