//! SPC: whitespace, empty lines and indentation

use std::collections::HashMap;

use super::{no_findings, Finding, ParamKind, Rule, RuleContext, RuleParam};
use crate::diagnostics::Severity;
use crate::linter::rule_id::{RuleGroup, RuleId};
use crate::model::{Block, SectionKind, SourceFile};

const fn spc(number: u8) -> RuleId {
    RuleId::new(RuleGroup::Spc, number)
}

const EMPTY_LINES_PARAM: &str = "empty_lines";

pub static RULES: &[Rule] = &[
    Rule {
        id: spc(1),
        name: "trailing-whitespace",
        message: "Trailing whitespace at the end of line",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Line ends with spaces or tabs.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_trailing_whitespace,
    },
    Rule {
        id: spc(2),
        name: "missing-trailing-blank-line",
        message: "Missing trailing blank line at the end of file",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "The last line of the file should end with a line break.",
        params: &[],
        added_in_version: "1.0.0",
        check: check_missing_trailing_blank_line,
    },
    Rule {
        id: spc(3),
        name: "empty-lines-between-sections",
        message: "Invalid number of empty lines between sections ({empty_lines}/{allowed_empty_lines})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Sections should be separated by the same number of empty lines.",
        params: &[RuleParam {
            name: EMPTY_LINES_PARAM,
            default: "2",
            kind: ParamKind::Int,
            description: "number of empty lines required between sections",
        }],
        added_in_version: "1.0.0",
        check: check_empty_lines_between_sections,
    },
    Rule {
        id: spc(4),
        name: "empty-lines-between-test-cases",
        message: "Invalid number of empty lines between test cases ({empty_lines}/{allowed_empty_lines})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Test cases should be separated by the same number of empty lines.",
        params: &[RuleParam {
            name: EMPTY_LINES_PARAM,
            default: "1",
            kind: ParamKind::Int,
            description: "number of empty lines required between test cases",
        }],
        added_in_version: "1.0.0",
        check: check_empty_lines_between_test_cases,
    },
    Rule {
        id: spc(5),
        name: "empty-lines-between-keywords",
        message: "Invalid number of empty lines between keywords ({empty_lines}/{allowed_empty_lines})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Keywords should be separated by the same number of empty lines.",
        params: &[RuleParam {
            name: EMPTY_LINES_PARAM,
            default: "1",
            kind: ParamKind::Int,
            description: "number of empty lines required between keywords",
        }],
        added_in_version: "1.0.0",
        check: check_empty_lines_between_keywords,
    },
    Rule {
        id: spc(6),
        name: "consecutive-empty-lines",
        message: "Too many blank lines ({empty_lines}/{allowed_empty_lines})",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Too many consecutive empty lines inside a test case, keyword or section body.",
        params: &[RuleParam {
            name: EMPTY_LINES_PARAM,
            default: "1",
            kind: ParamKind::Int,
            description: "number of allowed consecutive empty lines",
        }],
        added_in_version: "1.0.0",
        check: check_consecutive_empty_lines,
    },
    Rule {
        id: spc(7),
        name: "mixed-tabs-and-spaces",
        message: "Inconsistent use of tabs and spaces in file",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "The file uses both tabs and spaces as separators. Pick one of them.",
        params: &[],
        added_in_version: "1.1.0",
        check: check_mixed_tabs_and_spaces,
    },
    Rule {
        id: spc(8),
        name: "bad-indent",
        message: "Line is {bad_indent_msg}",
        severity: Severity::Warning,
        enabled: true,
        deprecated: false,
        docs: "Statements on the same nesting level should share the same indentation. With \
               indent set to a positive value every level must be indented by that many spaces.",
        params: &[RuleParam {
            name: "indent",
            default: "-1",
            kind: ParamKind::Int,
            description: "number of spaces per indentation level, -1 to only require consistency",
        }],
        added_in_version: "1.3.0",
        check: check_bad_indent,
    },
    Rule {
        id: spc(9),
        name: "uneven-indent",
        message: "Line is {bad_indent_msg}",
        severity: Severity::Warning,
        enabled: true,
        deprecated: true,
        docs: "Replaced by bad-indent.",
        params: &[],
        added_in_version: "1.0.0",
        check: no_findings,
    },
];

fn check_trailing_whitespace(ctx: &RuleContext) -> Vec<Finding> {
    ctx.file
        .lines
        .iter()
        .filter(|line| line.text.ends_with(' ') || line.text.ends_with('\t'))
        .map(|line| {
            let content = line.text.trim_end().chars().count();
            let end = line.text.chars().count();
            Finding::new(line.number, content + 1, line.number, end + 1)
        })
        .collect()
}

fn check_missing_trailing_blank_line(ctx: &RuleContext) -> Vec<Finding> {
    match ctx.file.lines.last() {
        Some(last) if !ctx.file.ends_with_newline => vec![Finding::at_line(last)],
        _ => Vec::new(),
    }
}

/// Number of empty lines directly above `line`.
fn empty_lines_before(file: &SourceFile, line: usize) -> usize {
    (1..line).rev().take_while(|n| file.line(*n).map_or(false, |l| l.is_empty())).count()
}

fn empty_lines_finding(finding: Finding, found: usize, allowed: i64) -> Finding {
    finding.with("empty_lines", found).with("allowed_empty_lines", allowed)
}

fn check_empty_lines_between_sections(ctx: &RuleContext) -> Vec<Finding> {
    let allowed = ctx.int(EMPTY_LINES_PARAM);
    let mut findings = Vec::new();
    for section in &ctx.file.sections {
        let (Some(header), Some(line)) = (&section.header, section.header_line) else { continue };
        let found = empty_lines_before(ctx.file, line);
        if found + 1 >= line {
            // nothing but empty lines above the first header
            continue;
        }
        if found as i64 != allowed {
            findings.push(empty_lines_finding(Finding::at_cell(line, header), found, allowed));
        }
    }
    findings
}

fn check_blocks_spacing(ctx: &RuleContext, keywords: bool) -> Vec<Finding> {
    let allowed = ctx.int(EMPTY_LINES_PARAM);
    let mut findings = Vec::new();
    let sections = ctx
        .file
        .sections
        .iter()
        .filter(|s| if keywords { s.kind == SectionKind::Keywords } else { s.kind.is_test_like() });
    for section in sections {
        for pair in section.blocks.windows(2) {
            let found = pair[1].line - pair[0].end_line - 1;
            if found as i64 != allowed {
                let at = Finding::at_cell(pair[1].line, &pair[1].name);
                findings.push(empty_lines_finding(at, found, allowed));
            }
        }
    }
    findings
}

fn check_empty_lines_between_test_cases(ctx: &RuleContext) -> Vec<Finding> {
    check_blocks_spacing(ctx, false)
}

fn check_empty_lines_between_keywords(ctx: &RuleContext) -> Vec<Finding> {
    check_blocks_spacing(ctx, true)
}

fn report_empty_runs(file: &SourceFile, from: usize, to: usize, allowed: i64, out: &mut Vec<Finding>) {
    let mut run = 0usize;
    for number in from..=to {
        let Some(line) = file.line(number) else { break };
        if line.is_empty() {
            run += 1;
            continue;
        }
        if run as i64 > allowed {
            let first = number - run;
            out.push(empty_lines_finding(Finding::new(first, 1, first, 1), run, allowed));
        }
        run = 0;
    }
}

fn check_consecutive_empty_lines(ctx: &RuleContext) -> Vec<Finding> {
    let allowed = ctx.int(EMPTY_LINES_PARAM);
    let mut findings = Vec::new();
    for section in &ctx.file.sections {
        match section.kind {
            SectionKind::Settings | SectionKind::Variables => {
                if let (Some(first), Some(last)) = (section.statements.first(), section.statements.last()) {
                    report_empty_runs(ctx.file, first.line, last.end_line, allowed, &mut findings);
                }
            }
            kind if kind.has_blocks() => {
                for block in &section.blocks {
                    report_empty_runs(ctx.file, block.line, block.end_line, allowed, &mut findings);
                }
            }
            _ => {}
        }
    }
    findings
}

fn check_mixed_tabs_and_spaces(ctx: &RuleContext) -> Vec<Finding> {
    let data_lines = ctx.file.lines.iter().filter(|l| !l.cells.is_empty());
    let mut tabs = Vec::new();
    let mut spaces = Vec::new();
    for line in data_lines {
        let text = line.text.trim_end();
        if text.contains('\t') {
            tabs.push(line);
        } else if text.contains("  ") {
            spaces.push(line);
        }
    }
    if tabs.is_empty() || spaces.is_empty() {
        return Vec::new();
    }
    let minority = if spaces.len() < tabs.len() { &spaces } else { &tabs };
    minority.first().map(|line| vec![Finding::at_line(line)]).unwrap_or_default()
}

fn block_indent_findings(block: &Block, unit: i64, out: &mut Vec<Finding>) {
    let mut expected: HashMap<usize, usize> = HashMap::new();
    for statement in block.statements.iter().filter(|s| s.line != block.line) {
        let want = if unit > 0 {
            unit as usize * (statement.depth + 1)
        } else {
            *expected.entry(statement.depth).or_insert(statement.indent)
        };
        if statement.indent == want {
            continue;
        }
        let message = if statement.indent > want { "over-indented" } else { "under-indented" };
        let cell = statement.assign.first().unwrap_or(&statement.name);
        out.push(Finding::at_cell(statement.line, cell).with("bad_indent_msg", message));
    }
}

fn check_bad_indent(ctx: &RuleContext) -> Vec<Finding> {
    let unit = ctx.int("indent");
    let mut findings = Vec::new();
    for block in ctx.file.tests().chain(ctx.file.keywords()) {
        block_indent_findings(block, unit, &mut findings);
    }
    findings
}
