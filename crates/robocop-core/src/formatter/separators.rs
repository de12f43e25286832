use std::collections::HashMap;

use super::{build_line, changed, Formatter, FormattingConfig};
use crate::errors::RobocopResult;
use crate::linter::rules::{ParamKind, ParamValue, RuleParam};
use crate::model::{Block, Line, SectionKind, SourceFile, Statement};

/// Separators between cells and body indentation
#[derive(Debug, Default)]
pub struct NormalizeSeparators {
    skip_documentation: bool,
}

/// How a body line of a test case or keyword is indented
struct BodyLine {
    depth: usize,
    documentation: bool,
}

fn is_documentation(statement: &Statement) -> bool {
    statement.normalized_setting_name() == "documentation"
}

impl NormalizeSeparators {
    fn cells_line(&self, prefix: &str, line: &Line, config: &FormattingConfig) -> String {
        let cells: Vec<&str> = line.cells.iter().map(|c| c.value.as_str()).collect();
        let comment = line.comment.as_ref().map(|c| c.value.as_str());
        build_line(prefix, &cells, comment, &config.separator)
    }

    /// Line of a statement, written as-is apart from indentation when it is
    /// documentation and documentation is skipped.
    fn statement_line(&self, prefix: &str, line: &Line, documentation: bool, config: &FormattingConfig) -> String {
        if documentation && self.skip_documentation {
            return format!("{}{}", prefix, line.text.trim());
        }
        self.cells_line(prefix, line, config)
    }

    fn body_lines(block: &Block) -> HashMap<usize, BodyLine> {
        let mut body = HashMap::new();
        for statement in &block.statements {
            let documentation = is_documentation(statement);
            for number in statement.line..=statement.end_line {
                if number != block.line {
                    body.insert(number, BodyLine { depth: statement.depth, documentation });
                }
            }
        }
        body
    }

    fn comment_depth(block: &Block, line: &Line) -> Option<usize> {
        match block.statements.iter().find(|s| s.line > line.number) {
            Some(next) => Some(next.depth),
            // comments after the last statement stay at column 1 when written there
            None if line.indent == 0 => None,
            None => Some(0),
        }
    }

    fn format_block(&self, file: &SourceFile, block: &Block, config: &FormattingConfig, lines: &mut [String]) {
        let body = Self::body_lines(block);
        for number in block.line..=block.span_end {
            let Some(line) = file.line(number) else { continue };
            let text = if number == block.line {
                let documentation = block.statements.first().map_or(false, |s| s.line == number && is_documentation(s));
                self.statement_line("", line, documentation, config)
            } else if let Some(body_line) = body.get(&number) {
                let prefix = config.indent_for(1 + body_line.depth);
                self.statement_line(&prefix, line, body_line.documentation, config)
            } else if line.is_comment_only() {
                let prefix = Self::comment_depth(block, line).map(|depth| config.indent_for(1 + depth)).unwrap_or_default();
                self.cells_line(&prefix, line, config)
            } else {
                line.text.trim_end().to_string()
            };
            lines[number - 1] = text;
        }
    }
}

impl Formatter for NormalizeSeparators {
    fn name(&self) -> &'static str {
        "NormalizeSeparators"
    }

    fn docs(&self) -> &'static str {
        "Normalizes separators between cells to the configured separator and indents test case and \
         keyword bodies by nesting level. Trailing whitespace is removed. Documentation can be left \
         untouched with skip_documentation=True."
    }

    fn params(&self) -> &'static [RuleParam] {
        &[RuleParam {
            name: "skip_documentation",
            default: "false",
            kind: ParamKind::Bool,
            description: "keep separators inside documentation",
        }]
    }

    fn set_param(&mut self, _param: &str, value: ParamValue) -> RobocopResult<()> {
        if let ParamValue::Bool(skip) = value {
            self.skip_documentation = skip;
        }
        Ok(())
    }

    fn format(&self, file: &SourceFile, config: &FormattingConfig) -> Option<String> {
        let mut lines: Vec<String> = file.lines.iter().map(|l| l.text.trim_end().to_string()).collect();
        for section in &file.sections {
            if let Some(line) = section.header_line.and_then(|number| file.line(number)) {
                lines[line.number - 1] = self.cells_line("", line, config);
            }
            let first = section.header_line.map_or(section.start_line, |header| header + 1);
            match section.kind {
                SectionKind::Settings | SectionKind::Variables => {
                    let documentation: Vec<usize> = section
                        .statements
                        .iter()
                        .filter(|s| is_documentation(s))
                        .flat_map(|s| s.line..=s.end_line)
                        .collect();
                    for number in first..=section.end_line {
                        let Some(line) = file.line(number) else { continue };
                        if line.is_empty() {
                            continue;
                        }
                        lines[number - 1] =
                            self.statement_line("", line, documentation.contains(&number), config);
                    }
                }
                kind if kind.has_blocks() => {
                    let first_block = section.blocks.first().map_or(section.end_line + 1, |b| b.line);
                    for number in first..first_block {
                        let Some(line) = file.line(number) else { continue };
                        if !line.is_empty() {
                            lines[number - 1] = self.cells_line("", line, config);
                        }
                    }
                    for block in &section.blocks {
                        self.format_block(file, block, config, &mut lines);
                    }
                }
                _ => {}
            }
        }
        changed(file, &lines, file.ends_with_newline)
    }
}
