use std::path::PathBuf;

use regex::Regex;

use super::tokenizer::{leading_whitespace, tokenize};
use super::{
    Block, Cell, FileKind, Line, LineEnding, Section, SectionKind, SourceFile, Statement,
    StatementKind,
};

pub const CONTROL_WORDS: &[&str] = &[
    "FOR", "END", "IF", "ELSE", "ELSE IF", "WHILE", "TRY", "EXCEPT", "FINALLY", "BREAK",
    "CONTINUE", "RETURN", "VAR", "GROUP",
];

lazy_static! {
    static ref ASSIGNMENT: Regex = Regex::new(r"^[$@&]\{.+\}\s*=?$").expect("valid regex");
}

pub fn is_assignment(value: &str) -> bool {
    ASSIGNMENT.is_match(value)
}

pub fn parse(path: PathBuf, text: &str) -> SourceFile {
    let line_ending = match text.split('\n').next() {
        Some(first) if first.ends_with('\r') && text.contains('\n') => LineEnding::Windows,
        _ => LineEnding::Unix,
    };
    let ends_with_newline = text.ends_with('\n');
    let body = text.strip_suffix('\n').unwrap_or(text);

    let lines: Vec<Line> = if text.is_empty() {
        Vec::new()
    } else {
        body.split('\n')
            .enumerate()
            .map(|(index, raw)| {
                let raw = raw.strip_suffix('\r').unwrap_or(raw);
                let (cells, comment) = tokenize(raw);
                Line {
                    number: index + 1,
                    text: raw.to_string(),
                    indent: leading_whitespace(raw),
                    cells,
                    comment,
                }
            })
            .collect()
    };

    let sections = build_sections(&lines);
    SourceFile { kind: FileKind::from_path(&path), path, lines, sections, line_ending, ends_with_newline }
}

fn build_sections(lines: &[Line]) -> Vec<Section> {
    let mut sections = vec![Section {
        kind: SectionKind::Implicit,
        header: None,
        header_line: None,
        start_line: 1,
        end_line: 0,
        statements: Vec::new(),
        blocks: Vec::new(),
    }];

    for line in lines {
        if line.is_header() {
            let header = line.cells.first().cloned().unwrap_or_else(|| Cell::new(line.text.trim(), 1));
            let name = header.value.trim_matches(|c| c == '*' || c == ' ');
            sections.push(Section {
                kind: SectionKind::from_header(name),
                header: Some(header),
                header_line: Some(line.number),
                start_line: line.number,
                end_line: line.number,
                statements: Vec::new(),
                blocks: Vec::new(),
            });
            continue;
        }
        let Some(section) = sections.last_mut() else { continue };
        section.end_line = line.number;
        match section.kind {
            SectionKind::Settings | SectionKind::Variables => {
                if line.cells.is_empty() {
                    continue;
                }
                if line.is_continuation() {
                    if let Some(previous) = section.statements.last_mut() {
                        extend(previous, line);
                    }
                    continue;
                }
                let kind = if section.kind == SectionKind::Settings {
                    StatementKind::Setting
                } else {
                    StatementKind::Variable
                };
                let mut cells = line.cells.clone().into_iter();
                if let Some(name) = cells.next() {
                    section.statements.push(Statement {
                        kind,
                        assign: Vec::new(),
                        name,
                        args: cells.collect(),
                        line: line.number,
                        end_line: line.number,
                        indent: line.indent,
                        depth: 0,
                    });
                }
            }
            kind if kind.has_blocks() => add_block_line(&mut section.blocks, line),
            _ => {}
        }
    }

    for section in sections.iter_mut() {
        let end = section.end_line;
        let starts: Vec<usize> = section.blocks.iter().map(|b| b.line).collect();
        for (index, block) in section.blocks.iter_mut().enumerate() {
            block.span_end = starts.get(index + 1).map_or(end, |next| next - 1);
            assign_depths(&mut block.statements);
        }
    }

    // drop the implicit section when the file starts with a header
    if sections.len() > 1 && sections[0].end_line == 0 {
        sections.remove(0);
    }
    sections
}

fn add_block_line(blocks: &mut Vec<Block>, line: &Line) {
    if line.cells.is_empty() {
        if line.comment.is_some() {
            if let Some(block) = blocks.last_mut() {
                block.end_line = line.number;
            }
        }
        return;
    }
    if line.indent == 0 && !line.is_continuation() {
        let mut cells = line.cells.clone();
        let name = cells.remove(0);
        let mut block = Block {
            name,
            line: line.number,
            end_line: line.number,
            span_end: line.number,
            statements: Vec::new(),
        };
        if let Some(first) = cells.first() {
            let indent = first.column - 1;
            block.statements.push(body_statement(cells, line.number, indent));
        }
        blocks.push(block);
        return;
    }
    let Some(block) = blocks.last_mut() else { return };
    block.end_line = line.number;
    if line.is_continuation() {
        if let Some(previous) = block.statements.last_mut() {
            extend(previous, line);
        }
        return;
    }
    block.statements.push(body_statement(line.cells.clone(), line.number, line.indent));
}

fn extend(statement: &mut Statement, line: &Line) {
    statement.args.extend(line.cells.iter().skip(1).cloned());
    statement.end_line = line.number;
}

fn body_statement(cells: Vec<Cell>, line: usize, indent: usize) -> Statement {
    let first = &cells[0].value;
    let kind = if first.starts_with('[') && first.ends_with(']') {
        Some(StatementKind::BlockSetting)
    } else if CONTROL_WORDS.contains(&first.as_str()) {
        Some(StatementKind::Control)
    } else {
        None
    };
    let mut cells = cells.into_iter();
    if let Some(kind) = kind {
        let name = cells.next().unwrap_or_else(|| Cell::new("", indent + 1));
        return Statement {
            kind,
            assign: Vec::new(),
            name,
            args: cells.collect(),
            line,
            end_line: line,
            indent,
            depth: 0,
        };
    }

    let all: Vec<Cell> = cells.collect();
    let assigned = all.iter().take_while(|c| is_assignment(&c.value)).count();
    let mut rest = all.into_iter();
    let assign: Vec<Cell> = rest.by_ref().take(assigned).collect();
    match rest.next() {
        Some(name) => Statement {
            kind: StatementKind::KeywordCall,
            assign,
            name,
            args: rest.collect(),
            line,
            end_line: line,
            indent,
            depth: 0,
        },
        None => Statement {
            kind: StatementKind::Invalid,
            name: assign[0].clone(),
            assign,
            args: Vec::new(),
            line,
            end_line: line,
            indent,
            depth: 0,
        },
    }
}

/// Whether a control statement opens a nested body closed by `END`.
pub fn opens_block(statement: &Statement) -> bool {
    if statement.kind != StatementKind::Control {
        return false;
    }
    match statement.name.value.as_str() {
        "FOR" | "WHILE" | "TRY" | "GROUP" => true,
        // inline IF carries the keyword call on the same line
        "IF" => statement.args.len() <= 1,
        _ => false,
    }
}

fn assign_depths(statements: &mut [Statement]) {
    let mut depth: usize = 0;
    for statement in statements.iter_mut() {
        if statement.kind == StatementKind::Control {
            match statement.name.value.as_str() {
                "END" => {
                    depth = depth.saturating_sub(1);
                    statement.depth = depth;
                    continue;
                }
                "ELSE" | "ELSE IF" | "EXCEPT" | "FINALLY" => {
                    statement.depth = depth.saturating_sub(1);
                    continue;
                }
                _ => {}
            }
        }
        statement.depth = depth;
        if opens_block(statement) {
            depth += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceFile;

    const SUITE: &str = "\
*** Settings ***
Documentation    Suite doc
...    continued
Library    Collections

*** Test Cases ***
First Test
    [Tags]    smoke
    ${value}=    Get Value    arg
    FOR    ${item}    IN    @{LIST}
        Log    ${item}
    END
    # trailing comment

Second Test    Log    inline
";

    #[test]
    fn splits_sections_and_statements() {
        // Arrange & Act
        let file = SourceFile::parse("suite.robot", SUITE);

        // Assert
        assert_eq!(file.sections.len(), 2);
        assert_eq!(file.sections[0].kind, SectionKind::Settings);
        let doc = &file.sections[0].statements[0];
        assert_eq!(doc.arg_values(), vec!["Suite doc", "continued"]);
        assert_eq!(doc.end_line, 3);
        assert_eq!(file.sections[1].kind, SectionKind::TestCases);
        assert_eq!(file.sections[1].start_line, 6);
    }

    #[test]
    fn builds_blocks_with_spans() {
        let file = SourceFile::parse("suite.robot", SUITE);
        let tests: Vec<_> = file.tests().collect();

        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].name.value, "First Test");
        assert_eq!(tests[0].end_line, 13);
        assert_eq!(tests[0].span_end, 14);
        assert_eq!(tests[1].statements[0].name.value, "Log");
        assert_eq!(tests[1].statements[0].indent, 15);
    }

    #[test]
    fn classifies_body_statements() {
        let file = SourceFile::parse("suite.robot", SUITE);
        let first = file.tests().next().expect("test");
        let kinds: Vec<_> = first.statements.iter().map(|s| s.kind).collect();

        assert_eq!(
            kinds,
            vec![
                StatementKind::BlockSetting,
                StatementKind::KeywordCall,
                StatementKind::Control,
                StatementKind::KeywordCall,
                StatementKind::Control,
            ]
        );
        assert_eq!(first.statements[0].setting_name(), "Tags");
        assert_eq!(first.statements[1].assign[0].value, "${value}=");
        assert_eq!(first.statements[1].name.value, "Get Value");
    }

    #[test]
    fn tracks_control_depth() {
        let file = SourceFile::parse("suite.robot", SUITE);
        let first = file.tests().next().expect("test");
        let depths: Vec<_> = first.statements.iter().map(|s| s.depth).collect();
        assert_eq!(depths, vec![0, 0, 0, 1, 0]);
    }

    #[test]
    fn detects_line_endings() {
        let windows = SourceFile::parse("a.robot", "*** Settings ***\r\nLibrary  X\r\n");
        let unix = SourceFile::parse("a.robot", "*** Settings ***\nLibrary  X");

        assert_eq!(windows.line_ending, LineEnding::Windows);
        assert_eq!(windows.lines[0].text, "*** Settings ***");
        assert!(windows.ends_with_newline);
        assert_eq!(unix.line_ending, LineEnding::Unix);
        assert!(!unix.ends_with_newline);
    }

    #[test]
    fn lines_before_first_header_form_implicit_section() {
        let file = SourceFile::parse("a.robot", "# comment\n\n*** Keywords ***\nKw\n    No Operation\n");
        assert_eq!(file.sections[0].kind, SectionKind::Implicit);
        assert_eq!(file.sections[0].end_line, 2);
        assert_eq!(file.keywords().count(), 1);
    }

    #[test]
    fn file_kind_follows_path() {
        assert_eq!(SourceFile::parse("a.resource", "").kind, FileKind::Resource);
        assert_eq!(SourceFile::parse("dir/__init__.robot", "").kind, FileKind::Init);
        assert_eq!(SourceFile::parse("a.robot", "").kind, FileKind::Suite);
    }
}
