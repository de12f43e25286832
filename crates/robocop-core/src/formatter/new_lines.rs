//! Empty lines between sections, test cases and keywords

use super::{changed, Formatter, FormattingConfig};
use crate::errors::RobocopResult;
use crate::linter::rules::{ParamKind, ParamValue, RuleParam};
use crate::model::{Section, SectionKind, SourceFile};

#[derive(Debug)]
pub struct NormalizeNewLines {
    section_lines: usize,
    test_case_lines: usize,
    keyword_lines: usize,
    consecutive_lines: usize,
}

impl Default for NormalizeNewLines {
    fn default() -> Self {
        NormalizeNewLines { section_lines: 2, test_case_lines: 1, keyword_lines: 1, consecutive_lines: 1 }
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

impl NormalizeNewLines {
    /// Lines without leading or trailing blanks and with inner blank runs capped
    fn tidy<'a>(&self, texts: impl Iterator<Item = &'a str>, collapse: bool) -> Vec<String> {
        let mut result: Vec<String> = Vec::new();
        let mut blanks = 0;
        for text in texts {
            if is_blank(text) {
                blanks += 1;
                continue;
            }
            if !result.is_empty() {
                let keep = if collapse { blanks.min(self.consecutive_lines) } else { blanks };
                result.extend(std::iter::repeat(String::new()).take(keep));
            }
            blanks = 0;
            result.push(text.to_string());
        }
        result
    }

    fn range<'a>(file: &'a SourceFile, from: usize, to: usize) -> impl Iterator<Item = &'a str> {
        (from..=to).filter_map(move |number| file.line(number)).map(|line| line.text.as_str())
    }

    fn section_body(&self, file: &SourceFile, section: &Section) -> Vec<String> {
        let first = section.header_line.map_or(section.start_line, |header| header + 1);
        let collapse = section.kind != SectionKind::Comments;
        if !section.kind.has_blocks() || section.blocks.is_empty() {
            return self.tidy(Self::range(file, first, section.end_line), collapse);
        }
        let between = if section.kind == SectionKind::Keywords { self.keyword_lines } else { self.test_case_lines };

        let mut chunks = Vec::new();
        if let Some(block) = section.blocks.first() {
            let preamble = self.tidy(Self::range(file, first, block.line.saturating_sub(1)), collapse);
            if !preamble.is_empty() {
                chunks.push(preamble);
            }
        }
        for block in &section.blocks {
            chunks.push(self.tidy(Self::range(file, block.line, block.span_end), collapse));
        }
        join_chunks(chunks, between)
    }
}

fn join_chunks(chunks: Vec<Vec<String>>, empty_lines: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for chunk in chunks.into_iter().filter(|c| !c.is_empty()) {
        if !lines.is_empty() {
            lines.extend(std::iter::repeat(String::new()).take(empty_lines));
        }
        lines.extend(chunk);
    }
    lines
}

impl Formatter for NormalizeNewLines {
    fn name(&self) -> &'static str {
        "NormalizeNewLines"
    }

    fn docs(&self) -> &'static str {
        "Normalizes the number of empty lines between sections, test cases and keywords, removes \
         empty lines at the start and end of the file and limits consecutive empty lines inside \
         test cases and keywords."
    }

    fn params(&self) -> &'static [RuleParam] {
        &[
            RuleParam { name: "section_lines", default: "2", kind: ParamKind::Int, description: "empty lines between sections" },
            RuleParam { name: "test_case_lines", default: "1", kind: ParamKind::Int, description: "empty lines between test cases" },
            RuleParam { name: "keyword_lines", default: "1", kind: ParamKind::Int, description: "empty lines between keywords" },
            RuleParam {
                name: "consecutive_lines",
                default: "1",
                kind: ParamKind::Int,
                description: "maximum consecutive empty lines inside a section or block",
            },
        ]
    }

    fn set_param(&mut self, param: &str, value: ParamValue) -> RobocopResult<()> {
        if let ParamValue::Int(count) = value {
            let count = count.max(0) as usize;
            match param {
                "section_lines" => self.section_lines = count,
                "test_case_lines" => self.test_case_lines = count,
                "keyword_lines" => self.keyword_lines = count,
                "consecutive_lines" => self.consecutive_lines = count,
                _ => {}
            }
        }
        Ok(())
    }

    fn format(&self, file: &SourceFile, _config: &FormattingConfig) -> Option<String> {
        if file.lines.is_empty() {
            return None;
        }
        let chunks: Vec<Vec<String>> = file
            .sections
            .iter()
            .map(|section| {
                let header = section.header_line.and_then(|number| file.line(number)).map(|l| l.text.clone());
                header.into_iter().chain(self.section_body(file, section)).collect()
            })
            .collect();
        let lines = join_chunks(chunks, self.section_lines);
        changed(file, &lines, !lines.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(source: &str) -> Option<String> {
        NormalizeNewLines::default().format(&SourceFile::parse("a.robot", source), &FormattingConfig::default())
    }

    #[test]
    fn separates_sections_and_blocks() {
        // Arrange
        let source = "\n\n*** Settings ***\n\nLibrary    A\n*** Keywords ***\nFirst\n    Log    1\n\n\n\nSecond\n    Log    2\n\n\n";

        // Act
        let result = format(source);

        // Assert
        let expected = "*** Settings ***\nLibrary    A\n\n\n*** Keywords ***\nFirst\n    Log    1\n\nSecond\n    Log    2\n";
        assert_eq!(result.as_deref(), Some(expected));
    }

    #[test]
    fn caps_consecutive_lines_inside_block() {
        let source = "*** Test Cases ***\nTest\n    Log    1\n\n\n    Log    2\n";
        let expected = "*** Test Cases ***\nTest\n    Log    1\n\n    Log    2\n";
        assert_eq!(format(source).as_deref(), Some(expected));
    }

    #[test]
    fn adds_missing_final_newline() {
        assert_eq!(format("*** Keywords ***\nKw\n    No Operation").as_deref(), Some("*** Keywords ***\nKw\n    No Operation\n"));
    }

    #[test]
    fn configured_keyword_lines() {
        let mut formatter = NormalizeNewLines::default();
        formatter.set_param("keyword_lines", ParamValue::Int(2)).unwrap();
        let file = SourceFile::parse("a.robot", "*** Keywords ***\nA\n    Log    1\nB\n    Log    2\n");
        let expected = "*** Keywords ***\nA\n    Log    1\n\n\nB\n    Log    2\n";
        assert_eq!(formatter.format(&file, &FormattingConfig::default()).as_deref(), Some(expected));
    }

    #[test]
    fn leading_comments_count_as_section() {
        let source = "# header comment\n*** Settings ***\nLibrary    A\n";
        let expected = "# header comment\n\n\n*** Settings ***\nLibrary    A\n";
        assert_eq!(format(source).as_deref(), Some(expected));
    }
}
