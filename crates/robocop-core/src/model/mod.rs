//! In-memory model of a Robot Framework source file.
//!
//! The model is line oriented: every [`Line`] keeps its raw text next to the
//! parsed cells, and sections, statements and blocks refer back to 1-based line
//! numbers. Checkers read both views; formatters rewrite lines and re-parse.

pub mod names;
mod parser;
pub mod tokenizer;

use std::path::{Path, PathBuf};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

pub use parser::parse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub value: String,
    /// 1-based character column
    pub column: usize,
}

impl Cell {
    pub fn new(value: impl Into<String>, column: usize) -> Self {
        Cell { value: value.into(), column }
    }

    /// Column just after the last character of the cell.
    pub fn end_column(&self) -> usize {
        self.column + self.value.chars().count()
    }
}

#[derive(Debug, Clone)]
pub struct Line {
    pub number: usize,
    pub text: String,
    pub indent: usize,
    pub cells: Vec<Cell>,
    pub comment: Option<Cell>,
}

impl Line {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.comment.is_none()
    }

    pub fn is_comment_only(&self) -> bool {
        self.cells.is_empty() && self.comment.is_some()
    }

    pub fn is_header(&self) -> bool {
        self.text.starts_with('*')
    }

    pub fn first_cell(&self) -> Option<&Cell> {
        self.cells.first()
    }

    pub fn is_continuation(&self) -> bool {
        self.cells.first().map_or(false, |c| c.value == "...")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, IntoStaticStr)]
pub enum FileKind {
    Suite,
    Resource,
    Init,
}

impl FileKind {
    pub fn from_path(path: &Path) -> FileKind {
        let is_resource = path.extension().map_or(false, |ext| ext == "resource");
        let is_init = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name.starts_with("__init__"));
        if is_resource {
            FileKind::Resource
        } else if is_init {
            FileKind::Init
        } else {
            FileKind::Suite
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, IntoStaticStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SectionKind {
    Implicit,
    Settings,
    Variables,
    #[strum(serialize = "testcases")]
    TestCases,
    Tasks,
    Keywords,
    Comments,
    Invalid,
}

impl SectionKind {
    /// Resolves a header name such as `Test Cases` or `setting`.
    pub fn from_header(name: &str) -> SectionKind {
        let normalized: String =
            name.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase();
        match normalized.as_str() {
            "setting" | "settings" => SectionKind::Settings,
            "variable" | "variables" => SectionKind::Variables,
            "testcase" | "testcases" => SectionKind::TestCases,
            "task" | "tasks" => SectionKind::Tasks,
            "keyword" | "keywords" => SectionKind::Keywords,
            "comment" | "comments" => SectionKind::Comments,
            _ => SectionKind::Invalid,
        }
    }

    pub fn canonical_name(&self) -> Option<&'static str> {
        match self {
            SectionKind::Settings => Some("Settings"),
            SectionKind::Variables => Some("Variables"),
            SectionKind::TestCases => Some("Test Cases"),
            SectionKind::Tasks => Some("Tasks"),
            SectionKind::Keywords => Some("Keywords"),
            SectionKind::Comments => Some("Comments"),
            SectionKind::Implicit | SectionKind::Invalid => None,
        }
    }

    pub fn has_blocks(&self) -> bool {
        matches!(self, SectionKind::TestCases | SectionKind::Tasks | SectionKind::Keywords)
    }

    pub fn is_test_like(&self) -> bool {
        matches!(self, SectionKind::TestCases | SectionKind::Tasks)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Entry of the Settings section
    Setting,
    /// Entry of the Variables section
    Variable,
    /// `[Name]` setting inside a test case or keyword
    BlockSetting,
    KeywordCall,
    Control,
    /// Body line made of assignments only
    Invalid,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub assign: Vec<Cell>,
    pub name: Cell,
    pub args: Vec<Cell>,
    pub line: usize,
    pub end_line: usize,
    pub indent: usize,
    /// Nesting level inside control structures, 0 for top-level body statements
    pub depth: usize,
}

impl Statement {
    /// Setting name without brackets, e.g. `Tags` for `[Tags]`.
    pub fn setting_name(&self) -> &str {
        let value = self.name.value.as_str();
        match self.kind {
            StatementKind::BlockSetting => {
                value.trim_start_matches('[').trim_end_matches(']').trim()
            }
            _ => value,
        }
    }

    /// Setting name lowercased with spaces removed, e.g. `testtags`.
    pub fn normalized_setting_name(&self) -> String {
        names::normalize_robot_name(self.setting_name())
    }

    pub fn is_setting(&self, normalized: &str) -> bool {
        matches!(self.kind, StatementKind::Setting | StatementKind::BlockSetting)
            && self.normalized_setting_name() == normalized
    }

    pub fn is_control(&self, word: &str) -> bool {
        self.kind == StatementKind::Control && self.name.value == word
    }

    pub fn arg_values(&self) -> Vec<&str> {
        self.args.iter().map(|c| c.value.as_str()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub name: Cell,
    pub line: usize,
    /// Last non-empty line of the block
    pub end_line: usize,
    /// Last line before the next block or section, trailing empty lines included
    pub span_end: usize,
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn setting(&self, normalized: &str) -> Option<&Statement> {
        self.statements.iter().find(|s| s.is_setting(normalized))
    }

    pub fn keyword_calls(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().filter(|s| s.kind == StatementKind::KeywordCall)
    }
}

#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    /// Header cell as written, `None` for the implicit leading section
    pub header: Option<Cell>,
    pub header_line: Option<usize>,
    pub start_line: usize,
    pub end_line: usize,
    pub statements: Vec<Statement>,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn header_name(&self) -> Option<String> {
        self.header.as_ref().map(|cell| cell.value.trim_matches(|c| c == '*' || c == ' ').to_string())
    }

    pub fn has_data(&self) -> bool {
        !self.statements.is_empty() || !self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum LineEnding {
    Unix,
    Windows,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Unix => "\n",
            LineEnding::Windows => "\r\n",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: FileKind,
    pub lines: Vec<Line>,
    pub sections: Vec<Section>,
    pub line_ending: LineEnding,
    pub ends_with_newline: bool,
}

impl SourceFile {
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> SourceFile {
        parse(path.into(), text)
    }

    pub fn line(&self, number: usize) -> Option<&Line> {
        number.checked_sub(1).and_then(|index| self.lines.get(index))
    }

    pub fn sections_of(&self, kind: SectionKind) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| s.kind == kind)
    }

    /// Entries of every Settings section, in source order.
    pub fn settings(&self) -> impl Iterator<Item = &Statement> {
        self.sections_of(SectionKind::Settings).flat_map(|s| s.statements.iter())
    }

    pub fn setting(&self, normalized: &str) -> Option<&Statement> {
        self.settings().find(|s| s.normalized_setting_name() == normalized)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Statement> {
        self.sections_of(SectionKind::Variables).flat_map(|s| s.statements.iter())
    }

    /// Test cases and tasks.
    pub fn tests(&self) -> impl Iterator<Item = &Block> {
        self.sections.iter().filter(|s| s.kind.is_test_like()).flat_map(|s| s.blocks.iter())
    }

    pub fn keywords(&self) -> impl Iterator<Item = &Block> {
        self.sections_of(SectionKind::Keywords).flat_map(|s| s.blocks.iter())
    }

    pub fn is_templated(&self) -> bool {
        ["testtemplate", "tasktemplate"]
            .iter()
            .filter_map(|name| self.setting(name))
            .any(|s| !s.args.is_empty())
    }

    /// Values of `Test Tags` and its older spellings.
    pub fn suite_tags(&self) -> Vec<&Cell> {
        self.settings()
            .filter(|s| matches!(s.normalized_setting_name().as_str(), "testtags" | "forcetags" | "tasktags"))
            .flat_map(|s| s.args.iter())
            .collect()
    }
}
