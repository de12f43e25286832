//! Test builders for creating Robot Framework sources easily

use std::path::Path;

use robocop_core::config::{FormatConfig, LintConfig};
use robocop_core::formatter::{FormatterSet, FormattingConfig};
use robocop_core::linter::lint_text;
use robocop_core::Diagnostic;

/// Builder for suite and resource sources
///
/// Sections are written in the order they are first used. Test case and
/// keyword steps are indented with four spaces.
///
/// # Example
///
/// ```rust
/// use robocop_test_utils::SuiteBuilder;
///
/// let diagnostics = SuiteBuilder::new()
///     .setting("Library    Collections")
///     .keyword("Undocumented")
///         .step("Log    x")
///     .lint(&["missing-doc-keyword"]);
///
/// assert_eq!(diagnostics.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SuiteBuilder {
    file_name: Option<String>,
    sections: Vec<(String, Vec<String>)>,
}

impl SuiteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// File name used for diagnostics, `suite.robot` by default
    pub fn named(mut self, file_name: &str) -> Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    fn section(&mut self, header: &str) -> &mut Vec<String> {
        let index = match self.sections.iter().position(|(name, _)| name == header) {
            Some(index) => index,
            None => {
                self.sections.push((header.to_string(), Vec::new()));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index].1
    }

    fn current(&mut self) -> &mut Vec<String> {
        if self.sections.is_empty() {
            self.sections.push(("*** Test Cases ***".to_string(), Vec::new()));
        }
        let last = self.sections.len() - 1;
        &mut self.sections[last].1
    }

    pub fn setting(mut self, line: &str) -> Self {
        self.section("*** Settings ***").push(line.to_string());
        self
    }

    pub fn variable(mut self, name: &str, values: &[&str]) -> Self {
        let line = std::iter::once(name).chain(values.iter().copied()).collect::<Vec<_>>().join("    ");
        self.section("*** Variables ***").push(line);
        self
    }

    /// Starts a test case; following `step` calls belong to it
    pub fn test(mut self, name: &str) -> Self {
        let section = self.section("*** Test Cases ***");
        if !section.is_empty() {
            section.push(String::new());
        }
        section.push(name.to_string());
        self.move_to_end("*** Test Cases ***");
        self
    }

    /// Starts a keyword; following `step` calls belong to it
    pub fn keyword(mut self, name: &str) -> Self {
        let section = self.section("*** Keywords ***");
        if !section.is_empty() {
            section.push(String::new());
        }
        section.push(name.to_string());
        self.move_to_end("*** Keywords ***");
        self
    }

    /// Body line of the current test case or keyword
    pub fn step(mut self, line: &str) -> Self {
        self.current().push(format!("    {}", line));
        self
    }

    /// Raw line appended to the last section
    pub fn raw(mut self, line: &str) -> Self {
        self.current().push(line.to_string());
        self
    }

    // keeps `step` targeting the section that was used last
    fn move_to_end(&mut self, header: &str) {
        if let Some(index) = self.sections.iter().position(|(name, _)| name == header) {
            let section = self.sections.remove(index);
            self.sections.push(section);
        }
    }

    pub fn file_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("suite.robot")
    }

    /// Source text, sections separated by two empty lines
    pub fn build(&self) -> String {
        let sections: Vec<String> = self
            .sections
            .iter()
            .map(|(header, lines)| std::iter::once(header.clone()).chain(lines.iter().cloned()).collect::<Vec<_>>().join("\n"))
            .collect();
        format!("{}\n", sections.join("\n\n\n"))
    }

    /// Lints with only the given rules selected, or the default rules when empty
    pub fn lint(&self, select: &[&str]) -> Vec<Diagnostic> {
        let config = LintConfig { select: select.iter().map(|s| s.to_string()).collect(), ..LintConfig::default() };
        self.lint_with(&config)
    }

    pub fn lint_with(&self, config: &LintConfig) -> Vec<Diagnostic> {
        lint_text(self.file_name(), &self.build(), config).expect("valid lint configuration")
    }

    /// Formatted text, `None` when already formatted
    pub fn format(&self) -> Option<String> {
        self.format_with(&FormatConfig::default())
    }

    pub fn format_with(&self, config: &FormatConfig) -> Option<String> {
        let formatters = FormatterSet::from_config(config).expect("valid format configuration");
        let formatting = FormattingConfig {
            line_ending: robocop_core::config::LineEndingMode::Unix,
            ..FormattingConfig::from_config(config)
        };
        formatters.format_text(Path::new(self.file_name()), &self.build(), &formatting)
    }
}
