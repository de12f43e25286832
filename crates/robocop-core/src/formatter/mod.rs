//! Formatter: rewrites sources through a fixed pipeline of formatters
//!
//! Each formatter looks at a freshly parsed [`SourceFile`] and returns the new
//! text when it changes something. The pipeline re-parses after every change
//! and repeats itself up to `reruns` extra times until the text is stable.

mod empty_settings;
mod empty_values;
mod new_lines;
mod section_header;
mod separators;
mod setting_name;
mod tags;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use similar::TextDiff;

pub use empty_settings::RemoveEmptySettings;
pub use empty_values::ReplaceEmptyValues;
pub use new_lines::NormalizeNewLines;
pub use section_header::NormalizeSectionHeaderName;
pub use separators::NormalizeSeparators;
pub use setting_name::NormalizeSettingName;
pub use tags::NormalizeTags;

use crate::config::{ConfigManager, FormatConfig, LineEndingMode, Separator};
use crate::errors::{did_you_mean, RobocopError, RobocopResult};
use crate::files::display_path;
use crate::linter::matcher::Configure;
use crate::linter::read_source;
use crate::linter::rules::{parse_bool, ParamValue, RuleParam};
use crate::model::{Cell, Line, LineEnding, SourceFile};

lazy_static! {
    static ref FMT_OFF: Regex = Regex::new(r"(?i)^#\s*fmt\s*:\s*off\b").expect("valid regex");
}

pub trait Formatter {
    fn name(&self) -> &'static str;
    fn docs(&self) -> &'static str;

    fn enabled_by_default(&self) -> bool {
        true
    }

    fn params(&self) -> &'static [RuleParam] {
        &[]
    }

    /// Receives a value already converted to the type declared in `params`.
    fn set_param(&mut self, _param: &str, _value: ParamValue) -> RobocopResult<()> {
        Ok(())
    }

    /// New text of the file, `None` when nothing changes.
    fn format(&self, file: &SourceFile, config: &FormattingConfig) -> Option<String>;
}

/// Applies `name.param=value` to a formatter. `enabled` is handled by the caller.
pub fn configure_formatter(formatter: &mut dyn Formatter, param: &str, value: &str) -> RobocopResult<()> {
    let Some(spec) = formatter.params().iter().find(|p| p.name == param) else {
        let available = std::iter::once("enabled")
            .chain(formatter.params().iter().map(|p| p.name))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(RobocopError::InvalidParam {
            name: formatter.name().to_string(),
            param: param.to_string(),
            available,
        });
    };
    let value = ParamValue::parse(spec.kind, param, value)?;
    formatter.set_param(param, value)
}

pub(crate) fn invalid_choice(param: &str, value: &str, choices: &str) -> RobocopError {
    RobocopError::InvalidParamValue {
        param: param.to_string(),
        value: value.to_string(),
        message: format!("expected one of: {}", choices),
        kind: "str".to_string(),
    }
}

/// Built-in formatters in execution order
pub fn builtin_formatters() -> Vec<Box<dyn Formatter>> {
    vec![
        Box::new(NormalizeSectionHeaderName::default()),
        Box::new(NormalizeSettingName),
        Box::new(RemoveEmptySettings::default()),
        Box::new(ReplaceEmptyValues),
        Box::new(NormalizeTags::default()),
        Box::new(NormalizeNewLines::default()),
        Box::new(NormalizeSeparators::default()),
    ]
}

// ============================================================================
// Formatting configuration
// ============================================================================

/// Whitespace and layout settings shared by all formatters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattingConfig {
    pub separator: String,
    pub indent: String,
    pub continuation_indent: String,
    pub line_length: usize,
    pub line_ending: LineEndingMode,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        FormattingConfig::from_config(&FormatConfig::default())
    }
}

impl FormattingConfig {
    pub fn from_config(config: &FormatConfig) -> FormattingConfig {
        let whitespace = |count: usize| match config.separator {
            Separator::Space => " ".repeat(count),
            Separator::Tab => "\t".to_string(),
        };
        FormattingConfig {
            separator: whitespace(config.space_count),
            indent: whitespace(config.indent.unwrap_or(config.space_count)),
            continuation_indent: whitespace(config.continuation_indent.unwrap_or(config.space_count)),
            line_length: config.line_length,
            line_ending: config.line_ending,
        }
    }

    pub fn indent_for(&self, depth: usize) -> String {
        self.indent.repeat(depth)
    }

    pub fn line_ending_for(&self, file: &SourceFile) -> &'static str {
        match self.line_ending {
            LineEndingMode::Native if cfg!(windows) => "\r\n",
            LineEndingMode::Native | LineEndingMode::Unix => "\n",
            LineEndingMode::Windows => "\r\n",
            LineEndingMode::Auto => file.line_ending.as_str(),
        }
    }
}

// ============================================================================
// Text helpers shared by formatters
// ============================================================================

/// Text of the parsed file with `\n` line endings.
pub fn source_text(file: &SourceFile) -> String {
    let lines: Vec<&str> = file.lines.iter().map(|l| l.text.as_str()).collect();
    join_lines(&lines, file.ends_with_newline)
}

pub fn join_lines<S: AsRef<str>>(lines: &[S], final_newline: bool) -> String {
    let mut text = lines.iter().map(|l| l.as_ref()).collect::<Vec<_>>().join("\n");
    if final_newline && !lines.is_empty() {
        text.push('\n');
    }
    text
}

/// `Some(text)` when `lines` differ from the file.
pub fn changed<S: AsRef<str>>(file: &SourceFile, lines: &[S], final_newline: bool) -> Option<String> {
    let text = join_lines(lines, final_newline);
    (text != source_text(file)).then_some(text)
}

/// Replaces a single cell of a line, keeping everything around it.
pub fn replace_cell(text: &str, cell: &Cell, value: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let start = (cell.column - 1).min(chars.len());
    let end = (start + cell.value.chars().count()).min(chars.len());
    let mut result: String = chars[..start].iter().collect();
    result.push_str(value);
    result.extend(&chars[end..]);
    result
}

/// Leading whitespace of a line as written.
pub fn indentation(line: &Line) -> String {
    line.text.chars().take(line.indent).collect()
}

/// Line built from cells joined by `separator`, with an optional trailing comment.
pub fn build_line(prefix: &str, cells: &[&str], comment: Option<&str>, separator: &str) -> String {
    let mut text = String::from(prefix);
    text.push_str(&cells.join(separator));
    if let Some(comment) = comment {
        if !cells.is_empty() {
            text.push_str(separator);
        }
        text.push_str(comment);
    }
    text
}

/// A `# fmt: off` comment line before the first section header disables
/// formatting of the whole file.
pub fn formatting_disabled(file: &SourceFile) -> bool {
    file.lines
        .iter()
        .take_while(|line| !line.is_header())
        .filter_map(|line| line.comment.as_ref().filter(|_| line.is_comment_only()))
        .any(|comment| FMT_OFF.is_match(&comment.value))
}

// ============================================================================
// Selection and pipeline
// ============================================================================

/// Formatters enabled for one configuration, in execution order
pub struct FormatterSet {
    formatters: Vec<Box<dyn Formatter>>,
    reruns: usize,
}

fn unknown_formatter(name: &str, formatters: &[Box<dyn Formatter>]) -> RobocopError {
    RobocopError::FormatterDoesNotExist {
        name: name.to_string(),
        suggestion: did_you_mean(name, formatters.iter().map(|f| f.name())),
    }
}

fn formatter_names(values: &[String]) -> impl Iterator<Item = &str> {
    values.iter().flat_map(|v| v.split(',')).map(str::trim).filter(|v| !v.is_empty())
}

impl FormatterSet {
    pub fn from_config(config: &FormatConfig) -> RobocopResult<FormatterSet> {
        let mut formatters = builtin_formatters();
        let mut enabled: HashMap<&'static str, bool> =
            formatters.iter().map(|f| (f.name(), f.enabled_by_default())).collect();

        let find = |formatters: &[Box<dyn Formatter>], name: &str| {
            formatters.iter().position(|f| f.name().eq_ignore_ascii_case(name))
        };

        let select: Vec<&str> = formatter_names(&config.select).collect();
        let extend: Vec<&str> = formatter_names(&config.extend_select).collect();
        if !select.is_empty() {
            enabled.values_mut().for_each(|on| *on = false);
        }
        for name in select.iter().chain(&extend) {
            let index = find(&formatters, name).ok_or_else(|| unknown_formatter(name, &formatters))?;
            enabled.insert(formatters[index].name(), true);
        }

        for raw in &config.configure {
            let configure: Configure = raw.parse()?;
            let index = find(&formatters, &configure.name)
                .ok_or_else(|| unknown_formatter(&configure.name, &formatters))?;
            if configure.param == "enabled" {
                let on = parse_bool(&configure.value).ok_or_else(|| RobocopError::InvalidParamValue {
                    param: configure.param.clone(),
                    value: configure.value.clone(),
                    message: "expected true or false".to_string(),
                    kind: "bool".to_string(),
                })?;
                enabled.insert(formatters[index].name(), on);
                continue;
            }
            configure_formatter(formatters[index].as_mut(), &configure.param, &configure.value)?;
        }

        formatters.retain(|f| enabled.get(f.name()).copied().unwrap_or(false));
        Ok(FormatterSet { formatters, reruns: config.reruns })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.formatters.iter().map(|f| f.name()).collect()
    }

    /// Formats source text; `None` when the result equals the input.
    pub fn format_text(&self, path: &Path, text: &str, config: &FormattingConfig) -> Option<String> {
        let original = SourceFile::parse(path, text);
        if formatting_disabled(&original) {
            return None;
        }
        let mut file = original.clone();
        for _ in 0..=self.reruns {
            let mut pass_changed = false;
            for formatter in &self.formatters {
                if let Some(new_text) = formatter.format(&file, config) {
                    file = SourceFile::parse(path, &new_text);
                    pass_changed = true;
                }
            }
            if !pass_changed {
                break;
            }
        }
        let ending = config.line_ending_for(&original);
        let mut formatted = source_text(&file);
        if ending != LineEnding::Unix.as_str() {
            formatted = formatted.replace('\n', ending);
        }
        (formatted != text).then_some(formatted)
    }
}

// ============================================================================
// Runner
// ============================================================================

#[derive(Debug, Default)]
pub struct FormatOutcome {
    pub files: usize,
    /// Sources whose formatting changed or would change
    pub changed: Vec<PathBuf>,
    pub diffs: Vec<String>,
    pub notices: Vec<String>,
    pub exit_code: i32,
}

pub fn unified_diff(old: &str, new: &str, path: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(&format!("{} (before)", path), &format!("{} (after)", path))
        .to_string()
}

/// Formats every source of a run according to its configuration
pub struct SourceFormatter {
    manager: ConfigManager,
}

impl SourceFormatter {
    pub fn new(manager: ConfigManager) -> SourceFormatter {
        SourceFormatter { manager }
    }

    pub fn manager(&self) -> &ConfigManager {
        &self.manager
    }

    pub fn run(&mut self) -> RobocopResult<FormatOutcome> {
        let mut outcome = FormatOutcome::default();
        let mut sets: HashMap<Option<PathBuf>, (FormatterSet, FormattingConfig)> = HashMap::new();
        let cwd = self.manager.cwd().to_path_buf();
        let mut check = false;

        for (path, config) in self.manager.paths()? {
            let Some(text) = read_source(&path)? else {
                outcome.notices.push(format!("Failed to decode {}. Skipping file", path.display()));
                continue;
            };
            outcome.files += 1;
            if !sets.contains_key(&config.config_source) {
                let formatters = FormatterSet::from_config(&config.format)?;
                sets.insert(
                    config.config_source.clone(),
                    (formatters, FormattingConfig::from_config(&config.format)),
                );
            }
            let Some((formatters, formatting)) = sets.get(&config.config_source) else { continue };
            check |= config.format.check;

            let Some(formatted) = formatters.format_text(&path, &text, formatting) else { continue };
            if config.format.diff {
                let shown = display_path(&path, &cwd).display().to_string();
                outcome.diffs.push(unified_diff(&text, &formatted, &shown));
            }
            if config.format.overwrite() {
                fs::write(&path, &formatted).map_err(|e| RobocopError::io(&path, e))?;
            }
            outcome.changed.push(path);
        }

        outcome.exit_code = if check && !outcome.changed.is_empty() { 1 } else { 0 };
        Ok(outcome)
    }
}
