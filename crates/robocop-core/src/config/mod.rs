//! Robocop configuration
//!
//! A [`Config`] is built from three layers: built-in defaults, one
//! configuration file and command line overrides. Files and overrides are both
//! expressed as a [`RawConfig`], so the same [`Config::apply`] merges either.

pub mod files;
pub mod manager;

use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::diagnostics::Severity;
use crate::errors::{RobocopError, RobocopResult};

pub use manager::{ConfigManager, ManagerOptions};

/// File names searched in every directory, in priority order
pub const CONFIG_NAMES: [&str; 3] = ["robocop.toml", "pyproject.toml", "robot.toml"];

pub const DEFAULT_EXCLUDE: &[&str] =
    &[".direnv", ".eggs", ".git", ".hg", ".nox", ".tox", ".venv", "venv", ".svn"];

pub const DEFAULT_ISSUE_FORMAT: &str = "{source}:{line}:{col} [{severity}] {rule_id} {desc} ({name})";

pub const ROBOT_EXTENSIONS: [&str; 2] = ["robot", "resource"];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, Display, EnumString, IntoStaticStr, EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Separator {
    #[default]
    Space,
    Tab,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, Display, EnumString, IntoStaticStr, EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LineEndingMode {
    #[default]
    Native,
    Windows,
    Unix,
    /// Keep the line ending detected in each file
    Auto,
}

// ============================================================================
// Resolved configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CommonConfig {
    pub exclude: Vec<String>,
    pub default_exclude: Vec<String>,
    pub extend_exclude: Vec<String>,
    pub language: Vec<String>,
    pub verbose: bool,
    pub silent: bool,
}

impl Default for CommonConfig {
    fn default() -> Self {
        CommonConfig {
            exclude: Vec::new(),
            default_exclude: DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect(),
            extend_exclude: Vec::new(),
            language: vec!["en".to_string()],
            verbose: false,
            silent: false,
        }
    }
}

impl CommonConfig {
    /// Every exclusion pattern in effect
    pub fn exclusions(&self) -> impl Iterator<Item = &String> {
        self.default_exclude.iter().chain(&self.exclude).chain(&self.extend_exclude)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LintConfig {
    pub select: Vec<String>,
    pub extend_select: Vec<String>,
    pub ignore: Vec<String>,
    pub configure: Vec<String>,
    pub reports: Vec<String>,
    pub threshold: Severity,
    pub issue_format: String,
    pub exit_zero: bool,
    /// Store report results of this run for the next one
    pub persistent: bool,
    /// Show differences against the stored results of the previous run
    pub compare_runs: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        LintConfig {
            select: Vec::new(),
            extend_select: Vec::new(),
            ignore: Vec::new(),
            configure: Vec::new(),
            reports: Vec::new(),
            threshold: Severity::Info,
            issue_format: DEFAULT_ISSUE_FORMAT.to_string(),
            exit_zero: false,
            persistent: false,
            compare_runs: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatConfig {
    pub select: Vec<String>,
    pub extend_select: Vec<String>,
    pub configure: Vec<String>,
    pub space_count: usize,
    pub indent: Option<usize>,
    pub continuation_indent: Option<usize>,
    pub line_length: usize,
    pub separator: Separator,
    pub line_ending: LineEndingMode,
    /// `None` means "overwrite unless running with `check`"
    pub overwrite: Option<bool>,
    pub diff: bool,
    pub check: bool,
    pub reruns: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        FormatConfig {
            select: Vec::new(),
            extend_select: Vec::new(),
            configure: Vec::new(),
            space_count: 4,
            indent: None,
            continuation_indent: None,
            line_length: 120,
            separator: Separator::Space,
            line_ending: LineEndingMode::Native,
            overwrite: None,
            diff: false,
            check: false,
            reruns: 0,
        }
    }
}

impl FormatConfig {
    pub fn overwrite(&self) -> bool {
        self.overwrite.unwrap_or(!self.check)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// File the configuration was loaded from, `None` for defaults only
    pub config_source: Option<PathBuf>,
    pub common: CommonConfig,
    pub lint: LintConfig,
    pub format: FormatConfig,
}

// ============================================================================
// Raw layers
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawCommon {
    pub exclude: Vec<String>,
    pub default_exclude: Option<Vec<String>>,
    pub extend_exclude: Vec<String>,
    pub language: Vec<String>,
    pub verbose: Option<bool>,
    pub silent: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawLint {
    pub select: Vec<String>,
    pub extend_select: Vec<String>,
    pub ignore: Vec<String>,
    pub configure: Vec<String>,
    pub reports: Vec<String>,
    pub threshold: Option<String>,
    pub issue_format: Option<String>,
    pub exit_zero: Option<bool>,
    pub persistent: Option<bool>,
    pub compare_runs: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawFormat {
    pub select: Vec<String>,
    pub extend_select: Vec<String>,
    pub configure: Vec<String>,
    pub space_count: Option<usize>,
    pub indent: Option<usize>,
    pub continuation_indent: Option<usize>,
    pub line_length: Option<usize>,
    pub separator: Option<String>,
    pub line_ending: Option<String>,
    pub overwrite: Option<bool>,
    pub diff: Option<bool>,
    pub check: Option<bool>,
    pub reruns: Option<usize>,
}

/// One configuration layer, as read from a file or collected from the CLI
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConfig {
    pub common: RawCommon,
    pub lint: RawLint,
    pub format: RawFormat,
}

pub const COMMON_KEYS: &[&str] =
    &["exclude", "default_exclude", "extend_exclude", "language", "verbose", "silent", "lint", "format"];
pub const LINT_KEYS: &[&str] = &[
    "select",
    "extend_select",
    "ignore",
    "configure",
    "reports",
    "threshold",
    "issue_format",
    "exit_zero",
    "persistent",
    "compare_runs",
];
pub const FORMAT_KEYS: &[&str] = &[
    "select",
    "extend_select",
    "configure",
    "space_count",
    "indent",
    "continuation_indent",
    "line_length",
    "separator",
    "line_ending",
    "overwrite",
    "diff",
    "check",
    "reruns",
];

/// `--ignore-git-dir` and `ignore-git-dir` both become `ignore_git_dir`.
pub fn normalize_config_key(key: &str) -> String {
    key.trim_start_matches("--").replace('-', "_")
}

fn replace_if_set(target: &mut Vec<String>, layer: &[String]) {
    if !layer.is_empty() {
        *target = layer.to_vec();
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, choices: &str) -> RobocopResult<T> {
    value.parse().map_err(|_| RobocopError::InvalidConfigValue {
        key: key.to_string(),
        message: format!("'{}' is not one of: {}", value, choices),
    })
}

impl Config {
    /// Merges a layer on top of this configuration.
    ///
    /// Scalars set in the layer win, `select`, `ignore`, `exclude` and `reports`
    /// are replaced by a non-empty list, `configure`, `extend_select` and
    /// `extend_exclude` are appended.
    pub fn apply(&mut self, raw: &RawConfig) -> RobocopResult<()> {
        let common = &raw.common;
        replace_if_set(&mut self.common.exclude, &common.exclude);
        if let Some(default_exclude) = &common.default_exclude {
            self.common.default_exclude = default_exclude.clone();
        }
        self.common.extend_exclude.extend(common.extend_exclude.iter().cloned());
        replace_if_set(&mut self.common.language, &common.language);
        if let Some(verbose) = common.verbose {
            self.common.verbose = verbose;
        }
        if let Some(silent) = common.silent {
            self.common.silent = silent;
        }

        let lint = &raw.lint;
        replace_if_set(&mut self.lint.select, &lint.select);
        self.lint.extend_select.extend(lint.extend_select.iter().cloned());
        replace_if_set(&mut self.lint.ignore, &lint.ignore);
        self.lint.configure.extend(lint.configure.iter().cloned());
        replace_if_set(&mut self.lint.reports, &lint.reports);
        if let Some(threshold) = &lint.threshold {
            self.lint.threshold = threshold
                .parse()
                .map_err(|_| RobocopError::InvalidSeverity(threshold.to_string()))?;
        }
        if let Some(issue_format) = &lint.issue_format {
            self.lint.issue_format = issue_format.clone();
        }
        if let Some(exit_zero) = lint.exit_zero {
            self.lint.exit_zero = exit_zero;
        }
        if let Some(persistent) = lint.persistent {
            self.lint.persistent = persistent;
        }
        if let Some(compare_runs) = lint.compare_runs {
            self.lint.compare_runs = compare_runs;
        }

        let format = &raw.format;
        replace_if_set(&mut self.format.select, &format.select);
        self.format.extend_select.extend(format.extend_select.iter().cloned());
        self.format.configure.extend(format.configure.iter().cloned());
        if let Some(space_count) = format.space_count {
            self.format.space_count = space_count;
        }
        if format.indent.is_some() {
            self.format.indent = format.indent;
        }
        if format.continuation_indent.is_some() {
            self.format.continuation_indent = format.continuation_indent;
        }
        if let Some(line_length) = format.line_length {
            self.format.line_length = line_length;
        }
        if let Some(separator) = &format.separator {
            self.format.separator = parse_value("separator", separator, "space, tab")?;
        }
        if let Some(line_ending) = &format.line_ending {
            self.format.line_ending =
                parse_value("line_ending", line_ending, "native, windows, unix, auto")?;
        }
        if format.overwrite.is_some() {
            self.format.overwrite = format.overwrite;
        }
        if let Some(diff) = format.diff {
            self.format.diff = diff;
        }
        if let Some(check) = format.check {
            self.format.check = check;
        }
        if let Some(reruns) = format.reruns {
            self.format.reruns = reruns;
        }
        Ok(())
    }

    pub fn with_layers(layers: &[&RawConfig]) -> RobocopResult<Config> {
        let mut config = Config::default();
        for layer in layers {
            config.apply(layer)?;
        }
        Ok(config)
    }
}

/// Content written by `robocop init`
pub fn default_config_toml() -> String {
    let exclude = DEFAULT_EXCLUDE.iter().map(|e| format!("\"{}\"", e)).collect::<Vec<_>>().join(", ");
    format!(
        r#"[tool.robocop]
default_exclude = [{exclude}]
exclude = []
language = ["en"]

[tool.robocop.lint]
select = []
extend_select = []
ignore = []
configure = []
reports = []
threshold = "I"
issue_format = "{issue_format}"
exit_zero = false
persistent = false
compare_runs = false

[tool.robocop.format]
select = []
extend_select = []
configure = []
space_count = 4
line_length = 120
separator = "space"
line_ending = "native"
reruns = 0
"#,
        exclude = exclude,
        issue_format = DEFAULT_ISSUE_FORMAT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.lint.threshold, Severity::Info);
        assert_eq!(config.lint.issue_format, DEFAULT_ISSUE_FORMAT);
        assert_eq!(config.format.space_count, 4);
        assert_eq!(config.format.line_length, 120);
        assert!(config.format.overwrite());
        assert!(config.common.default_exclude.contains(&".venv".to_string()));
    }

    #[test]
    fn later_layer_replaces_lists_and_appends_configure() {
        // Arrange
        let mut file_layer = RawConfig::default();
        file_layer.lint.select = vec!["DOC01".into()];
        file_layer.lint.configure = vec!["line-too-long.line_length=100".into()];
        file_layer.lint.extend_select = vec!["empty-variable".into()];
        let mut cli_layer = RawConfig::default();
        cli_layer.lint.select = vec!["DOC02".into()];
        cli_layer.lint.configure = vec!["line-too-long.severity=E".into()];

        // Act
        let config = Config::with_layers(&[&file_layer, &cli_layer]).unwrap();

        // Assert
        assert_eq!(config.lint.select, vec!["DOC02".to_string()]);
        assert_eq!(config.lint.configure.len(), 2);
        assert_eq!(config.lint.configure[1], "line-too-long.severity=E");
        assert_eq!(config.lint.extend_select, vec!["empty-variable".to_string()]);
    }

    #[test]
    fn empty_layer_keeps_previous_values() {
        let mut file_layer = RawConfig::default();
        file_layer.lint.threshold = Some("W".into());
        file_layer.format.separator = Some("tab".into());

        let config = Config::with_layers(&[&file_layer, &RawConfig::default()]).unwrap();

        assert_eq!(config.lint.threshold, Severity::Warning);
        assert_eq!(config.format.separator, Separator::Tab);
    }

    #[test]
    fn invalid_scalar_values_are_rejected() {
        let mut layer = RawConfig::default();
        layer.lint.threshold = Some("X".into());
        assert!(matches!(Config::with_layers(&[&layer]), Err(RobocopError::InvalidSeverity(_))));

        let mut layer = RawConfig::default();
        layer.format.line_ending = Some("mac".into());
        assert!(matches!(
            Config::with_layers(&[&layer]),
            Err(RobocopError::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn check_mode_disables_overwrite_unless_requested() {
        let mut layer = RawConfig::default();
        layer.format.check = Some(true);
        let config = Config::with_layers(&[&layer]).unwrap();
        assert!(!config.format.overwrite());

        layer.format.overwrite = Some(true);
        let config = Config::with_layers(&[&layer]).unwrap();
        assert!(config.format.overwrite());
    }

    #[test]
    fn normalizes_cli_style_keys() {
        assert_eq!(normalize_config_key("--extend-select"), "extend_select");
        assert_eq!(normalize_config_key("issue_format"), "issue_format");
    }
}
