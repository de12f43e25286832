//! Error types shared by the linter, the formatter and the configuration layer

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a robocop run
#[derive(Debug, Error)]
pub enum RobocopError {
    /// Reading or writing a file failed
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file could not be parsed
    #[error("Failed to read configuration from {path}: {message}")]
    ConfigFile { path: PathBuf, message: String },

    /// A configuration file contains a key robocop does not know
    #[error("Unknown configuration key '{key}' in {path}.{suggestion}")]
    UnknownConfigKey { key: String, path: PathBuf, suggestion: String },

    /// A configuration value has the wrong shape
    #[error("Invalid value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    /// Configuration given with `--config` does not exist
    #[error("Configuration file {0} does not exist")]
    ConfigNotFound(PathBuf),

    /// Configuration file already exists
    #[error("Configuration file {0} already exists")]
    ConfigExists(PathBuf),

    #[error("Provided rule '{name}' does not exist.{suggestion}")]
    RuleDoesNotExist { name: String, suggestion: String },

    #[error("Provided formatter '{name}' does not exist.{suggestion}")]
    FormatterDoesNotExist { name: String, suggestion: String },

    #[error("Provided report '{name}' does not exist.{suggestion}")]
    ReportDoesNotExist { name: String, suggestion: String },

    /// `--configure` value is not of the form `name.param=value`
    #[error("Provided invalid config: '{0}' (general pattern: <rule>.<param>=<value>)")]
    InvalidConfigure(String),

    #[error("Provided param '{param}' for '{name}' does not exist. Available configurable(s): {available}")]
    InvalidParam { name: String, param: String, available: String },

    #[error("Failed to configure param `{param}` with value `{value}`. Received error `{message}`. Parameter type: {kind}")]
    InvalidParamValue { param: String, value: String, message: String, kind: String },

    #[error("Invalid issue format '{format}': unknown placeholder '{placeholder}'")]
    InvalidIssueFormat { format: String, placeholder: String },

    #[error("Invalid severity value '{0}'. Choose one from: I, W, E")]
    InvalidSeverity(String),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Source path passed on the command line does not exist
    #[error("Path {0} does not exist")]
    SourceNotFound(PathBuf),
}

impl RobocopError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RobocopError::Io { path: path.into(), source }
    }
}

pub type RobocopResult<T> = Result<T, RobocopError>;

/// Suffix of the form ` Did you mean: 'x'?` for the closest known name, empty when
/// nothing is close enough.
pub fn did_you_mean<'a, I>(name: &str, candidates: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = name.to_lowercase();
    let mut best: Option<(usize, &str)> = None;
    for candidate in candidates {
        let distance = edit_distance(&needle, &candidate.to_lowercase());
        let limit = (candidate.len().max(needle.len()) / 3).max(1);
        if distance > limit {
            continue;
        }
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, candidate));
        }
    }
    match best {
        Some((_, candidate)) => format!(" Did you mean: '{}'?", candidate),
        None => String::new(),
    }
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == *cb { 0 } else { 1 };
            current[j + 1] = (previous[j] + cost).min(previous[j + 1] + 1).min(current[j] + 1);
        }
        previous = current;
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("line-to-long", " Did you mean: 'line-too-long'?" ; "one typo")]
    #[test_case("DOC1", " Did you mean: 'DOC01'?" ; "missing digit")]
    #[test_case("something-else", "" ; "nothing close")]
    fn suggests_closest_name(name: &str, expected: &str) {
        let candidates = ["line-too-long", "DOC01", "empty-tags"];
        assert_eq!(did_you_mean(name, candidates), expected);
    }

    #[test]
    fn invalid_configure_message_shows_pattern() {
        let err = RobocopError::InvalidConfigure("line-too-long".to_string());
        assert_eq!(
            err.to_string(),
            "Provided invalid config: 'line-too-long' (general pattern: <rule>.<param>=<value>)"
        );
    }
}
