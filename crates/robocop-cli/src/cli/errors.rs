use std::path::PathBuf;

use robocop_core::RobocopError;
use thiserror::Error;

/// Errors that end a command with exit status 2
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Robocop(#[from] RobocopError),

    /// `docs` was given a name that is not a rule, report or formatter
    #[error("There is no rule, report or formatter with name '{name}'.{suggestion}")]
    UnknownDocumentation { name: String, suggestion: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_message() {
        let error: CliError = RobocopError::InvalidSeverity("X".into()).into();
        assert_eq!(error.to_string(), "Invalid severity value 'X'. Choose one from: I, W, E");
    }
}
