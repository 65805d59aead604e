//! Error types for graphnets-cli

use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

use graphnets::GraphNetsError;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Config file not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Bad command-line value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error from the model library
    #[error(transparent)]
    Model(#[from] GraphNetsError),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Numeric process status for this error
    pub(crate) fn status(&self) -> u8 {
        match self {
            Self::FileNotFound(_) => 3,
            Self::InvalidArgument(_) => 2,
            Self::Model(GraphNetsError::Serialization(_))
            | Self::Model(GraphNetsError::InvalidHyperparameter { .. }) => 4,
            Self::Model(GraphNetsError::Io(_)) => 7,
            Self::Model(_) => 1,
            Self::Json(_) => 5,
        }
    }

    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_share_exit_code() {
        let invalid = CliError::from(GraphNetsError::invalid_hyperparameter("num_layers", 0, "> 0"));
        let parse = CliError::from(GraphNetsError::from(
            serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        ));
        assert_eq!(invalid.status(), 4);
        assert_eq!(parse.status(), 4);
    }

    #[test]
    fn test_model_error_message_is_transparent() {
        let err = CliError::from(GraphNetsError::empty_input("snapshot sequence"));
        assert_eq!(err.to_string(), "empty input: snapshot sequence");
    }
}
