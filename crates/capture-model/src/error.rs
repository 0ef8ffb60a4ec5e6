//! Errors raised while loading or validating job configuration.

use std::path::PathBuf;

use shutterline_common::ShutterlineError;

/// Errors that can occur when working with job files.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No element '{field}' given in {block}")]
    Missing {
        field: &'static str,
        block: &'static str,
    },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl ModelError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid {
            message: msg.into(),
        }
    }
}

impl From<ModelError> for ShutterlineError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Io { source, .. } => ShutterlineError::Io(source),
            other => ShutterlineError::config(other.to_string()),
        }
    }
}
