//! Error types shared across Shutterline crates.

use std::path::PathBuf;

/// Top-level error type for Shutterline operations.
#[derive(Debug, thiserror::Error)]
pub enum ShutterlineError {
    /// Malformed exposure model, missing capture fields, or a scene frame
    /// rate too coarse for the requested timing. Raised before rendering.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The host renderer failed while producing a frame or exposure step.
    #[error("Render error: {message}")]
    Render { message: String },

    /// A progress log could not be written. Reported, never propagated
    /// out of a render run.
    #[error("Cannot write log file {path}: {source}")]
    LogIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Rendering is not initialized")]
    NotInitialized,

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ShutterlineError.
pub type ShutterlineResult<T> = Result<T, ShutterlineError>;

impl ShutterlineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    /// Whether the error happened before any rendering could start.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}
