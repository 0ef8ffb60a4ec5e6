//! Exposure scheduling errors.

use shutterline_common::ShutterlineError;

/// Errors raised while constructing or driving an exposure schedule.
///
/// All of these are configuration errors: they are detected before any
/// rendering starts and retrying cannot resolve them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExposureError {
    #[error("Invalid read-out line pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: Vec<u32>, reason: String },

    #[error("Invalid exposure timing: {message}")]
    InvalidTiming { message: String },

    #[error(
        "Insufficient scene frame resolution for rolling shutter render. \
         Scene FPS needs to be at least {required_fps}"
    )]
    SceneFpsTooLow { required_fps: f64 },

    #[error("Invalid read-out loop step: 0")]
    ZeroLoopStep,
}

/// Result type alias using ExposureError.
pub type ExposureResult<T> = Result<T, ExposureError>;

impl ExposureError {
    pub fn timing(msg: impl Into<String>) -> Self {
        Self::InvalidTiming {
            message: msg.into(),
        }
    }

    pub(crate) fn pattern(pattern: &[u32], reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_vec(),
            reason: reason.into(),
        }
    }
}

impl From<ExposureError> for ShutterlineError {
    fn from(err: ExposureError) -> Self {
        ShutterlineError::config(err.to_string())
    }
}
