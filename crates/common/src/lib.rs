//! Shutterline Common Utilities
//!
//! Shared infrastructure for all Shutterline crates:
//! - Error types and result aliases
//! - Stopwatch, wall-clock stamps, and duration formatting for render logs
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
