//! Shutterline Render Engine
//!
//! Drives a host renderer through a render job, frame by frame, with the
//! file system as the only record of progress.
//!
//! # Render Loops
//!
//! ```text
//!                 ┌── standard ────── one render per target frame and output
//! job ── driver ──┤
//!                 └── rolling shutter ── per target frame:
//!                          scheduler step ── skip if rendered
//!                               │
//!                               ├── row band -> render border
//!                               ├── render scene frame
//!                               └── progress log
//! ```
//!
//! Re-running a job skips every output that already exists, so a failed
//! run is resumed by running it again.

pub mod border;
pub mod driver;
pub mod dry_run;
pub mod frame_log;
pub mod host;
pub mod progress;
pub mod rolling;
pub mod rs_config;
pub mod standard;

pub use border::{RenderBorder, SceneBorder};
pub use driver::*;
pub use dry_run::{DryRunHost, HostCalls};
pub use host::RenderHost;
pub use progress::{ProgressCallback, RenderProgress, RenderStage};
pub use rolling::RollingShutterRender;
pub use rs_config::RsConfig;
pub use standard::StandardRender;
