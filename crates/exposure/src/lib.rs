//! Shutterline Exposure Scheduler
//!
//! Translates a physical rolling-shutter camera model into a sequence of
//! discrete render passes:
//! - **Timing:** target frame rate and frame time, scene frame rate, sensor
//!   rows, and the number of readouts merged per render
//! - **Schedule:** effective timing constants rounded to whole scene frames
//! - **Readout loop:** for one target frame, the ordered steps each naming
//!   the scene frame to render and the band of sensor rows it exposes
//!
//! The loop can be split across independent workers with a
//! [`LoopPartition`]: worker `k` of `n` walks steps `k, k + n, k + 2n, ...`.
//!
//! All rounding follows round-half-to-even so that row bands and scene
//! frames reproduce existing captures exactly.

pub mod error;
pub mod report;
pub mod rounding;
pub mod rs_exp;
pub mod schedule;

pub use error::*;
pub use report::RsExpReport;
pub use rs_exp::*;
pub use schedule::*;
