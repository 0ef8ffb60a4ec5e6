//! Shutterline Capture Model
//!
//! Defines the data contracts a render job is described with:
//! - **Capture:** Target frame rate, frame time, and the rolling-shutter
//!   exposure block
//! - **Camera:** Sensor row count and optional sensor metadata
//! - **Job:** Frame range, overwrite/process flags, and worker partition
//! - **Outputs:** Render output types selected by their type tag
//! - **Scene:** Frame rate, resolution, and border of a scene, used when no
//!   live host application is attached
//!
//! Keys follow the job-file wire format (`dFPS`, `mExp`, `iSenResY`, ...),
//! which downstream tools read as well.

pub mod camera;
pub mod capture;
pub mod error;
pub mod job;
pub mod output;
pub mod scene;

pub use camera::*;
pub use capture::*;
pub use error::*;
pub use job::*;
pub use output::*;
pub use scene::*;
