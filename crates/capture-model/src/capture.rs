//! Capture configuration: target timing and the rolling-shutter exposure.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Capture block (`mCapture`) of a job file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Target output frame rate.
    #[serde(rename = "dFPS", default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,

    /// Time from the exposure start of the first line of frame n to the
    /// exposure start of the first line of frame n+1, in seconds.
    #[serde(
        rename = "dFrameTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub frame_time_s: Option<f64>,

    /// Consecutive readouts merged into a single render call.
    #[serde(rename = "iReadOutsPerRender", default = "default_readouts_per_render")]
    pub readouts_per_render: u32,

    /// Rolling-shutter exposure model.
    #[serde(rename = "mExp", default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<ExposureModel>,
}

/// Exposure block (`mExp`) describing how sensor lines integrate light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureModel {
    /// Exposure time of a single line in seconds.
    #[serde(rename = "dExpPerLine")]
    pub exposure_per_line: f64,

    /// Delay of the first readout relative to the frame start in seconds.
    #[serde(rename = "dExpOffset", default)]
    pub exposure_offset: f64,

    /// Line offsets read out together. The first element is always 0 and
    /// consecutive elements are separated by a constant stride, for
    /// example `[0]`, `[0, 2]`, or `[0, 3, 6]`.
    #[serde(rename = "lReadOutLinePattern", default = "default_line_pattern")]
    pub readout_line_pattern: Vec<u32>,
}

fn default_readouts_per_render() -> u32 {
    1
}

fn default_line_pattern() -> Vec<u32> {
    vec![0]
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fps: None,
            frame_time_s: None,
            readouts_per_render: default_readouts_per_render(),
            exposure: None,
        }
    }
}

impl CaptureConfig {
    pub fn require_fps(&self) -> Result<f64, ModelError> {
        self.fps.ok_or(ModelError::Missing {
            field: "dFPS",
            block: "capture configuration",
        })
    }

    pub fn require_frame_time(&self) -> Result<f64, ModelError> {
        self.frame_time_s.ok_or(ModelError::Missing {
            field: "dFrameTime",
            block: "capture configuration",
        })
    }

    pub fn require_exposure(&self) -> Result<&ExposureModel, ModelError> {
        self.exposure.as_ref().ok_or(ModelError::Missing {
            field: "mExp",
            block: "capture configuration",
        })
    }
}

impl ExposureModel {
    /// A single-line exposure without offset.
    pub fn single_line(exposure_per_line: f64) -> Self {
        Self {
            exposure_per_line,
            exposure_offset: 0.0,
            readout_line_pattern: default_line_pattern(),
        }
    }
}
