//! Camera timing inputs and the schedule constants derived from them.

use serde::Serialize;
use shutterline_capture_model::{CameraConfig, CaptureConfig, ExposureModel, ModelError};

use crate::error::{ExposureError, ExposureResult};
use crate::rounding::{ceil_div, round_half_even};

/// Timing of the simulated camera and the scene it records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTiming {
    /// Target output frame rate.
    pub target_fps: f64,

    /// Time between the exposure starts of consecutive output frames.
    pub target_frame_time_s: f64,

    /// Frame rate of the scene timeline that is rendered.
    pub scene_fps: f64,

    /// Number of sensor rows.
    pub line_count: u32,

    /// Consecutive readouts merged into one render call.
    pub readouts_per_render: u32,
}

impl CameraTiming {
    /// Assemble the timing from the capture and camera blocks of a job and
    /// the frame rate of the scene being rendered.
    pub fn from_config(
        capture: &CaptureConfig,
        camera: &CameraConfig,
        scene_fps: f64,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            target_fps: capture.require_fps()?,
            target_frame_time_s: capture.require_frame_time()?,
            scene_fps,
            line_count: camera.require_line_count()?,
            readouts_per_render: capture.readouts_per_render,
        })
    }

    fn validate(&self) -> ExposureResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.target_fps) {
            return Err(ExposureError::timing(format!(
                "target fps must be positive, got {}",
                self.target_fps
            )));
        }
        if !positive(self.target_frame_time_s) {
            return Err(ExposureError::timing(format!(
                "frame time must be positive, got {}",
                self.target_frame_time_s
            )));
        }
        if !positive(self.scene_fps) {
            return Err(ExposureError::timing(format!(
                "scene fps must be positive, got {}",
                self.scene_fps
            )));
        }
        if self.line_count == 0 {
            return Err(ExposureError::timing("line count must be positive"));
        }
        if self.readouts_per_render == 0 {
            return Err(ExposureError::timing(
                "read-outs per render must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Constants derived once from the exposure model and camera timing.
///
/// Every field is a pure function of the inputs; the scheduler never
/// changes them after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleState {
    #[serde(rename = "iLinesPerReadOut")]
    pub lines_per_readout: i64,
    #[serde(rename = "iReadOutsPerBlock")]
    pub readouts_per_block: i64,
    #[serde(rename = "iReadOutBlockLines")]
    pub readout_block_lines: i64,
    /// Distinct readout positions covering the sensor.
    #[serde(rename = "iReadOutCount")]
    pub readout_count: i64,
    /// Nominal time between readouts.
    #[serde(rename = "dTrgReadOutDeltaTime")]
    pub target_readout_delta_time: f64,
    /// Scene frames advanced per render call. Always at least 1.
    #[serde(rename = "iScnRenderDeltaFrames")]
    pub scene_render_delta_frames: i64,
    #[serde(rename = "dScnReadOutDeltaFrames")]
    pub scene_readout_delta_frames: f64,
    /// Readout interval after rounding to whole scene frames per render.
    #[serde(rename = "dEffReadOutDeltaTime")]
    pub effective_readout_delta_time: f64,
    #[serde(rename = "iReadOutsPerExp")]
    pub readouts_per_exposure: i64,
    #[serde(rename = "dScnFramesPerExp")]
    pub scene_frames_per_exposure: f64,
    #[serde(rename = "dEffExpPerLine")]
    pub effective_exposure_per_line: f64,
    #[serde(rename = "iReadOutBlocksPerExp")]
    pub readout_blocks_per_exposure: i64,
    #[serde(rename = "iReadOutBlocksPerExpOffset")]
    pub readout_blocks_per_exposure_offset: i64,
    #[serde(rename = "iBlockLinesPerExp")]
    pub block_lines_per_exposure: i64,
    #[serde(rename = "dScnFramesPerTrgFrame")]
    pub scene_frames_per_target_frame: f64,
    #[serde(rename = "dEffTrgFps")]
    pub effective_target_fps: f64,
    #[serde(rename = "dEffTrgFrameTime")]
    pub effective_target_frame_time: f64,
}

impl ScheduleState {
    /// Derive the schedule constants, validating both inputs.
    pub fn derive(exposure: &ExposureModel, timing: &CameraTiming) -> ExposureResult<Self> {
        timing.validate()?;
        validate_exposure(exposure)?;

        let pattern = &exposure.readout_line_pattern;
        let lines_per_readout = pattern.len() as i64;
        let (readouts_per_block, readout_block_lines) = if pattern.len() == 1 {
            (1, 1)
        } else {
            let stride = pattern[1] as i64;
            let max_offset = pattern.iter().copied().max().unwrap_or(0) as i64;
            (stride, stride + max_offset)
        };

        let readout_count = ceil_div(timing.line_count as i64, lines_per_readout);
        let target_readout_delta_time = timing.target_frame_time_s / readout_count as f64;

        let readouts_per_render = timing.readouts_per_render as f64;
        let scene_render_delta_frames =
            round_half_even(timing.scene_fps * target_readout_delta_time * readouts_per_render);
        if scene_render_delta_frames <= 0 {
            return Err(ExposureError::SceneFpsTooLow {
                required_fps: 1.0 / (target_readout_delta_time * readouts_per_render),
            });
        }

        let scene_readout_delta_frames = scene_render_delta_frames as f64 / readouts_per_render;
        let effective_readout_delta_time = scene_readout_delta_frames / timing.scene_fps;

        let readouts_per_exposure = round_half_even(
            exposure.exposure_per_line / effective_readout_delta_time,
        )
        .max(1);
        let scene_frames_per_exposure = readouts_per_exposure as f64 * scene_readout_delta_frames;
        let effective_exposure_per_line = scene_frames_per_exposure / timing.scene_fps;

        let readout_blocks_per_exposure =
            ceil_div(readouts_per_exposure, readouts_per_block).max(1);
        let readout_blocks_per_exposure_offset = readouts_per_exposure % readouts_per_block;
        let block_lines_per_exposure = readout_blocks_per_exposure * readout_block_lines;

        let scene_frames_per_target_frame = timing.scene_fps / timing.target_fps;
        let whole_scene_frames_per_target = round_half_even(scene_frames_per_target_frame);
        if whole_scene_frames_per_target <= 0 {
            return Err(ExposureError::timing(format!(
                "scene fps {} is too low for target fps {}",
                timing.scene_fps, timing.target_fps
            )));
        }
        let effective_target_fps = timing.scene_fps / whole_scene_frames_per_target as f64;
        let effective_target_frame_time = effective_readout_delta_time * readout_count as f64;

        Ok(Self {
            lines_per_readout,
            readouts_per_block,
            readout_block_lines,
            readout_count,
            target_readout_delta_time,
            scene_render_delta_frames,
            scene_readout_delta_frames,
            effective_readout_delta_time,
            readouts_per_exposure,
            scene_frames_per_exposure,
            effective_exposure_per_line,
            readout_blocks_per_exposure,
            readout_blocks_per_exposure_offset,
            block_lines_per_exposure,
            scene_frames_per_target_frame,
            effective_target_fps,
            effective_target_frame_time,
        })
    }
}

fn validate_exposure(exposure: &ExposureModel) -> ExposureResult<()> {
    if !(exposure.exposure_per_line.is_finite() && exposure.exposure_per_line > 0.0) {
        return Err(ExposureError::timing(format!(
            "exposure per line must be positive, got {}",
            exposure.exposure_per_line
        )));
    }
    if !(exposure.exposure_offset.is_finite() && exposure.exposure_offset >= 0.0) {
        return Err(ExposureError::timing(format!(
            "exposure offset must not be negative, got {}",
            exposure.exposure_offset
        )));
    }

    let pattern = &exposure.readout_line_pattern;
    match pattern.first() {
        None => return Err(ExposureError::pattern(pattern, "pattern is empty")),
        Some(&first) if first != 0 => {
            return Err(ExposureError::pattern(pattern, "first element must be 0"))
        }
        Some(_) => {}
    }

    if let Some(&stride) = pattern.get(1) {
        if stride == 0 {
            return Err(ExposureError::pattern(pattern, "stride must be positive"));
        }
        let uniform = pattern
            .windows(2)
            .all(|pair| pair[1] > pair[0] && pair[1] - pair[0] == stride);
        if !uniform {
            return Err(ExposureError::pattern(
                pattern,
                "offsets must be separated by a constant stride",
            ));
        }
    }
    Ok(())
}
