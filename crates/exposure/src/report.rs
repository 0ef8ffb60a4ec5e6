//! Serializable schedule record and the text summary written to progress logs.

use std::fmt::Write as _;

use serde::Serialize;
use shutterline_capture_model::ExposureModel;

use crate::rs_exp::RsExposure;
use crate::schedule::ScheduleState;

/// Inputs and derived constants of a schedule, stored with the render
/// configuration so a capture can be traced back to its timing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsExpReport {
    #[serde(rename = "dTrgFps")]
    pub target_fps: f64,

    #[serde(rename = "dTrgFrameTime")]
    pub target_frame_time_s: f64,

    #[serde(rename = "mTrgExp")]
    pub exposure: ExposureModel,

    #[serde(rename = "iReadOutsPerRender")]
    pub readouts_per_render: u32,

    #[serde(rename = "iLineCount")]
    pub line_count: u32,

    #[serde(rename = "dScnFps")]
    pub scene_fps: f64,

    #[serde(flatten)]
    pub state: ScheduleState,
}

impl RsExpReport {
    pub fn new(exp: &RsExposure) -> Self {
        let timing = exp.timing();
        Self {
            target_fps: timing.target_fps,
            target_frame_time_s: timing.target_frame_time_s,
            exposure: exp.exposure().clone(),
            readouts_per_render: timing.readouts_per_render,
            line_count: timing.line_count,
            scene_fps: timing.scene_fps,
            state: exp.state().clone(),
        }
    }
}

const RULE: &str = "=======================================================";

pub(crate) fn summary(exp: &RsExposure, readout_step: i64) -> String {
    let t = exp.timing();
    let s = exp.state();
    let readout_step = readout_step.max(1);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{RULE}\nRolling shutter exposure data\n{RULE}");
    let _ = writeln!(out, "Line count: {}", t.line_count);
    let _ = writeln!(out, "Lines per RO: {}", s.lines_per_readout);
    let _ = writeln!(out, "RO Block lines: {}", s.readout_block_lines);
    let _ = writeln!(out, "RO per block: {}", s.readouts_per_block);
    let _ = writeln!(out, "RO step: {}", readout_step);
    let _ = writeln!(
        out,
        "Effective RO count: {}",
        s.readout_count.div_euclid(readout_step)
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "Target fps: {}", t.target_fps);
    let _ = writeln!(out, "Effective Target fps: {}", s.effective_target_fps);
    let _ = writeln!(out, "Scene fps: {}", t.scene_fps);

    let _ = writeln!(out);
    let _ = writeln!(out, "Trg RO delta time: {}", s.target_readout_delta_time);
    let _ = writeln!(out, "Scene RO delta frames: {}", s.scene_readout_delta_frames);
    let _ = writeln!(out, "Eff RO delta time: {}", s.effective_readout_delta_time);

    let _ = writeln!(out);
    let _ = writeln!(out, "RO per Exp: {}", s.readouts_per_exposure);
    let _ = writeln!(out, "RO blocks per Exp: {}", s.readout_blocks_per_exposure);
    let _ = writeln!(out, "Block Lines per Exp: {}", s.block_lines_per_exposure);
    let _ = writeln!(out, "Scene frames per Exp: {}", s.scene_frames_per_exposure);
    let _ = writeln!(
        out,
        "Trg Exposure per Line: {}",
        exp.exposure().exposure_per_line
    );
    let _ = writeln!(out, "Eff Exposure per Line: {}", s.effective_exposure_per_line);

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Scene frames per trg frame: {}",
        s.scene_frames_per_target_frame
    );
    let _ = writeln!(out, "Scene render delta frames: {}", s.scene_render_delta_frames);
    let _ = writeln!(out, "Trg frame time: {}", t.target_frame_time_s);
    let _ = writeln!(out, "Eff frame time: {}", s.effective_target_frame_time);
    let _ = writeln!(out, "\n{RULE}");

    out
}
