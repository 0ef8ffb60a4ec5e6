//! Rolling-shutter exposure scheduler.
//!
//! For one target frame the sensor is read out line block by line block.
//! Each readout step names the scene frame at which the scene is rendered
//! and the band of rows that integrate light at that instant. Because an
//! exposure spans several readouts, a band covers the rows whose exposure
//! window contains the step, not only the rows read out at it.

use std::collections::BTreeSet;

use shutterline_capture_model::ExposureModel;

use crate::error::{ExposureError, ExposureResult};
use crate::report::RsExpReport;
use crate::rounding::round_half_even;
use crate::schedule::{CameraTiming, ScheduleState};

/// Stride partition of the readout loop across independent workers.
///
/// Worker `offset` of `step` handles loop iterations `offset`,
/// `offset + step`, ... The union over all offsets in `0..step` is the
/// complete loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopPartition {
    offset: u32,
    step: u32,
    max_count: u32,
}

impl LoopPartition {
    pub fn new(offset: u32, step: u32) -> ExposureResult<Self> {
        if step == 0 {
            return Err(ExposureError::ZeroLoopStep);
        }
        Ok(Self {
            offset,
            step,
            max_count: 0,
        })
    }

    /// The whole loop in a single worker.
    pub fn full() -> Self {
        Self {
            offset: 0,
            step: 1,
            max_count: 0,
        }
    }

    /// Stop after `max_count` iterations. Zero means unlimited.
    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = max_count;
        self
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }
}

impl Default for LoopPartition {
    fn default() -> Self {
        Self::full()
    }
}

/// One step of the readout loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadoutStep {
    /// Scene frame at which the exposure step is rendered.
    pub scene_frame: i64,
    /// First exposed sensor row (inclusive), counted from the top.
    pub row_top: i64,
    /// Last exposed sensor row (exclusive).
    pub row_bottom: i64,
}

impl ReadoutStep {
    /// Number of rows in the band, zero when degenerate.
    pub fn row_count(&self) -> i64 {
        (self.row_bottom - self.row_top).max(0)
    }

    pub fn is_degenerate(&self) -> bool {
        self.row_top >= self.row_bottom
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ReadoutCursor {
    target_frame: i64,
    scene_frame: i64,
    effective_target_time: f64,
    readout_idx: i64,
    loop_idx: i64,
    readout_offset: i64,
    readout_step: i64,
    loop_count_max: i64,
    step: ReadoutStep,
}

/// Rolling-shutter exposure scheduler.
#[derive(Debug, Clone)]
pub struct RsExposure {
    exposure: ExposureModel,
    timing: CameraTiming,
    state: ScheduleState,
    cursor: ReadoutCursor,
}

impl RsExposure {
    /// Validate the inputs and derive the schedule.
    ///
    /// Fails when the readout line pattern is malformed, a timing input is
    /// not positive, or the scene frame rate cannot resolve one render's
    /// worth of readouts.
    pub fn new(exposure: ExposureModel, timing: CameraTiming) -> ExposureResult<Self> {
        let state = ScheduleState::derive(&exposure, &timing)?;

        tracing::debug!(
            readout_count = state.readout_count,
            scene_render_delta_frames = state.scene_render_delta_frames,
            readouts_per_exposure = state.readouts_per_exposure,
            block_lines_per_exposure = state.block_lines_per_exposure,
            effective_target_fps = state.effective_target_fps,
            "Derived rolling shutter schedule"
        );

        Ok(Self {
            exposure,
            timing,
            state,
            cursor: ReadoutCursor {
                readout_step: 1,
                ..ReadoutCursor::default()
            },
        })
    }

    pub fn exposure(&self) -> &ExposureModel {
        &self.exposure
    }

    pub fn timing(&self) -> &CameraTiming {
        &self.timing
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    /// Anchor the readout loop at target frame `frame`.
    pub fn set_target_frame(&mut self, frame: i64) {
        self.cursor.target_frame = frame;
        self.cursor.scene_frame =
            round_half_even(self.state.scene_frames_per_target_frame * frame as f64);
        self.cursor.effective_target_time = self.state.effective_target_frame_time * frame as f64;
    }

    pub fn target_frame(&self) -> i64 {
        self.cursor.target_frame
    }

    /// Scene frame the current target frame starts at.
    pub fn target_scene_frame(&self) -> i64 {
        self.cursor.scene_frame
    }

    /// Effective start time of the current target frame in seconds.
    pub fn effective_target_time(&self) -> f64 {
        self.cursor.effective_target_time
    }

    /// Start the readout loop of the current target frame.
    ///
    /// Returns `false` if the partition has no step to render.
    pub fn start_readout_loop(&mut self, partition: LoopPartition) -> bool {
        let readouts_per_render = self.timing.readouts_per_render as i64;

        self.cursor.loop_count_max = partition.max_count as i64;
        self.cursor.readout_step = partition.step as i64 * readouts_per_render;
        self.cursor.readout_offset = round_half_even(
            self.exposure.exposure_offset / self.state.effective_readout_delta_time,
        ) + partition.offset as i64 * readouts_per_render;
        self.cursor.readout_idx = self.cursor.readout_offset;

        self.update_readout_step()
    }

    /// Advance to the next step of this worker's partition.
    ///
    /// Returns `false` once the exposed band has moved past the last sensor
    /// row or the partition's maximum count is reached.
    pub fn step_readout_loop(&mut self) -> bool {
        self.cursor.readout_idx += self.cursor.readout_step;
        self.update_readout_step()
    }

    /// Number of steps the loop yields for `partition` at the current
    /// target frame. The scheduler's own loop position is left untouched.
    pub fn readout_loop_count(&self, partition: LoopPartition) -> u64 {
        let mut scratch = self.clone();
        scratch.steps(partition).count() as u64
    }

    /// Iterate the steps of the readout loop for `partition`.
    pub fn steps(&mut self, partition: LoopPartition) -> ReadoutSteps<'_> {
        ReadoutSteps {
            exp: self,
            partition,
            started: false,
            finished: false,
        }
    }

    fn update_readout_step(&mut self) -> bool {
        let c = &mut self.cursor;
        let s = &self.state;

        c.loop_idx = (c.readout_idx - c.readout_offset).div_euclid(c.readout_step);
        if c.loop_count_max > 0 && c.loop_idx >= c.loop_count_max {
            return false;
        }

        let block_line_idx = c.readout_idx.div_euclid(s.readouts_per_block) * s.readout_block_lines;
        c.step = ReadoutStep {
            scene_frame: c.scene_frame
                + round_half_even(c.readout_idx as f64 * s.scene_readout_delta_frames),
            row_top: (block_line_idx - s.block_lines_per_exposure + s.readout_block_lines).max(0),
            row_bottom: (self.timing.line_count as i64).min(
                block_line_idx + s.readout_block_lines * self.timing.readouts_per_render as i64,
            ),
        };

        !c.step.is_degenerate()
    }

    /// The current step.
    pub fn current_step(&self) -> ReadoutStep {
        self.cursor.step
    }

    pub fn exp_start_scene_frame(&self) -> i64 {
        self.cursor.step.scene_frame
    }

    pub fn exp_line_top_offset(&self) -> i64 {
        self.cursor.step.row_top
    }

    pub fn exp_line_bottom_offset(&self) -> i64 {
        self.cursor.step.row_bottom
    }

    /// Absolute readout index of the current step.
    pub fn readout_index(&self) -> i64 {
        self.cursor.readout_idx
    }

    /// Iteration index of the current step within this worker's partition.
    pub fn loop_index(&self) -> i64 {
        self.cursor.loop_idx
    }

    /// Readout index increment between consecutive steps of this worker.
    pub fn readout_step(&self) -> i64 {
        self.cursor.readout_step
    }

    pub fn readouts_per_exposure(&self) -> i64 {
        self.state.readouts_per_exposure
    }

    pub fn effective_exposure_per_line(&self) -> f64 {
        self.state.effective_exposure_per_line
    }

    /// Every sensor row exposed by the current merged render, sorted.
    ///
    /// Enumerates the readouts merged into the render, each one together
    /// with the readouts whose exposure is still open, and expands them by
    /// the readout line pattern. Meant for diagnostics; the row band of
    /// [`current_step`](Self::current_step) is the fast path.
    pub fn exp_row_list(&self) -> BTreeSet<u32> {
        let s = &self.state;
        let line_count = self.timing.line_count as i64;
        let first = self.cursor.readout_idx;
        let mut rows = BTreeSet::new();

        for readout_idx in first..first + self.timing.readouts_per_render as i64 {
            for exposure_idx in 0..s.readouts_per_exposure {
                let abs_idx = readout_idx - exposure_idx;
                if abs_idx < 0 {
                    break;
                }
                let block_line_idx =
                    abs_idx.div_euclid(s.readouts_per_block) * s.readout_block_lines;
                let line = block_line_idx + abs_idx.rem_euclid(s.readouts_per_block);
                for &offset in &self.exposure.readout_line_pattern {
                    let row = line + offset as i64;
                    if (0..line_count).contains(&row) {
                        rows.insert(row as u32);
                    }
                }
            }
        }
        rows
    }

    /// Serializable record of inputs and derived constants.
    pub fn report(&self) -> RsExpReport {
        RsExpReport::new(self)
    }

    /// Human-readable summary of the schedule for progress logs, with the
    /// readout step of the running loop.
    pub fn summary(&self) -> String {
        crate::report::summary(self, self.cursor.readout_step)
    }

    /// Summary with the readout step a loop over `partition` walks, whether
    /// or not that loop has started.
    pub fn summary_for(&self, partition: LoopPartition) -> String {
        let readout_step = partition.step as i64 * self.timing.readouts_per_render as i64;
        crate::report::summary(self, readout_step)
    }
}

/// Iterator over the steps of a readout loop, see [`RsExposure::steps`].
pub struct ReadoutSteps<'a> {
    exp: &'a mut RsExposure,
    partition: LoopPartition,
    started: bool,
    finished: bool,
}

impl Iterator for ReadoutSteps<'_> {
    type Item = ReadoutStep;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let valid = if self.started {
            self.exp.step_readout_loop()
        } else {
            self.started = true;
            self.exp.start_readout_loop(self.partition)
        };
        if valid {
            Some(self.exp.current_step())
        } else {
            self.finished = true;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_timing(scene_fps: f64) -> CameraTiming {
        CameraTiming {
            target_fps: 30.0,
            target_frame_time_s: 1.0 / 30.0,
            scene_fps,
            line_count: 1000,
            readouts_per_render: 1,
        }
    }

    #[test]
    fn test_fine_scene_fps_yields_one_step_per_line() {
        let mut exp =
            RsExposure::new(ExposureModel::single_line(1e-5), example_timing(100_000.0)).unwrap();
        exp.set_target_frame(0);

        let steps: Vec<ReadoutStep> = exp.steps(LoopPartition::full()).collect();
        assert_eq!(steps.len(), 1000);
        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.row_top, i as i64);
            assert_eq!(step.row_bottom, i as i64 + 1);
            assert_eq!(step.scene_frame, 3 * i as i64);
        }
    }

    #[test]
    fn test_target_frame_anchors_scene_frame() {
        let mut exp =
            RsExposure::new(ExposureModel::single_line(1e-5), example_timing(100_000.0)).unwrap();
        exp.set_target_frame(2);
        // 100000 / 30 * 2 = 6666.67 -> 6667
        assert_eq!(exp.target_scene_frame(), 6667);
        assert!(exp.start_readout_loop(LoopPartition::full()));
        assert_eq!(exp.exp_start_scene_frame(), 6667);
        assert!((exp.effective_target_time() - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_long_exposure_band_trails_readout() {
        // 1e-4 s exposure over 3e-5 s readouts -> round(3.33) = 3 readouts
        let mut exp =
            RsExposure::new(ExposureModel::single_line(1e-4), example_timing(100_000.0)).unwrap();
        exp.set_target_frame(0);
        assert_eq!(exp.readouts_per_exposure(), 3);

        let steps: Vec<ReadoutStep> = exp.steps(LoopPartition::full()).collect();
        // Two extra steps drain the open exposures below the last row.
        assert_eq!(steps.len(), 1002);
        assert_eq!(
            steps[0],
            ReadoutStep {
                scene_frame: 0,
                row_top: 0,
                row_bottom: 1,
            }
        );
        assert_eq!(
            steps[5],
            ReadoutStep {
                scene_frame: 15,
                row_top: 3,
                row_bottom: 6,
            }
        );
        let last = steps[1001];
        assert_eq!((last.row_top, last.row_bottom), (999, 1000));
    }

    #[test]
    fn test_exposure_offset_delays_first_readout() {
        let exposure = ExposureModel {
            exposure_offset: 3e-4,
            ..ExposureModel::single_line(1e-5)
        };
        let mut exp = RsExposure::new(exposure, example_timing(100_000.0)).unwrap();
        exp.set_target_frame(0);
        assert!(exp.start_readout_loop(LoopPartition::full()));
        // 3e-4 / 3e-5 = 10 readouts
        assert_eq!(exp.readout_index(), 10);
        assert_eq!(exp.exp_line_top_offset(), 10);
        assert_eq!(exp.exp_start_scene_frame(), 30);
        assert_eq!(exp.readout_loop_count(LoopPartition::full()), 990);
    }

    #[test]
    fn test_max_count_stops_loop() {
        let mut exp =
            RsExposure::new(ExposureModel::single_line(1e-5), example_timing(100_000.0)).unwrap();
        exp.set_target_frame(0);
        let partition = LoopPartition::new(1, 4).unwrap().with_max_count(5);
        let steps: Vec<ReadoutStep> = exp.steps(partition).collect();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0].row_top, 1);
        assert_eq!(steps[4].row_top, 17);
    }

    #[test]
    fn test_offset_past_end_is_empty() {
        let mut exp =
            RsExposure::new(ExposureModel::single_line(1e-5), example_timing(100_000.0)).unwrap();
        exp.set_target_frame(0);
        let partition = LoopPartition::new(1000, 1001).unwrap();
        assert!(!exp.start_readout_loop(partition));
        assert_eq!(exp.readout_loop_count(partition), 0);
    }

    #[test]
    fn test_loop_count_leaves_position_untouched() {
        let mut exp =
            RsExposure::new(ExposureModel::single_line(1e-5), example_timing(100_000.0)).unwrap();
        exp.set_target_frame(0);
        assert!(exp.start_readout_loop(LoopPartition::full()));
        assert!(exp.step_readout_loop());
        let before = exp.current_step();

        assert_eq!(exp.readout_loop_count(LoopPartition::new(0, 2).unwrap()), 500);
        assert_eq!(exp.current_step(), before);
        assert_eq!(exp.readout_index(), 1);
    }

    #[test]
    fn test_zero_loop_step_rejected() {
        assert_eq!(LoopPartition::new(0, 0), Err(ExposureError::ZeroLoopStep));
    }

    #[test]
    fn test_row_list_matches_band_for_single_line_pattern() {
        let exposure = ExposureModel::single_line(1e-4);
        let timing = CameraTiming {
            readouts_per_render: 2,
            scene_fps: 200_000.0,
            ..example_timing(200_000.0)
        };
        let mut exp = RsExposure::new(exposure, timing).unwrap();
        exp.set_target_frame(0);
        assert!(exp.start_readout_loop(LoopPartition::full()));
        loop {
            let rows: Vec<u32> = exp.exp_row_list().into_iter().collect();
            let band: Vec<u32> =
                (exp.exp_line_top_offset() as u32..exp.exp_line_bottom_offset() as u32).collect();
            assert_eq!(rows, band, "readout {}", exp.readout_index());
            if !exp.step_readout_loop() {
                break;
            }
        }
    }

    #[test]
    fn test_row_list_expands_interleaved_pattern() {
        let exposure = ExposureModel {
            exposure_per_line: 1e-5,
            exposure_offset: 0.0,
            readout_line_pattern: vec![0, 2],
        };
        let mut exp = RsExposure::new(exposure, example_timing(100_000.0)).unwrap();
        exp.set_target_frame(0);
        assert!(exp.start_readout_loop(LoopPartition::full()));
        assert!(exp.step_readout_loop());

        // Readout 1 of block 0 reads lines 1 and 3.
        let rows: Vec<u32> = exp.exp_row_list().into_iter().collect();
        assert_eq!(rows, vec![1, 3]);
        assert_eq!(exp.exp_line_top_offset(), 0);
        assert_eq!(exp.exp_line_bottom_offset(), 4);
    }
}
