//! Rolling-shutter render loop.
//!
//! Each target frame is rendered as a sequence of exposure steps. A step
//! renders the scene frame given by the scheduler with the render border
//! narrowed to the step's row band. Steps whose files already exist are
//! fast-forwarded, so an interrupted run resumes where it stopped.

use std::path::{Path, PathBuf};

use shutterline_capture_model::{JobFile, ModelError, RenderOutput, RenderOutputKind};
use shutterline_common::{seconds_to_hms, ShutterlineError, ShutterlineResult, StepCadence};
use shutterline_exposure::{CameraTiming, LoopPartition, RsExposure};

use crate::border::{RenderBorder, SceneBorder};
use crate::driver::RenderSummary;
use crate::frame_log::{FrameLog, LogHead};
use crate::host::RenderHost;
use crate::progress::{time_left, ProgressCallback, RenderStage, Reporter};
use crate::rs_config::RsConfig;
use crate::standard::check_outputs;

/// Rolling-shutter render of a single output type.
#[derive(Debug, Clone)]
pub struct RollingShutterRender {
    exposure: RsExposure,
    scene: SceneBorder,
    partition: LoopPartition,
}

impl RollingShutterRender {
    /// Validate the job against the host scene and derive the exposure
    /// schedule. Every configuration error of a rolling-shutter run is
    /// raised here.
    pub fn new(job: &JobFile, host: &dyn RenderHost) -> ShutterlineResult<Self> {
        if job.outputs.len() != 1 {
            return Err(ShutterlineError::config(format!(
                "Rolling shutter rendering only supports a single render output type, got {}",
                job.outputs.len()
            )));
        }

        let capture = job.capture.as_ref().ok_or(ModelError::Missing {
            field: "mCapture",
            block: "job",
        })?;
        let exposure = capture.require_exposure()?.clone();
        let timing = CameraTiming::from_config(capture, &job.camera, host.scene_fps())?;
        let exposure = RsExposure::new(exposure, timing)?;
        let partition = LoopPartition::new(job.job.sub_frame_offset, job.job.sub_frame_step)?;

        Ok(Self {
            exposure,
            scene: SceneBorder::new(host.resolution(), host.border_y()),
            partition,
        })
    }

    pub fn exposure(&self) -> &RsExposure {
        &self.exposure
    }

    pub fn scene_border(&self) -> &SceneBorder {
        &self.scene
    }

    pub fn partition(&self) -> LoopPartition {
        self.partition
    }

    pub fn process(
        &mut self,
        job: &JobFile,
        host: &mut dyn RenderHost,
        progress: Option<ProgressCallback>,
    ) -> ShutterlineResult<RenderSummary> {
        let reporter = Reporter::new(progress);
        let output = &job.outputs[0];
        let kind = output.kind()?;
        tracing::info!(output = %kind, host = host.name(), "Rolling shutter render");
        reporter.emit(0, 0, job.job.frame_first, RenderStage::Preparing);

        host.prepare_scene()?;

        RsConfig::new(&self.scene, &self.exposure, job.camera.sensor())
            .save(&job.job.target_dir)?;

        let frame_count = job.job.target_frame_count();
        self.exposure.set_target_frame(job.job.frame_first);
        let renders_per_frame = self.exposure.readout_loop_count(self.partition);
        let total = frame_count * renders_per_frame;
        tracing::info!(renders_per_frame, total, "Read-out loop");

        let mut run = FrameRun {
            job,
            kind,
            output,
            cadence: StepCadence::new(job.job.log_step),
            reporter: &reporter,
            renders_per_frame,
            total,
            summary: RenderSummary::default(),
        };

        for (frame_idx, target_frame) in job.job.target_frames().enumerate() {
            run.process_frame(self, host, frame_idx as u64, target_frame)?;
            run.summary.target_frames += 1;
        }

        reporter.emit(
            frame_count * renders_per_frame,
            total,
            job.job.frame_last,
            RenderStage::Complete,
        );
        Ok(run.summary)
    }
}

struct FrameRun<'a> {
    job: &'a JobFile,
    kind: RenderOutputKind,
    output: &'a RenderOutput,
    cadence: StepCadence,
    reporter: &'a Reporter,
    renders_per_frame: u64,
    total: u64,
    summary: RenderSummary,
}

impl FrameRun<'_> {
    fn process_frame(
        &mut self,
        rs: &mut RollingShutterRender,
        host: &mut dyn RenderHost,
        frame_idx: u64,
        target_frame: i64,
    ) -> ShutterlineResult<()> {
        let job_file = self.job;
        let job = &job_file.job;
        let exp = &mut rs.exposure;
        exp.set_target_frame(target_frame);

        let frame_dir = job.target_dir.join(format!("Frame_{target_frame:04}"));
        let mut log = FrameLog::for_frame(&frame_dir, target_frame, job.sub_frame_offset);
        let frame_watch = shutterline_common::Stopwatch::start();

        log.line("");
        log.line(format!("Start processing frame {target_frame}"));
        log.line(format!("Start Date: {}", frame_watch.start_date()));
        log.line(format!("Start Time: {}", frame_watch.start_time()));
        log.line("");
        log.line(format!("First frame: {}", job.frame_first));
        log.line(format!("Last frame: {}", job.frame_last));
        log.line(format!("Frame step: {}", job.frame_step));
        log.line("");
        log.line(format!("Sub-frame offset: {}", job.sub_frame_offset));
        log.line(format!("Sub-frame step: {}", job.sub_frame_step));
        log.line(format!("Renders per frame: {}", self.renders_per_frame));
        log.line(format!("Total renders: {}", self.total));
        log.line("");
        log.line(format!("Render quality (aa samples): {}", job.render_quality));
        log.line("");
        log.push(&exp.summary_for(rs.partition));
        log.write();

        host.apply_output(self.output, &frame_dir)?;
        let label_dir = host
            .output_filenames(self.output, exp.target_scene_frame())?
            .first()
            .and_then(|name| name.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| frame_dir.clone());
        host.prepare_target_frame(target_frame)?;
        log.line(format!("Using render path: {}", frame_dir.display()));

        let mut loop_idx = 0u64;
        let mut render_secs = 0.0f64;
        let mut time_delta = "n/a".to_string();
        let mut time_remaining = "n/a".to_string();

        let mut active = exp.start_readout_loop(rs.partition);
        while active {
            // Fast-forward to the first step that has not been rendered.
            let files = loop {
                let scene_frame = exp.exp_start_scene_frame();
                let files = host.output_filenames(self.output, scene_frame)?;
                if check_outputs(&files, job.overwrite)? {
                    break Some(files);
                }
                log.line(format!(
                    "Frame {target_frame}, exposure {scene_frame} already exists. Skipping..."
                ));
                self.summary.skipped += 1;
                loop_idx += 1;
                if !exp.step_readout_loop() {
                    break None;
                }
            };
            let Some(files) = files else {
                break;
            };

            let done_total = frame_idx * self.renders_per_frame + loop_idx;
            let frame_part = percent(loop_idx, self.renders_per_frame);
            let total_part = percent(done_total, self.total);

            let scene_frame = exp.exp_start_scene_frame();
            let border = RenderBorder::from_band(
                &rs.scene,
                exp.exp_line_top_offset(),
                exp.exp_line_bottom_offset(),
            );
            let (border_min, border_max) = border.ratios(rs.scene.res_y);
            host.set_border_y(border_min, border_max)?;
            log.line(format!(
                "{scene_frame}: Min = {}, Max = {}, Size = {}",
                border.min,
                border.max,
                border.size()
            ));

            let render_watch = std::time::Instant::now();
            if job.do_render {
                self.render_step(host, &label_dir, scene_frame, files.first())?;
            }
            render_secs += render_watch.elapsed().as_secs_f64();

            if self.cadence.is_tick(loop_idx) {
                let last_render = seconds_to_hms(render_secs / self.cadence.step() as f64);
                if loop_idx > 0 {
                    let elapsed = frame_watch.elapsed_secs();
                    time_delta = seconds_to_hms(elapsed);
                    let run_secs = self.reporter.elapsed_secs();
                    if let Some(left) = time_left(done_total, self.total, run_secs) {
                        time_remaining = seconds_to_hms(left);
                    }
                }
                log.line(format!(
                    "Time: {time_delta} + {time_remaining} | {frame_part:5.1}% | {total_part:5.1}% | Last render time {last_render}"
                ));
                let head = LogHead {
                    running: true,
                    elapsed_secs: frame_watch.elapsed_secs(),
                    renders_done: loop_idx,
                    renders_per_frame: self.renders_per_frame,
                };
                log.write_with_head(&head.render());
                self.reporter
                    .emit(done_total, self.total, target_frame, RenderStage::Rendering);
                render_secs = 0.0;
            }

            loop_idx += 1;
            active = exp.step_readout_loop();
        }

        let elapsed = frame_watch.elapsed_secs();
        log.line("\n");
        log.line(format!("Total processing time: {}", seconds_to_hms(elapsed)));
        let head = LogHead {
            running: false,
            elapsed_secs: elapsed,
            renders_done: loop_idx,
            renders_per_frame: self.renders_per_frame,
        };
        log.write_with_head(&head.render());

        tracing::info!(
            target_frame,
            steps = loop_idx,
            elapsed = %seconds_to_hms(elapsed),
            "Frame finished"
        );
        Ok(())
    }

    fn render_step(
        &mut self,
        host: &mut dyn RenderHost,
        label_dir: &Path,
        scene_frame: i64,
        render_file: Option<&PathBuf>,
    ) -> ShutterlineResult<()> {
        if self.kind != RenderOutputKind::None {
            host.export_label_data(
                self.kind,
                label_dir,
                scene_frame,
                &format!("Exp_{scene_frame:07}.json"),
            )?;
        }

        host.set_scene_frame(scene_frame)?;
        host.apply_frame_update()?;

        let in_camera_frame = self.job.job.transform_scene_to_camera_frame;
        if in_camera_frame {
            host.transform_scene_to_camera_frame()?;
        }

        host.render()?;
        self.summary.renders += 1;

        if let Some(render_file) = render_file {
            host.post_process_label_render(render_file, in_camera_frame)?;
        }
        if in_camera_frame {
            host.revert_scene_to_camera_frame()?;
        }
        Ok(())
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}
