//! Show the rolling shutter exposure schedule of a job.

use std::path::PathBuf;

use shutterline_capture_model::JobFile;
use shutterline_exposure::{CameraTiming, LoopPartition, RsExposure};
use shutterline_render_engine::RenderHost;

pub fn run(
    path: PathBuf,
    frame: i64,
    offset: Option<u32>,
    step: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let job = super::load_job(&path)?;
    let host = super::scene_host(&job)?;
    let mut exp = exposure(&job, host.scene_fps())?;
    exp.set_target_frame(frame);

    if json {
        println!("{}", serde_json::to_string_pretty(&exp.report())?);
        return Ok(());
    }

    let partition = LoopPartition::new(
        offset.unwrap_or(job.job.sub_frame_offset),
        step.unwrap_or(job.job.sub_frame_step),
    )?;
    println!("{}", exp.summary_for(partition));
    println!(
        "Target frame {frame} starts at scene frame {}",
        exp.target_scene_frame()
    );

    let per_frame = exp.readout_loop_count(partition);
    println!(
        "Exposure steps of worker {} of {}: {per_frame} per target frame, {} for the job",
        partition.offset(),
        partition.step(),
        per_frame * job.job.target_frame_count()
    );
    Ok(())
}

/// Exposure scheduler for a job rendered at `scene_fps`.
pub(crate) fn exposure(job: &JobFile, scene_fps: f64) -> anyhow::Result<RsExposure> {
    let capture = job
        .capture
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Job has no 'mCapture' block"))?;
    let timing = CameraTiming::from_config(capture, &job.camera, scene_fps)?;
    Ok(RsExposure::new(capture.require_exposure()?.clone(), timing)?)
}
