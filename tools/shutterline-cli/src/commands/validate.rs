//! Validate a render job file.

use std::path::PathBuf;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating job at: {}", path.display());

    let job = super::load_job(&path)?;
    job.validate().map_err(|e| anyhow::anyhow!("Invalid job: {e}"))?;

    let j = &job.job;
    println!("  Target: {}", j.target_dir.display());
    println!(
        "  Frames: {}..={} step {} ({} frames)",
        j.frame_first,
        j.frame_last,
        j.frame_step,
        j.target_frame_count()
    );
    println!("  Worker: offset {} of {}", j.sub_frame_offset, j.sub_frame_step);

    println!("  Outputs:");
    for output in &job.outputs {
        let kind = output.kind()?;
        match &output.folder {
            Some(folder) => println!("    - {kind} -> {folder}"),
            None => println!("    - {kind}"),
        }
    }

    match &job.capture {
        Some(capture) => {
            println!(
                "  Capture: fps {:?}, frame time {:?}s, {} read-out(s) per render",
                capture.fps, capture.frame_time_s, capture.readouts_per_render
            );
            match &capture.exposure {
                Some(exp) => println!(
                    "  Exposure: {}s per line, offset {}s",
                    exp.exposure_per_line, exp.exposure_offset
                ),
                None => println!("  Exposure: none (standard render only)"),
            }
        }
        None => println!("  Capture: none (scene frame rate is the target rate)"),
    }

    if let Some(lines) = job.camera.sensor_res_y {
        println!("  Sensor rows: {lines}");
    }
    if let Some(scene) = &job.scene {
        println!("  Scene: {}x{} @ {}fps", scene.res_x, scene.res_y, scene.fps);
    }

    let has_exposure = job
        .capture
        .as_ref()
        .is_some_and(|capture| capture.exposure.is_some());
    if has_exposure {
        match &job.scene {
            Some(scene) => {
                let exp = super::plan::exposure(&job, scene.fps)?;
                let state = exp.state();
                println!(
                    "  Schedule: {} read-outs per frame, {} scene frame(s) per render, {} read-out(s) per exposure",
                    state.readout_count,
                    state.scene_render_delta_frames,
                    state.readouts_per_exposure
                );
            }
            None => {
                println!("  Schedule: not checked, no 'mScene' block to take the scene rate from")
            }
        }
    }

    println!("\nJob is valid.");
    Ok(())
}
