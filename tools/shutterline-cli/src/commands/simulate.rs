//! Rehearse a render job against the dry-run host.

use std::io::Write;
use std::path::PathBuf;

use shutterline_common::config::AppConfig;
use shutterline_render_engine::{
    DriverKind, ProgressCallback, RenderDriver, RenderProgress, RenderStage,
};

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    rolling_shutter: bool,
    overwrite: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut job = super::load_job(&path)?;
    let mut host = super::scene_host(&job)?;

    if let Some(output) = output {
        job.job.target_dir = output;
    }
    job.job.overwrite |= overwrite || config.render.overwrite;
    if job.job.log_step == 1 {
        job.job.log_step = config.render.log_step.max(1);
    }

    let kind = if rolling_shutter {
        DriverKind::RollingShutter
    } else {
        DriverKind::Standard
    };

    println!("Simulating {kind} render of: {}", path.display());
    println!("  Target: {}", job.job.target_dir.display());

    let progress_cb: ProgressCallback = Box::new(|p: RenderProgress| {
        if p.stage == RenderStage::Rendering {
            print!(
                "\r  Progress: {:.1}% ({}/{} steps, frame {}, ETA: {:.0}s)  ",
                p.progress * 100.0,
                p.steps_done,
                p.total_steps,
                p.target_frame,
                p.eta_secs,
            );
            let _ = std::io::stdout().flush();
        }
    });

    let mut driver = RenderDriver::new(kind, job);
    driver.init(&host)?;
    let result = driver.process(&mut host, Some(progress_cb));
    driver.finalize(&mut host)?;

    match result {
        Ok(summary) => {
            println!("\nSimulation complete:");
            println!("  Target frames: {}", summary.target_frames);
            println!("  Renders: {}", summary.renders);
            println!("  Skipped (already present): {}", summary.skipped);
            Ok(())
        }
        Err(e) => {
            println!("\nSimulation failed: {e}");
            println!("Run again to resume where it stopped.");
            Err(e.into())
        }
    }
}
