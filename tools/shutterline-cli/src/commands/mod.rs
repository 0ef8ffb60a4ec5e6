pub mod plan;
pub mod rows;
pub mod simulate;
pub mod validate;

use std::path::Path;

use shutterline_capture_model::JobFile;
use shutterline_common::ShutterlineError;
use shutterline_render_engine::DryRunHost;

pub(crate) fn load_job(path: &Path) -> anyhow::Result<JobFile> {
    if !path.is_file() {
        return Err(ShutterlineError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    JobFile::load(path).map_err(|e| anyhow::anyhow!("Failed to load job: {e}"))
}

/// Dry-run host for the job's `mScene` block.
pub(crate) fn scene_host(job: &JobFile) -> anyhow::Result<DryRunHost> {
    let scene = job
        .scene
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Job has no 'mScene' block to simulate the scene with"))?;
    Ok(DryRunHost::new(scene))
}
