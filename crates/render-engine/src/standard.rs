//! Standard render loop: one render per target frame and output type.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use shutterline_capture_model::{JobFile, RenderOutputKind};
use shutterline_common::{ShutterlineError, ShutterlineResult};
use shutterline_exposure::rounding::round_half_even;

use crate::driver::RenderSummary;
use crate::host::RenderHost;
use crate::progress::{ProgressCallback, RenderStage, Reporter};

/// Files of one outstanding output at one target frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstandingOutput {
    /// Files as the host writes them.
    pub render_names: Vec<PathBuf>,
    /// Frame-indexed names the rendered files end up under. Empty for
    /// outputs that produce no files.
    pub final_names: Vec<PathBuf>,
}

/// Outstanding work: target frame -> output index -> files.
pub type OutstandingWork = BTreeMap<i64, BTreeMap<usize, OutstandingOutput>>;

/// Timing of a standard render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardRender {
    target_fps: f64,
    scene_fps: f64,
}

impl StandardRender {
    /// Resolve the target frame rate from the capture block, or from the
    /// host's scene when the job has none.
    pub fn new(job: &JobFile, host: &dyn RenderHost) -> ShutterlineResult<Self> {
        let scene_fps = host.scene_fps();
        let target_fps = match &job.capture {
            Some(capture) => capture.require_fps()?,
            None => scene_fps,
        };
        if !(target_fps.is_finite() && target_fps > 0.0) {
            return Err(ShutterlineError::config(format!(
                "Target fps must be positive, got {target_fps}"
            )));
        }
        if !(scene_fps.is_finite() && scene_fps > 0.0) {
            return Err(ShutterlineError::config(format!(
                "Scene fps must be positive, got {scene_fps}"
            )));
        }
        Ok(Self {
            target_fps,
            scene_fps,
        })
    }

    pub fn target_fps(&self) -> f64 {
        self.target_fps
    }

    /// Scene frame shown at `target_frame`.
    pub fn scene_frame(&self, target_frame: i64) -> i64 {
        round_half_even(self.scene_fps * (target_frame as f64 / self.target_fps))
    }

    /// Collect the frame and output combinations that still need rendering.
    ///
    /// Existing outputs are skipped, or deleted when the job overwrites.
    pub fn evaluate(
        &self,
        job: &JobFile,
        host: &mut dyn RenderHost,
    ) -> ShutterlineResult<(OutstandingWork, u64)> {
        let target_dir = &job.job.target_dir;
        let mut work = OutstandingWork::new();
        let mut skipped = 0u64;

        for (out_idx, output) in job.outputs.iter().enumerate() {
            let kind = output.kind()?;
            tracing::debug!(output = %kind, "Checking render output type");

            for target_frame in job.job.target_frames() {
                let files = match kind {
                    RenderOutputKind::Blend => {
                        let name = target_dir.join(format!("Frame_{target_frame:04}.blend"));
                        OutstandingOutput {
                            render_names: vec![name.clone()],
                            final_names: vec![name],
                        }
                    }
                    RenderOutputKind::None => OutstandingOutput {
                        render_names: Vec::new(),
                        final_names: Vec::new(),
                    },
                    RenderOutputKind::ImageOpenGl => {
                        let dir = match &output.folder {
                            Some(folder) => target_dir.join(folder),
                            None => target_dir.clone(),
                        };
                        let render_name = dir.join(format!("openGL_{target_frame:04}.png"));
                        let final_name = frame_file_name(&render_name, target_frame);
                        OutstandingOutput {
                            render_names: vec![render_name],
                            final_names: vec![final_name],
                        }
                    }
                    RenderOutputKind::Image | RenderOutputKind::AnyTruth(_) => {
                        let scene_frame = self.scene_frame(target_frame);
                        host.apply_output(output, target_dir)?;
                        let render_names = host.output_filenames(output, scene_frame)?;
                        let final_names = render_names
                            .iter()
                            .map(|name| frame_file_name(name, target_frame))
                            .collect();
                        OutstandingOutput {
                            render_names,
                            final_names,
                        }
                    }
                };

                if check_outputs(&files.final_names, job.job.overwrite)? {
                    work.entry(target_frame).or_default().insert(out_idx, files);
                } else {
                    tracing::info!(
                        target_frame,
                        scene_frame = self.scene_frame(target_frame),
                        "Frame already exists, skipping"
                    );
                    skipped += 1;
                }
            }
        }

        Ok((work, skipped))
    }

    pub fn process(
        &self,
        job: &JobFile,
        host: &mut dyn RenderHost,
        progress: Option<ProgressCallback>,
    ) -> ShutterlineResult<RenderSummary> {
        let reporter = Reporter::new(progress);
        reporter.emit(0, 0, job.job.frame_first, RenderStage::Preparing);

        let (work, skipped) = self.evaluate(job, host)?;
        let mut summary = RenderSummary {
            skipped,
            ..RenderSummary::default()
        };

        if work.is_empty() {
            tracing::info!("Nothing to render");
            reporter.emit(0, 0, job.job.frame_last, RenderStage::Complete);
            return Ok(summary);
        }

        host.prepare_scene()?;

        let total: u64 = work.values().map(|outputs| outputs.len() as u64).sum();
        let mut done = 0u64;

        for (&target_frame, outputs) in &work {
            let scene_frame = self.scene_frame(target_frame);
            tracing::info!(target_frame, scene_frame, "Rendering frame");
            host.set_scene_frame(scene_frame)?;
            host.apply_frame_update()?;

            for (&out_idx, files) in outputs {
                let output = &job.outputs[out_idx];
                let kind = output.kind()?;
                let writes_image =
                    !matches!(kind, RenderOutputKind::Blend | RenderOutputKind::None);

                if writes_image {
                    host.apply_output(output, &job.job.target_dir)?;
                }
                host.prepare_target_frame(scene_frame)?;

                if kind != RenderOutputKind::None {
                    if let Some(first) = files.final_names.first() {
                        host.export_label_data(
                            kind,
                            parent_dir(first),
                            target_frame,
                            &format!("Frame_{target_frame:04}.json"),
                        )?;
                    }
                }

                let in_camera_frame = writes_image && job.job.transform_scene_to_camera_frame;
                if in_camera_frame {
                    host.transform_scene_to_camera_frame()?;
                }

                if job.job.do_render && kind != RenderOutputKind::None {
                    render_output(host, kind, files)?;
                    summary.renders += 1;
                }

                if job.job.store_scene_file {
                    let path = job
                        .job
                        .target_dir
                        .join("_blend")
                        .join(format!("Frame_{target_frame:04}.blend"));
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    host.save_scene_file(&path)?;
                }

                if writes_image {
                    if let Some(first) = files.final_names.first() {
                        host.post_process_label_render(first, in_camera_frame)?;
                    }
                    if in_camera_frame {
                        host.revert_scene_to_camera_frame()?;
                    }
                    host.restore_output()?;
                }

                done += 1;
                reporter.emit(done, total, target_frame, RenderStage::Rendering);
            }
            summary.target_frames += 1;
        }

        reporter.emit(done, total, job.job.frame_last, RenderStage::Complete);
        Ok(summary)
    }
}

fn render_output(
    host: &mut dyn RenderHost,
    kind: RenderOutputKind,
    files: &OutstandingOutput,
) -> ShutterlineResult<()> {
    let first = files
        .final_names
        .first()
        .ok_or_else(|| ShutterlineError::render(format!("No output file for {kind}")))?;

    match kind {
        RenderOutputKind::Blend => host.save_scene_file(first),
        RenderOutputKind::ImageOpenGl => host.render_opengl(first),
        _ => {
            host.render()?;
            for (render_name, final_name) in files.render_names.iter().zip(&files.final_names) {
                if render_name.is_file() && !final_name.is_file() {
                    tracing::debug!(file = %final_name.display(), "Result file");
                    std::fs::rename(render_name, final_name)?;
                }
            }
            Ok(())
        }
    }
}

/// Whether any of `names` is missing, deleting existing ones when
/// overwriting. An empty list counts as missing.
pub(crate) fn check_outputs(names: &[PathBuf], overwrite: bool) -> ShutterlineResult<bool> {
    if names.is_empty() {
        return Ok(true);
    }
    let mut missing = false;
    for name in names {
        if !name.is_file() {
            missing = true;
        } else if overwrite {
            tracing::debug!(file = %name.display(), "Removing file due to overwrite flag");
            std::fs::remove_file(name)?;
        }
    }
    Ok(missing || overwrite)
}

/// `<dir of name>/Frame_NNNN<ext>`.
fn frame_file_name(name: &Path, target_frame: i64) -> PathBuf {
    let ext = name
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    parent_dir(name).join(format!("Frame_{target_frame:04}{ext}"))
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_file_name_keeps_directory_and_extension() {
        assert_eq!(
            frame_file_name(Path::new("/out/Image/Exp_0001000.png"), 1),
            PathBuf::from("/out/Image/Frame_0001.png")
        );
        assert_eq!(
            frame_file_name(Path::new("/out/Depth/Exp_0000000.exr"), 12),
            PathBuf::from("/out/Depth/Frame_0012.exr")
        );
        assert_eq!(
            frame_file_name(Path::new("/out/raw"), 3),
            PathBuf::from("/out/Frame_0003")
        );
    }

    #[test]
    fn test_check_outputs() {
        let dir = std::env::temp_dir().join("shutterline-check-outputs");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let present = dir.join("a.png");
        let absent = dir.join("b.png");
        std::fs::write(&present, b"x").unwrap();

        assert!(check_outputs(&[], false).unwrap());
        assert!(!check_outputs(&[present.clone()], false).unwrap());
        assert!(check_outputs(&[present.clone(), absent], false).unwrap());
        assert!(present.is_file());

        assert!(check_outputs(&[present.clone()], true).unwrap());
        assert!(!present.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
