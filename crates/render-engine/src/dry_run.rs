//! In-process host that renders placeholder files.
//!
//! Used to rehearse a job without the host application: every output the
//! real renderer would write is created as a small placeholder, so resume
//! and overwrite behave exactly as in a real run.

use std::path::{Path, PathBuf};

use shutterline_capture_model::{RenderOutput, RenderOutputKind, SceneConfig};
use shutterline_common::{ShutterlineError, ShutterlineResult};

use crate::host::RenderHost;

const PLACEHOLDER: &[u8] = b"shutterline dry run\n";

/// Call counters of a [`DryRunHost`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostCalls {
    pub prepare_scene: u64,
    pub renders: u64,
    pub opengl_renders: u64,
    pub scene_files: u64,
    pub label_exports: u64,
    pub frame_updates: u64,
    pub camera_frame_transforms: u64,
    pub output_restores: u64,
    pub scene_restores: u64,
}

#[derive(Debug)]
pub struct DryRunHost {
    scene: SceneConfig,
    border: (f64, f64),
    scene_frame: i64,
    output: Option<(RenderOutput, PathBuf)>,
    in_camera_frame: bool,
    fail_after: Option<u64>,
    calls: HostCalls,
    rendered_frames: Vec<i64>,
    borders: Vec<(f64, f64)>,
}

impl DryRunHost {
    pub fn new(scene: SceneConfig) -> Self {
        Self {
            border: (scene.border_min_y, scene.border_max_y),
            scene,
            scene_frame: 0,
            output: None,
            in_camera_frame: false,
            fail_after: None,
            calls: HostCalls::default(),
            rendered_frames: Vec::new(),
            borders: Vec::new(),
        }
    }

    /// Fail every render call once `renders` renders have succeeded.
    pub fn failing_after(mut self, renders: u64) -> Self {
        self.fail_after = Some(renders);
        self
    }

    pub fn calls(&self) -> &HostCalls {
        &self.calls
    }

    /// Scene frame of every successful render, in order.
    pub fn rendered_frames(&self) -> &[i64] {
        &self.rendered_frames
    }

    /// Every border set on the host, in order.
    pub fn borders(&self) -> &[(f64, f64)] {
        &self.borders
    }

    fn write_placeholder(path: &Path) -> ShutterlineResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, PLACEHOLDER)?;
        Ok(())
    }
}

impl RenderHost for DryRunHost {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn scene_fps(&self) -> f64 {
        self.scene.fps
    }

    fn resolution(&self) -> (u32, u32) {
        (self.scene.res_x, self.scene.res_y)
    }

    fn border_y(&self) -> (f64, f64) {
        self.border
    }

    fn set_border_y(&mut self, min: f64, max: f64) -> ShutterlineResult<()> {
        self.border = (min, max);
        self.borders.push((min, max));
        Ok(())
    }

    fn prepare_scene(&mut self) -> ShutterlineResult<()> {
        self.calls.prepare_scene += 1;
        Ok(())
    }

    fn apply_output(&mut self, output: &RenderOutput, target_dir: &Path) -> ShutterlineResult<()> {
        self.output = Some((output.clone(), target_dir.to_path_buf()));
        Ok(())
    }

    fn output_filenames(
        &self,
        output: &RenderOutput,
        scene_frame: i64,
    ) -> ShutterlineResult<Vec<PathBuf>> {
        let (_, target_dir) = self
            .output
            .as_ref()
            .ok_or_else(|| ShutterlineError::render("No render output applied"))?;

        let kind = output.kind()?;
        if !kind.uses_render_call() {
            return Ok(Vec::new());
        }
        let folder = output
            .folder
            .clone()
            .unwrap_or_else(|| kind.to_string().replace('/', "-"));
        Ok(vec![target_dir
            .join(folder)
            .join(format!("Exp_{scene_frame:07}.png"))])
    }

    fn set_scene_frame(&mut self, frame: i64) -> ShutterlineResult<()> {
        self.scene_frame = frame;
        Ok(())
    }

    fn apply_frame_update(&mut self) -> ShutterlineResult<()> {
        self.calls.frame_updates += 1;
        Ok(())
    }

    fn render(&mut self) -> ShutterlineResult<()> {
        if self.fail_after.is_some_and(|limit| self.calls.renders >= limit) {
            return Err(ShutterlineError::render(format!(
                "Dry run render failure at scene frame {}",
                self.scene_frame
            )));
        }
        if let Some((output, _)) = &self.output {
            for path in self.output_filenames(output, self.scene_frame)? {
                Self::write_placeholder(&path)?;
            }
        }
        self.calls.renders += 1;
        self.rendered_frames.push(self.scene_frame);
        Ok(())
    }

    fn render_opengl(&mut self, path: &Path) -> ShutterlineResult<()> {
        Self::write_placeholder(path)?;
        self.calls.opengl_renders += 1;
        Ok(())
    }

    fn save_scene_file(&mut self, path: &Path) -> ShutterlineResult<()> {
        Self::write_placeholder(path)?;
        self.calls.scene_files += 1;
        Ok(())
    }

    fn export_label_data(
        &mut self,
        kind: RenderOutputKind,
        dir: &Path,
        frame: i64,
        file_name: &str,
    ) -> ShutterlineResult<()> {
        if let RenderOutputKind::AnyTruth(annotation) = kind {
            if annotation.exports_label_data() {
                std::fs::create_dir_all(dir)?;
                let label = serde_json::json!({
                    "sType": annotation.as_str(),
                    "iFrame": frame,
                });
                std::fs::write(dir.join(file_name), serde_json::to_string_pretty(&label)?)?;
            }
        }
        self.calls.label_exports += 1;
        Ok(())
    }

    fn transform_scene_to_camera_frame(&mut self) -> ShutterlineResult<()> {
        if self.in_camera_frame {
            return Err(ShutterlineError::render(
                "Scene is already in the camera frame",
            ));
        }
        self.in_camera_frame = true;
        self.calls.camera_frame_transforms += 1;
        Ok(())
    }

    fn revert_scene_to_camera_frame(&mut self) -> ShutterlineResult<()> {
        self.in_camera_frame = false;
        Ok(())
    }

    fn restore_output(&mut self) -> ShutterlineResult<()> {
        self.calls.output_restores += 1;
        Ok(())
    }

    fn restore_scene(&mut self) -> ShutterlineResult<()> {
        self.border = (self.scene.border_min_y, self.scene.border_max_y);
        self.output = None;
        self.in_camera_frame = false;
        self.calls.scene_restores += 1;
        Ok(())
    }
}
