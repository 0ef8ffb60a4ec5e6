//! Render job configuration and the job file that bundles all blocks.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::CameraConfig;
use crate::capture::CaptureConfig;
use crate::error::ModelError;
use crate::output::RenderOutput;
use crate::scene::SceneConfig;

/// Job block (`mJob`): which frames to render, where, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Main output directory of the job.
    #[serde(rename = "sPathTrgMain")]
    pub target_dir: PathBuf,

    /// First target frame (inclusive).
    #[serde(rename = "iFrameFirst", default)]
    pub frame_first: i64,

    /// Last target frame (inclusive).
    #[serde(rename = "iFrameLast", default)]
    pub frame_last: i64,

    #[serde(rename = "iFrameStep", default = "default_one")]
    pub frame_step: i64,

    /// Anti-aliasing samples, recorded in the progress log.
    #[serde(rename = "iRenderQuality", default = "default_render_quality")]
    pub render_quality: u32,

    /// Invoke the renderer. When false, the schedule is walked without rendering.
    #[serde(rename = "bDoProcess", default = "default_true")]
    pub do_render: bool,

    /// Delete and re-render outputs that already exist.
    #[serde(rename = "bDoOverwrite", default)]
    pub overwrite: bool,

    /// Save the prepared host scene next to the outputs of each frame.
    #[serde(rename = "bDoStoreProcessData", default)]
    pub store_scene_file: bool,

    /// Worker key: this process handles readout steps `offset, offset + step, ...`.
    #[serde(rename = "iSubFrameOffset", default)]
    pub sub_frame_offset: u32,

    #[serde(rename = "iSubFrameStep", default = "default_one_u32")]
    pub sub_frame_step: u32,

    /// Write the progress log every this many exposure steps.
    #[serde(rename = "iLogStep", default = "default_one_u32")]
    pub log_step: u32,

    /// Move the scene into the camera frame around each render.
    #[serde(rename = "bTransformSceneToCameraFrame", default)]
    pub transform_scene_to_camera_frame: bool,
}

fn default_one() -> i64 {
    1
}

fn default_one_u32() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_render_quality() -> u32 {
    4
}

impl JobConfig {
    /// A job rendering a single frame into `target_dir`.
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            frame_first: 0,
            frame_last: 0,
            frame_step: default_one(),
            render_quality: default_render_quality(),
            do_render: true,
            overwrite: false,
            store_scene_file: false,
            sub_frame_offset: 0,
            sub_frame_step: default_one_u32(),
            log_step: default_one_u32(),
            transform_scene_to_camera_frame: false,
        }
    }

    pub fn with_frames(mut self, first: i64, last: i64, step: i64) -> Self {
        self.frame_first = first;
        self.frame_last = last;
        self.frame_step = step;
        self
    }

    /// Target frames in render order.
    pub fn target_frames(&self) -> impl Iterator<Item = i64> + '_ {
        let step = self.frame_step.max(1);
        (0..)
            .map(move |i| self.frame_first + i * step)
            .take_while(move |frame| *frame <= self.frame_last)
    }

    /// Number of target frames in the range.
    pub fn target_frame_count(&self) -> u64 {
        if self.frame_last < self.frame_first {
            return 0;
        }
        ((self.frame_last - self.frame_first) / self.frame_step.max(1)) as u64 + 1
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.frame_step < 1 {
            return Err(ModelError::invalid(format!(
                "Frame step must be at least 1, got {}",
                self.frame_step
            )));
        }
        if self.frame_last < self.frame_first {
            return Err(ModelError::invalid(format!(
                "Last frame {} is before first frame {}",
                self.frame_last, self.frame_first
            )));
        }
        if self.sub_frame_step < 1 {
            return Err(ModelError::invalid("Sub-frame step must be at least 1"));
        }
        Ok(())
    }
}

/// A complete job file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFile {
    #[serde(rename = "mJob")]
    pub job: JobConfig,

    /// Capture block. Standard renders without one use the host frame rate.
    #[serde(rename = "mCapture", default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<CaptureConfig>,

    #[serde(rename = "mCamera", default)]
    pub camera: CameraConfig,

    #[serde(rename = "lOutputs")]
    pub outputs: Vec<RenderOutput>,

    #[serde(rename = "mScene", default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<SceneConfig>,
}

impl JobFile {
    /// Load and validate a job file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let job: Self = serde_json::from_str(&content).map_err(|e| ModelError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        job.validate()?;
        Ok(job)
    }

    /// Write the job file as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|e| ModelError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ModelError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.job.validate()?;
        if self.outputs.is_empty() {
            return Err(ModelError::invalid("No render output types defined"));
        }
        for output in &self.outputs {
            output.kind()?;
        }
        if let Some(scene) = &self.scene {
            scene.validate()?;
        }
        Ok(())
    }
}
