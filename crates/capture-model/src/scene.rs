//! Scene description used when rendering without a live host application.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Scene block (`mScene`) of a job file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Scene timeline frame rate.
    #[serde(rename = "dFps")]
    pub fps: f64,

    /// Render resolution in pixels.
    #[serde(rename = "iResX")]
    pub res_x: u32,
    #[serde(rename = "iResY")]
    pub res_y: u32,

    /// Render border in Y as ratios of the resolution, measured from the
    /// bottom of the image.
    #[serde(rename = "dBorderMinY", default)]
    pub border_min_y: f64,
    #[serde(rename = "dBorderMaxY", default = "default_border_max")]
    pub border_max_y: f64,
}

fn default_border_max() -> f64 {
    1.0
}

impl SceneConfig {
    pub fn new(fps: f64, res_x: u32, res_y: u32) -> Self {
        Self {
            fps,
            res_x,
            res_y,
            border_min_y: 0.0,
            border_max_y: default_border_max(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(ModelError::invalid(format!(
                "Scene fps must be positive, got {}",
                self.fps
            )));
        }
        if self.res_x == 0 || self.res_y == 0 {
            return Err(ModelError::invalid("Scene resolution must be positive"));
        }
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(self.border_min_y)
            || !in_range(self.border_max_y)
            || self.border_min_y >= self.border_max_y
        {
            return Err(ModelError::invalid(format!(
                "Scene border [{}, {}] is not a valid range within [0, 1]",
                self.border_min_y, self.border_max_y
            )));
        }
        Ok(())
    }
}
