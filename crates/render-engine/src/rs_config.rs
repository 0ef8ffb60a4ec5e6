//! Rolling-shutter side file consumed by image reconstruction.

use std::path::{Path, PathBuf};

use serde::Serialize;
use shutterline_common::ShutterlineResult;
use shutterline_exposure::{RsExpReport, RsExposure};

use crate::border::SceneBorder;

/// File name of the side file in the job's target directory.
pub const RS_CONFIG_FILE: &str = "RsCfg.json";

/// Contents of `RsCfg.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsConfig {
    #[serde(rename = "sDTI")]
    pub dti: &'static str,

    #[serde(rename = "iRenderResX")]
    pub render_res_x: u32,

    #[serde(rename = "iRenderResY")]
    pub render_res_y: u32,

    #[serde(rename = "iBorderMinY")]
    pub border_min_y: i64,

    #[serde(rename = "iBorderMaxY")]
    pub border_max_y: i64,

    /// Offset of the first rendered line from the top of the image.
    #[serde(rename = "iBorderTop")]
    pub border_top: i64,

    #[serde(rename = "mRsExp")]
    pub exposure: RsExpReport,

    #[serde(rename = "mSensor", skip_serializing_if = "Option::is_none")]
    pub sensor: Option<serde_json::Value>,
}

impl RsConfig {
    pub const DTI: &'static str = "rs-config:1.1";

    pub fn new(scene: &SceneBorder, exp: &RsExposure, sensor: Option<&serde_json::Value>) -> Self {
        Self {
            dti: Self::DTI,
            render_res_x: scene.res_x,
            render_res_y: scene.res_y,
            border_min_y: scene.min_y,
            border_max_y: scene.max_y,
            border_top: scene.top(),
            exposure: exp.report(),
            sensor: sensor.cloned(),
        }
    }

    /// Write `RsCfg.json` into `target_dir`.
    pub fn save(&self, target_dir: &Path) -> ShutterlineResult<PathBuf> {
        std::fs::create_dir_all(target_dir)?;
        let path = target_dir.join(RS_CONFIG_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        tracing::info!(path = %path.display(), "Wrote rolling shutter configuration");
        Ok(path)
    }
}
