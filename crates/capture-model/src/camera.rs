//! Camera configuration relevant to exposure scheduling.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Camera block (`mCamera`) of a job file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Sensor resolution in Y, i.e. the number of sensor rows.
    #[serde(rename = "iSenResY", default, skip_serializing_if = "Option::is_none")]
    pub sensor_res_y: Option<u32>,

    /// Free-form camera extension data. `mEx.mSensor` is forwarded to the
    /// rolling-shutter side file untouched.
    #[serde(rename = "mEx", default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<serde_json::Value>,
}

impl CameraConfig {
    /// Number of sensor rows read out by the rolling shutter.
    pub fn require_line_count(&self) -> Result<u32, ModelError> {
        match self.sensor_res_y {
            Some(0) => Err(ModelError::invalid("Camera sensor row count must be positive")),
            Some(rows) => Ok(rows),
            None => Err(ModelError::Missing {
                field: "iSenResY",
                block: "camera configuration",
            }),
        }
    }

    /// Sensor description, if the camera carries one as an object.
    pub fn sensor(&self) -> Option<&serde_json::Value> {
        self.extension
            .as_ref()
            .and_then(|ex| ex.get("mSensor"))
            .filter(|sensor| sensor.is_object())
    }
}
