//! Render border arithmetic.
//!
//! Sensor rows are counted from the top of the image; the host's render
//! border is measured in pixels from the bottom. A step's row band is
//! mapped through the scene's configured Y border into pixel borders and
//! then into the ratios the host expects.

use shutterline_exposure::rounding::round_half_even;

/// The scene's render resolution and configured Y border, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneBorder {
    pub res_x: u32,
    pub res_y: u32,
    pub min_y: i64,
    pub max_y: i64,
}

impl SceneBorder {
    /// Build from the host resolution and border ratios.
    pub fn new(resolution: (u32, u32), border_y: (f64, f64)) -> Self {
        let (res_x, res_y) = resolution;
        Self {
            res_x,
            res_y,
            min_y: round_half_even(res_y as f64 * border_y.0),
            max_y: round_half_even(res_y as f64 * border_y.1),
        }
    }

    /// Offset of the first rendered row from the top of the image.
    pub fn top(&self) -> i64 {
        self.res_y as i64 - self.max_y
    }
}

/// Pixel border of one exposure step, measured from the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderBorder {
    pub min: i64,
    pub max: i64,
}

impl RenderBorder {
    /// Border covering sensor rows `row_top..row_bottom`.
    pub fn from_band(scene: &SceneBorder, row_top: i64, row_bottom: i64) -> Self {
        Self {
            min: (scene.max_y - row_bottom + 1).max(0),
            max: (scene.max_y - row_top).min(scene.res_y as i64),
        }
    }

    pub fn size(&self) -> i64 {
        self.max - self.min + 1
    }

    /// Border ratios for the host.
    ///
    /// The offsets put each ratio a quarter pixel above the integer border
    /// below it, so the host recovers the same pixel with floor and with
    /// round after scaling by the resolution.
    pub fn ratios(&self, res_y: u32) -> (f64, f64) {
        let res = res_y as f64;
        ((self.min as f64 - 0.75) / res, (self.max as f64 + 0.25) / res)
    }
}
