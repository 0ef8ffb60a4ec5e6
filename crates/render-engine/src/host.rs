//! The seam between the render drivers and the application that renders.

use std::path::{Path, PathBuf};

use shutterline_capture_model::{RenderOutput, RenderOutputKind};
use shutterline_common::ShutterlineResult;

/// A host application able to render a prepared scene.
///
/// The drivers never touch the scene directly; every effect outside their
/// own state goes through this trait or the file system. Hooks a host has
/// no use for keep their no-op defaults.
pub trait RenderHost: Send {
    /// Host name for logs.
    fn name(&self) -> &str;

    /// Frame rate of the scene timeline.
    fn scene_fps(&self) -> f64;

    /// Render resolution `(x, y)` in pixels.
    fn resolution(&self) -> (u32, u32);

    /// Current render border in Y as ratios `(min, max)`, measured from the
    /// bottom of the image.
    fn border_y(&self) -> (f64, f64);

    fn set_border_y(&mut self, min: f64, max: f64) -> ShutterlineResult<()>;

    /// Run generators, activate the camera, and register animations.
    /// Called once, and only if there is anything to render.
    fn prepare_scene(&mut self) -> ShutterlineResult<()> {
        Ok(())
    }

    /// Configure output files and settings of `output`, writing below `target_dir`.
    fn apply_output(&mut self, output: &RenderOutput, target_dir: &Path) -> ShutterlineResult<()>;

    /// Files the host writes for `scene_frame` with the currently applied output.
    fn output_filenames(
        &self,
        output: &RenderOutput,
        scene_frame: i64,
    ) -> ShutterlineResult<Vec<PathBuf>>;

    fn set_scene_frame(&mut self, frame: i64) -> ShutterlineResult<()>;

    /// Apply the modifiers that update per scene frame.
    fn apply_frame_update(&mut self) -> ShutterlineResult<()> {
        Ok(())
    }

    /// Per target frame preparation that does not change between exposures,
    /// such as loading point clouds for the frame.
    fn prepare_target_frame(&mut self, _target_frame: i64) -> ShutterlineResult<()> {
        Ok(())
    }

    /// Render the current scene frame without writing a still image.
    fn render(&mut self) -> ShutterlineResult<()>;

    /// Render a viewport snapshot straight to `path`.
    fn render_opengl(&mut self, path: &Path) -> ShutterlineResult<()>;

    /// Save the prepared scene as a host scene file.
    fn save_scene_file(&mut self, path: &Path) -> ShutterlineResult<()>;

    /// Export annotation label data for `frame` into `dir/file_name`.
    fn export_label_data(
        &mut self,
        _kind: RenderOutputKind,
        _dir: &Path,
        _frame: i64,
        _file_name: &str,
    ) -> ShutterlineResult<()> {
        Ok(())
    }

    /// Convert a ground-truth render back to absolute coordinates.
    fn post_process_label_render(
        &mut self,
        _render_path: &Path,
        _scene_in_camera_frame: bool,
    ) -> ShutterlineResult<()> {
        Ok(())
    }

    fn transform_scene_to_camera_frame(&mut self) -> ShutterlineResult<()> {
        Ok(())
    }

    fn revert_scene_to_camera_frame(&mut self) -> ShutterlineResult<()> {
        Ok(())
    }

    /// Undo annotation and render settings applied for one output.
    fn restore_output(&mut self) -> ShutterlineResult<()> {
        Ok(())
    }

    /// Return the scene to the state it was loaded in.
    fn restore_scene(&mut self) -> ShutterlineResult<()> {
        Ok(())
    }
}
