//! Render frame driver lifecycle.

use std::fmt;

use shutterline_capture_model::JobFile;
use shutterline_common::{ShutterlineError, ShutterlineResult};

use crate::host::RenderHost;
use crate::progress::ProgressCallback;
use crate::rolling::RollingShutterRender;
use crate::standard::StandardRender;

/// Which render loop a driver runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    Standard,
    RollingShutter,
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::RollingShutter => f.write_str("rolling-shutter"),
        }
    }
}

/// Lifecycle phase of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverPhase {
    Uninitialized,
    Initialized,
    Finalized,
}

/// Counts returned by a render run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Target frames the run walked through.
    pub target_frames: u64,
    /// Render invocations, one per exposure step or frame and output.
    pub renders: u64,
    /// Steps or frame outputs skipped because their files existed.
    pub skipped: u64,
}

#[derive(Debug, Clone)]
enum RenderMode {
    Standard(StandardRender),
    RollingShutter(RollingShutterRender),
}

/// Drives a render job through a host.
///
/// `new` -> `init` -> `process` (repeatable) -> `finalize`.
#[derive(Debug)]
pub struct RenderDriver {
    kind: DriverKind,
    job: JobFile,
    mode: Option<RenderMode>,
    phase: DriverPhase,
}

impl RenderDriver {
    pub fn new(kind: DriverKind, job: JobFile) -> Self {
        Self {
            kind,
            job,
            mode: None,
            phase: DriverPhase::Uninitialized,
        }
    }

    pub fn kind(&self) -> DriverKind {
        self.kind
    }

    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    pub fn job(&self) -> &JobFile {
        &self.job
    }

    /// The rolling-shutter loop, once initialized.
    pub fn rolling_shutter(&self) -> Option<&RollingShutterRender> {
        match &self.mode {
            Some(RenderMode::RollingShutter(rs)) => Some(rs),
            _ => None,
        }
    }

    /// Validate the job against the host and prepare the render loop.
    pub fn init(&mut self, host: &dyn RenderHost) -> ShutterlineResult<()> {
        self.job.validate()?;

        let target_dir = &self.job.job.target_dir;
        if !target_dir.exists() {
            std::fs::create_dir_all(target_dir)?;
        }

        let mode = match self.kind {
            DriverKind::Standard => RenderMode::Standard(StandardRender::new(&self.job, host)?),
            DriverKind::RollingShutter => {
                RenderMode::RollingShutter(RollingShutterRender::new(&self.job, host)?)
            }
        };

        tracing::info!(
            kind = %self.kind,
            host = host.name(),
            target = %target_dir.display(),
            "Render initialized"
        );
        self.mode = Some(mode);
        self.phase = DriverPhase::Initialized;
        Ok(())
    }

    /// Render every outstanding frame of the job.
    pub fn process(
        &mut self,
        host: &mut dyn RenderHost,
        progress: Option<ProgressCallback>,
    ) -> ShutterlineResult<RenderSummary> {
        if self.phase != DriverPhase::Initialized {
            return Err(ShutterlineError::NotInitialized);
        }

        let summary = match self.mode.as_mut() {
            Some(RenderMode::Standard(standard)) => standard.process(&self.job, host, progress)?,
            Some(RenderMode::RollingShutter(rs)) => rs.process(&self.job, host, progress)?,
            None => return Err(ShutterlineError::NotInitialized),
        };

        tracing::info!(
            target_frames = summary.target_frames,
            renders = summary.renders,
            skipped = summary.skipped,
            "Render finished"
        );
        Ok(summary)
    }

    /// Restore the host scene if `init` prepared it.
    pub fn finalize(&mut self, host: &mut dyn RenderHost) -> ShutterlineResult<()> {
        if self.phase == DriverPhase::Initialized {
            host.restore_scene()?;
        }
        self.mode = None;
        self.phase = DriverPhase::Finalized;
        Ok(())
    }
}
