//! Render progress reporting.

/// Progress callback for render runs.
pub type ProgressCallback = Box<dyn Fn(RenderProgress) + Send>;

/// Render progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Steps handled so far, rendered or skipped.
    pub steps_done: u64,

    /// Total steps of the run.
    pub total_steps: u64,

    /// Target frame being processed.
    pub target_frame: i64,

    /// Seconds since the run started.
    pub elapsed_secs: f64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: RenderStage,
}

/// Stages of a render run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Preparing,
    Rendering,
    Complete,
}

/// Linear extrapolation of the remaining time: `(total / done - 1) * elapsed`.
///
/// `None` until at least one step is done.
pub fn time_left(done: u64, total: u64, elapsed_secs: f64) -> Option<f64> {
    if done == 0 {
        return None;
    }
    Some(((total as f64 / done as f64 - 1.0) * elapsed_secs).max(0.0))
}

pub(crate) fn progress_report(
    done: u64,
    total: u64,
    target_frame: i64,
    elapsed_secs: f64,
    stage: RenderStage,
) -> RenderProgress {
    let progress = if total == 0 {
        0.0
    } else {
        (done as f64 / total as f64).clamp(0.0, 1.0)
    };

    RenderProgress {
        progress: if stage == RenderStage::Complete {
            1.0
        } else {
            progress
        },
        steps_done: done,
        total_steps: total,
        target_frame,
        elapsed_secs,
        eta_secs: time_left(done, total, elapsed_secs).unwrap_or(0.0),
        stage,
    }
}

/// Optional callback plus the stopwatch the reports are measured with.
pub(crate) struct Reporter {
    callback: Option<ProgressCallback>,
    watch: shutterline_common::Stopwatch,
}

impl Reporter {
    pub(crate) fn new(callback: Option<ProgressCallback>) -> Self {
        Self {
            callback,
            watch: shutterline_common::Stopwatch::start(),
        }
    }

    pub(crate) fn elapsed_secs(&self) -> f64 {
        self.watch.elapsed_secs()
    }

    pub(crate) fn emit(&self, done: u64, total: u64, target_frame: i64, stage: RenderStage) {
        if let Some(cb) = &self.callback {
            cb(progress_report(
                done,
                total,
                target_frame,
                self.elapsed_secs(),
                stage,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_left_extrapolates_linearly() {
        assert_eq!(time_left(0, 10, 5.0), None);
        assert_eq!(time_left(5, 10, 5.0), Some(5.0));
        assert_eq!(time_left(1, 4, 2.0), Some(6.0));
        assert_eq!(time_left(10, 10, 7.0), Some(0.0));
    }

    #[test]
    fn test_progress_report() {
        let report = progress_report(3, 12, 7, 6.0, RenderStage::Rendering);
        assert_eq!(report.progress, 0.25);
        assert_eq!(report.eta_secs, 18.0);
        assert_eq!(report.target_frame, 7);

        let empty = progress_report(0, 0, 0, 1.0, RenderStage::Rendering);
        assert_eq!(empty.progress, 0.0);
        assert_eq!(empty.eta_secs, 0.0);

        let done = progress_report(4, 4, 1, 1.0, RenderStage::Complete);
        assert_eq!(done.progress, 1.0);
    }
}
