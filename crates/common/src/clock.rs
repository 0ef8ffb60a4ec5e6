//! Clock and timing utilities for render progress reporting.
//!
//! Render runs measure elapsed time with a monotonic stopwatch and stamp
//! their logs with the local wall-clock time at start. This module provides:
//! - A stopwatch anchored at run or frame start
//! - Human-readable duration formatting
//! - A step cadence that decides when progress is written

use std::time::Instant;

/// A monotonic stopwatch anchored to the moment it was started.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    /// The instant the stopwatch started.
    start: Instant,

    /// Local wall-clock time at start.
    start_wall: chrono::DateTime<chrono::Local>,
}

impl Stopwatch {
    /// Create a new stopwatch anchored to now.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            start_wall: chrono::Local::now(),
        }
    }

    /// Seconds elapsed since start.
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Local start date, `YYYY-MM-DD`.
    pub fn start_date(&self) -> String {
        self.start_wall.format("%Y-%m-%d").to_string()
    }

    /// Local start time of day, `HH:MM:SS`.
    pub fn start_time(&self) -> String {
        self.start_wall.format("%H:%M:%S").to_string()
    }
}

/// Format a duration in seconds as `HH:MM:SS`, or `Nd HH:MM:SS` past one day.
///
/// Negative and non-finite inputs format as `00:00:00`.
pub fn seconds_to_hms(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.round() as u64
    } else {
        0
    };
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    if days > 0 {
        format!("{days}d {hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Fires on every `step`-th index, starting with index 0.
#[derive(Debug, Clone, Copy)]
pub struct StepCadence {
    step: u32,
}

impl StepCadence {
    /// Create a cadence firing every `step` indices. A step of 0 is treated as 1.
    pub fn new(step: u32) -> Self {
        Self { step: step.max(1) }
    }

    /// Whether the given loop index is a reporting tick.
    pub fn is_tick(&self, index: u64) -> bool {
        index % self.step as u64 == 0
    }

    /// The configured step.
    pub fn step(&self) -> u32 {
        self.step
    }
}
