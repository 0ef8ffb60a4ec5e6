//! Per target frame progress log.
//!
//! The log is a plain text file that is rewritten in full on every write,
//! a status head followed by the accumulated body. Writes are best-effort:
//! a failure is reported through tracing and rendering continues.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use shutterline_common::{seconds_to_hms, ShutterlineError};

const RULE: &str = "=================================================";

#[derive(Debug)]
pub struct FrameLog {
    path: PathBuf,
    body: String,
}

impl FrameLog {
    /// Log for `target_frame` written by the worker with `sub_frame_offset`.
    pub fn for_frame(frame_dir: &Path, target_frame: i64, sub_frame_offset: u32) -> Self {
        let path = frame_dir.join("_log").join(format!(
            "log_frame-{target_frame:02}_offset-{sub_frame_offset:02}.txt"
        ));
        Self {
            path,
            body: String::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Append a line to the body.
    pub fn line(&mut self, text: impl AsRef<str>) {
        self.body.push_str(text.as_ref());
        self.body.push('\n');
    }

    /// Append text verbatim.
    pub fn push(&mut self, text: &str) {
        self.body.push_str(text);
    }

    /// Write the body without a status head.
    pub fn write(&self) -> bool {
        self.write_text(&self.body)
    }

    /// Write `head` followed by the body.
    pub fn write_with_head(&self, head: &str) -> bool {
        let mut text = String::with_capacity(head.len() + self.body.len());
        text.push_str(head);
        text.push_str(&self.body);
        self.write_text(&text)
    }

    fn write_text(&self, text: &str) -> bool {
        let result = self
            .path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| std::fs::write(&self.path, text));

        match result {
            Ok(()) => true,
            Err(source) => {
                let err = ShutterlineError::LogIo {
                    path: self.path.clone(),
                    source,
                };
                tracing::warn!(error = %err, "Progress log not written");
                false
            }
        }
    }
}

/// Status head of a frame log.
#[derive(Debug, Clone, Copy)]
pub struct LogHead {
    pub running: bool,
    pub elapsed_secs: f64,
    pub renders_done: u64,
    pub renders_per_frame: u64,
}

impl LogHead {
    pub fn render(&self) -> String {
        let time_delta = seconds_to_hms(self.elapsed_secs);
        let (time_per_render, time_left) = if self.renders_done > 0 {
            let per_render = self.elapsed_secs / self.renders_done as f64;
            let left = crate::progress::time_left(
                self.renders_done,
                self.renders_per_frame,
                self.elapsed_secs,
            )
            .unwrap_or(0.0);
            (seconds_to_hms(per_render), seconds_to_hms(left))
        } else {
            ("n/a".to_string(), "n/a".to_string())
        };
        let percent = if self.renders_per_frame > 0 {
            100.0 * self.renders_done as f64 / self.renders_per_frame as f64
        } else {
            0.0
        };

        let mut out = String::new();
        let _ = writeln!(out, "\n{RULE}\n");
        if self.running {
            let _ = writeln!(out, "Status: running");
            let _ = writeln!(out, "Time running/left: {time_delta} / {time_left}");
        } else {
            let _ = writeln!(out, "Status: stopped");
            let _ = writeln!(out, "Runtime: {time_delta}");
        }
        let _ = writeln!(
            out,
            "Renders: {} of {} ({percent:5.2}%)",
            self.renders_done, self.renders_per_frame
        );
        let _ = writeln!(out, "Average render time per frame: {time_per_render}");
        let _ = writeln!(out, "\n{RULE}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("shutterline-frame-log-{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_log_path_layout() {
        let log = FrameLog::for_frame(Path::new("/out/Frame_0003"), 3, 1);
        assert_eq!(
            log.path(),
            Path::new("/out/Frame_0003/_log/log_frame-03_offset-01.txt")
        );
    }

    #[test]
    fn test_write_replaces_content() {
        let dir = temp_dir("rewrite");
        let mut log = FrameLog::for_frame(&dir, 0, 0);
        log.line("first");
        assert!(log.write());
        log.line("second");
        let head = LogHead {
            running: true,
            elapsed_secs: 10.0,
            renders_done: 2,
            renders_per_frame: 8,
        };
        assert!(log.write_with_head(&head.render()));

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert!(text.contains("Status: running"));
        assert!(text.contains("Time running/left: 00:00:10 / 00:00:30"));
        assert!(text.contains("Renders: 2 of 8 (25.00%)"));
        assert!(text.ends_with("first\nsecond\n"));
        assert_eq!(text.matches("first").count(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let dir = temp_dir("blocked");
        std::fs::create_dir_all(&dir).unwrap();
        // A file where the log directory should be.
        let blocker = dir.join("Frame_0000");
        std::fs::write(&blocker, b"x").unwrap();

        let mut log = FrameLog::for_frame(&blocker, 0, 0);
        log.line("lost");
        assert!(!log.write());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_stopped_head_without_renders() {
        let head = LogHead {
            running: false,
            elapsed_secs: 0.0,
            renders_done: 0,
            renders_per_frame: 0,
        };
        let text = head.render();
        assert!(text.contains("Status: stopped"));
        assert!(text.contains("Average render time per frame: n/a"));
    }
}
