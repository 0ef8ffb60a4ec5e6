//! Tool-wide settings: log output and render defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Settings shared by every `shutterline` invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Defaults applied to render jobs that do not set them.
    #[serde(default)]
    pub render: RenderDefaults,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default render-run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderDefaults {
    /// Write the progress log every this many exposure steps.
    pub log_step: u32,

    /// Re-render outputs that already exist on disk.
    pub overwrite: bool,
}

/// Where log lines go and how much is logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "shutterline=debug,warn").
    pub level: String,

    /// One JSON object per log line.
    pub json: bool,

    /// Append to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            log_step: 1,
            overwrite: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Config from [`config_file_path`], or defaults when it is absent or
    /// unreadable.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Config from `path`, or defaults when it is absent or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if !path.is_file() {
            return Self::default();
        }
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()));
        parsed.unwrap_or_else(|reason| {
            tracing::warn!(path = %path.display(), %reason, "Ignoring config file");
            Self::default()
        })
    }

    /// Write the config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_vec_pretty(self)?)
    }
}

/// `$XDG_CONFIG_HOME/shutterline/config.json`, with `~/.config` when
/// `XDG_CONFIG_HOME` is unset.
pub fn config_file_path() -> PathBuf {
    let config_home = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
            .join(".config"),
    };
    config_home.join("shutterline").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"render":{"log_step":5,"overwrite":true}}"#).unwrap();
        assert_eq!(parsed.render.log_step, 5);
        assert!(parsed.render.overwrite);
        assert_eq!(parsed.logging.level, "info");
        assert!(!parsed.logging.json);
    }

    #[test]
    fn test_default_render_logs_every_step() {
        let config = AppConfig::default();
        assert_eq!(config.render.log_step, 1);
        assert!(!config.render.overwrite);
    }

    #[test]
    fn test_load_from_file_and_fallbacks() {
        let dir = std::env::temp_dir().join("shutterline-config-load");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("config.json");

        assert_eq!(AppConfig::load_from(&path).render.log_step, 1);

        let mut config = AppConfig::default();
        config.render.log_step = 25;
        config.logging.json = true;
        config.save_to(&path).unwrap();
        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.render.log_step, 25);
        assert!(loaded.logging.json);

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppConfig::load_from(&path).render.log_step, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
