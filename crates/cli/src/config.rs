//! Configuration management for the winpos CLI.
//!
//! Configuration is loaded from TOML files in the following locations (in order):
//! 1. The platform config directory (`%APPDATA%/winpos/config.toml` on Windows)
//! 2. `~/.config/winpos/config.toml`
//! 3. `./config.toml` (current directory, for development)

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use winpos_core::{Size, SystemMetrics};
use winpos_platform_win32::PlatformConfig;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Screen and decoration sizes.
    pub metrics: SystemMetrics,
    pub logging: LoggingConfig,
    pub runner: RunnerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Stop a scene at the first failing step.
    #[serde(default = "default_false")]
    pub stop_on_error: bool,

    /// Mirror committed positions onto bound native windows.
    #[serde(default = "default_false")]
    pub mirror_native: bool,

    /// Let bound native windows minimize and restore themselves.
    #[serde(default = "default_false")]
    pub native_iconic: bool,
}

// Default value functions for serde
fn default_log_level() -> String {
    "info".to_string()
}

fn default_false() -> bool {
    false
}

/// A config value that was out of range and has been replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub field: &'static str,
    pub message: String,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from standard locations.
    ///
    /// Returns default config if no file is found.
    pub fn load() -> Result<Self> {
        for path in &config_paths() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Replace unusable values with defaults and report what changed.
    pub fn validate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let defaults = SystemMetrics::default();

        let mut check_size = |field: &'static str, value: &mut Size, fallback: Size| {
            if value.width <= 0 || value.height <= 0 {
                warnings.push(ConfigWarning {
                    field,
                    message: format!(
                        "{}x{} is not a usable size, using {}x{}",
                        value.width, value.height, fallback.width, fallback.height
                    ),
                });
                *value = fallback;
            }
        };
        check_size("metrics.screen", &mut self.metrics.screen, defaults.screen);
        check_size("metrics.icon", &mut self.metrics.icon, defaults.icon);
        check_size(
            "metrics.icon_spacing",
            &mut self.metrics.icon_spacing,
            defaults.icon_spacing,
        );

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level",
                message: format!("unknown level '{}', using info", self.logging.level),
            });
            self.logging.level = default_log_level();
        } else {
            self.logging.level = level;
        }

        warnings
    }

    pub fn platform(&self) -> PlatformConfig {
        PlatformConfig {
            mirror_native: self.runner.mirror_native,
            native_iconic: self.runner.native_iconic,
            ..PlatformConfig::default()
        }
    }
}

/// Get all possible config file paths in priority order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(proj_dirs) = ProjectDirs::from("com", "winpos", "winpos") {
        paths.push(proj_dirs.config_dir().join("config.toml"));
    }

    if let Some(home) = dirs_home() {
        paths.push(home.join(".config").join("winpos").join("config.toml"));
    }

    paths.push(PathBuf::from("config.toml"));

    paths
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
