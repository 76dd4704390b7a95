// TOML config adapter - Configuration management using TOML files

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::adapters::probe_ffprobe::DEFAULT_TRANSLATION_AUDIO_BASE_URL;
use crate::domain::errors::*;
use crate::domain::model::TimelineSettings;
use crate::error::{AppError, AppResult};
use crate::utils::logging::{LogLevel, LoggingConfig};

/// Files tried, in order, when no explicit config path is given
pub const CONFIG_SEARCH_PATHS: &[&str] = &["verse_timeline.toml", "config/verse_timeline.toml"];

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "VERSE_TIMELINE_";

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub timeline: TimelineSettings,
    pub lookup: LookupConfig,
    pub logging: LoggingConfig,
}

/// Translation duration lookup settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Per-verse lookup timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum lookups in flight
    pub max_concurrency: usize,
    /// Base URL of the translation recordings
    pub base_url: String,
    /// ffprobe executable
    pub ffprobe_path: String,
    /// Duration manifest used instead of probing
    pub manifest: Option<PathBuf>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_concurrency: num_cpus::get().max(1) * 2,
            base_url: DEFAULT_TRANSLATION_AUDIO_BASE_URL.to_string(),
            ffprobe_path: "ffprobe".to_string(),
            manifest: None,
        }
    }
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// TOML configuration adapter
#[derive(Debug, Default)]
pub struct TomlConfigAdapter {
    config: AppConfig,
    config_file_path: Option<PathBuf>,
}

impl TomlConfigAdapter {
    /// Create new TOML config adapter holding the defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// Path of the file the configuration was loaded from, if any
    pub fn config_file_path(&self) -> Option<&Path> {
        self.config_file_path.as_deref()
    }

    /// Parse a configuration document; missing keys keep their defaults
    pub fn parse(toml_content: &str) -> AppResult<AppConfig> {
        Ok(toml::from_str(toml_content)?)
    }

    /// Load configuration from file
    pub fn load_config(&mut self, path: &Path) -> AppResult<()> {
        if !path.exists() {
            return Err(AppError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        self.config = Self::parse(&content).map_err(|e| AppError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        self.config_file_path = Some(path.to_path_buf());
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(())
    }

    /// Load the explicit file, or the first search path that exists.
    ///
    /// Returns whether a file was loaded. An explicit path that does not
    /// exist is an error; absent search paths are not.
    pub fn discover(&mut self, explicit: Option<&Path>) -> AppResult<bool> {
        if let Some(path) = explicit {
            self.load_config(path)?;
            return Ok(true);
        }

        for candidate in CONFIG_SEARCH_PATHS {
            let path = Path::new(candidate);
            if path.exists() {
                self.load_config(path)?;
                return Ok(true);
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Ok(false)
    }

    /// Apply `VERSE_TIMELINE_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> AppResult<usize> {
        self.apply_env_overrides_with(|name| std::env::var(name).ok())
    }

    /// Apply overrides using the given variable lookup; returns how many applied
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F) -> AppResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        let var = |suffix: &str| lookup(&format!("{}{}", ENV_PREFIX, suffix));
        let config = &mut self.config;

        if let Some(v) = var("FRAME_RATE") {
            config.timeline.frame_rate = parse_env("FRAME_RATE", &v)?;
            applied += 1;
        }
        if let Some(v) = var("BUFFER_FRAMES") {
            config.timeline.buffer_frames = parse_env("BUFFER_FRAMES", &v)?;
            applied += 1;
        }
        if let Some(v) = var("END_BUFFER_FRAMES") {
            config.timeline.end_buffer_frames = parse_env("END_BUFFER_FRAMES", &v)?;
            applied += 1;
        }
        if let Some(v) = var("FALLBACK_FRAMES") {
            config.timeline.fallback_translation_frames = parse_env("FALLBACK_FRAMES", &v)?;
            applied += 1;
        }
        if let Some(v) = var("LOOKUP_TIMEOUT_MS") {
            config.lookup.timeout_ms = parse_env("LOOKUP_TIMEOUT_MS", &v)?;
            applied += 1;
        }
        if let Some(v) = var("MAX_CONCURRENCY") {
            config.lookup.max_concurrency = parse_env("MAX_CONCURRENCY", &v)?;
            applied += 1;
        }
        if let Some(v) = var("AUDIO_BASE_URL") {
            config.lookup.base_url = v;
            applied += 1;
        }
        if let Some(v) = var("FFPROBE_PATH") {
            config.lookup.ffprobe_path = v;
            applied += 1;
        }
        if let Some(v) = var("LOG_LEVEL") {
            config.logging.level = LogLevel::parse(&v)?;
            applied += 1;
        }
        if let Some(v) = var("LOG_JSON") {
            config.logging.json = parse_env("LOG_JSON", &v)?;
            applied += 1;
        }

        if applied > 0 {
            tracing::info!("Applied {} environment variable overrides", applied);
        }
        Ok(applied)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        self.config.timeline.validate()?;

        if self.config.lookup.timeout_ms == 0 {
            return Err(DomainError::ConfigInvalid(
                "lookup.timeout_ms must be positive".to_string(),
            ));
        }
        if self.config.lookup.max_concurrency == 0 {
            return Err(DomainError::ConfigInvalid(
                "lookup.max_concurrency must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(suffix: &str, value: &str) -> AppResult<T> {
    value.trim().parse::<T>().map_err(|_| AppError::Config {
        message: format!("Invalid value for {}{}: {}", ENV_PREFIX, suffix, value),
    })
}
