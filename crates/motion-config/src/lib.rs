//! Storefront motion configuration
//!
//! This crate provides centralized configuration for the scroll animation
//! scheduler, loading settings from `motion.toml` with environment variable
//! overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "motion.toml";

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`MotionConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MotionConfig {
    /// Visibility trigger defaults
    pub visibility: VisibilityConfig,
    /// Sequence player settings
    pub sequence: SequenceConfig,
    /// Grid transition timings
    pub grid: GridConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

/// Defaults applied to visibility triggers bound without explicit options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Fraction of the element that must be visible (passed to the observer as-is)
    pub threshold: f64,
    /// Release the observation after the first fire
    pub trigger_once: bool,
}

/// Sequence player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Spacing between steps whose descriptor carries no fixed delay
    pub step_spacing_ms: f64,
}

/// Grid enter/leave/reveal choreography
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub leave_ms: f64,
    pub enter_ms: f64,
    pub reveal_ms: f64,
    /// Per-index delay for `enter` and `reveal`
    pub stagger_ms: f64,
    /// Scale the leaving items shrink to (and entering items grow from)
    pub leave_scale: f64,
    /// Vertical offset revealed items slide up from
    pub reveal_offset_y: f64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing-subscriber` env-filter directive (e.g. "info,motion_scene=debug")
    pub filter: String,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            trigger_once: true,
        }
    }
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            step_spacing_ms: 100.0,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            leave_ms: 200.0,
            enter_ms: 250.0,
            reveal_ms: 250.0,
            stagger_ms: 60.0,
            leave_scale: 0.9,
            reveal_offset_y: 30.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl MotionConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from `motion.toml` in the current directory,
    /// or return the defaults if it is missing or invalid
    pub fn load_or_default() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// Unparseable numeric values are ignored.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("MOTION_THRESHOLD") {
            if let Ok(threshold) = val.parse::<f64>() {
                self.visibility.threshold = threshold;
            }
        }
        if let Ok(val) = std::env::var("MOTION_TRIGGER_ONCE") {
            self.visibility.trigger_once = parse_flag(&val);
        }
        if let Ok(val) = std::env::var("MOTION_STEP_SPACING_MS") {
            if let Ok(spacing) = val.parse::<f64>() {
                self.sequence.step_spacing_ms = spacing;
            }
        }
        if let Ok(val) = std::env::var("MOTION_GRID_STAGGER_MS") {
            if let Ok(stagger) = val.parse::<f64>() {
                self.grid.stagger_ms = stagger;
            }
        }
        if let Ok(filter) = std::env::var("MOTION_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from motion.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MotionConfig::default();
        assert_eq!(config.visibility.threshold, 0.1);
        assert!(config.visibility.trigger_once);
        assert_eq!(config.sequence.step_spacing_ms, 100.0);
        assert_eq!(config.grid.stagger_ms, 60.0);
        assert_eq!(config.grid.leave_ms, 200.0);
    }

    #[test]
    fn test_toml_serialization() {
        let config = MotionConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: MotionConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = MotionConfig::from_toml_str(
            r#"
            [visibility]
            threshold = 0.5

            [grid]
            stagger_ms = 80.0
            "#,
        )
        .unwrap();

        assert_eq!(config.visibility.threshold, 0.5);
        assert!(config.visibility.trigger_once);
        assert_eq!(config.grid.stagger_ms, 80.0);
        assert_eq!(config.grid.enter_ms, 250.0);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = MotionConfig::from_toml_str("[visibility]\nthreshold = \"high\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = MotionConfig::load_from_file("does/not/exist/motion.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("MOTION_STEP_SPACING_MS", "150");
            std::env::set_var("MOTION_TRIGGER_ONCE", "false");
        }

        let mut config = MotionConfig::default();
        config.merge_with_env();

        assert_eq!(config.sequence.step_spacing_ms, 150.0);
        assert!(!config.visibility.trigger_once);

        unsafe {
            std::env::remove_var("MOTION_STEP_SPACING_MS");
            std::env::remove_var("MOTION_TRIGGER_ONCE");
        }
    }
}
