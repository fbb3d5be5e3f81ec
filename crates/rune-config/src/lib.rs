//! Rune motion configuration
//!
//! This crate loads motion settings from `motion.toml`, with environment
//! variables taking precedence over file values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "motion.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure for the motion runtime
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct MotionSettings {
    /// Visibility observer defaults
    pub observer: ObserverConfig,
    /// Stagger step per speed preset
    pub stagger: StaggerConfig,
    /// Reduced-motion handling
    pub preference: PreferenceConfig,
    /// Demo host settings
    pub demo: DemoConfig,
}

/// Visibility observer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObserverConfig {
    /// Fraction of the element that must be visible (0.0 - 1.0)
    pub threshold: f32,
    /// Entrance presets only animate the first time they are seen
    pub once: bool,
}

/// Stagger step configuration, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StaggerConfig {
    pub fast_ms: f32,
    pub normal_ms: f32,
    pub slow_ms: f32,
}

/// Where the reduced-motion flag comes from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReducedMotionMode {
    /// Ask the environment
    #[default]
    System,
    /// Always reduce motion
    Always,
    /// Never reduce motion
    Never,
}

/// Reduced-motion configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreferenceConfig {
    pub reduced_motion: ReducedMotionMode,
    /// Transition duration used while motion is reduced
    pub reduced_duration_ms: f32,
}

/// Demo host configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Simulated frame interval
    pub frame_ms: f32,
    /// Scripted scene to run (landing, carousel)
    pub scene: Option<String>,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            threshold: 0.15,
            once: true,
        }
    }
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self {
            fast_ms: 50.0,
            normal_ms: 100.0,
            slow_ms: 200.0,
        }
    }
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        Self {
            reduced_motion: ReducedMotionMode::System,
            reduced_duration_ms: 10.0,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frame_ms: 16.67,
            scene: None,
        }
    }
}

fn env_flag(val: &str) -> Option<bool> {
    if val == "1" || val.eq_ignore_ascii_case("true") {
        Some(true)
    } else if val == "0" || val.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn env_f32(name: &str) -> Option<f32> {
    std::env::var(name).ok()?.parse::<f32>().ok()
}

impl MotionSettings {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from `motion.toml` in the current directory, or
    /// return the defaults if it is missing or invalid
    pub fn load_or_default() -> Self {
        match Self::load_from_file(CONFIG_FILE) {
            Ok(settings) => settings,
            Err(ConfigError::Io(_)) => Self::default(),
            Err(err) => {
                log::warn!("{err}; using default motion settings");
                Self::default()
            }
        }
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        // Observer settings
        if let Some(threshold) = env_f32("MOTION_THRESHOLD") {
            self.observer.threshold = threshold.clamp(0.0, 1.0);
        }

        // Preference settings
        if let Ok(val) = std::env::var("MOTION_REDUCED") {
            match env_flag(&val) {
                Some(true) => self.preference.reduced_motion = ReducedMotionMode::Always,
                Some(false) => self.preference.reduced_motion = ReducedMotionMode::Never,
                None if val.eq_ignore_ascii_case("system") => {
                    self.preference.reduced_motion = ReducedMotionMode::System
                }
                None => log::warn!("ignoring MOTION_REDUCED={val}"),
            }
        }

        // Stagger settings
        if let Some(ms) = env_f32("MOTION_STAGGER_FAST_MS") {
            self.stagger.fast_ms = ms;
        }
        if let Some(ms) = env_f32("MOTION_STAGGER_NORMAL_MS") {
            self.stagger.normal_ms = ms;
        }
        if let Some(ms) = env_f32("MOTION_STAGGER_SLOW_MS") {
            self.stagger.slow_ms = ms;
        }

        // Demo settings
        if let Some(ms) = env_f32("MOTION_FRAME_MS") {
            self.demo.frame_ms = ms;
        }
        if let Ok(scene) = std::env::var("MOTION_SCENE") {
            self.demo.scene = Some(scene);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from motion.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut settings = Self::load_or_default();
        settings.merge_with_env();
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let settings = MotionSettings::default();
        assert_eq!(settings.observer.threshold, 0.15);
        assert!(settings.observer.once);
        assert_eq!(settings.stagger.normal_ms, 100.0);
        assert_eq!(settings.preference.reduced_motion, ReducedMotionMode::System);
    }

    #[test]
    fn test_toml_serialization() {
        let settings = MotionSettings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: MotionSettings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_partial_toml() {
        let parsed: MotionSettings = toml::from_str(
            r#"
            [observer]
            threshold = 0.3

            [preference]
            reduced_motion = "always"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.observer.threshold, 0.3);
        assert!(parsed.observer.once);
        assert_eq!(parsed.preference.reduced_motion, ReducedMotionMode::Always);
        assert_eq!(parsed.stagger.slow_ms, 200.0);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = MotionSettings::load_from_file("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_from_invalid_file() {
        let path = std::env::temp_dir().join("rune-config-invalid-motion.toml");
        std::fs::write(&path, "[observer]\nthreshold = \"high\"\n").unwrap();
        let err = MotionSettings::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_or_default() {
        // Should not panic even if motion.toml doesn't exist
        let settings = MotionSettings::load_or_default();
        assert!(settings.observer.threshold >= 0.0);
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("MOTION_THRESHOLD", "0.4");
            std::env::set_var("MOTION_REDUCED", "true");
            std::env::set_var("MOTION_STAGGER_FAST_MS", "30");
            std::env::set_var("MOTION_SCENE", "carousel");
        }

        let mut settings = MotionSettings::default();
        settings.merge_with_env();

        assert_eq!(settings.observer.threshold, 0.4);
        assert_eq!(settings.preference.reduced_motion, ReducedMotionMode::Always);
        assert_eq!(settings.stagger.fast_ms, 30.0);
        assert_eq!(settings.demo.scene.as_deref(), Some("carousel"));

        // Clean up
        unsafe {
            std::env::remove_var("MOTION_THRESHOLD");
            std::env::remove_var("MOTION_REDUCED");
            std::env::remove_var("MOTION_STAGGER_FAST_MS");
            std::env::remove_var("MOTION_SCENE");
        }
    }
}
