//! Editor settings: gesture thresholds, history capacity and view limits.
//!
//! Settings are plain data with defaults for every field, so a TOML file only
//! needs to mention the values it overrides:
//!
//! ```toml
//! history_capacity = 250
//! input_mode = "touch"
//!
//! [gestures]
//! long_press_delay_ms = 650
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// Which raw stream the gesture coordinator listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Unified pointer events (mouse, pen and touch share one stream).
    #[default]
    Pointer,
    /// Raw touch lists, for platforms without a unified pointer stream.
    Touch,
}

/// Thresholds used by the gesture recognizers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    pub tap_max_distance: f32,
    pub tap_max_duration_ms: u64,
    pub long_press_max_distance: f32,
    pub long_press_delay_ms: u64,
    pub swipe_min_distance: f32,
    pub swipe_max_duration_ms: u64,
    /// Pixels per millisecond.
    pub swipe_min_velocity: f32,
    pub pinch_min_scale_delta: f32,
    /// Degrees.
    pub rotate_min_angle: f32,
    pub pan_min_distance: f32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            tap_max_distance: 10.0,
            tap_max_duration_ms: 300,
            long_press_max_distance: 10.0,
            long_press_delay_ms: 500,
            swipe_min_distance: 50.0,
            swipe_max_duration_ms: 500,
            swipe_min_velocity: 0.3,
            pinch_min_scale_delta: 0.1,
            rotate_min_angle: 10.0,
            pan_min_distance: 10.0,
        }
    }
}

/// Top-level editor settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub gestures: GestureSettings,
    /// Maximum number of entries kept on each history stack.
    pub history_capacity: usize,
    pub input_mode: InputMode,
    /// Multiplicative zoom step used by zoom-in/zoom-out.
    pub zoom_step: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// (width, height) given to nodes created without explicit size.
    pub default_node_size: (f32, f32),
    /// Maximum press→release travel for the slint bridge to synthesize a click.
    pub click_max_distance: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            gestures: GestureSettings::default(),
            history_capacity: 100,
            input_mode: InputMode::Pointer,
            zoom_step: 1.2,
            min_zoom: 0.1,
            max_zoom: 4.0,
            default_node_size: (150.0, 80.0),
            click_max_distance: 4.0,
        }
    }
}

impl EditorSettings {
    /// Parse settings from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `NODE_EDITOR__*` environment overrides on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("NODE_EDITOR__HISTORY_CAPACITY") {
            self.history_capacity = parse_value("NODE_EDITOR__HISTORY_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("NODE_EDITOR__LONG_PRESS_MS") {
            self.gestures.long_press_delay_ms = parse_value("NODE_EDITOR__LONG_PRESS_MS", &v)?;
        }
        if let Some(v) = lookup("NODE_EDITOR__INPUT_MODE") {
            self.input_mode = match v.trim().to_ascii_lowercase().as_str() {
                "pointer" => InputMode::Pointer,
                "touch" => InputMode::Touch,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "NODE_EDITOR__INPUT_MODE".into(),
                        value: v,
                    })
                }
            };
        }
        Ok(self)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Load settings from `path`, falling back to defaults when the file does not
/// exist, then apply environment overrides.
pub fn load_settings(path: impl AsRef<Path>) -> Result<EditorSettings, ConfigError> {
    let path = path.as_ref();
    let settings = match std::fs::read_to_string(path) {
        Ok(raw) => EditorSettings::from_toml_str(&raw)?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            EditorSettings::default()
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    settings.with_env_overrides()
}
