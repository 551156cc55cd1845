//! Overlay configuration.
//!
//! Loads settings from config.json at startup. Provides hotkey chords,
//! the calibration reference distance and overlay colors.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::measure::DEFAULT_REFERENCE_DISTANCE_M;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<OverlayConfig> = OnceLock::new();

/// Default chord that opens a new overlay.
pub const DEFAULT_ACTIVATE_HOTKEY: &str = "ctrl+alt+d";
/// Default chord that shuts the application down.
pub const DEFAULT_QUIT_HOTKEY: &str = "ctrl+alt+q";

/// RGBA color with unmultiplied alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub fn r(self) -> u8 {
        self.0[0]
    }
    pub fn g(self) -> u8 {
        self.0[1]
    }
    pub fn b(self) -> u8 {
        self.0[2]
    }
    pub fn a(self) -> u8 {
        self.0[3]
    }
}

/// Complete overlay configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Global chord that opens a new overlay (e.g. "ctrl+alt+d")
    pub activate_hotkey: String,
    /// Global chord that quits the application
    pub quit_hotkey: String,
    /// Real distance between the two calibration clicks, in meters
    pub reference_distance_m: f64,
    /// Full-screen backdrop color
    pub backdrop_color: Rgba,
    /// Measurement line and label color
    pub accent_color: Rgba,
    /// Measurement line width in points
    pub line_width: f32,
    /// Label font size in points
    pub font_size: f32,
    /// Show the mode hint in the overlay corner
    pub show_hints: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            activate_hotkey: DEFAULT_ACTIVATE_HOTKEY.to_string(),
            quit_hotkey: DEFAULT_QUIT_HOTKEY.to_string(),
            reference_distance_m: DEFAULT_REFERENCE_DISTANCE_M,
            backdrop_color: Rgba([128, 128, 128, 50]),
            accent_color: Rgba([255, 0, 0, 255]),
            line_width: 2.0,
            font_size: 16.0,
            show_hints: true,
        }
    }
}

impl OverlayConfig {
    /// Parses a config file body. Missing fields take their defaults.
    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let mut config: OverlayConfig = serde_json::from_str(contents)?;
        if !(config.reference_distance_m.is_finite() && config.reference_distance_m > 0.0) {
            crate::log(&format!(
                "Invalid reference_distance_m {}. Using {}.",
                config.reference_distance_m, DEFAULT_REFERENCE_DISTANCE_M
            ));
            config.reference_distance_m = DEFAULT_REFERENCE_DISTANCE_M;
        }
        Ok(config)
    }
}

/// Loads configuration from config.json or returns defaults.
/// Looks for config.json in the same directory as the executable.
fn load_config(config_path: &Path) -> OverlayConfig {
    crate::log(&format!("Looking for config at: {}", config_path.display()));

    if config_path.exists() {
        match fs::read_to_string(config_path) {
            Ok(contents) => match OverlayConfig::from_json(&contents) {
                Ok(config) => {
                    crate::log("Config loaded from config.json");
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse config.json: {}. Using defaults.",
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read config.json: {}. Using defaults.",
                    e
                ));
            }
        }
    } else {
        crate::log("config.json not found. Using default config.");
    }

    OverlayConfig::default()
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config() {
    let _ = CONFIG.set(load_config(&crate::paths::get_config_path()));
}

/// Returns a reference to the global configuration.
/// Falls back to defaults if called before init_config().
pub fn get_config() -> &'static OverlayConfig {
    CONFIG.get_or_init(OverlayConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = OverlayConfig::default();
        assert_eq!(config.activate_hotkey, "ctrl+alt+d");
        assert_eq!(config.reference_distance_m, 100.0);
        assert_eq!(config.backdrop_color, Rgba([128, 128, 128, 50]));
        assert_eq!(config.accent_color.r(), 255);
        assert_eq!(config.accent_color.a(), 255);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = OverlayConfig::from_json(r#"{ "reference_distance_m": 250.0 }"#).unwrap();
        assert_eq!(config.reference_distance_m, 250.0);
        assert_eq!(config.quit_hotkey, DEFAULT_QUIT_HOTKEY);
        assert_eq!(config.font_size, 16.0);
        assert!(config.show_hints);
    }

    #[test]
    fn test_colors_parse_as_arrays() {
        let config = OverlayConfig::from_json(
            r#"{ "accent_color": [0, 200, 255, 255], "show_hints": false }"#,
        )
        .unwrap();
        assert_eq!(config.accent_color, Rgba([0, 200, 255, 255]));
        assert_eq!(config.accent_color.g(), 200);
        assert_eq!(config.accent_color.b(), 255);
        assert!(!config.show_hints);
    }

    #[test]
    fn test_non_positive_reference_distance_falls_back() {
        let config = OverlayConfig::from_json(r#"{ "reference_distance_m": 0.0 }"#).unwrap();
        assert_eq!(config.reference_distance_m, DEFAULT_REFERENCE_DISTANCE_M);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(OverlayConfig::from_json("{ not json").is_err());
        assert!(OverlayConfig::from_json(r#"{ "line_width": "wide" }"#).is_err());
    }
}
