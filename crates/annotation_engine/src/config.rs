//! Engine configuration
//!
//! Every field has a default, so a partial JSON file only overrides what it
//! names. A config file that fails to parse is logged and replaced by the
//! defaults rather than failing the engine.

use crate::Result;
use render_model::HtmlOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Marker classes applied to the runs of the selected annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerClasses {
    /// Applied to every run
    pub selected: String,
    /// Applied to the first run
    pub start: String,
    /// Applied to the last run
    pub end: String,
}

impl Default for MarkerClasses {
    fn default() -> Self {
        Self {
            selected: "annotation-selected".to_string(),
            start: "annotation-start".to_string(),
            end: "annotation-end".to_string(),
        }
    }
}

/// Annotation engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub markers: MarkerClasses,
    /// Text color restored inside decoration runs
    pub text_color: String,
    pub html: HtmlOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            markers: MarkerClasses::default(),
            text_color: "#000000".to_string(),
            html: HtmlOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config, falling back to defaults on malformed input
    pub fn from_json_str(json: &str) -> Self {
        match serde_json::from_str::<EngineConfig>(json) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to parse engine config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Load a config file; a missing file yields the defaults
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&content))
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();

        assert_eq!(config.markers.selected, "annotation-selected");
        assert_eq!(config.markers.start, "annotation-start");
        assert_eq!(config.markers.end, "annotation-end");
        assert_eq!(config.text_color, "#000000");
        assert_eq!(config.html.markup_tag, "span");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r##"{"text_color": "#333333", "markers": {"selected": "picked"}}"##,
        );

        assert_eq!(config.text_color, "#333333");
        assert_eq!(config.markers.selected, "picked");
        assert_eq!(config.markers.start, "annotation-start");
        assert_eq!(config.html, HtmlOptions::default());
    }

    #[test]
    fn test_malformed_json_falls_back() {
        assert_eq!(EngineConfig::from_json_str("{not json"), EngineConfig::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();

        let config = EngineConfig::load_from_path(temp_dir.path().join("engine.json")).unwrap();

        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("engine.json");
        let mut config = EngineConfig::default();
        config.markers.end = "tail".to_string();
        config.html.id_attribute = "data-id".to_string();

        config.save_to_path(&path).unwrap();
        let loaded = EngineConfig::load_from_path(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("engine.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let config = EngineConfig::load_from_path(&path).unwrap();

        assert_eq!(config, EngineConfig::default());
    }
}
