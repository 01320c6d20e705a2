//! User settings stored in ~/.config/loadbars/config.toml

use crate::waveform::WaveformKind;
use crate::widget::{
    DEFAULT_BAR_COUNT, DEFAULT_HEIGHT, DEFAULT_UPDATE_INTERVAL, DEFAULT_WIDTH, Profile,
    WidgetConfig,
};
use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Number of oscillating bars
    #[serde(default = "default_bar_count")]
    pub bar_count: usize,

    /// Waveform name: "sin" or "linear"
    #[serde(default)]
    pub animate: WaveformKind,

    /// Render loop period in milliseconds
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,

    /// Canvas width in pixels, used by `snapshot`
    #[serde(default = "default_width")]
    pub width: u32,

    /// Canvas height in pixels, used by `snapshot`
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_bar_count() -> usize {
    DEFAULT_BAR_COUNT
}

fn default_update_interval_ms() -> u64 {
    DEFAULT_UPDATE_INTERVAL.as_millis() as u64
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bar_count: default_bar_count(),
            animate: WaveformKind::default(),
            update_interval_ms: default_update_interval_ms(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Settings {
    /// Load settings from the default config path.
    /// Returns defaults if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            tracing::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                tracing::debug!("Loaded settings from: {}", path.display());
                settings
            }
            Err(e) => {
                tracing::warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("No config file found at {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save settings to the default config path
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let Some(path) = config_path() else {
            anyhow::bail!("Could not determine config directory");
        };
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = self.to_toml()?;
        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved settings to: {}", path.display());
        Ok(())
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize settings to TOML")
    }

    /// Widget configuration drawing on its own canvas
    pub fn canvas_config(&self) -> WidgetConfig {
        self.base_config().profile(Profile::Dimensions {
            width: self.width,
            height: self.height,
        })
    }

    /// Widget configuration for a host-attached render target
    pub fn container_config(&self) -> WidgetConfig {
        self.base_config().profile(Profile::Container)
    }

    fn base_config(&self) -> WidgetConfig {
        WidgetConfig::new()
            .bar_count(self.bar_count)
            .animate(self.animate)
            .update_interval(Duration::from_millis(self.update_interval_ms))
    }
}

/// Get the path to the config file: ~/.config/loadbars/config.toml
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "loadbars").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::Animate;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = toml::from_str("bar_count = 4").unwrap();
        assert_eq!(settings.bar_count, 4);
        assert_eq!(settings.animate, WaveformKind::Sin);
        assert_eq!(settings.update_interval_ms, 100);
        assert_eq!((settings.width, settings.height), (400, 200));
    }

    #[test]
    fn test_parse_waveform_name() {
        let settings: Settings = toml::from_str("animate = \"linear\"").unwrap();
        assert_eq!(settings.animate, WaveformKind::Linear);

        assert!(toml::from_str::<Settings>("animate = \"square\"").is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let settings = Settings {
            bar_count: 20,
            animate: WaveformKind::Linear,
            update_interval_ms: 50,
            width: 320,
            height: 80,
        };
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load_from(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_widget_configs() {
        let settings = Settings {
            bar_count: 6,
            animate: WaveformKind::Linear,
            update_interval_ms: 40,
            width: 120,
            height: 60,
        };

        let canvas = settings.canvas_config();
        assert_eq!(canvas.bar_count, 6);
        assert_eq!(canvas.update_interval, Duration::from_millis(40));
        assert!(matches!(canvas.animate, Animate::Named(WaveformKind::Linear)));
        assert_eq!(
            canvas.profile,
            Profile::Dimensions {
                width: 120,
                height: 60
            }
        );

        assert_eq!(settings.container_config().profile, Profile::Container);
    }
}
