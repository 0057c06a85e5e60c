use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StrideError;
use crate::fields::ElevationConfig;
use crate::logging::LogConfig;
use crate::metrics::DEFAULT_SMOOTHING_WINDOW;
use crate::moving::MovingConfig;

/// Analysis settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Stop detection for moving time
    pub moving: MovingConfig,

    /// Elevation gain/loss threshold
    pub elevation: ElevationConfig,

    /// Normalized power settings
    pub power: PowerConfig,

    /// Athlete thresholds for intensity and training stress
    pub athlete: AthleteThresholds,

    /// Logging output
    pub logging: LogConfig,
}

/// Normalized power settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    /// Rolling window in seconds
    pub smoothing_window_s: f64,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            smoothing_window_s: DEFAULT_SMOOTHING_WINDOW,
        }
    }
}

/// Athlete thresholds. Intensity and training stress are only computed when set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AthleteThresholds {
    /// Functional threshold power in watts
    pub ftp: Option<f64>,

    /// Lactate threshold heart rate in bpm
    pub lthr: Option<f64>,
}

impl AnalysisConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AnalysisConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".stridestats")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %e,
                    "Config not loaded, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Save configuration to default location
    pub fn save_default(&self) -> Result<()> {
        self.save_to_file(Self::default_config_path())
    }

    /// Check windows and thresholds are usable
    pub fn validate(&self) -> crate::error::Result<()> {
        self.moving.validate()?;
        self.elevation.validate()?;

        let window = self.power.smoothing_window_s;
        if !(window.is_finite() && window > 0.0) {
            return Err(StrideError::invalid(
                "configuration",
                "power.smoothing_window_s",
                window,
            ));
        }

        let thresholds = [
            ("athlete.ftp", self.athlete.ftp),
            ("athlete.lthr", self.athlete.lthr),
        ];
        for (name, threshold) in thresholds {
            if let Some(value) = threshold {
                if !(value.is_finite() && value > 0.0) {
                    return Err(StrideError::invalid("configuration", name, value));
                }
            }
        }

        Ok(())
    }
}
