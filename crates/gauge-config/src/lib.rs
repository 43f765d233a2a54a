//! Rune Gauge configuration system
//!
//! Loads animation, sizing and demo settings from `gauge.toml`, with
//! environment variables layered on top for temporary overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Default file name looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "gauge.toml";

/// Errors produced while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is outside its accepted range.
    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GaugeConfig {
    /// Value interpolation settings
    pub animation: AnimationConfig,
    /// Ring diameter policy
    pub sizing: SizingConfig,
    /// Headless demo settings
    pub demo: DemoConfig,
}

/// Value interpolation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Transition length in milliseconds; `<= 0` snaps to the target
    pub duration_ms: f64,
    /// Easing curve name (linear, ease, ease_in, ease_out, ease_in_out, ease_out_cubic)
    pub easing: String,
}

/// Which diameter policy the ring uses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SizingMode {
    /// Diameter follows the parent panel width
    #[default]
    Responsive,
    /// Diameter is a literal, independent of layout
    Fixed,
}

/// Ring sizing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SizingConfig {
    pub mode: SizingMode,
    /// Fraction of the panel width used as diameter (responsive mode)
    pub scale: f64,
    /// Lower diameter bound, also the fallback for unmeasured panels
    pub min_px: f64,
    /// Upper diameter bound
    pub max_px: f64,
    /// Diameter used in fixed mode
    pub fixed_diameter_px: f64,
}

/// Headless demo configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Targets applied one after another once the previous run settles
    pub targets: Vec<f64>,
    /// Width of the panel hosting the ring
    pub panel_width: f64,
    /// Simulated display refresh interval
    pub frame_interval_ms: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 800.0,
            easing: "ease_out_cubic".to_string(),
        }
    }
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            mode: SizingMode::Responsive,
            scale: 0.28,
            min_px: 140.0,
            max_px: 260.0,
            fixed_diameter_px: 220.0,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            targets: vec![80.0, 20.0, 55.0],
            panel_width: 1000.0,
            frame_interval_ms: 16.0,
        }
    }
}

impl GaugeConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `gauge.toml` from the current directory, falling back to defaults.
    ///
    /// A missing file is silent; any other failure is logged.
    pub fn load_or_default() -> Self {
        match Self::load_from_file(DEFAULT_CONFIG_FILE) {
            Ok(config) => config,
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::default()
            }
            Err(err) => {
                warn!("{err}; using default configuration");
                Self::default()
            }
        }
    }

    /// Merge configuration with environment variables
    ///
    /// Unparsable values are ignored with a warning.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("GAUGE_DURATION_MS") {
            match val.parse::<f64>() {
                Ok(ms) => self.animation.duration_ms = ms,
                Err(_) => warn!("ignoring GAUGE_DURATION_MS={val:?}"),
            }
        }
        if let Ok(easing) = std::env::var("GAUGE_EASING") {
            self.animation.easing = easing;
        }
        if let Ok(val) = std::env::var("GAUGE_SIZING") {
            match val.to_ascii_lowercase().as_str() {
                "responsive" => self.sizing.mode = SizingMode::Responsive,
                "fixed" => self.sizing.mode = SizingMode::Fixed,
                _ => warn!("ignoring GAUGE_SIZING={val:?}"),
            }
        }
        if let Ok(val) = std::env::var("GAUGE_PANEL_WIDTH") {
            match val.parse::<f64>() {
                Ok(width) => self.demo.panel_width = width,
                Err(_) => warn!("ignoring GAUGE_PANEL_WIDTH={val:?}"),
            }
        }
    }

    /// Check numeric ranges that the engine relies on.
    pub fn validate(&self) -> Result<()> {
        let finite = |key: &'static str, v: f64| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    key,
                    reason: format!("{v} is not a finite number"),
                })
            }
        };

        finite("animation.duration_ms", self.animation.duration_ms)?;
        finite("sizing.scale", self.sizing.scale)?;
        finite("sizing.min_px", self.sizing.min_px)?;
        finite("sizing.max_px", self.sizing.max_px)?;
        finite("sizing.fixed_diameter_px", self.sizing.fixed_diameter_px)?;
        finite("demo.frame_interval_ms", self.demo.frame_interval_ms)?;

        if self.sizing.scale <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "sizing.scale",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.sizing.min_px > self.sizing.max_px {
            return Err(ConfigError::Invalid {
                key: "sizing.min_px",
                reason: format!(
                    "{} exceeds sizing.max_px ({})",
                    self.sizing.min_px, self.sizing.max_px
                ),
            });
        }
        if self.sizing.fixed_diameter_px <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "sizing.fixed_diameter_px",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.demo.frame_interval_ms <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "demo.frame_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from gauge.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        if let Err(err) = config.validate() {
            warn!("{err}; using default configuration");
            return Self::default();
        }
        config
    }
}
