//! Configuration for port attachment and interactive linking.
//!
//! The tuning constants of the side resolver, the link-point spreader and
//! the linking tool live here so applications can override them. Files are
//! read and written as JSON or TOML depending on their extension.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, Result};

/// Linking and port-geometry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkingConfig {
    /// Maximum distance from the pointer at which a port is considered
    pub gravity_radius: f64,
    /// Bias applied to the link angle of orthogonal links before side
    /// classification, in degrees
    pub orthogonal_bias_degrees: f64,
    /// Extra end-segment length per staggered link on a shared side
    pub end_segment_step: f64,
    /// Default end-segment length of newly created ports
    pub end_segment_length: f64,
    /// Ports wider or taller than this are matched by their boundary
    /// rather than their center
    pub large_port_extent: f64,
    /// Distance from the view edge, in view pixels, that triggers autoscroll
    pub autoscroll_margin: f64,
    /// Pan distance per pointer event while autoscrolling, in view pixels
    pub autoscroll_step: f64,
    /// Maximum number of undoable transactions
    pub undo_depth: usize,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            gravity_radius: 100.0,
            orthogonal_bias_degrees: 15.0,
            end_segment_step: 8.0,
            end_segment_length: 10.0,
            large_port_extent: 10.0,
            autoscroll_margin: 16.0,
            autoscroll_step: 8.0,
            undo_depth: 100,
        }
    }
}

impl LinkingConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        config.validate()?;
        tracing::debug!("Loaded linking config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        positive("gravity_radius", self.gravity_radius)?;
        positive("autoscroll_step", self.autoscroll_step)?;
        non_negative("orthogonal_bias_degrees", self.orthogonal_bias_degrees)?;
        non_negative("end_segment_step", self.end_segment_step)?;
        non_negative("end_segment_length", self.end_segment_length)?;
        non_negative("large_port_extent", self.large_port_extent)?;
        non_negative("autoscroll_margin", self.autoscroll_margin)?;

        if self.orthogonal_bias_degrees >= 45.0 {
            return Err(invalid("orthogonal_bias_degrees", "must be below 45 degrees").into());
        }
        if self.undo_depth == 0 {
            return Err(invalid("undo_depth", "must be > 0").into());
        }
        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(key: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(key, "must be > 0").into())
    }
}

fn non_negative(key: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(key, "must be >= 0").into())
    }
}
