//! Resolver configuration, loaded once and validated at load time.
//!
//! A configuration file is TOML; every field is optional and falls back to the defaults in
//! [`constants`](crate::constants):
//!
//! ```toml
//! layer_mask = 0xFFFFFFFF
//! trigger_interaction = "ignore"
//! max_climb_angle_deg = 60.0
//! skin_width = 0.01
//! max_bounces = 3
//! grounded_probe_distance = 0.1
//! ```

use std::path::{Path, PathBuf};

use rapier3d::prelude::Group;
use serde::Deserialize;

use crate::collision::types::{CapsuleShape, SweepFilter, TriggerInteraction};
use crate::constants::{
    DEFAULT_GRAVITY_MPS2, DEFAULT_GROUNDED_PROBE_DISTANCE, DEFAULT_MAX_BOUNCES,
    DEFAULT_MAX_CLIMB_ANGLE_DEG, DEFAULT_SKIN_WIDTH, DEFAULT_TERMINAL_FALL_SPEED_MPS,
    MAX_CLIMB_ANGLE_LIMIT_DEG,
};

/// Raw configuration as written in a file, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlideConfigFile {
    pub layer_mask: u32,
    pub trigger_interaction: TriggerInteraction,
    pub max_climb_angle_deg: f32,
    pub skin_width: f32,
    pub max_bounces: u32,
    pub grounded_probe_distance: f32,
    pub gravity_mps2: f32,
    pub terminal_fall_speed_mps: f32,
}

impl Default for SlideConfigFile {
    fn default() -> Self {
        Self {
            layer_mask: Group::ALL.bits(),
            trigger_interaction: TriggerInteraction::Ignore,
            max_climb_angle_deg: DEFAULT_MAX_CLIMB_ANGLE_DEG,
            skin_width: DEFAULT_SKIN_WIDTH,
            max_bounces: DEFAULT_MAX_BOUNCES,
            grounded_probe_distance: DEFAULT_GROUNDED_PROBE_DISTANCE,
            gravity_mps2: DEFAULT_GRAVITY_MPS2,
            terminal_fall_speed_mps: DEFAULT_TERMINAL_FALL_SPEED_MPS,
        }
    }
}

/// Validated resolver settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideConfig {
    /// Layers a sweep may hit.
    pub layer_mask: Group,
    pub trigger_interaction: TriggerInteraction,
    /// Steepest walkable surface, from world up (degrees, inclusive).
    pub max_climb_angle_deg: f32,
    /// Margin kept between the swept capsule and surfaces (meters).
    pub skin_width: f32,
    /// Maximum sweeps per resolve call; leftover motion beyond it is dropped.
    pub max_bounces: u32,
    /// Length of the downward grounded-check sweep (meters).
    pub grounded_probe_distance: f32,
    pub gravity_mps2: f32,
    /// Positive magnitude of the fastest fall.
    pub terminal_fall_speed_mps: f32,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            layer_mask: Group::ALL,
            trigger_interaction: TriggerInteraction::Ignore,
            max_climb_angle_deg: DEFAULT_MAX_CLIMB_ANGLE_DEG,
            skin_width: DEFAULT_SKIN_WIDTH,
            max_bounces: DEFAULT_MAX_BOUNCES,
            grounded_probe_distance: DEFAULT_GROUNDED_PROBE_DISTANCE,
            gravity_mps2: DEFAULT_GRAVITY_MPS2,
            terminal_fall_speed_mps: DEFAULT_TERMINAL_FALL_SPEED_MPS,
        }
    }
}

impl SlideConfig {
    /// Parse and validate a TOML configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: SlideConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(None, e))?;
        Self::try_from(file)
    }

    /// Load and validate a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let file: SlideConfigFile = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(Some(path.to_path_buf()), e))?;
        Self::try_from(file)
    }

    /// Sweep filter derived from the layer mask and trigger policy.
    pub fn filter(&self) -> SweepFilter {
        SweepFilter::new(self.layer_mask, self.trigger_interaction)
    }

    /// Check that a body capsule is usable with this skin width.
    pub fn validate_shape(&self, shape: &CapsuleShape) -> Result<(), ConfigError> {
        if !(shape.radius > self.skin_width) {
            return Err(ConfigError::InvalidShape(format!(
                "radius {} must exceed skin width {}",
                shape.radius, self.skin_width
            )));
        }
        if !(shape.height >= 2.0 * shape.radius) {
            return Err(ConfigError::InvalidShape(format!(
                "height {} must be at least twice the radius {}",
                shape.height, shape.radius
            )));
        }
        if !shape.center.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::InvalidShape(
                "center offset must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl TryFrom<SlideConfigFile> for SlideConfig {
    type Error = ConfigError;

    fn try_from(file: SlideConfigFile) -> Result<Self, Self::Error> {
        if file.max_climb_angle_deg.is_nan() || file.max_climb_angle_deg < 0.0 {
            return Err(ConfigError::invalid(
                "max_climb_angle_deg",
                format!("{} is not a non-negative angle", file.max_climb_angle_deg),
            ));
        }

        let max_climb_angle_deg = if file.max_climb_angle_deg > MAX_CLIMB_ANGLE_LIMIT_DEG {
            log::warn!(
                "max_climb_angle_deg {} clamped to {}",
                file.max_climb_angle_deg,
                MAX_CLIMB_ANGLE_LIMIT_DEG
            );
            MAX_CLIMB_ANGLE_LIMIT_DEG
        } else {
            file.max_climb_angle_deg
        };

        if !(file.skin_width > 0.0 && file.skin_width.is_finite()) {
            return Err(ConfigError::invalid(
                "skin_width",
                format!("{} must be a small positive distance", file.skin_width),
            ));
        }

        if file.max_bounces == 0 {
            return Err(ConfigError::invalid("max_bounces", "must be at least 1"));
        }

        if !(file.grounded_probe_distance > 0.0 && file.grounded_probe_distance.is_finite()) {
            return Err(ConfigError::invalid(
                "grounded_probe_distance",
                format!("{} must be positive", file.grounded_probe_distance),
            ));
        }

        if !(file.gravity_mps2 >= 0.0 && file.gravity_mps2.is_finite()) {
            return Err(ConfigError::invalid(
                "gravity_mps2",
                format!("{} must be a non-negative magnitude", file.gravity_mps2),
            ));
        }

        if !(file.terminal_fall_speed_mps > 0.0) {
            return Err(ConfigError::invalid(
                "terminal_fall_speed_mps",
                format!("{} must be positive", file.terminal_fall_speed_mps),
            ));
        }

        Ok(Self {
            layer_mask: Group::from_bits_truncate(file.layer_mask),
            trigger_interaction: file.trigger_interaction,
            max_climb_angle_deg,
            skin_width: file.skin_width,
            max_bounces: file.max_bounces,
            grounded_probe_distance: file.grounded_probe_distance,
            gravity_mps2: file.gravity_mps2,
            terminal_fall_speed_mps: file.terminal_fall_speed_mps,
        })
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(Option<PathBuf>, toml::de::Error),
    InvalidValue { field: &'static str, reason: String },
    InvalidShape(String),
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => {
                write!(f, "Failed to read config file {}: {}", path.display(), e)
            }
            ConfigError::Parse(Some(path), e) => {
                write!(f, "Failed to parse config file {}: {}", path.display(), e)
            }
            ConfigError::Parse(None, e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for `{}`: {}", field, reason)
            }
            ConfigError::InvalidShape(reason) => write!(f, "Invalid capsule shape: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(_, e) => Some(e),
            _ => None,
        }
    }
}
