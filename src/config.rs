//! Locomotion configuration parsing from character.toml files

use serde::Deserialize;
use std::path::Path;

use crate::sim::constants::{layers, pushing};

/// Locomotion tunables for one character controller.
/// Immutable once a controller is constructed; replaced wholesale through
/// `FirstPersonController::reconfigure`.
#[derive(Debug, Clone, Deserialize)]
pub struct LocomotionConfig {
    /// Movement speed in units/s
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    /// Sprinting speed in units/s
    #[serde(default = "default_sprint_speed")]
    pub sprint_speed: f32,
    /// Camera/body rotation speed in deg/s per unit of look input
    #[serde(default = "default_rotate_speed")]
    pub rotate_speed: f32,
    /// Acceleration and deceleration rate for horizontal speed smoothing
    #[serde(default = "default_acceleration")]
    pub acceleration: f32,
    /// Height the character can jump, in units
    #[serde(default = "default_jump_height")]
    pub jump_height: f32,
    /// The character's own gravity in units/s² (negative, points down)
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    /// Seconds after a jump before the character can jump again
    #[serde(default = "default_jump_timeout")]
    pub jump_timeout: f32,
    /// Seconds airborne before the fall timer expires (stair tolerance)
    #[serde(default = "default_fall_timeout")]
    pub fall_timeout: f32,
    /// Ground probe offset in units; subtracted from the foot position,
    /// so a negative offset raises the probe above foot level
    #[serde(default = "default_grounded_offset")]
    pub grounded_offset: f32,
    /// Ground probe sphere radius in units
    #[serde(default = "default_grounded_radius")]
    pub grounded_radius: f32,
    /// Layer mask of surfaces that count as ground
    #[serde(default = "default_ground_layers")]
    pub ground_layers: u32,
    /// Max camera tilt upward, in degrees
    #[serde(default = "default_camera_clamp_top")]
    pub camera_clamp_top: f32,
    /// Max camera tilt downward, in degrees
    #[serde(default = "default_camera_clamp_bottom")]
    pub camera_clamp_bottom: f32,
    /// Whether the character pushes dynamic bodies it walks into
    #[serde(default = "default_pushing_enabled")]
    pub pushing_enabled: bool,
    /// Layer mask of bodies the character can push
    #[serde(default = "default_pushable_layers")]
    pub pushable_layers: u32,
    /// Push impulse strength; valid range [0.5, 5.0]
    #[serde(default = "default_push_strength")]
    pub push_strength: f32,
}

fn default_move_speed() -> f32 {
    5.0
}

fn default_sprint_speed() -> f32 {
    10.0
}

fn default_rotate_speed() -> f32 {
    1.0
}

fn default_acceleration() -> f32 {
    10.0
}

fn default_jump_height() -> f32 {
    1.0
}

fn default_gravity() -> f32 {
    -15.0
}

fn default_jump_timeout() -> f32 {
    0.1
}

fn default_fall_timeout() -> f32 {
    0.1
}

fn default_grounded_offset() -> f32 {
    -0.1
}

fn default_grounded_radius() -> f32 {
    0.5
}

fn default_ground_layers() -> u32 {
    layers::GROUND
}

fn default_camera_clamp_top() -> f32 {
    90.0
}

fn default_camera_clamp_bottom() -> f32 {
    -90.0
}

fn default_pushing_enabled() -> bool {
    true
}

fn default_pushable_layers() -> u32 {
    layers::PROPS
}

fn default_push_strength() -> f32 {
    1.1
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            move_speed: default_move_speed(),
            sprint_speed: default_sprint_speed(),
            rotate_speed: default_rotate_speed(),
            acceleration: default_acceleration(),
            jump_height: default_jump_height(),
            gravity: default_gravity(),
            jump_timeout: default_jump_timeout(),
            fall_timeout: default_fall_timeout(),
            grounded_offset: default_grounded_offset(),
            grounded_radius: default_grounded_radius(),
            ground_layers: default_ground_layers(),
            camera_clamp_top: default_camera_clamp_top(),
            camera_clamp_bottom: default_camera_clamp_bottom(),
            pushing_enabled: default_pushing_enabled(),
            pushable_layers: default_pushable_layers(),
            push_strength: default_push_strength(),
        }
    }
}

impl LocomotionConfig {
    /// Load locomotion configuration from a TOML file and validate it
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the tunables for setup defects. Controllers call this at
    /// construction so a bad configuration fails fast instead of producing
    /// undefined clamp or probe behavior at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera_clamp_bottom > self.camera_clamp_top {
            return Err(ConfigError::ClampBoundsInverted {
                bottom: self.camera_clamp_bottom,
                top: self.camera_clamp_top,
            });
        }
        if self.grounded_radius <= 0.0 {
            return Err(ConfigError::NonPositiveGroundedRadius(self.grounded_radius));
        }
        if self.gravity >= 0.0 {
            return Err(ConfigError::NonNegativeGravity(self.gravity));
        }
        if self.ground_layers == 0 {
            return Err(ConfigError::EmptyGroundLayers);
        }
        if !(pushing::MIN_STRENGTH..=pushing::MAX_STRENGTH).contains(&self.push_strength) {
            return Err(ConfigError::PushStrengthOutOfRange(self.push_strength));
        }
        for (name, value) in [
            ("move_speed", self.move_speed),
            ("sprint_speed", self.sprint_speed),
            ("rotate_speed", self.rotate_speed),
            ("acceleration", self.acceleration),
            ("jump_height", self.jump_height),
            ("jump_timeout", self.jump_timeout),
            ("fall_timeout", self.fall_timeout),
        ] {
            if value < 0.0 {
                return Err(ConfigError::NegativeTunable { name, value });
            }
        }
        Ok(())
    }
}

/// Errors that can occur when loading or validating locomotion configuration
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::path::PathBuf, std::io::Error),
    ParseError(std::path::PathBuf, toml::de::Error),
    ClampBoundsInverted { bottom: f32, top: f32 },
    NonPositiveGroundedRadius(f32),
    NonNegativeGravity(f32),
    EmptyGroundLayers,
    PushStrengthOutOfRange(f32),
    NegativeTunable { name: &'static str, value: f32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "Failed to read {}: {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse {}: {}", path.display(), e)
            }
            ConfigError::ClampBoundsInverted { bottom, top } => {
                write!(f, "Camera clamp bottom {} exceeds top {}", bottom, top)
            }
            ConfigError::NonPositiveGroundedRadius(r) => {
                write!(f, "Grounded probe radius must be positive, got {}", r)
            }
            ConfigError::NonNegativeGravity(g) => {
                write!(f, "Character gravity must be negative, got {}", g)
            }
            ConfigError::EmptyGroundLayers => {
                write!(f, "Ground layer mask is empty")
            }
            ConfigError::PushStrengthOutOfRange(s) => {
                write!(
                    f,
                    "Push strength {} outside [{}, {}]",
                    s,
                    pushing::MIN_STRENGTH,
                    pushing::MAX_STRENGTH
                )
            }
            ConfigError::NegativeTunable { name, value } => {
                write!(f, "{} must be non-negative, got {}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
