//! Locomotion and physics constants.
//! Centralizing these prevents bugs from duplicated hardcoded values.

/// Locomotion constants
pub mod locomotion {
    /// Vertical speed above which gravity stops accumulating (drag cutoff)
    pub const TERMINAL_VELOCITY: f32 = 53.0;

    /// Vertical velocity held while resting on the ground. Prevents gravity
    /// from integrating to a large negative value that would snap the
    /// character downward when leaving a ledge.
    pub const GROUNDED_SETTLE_VELOCITY: f32 = -2.0;

    /// Window around the target speed inside which interpolation is skipped
    /// and the speed snaps directly, in units/s
    pub const SPEED_DEADBAND: f32 = 0.1;
}

/// Camera constants
pub mod camera {
    /// Squared look-input magnitude below which camera input is ignored
    pub const LOOK_INPUT_THRESHOLD: f32 = 0.01;
}

/// Pushing constants
pub mod pushing {
    /// Minimum configurable push strength
    pub const MIN_STRENGTH: f32 = 0.5;

    /// Maximum configurable push strength
    pub const MAX_STRENGTH: f32 = 5.0;

    /// Contacts whose move direction points down more steeply than this are
    /// surfaces the character is standing or landing on, not push targets
    pub const DOWNWARD_CONTACT_CUTOFF: f32 = -0.3;
}

/// Physics world constants
pub mod physics {
    /// World gravity applied to dynamic parts, in units/s² (characters use
    /// their own configured gravity instead)
    pub const DEFAULT_GRAVITY: f32 = 9.81;

    /// Fixed timestep for the simulation loop (60 Hz)
    pub const TIMESTEP: f32 = 1.0 / 60.0;

    /// Character capsule radius
    pub const CHARACTER_RADIUS: f32 = 0.5;

    /// Character capsule total height
    pub const CHARACTER_HEIGHT: f32 = 1.8;

    /// Character controller autostep max height
    pub const AUTOSTEP_MAX_HEIGHT: f32 = 0.3;

    /// Character controller autostep min width
    pub const AUTOSTEP_MIN_WIDTH: f32 = 0.01;

    /// Character controller snap to ground distance
    pub const SNAP_TO_GROUND: f32 = 0.1;

    /// Collision offset kept between the capsule and surfaces it slides on
    pub const CHARACTER_OFFSET: f32 = 0.05;

    /// Small epsilon for float comparisons
    pub const EPSILON: f32 = 0.001;
}

/// Collision layer bitmasks, mapped onto Rapier interaction-group memberships
pub mod layers {
    /// World geometry the character stands on
    pub const GROUND: u32 = 1 << 0;

    /// Dynamic props the character may push
    pub const PROPS: u32 = 1 << 1;

    /// Character capsules
    pub const CHARACTER: u32 = 1 << 2;

    /// Trigger volumes (sensors)
    pub const TRIGGERS: u32 = 1 << 3;
}
