use nalgebra::{UnitQuaternion, Vector2, Vector3};

use crate::config::{ConfigError, LocomotionConfig};

use super::camera::{rotate_camera, CameraRig};
use super::ground::{probe_ground, GroundProbeConfig};
use super::input::{InputEvent, InputState};
use super::locomotion::{integrate_vertical, plan_steering};
use super::physics::PhysicsWorld;
use super::pusher::apply_contact_pushes;

/// Mutable locomotion state, persisting tick to tick.
#[derive(Debug, Clone, Copy)]
pub struct MotionState {
    /// Smoothed horizontal speed from the last steering plan
    pub horizontal_speed: f32,
    pub vertical_velocity: f32,
    /// Yaw applied to the body on the last camera update, in degrees
    pub yaw_delta: f32,
    /// Previous tick's ground probe result; starts true
    pub grounded: bool,
    pub jump_timeout_remaining: f32,
    pub fall_timeout_remaining: f32,
}

/// First-person locomotion controller for one character.
///
/// Owns the configuration, the latest input snapshot and the evolving motion
/// state. The simulation drives it in two phases per tick: `update` for
/// locomotion (integration, ground probe, steering, collision-resolved move,
/// contact pushes) and `camera_update` after the physics step so the camera
/// never lags the resolved body position.
pub struct FirstPersonController {
    character_id: u64,
    config: LocomotionConfig,
    input: InputState,
    motion: MotionState,
    camera: CameraRig,
    /// Accumulated body yaw in degrees
    yaw: f32,
}

impl FirstPersonController {
    /// Creates a controller for the given character, failing fast on a bad
    /// configuration.
    pub fn new(character_id: u64, config: LocomotionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let motion = MotionState {
            horizontal_speed: 0.0,
            vertical_velocity: 0.0,
            yaw_delta: 0.0,
            grounded: true,
            jump_timeout_remaining: config.jump_timeout,
            fall_timeout_remaining: config.fall_timeout,
        };
        Ok(Self {
            character_id,
            config,
            input: InputState::default(),
            motion,
            camera: CameraRig::new(),
            yaw: 0.0,
        })
    }

    pub fn character_id(&self) -> u64 {
        self.character_id
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    /// Accumulated body yaw in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Replaces the configuration wholesale, re-validating it
    pub fn reconfigure(&mut self, config: LocomotionConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_move(&mut self, axis: Vector2<f32>) {
        self.input.move_axis = axis;
    }

    /// Look input; dropped while look input is disabled
    pub fn set_look(&mut self, delta: Vector2<f32>) {
        if self.input.look_enabled {
            self.input.look_delta = delta;
        }
    }

    pub fn set_jump(&mut self, pressed: bool) {
        self.input.jump = pressed;
    }

    pub fn set_sprint(&mut self, held: bool) {
        self.input.sprint = held;
    }

    pub fn set_analog_movement(&mut self, enabled: bool) {
        self.input.analog_movement = enabled;
    }

    pub fn set_look_enabled(&mut self, enabled: bool) {
        self.input.look_enabled = enabled;
    }

    /// Applies a queued input event to the snapshot
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Move { axis } => self.set_move(Vector2::new(axis[0], axis[1])),
            InputEvent::Look { delta } => self.set_look(Vector2::new(delta[0], delta[1])),
            InputEvent::Jump { pressed } => self.set_jump(pressed),
            InputEvent::Sprint { held } => self.set_sprint(held),
            InputEvent::AnalogMovement { enabled } => self.set_analog_movement(enabled),
        }
    }

    /// Locomotion phase for one tick: gravity/jump integration, ground
    /// probe, steering, collision-resolved move, contact pushes.
    pub fn update(&mut self, physics: &mut PhysicsWorld, dt: f32) {
        // Vertical integration reads the previous tick's grounded flag.
        let vertical = integrate_vertical(
            self.motion.grounded,
            self.input.jump,
            self.motion.vertical_velocity,
            self.motion.jump_timeout_remaining,
            self.motion.fall_timeout_remaining,
            self.config.jump_height,
            self.config.gravity,
            self.config.jump_timeout,
            self.config.fall_timeout,
            dt,
        );
        self.motion.vertical_velocity = vertical.vertical_velocity;
        self.motion.jump_timeout_remaining = vertical.jump_timeout_remaining;
        self.motion.fall_timeout_remaining = vertical.fall_timeout_remaining;
        // The integrator's one write-back into input state: a buffered jump
        // is discarded while airborne.
        self.input.jump = vertical.jump_pressed;

        self.motion.grounded = probe_ground(physics, self.character_id, &self.probe_config());

        let current_speed = physics
            .get_character_velocity(self.character_id)
            .map(|v| (v.x * v.x + v.z * v.z).sqrt())
            .unwrap_or(0.0);
        let (right, forward) = yaw_basis(self.yaw);
        let plan = plan_steering(
            self.input.move_axis,
            self.input.sprint,
            self.input.analog_movement,
            current_speed,
            right,
            forward,
            self.config.move_speed,
            self.config.sprint_speed,
            self.config.acceleration,
            dt,
        );
        self.motion.horizontal_speed = plan.speed;

        let desired = plan.direction * (plan.speed * dt)
            + Vector3::new(0.0, self.motion.vertical_velocity * dt, 0.0);

        if let Some(outcome) = physics.move_character(self.character_id, desired, dt) {
            if self.config.pushing_enabled {
                apply_contact_pushes(
                    physics,
                    &outcome.contacts,
                    self.config.pushable_layers,
                    self.config.push_strength,
                );
            }
        }
    }

    /// Camera phase for one tick, run after the physics step: accumulate and
    /// clamp pitch, apply the yaw delta to the body.
    pub fn camera_update(&mut self, physics: &mut PhysicsWorld, dt: f32) {
        let Some(update) = rotate_camera(
            self.input.look_delta,
            self.camera.pitch(),
            self.config.rotate_speed,
            self.config.camera_clamp_bottom,
            self.config.camera_clamp_top,
            dt,
        ) else {
            return;
        };

        self.camera.set_pitch(update.pitch);
        self.motion.yaw_delta = update.yaw_delta;
        self.yaw += update.yaw_delta;
        physics.set_character_yaw(self.character_id, self.yaw.to_radians());
    }

    fn probe_config(&self) -> GroundProbeConfig {
        GroundProbeConfig {
            offset: self.config.grounded_offset,
            radius: self.config.grounded_radius,
            layer_mask: self.config.ground_layers,
        }
    }
}

/// World-space right and forward basis vectors for a body yaw in degrees
fn yaw_basis(yaw_deg: f32) -> (Vector3<f32>, Vector3<f32>) {
    let rot = UnitQuaternion::from_euler_angles(0.0, yaw_deg.to_radians(), 0.0);
    (rot * Vector3::x(), rot * Vector3::z())
}
