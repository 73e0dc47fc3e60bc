use nalgebra::{Vector2, Vector3};

use super::constants::locomotion as consts;
use super::constants::physics::EPSILON;

/// Vertical state produced by one integration step.
#[derive(Debug, Clone, Copy)]
pub struct VerticalOutcome {
    pub vertical_velocity: f32,
    pub jump_timeout_remaining: f32,
    pub fall_timeout_remaining: f32,
    /// Jump input after the step; forced false while airborne so a held
    /// button cannot fire again the instant the character lands.
    pub jump_pressed: bool,
    /// True when a jump impulse was applied this step.
    pub jumped: bool,
}

/// Integrate gravity, jumping and the jump/fall timers for one tick.
/// `grounded` is the previous tick's probe result.
pub fn integrate_vertical(
    grounded: bool,
    jump_pressed: bool,
    vertical_velocity: f32,
    jump_timeout_remaining: f32,
    fall_timeout_remaining: f32,
    jump_height: f32,
    gravity: f32,
    jump_timeout: f32,
    fall_timeout: f32,
    dt: f32,
) -> VerticalOutcome {
    let mut vertical_velocity = vertical_velocity;
    let mut jump_timeout_remaining = jump_timeout_remaining;
    let mut fall_timeout_remaining = fall_timeout_remaining;
    let mut jump_pressed = jump_pressed;
    let mut jumped = false;

    if grounded {
        fall_timeout_remaining = fall_timeout;

        // Stop velocity dropping infinitely while resting on the ground.
        if vertical_velocity < 0.0 {
            vertical_velocity = consts::GROUNDED_SETTLE_VELOCITY;
        }

        if jump_pressed && jump_timeout_remaining <= 0.0 {
            // sqrt(H * -2 * G) = launch velocity needed to reach height H.
            vertical_velocity = (jump_height * -2.0 * gravity).sqrt();
            jumped = true;
        }

        if jump_timeout_remaining >= 0.0 {
            jump_timeout_remaining -= dt;
        }
    } else {
        jump_timeout_remaining = jump_timeout;

        if fall_timeout_remaining >= 0.0 {
            fall_timeout_remaining -= dt;
        }

        // A buffered jump press must not fire on landing; require a re-press.
        jump_pressed = false;
    }

    if vertical_velocity < consts::TERMINAL_VELOCITY {
        vertical_velocity += gravity * dt;
    }

    VerticalOutcome {
        vertical_velocity,
        jump_timeout_remaining,
        fall_timeout_remaining,
        jump_pressed,
        jumped,
    }
}

/// Smoothed speed and world-space direction for one tick of horizontal motion.
#[derive(Debug, Clone, Copy)]
pub struct SteeringPlan {
    pub speed: f32,
    pub direction: Vector3<f32>,
}

/// Plan horizontal motion: pick the target speed, smooth the current speed
/// toward it, and compose a body-relative world direction.
/// `current_horizontal_speed` is the planar magnitude of the velocity the
/// collision resolver reported for the body, not this module's own output.
pub fn plan_steering(
    move_axis: Vector2<f32>,
    sprinting: bool,
    analog_movement: bool,
    current_horizontal_speed: f32,
    right: Vector3<f32>,
    forward: Vector3<f32>,
    move_speed: f32,
    sprint_speed: f32,
    acceleration: f32,
    dt: f32,
) -> SteeringPlan {
    let mut target_speed = if sprinting { sprint_speed } else { move_speed };

    // Tolerance-based zero test; exact float equality would chase jitter.
    let idle = move_axis.norm_squared() <= EPSILON * EPSILON;
    if idle {
        target_speed = 0.0;
    }

    let input_magnitude = if analog_movement { move_axis.norm() } else { 1.0 };

    let delta = current_horizontal_speed - target_speed;
    let speed = if delta.abs() > consts::SPEED_DEADBAND {
        // Lerp toward the target, then round to 3 decimals so the speed
        // settles instead of oscillating forever below the deadband.
        let smoothed = lerp(
            current_horizontal_speed,
            target_speed * input_magnitude,
            dt * acceleration,
        );
        (smoothed * 1000.0).round() / 1000.0
    } else {
        target_speed
    };

    let direction = if idle {
        // Zero input: keep facing forward; speed is zero so the displacement
        // vanishes either way. Avoids normalizing a zero vector.
        forward.normalize()
    } else {
        (right * move_axis.x + forward * move_axis.y).normalize()
    };

    SteeringPlan { speed, direction }
}

/// Linear interpolation with the factor clamped to [0, 1].
fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}
