use nalgebra::{UnitQuaternion, Vector2};

use super::constants::camera as consts;

/// Pitch and yaw produced by one camera update.
#[derive(Debug, Clone, Copy)]
pub struct CameraUpdate {
    /// New accumulated pitch in degrees, already clamped.
    pub pitch: f32,
    /// Yaw delta in degrees to apply to the body this tick.
    pub yaw_delta: f32,
}

/// Compute the camera rotation for one tick, or None when the look input is
/// below the noise threshold.
pub fn rotate_camera(
    look_delta: Vector2<f32>,
    pitch: f32,
    rotate_speed: f32,
    clamp_bottom: f32,
    clamp_top: f32,
    dt: f32,
) -> Option<CameraUpdate> {
    if look_delta.norm_squared() < consts::LOOK_INPUT_THRESHOLD {
        return None;
    }

    let pitch = pitch + look_delta.y * rotate_speed * dt;
    let yaw_delta = look_delta.x * rotate_speed * dt;

    Some(CameraUpdate {
        pitch: clamp_angle(pitch, clamp_bottom, clamp_top),
        yaw_delta,
    })
}

/// Clamp an angle to [min, max] after folding it back into (-360, 360).
pub fn clamp_angle(angle: f32, min: f32, max: f32) -> f32 {
    let mut angle = angle;
    if angle < -360.0 {
        angle += 360.0;
    }
    if angle > 360.0 {
        angle -= 360.0;
    }
    angle.clamp(min, max)
}

/// Camera attachment node: holds the accumulated pitch and exposes it as an
/// absolute local rotation (pitch, 0, 0) for the rendering rig to consume.
#[derive(Debug, Clone, Copy)]
pub struct CameraRig {
    pitch: f32,
    local_rotation: UnitQuaternion<f32>,
}

impl CameraRig {
    pub fn new() -> Self {
        Self {
            pitch: 0.0,
            local_rotation: UnitQuaternion::identity(),
        }
    }

    /// Current accumulated pitch in degrees
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Local rotation of the camera node; pitch only, set absolutely
    pub fn local_rotation(&self) -> UnitQuaternion<f32> {
        self.local_rotation
    }

    /// Replaces the rig's pitch and rebuilds the local rotation
    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch;
        self.local_rotation = UnitQuaternion::from_euler_angles(pitch.to_radians(), 0.0, 0.0);
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}
