use nalgebra::Vector3;

use super::physics::PhysicsWorld;

/// Ground probe parameters for one character.
#[derive(Debug, Clone, Copy)]
pub struct GroundProbeConfig {
    /// Subtracted from the foot height; a negative offset raises the probe.
    pub offset: f32,
    pub radius: f32,
    pub layer_mask: u32,
}

/// Point-in-time grounded test: sphere overlap against the configured ground
/// layers at the offset probe position, ignoring trigger volumes and the
/// character's own capsule.
pub fn probe_ground(physics: &PhysicsWorld, character_id: u64, config: &GroundProbeConfig) -> bool {
    let Some(position) = physics.get_character_position(character_id) else {
        return false;
    };
    let body = physics.character_body(character_id);

    let probe = Vector3::new(position.x, position.y - config.offset, position.z);
    physics.overlaps_sphere(probe, config.radius, config.layer_mask, true, body)
}
