use nalgebra::Vector3;

use super::constants::pushing as consts;
use super::physics::{ContactReport, PhysicsWorld};

/// Planar push impulse for a contact, or None when the contact's move
/// direction points down too steeply (the character is standing or landing
/// on the body rather than walking into it).
pub fn planar_push_impulse(move_direction: Vector3<f32>, strength: f32) -> Option<Vector3<f32>> {
    if move_direction.y < consts::DOWNWARD_CONTACT_CUTOFF {
        return None;
    }
    // Push on the XZ plane only, never along Y.
    Some(Vector3::new(move_direction.x, 0.0, move_direction.z) * strength)
}

/// Applies push impulses for one tick's contact reports. Contacts with
/// missing or non-dynamic bodies, or bodies outside the pushable layer mask,
/// are skipped.
pub fn apply_contact_pushes(
    physics: &mut PhysicsWorld,
    contacts: &[ContactReport],
    pushable_layers: u32,
    strength: f32,
) {
    for contact in contacts {
        let Some(body) = physics.collider_body(contact.collider) else {
            continue;
        };
        if !physics.body_is_dynamic(body) {
            continue;
        }
        if physics.collider_layers(contact.collider) & pushable_layers == 0 {
            continue;
        }
        let Some(impulse) = planar_push_impulse(contact.move_direction, strength) else {
            continue;
        };
        physics.apply_impulse(body, impulse);
    }
}
