use nalgebra::{Isometry3, UnitQuaternion, Vector3};
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;
use std::collections::HashMap;

use super::constants::layers;
use super::constants::physics as consts;

/// World body kind for a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Fixed,
    Kinematic,
    Dynamic,
}

/// Collider shape for a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartShape {
    Block,
    Ball,
}

/// Handles for a character capsule.
/// Character positions are foot-anchored: the capsule center sits
/// `half_height` above the reported position.
pub struct CharacterHandles {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
    pub half_height: f32,
}

/// One surface or body the character swept into during a move.
#[derive(Debug, Clone, Copy)]
pub struct ContactReport {
    pub collider: ColliderHandle,
    /// Normalized direction the character was moving when the contact was
    /// generated; zero when the sweep displacement was degenerate.
    pub move_direction: Vector3<f32>,
}

/// Result of a collision-resolved character move.
#[derive(Debug, Clone)]
pub struct CharacterMoveOutcome {
    /// Displacement actually applied after sweep-and-slide.
    pub translation: Vector3<f32>,
    /// Whether the resolver considered the character supported.
    pub grounded: bool,
    pub contacts: Vec<ContactReport>,
}

/// Wrapper around Rapier3D for the locomotion simulation: parts with layer
/// masks, kinematic character capsules, the sweep-move primitive, the
/// sphere ground probe, and impulse application to dynamic bodies.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,

    /// Maps part id to Rapier rigid body handle
    pub parts: HashMap<u64, RigidBodyHandle>,
    /// Character capsules keyed by character id
    pub characters: HashMap<u64, CharacterHandles>,
}

fn character_group() -> Group {
    Group::from_bits_truncate(layers::CHARACTER)
}

/// Builds a collider with the right shape, layer memberships and solidity.
fn build_collider(size: Vector3<f32>, shape: PartShape, layer_mask: u32, solid: bool) -> Collider {
    let shared_shape = match shape {
        PartShape::Block => SharedShape::cuboid(size.x / 2.0, size.y / 2.0, size.z / 2.0),
        PartShape::Ball => SharedShape::ball(size.x / 2.0),
    };
    ColliderBuilder::new(shared_shape)
        .sensor(!solid)
        .collision_groups(InteractionGroups::new(
            Group::from_bits_truncate(layer_mask),
            Group::ALL,
        ))
        .build()
}

impl PhysicsWorld {
    /// Creates a new physics world with default downward gravity
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, -consts::DEFAULT_GRAVITY, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            parts: HashMap::new(),
            characters: HashMap::new(),
        }
    }

    /// Sets the world gravity applied to dynamic parts
    pub fn set_gravity(&mut self, gravity_y: f32) {
        self.gravity = vector![0.0, -gravity_y, 0.0];
    }

    /// Steps the physics simulation forward by dt seconds
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Refreshes the query pipeline so sweeps and probes see current colliders
    pub fn update_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Adds a part to the physics world
    pub fn add_part(
        &mut self,
        part_id: u64,
        position: Vector3<f32>,
        size: Vector3<f32>,
        shape: PartShape,
        kind: PartKind,
        layer_mask: u32,
        solid: bool,
    ) -> RigidBodyHandle {
        let body = match kind {
            PartKind::Fixed => RigidBodyBuilder::fixed(),
            PartKind::Kinematic => RigidBodyBuilder::kinematic_position_based(),
            PartKind::Dynamic => RigidBodyBuilder::dynamic(),
        }
        .translation(vector![position.x, position.y, position.z])
        .build();

        let handle = self.rigid_body_set.insert(body);
        let collider = build_collider(size, shape, layer_mask, solid);
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        self.parts.insert(part_id, handle);
        handle
    }

    /// Gets the handle for a part
    pub fn part_handle(&self, part_id: u64) -> Option<RigidBodyHandle> {
        self.parts.get(&part_id).copied()
    }

    /// Gets the position of a rigid body
    pub fn get_position(&self, handle: RigidBodyHandle) -> Option<Vector3<f32>> {
        self.rigid_body_set.get(handle).map(|body| *body.translation())
    }

    /// Gets the linear velocity of a rigid body
    pub fn get_velocity(&self, handle: RigidBodyHandle) -> Option<Vector3<f32>> {
        self.rigid_body_set.get(handle).map(|body| *body.linvel())
    }

    /// Adds a character capsule at a foot-anchored position.
    /// Characters collide with everything except other characters.
    pub fn add_character(
        &mut self,
        character_id: u64,
        foot_position: Vector3<f32>,
        radius: f32,
        height: f32,
    ) -> RigidBodyHandle {
        let half_height = height / 2.0;
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(vector![
                foot_position.x,
                foot_position.y + half_height,
                foot_position.z
            ])
            .build();
        let body_handle = self.rigid_body_set.insert(body);

        // Capsule half-height covers the cylinder only; caps add the radius.
        let cylinder_half = (height - 2.0 * radius).max(0.0) / 2.0;
        let collider = ColliderBuilder::capsule_y(cylinder_half, radius)
            .collision_groups(InteractionGroups::new(
                character_group(),
                Group::ALL & !character_group(),
            ))
            .build();
        let collider_handle = self
            .collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);

        self.characters.insert(
            character_id,
            CharacterHandles {
                body_handle,
                collider_handle,
                half_height,
            },
        );
        body_handle
    }

    /// Gets the rigid body handle of a character
    pub fn character_body(&self, character_id: u64) -> Option<RigidBodyHandle> {
        self.characters.get(&character_id).map(|c| c.body_handle)
    }

    /// Gets the foot-anchored position of a character
    pub fn get_character_position(&self, character_id: u64) -> Option<Vector3<f32>> {
        let handles = self.characters.get(&character_id)?;
        let body = self.rigid_body_set.get(handles.body_handle)?;
        let center = body.translation();
        Some(Vector3::new(
            center.x,
            center.y - handles.half_height,
            center.z,
        ))
    }

    /// Gets the resolver-reported linear velocity of a character body.
    /// Kinematic bodies get their velocity from the applied translation at
    /// each step, so this reflects actual resolved motion.
    pub fn get_character_velocity(&self, character_id: u64) -> Option<Vector3<f32>> {
        let handles = self.characters.get(&character_id)?;
        let body = self.rigid_body_set.get(handles.body_handle)?;
        Some(*body.linvel())
    }

    /// Sets the facing yaw (radians) for a character body
    pub fn set_character_yaw(&mut self, character_id: u64, yaw: f32) -> bool {
        let Some(handles) = self.characters.get(&character_id) else {
            return false;
        };
        let Some(body) = self.rigid_body_set.get_mut(handles.body_handle) else {
            return false;
        };
        let rot = UnitQuaternion::from_euler_angles(0.0, yaw, 0.0);
        body.set_next_kinematic_rotation(rot);
        true
    }

    /// Moves a character with sweep-and-slide collision resolution, returning
    /// the applied displacement and the contacts generated along the way.
    ///
    /// The desired displacement is resolved as two sweeps, horizontal then
    /// vertical, and each contact reports the direction of the sub-move that
    /// produced it. Lateral hits therefore carry a planar move direction
    /// while landing hits point straight down, which is what the contact
    /// pusher's downward cutoff discriminates on.
    pub fn move_character(
        &mut self,
        character_id: u64,
        desired: Vector3<f32>,
        dt: f32,
    ) -> Option<CharacterMoveOutcome> {
        let handles = self.characters.get(&character_id)?;
        let body_handle = handles.body_handle;
        let collider_handle = handles.collider_handle;

        let body = self.rigid_body_set.get(body_handle)?;
        let collider = self.collider_set.get(collider_handle)?;
        let shape = collider.shape();
        let mut position = *body.position();

        let controller = KinematicCharacterController {
            // Larger offset prevents getting stuck when sliding against surfaces
            offset: CharacterLength::Absolute(consts::CHARACTER_OFFSET),
            autostep: Some(CharacterAutostep {
                max_height: CharacterLength::Absolute(consts::AUTOSTEP_MAX_HEIGHT),
                min_width: CharacterLength::Absolute(consts::AUTOSTEP_MIN_WIDTH),
                include_dynamic_bodies: true,
            }),
            max_slope_climb_angle: 45.0_f32.to_radians(),
            min_slope_slide_angle: 30.0_f32.to_radians(),
            // Never snap while the move points up, or the ground would eat
            // the first ticks of a jump.
            snap_to_ground: if desired.y > 0.0 {
                None
            } else {
                Some(CharacterLength::Absolute(consts::SNAP_TO_GROUND))
            },
            ..Default::default()
        };

        let filter = QueryFilter::default()
            .exclude_rigid_body(body_handle)
            .exclude_sensors()
            .groups(InteractionGroups::new(
                character_group(),
                Group::ALL & !character_group(),
            ));

        let horizontal = Vector3::new(desired.x, 0.0, desired.z);
        let vertical = Vector3::new(0.0, desired.y, 0.0);

        let mut contacts = Vec::new();
        let mut applied = Vector3::zeros();
        let mut grounded = false;

        for (index, sub_move) in [horizontal, vertical].into_iter().enumerate() {
            // Always run the vertical sweep so grounding resolves; skip a
            // degenerate horizontal sweep.
            if index == 0 && sub_move.norm() <= consts::EPSILON {
                continue;
            }
            let move_direction = if sub_move.norm() > consts::EPSILON {
                sub_move / sub_move.norm()
            } else {
                Vector3::zeros()
            };

            let movement = controller.move_shape(
                dt,
                &self.rigid_body_set,
                &self.collider_set,
                &self.query_pipeline,
                shape,
                &position,
                vector![sub_move.x, sub_move.y, sub_move.z],
                filter,
                |collision| {
                    contacts.push(ContactReport {
                        collider: collision.handle,
                        move_direction,
                    });
                },
            );

            position.translation.vector += movement.translation;
            applied += movement.translation;
            // The vertical sweep runs last; its support result wins.
            grounded = movement.grounded;
        }

        // Schedule the resolved movement for the next physics step.
        let body = self.rigid_body_set.get_mut(body_handle)?;
        body.set_next_kinematic_translation(position.translation.vector);

        Some(CharacterMoveOutcome {
            translation: applied,
            grounded,
            contacts,
        })
    }

    /// Tests whether any collider on the given layers overlaps a sphere.
    /// Trigger volumes are skipped when `ignore_triggers` is set; the
    /// excluded body (typically the probing character) never matches.
    pub fn overlaps_sphere(
        &self,
        center: Vector3<f32>,
        radius: f32,
        layer_mask: u32,
        ignore_triggers: bool,
        exclude_body: Option<RigidBodyHandle>,
    ) -> bool {
        let ball = Ball::new(radius);
        let pos = Isometry3::translation(center.x, center.y, center.z);

        let mut filter = QueryFilter::default().groups(InteractionGroups::new(
            character_group(),
            Group::from_bits_truncate(layer_mask),
        ));
        if ignore_triggers {
            filter = filter.exclude_sensors();
        }
        if let Some(handle) = exclude_body {
            filter = filter.exclude_rigid_body(handle);
        }

        let mut hit = false;
        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &pos,
            &ball,
            filter,
            |_| {
                hit = true;
                false // stop at the first overlap
            },
        );
        hit
    }

    /// Applies an instantaneous impulse to a dynamic body
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vector3<f32>) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            if body.is_dynamic() {
                body.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
            }
        }
    }

    /// Gets the rigid body a collider is attached to, if any
    pub fn collider_body(&self, collider: ColliderHandle) -> Option<RigidBodyHandle> {
        self.collider_set.get(collider)?.parent()
    }

    /// Whether the given body exists and is dynamic
    pub fn body_is_dynamic(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set
            .get(handle)
            .map(|body| body.is_dynamic())
            .unwrap_or(false)
    }

    /// Layer memberships of a collider as a bitmask
    pub fn collider_layers(&self, collider: ColliderHandle) -> u32 {
        self.collider_set
            .get(collider)
            .map(|c| c.collision_groups().memberships.bits())
            .unwrap_or(0)
    }

    /// Removes a character and its body from the world
    pub fn remove_character(&mut self, character_id: u64) -> bool {
        if let Some(handles) = self.characters.remove(&character_id) {
            self.rigid_body_set.remove(
                handles.body_handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            );
            true
        } else {
            false
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = consts::TIMESTEP;

    fn slab(world: &mut PhysicsWorld) {
        world.add_part(
            1,
            Vector3::new(0.0, -0.5, 0.0),
            Vector3::new(100.0, 1.0, 100.0), // top at y=0
            PartShape::Block,
            PartKind::Fixed,
            layers::GROUND,
            true,
        );
    }

    #[test]
    fn test_world_creation() {
        let world = PhysicsWorld::new();
        assert_eq!(world.gravity.y, -consts::DEFAULT_GRAVITY);
    }

    #[test]
    fn test_dynamic_part_falls() {
        let mut world = PhysicsWorld::new();
        let handle = world.add_part(
            1,
            Vector3::new(0.0, 10.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            PartShape::Block,
            PartKind::Dynamic,
            layers::PROPS,
            true,
        );

        for _ in 0..10 {
            world.step(DT);
        }
        let pos = world.get_position(handle).unwrap();
        assert!(pos.y < 10.0, "dynamic part should fall, got y={}", pos.y);
    }

    #[test]
    fn test_zero_gravity_freezes_fall() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(0.0);
        let handle = world.add_part(
            1,
            Vector3::new(0.0, 10.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            PartShape::Ball,
            PartKind::Dynamic,
            layers::PROPS,
            true,
        );

        for _ in 0..10 {
            world.step(DT);
        }
        let pos = world.get_position(handle).unwrap();
        assert!((pos.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_character_sweep_on_slab() {
        let mut world = PhysicsWorld::new();
        slab(&mut world);
        world.add_character(100, Vector3::new(0.0, 0.02, 0.0), 0.5, 1.8);

        world.step(DT);
        world.update_queries();

        let outcome = world
            .move_character(100, Vector3::new(0.1, -0.04, 0.0), DT)
            .unwrap();
        assert!(outcome.grounded, "character on slab should be grounded");
        assert!(
            outcome.translation.x.abs() > 0.0,
            "horizontal movement should be applied"
        );
    }

    #[test]
    fn test_sweep_reports_contact_with_prop() {
        let mut world = PhysicsWorld::new();
        slab(&mut world);
        let crate_handle = world.add_part(
            2,
            Vector3::new(0.0, 0.5, 1.2),
            Vector3::new(1.0, 1.0, 1.0),
            PartShape::Block,
            PartKind::Dynamic,
            layers::PROPS,
            true,
        );
        world.add_character(100, Vector3::new(0.0, 0.02, 0.0), 0.5, 1.8);

        world.step(DT);
        world.update_queries();

        // Walk straight into the crate.
        let mut saw_crate = false;
        for _ in 0..30 {
            world.update_queries();
            let outcome = world
                .move_character(100, Vector3::new(0.0, -0.02, 0.08), DT)
                .unwrap();
            for contact in &outcome.contacts {
                if world.collider_body(contact.collider) == Some(crate_handle) {
                    saw_crate = true;
                    assert!(
                        (contact.move_direction.norm() - 1.0).abs() < 1e-4,
                        "contact move direction should be normalized"
                    );
                    assert_eq!(
                        contact.move_direction.y, 0.0,
                        "lateral hits report the horizontal sub-move direction"
                    );
                }
            }
            world.step(DT);
        }
        assert!(saw_crate, "walking into the crate should report a contact");
    }

    #[test]
    fn test_overlaps_sphere_respects_layers_and_sensors() {
        let mut world = PhysicsWorld::new();
        slab(&mut world);
        // Trigger volume hovering at the same spot.
        world.add_part(
            2,
            Vector3::new(0.0, 0.5, 0.0),
            Vector3::new(4.0, 1.0, 4.0),
            PartShape::Block,
            PartKind::Fixed,
            layers::TRIGGERS,
            false, // sensor
        );
        world.step(DT);
        world.update_queries();

        let probe = Vector3::new(0.0, 0.1, 0.0);
        assert!(world.overlaps_sphere(probe, 0.5, layers::GROUND, true, None));
        assert!(
            !world.overlaps_sphere(probe, 0.5, layers::PROPS, true, None),
            "mask without the slab's layer should not match"
        );
        assert!(
            !world.overlaps_sphere(probe, 0.5, layers::TRIGGERS, true, None),
            "sensor colliders should be ignored"
        );
    }

    #[test]
    fn test_apply_impulse_only_affects_dynamic_bodies() {
        let mut world = PhysicsWorld::new();
        let fixed = world.add_part(
            1,
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            PartShape::Block,
            PartKind::Fixed,
            layers::GROUND,
            true,
        );
        let dynamic = world.add_part(
            2,
            Vector3::new(5.0, 5.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            PartShape::Block,
            PartKind::Dynamic,
            layers::PROPS,
            true,
        );

        world.apply_impulse(fixed, Vector3::new(3.0, 0.0, 0.0));
        world.apply_impulse(dynamic, Vector3::new(3.0, 0.0, 0.0));

        assert_eq!(world.get_velocity(fixed).unwrap().x, 0.0);
        assert!(
            world.get_velocity(dynamic).unwrap().x > 0.0,
            "impulse should set the dynamic body in motion"
        );
    }

    #[test]
    fn test_remove_character() {
        let mut world = PhysicsWorld::new();
        world.add_character(7, Vector3::new(0.0, 0.0, 0.0), 0.5, 1.8);
        assert!(world.remove_character(7));
        assert!(!world.remove_character(7));
        assert!(world.get_character_position(7).is_none());
    }
}
