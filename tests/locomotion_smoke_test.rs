//! End-to-end locomotion scenarios against real Rapier worlds: walking,
//! sprinting, jumping, falling off ledges, pushing props, and camera limits.
//!
//! Run with: cargo test --test locomotion_smoke_test -- --nocapture

use nalgebra::{Vector2, Vector3};

use strider::config::LocomotionConfig;
use strider::sim::constants::layers;
use strider::sim::constants::physics::TIMESTEP;
use strider::sim::physics::{PartKind, PartShape};
use strider::sim::Simulation;

/// Simulation with a ground slab whose top surface is at y = 0.
fn sim_with_slab(extent: f32) -> Simulation {
    let mut sim = Simulation::new();
    sim.physics.add_part(
        1,
        Vector3::new(0.0, -0.5, 0.0),
        Vector3::new(extent, 1.0, extent),
        PartShape::Block,
        PartKind::Fixed,
        layers::GROUND,
        true,
    );
    sim
}

fn spawn(sim: &mut Simulation) -> u64 {
    sim.spawn_character(LocomotionConfig::default(), Vector3::new(0.0, 0.05, 0.0))
        .expect("default config should validate")
}

fn tick_n(sim: &mut Simulation, n: usize) {
    for _ in 0..n {
        sim.tick(TIMESTEP);
    }
}

#[test]
fn test_walk_converges_to_move_speed() {
    let mut sim = sim_with_slab(100.0);
    let id = spawn(&mut sim);

    sim.controller_mut(id)
        .unwrap()
        .set_move(Vector2::new(0.0, 1.0));
    tick_n(&mut sim, 150);

    let controller = sim.controller(id).unwrap();
    assert!(controller.motion().grounded, "should stay grounded while walking");
    assert_eq!(
        controller.motion().horizontal_speed,
        5.0,
        "speed should converge and snap exactly to move speed"
    );

    let position = sim.physics.get_character_position(id).unwrap();
    println!("Position after walking: {:?}", position);
    assert!(
        position.z > 3.0,
        "walking forward should advance +Z, got z={}",
        position.z
    );
    assert!(position.x.abs() < 0.1, "no sideways drift expected");
}

#[test]
fn test_sprint_reaches_sprint_speed() {
    let mut sim = sim_with_slab(200.0);
    let id = spawn(&mut sim);

    {
        let controller = sim.controller_mut(id).unwrap();
        controller.set_move(Vector2::new(0.0, 1.0));
        controller.set_sprint(true);
    }
    tick_n(&mut sim, 200);

    assert_eq!(
        sim.controller(id).unwrap().motion().horizontal_speed,
        10.0,
        "sprinting should converge to sprint speed"
    );
}

#[test]
fn test_release_input_decays_to_stop() {
    let mut sim = sim_with_slab(100.0);
    let id = spawn(&mut sim);

    sim.controller_mut(id)
        .unwrap()
        .set_move(Vector2::new(0.0, 1.0));
    tick_n(&mut sim, 120);

    sim.controller_mut(id).unwrap().set_move(Vector2::zeros());
    tick_n(&mut sim, 120);

    let speed = sim.controller(id).unwrap().motion().horizontal_speed;
    assert_eq!(speed, 0.0, "zero input should decay and snap to zero");
}

#[test]
fn test_jump_launches_and_lands() {
    let mut sim = sim_with_slab(100.0);
    let id = spawn(&mut sim);

    // Let the jump timeout expire while standing.
    tick_n(&mut sim, 10);
    assert!(sim.controller(id).unwrap().motion().grounded);

    sim.controller_mut(id).unwrap().set_jump(true);
    sim.tick(TIMESTEP);

    let config = LocomotionConfig::default();
    let launch = (config.jump_height * -2.0 * config.gravity).sqrt();
    let vertical = sim.controller(id).unwrap().motion().vertical_velocity;
    assert!(
        (vertical - (launch + config.gravity * TIMESTEP)).abs() < 1e-3,
        "jump should set vertical velocity to sqrt(2*|g|*h), got {}",
        vertical
    );

    let mut went_airborne = false;
    let mut landed_at = None;
    for i in 0..120 {
        sim.tick(TIMESTEP);
        let motion = *sim.controller(id).unwrap().motion();
        if !motion.grounded {
            went_airborne = true;
        } else if went_airborne {
            landed_at = Some(i);
            break;
        }
    }
    assert!(went_airborne, "jump should leave the ground");
    let landed_at = landed_at.expect("character should land again");
    println!("Landed after {} ticks airborne", landed_at);

    // Buffered jump input is cleared while airborne, so no rebound.
    assert!(!sim.controller(id).unwrap().input().jump);

    tick_n(&mut sim, 5);
    let motion = sim.controller(id).unwrap().motion();
    assert!(motion.grounded);
    assert!(
        motion.vertical_velocity <= 0.0 && motion.vertical_velocity > -3.0,
        "grounded vertical velocity should settle near -2, got {}",
        motion.vertical_velocity
    );
}

#[test]
fn test_walking_off_ledge_goes_airborne_and_falls() {
    let mut sim = sim_with_slab(4.0); // small slab, edge at z = 2
    let id = spawn(&mut sim);

    sim.controller_mut(id)
        .unwrap()
        .set_move(Vector2::new(0.0, 1.0));

    let mut went_airborne = false;
    for _ in 0..240 {
        sim.tick(TIMESTEP);
        if !sim.controller(id).unwrap().motion().grounded {
            went_airborne = true;
            break;
        }
    }
    assert!(went_airborne, "walking past the slab edge should lose ground");

    tick_n(&mut sim, 90);
    let position = sim.physics.get_character_position(id).unwrap();
    println!("Position after falling: {:?}", position);
    assert!(
        position.y < -1.0,
        "character should fall below the slab, got y={}",
        position.y
    );
}

#[test]
fn test_walking_into_crate_pushes_it() {
    let mut sim = sim_with_slab(100.0);
    sim.physics.add_part(
        2,
        Vector3::new(0.0, 0.5, 1.5),
        Vector3::new(1.0, 1.0, 1.0),
        PartShape::Block,
        PartKind::Dynamic,
        layers::PROPS,
        true,
    );
    let crate_handle = sim.physics.part_handle(2).unwrap();
    let id = spawn(&mut sim);

    sim.controller_mut(id)
        .unwrap()
        .set_move(Vector2::new(0.0, 1.0));
    tick_n(&mut sim, 120);

    let crate_position = sim.physics.get_position(crate_handle).unwrap();
    println!("Crate position after pushing: {:?}", crate_position);
    assert!(
        crate_position.z > 1.6,
        "crate should be pushed along +Z, got z={}",
        crate_position.z
    );
}

#[test]
fn test_landing_on_crate_does_not_push_it() {
    let mut sim = sim_with_slab(100.0);
    let crate_handle = sim.physics.add_part(
        2,
        Vector3::new(0.0, 0.5, 0.0),
        Vector3::new(1.2, 1.0, 1.2),
        PartShape::Block,
        PartKind::Dynamic,
        layers::PROPS,
        true,
    );
    // Drop the character straight onto the crate.
    let id = sim
        .spawn_character(LocomotionConfig::default(), Vector3::new(0.0, 2.5, 0.0))
        .unwrap();

    tick_n(&mut sim, 90);

    let velocity = sim.physics.get_velocity(crate_handle).unwrap();
    let planar = (velocity.x * velocity.x + velocity.z * velocity.z).sqrt();
    println!("Crate velocity after landing: {:?}", velocity);
    assert!(
        planar < 0.2,
        "landing contacts point down and must not push, got planar speed {}",
        planar
    );
    let position = sim.physics.get_character_position(id).unwrap();
    assert!(
        position.y > 0.5,
        "character should rest on top of the crate, got y={}",
        position.y
    );
}

#[test]
fn test_pushing_disabled_leaves_crate_at_rest() {
    let mut sim = sim_with_slab(100.0);
    let crate_handle = sim.physics.add_part(
        2,
        Vector3::new(0.0, 0.5, 1.5),
        Vector3::new(1.0, 1.0, 1.0),
        PartShape::Block,
        PartKind::Dynamic,
        layers::PROPS,
        true,
    );
    let config = LocomotionConfig {
        pushing_enabled: false,
        ..Default::default()
    };
    let id = sim
        .spawn_character(config, Vector3::new(0.0, 0.05, 0.0))
        .unwrap();

    sim.controller_mut(id)
        .unwrap()
        .set_move(Vector2::new(0.0, 1.0));
    tick_n(&mut sim, 120);

    let velocity = sim.physics.get_velocity(crate_handle).unwrap();
    assert!(
        velocity.norm() < 0.2,
        "with pushing disabled the crate should stay near rest, got {:?}",
        velocity
    );
}

#[test]
fn test_walks_through_trigger_volume() {
    let mut sim = sim_with_slab(100.0);
    // Non-solid trigger directly in the walking path.
    sim.physics.add_part(
        2,
        Vector3::new(0.0, 1.0, 3.0),
        Vector3::new(4.0, 2.0, 1.0),
        PartShape::Block,
        PartKind::Fixed,
        layers::TRIGGERS,
        false,
    );
    let id = spawn(&mut sim);

    sim.controller_mut(id)
        .unwrap()
        .set_move(Vector2::new(0.0, 1.0));
    tick_n(&mut sim, 150);

    let position = sim.physics.get_character_position(id).unwrap();
    assert!(
        position.z > 4.0,
        "trigger volumes must not block movement, got z={}",
        position.z
    );
}

#[test]
fn test_camera_pitch_clamps_under_sustained_look() {
    let mut sim = sim_with_slab(100.0);
    let id = spawn(&mut sim);

    // Stale look input persists until replaced, as with a held stick.
    sim.controller_mut(id)
        .unwrap()
        .set_look(Vector2::new(0.0, 60.0));
    tick_n(&mut sim, 200);

    let controller = sim.controller(id).unwrap();
    assert_eq!(controller.camera().pitch(), 90.0, "pitch should clamp at top");
    assert_eq!(controller.yaw(), 0.0, "vertical look should not yaw the body");

    sim.controller_mut(id)
        .unwrap()
        .set_look(Vector2::new(0.0, -60.0));
    tick_n(&mut sim, 400);
    assert_eq!(
        sim.controller(id).unwrap().camera().pitch(),
        -90.0,
        "pitch should clamp at bottom"
    );
}

#[test]
fn test_look_below_threshold_leaves_camera_unchanged() {
    let mut sim = sim_with_slab(100.0);
    let id = spawn(&mut sim);

    sim.controller_mut(id)
        .unwrap()
        .set_look(Vector2::new(0.05, 0.05));
    tick_n(&mut sim, 60);

    let controller = sim.controller(id).unwrap();
    assert_eq!(controller.camera().pitch(), 0.0);
    assert_eq!(controller.yaw(), 0.0);
}

#[test]
fn test_turning_redirects_walking() {
    let mut sim = sim_with_slab(200.0);
    let id = spawn(&mut sim);

    // Turn 90 degrees: yaw accumulates 90 * rotate_speed * dt per tick.
    sim.controller_mut(id)
        .unwrap()
        .set_look(Vector2::new(90.0, 0.0));
    tick_n(&mut sim, 60);

    let per_tick = 90.0 * TIMESTEP;
    assert!(
        (sim.controller(id).unwrap().motion().yaw_delta - per_tick).abs() < 1e-4,
        "per-tick yaw delta should follow look.x * rotate_speed * dt"
    );
    sim.controller_mut(id).unwrap().set_look(Vector2::zeros());

    let yaw = sim.controller(id).unwrap().yaw();
    assert!(
        (yaw - 90.0).abs() < 2.0,
        "expected roughly a quarter turn, got {} degrees",
        yaw
    );

    sim.controller_mut(id)
        .unwrap()
        .set_move(Vector2::new(0.0, 1.0));
    tick_n(&mut sim, 120);

    let position = sim.physics.get_character_position(id).unwrap();
    println!("Position after turned walk: {:?}", position);
    assert!(
        position.x > 2.0,
        "after a quarter turn, forward should point +X, got {:?}",
        position
    );
    assert!(
        position.z.abs() < 1.0,
        "little +Z motion expected after turning, got {:?}",
        position
    );
}
