use nalgebra::Vector3;
use parking_lot::RwLock;
use rapier3d::prelude::RigidBodyHandle;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use strider::config::LocomotionConfig;
use strider::sim::constants::layers;
use strider::sim::input::{InputCommand, InputEvent};
use strider::sim::physics::{PartKind, PartShape};
use strider::sim::{Runner, Simulation, SimulationHandle};

/// Headless locomotion demo: a ground slab, a pushable crate, and one
/// character driven by scripted input while the runner ticks at 60 Hz.
fn main() {
    let mut sim = Simulation::new();

    // Ground slab, top surface at y = 0.
    sim.physics.add_part(
        1,
        Vector3::new(0.0, -0.5, 0.0),
        Vector3::new(60.0, 1.0, 60.0),
        PartShape::Block,
        PartKind::Fixed,
        layers::GROUND,
        true,
    );
    // A crate in the walking path.
    let crate_handle = sim.physics.add_part(
        2,
        Vector3::new(0.0, 0.5, 4.0),
        Vector3::new(1.0, 1.0, 1.0),
        PartShape::Block,
        PartKind::Dynamic,
        layers::PROPS,
        true,
    );

    let character_id = sim
        .spawn_character(LocomotionConfig::default(), Vector3::new(0.0, 0.05, 0.0))
        .expect("Default config should validate");

    let sender = sim.input_sender();
    let handle: SimulationHandle = Arc::new(RwLock::new(sim));
    let runner = Runner::new(Arc::clone(&handle), 60);
    let runner_thread = thread::spawn(move || runner.run());

    let send = |event: InputEvent| {
        sender
            .send(InputCommand {
                character_id,
                event,
            })
            .expect("Simulation should be running");
    };

    println!("[Demo] Walking forward");
    send(InputEvent::Move { axis: [0.0, 1.0] });
    thread::sleep(Duration::from_millis(1500));
    report(&handle, character_id, crate_handle);

    println!("[Demo] Sprinting");
    send(InputEvent::Sprint { held: true });
    thread::sleep(Duration::from_millis(1000));
    report(&handle, character_id, crate_handle);

    println!("[Demo] Jumping");
    send(InputEvent::Sprint { held: false });
    send(InputEvent::Jump { pressed: true });
    thread::sleep(Duration::from_millis(800));
    report(&handle, character_id, crate_handle);

    println!("[Demo] Looking up and turning");
    send(InputEvent::Look { delta: [20.0, 15.0] });
    thread::sleep(Duration::from_millis(500));
    send(InputEvent::Look { delta: [0.0, 0.0] });
    report(&handle, character_id, crate_handle);

    handle.write().halt();
    runner_thread.join().expect("Runner thread panicked");
    println!("[Demo] Done after {} ticks", handle.read().tick);
}

fn report(handle: &SimulationHandle, character_id: u64, crate_handle: RigidBodyHandle) {
    let sim = handle.read();
    let position = sim
        .physics
        .get_character_position(character_id)
        .unwrap_or_else(Vector3::zeros);
    let crate_position = sim
        .physics
        .get_position(crate_handle)
        .unwrap_or_else(Vector3::zeros);
    let controller = sim.controller(character_id);
    let (speed, grounded, pitch) = controller
        .map(|c| (c.motion().horizontal_speed, c.motion().grounded, c.camera().pitch()))
        .unwrap_or((0.0, false, 0.0));

    println!(
        "[Demo] tick={} pos=({:.2}, {:.2}, {:.2}) speed={:.2} grounded={} pitch={:.1} crate_z={:.2}",
        sim.tick, position.x, position.y, position.z, speed, grounded, pitch, crate_position.z
    );
}
