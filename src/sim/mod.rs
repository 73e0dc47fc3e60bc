//! Locomotion simulation: physics world, character controllers, input
//! queue, and the fixed-rate tick driver.

pub mod camera;
pub mod constants;
pub mod controller;
pub mod ground;
pub mod input;
pub mod locomotion;
pub mod physics;
pub mod pusher;

use crossbeam_channel::{Receiver, Sender};
use nalgebra::Vector3;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{ConfigError, LocomotionConfig};
use constants::physics as consts;
use controller::FirstPersonController;
use input::InputCommand;
use physics::PhysicsWorld;

/// Shared handle to a simulation, for host threads and the runner
pub type SimulationHandle = Arc<RwLock<Simulation>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimStatus {
    Running,
    Halted,
}

/// A locomotion simulation: one physics world, any number of controlled
/// characters, and a channel of queued input events.
///
/// Tick ordering is fixed: drain input, refresh queries, locomotion update
/// per controller, physics step, camera update per controller. Camera
/// updates run strictly after the step so they see final world transforms.
pub struct Simulation {
    pub physics: PhysicsWorld,
    controllers: HashMap<u64, FirstPersonController>,
    input_receiver: Receiver<InputCommand>,
    input_sender: Sender<InputCommand>,
    next_character_id: u64,
    pub tick: u64,
    pub status: SimStatus,
}

impl Simulation {
    pub fn new() -> Self {
        let (input_sender, input_receiver) = crossbeam_channel::unbounded();
        Self {
            physics: PhysicsWorld::new(),
            controllers: HashMap::new(),
            input_receiver,
            input_sender,
            next_character_id: 1,
            tick: 0,
            status: SimStatus::Running,
        }
    }

    /// Sender half of the input queue; events are drained at tick start
    pub fn input_sender(&self) -> Sender<InputCommand> {
        self.input_sender.clone()
    }

    /// Spawns a controlled character at a foot-anchored position.
    /// Fails fast on an invalid configuration, leaving the world untouched.
    pub fn spawn_character(
        &mut self,
        config: LocomotionConfig,
        foot_position: Vector3<f32>,
    ) -> Result<u64, ConfigError> {
        let character_id = self.next_character_id;
        let controller = FirstPersonController::new(character_id, config)?;

        self.physics.add_character(
            character_id,
            foot_position,
            consts::CHARACTER_RADIUS,
            consts::CHARACTER_HEIGHT,
        );
        self.controllers.insert(character_id, controller);
        self.next_character_id += 1;
        Ok(character_id)
    }

    pub fn controller(&self, character_id: u64) -> Option<&FirstPersonController> {
        self.controllers.get(&character_id)
    }

    pub fn controller_mut(&mut self, character_id: u64) -> Option<&mut FirstPersonController> {
        self.controllers.get_mut(&character_id)
    }

    /// Removes a character and its controller
    pub fn remove_character(&mut self, character_id: u64) -> bool {
        let removed = self.controllers.remove(&character_id).is_some();
        if removed {
            self.physics.remove_character(character_id);
            eprintln!("[Sim] Removed character {}", character_id);
        }
        removed
    }

    /// Stops the runner loop at the next tick boundary
    pub fn halt(&mut self) {
        self.status = SimStatus::Halted;
    }

    /// Advances the simulation by one tick of `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        self.drain_input();

        // Sweeps and probes must see current colliders.
        self.physics.update_queries();

        let mut ids: Vec<u64> = self.controllers.keys().copied().collect();
        ids.sort_unstable();

        for id in &ids {
            if let Some(controller) = self.controllers.get_mut(id) {
                controller.update(&mut self.physics, dt);
            }
        }

        self.physics.step(dt);

        for id in &ids {
            if let Some(controller) = self.controllers.get_mut(id) {
                controller.camera_update(&mut self.physics, dt);
            }
        }

        self.tick += 1;
    }

    fn drain_input(&mut self) {
        while let Ok(command) = self.input_receiver.try_recv() {
            if let Some(controller) = self.controllers.get_mut(&command.character_id) {
                controller.handle_event(command.event);
            }
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a shared simulation at a fixed tick rate until it is halted
pub struct Runner {
    handle: SimulationHandle,
    tick_rate: u64,
}

impl Runner {
    pub fn new(handle: SimulationHandle, tick_rate: u64) -> Self {
        Self { handle, tick_rate }
    }

    pub fn run(self) {
        let tick_duration = Duration::from_millis(1000 / self.tick_rate);
        let dt = 1.0 / self.tick_rate as f32;
        println!("[Sim] Running at {} Hz", self.tick_rate);

        loop {
            let start = Instant::now();

            {
                let mut sim = self.handle.write();
                if sim.status != SimStatus::Running {
                    break;
                }
                sim.tick(dt);
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            }
        }
    }
}
