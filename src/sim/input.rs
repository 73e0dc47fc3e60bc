use nalgebra::Vector2;

/// An input event pushed by the host's input collaborator. Events are queued
/// on the simulation's channel and drained at the start of each tick.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Move { axis: [f32; 2] },
    Look { delta: [f32; 2] },
    Jump { pressed: bool },
    Sprint { held: bool },
    AnalogMovement { enabled: bool },
}

/// An input event addressed to one character
#[derive(Debug, Clone)]
pub struct InputCommand {
    pub character_id: u64,
    pub event: InputEvent,
}

/// Latest input values for one controller. Written by input events, read
/// once per tick by the locomotion and camera phases.
#[derive(Debug, Clone, Copy)]
pub struct InputState {
    pub move_axis: Vector2<f32>,
    pub look_delta: Vector2<f32>,
    pub jump: bool,
    pub sprint: bool,
    /// Scale the target speed by the stick magnitude instead of treating
    /// any deflection as full speed.
    pub analog_movement: bool,
    /// When false, look events are dropped at the boundary.
    pub look_enabled: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            move_axis: Vector2::zeros(),
            look_delta: Vector2::zeros(),
            jump: false,
            sprint: false,
            analog_movement: false,
            look_enabled: true,
        }
    }
}
