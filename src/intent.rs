//! Movement intent and controller input.
//!
//! Intents represent what the player wants to do between simulation ticks.
//! Input handlers only write here; the per-tick resolver reads and consumes
//! them.

use bevy::prelude::*;

/// Per-axis movement intent plus the one-shot dash and jump requests.
///
/// Throttle values persist at the last received value until input changes
/// them, matching held-key and analog-stick semantics.
///
/// # Example
///
/// ```rust
/// use fps_gravity_controller::prelude::*;
///
/// let mut intent = MovementIntent::new();
/// intent.set_forward(1.0);
/// assert!(intent.is_moving());
///
/// intent.request_dash();
/// assert!(intent.take_dash_request());
/// assert!(!intent.has_dash_request());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct MovementIntent {
    /// Forward/backward throttle (-1.0 = back, 1.0 = forward).
    pub forward: f32,
    /// Strafe throttle (-1.0 = left, 1.0 = right).
    pub right: f32,
    /// Dash requested since the last tick.
    pub(crate) dash_requested: bool,
    /// Jump requested since the last tick.
    pub(crate) jump_requested: bool,
}

impl MovementIntent {
    /// Create a new empty movement intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the forward throttle (-1.0 = back, 1.0 = forward).
    pub fn set_forward(&mut self, value: f32) {
        self.forward = value.clamp(-1.0, 1.0);
    }

    /// Set the strafe throttle (-1.0 = left, 1.0 = right).
    pub fn set_right(&mut self, value: f32) {
        self.right = value.clamp(-1.0, 1.0);
    }

    /// Check if either throttle is non-zero.
    pub fn is_moving(&self) -> bool {
        self.forward != 0.0 || self.right != 0.0
    }

    /// Queue a dash for the next tick.
    pub fn request_dash(&mut self) {
        self.dash_requested = true;
    }

    /// Check if there's a pending dash request.
    pub fn has_dash_request(&self) -> bool {
        self.dash_requested
    }

    /// Take and clear the pending dash request.
    pub fn take_dash_request(&mut self) -> bool {
        std::mem::take(&mut self.dash_requested)
    }

    /// Queue a jump for the next tick.
    pub fn request_jump(&mut self) {
        self.jump_requested = true;
    }

    /// Check if there's a pending jump request.
    pub fn has_jump_request(&self) -> bool {
        self.jump_requested
    }

    /// Take and clear the pending jump request.
    pub fn take_jump_request(&mut self) -> bool {
        std::mem::take(&mut self.jump_requested)
    }

    /// Clear all movement intents (throttles and pending requests).
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A single input for a controlled character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerInput {
    /// Forward axis value.
    Forward(f32),
    /// Strafe axis value.
    Right(f32),
    /// Absolute yaw delta in radians (mouse).
    Turn(f32),
    /// Absolute pitch delta in radians (mouse).
    LookUp(f32),
    /// Normalized yaw rate (gamepad).
    TurnRate(f32),
    /// Normalized pitch rate (gamepad).
    LookUpRate(f32),
    /// Dash pressed.
    Dash,
    /// Jump pressed.
    Jump,
    /// Jump released.
    StopJumping,
    /// Grab/release pressed.
    Interact,
    /// Fire pressed.
    Fire,
    /// Jetpack pressed.
    ThrustPressed,
    /// Jetpack released.
    ThrustReleased,
}

/// Input addressed to a controlled character.
///
/// Hosts translate their key bindings into these events; the controller
/// applies them before the next tick is resolved.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ControllerInputEvent {
    /// The controlled character.
    pub entity: Entity,
    /// What happened.
    pub input: ControllerInput,
}

impl ControllerInputEvent {
    /// Create an input event for `entity`.
    pub fn new(entity: Entity, input: ControllerInput) -> Self {
        Self { entity, input }
    }
}
