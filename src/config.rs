//! Controller configuration components.
//!
//! This module defines the tunables of the first-person controller (movement,
//! dash, jetpack and gravity gun) and the view orientation the controller
//! derives its movement and aiming axes from.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// First-person view orientation.
///
/// The character body only ever yaws; pitch affects the camera alone. Movement
/// uses the yaw-only axes ([`ViewAngles::forward`], [`ViewAngles::right`]) and
/// the gravity gun aims along [`ViewAngles::camera_forward`].
///
/// Conventions follow Bevy: +Y is up and a zero yaw faces -Z.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct ViewAngles {
    /// Rotation around world up, in radians.
    yaw: f32,
    /// Rotation around the local right axis, in radians (positive looks up).
    pitch: f32,
}

impl ViewAngles {
    /// Create a view with the given yaw and pitch (radians).
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// Current yaw in radians.
    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Current pitch in radians.
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Rotation of the character body (yaw only).
    pub fn body_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Rotation of the camera (yaw then pitch).
    pub fn camera_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Horizontal forward axis of the character.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.body_rotation() * Vec3::NEG_Z
    }

    /// Horizontal right axis of the character.
    #[inline]
    pub fn right(&self) -> Vec3 {
        self.body_rotation() * Vec3::X
    }

    /// Aim direction of the camera.
    #[inline]
    pub fn camera_forward(&self) -> Vec3 {
        self.camera_rotation() * Vec3::NEG_Z
    }

    /// Apply an absolute yaw delta (mouse style), in radians.
    pub fn add_yaw(&mut self, delta: f32) {
        self.yaw = (self.yaw + delta).rem_euclid(std::f32::consts::TAU);
    }

    /// Apply an absolute pitch delta (mouse style), in radians.
    pub fn add_pitch(&mut self, delta: f32, max_pitch: f32) {
        self.pitch = (self.pitch + delta).clamp(-max_pitch, max_pitch);
    }

    /// Turn at a normalized rate (1.0 = full `turn_rate`) over `dt` seconds.
    pub fn turn_at_rate(&mut self, rate: f32, dt: f32, config: &ControllerConfig) {
        self.add_yaw(rate * config.turn_rate.to_radians() * dt);
    }

    /// Look up/down at a normalized rate (1.0 = full `look_up_rate`) over `dt` seconds.
    pub fn look_up_at_rate(&mut self, rate: f32, dt: f32, config: &ControllerConfig) {
        self.add_pitch(
            rate * config.look_up_rate.to_radians() * dt,
            config.max_pitch.to_radians(),
        );
    }
}

/// Configuration parameters for the first-person controller.
///
/// Defaults use centimetre units. Use [`ControllerConfig::metric()`] for
/// the same tuning in metres.
///
/// Every length and speed here has to match the physics world's units. A
/// Rapier world with its default gravity of -9.81 is a metre world and wants
/// `metric()`; the centimetre defaults need gravity of -981 (set on
/// `RapierConfiguration`) and `RapierPhysicsPlugin::with_length_unit(100.0)`.
#[derive(Component, Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[serde(default)]
pub struct ControllerConfig {
    // === Movement Settings ===
    /// Walking speed (units/second) at full throttle.
    pub move_speed: f32,

    /// Jump launch speed (units/second).
    pub jump_speed: f32,

    // === Dash Settings ===
    /// Horizontal dash speed (units/second). Dash time = distance / speed.
    pub dash_speed: f32,

    /// Horizontal distance covered by one dash.
    pub dash_distance: f32,

    /// Upward launch speed applied when a dash begins.
    pub dash_height: f32,

    /// Delay between the dash loft and the start of the interpolation (seconds).
    pub dash_delay: f32,

    // === Jetpack Settings ===
    /// Vertical acceleration while thrusting (units/second^2).
    pub jet_power: f32,

    // === Gravity Gun Settings ===
    /// Maximum distance of the grab/fire trace.
    pub grab_range: f32,

    /// Distance in front of the camera a held object floats at.
    pub hold_distance: f32,

    /// Impulse magnitude applied when launching an object.
    pub shoot_power: f32,

    // === Look Settings ===
    /// Base turn rate in degrees/second for rate-based input.
    pub turn_rate: f32,

    /// Base look up/down rate in degrees/second for rate-based input.
    pub look_up_rate: f32,

    /// Maximum camera pitch in degrees.
    pub max_pitch: f32,

    /// Height of the camera above the character origin.
    pub eye_height: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Movement settings
            move_speed: 200.0,
            jump_speed: 420.0,

            // Dash settings
            dash_speed: 1000.0,
            dash_distance: 300.0,
            dash_height: 250.0,
            dash_delay: 0.1,

            // Jetpack settings
            jet_power: 2000.0,

            // Gravity gun settings
            grab_range: 5000.0,
            hold_distance: 250.0,
            shoot_power: 1_000_000.0,

            // Look settings
            turn_rate: 45.0,
            look_up_rate: 45.0,
            max_pitch: 89.0,
            eye_height: 64.0,
        }
    }
}

impl ControllerConfig {
    /// Dash duration in seconds (distance / speed).
    ///
    /// Returns zero for a degenerate configuration, which makes the dash
    /// complete on its first interpolation tick.
    pub fn dash_duration(&self) -> f32 {
        if self.dash_speed > 0.0 && self.dash_distance > 0.0 {
            self.dash_distance / self.dash_speed
        } else {
            0.0
        }
    }

    /// World-space camera position for a character at `position`.
    ///
    /// The camera stays above the origin whatever the view angles.
    #[inline]
    pub fn eye_position(&self, position: Vec3) -> Vec3 {
        position + Vec3::Y * self.eye_height
    }

    /// Same tuning as the default, expressed in metres.
    pub fn metric() -> Self {
        let cm = Self::default();
        Self {
            move_speed: cm.move_speed * 0.01,
            jump_speed: cm.jump_speed * 0.01,
            dash_speed: cm.dash_speed * 0.01,
            dash_distance: cm.dash_distance * 0.01,
            dash_height: cm.dash_height * 0.01,
            jet_power: cm.jet_power * 0.01,
            grab_range: cm.grab_range * 0.01,
            hold_distance: cm.hold_distance * 0.01,
            shoot_power: cm.shoot_power * 0.01,
            eye_height: cm.eye_height * 0.01,
            ..cm
        }
    }

    /// Builder: set move speed.
    pub fn with_move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    /// Builder: set jump speed.
    pub fn with_jump_speed(mut self, speed: f32) -> Self {
        self.jump_speed = speed;
        self
    }

    /// Builder: set dash speed and distance.
    pub fn with_dash(mut self, speed: f32, distance: f32) -> Self {
        self.dash_speed = speed;
        self.dash_distance = distance;
        self
    }

    /// Builder: set dash loft height.
    pub fn with_dash_height(mut self, height: f32) -> Self {
        self.dash_height = height;
        self
    }

    /// Builder: set the delay between loft and interpolation.
    pub fn with_dash_delay(mut self, delay: f32) -> Self {
        self.dash_delay = delay.max(0.0);
        self
    }

    /// Builder: set jetpack power.
    pub fn with_jet_power(mut self, power: f32) -> Self {
        self.jet_power = power;
        self
    }

    /// Builder: set gravity gun range and hold distance.
    pub fn with_grab(mut self, range: f32, hold_distance: f32) -> Self {
        self.grab_range = range;
        self.hold_distance = hold_distance;
        self
    }

    /// Builder: set launch impulse magnitude.
    pub fn with_shoot_power(mut self, power: f32) -> Self {
        self.shoot_power = power;
        self
    }

    /// Builder: set the camera height above the character origin.
    pub fn with_eye_height(mut self, height: f32) -> Self {
        self.eye_height = height;
        self
    }

    /// Builder: set rate-based look speeds (degrees/second).
    pub fn with_look_rates(mut self, turn_rate: f32, look_up_rate: f32) -> Self {
        self.turn_rate = turn_rate;
        self.look_up_rate = look_up_rate;
        self
    }
}
