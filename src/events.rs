//! Outgoing controller events.
//!
//! Cosmetic collaborators (sound, animation montages, HUD) subscribe to these.
//! Nothing in the controller waits on them, and a missing listener never
//! changes gameplay.

use bevy::prelude::*;

/// Gravity gun activity.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum GravityGunEvent {
    /// `shooter` linked `body` to its hand.
    Grabbed { shooter: Entity, body: Entity },
    /// `shooter` let go of `body`.
    Released { shooter: Entity, body: Entity },
    /// `shooter` applied a launch impulse to `body` at `point`.
    Launched {
        shooter: Entity,
        body: Entity,
        point: Vec3,
        impulse: Vec3,
    },
}

/// Jetpack toggles.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrustEvent {
    Started(Entity),
    Stopped(Entity),
}

/// Dash lifecycle.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum DashEvent {
    /// The loft was applied; interpolation starts after the dash delay.
    Launched { entity: Entity, direction: Vec3 },
    /// Interpolation started.
    Started { entity: Entity, start: Vec3, end: Vec3 },
    /// The character reached the dash end point.
    Finished { entity: Entity, position: Vec3 },
}

/// Send an event if the app registered it.
pub(crate) fn emit<E: Event>(world: &mut World, event: E) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.send(event);
    }
}
