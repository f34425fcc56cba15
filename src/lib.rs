//! # `fps_gravity_controller`
//!
//! A first-person character controller with a dash, a jetpack and a gravity
//! gun, built on a physics backend abstraction.
//!
//! This crate provides:
//! - Persistent forward/strafe throttles with yaw-relative movement
//! - A dash that lofts the character, then moves it along a straight path
//!   for a fixed time, independent of the frame rate
//! - A jetpack toggle that overrides walking while held
//! - A gravity gun that grabs physics bodies, holds them in front of the
//!   camera, drops them and launches them with an impulse
//! - A physics backend trait with a Rapier3D implementation
//!
//! ## Architecture
//!
//! Input arrives as [`ControllerInputEvent`](intent::ControllerInputEvent)s
//! and only writes state on the character entity. Once per fixed tick the
//! resolver ([`systems::tick_controller`]) reads that state, settles dash vs.
//! thrust vs. plain movement, and drives the backend. Gravity gun actions
//! run as soon as their input is applied.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use fps_gravity_controller::prelude::*;
//!
//! // Tunables in metres instead of the default centimetres.
//! let config = ControllerConfig::metric().with_dash(12.0, 4.0);
//! assert!((config.dash_duration() - 1.0 / 3.0).abs() < 1e-6);
//!
//! // Spawning the marker pulls in every other controller component.
//! let mut world = World::new();
//! let player = world.spawn((FirstPersonController, config)).id();
//! assert!(world.get::<MovementIntent>(player).is_some());
//! assert!(world.get::<DashState>(player).is_some());
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod config;
pub mod dash;
pub mod events;
pub mod gravity_gun;
pub mod intent;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::CharacterPhysicsBackend;
    pub use crate::collision::{CollisionChannel, CollisionData, CollisionResponse};
    pub use crate::config::{ControllerConfig, ViewAngles};
    pub use crate::dash::{DashPath, DashPhase, DashState};
    pub use crate::events::{DashEvent, GravityGunEvent, ThrustEvent};
    pub use crate::intent::{ControllerInput, ControllerInputEvent, MovementIntent};
    pub use crate::state::{Dashing, GrabState, HeldObject, HoldingObject, Jetting, ThrustState};
    pub use crate::{ControllerSet, FirstPersonController, FirstPersonControllerPlugin};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dCharacterBundle};
}

/// Marks an entity as a first-person controlled character.
///
/// Inserting it adds every controller component with default values; insert
/// your own [`ControllerConfig`](config::ControllerConfig) or
/// [`ViewAngles`](config::ViewAngles) alongside to override them.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
#[require(
    config::ControllerConfig,
    config::ViewAngles,
    intent::MovementIntent,
    dash::DashState,
    state::ThrustState,
    state::GrabState
)]
pub struct FirstPersonController;

/// Ordering of the controller systems inside `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControllerSet {
    /// Apply queued input events.
    Input,
    /// Resolve one tick per character.
    Resolve,
    /// Sync state marker components.
    Sync,
}

/// Main plugin for the first-person controller.
///
/// This plugin is generic over a physics backend `B` which provides the actual
/// physics operations (traces, constraints, impulses, ...).
///
/// # Examples
///
/// With the Rapier3D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use fps_gravity_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(FirstPersonControllerPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct FirstPersonControllerPlugin<B: backend::CharacterPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::CharacterPhysicsBackend> Default for FirstPersonControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::CharacterPhysicsBackend> Plugin for FirstPersonControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<FirstPersonController>();
        app.register_type::<config::ControllerConfig>();
        app.register_type::<config::ViewAngles>();
        app.register_type::<intent::MovementIntent>();
        app.register_type::<dash::DashState>();
        app.register_type::<state::ThrustState>();
        app.register_type::<state::GrabState>();
        app.register_type::<state::Dashing>();
        app.register_type::<state::Jetting>();
        app.register_type::<state::HoldingObject>();

        app.add_event::<intent::ControllerInputEvent>();
        app.add_event::<events::GravityGunEvent>();
        app.add_event::<events::ThrustEvent>();
        app.add_event::<events::DashEvent>();

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.configure_sets(
            FixedUpdate,
            (ControllerSet::Input, ControllerSet::Resolve, ControllerSet::Sync).chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                systems::apply_controller_input::<B>.in_set(ControllerSet::Input),
                systems::resolve_controllers::<B>.in_set(ControllerSet::Resolve),
                systems::sync_state_markers.in_set(ControllerSet::Sync),
            ),
        );
    }
}
