//! Dash state machine.
//!
//! A dash is a loft followed by a fixed-duration interpolation:
//!
//! 1. The resolver sees a dash request while grounded and moving. The
//!    character is launched upward and the interpolation start is scheduled
//!    `dash_delay` seconds later ([`DashPhase::Launching`]).
//! 2. When the deadline passes, the current position becomes the path start
//!    and the character is moved along a straight line each tick
//!    ([`DashPhase::Interpolating`]).
//! 3. Once the path end time has passed the character is placed exactly on
//!    the end point and the phase returns to [`DashPhase::Idle`].
//!
//! Positions are sampled from the simulation clock, not integrated from the
//! tick delta, so the dash covers the same distance in the same time at any
//! frame rate.

use bevy::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::config::{ControllerConfig, ViewAngles};
use crate::events::{emit, DashEvent};
use crate::intent::MovementIntent;

/// Straight-line dash path sampled against the simulation clock.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct DashPath {
    /// Position when interpolation started.
    pub start: Vec3,
    /// Position the dash ends on.
    pub end: Vec3,
    /// Simulation time when interpolation started (seconds).
    pub start_time: f32,
    /// Simulation time when the dash ends (seconds).
    pub end_time: f32,
    /// `end_time - start_time`.
    pub duration: f32,
}

impl DashPath {
    /// Build the path for a dash starting at `start` at time `now`.
    pub fn new(start: Vec3, direction: Vec3, config: &ControllerConfig, now: f32) -> Self {
        let duration = config.dash_duration();
        Self {
            start,
            end: start + direction * config.dash_distance,
            start_time: now,
            end_time: now + duration,
            duration,
        }
    }

    /// Interpolation factor at `now`, clamped to `[0, 1]`.
    pub fn alpha(&self, now: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start_time) / self.duration).clamp(0.0, 1.0)
    }

    /// Position on the path at `now`.
    pub fn sample(&self, now: f32) -> Vec3 {
        self.start.lerp(self.end, self.alpha(now))
    }

    /// Whether the end time has passed. A zero-length dash is always done.
    pub fn is_finished(&self, now: f32) -> bool {
        self.duration <= 0.0 || now > self.end_time
    }
}

/// Dash phases.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub enum DashPhase {
    /// No dash running.
    #[default]
    Idle,
    /// Lofted; interpolation starts at `fire_at`.
    Launching {
        /// Dash direction captured at launch (scaled by the throttle).
        direction: Vec3,
        /// Simulation time of the deferred interpolation start.
        fire_at: f32,
    },
    /// Moving along the path. Normal movement is suspended.
    Interpolating(DashPath),
}

/// Dash state for a controlled character.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct DashState {
    phase: DashPhase,
}

impl DashState {
    /// Current phase.
    pub fn phase(&self) -> DashPhase {
        self.phase
    }

    /// True while interpolating. Suppresses movement, thrust and new dashes.
    pub fn in_progress(&self) -> bool {
        matches!(self.phase, DashPhase::Interpolating(_))
    }

    /// True between the loft and the deferred interpolation start.
    pub fn is_launching(&self) -> bool {
        matches!(self.phase, DashPhase::Launching { .. })
    }

    /// The active path, if interpolating.
    pub fn path(&self) -> Option<DashPath> {
        match self.phase {
            DashPhase::Interpolating(path) => Some(path),
            _ => None,
        }
    }

    /// Schedule the interpolation start. Replaces any pending schedule.
    pub(crate) fn arm(&mut self, direction: Vec3, fire_at: f32) {
        self.phase = DashPhase::Launching { direction, fire_at };
    }

    /// Take the scheduled direction if its deadline has passed.
    pub(crate) fn take_due(&mut self, now: f32) -> Option<Vec3> {
        match self.phase {
            DashPhase::Launching { direction, fire_at } if now >= fire_at => {
                self.phase = DashPhase::Idle;
                Some(direction)
            }
            _ => None,
        }
    }

    pub(crate) fn start(&mut self, path: DashPath) {
        self.phase = DashPhase::Interpolating(path);
    }

    pub(crate) fn finish(&mut self) {
        self.phase = DashPhase::Idle;
    }
}

/// Pick the dash direction from the movement intent.
///
/// Forward wins when both throttles are set. The axis is scaled by its
/// throttle so pulling back dashes backwards.
pub fn dash_direction(intent: &MovementIntent, view: &ViewAngles) -> Vec3 {
    if intent.forward != 0.0 {
        view.forward() * intent.forward
    } else {
        view.right() * intent.right
    }
}

/// Loft the character and schedule the interpolation start.
pub fn launch_dash<B: CharacterPhysicsBackend>(
    world: &mut World,
    entity: Entity,
    direction: Vec3,
    config: &ControllerConfig,
    now: f32,
) {
    B::launch(world, entity, Vec3::Y * config.dash_height);

    if let Some(mut dash) = world.get_mut::<DashState>(entity) {
        dash.arm(direction, now + config.dash_delay);
    }

    debug!(?entity, ?direction, "dash launched");
    emit(world, DashEvent::Launched { entity, direction });
}

/// Run the deferred interpolation start if its deadline has passed.
///
/// Returns true if the dash started this call.
pub fn fire_pending_dash<B: CharacterPhysicsBackend>(
    world: &mut World,
    entity: Entity,
    config: &ControllerConfig,
    now: f32,
) -> bool {
    let Some(direction) = world
        .get_mut::<DashState>(entity)
        .and_then(|mut dash| dash.take_due(now))
    else {
        return false;
    };

    let start = B::get_position(world, entity);
    let path = DashPath::new(start, direction, config, now);

    if let Some(mut dash) = world.get_mut::<DashState>(entity) {
        dash.start(path);
    }

    debug!(?entity, start = ?path.start, end = ?path.end, duration = path.duration, "dash started");
    emit(
        world,
        DashEvent::Started {
            entity,
            start: path.start,
            end: path.end,
        },
    );
    true
}

/// Advance an interpolating dash.
///
/// Sets the character on the path while `now <= end_time`; afterwards places
/// it exactly on the end point and returns the state to idle.
pub fn step_dash<B: CharacterPhysicsBackend>(world: &mut World, entity: Entity, now: f32) {
    let Some(path) = world.get::<DashState>(entity).and_then(DashState::path) else {
        return;
    };

    if !path.is_finished(now) {
        B::set_position(world, entity, path.sample(now), true);
        return;
    }

    B::set_position(world, entity, path.end, true);
    if let Some(mut dash) = world.get_mut::<DashState>(entity) {
        dash.finish();
    }

    debug!(?entity, position = ?path.end, "dash finished");
    emit(
        world,
        DashEvent::Finished {
            entity,
            position: path.end,
        },
    );
}
