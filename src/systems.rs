//! Core controller systems.
//!
//! All systems here are exclusive (`fn(&mut World)`) and generic over the
//! physics backend, so input handling and tick resolution never interleave
//! and the engine integration can be swapped.

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::config::{ControllerConfig, ViewAngles};
use crate::dash::{self, DashState};
use crate::events::{emit, ThrustEvent};
use crate::gravity_gun;
use crate::intent::{ControllerInput, ControllerInputEvent, MovementIntent};
use crate::state::{Dashing, GrabState, HoldingObject, Jetting, ThrustState};
use crate::FirstPersonController;

/// Delta and elapsed time of the running clock.
///
/// Inside `FixedUpdate` this is the fixed clock. The delta falls back to
/// 1/60 s when the clock has not advanced yet (first frame, tests).
fn sim_clock(world: &World) -> (f32, f32) {
    world
        .get_resource::<Time>()
        .map(|time| {
            let dt = Some(time.delta_secs())
                .filter(|&d| d > 0.0)
                .unwrap_or(1.0 / 60.0);
            (dt, time.elapsed_secs())
        })
        .unwrap_or((1.0 / 60.0, 0.0))
}

fn controllers(world: &mut World) -> Vec<Entity> {
    world
        .query_filtered::<Entity, With<FirstPersonController>>()
        .iter(world)
        .collect()
}

/// Apply queued [`ControllerInputEvent`]s.
pub fn apply_controller_input<B: CharacterPhysicsBackend>(
    world: &mut World,
    mut cursor: Local<EventCursor<ControllerInputEvent>>,
) {
    let Some(events) = world.get_resource::<Events<ControllerInputEvent>>() else {
        return;
    };
    let inputs: Vec<ControllerInputEvent> = cursor.read(events).copied().collect();

    let (dt, _) = sim_clock(world);
    for event in inputs {
        apply_input::<B>(world, event.entity, event.input, dt);
    }
}

/// Apply one input to a controlled character.
///
/// Axis and look inputs only write state. Gravity gun actions run
/// immediately against the backend; everything else waits for the next
/// [`tick_controller`].
pub fn apply_input<B: CharacterPhysicsBackend>(
    world: &mut World,
    entity: Entity,
    input: ControllerInput,
    dt: f32,
) {
    let Some(config) = world.get::<ControllerConfig>(entity).copied() else {
        trace!(?entity, ?input, "input for an entity without a controller");
        return;
    };

    match input {
        ControllerInput::Forward(value) => {
            if let Some(mut intent) = world.get_mut::<MovementIntent>(entity) {
                intent.set_forward(value);
            }
        }
        ControllerInput::Right(value) => {
            if let Some(mut intent) = world.get_mut::<MovementIntent>(entity) {
                intent.set_right(value);
            }
        }
        ControllerInput::Turn(delta) => {
            if let Some(mut view) = world.get_mut::<ViewAngles>(entity) {
                view.add_yaw(delta);
            }
        }
        ControllerInput::LookUp(delta) => {
            if let Some(mut view) = world.get_mut::<ViewAngles>(entity) {
                view.add_pitch(delta, config.max_pitch.to_radians());
            }
        }
        ControllerInput::TurnRate(rate) => {
            if let Some(mut view) = world.get_mut::<ViewAngles>(entity) {
                view.turn_at_rate(rate, dt, &config);
            }
        }
        ControllerInput::LookUpRate(rate) => {
            if let Some(mut view) = world.get_mut::<ViewAngles>(entity) {
                view.look_up_at_rate(rate, dt, &config);
            }
        }
        ControllerInput::Dash => {
            if let Some(mut intent) = world.get_mut::<MovementIntent>(entity) {
                intent.request_dash();
            }
        }
        ControllerInput::Jump => {
            if let Some(mut intent) = world.get_mut::<MovementIntent>(entity) {
                intent.request_jump();
            }
        }
        ControllerInput::StopJumping => {}
        ControllerInput::Interact => gravity_gun::toggle_grab::<B>(world, entity),
        ControllerInput::Fire => gravity_gun::primary_action::<B>(world, entity),
        ControllerInput::ThrustPressed => {
            let started = world
                .get_mut::<ThrustState>(entity)
                .is_some_and(|mut thrust| thrust.press());
            if started {
                emit(world, ThrustEvent::Started(entity));
            }
        }
        ControllerInput::ThrustReleased => {
            let stopped = world
                .get_mut::<ThrustState>(entity)
                .is_some_and(|mut thrust| thrust.release());
            if stopped {
                emit(world, ThrustEvent::Stopped(entity));
            }
        }
    }
}

/// Resolve one tick for every controlled character.
pub fn resolve_controllers<B: CharacterPhysicsBackend>(world: &mut World) {
    let (dt, now) = sim_clock(world);
    for entity in controllers(world) {
        tick_controller::<B>(world, entity, dt, now);
    }
}

/// Resolve one simulation tick for `entity`.
///
/// Order matters:
/// 1. a scheduled dash start whose deadline has passed runs first;
/// 2. an interpolating dash moves the character along its path and nothing
///    else is resolved;
/// 3. otherwise thrust wins over movement, and a dash request turns a moving
///    tick into a dash launch when the character is grounded;
/// 4. a requested jump launches a grounded character;
/// 5. one-shot requests are cleared whatever happened;
/// 6. a held object follows the view.
///
/// `now` is the simulation clock in seconds and `dt` the tick length.
pub fn tick_controller<B: CharacterPhysicsBackend>(
    world: &mut World,
    entity: Entity,
    dt: f32,
    now: f32,
) {
    let Some((config, view, intent, thrust)) = snapshot(world, entity) else {
        trace!(?entity, "skipping tick for an incomplete controller");
        return;
    };

    dash::fire_pending_dash::<B>(world, entity, &config, now);

    let dashing = world
        .get::<DashState>(entity)
        .is_some_and(DashState::in_progress);

    if dashing {
        dash::step_dash::<B>(world, entity, now);
    } else {
        resolve_locomotion::<B>(world, entity, &config, &view, &intent, thrust, dt, now);
        resolve_jump::<B>(world, entity, &config, &intent);
    }

    if let Some(mut intent) = world.get_mut::<MovementIntent>(entity) {
        intent.take_dash_request();
        intent.take_jump_request();
    }

    gravity_gun::follow_view::<B>(world, entity);
}

fn snapshot(
    world: &World,
    entity: Entity,
) -> Option<(ControllerConfig, ViewAngles, MovementIntent, ThrustState)> {
    world.get::<DashState>(entity)?;
    world.get::<GrabState>(entity)?;
    Some((
        *world.get::<ControllerConfig>(entity)?,
        *world.get::<ViewAngles>(entity)?,
        *world.get::<MovementIntent>(entity)?,
        *world.get::<ThrustState>(entity)?,
    ))
}

#[allow(clippy::too_many_arguments)]
fn resolve_locomotion<B: CharacterPhysicsBackend>(
    world: &mut World,
    entity: Entity,
    config: &ControllerConfig,
    view: &ViewAngles,
    intent: &MovementIntent,
    thrust: ThrustState,
    dt: f32,
    now: f32,
) {
    let mut move_direction = (view.forward() * intent.forward + view.right() * intent.right) * dt;

    if thrust.active {
        move_direction.y = config.jet_power * dt;
        B::launch(world, entity, move_direction);
        if intent.has_dash_request() {
            trace!(?entity, "dash dropped while thrusting");
        }
        return;
    }

    if !intent.is_moving() {
        if intent.has_dash_request() {
            trace!(?entity, "dash dropped without a direction");
        }
        return;
    }

    if !intent.has_dash_request() {
        B::add_movement_input(world, entity, move_direction * config.move_speed);
    } else if !B::is_falling(world, entity) {
        let direction = dash::dash_direction(intent, view);
        dash::launch_dash::<B>(world, entity, direction, config, now);
    } else {
        trace!(?entity, "dash dropped while airborne");
    }
}

fn resolve_jump<B: CharacterPhysicsBackend>(
    world: &mut World,
    entity: Entity,
    config: &ControllerConfig,
    intent: &MovementIntent,
) {
    if !intent.has_jump_request() {
        return;
    }
    if B::is_falling(world, entity) {
        trace!(?entity, "jump dropped while airborne");
        return;
    }
    B::launch(world, entity, Vec3::Y * config.jump_speed);
}

/// Sync state marker components with the controller state.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(
        Entity,
        &DashState,
        &ThrustState,
        &GrabState,
        Has<Dashing>,
        Has<Jetting>,
        Option<&HoldingObject>,
    )>,
) {
    for (entity, dash, thrust, grab, has_dashing, has_jetting, holding) in &q_controllers {
        if dash.in_progress() && !has_dashing {
            commands.entity(entity).insert(Dashing);
        } else if !dash.in_progress() && has_dashing {
            commands.entity(entity).remove::<Dashing>();
        }

        if thrust.active && !has_jetting {
            commands.entity(entity).insert(Jetting);
        } else if !thrust.active && has_jetting {
            commands.entity(entity).remove::<Jetting>();
        }

        match (grab.held(), holding) {
            (Some(held), Some(marker)) if marker.body == held.body => {}
            (Some(held), _) => {
                commands
                    .entity(entity)
                    .insert(HoldingObject { body: held.body });
            }
            (None, Some(_)) => {
                commands.entity(entity).remove::<HoldingObject>();
            }
            (None, None) => {}
        }
    }
}
