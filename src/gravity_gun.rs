//! Gravity gun: trace, grab, hold, release and launch physics bodies.
//!
//! The gun aims along the camera. Grabbing links the hit body to a hand
//! anchor owned by the backend and stops it from pushing the character
//! around; the anchor then floats `hold_distance` in front of the camera.
//! Firing launches either the held body (releasing it first) or whatever the
//! trace hits.
//!
//! A trace that hits nothing is not an error: grab and fire simply do nothing.

use bevy::prelude::*;

use crate::backend::{CharacterPhysicsBackend, RaycastRequest};
use crate::collision::{CollisionChannel, CollisionData, CollisionResponse};
use crate::config::{ControllerConfig, ViewAngles};
use crate::events::{emit, GravityGunEvent};
use crate::state::{GrabState, HeldObject};

/// Camera position and aim direction for `entity`.
fn aim<B: CharacterPhysicsBackend>(world: &World, entity: Entity) -> (Vec3, Vec3) {
    let view = world.get::<ViewAngles>(entity).copied().unwrap_or_default();
    let eye = config(world, entity).eye_position(B::get_position(world, entity));
    (eye, view.camera_forward())
}

fn config(world: &World, entity: Entity) -> ControllerConfig {
    world
        .get::<ControllerConfig>(entity)
        .copied()
        .unwrap_or_default()
}

/// The ray the gun traces along.
pub fn view_ray<B: CharacterPhysicsBackend>(world: &World, entity: Entity) -> RaycastRequest {
    let (eye, forward) = aim::<B>(world, entity);
    RaycastRequest::new(eye, forward, config(world, entity).grab_range)
}

/// Where a held object floats: `hold_distance` in front of the camera.
pub fn hold_point<B: CharacterPhysicsBackend>(world: &World, entity: Entity) -> Vec3 {
    let (eye, forward) = aim::<B>(world, entity);
    eye + forward * config(world, entity).hold_distance
}

/// Trace from the camera out to `grab_range`, physics bodies only.
pub fn trace_forward<B: CharacterPhysicsBackend>(
    world: &mut World,
    entity: Entity,
) -> Option<CollisionData> {
    let ray = view_ray::<B>(world, entity);
    if ray.is_degenerate() {
        return None;
    }
    B::trace_physics_bodies(world, ray.origin, ray.direction, ray.max_distance, entity)
}

/// Interact: release when holding, otherwise grab whatever the trace hits.
pub fn toggle_grab<B: CharacterPhysicsBackend>(world: &mut World, entity: Entity) {
    if is_holding(world, entity) {
        release::<B>(world, entity);
    } else if let Some(hit) = trace_forward::<B>(world, entity) {
        grab::<B>(world, entity, hit);
    } else {
        trace!(?entity, "grab trace missed");
    }
}

/// Link the hit body to the hand anchor and float it in front of the camera.
///
/// Anything already held is released first.
pub fn grab<B: CharacterPhysicsBackend>(world: &mut World, entity: Entity, hit: CollisionData) {
    if world.get::<GrabState>(entity).is_none() {
        warn!(?entity, "grab on an entity without GrabState");
        return;
    }
    if is_holding(world, entity) {
        release::<B>(world, entity);
    }

    let body_position = B::get_position(world, hit.entity);
    B::move_hand(world, entity, body_position);
    B::attach_to_hand(world, entity, hit.entity, hit.part);
    B::set_collision_response(
        world,
        hit.entity,
        CollisionChannel::Pawn,
        CollisionResponse::Ignore,
    );

    if let Some(mut grab) = world.get_mut::<GrabState>(entity) {
        grab.hold(HeldObject {
            body: hit.entity,
            part: hit.part,
        });
    }

    let hold = hold_point::<B>(world, entity);
    B::move_hand(world, entity, hold);

    debug!(?entity, body = ?hit.entity, "grabbed");
    emit(
        world,
        GravityGunEvent::Grabbed {
            shooter: entity,
            body: hit.entity,
        },
    );
}

/// Break the hand link and restore the body's collision with pawns.
///
/// Returns the released object. Calling this with nothing held is a logic
/// error in the caller; it is logged and ignored.
pub fn release<B: CharacterPhysicsBackend>(
    world: &mut World,
    entity: Entity,
) -> Option<HeldObject> {
    let Some(held) = world
        .get_mut::<GrabState>(entity)
        .and_then(|mut grab| grab.clear())
    else {
        warn!(?entity, "release called with nothing held");
        return None;
    };

    B::detach_from_hand(world, entity);
    B::set_collision_response(
        world,
        held.body,
        CollisionChannel::Pawn,
        CollisionResponse::Block,
    );

    debug!(?entity, body = ?held.body, "released");
    emit(
        world,
        GravityGunEvent::Released {
            shooter: entity,
            body: held.body,
        },
    );
    Some(held)
}

/// Fire: release-and-launch the held object, or launch whatever is traced.
pub fn primary_action<B: CharacterPhysicsBackend>(world: &mut World, entity: Entity) {
    let held = world.get::<GrabState>(entity).and_then(GrabState::held);

    let hit = match held {
        Some(held) => {
            let point = B::get_position(world, held.body);
            release::<B>(world, entity);
            Some(CollisionData::at_body(held.body, held.part, point))
        }
        None => trace_forward::<B>(world, entity),
    };

    match hit {
        Some(hit) => apply_launch_impulse::<B>(world, entity, hit),
        None => trace!(?entity, "fire trace missed"),
    }
}

/// Push the hit body along the camera forward with `shoot_power`.
pub fn apply_launch_impulse<B: CharacterPhysicsBackend>(
    world: &mut World,
    entity: Entity,
    hit: CollisionData,
) {
    let (_, forward) = aim::<B>(world, entity);
    let impulse = forward * config(world, entity).shoot_power;

    B::apply_impulse_at(world, hit.entity, impulse, hit.point, hit.part);

    debug!(?entity, body = ?hit.entity, ?impulse, "launched");
    emit(
        world,
        GravityGunEvent::Launched {
            shooter: entity,
            body: hit.entity,
            point: hit.point,
            impulse,
        },
    );
}

/// Keep the hand anchor in front of the camera while holding.
pub fn follow_view<B: CharacterPhysicsBackend>(world: &mut World, entity: Entity) {
    if is_holding(world, entity) {
        let hold = hold_point::<B>(world, entity);
        B::move_hand(world, entity, hold);
    }
}

fn is_holding(world: &World, entity: Entity) -> bool {
    world
        .get::<GrabState>(entity)
        .is_some_and(GrabState::is_holding)
}
