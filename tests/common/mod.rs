//! Shared test harness: a recording physics backend.
//!
//! `TestBackend` keeps bodies as plain components and logs every backend call
//! in order, so tests can assert exactly what the controller asked the physics
//! engine to do.

#![allow(dead_code)]

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use fps_gravity_controller::backend::{CharacterPhysicsBackend, NoOpBackendPlugin};
use fps_gravity_controller::prelude::*;
use fps_gravity_controller::systems;

/// A kinematic stand-in for a physics body.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct TestBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub falling: bool,
    pub pawn_response: CollisionResponse,
}

/// The hand anchor of a character and what hangs off it.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct TestHand {
    pub position: Vec3,
    pub attached: Option<Entity>,
}

/// Backend calls, in the order they were made.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Call {
    MovementInput(Entity, Vec3),
    Launch(Entity, Vec3),
    SetPosition(Entity, Vec3, bool),
    MoveHand(Entity, Vec3),
    Attach(Entity, Entity, Option<Entity>),
    Detach(Entity),
    SetResponse(Entity, CollisionResponse),
    Impulse(Entity, Vec3, Vec3, Option<Entity>),
}

#[derive(Resource, Default, Debug)]
pub struct CallLog(pub Vec<Call>);

/// What the next physics-body trace hits, if anything.
#[derive(Resource, Default, Debug)]
pub struct TraceTarget(pub Option<Entity>);

pub struct TestBackend;

fn record(world: &mut World, call: Call) {
    world.get_resource_or_insert_with(CallLog::default).0.push(call);
}

impl CharacterPhysicsBackend for TestBackend {
    fn plugin() -> impl Plugin {
        NoOpBackendPlugin
    }

    fn get_position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<TestBody>(entity)
            .map(|b| b.position)
            .unwrap_or(Vec3::ZERO)
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<TestBody>(entity)
            .map(|b| b.velocity)
            .unwrap_or(Vec3::ZERO)
    }

    fn add_movement_input(world: &mut World, entity: Entity, displacement: Vec3) {
        record(world, Call::MovementInput(entity, displacement));
        if let Some(mut body) = world.get_mut::<TestBody>(entity) {
            body.position += displacement;
        }
    }

    fn launch(world: &mut World, entity: Entity, velocity: Vec3) {
        record(world, Call::Launch(entity, velocity));
        if let Some(mut body) = world.get_mut::<TestBody>(entity) {
            body.velocity += velocity;
        }
    }

    fn set_position(world: &mut World, entity: Entity, position: Vec3, sweep: bool) {
        record(world, Call::SetPosition(entity, position, sweep));
        if let Some(mut body) = world.get_mut::<TestBody>(entity) {
            body.position = position;
        }
    }

    fn is_falling(world: &mut World, entity: Entity) -> bool {
        world.get::<TestBody>(entity).is_some_and(|b| b.falling)
    }

    fn trace_physics_bodies(
        world: &mut World,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude_entity: Entity,
    ) -> Option<CollisionData> {
        let target = world
            .get_resource::<TraceTarget>()
            .and_then(|t| t.0)
            .filter(|&t| t != exclude_entity)?;
        let point = Self::get_position(world, target);
        let distance = (point - origin).length();
        (distance <= max_distance).then(|| CollisionData::new(distance, -direction, point, target))
    }

    fn move_hand(world: &mut World, owner: Entity, position: Vec3) {
        record(world, Call::MoveHand(owner, position));
        let Some(mut hand) = world.get_mut::<TestHand>(owner) else {
            world.entity_mut(owner).insert(TestHand {
                position,
                attached: None,
            });
            return;
        };
        hand.position = position;
        let Some(attached) = hand.attached else {
            return;
        };
        if let Some(mut body) = world.get_mut::<TestBody>(attached) {
            body.position = position;
        }
    }

    fn attach_to_hand(world: &mut World, owner: Entity, body: Entity, part: Option<Entity>) {
        record(world, Call::Attach(owner, body, part));
        if let Some(mut hand) = world.get_mut::<TestHand>(owner) {
            hand.attached = Some(body);
        }
    }

    fn detach_from_hand(world: &mut World, owner: Entity) {
        record(world, Call::Detach(owner));
        if let Some(mut hand) = world.get_mut::<TestHand>(owner) {
            hand.attached = None;
        }
    }

    fn set_collision_response(
        world: &mut World,
        body: Entity,
        channel: CollisionChannel,
        response: CollisionResponse,
    ) {
        assert_eq!(channel, CollisionChannel::Pawn);
        record(world, Call::SetResponse(body, response));
        if let Some(mut test_body) = world.get_mut::<TestBody>(body) {
            test_body.pawn_response = response;
        }
    }

    fn apply_impulse_at(
        world: &mut World,
        body: Entity,
        impulse: Vec3,
        point: Vec3,
        part: Option<Entity>,
    ) {
        record(world, Call::Impulse(body, impulse, point, part));
    }
}

/// A bare world with the controller's events registered.
pub fn create_test_world() -> World {
    let mut world = World::new();
    world.init_resource::<CallLog>();
    world.init_resource::<TraceTarget>();
    world.init_resource::<Events<GravityGunEvent>>();
    world.init_resource::<Events<ThrustEvent>>();
    world.init_resource::<Events<DashEvent>>();
    world
}

/// A full app running the controller plugin at a fixed 60 Hz.
pub fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(FirstPersonControllerPlugin::<TestBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(60.0));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / 60.0,
    )));
    app.init_resource::<CallLog>();
    app.init_resource::<TraceTarget>();

    app.finish();
    app.cleanup();
    // The first update only starts the clock.
    app.update();
    app
}

/// Spawn a grounded character with default config.
pub fn spawn_character(world: &mut World, position: Vec3) -> Entity {
    spawn_character_with_config(world, position, ControllerConfig::default())
}

/// Spawn a grounded character with custom config.
pub fn spawn_character_with_config(
    world: &mut World,
    position: Vec3,
    config: ControllerConfig,
) -> Entity {
    world
        .spawn((
            FirstPersonController,
            config,
            TestBody {
                position,
                ..default()
            },
        ))
        .id()
}

/// Spawn a loose physics body.
pub fn spawn_body(world: &mut World, position: Vec3) -> Entity {
    world
        .spawn(TestBody {
            position,
            ..default()
        })
        .id()
}

/// Apply one input the way the input system does.
pub fn input(world: &mut World, entity: Entity, input: ControllerInput) {
    systems::apply_input::<TestBackend>(world, entity, input, 1.0 / 60.0);
}

/// Drop recorded backend calls.
pub fn clear_log(world: &mut World) {
    world.resource_mut::<CallLog>().0.clear();
}

pub fn calls(world: &World) -> Vec<Call> {
    world.resource::<CallLog>().0.clone()
}

pub fn position(world: &World, entity: Entity) -> Vec3 {
    TestBackend::get_position(world, entity)
}

/// Drain every event of type `E` sent so far.
pub fn drain_events<E: Event>(world: &mut World) -> Vec<E> {
    world.resource_mut::<Events<E>>().drain().collect()
}

pub fn set_falling(world: &mut World, entity: Entity, falling: bool) {
    if let Some(mut body) = world.get_mut::<TestBody>(entity) {
        body.falling = falling;
    }
}
