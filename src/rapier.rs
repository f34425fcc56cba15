//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.
//!
//! Walking writes the character's horizontal [`Velocity`]; launches add to it.
//! A grounded character that did not walk on a tick brakes to a stop.
//! Traces and sweeps go through [`ReadRapierContext`]. The gravity gun hand is
//! a kinematic body per character, linked to the held body with a fixed
//! [`ImpulseJoint`] that lives on its own child entity of the held body, so
//! breaking the link is a despawn and never touches the body itself.

use bevy::ecs::system::SystemState;
use bevy::prelude::*;
use bevy_rapier3d::geometry::Group;
use bevy_rapier3d::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::collision::{CollisionChannel, CollisionData, CollisionResponse};
use crate::dash::DashState;
use crate::state::ThrustState;
use crate::{ControllerSet, FirstPersonController};

/// Solver group characters belong to.
///
/// Held bodies drop this group from their solver filters so they don't push
/// characters around.
pub const PAWN_GROUP: Group = Group::GROUP_10;

/// How far below the collider bottom ground still counts as "standing".
const GROUND_PROBE_FRACTION: f32 = 0.1;

/// Gap left between a swept collider and whatever stopped it.
const SWEEP_SKIN: f32 = 0.01;

/// Rapier3D physics backend for the first-person controller.
pub struct Rapier3dBackend;

impl CharacterPhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn get_position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation)
            .or_else(|| world.get::<GlobalTransform>(entity).map(|t| t.translation()))
            .unwrap_or(Vec3::ZERO)
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec3::ZERO)
    }

    fn add_movement_input(world: &mut World, entity: Entity, displacement: Vec3) {
        let dt = fixed_timestep(world);
        let Some(mut vel) = world.get_mut::<Velocity>(entity) else {
            return;
        };
        let walk = displacement / dt;
        vel.linvel.x = walk.x;
        vel.linvel.z = walk.z;
        world.entity_mut(entity).insert(WalkInput { walked: true });
    }

    fn launch(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel += velocity;
        }
    }

    fn set_position(world: &mut World, entity: Entity, position: Vec3, sweep: bool) {
        let target = if sweep {
            swept_position(world, entity, position)
        } else {
            position
        };

        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation = target;
        }
    }

    fn is_falling(world: &mut World, entity: Entity) -> bool {
        let bottom = world
            .get::<Collider>(entity)
            .map(get_collider_bottom_offset)
            .unwrap_or(0.0);
        let probe = bottom * (1.0 + GROUND_PROBE_FRACTION) + SWEEP_SKIN;
        let origin = Self::get_position(world, entity);

        let mut state: SystemState<ReadRapierContext> = SystemState::new(world);
        let rapier_context = state.get(world);
        let Ok(context) = rapier_context.single() else {
            return false;
        };

        let filter = QueryFilter::default()
            .exclude_rigid_body(entity)
            .exclude_sensors();

        context
            .cast_ray(origin, Vec3::NEG_Y, probe, true, filter)
            .is_none()
    }

    fn trace_physics_bodies(
        world: &mut World,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude_entity: Entity,
    ) -> Option<CollisionData> {
        let mut state: SystemState<ReadRapierContext> = SystemState::new(world);
        let rapier_context = state.get(world);
        let context = rapier_context.single().ok()?;

        let filter = QueryFilter::only_dynamic()
            .exclude_rigid_body(exclude_entity)
            .exclude_sensors();

        context
            .cast_ray_and_get_normal(origin, direction, max_distance, true, filter)
            .map(|(collider, hit)| {
                let body = owning_body(world, collider);
                CollisionData::new(hit.time_of_impact, hit.normal, hit.point, body)
                    .with_part(collider)
            })
    }

    fn move_hand(world: &mut World, owner: Entity, position: Vec3) {
        let anchor = hand_anchor(world, owner);
        if let Some(mut transform) = world.get_mut::<Transform>(anchor) {
            transform.translation = position;
        }
    }

    fn attach_to_hand(world: &mut World, owner: Entity, body: Entity, part: Option<Entity>) {
        Self::detach_from_hand(world, owner);

        let anchor = hand_anchor(world, owner);
        let target = part
            .filter(|&part| world.get::<RigidBody>(part).is_some())
            .unwrap_or(body);

        let anchor_position = Self::get_position(world, anchor);
        let (target_position, target_rotation) = world
            .get::<Transform>(target)
            .map(|t| (t.translation, t.rotation))
            .unwrap_or((anchor_position, Quat::IDENTITY));

        // Keep the body where and how it was grabbed relative to the hand.
        let joint = FixedJointBuilder::new()
            .local_anchor1(target_position - anchor_position)
            .local_basis1(target_rotation)
            .local_anchor2(Vec3::ZERO);

        let joint_entity = world
            .spawn((
                Name::new("Gravity gun joint"),
                Transform::default(),
                ImpulseJoint::new(anchor, joint),
                ChildOf(target),
            ))
            .id();

        if let Some(mut rig) = world.get_mut::<HandRig>(owner) {
            rig.joint = Some(joint_entity);
            rig.held = Some(body);
        }
    }

    fn detach_from_hand(world: &mut World, owner: Entity) {
        let Some(joint) = world
            .get_mut::<HandRig>(owner)
            .and_then(|mut rig| {
                rig.held = None;
                rig.joint.take()
            })
        else {
            return;
        };

        if world.get_entity(joint).is_ok() {
            world.despawn(joint);
        }
    }

    fn set_collision_response(
        world: &mut World,
        body: Entity,
        channel: CollisionChannel,
        response: CollisionResponse,
    ) {
        let group = match channel {
            CollisionChannel::Pawn => PAWN_GROUP,
        };

        for collider in body_colliders(world, body) {
            let mut groups = world
                .get::<SolverGroups>(collider)
                .copied()
                .unwrap_or_default();
            match response {
                CollisionResponse::Ignore => groups.filters.remove(group),
                CollisionResponse::Block => groups.filters.insert(group),
            }
            world.entity_mut(collider).insert(groups);
        }
    }

    fn apply_impulse_at(
        world: &mut World,
        body: Entity,
        impulse: Vec3,
        point: Vec3,
        part: Option<Entity>,
    ) {
        let target = part
            .filter(|&part| world.get::<RigidBody>(part).is_some())
            .unwrap_or(body);
        let center = Self::get_position(world, target);
        let applied = ExternalImpulse::at_point(impulse, point, center);

        if let Some(mut ext_impulse) = world.get_mut::<ExternalImpulse>(target) {
            ext_impulse.impulse += applied.impulse;
            ext_impulse.torque_impulse += applied.torque_impulse;
        } else if let Ok(mut entity) = world.get_entity_mut(target) {
            entity.insert(applied);
        }
    }
}

/// Plugin that sets up Rapier3D-specific systems for the controller.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<HandRig>();
        app.register_type::<HandAnchor>();
        app.register_type::<WalkInput>();
        app.add_systems(
            FixedUpdate,
            brake_idle_characters
                .after(ControllerSet::Resolve)
                .before(ControllerSet::Sync),
        );
        app.add_systems(PostUpdate, despawn_orphaned_hands);
    }
}

/// Whether the character walked during the current tick.
///
/// Set by [`Rapier3dBackend::add_movement_input`], consumed by
/// [`brake_idle_characters`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct WalkInput {
    pub walked: bool,
}

/// Stop grounded characters that got no walking input this tick.
///
/// Dash interpolation and thrust own the character's motion and are left
/// alone, as is anything airborne.
pub fn brake_idle_characters(world: &mut World) {
    let idle: Vec<Entity> = world
        .query_filtered::<(
            Entity,
            Option<&mut WalkInput>,
            Option<&DashState>,
            Option<&ThrustState>,
        ), (With<FirstPersonController>, With<Velocity>)>()
        .iter_mut(world)
        .filter_map(|(entity, walk, dash, thrust)| {
            let walked = walk.is_some_and(|mut walk| std::mem::take(&mut walk.walked));
            let dashing = dash.is_some_and(DashState::in_progress);
            let thrusting = thrust.is_some_and(|thrust| thrust.active);
            (!walked && !dashing && !thrusting).then_some(entity)
        })
        .collect();

    for entity in idle {
        if Rapier3dBackend::is_falling(world, entity) {
            continue;
        }
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel.x = 0.0;
            vel.linvel.z = 0.0;
        }
    }
}

/// The gravity gun hand of a character.
///
/// Spawned on first use.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct HandRig {
    /// Kinematic body the held object is linked to.
    pub anchor: Entity,
    /// Entity carrying the fixed joint, while holding.
    pub joint: Option<Entity>,
    /// The held body, while holding.
    pub held: Option<Entity>,
}

/// Marks a hand anchor body and points back at its character.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct HandAnchor {
    pub owner: Entity,
}

/// Return the owner's hand anchor, spawning it if needed.
fn hand_anchor(world: &mut World, owner: Entity) -> Entity {
    if let Some(rig) = world.get::<HandRig>(owner) {
        if world.get_entity(rig.anchor).is_ok() {
            return rig.anchor;
        }
    }

    let position = Rapier3dBackend::get_position(world, owner);
    let anchor = world
        .spawn((
            Name::new("Gravity gun hand"),
            HandAnchor { owner },
            RigidBody::KinematicPositionBased,
            Transform::from_translation(position),
        ))
        .id();

    if let Ok(mut entity) = world.get_entity_mut(owner) {
        entity.insert(HandRig {
            anchor,
            joint: None,
            held: None,
        });
    }
    anchor
}

/// Despawn hand anchors whose character is gone, along with their links.
pub fn despawn_orphaned_hands(
    mut commands: Commands,
    q_anchors: Query<(Entity, &HandAnchor)>,
    q_owners: Query<(), With<HandRig>>,
    q_joints: Query<(Entity, &ImpulseJoint)>,
) {
    for (anchor, hand) in &q_anchors {
        if q_owners.get(hand.owner).is_ok() {
            continue;
        }
        for (joint, _) in q_joints.iter().filter(|(_, j)| j.parent == anchor) {
            commands.entity(joint).despawn();
        }
        commands.entity(anchor).despawn();
    }
}

/// Fixed timestep delta, with fallback for testing scenarios.
fn fixed_timestep(world: &World) -> f32 {
    world
        .get_resource::<Time<Fixed>>()
        .map(|t| t.delta_secs())
        .filter(|&d| d > 0.0)
        .unwrap_or(1.0 / 60.0)
}

/// Walk up the hierarchy from a collider to the rigid body that owns it.
fn owning_body(world: &World, collider: Entity) -> Entity {
    let mut current = collider;
    loop {
        if world.get::<RigidBody>(current).is_some() {
            return current;
        }
        match world.get::<ChildOf>(current) {
            Some(child_of) => current = child_of.parent(),
            None => return collider,
        }
    }
}

/// The body's own collider plus the colliders of its direct children.
fn body_colliders(world: &World, body: Entity) -> Vec<Entity> {
    let mut colliders = Vec::new();
    if world.get::<Collider>(body).is_some() {
        colliders.push(body);
    }
    if let Some(children) = world.get::<Children>(body) {
        colliders.extend(
            children
                .to_vec()
                .into_iter()
                .filter(|&child| world.get::<Collider>(child).is_some()),
        );
    }
    colliders
}

/// Stop a teleport at the first blocking contact along the way.
fn swept_position(world: &mut World, entity: Entity, target: Vec3) -> Vec3 {
    let Some(collider) = world.get::<Collider>(entity).cloned() else {
        return target;
    };
    let (origin, rotation) = world
        .get::<Transform>(entity)
        .map(|t| (t.translation, t.rotation))
        .unwrap_or((target, Quat::IDENTITY));

    let delta = target - origin;
    let distance = delta.length();
    if distance <= f32::EPSILON {
        return target;
    }
    let direction = delta / distance;
    let held = world.get::<HandRig>(entity).and_then(|rig| rig.held);

    let mut state: SystemState<ReadRapierContext> = SystemState::new(world);
    let rapier_context = state.get(world);
    let Ok(context) = rapier_context.single() else {
        return target;
    };

    let not_held = |collider: Entity| held != Some(owning_body(world, collider));
    let filter = QueryFilter::default()
        .exclude_rigid_body(entity)
        .exclude_sensors()
        .predicate(&not_held);

    match context.cast_shape(
        origin,
        rotation,
        direction,
        &*collider.raw,
        ShapeCastOptions {
            max_time_of_impact: distance,
            stop_at_penetration: false,
            ..default()
        },
        filter,
    ) {
        Some((_, hit)) => origin + direction * (hit.time_of_impact - SWEEP_SKIN).max(0.0),
        None => target,
    }
}

/// Get the distance from collider center to bottom for a given collider.
/// For capsules, this is half_height + radius.
pub fn get_collider_bottom_offset(collider: &Collider) -> f32 {
    if let Some(capsule) = collider.as_capsule() {
        // Capsule: half-length of segment + radius
        let segment = capsule.segment();
        let half_height = (segment.a().y - segment.b().y).abs() / 2.0;
        half_height + capsule.radius()
    } else if let Some(ball) = collider.as_ball() {
        ball.radius()
    } else if let Some(cuboid) = collider.as_cuboid() {
        cuboid.half_extents().y
    } else if let Some(cylinder) = collider.as_cylinder() {
        cylinder.half_height()
    } else {
        // Unknown shape: probe from the center
        0.0
    }
}

/// Bundle for creating a character with Rapier3D physics.
///
/// Provides the rigid body, velocity, impulse accumulator, axis locking,
/// damping and the pawn solver group the gravity gun relies on.
///
/// # Example
///
/// A metre-sized character for a Rapier world with its default gravity:
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use fps_gravity_controller::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 1.0, 0.0),
///         FirstPersonController,
///         ControllerConfig::metric(),
///         Rapier3dCharacterBundle::rotation_locked(),
///         Collider::capsule_y(0.6, 0.3),
///     ));
/// }
/// ```
///
/// Centimetre tuning ([`ControllerConfig::default`](crate::config::ControllerConfig))
/// needs a centimetre world: `RapierPhysicsPlugin::default().with_length_unit(100.0)`
/// and a gravity of -981 on the `RapierConfiguration`.
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::Dynamic`]
/// - `locked_axes`: Empty for [`Rapier3dCharacterBundle::new()`],
///   [`LockedAxes::ROTATION_LOCKED`] for [`Rapier3dCharacterBundle::rotation_locked()`]
/// - `damping`: Linear 0.0, Angular 1.0 (walking sets the velocity directly
///   and [`brake_idle_characters`] stops it)
/// - `solver_groups`: Member of [`PAWN_GROUP`], collides with everything
#[derive(Bundle, Default)]
pub struct Rapier3dCharacterBundle {
    /// The rigid body type. Should typically be [`RigidBody::Dynamic`].
    pub rigid_body: RigidBody,
    /// Current linear and angular velocity. Walking and launches write here.
    pub velocity: Velocity,
    /// Accumulated impulses applied this frame.
    pub external_impulse: ExternalImpulse,
    /// Which axes are locked.
    pub locked_axes: LockedAxes,
    /// Damping coefficients for velocity reduction.
    pub damping: Damping,
    /// Marks the character as a pawn for collision responses.
    pub solver_groups: SolverGroups,
}

impl Rapier3dCharacterBundle {
    /// Create a new character bundle with rotation enabled.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            external_impulse: ExternalImpulse::default(),
            locked_axes: LockedAxes::empty(),
            damping: Damping {
                linear_damping: 0.0,
                angular_damping: 1.0,
            },
            solver_groups: SolverGroups::new(PAWN_GROUP, Group::ALL),
        }
    }

    /// Create a character bundle with rotation locked.
    ///
    /// The usual choice for a first-person character: yaw lives in
    /// [`ViewAngles`](crate::config::ViewAngles), so the body never needs to
    /// rotate.
    pub fn rotation_locked() -> Self {
        Self {
            locked_axes: LockedAxes::ROTATION_LOCKED,
            ..Self::new()
        }
    }

    /// Set the rigid body type for the character.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Set the damping coefficients for velocity reduction.
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.damping = Damping {
            linear_damping: linear,
            angular_damping: angular,
        };
        self
    }

    /// Set which axes should be locked for the rigid body.
    pub fn with_locked_axes(mut self, axes: LockedAxes) -> Self {
        self.locked_axes = axes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
        app.insert_resource(Time::<Fixed>::from_hz(60.0));
        app
    }

    #[test]
    fn rapier_backend_get_position() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((Transform::from_xyz(100.0, 200.0, -50.0), RigidBody::Dynamic))
            .id();

        app.update();

        let pos = Rapier3dBackend::get_position(app.world(), entity);
        assert!((pos.x - 100.0).abs() < 0.01);
        assert!((pos.y - 200.0).abs() < 0.01);
        assert!((pos.z + 50.0).abs() < 0.01);
    }

    #[test]
    fn rapier_backend_launch_adds_velocity() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                RigidBody::Dynamic,
                Velocity::linear(Vec3::new(50.0, 0.0, 0.0)),
            ))
            .id();

        Rapier3dBackend::launch(app.world_mut(), entity, Vec3::new(0.0, 30.0, 0.0));

        let vel = Rapier3dBackend::get_velocity(app.world(), entity);
        assert!((vel.x - 50.0).abs() < 0.01);
        assert!((vel.y - 30.0).abs() < 0.01);
    }

    #[test]
    fn rapier_backend_movement_keeps_vertical_velocity() {
        let mut world = World::new();
        let entity = world
            .spawn(Velocity::linear(Vec3::new(0.0, -5.0, 0.0)))
            .id();

        Rapier3dBackend::add_movement_input(&mut world, entity, Vec3::new(1.0, 0.0, -2.0) / 60.0);

        let vel = Rapier3dBackend::get_velocity(&world, entity);
        assert!((vel.x - 1.0).abs() < 1e-4);
        assert!((vel.z + 2.0).abs() < 1e-4);
        assert_eq!(vel.y, -5.0);
    }

    #[test]
    fn idle_grounded_character_brakes() {
        let mut world = World::new();
        let entity = world
            .spawn((
                crate::FirstPersonController,
                Velocity::linear(Vec3::new(3.0, -1.0, 2.0)),
            ))
            .id();

        world.run_system_cached(brake_idle_characters).unwrap();

        // No physics context: the ground probe reports "not falling"
        let vel = Rapier3dBackend::get_velocity(&world, entity);
        assert_eq!(vel, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn walking_character_keeps_velocity_for_one_tick() {
        let mut world = World::new();
        let entity = world
            .spawn((crate::FirstPersonController, Velocity::zero()))
            .id();

        Rapier3dBackend::add_movement_input(&mut world, entity, Vec3::new(0.0, 0.0, -2.0) / 60.0);
        world.run_system_cached(brake_idle_characters).unwrap();
        assert!((Rapier3dBackend::get_velocity(&world, entity).z + 2.0).abs() < 1e-4);
        assert_eq!(world.get::<WalkInput>(entity).map(|w| w.walked), Some(false));

        world.run_system_cached(brake_idle_characters).unwrap();
        assert_eq!(Rapier3dBackend::get_velocity(&world, entity), Vec3::ZERO);
    }

    #[test]
    fn thrusting_character_is_not_braked() {
        let mut world = World::new();
        let entity = world
            .spawn((
                crate::FirstPersonController,
                Velocity::linear(Vec3::new(1.0, 5.0, 0.0)),
            ))
            .id();
        world.get_mut::<ThrustState>(entity).unwrap().press();

        world.run_system_cached(brake_idle_characters).unwrap();
        assert_eq!(
            Rapier3dBackend::get_velocity(&world, entity),
            Vec3::new(1.0, 5.0, 0.0)
        );
    }

    #[test]
    fn rapier_backend_unswept_teleport() {
        let mut world = World::new();
        let entity = world.spawn(Transform::default()).id();

        Rapier3dBackend::set_position(&mut world, entity, Vec3::new(1.0, 2.0, 3.0), false);
        assert_eq!(
            Rapier3dBackend::get_position(&world, entity),
            Vec3::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn rapier_character_bundle_creates_valid_entity() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                Rapier3dCharacterBundle::rotation_locked(),
                Collider::capsule_y(0.5, 0.3),
            ))
            .id();

        app.update();

        assert!(app.world().get::<RigidBody>(entity).is_some());
        assert!(app.world().get::<Velocity>(entity).is_some());
        assert_eq!(
            app.world().get::<LockedAxes>(entity).copied(),
            Some(LockedAxes::ROTATION_LOCKED)
        );
        let groups = app.world().get::<SolverGroups>(entity).copied();
        assert_eq!(groups.map(|g| g.memberships), Some(PAWN_GROUP));
    }

    #[test]
    fn collider_bottom_offset_by_shape() {
        assert!((get_collider_bottom_offset(&Collider::capsule_y(0.5, 0.3)) - 0.8).abs() < 1e-5);
        assert!((get_collider_bottom_offset(&Collider::ball(2.0)) - 2.0).abs() < 1e-5);
        assert!((get_collider_bottom_offset(&Collider::cuboid(1.0, 3.0, 1.0)) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn collision_response_toggles_pawn_filter() {
        let mut world = World::new();
        let body = world
            .spawn((RigidBody::Dynamic, Collider::ball(1.0)))
            .id();

        Rapier3dBackend::set_collision_response(
            &mut world,
            body,
            CollisionChannel::Pawn,
            CollisionResponse::Ignore,
        );
        let groups = world.get::<SolverGroups>(body).copied();
        assert!(groups.is_some_and(|g| !g.filters.contains(PAWN_GROUP)));

        Rapier3dBackend::set_collision_response(
            &mut world,
            body,
            CollisionChannel::Pawn,
            CollisionResponse::Block,
        );
        let groups = world.get::<SolverGroups>(body).copied();
        assert!(groups.is_some_and(|g| g.filters.contains(PAWN_GROUP)));
    }

    #[test]
    fn hand_attach_and_detach() {
        let mut world = World::new();
        let owner = world.spawn(Transform::default()).id();
        let body = world
            .spawn((Transform::from_xyz(0.0, 0.0, -2.0), RigidBody::Dynamic))
            .id();

        Rapier3dBackend::move_hand(&mut world, owner, Vec3::new(0.0, 0.0, -2.0));
        Rapier3dBackend::attach_to_hand(&mut world, owner, body, None);

        let rig = *world.get::<HandRig>(owner).unwrap();
        let joint = rig.joint.unwrap();
        assert_eq!(rig.held, Some(body));
        assert_eq!(world.get::<ImpulseJoint>(joint).unwrap().parent, rig.anchor);
        assert_eq!(world.get::<ChildOf>(joint).unwrap().parent(), body);

        Rapier3dBackend::move_hand(&mut world, owner, Vec3::new(1.0, 1.0, -2.0));
        assert_eq!(
            Rapier3dBackend::get_position(&world, rig.anchor),
            Vec3::new(1.0, 1.0, -2.0)
        );

        Rapier3dBackend::detach_from_hand(&mut world, owner);
        assert!(world.get_entity(joint).is_err());
        assert!(world.get_entity(body).is_ok());
        assert_eq!(world.get::<HandRig>(owner).unwrap().joint, None);
    }

    #[test]
    fn orphaned_hand_is_cleaned_up() {
        let mut world = World::new();
        let owner = world.spawn(Transform::default()).id();
        let body = world.spawn((Transform::default(), RigidBody::Dynamic)).id();

        Rapier3dBackend::move_hand(&mut world, owner, Vec3::ZERO);
        Rapier3dBackend::attach_to_hand(&mut world, owner, body, None);
        let rig = *world.get::<HandRig>(owner).unwrap();

        world.despawn(owner);
        world.run_system_cached(despawn_orphaned_hands).unwrap();

        assert!(world.get_entity(rig.anchor).is_err());
        assert!(world.get_entity(rig.joint.unwrap()).is_err());
        assert!(world.get_entity(body).is_ok());
    }

    #[test]
    fn impulse_at_offset_point_adds_torque() {
        let mut world = World::new();
        let body = world
            .spawn((Transform::default(), RigidBody::Dynamic, ExternalImpulse::default()))
            .id();

        Rapier3dBackend::apply_impulse_at(
            &mut world,
            body,
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::new(1.0, 0.0, 0.0),
            None,
        );

        let ext = world.get::<ExternalImpulse>(body).unwrap();
        assert_eq!(ext.impulse, Vec3::new(0.0, 0.0, -10.0));
        // (1,0,0) x (0,0,-10) = (0,10,0)
        assert!((ext.torque_impulse - Vec3::new(0.0, 10.0, 0.0)).length() < 1e-5);
    }
}
