//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement to
//! drive the first-person controller. The controller never touches physics
//! components directly; every movement, trace, constraint and impulse goes
//! through a backend so the engine integration can be swapped (Rapier3D,
//! Avian, a recording test double, ...).

use bevy::prelude::*;

use crate::collision::{CollisionChannel, CollisionData, CollisionResponse};

/// Trait for physics backend implementations.
///
/// All methods are static and operate on the ECS [`World`], so they can be
/// called from the controller's exclusive systems. Implementations should
/// treat missing components as "nothing to do" rather than panicking.
///
/// # Example
///
/// For an example implementation, see the `rapier` module's
/// `Rapier3dBackend`, which implements this trait for Bevy Rapier3D.
pub trait CharacterPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Get the current world position of an entity.
    fn get_position(world: &World, entity: Entity) -> Vec3;

    /// Get the current linear velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec3;

    /// Apply continuous movement input for this tick.
    ///
    /// `displacement` is the distance the character wants to cover during
    /// the current tick. The backend must respect collision while applying it.
    fn add_movement_input(world: &mut World, entity: Entity, displacement: Vec3);

    /// Launch the character.
    ///
    /// `velocity` is added to the current velocity as an instantaneous change.
    fn launch(world: &mut World, entity: Entity, velocity: Vec3);

    /// Teleport the character to `position`.
    ///
    /// When `sweep` is true the backend stops the move at the first blocking
    /// contact along the way.
    fn set_position(world: &mut World, entity: Entity, position: Vec3, sweep: bool);

    /// Whether the character is currently airborne.
    fn is_falling(world: &mut World, entity: Entity) -> bool;

    /// Cast a ray that only reports physics-simulated bodies.
    ///
    /// # Arguments
    /// * `world` - The ECS world for queries
    /// * `origin` - Ray origin in world space
    /// * `direction` - Ray direction (should be normalized)
    /// * `max_distance` - Maximum cast distance
    /// * `exclude_entity` - Entity to exclude from the cast (usually self)
    fn trace_physics_bodies(
        world: &mut World,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude_entity: Entity,
    ) -> Option<CollisionData>;

    /// Move the owner's hand anchor to a world position.
    ///
    /// Anything attached to the hand follows it.
    fn move_hand(world: &mut World, owner: Entity, position: Vec3);

    /// Create a rigid link between the owner's hand anchor and `body`.
    ///
    /// `part` selects a sub-part of an articulated body when present.
    fn attach_to_hand(world: &mut World, owner: Entity, body: Entity, part: Option<Entity>);

    /// Break the owner's hand link. Neither side of the link is destroyed.
    fn detach_from_hand(world: &mut World, owner: Entity);

    /// Override how `body` responds to contacts with `channel`.
    fn set_collision_response(
        world: &mut World,
        body: Entity,
        channel: CollisionChannel,
        response: CollisionResponse,
    );

    /// Apply an impulse to `body` at a world-space point.
    ///
    /// `part` selects a sub-part of an articulated body when present.
    fn apply_impulse_at(
        world: &mut World,
        body: Entity,
        impulse: Vec3,
        point: Vec3,
        part: Option<Entity>,
    );
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}

/// Helper struct for building raycasts.
#[derive(Debug, Clone, Copy)]
pub struct RaycastRequest {
    /// Origin point of the ray.
    pub origin: Vec3,
    /// Direction of the ray (normalized).
    pub direction: Vec3,
    /// Maximum distance to cast.
    pub max_distance: f32,
}

impl RaycastRequest {
    /// Create a new raycast request.
    pub fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_distance,
        }
    }

    /// End point of the ray segment.
    pub fn end(&self) -> Vec3 {
        self.origin + self.direction * self.max_distance
    }

    /// Whether the request can hit anything at all.
    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::ZERO || self.max_distance <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raycast_request_normalizes_direction() {
        let request = RaycastRequest::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0), 5.0);
        assert_eq!(request.direction, Vec3::NEG_Z);
        assert_eq!(request.end(), Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn raycast_request_degenerate() {
        assert!(RaycastRequest::new(Vec3::ZERO, Vec3::ZERO, 5.0).is_degenerate());
        assert!(RaycastRequest::new(Vec3::ZERO, Vec3::X, 0.0).is_degenerate());
        assert!(!RaycastRequest::new(Vec3::ZERO, Vec3::X, 1.0).is_degenerate());
    }
}
