//! Trace results and collision-response overrides.
//!
//! These structures carry the results of the gravity gun's world traces and
//! describe how a body should respond to a collision category.

use bevy::prelude::*;

/// Information about a raycast hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionData {
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// Normal of the surface at hit point.
    pub normal: Vec3,
    /// World position of the hit point.
    pub point: Vec3,
    /// The physics body that was hit.
    pub entity: Entity,
    /// The sub-part (collider or articulated link) that was hit, when it is
    /// not the body itself.
    pub part: Option<Entity>,
}

impl CollisionData {
    /// Create a collision result for a body hit directly.
    pub fn new(distance: f32, normal: Vec3, point: Vec3, entity: Entity) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
            part: None,
        }
    }

    /// Builder: record the sub-part that was hit.
    pub fn with_part(mut self, part: Entity) -> Self {
        self.part = (part != self.entity).then_some(part);
        self
    }

    /// Synthesize a hit on a body at a known location.
    ///
    /// Used when launching an object that was held rather than traced.
    pub fn at_body(entity: Entity, part: Option<Entity>, point: Vec3) -> Self {
        Self {
            distance: 0.0,
            normal: Vec3::ZERO,
            point,
            entity,
            part,
        }
    }
}

/// Collision categories the controller overrides responses for.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionChannel {
    /// Player-controlled characters.
    Pawn,
}

/// How a body responds to contacts with a collision category.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionResponse {
    /// Contacts are detected but produce no contact forces.
    Ignore,
    /// Contacts are solved normally.
    #[default]
    Block,
}
