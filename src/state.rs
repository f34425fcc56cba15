//! Thrust and grab state, plus state marker components.
//!
//! The marker components mirror the controller's internal state so hosts can
//! drive animation, audio or HUD from plain ECS queries. They are added and
//! removed by [`crate::systems::sync_state_markers`].

use bevy::prelude::*;

/// Jetpack toggle.
///
/// Toggled by press/release input, independent of the movement throttles.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[reflect(Component)]
pub struct ThrustState {
    /// Whether the jetpack is firing.
    pub active: bool,
}

impl ThrustState {
    /// Start thrusting. Returns true if this changed the state.
    pub fn press(&mut self) -> bool {
        !std::mem::replace(&mut self.active, true)
    }

    /// Stop thrusting. Returns true if this changed the state.
    pub fn release(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }
}

/// The physics body currently held by the gravity gun.
///
/// This is a non-owning handle: the body lives in the physics world and the
/// controller never despawns it.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldObject {
    /// The held body.
    pub body: Entity,
    /// The sub-part the hand is linked to, for articulated bodies.
    pub part: Option<Entity>,
}

/// Gravity gun state: at most one held object.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[reflect(Component)]
pub struct GrabState {
    held: Option<HeldObject>,
}

impl GrabState {
    /// The held object, if any.
    pub fn held(&self) -> Option<HeldObject> {
        self.held
    }

    /// Check if an object is held.
    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    /// Record a newly held object, returning the previous one.
    pub(crate) fn hold(&mut self, object: HeldObject) -> Option<HeldObject> {
        self.held.replace(object)
    }

    /// Forget the held object, returning it.
    pub(crate) fn clear(&mut self) -> Option<HeldObject> {
        self.held.take()
    }
}

/// Marker component indicating the character is mid-dash (interpolating).
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Dashing;

/// Marker component indicating the jetpack is firing.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Jetting;

/// Marker component indicating the gravity gun holds an object.
///
/// Contains the held body.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct HoldingObject {
    /// The held body.
    pub body: Entity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thrust_press_and_release_report_changes() {
        let mut thrust = ThrustState::default();
        assert!(thrust.press());
        assert!(!thrust.press());
        assert!(thrust.active);

        assert!(thrust.release());
        assert!(!thrust.release());
        assert!(!thrust.active);
    }

    #[test]
    fn grab_state_holds_one_object() {
        let first = HeldObject {
            body: Entity::from_raw(1),
            part: None,
        };
        let second = HeldObject {
            body: Entity::from_raw(2),
            part: Some(Entity::from_raw(3)),
        };

        let mut grab = GrabState::default();
        assert!(!grab.is_holding());
        assert_eq!(grab.hold(first), None);
        assert_eq!(grab.hold(second), Some(first));
        assert_eq!(grab.held(), Some(second));

        assert_eq!(grab.clear(), Some(second));
        assert!(!grab.is_holding());
        assert_eq!(grab.clear(), None);
    }
}
