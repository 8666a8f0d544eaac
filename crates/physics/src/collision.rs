//! Collision groups: who collides with whom, and what the ground probe can see.

use rapier3d::prelude::*;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Ground, trees, rocks and loaded level geometry.
    Environment = 1 << 0,
    Character = 1 << 1,
}

impl CollisionGroup {
    fn bits(groups: &[CollisionGroup]) -> Group {
        Group::from_bits_retain(groups.iter().fold(0, |acc, g| acc | *g as u32))
    }

    /// Static world geometry: collides with everything.
    pub fn environment() -> (Group, Group) {
        (Self::bits(&[Self::Environment]), Group::ALL)
    }

    pub fn character() -> (Group, Group) {
        (Self::bits(&[Self::Character]), Self::bits(&[Self::Environment]))
    }

    /// Query groups for the downward ground ray. Environment only, so the ray never
    /// reports the character's own capsule.
    pub fn ground_probe() -> (Group, Group) {
        (Self::bits(&[Self::Character]), Self::bits(&[Self::Environment]))
    }

    pub fn interaction((memberships, filter): (Group, Group)) -> InteractionGroups {
        InteractionGroups::new(memberships, filter)
    }
}

/// Handles of a spawned rigid body and its collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub rigid_body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(pair: (Group, Group)) -> InteractionGroups {
        CollisionGroup::interaction(pair)
    }

    #[test]
    fn ground_probe_ignores_character_colliders() {
        let probe = groups(CollisionGroup::ground_probe());
        assert!(!probe.test(groups(CollisionGroup::character())));
        assert!(probe.test(groups(CollisionGroup::environment())));
    }

    #[test]
    fn character_collides_with_environment_only() {
        let character = groups(CollisionGroup::character());
        assert!(character.test(groups(CollisionGroup::environment())));
        assert!(!character.test(groups(CollisionGroup::character())));
    }
}
