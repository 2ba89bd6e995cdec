//! # Tessel Physics
//!
//! Arcade-style 2D collision for tile and sprite games.
//!
//! ## Features
//! - Per-frame body integration with drag, velocity caps, angular motion and thrust
//! - Swept collision hulls so fast bodies do not tunnel through thin geometry
//! - Quadtree broad phase rebuilt for every pass, comparing one list against another or itself
//! - Axis-separated narrow phase with fixed bodies and per-side collision flags
//! - Directional hit handlers for custom responses such as bouncing particles

pub mod body;
pub mod collision;
pub mod handler;
pub mod quadtree;
pub mod set;

use tessel_core::ConfigError;
use thiserror::Error;

pub use body::{Axis, DEFAULT_MAX_VELOCITY, PhysicsBody, Sides, compute_velocity};
pub use collision::{CollisionSpace, solve_axis};
pub use handler::{Bounce, HitHandler, Solid};
pub use quadtree::{ListTag, NodeView, OverlapCallback, QuadTree};
pub use set::{Body, BodyHandle, BodyKind, BodySet, Members};

/// Physics errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("Stale body handle: {0:?}")]
    StaleHandle(BodyHandle),

    #[error("Body is not a container: {0:?}")]
    NotAContainer(BodyHandle),

    #[error("Adding {member:?} to {group:?} would make a container contain itself")]
    CyclicMembership { group: BodyHandle, member: BodyHandle },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for physics operations
pub type PhysicsResult<T> = Result<T, PhysicsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::Rect;

    #[test]
    fn test_error_messages() {
        let mut bodies = BodySet::new();
        let leaf = bodies.insert(PhysicsBody::default());

        let err = bodies.members(leaf).unwrap_err();
        assert!(err.to_string().starts_with("Body is not a container"));

        let err: PhysicsError = ConfigError::ZeroDivisions.into();
        assert_eq!(err.to_string(), "quadtree divisions must be at least 1");
    }

    #[test]
    fn test_space_rejects_bad_config() {
        let config = tessel_core::WorldConfig {
            bounds: Rect::new(0.0, 0.0, -1.0, 10.0),
            divisions: 3,
        };
        assert!(matches!(
            CollisionSpace::new(config),
            Err(PhysicsError::Config(ConfigError::InvalidBounds { .. }))
        ));
    }
}
