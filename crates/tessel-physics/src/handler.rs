//! Directional hit handlers
//!
//! When the narrow phase resolves a pair it tells each body which of its sides
//! was struck and what velocity it suggests along that axis. Handlers decide
//! what to do with the suggestion; the defaults clamp, [`Bounce`] reflects.

use std::fmt;

use crate::body::PhysicsBody;

/// Per-body collision response.
///
/// Every method receives the body being hit and a read-only view of the body
/// it ran into. Override only the sides that need custom behavior.
pub trait HitHandler: fmt::Debug {
    /// Called on both bodies of a pair before any response is computed
    fn pre_collide(&self, _this: &mut PhysicsBody, _other: &PhysicsBody) {}

    /// This body's left side struck `contact`'s right side
    fn hit_left(&self, this: &mut PhysicsBody, contact: &PhysicsBody, velocity: f32) {
        self.hit_side(this, contact, velocity);
    }

    /// This body's right side struck `contact`'s left side
    fn hit_right(&self, this: &mut PhysicsBody, contact: &PhysicsBody, velocity: f32) {
        self.hit_side(this, contact, velocity);
    }

    /// Shared behavior for both horizontal sides
    fn hit_side(&self, this: &mut PhysicsBody, contact: &PhysicsBody, velocity: f32) {
        this.suggest_velocity_x(contact, velocity);
    }

    /// This body's top struck `contact`'s bottom
    fn hit_top(&self, this: &mut PhysicsBody, contact: &PhysicsBody, velocity: f32) {
        this.suggest_velocity_y(contact, velocity);
    }

    /// This body's bottom landed on `contact`'s top
    fn hit_bottom(&self, this: &mut PhysicsBody, contact: &PhysicsBody, velocity: f32) {
        this.on_floor = true;
        this.suggest_velocity_y(contact, velocity);
    }
}

/// Default response: take the suggested velocity
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Solid;

impl HitHandler for Solid {}

/// Particle-style response that reflects velocity scaled by `factor`.
///
/// Landings softer than `factor * 100` settle instead of bouncing forever.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounce {
    pub factor: f32,
}

impl Bounce {
    pub fn new(factor: f32) -> Self {
        Self { factor }
    }
}

impl HitHandler for Bounce {
    fn hit_side(&self, this: &mut PhysicsBody, _contact: &PhysicsBody, _velocity: f32) {
        this.velocity.x = -this.velocity.x * self.factor;
        if this.angular_velocity != 0.0 {
            this.angular_velocity = -this.angular_velocity * self.factor;
        }
    }

    fn hit_bottom(&self, this: &mut PhysicsBody, contact: &PhysicsBody, velocity: f32) {
        this.on_floor = true;
        if this.velocity.y.abs() > self.factor * 100.0 {
            this.velocity.y = -this.velocity.y * self.factor;
            if this.angular_velocity != 0.0 {
                this.angular_velocity *= -self.factor;
            }
        } else {
            this.angular_velocity = 0.0;
            this.suggest_velocity_y(contact, velocity);
        }
        this.velocity.x *= self.factor;
    }
}
