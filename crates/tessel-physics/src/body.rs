//! Physics Body
//!
//! Kinematic state of a single entity and its per-frame integration:
//! - Linear motion with acceleration, drag and a velocity cap
//! - Angular motion and asteroids-style thrust
//! - Swept collision hulls, one per axis, rebuilt every frame

use bitflags::bitflags;
use glam::Vec2;
use tessel_core::math::{Rect, rotate_point};

/// Velocity cap given to new bodies; large enough to mean "uncapped"
pub const DEFAULT_MAX_VELOCITY: f32 = 10_000.0;

bitflags! {
    /// Sides of a body that take part in collision resolution
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Sides: u8 {
        const LEFT = 0b0001;
        const RIGHT = 0b0010;
        const TOP = 0b0100;
        const BOTTOM = 0b1000;
    }
}

impl Default for Sides {
    fn default() -> Self {
        Self::all()
    }
}

/// Separating axis used by the narrow phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Component of `v` along this axis
    pub fn of(self, v: Vec2) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    /// Unit vector along this axis scaled by `amount`
    pub fn vector(self, amount: f32) -> Vec2 {
        match self {
            Axis::X => Vec2::new(amount, 0.0),
            Axis::Y => Vec2::new(0.0, amount),
        }
    }
}

/// Advance one velocity component by a single frame.
///
/// Acceleration, when present, always wins and drag is ignored. Without
/// acceleration, drag bleeds speed off toward zero without ever crossing it.
/// The result is capped to `[-max, max]`.
pub fn compute_velocity(velocity: f32, acceleration: f32, drag: f32, max: f32, dt: f32) -> f32 {
    let mut velocity = velocity;
    if acceleration != 0.0 {
        velocity += acceleration * dt;
    } else if drag != 0.0 {
        let decel = drag.abs() * dt;
        if velocity - decel > 0.0 {
            velocity -= decel;
        } else if velocity + decel < 0.0 {
            velocity += decel;
        } else {
            velocity = 0.0;
        }
    }

    let max = max.abs();
    if velocity > max {
        max
    } else if velocity < -max {
        -max
    } else {
        velocity
    }
}

/// Per-entity kinematic state and collision hulls
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsBody {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Deceleration applied only while `acceleration` is zero on that axis
    pub drag: Vec2,
    pub max_velocity: Vec2,

    /// Rotation in degrees; never wrapped
    pub angle: f32,
    pub angular_velocity: f32,
    pub angular_acceleration: f32,
    pub angular_drag: f32,
    pub max_angular: f32,

    pub thrust: f32,
    pub max_thrust: f32,

    pub health: f32,

    /// Global on/off switch; non-existent bodies never collide
    pub exists: bool,
    /// Inactive bodies are skipped by the per-frame update
    pub active: bool,
    pub visible: bool,
    pub solid: bool,
    /// Fixed bodies stay put during collision response
    pub fixed: bool,
    /// Bodies that do not move skip integration entirely
    pub moves: bool,
    pub dead: bool,
    /// Set by a bottom hit during the collision pass, cleared every update
    pub on_floor: bool,
    pub collide: Sides,

    /// Horizontal sweep of this frame's motion
    pub hull_x: Rect,
    /// Vertical sweep of this frame's motion
    pub hull_y: Rect,
    /// Displacement applied by the last integration step
    pub col_vector: Vec2,
}

impl PhysicsBody {
    /// Create a solid, moving body at the given rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        let mut body = Self {
            x,
            y,
            width,
            height,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            drag: Vec2::ZERO,
            max_velocity: Vec2::splat(DEFAULT_MAX_VELOCITY),
            angle: 0.0,
            angular_velocity: 0.0,
            angular_acceleration: 0.0,
            angular_drag: 0.0,
            max_angular: DEFAULT_MAX_VELOCITY,
            thrust: 0.0,
            max_thrust: 0.0,
            health: 1.0,
            exists: true,
            active: true,
            visible: true,
            solid: true,
            fixed: false,
            moves: true,
            dead: false,
            on_floor: false,
            collide: Sides::all(),
            hull_x: Rect::EMPTY,
            hull_y: Rect::EMPTY,
            col_vector: Vec2::ZERO,
        };
        body.refresh_hulls();
        body
    }

    /// Create a static, immovable body such as level geometry
    pub fn fixed(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            fixed: true,
            ..Self::new(x, y, width, height)
        }
    }

    /// Bounding rectangle at the current position
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.x = position.x;
        self.y = position.y;
    }

    /// Rotation in radians
    pub fn radians(&self) -> f32 {
        self.angle.to_radians()
    }

    /// Swept hull for the given axis
    pub fn hull(&self, axis: Axis) -> &Rect {
        match axis {
            Axis::X => &self.hull_x,
            Axis::Y => &self.hull_y,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != Vec2::ZERO
    }

    /// Whether this body takes a velocity suggested by a collision with `contact`.
    ///
    /// Free bodies always do. A fixed body only does when it is itself moving
    /// and hit another fixed body, which lets moving platforms be stopped by
    /// walls while static geometry never gets nudged.
    pub fn accepts_velocity_from(&self, contact: &PhysicsBody) -> bool {
        !self.fixed || (contact.fixed && self.is_moving())
    }

    /// Reset both hulls to the current bounding rectangle
    pub fn refresh_hulls(&mut self) {
        let rect = self.rect();
        self.hull_x = rect;
        self.hull_y = rect;
    }

    /// Integrate one frame of motion and widen the hulls over the path taken
    pub fn update_motion(&mut self, dt: f32) {
        if !self.moves {
            return;
        }

        if self.solid {
            self.refresh_hulls();
        }
        self.on_floor = false;

        self.angular_velocity = compute_velocity(
            self.angular_velocity,
            self.angular_acceleration,
            self.angular_drag,
            self.max_angular,
            dt,
        );
        self.angle += self.angular_velocity * dt;

        let thrust = if self.thrust != 0.0 {
            let max_components =
                rotate_point(Vec2::new(-self.max_thrust, 0.0), Vec2::ZERO, self.angle);
            let max = max_components.x.abs().max(max_components.y.abs());
            self.max_velocity = Vec2::splat(max);
            rotate_point(Vec2::new(-self.thrust, 0.0), Vec2::ZERO, self.angle)
        } else {
            Vec2::ZERO
        };

        self.velocity.x = compute_velocity(
            self.velocity.x,
            self.acceleration.x + thrust.x,
            self.drag.x,
            self.max_velocity.x,
            dt,
        );
        self.velocity.y = compute_velocity(
            self.velocity.y,
            self.acceleration.y + thrust.y,
            self.drag.y,
            self.max_velocity.y,
            dt,
        );

        self.x += self.velocity.x * dt;
        self.y += self.velocity.y * dt;

        if !self.solid {
            return;
        }

        self.col_vector = self.velocity * dt;
        let delta = self.col_vector;

        self.hull_x.width += delta.x.abs();
        if delta.x < 0.0 {
            self.hull_x.x += delta.x;
        }

        self.hull_y.x = self.x;
        self.hull_y.height += delta.y.abs();
        if delta.y < 0.0 {
            self.hull_y.y += delta.y;
        }
    }

    /// Move the body and both hulls along one axis
    pub fn shift(&mut self, axis: Axis, amount: f32) {
        let delta = axis.vector(amount);
        self.x += delta.x;
        self.y += delta.y;
        self.hull_x.translate(delta);
        self.hull_y.translate(delta);
    }

    /// Apply a suggested horizontal velocity unless fixed-body rules forbid it
    pub fn suggest_velocity_x(&mut self, contact: &PhysicsBody, velocity: f32) {
        if self.accepts_velocity_from(contact) {
            self.velocity.x = velocity;
        }
    }

    /// Apply a suggested vertical velocity unless fixed-body rules forbid it
    pub fn suggest_velocity_y(&mut self, contact: &PhysicsBody, velocity: f32) {
        if self.accepts_velocity_from(contact) {
            self.velocity.y = velocity;
        }
    }

    /// Check if the bounding rectangles of two bodies overlap
    pub fn overlaps(&self, other: &PhysicsBody) -> bool {
        self.rect().overlaps(&other.rect())
    }

    /// Check if a world-space point lies inside this body
    pub fn overlaps_point(&self, point: Vec2) -> bool {
        self.rect().contains_point(point)
    }

    /// Remove the body from play without destroying it
    pub fn kill(&mut self) {
        self.exists = false;
        self.dead = true;
    }

    /// Bring a killed body back at a new position
    pub fn reset(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.exists = true;
        self.dead = false;
        self.refresh_hulls();
    }

    /// Take damage, or heal with a negative amount. Kills at zero health.
    pub fn hurt(&mut self, damage: f32) {
        self.health -= damage;
        if self.health <= 0.0 {
            self.kill();
        }
    }
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}
