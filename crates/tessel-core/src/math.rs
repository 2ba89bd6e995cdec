//! Math utilities
//!
//! Re-exports from glam and the 2D rectangle used for bodies, hulls and tree nodes.

pub use glam::Vec2;

use serde::{Deserialize, Serialize};

/// Tolerance used by every edge comparison so that a hairline touch between
/// two rectangles never counts as an overlap.
pub const ROUNDING_ERROR: f32 = 0.000_000_1;

/// Axis-aligned rectangle with a top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
}

impl Rect {
    /// The zero rectangle at the origin
    pub const EMPTY: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Create a rectangle from its top-left corner and size
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left corner
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Width and height as a vector
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// A rectangle with no area takes part in no overlap
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if `other` lies entirely inside this rectangle (shared edges allowed)
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    /// Check if a point lies strictly inside the rectangle
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x > self.left()
            && point.x < self.right()
            && point.y > self.top()
            && point.y < self.bottom()
    }

    /// Check if this rectangle overlaps another by more than [`ROUNDING_ERROR`]
    /// on both axes. Degenerate rectangles never overlap anything.
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            return false;
        }
        self.right() - other.left() >= ROUNDING_ERROR
            && other.right() - self.left() >= ROUNDING_ERROR
            && self.bottom() - other.top() >= ROUNDING_ERROR
            && other.bottom() - self.top() >= ROUNDING_ERROR
    }

    /// Move the rectangle by `delta`
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }
}

/// Rotate `point` around `pivot` by `angle` degrees.
///
/// Uses the screen-space convention of a downward y axis: a positive angle
/// turns clockwise on screen.
pub fn rotate_point(point: Vec2, pivot: Vec2, angle: f32) -> Vec2 {
    let radians = -angle.to_radians();
    let (sin, cos) = radians.sin_cos();
    let dx = point.x - pivot.x;
    let dy = pivot.y - point.y;
    Vec2::new(
        pivot.x + cos * dx - sin * dy,
        pivot.y - (sin * dx + cos * dy),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(2.0, 3.0, 10.0, 20.0);
        assert_eq!(rect.left(), 2.0);
        assert_eq!(rect.right(), 12.0);
        assert_eq!(rect.top(), 3.0);
        assert_eq!(rect.bottom(), 23.0);
        assert_eq!(rect.center(), Vec2::new(7.0, 13.0));
    }

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(100.0, 100.0, 10.0, 10.0);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_hairline_touch_is_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);

        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
    }

    #[test]
    fn test_degenerate_never_overlaps() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let flat = Rect::new(2.0, 2.0, 5.0, 0.0);
        let negative = Rect::new(2.0, 2.0, -3.0, 4.0);

        assert!(!a.overlaps(&flat));
        assert!(!flat.overlaps(&a));
        assert!(!a.overlaps(&negative));
    }

    #[test]
    fn test_contains_rect() {
        let outer = Rect::new(0.0, 0.0, 20.0, 20.0);
        assert!(outer.contains_rect(&Rect::new(0.0, 0.0, 20.0, 20.0)));
        assert!(outer.contains_rect(&Rect::new(5.0, 5.0, 2.0, 2.0)));
        assert!(!outer.contains_rect(&Rect::new(15.0, 15.0, 10.0, 2.0)));
    }

    #[test]
    fn test_rotate_point() {
        let rotated = rotate_point(Vec2::new(-10.0, 0.0), Vec2::ZERO, 90.0);
        assert!(rotated.x.abs() < 0.0001);
        assert!((rotated.y + 10.0).abs() < 0.0001);

        let unrotated = rotate_point(Vec2::new(-10.0, 0.0), Vec2::ZERO, 0.0);
        assert!((unrotated.x + 10.0).abs() < 0.0001);
        assert!(unrotated.y.abs() < 0.0001);
    }
}
