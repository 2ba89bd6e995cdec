//! Collision dispatch
//!
//! [`CollisionSpace`] owns the world configuration and the quadtree reused
//! between passes. A pass loads one or two bodies (usually containers) into
//! the tree and walks the candidate pairs, either handing them to a callback
//! or separating them with [`solve_axis`] and the bodies' hit handlers.

use tessel_core::{Rect, WorldConfig};

use crate::body::{Axis, Sides};
use crate::quadtree::{ListTag, OverlapCallback, QuadTree};
use crate::set::{BodyHandle, BodySet};
use crate::PhysicsResult;

/// World-level collision state owned by the level manager
#[derive(Debug, Clone)]
pub struct CollisionSpace {
    config: WorldConfig,
    tree: QuadTree,
    dirty: bool,
}

impl CollisionSpace {
    /// Create a collision space over a validated configuration
    pub fn new(config: WorldConfig) -> PhysicsResult<Self> {
        config.validate()?;
        Ok(Self {
            tree: QuadTree::new(&config),
            config,
            dirty: false,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Tree built by the most recent pass
    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    /// Change the world bounds and granularity; the tree is rebuilt on the next pass
    pub fn set_world_bounds(&mut self, bounds: Rect, divisions: u32) -> PhysicsResult<()> {
        self.config = WorldConfig::new(bounds, divisions)?;
        self.invalidate();
        log::debug!("World bounds set to {bounds:?} with {divisions} divisions");
        Ok(())
    }

    /// Force the tree to be rebuilt from scratch on the next pass
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    fn begin_pass(&mut self) {
        if self.dirty {
            self.tree = QuadTree::new(&self.config);
            self.dirty = false;
        } else {
            self.tree.reset(&self.config);
        }
    }

    /// Load `first` into the A list and, when different, `second` into the B list.
    /// Returns whether the pass compares two lists.
    fn load(&mut self, bodies: &BodySet, first: BodyHandle, second: BodyHandle) -> bool {
        self.begin_pass();
        self.tree.add(bodies, first, ListTag::A);
        if first == second {
            return false;
        }
        self.tree.add(bodies, second, ListTag::B);
        true
    }

    /// Report overlaps between two bodies or containers.
    ///
    /// Pass the same handle twice to test a container against itself. Without
    /// a callback every overlapping pair is killed.
    pub fn overlap(
        &mut self,
        bodies: &mut BodySet,
        first: BodyHandle,
        second: BodyHandle,
        callback: Option<&mut OverlapCallback<'_>>,
    ) -> bool {
        if !exists(bodies, first) || !exists(bodies, second) {
            return false;
        }
        let _span = tracing::debug_span!("overlap_pass").entered();

        let both_lists = self.load(bodies, first, second);
        let hit = self.tree.overlap(bodies, both_lists, callback);
        tracing::debug!(
            target: "collision",
            nodes = self.tree.node_count(),
            hit,
            "Overlap pass completed"
        );
        hit
    }

    /// Separate overlapping bodies and notify their hit handlers.
    ///
    /// Resolves the horizontal axis first, then the vertical one, over the
    /// same tree. Pass the same handle twice to collide a container with itself.
    pub fn collide(&mut self, bodies: &mut BodySet, first: BodyHandle, second: BodyHandle) -> bool {
        if !exists(bodies, first) || !exists(bodies, second) {
            return false;
        }
        let _span = tracing::debug_span!("collide_pass").entered();

        let both_lists = self.load(bodies, first, second);
        let mut solve_x =
            |set: &mut BodySet, a: BodyHandle, b: BodyHandle| solve_axis(set, a, b, Axis::X);
        let hit_x = self.tree.overlap(bodies, both_lists, Some(&mut solve_x));
        let mut solve_y =
            |set: &mut BodySet, a: BodyHandle, b: BodyHandle| solve_axis(set, a, b, Axis::Y);
        let hit_y = self.tree.overlap(bodies, both_lists, Some(&mut solve_y));

        tracing::debug!(
            target: "collision",
            nodes = self.tree.node_count(),
            hit_x,
            hit_y,
            "Collide pass completed"
        );
        hit_x || hit_y
    }
}

impl Default for CollisionSpace {
    fn default() -> Self {
        let config = WorldConfig::default();
        Self {
            tree: QuadTree::new(&config),
            config,
            dirty: false,
        }
    }
}

fn exists(bodies: &BodySet, handle: BodyHandle) -> bool {
    bodies.physics(handle).is_some_and(|physics| physics.exists)
}

/// Separate two bodies along one axis and call their hit handlers.
///
/// The body moving faster in the positive direction strikes with its far
/// side (right or bottom). Penetration is measured on the axis hulls. Free
/// bodies split the correction; a free body against a fixed one takes all of
/// it and inherits the fixed body's velocity. A fixed body only counts as
/// free when it meets another fixed body while moving. Returns whether the
/// pair was resolved.
pub fn solve_axis(bodies: &mut BodySet, first: BodyHandle, second: BodyHandle, axis: Axis) -> bool {
    let Some((one, two)) = bodies.get2_mut(first, second) else {
        return false;
    };

    let d1 = axis.of(one.physics.col_vector);
    let d2 = axis.of(two.physics.col_vector);
    if d1 == d2 {
        return false;
    }
    if !one.physics.hull(axis).overlaps(two.physics.hull(axis)) {
        return false;
    }

    one.pre_collide(&two.physics);
    two.pre_collide(&one.physics);

    let positive = d1 > d2;
    let (near, far) = match axis {
        Axis::X => (Sides::LEFT, Sides::RIGHT),
        Axis::Y => (Sides::TOP, Sides::BOTTOM),
    };
    let enabled = if positive {
        one.physics.collide.contains(far) && two.physics.collide.contains(near)
    } else {
        one.physics.collide.contains(near) && two.physics.collide.contains(far)
    };
    if !enabled {
        return false;
    }

    let (h1, h2) = (*one.physics.hull(axis), *two.physics.hull(axis));
    let penetration = match (axis, positive) {
        (Axis::X, true) => h1.right() - h2.left(),
        (Axis::X, false) => h1.left() - h2.right(),
        (Axis::Y, true) => h1.bottom() - h2.top(),
        (Axis::Y, false) => h1.top() - h2.bottom(),
    };
    if penetration == 0.0 {
        return false;
    }

    let mut fixed1 = one.physics.fixed;
    let mut fixed2 = two.physics.fixed;
    if fixed1 && fixed2 {
        fixed1 = d1 == 0.0;
        fixed2 = d2 == 0.0;
    }

    let v1 = axis.of(one.physics.velocity);
    let v2 = axis.of(two.physics.velocity);
    let (shift1, shift2, suggested1, suggested2) = match (fixed1, fixed2) {
        (false, false) => (-penetration / 2.0, penetration / 2.0, v2, v1),
        (false, true) => (-penetration, 0.0, v2, v2),
        (true, false) => (0.0, penetration, v1, v1),
        (true, true) => (0.0, 0.0, v1, v2),
    };
    one.physics.shift(axis, shift1);
    two.physics.shift(axis, shift2);

    match (axis, positive) {
        (Axis::X, true) => {
            one.hit_right(&two.physics, suggested1);
            two.hit_left(&one.physics, suggested2);
        }
        (Axis::X, false) => {
            one.hit_left(&two.physics, suggested1);
            two.hit_right(&one.physics, suggested2);
        }
        (Axis::Y, true) => {
            one.hit_bottom(&two.physics, suggested1);
            two.hit_top(&one.physics, suggested2);
        }
        (Axis::Y, false) => {
            one.hit_top(&two.physics, suggested1);
            two.hit_bottom(&one.physics, suggested2);
        }
    }
    true
}
