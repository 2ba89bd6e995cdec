//! Quadtree broad phase
//!
//! A quadtree of axis-aligned regions built fresh for every collision pass.
//! Each node keeps two independent lists of bodies, A and B, so a pass can
//! compare A against B or A against itself.
//!
//! Membership is replicated downwards: a body recorded at a node is also
//! recorded in every child of that node, including children created later.
//! A query at any depth therefore sees every body whose bounds reach it
//! without walking back up the tree.

use smallvec::SmallVec;
use tessel_core::{Rect, WorldConfig};

use crate::set::{BodyHandle, BodySet};

/// Which of the two node lists a body goes into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListTag {
    A,
    B,
}

impl ListTag {
    fn index(self) -> usize {
        match self {
            ListTag::A => 0,
            ListTag::B => 1,
        }
    }
}

/// Child quadrants; the discriminant is the slot in [`Node::children`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthEast = 2,
    SouthWest = 3,
}

/// Callback deciding whether an overlapping pair is a real collision
pub type OverlapCallback<'a> = dyn FnMut(&mut BodySet, BodyHandle, BodyHandle) -> bool + 'a;

type NodeId = usize;
type BodyList = SmallVec<[BodyHandle; 4]>;

const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
struct Node {
    bounds: Rect,
    can_subdivide: bool,
    children: [Option<NodeId>; 4],
    lists: [BodyList; 2],
}

impl Node {
    fn new(bounds: Rect, min_size: f32) -> Self {
        Self {
            bounds,
            can_subdivide: bounds.width > min_size || bounds.height > min_size,
            children: [None; 4],
            lists: [BodyList::new(), BodyList::new()],
        }
    }

    fn existing_children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().flatten().copied()
    }
}

/// Read-only view of one node, for inspection and invariant checks
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    pub bounds: Rect,
    pub can_subdivide: bool,
    pub list_a: &'a [BodyHandle],
    pub list_b: &'a [BodyHandle],
}

impl NodeView<'_> {
    pub fn list(&self, tag: ListTag) -> &[BodyHandle] {
        match tag {
            ListTag::A => self.list_a,
            ListTag::B => self.list_b,
        }
    }
}

/// Arena-backed quadtree over the world bounds
#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<Node>,
    min_size: f32,
}

impl QuadTree {
    /// Build an empty tree covering `config.bounds`
    pub fn new(config: &WorldConfig) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            min_size: 0.0,
        };
        tree.reset(config);
        tree
    }

    /// Drop every node and start over with a bare root, keeping the allocation
    pub fn reset(&mut self, config: &WorldConfig) {
        self.min_size = config.min_size();
        self.nodes.clear();
        self.nodes.push(Node::new(config.bounds, self.min_size));
        log::trace!(
            "Quadtree reset over {:?}, min node size {}",
            config.bounds,
            self.min_size
        );
    }

    /// Bounds of the root node
    pub fn bounds(&self) -> Rect {
        self.nodes[ROOT].bounds
    }

    /// Smallest extent that may still be subdivided
    pub fn min_size(&self) -> f32 {
        self.min_size
    }

    /// Number of nodes created so far
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Inspect every node
    pub fn nodes(&self) -> impl Iterator<Item = NodeView<'_>> {
        self.nodes.iter().map(|node| NodeView {
            bounds: node.bounds,
            can_subdivide: node.can_subdivide,
            list_a: &node.lists[0],
            list_b: &node.lists[1],
        })
    }

    /// Whether `handle` is recorded in any node's `tag` list
    pub fn contains(&self, handle: BodyHandle, tag: ListTag) -> bool {
        self.nodes
            .iter()
            .any(|node| node.lists[tag.index()].contains(&handle))
    }

    /// Add a body to the tree under `tag`.
    ///
    /// Containers are flattened into their existing, solid descendants; the
    /// container itself is added only when it is solid too. Non-solid leaves
    /// and bodies outside the root bounds are skipped. Returns the number of
    /// bodies placed.
    pub fn add(&mut self, bodies: &BodySet, handle: BodyHandle, tag: ListTag) -> usize {
        let mut insertable = Vec::new();
        if !bodies.collect_insertable(handle, &mut insertable) {
            log::warn!("Cannot add {handle:?} to the quadtree: the body is no longer in its set");
            return 0;
        }

        let root = self.bounds();
        let mut placed = 0;
        for &body in &insertable {
            let Some(rect) = bodies.physics(body).map(|physics| physics.rect()) else {
                continue;
            };
            if !rect.overlaps(&root) {
                log::trace!("Skipping {body:?}: {rect:?} lies outside the world bounds");
                continue;
            }
            self.place(ROOT, body, &rect, tag);
            placed += 1;
        }
        placed
    }

    fn place(&mut self, node: NodeId, handle: BodyHandle, rect: &Rect, tag: ListTag) {
        let Node {
            bounds,
            can_subdivide,
            ..
        } = self.nodes[node];

        if !can_subdivide || rect.contains_rect(&bounds) {
            self.add_to_list(node, handle, tag);
            return;
        }

        let mid_x = bounds.x + bounds.width / 2.0;
        let mid_y = bounds.y + bounds.height / 2.0;

        // Wholly inside a single quadrant: descend into that one only
        if rect.left() > bounds.left() && rect.right() < mid_x {
            if rect.top() > bounds.top() && rect.bottom() < mid_y {
                let child = self.child(node, Quadrant::NorthWest);
                self.place(child, handle, rect, tag);
                return;
            }
            if rect.top() > mid_y && rect.bottom() < bounds.bottom() {
                let child = self.child(node, Quadrant::SouthWest);
                self.place(child, handle, rect, tag);
                return;
            }
        }
        if rect.left() > mid_x && rect.right() < bounds.right() {
            if rect.top() > bounds.top() && rect.bottom() < mid_y {
                let child = self.child(node, Quadrant::NorthEast);
                self.place(child, handle, rect, tag);
                return;
            }
            if rect.top() > mid_y && rect.bottom() < bounds.bottom() {
                let child = self.child(node, Quadrant::SouthEast);
                self.place(child, handle, rect, tag);
                return;
            }
        }

        // Straddles a midline: go into every quadrant it touches
        let west = rect.right() > bounds.left() && rect.left() < mid_x;
        let east = rect.right() > mid_x && rect.left() < bounds.right();
        let north = rect.bottom() > bounds.top() && rect.top() < mid_y;
        let south = rect.bottom() > mid_y && rect.top() < bounds.bottom();

        for (quadrant, touches) in [
            (Quadrant::NorthWest, west && north),
            (Quadrant::NorthEast, east && north),
            (Quadrant::SouthEast, east && south),
            (Quadrant::SouthWest, west && south),
        ] {
            if touches {
                let child = self.child(node, quadrant);
                self.place(child, handle, rect, tag);
            }
        }
    }

    /// Get or lazily create a child. A new child starts with a copy of
    /// everything already recorded at its parent.
    fn child(&mut self, parent: NodeId, quadrant: Quadrant) -> NodeId {
        if let Some(existing) = self.nodes[parent].children[quadrant as usize] {
            return existing;
        }

        let bounds = self.nodes[parent].bounds;
        let half_width = bounds.width / 2.0;
        let half_height = bounds.height / 2.0;
        let (x, y) = match quadrant {
            Quadrant::NorthWest => (bounds.x, bounds.y),
            Quadrant::NorthEast => (bounds.x + half_width, bounds.y),
            Quadrant::SouthEast => (bounds.x + half_width, bounds.y + half_height),
            Quadrant::SouthWest => (bounds.x, bounds.y + half_height),
        };

        let mut node = Node::new(Rect::new(x, y, half_width, half_height), self.min_size);
        node.lists = self.nodes[parent].lists.clone();

        let id = self.nodes.len();
        self.nodes.push(node);
        self.nodes[parent].children[quadrant as usize] = Some(id);
        id
    }

    /// Record a body at `node` and at every child already created below it
    fn add_to_list(&mut self, node: NodeId, handle: BodyHandle, tag: ListTag) {
        self.nodes[node].lists[tag.index()].push(handle);
        if !self.nodes[node].can_subdivide {
            return;
        }
        let children = self.nodes[node].children;
        for child in children.into_iter().flatten() {
            self.add_to_list(child, handle, tag);
        }
    }

    /// Test the bodies in the tree against each other.
    ///
    /// With `both_lists` every A body is compared with every B body it shares
    /// a region with; otherwise the A list is compared with itself, each pair
    /// once per node. Overlapping pairs go to `callback`, whose return value
    /// says whether the pair counts. Without a callback both bodies are
    /// killed. Returns whether any pair counted anywhere in the tree.
    pub fn overlap(
        &self,
        bodies: &mut BodySet,
        both_lists: bool,
        mut callback: Option<&mut OverlapCallback<'_>>,
    ) -> bool {
        self.overlap_node(ROOT, bodies, both_lists, &mut callback)
    }

    fn overlap_node(
        &self,
        node_id: NodeId,
        bodies: &mut BodySet,
        both_lists: bool,
        callback: &mut Option<&mut OverlapCallback<'_>>,
    ) -> bool {
        let node = &self.nodes[node_id];
        let mut hit = false;

        if both_lists {
            for &a in &node.lists[0] {
                if !bodies.is_collidable(a) {
                    continue;
                }
                if test_against(a, &node.lists[1], bodies, callback) {
                    hit = true;
                }
                for child in node.existing_children() {
                    if test_against(a, &self.nodes[child].lists[1], bodies, callback) {
                        hit = true;
                    }
                }
            }
            for &b in &node.lists[1] {
                if !bodies.is_collidable(b) {
                    continue;
                }
                for child in node.existing_children() {
                    if test_against(b, &self.nodes[child].lists[0], bodies, callback) {
                        hit = true;
                    }
                }
            }
        } else {
            let list = &node.lists[0];
            for (position, &a) in list.iter().enumerate() {
                if !bodies.is_collidable(a) {
                    continue;
                }
                if test_against(a, &list[position + 1..], bodies, callback) {
                    hit = true;
                }
            }
        }

        for child in node.existing_children() {
            if self.overlap_node(child, bodies, both_lists, callback) {
                hit = true;
            }
        }
        hit
    }
}

/// Compare one body against a list of candidates
fn test_against(
    subject: BodyHandle,
    candidates: &[BodyHandle],
    bodies: &mut BodySet,
    callback: &mut Option<&mut OverlapCallback<'_>>,
) -> bool {
    let mut hit = false;
    for &candidate in candidates {
        if !pair_overlaps(bodies, subject, candidate) {
            continue;
        }
        match callback {
            None => {
                bodies.kill(subject);
                bodies.kill(candidate);
                hit = true;
            }
            Some(callback) => {
                if callback(bodies, subject, candidate) {
                    hit = true;
                }
            }
        }
    }
    hit
}

/// Whether two distinct, existing, solid bodies overlap right now
fn pair_overlaps(bodies: &BodySet, a: BodyHandle, b: BodyHandle) -> bool {
    if a == b {
        return false;
    }
    match (bodies.physics(a), bodies.physics(b)) {
        (Some(first), Some(second)) => {
            first.exists && first.solid && second.exists && second.solid && first.overlaps(second)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::PhysicsBody;

    fn config(size: f32, divisions: u32) -> WorldConfig {
        WorldConfig::new(Rect::new(0.0, 0.0, size, size), divisions).unwrap()
    }

    #[test]
    fn test_new_tree_has_root_only() {
        let tree = QuadTree::new(&config(20.0, 3));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.bounds(), Rect::new(0.0, 0.0, 20.0, 20.0));
        assert!(tree.nodes().next().unwrap().can_subdivide);
    }

    #[test]
    fn test_small_body_descends_to_leaf() {
        let mut bodies = BodySet::new();
        let body = bodies.insert(PhysicsBody::new(1.0, 1.0, 2.0, 2.0));
        let mut tree = QuadTree::new(&config(20.0, 3));

        assert_eq!(tree.add(&bodies, body, ListTag::A), 1);

        // Root -> NW (10x10) -> NW (5x5, leaf)
        assert_eq!(tree.node_count(), 3);
        let holders: Vec<Rect> = tree
            .nodes()
            .filter(|node| node.list_a.contains(&body))
            .map(|node| node.bounds)
            .collect();
        assert_eq!(holders, vec![Rect::new(0.0, 0.0, 5.0, 5.0)]);
    }

    #[test]
    fn test_body_covering_node_stays_there() {
        let mut bodies = BodySet::new();
        let body = bodies.insert(PhysicsBody::new(-5.0, -5.0, 40.0, 40.0));
        let mut tree = QuadTree::new(&config(20.0, 3));

        tree.add(&bodies, body, ListTag::B);
        assert_eq!(tree.node_count(), 1);
        assert!(tree.contains(body, ListTag::B));
        assert!(!tree.contains(body, ListTag::A));
    }

    #[test]
    fn test_straddling_body_goes_into_each_quadrant() {
        let mut bodies = BodySet::new();
        let body = bodies.insert(PhysicsBody::new(8.0, 8.0, 4.0, 4.0));
        let mut tree = QuadTree::new(&config(20.0, 3));

        tree.add(&bodies, body, ListTag::A);

        // One leaf under each first-level quadrant, none of the parents hold it
        let holders: Vec<Rect> = tree
            .nodes()
            .filter(|node| node.list_a.contains(&body))
            .map(|node| node.bounds)
            .collect();
        assert_eq!(holders.len(), 4);
        assert!(holders.iter().all(|bounds| bounds.width == 5.0));
        assert!(holders.contains(&Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert!(holders.contains(&Rect::new(10.0, 10.0, 5.0, 5.0)));
    }

    #[test]
    fn test_new_child_inherits_parent_lists() {
        let mut bodies = BodySet::new();
        let big = bodies.insert(PhysicsBody::new(0.0, 0.0, 10.0, 10.0));
        let small = bodies.insert(PhysicsBody::new(1.0, 1.0, 2.0, 2.0));
        let mut tree = QuadTree::new(&config(20.0, 3));

        tree.add(&bodies, big, ListTag::A);
        tree.add(&bodies, small, ListTag::B);

        let leaf = tree
            .nodes()
            .find(|node| node.bounds == Rect::new(0.0, 0.0, 5.0, 5.0))
            .unwrap();
        assert_eq!(leaf.list_a, &[big]);
        assert_eq!(leaf.list_b, &[small]);
    }

    #[test]
    fn test_insertion_propagates_to_existing_children() {
        let mut bodies = BodySet::new();
        let small = bodies.insert(PhysicsBody::new(1.0, 1.0, 2.0, 2.0));
        let big = bodies.insert(PhysicsBody::new(0.0, 0.0, 10.0, 10.0));
        let mut tree = QuadTree::new(&config(20.0, 3));

        tree.add(&bodies, small, ListTag::A);
        tree.add(&bodies, big, ListTag::A);

        let leaf = tree
            .nodes()
            .find(|node| node.bounds == Rect::new(0.0, 0.0, 5.0, 5.0))
            .unwrap();
        assert_eq!(leaf.list_a, &[small, big]);
    }

    #[test]
    fn test_body_outside_undivided_root_is_skipped() {
        let mut bodies = BodySet::new();
        let far = bodies.insert(PhysicsBody::new(1000.0, 1000.0, 10.0, 10.0));
        let near = bodies.insert(PhysicsBody::new(15.0, 15.0, 10.0, 10.0));
        let mut tree = QuadTree::new(&config(20.0, 1));
        assert!(!tree.nodes().next().unwrap().can_subdivide);

        assert_eq!(tree.add(&bodies, far, ListTag::A), 0);
        assert_eq!(tree.add(&bodies, near, ListTag::A), 1);
        assert!(!tree.contains(far, ListTag::A));
        assert!(tree.contains(near, ListTag::A));
    }

    #[test]
    fn test_stale_handle_is_skipped() {
        let mut bodies = BodySet::new();
        let body = bodies.insert(PhysicsBody::new(1.0, 1.0, 2.0, 2.0));
        bodies.remove(body);
        let mut tree = QuadTree::new(&config(20.0, 3));

        assert_eq!(tree.add(&bodies, body, ListTag::A), 0);
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_empty_tree_has_no_overlap() {
        let mut bodies = BodySet::new();
        let tree = QuadTree::new(&config(20.0, 3));
        assert!(!tree.overlap(&mut bodies, false, None));
        assert!(!tree.overlap(&mut bodies, true, None));
    }

    #[test]
    fn test_callback_decides_result() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(PhysicsBody::new(0.0, 0.0, 10.0, 10.0));
        let b = bodies.insert(PhysicsBody::new(5.0, 5.0, 10.0, 10.0));
        let mut tree = QuadTree::new(&config(20.0, 3));
        tree.add(&bodies, a, ListTag::A);
        tree.add(&bodies, b, ListTag::B);

        let mut pairs = Vec::new();
        let mut record = |_: &mut BodySet, first: BodyHandle, second: BodyHandle| {
            pairs.push((first, second));
            false
        };
        assert!(!tree.overlap(&mut bodies, true, Some(&mut record)));
        assert!(!pairs.is_empty());
        assert!(pairs.iter().all(|&pair| pair == (a, b) || pair == (b, a)));

        // Bodies are untouched when the callback handles the pair
        assert!(bodies.is_collidable(a) && bodies.is_collidable(b));

        let mut accept = |_: &mut BodySet, _: BodyHandle, _: BodyHandle| true;
        assert!(tree.overlap(&mut bodies, true, Some(&mut accept)));
    }

    #[test]
    fn test_a_list_is_not_compared_with_itself_in_dual_mode() {
        let mut bodies = BodySet::new();
        let a = bodies.insert(PhysicsBody::new(0.0, 0.0, 10.0, 10.0));
        let b = bodies.insert(PhysicsBody::new(5.0, 5.0, 10.0, 10.0));
        let mut tree = QuadTree::new(&config(20.0, 3));
        tree.add(&bodies, a, ListTag::A);
        tree.add(&bodies, b, ListTag::A);

        assert!(!tree.overlap(&mut bodies, true, None));
        assert!(bodies.is_collidable(a) && bodies.is_collidable(b));
    }
}
