//! Body storage
//!
//! All bodies live in a [`BodySet`] arena and are referred to by generational
//! [`BodyHandle`]s. A body is either a leaf or a container grouping other
//! bodies; containers are flattened when they are handed to the quadtree.

use smallvec::SmallVec;

use crate::body::PhysicsBody;
use crate::handler::{HitHandler, Solid};
use crate::{PhysicsError, PhysicsResult};

/// Body identifier with generation counter for stable references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    /// Get the slot index
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Get the generation
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Member list of a container
pub type Members = SmallVec<[BodyHandle; 8]>;

/// Leaf or container
#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind {
    Leaf,
    Container { members: Members },
}

/// A stored body: kinematic state, kind and collision response
#[derive(Debug)]
pub struct Body {
    pub physics: PhysicsBody,
    kind: BodyKind,
    handler: Box<dyn HitHandler>,
}

impl Body {
    pub fn kind(&self) -> &BodyKind {
        &self.kind
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, BodyKind::Container { .. })
    }

    /// Members of a container; empty for leaves
    pub fn members(&self) -> &[BodyHandle] {
        match &self.kind {
            BodyKind::Leaf => &[],
            BodyKind::Container { members } => members,
        }
    }

    /// Replace the collision response
    pub fn set_handler(&mut self, handler: impl HitHandler + 'static) {
        self.handler = Box::new(handler);
    }

    pub fn pre_collide(&mut self, other: &PhysicsBody) {
        self.handler.pre_collide(&mut self.physics, other);
    }

    pub fn hit_left(&mut self, contact: &PhysicsBody, velocity: f32) {
        self.handler.hit_left(&mut self.physics, contact, velocity);
    }

    pub fn hit_right(&mut self, contact: &PhysicsBody, velocity: f32) {
        self.handler.hit_right(&mut self.physics, contact, velocity);
    }

    pub fn hit_top(&mut self, contact: &PhysicsBody, velocity: f32) {
        self.handler.hit_top(&mut self.physics, contact, velocity);
    }

    pub fn hit_bottom(&mut self, contact: &PhysicsBody, velocity: f32) {
        self.handler.hit_bottom(&mut self.physics, contact, velocity);
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Arena of bodies
#[derive(Debug, Default)]
pub struct BodySet {
    slots: Vec<Slot>,
    free_indices: Vec<u32>,
    len: usize,
}

impl BodySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a leaf body with the default response
    pub fn insert(&mut self, physics: PhysicsBody) -> BodyHandle {
        self.insert_with_handler(physics, Solid)
    }

    /// Insert a leaf body with a custom response
    pub fn insert_with_handler(
        &mut self,
        physics: PhysicsBody,
        handler: impl HitHandler + 'static,
    ) -> BodyHandle {
        self.insert_body(Body {
            physics,
            kind: BodyKind::Leaf,
            handler: Box::new(handler),
        })
    }

    /// Insert an empty container.
    ///
    /// The container's own body is not solid, so only its members collide
    /// unless the caller makes it solid explicitly.
    pub fn insert_group(&mut self) -> BodyHandle {
        let physics = PhysicsBody {
            solid: false,
            ..PhysicsBody::default()
        };
        self.insert_body(Body {
            physics,
            kind: BodyKind::Container {
                members: Members::new(),
            },
            handler: Box::new(Solid),
        })
    }

    fn insert_body(&mut self, body: Body) -> BodyHandle {
        self.len += 1;
        if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            return BodyHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            body: Some(body),
        });
        BodyHandle { index, generation: 0 }
    }

    /// Remove a body, dropping it from every container that lists it
    pub fn remove(&mut self, handle: BodyHandle) -> Option<Body> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_indices.push(handle.index);
        self.len -= 1;

        for slot in &mut self.slots {
            if let Some(Body {
                kind: BodyKind::Container { members },
                ..
            }) = &mut slot.body
            {
                members.retain(|m| *m != handle);
            }
        }
        Some(body)
    }

    /// Check whether a handle still refers to a live slot
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.body.as_ref())
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.body.as_mut())
    }

    /// Like [`get`](Self::get) but reports stale handles as an error
    pub fn try_get(&self, handle: BodyHandle) -> PhysicsResult<&Body> {
        self.get(handle).ok_or(PhysicsError::StaleHandle(handle))
    }

    /// Like [`get_mut`](Self::get_mut) but reports stale handles as an error
    pub fn try_get_mut(&mut self, handle: BodyHandle) -> PhysicsResult<&mut Body> {
        self.get_mut(handle).ok_or(PhysicsError::StaleHandle(handle))
    }

    pub fn physics(&self, handle: BodyHandle) -> Option<&PhysicsBody> {
        self.get(handle).map(|body| &body.physics)
    }

    pub fn physics_mut(&mut self, handle: BodyHandle) -> Option<&mut PhysicsBody> {
        self.get_mut(handle).map(|body| &mut body.physics)
    }

    /// Borrow two distinct bodies mutably at once
    pub fn get2_mut(&mut self, a: BodyHandle, b: BodyHandle) -> Option<(&mut Body, &mut Body)> {
        if a.index == b.index || !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (i, j) = (a.index as usize, b.index as usize);
        let (first, second) = if i < j {
            let (left, right) = self.slots.split_at_mut(j);
            (&mut left[i], &mut right[0])
        } else {
            let (left, right) = self.slots.split_at_mut(i);
            (&mut right[0], &mut left[j])
        };
        Some((first.body.as_mut()?, second.body.as_mut()?))
    }

    /// Whether the body exists and is solid, i.e. may take part in a pair test
    pub fn is_collidable(&self, handle: BodyHandle) -> bool {
        self.physics(handle)
            .is_some_and(|physics| physics.exists && physics.solid)
    }

    /// Number of bodies
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over all live bodies
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.body.as_ref().map(|body| {
                (
                    BodyHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    body,
                )
            })
        })
    }

    /// Add `member` to the container `group`
    pub fn add_member(&mut self, group: BodyHandle, member: BodyHandle) -> PhysicsResult<()> {
        self.try_get(member)?;
        if !self.try_get(group)?.is_container() {
            log::warn!("Cannot add {member:?} to leaf body {group:?}");
            return Err(PhysicsError::NotAContainer(group));
        }
        if group == member || self.reaches(member, group) {
            return Err(PhysicsError::CyclicMembership { group, member });
        }

        if let Some(Body {
            kind: BodyKind::Container { members },
            ..
        }) = self.get_mut(group)
        {
            if !members.contains(&member) {
                members.push(member);
            }
        }
        Ok(())
    }

    /// Remove `member` from the container `group`; returns whether it was listed
    pub fn remove_member(&mut self, group: BodyHandle, member: BodyHandle) -> PhysicsResult<bool> {
        match &mut self.try_get_mut(group)?.kind {
            BodyKind::Leaf => Err(PhysicsError::NotAContainer(group)),
            BodyKind::Container { members } => {
                let before = members.len();
                members.retain(|m| *m != member);
                Ok(members.len() != before)
            }
        }
    }

    /// Members of a container
    pub fn members(&self, group: BodyHandle) -> PhysicsResult<&[BodyHandle]> {
        let body = self.try_get(group)?;
        if body.is_container() {
            Ok(body.members())
        } else {
            Err(PhysicsError::NotAContainer(group))
        }
    }

    /// Whether `target` can be reached from `from` through container membership
    fn reaches(&self, from: BodyHandle, target: BodyHandle) -> bool {
        let mut stack = vec![from];
        while let Some(handle) = stack.pop() {
            if handle == target {
                return true;
            }
            if let Some(body) = self.get(handle) {
                stack.extend_from_slice(body.members());
            }
        }
        false
    }

    /// Collect the bodies that go into the quadtree for `handle`, in insertion order.
    ///
    /// Existing members of a container come first: nested containers are
    /// expanded in place, solid leaves are listed directly. The body itself
    /// follows when it is solid. Returns `false` for a stale handle.
    pub fn collect_insertable(&self, handle: BodyHandle, out: &mut Vec<BodyHandle>) -> bool {
        let Some(body) = self.get(handle) else {
            return false;
        };

        for &member in body.members() {
            let Some(child) = self.get(member) else {
                log::debug!("Skipping stale member {member:?} of {handle:?}");
                continue;
            };
            if !child.physics.exists {
                continue;
            }
            if child.is_container() {
                self.collect_insertable(member, out);
            } else if child.physics.solid {
                out.push(member);
            }
        }

        if body.physics.solid {
            out.push(handle);
        }
        true
    }

    /// Kill a body; killing a container kills everything it holds
    pub fn kill(&mut self, handle: BodyHandle) {
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(body) = self.get_mut(current) {
                body.physics.kill();
                stack.extend_from_slice(body.members());
            }
        }
    }

    /// Integrate every existing, active body by one frame
    pub fn update(&mut self, dt: f32) {
        for body in self.slots.iter_mut().filter_map(|slot| slot.body.as_mut()) {
            if body.physics.exists && body.physics.active {
                body.physics.update_motion(dt);
            }
        }
    }
}
