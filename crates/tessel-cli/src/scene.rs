//! JSON scenes
//!
//! A scene is a world configuration plus a flat list of bodies. Every body is
//! put into one level group so a single self-collide pass covers the scene.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tessel_core::{TimeConfig, TimeManager, WorldConfig};
use tessel_physics::{
    BodyHandle, BodySet, Bounce, CollisionSpace, DEFAULT_MAX_VELOCITY, PhysicsBody,
};

/// Scene file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub time: TimeConfig,
    pub bodies: Vec<BodySpec>,
}

impl SceneFile {
    /// Read and parse a scene file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse scene {}", path.display()))
    }
}

fn default_true() -> bool {
    true
}

fn default_max_velocity() -> Vec2 {
    Vec2::splat(DEFAULT_MAX_VELOCITY)
}

/// One body in a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    #[serde(default)]
    pub name: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub velocity: Vec2,
    #[serde(default)]
    pub acceleration: Vec2,
    #[serde(default)]
    pub drag: Vec2,
    #[serde(default = "default_max_velocity")]
    pub max_velocity: Vec2,
    #[serde(default)]
    pub fixed: bool,
    #[serde(default = "default_true")]
    pub solid: bool,
    /// Reflect on impact with this factor instead of stopping
    #[serde(default)]
    pub bounce: Option<f32>,
}

impl BodySpec {
    fn to_physics(&self) -> PhysicsBody {
        PhysicsBody {
            velocity: self.velocity,
            acceleration: self.acceleration,
            drag: self.drag,
            max_velocity: self.max_velocity,
            fixed: self.fixed,
            solid: self.solid,
            ..PhysicsBody::new(self.x, self.y, self.width, self.height)
        }
    }
}

/// A loaded, runnable scene
#[derive(Debug)]
pub struct Scene {
    pub bodies: BodySet,
    pub level: BodyHandle,
    pub space: CollisionSpace,
    pub time: TimeManager,
    names: Vec<(String, BodyHandle)>,
}

impl Scene {
    /// Build the bodies and collision space described by a scene file
    pub fn build(file: &SceneFile) -> Result<Self> {
        let space = CollisionSpace::new(file.world).context("Invalid world configuration")?;
        let mut bodies = BodySet::new();
        let level = bodies.insert_group();
        let mut names = Vec::with_capacity(file.bodies.len());

        for (i, spec) in file.bodies.iter().enumerate() {
            let physics = spec.to_physics();
            let handle = match spec.bounce {
                Some(factor) => bodies.insert_with_handler(physics, Bounce::new(factor)),
                None => bodies.insert(physics),
            };
            bodies.add_member(level, handle)?;
            let name = spec.name.clone().unwrap_or_else(|| format!("body{i}"));
            names.push((name, handle));
        }

        log::debug!("Built scene with {} bodies", names.len());
        Ok(Self {
            bodies,
            level,
            space,
            time: TimeManager::with_config(file.time),
            names,
        })
    }

    /// Advance one frame: integrate, then collide the level with itself
    pub fn step(&mut self, real_delta: f64) -> bool {
        let dt = self.time.update(real_delta);
        self.bodies.update(dt.as_secs_f32());
        self.space.collide(&mut self.bodies, self.level, self.level)
    }

    /// Count distinct overlapping pairs without resolving them.
    ///
    /// A pair sharing several tree nodes is reported once per node, so
    /// reports are deduplicated by handle.
    pub fn overlapping_pairs(&mut self) -> usize {
        let mut pairs = BTreeSet::new();
        let mut record = |_: &mut BodySet, a: BodyHandle, b: BodyHandle| {
            pairs.insert((a.min(b), a.max(b)));
            false
        };
        self.space
            .overlap(&mut self.bodies, self.level, self.level, Some(&mut record));
        pairs.len()
    }

    /// Named bodies in scene order
    pub fn named_bodies(&self) -> impl Iterator<Item = (&str, &PhysicsBody)> {
        self.names.iter().filter_map(|(name, handle)| {
            self.bodies
                .physics(*handle)
                .map(|physics| (name.as_str(), physics))
        })
    }
}
