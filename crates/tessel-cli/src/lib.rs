//! # Tessel CLI
//!
//! Command-line runner for Tessel collision scenes.
//!
//! ## Commands
//! - `simulate` - Step a scene for a number of frames and report where bodies end up
//! - `check` - Validate a scene and show how its bodies spread over the quadtree

pub mod scene;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use scene::{Scene, SceneFile};

/// Tessel collision engine CLI
#[derive(Parser)]
#[command(name = "tessel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Step a scene and report collisions
    Simulate {
        /// Scene file
        #[arg(short, long)]
        scene: PathBuf,

        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u32,

        /// Real time per frame in seconds, before clamping and scaling
        #[arg(long, default_value = "0.016666")]
        dt: f64,
    },

    /// Validate a scene and print the quadtree it produces
    Check {
        /// Scene file
        #[arg(short, long)]
        scene: PathBuf,
    },
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match cli.command {
        Commands::Simulate { scene, frames, dt } => {
            let file = SceneFile::load(&scene)?;
            let mut scene = Scene::build(&file)?;
            log::info!("Simulating {} bodies for {} frames...", file.bodies.len(), frames);

            let mut colliding_frames = 0;
            for frame in 0..frames {
                if scene.step(dt) {
                    colliding_frames += 1;
                    log::debug!("Frame {}: collision", frame);
                }
            }

            log::info!(
                "Simulated {:.3}s, collisions in {} of {} frames",
                scene.time.total_time(),
                colliding_frames,
                frames
            );
            for (name, body) in scene.named_bodies() {
                log::info!(
                    "  {}: pos=({:.2}, {:.2}) vel=({:.2}, {:.2}){}{}",
                    name,
                    body.x,
                    body.y,
                    body.velocity.x,
                    body.velocity.y,
                    if body.on_floor { " on floor" } else { "" },
                    if body.exists { "" } else { " (dead)" }
                );
            }
        }

        Commands::Check { scene } => {
            let file = SceneFile::load(&scene)?;
            let mut scene = Scene::build(&file)?;
            let pairs = scene.overlapping_pairs();
            let tree = scene.space.tree();

            log::info!("Scene OK: {} bodies", file.bodies.len());
            log::info!("  World: {:?}, divisions {}", file.world.bounds, file.world.divisions);
            log::info!(
                "  Quadtree: {} nodes, min node size {:.2}",
                tree.node_count(),
                tree.min_size()
            );
            for node in tree.nodes().filter(|node| !node.list_a.is_empty()) {
                log::debug!("    {:?}: {} bodies", node.bounds, node.list_a.len());
            }
            log::info!("  Overlapping pairs at start: {}", pairs);
        }
    }

    Ok(())
}
