//! Headless driver for gridswarm scenes.
//!
//! Loads a scene, optionally presses the pointer and snaps to a mesh, runs a
//! number of ticks and reports what happened.
//!
//! Usage: `gridswarm --config scene.json --ticks 600 -v`

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use gridswarm::prelude::*;

#[derive(Parser)]
#[command(name = "gridswarm")]
#[command(about = "Run a particle grid simulation without a window", long_about = None)]
#[command(version)]
struct Cli {
    /// Scene configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 600)]
    ticks: u32,

    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Grid side length override
    #[arg(long)]
    particles: Option<u32>,

    /// Enable dispersion
    #[arg(long)]
    disperse: bool,

    /// Enable bring-to-point
    #[arg(long)]
    attract: bool,

    /// Repel from the attraction point instead of attracting
    #[arg(long)]
    repel: bool,

    /// Keep particles oscillating through the attraction point
    #[arg(long)]
    oscillate: bool,

    /// Press the pointer at these screen coordinates on a 1280x720 viewport
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    pointer: Option<Vec<f32>>,

    /// Snap particles to the selected mesh after loading
    #[arg(long)]
    mesh: bool,

    /// Write the final frame as JSON
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct FrameDump<'a> {
    time: f32,
    count: usize,
    positions: &'a [f32],
    colors: &'a [f32],
}

fn build_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(n) = cli.particles {
        config.num_particles = n;
    }
    config.disperse |= cli.disperse;
    config.bring_to_point |= cli.attract || cli.repel;
    config.repel |= cli.repel;
    config.oscillate |= cli.oscillate;
    config.validate()?;
    Ok(config)
}

fn mean_distance(sim: &Simulation) -> f32 {
    let count = sim.particle_count();
    if count == 0 {
        return 0.0;
    }
    let point = sim.attraction_point();
    let total: f32 = sim
        .particles()
        .iter()
        .map(|p| p.position().distance(point))
        .sum();
    total / count as f32
}

/// Log level selected by `-v` repetitions and `-q`.
fn log_level(verbose: u8, quiet: bool) -> log::LevelFilter {
    match (verbose, quiet) {
        (0, true) => log::LevelFilter::Error,
        (0, false) => log::LevelFilter::Warn,
        (1, _) => log::LevelFilter::Info,
        (2, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG still refines the level picked on the command line.
    env_logger::Builder::new()
        .filter_level(log_level(cli.verbose, cli.quiet))
        .parse_default_env()
        .init();

    let mut config = build_config(&cli)?;
    let library = MeshLibrary::new();
    let mut sim = Simulation::new(cli.seed);

    sim.apply(Command::LoadScene, &mut config, &library)?;

    if let Some(coords) = &cli.pointer {
        let viewport = Viewport::new(1280, 720);
        let mut camera = Camera::default();
        camera.set_aspect_ratio(viewport.aspect_ratio());

        let mut pointer = Pointer::new(viewport);
        pointer.handle(
            PointerEvent::Moved {
                x: coords[0],
                y: coords[1],
            },
            camera.view_proj(),
            config.camera_controls,
        );
        if let Some(cmd) = pointer.handle(PointerEvent::Pressed, camera.view_proj(), config.camera_controls) {
            sim.apply(cmd, &mut config, &library)?;
        }
    }

    if cli.mesh {
        sim.apply(Command::AttractToMesh, &mut config, &library)?;
    }

    log::info!(
        "running {} particles for {} ticks (attraction point {:?})",
        sim.particle_count(),
        cli.ticks,
        sim.attraction_point()
    );

    let report_every = (cli.ticks / 10).max(1);
    let mut resets = 0;
    for tick in 1..=cli.ticks {
        resets += sim.step(&config).resets;
        if tick % report_every == 0 {
            log::info!(
                "t={} fps={:.1} mean distance to point={:.3}",
                sim.time(),
                sim.clock().fps(),
                mean_distance(&sim)
            );
        }
    }

    if !cli.quiet {
        println!(
            "{} particles, {} ticks, mean distance to point {:.3}, {} resets",
            sim.particle_count(),
            cli.ticks,
            mean_distance(&sim),
            resets
        );
    }

    if let Some(path) = &cli.dump {
        let frame = sim.frame();
        let dump = FrameDump {
            time: sim.time(),
            count: frame.count,
            positions: &frame.positions,
            colors: &frame.colors,
        };
        let json = serde_json::to_string(&dump)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}
