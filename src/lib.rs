//! # gridswarm
//!
//! A grid of particles advected by simple, composable force rules: random
//! drift, dispersion, attraction to or repulsion from a point, orbiting,
//! and snapping onto mesh vertices.
//!
//! The crate is the simulation core. Rendering, windowing and model loading
//! live outside it; each tick it produces flat position and color buffers
//! for an instanced-quad renderer to consume.
//!
//! ## Quick Start
//!
//! ```
//! use gridswarm::prelude::*;
//!
//! let mut config = SimConfig::default();
//! config.num_particles = 10;
//! config.bring_to_point = true;
//!
//! let mut sim = Simulation::new(7);
//! sim.load_scene(&config);
//! sim.pointer_down(Vec3::new(4.0, 4.0, 0.0));
//!
//! for _ in 0..60 {
//!     let frame = sim.step(&config);
//!     // upload frame.position_bytes() / frame.color_bytes() here
//!     assert_eq!(frame.count, 100);
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! A [`Particle`] has position, velocity, acceleration and an RGBA color
//! whose red channel follows its distance from the origin. Integration is
//! semi-implicit Euler against the global tick clock.
//!
//! ### Force rules
//!
//! The [`ForcePolicy`] runs an ordered list of [`ForceRule`]s per particle
//! per tick. Later rules overwrite the acceleration set by earlier ones:
//!
//! | Rule | Active when | Effect |
//! |------|-------------|--------|
//! | [`ForceRule::Jitter`] | always | random drift, freezes velocity unless dispersing |
//! | [`ForceRule::PointForce`] | `bring_to_point` | pull toward (or push from) the attraction point |
//! | [`ForceRule::Capture`] | `bring_to_point && !oscillate` | damp and re-scatter inside the capture radius |
//!
//! ### Commands
//!
//! Scene reloads, mesh snapping, velocity resets and pointer presses are
//! [`Command`]s applied between ticks, never during one.
//!
//! ## Features
//!
//! - `parallel` - adds `Simulation::step_parallel`, a rayon-backed step.

pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod input;
pub mod mesh;
pub mod particle;
pub mod rules;
mod simulation;
pub mod time;

pub use bytemuck;
pub use camera::Camera;
pub use config::{ForceTuning, SimConfig};
pub use error::{ConfigError, MeshError};
pub use frame::{Frame, InstanceVertex};
pub use glam::{Mat4, Vec2, Vec3, Vec4};
pub use mesh::{MeshLibrary, MeshSelector};
pub use particle::Particle;
pub use rules::{ForceContext, ForcePolicy, ForceRule};
pub use simulation::{Command, Simulation};

/// Convenient re-exports for common usage.
///
/// ```
/// use gridswarm::prelude::*;
/// ```
pub mod prelude {
    pub use crate::camera::Camera;
    pub use crate::config::{ForceTuning, SimConfig};
    pub use crate::frame::Frame;
    pub use crate::input::{Pointer, PointerEvent, Viewport};
    pub use crate::mesh::{MeshLibrary, MeshSelector};
    pub use crate::particle::Particle;
    pub use crate::rules::{ForceContext, ForcePolicy, ForceRule};
    pub use crate::simulation::{Command, Simulation};
    pub use crate::time::FrameClock;
    pub use crate::{Mat4, Vec2, Vec3, Vec4};
}
