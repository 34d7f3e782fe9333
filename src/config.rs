//! Configuration snapshot read once per tick.
//!
//! A [`SimConfig`] is what the control panel edits: grid size, the mode
//! flags and the selected mesh target. Configs serialize to JSON so a scene
//! can be saved and replayed by the driver.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mesh::MeshSelector;

/// Largest grid side length the particle slider allows.
pub const MAX_PARTICLES_PER_SIDE: u32 = 300;

fn default_num_particles() -> u32 {
    100
}

/// Tunable force constants.
///
/// Defaults are the reference magnitudes the simulation was designed around.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForceTuning {
    /// Random jitter magnitude applied every tick.
    pub tick_jitter: f32,
    /// Random jitter magnitude given to dispersed particles at scene load.
    pub load_jitter: f32,
    /// Magnitude of the attraction/repulsion toward the attraction point.
    pub point_strength: f32,
    /// Distance below which an attracted particle is captured.
    pub capture_radius: f32,
    /// Velocity multiplier applied on capture.
    pub capture_damping: f32,
    /// Scale from mesh units to world units.
    pub mesh_scale: f32,
    /// Velocity multiplier applied when snapping to a mesh.
    pub mesh_damping: f32,
}

impl Default for ForceTuning {
    fn default() -> Self {
        Self {
            tick_jitter: 1.0 / 100.0,
            load_jitter: 1.0 / 1000.0,
            point_strength: 1.0 / 100.0,
            capture_radius: 5.0,
            capture_damping: 1.0 / 10.0,
            mesh_scale: 10.0,
            mesh_damping: 1.0 / 10.0,
        }
    }
}

impl ForceTuning {
    /// Check that every value is finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("tick_jitter", self.tick_jitter),
            ("load_jitter", self.load_jitter),
            ("point_strength", self.point_strength),
            ("capture_radius", self.capture_radius),
            ("capture_damping", self.capture_damping),
            ("mesh_scale", self.mesh_scale),
            ("mesh_damping", self.mesh_damping),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTuning(name));
            }
        }
        Ok(())
    }
}

/// Complete simulation configuration.
///
/// Mode flags are independent; see [`ForcePolicy`](crate::ForcePolicy) for
/// how they combine.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    /// Grid side length; a scene holds `num_particles²` particles.
    #[serde(default = "default_num_particles")]
    pub num_particles: u32,
    /// Jitter particles in random directions.
    #[serde(default)]
    pub disperse: bool,
    /// Pull particles toward (or push away from) the attraction point.
    #[serde(default)]
    pub bring_to_point: bool,
    /// Keep attracted particles orbiting instead of capturing them.
    #[serde(default)]
    pub oscillate: bool,
    /// Flip the point force into a repulsion.
    #[serde(default)]
    pub repel: bool,
    /// Pointer drives the camera instead of the attraction point.
    #[serde(default)]
    pub camera_controls: bool,
    /// Mesh used by the attract-to-mesh command.
    #[serde(default)]
    pub mesh_selector: MeshSelector,
    #[serde(default)]
    pub tuning: ForceTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_particles: default_num_particles(),
            disperse: false,
            bring_to_point: false,
            oscillate: false,
            repel: false,
            camera_controls: false,
            mesh_selector: MeshSelector::default(),
            tuning: ForceTuning::default(),
        }
    }
}

impl SimConfig {
    /// Check slider bounds and tuning values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_particles > MAX_PARTICLES_PER_SIDE {
            return Err(ConfigError::TooManyParticles {
                requested: self.num_particles,
                max: MAX_PARTICLES_PER_SIDE,
            });
        }
        self.tuning.validate()
    }

    /// Total particle count of a scene loaded from this config.
    pub fn particle_count(&self) -> usize {
        let side = self.num_particles as usize;
        side * side
    }

    /// Flip the dispersion flag.
    pub fn toggle_disperse(&mut self) {
        self.disperse = !self.disperse;
        log::info!("disperse: {}", self.disperse);
    }

    /// Flip the bring-to-point flag.
    pub fn toggle_bring_to_point(&mut self) {
        self.bring_to_point = !self.bring_to_point;
        log::info!("bring to point: {}", self.bring_to_point);
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
