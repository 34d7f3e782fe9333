//! Error types for gridswarm.
//!
//! The per-tick path never fails; these cover configuration files and mesh
//! vertex sources handed in from outside the simulation.

use thiserror::Error;

use crate::mesh::MeshSelector;

/// Errors that can occur when loading, saving or validating a [`SimConfig`](crate::SimConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid JSON config.
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    /// Grid side length is above the slider bound.
    #[error("Grid side of {requested} particles exceeds the maximum of {max}")]
    TooManyParticles {
        /// Requested grid side length.
        requested: u32,
        /// Largest accepted side length.
        max: u32,
    },

    /// A tuning value is negative or not finite.
    #[error("Invalid force tuning value for `{0}`")]
    InvalidTuning(&'static str),
}

/// Errors produced by mesh vertex sources.
#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    /// A flat float stream whose length is not a multiple of 4.
    #[error("Flat vertex stream of length {0} is not a sequence of (x, y, z, w) tuples")]
    FlatLength(usize),

    /// The selected mesh has no vertices registered.
    #[error("No vertices registered for mesh {0:?}")]
    Empty(MeshSelector),
}
