//! Mesh targets: snapping the particle grid onto a mesh's vertices.
//!
//! A mesh is only ever a flat sequence of `(x, y, z, w)` vertices. Parsing
//! model files is the loader's job; the loader registers what it read in a
//! [`MeshLibrary`] under a [`MeshSelector`]. Built-in solids are available
//! without a loader.
//!
//! Attracting to a mesh is a one-shot command, not a per-tick force. Forces
//! keep acting on the particles from their new positions afterwards.

use std::collections::HashMap;

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::MeshError;
use crate::particle::Particle;

/// Which mesh the attract-to-mesh command targets.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MeshSelector {
    #[default]
    Cube,
    Octahedron,
    Tetrahedron,
    /// Whatever the external loader registered.
    Custom,
}

impl MeshSelector {
    pub fn name(&self) -> &'static str {
        match self {
            MeshSelector::Cube => "Cube",
            MeshSelector::Octahedron => "Octahedron",
            MeshSelector::Tetrahedron => "Tetrahedron",
            MeshSelector::Custom => "Custom",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["Cube", "Octahedron", "Tetrahedron", "Custom"]
    }

    /// Vertices of the built-in solid, if this selector names one.
    ///
    /// Solids are centered on the origin and fit inside the `[-1, 1]` cube.
    pub fn builtin_vertices(&self) -> Option<Vec<Vec4>> {
        let s = 0.5;
        let points: Vec<Vec3> = match self {
            MeshSelector::Cube => {
                let mut v = Vec::with_capacity(8);
                for x in [-s, s] {
                    for y in [-s, s] {
                        for z in [-s, s] {
                            v.push(Vec3::new(x, y, z));
                        }
                    }
                }
                v
            }
            MeshSelector::Octahedron => vec![
                Vec3::X,
                Vec3::NEG_X,
                Vec3::Y,
                Vec3::NEG_Y,
                Vec3::Z,
                Vec3::NEG_Z,
            ],
            MeshSelector::Tetrahedron => vec![
                Vec3::new(s, s, s),
                Vec3::new(s, -s, -s),
                Vec3::new(-s, s, -s),
                Vec3::new(-s, -s, s),
            ],
            MeshSelector::Custom => return None,
        };
        Some(points.into_iter().map(|p| p.extend(1.0)).collect())
    }
}

/// Convert a loader's flat float stream into vertex tuples.
pub fn vertices_from_flat(flat: &[f32]) -> Result<Vec<Vec4>, MeshError> {
    if flat.len() % 4 != 0 {
        return Err(MeshError::FlatLength(flat.len()));
    }
    Ok(flat
        .chunks_exact(4)
        .map(|c| Vec4::new(c[0], c[1], c[2], c[3]))
        .collect())
}

/// Vertex sequences keyed by selector.
#[derive(Clone, Debug)]
pub struct MeshLibrary {
    meshes: HashMap<MeshSelector, Vec<Vec4>>,
}

impl MeshLibrary {
    /// Library holding only the built-in solids.
    pub fn new() -> Self {
        let meshes = [
            MeshSelector::Cube,
            MeshSelector::Octahedron,
            MeshSelector::Tetrahedron,
        ]
        .into_iter()
        .filter_map(|sel| sel.builtin_vertices().map(|v| (sel, v)))
        .collect();
        Self { meshes }
    }

    /// Register or replace the vertices for `selector`.
    pub fn insert(&mut self, selector: MeshSelector, vertices: Vec<Vec4>) {
        log::debug!("registered {} vertices for {}", vertices.len(), selector.name());
        self.meshes.insert(selector, vertices);
    }

    /// Register vertices from a flat `x, y, z, w` float stream.
    pub fn insert_flat(&mut self, selector: MeshSelector, flat: &[f32]) -> Result<(), MeshError> {
        let vertices = vertices_from_flat(flat)?;
        self.insert(selector, vertices);
        Ok(())
    }

    /// Vertices for `selector`; fails when none are registered.
    pub fn get(&self, selector: MeshSelector) -> Result<&[Vec4], MeshError> {
        match self.meshes.get(&selector) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(MeshError::Empty(selector)),
        }
    }
}

impl Default for MeshLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Snap particles onto mesh vertices in index order.
///
/// Particle `i` moves to `vertices[i].xyz * scale` and has its velocity
/// multiplied by `damping`. Stops at the shorter of the two sequences;
/// particles past the last vertex are untouched. Returns how many particles
/// were moved.
pub fn attract_to_mesh(particles: &mut [Particle], vertices: &[Vec4], scale: f32, damping: f32) -> usize {
    let mut moved = 0;
    for (particle, vertex) in particles.iter_mut().zip(vertices) {
        particle.set_position(vertex.truncate() * scale);
        particle.set_velocity(particle.velocity() * damping);
        moved += 1;
    }
    moved
}
