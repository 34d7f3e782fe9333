//! Per-tick output buffers handed to the renderer.
//!
//! Buffers are flat and index-ordered: 3 floats of position and 4 floats of
//! color per particle, ready to be uploaded as instance attributes.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// One particle's instance attributes in upload layout.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceVertex {
    pub offset: [f32; 3],
    pub color: [f32; 4],
}

/// Output of a simulation step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    /// Number of particles written.
    pub count: usize,
    /// Particles that went non-finite this tick and were reset.
    pub resets: usize,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty the buffers, keeping their allocations.
    pub(crate) fn clear(&mut self, capacity: usize) {
        self.positions.clear();
        self.colors.clear();
        self.positions.reserve(capacity * 3);
        self.colors.reserve(capacity * 4);
        self.count = 0;
        self.resets = 0;
    }

    pub(crate) fn push(&mut self, position: Vec3, color: Vec4) {
        self.positions.extend_from_slice(&position.to_array());
        self.colors.extend_from_slice(&color.to_array());
        self.count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Position buffer as raw bytes.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Color buffer as raw bytes.
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Instance attributes of particle `index`, if it exists.
    pub fn vertex_at(&self, index: usize) -> Option<InstanceVertex> {
        if index >= self.count {
            return None;
        }
        let p = &self.positions[index * 3..index * 3 + 3];
        let c = &self.colors[index * 4..index * 4 + 4];
        Some(InstanceVertex {
            offset: [p[0], p[1], p[2]],
            color: [c[0], c[1], c[2], c[3]],
        })
    }

    /// Interleaved instance attributes for every particle.
    pub fn interleaved(&self) -> Vec<InstanceVertex> {
        (0..self.count).filter_map(|i| self.vertex_at(i)).collect()
    }
}
