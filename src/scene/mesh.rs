//! Mesh component.

use super::SceneError;
use crate::geometry::{cube_positions, flat_normals, BufferSpecification};

/// Triangle-list vertex positions with flat normals.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<f32>,
    normals: Vec<f32>,
    specification: BufferSpecification,
}

impl Mesh {
    /// Mesh of tightly packed xyz positions.
    pub fn new(positions: Vec<f32>) -> Result<Self, SceneError> {
        Self::with_specification(positions, BufferSpecification::positions())
    }

    /// Mesh whose positions follow `specification`.
    ///
    /// Fails when `positions.len()` is not a multiple of `specification.size`.
    pub fn with_specification(positions: Vec<f32>, specification: BufferSpecification) -> Result<Self, SceneError> {
        let size = specification.size as usize;
        if size == 0 || positions.len() % size != 0 {
            return Err(SceneError::MeshSizeMismatch {
                len: positions.len(),
                size: specification.size,
            });
        }
        let normals = flat_normals(&positions);
        Ok(Self {
            positions,
            normals,
            specification,
        })
    }

    /// Axis-aligned box centered on the origin.
    pub fn cube(width: f32, height: f32, depth: f32) -> Self {
        let positions = cube_positions(width, height, depth);
        let normals = flat_normals(&positions);
        Self {
            positions,
            normals,
            specification: BufferSpecification::positions(),
        }
    }

    /// Vertex positions.
    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// One flat normal per vertex.
    #[inline]
    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    /// Layout of the position stream.
    #[inline]
    pub fn specification(&self) -> &BufferSpecification {
        &self.specification
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / self.specification.size as usize
    }

    /// Vertices readable from the stream's byte offset onwards.
    pub fn drawn_vertex_count(&self) -> usize {
        let bytes = std::mem::size_of_val(self.positions.as_slice());
        let stride = self.specification.byte_stride().max(1) as usize;
        bytes.saturating_sub(self.specification.offset as usize) / stride
    }

    /// Number of whole triangles.
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    /// Recompute the flat normals from the positions.
    pub fn compute_normals(&mut self) {
        self.normals = flat_normals(&self.positions);
    }
}
