//! Geometry module: vertex stream layouts and primitive mesh data.

mod primitives;
mod vertex;

pub use primitives::{cube_positions, flat_normals, quad_texture_coordinates, vertex_colors};
pub use vertex::{BufferSpecification, DataType};
