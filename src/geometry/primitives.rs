//! Primitive geometry builders.
//!
//! Everything here produces flat, non-indexed triangle lists: three floats
//! per vertex for positions and colors, two for texture coordinates.

use crate::math::Vector3;

/// Texture coordinates of one quad (two triangles).
const QUAD_UVS: [f32; 12] = [0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0];

/// Cube faces as (outward normal, right, up). `right x up == normal`, which
/// keeps every triangle counter-clockwise seen from outside.
const CUBE_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
];

/// Triangle-list positions of an axis-aligned box centred on the origin.
///
/// 36 vertices, 108 floats.
pub fn cube_positions(width: f32, height: f32, depth: f32) -> Vec<f32> {
    let half = Vector3::new(width / 2.0, height / 2.0, depth / 2.0);
    let mut positions = Vec::with_capacity(108);

    for (normal, right, up) in CUBE_FACES {
        let (n, r, u) = (Vector3::from(normal), Vector3::from(right), Vector3::from(up));
        let bottom_left = n - r - u;
        let bottom_right = n + r - u;
        let top_left = n - r + u;
        let top_right = n + r + u;

        for corner in [bottom_left, bottom_right, top_left, top_left, bottom_right, top_right] {
            positions.extend_from_slice(&[corner.x * half.x, corner.y * half.y, corner.z * half.z]);
        }
    }

    positions
}

/// Texture coordinates for `vertex_count` vertices laid out as consecutive quads.
///
/// A trailing partial quad gets the matching prefix of the quad pattern.
pub fn quad_texture_coordinates(vertex_count: usize) -> Vec<f32> {
    QUAD_UVS.iter().copied().cycle().take(vertex_count * 2).collect()
}

/// One RGB triple per vertex, all equal to `color`.
pub fn vertex_colors(color: Vector3, vertex_count: usize) -> Vec<f32> {
    color.to_array().iter().copied().cycle().take(vertex_count * 3).collect()
}

/// Flat face normals for a triangle list.
///
/// Every 9 floats form one triangle; its normal `normalize((v1 - v0) x (v2 - v0))`
/// is repeated for all three vertices. Vertices of an incomplete trailing
/// triangle get zero normals.
pub fn flat_normals(positions: &[f32]) -> Vec<f32> {
    let mut normals = Vec::with_capacity(positions.len());
    let mut triangles = positions.chunks_exact(9);

    for t in triangles.by_ref() {
        let v0 = Vector3::new(t[0], t[1], t[2]);
        let v1 = Vector3::new(t[3], t[4], t[5]);
        let v2 = Vector3::new(t[6], t[7], t[8]);
        let normal = (v1 - v0).cross(&(v2 - v0)).normalized();
        for _ in 0..3 {
            normals.extend_from_slice(&normal.to_array());
        }
    }

    normals.resize(positions.len(), 0.0);
    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_vertex_count() {
        let cube = cube_positions(2.0, 4.0, 6.0);
        assert_eq!(cube.len(), 108);
        let max = |axis: usize| cube.iter().skip(axis).step_by(3).fold(f32::MIN, |m, v| m.max(*v));
        assert_eq!((max(0), max(1), max(2)), (1.0, 2.0, 3.0));
    }

    #[test]
    fn test_cube_faces_point_outward() {
        let cube = cube_positions(1.0, 1.0, 1.0);
        let normals = flat_normals(&cube);
        for (tri, normal) in cube.chunks(9).zip(normals.chunks(9)) {
            let centroid = Vector3::new(
                (tri[0] + tri[3] + tri[6]) / 3.0,
                (tri[1] + tri[4] + tri[7]) / 3.0,
                (tri[2] + tri[5] + tri[8]) / 3.0,
            );
            let n = Vector3::new(normal[0], normal[1], normal[2]);
            assert!(centroid.dot(&n) > 0.0);
        }
    }

    #[test]
    fn test_single_triangle_normal() {
        let normals = flat_normals(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_partial_triangle_gets_zero_normals() {
        let normals = flat_normals(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 5.0, 5.0, 5.0]);
        assert_eq!(normals.len(), 12);
        assert_eq!(&normals[9..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_quad_texture_coordinates() {
        let uvs = quad_texture_coordinates(12);
        assert_eq!(uvs.len(), 24);
        assert_eq!(&uvs[..12], &QUAD_UVS);
        assert_eq!(&uvs[12..], &QUAD_UVS);
    }

    #[test]
    fn test_vertex_colors() {
        let colors = vertex_colors(Vector3::new(1.0, 0.5, 0.0), 2);
        assert_eq!(colors, vec![1.0, 0.5, 0.0, 1.0, 0.5, 0.0]);
    }
}
