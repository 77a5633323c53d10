//! The proxy cube whose back faces seed the per-pixel rays.

use glam::{UVec3, Vec4};

/// Number of cube corners.
pub const CUBE_VERTEX_COUNT: usize = 8;
/// Two triangles per face.
pub const CUBE_TRIANGLE_COUNT: usize = 12;

/// Corners of the [-1, 1] cube in homogeneous coordinates.
pub const CUBE_VERTICES: [Vec4; CUBE_VERTEX_COUNT] = [
    // front (+Z)
    Vec4::new(-1.0, -1.0, 1.0, 1.0),
    Vec4::new(1.0, -1.0, 1.0, 1.0),
    Vec4::new(1.0, 1.0, 1.0, 1.0),
    Vec4::new(-1.0, 1.0, 1.0, 1.0),
    // back (-Z)
    Vec4::new(-1.0, -1.0, -1.0, 1.0),
    Vec4::new(1.0, -1.0, -1.0, 1.0),
    Vec4::new(1.0, 1.0, -1.0, 1.0),
    Vec4::new(-1.0, 1.0, -1.0, 1.0),
];

/// Triangles, counter-clockwise when seen from outside the cube.
pub const CUBE_TRIANGLES: [UVec3; CUBE_TRIANGLE_COUNT] = [
    // front
    UVec3::new(0, 1, 2),
    UVec3::new(2, 3, 0),
    // right
    UVec3::new(1, 5, 6),
    UVec3::new(6, 2, 1),
    // back
    UVec3::new(7, 6, 5),
    UVec3::new(5, 4, 7),
    // left
    UVec3::new(4, 0, 3),
    UVec3::new(3, 7, 4),
    // bottom
    UVec3::new(4, 5, 1),
    UVec3::new(1, 0, 4),
    // top
    UVec3::new(3, 2, 6),
    UVec3::new(6, 7, 3),
];

/// Vertex and index data of the proxy cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeGeometry {
    /// Corner positions.
    pub vertices: [Vec4; CUBE_VERTEX_COUNT],
    /// Triangle corner indices.
    pub triangles: [UVec3; CUBE_TRIANGLE_COUNT],
}

impl Default for CubeGeometry {
    fn default() -> Self {
        Self::new()
    }
}

impl CubeGeometry {
    /// Returns the constant cube.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: CUBE_VERTICES,
            triangles: CUBE_TRIANGLES,
        }
    }

    /// Vertex positions as `[x, y, z, w]` arrays, ready for a vertex buffer.
    #[must_use]
    pub fn vertex_data(&self) -> [[f32; 4]; CUBE_VERTEX_COUNT] {
        self.vertices.map(|v| v.to_array())
    }

    /// Flattened triangle list indices, ready for an index buffer.
    #[must_use]
    pub fn index_data(&self) -> [u32; CUBE_TRIANGLE_COUNT * 3] {
        let mut indices = [0u32; CUBE_TRIANGLE_COUNT * 3];
        for (chunk, triangle) in indices.chunks_exact_mut(3).zip(self.triangles.iter()) {
            chunk.copy_from_slice(&triangle.to_array());
        }
        indices
    }

    /// Number of indices drawn.
    #[must_use]
    pub fn index_count(&self) -> u32 {
        (CUBE_TRIANGLE_COUNT * 3) as u32
    }
}
