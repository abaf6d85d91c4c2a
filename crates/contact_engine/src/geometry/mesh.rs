//! Triangle meshes in model space
//!
//! The mesh is the geometry snapshot a rigid body's hitbox is built from.
//! Vertices stay in local coordinates; the body's transform places them in
//! the world at query time.

use crate::foundation::math::Vec3;
use super::triangle::Triangle;
use thiserror::Error;

/// Errors raised while assembling a mesh from raw buffers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// An index points past the end of the vertex buffer
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// The offending index
        index: u32,
        /// Number of vertices available
        vertex_count: usize,
    },

    /// Index buffer length is not a multiple of three
    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),
}

/// A triangle mesh stored in MODEL SPACE
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    triangles: Vec<Triangle>,
}

impl Mesh {
    /// Wrap an existing triangle list
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Creates a mesh from MODEL SPACE vertices and a triangle index list
    pub fn from_vertices(vertices: &[Vec3], indices: &[u32]) -> Result<Self, GeometryError> {
        if indices.len() % 3 != 0 {
            return Err(GeometryError::IncompleteTriangle(indices.len()));
        }

        let fetch = |index: u32| {
            vertices
                .get(index as usize)
                .copied()
                .ok_or(GeometryError::IndexOutOfRange {
                    index,
                    vertex_count: vertices.len(),
                })
        };

        let triangles = indices
            .chunks_exact(3)
            .map(|chunk| Ok(Triangle::new(fetch(chunk[0])?, fetch(chunk[1])?, fetch(chunk[2])?)))
            .collect::<Result<Vec<_>, GeometryError>>()?;

        Ok(Self { triangles })
    }

    /// Axis-aligned cube of edge length `size` centered on the origin
    ///
    /// Faces are wound counter-clockwise when seen from outside. Every
    /// corner is shared by several triangles, as in any exported mesh.
    pub fn cube(size: f32) -> Self {
        Self::cuboid(Vec3::new(size, size, size) * 0.5)
    }

    /// Axis-aligned box with the given half extents centered on the origin
    pub fn cuboid(half_extents: Vec3) -> Self {
        let (x, y, z) = (half_extents.x, half_extents.y, half_extents.z);
        let corners = [
            Vec3::new(-x, -y, -z),
            Vec3::new(x, -y, -z),
            Vec3::new(x, y, -z),
            Vec3::new(-x, y, -z),
            Vec3::new(-x, -y, z),
            Vec3::new(x, -y, z),
            Vec3::new(x, y, z),
            Vec3::new(-x, y, z),
        ];
        let indices: [u32; 36] = [
            0, 3, 2, 0, 2, 1, // -z
            4, 5, 6, 4, 6, 7, // +z
            0, 1, 5, 0, 5, 4, // -y
            3, 7, 6, 3, 6, 2, // +y
            0, 4, 7, 0, 7, 3, // -x
            1, 2, 6, 1, 6, 5, // +x
        ];

        let triangles = indices
            .chunks_exact(3)
            .map(|c| Triangle::new(corners[c[0] as usize], corners[c[1] as usize], corners[c[2] as usize]))
            .collect();
        Self { triangles }
    }

    /// Triangles of the mesh
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Every triangle corner in order, duplicates included
    pub fn vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.triangles.iter().flat_map(Triangle::vertices)
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True if the mesh has no triangles
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Radius of the smallest origin-centered sphere containing the mesh
    pub fn local_bounding_radius(&self) -> f32 {
        self.vertices()
            .map(|v| v.magnitude_squared())
            .fold(0.0f32, f32::max)
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_faces_point_outward() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.triangle_count(), 12);

        for tri in cube.triangles() {
            let normal = tri.normal().unwrap();
            assert!(normal.dot(&tri.centroid()) > 0.0, "inward face: {:?}", tri);
        }
    }

    #[test]
    fn test_cube_bounding_radius() {
        let cube = Mesh::cube(2.0);
        assert_relative_eq!(cube.local_bounding_radius(), 3.0f32.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_from_vertices() {
        let vertices = [Vec3::zeros(), Vec3::x(), Vec3::y(), Vec3::z()];
        let mesh = Mesh::from_vertices(&vertices, &[0, 1, 2, 0, 2, 3]).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertices().count(), 6);
    }

    #[test]
    fn test_from_vertices_rejects_bad_indices() {
        let vertices = [Vec3::zeros(), Vec3::x(), Vec3::y()];
        assert_eq!(
            Mesh::from_vertices(&vertices, &[0, 1, 5]),
            Err(GeometryError::IndexOutOfRange { index: 5, vertex_count: 3 })
        );
        assert_eq!(
            Mesh::from_vertices(&vertices, &[0, 1]),
            Err(GeometryError::IncompleteTriangle(2))
        );
    }
}
