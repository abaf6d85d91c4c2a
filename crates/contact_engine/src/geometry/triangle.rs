//! Triangle primitive

use crate::foundation::math::{try_normalize, Vec3};

/// A triangle given by three vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// The three vertices in winding order
    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Unnormalized normal (right-hand rule); its length is twice the area
    pub fn scaled_normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Unit normal (right-hand rule), `None` for zero-area triangles
    pub fn normal(&self) -> Option<Vec3> {
        try_normalize(&self.scaled_normal())
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Barycentric coordinates of `point` projected onto the triangle's plane
    ///
    /// Coordinates may be negative when the projection falls outside the
    /// triangle. Returns `None` for zero-area triangles.
    pub fn barycentric(&self, point: &Vec3) -> Option<[f32; 3]> {
        let e0 = self.v1 - self.v0;
        let e1 = self.v2 - self.v0;
        let ep = point - self.v0;

        let d00 = e0.dot(&e0);
        let d01 = e0.dot(&e1);
        let d11 = e1.dot(&e1);
        let d20 = ep.dot(&e0);
        let d21 = ep.dot(&e1);

        let denom = d00 * d11 - d01 * d01;
        if denom.abs() <= f32::EPSILON * d00 * d11 {
            return None;
        }

        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        Some([1.0 - v - w, v, w])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_right_triangle() -> Triangle {
        Triangle::new(Vec3::zeros(), Vec3::x(), Vec3::y())
    }

    #[test]
    fn test_normal_and_centroid() {
        let tri = unit_right_triangle();
        assert_relative_eq!(tri.normal().unwrap(), Vec3::z(), epsilon = 1e-6);
        assert_relative_eq!(tri.centroid(), Vec3::new(1.0 / 3.0, 1.0 / 3.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_triangle_has_no_normal() {
        let tri = Triangle::new(Vec3::zeros(), Vec3::x(), Vec3::x() * 2.0);
        assert!(tri.normal().is_none());
        assert!(tri.barycentric(&Vec3::zeros()).is_none());
    }

    #[test]
    fn test_barycentric_reconstructs_point() {
        let tri = Triangle::new(
            Vec3::new(1.0, 0.0, 2.0),
            Vec3::new(3.0, 1.0, 2.0),
            Vec3::new(0.0, 4.0, 2.0),
        );
        let point = Vec3::new(1.2, 1.5, 2.0);
        let [a, b, c] = tri.barycentric(&point).unwrap();

        assert_relative_eq!(a + b + c, 1.0, epsilon = 1e-6);
        assert_relative_eq!(tri.v0 * a + tri.v1 * b + tri.v2 * c, point, epsilon = 1e-5);
    }

    #[test]
    fn test_barycentric_projects_off_plane_points() {
        let tri = unit_right_triangle();
        let [a, b, c] = tri.barycentric(&Vec3::new(0.25, 0.25, 7.0)).unwrap();
        assert_relative_eq!(a, 0.5, epsilon = 1e-6);
        assert_relative_eq!(b, 0.25, epsilon = 1e-6);
        assert_relative_eq!(c, 0.25, epsilon = 1e-6);
    }
}
