//! Support mapping over convex vertex sets
//!
//! Both GJK and EPA only ever ask one question of a shape: which of its
//! points lies furthest along a direction. The Minkowski-difference support
//! point is built from two such answers.

use crate::foundation::math::Vec3;

/// A shape that can report its furthest point along a direction
pub trait SupportMap {
    /// The point of the shape maximizing the dot product with `direction`
    fn furthest_point(&self, direction: &Vec3) -> Vec3;
}

/// Linear scan for the vertex maximizing `v · direction`
///
/// Ties keep the first vertex encountered. An empty slice yields the origin.
pub fn furthest_point_in(vertices: &[Vec3], direction: &Vec3) -> Vec3 {
    let mut iter = vertices.iter();
    let Some(first) = iter.next() else {
        return Vec3::zeros();
    };

    let mut best = *first;
    let mut best_dot = first.dot(direction);
    for vertex in iter {
        let dot = vertex.dot(direction);
        if dot > best_dot {
            best_dot = dot;
            best = *vertex;
        }
    }
    best
}

/// A point of the Minkowski difference `A - B`
///
/// Keeps the two world-space vertices it came from, so that results found in
/// Minkowski space can be mapped back onto each body.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SupportPoint {
    /// `on_a - on_b`
    pub point: Vec3,
    /// Furthest vertex of A along the query direction
    pub on_a: Vec3,
    /// Furthest vertex of B against the query direction
    pub on_b: Vec3,
}

impl SupportPoint {
    /// Build from the two contributing vertices
    pub fn new(on_a: Vec3, on_b: Vec3) -> Self {
        Self {
            point: on_a - on_b,
            on_a,
            on_b,
        }
    }
}

/// Minkowski-difference support point of `a - b` along `direction`
pub fn support<A, B>(a: &A, b: &B, direction: &Vec3) -> SupportPoint
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    SupportPoint::new(a.furthest_point(direction), b.furthest_point(&-direction))
}

/// Hitbox vertices placed in world space for the duration of one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvexHull {
    vertices: Vec<Vec3>,
}

impl ConvexHull {
    /// Wrap world-space vertices
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self { vertices }
    }

    /// World-space vertices
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// True if there is nothing to collide with
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Mean of the vertices, the origin for an empty hull
    pub fn centroid(&self) -> Vec3 {
        if self.vertices.is_empty() {
            return Vec3::zeros();
        }
        self.vertices.iter().sum::<Vec3>() / self.vertices.len() as f32
    }
}

impl SupportMap for ConvexHull {
    fn furthest_point(&self, direction: &Vec3) -> Vec3 {
        furthest_point_in(&self.vertices, direction)
    }
}

impl SupportMap for [Vec3] {
    fn furthest_point(&self, direction: &Vec3) -> Vec3 {
        furthest_point_in(self, direction)
    }
}
