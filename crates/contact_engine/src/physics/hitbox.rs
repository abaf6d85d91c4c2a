//! Convex hitboxes built from triangle meshes
//!
//! A hitbox is the vertex set GJK and EPA query for support points. Two
//! strategies are offered: a cheap 8-corner bounding box, and the full set
//! of unique mesh vertices. Triangle soup repeats every shared corner, so
//! both strategies merge vertices that agree within a small tolerance.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use log::{trace, warn};

use crate::foundation::math::{Transform, Vec3};
use crate::geometry::Mesh;
use super::error::PhysicsError;
use super::support::{furthest_point_in, ConvexHull, SupportMap};

/// Default tolerance used to merge near-coincident vertices
pub const DEFAULT_MERGE_EPSILON: f32 = 1.0e-5;

/// Tolerance used by the affine-independence check
const DEGENERACY_EPSILON: f32 = 1.0e-6;

/// Ordering key that treats coordinates within `epsilon` as equal
///
/// Compares x, then y, then z. Two points whose coordinates all agree within
/// `epsilon` compare `Equal`, which is what lets a `BTreeSet` collapse seam
/// duplicates.
#[derive(Debug, Clone, Copy)]
struct VertexKey {
    vertex: Vec3,
    epsilon: f32,
}

impl VertexKey {
    fn axis_cmp(a: f32, b: f32, epsilon: f32) -> Ordering {
        if (a - b).abs() <= epsilon {
            Ordering::Equal
        } else if a < b {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

impl Ord for VertexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let eps = self.epsilon.max(other.epsilon);
        Self::axis_cmp(self.vertex.x, other.vertex.x, eps)
            .then_with(|| Self::axis_cmp(self.vertex.y, other.vertex.y, eps))
            .then_with(|| Self::axis_cmp(self.vertex.z, other.vertex.z, eps))
    }
}

impl PartialOrd for VertexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VertexKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VertexKey {}

/// Deduplicated convex-hull vertices of a mesh, in MODEL SPACE
///
/// Vertices keep the order in which they were first seen; support queries
/// break ties by that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitBox {
    vertices: Vec<Vec3>,
}

impl HitBox {
    /// Build a hitbox with the default merge tolerance
    ///
    /// `use_simple_box` selects the 8-corner bounding box over the
    /// detailed vertex hull.
    pub fn new(mesh: &Mesh, use_simple_box: bool) -> Result<Self, PhysicsError> {
        Self::with_tolerance(mesh, use_simple_box, DEFAULT_MERGE_EPSILON)
    }

    /// Build a hitbox with an explicit merge tolerance
    pub fn with_tolerance(
        mesh: &Mesh,
        use_simple_box: bool,
        merge_epsilon: f32,
    ) -> Result<Self, PhysicsError> {
        let hitbox = if use_simple_box {
            Self::generate_simple(mesh, merge_epsilon)?
        } else {
            Self::generate_detailed(mesh, merge_epsilon)?
        };

        if hitbox.is_degenerate() {
            warn!(
                "Hitbox with {} vertices has no volume; collisions against it will be missed",
                hitbox.len()
            );
        }
        Ok(hitbox)
    }

    /// The 8 corners of the mesh's axis-aligned bounding box
    ///
    /// Flat meshes produce coincident corners, which are merged.
    pub fn generate_simple(mesh: &Mesh, merge_epsilon: f32) -> Result<Self, PhysicsError> {
        let mut vertices = mesh.vertices();
        let first = vertices.next().ok_or(PhysicsError::EmptyMesh)?;

        let (min, max) = vertices.fold((first, first), |(min, max), v| {
            (min.inf(&v), max.sup(&v))
        });

        let corners = (0..8).map(|i| {
            Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        });

        let hitbox = Self::from_points(corners, merge_epsilon);
        trace!("Simple hitbox: {} corners", hitbox.len());
        Ok(hitbox)
    }

    /// Every unique mesh vertex
    pub fn generate_detailed(mesh: &Mesh, merge_epsilon: f32) -> Result<Self, PhysicsError> {
        if mesh.is_empty() {
            return Err(PhysicsError::EmptyMesh);
        }

        let hitbox = Self::from_points(mesh.vertices(), merge_epsilon);
        trace!(
            "Detailed hitbox: {} unique of {} mesh vertices",
            hitbox.len(),
            mesh.triangle_count() * 3
        );
        Ok(hitbox)
    }

    /// Deduplicate `points`, keeping first-seen order
    pub fn from_points(points: impl IntoIterator<Item = Vec3>, merge_epsilon: f32) -> Self {
        let mut seen = BTreeSet::new();
        let vertices = points
            .into_iter()
            .filter(|&vertex| seen.insert(VertexKey { vertex, epsilon: merge_epsilon }))
            .collect();
        Self { vertices }
    }

    /// Hitbox vertices in model space
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Iterate over the vertices
    pub fn iter(&self) -> std::slice::Iter<'_, Vec3> {
        self.vertices.iter()
    }

    /// Number of vertices
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True when the hitbox holds no vertices (body without a mesh)
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Place the hitbox in the world with `transform`
    pub fn to_world(&self, transform: &Transform) -> ConvexHull {
        ConvexHull::new(
            self.vertices.iter().map(|v| transform.transform_point(v)).collect(),
        )
    }

    /// True when the vertices do not span a volume
    ///
    /// GJK needs four affinely independent points to build a tetrahedron
    /// around the origin; flat, linear and point hitboxes can never provide
    /// one.
    pub fn is_degenerate(&self) -> bool {
        let Some(&p0) = self.vertices.first() else {
            return true;
        };

        let farthest = |score: &dyn Fn(&Vec3) -> f32| {
            self.vertices
                .iter()
                .map(|v| (score(v), *v))
                .fold((0.0f32, p0), |best, cur| if cur.0 > best.0 { cur } else { best })
        };

        let (d1, p1) = farthest(&|v: &Vec3| (v - p0).norm());
        if d1 <= DEGENERACY_EPSILON {
            return true;
        }
        let e1 = p1 - p0;

        let (d2, p2) = farthest(&|v: &Vec3| e1.cross(&(v - p0)).norm());
        if d2 <= DEGENERACY_EPSILON * d1 {
            return true;
        }
        let normal = e1.cross(&(p2 - p0));

        let (d3, _) = farthest(&|v: &Vec3| normal.dot(&(v - p0)).abs());
        d3 <= DEGENERACY_EPSILON * d2
    }
}

impl SupportMap for HitBox {
    fn furthest_point(&self, direction: &Vec3) -> Vec3 {
        furthest_point_in(&self.vertices, direction)
    }
}

impl<'a> IntoIterator for &'a HitBox {
    type Item = &'a Vec3;
    type IntoIter = std::slice::Iter<'a, Vec3>;

    fn into_iter(self) -> Self::IntoIter {
        self.vertices.iter()
    }
}
