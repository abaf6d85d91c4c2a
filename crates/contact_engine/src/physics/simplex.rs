//! Bounded point set used as GJK search state

use std::ops::Index;

use super::support::SupportPoint;
use crate::foundation::math::Vec3;

/// Maximum number of points a simplex can hold (a tetrahedron)
pub const MAX_SIMPLEX_POINTS: usize = 4;

/// Up to four Minkowski-difference points, newest first
///
/// `push_front` is the only way to grow the simplex; index 0 is always the
/// most recently added point. Pushing onto a full simplex drops the oldest
/// point, so the size never exceeds [`MAX_SIMPLEX_POINTS`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Simplex {
    points: [SupportPoint; MAX_SIMPLEX_POINTS],
    len: usize,
}

impl Simplex {
    /// An empty simplex
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from points given newest first; extra points beyond four are ignored
    pub fn from_points(points: &[SupportPoint]) -> Self {
        let mut simplex = Self::new();
        for (slot, point) in simplex.points.iter_mut().zip(points) {
            *slot = *point;
        }
        simplex.len = points.len().min(MAX_SIMPLEX_POINTS);
        simplex
    }

    /// Insert `point` as the newest point
    pub fn push_front(&mut self, point: SupportPoint) {
        self.points.copy_within(0..MAX_SIMPLEX_POINTS - 1, 1);
        self.points[0] = point;
        self.len = (self.len + 1).min(MAX_SIMPLEX_POINTS);
    }

    /// Number of points, always within `0..=4`
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the simplex holds no points
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True once the simplex is a tetrahedron
    pub fn is_tetrahedron(&self) -> bool {
        self.len == MAX_SIMPLEX_POINTS
    }

    /// The stored points, newest first
    pub fn points(&self) -> &[SupportPoint] {
        &self.points[..self.len]
    }

    /// The Minkowski-space positions, newest first
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.points().iter().map(|p| p.point)
    }

    /// Iterate over the stored points, newest first
    pub fn iter(&self) -> std::slice::Iter<'_, SupportPoint> {
        self.points().iter()
    }
}

impl Index<usize> for Simplex {
    type Output = SupportPoint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points()[index]
    }
}

impl<'a> IntoIterator for &'a Simplex {
    type Item = &'a SupportPoint;
    type IntoIter = std::slice::Iter<'a, SupportPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
