//! Contact data passed from detection to resolution

use crate::foundation::math::{try_normalize, Vec3};
use super::rigid_body::ObjectTag;
use super::simplex::Simplex;
use super::world::BodyHandle;

/// Penetration of body A into body B
///
/// `normal` is a world-space unit vector pointing from A toward B; moving A
/// by `-normal * depth` separates the two hulls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPoint {
    /// Unit contact normal pointing from A toward B
    pub normal: Vec3,
    /// Penetration depth, never negative
    pub depth: f32,
    /// Deepest point of A inside B, world space
    pub point_on_a: Vec3,
    /// Deepest point of B inside A, world space
    pub point_on_b: Vec3,
}

impl CollisionPoint {
    /// The same contact seen from B
    pub fn reversed(&self) -> Self {
        Self {
            normal: -self.normal,
            depth: self.depth,
            point_on_a: self.point_on_b,
            point_on_b: self.point_on_a,
        }
    }

    /// Zero-depth contact used when EPA has nothing to expand
    ///
    /// Takes its normal from the newest simplex point when possible.
    pub(crate) fn degenerate(simplex: &Simplex) -> Self {
        let newest = simplex.iter().next().copied().unwrap_or_default();
        Self {
            normal: try_normalize(&newest.point).unwrap_or_else(Vec3::x),
            depth: 0.0,
            point_on_a: newest.on_a,
            point_on_b: newest.on_b,
        }
    }
}

/// What a body needs to know about the other side of a contact
#[derive(Debug, Clone, PartialEq)]
pub struct ContactPartner {
    /// Handle of the other body
    pub handle: BodyHandle,
    /// Tag of the other body
    pub tag: ObjectTag,
    /// Whether the other body is a trigger
    pub is_trigger: bool,
    /// Whether the other body pushes back
    pub is_collider: bool,
    /// Fraction of the positional correction this body takes on
    pub share: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::support::SupportPoint;

    #[test]
    fn test_reversed_swaps_sides() {
        let contact = CollisionPoint {
            normal: Vec3::x(),
            depth: 0.25,
            point_on_a: Vec3::new(0.5, 0.0, 0.0),
            point_on_b: Vec3::new(0.25, 0.0, 0.0),
        };
        let reversed = contact.reversed();
        assert_eq!(reversed.normal, -Vec3::x());
        assert_eq!(reversed.depth, 0.25);
        assert_eq!(reversed.point_on_a, contact.point_on_b);
        assert_eq!(reversed.reversed(), contact);
    }

    #[test]
    fn test_degenerate_contact_is_zero_depth() {
        let empty = CollisionPoint::degenerate(&Simplex::new());
        assert_eq!(empty.depth, 0.0);
        assert_eq!(empty.normal, Vec3::x());

        let simplex = Simplex::from_points(&[SupportPoint::new(Vec3::new(0.0, 2.0, 0.0), Vec3::zeros())]);
        assert_eq!(CollisionPoint::degenerate(&simplex).normal, Vec3::y());
    }
}
