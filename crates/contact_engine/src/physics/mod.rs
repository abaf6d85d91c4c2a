//! Narrow-phase collision detection and response for convex rigid bodies
//!
//! Hitboxes are compared with GJK in Minkowski-difference space. When GJK
//! encloses the origin, EPA expands its final tetrahedron into the
//! penetration normal and depth, which [`RigidBody::solve_collision`] turns
//! into a positional correction and velocity response.

pub mod contact;
pub mod epa;
pub mod error;
pub mod gjk;
pub mod hitbox;
pub mod rigid_body;
pub mod simplex;
pub mod support;
pub mod world;

#[cfg(test)]
mod tests;

pub use contact::{CollisionPoint, ContactPartner};
pub use epa::{EpaOutcome, FaceNormal};
pub use error::PhysicsError;
pub use gjk::{GjkOutcome, NextSimplex};
pub use hitbox::HitBox;
pub use rigid_body::{BodyFlags, CollisionCallback, ObjectTag, RigidBody};
pub use simplex::Simplex;
pub use support::{ConvexHull, SupportMap, SupportPoint};
pub use world::{BodyHandle, CollisionPair, DetectedContact, PhysicsWorld};
