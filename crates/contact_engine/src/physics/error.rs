//! Physics error types

use crate::geometry::GeometryError;
use thiserror::Error;

/// Errors raised while building or addressing physics objects
///
/// Collision queries themselves never fail; these only cover construction
/// and handle lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhysicsError {
    /// A hitbox cannot be built from a mesh with no triangles
    #[error("cannot build a hitbox from an empty mesh")]
    EmptyMesh,

    /// The source mesh could not be assembled
    #[error("invalid mesh: {0}")]
    Geometry(#[from] GeometryError),

    /// The body behind a handle has been removed from the world
    #[error("rigid body handle is no longer valid")]
    StaleHandle,
}
