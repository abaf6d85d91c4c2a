//! Mesh geometry consumed by the collision core
//!
//! - [`triangle`] - Triangle primitive with normals and barycentric coordinates
//! - [`mesh`] - Model-space triangle meshes, the input to hitbox construction

pub mod triangle;
pub mod mesh;

pub use triangle::Triangle;
pub use mesh::{Mesh, GeometryError};
