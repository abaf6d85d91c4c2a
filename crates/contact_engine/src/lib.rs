//! # Contact Engine
//!
//! Narrow-phase collision detection and simple contact response for convex
//! rigid bodies.
//!
//! ## Features
//!
//! - **Hitboxes**: 8-corner bounding boxes or deduplicated vertex hulls built from meshes
//! - **GJK**: boolean intersection with a reusable terminal simplex
//! - **EPA**: penetration normal, depth and contact points on both bodies
//! - **Response**: positional correction, velocity removal or reflection, callbacks
//! - **World**: generational body handles and per-frame entered/exited tracking
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contact_engine::prelude::*;
//!
//! fn main() -> Result<(), PhysicsError> {
//!     let mut world = PhysicsWorld::new(PhysicsConfig::default());
//!
//!     let ground = world.create_body("ground", Mesh::cuboid(Vec3::new(5.0, 0.5, 5.0)))?;
//!     let player = world.create_body("player", Mesh::cube(1.0))?;
//!
//!     let body = world.body_mut(player)?;
//!     body.set_collision(true);
//!     body.transform_mut().position = Vec3::new(0.0, 2.0, 0.0);
//!     body.set_acceleration(Vec3::new(0.0, -9.81, 0.0));
//!     body.set_collision_callback(|tag, _| log::info!("player hit {}", tag));
//!
//!     for frame in 0..120 {
//!         world.step(&FrameContext::fixed(1.0 / 60.0, frame));
//!     }
//!     assert!(world.contains(ground));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod geometry;
pub mod physics;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PhysicsConfig},
        foundation::{
            math::{Quat, Transform, Vec3},
            time::FrameContext,
        },
        geometry::{Mesh, Triangle},
        physics::{
            BodyFlags, BodyHandle, CollisionPair, CollisionPoint, HitBox, ObjectTag,
            PhysicsError, PhysicsWorld, RigidBody,
        },
    };
}
