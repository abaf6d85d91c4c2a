//! Body storage and the per-frame collision pipeline
//!
//! Each [`PhysicsWorld::step`] runs three phases:
//! 1. integrate every body's motion
//! 2. detect contacts between candidate pairs (read-only, optionally parallel)
//! 3. resolve the contacts one after another in pair order
//!
//! Pairs colliding this frame are compared against the previous frame to
//! report collisions that started or ended.

use std::collections::HashSet;

use log::{debug, trace};
use slotmap::SlotMap;

use crate::config::PhysicsConfig;
use crate::foundation::time::FrameContext;
use crate::geometry::Mesh;
use super::contact::{CollisionPoint, ContactPartner};
use super::error::PhysicsError;
use super::rigid_body::{ObjectTag, RigidBody};

slotmap::new_key_type! {
    /// Generational handle to a body owned by a [`PhysicsWorld`]
    pub struct BodyHandle;
}

/// Unordered pair of bodies, stored with the smaller handle first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    /// The smaller handle
    pub body_a: BodyHandle,
    /// The larger handle
    pub body_b: BodyHandle,
}

impl CollisionPair {
    /// Pair of `body_a` and `body_b` in either order
    pub fn new(body_a: BodyHandle, body_b: BodyHandle) -> Self {
        if body_a <= body_b {
            Self { body_a, body_b }
        } else {
            Self { body_a: body_b, body_b: body_a }
        }
    }

    /// Whether `handle` is one side of the pair
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.body_a == handle || self.body_b == handle
    }
}

/// A contact found during detection, seen from `pair.body_a`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedContact {
    /// The two bodies in contact
    pub pair: CollisionPair,
    /// Penetration of `pair.body_a` into `pair.body_b`
    pub contact: CollisionPoint,
}

/// Owns rigid bodies and steps them
#[derive(Debug, Default)]
pub struct PhysicsWorld {
    bodies: SlotMap<BodyHandle, RigidBody>,
    config: PhysicsConfig,
    current_pairs: HashSet<CollisionPair>,
    previous_pairs: HashSet<CollisionPair>,
}

impl PhysicsWorld {
    /// Empty world whose bodies are built with `config`
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Configuration handed to bodies created through [`PhysicsWorld::create_body`]
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Build a body from `mesh` with the world's configuration and insert it
    pub fn create_body(
        &mut self,
        tag: impl Into<ObjectTag>,
        mesh: Mesh,
    ) -> Result<BodyHandle, PhysicsError> {
        let body = RigidBody::with_config(tag, mesh, self.config.clone())?;
        Ok(self.add_body(body))
    }

    /// Insert an already built body
    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        let tag = body.tag().clone();
        let handle = self.bodies.insert(body);
        debug!("Added body {} as {:?}", tag, handle);
        handle
    }

    /// Remove a body; its handle goes stale immediately
    ///
    /// Pairs it was part of are reported as exited after the next step.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let body = self.bodies.remove(handle)?;
        debug!("Removed body {}", body.tag());
        Some(body)
    }

    /// Body behind `handle`, `None` once it was removed
    pub fn get(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// Mutable body behind `handle`, `None` once it was removed
    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /// Like [`PhysicsWorld::get`], but reports a stale handle as an error
    pub fn body(&self, handle: BodyHandle) -> Result<&RigidBody, PhysicsError> {
        self.bodies.get(handle).ok_or(PhysicsError::StaleHandle)
    }

    /// Like [`PhysicsWorld::get_mut`], but reports a stale handle as an error
    pub fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        self.bodies.get_mut(handle).ok_or(PhysicsError::StaleHandle)
    }

    /// Whether `handle` still refers to a body
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    /// First body carrying `tag`
    pub fn find(&self, tag: &ObjectTag) -> Option<BodyHandle> {
        self.bodies
            .iter()
            .find(|(_, body)| body.tag() == tag)
            .map(|(handle, _)| handle)
    }

    /// Number of bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// True when the world holds no bodies
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Every body with its handle, in storage order
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies.iter()
    }

    /// Advance the world by one frame and return the contacts that were resolved
    pub fn step(&mut self, frame: &FrameContext) -> Vec<DetectedContact> {
        self.integrate(frame);
        let contacts = self.detect_collisions();
        self.resolve_collisions(&contacts);
        trace!(
            "Frame {}: {} bodies, {} contacts",
            frame.frame,
            self.bodies.len(),
            contacts.len()
        );
        contacts
    }

    /// Clear last frame's contact state and move every body
    pub fn integrate(&mut self, frame: &FrameContext) {
        for body in self.bodies.values_mut() {
            body.set_in_collision(false);
            body.update_physics_state(frame);
        }
    }

    /// Pairs worth testing: one side looks for contacts, the other can be hit
    pub fn candidate_pairs(&self) -> Vec<CollisionPair> {
        let bodies: Vec<(BodyHandle, &RigidBody)> = self.bodies.iter().collect();
        let mut pairs = Vec::new();

        for (i, (handle_a, a)) in bodies.iter().enumerate() {
            for (handle_b, b) in &bodies[i + 1..] {
                if Self::should_check(a, b) || Self::should_check(b, a) {
                    pairs.push(CollisionPair::new(*handle_a, *handle_b));
                }
            }
        }
        pairs
    }

    fn should_check(seeker: &RigidBody, target: &RigidBody) -> bool {
        seeker.has_collision() && (target.is_collider() || target.is_trigger())
    }

    /// Run GJK and EPA over every candidate pair
    ///
    /// Only reads the world. With the `parallel` feature the pairs are
    /// spread across the rayon thread pool; the result is sorted by pair
    /// either way.
    pub fn detect_collisions(&self) -> Vec<DetectedContact> {
        let pairs = self.candidate_pairs();

        #[cfg(feature = "parallel")]
        let mut contacts: Vec<DetectedContact> = {
            use rayon::prelude::*;
            pairs
                .par_iter()
                .filter_map(|pair| self.narrow_phase(*pair))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let mut contacts: Vec<DetectedContact> = pairs
            .iter()
            .filter_map(|pair| self.narrow_phase(*pair))
            .collect();

        contacts.sort_by_key(|contact| contact.pair);
        contacts
    }

    fn narrow_phase(&self, pair: CollisionPair) -> Option<DetectedContact> {
        let a = self.bodies.get(pair.body_a)?;
        let b = self.bodies.get(pair.body_b)?;
        a.collide(b).map(|contact| DetectedContact { pair, contact })
    }

    /// Apply contacts in order and update the entered/exited bookkeeping
    ///
    /// Bodies without `has_collision` are notified but never moved. When
    /// both bodies move, each takes half of the positional correction.
    pub fn resolve_collisions(&mut self, contacts: &[DetectedContact]) {
        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
        self.current_pairs.clear();

        for detected in contacts {
            let pair = detected.pair;
            let (Some(a), Some(b)) = (self.bodies.get(pair.body_a), self.bodies.get(pair.body_b))
            else {
                continue;
            };

            let moves_a = a.has_collision();
            let moves_b = b.has_collision();
            let share = |moves: bool, other_moves: bool| match (moves, other_moves) {
                (false, _) => 0.0,
                (true, true) => 0.5,
                (true, false) => 1.0,
            };

            let partner_of_a = ContactPartner {
                handle: pair.body_b,
                tag: b.tag().clone(),
                is_trigger: b.is_trigger(),
                is_collider: b.is_collider(),
                share: share(moves_a, moves_b),
            };
            let partner_of_b = ContactPartner {
                handle: pair.body_a,
                tag: a.tag().clone(),
                is_trigger: a.is_trigger(),
                is_collider: a.is_collider(),
                share: share(moves_b, moves_a),
            };

            if let Some(a) = self.bodies.get_mut(pair.body_a) {
                a.solve_collision(&detected.contact, &partner_of_a);
            }
            if let Some(b) = self.bodies.get_mut(pair.body_b) {
                b.solve_collision(&detected.contact.reversed(), &partner_of_b);
            }
            self.current_pairs.insert(pair);
        }
    }

    /// Pairs touching this frame that were apart the frame before
    pub fn collision_entered(&self) -> Vec<CollisionPair> {
        let mut pairs: Vec<_> = self
            .current_pairs
            .difference(&self.previous_pairs)
            .copied()
            .collect();
        pairs.sort();
        pairs
    }

    /// Pairs that touched the frame before but no longer do
    pub fn collision_exited(&self) -> Vec<CollisionPair> {
        let mut pairs: Vec<_> = self
            .previous_pairs
            .difference(&self.current_pairs)
            .copied()
            .collect();
        pairs.sort();
        pairs
    }

    /// Pairs in contact during the last step
    pub fn current_collisions(&self) -> &HashSet<CollisionPair> {
        &self.current_pairs
    }

    /// Remove every body and forget all contacts
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.current_pairs.clear();
        self.previous_pairs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    fn moving_cube(world: &mut PhysicsWorld, tag: &str, position: Vec3) -> BodyHandle {
        let handle = world.create_body(tag, Mesh::cube(1.0)).unwrap();
        let body = world.get_mut(handle).unwrap();
        body.transform_mut().position = position;
        body.set_collision(true);
        handle
    }

    #[test]
    fn test_stale_handles() {
        let mut world = PhysicsWorld::default();
        let handle = world.create_body("a", Mesh::cube(1.0)).unwrap();
        assert!(world.contains(handle));
        assert_eq!(world.find(&ObjectTag::new("a")), Some(handle));

        assert!(world.remove_body(handle).is_some());
        assert!(!world.contains(handle));
        assert!(world.get(handle).is_none());
        assert!(world.remove_body(handle).is_none());
        assert_eq!(world.body(handle).unwrap_err(), PhysicsError::StaleHandle);

        // A new body reusing the slot does not revive the old handle
        let fresh = world.create_body("b", Mesh::cube(1.0)).unwrap();
        assert_ne!(fresh, handle);
        assert!(world.get(handle).is_none());
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let mut world = PhysicsWorld::default();
        assert_eq!(
            world.create_body("void", Mesh::default()).unwrap_err(),
            PhysicsError::EmptyMesh
        );
        assert!(world.is_empty());
    }

    #[test]
    fn test_pair_ordering() {
        let mut world = PhysicsWorld::default();
        let a = world.create_body("a", Mesh::cube(1.0)).unwrap();
        let b = world.create_body("b", Mesh::cube(1.0)).unwrap();
        assert_eq!(CollisionPair::new(a, b), CollisionPair::new(b, a));
        assert!(CollisionPair::new(b, a).contains(a));
    }

    #[test]
    fn test_static_bodies_are_not_paired() {
        let mut world = PhysicsWorld::default();
        world.create_body("wall", Mesh::cube(1.0)).unwrap();
        world.create_body("floor", Mesh::cube(1.0)).unwrap();
        assert!(world.candidate_pairs().is_empty());
        assert!(world.step(&FrameContext::fixed(0.016, 0)).is_empty());
    }

    #[test]
    fn test_non_collider_static_body_is_ignored() {
        let mut world = PhysicsWorld::default();
        moving_cube(&mut world, "mover", Vec3::zeros());
        let decoration = world.create_body("decoration", Mesh::cube(1.0)).unwrap();
        world.get_mut(decoration).unwrap().set_collider(false);
        assert!(world.candidate_pairs().is_empty());
    }

    #[test]
    fn test_entered_and_exited() {
        let mut world = PhysicsWorld::default();
        let a = moving_cube(&mut world, "a", Vec3::zeros());
        let zone = world.create_body("zone", Mesh::cube(1.0)).unwrap();
        {
            let zone = world.get_mut(zone).unwrap();
            zone.set_trigger(true);
            zone.transform_mut().position = Vec3::new(2.8, 0.0, 0.0);
        }
        world.get_mut(a).unwrap().set_velocity(Vec3::new(1.0, 0.0, 0.0));

        let frame = |n| FrameContext::fixed(1.0, n);
        let pair = CollisionPair::new(a, zone);

        world.step(&frame(0)); // x = 1
        assert!(world.collision_entered().is_empty());

        world.step(&frame(1)); // x = 2, overlapping
        assert_eq!(world.collision_entered(), vec![pair]);
        assert!(world.current_collisions().contains(&pair));

        world.step(&frame(2)); // x = 3, still overlapping
        assert!(world.collision_entered().is_empty());
        assert!(world.collision_exited().is_empty());

        world.get_mut(a).unwrap().set_velocity(Vec3::new(5.0, 0.0, 0.0));
        world.step(&frame(3)); // x = 8
        assert_eq!(world.collision_exited(), vec![pair]);
    }

    #[test]
    fn test_two_moving_bodies_share_correction() {
        let mut world = PhysicsWorld::default();
        let a = moving_cube(&mut world, "a", Vec3::zeros());
        let b = moving_cube(&mut world, "b", Vec3::new(0.5, 0.0, 0.0));

        let contacts = world.step(&FrameContext::fixed(0.0, 0));
        assert_eq!(contacts.len(), 1);

        let xa = world.get(a).unwrap().position().x;
        let xb = world.get(b).unwrap().position().x;
        approx::assert_relative_eq!(xa, -(0.5 + 1e-3) * 0.5, epsilon = 1e-3);
        approx::assert_relative_eq!(xb, 0.5 + (0.5 + 1e-3) * 0.5, epsilon = 1e-3);
        assert!(world.get(a).unwrap().in_collision());
        assert!(world.get(b).unwrap().in_collision());
    }

    #[test]
    fn test_in_collision_clears_next_frame() {
        let mut world = PhysicsWorld::default();
        let a = moving_cube(&mut world, "a", Vec3::zeros());
        world.create_body("wall", Mesh::cube(1.0)).unwrap();
        let wall = world.find(&ObjectTag::new("wall")).unwrap();
        world.get_mut(wall).unwrap().transform_mut().position = Vec3::new(0.5, 0.0, 0.0);

        world.step(&FrameContext::fixed(0.0, 0));
        assert!(world.get(a).unwrap().in_collision());

        world.step(&FrameContext::fixed(0.0, 1));
        assert!(!world.get(a).unwrap().in_collision());
    }
}
