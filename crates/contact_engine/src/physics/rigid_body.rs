//! Rigid bodies: mesh, hitbox, motion state and collision response
//!
//! A body owns its mesh and the hitbox derived from it. Collision queries
//! place both hitboxes in world space once per call, so a single check sees
//! frozen transforms even if the caller moves bodies between checks.

use std::fmt;

use bitflags::bitflags;
use log::{debug, trace};

use crate::config::PhysicsConfig;
use crate::foundation::math::{Transform, Vec3};
use crate::foundation::time::FrameContext;
use crate::geometry::Mesh;
use super::contact::{CollisionPoint, ContactPartner};
use super::epa::{self, EpaOutcome};
use super::error::PhysicsError;
use super::gjk;
use super::hitbox::HitBox;
use super::simplex::Simplex;
use super::support::ConvexHull;
use super::world::BodyHandle;

/// Name a body is addressed by in callbacks and logs
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectTag(String);

impl ObjectTag {
    /// Tag with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The tag as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ObjectTag {
    fn from(name: String) -> Self {
        Self(name)
    }
}

bitflags! {
    /// Collision behaviour of a body
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BodyFlags: u8 {
        /// The body actively looks for contacts and is pushed out of them
        const HAS_COLLISION = 1;
        /// Other bodies are pushed out of this one
        const COLLIDER = 1 << 1;
        /// Contacts only fire callbacks, nobody moves
        const TRIGGER = 1 << 2;
        /// Set while the body is part of a resolved contact this frame
        const IN_COLLISION = 1 << 3;
    }
}

impl Default for BodyFlags {
    fn default() -> Self {
        BodyFlags::COLLIDER
    }
}

/// Invoked with the partner's tag and handle whenever a contact is resolved
pub type CollisionCallback = Box<dyn FnMut(&ObjectTag, BodyHandle) + Send + Sync>;

/// A convex body taking part in collision detection and response
pub struct RigidBody {
    tag: ObjectTag,
    mesh: Mesh,
    hitbox: HitBox,
    transform: Transform,
    velocity: Vec3,
    acceleration: Vec3,
    flags: BodyFlags,
    collision_normal: Vec3,
    config: PhysicsConfig,
    callback: Option<CollisionCallback>,
}

impl fmt::Debug for RigidBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RigidBody")
            .field("tag", &self.tag)
            .field("hitbox_vertices", &self.hitbox.len())
            .field("position", &self.transform.position)
            .field("velocity", &self.velocity)
            .field("acceleration", &self.acceleration)
            .field("flags", &self.flags)
            .field("collision_normal", &self.collision_normal)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

impl RigidBody {
    /// Build a body from a mesh using the default physics configuration
    pub fn new(tag: impl Into<ObjectTag>, mesh: Mesh) -> Result<Self, PhysicsError> {
        Self::with_config(tag, mesh, PhysicsConfig::default())
    }

    /// Build a body from a mesh; the hitbox strategy and merge tolerance come from `config`
    pub fn with_config(
        tag: impl Into<ObjectTag>,
        mesh: Mesh,
        config: PhysicsConfig,
    ) -> Result<Self, PhysicsError> {
        let hitbox =
            HitBox::with_tolerance(&mesh, config.use_simple_hitbox, config.vertex_merge_epsilon)?;
        let mut body = Self::empty(tag);
        body.mesh = mesh;
        body.hitbox = hitbox;
        body.config = config;
        Ok(body)
    }

    /// A body without geometry; it never reports a collision until a mesh is set
    pub fn empty(tag: impl Into<ObjectTag>) -> Self {
        Self {
            tag: tag.into(),
            mesh: Mesh::default(),
            hitbox: HitBox::default(),
            transform: Transform::identity(),
            velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
            flags: BodyFlags::default(),
            collision_normal: Vec3::zeros(),
            config: PhysicsConfig::default(),
            callback: None,
        }
    }

    /// Builder-style position setter
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Builder-style flag setter
    pub fn with_flags(mut self, flags: BodyFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Hitbox vertices placed with the current transform
    pub fn world_hull(&self) -> ConvexHull {
        self.hitbox.to_world(&self.transform)
    }

    /// Run GJK against `other`
    ///
    /// Returns whether the hulls intersect, and the final simplex, which is
    /// the tetrahedron EPA starts from when they do.
    pub fn check_gjk_collision(&self, other: &RigidBody) -> (bool, Simplex) {
        if self.hitbox.is_empty() || other.hitbox.is_empty() {
            return (false, Simplex::new());
        }

        let a = self.world_hull();
        let b = other.world_hull();
        let direction = other.position() - self.position();
        let outcome = gjk::intersect(&a, &b, &direction, self.config.gjk_max_iterations);
        trace!(
            "GJK {} vs {}: {} after {} iterations",
            self.tag,
            other.tag,
            outcome.intersecting,
            outcome.iterations
        );
        (outcome.intersecting, outcome.simplex)
    }

    /// Penetration of this body into `other`, from a simplex GJK reported as intersecting
    pub fn epa(&self, simplex: &Simplex, other: &RigidBody) -> CollisionPoint {
        self.epa_outcome(simplex, other).collision
    }

    /// [`RigidBody::epa`] with iteration diagnostics
    pub fn epa_outcome(&self, simplex: &Simplex, other: &RigidBody) -> EpaOutcome {
        let a = self.world_hull();
        let b = other.world_hull();
        epa::expand(
            simplex,
            &a,
            &b,
            self.config.epa_max_iterations,
            self.config.epa_tolerance,
        )
    }

    /// GJK followed by EPA; `None` when the bodies do not touch
    pub fn collide(&self, other: &RigidBody) -> Option<CollisionPoint> {
        let (intersecting, simplex) = self.check_gjk_collision(other);
        intersecting.then(|| self.epa(&simplex, other))
    }

    /// Respond to a contact in which this body plays the role of A
    ///
    /// Trigger and non-collider contacts only fire the callback. Otherwise
    /// the body is pushed back along the contact normal by its share of the
    /// penetration, loses (or reflects) the velocity driving it into the
    /// partner, and is marked as in collision before the callback fires.
    pub fn solve_collision(&mut self, collision: &CollisionPoint, partner: &ContactPartner) {
        if self.is_trigger() || partner.is_trigger || !self.is_collider() || !partner.is_collider {
            debug!("{} touched {} (no response)", self.tag, partner.tag);
            self.notify_collision(partner);
            return;
        }

        let normal = collision.normal;
        if partner.share > 0.0 {
            let correction = (collision.depth + self.config.penetration_slop) * partner.share;
            self.translate(&(-normal * correction));

            let approaching = self.velocity.dot(&normal);
            if approaching > 0.0 {
                self.velocity -= normal * (approaching * (1.0 + self.config.restitution));
            }
        }

        self.flags.insert(BodyFlags::IN_COLLISION);
        self.collision_normal = normal;
        debug!(
            "{} resolved against {}: depth {:.4}, normal {:?}",
            self.tag, partner.tag, collision.depth, normal
        );
        self.notify_collision(partner);
    }

    /// Fire the collision callback, if any
    pub fn notify_collision(&mut self, partner: &ContactPartner) {
        if let Some(callback) = self.callback.as_mut() {
            callback(&partner.tag, partner.handle);
        }
    }

    /// Advance one frame with semi-implicit Euler
    pub fn update_physics_state(&mut self, frame: &FrameContext) {
        self.velocity += self.acceleration * frame.delta_time;
        let delta = self.velocity * frame.delta_time;
        self.translate(&delta);
    }

    /// Install the closure fired once per contact with the partner's tag and handle
    pub fn set_collision_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&ObjectTag, BodyHandle) + Send + Sync + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Remove the collision callback, if any
    pub fn clear_collision_callback(&mut self) {
        self.callback = None;
    }

    /// Whether a collision callback is installed
    pub fn has_collision_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Replace the mesh and rebuild the hitbox; the body is unchanged on error
    pub fn set_mesh(&mut self, mesh: Mesh) -> Result<(), PhysicsError> {
        self.hitbox = HitBox::with_tolerance(
            &mesh,
            self.config.use_simple_hitbox,
            self.config.vertex_merge_epsilon,
        )?;
        self.mesh = mesh;
        Ok(())
    }

    /// Name of this body
    pub fn tag(&self) -> &ObjectTag {
        &self.tag
    }

    /// Mesh the hitbox was built from
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Local-space collision hull
    pub fn hitbox(&self) -> &HitBox {
        &self.hitbox
    }

    /// Tunables this body was created with
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Current collision flags
    pub fn flags(&self) -> BodyFlags {
        self.flags
    }

    /// World placement of the body
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable world placement
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// World-space position
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Move the body by `delta` in world space
    pub fn translate(&mut self, delta: &Vec3) {
        self.transform.translate(delta);
    }

    /// Whether contacts move this body
    pub fn has_collision(&self) -> bool {
        self.flags.contains(BodyFlags::HAS_COLLISION)
    }

    /// Whether a solid contact was resolved for this body this frame
    pub fn in_collision(&self) -> bool {
        self.flags.contains(BodyFlags::IN_COLLISION)
    }

    /// Whether this body pushes others it touches
    pub fn is_collider(&self) -> bool {
        self.flags.contains(BodyFlags::COLLIDER)
    }

    /// Whether contacts with this body only notify
    pub fn is_trigger(&self) -> bool {
        self.flags.contains(BodyFlags::TRIGGER)
    }

    /// Normal of the last resolved contact, pointing away from this body
    pub fn collision_normal(&self) -> Vec3 {
        self.collision_normal
    }

    /// Enable or disable collision response for this body
    pub fn set_collision(&mut self, enabled: bool) {
        self.flags.set(BodyFlags::HAS_COLLISION, enabled);
    }

    /// Set or clear the per-frame contact marker
    pub fn set_in_collision(&mut self, in_collision: bool) {
        self.flags.set(BodyFlags::IN_COLLISION, in_collision);
    }

    /// Choose whether this body pushes others
    pub fn set_collider(&mut self, collider: bool) {
        self.flags.set(BodyFlags::COLLIDER, collider);
    }

    /// Turn the body into a notify-only trigger, or back
    pub fn set_trigger(&mut self, trigger: bool) {
        self.flags.set(BodyFlags::TRIGGER, trigger);
    }

    /// Linear velocity in units per second
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Replace the linear velocity
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Add to the linear velocity
    pub fn add_velocity(&mut self, velocity: Vec3) {
        self.velocity += velocity;
    }

    /// Constant acceleration applied every step
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// Replace the constant acceleration
    pub fn set_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration = acceleration;
    }
}
