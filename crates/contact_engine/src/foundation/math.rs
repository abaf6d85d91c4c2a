//! Math utilities and types
//!
//! Vector and transform types shared by the geometry and physics modules.

pub use nalgebra::{Quaternion, Unit, Vector3};

/// 3D vector type
///
/// Used for world-space positions and for points in Minkowski-difference
/// space alike; callers keep track of which space a value lives in.
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Tolerance below which a vector is treated as zero-length
pub const DIRECTION_EPSILON: f32 = 1.0e-10;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Apply this transform to a point given as a vector
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.position + self.rotation * self.scale.component_mul(point)
    }

    /// Move the transform by `delta` in world space
    pub fn translate(&mut self, delta: &Vec3) {
        self.position += delta;
    }
}

/// Returns `v` normalized, or `None` if it is too short to normalize safely
pub fn try_normalize(v: &Vec3) -> Option<Vec3> {
    v.try_normalize(DIRECTION_EPSILON)
}

/// Any non-zero vector perpendicular to `v`
///
/// Crosses `v` with the world axis it is least aligned with. Falls back to
/// the x axis when `v` itself is zero.
pub fn any_perpendicular(v: &Vec3) -> Vec3 {
    if v.norm_squared() <= DIRECTION_EPSILON {
        return Vec3::x();
    }

    let axis = if v.x.abs() <= v.y.abs() && v.x.abs() <= v.z.abs() {
        Vec3::x()
    } else if v.y.abs() <= v.z.abs() {
        Vec3::y()
    } else {
        Vec3::z()
    };

    let perpendicular = v.cross(&axis);
    if perpendicular.norm_squared() <= DIRECTION_EPSILON {
        Vec3::x()
    } else {
        perpendicular
    }
}
