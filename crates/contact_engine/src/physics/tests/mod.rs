//! Scenario tests running whole bodies through detection and resolution

mod resolution;

use crate::foundation::math::Vec3;
use crate::geometry::Mesh;
use crate::physics::{PhysicsWorld, RigidBody, BodyHandle};

fn unit_cube(tag: &str, position: Vec3) -> RigidBody {
    RigidBody::new(tag, Mesh::cube(1.0))
        .unwrap()
        .with_position(position)
}

fn add_dynamic_cube(world: &mut PhysicsWorld, tag: &str, position: Vec3) -> BodyHandle {
    let handle = world.create_body(tag, Mesh::cube(1.0)).unwrap();
    let body = world.get_mut(handle).unwrap();
    body.transform_mut().position = position;
    body.set_collision(true);
    handle
}
