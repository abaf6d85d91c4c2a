//! Contact response through `PhysicsWorld::step`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;

use super::add_dynamic_cube;
use crate::config::PhysicsConfig;
use crate::foundation::math::Vec3;
use crate::foundation::time::FrameContext;
use crate::geometry::Mesh;
use crate::physics::{ObjectTag, PhysicsWorld};

const DT: f32 = 1.0 / 60.0;

fn ground(world: &mut PhysicsWorld) -> crate::physics::BodyHandle {
    world
        .create_body("ground", Mesh::cuboid(Vec3::new(5.0, 0.5, 5.0)))
        .unwrap()
}

#[test]
fn test_box_comes_to_rest_on_ground() {
    let mut world = PhysicsWorld::default();
    let ground = ground(&mut world);
    let crate_box = add_dynamic_cube(&mut world, "crate", Vec3::new(0.0, 2.0, 0.0));
    world
        .get_mut(crate_box)
        .unwrap()
        .set_acceleration(Vec3::new(0.0, -9.81, 0.0));

    for frame in 0..120 {
        world.step(&FrameContext::fixed(DT, frame));
    }

    let body = world.get(crate_box).unwrap();
    assert_relative_eq!(body.position().y, 1.0, epsilon = 1e-2);
    assert!(body.velocity().y.abs() < 0.2);
    assert!(body.in_collision());
    assert_relative_eq!(body.collision_normal(), -Vec3::y(), epsilon = 1e-3);

    // The ground has no collision response of its own
    assert_eq!(world.get(ground).unwrap().position(), Vec3::zeros());
}

#[test]
fn test_overlapping_bodies_are_separated() {
    let mut world = PhysicsWorld::default();
    let wall = world.create_body("wall", Mesh::cube(1.0)).unwrap();
    let mover = add_dynamic_cube(&mut world, "mover", Vec3::new(0.7, 0.1, 0.0));

    let contacts = world.step(&FrameContext::fixed(0.0, 0));
    assert_eq!(contacts.len(), 1);
    assert_relative_eq!(contacts[0].contact.depth, 0.3, epsilon = 1e-3);

    let mover_body = world.get(mover).unwrap();
    let wall_body = world.get(wall).unwrap();
    assert!(mover_body.collide(wall_body).is_none());
    assert_relative_eq!(mover_body.position().x, 1.0 + 1e-3, epsilon = 1e-4);
}

#[test]
fn test_trigger_only_notifies() {
    let mut world = PhysicsWorld::default();
    let zone = world.create_body("zone", Mesh::cube(2.0)).unwrap();
    world.get_mut(zone).unwrap().set_trigger(true);
    let player = add_dynamic_cube(&mut world, "player", Vec3::new(0.5, 0.0, 0.0));

    let entered = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&entered);
    world
        .get_mut(zone)
        .unwrap()
        .set_collision_callback(move |tag, handle| sink.lock().unwrap().push((tag.clone(), handle)));

    let player_hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&player_hits);
    world
        .get_mut(player)
        .unwrap()
        .set_collision_callback(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    world.step(&FrameContext::fixed(DT, 0));

    assert_eq!(world.get(player).unwrap().position(), Vec3::new(0.5, 0.0, 0.0));
    assert!(!world.get(player).unwrap().in_collision());
    assert_eq!(*entered.lock().unwrap(), vec![(ObjectTag::new("player"), player)]);
    assert_eq!(player_hits.load(Ordering::SeqCst), 1);

    // Still inside: one notification per frame
    world.step(&FrameContext::fixed(DT, 1));
    assert_eq!(entered.lock().unwrap().len(), 2);
    assert_eq!(player_hits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_restitution_bounces_off_wall() {
    let config = PhysicsConfig {
        restitution: 1.0,
        ..PhysicsConfig::default()
    };
    let mut world = PhysicsWorld::new(config);
    let wall = world.create_body("wall", Mesh::cube(1.0)).unwrap();
    world.get_mut(wall).unwrap().transform_mut().position = Vec3::new(2.0, 0.0, 0.0);
    let ball = add_dynamic_cube(&mut world, "ball", Vec3::zeros());
    world.get_mut(ball).unwrap().set_velocity(Vec3::new(3.0, 0.0, 0.0));

    let mut bounced = false;
    for frame in 0..60 {
        world.step(&FrameContext::fixed(DT, frame));
        if world.get(ball).unwrap().velocity().x < 0.0 {
            bounced = true;
            break;
        }
    }

    assert!(bounced);
    assert_relative_eq!(world.get(ball).unwrap().velocity().x, -3.0, epsilon = 1e-4);
    assert!(world.get(ball).unwrap().position().x < 1.0);
}

#[test]
fn test_removed_body_drops_out() {
    let mut world = PhysicsWorld::default();
    let wall = world.create_body("wall", Mesh::cube(1.0)).unwrap();
    let mover = add_dynamic_cube(&mut world, "mover", Vec3::new(0.5, 0.0, 0.0));

    world.step(&FrameContext::fixed(0.0, 0));
    assert_eq!(world.collision_entered().len(), 1);

    world.remove_body(wall);
    let contacts = world.step(&FrameContext::fixed(0.0, 1));
    assert!(contacts.is_empty());
    assert_eq!(world.collision_exited().len(), 1);
    assert!(world.collision_exited()[0].contains(mover));
}

#[test]
fn test_stepping_is_deterministic() {
    let build = || {
        let mut world = PhysicsWorld::default();
        ground(&mut world);
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let handle = add_dynamic_cube(
                    &mut world,
                    &format!("box{}", i),
                    Vec3::new(i as f32 * 0.6, 1.2 + i as f32 * 0.3, 0.1 * i as f32),
                );
                world
                    .get_mut(handle)
                    .unwrap()
                    .set_acceleration(Vec3::new(0.0, -9.81, 0.0));
                handle
            })
            .collect();
        (world, handles)
    };

    let (mut first, first_handles) = build();
    let (mut second, second_handles) = build();
    for frame in 0..30 {
        first.step(&FrameContext::fixed(DT, frame));
        second.step(&FrameContext::fixed(DT, frame));
    }

    for (a, b) in first_handles.iter().zip(&second_handles) {
        assert_eq!(first.get(*a).unwrap().position(), second.get(*b).unwrap().position());
    }
}
