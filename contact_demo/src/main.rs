//! Contact demo application
//!
//! Drops two crates onto a ground slab, slides one of them through a
//! trigger zone, and logs every collision that starts or ends.
//!
//! Usage: `contact_demo [physics.toml|physics.ron]`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use contact_engine::foundation::logging;
use contact_engine::prelude::*;
use thiserror::Error;

const FRAME_COUNT: u64 = 240;
const FIXED_DT: f32 = 1.0 / 60.0;

#[derive(Error, Debug)]
enum DemoError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("physics: {0}")]
    Physics(#[from] PhysicsError),
}

struct Scene {
    world: PhysicsWorld,
    sliding_crate: BodyHandle,
    trigger_hits: Arc<AtomicUsize>,
}

impl Scene {
    fn build(config: PhysicsConfig) -> Result<Self, DemoError> {
        let mut world = PhysicsWorld::new(config);
        let gravity = Vec3::new(0.0, -9.81, 0.0);

        world.create_body("ground", Mesh::cuboid(Vec3::new(10.0, 0.5, 10.0)))?;

        let falling_crate = world.create_body("falling_crate", Mesh::cube(1.0))?;
        {
            let body = world.body_mut(falling_crate)?;
            body.set_collision(true);
            body.set_acceleration(gravity);
            body.transform_mut().position = Vec3::new(3.0, 4.0, 0.0);
            body.set_collision_callback(|tag, _| log::info!("falling_crate touched {}", tag));
        }

        let sliding_crate = world.create_body("sliding_crate", Mesh::cube(1.0))?;
        {
            let body = world.body_mut(sliding_crate)?;
            body.set_collision(true);
            body.set_acceleration(gravity);
            body.transform_mut().position = Vec3::new(-3.0, 1.2, 0.0);
            body.set_velocity(Vec3::new(2.5, 0.0, 0.0));
        }

        let zone = world.create_body("zone", Mesh::cuboid(Vec3::new(0.5, 1.0, 2.0)))?;
        let trigger_hits = Arc::new(AtomicUsize::new(0));
        {
            let counter = Arc::clone(&trigger_hits);
            let body = world.body_mut(zone)?;
            body.set_trigger(true);
            body.transform_mut().position = Vec3::new(0.0, 1.5, 0.0);
            body.set_collision_callback(move |_, _| {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }

        Ok(Self {
            world,
            sliding_crate,
            trigger_hits,
        })
    }

    fn tag_of(&self, handle: BodyHandle) -> String {
        self.world
            .get(handle)
            .map_or_else(|| "<removed>".to_string(), |body| body.tag().to_string())
    }

    fn run(&mut self) {
        for frame in 0..FRAME_COUNT {
            let context = FrameContext::fixed(FIXED_DT, frame);
            self.world.step(&context);

            for pair in self.world.collision_entered() {
                log::info!(
                    "frame {}: {} <-> {} started touching",
                    frame,
                    self.tag_of(pair.body_a),
                    self.tag_of(pair.body_b)
                );
            }
            for pair in self.world.collision_exited() {
                log::info!(
                    "frame {}: {} <-> {} separated",
                    frame,
                    self.tag_of(pair.body_a),
                    self.tag_of(pair.body_b)
                );
            }
        }
    }

    fn report(&self) {
        for (_, body) in self.world.iter() {
            log::info!(
                "{:>14}: position {:?}, velocity {:?}, in_collision {}",
                body.tag(),
                body.position(),
                body.velocity(),
                body.in_collision()
            );
        }
        log::info!(
            "zone was notified {} times; sliding crate ended at x = {:.3}",
            self.trigger_hits.load(Ordering::Relaxed),
            self.world
                .get(self.sliding_crate)
                .map_or(f32::NAN, |body| body.position().x)
        );
    }
}

fn load_config() -> Result<PhysicsConfig, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading physics configuration from {}", path);
            Ok(PhysicsConfig::load_validated(&path)?)
        }
        None => Ok(PhysicsConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = load_config()?;
    log::info!("Physics configuration: {:?}", config);

    let mut scene = Scene::build(config)?;
    scene.run();
    scene.report();
    Ok(())
}
