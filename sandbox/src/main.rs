//! Runs a capsule through a TOML scene with collide-and-slide and logs the trajectory.

mod scene;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use collide_slide::{
    CharacterMotor, CollideAndSlide, CollisionWorld, SlideConfig,
    collision::slope_angle_deg,
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use scene::{Scene, SceneError};

#[derive(Parser)]
#[command(name = "slide-sandbox")]
#[command(about = "Step a capsule through a static scene with collide-and-slide", long_about = None)]
struct Cli {
    /// Scene file (TOML)
    scene: PathBuf,
    /// Resolver config file; replaces the scene's [config] table
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the number of steps from the scene
    #[arg(long)]
    steps: Option<u32>,
    /// Log the body state every N steps
    #[arg(long, default_value_t = 30)]
    log_every: u32,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), SceneError> {
    let mut scene = Scene::load(&cli.scene)?;
    if let Some(path) = &cli.config {
        scene.config = SlideConfig::from_file(path)?;
        scene.config.validate_shape(&scene.body_shape)?;
    }
    let steps = cli.steps.unwrap_or(scene.steps);
    let log_every = cli.log_every.max(1);
    let config = scene.config;
    let shape = scene.body_shape;

    let mut world = CollisionWorld::build(scene.statics);
    let handle = world.insert_body(&shape, scene.body_position, scene.body_layer);
    let mut motor = CharacterMotor::new(scene.body_position, shape, &config)?.with_body_collider(handle);

    info!(
        "Scene {}: {} colliders, {} steps at dt={:.4}, move velocity {:?}",
        cli.scene.display(),
        world.len(),
        steps,
        scene.dt,
        scene.move_velocity.as_slice()
    );

    let mut truncated_steps = 0u32;
    for step in 0..steps {
        let out = motor.step(&world, &config, scene.move_velocity, scene.dt);
        world.set_body_position(handle, &shape, out.translation);

        if out.truncated {
            truncated_steps += 1;
            debug!("step {}: bounce limit reached", step);
        }
        if step % log_every == 0 || step + 1 == steps {
            info!(
                "step {:>5}: pos [{:>8.4}, {:>8.4}, {:>8.4}] grounded={} vy={:.3} bounces={}",
                step,
                out.translation.x,
                out.translation.y,
                out.translation.z,
                out.is_grounded,
                motor.vertical_speed,
                out.bounces
            );
        }
    }

    if truncated_steps > 0 {
        warn!("{} of {} steps dropped leftover motion", truncated_steps, steps);
    }

    let resolver = CollideAndSlide::new(&world, shape, &config).excluding(handle);
    match resolver.ground_hit(motor.position) {
        Some(hit) => {
            let id = hit.collider.and_then(|c| world.static_id(c));
            info!(
                "Final surface: static {:?}, slope {:.1} deg, walkable={}",
                id,
                slope_angle_deg(&hit.normal),
                resolver.is_grounded(motor.position)
            );
        }
        None => info!("Final state: airborne at {:?}", motor.position.as_slice()),
    }

    Ok(())
}
