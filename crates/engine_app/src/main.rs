//! # engine_app
//!
//! Demo driver for the ECS runtime and the avatar animation graph.
//!
//! ## Startup Sequence
//!
//! 1. Load avatar settings, the clip library and the movement script
//!    (built-in defaults unless paths are given).
//! 2. Spawn the avatars.
//! 3. Register the movement system, then the animation system. Order matters:
//!    animation reads what movement wrote this tick.
//! 4. Run the fixed-timestep tick loop and report each avatar's final state.

mod script;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use engine_animation::{
    ANIMATION_SYSTEM, AvatarAnimation, AvatarController, AvatarSettings, ClipLibrary, ClipSet,
    animation_system, synthetic_clip_set,
};
use engine_component::Entity;
use engine_math::Velocity;
use engine_world::{TickConfig, TickLoop, World};
use script::{MOVEMENT_SYSTEM, Script, movement_system};

#[derive(Parser)]
#[command(name = "engine_app", about = "Drive avatars through a scripted movement sequence")]
struct Args {
    /// Number of ticks to run (0 = unlimited)
    #[arg(short, long, default_value_t = 1200)]
    ticks: u64,

    /// Ticks per second
    #[arg(long, default_value_t = 60.0, value_parser = parse_tick_rate)]
    tick_rate: f64,

    /// Avatar settings JSON file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Clip library JSON file (defaults to synthetic constant-speed clips)
    #[arg(short, long)]
    clips: Option<PathBuf>,

    /// Movement script JSON file (defaults to the built-in tour)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Number of avatars to spawn
    #[arg(short, long, default_value_t = 1)]
    avatars: usize,

    /// Hold the tick rate in wall-clock time
    #[arg(long)]
    realtime: bool,

    /// Print every avatar's animation component as JSON when done
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => AvatarSettings::from_json_file(path)?,
        None => AvatarSettings::default(),
    };
    let library = match &args.clips {
        Some(path) => load_clip_set(path)?,
        None => synthetic_clip_set(&settings)?,
    };
    let timeline = match &args.script {
        Some(path) => Script::from_json_file(path)?,
        None => Script::demo(&settings),
    };
    info!(
        walk_speed = settings.walk_speed,
        run_speed = settings.run_speed,
        clips = library.len(),
        segments = timeline.segments.len(),
        script_seconds = timeline.duration(),
        "configuration loaded"
    );

    let mut tick_loop = TickLoop::new(TickConfig {
        tick_rate: args.tick_rate,
        max_ticks: args.ticks,
        realtime: args.realtime,
    });

    for _ in 0..args.avatars {
        let entity = spawn_avatar(tick_loop.world_mut(), &library, &settings)?;
        info!(%entity, "avatar spawned");
    }

    tick_loop.add_system(MOVEMENT_SYSTEM, move |world| movement_system(world, timeline))?;
    tick_loop.add_system(ANIMATION_SYSTEM, animation_system)?;

    tick_loop.run()?;

    let world = tick_loop.world();
    for (entity, animation) in world.components::<AvatarAnimation>() {
        info!(
            %entity,
            state = animation.current_state(),
            mixer_time = animation.mixer.time(),
            "final animation state"
        );
    }

    if args.dump {
        let snapshot: BTreeMap<String, &AvatarAnimation> = world
            .components::<AvatarAnimation>()
            .map(|(entity, animation)| (entity.to_string(), animation))
            .collect();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    info!(ticks = tick_loop.tick_id(), "engine_app shut down");
    Ok(())
}

fn parse_tick_rate(raw: &str) -> std::result::Result<f64, String> {
    let rate: f64 = raw.parse().map_err(|err| format!("{err}"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("tick rate must be a positive number, got {raw}"))
    }
}

fn spawn_avatar<L: ClipLibrary + ?Sized>(
    world: &mut World,
    library: &L,
    settings: &AvatarSettings,
) -> Result<Entity> {
    let animation = AvatarAnimation::new(library, settings)?;
    let entity = world.create();
    world.add(entity, Velocity::ZERO)?;
    world.add(entity, AvatarController::default())?;
    world.add(entity, animation)?;
    Ok(entity)
}

fn load_clip_set(path: &Path) -> Result<ClipSet> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read clip library `{}`", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("failed to parse clip library `{}`", path.display()))
}
