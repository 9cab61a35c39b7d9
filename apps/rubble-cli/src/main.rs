use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rubble_physics::WorldConfig;
use rubble_render::{DebugTextRenderer, RenderView, Renderer};
use rubble_sim::{
    DemoParameters, FrameTimer, LaunchController, RegistryConfig, SimulationRegistry,
    StructureGenerator,
};
use rubble_tools::RegistryInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rubble-cli", about = "Headless driver for the brick wall demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default parameters
    Info,
    /// Print the brick layout for a parameter set
    Layout {
        /// JSON file with demo parameters
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Build the wall, fire at it and step the simulation
    Run {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "300")]
        frames: u64,
        /// Fire a projectile every N frames (0 disables)
        #[arg(long, default_value = "60")]
        fire_every: u64,
        /// Seconds per frame
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
        /// RNG seed for the launch spread
        #[arg(short, long)]
        seed: Option<u64>,
        /// JSON file with demo parameters
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Tint proxies by sleep state
        #[arg(long)]
        show_sleep_state: bool,
        /// Blend poses between physics sub-steps
        #[arg(long)]
        interpolate: bool,
        /// Pace frames against the wall clock instead of a fixed dt
        #[arg(long)]
        realtime: bool,
        /// Dump the scene after the last frame
        #[arg(long)]
        render: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Info => {
            let params = DemoParameters::default();
            let world = WorldConfig::default();
            println!("rubble-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "physics: gravity=({:.2}, {:.2}, {:.2}) step={:.4}s max_sub_steps={}",
                world.gravity.x,
                world.gravity.y,
                world.gravity.z,
                world.fixed_time_step,
                RegistryConfig::default().max_sub_steps
            );
            println!(
                "wall: {}x{} bricks, size={:.2} mass={:.2}",
                params.wall_row_size,
                params.wall_rows,
                params.wall_brick_size,
                params.wall_brick_mass
            );
            println!(
                "ball: radius={:.2} mass={:.2} force={:.1} spread={:.1}",
                params.ball_radius,
                params.ball_mass,
                params.ball_launch_force,
                params.ball_launch_spread
            );
        }
        Commands::Layout { config } => {
            let params = load_params(config.as_deref())?;
            let structure = params.structure_params();
            let positions = StructureGenerator::layout(&structure);
            println!(
                "Layout: rows={} columns={} bricks={} height={:.2}",
                structure.rows,
                structure.columns,
                positions.len(),
                structure.height()
            );
            for (i, p) in positions.iter().enumerate() {
                println!("  [{i:>3}] ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
            }
            let launch =
                LaunchController::new().launch_point(structure.height(), params.ball_radius);
            println!(
                "Launch point: ({:.2}, {:.2}, {:.2})",
                launch.x, launch.y, launch.z
            );
        }
        Commands::Run {
            frames,
            fire_every,
            dt,
            seed,
            config,
            show_sleep_state,
            interpolate,
            realtime,
            render,
        } => {
            let params = load_params(config.as_deref())?;
            let mut registry = SimulationRegistry::with_world(
                WorldConfig {
                    interpolate,
                    ..WorldConfig::default()
                },
                RegistryConfig {
                    show_sleep_state: params.show_sleep_state || show_sleep_state,
                    ..RegistryConfig::default()
                },
            );
            let bricks = registry.regenerate(&params).context("building wall")?;
            println!("Wall built: {bricks} bricks");

            let mut launcher = seed.map(LaunchController::with_seed).unwrap_or_default();
            let launch = params.launch_params();
            let mut timer = FrameTimer::new();

            for frame in 0..frames {
                if fire_every > 0 && frame % fire_every == 0 {
                    launcher
                        .fire(&mut registry, &launch)
                        .context("firing projectile")?;
                }

                let frame_dt = if realtime {
                    std::thread::sleep(Duration::try_from_secs_f32(dt).unwrap_or_default());
                    timer.tick()
                } else {
                    dt
                };

                if let Err(err) = registry.step(frame_dt) {
                    if err.is_fatal() {
                        return Err(err).context(format!("frame {frame}"));
                    }
                    tracing::warn!(frame, %err, "frame skipped");
                }
            }

            let summary = RegistryInspector::summary(&registry);
            println!("{summary}");
            if !summary.is_paired() {
                anyhow::bail!("registry lost pairing: {summary}");
            }
            if render {
                print!(
                    "{}",
                    DebugTextRenderer::new().render(registry.scene(), &RenderView::default())
                );
            }
        }
    }

    Ok(())
}

fn load_params(path: Option<&Path>) -> anyhow::Result<DemoParameters> {
    let params = match path {
        Some(path) => DemoParameters::load(path)
            .with_context(|| format!("loading parameters from {}", path.display()))?,
        None => DemoParameters::default(),
    };
    Ok(params.clamped())
}
