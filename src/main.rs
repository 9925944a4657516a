use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::AtomicBool;

use grid_traffic_sim::simulation::{
    spawn_random_fleet, GridLayout, SignalPolicyKind, SimConfig, SimWorld, SnapshotReporter,
};

#[derive(Parser)]
#[command(name = "grid_traffic_sim")]
#[command(about = "Headless traffic simulation on a signalised grid")]
struct Cli {
    /// Grid rows
    #[arg(long, default_value = "4")]
    rows: u32,

    /// Grid columns
    #[arg(long, default_value = "4")]
    cols: u32,

    /// Distance between neighbouring intersections in metres
    #[arg(long, default_value = "200")]
    block_size: f64,

    /// Speed limit of every street in metres per second
    #[arg(long, default_value = "15")]
    speed_limit: f64,

    /// Vehicles per road before congestion saturates
    #[arg(long, default_value = "10")]
    capacity: u32,

    /// Number of vehicles in the closed population
    #[arg(long, default_value = "300")]
    vehicles: u32,

    /// Probability that a vehicle is an emergency vehicle
    #[arg(long, default_value = "0.05")]
    emergency_ratio: f64,

    /// Vehicles enter during the first N seconds
    #[arg(long, default_value = "30")]
    spawn_window: u32,

    /// Simulated seconds to run
    #[arg(long, default_value = "300")]
    duration: f64,

    /// Time delta per tick in seconds
    #[arg(long, default_value = "0.1")]
    delta: f64,

    /// Seconds between signal reevaluations
    #[arg(long, default_value = "5")]
    signal_interval: f64,

    /// Signal policy: round-robin or longest-queue
    #[arg(long, default_value = "round-robin")]
    policy: SignalPolicyKind,

    /// RNG seed; a fixed seed reproduces a run exactly
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated seconds between state snapshots
    #[arg(long, default_value = "0.5")]
    report_interval: f64,

    /// Only print the end-of-run statistics
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    run_headless(&cli)
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli) -> Result<()> {
    let seed = cli.seed.unwrap_or_else(rand::random::<u64>);
    info!("Initializing grid traffic simulation (seed {})", seed);

    let config = SimConfig {
        time_step: cli.delta,
        signal_interval: cli.signal_interval,
        signal_policy: cli.policy,
        default_capacity: cli.capacity,
        ..SimConfig::default()
    };
    let mut world = SimWorld::with_config(config, StdRng::seed_from_u64(seed))
        .context("Invalid simulation parameters")?;

    let layout = GridLayout {
        rows: cli.rows,
        cols: cli.cols,
        block_size: cli.block_size,
        speed_limit: cli.speed_limit,
        capacity: cli.capacity,
    };
    layout
        .build(&mut world)
        .context("Failed to build the road grid")?;

    let mut fleet_rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    spawn_random_fleet(
        &mut world,
        &mut fleet_rng,
        layout.intersection_count(),
        cli.vehicles,
        cli.emergency_ratio,
        cli.spawn_window,
    )
    .context("Failed to spawn vehicles")?;
    info!("Spawned {} vehicles", world.vehicles.len());

    if !cli.quiet {
        println!("{}", world.topology());
    }

    let mut reporter = SnapshotReporter::new(cli.report_interval);
    let stop = AtomicBool::new(false);
    world.run_until(cli.duration, &stop, |world| {
        if cli.quiet {
            return;
        }
        if let Some(snapshot) = reporter.poll(world) {
            println!("{}", snapshot);
        }
    });

    world.log_summary();
    Ok(())
}
