//! Fleetgrid CLI - Multi-robot warehouse coordination
//!
//! Run grid warehouse simulations from a scenario file, validate scenarios,
//! or launch a quick self-contained demo.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "fleetgrid")]
#[command(version = "0.1.0")]
#[command(about = "Multi-robot warehouse coordination engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a scenario file
    Run {
        /// Path to the scenario YAML or JSON file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Random seed (optional, defaults to scenario seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Tick count override
        #[arg(long)]
        ticks: Option<u64>,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        output: String,

        /// Write the remaining-path coordinate export to this file
        #[arg(long)]
        export_paths: Option<PathBuf>,

        /// Enable event tracing and print the trace at the end
        #[arg(long)]
        trace: bool,
    },
    /// Validate a scenario file without running
    Validate {
        /// Path to the scenario YAML or JSON file
        #[arg(short, long)]
        scenario: PathBuf,
    },
    /// Run a quick demo simulation
    Demo {
        /// Grid width and height
        #[arg(long, default_value = "20")]
        size: i32,

        /// Number of robots
        #[arg(short, long, default_value = "4")]
        robots: usize,

        /// Number of packages
        #[arg(short, long, default_value = "8")]
        packages: usize,

        /// Ticks to simulate
        #[arg(short, long, default_value = "300")]
        ticks: u64,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            seed,
            ticks,
            output,
            export_paths,
            trace,
        } => run_scenario(&scenario, seed, ticks, &output, export_paths.as_deref(), trace),
        Commands::Validate { scenario } => validate(&scenario),
        Commands::Demo {
            size,
            robots,
            packages,
            ticks,
            seed,
        } => run_demo(size, robots, packages, ticks, seed),
    }
}

fn run_scenario(
    scenario_path: &std::path::Path,
    seed_override: Option<u64>,
    ticks_override: Option<u64>,
    output_format: &str,
    export_paths: Option<&std::path::Path>,
    trace: bool,
) -> anyhow::Result<()> {
    let path_str = scenario_path.to_string_lossy();
    let mut config = fleetgrid_config::ScenarioConfig::from_file(&path_str)
        .with_context(|| format!("loading scenario {}", scenario_path.display()))?;

    if let Some(seed) = seed_override {
        config.seed = seed;
    }
    let ticks = ticks_override.unwrap_or(config.run.ticks);

    println!("Loading scenario from: {}", scenario_path.display());
    println!(
        "Grid: {}x{}, robots: {}, stations: {}, seed: {}",
        config.grid.width,
        config.grid.height,
        config.robots.len(),
        config.charging_stations.len(),
        config.seed
    );

    let mut model = fleetgrid_engine::Model::from_scenario(&config)
        .map_err(|e| anyhow::anyhow!("building model: {}", e))?;
    if trace {
        model.trace.set_enabled(true);
    }

    for _ in 0..ticks {
        let delta = model.step();
        if delta.all_reached_goal && model.state().active_packages.is_empty() {
            break;
        }
    }

    let state = model.state();
    match output_format {
        "json" => println!("{}", state.to_json()?),
        _ => print_summary(&state),
    }

    if trace {
        println!("\nTrace ({} events):", model.trace.len());
        println!("{}", model.trace.to_json()?);
    }

    if let Some(path) = export_paths {
        fleetgrid_engine::write_path_coordinates(&model, path)
            .map_err(|e| anyhow::anyhow!("writing path export: {}", e))?;
        println!("Path export written to: {}", path.display());
    }

    Ok(())
}

fn validate(scenario_path: &std::path::Path) -> anyhow::Result<()> {
    println!("Validating scenario: {}", scenario_path.display());

    let path_str = scenario_path.to_string_lossy();
    let config = fleetgrid_config::ScenarioConfig::from_file(&path_str)
        .with_context(|| format!("loading scenario {}", scenario_path.display()))?;

    match fleetgrid_config::validate_scenario(&config) {
        Ok(warnings) => {
            println!("Scenario valid!");
            println!("  Seed: {}", config.seed);
            println!("  Grid: {}x{}", config.grid.width, config.grid.height);
            println!("  Robots: {}", config.robots.len());
            println!("  Stations: {}", config.charging_stations.len());
            println!("  Packages: {}", config.packages.len());
            if !warnings.is_empty() {
                println!("\nWarnings ({}):", warnings.len());
                for w in &warnings {
                    println!("  - {}", w);
                }
            }
            Ok(())
        }
        Err(errors) => {
            eprintln!("Validation failed with {} error(s):", errors.len());
            for e in &errors {
                eprintln!("  - {}", e);
            }
            std::process::exit(1);
        }
    }
}

fn run_demo(size: i32, robots: usize, packages: usize, ticks: u64, seed: u64) -> anyhow::Result<()> {
    use fleetgrid_config::{BatteryConfig, RobotSpec};
    use fleetgrid_map::Cell;

    println!("Running demo simulation...");
    println!("  Grid: {}x{}", size, size);
    println!("  Robots: {}", robots);
    println!("  Packages: {}", packages);
    println!();

    let mut model = fleetgrid_engine::Model::new(size, size, seed)
        .map_err(|e| anyhow::anyhow!("building model: {}", e))?;

    // One station per corner quadrant
    let quarter = size / 4;
    for cell in [
        Cell::new(quarter, quarter),
        Cell::new(size - 1 - quarter, size - 1 - quarter),
    ] {
        model
            .add_charging_station(cell, 10.0)
            .map_err(|e| anyhow::anyhow!("placing station: {}", e))?;
    }

    // Robots along the bottom row
    for i in 0..robots {
        let spec = RobotSpec {
            start: Cell::new((i as i32 * 2) % size, 0),
            goal: None,
            color: ["red", "blue", "green", "orange"][i % 4].to_string(),
            idle: true,
            battery: BatteryConfig::default(),
        };
        model
            .add_robot(&spec)
            .map_err(|e| anyhow::anyhow!("placing robot: {}", e))?;
    }

    // Docks on the top row, shelves mid-grid
    model.pickup_pool = (0..size).step_by(3).map(|x| Cell::new(x, size - 1)).collect();
    model.delivery_pool = (0..size).step_by(2).map(|x| Cell::new(x, size / 2)).collect();
    model
        .create_packages(packages)
        .map_err(|e| anyhow::anyhow!("creating packages: {}", e))?;

    for _ in 0..ticks {
        let delta = model.step();
        if delta.all_reached_goal && model.state().active_packages.is_empty() {
            break;
        }
    }

    print_summary(&model.state());
    Ok(())
}

fn print_summary(state: &fleetgrid_engine::StateSnapshot) {
    println!("\nSimulation Summary");
    println!("{:=<50}", "");
    println!("  Ticks: {}", state.stats.ticks);
    println!("  Packages delivered: {}", state.stats.total_packages_delivered);
    println!("  Packages active: {}", state.stats.active_packages);
    println!("  Total steps taken: {}", state.stats.total_steps_taken);
    println!("  Average battery: {:.1}%", state.stats.avg_battery_pct);
    println!("  All robots at goal: {}", state.all_reached_goal);
    println!("\nRobots:");
    for robot in &state.robots {
        println!(
            "  #{} {} at ({}, {})  battery {:.1}%  steps {}  delivered {}{}",
            robot.id,
            robot.color,
            robot.position.x,
            robot.position.y,
            robot.battery_percentage,
            robot.steps_taken,
            robot.total_packages_delivered,
            if robot.charging { "  [charging]" } else { "" },
        );
    }
}
