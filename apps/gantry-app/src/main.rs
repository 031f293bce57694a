//! Gantry work-cell simulation CLI.
//!
//! Provides three modes of operation:
//! - `check`: Validate a cell file or machine definition without running
//! - `run`: Tick a cell headless, optionally chasing an IK target
//! - `info`: Print a cell's machines, axes, and tick settings

use std::path::PathBuf;
use std::process::ExitCode;

use bevy::prelude::*;
use clap::{Parser, Subcommand};
use nalgebra::Vector3;

use gantry_ik::prelude::*;
use gantry_machine::def::MachineDef;
use gantry_machine::registry::MachineRegistry;
use gantry_sim::prelude::*;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Kinematic work-cell simulator.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a cell file (or a machine definition with --machine).
    Check {
        /// Path to the TOML file.
        file: PathBuf,

        /// Treat the file as a machine definition instead of a cell.
        #[arg(long)]
        machine: bool,
    },

    /// Run a cell headless for a fixed number of ticks.
    Run {
        /// Path to the cell file.
        cell: PathBuf,

        /// Number of logic ticks to run.
        #[arg(short, long, default_value_t = 300)]
        ticks: u32,

        /// IK target position "x,y,z" for one machine.
        #[arg(long, value_parser = parse_target)]
        target: Option<[f32; 3]>,

        /// Placement name the target applies to (default: first placement).
        #[arg(long)]
        machine: Option<String>,
    },

    /// Print a cell's machines and axes.
    Info {
        /// Path to the cell file.
        cell: PathBuf,
    },
}

fn parse_target(raw: &str) -> Result<[f32; 3], String> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected x,y,z got '{raw}'"));
    }
    let mut target = [0.0; 3];
    for (slot, part) in target.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("bad coordinate '{part}': {e}"))?;
    }
    Ok(target)
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn run_check(file: &PathBuf, machine: bool) -> ExitCode {
    if machine {
        match MachineDef::from_file(file) {
            Ok(def) => {
                println!(
                    "ok: machine '{}' with {} axes",
                    def.machine.name,
                    def.axes.len()
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("invalid machine definition: {e}");
                ExitCode::FAILURE
            }
        }
    } else {
        match load_cell(file) {
            Ok(loaded) => {
                println!(
                    "ok: cell '{}' with {} machines",
                    loaded.config.cell.name,
                    loaded.defs.len()
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("invalid cell: {e}");
                ExitCode::FAILURE
            }
        }
    }
}

fn run_cell(
    cell_path: &PathBuf,
    ticks: u32,
    target: Option<[f32; 3]>,
    machine_name: Option<&str>,
) -> ExitCode {
    let loaded = match load_cell(cell_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("failed to load cell: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut app = App::new();
    app.add_plugins(GantrySimPlugin);
    app.finish();
    app.cleanup();

    let cell = match spawn_cell(app.world_mut(), &loaded) {
        Ok(cell) => cell,
        Err(e) => {
            eprintln!("failed to spawn cell: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some([x, y, z]) = target {
        let placement = match machine_name {
            Some(name) => name.to_string(),
            None => loaded.config.machines[0].name.clone(),
        };
        let Some(id) = cell.machine_id(&placement) else {
            eprintln!("no machine placed under '{placement}'");
            return ExitCode::FAILURE;
        };
        app.world_mut()
            .resource_mut::<IkTargets>()
            .set_goal(id, IkGoal::position_only(Vector3::new(x, y, z)));
        println!("aiming '{placement}' at ({x}, {y}, {z})");
    }

    for _ in 0..ticks {
        app.update();
    }

    let stats = *app.world().resource::<CellStats>();
    println!(
        "ran {} ticks: values_changed={}, samples_rejected={}, goals_reached={}",
        stats.ticks, stats.values_changed, stats.samples_rejected, stats.goals_reached
    );

    let registry = app.world().resource::<MachineRegistry>();
    for (name, spawned) in &cell.machines {
        if let Some(machine) = registry.get(spawned.machine) {
            let tip = machine.end_effector_pose().translation.vector;
            println!(
                "{name}: end effector at ({:.3}, {:.3}, {:.3})",
                tip.x, tip.y, tip.z
            );
        }
    }
    ExitCode::SUCCESS
}

fn run_info(cell_path: &PathBuf) -> ExitCode {
    let loaded = match load_cell(cell_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("failed to load cell: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("cell '{}'", loaded.config.cell.name);
    println!(
        "tick: {:.1} Hz (dt = {:.4}s)",
        loaded.config.tick.tick_hz(),
        loaded.config.tick.tick_dt
    );
    println!();

    for (placement, def) in loaded.config.machines.iter().zip(&loaded.defs) {
        println!(
            "{} ({}) at {:?}",
            placement.name, def.machine.name, placement.root_position
        );
        for axis in &def.axes {
            let bounds = if axis.min == axis.max {
                "unbounded".to_string()
            } else {
                format!("[{}, {}]", axis.min, axis.max)
            };
            println!("  {:<12} {:?} {}", axis.id, axis.kind, bounds);
        }
    }
    ExitCode::SUCCESS
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file, machine } => run_check(&file, machine),
        Commands::Run {
            cell,
            ticks,
            target,
            machine,
        } => run_cell(&cell, ticks, target, machine.as_deref()),
        Commands::Info { cell } => run_info(&cell),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
