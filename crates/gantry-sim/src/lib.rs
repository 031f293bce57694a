//! Work-cell assembly.
//!
//! [`GantrySimPlugin`] bundles the whole tick pipeline — core schedule,
//! machine registry, telemetry ingest, IK solve, actuation, and stats —
//! and [`cell`] loads and spawns a cell file's machines into the world.
//!
//! ```no_run
//! use bevy::prelude::*;
//! use gantry_sim::prelude::*;
//!
//! let mut app = App::new();
//! app.add_plugins(GantrySimPlugin);
//! app.finish();
//! app.cleanup();
//!
//! let loaded = load_cell("cells/demo.toml").unwrap();
//! let cell = spawn_cell(app.world_mut(), &loaded).unwrap();
//! println!("cell '{}' with {} machines", cell.name, cell.machines.len());
//!
//! loop {
//!     app.update(); // one logic tick
//! }
//! ```

pub mod cell;
pub mod stats;

use bevy::prelude::*;

use gantry_actuation::GantryActuationPlugin;
use gantry_core::schedule::{GantryCorePlugin, GantrySet};
use gantry_ik::GantryIkPlugin;
use gantry_machine::GantryMachinePlugin;
use gantry_telemetry::GantryTelemetryPlugin;

pub use cell::{load_cell, spawn_cell, LoadedCell, RigError, SpawnedCell};
pub use stats::CellStats;

// ---------------------------------------------------------------------------
// GantrySimPlugin
// ---------------------------------------------------------------------------

/// The full pipeline: ingest, solve, actuate, report.
pub struct GantrySimPlugin;

impl Plugin for GantrySimPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            GantryCorePlugin,
            GantryMachinePlugin,
            GantryTelemetryPlugin,
            GantryIkPlugin,
            GantryActuationPlugin,
        ))
        .init_resource::<CellStats>()
        .add_systems(Update, stats::report_stats_system.in_set(GantrySet::Report));
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::cell::{load_cell, spawn_cell, LoadedCell, RigError, SpawnedCell};
    pub use crate::stats::CellStats;
    pub use crate::GantrySimPlugin;
    pub use gantry_core::config::{CellConfig, TickConfig};
    pub use gantry_core::schedule::GantrySet;
    pub use gantry_core::types::MachineId;
    pub use gantry_ik::prelude::*;
    pub use gantry_machine::prelude::*;
    pub use gantry_telemetry::prelude::*;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
