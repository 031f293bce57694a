//! Machine definitions, live machine state, and scene-node wiring.
//!
//! This crate turns a TOML machine definition into a registered
//! [`Machine`](machine::Machine) with a built kinematic chain, spawns one
//! scene-node entity per axis, and announces axis value changes as polled
//! Bevy events.
//!
//! # Example
//!
//! ```no_run
//! use bevy::prelude::*;
//! use gantry_core::schedule::GantryCorePlugin;
//! use gantry_machine::prelude::*;
//! use nalgebra::Isometry3;
//!
//! let mut app = App::new();
//! app.add_plugins((GantryCorePlugin, GantryMachinePlugin));
//!
//! let def = MachineDef::from_file("machines/mill.toml").unwrap();
//! let spawned = spawn_machine(app.world_mut(), &def, Isometry3::identity()).unwrap();
//! println!("machine {} with {} nodes", spawned.machine, spawned.node_count());
//! ```

pub mod def;
pub mod error;
pub mod events;
pub mod fields;
pub mod machine;
pub mod registry;
pub mod spawner;

use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use def::{AxisDef, InterpolationDef, MachineDef, MachineMeta};
pub use error::MachineDefError;
pub use events::{AxisValueChanged, ValueSource};
pub use fields::AxisField;
pub use machine::{InterpolationMode, Machine, MachineInfo};
pub use registry::MachineRegistry;
pub use spawner::{AxisBinding, RestPose, SpawnedMachine, spawn_machine};

// ---------------------------------------------------------------------------
// GantryMachinePlugin
// ---------------------------------------------------------------------------

/// Installs the machine registry and the axis change event.
pub struct GantryMachinePlugin;

impl Plugin for GantryMachinePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MachineRegistry>()
            .add_event::<AxisValueChanged>();
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::def::{AxisDef, InterpolationDef, MachineDef, MachineMeta};
    pub use crate::error::MachineDefError;
    pub use crate::events::{AxisValueChanged, ValueSource};
    pub use crate::fields::AxisField;
    pub use crate::machine::{InterpolationMode, Machine, MachineInfo};
    pub use crate::registry::MachineRegistry;
    pub use crate::spawner::{AxisBinding, RestPose, SpawnedMachine, spawn_machine};
    pub use crate::GantryMachinePlugin;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
