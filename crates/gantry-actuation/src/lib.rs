//! Actuation: turns finalized axis values into scene-node transforms.
//!
//! Runs in [`GantrySet::Actuate`](gantry_core::schedule::GantrySet), after
//! telemetry ingest and IK solve, so every tick renders a consistent set
//! of values. Interpolation mode comes from the machine definition: snap
//! assigns targets directly, blend eases toward them at a configured rate.

pub mod systems;

use bevy::prelude::*;

use gantry_core::schedule::GantrySet;

pub use systems::drive_nodes_system;

// ---------------------------------------------------------------------------
// GantryActuationPlugin
// ---------------------------------------------------------------------------

/// Installs the node driver.
pub struct GantryActuationPlugin;

impl Plugin for GantryActuationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            systems::drive_nodes_system.in_set(GantrySet::Actuate),
        );
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::systems::drive_nodes_system;
    pub use crate::GantryActuationPlugin;
    pub use gantry_machine::spawner::{AxisBinding, RestPose};
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
