//! Goal-driven inverse kinematics over registered machines.
//!
//! The host aims a machine by putting an [`IkGoal`] into the
//! [`IkTargets`] resource; every tick the solve phase runs one bounded
//! gradient step per goal and announces convergence with a
//! [`GoalReached`] event. While a goal is active the machine stops
//! tracking its telemetry feed; clearing the goal hands the axes back.
//!
//! [`IkGoal`]: gantry_kinematics::solver::IkGoal

pub mod systems;
pub mod targets;

use bevy::prelude::*;

use gantry_core::schedule::GantrySet;

pub use systems::GoalReached;
pub use targets::{GoalEntry, IkTargets};

// ---------------------------------------------------------------------------
// GantryIkPlugin
// ---------------------------------------------------------------------------

/// Installs the goal table and the per-tick solve system.
pub struct GantryIkPlugin;

impl Plugin for GantryIkPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<IkTargets>()
            .add_event::<GoalReached>()
            .add_systems(
                Update,
                systems::solve_goals_system.in_set(GantrySet::Solve),
            );
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::systems::GoalReached;
    pub use crate::targets::{GoalEntry, IkTargets};
    pub use crate::GantryIkPlugin;
    pub use gantry_kinematics::solver::{IkGoal, IkParams};
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_core::schedule::GantryCorePlugin;
    use gantry_machine::GantryMachinePlugin;

    #[test]
    fn plugin_builds_without_panic() {
        let mut app = App::new();
        app.add_plugins((GantryCorePlugin, GantryMachinePlugin, GantryIkPlugin));
        app.finish();
        app.cleanup();
        app.update();

        assert!(app.world().get_resource::<IkTargets>().is_some());
    }
}
