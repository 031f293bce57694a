use bevy::prelude::*;

use crate::config::TickConfig;
use crate::time::SimTime;

// ---------------------------------------------------------------------------
// GantrySet
// ---------------------------------------------------------------------------

/// Phases of one logic tick, executed in order within `Update`.
///
/// - `Ingest`: drain external inputs (telemetry samples) into axis state.
/// - `Solve`: run one IK step per machine with an active goal.
/// - `Actuate`: push axis values into scene-node transforms.
/// - `Report`: consume events, update stats, advance the logic clock.
///
/// Mutations of axis values happen in `Ingest` and `Solve` only; by the
/// time `Actuate` reads them, the tick's values are final.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GantrySet {
    Ingest,
    Solve,
    Actuate,
    Report,
}

// ---------------------------------------------------------------------------
// GantryCorePlugin
// ---------------------------------------------------------------------------

/// Core plugin: orders the tick phases and installs the clock resources.
///
/// Inserts [`TickConfig`] and [`SimTime`] if the host has not already done
/// so, chains the [`GantrySet`] phases, and advances [`SimTime`] by
/// `tick_dt` at the end of every tick.
pub struct GantryCorePlugin;

impl Plugin for GantryCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TickConfig>()
            .init_resource::<SimTime>()
            .configure_sets(
                Update,
                (
                    GantrySet::Ingest,
                    GantrySet::Solve,
                    GantrySet::Actuate,
                    GantrySet::Report,
                )
                    .chain(),
            )
            .add_systems(Update, advance_sim_time.in_set(GantrySet::Report));
    }
}

/// Advance the logic clock by one fixed tick.
fn advance_sim_time(config: Res<TickConfig>, mut time: ResMut<SimTime>) {
    time.advance_secs(config.tick_dt);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
