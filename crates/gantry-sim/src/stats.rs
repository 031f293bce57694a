//! Per-cell tick statistics.

use bevy::prelude::*;

use gantry_ik::systems::GoalReached;
use gantry_machine::events::AxisValueChanged;
use gantry_telemetry::feed::SampleRejected;

// ---------------------------------------------------------------------------
// CellStats
// ---------------------------------------------------------------------------

/// Cumulative counters, updated in the report phase.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellStats {
    /// Logic ticks completed.
    pub ticks: u64,
    /// Axis value changes observed (telemetry and solver).
    pub values_changed: u64,
    /// Telemetry samples rejected.
    pub samples_rejected: u64,
    /// IK goals that reached convergence.
    pub goals_reached: u64,
}

impl CellStats {
    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Tally this tick's events into [`CellStats`].
pub fn report_stats_system(
    mut stats: ResMut<CellStats>,
    mut changed: EventReader<AxisValueChanged>,
    mut rejected: EventReader<SampleRejected>,
    mut reached: EventReader<GoalReached>,
) {
    stats.ticks += 1;
    stats.values_changed += changed.read().count() as u64;
    stats.samples_rejected += rejected.read().count() as u64;
    stats.goals_reached += reached.read().count() as u64;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
