//! Axis change notifications.
//!
//! Value updates are announced as polled Bevy events rather than callbacks:
//! the mutating systems (telemetry drain, IK solve) emit after
//! normalization, and set ordering guarantees consumers in later phases see
//! the same tick's values. No re-entrant dispatch, deterministic order.

use bevy::prelude::Event;

use gantry_core::types::MachineId;

/// Who wrote an axis value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// The telemetry drain applied a controller sample.
    Telemetry,
    /// The IK solver stepped the axis toward a goal.
    Solver,
    /// Host code wrote the value directly.
    Host,
}

/// An axis's logical value changed this tick.
///
/// `value` is the stored, post-normalization value.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AxisValueChanged {
    pub machine: MachineId,
    pub axis: String,
    pub value: f32,
    pub source: ValueSource,
}
