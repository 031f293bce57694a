//! Per-tick telemetry drain.

use bevy::prelude::*;

use gantry_machine::events::{AxisValueChanged, ValueSource};
use gantry_machine::registry::MachineRegistry;

use crate::feed::{FeedStats, RejectReason, SampleRejected, TelemetryFeed};

/// Drain every pending sample and apply it to the registry.
///
/// Runs once per tick in the ingest phase. For each sample: non-finite
/// values and unknown addresses are rejected (event + counter, never
/// fatal); valid samples always refresh the axis's external mirror, and
/// additionally drive the logical value when the machine is feed
/// tracking. Change events carry the stored, post-normalization value.
pub fn drain_samples_system(
    feed: Res<TelemetryFeed>,
    mut registry: ResMut<MachineRegistry>,
    mut stats: ResMut<FeedStats>,
    mut changed: EventWriter<AxisValueChanged>,
    mut rejected: EventWriter<SampleRejected>,
) {
    feed.drain(|sample| {
        stats.received += 1;

        if !sample.value.is_finite() {
            tracing::warn!(
                machine = %sample.machine,
                axis = %sample.axis,
                "dropping non-finite telemetry sample"
            );
            stats.rejected += 1;
            rejected.send(SampleRejected {
                machine: sample.machine,
                axis: sample.axis,
                reason: RejectReason::NonFinite,
            });
            return;
        }

        let Some(machine) = registry.get_mut(sample.machine) else {
            tracing::warn!(
                machine = %sample.machine,
                axis = %sample.axis,
                "telemetry sample for unknown machine"
            );
            stats.rejected += 1;
            rejected.send(SampleRejected {
                machine: sample.machine,
                axis: sample.axis,
                reason: RejectReason::UnknownMachine,
            });
            return;
        };

        let tracking = machine.feed_tracking();
        let Some(axis) = machine.axis_mut(&sample.axis) else {
            tracing::warn!(
                machine = %sample.machine,
                axis = %sample.axis,
                "telemetry sample for unknown axis"
            );
            stats.rejected += 1;
            rejected.send(SampleRejected {
                machine: sample.machine,
                axis: sample.axis,
                reason: RejectReason::UnknownAxis,
            });
            return;
        };

        // The mirror keeps the wire value verbatim, tracking or not.
        axis.external_value = sample.value;

        if tracking {
            let stored = axis.set_value(sample.value);
            stats.applied += 1;
            changed.send(AxisValueChanged {
                machine: sample.machine,
                axis: sample.axis,
                value: stored,
                source: ValueSource::Telemetry,
            });
        } else {
            stats.mirrored_only += 1;
        }
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
