//! Telemetry ingestion: the cross-thread sample feed, the per-tick drain
//! that applies controller values to registered machines, and the link
//! retry monitor the host drives its connection code with.
//!
//! Producers clone a [`TelemetrySender`](feed::TelemetrySender) and push
//! from any thread; all axis mutation happens on the tick thread in
//! [`GantrySet::Ingest`](gantry_core::schedule::GantrySet::Ingest).

pub mod feed;
pub mod link;
pub mod systems;

use bevy::prelude::*;

use gantry_core::schedule::GantrySet;

pub use feed::{FeedStats, RejectReason, SampleRejected, TelemetryFeed, TelemetrySample, TelemetrySender};
pub use link::{LinkAction, LinkMonitor, LinkState, RetryPolicy};

// ---------------------------------------------------------------------------
// GantryTelemetryPlugin
// ---------------------------------------------------------------------------

/// Installs the sample feed, drain counters, and the ingest drain system.
pub struct GantryTelemetryPlugin;

impl Plugin for GantryTelemetryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TelemetryFeed>()
            .init_resource::<FeedStats>()
            .add_event::<SampleRejected>()
            .add_systems(
                Update,
                systems::drain_samples_system.in_set(GantrySet::Ingest),
            );
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::feed::{
        FeedStats, RejectReason, SampleRejected, TelemetryFeed, TelemetrySample, TelemetrySender,
    };
    pub use crate::link::{LinkAction, LinkMonitor, LinkState, RetryPolicy};
    pub use crate::GantryTelemetryPlugin;
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
        app.add_plugins((GantryCorePlugin, GantryMachinePlugin, GantryTelemetryPlugin));
        app.finish();
        app.cleanup();
        app.update();

        assert!(app.world().get_resource::<TelemetryFeed>().is_some());
        assert!(app.world().get_resource::<FeedStats>().is_some());
    }
}
