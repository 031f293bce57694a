//! The telemetry sample feed.
//!
//! Producers (socket readers, pollers, test harnesses) run on their own
//! threads and push [`TelemetrySample`]s through cloned
//! [`TelemetrySender`]s. The single receiver lives in the
//! [`TelemetryFeed`] resource and is drained exactly once per tick on the
//! tick thread, so every axis mutation happens there: cross-thread writes
//! are race-free by construction, not by locking axis state.

use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};

use bevy::prelude::{Event, Resource};

use gantry_core::types::MachineId;

// ---------------------------------------------------------------------------
// TelemetrySample
// ---------------------------------------------------------------------------

/// One already-parsed axis update from an external controller.
///
/// Wire parsing happens upstream; by the time a sample exists it is a
/// plain float addressed to one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    pub machine: MachineId,
    pub axis: String,
    pub value: f32,
}

// ---------------------------------------------------------------------------
// TelemetrySender
// ---------------------------------------------------------------------------

/// Cheap cloneable handle for producer threads.
#[derive(Debug, Clone)]
pub struct TelemetrySender {
    tx: Sender<TelemetrySample>,
}

impl TelemetrySender {
    /// Queue a sample. Returns `false` once the feed has been dropped
    /// (shutdown); producers should stop then.
    pub fn send(&self, sample: TelemetrySample) -> bool {
        self.tx.send(sample).is_ok()
    }
}

// ---------------------------------------------------------------------------
// TelemetryFeed
// ---------------------------------------------------------------------------

/// Resource owning the sample channel.
///
/// The receiver sits behind a mutex only so the feed can be a plain
/// `Resource`; the drain system is the sole consumer and holds the lock
/// only inside [`drain`](Self::drain), never across systems.
#[derive(Resource, Debug)]
pub struct TelemetryFeed {
    tx: Sender<TelemetrySample>,
    rx: Mutex<Receiver<TelemetrySample>>,
}

impl Default for TelemetryFeed {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }
}

impl TelemetryFeed {
    /// Create an empty feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender for a producer thread.
    #[must_use]
    pub fn sender(&self) -> TelemetrySender {
        TelemetrySender {
            tx: self.tx.clone(),
        }
    }

    /// Queue a sample from the tick thread (tests, scripted feeds).
    pub fn push(&self, sample: TelemetrySample) {
        // The feed owns both ends, so send cannot fail.
        let _ = self.tx.send(sample);
    }

    /// Drain every pending sample in arrival order.
    pub fn drain(&self, mut apply: impl FnMut(TelemetrySample)) {
        let rx = match self.rx.lock() {
            Ok(rx) => rx,
            Err(poisoned) => poisoned.into_inner(),
        };
        while let Ok(sample) = rx.try_recv() {
            apply(sample);
        }
    }
}

// ---------------------------------------------------------------------------
// FeedStats
// ---------------------------------------------------------------------------

/// Cumulative drain counters.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Samples taken off the channel.
    pub received: u64,
    /// Samples applied to a logical value (feed tracking on).
    pub applied: u64,
    /// Samples that only updated the external mirror (feed tracking off).
    pub mirrored_only: u64,
    /// Samples rejected (non-finite, unknown machine or axis).
    pub rejected: u64,
}

impl FeedStats {
    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// SampleRejected
// ---------------------------------------------------------------------------

/// Why a sample was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// NaN or infinite value; never allowed near axis math.
    NonFinite,
    /// No machine registered under the sample's id.
    UnknownMachine,
    /// The machine has no axis with the sample's id.
    UnknownAxis,
}

/// A sample was dropped this tick. Reported, never fatal.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SampleRejected {
    pub machine: MachineId,
    pub axis: String,
    pub reason: RejectReason,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
