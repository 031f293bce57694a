use std::fmt;
use std::ops::Sub;
use std::time::Duration;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SimTime
// ---------------------------------------------------------------------------

/// Integer-nanosecond logic clock.
///
/// Tracks elapsed simulation time as a monotonically increasing `u64`
/// nanosecond count, so long runs do not drift the way accumulated
/// floating-point deltas do.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Resource,
)]
pub struct SimTime {
    nanos: u64,
}

impl SimTime {
    /// Create a new `SimTime` at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { nanos: 0 }
    }

    /// Create a `SimTime` from a raw nanosecond count.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Create a `SimTime` from seconds (as `f64`).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_secs(secs: f64) -> Self {
        Self {
            nanos: (secs * 1_000_000_000.0) as u64,
        }
    }

    /// Raw nanosecond count.
    #[must_use]
    pub const fn nanos(&self) -> u64 {
        self.nanos
    }

    /// Elapsed milliseconds (truncated).
    #[must_use]
    pub const fn millis(&self) -> u64 {
        self.nanos / 1_000_000
    }

    /// Elapsed seconds as `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn secs_f64(&self) -> f64 {
        self.nanos as f64 / 1_000_000_000.0
    }

    /// Elapsed seconds as `f32`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn secs_f32(&self) -> f32 {
        self.nanos as f32 / 1_000_000_000.0
    }

    /// Advance the clock by `delta_nanos` nanoseconds.
    pub const fn advance(&mut self, delta_nanos: u64) {
        self.nanos = self.nanos.saturating_add(delta_nanos);
    }

    /// Advance the clock by `delta_secs` seconds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn advance_secs(&mut self, delta_secs: f64) {
        let delta_nanos = (delta_secs * 1_000_000_000.0) as u64;
        self.advance(delta_nanos);
    }

    /// Reset the clock to zero.
    pub const fn reset(&mut self) {
        self.nanos = 0;
    }
}

impl Sub for SimTime {
    type Output = Duration;

    /// Elapsed time between two instants, saturating at zero.
    fn sub(self, rhs: Self) -> Duration {
        Duration::from_nanos(self.nanos.saturating_sub(rhs.nanos))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.nanos / 1_000_000_000;
        let frac_millis = (self.nanos % 1_000_000_000) / 1_000_000;
        write!(f, "{secs}.{frac_millis:03}s")
    }
}

// ---------------------------------------------------------------------------
// TickClock
// ---------------------------------------------------------------------------

/// Fixed-timestep driver for hosts running off wall-clock frames.
///
/// Accumulates real frame deltas and dispenses fixed logic ticks, capping
/// the number of catch-up ticks per frame so a long stall drops time
/// instead of freezing the process working it off.
///
/// ```
/// use std::time::Duration;
/// use gantry_core::time::TickClock;
///
/// let mut clock = TickClock::new(0.01);
/// clock.observe(Duration::from_millis(25));
/// let mut ticks = 0;
/// while clock.step() {
///     ticks += 1;
/// }
/// assert_eq!(ticks, 2);
/// ```
#[derive(Debug, Clone)]
pub struct TickClock {
    time: SimTime,
    pending: u64,
    timestep_nanos: u64,
    timestep_secs: f64,
    max_catchup: u32,
    ticks_this_frame: u32,
}

impl TickClock {
    /// Create a clock dispensing ticks of `timestep_secs` seconds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(timestep_secs: f64) -> Self {
        Self {
            time: SimTime::new(),
            pending: 0,
            timestep_nanos: (timestep_secs * 1_000_000_000.0) as u64,
            timestep_secs,
            max_catchup: 4,
            ticks_this_frame: 0,
        }
    }

    /// Cap on catch-up ticks dispensed per observed frame.
    #[must_use]
    pub const fn with_max_catchup(mut self, max_catchup: u32) -> Self {
        self.max_catchup = max_catchup;
        self
    }

    /// Feed one real frame delta and reset the per-frame tick counter.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn observe(&mut self, delta: Duration) {
        self.pending = self.pending.saturating_add(delta.as_nanos() as u64);
        self.ticks_this_frame = 0;
    }

    /// Consume one pending tick if available.
    ///
    /// Returns `true` when the caller should run one fixed logic tick; the
    /// clock's [`now`](Self::now) has already been advanced for it. Call in
    /// a loop after [`observe`](Self::observe). Once the per-frame cap is
    /// reached the remaining backlog is discarded.
    pub const fn step(&mut self) -> bool {
        if self.ticks_this_frame >= self.max_catchup {
            self.pending = 0;
            return false;
        }
        if self.pending >= self.timestep_nanos {
            self.pending -= self.timestep_nanos;
            self.ticks_this_frame += 1;
            self.time.advance(self.timestep_nanos);
            return true;
        }
        false
    }

    /// Current logic time.
    #[must_use]
    pub const fn now(&self) -> SimTime {
        self.time
    }

    /// The fixed timestep in seconds.
    #[must_use]
    pub const fn timestep(&self) -> f64 {
        self.timestep_secs
    }

    /// Fraction of the next tick already accumulated, in `[0, 1)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn blend_alpha(&self) -> f32 {
        if self.timestep_nanos == 0 {
            return 0.0;
        }
        self.pending as f32 / self.timestep_nanos as f32
    }

    /// Reset time and pending backlog to zero.
    pub const fn reset(&mut self) {
        self.time.reset();
        self.pending = 0;
        self.ticks_this_frame = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
