//! Controller link supervision.
//!
//! [`LinkMonitor`] is a small state machine the host drives from its own
//! connection code: it decides *when* to dial, the host does the dialing.
//! Reconnection uses capped exponential backoff with a bounded attempt
//! budget; once the budget is spent the link parks in
//! [`LinkState::Disconnected`] until the host calls
//! [`begin`](LinkMonitor::begin) again.

use std::time::Duration;

// ---------------------------------------------------------------------------
// LinkState
// ---------------------------------------------------------------------------

/// Where the controller link currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Not connected and not trying; the retry budget is spent or the
    /// monitor was never started.
    Disconnected,
    /// Dialing, or waiting out a backoff window before the next dial.
    Connecting,
    /// Link up; telemetry is expected to flow.
    Connected,
}

/// What the host should do after advancing the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// Nothing to do this tick.
    Idle,
    /// Start connection attempt number `attempt` (1-based).
    Dial { attempt: u32 },
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Backoff schedule for reconnection attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Wait after the first failure.
    pub initial_backoff: Duration,
    /// Growth factor applied after each failure.
    pub multiplier: f32,
    /// Backoff never exceeds this.
    pub max_backoff: Duration,
    /// Total dial attempts before giving up.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(500),
            multiplier: 2.0,
            max_backoff: Duration::from_secs(30),
            max_attempts: 8,
        }
    }
}

// ---------------------------------------------------------------------------
// LinkMonitor
// ---------------------------------------------------------------------------

/// Retry state machine for one controller link.
///
/// Protocol: call [`begin`](Self::begin) and dial; report each outcome
/// with [`on_connected`](Self::on_connected) or
/// [`on_error`](Self::on_error); call [`tick`](Self::tick) every tick and
/// dial again whenever it returns [`LinkAction::Dial`].
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    policy: RetryPolicy,
    state: LinkState,
    /// Dial attempts made since the last successful connect.
    attempt: u32,
    /// Wait before the next dial.
    backoff: Duration,
    waited: Duration,
    /// A dial is in flight; ignore elapsed time until its outcome lands.
    dialing: bool,
}

impl LinkMonitor {
    /// Create a monitor in the disconnected state.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            backoff: policy.initial_backoff,
            policy,
            state: LinkState::Disconnected,
            attempt: 0,
            waited: Duration::ZERO,
            dialing: false,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> LinkState {
        self.state
    }

    /// Dial attempts made since the last successful connect.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Whether the retry budget is spent.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.state == LinkState::Disconnected && self.attempt >= self.policy.max_attempts
    }

    /// Start (or restart) connecting. Resets the retry budget and asks
    /// for an immediate first dial.
    pub fn begin(&mut self) -> LinkAction {
        self.state = LinkState::Connecting;
        self.attempt = 1;
        self.backoff = self.policy.initial_backoff;
        self.waited = Duration::ZERO;
        self.dialing = true;
        LinkAction::Dial { attempt: 1 }
    }

    /// The in-flight dial succeeded.
    pub fn on_connected(&mut self) {
        self.state = LinkState::Connected;
        self.attempt = 0;
        self.backoff = self.policy.initial_backoff;
        self.waited = Duration::ZERO;
        self.dialing = false;
    }

    /// A dial failed, or an established link dropped.
    pub fn on_error(&mut self) {
        match self.state {
            LinkState::Connected => {
                // Fresh outage: new retry cycle at the initial backoff.
                self.state = LinkState::Connecting;
                self.attempt = 0;
                self.backoff = self.policy.initial_backoff;
                self.waited = Duration::ZERO;
                self.dialing = false;
            }
            LinkState::Connecting => {
                self.dialing = false;
                self.waited = Duration::ZERO;
                if self.attempt >= self.policy.max_attempts {
                    self.state = LinkState::Disconnected;
                }
            }
            LinkState::Disconnected => {}
        }
    }

    /// Advance the backoff clock. Returns [`LinkAction::Dial`] when a
    /// backoff window has elapsed and another attempt is due.
    pub fn tick(&mut self, dt: Duration) -> LinkAction {
        if self.state != LinkState::Connecting || self.dialing {
            return LinkAction::Idle;
        }
        self.waited += dt;
        if self.waited >= self.backoff {
            self.attempt += 1;
            self.waited = Duration::ZERO;
            self.dialing = true;
            // Grow the window for the attempt after this one.
            let grown = self.backoff.mul_f64(f64::from(self.policy.multiplier));
            self.backoff = grown.min(self.policy.max_backoff);
            return LinkAction::Dial {
                attempt: self.attempt,
            };
        }
        LinkAction::Idle
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
