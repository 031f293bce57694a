use nalgebra::{UnitVector3, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// wrap_degrees
// ---------------------------------------------------------------------------

/// Wrap a degree value into `[0, 360)` via Euclidean remainder.
///
/// Idempotent: applying it to an already-wrapped value returns the value
/// bit-for-bit.
#[must_use]
pub fn wrap_degrees(degrees: f32) -> f32 {
    degrees.rem_euclid(360.0)
}

// ---------------------------------------------------------------------------
// AxisKind
// ---------------------------------------------------------------------------

/// How an axis contributes to forward kinematics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    /// Rotation about `direction`, value in degrees.
    Rotary,
    /// Translation along `direction`, value in length units.
    Linear,
    /// Placeholder joint: holds a value but produces no motion.
    Fixed,
}

impl AxisKind {
    /// Whether this kind moves anything (`Fixed` does not).
    #[must_use]
    pub const fn is_actuated(&self) -> bool {
        !matches!(self, Self::Fixed)
    }
}

// ---------------------------------------------------------------------------
// AxisBounds
// ---------------------------------------------------------------------------

/// Closed value interval for a bounded axis.
///
/// Core code only ever sees real bounds: the definition layer maps the
/// wire-level "min == max means unbounded" sentinel to `None` before an
/// `Axis` is built. `min` must not exceed `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    min: f32,
    max: f32,
}

impl AxisBounds {
    /// Create bounds covering `[min, max]`.
    #[must_use]
    pub fn new(min: f32, max: f32) -> Self {
        debug_assert!(min <= max);
        Self { min, max }
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Clamp `value` into the interval.
    #[must_use]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Whether `value` lies inside the interval.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// One controllable degree of freedom.
///
/// Structure (id, kind, direction, bounds, chain link) is fixed at
/// construction; only the value fields mutate afterwards. The logical
/// `value` is private and every write runs through [`set_value`], which
/// normalizes (rotary: wrap into `[0, 360)`, then clamp; linear: clamp
/// only; fixed: store raw). Out-of-range inputs are repaired, never
/// rejected.
///
/// `external_value` is the last raw value reported by the machine's
/// controller. It is a verbatim mirror of the wire — never normalized —
/// kept separate so local IK can diverge from the sensor feed and the
/// divergence stays observable.
///
/// [`set_value`]: Axis::set_value
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    id: String,
    name: String,
    kind: AxisKind,
    value: f32,
    /// Last raw value received from the external controller.
    pub external_value: f32,
    bounds: Option<AxisBounds>,
    direction: UnitVector3<f32>,
    local_offset: Vector3<f32>,
    child: Option<String>,
    home: f32,
}

impl Axis {
    /// Create an axis at value zero with no bounds, no offset, and no child.
    ///
    /// `direction` is the rotation axis (rotary) or translation direction
    /// (linear) in the parent joint's frame.
    pub fn new(id: impl Into<String>, kind: AxisKind, direction: UnitVector3<f32>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
            value: 0.0,
            external_value: 0.0,
            bounds: None,
            direction,
            local_offset: Vector3::zeros(),
            child: None,
            home: 0.0,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Bound the axis. The current value is re-normalized under the new
    /// bounds.
    #[must_use]
    pub fn with_bounds(mut self, bounds: AxisBounds) -> Self {
        self.bounds = Some(bounds);
        self.value = self.normalized(self.value);
        self
    }

    /// Set the static translation from the parent axis's frame to this
    /// axis's frame.
    #[must_use]
    pub fn with_offset(mut self, local_offset: Vector3<f32>) -> Self {
        self.local_offset = local_offset;
        self
    }

    /// Link the next axis down the chain.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<String>) -> Self {
        self.child = Some(child.into());
        self
    }

    /// Set the power-on value. Also seeds the current value (normalized).
    #[must_use]
    pub fn with_home(mut self, home: f32) -> Self {
        self.home = home;
        self.value = self.normalized(home);
        self
    }

    // ---- Accessors ----

    /// Stable identifier, unique within a machine.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Motion kind.
    #[must_use]
    pub const fn kind(&self) -> AxisKind {
        self.kind
    }

    /// Current logical value (always normalized).
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Value bounds, if the axis is bounded.
    #[must_use]
    pub const fn bounds(&self) -> Option<AxisBounds> {
        self.bounds
    }

    /// Unit direction in the parent frame.
    #[must_use]
    pub const fn direction(&self) -> UnitVector3<f32> {
        self.direction
    }

    /// Static translation from the parent axis's frame.
    #[must_use]
    pub const fn local_offset(&self) -> Vector3<f32> {
        self.local_offset
    }

    /// Id of the next axis down the chain, if any.
    #[must_use]
    pub fn child(&self) -> Option<&str> {
        self.child.as_deref()
    }

    /// Power-on value.
    #[must_use]
    pub const fn home(&self) -> f32 {
        self.home
    }

    // ---- Value path ----

    /// Store `Normalize(raw)` and return it.
    ///
    /// Callers must not assume their exact input is echoed back: rotary
    /// values wrap into `[0, 360)` before any clamp, and bounded axes
    /// clamp. Wrap-before-clamp matters near the seam: with bounds
    /// `[350, 370]`, setting `-5` stores `355`.
    pub fn set_value(&mut self, raw: f32) -> f32 {
        self.value = self.normalized(raw);
        self.value
    }

    /// What [`set_value`](Axis::set_value) would store for `raw`, without
    /// storing it.
    #[must_use]
    pub fn normalized(&self, raw: f32) -> f32 {
        match self.kind {
            AxisKind::Rotary => {
                let wrapped = wrap_degrees(raw);
                match self.bounds {
                    Some(bounds) => bounds.clamp(wrapped),
                    None => wrapped,
                }
            }
            AxisKind::Linear => match self.bounds {
                Some(bounds) => bounds.clamp(raw),
                None => raw,
            },
            AxisKind::Fixed => raw,
        }
    }

    /// Reset the logical value to the power-on value.
    pub fn rehome(&mut self) {
        self.set_value(self.home);
    }

    /// The value expressed as a vector in the parent frame: rotation axis
    /// scaled by degrees (rotary), displacement (linear), or zero (fixed).
    #[must_use]
    pub fn local_motion(&self) -> Vector3<f32> {
        match self.kind {
            AxisKind::Rotary | AxisKind::Linear => self.direction.into_inner() * self.value,
            AxisKind::Fixed => Vector3::zeros(),
        }
    }

    // ---- Raw access for gradient probing (crate-internal) ----
    //
    // The solver perturbs values without normalization and restores them
    // bit-for-bit; probes are scratch state, not logical writes.

    pub(crate) const fn nudge_raw(&mut self, delta: f32) {
        self.value += delta;
    }

    pub(crate) const fn store_raw(&mut self, value: f32) {
        self.value = value;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
