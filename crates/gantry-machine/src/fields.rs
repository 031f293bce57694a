//! Tagged per-axis field accessors.
//!
//! Generic field editing (UI panels, scripting consoles) addresses axis
//! scalars by wire name. [`AxisField`] is the closed accessor table that
//! replaces by-name reflection: the addressable set is fixed at compile
//! time and every write goes through the axis's own rules.

use gantry_kinematics::axis::Axis;

/// Externally addressable scalar fields of an [`Axis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisField {
    /// Logical value; writes go through normalization.
    Value,
    /// Raw external mirror; writes store verbatim.
    ExternalValue,
    /// Lower bound (read-only; the sentinel 0 when unbounded).
    Min,
    /// Upper bound (read-only; the sentinel 0 when unbounded).
    Max,
    /// Power-on value (read-only).
    Home,
}

impl AxisField {
    /// All addressable fields, in wire-name order.
    pub const ALL: [Self; 5] = [
        Self::Value,
        Self::ExternalValue,
        Self::Min,
        Self::Max,
        Self::Home,
    ];

    /// Parse a wire name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "value" => Some(Self::Value),
            "external_value" => Some(Self::ExternalValue),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "home" => Some(Self::Home),
            _ => None,
        }
    }

    /// The wire name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::ExternalValue => "external_value",
            Self::Min => "min",
            Self::Max => "max",
            Self::Home => "home",
        }
    }

    /// Read the field from an axis.
    #[must_use]
    pub fn read(&self, axis: &Axis) -> f32 {
        match self {
            Self::Value => axis.value(),
            Self::ExternalValue => axis.external_value,
            Self::Min => axis.bounds().map_or(0.0, |bounds| bounds.min()),
            Self::Max => axis.bounds().map_or(0.0, |bounds| bounds.max()),
            Self::Home => axis.home(),
        }
    }

    /// Write the field, returning `false` for read-only fields.
    ///
    /// `Value` writes land normalized; `ExternalValue` writes land raw.
    /// Bounds and home are structural and cannot be edited at runtime.
    pub fn write(&self, axis: &mut Axis, value: f32) -> bool {
        match self {
            Self::Value => {
                axis.set_value(value);
                true
            }
            Self::ExternalValue => {
                axis.external_value = value;
                true
            }
            Self::Min | Self::Max | Self::Home => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
