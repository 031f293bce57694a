//! Machine definition files.
//!
//! A definition is one TOML document describing a machine's identity, its
//! axes, and its tuning. Parsed into [`MachineDef`], validated, and turned
//! into a live [`Machine`](crate::machine::Machine) by the builder.

use std::path::Path;

use nalgebra::{UnitVector3, Vector3};
use serde::{Deserialize, Serialize};

use gantry_kinematics::axis::{Axis, AxisBounds, AxisKind};
use gantry_kinematics::solver::IkParams;

use crate::error::MachineDefError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_direction() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}
const fn default_blend_speed() -> f32 {
    10.0
}

// ---------------------------------------------------------------------------
// AxisDef
// ---------------------------------------------------------------------------

/// One `[[axes]]` entry of a definition file.
///
/// `min == max` is the wire-level sentinel for "unbounded"; it is mapped to
/// no bounds during conversion, so core code never sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisDef {
    /// Stable identifier, unique within the machine.
    pub id: String,

    /// Display name (default: the id).
    #[serde(default)]
    pub name: Option<String>,

    /// Motion kind: `"rotary"`, `"linear"`, or `"fixed"`.
    pub kind: AxisKind,

    /// Rotation axis or translation direction in the parent frame
    /// (default: +Z). Normalized during conversion.
    #[serde(default = "default_direction")]
    pub direction: [f32; 3],

    /// Static translation from the parent axis's frame (default: zero).
    #[serde(default)]
    pub offset: [f32; 3],

    /// Lower bound. `min == max` means unbounded (default: 0/0).
    #[serde(default)]
    pub min: f32,

    /// Upper bound.
    #[serde(default)]
    pub max: f32,

    /// Id of the next axis down the chain.
    #[serde(default)]
    pub child: Option<String>,

    /// Power-on value (default: 0).
    #[serde(default)]
    pub home: f32,
}

impl AxisDef {
    /// Convert into a live [`Axis`].
    ///
    /// Normalizes the direction vector, maps the `min == max` sentinel to
    /// no bounds, and seeds the home value.
    pub fn to_axis(&self) -> Result<Axis, MachineDefError> {
        let direction = Vector3::new(self.direction[0], self.direction[1], self.direction[2]);
        let direction = UnitVector3::try_new(direction, 1e-6)
            .ok_or_else(|| MachineDefError::ZeroDirection(self.id.clone()))?;

        let mut axis = Axis::new(&self.id, self.kind, direction)
            .with_offset(Vector3::new(self.offset[0], self.offset[1], self.offset[2]))
            .with_home(self.home);
        if let Some(name) = &self.name {
            axis = axis.with_name(name);
        }
        if self.min > self.max {
            return Err(MachineDefError::InvertedBounds {
                axis: self.id.clone(),
            });
        }
        if self.min < self.max {
            // Re-seed home so it normalizes under the bounds.
            axis = axis
                .with_bounds(AxisBounds::new(self.min, self.max))
                .with_home(self.home);
        }
        if let Some(child) = &self.child {
            axis = axis.with_child(child);
        }
        Ok(axis)
    }
}

// ---------------------------------------------------------------------------
// InterpolationDef
// ---------------------------------------------------------------------------

/// How the actuation driver moves scene nodes toward axis values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum InterpolationDef {
    /// Assign the target pose directly every tick.
    Snap,
    /// Blend toward the target with factor `clamp(blend_speed * dt, 0, 1)`.
    Blend {
        #[serde(default = "default_blend_speed")]
        blend_speed: f32,
    },
}

impl Default for InterpolationDef {
    fn default() -> Self {
        Self::Snap
    }
}

// ---------------------------------------------------------------------------
// MachineMeta
// ---------------------------------------------------------------------------

/// The `[machine]` identity section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineMeta {
    /// Display name.
    pub name: String,

    /// Stable identifier across sessions (default: empty).
    #[serde(default)]
    pub uuid: String,

    #[serde(default)]
    pub manufacturer: String,

    #[serde(default)]
    pub model: String,

    /// Root of the kinematic chain. Defaults to the axis no other axis
    /// claims as a child.
    #[serde(default)]
    pub start_axis: Option<String>,

    #[serde(default)]
    pub interpolation: InterpolationDef,
}

// ---------------------------------------------------------------------------
// MachineDef
// ---------------------------------------------------------------------------

/// A parsed machine definition.
///
/// ```toml
/// [machine]
/// name = "demo-mill"
/// uuid = "a1b2c3"
///
/// [machine.interpolation]
/// mode = "blend"
/// blend_speed = 12.0
///
/// [ik]
/// speed = 10.0
///
/// [[axes]]
/// id = "a"
/// kind = "rotary"
/// direction = [0.0, 0.0, 1.0]
/// child = "z"
///
/// [[axes]]
/// id = "z"
/// kind = "linear"
/// offset = [0.0, 0.5, 0.0]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineDef {
    pub machine: MachineMeta,

    /// Solver tuning; every field has a default.
    #[serde(default)]
    pub ik: IkParams,

    #[serde(default)]
    pub axes: Vec<AxisDef>,
}

impl MachineDef {
    /// Parse a definition from a TOML string and validate it.
    pub fn from_str(content: &str) -> Result<Self, MachineDefError> {
        let def: Self = toml::from_str(content)?;
        def.validate()?;
        Ok(def)
    }

    /// Parse a definition file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MachineDefError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| MachineDefError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_str(&content)
    }

    /// Validate the definition. Returns the first structural fault found.
    ///
    /// Chains are linear: an axis claimed as child by two parents is
    /// rejected here, before any chain is built.
    pub fn validate(&self) -> Result<(), MachineDefError> {
        if self.axes.is_empty() {
            return Err(MachineDefError::NoAxes);
        }
        for (i, axis) in self.axes.iter().enumerate() {
            if self.axes[..i].iter().any(|other| other.id == axis.id) {
                return Err(MachineDefError::DuplicateAxis(axis.id.clone()));
            }
            let direction = Vector3::new(axis.direction[0], axis.direction[1], axis.direction[2]);
            if direction.norm() < 1e-6 {
                return Err(MachineDefError::ZeroDirection(axis.id.clone()));
            }
            if axis.min > axis.max {
                return Err(MachineDefError::InvertedBounds {
                    axis: axis.id.clone(),
                });
            }
            if let Some(child) = &axis.child {
                if *child == axis.id {
                    return Err(MachineDefError::SelfChild(axis.id.clone()));
                }
                if !self.axes.iter().any(|other| other.id == *child) {
                    return Err(MachineDefError::UnknownChild {
                        axis: axis.id.clone(),
                        child: child.clone(),
                    });
                }
                if let Some(prior) = self.axes[..i]
                    .iter()
                    .find(|other| other.child.as_deref() == Some(child.as_str()))
                {
                    return Err(MachineDefError::SharedChild {
                        child: child.clone(),
                        first: prior.id.clone(),
                        second: axis.id.clone(),
                    });
                }
            }
        }
        if let Some(start) = &self.machine.start_axis {
            if !self.axes.iter().any(|axis| axis.id == *start) {
                return Err(MachineDefError::UnknownStart(start.clone()));
            }
        }
        self.ik.validate()?;
        Ok(())
    }

    /// The chain root: the explicit `start_axis`, or the first axis (in
    /// declaration order) that no other axis claims as a child.
    #[must_use]
    pub fn start_axis(&self) -> Option<&str> {
        if let Some(start) = &self.machine.start_axis {
            return Some(start);
        }
        self.axes
            .iter()
            .find(|axis| {
                !self
                    .axes
                    .iter()
                    .any(|other| other.child.as_deref() == Some(axis.id.as_str()))
            })
            .map(|axis| axis.id.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MILL_DEF: &str = r#"
        [machine]
        name = "demo-mill"
        uuid = "a1b2c3"
        manufacturer = "Acme"
        model = "VF-2"

        [machine.interpolation]
        mode = "blend"
        blend_speed = 12.0

        [ik]
        speed = 8.0

        [[axes]]
        id = "a"
        name = "A rotary table"
        kind = "rotary"
        direction = [0.0, 0.0, 1.0]
        min = 350.0
        max = 370.0
        child = "z"
        home = 355.0

        [[axes]]
        id = "z"
        kind = "linear"
        direction = [0.0, 0.0, 1.0]
        offset = [0.0, 0.5, 0.0]
    "#;

    fn axis_def(id: &str) -> AxisDef {
        AxisDef {
            id: id.into(),
            name: None,
            kind: AxisKind::Rotary,
            direction: [0.0, 0.0, 1.0],
            offset: [0.0; 3],
            min: 0.0,
            max: 0.0,
            child: None,
            home: 0.0,
        }
    }

    fn two_axis_def() -> MachineDef {
        MachineDef {
            machine: MachineMeta {
                name: "m".into(),
                uuid: String::new(),
                manufacturer: String::new(),
                model: String::new(),
                start_axis: None,
                interpolation: InterpolationDef::default(),
            },
            ik: IkParams::default(),
            axes: vec![
                AxisDef {
                    child: Some("b".into()),
                    ..axis_def("a")
                },
                axis_def("b"),
            ],
        }
    }

    // ---- parsing ----

    #[test]
    fn def_parses_and_validates() {
        let def = MachineDef::from_str(MILL_DEF).unwrap();
        assert_eq!(def.machine.name, "demo-mill");
        assert_eq!(def.machine.uuid, "a1b2c3");
        assert_eq!(
            def.machine.interpolation,
            InterpolationDef::Blend { blend_speed: 12.0 }
        );
        assert_eq!(def.ik.speed, 8.0);
        assert_eq!(def.axes.len(), 2);
        assert_eq!(def.axes[0].name.as_deref(), Some("A rotary table"));
        assert_eq!(def.axes[1].offset, [0.0, 0.5, 0.0]);
    }

    #[test]
    fn def_defaults_apply() {
        let def = MachineDef::from_str(
            r#"
            [machine]
            name = "m"

            [[axes]]
            id = "only"
            kind = "rotary"
            "#,
        )
        .unwrap();
        assert_eq!(def.machine.interpolation, InterpolationDef::Snap);
        assert_eq!(def.axes[0].direction, [0.0, 0.0, 1.0]);
        assert_eq!(def.ik, IkParams::default());
    }

    #[test]
    fn def_rejects_bad_toml() {
        assert!(matches!(
            MachineDef::from_str("machine = 3"),
            Err(MachineDefError::Parse(_))
        ));
    }

    #[test]
    fn from_file_missing_reports_path() {
        let err = MachineDef::from_file("/nonexistent/mill.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/mill.toml"));
    }

    // ---- validation ----

    #[test]
    fn validate_rejects_empty_axes() {
        let mut def = two_axis_def();
        def.axes.clear();
        assert!(matches!(def.validate(), Err(MachineDefError::NoAxes)));
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let mut def = two_axis_def();
        def.axes[1].id = "a".into();
        // "a" now links to a child named "b" that no longer exists, but the
        // duplicate is found first.
        def.axes[0].child = None;
        assert!(matches!(
            def.validate(),
            Err(MachineDefError::DuplicateAxis(id)) if id == "a"
        ));
    }

    #[test]
    fn validate_rejects_unknown_child() {
        let mut def = two_axis_def();
        def.axes[0].child = Some("ghost".into());
        assert!(matches!(
            def.validate(),
            Err(MachineDefError::UnknownChild { child, .. }) if child == "ghost"
        ));
    }

    #[test]
    fn validate_rejects_self_child() {
        let mut def = two_axis_def();
        def.axes[0].child = Some("a".into());
        assert!(matches!(
            def.validate(),
            Err(MachineDefError::SelfChild(id)) if id == "a"
        ));
    }

    #[test]
    fn validate_rejects_shared_child() {
        let mut def = two_axis_def();
        def.axes.push(AxisDef {
            child: Some("b".into()),
            ..axis_def("c")
        });
        assert!(matches!(
            def.validate(),
            Err(MachineDefError::SharedChild { child, first, second })
                if child == "b" && first == "a" && second == "c"
        ));
    }

    #[test]
    fn validate_rejects_zero_direction() {
        let mut def = two_axis_def();
        def.axes[0].direction = [0.0; 3];
        assert!(matches!(
            def.validate(),
            Err(MachineDefError::ZeroDirection(id)) if id == "a"
        ));
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let mut def = two_axis_def();
        def.axes[0].min = 10.0;
        def.axes[0].max = 5.0;
        assert!(matches!(
            def.validate(),
            Err(MachineDefError::InvertedBounds { axis }) if axis == "a"
        ));
    }

    #[test]
    fn validate_rejects_unknown_start() {
        let mut def = two_axis_def();
        def.machine.start_axis = Some("ghost".into());
        assert!(matches!(
            def.validate(),
            Err(MachineDefError::UnknownStart(id)) if id == "ghost"
        ));
    }

    #[test]
    fn validate_rejects_bad_solver_params() {
        let mut def = two_axis_def();
        def.ik.sampling_distance = 0.0;
        assert!(matches!(def.validate(), Err(MachineDefError::Solver(_))));
    }

    // ---- start axis resolution ----

    #[test]
    fn start_axis_defaults_to_unreferenced() {
        let def = two_axis_def();
        assert_eq!(def.start_axis(), Some("a"));
    }

    #[test]
    fn start_axis_explicit_wins() {
        let mut def = two_axis_def();
        def.machine.start_axis = Some("b".into());
        assert_eq!(def.start_axis(), Some("b"));
    }

    // ---- conversion ----

    #[test]
    fn to_axis_maps_sentinel_to_unbounded() {
        let axis = axis_def("a").to_axis().unwrap();
        assert!(axis.bounds().is_none());
    }

    #[test]
    fn to_axis_applies_bounds_and_home() {
        let def = AxisDef {
            min: 350.0,
            max: 370.0,
            home: -5.0,
            ..axis_def("a")
        };
        let axis = def.to_axis().unwrap();
        let bounds = axis.bounds().unwrap();
        assert_eq!(bounds.min(), 350.0);
        assert_eq!(bounds.max(), 370.0);
        // Home seeds through normalization: -5 wraps to 355.
        assert_eq!(axis.value(), 355.0);
    }

    #[test]
    fn to_axis_normalizes_direction() {
        let def = AxisDef {
            direction: [0.0, 3.0, 0.0],
            ..axis_def("a")
        };
        let axis = def.to_axis().unwrap();
        assert!((axis.direction().into_inner().y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn to_axis_name_falls_back_to_id() {
        let axis = axis_def("a4").to_axis().unwrap();
        assert_eq!(axis.name(), "a4");
    }
}
