//! Live machine state.
//!
//! A [`Machine`] owns its kinematic chain, its auxiliary axes, and the
//! tuning that the per-tick systems read: root pose, interpolation mode,
//! solver parameters, and the telemetry-tracking switch.

use nalgebra::Isometry3;

use gantry_kinematics::axis::Axis;
use gantry_kinematics::chain::KinematicChain;
use gantry_kinematics::solver::IkParams;

use crate::def::{AxisDef, InterpolationDef, MachineDef};
use crate::error::MachineDefError;

// ---------------------------------------------------------------------------
// MachineInfo
// ---------------------------------------------------------------------------

/// Identity fields, carried verbatim from the definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineInfo {
    pub name: String,
    pub uuid: String,
    pub manufacturer: String,
    pub model: String,
}

// ---------------------------------------------------------------------------
// InterpolationMode
// ---------------------------------------------------------------------------

/// How the actuation driver moves scene nodes toward axis values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterpolationMode {
    /// Assign the target pose directly every tick.
    Snap,
    /// Blend toward the target with factor `clamp(speed * dt, 0, 1)`.
    Blend { speed: f32 },
}

impl From<InterpolationDef> for InterpolationMode {
    fn from(def: InterpolationDef) -> Self {
        match def {
            InterpolationDef::Snap => Self::Snap,
            InterpolationDef::Blend { blend_speed } => Self::Blend { speed: blend_speed },
        }
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// One machine instance: identity, chain, auxiliary axes, and tuning.
///
/// Auxiliary axes are axes the definition declares but the chain does not
/// reach (probes, magazines). They hold values and receive telemetry like
/// chain axes, but contribute nothing to the end-effector pose.
///
/// `feed_tracking` arbitrates the two writers of logical axis values: while
/// `true` telemetry drives them, while `false` an IK goal owns them and
/// telemetry only updates the external mirror.
#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    info: MachineInfo,
    chain: KinematicChain,
    aux: Vec<Axis>,
    root_pose: Isometry3<f32>,
    interpolation: InterpolationMode,
    ik: IkParams,
    feed_tracking: bool,
}

impl Machine {
    /// Build a machine from a validated definition.
    ///
    /// Validates, converts every axis, resolves the start axis, and builds
    /// the chain; leftover axes become auxiliary. The root pose starts at
    /// identity; the spawner overrides it from the placement.
    pub fn from_def(def: &MachineDef) -> Result<Self, MachineDefError> {
        def.validate()?;
        let axes = def
            .axes
            .iter()
            .map(AxisDef::to_axis)
            .collect::<Result<Vec<_>, _>>()?;
        // validate() guarantees at least one axis; a cycle through every
        // axis can still leave no unreferenced root.
        let start = def
            .start_axis()
            .ok_or_else(|| MachineDefError::UnknownStart(String::new()))?
            .to_string();
        let (chain, aux) = KinematicChain::build(axes, &start)?;

        Ok(Self {
            info: MachineInfo {
                name: def.machine.name.clone(),
                uuid: def.machine.uuid.clone(),
                manufacturer: def.machine.manufacturer.clone(),
                model: def.machine.model.clone(),
            },
            chain,
            aux,
            root_pose: Isometry3::identity(),
            interpolation: def.machine.interpolation.into(),
            ik: def.ik.clone(),
            feed_tracking: true,
        })
    }

    // ---- Accessors ----

    #[must_use]
    pub fn info(&self) -> &MachineInfo {
        &self.info
    }

    #[must_use]
    pub fn chain(&self) -> &KinematicChain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut KinematicChain {
        &mut self.chain
    }

    /// Axes outside the kinematic chain.
    #[must_use]
    pub fn aux_axes(&self) -> &[Axis] {
        &self.aux
    }

    #[must_use]
    pub fn root_pose(&self) -> &Isometry3<f32> {
        &self.root_pose
    }

    pub fn set_root_pose(&mut self, pose: Isometry3<f32>) {
        self.root_pose = pose;
    }

    #[must_use]
    pub const fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }

    #[must_use]
    pub const fn ik_params(&self) -> &IkParams {
        &self.ik
    }

    /// Whether telemetry currently drives logical axis values.
    #[must_use]
    pub const fn feed_tracking(&self) -> bool {
        self.feed_tracking
    }

    pub fn set_feed_tracking(&mut self, tracking: bool) {
        self.feed_tracking = tracking;
    }

    /// Number of actuated chain axes.
    #[must_use]
    pub fn dof(&self) -> usize {
        self.chain
            .axes()
            .iter()
            .filter(|axis| axis.kind().is_actuated())
            .count()
    }

    /// Ids of all axes, chain order first, then auxiliary.
    #[must_use]
    pub fn axis_ids(&self) -> Vec<&str> {
        self.chain
            .axes()
            .iter()
            .chain(self.aux.iter())
            .map(Axis::id)
            .collect()
    }

    /// Look up any axis by id: chain first, then auxiliary.
    #[must_use]
    pub fn axis(&self, id: &str) -> Option<&Axis> {
        self.chain
            .axis_by_id(id)
            .or_else(|| self.aux.iter().find(|axis| axis.id() == id))
    }

    /// Look up any axis by id, mutably.
    pub fn axis_mut(&mut self, id: &str) -> Option<&mut Axis> {
        if self.chain.axis_by_id(id).is_some() {
            return self.chain.axis_mut_by_id(id);
        }
        self.aux.iter_mut().find(|axis| axis.id() == id)
    }

    /// Reset every axis to its power-on value.
    pub fn rehome_all(&mut self) {
        for axis in self.chain.axes_mut() {
            axis.rehome();
        }
        for axis in &mut self.aux {
            axis.rehome();
        }
    }

    /// End-effector pose under the stored root pose.
    #[must_use]
    pub fn end_effector_pose(&self) -> Isometry3<f32> {
        self.chain.forward_kinematics(&self.root_pose)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
