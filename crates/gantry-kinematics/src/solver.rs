use nalgebra::{Isometry3, UnitQuaternion, Vector3};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::chain::KinematicChain;

// ---------------------------------------------------------------------------
// SolverError
// ---------------------------------------------------------------------------

/// Solver configuration errors. Checked once at construction; the per-tick
/// step path has no error branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("Invalid solver parameter {field}: {message}")]
    InvalidParams {
        field: &'static str,
        message: &'static str,
    },
}

// ---------------------------------------------------------------------------
// IkParams
// ---------------------------------------------------------------------------

const fn default_speed() -> f32 {
    10.0
}
const fn default_sampling_distance() -> f32 {
    0.5
}
const fn default_epsilon_distance() -> f32 {
    1e-4
}
const fn default_epsilon_angle() -> f32 {
    0.5
}

fn clamped_weight<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    f32::deserialize(deserializer).map(|weight| weight.clamp(0.0, 1.0))
}

/// Tuning for the gradient-descent solver.
///
/// Embeddable in machine definition TOML under `[ik]`; every field has a
/// default. `weight` blends the two error terms — squared distance
/// (position) and degrees (orientation) — and is clamped to `[0, 1]` on
/// every assignment path, deserialization included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkParams {
    /// Axis adjustment rate: degrees (rotary) or length units (linear)
    /// per second.
    pub speed: f32,

    /// Finite-difference probe step. Must be positive.
    pub sampling_distance: f32,

    /// Convergence threshold on squared distance to the target position.
    pub epsilon_distance: f32,

    /// Convergence threshold on angular difference to the target
    /// orientation, in degrees.
    pub epsilon_angle: f32,

    #[serde(deserialize_with = "clamped_weight")]
    weight: f32,
}

impl Default for IkParams {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            sampling_distance: default_sampling_distance(),
            epsilon_distance: default_epsilon_distance(),
            epsilon_angle: default_epsilon_angle(),
            weight: 0.0,
        }
    }
}

impl IkParams {
    /// Position/orientation blend, in `[0, 1]`: 0 is pure position,
    /// 1 is pure orientation.
    #[must_use]
    pub const fn weight(&self) -> f32 {
        self.weight
    }

    /// Set the blend weight, clamped to `[0, 1]`.
    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight.clamp(0.0, 1.0);
    }

    /// Builder form of [`set_weight`](Self::set_weight).
    #[must_use]
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.set_weight(weight);
        self
    }

    /// Validate tuning. Returns Err on values that would poison the
    /// numerics (a zero probe step divides by zero).
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.sampling_distance > 0.0) {
            return Err(SolverError::InvalidParams {
                field: "sampling_distance",
                message: "must be > 0",
            });
        }
        if !(self.speed >= 0.0) {
            return Err(SolverError::InvalidParams {
                field: "speed",
                message: "must be >= 0",
            });
        }
        if !(self.epsilon_distance >= 0.0) {
            return Err(SolverError::InvalidParams {
                field: "epsilon_distance",
                message: "must be >= 0",
            });
        }
        if !(self.epsilon_angle >= 0.0) {
            return Err(SolverError::InvalidParams {
                field: "epsilon_angle",
                message: "must be >= 0",
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// IkGoal
// ---------------------------------------------------------------------------

/// Target pose for the end effector, in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct IkGoal {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

impl IkGoal {
    /// Goal with both position and orientation.
    #[must_use]
    pub const fn new(position: Vector3<f32>, orientation: UnitQuaternion<f32>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Goal caring only about position (identity orientation; pair with a
    /// zero weight).
    #[must_use]
    pub fn position_only(position: Vector3<f32>) -> Self {
        Self {
            position,
            orientation: UnitQuaternion::identity(),
        }
    }
}

// ---------------------------------------------------------------------------
// IkStep
// ---------------------------------------------------------------------------

/// Report of one solver step.
///
/// `settled` means both epsilon thresholds held *before* stepping and no
/// axis was touched; the error fields always describe the chain as the
/// step left it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkStep {
    pub settled: bool,
    pub position_error_sq: f32,
    pub orientation_error: f32,
}

// ---------------------------------------------------------------------------
// GradientSolver
// ---------------------------------------------------------------------------

/// One-step-per-tick numeric IK.
///
/// Not a batch solver: each [`step`](Self::step) performs at most one
/// speed-clamped update per axis and returns. Callers invoke it every tick
/// while a goal is active; it self-terminates (no-op) once within both
/// epsilon thresholds. Convergence is not guaranteed — an unreachable goal
/// keeps the controller stepping, which is normal operation.
#[derive(Debug, Clone)]
pub struct GradientSolver {
    params: IkParams,
}

impl GradientSolver {
    /// Create a solver, validating `params` once up front.
    pub fn new(params: IkParams) -> Result<Self, SolverError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Tuning in effect.
    #[must_use]
    pub const fn params(&self) -> &IkParams {
        &self.params
    }

    /// Perform one bounded descent step toward `goal`.
    ///
    /// For each axis in chain order: probe the blended error with the
    /// axis's value perturbed by `+sampling_distance` (raw, restored
    /// bit-for-bit afterwards), then move the value one `speed * dt` step
    /// against the gradient sign. Writes go through normalization; a zero
    /// gradient moves nothing. Later axes see earlier axes' updates within
    /// the same step. `dt <= 0` performs no updates.
    pub fn step(
        &self,
        chain: &mut KinematicChain,
        root: &Isometry3<f32>,
        goal: &IkGoal,
        dt: f32,
    ) -> IkStep {
        let (position_error_sq, orientation_error) = error_terms(chain, root, goal);
        if position_error_sq < self.params.epsilon_distance
            && orientation_error < self.params.epsilon_angle
        {
            return IkStep {
                settled: true,
                position_error_sq,
                orientation_error,
            };
        }
        if dt <= 0.0 {
            return IkStep {
                settled: false,
                position_error_sq,
                orientation_error,
            };
        }

        let step_len = self.params.speed * dt;
        for i in 0..chain.len() {
            let f0 = self.blended_error(chain, root, goal);

            let saved = chain.axes[i].value();
            chain.axes[i].nudge_raw(self.params.sampling_distance);
            let f1 = self.blended_error(chain, root, goal);
            chain.axes[i].store_raw(saved);

            let gradient = (f1 - f0) / self.params.sampling_distance;
            if gradient != 0.0 {
                let next = saved - gradient.signum() * step_len;
                chain.axes[i].set_value(next);
            }
        }

        let (position_error_sq, orientation_error) = error_terms(chain, root, goal);
        IkStep {
            settled: false,
            position_error_sq,
            orientation_error,
        }
    }

    /// The scalar the gradient descends: position and orientation error
    /// blended by `weight`.
    #[must_use]
    pub fn blended_error(
        &self,
        chain: &KinematicChain,
        root: &Isometry3<f32>,
        goal: &IkGoal,
    ) -> f32 {
        let (distance_sq, angle) = error_terms(chain, root, goal);
        distance_sq + (angle - distance_sq) * self.params.weight
    }
}

/// Squared distance to the goal position and angular difference to the
/// goal orientation (degrees) for the chain's current pose.
fn error_terms(chain: &KinematicChain, root: &Isometry3<f32>, goal: &IkGoal) -> (f32, f32) {
    let pose = chain.forward_kinematics(root);
    let distance_sq = (pose.translation.vector - goal.position).norm_squared();
    let angle = pose.rotation.angle_to(&goal.orientation).to_degrees();
    (distance_sq, angle)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{Axis, AxisKind};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    const DT: f32 = 0.016;

    /// Rotary shoulder about Z with a 1-unit link out along X to a linear
    /// tool axis.
    fn planar_chain(start_deg: f32) -> KinematicChain {
        let shoulder = Axis::new("shoulder", AxisKind::Rotary, Vector3::z_axis())
            .with_home(start_deg)
            .with_child("extend");
        let extend = Axis::new("extend", AxisKind::Linear, Vector3::x_axis())
            .with_offset(Vector3::new(1.0, 0.0, 0.0));
        let (chain, _) = KinematicChain::build(vec![shoulder, extend], "shoulder").unwrap();
        chain
    }

    fn solver() -> GradientSolver {
        GradientSolver::new(IkParams::default()).unwrap()
    }

    // ---- Parameter validation ----

    #[test]
    fn params_defaults_validate() {
        assert!(IkParams::default().validate().is_ok());
    }

    #[test]
    fn zero_sampling_distance_is_rejected() {
        let params = IkParams {
            sampling_distance: 0.0,
            ..IkParams::default()
        };
        let err = GradientSolver::new(params).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid solver parameter sampling_distance: must be > 0"
        );
    }

    #[test]
    fn negative_speed_is_rejected() {
        let params = IkParams {
            speed: -1.0,
            ..IkParams::default()
        };
        assert!(GradientSolver::new(params).is_err());
    }

    #[test]
    fn weight_is_clamped_on_every_path() {
        let mut params = IkParams::default();
        params.set_weight(3.0);
        assert_eq!(params.weight(), 1.0);
        params.set_weight(-0.5);
        assert_eq!(params.weight(), 0.0);

        let built = IkParams::default().with_weight(7.0);
        assert_eq!(built.weight(), 1.0);

        let parsed: IkParams = toml::from_str("weight = 2.5").unwrap();
        assert_eq!(parsed.weight(), 1.0);
    }

    #[test]
    fn params_parse_from_toml_with_defaults() {
        let parsed: IkParams = toml::from_str("speed = 4.0").unwrap();
        assert_eq!(parsed.speed, 4.0);
        assert_eq!(parsed.sampling_distance, default_sampling_distance());
        assert_eq!(parsed.weight(), 0.0);
    }

    // ---- Stepping behavior ----

    #[test]
    fn step_descends_monotonically() {
        // Only the shoulder is off-target; 50 ticks must never increase
        // the blended error.
        let mut chain = planar_chain(90.0);
        let solver = solver();
        let goal = IkGoal::position_only(Vector3::new(1.0, 0.0, 0.0));
        let root = Isometry3::identity();

        let mut previous = solver.blended_error(&chain, &root, &goal);
        for tick in 0..50 {
            solver.step(&mut chain, &root, &goal, DT);
            let current = solver.blended_error(&chain, &root, &goal);
            assert!(
                current <= previous + 1e-6,
                "error rose at tick {tick}: {previous} -> {current}"
            );
            previous = current;
        }
    }

    #[test]
    fn planar_chain_converges_and_stays_stable() {
        let mut chain = planar_chain(60.0);
        let solver = solver();
        let goal = IkGoal::position_only(Vector3::new(1.0, 0.0, 0.0));
        let root = Isometry3::identity();

        let mut settled_at = None;
        for tick in 0..500 {
            if solver.step(&mut chain, &root, &goal, DT).settled {
                settled_at = Some(tick);
                break;
            }
        }
        let settled_at = settled_at.expect("did not settle within 500 ticks");
        assert!(settled_at < 500);

        // Shoulder came home to (near) zero degrees, modulo the wrap.
        let shoulder = chain.axis_by_id("shoulder").unwrap().value();
        let folded = if shoulder > 180.0 {
            shoulder - 360.0
        } else {
            shoulder
        };
        assert!(folded.abs() < 0.5, "shoulder ended at {shoulder}");

        // And stays put for 1000 further ticks.
        let frozen = chain.values();
        for _ in 0..1000 {
            let report = solver.step(&mut chain, &root, &goal, DT);
            assert!(report.settled);
        }
        assert_eq!(chain.values(), frozen);
    }

    #[test]
    fn settled_step_is_idempotent() {
        let mut chain = planar_chain(0.0);
        let solver = solver();
        let goal = IkGoal::position_only(Vector3::new(1.0, 0.0, 0.0));
        let root = Isometry3::identity();

        let report = solver.step(&mut chain, &root, &goal, DT);
        assert!(report.settled);
        assert!(report.position_error_sq < IkParams::default().epsilon_distance);

        let before = chain.values();
        for _ in 0..10 {
            solver.step(&mut chain, &root, &goal, DT);
        }
        assert_eq!(chain.values(), before);
    }

    #[test]
    fn probing_leaves_no_residue() {
        // After one step every value must sit exactly one step-length (or
        // zero) from where it started — never the probe distance.
        let mut chain = planar_chain(30.0);
        chain.axis_mut_by_id("extend").unwrap().set_value(0.2);
        let solver = solver();
        let goal = IkGoal::position_only(Vector3::new(0.4, 0.9, 0.0));
        let root = Isometry3::identity();

        let before = chain.values();
        solver.step(&mut chain, &root, &goal, DT);
        let after = chain.values();

        let step_len = IkParams::default().speed * DT;
        for (b, a) in before.iter().zip(&after) {
            let moved = (a - b).abs();
            let ok = moved < 1e-5 || (moved - step_len).abs() < 1e-4;
            assert!(ok, "axis moved {moved}, expected 0 or {step_len}");
        }
    }

    #[test]
    fn last_axis_value_never_drifts() {
        // The tool axis's own value cannot affect the tip, so its gradient
        // is exactly zero and the solver must not walk it.
        let mut chain = planar_chain(45.0);
        let solver = solver();
        let goal = IkGoal::position_only(Vector3::new(1.0, 0.0, 0.0));
        let root = Isometry3::identity();

        for _ in 0..100 {
            solver.step(&mut chain, &root, &goal, DT);
        }
        assert_eq!(chain.axis_by_id("extend").unwrap().value(), 0.0);
    }

    #[test]
    fn zero_dt_performs_no_update() {
        let mut chain = planar_chain(90.0);
        let solver = solver();
        let goal = IkGoal::position_only(Vector3::new(1.0, 0.0, 0.0));
        let root = Isometry3::identity();

        let before = chain.values();
        let report = solver.step(&mut chain, &root, &goal, 0.0);
        assert!(!report.settled);
        assert_eq!(chain.values(), before);
    }

    #[test]
    fn step_respects_bounds() {
        use crate::axis::AxisBounds;
        // Shoulder held in a narrow window: descent toward the target may
        // not escape it.
        let shoulder = Axis::new("shoulder", AxisKind::Rotary, Vector3::z_axis())
            .with_bounds(AxisBounds::new(80.0, 100.0))
            .with_home(90.0)
            .with_child("flange");
        let flange = Axis::new("flange", AxisKind::Fixed, Vector3::x_axis())
            .with_offset(Vector3::new(1.0, 0.0, 0.0));
        let (mut chain, _) = KinematicChain::build(vec![shoulder, flange], "shoulder").unwrap();

        let solver = solver();
        let goal = IkGoal::position_only(Vector3::new(1.0, 0.0, 0.0));
        let root = Isometry3::identity();
        for _ in 0..2000 {
            solver.step(&mut chain, &root, &goal, DT);
        }
        let value = chain.axis_by_id("shoulder").unwrap().value();
        assert!((80.0..=100.0).contains(&value), "escaped bounds: {value}");
        // Pinned against the boundary nearest the target.
        assert_relative_eq!(value, 80.0, epsilon = 1e-3);
    }

    #[test]
    fn orientation_weight_steers_rotation() {
        // Weight 1 puts the whole blended error on orientation: the wrist
        // turns home even though the position goal stays out of reach.
        let wrist = Axis::new("wrist", AxisKind::Rotary, Vector3::z_axis())
            .with_home(10.0)
            .with_child("flange");
        let flange = Axis::new("flange", AxisKind::Fixed, Vector3::x_axis());
        let (mut chain, _) = KinematicChain::build(vec![wrist, flange], "wrist").unwrap();

        let params = IkParams::default().with_weight(1.0);
        let solver = GradientSolver::new(params).unwrap();
        let goal = IkGoal::new(
            Vector3::new(50.0, 50.0, 50.0), // out of reach on purpose
            UnitQuaternion::identity(),
        );
        let root = Isometry3::identity();

        let mut report = solver.step(&mut chain, &root, &goal, DT);
        for _ in 0..200 {
            report = solver.step(&mut chain, &root, &goal, DT);
        }
        assert!(report.orientation_error < solver.params().epsilon_angle);
        // Settling needs both thresholds; the hopeless position error
        // keeps the goal active no matter how good the orientation gets.
        assert!(!report.settled);
    }
}
