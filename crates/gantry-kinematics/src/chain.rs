use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use thiserror::Error;

use crate::axis::{Axis, AxisKind, wrap_degrees};

// ---------------------------------------------------------------------------
// ChainError
// ---------------------------------------------------------------------------

/// Chain construction errors.
///
/// All of these are configuration faults, detected once at build time. A
/// built chain never fails at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Chain has no axes")]
    Empty,

    #[error("Duplicate axis id: {0}")]
    DuplicateId(String),

    #[error("Start axis not found: {0}")]
    UnknownStart(String),

    #[error("Axis {axis} links to unknown child: {child}")]
    UnknownChild { axis: String, child: String },

    #[error("Cycle detected at axis: {axis}")]
    Cycle { axis: String },
}

// ---------------------------------------------------------------------------
// KinematicChain
// ---------------------------------------------------------------------------

/// An ordered run of axes from a root to an end effector.
///
/// Built by following `child` links from a start axis; the order of the
/// input vector is irrelevant. A built chain always has at least one axis.
///
/// Forward kinematics composes, for each consecutive axis pair, the
/// parent's motion and the child's static offset:
///
/// ```text
/// Rotary:  orientation *= rotate(direction, value°)
///          position    += orientation * next.local_offset
/// Linear:  position    += direction * value
/// Fixed:   pass through
/// ```
///
/// The last axis's own value never moves the chain tip — it drives the
/// tool, not the arm.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicChain {
    pub(crate) axes: Vec<Axis>,
}

impl KinematicChain {
    /// Order `axes` by following child links from `start`.
    ///
    /// Returns the chain plus the leftover axes that were not reachable
    /// from `start` (auxiliary axes: still addressable by telemetry, not
    /// part of the kinematic run).
    ///
    /// # Errors
    ///
    /// Fails fast on an empty input, a duplicate id anywhere in the input,
    /// an unknown start id, a child link to a nonexistent axis, or a child
    /// link that revisits an axis already in the chain (cycles, including
    /// self-reference).
    pub fn build(axes: Vec<Axis>, start: &str) -> Result<(Self, Vec<Axis>), ChainError> {
        if axes.is_empty() {
            return Err(ChainError::Empty);
        }
        for (i, axis) in axes.iter().enumerate() {
            if axes[..i].iter().any(|other| other.id() == axis.id()) {
                return Err(ChainError::DuplicateId(axis.id().to_string()));
            }
        }

        let mut remaining = axes;
        let mut ordered: Vec<Axis> = Vec::new();
        let mut cursor = start.to_string();
        loop {
            if ordered.iter().any(|axis| axis.id() == cursor) {
                return Err(ChainError::Cycle { axis: cursor });
            }
            let Some(pos) = remaining.iter().position(|axis| axis.id() == cursor) else {
                return match ordered.last() {
                    None => Err(ChainError::UnknownStart(cursor)),
                    Some(prev) => Err(ChainError::UnknownChild {
                        axis: prev.id().to_string(),
                        child: cursor,
                    }),
                };
            };
            let axis = remaining.remove(pos);
            let next = axis.child().map(String::from);
            ordered.push(axis);
            match next {
                Some(child) => cursor = child,
                None => break,
            }
        }

        Ok((Self { axes: ordered }, remaining))
    }

    /// Number of axes in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// Always `false` for a built chain; present for API completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Axes in chain order, root first.
    #[must_use]
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Axes in chain order, mutably. Value writes still go through each
    /// axis's own normalization.
    pub fn axes_mut(&mut self) -> &mut [Axis] {
        &mut self.axes
    }

    /// Axis at chain position `index`.
    #[must_use]
    pub fn axis(&self, index: usize) -> Option<&Axis> {
        self.axes.get(index)
    }

    /// Look up an axis by id.
    #[must_use]
    pub fn axis_by_id(&self, id: &str) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.id() == id)
    }

    /// Look up an axis by id, mutably.
    pub fn axis_mut_by_id(&mut self, id: &str) -> Option<&mut Axis> {
        self.axes.iter_mut().find(|axis| axis.id() == id)
    }

    /// Current values in chain order.
    #[must_use]
    pub fn values(&self) -> Vec<f32> {
        self.axes.iter().map(Axis::value).collect()
    }

    /// Bulk-assign values in chain order, each through normalization.
    /// Extra values are ignored; missing trailing values leave their axes
    /// untouched.
    pub fn set_values(&mut self, values: &[f32]) {
        for (axis, value) in self.axes.iter_mut().zip(values) {
            axis.set_value(*value);
        }
    }

    /// End-effector pose for the current axis values.
    ///
    /// `root` is the machine's world pose: the chain seeds at the root
    /// position advanced by the first axis's static offset, with the
    /// root's orientation. Pure function of the values at call time —
    /// safe to evaluate as often as needed.
    #[must_use]
    pub fn forward_kinematics(&self, root: &Isometry3<f32>) -> Isometry3<f32> {
        let mut position = root.translation.vector + root.rotation * self.axes[0].local_offset();
        let mut orientation = root.rotation;

        for i in 0..self.axes.len().saturating_sub(1) {
            let axis = &self.axes[i];
            match axis.kind() {
                AxisKind::Rotary => {
                    let angle = wrap_degrees(axis.value()).to_radians();
                    orientation *= UnitQuaternion::from_axis_angle(&axis.direction(), angle);
                    position += orientation * self.axes[i + 1].local_offset();
                }
                AxisKind::Linear => {
                    position += axis.direction().into_inner() * axis.value();
                }
                AxisKind::Fixed => {}
            }
        }

        Isometry3::from_parts(Translation3::from(position), orientation)
    }

    /// Pose accumulated after each link, seed first.
    ///
    /// One entry per axis; the last entry equals
    /// [`forward_kinematics`](Self::forward_kinematics). Intended for
    /// diagnostic display of the chain, not for the per-tick solve path.
    #[must_use]
    pub fn link_poses(&self, root: &Isometry3<f32>) -> Vec<Isometry3<f32>> {
        let mut position = root.translation.vector + root.rotation * self.axes[0].local_offset();
        let mut orientation = root.rotation;
        let mut poses = Vec::with_capacity(self.axes.len());
        poses.push(Isometry3::from_parts(
            Translation3::from(position),
            orientation,
        ));

        for i in 0..self.axes.len().saturating_sub(1) {
            let axis = &self.axes[i];
            match axis.kind() {
                AxisKind::Rotary => {
                    let angle = wrap_degrees(axis.value()).to_radians();
                    orientation *= UnitQuaternion::from_axis_angle(&axis.direction(), angle);
                    position += orientation * self.axes[i + 1].local_offset();
                }
                AxisKind::Linear => {
                    position += axis.direction().into_inner() * axis.value();
                }
                AxisKind::Fixed => {}
            }
            poses.push(Isometry3::from_parts(
                Translation3::from(position),
                orientation,
            ));
        }

        poses
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisBounds;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn rotary(id: &str) -> Axis {
        Axis::new(id, AxisKind::Rotary, Vector3::z_axis())
    }

    /// Rotary shoulder at the origin plus a fixed tool flange 1 unit out
    /// along X.
    fn planar_arm() -> KinematicChain {
        let shoulder = rotary("shoulder").with_child("flange");
        let flange = Axis::new("flange", AxisKind::Fixed, Vector3::x_axis())
            .with_offset(Vector3::new(1.0, 0.0, 0.0));
        let (chain, aux) = KinematicChain::build(vec![shoulder, flange], "shoulder").unwrap();
        assert!(aux.is_empty());
        chain
    }

    // ---- build ----

    #[test]
    fn build_orders_by_child_links() {
        // Declaration order deliberately scrambled.
        let c = rotary("c");
        let a = rotary("a").with_child("b");
        let b = rotary("b").with_child("c");
        let (chain, aux) = KinematicChain::build(vec![c, a, b], "a").unwrap();
        let ids: Vec<&str> = chain.axes().iter().map(Axis::id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(aux.is_empty());
    }

    #[test]
    fn build_returns_unreachable_axes_as_aux() {
        let a = rotary("a").with_child("b");
        let b = rotary("b");
        let probe = rotary("probe");
        let (chain, aux) = KinematicChain::build(vec![a, probe, b], "a").unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(aux.len(), 1);
        assert_eq!(aux[0].id(), "probe");
    }

    #[test]
    fn build_rejects_empty_input() {
        assert_eq!(
            KinematicChain::build(vec![], "a").unwrap_err(),
            ChainError::Empty
        );
    }

    #[test]
    fn build_rejects_duplicate_ids() {
        let err = KinematicChain::build(vec![rotary("a"), rotary("a")], "a").unwrap_err();
        assert_eq!(err, ChainError::DuplicateId("a".into()));
    }

    #[test]
    fn build_rejects_unknown_start() {
        let err = KinematicChain::build(vec![rotary("a")], "missing").unwrap_err();
        assert_eq!(err, ChainError::UnknownStart("missing".into()));
    }

    #[test]
    fn build_rejects_dangling_child() {
        let a = rotary("a").with_child("ghost");
        let err = KinematicChain::build(vec![a], "a").unwrap_err();
        assert_eq!(
            err,
            ChainError::UnknownChild {
                axis: "a".into(),
                child: "ghost".into()
            }
        );
    }

    #[test]
    fn build_rejects_cycle() {
        let a = rotary("a").with_child("b");
        let b = rotary("b").with_child("a");
        let err = KinematicChain::build(vec![a, b], "a").unwrap_err();
        assert_eq!(err, ChainError::Cycle { axis: "a".into() });
    }

    #[test]
    fn build_rejects_self_reference() {
        let a = rotary("a").with_child("a");
        let err = KinematicChain::build(vec![a], "a").unwrap_err();
        assert_eq!(err, ChainError::Cycle { axis: "a".into() });
    }

    #[test]
    fn build_terminates_on_long_chain() {
        let mut axes = Vec::new();
        for i in 0..64 {
            let mut axis = rotary(&format!("j{i}"));
            if i < 63 {
                axis = axis.with_child(format!("j{}", i + 1));
            }
            axes.push(axis);
        }
        let (chain, _) = KinematicChain::build(axes, "j0").unwrap();
        assert_eq!(chain.len(), 64);
    }

    // ---- lookups and values ----

    #[test]
    fn lookup_by_id_and_index() {
        let chain = planar_arm();
        assert_eq!(chain.axis(0).unwrap().id(), "shoulder");
        assert!(chain.axis(5).is_none());
        assert_eq!(chain.axis_by_id("flange").unwrap().id(), "flange");
        assert!(chain.axis_by_id("nope").is_none());
    }

    #[test]
    fn set_values_normalizes_each() {
        let a = rotary("a")
            .with_bounds(AxisBounds::new(350.0, 370.0))
            .with_child("b");
        let b = rotary("b");
        let (mut chain, _) = KinematicChain::build(vec![a, b], "a").unwrap();
        chain.set_values(&[-5.0, 370.0]);
        assert_eq!(chain.values(), vec![355.0, 10.0]);
    }

    // ---- forward kinematics ----

    #[test]
    fn fk_zero_chain_returns_root_pose() {
        let shoulder = rotary("shoulder")
            .with_offset(Vector3::new(0.5, 0.0, 0.0))
            .with_child("flange");
        let flange = Axis::new("flange", AxisKind::Fixed, Vector3::x_axis());
        let (chain, _) = KinematicChain::build(vec![shoulder, flange], "shoulder").unwrap();

        let pose = chain.forward_kinematics(&Isometry3::identity());
        assert_relative_eq!(pose.translation.vector, Vector3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(pose.rotation.angle(), 0.0);
    }

    #[test]
    fn fk_zero_values_accumulate_static_offsets() {
        let a = rotary("a")
            .with_offset(Vector3::new(0.5, 0.0, 0.0))
            .with_child("b");
        let b = rotary("b")
            .with_offset(Vector3::new(0.25, 0.0, 0.0))
            .with_child("c");
        let c = Axis::new("c", AxisKind::Fixed, Vector3::x_axis())
            .with_offset(Vector3::new(0.25, 0.0, 0.0));
        let (chain, _) = KinematicChain::build(vec![a, b, c], "a").unwrap();

        let pose = chain.forward_kinematics(&Isometry3::identity());
        assert_relative_eq!(pose.translation.vector, Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(pose.rotation.angle(), 0.0);
    }

    #[test]
    fn fk_rotary_swings_child_offset() {
        let mut chain = planar_arm();
        chain.axis_mut_by_id("shoulder").unwrap().set_value(90.0);
        let pose = chain.forward_kinematics(&Isometry3::identity());
        assert_relative_eq!(
            pose.translation.vector,
            Vector3::new(0.0, 1.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn fk_linear_translates_along_direction() {
        let slide = Axis::new("slide", AxisKind::Linear, Vector3::z_axis()).with_child("flange");
        let flange = Axis::new("flange", AxisKind::Fixed, Vector3::x_axis());
        let (mut chain, _) = KinematicChain::build(vec![slide, flange], "slide").unwrap();
        chain.axis_mut_by_id("slide").unwrap().set_value(2.5);

        let pose = chain.forward_kinematics(&Isometry3::identity());
        assert_relative_eq!(pose.translation.vector, Vector3::new(0.0, 0.0, 2.5));
        assert_relative_eq!(pose.rotation.angle(), 0.0);
    }

    #[test]
    fn fk_fixed_axis_passes_through() {
        let spacer = Axis::new("spacer", AxisKind::Fixed, Vector3::z_axis()).with_child("a");
        let a = rotary("a").with_offset(Vector3::new(9.0, 9.0, 9.0));
        let (mut chain, _) = KinematicChain::build(vec![spacer, a], "spacer").unwrap();
        chain.axis_mut_by_id("spacer").unwrap().set_value(123.0);

        // A fixed axis contributes nothing: no rotation, no offset advance.
        let pose = chain.forward_kinematics(&Isometry3::identity());
        assert_relative_eq!(pose.translation.vector, Vector3::zeros());
    }

    #[test]
    fn fk_continuous_across_wrap_seam() {
        let mut chain = planar_arm();

        chain.axis_mut_by_id("shoulder").unwrap().set_value(359.999);
        let before = chain.forward_kinematics(&Isometry3::identity());
        chain.axis_mut_by_id("shoulder").unwrap().set_value(0.001);
        let after = chain.forward_kinematics(&Isometry3::identity());

        let jump = (before.translation.vector - after.translation.vector).norm();
        assert!(jump < 1e-3, "wrap seam jump was {jump}");
    }

    #[test]
    fn fk_respects_root_pose() {
        let mut chain = planar_arm();
        chain.axis_mut_by_id("shoulder").unwrap().set_value(90.0);

        let root = Isometry3::from_parts(
            Translation3::new(10.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f32::consts::FRAC_PI_2),
        );
        let pose = chain.forward_kinematics(&root);
        // Root yaw (90°) + shoulder (90°) points the 1-unit link along -X.
        assert_relative_eq!(
            pose.translation.vector,
            Vector3::new(9.0, 0.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn fk_single_axis_chain_is_seed_pose() {
        let only = rotary("only").with_offset(Vector3::new(0.1, 0.2, 0.3));
        let (mut chain, _) = KinematicChain::build(vec![only], "only").unwrap();
        chain.axis_mut_by_id("only").unwrap().set_value(180.0);

        // One axis means zero links: the value cannot move the tip.
        let pose = chain.forward_kinematics(&Isometry3::identity());
        assert_relative_eq!(pose.translation.vector, Vector3::new(0.1, 0.2, 0.3));
        assert_relative_eq!(pose.rotation.angle(), 0.0);
    }

    // ---- link_poses ----

    #[test]
    fn link_poses_tracks_accumulation() {
        let mut chain = planar_arm();
        chain.axis_mut_by_id("shoulder").unwrap().set_value(90.0);

        let poses = chain.link_poses(&Isometry3::identity());
        assert_eq!(poses.len(), 2);
        assert_relative_eq!(poses[0].translation.vector, Vector3::zeros());
        assert_relative_eq!(
            poses[1].translation.vector,
            chain
                .forward_kinematics(&Isometry3::identity())
                .translation
                .vector
        );
    }
}
