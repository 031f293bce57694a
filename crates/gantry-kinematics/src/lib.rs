//! Kinematic modeling for multi-axis industrial machines.
//!
//! Pure Rust library with no engine dependencies.  Models a machine as a
//! linear chain of rotary/linear axes, computes end-effector pose from axis
//! values (forward kinematics), and nudges axis values toward a target pose
//! one bounded step per tick (gradient-descent inverse kinematics).
//!
//! # Value Pipeline
//!
//! ```text
//! Raw input → Normalize (wrap 0..360, then clamp) → Axis.value
//!             (telemetry, IK, host)                  ↓
//!                                        Forward Kinematics → pose
//! ```
//!
//! Rotary values are degrees; linear values are in the machine definition's
//! length units.  Radians appear only at the trigonometric boundary.
//!
//! # Quick Start
//!
//! ```
//! use gantry_kinematics::prelude::*;
//! use nalgebra::{Isometry3, Vector3};
//!
//! let shoulder = Axis::new("shoulder", AxisKind::Rotary, Vector3::z_axis())
//!     .with_child("reach");
//! let reach = Axis::new("reach", AxisKind::Linear, Vector3::x_axis())
//!     .with_offset(Vector3::new(1.0, 0.0, 0.0));
//!
//! let (mut chain, _aux) = KinematicChain::build(vec![shoulder, reach], "shoulder").unwrap();
//! chain.axis_mut_by_id("shoulder").unwrap().set_value(90.0);
//!
//! let pose = chain.forward_kinematics(&Isometry3::identity());
//! assert!((pose.translation.vector.y - 1.0).abs() < 1e-5);
//! ```

pub mod axis;
pub mod chain;
pub mod solver;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::axis::{Axis, AxisBounds, AxisKind, wrap_degrees};
    pub use crate::chain::{ChainError, KinematicChain};
    pub use crate::solver::{GradientSolver, IkGoal, IkParams, IkStep, SolverError};
}
