use std::path::PathBuf;

use thiserror::Error;

use gantry_kinematics::chain::ChainError;
use gantry_kinematics::solver::SolverError;

/// Machine definition errors.
///
/// Everything here is a setup-time fault: a definition either loads into a
/// valid [`Machine`](crate::machine::Machine) or fails fast with one of
/// these. A machine is never half-built.
#[derive(Debug, Error)]
pub enum MachineDefError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("definition parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("definition has no axes")]
    NoAxes,

    #[error("duplicate axis id: {0}")]
    DuplicateAxis(String),

    #[error("axis {axis} links to unknown child: {child}")]
    UnknownChild { axis: String, child: String },

    #[error("axis {0} links to itself")]
    SelfChild(String),

    #[error("axis {child} is claimed as child by both {first} and {second}")]
    SharedChild {
        child: String,
        first: String,
        second: String,
    },

    #[error("axis {0} has a zero-length direction")]
    ZeroDirection(String),

    #[error("axis {axis} has min > max")]
    InvertedBounds { axis: String },

    #[error("start axis not found: {0}")]
    UnknownStart(String),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
