// gantry-core: ids, tick phases, clocks, and configuration for the gantry workspace.

pub mod config;
pub mod error;
pub mod schedule;
pub mod time;
pub mod types;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::{CellConfig, CellMeta, MachinePlacement, TickConfig};
    pub use crate::error::ConfigError;
    pub use crate::schedule::{GantryCorePlugin, GantrySet};
    pub use crate::time::{SimTime, TickClock};
    pub use crate::types::MachineId;
}
