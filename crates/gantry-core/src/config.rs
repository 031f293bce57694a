use std::path::PathBuf;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_tick_dt() -> f64 {
    1.0 / 60.0
}
const fn default_max_catchup_steps() -> u32 {
    4
}
const fn default_orientation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}
fn default_cell_name() -> String {
    "cell".into()
}

// ---------------------------------------------------------------------------
// TickConfig
// ---------------------------------------------------------------------------

/// Logic-tick configuration.
///
/// One `Update` pass of the schedule is one logic tick; `tick_dt` is the
/// fixed timestep every per-tick system uses for time scaling. Wall-clock
/// hosts feed a [`TickClock`](crate::time::TickClock) built from the same
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct TickConfig {
    /// Seconds per logic tick (default: 1/60).
    #[serde(default = "default_tick_dt")]
    pub tick_dt: f64,

    /// Maximum catch-up ticks dispensed per observed wall-clock frame
    /// (default: 4).
    #[serde(default = "default_max_catchup_steps")]
    pub max_catchup_steps: u32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_dt: default_tick_dt(),
            max_catchup_steps: default_max_catchup_steps(),
        }
    }
}

impl TickConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_dt <= 0.0 {
            return Err(ConfigError::InvalidTickDt(self.tick_dt));
        }
        if self.max_catchup_steps == 0 {
            return Err(ConfigError::ZeroCatchup);
        }
        Ok(())
    }

    /// Tick rate in Hz.
    #[must_use]
    pub fn tick_hz(&self) -> f64 {
        1.0 / self.tick_dt
    }

    /// `tick_dt` narrowed for per-tick math.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn dt_f32(&self) -> f32 {
        self.tick_dt as f32
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// CellMeta
// ---------------------------------------------------------------------------

/// Identity section of a cell file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellMeta {
    /// Display name for the work cell (default: "cell").
    #[serde(default = "default_cell_name")]
    pub name: String,
}

impl Default for CellMeta {
    fn default() -> Self {
        Self {
            name: default_cell_name(),
        }
    }
}

// ---------------------------------------------------------------------------
// MachinePlacement
// ---------------------------------------------------------------------------

/// One machine instance inside a cell: which definition file to load and
/// where its root sits in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachinePlacement {
    /// Instance name, unique within the cell.
    pub name: String,

    /// Path to the machine definition TOML, relative to the cell file.
    pub definition: PathBuf,

    /// Root position [x, y, z] in world units.
    #[serde(default)]
    pub root_position: [f32; 3],

    /// Root orientation quaternion [x, y, z, w] (default: identity).
    #[serde(default = "default_orientation")]
    pub root_orientation: [f32; 4],
}

// ---------------------------------------------------------------------------
// CellConfig
// ---------------------------------------------------------------------------

/// A work cell: tick settings plus the machines placed in it.
///
/// ```toml
/// [cell]
/// name = "demo-cell"
///
/// [tick]
/// tick_dt = 0.016
///
/// [[machines]]
/// name = "mill-1"
/// definition = "machines/mill.toml"
/// root_position = [0.0, 0.0, 0.0]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellConfig {
    #[serde(default)]
    pub cell: CellMeta,

    #[serde(default)]
    pub tick: TickConfig,

    #[serde(default)]
    pub machines: Vec<MachinePlacement>,
}

impl CellConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tick.validate()?;
        if self.machines.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "machines".into(),
                message: "a cell must place at least one machine".into(),
            });
        }
        for (i, placement) in self.machines.iter().enumerate() {
            if placement.name.is_empty() {
                return Err(ConfigError::MissingField(format!("machines[{i}].name")));
            }
            if placement.definition.as_os_str().is_empty() {
                return Err(ConfigError::MissingField(format!(
                    "machines[{i}].definition"
                )));
            }
        }
        for (i, a) in self.machines.iter().enumerate() {
            if self.machines[..i].iter().any(|b| b.name == a.name) {
                return Err(ConfigError::InvalidValue {
                    field: "machines".into(),
                    message: format!("duplicate placement name: {}", a.name),
                });
            }
        }
        Ok(())
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
