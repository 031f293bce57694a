//! Cell loading and spawning.
//!
//! A cell file places machines in the world; each placement points at a
//! machine definition TOML resolved relative to the cell file itself, so
//! a cell directory stays relocatable.

use std::collections::HashMap;
use std::path::Path;

use bevy::prelude::World;
use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use thiserror::Error;

use gantry_core::config::{CellConfig, MachinePlacement};
use gantry_core::error::ConfigError;
use gantry_core::types::MachineId;
use gantry_machine::def::MachineDef;
use gantry_machine::error::MachineDefError;
use gantry_machine::spawner::{spawn_machine, SpawnedMachine};

// ---------------------------------------------------------------------------
// RigError
// ---------------------------------------------------------------------------

/// Errors assembling a cell.
#[derive(Debug, Error)]
pub enum RigError {
    #[error("Invalid cell configuration")]
    Config(#[from] ConfigError),

    #[error("Failed to build machine '{name}'")]
    Machine {
        name: String,
        #[source]
        source: MachineDefError,
    },
}

// ---------------------------------------------------------------------------
// LoadedCell
// ---------------------------------------------------------------------------

/// A parsed cell with every machine definition already loaded.
///
/// `defs` runs parallel to `config.machines`.
#[derive(Debug, Clone)]
pub struct LoadedCell {
    pub config: CellConfig,
    pub defs: Vec<MachineDef>,
}

/// Parse a cell file and load every referenced machine definition.
///
/// Fails fast on the first invalid file; nothing is partially loaded.
pub fn load_cell(path: impl AsRef<Path>) -> Result<LoadedCell, RigError> {
    let path = path.as_ref();
    let config = CellConfig::from_file(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let mut defs = Vec::with_capacity(config.machines.len());
    for placement in &config.machines {
        let def_path = base.join(&placement.definition);
        let def = MachineDef::from_file(&def_path).map_err(|source| RigError::Machine {
            name: placement.name.clone(),
            source,
        })?;
        defs.push(def);
    }

    Ok(LoadedCell { config, defs })
}

// ---------------------------------------------------------------------------
// SpawnedCell
// ---------------------------------------------------------------------------

/// Result of spawning a cell: machines by placement name.
#[derive(Debug, Clone)]
pub struct SpawnedCell {
    /// Cell display name.
    pub name: String,
    /// Spawn results keyed by placement name.
    pub machines: HashMap<String, SpawnedMachine>,
}

impl SpawnedCell {
    /// Registry id of the machine placed under `name`.
    #[must_use]
    pub fn machine_id(&self, name: &str) -> Option<MachineId> {
        self.machines.get(name).map(|spawned| spawned.machine)
    }
}

/// World placement from a cell entry.
fn placement_pose(placement: &MachinePlacement) -> Isometry3<f32> {
    let [x, y, z] = placement.root_position;
    let [qx, qy, qz, qw] = placement.root_orientation;
    Isometry3::from_parts(
        Translation3::new(x, y, z),
        UnitQuaternion::new_normalize(Quaternion::new(qw, qx, qy, qz)),
    )
}

/// Spawn every machine of a loaded cell into `world`.
///
/// Installs the cell's tick configuration and registers each machine at
/// its placement pose. Fails fast on the first machine that does not
/// build; machines registered before the failure stay registered.
pub fn spawn_cell(world: &mut World, loaded: &LoadedCell) -> Result<SpawnedCell, RigError> {
    loaded.config.validate()?;
    world.insert_resource(loaded.config.tick.clone());

    let mut machines = HashMap::new();
    for (placement, def) in loaded.config.machines.iter().zip(&loaded.defs) {
        let pose = placement_pose(placement);
        let spawned = spawn_machine(world, def, pose).map_err(|source| RigError::Machine {
            name: placement.name.clone(),
            source,
        })?;
        tracing::info!(
            placement = %placement.name,
            machine = %spawned.machine,
            nodes = spawned.node_count(),
            "spawned machine"
        );
        machines.insert(placement.name.clone(), spawned);
    }

    tracing::info!(cell = %loaded.config.cell.name, machines = machines.len(), "cell ready");
    Ok(SpawnedCell {
        name: loaded.config.cell.name.clone(),
        machines,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_machine::registry::MachineRegistry;
    use std::fs;

    const MILL_DEF: &str = r#"
        [machine]
        name = "mill"

        [[axes]]
        id = "a"
        kind = "rotary"
        child = "z"

        [[axes]]
        id = "z"
        kind = "linear"
    "#;

    const CELL: &str = r#"
        [cell]
        name = "test-cell"

        [tick]
        tick_dt = 0.02

        [[machines]]
        name = "mill-1"
        definition = "machines/mill.toml"
        root_position = [1.0, 0.0, 0.0]

        [[machines]]
        name = "mill-2"
        definition = "machines/mill.toml"
    "#;

    fn write_cell_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("machines")).unwrap();
        fs::write(dir.path().join("machines/mill.toml"), MILL_DEF).unwrap();
        fs::write(dir.path().join("cell.toml"), CELL).unwrap();
        dir
    }

    #[test]
    fn load_cell_resolves_definitions_relative_to_cell_file() {
        let dir = write_cell_dir();
        let loaded = load_cell(dir.path().join("cell.toml")).unwrap();
        assert_eq!(loaded.config.cell.name, "test-cell");
        assert_eq!(loaded.defs.len(), 2);
        assert_eq!(loaded.defs[0].machine.name, "mill");
    }

    #[test]
    fn load_cell_reports_the_failing_machine() {
        let dir = write_cell_dir();
        fs::write(dir.path().join("machines/mill.toml"), "[machine]\nname = \"m\"").unwrap();

        let err = load_cell(dir.path().join("cell.toml")).unwrap_err();
        match err {
            RigError::Machine { name, source } => {
                assert_eq!(name, "mill-1");
                assert!(matches!(source, MachineDefError::NoAxes));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_cell_missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_cell(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, RigError::Config(_)));
    }

    #[test]
    fn spawn_cell_registers_all_placements() {
        let dir = write_cell_dir();
        let loaded = load_cell(dir.path().join("cell.toml")).unwrap();

        let mut world = World::new();
        world.init_resource::<MachineRegistry>();
        let cell = spawn_cell(&mut world, &loaded).unwrap();

        assert_eq!(cell.name, "test-cell");
        assert_eq!(cell.machines.len(), 2);
        let mill_1 = cell.machine_id("mill-1").unwrap();
        let mill_2 = cell.machine_id("mill-2").unwrap();
        assert_ne!(mill_1, mill_2);

        let registry = world.resource::<MachineRegistry>();
        assert_eq!(registry.len(), 2);
        // Placement pose landed on the machine root.
        let root = registry.get(mill_1).unwrap().root_pose();
        assert_eq!(root.translation.vector.x, 1.0);

        // The cell's tick settings became the world's tick config.
        let tick = world.resource::<gantry_core::config::TickConfig>();
        assert!((tick.tick_dt - 0.02).abs() < 1e-12);
    }

    #[test]
    fn rig_error_display() {
        let err = RigError::Machine {
            name: "mill-1".into(),
            source: MachineDefError::NoAxes,
        };
        assert_eq!(err.to_string(), "Failed to build machine 'mill-1'");
    }
}
