//! Scene-node spawning for machine definitions.
//!
//! Creates one entity per axis with [`AxisBinding`], [`RestPose`], and a
//! [`Transform`] seeded from the axis's static offset. The machine itself
//! is registered with the [`MachineRegistry`]; entities are plain scene
//! nodes the host (or the actuation driver) looks up per tick. Nothing in
//! the core owns scene-graph lifetime: a despawned node is simply skipped.

use std::collections::HashMap;

use bevy::prelude::*;
use nalgebra::Isometry3;

use gantry_core::types::MachineId;

use crate::def::MachineDef;
use crate::error::MachineDefError;
use crate::machine::Machine;
use crate::registry::MachineRegistry;

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Ties a scene-node entity to the axis it renders.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct AxisBinding {
    pub machine: MachineId,
    pub axis: String,
}

/// The node's local translation at zero axis value, captured at spawn.
///
/// Linear axes translate relative to this; rotary axes leave it untouched.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct RestPose {
    pub translation: Vec3,
}

// ---------------------------------------------------------------------------
// SpawnedMachine
// ---------------------------------------------------------------------------

/// Result of spawning a machine: its registry id and the axis→entity map.
#[derive(Debug, Clone)]
pub struct SpawnedMachine {
    /// Registry id of the machine.
    pub machine: MachineId,
    /// Map from axis id to the spawned scene-node entity.
    pub nodes: HashMap<String, Entity>,
}

impl SpawnedMachine {
    /// Get the scene-node entity for an axis.
    #[must_use]
    pub fn node_entity(&self, axis: &str) -> Option<Entity> {
        self.nodes.get(axis).copied()
    }

    /// Number of spawned scene nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

// ---------------------------------------------------------------------------
// spawn_machine
// ---------------------------------------------------------------------------

/// Build a [`Machine`] from `def`, register it, and spawn its scene nodes.
///
/// `root_pose` is the machine's world placement (from the cell file).
/// Every axis gets a node, auxiliary axes included; each node's transform
/// starts at the axis's static local offset.
///
/// # Errors
///
/// Fails fast with the definition's first structural fault; on error
/// nothing is registered and nothing is spawned.
pub fn spawn_machine(
    world: &mut World,
    def: &MachineDef,
    root_pose: Isometry3<f32>,
) -> Result<SpawnedMachine, MachineDefError> {
    let mut machine = Machine::from_def(def)?;
    machine.set_root_pose(root_pose);

    let rests: Vec<(String, Vec3)> = machine
        .chain()
        .axes()
        .iter()
        .chain(machine.aux_axes().iter())
        .map(|axis| {
            let offset = axis.local_offset();
            (
                axis.id().to_string(),
                Vec3::new(offset.x, offset.y, offset.z),
            )
        })
        .collect();

    let machine_id = world.resource_mut::<MachineRegistry>().register(machine);

    let mut nodes = HashMap::new();
    for (axis_id, rest) in rests {
        let entity = world
            .spawn((
                AxisBinding {
                    machine: machine_id,
                    axis: axis_id.clone(),
                },
                RestPose { translation: rest },
                Transform::from_translation(rest),
            ))
            .id();
        nodes.insert(axis_id, entity);
    }

    Ok(SpawnedMachine {
        machine: machine_id,
        nodes,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
