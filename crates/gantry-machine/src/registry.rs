//! Machine registry.
//!
//! [`MachineRegistry`] is the owned replacement for a global machine
//! manager: every subsystem that needs machine lookup reaches it through
//! the ECS resource, so several cells can coexist in one process and tests
//! never share state.

use std::collections::BTreeMap;

use bevy::prelude::Resource;

use gantry_core::types::MachineId;

use crate::machine::Machine;

/// All registered machines, keyed by [`MachineId`].
///
/// Backed by a `BTreeMap` so per-tick iteration order is deterministic:
/// ids are allocated monotonically and iterate in registration order.
#[derive(Resource, Debug, Default)]
pub struct MachineRegistry {
    machines: BTreeMap<MachineId, Machine>,
    next_id: u64,
}

impl MachineRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a machine and return its freshly allocated id.
    pub fn register(&mut self, machine: Machine) -> MachineId {
        let id = MachineId(self.next_id);
        self.next_id += 1;
        self.machines.insert(id, machine);
        id
    }

    /// Remove a machine, returning it if it was registered.
    pub fn remove(&mut self, id: MachineId) -> Option<Machine> {
        self.machines.remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: MachineId) -> Option<&Machine> {
        self.machines.get(&id)
    }

    pub fn get_mut(&mut self, id: MachineId) -> Option<&mut Machine> {
        self.machines.get_mut(&id)
    }

    /// Find a machine by its definition uuid.
    #[must_use]
    pub fn find_by_uuid(&self, uuid: &str) -> Option<(MachineId, &Machine)> {
        self.machines
            .iter()
            .find(|(_, machine)| machine.info().uuid == uuid)
            .map(|(id, machine)| (*id, machine))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Machines in id (registration) order.
    pub fn iter(&self) -> impl Iterator<Item = (MachineId, &Machine)> {
        self.machines.iter().map(|(id, machine)| (*id, machine))
    }

    /// Machines in id order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (MachineId, &mut Machine)> {
        self.machines.iter_mut().map(|(id, machine)| (*id, machine))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
