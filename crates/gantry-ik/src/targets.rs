//! Active IK goals, keyed by machine.

use std::collections::BTreeMap;

use bevy::prelude::Resource;

use gantry_core::types::MachineId;
use gantry_kinematics::solver::IkGoal;

/// One active goal and its convergence flag.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalEntry {
    pub goal: IkGoal,
    /// Whether the solver has reported convergence for this goal.
    pub settled: bool,
}

/// The set of machines currently chasing an IK goal.
///
/// At most one goal per machine; setting a new goal replaces the old one
/// and restarts convergence tracking. A machine with an entry here owns
/// its logical axis values (telemetry is demoted to mirror-only); clearing
/// the entry hands them back to the feed. Keyed by a `BTreeMap` so the
/// solve system visits machines in a deterministic order.
#[derive(Resource, Debug, Clone, Default)]
pub struct IkTargets {
    goals: BTreeMap<MachineId, GoalEntry>,
}

impl IkTargets {
    /// Aim `machine` at `goal`, replacing any previous goal.
    pub fn set_goal(&mut self, machine: MachineId, goal: IkGoal) {
        self.goals.insert(
            machine,
            GoalEntry {
                goal,
                settled: false,
            },
        );
    }

    /// Drop the goal for `machine`, returning it if one was active.
    pub fn clear_goal(&mut self, machine: MachineId) -> Option<GoalEntry> {
        self.goals.remove(&machine)
    }

    /// The active goal entry for `machine`.
    #[must_use]
    pub fn goal(&self, machine: MachineId) -> Option<&GoalEntry> {
        self.goals.get(&machine)
    }

    /// Whether `machine` has an active goal.
    #[must_use]
    pub fn has_goal(&self, machine: MachineId) -> bool {
        self.goals.contains_key(&machine)
    }

    /// Whether `machine`'s goal has converged.
    #[must_use]
    pub fn is_settled(&self, machine: MachineId) -> bool {
        self.goals.get(&machine).is_some_and(|entry| entry.settled)
    }

    /// Number of active goals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.goals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Goals in machine-id order.
    pub fn iter(&self) -> impl Iterator<Item = (MachineId, &GoalEntry)> {
        self.goals.iter().map(|(id, entry)| (*id, entry))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (MachineId, &mut GoalEntry)> {
        self.goals.iter_mut().map(|(id, entry)| (*id, entry))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn set_goal_replaces_and_resets_settled() {
        let mut targets = IkTargets::default();
        let id = MachineId(1);
        targets.set_goal(id, IkGoal::position_only(Vector3::x()));

        for (_, entry) in targets.iter_mut() {
            entry.settled = true;
        }
        assert!(targets.is_settled(id));

        targets.set_goal(id, IkGoal::position_only(Vector3::y()));
        assert_eq!(targets.len(), 1);
        assert!(!targets.is_settled(id));
    }

    #[test]
    fn clear_goal_returns_the_entry() {
        let mut targets = IkTargets::default();
        let id = MachineId(2);
        assert!(targets.clear_goal(id).is_none());

        targets.set_goal(id, IkGoal::position_only(Vector3::x()));
        let entry = targets.clear_goal(id).unwrap();
        assert_eq!(entry.goal.position, Vector3::x());
        assert!(targets.is_empty());
    }

    #[test]
    fn iteration_is_id_ordered() {
        let mut targets = IkTargets::default();
        targets.set_goal(MachineId(3), IkGoal::position_only(Vector3::x()));
        targets.set_goal(MachineId(1), IkGoal::position_only(Vector3::x()));
        targets.set_goal(MachineId(2), IkGoal::position_only(Vector3::x()));

        let ids: Vec<_> = targets.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![MachineId(1), MachineId(2), MachineId(3)]);
    }
}
