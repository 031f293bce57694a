//! The per-tick solve step.

use bevy::prelude::*;

use gantry_core::config::TickConfig;
use gantry_core::types::MachineId;
use gantry_kinematics::solver::GradientSolver;
use gantry_machine::events::{AxisValueChanged, ValueSource};
use gantry_machine::registry::MachineRegistry;

use crate::targets::IkTargets;

/// A machine's active goal converged this tick.
///
/// Emitted once per goal, on the tick the solver first reports settled;
/// replacing the goal re-arms it.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct GoalReached {
    pub machine: MachineId,
    pub position_error_sq: f32,
    pub orientation_error: f32,
}

/// Run one gradient step for every machine with an active goal.
///
/// Also arbitrates value ownership each tick: machines with a goal get
/// `feed_tracking` switched off (telemetry demoted to mirror-only),
/// machines without one get it switched back on. Goals for machines that
/// have left the registry are dropped.
pub fn solve_goals_system(
    config: Res<TickConfig>,
    mut registry: ResMut<MachineRegistry>,
    mut targets: ResMut<IkTargets>,
    mut changed: EventWriter<AxisValueChanged>,
    mut reached: EventWriter<GoalReached>,
) {
    let mut stale: Vec<MachineId> = Vec::new();
    for (id, machine) in registry.iter_mut() {
        machine.set_feed_tracking(!targets.has_goal(id));
    }

    let dt = config.dt_f32();
    for (id, entry) in targets.iter_mut() {
        let Some(machine) = registry.get_mut(id) else {
            stale.push(id);
            continue;
        };

        let solver = match GradientSolver::new(machine.ik_params().clone()) {
            Ok(solver) => solver,
            Err(error) => {
                // Params were validated at load; reachable only if the
                // host mutated them afterwards.
                tracing::warn!(machine = %id, %error, "skipping goal with invalid solver params");
                continue;
            }
        };

        let root = *machine.root_pose();
        let before: Vec<f32> = machine.chain().values();
        let step = solver.step(machine.chain_mut(), &root, &entry.goal, dt);
        let after = machine.chain().values();

        for (axis, (&old, &new)) in machine
            .chain()
            .axes()
            .iter()
            .zip(before.iter().zip(&after))
        {
            if old != new {
                changed.send(AxisValueChanged {
                    machine: id,
                    axis: axis.id().to_string(),
                    value: new,
                    source: ValueSource::Solver,
                });
            }
        }

        if step.settled && !entry.settled {
            reached.send(GoalReached {
                machine: id,
                position_error_sq: step.position_error_sq,
                orientation_error: step.orientation_error,
            });
        }
        entry.settled = step.settled;
    }

    for id in stale {
        tracing::warn!(machine = %id, "dropping goal for unregistered machine");
        targets.clear_goal(id);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
