//! Planar arm chasing a sequence of IK goals.
//!
//! Aims the demo arm at a ring of target positions; each goal runs until
//! the solver settles, then the next target is loaded. Shows the
//! feed-tracking handoff: while a goal is active the machine ignores its
//! telemetry feed.
//!
//! Run: `cargo run -p gantry-demos --bin arm_goals`

use bevy::prelude::*;
use nalgebra::{Isometry3, Vector3};

use gantry_demos::ARM_DEF;
use gantry_ik::prelude::*;
use gantry_machine::def::MachineDef;
use gantry_machine::registry::MachineRegistry;
use gantry_machine::spawner::spawn_machine;
use gantry_sim::prelude::*;

fn main() {
    println!("=== Arm IK Goals ===\n");

    let mut app = App::new();
    app.add_plugins(GantrySimPlugin);
    app.finish();
    app.cleanup();

    let def = MachineDef::from_str(ARM_DEF).expect("arm definition");
    let spawned = spawn_machine(app.world_mut(), &def, Isometry3::identity()).expect("spawn arm");
    let arm = spawned.machine;

    // Reachable ring: the shoulder pivots, the reach axis extends 1..2.
    let targets = [
        Vector3::new(1.5, 0.0, 0.0),
        Vector3::new(0.0, 1.5, 0.0),
        Vector3::new(-1.2, 0.8, 0.0),
        Vector3::new(1.0, 1.0, 0.0),
    ];

    for (i, target) in targets.iter().enumerate() {
        app.world_mut()
            .resource_mut::<IkTargets>()
            .set_goal(arm, IkGoal::position_only(*target));

        let mut settled_at = None;
        for tick in 1..=2000 {
            app.update();
            if app.world().resource::<IkTargets>().is_settled(arm) {
                settled_at = Some(tick);
                break;
            }
        }

        let registry = app.world().resource::<MachineRegistry>();
        let machine = registry.get(arm).expect("arm registered");
        let tip = machine.end_effector_pose().translation.vector;
        let err = (tip - target).norm();
        match settled_at {
            Some(tick) => println!(
                "goal {i}: ({:.2}, {:.2}) settled after {tick} ticks, tip=({:.3}, {:.3}), err={err:.4}",
                target.x, target.y, tip.x, tip.y
            ),
            None => println!(
                "goal {i}: ({:.2}, {:.2}) did not settle, tip=({:.3}, {:.3}), err={err:.4}",
                target.x, target.y, tip.x, tip.y
            ),
        }
    }

    app.world_mut().resource_mut::<IkTargets>().clear_goal(arm);
    app.update();
    let registry = app.world().resource::<MachineRegistry>();
    println!(
        "\ngoal cleared, feed tracking restored: {}",
        registry.get(arm).expect("arm registered").feed_tracking()
    );

    let stats = app.world().resource::<CellStats>();
    println!(
        "total: {} ticks, {} value changes, {} goals reached",
        stats.ticks, stats.values_changed, stats.goals_reached
    );
}
