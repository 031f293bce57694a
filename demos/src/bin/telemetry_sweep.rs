//! Scripted telemetry driving a 3-axis mill.
//!
//! A producer thread plays back a sweep of controller samples through the
//! telemetry feed while the tick loop runs headless; every 30 ticks the
//! demo prints the mill's logical values and end-effector position.
//!
//! Run: `cargo run -p gantry-demos --bin telemetry_sweep`

use std::thread;
use std::time::Duration;

use bevy::prelude::*;
use nalgebra::Isometry3;

use gantry_demos::MILL_DEF;
use gantry_machine::def::MachineDef;
use gantry_machine::registry::MachineRegistry;
use gantry_machine::spawner::spawn_machine;
use gantry_sim::prelude::*;
use gantry_telemetry::feed::{TelemetryFeed, TelemetrySample};

fn main() {
    println!("=== Telemetry Sweep ===\n");

    let mut app = App::new();
    app.add_plugins(GantrySimPlugin);
    app.finish();
    app.cleanup();

    let def = MachineDef::from_str(MILL_DEF).expect("mill definition");
    let spawned =
        spawn_machine(app.world_mut(), &def, Isometry3::identity()).expect("spawn mill");
    let mill = spawned.machine;
    println!("spawned '{}' with {} nodes", def.machine.name, spawned.node_count());

    // Producer thread: sweep the table through a revolution while the X
    // slide oscillates, ~4 samples per tick.
    let sender = app.world().resource::<TelemetryFeed>().sender();
    let producer = thread::spawn(move || {
        for step in 0..600 {
            let angle = step as f32 * 0.6;
            let slide = (step as f32 * 0.02).sin() * 0.5;
            sender.send(TelemetrySample {
                machine: mill,
                axis: "table".into(),
                value: angle,
            });
            let alive = sender.send(TelemetrySample {
                machine: mill,
                axis: "x".into(),
                value: slide,
            });
            if !alive {
                return;
            }
            thread::sleep(Duration::from_millis(2));
        }
    });

    for tick in 1..=300 {
        app.update();
        thread::sleep(Duration::from_millis(4));

        if tick % 30 == 0 {
            let registry = app.world().resource::<MachineRegistry>();
            let machine = registry.get(mill).expect("mill registered");
            let table = machine.axis("table").expect("table axis");
            let x = machine.axis("x").expect("x axis");
            let tip = machine.end_effector_pose().translation.vector;
            println!(
                "tick {tick:>3}: table={:>7.2}°  x={:>6.3}  tip=({:.3}, {:.3}, {:.3})",
                table.value(),
                x.value(),
                tip.x,
                tip.y,
                tip.z
            );
        }
    }

    producer.join().expect("producer thread");

    let stats = app.world().resource::<CellStats>();
    println!(
        "\nran {} ticks: received samples applied={}, rejected={}",
        stats.ticks, stats.values_changed, stats.samples_rejected
    );
}
