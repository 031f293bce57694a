//! The per-tick node driver.

use bevy::prelude::*;

use gantry_core::config::TickConfig;
use gantry_kinematics::axis::{Axis, AxisKind};
use gantry_machine::machine::InterpolationMode;
use gantry_machine::registry::MachineRegistry;
use gantry_machine::spawner::{AxisBinding, RestPose};

/// Push every bound axis value into its scene-node transform.
///
/// Runs in the actuate phase, after ingest and solve have finalized the
/// tick's values. Each axis kind owns one transform channel: rotary
/// writes rotation (about the axis direction, degrees), linear writes
/// translation (rest pose plus direction times value), fixed writes
/// nothing. Nodes whose machine or axis has gone away are skipped;
/// nothing here owns scene-graph lifetime.
pub fn drive_nodes_system(
    config: Res<TickConfig>,
    registry: Res<MachineRegistry>,
    mut nodes: Query<(&AxisBinding, &RestPose, &mut Transform)>,
) {
    let dt = config.dt_f32();
    for (binding, rest, mut transform) in &mut nodes {
        let Some(machine) = registry.get(binding.machine) else {
            continue;
        };
        let Some(axis) = machine.axis(&binding.axis) else {
            continue;
        };

        match axis.kind() {
            AxisKind::Fixed => {}
            AxisKind::Rotary => {
                let target = rotary_rotation(axis);
                transform.rotation = match machine.interpolation() {
                    InterpolationMode::Snap => target,
                    InterpolationMode::Blend { speed } => transform
                        .rotation
                        .slerp(target, blend_factor(speed, dt)),
                };
            }
            AxisKind::Linear => {
                let target = rest.translation + direction(axis) * axis.value();
                transform.translation = match machine.interpolation() {
                    InterpolationMode::Snap => target,
                    InterpolationMode::Blend { speed } => transform
                        .translation
                        .lerp(target, blend_factor(speed, dt)),
                };
            }
        }
    }
}

fn direction(axis: &Axis) -> Vec3 {
    let dir = axis.direction().into_inner();
    Vec3::new(dir.x, dir.y, dir.z)
}

fn rotary_rotation(axis: &Axis) -> Quat {
    Quat::from_axis_angle(direction(axis), axis.value().to_radians())
}

fn blend_factor(speed: f32, dt: f32) -> f32 {
    (speed * dt).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
