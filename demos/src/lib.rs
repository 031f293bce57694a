//! Shared machine definitions for the gantry demos.

/// 3-axis mill: rotary table, X slide, Z quill, plus a tool probe off the
/// chain.
pub const MILL_DEF: &str = r#"
[machine]
name = "demo-mill"
manufacturer = "Gantry Demos"
model = "GM-3"

[[axes]]
id = "table"
name = "Rotary table"
kind = "rotary"
direction = [0.0, 0.0, 1.0]
child = "x"

[[axes]]
id = "x"
name = "X slide"
kind = "linear"
direction = [1.0, 0.0, 0.0]
offset = [0.5, 0.0, 0.0]
min = -0.5
max = 0.5
child = "z"

[[axes]]
id = "z"
name = "Z quill"
kind = "linear"
direction = [0.0, 0.0, 1.0]
offset = [0.0, 0.0, 0.8]
min = -0.4
max = 0.0

[[axes]]
id = "probe"
kind = "linear"
direction = [0.0, 1.0, 0.0]
"#;

/// Planar arm for IK: rotary shoulder with a 1-unit reach to a linear
/// tool slide, blend-interpolated scene nodes.
pub const ARM_DEF: &str = r#"
[machine]
name = "demo-arm"

[machine.interpolation]
mode = "blend"
blend_speed = 15.0

[ik]
speed = 40.0

[[axes]]
id = "shoulder"
kind = "rotary"
direction = [0.0, 0.0, 1.0]
home = 90.0
child = "reach"

[[axes]]
id = "reach"
kind = "linear"
direction = [1.0, 0.0, 0.0]
offset = [1.0, 0.0, 0.0]
min = 0.0
max = 1.0
"#;
