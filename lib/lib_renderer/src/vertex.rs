use bytemuck::{Pod, Zeroable};
use lib_math::{Vec2, Vec4, vec2, vec4};

/// Selects the fragment shading path. Values match the shader's `switch`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawType {
    #[default]
    Rectangle = 0,
    Circle = 1,
    Texture = 2,
    Text = 3,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Clip-space position, already transformed on the CPU.
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
    pub draw_type: u32,
}

/// Four vertices in top-left, top-right, bottom-right, bottom-left order.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Quad {
    pub vertices: [Vertex; 4],
}

/// UVs in quad corner order. V = 0 is the top row of a texture.
pub type UvCorners = [Vec2; 4];

pub const DEFAULT_UVS: UvCorners = [
    vec2(0.0, 0.0),
    vec2(1.0, 0.0),
    vec2(1.0, 1.0),
    vec2(0.0, 1.0),
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// The shared index buffer contents for `max_quads` quads.
pub fn quad_indices(max_quads: usize) -> Vec<u32> {
    (0..max_quads as u32)
        .flat_map(|quad| QUAD_INDICES.map(|index| quad * 4 + index))
        .collect()
}

pub const WHITE: Vec4 = vec4(1.0, 1.0, 1.0, 1.0);
pub const BLACK: Vec4 = vec4(0.0, 0.0, 0.0, 1.0);
pub const RED: Vec4 = vec4(1.0, 0.0, 0.0, 1.0);
pub const GREEN: Vec4 = vec4(0.0, 1.0, 0.0, 1.0);
pub const BLUE: Vec4 = vec4(0.0, 0.0, 1.0, 1.0);

pub fn with_alpha(color: Vec4, alpha: f32) -> Vec4 {
    color.truncate().extend(alpha)
}
