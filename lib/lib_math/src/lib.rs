pub use glam::{Mat4, Vec2, Vec3, Vec4, vec2, vec3, vec4};

mod camera;
mod transform;
pub use camera::*;
pub use transform::*;
