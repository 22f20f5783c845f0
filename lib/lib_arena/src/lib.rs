mod fixed_vec;
mod frame_arena;
pub use fixed_vec::*;
pub use frame_arena::*;
