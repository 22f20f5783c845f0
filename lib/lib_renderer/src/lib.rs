mod atlas;
mod dump;
mod error;
mod font;
mod quad_batch;
mod renderer;
mod text;
mod vertex;
pub use atlas::*;
pub use dump::DEBUG_DUMP_DIR;
pub use error::*;
pub use font::*;
pub use quad_batch::*;
pub use renderer::*;
pub use text::*;
pub use vertex::*;
