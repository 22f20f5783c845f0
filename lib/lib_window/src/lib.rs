mod input;
pub use input::*;

pub use winit::{
    application, dpi, error, event, event_loop,
    event::MouseButton,
    keyboard,
    keyboard::{KeyCode, PhysicalKey},
    window,
    window::{Window, WindowAttributes},
};
