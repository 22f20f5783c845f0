use lib_gpu::{CreateSurfaceError, RequestAdapterError, RequestDeviceError};
use lib_window::error::{EventLoopError, OsError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to create the event loop")]
    EventLoop(#[source] EventLoopError),
    #[error("failed to create the main window")]
    Window(#[source] OsError),
    #[error("failed to create the window surface")]
    Surface(#[source] CreateSurfaceError),
    #[error("no compatible graphics adapter")]
    Adapter(#[source] RequestAdapterError),
    #[error("failed to open the graphics device")]
    Device(#[source] RequestDeviceError),
    #[error("the window surface is not supported by the graphics adapter")]
    SurfaceUnsupported,
    #[error("failed to initialize gamepad support: {0}")]
    Gamepad(String),
    #[error("game startup failed: {0:#}")]
    Startup(anyhow::Error),
}
