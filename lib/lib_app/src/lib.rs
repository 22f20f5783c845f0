use std::time::Duration;

use lib_gpu::{Device, GpuContext, Queue, TextureFormat, TextureView};
use lib_window::{DeviceEvent, DeviceId, Window, WindowAttributes};

mod error;
mod logging;
mod runner;
pub use error::*;
pub use logging::*;
pub use runner::run_game;

/// A game driven by [`run_game`]: update once per frame, then draw.
pub trait AppHandler: Sized {
    const TITLE: &str = "Untitled App";

    fn window_attributes() -> WindowAttributes {
        WindowAttributes::default().with_title(Self::TITLE)
    }

    /// Called once the window and GPU device exist. Errors abort startup.
    fn new(ctx: AppContext<'_>) -> anyhow::Result<Self>;

    fn update(&mut self, _delta_time: Duration, _ctx: AppContext<'_>) -> AppFlow {
        AppFlow::Continue
    }

    fn event(&mut self, event: AppEvent<'_>, _ctx: AppContext<'_>) -> AppFlow {
        match event {
            AppEvent::CloseRequested => AppFlow::Exit,
            _ => AppFlow::Continue,
        }
    }

    /// Records and submits the frame into `output`.
    fn draw(&mut self, output: &TextureView, ctx: AppContext<'_>);
}

#[derive(Debug, Clone, Copy)]
pub struct AppContext<'a> {
    pub window: &'a Window,
    pub device: &'a Device,
    pub queue: &'a Queue,
    pub surface_format: TextureFormat,
}

impl AppContext<'_> {
    /// Width over height of the window's client area, 1 while minimized.
    pub fn aspect_ratio(&self) -> f32 {
        let size = self.window.inner_size();

        if size.width == 0 || size.height == 0 {
            1.0
        } else {
            size.width as f32 / size.height as f32
        }
    }
}

impl<'a> From<AppContext<'a>> for GpuContext<'a> {
    fn from(value: AppContext<'a>) -> Self {
        Self {
            device: value.device,
            queue: value.queue,
            surface_format: value.surface_format,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppFlow {
    Continue,
    Exit,
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub enum AppEvent<'a> {
    CloseRequested,
    Device {
        device: DeviceId,
        event: DeviceEvent,
    },
    UnhandledWindowEvent(&'a lib_window::event::WindowEvent),
    UnhandledDeviceEvent {
        device: lib_window::event::DeviceId,
        event: &'a lib_window::event::DeviceEvent,
    },
}

/// Defines `main` for a binary whose game is `$Game`.
#[macro_export]
macro_rules! app_main {
    ($Game:ty) => {
        fn main() -> $crate::hidden::anyhow::Result<()> {
            $crate::hidden::main::<$Game>()
        }
    };
}

#[doc(hidden)]
pub mod hidden {
    pub use anyhow;

    use anyhow::Context;

    use crate::{AppHandler, init_logging, run_game};

    pub fn main<T: AppHandler>() -> anyhow::Result<()> {
        init_logging();

        run_game::<T>().with_context(|| format!("{} stopped", T::TITLE))
    }
}
