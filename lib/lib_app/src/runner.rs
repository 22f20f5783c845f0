use std::{sync::Arc, time::Instant};

use gilrs::Gilrs;
use lib_gpu::{
    Device, DeviceDescriptor, Instance, PollType, Queue, RequestAdapterOptions, Surface,
    SurfaceConfiguration, SurfaceError, SurfaceTexture, TextureViewDescriptor,
};
use lib_window::{
    ButtonCode, ButtonEvent, DeviceEvent,
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window},
};

use crate::{AppContext, AppError, AppEvent, AppFlow, AppHandler, DeviceId};

/// Opens the window and runs `T` until it exits or startup fails.
pub fn run_game<T: AppHandler>() -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::EventLoop)?;

    let mut application = GameRunner::<T>::Uninitialized;

    event_loop
        .run_app(&mut application)
        .map_err(AppError::EventLoop)?;

    match application {
        GameRunner::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum GameRunner<T: AppHandler> {
    Uninitialized,
    Initialized(InitializedGameRunner<T>),
    Failed(AppError),
}

struct InitializedGameRunner<T: AppHandler> {
    display: Display,
    gilrs: Gilrs,
    alt_left_is_held: bool,
    alt_right_is_held: bool,
    game: T,
    last_instant: Instant,
}

/// The window and the GPU objects presenting to it.
struct Display {
    window: Arc<Window>,
    device: Device,
    queue: Queue,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
}

impl<T: AppHandler> ApplicationHandler for GameRunner<T> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let GameRunner::Uninitialized = self else {
            return;
        };

        match InitializedGameRunner::new(event_loop) {
            Ok(runner) => *self = GameRunner::Initialized(runner),
            Err(err) => {
                tracing::error!(error = %err, "startup failed");

                *self = GameRunner::Failed(err);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let GameRunner::Initialized(init_self) = self else {
            return;
        };

        init_self.poll_gilrs_events(event_loop);

        let now = Instant::now();
        let delta_time = now.duration_since(init_self.last_instant);
        init_self.last_instant = now;

        handle_gameflow!(
            event_loop,
            init_self.game.update(delta_time, init_self.display.ctx())
        );

        init_self.display.window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: lib_window::window::WindowId,
        event: WindowEvent,
    ) {
        let Self::Initialized(init_self) = self else {
            return;
        };

        init_self.fsswitch_window_event(&event);

        let game_event = match &event {
            WindowEvent::CloseRequested => AppEvent::CloseRequested,
            WindowEvent::KeyboardInput {
                device_id,
                event: key_event,
                is_synthetic: _,
            } => match key_event.physical_key {
                PhysicalKey::Code(key) if !key_event.repeat => AppEvent::Device {
                    device: DeviceId::Winit(*device_id),
                    event: DeviceEvent::Key {
                        key,
                        pressed: key_event.state.is_pressed(),
                    },
                },
                _ => AppEvent::UnhandledWindowEvent(&event),
            },
            WindowEvent::MouseInput {
                device_id,
                state,
                button,
            } => AppEvent::Device {
                device: DeviceId::Winit(*device_id),
                event: DeviceEvent::Mouse {
                    button: *button,
                    pressed: state.is_pressed(),
                },
            },
            WindowEvent::CursorMoved {
                device_id,
                position,
            } => AppEvent::Device {
                device: DeviceId::Winit(*device_id),
                event: DeviceEvent::CursorMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                },
            },
            _ => AppEvent::UnhandledWindowEvent(&event),
        };

        handle_gameflow!(
            event_loop,
            init_self.game.event(game_event, init_self.display.ctx())
        );

        match &event {
            WindowEvent::RedrawRequested => init_self.redraw(),
            WindowEvent::Resized(size) => init_self.display.resize(size.width, size.height),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        device_id: lib_window::event::DeviceId,
        event: lib_window::event::DeviceEvent,
    ) {
        let GameRunner::Initialized(init_self) = self else {
            return;
        };

        let game_event = AppEvent::UnhandledDeviceEvent {
            device: device_id,
            event: &event,
        };

        handle_gameflow!(
            event_loop,
            init_self.game.event(game_event, init_self.display.ctx())
        );
    }
}

impl<T: AppHandler> InitializedGameRunner<T> {
    fn new(event_loop: &ActiveEventLoop) -> Result<Self, AppError> {
        let window = Arc::new(
            event_loop
                .create_window(T::window_attributes())
                .map_err(AppError::Window)?,
        );

        let instance = Instance::default();

        let surface = instance
            .create_surface(window.clone())
            .map_err(AppError::Surface)?;

        let adapter = pollster::block_on(instance.request_adapter(&RequestAdapterOptions {
            compatible_surface: Some(&surface),
            ..RequestAdapterOptions::default()
        }))
        .map_err(AppError::Adapter)?;

        let info = adapter.get_info();
        tracing::info!(adapter = %info.name, backend = ?info.backend, "graphics adapter selected");

        let (device, queue) =
            pollster::block_on(adapter.request_device(&DeviceDescriptor::default()))
                .map_err(AppError::Device)?;

        let size = window.inner_size();

        let surface_config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(AppError::SurfaceUnsupported)?;

        surface.configure(&device, &surface_config);

        tracing::info!(
            width = surface_config.width,
            height = surface_config.height,
            format = ?surface_config.format,
            "surface configured"
        );

        let gilrs = match Gilrs::new() {
            Ok(gilrs) => gilrs,
            Err(gilrs::Error::NotImplemented(dummy)) => {
                tracing::warn!("gamepads are not supported on this platform");
                dummy
            }
            Err(err) => return Err(AppError::Gamepad(err.to_string())),
        };

        let game = T::new(AppContext {
            window: &window,
            device: &device,
            queue: &queue,
            surface_format: surface_config.format,
        })
        .map_err(AppError::Startup)?;

        let last_instant = Instant::now();

        Ok(Self {
            display: Display {
                window,
                device,
                queue,
                surface,
                surface_config,
            },
            alt_left_is_held: false,
            alt_right_is_held: false,
            gilrs,
            game,
            last_instant,
        })
    }

    fn redraw(&mut self) {
        let Some(texture) = self.display.acquire() else {
            return;
        };

        let view = texture
            .texture
            .create_view(&TextureViewDescriptor::default());

        self.game.draw(&view, self.display.ctx());

        self.display.window.pre_present_notify();
        texture.present();

        if let Err(err) = self.display.device.poll(PollType::Poll) {
            tracing::warn!(error = %err, "device poll failed");
        }
    }

    fn fsswitch_window_event(&mut self, event: &WindowEvent) {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return;
        };

        if event.repeat {
            return;
        }

        let PhysicalKey::Code(keycode) = event.physical_key else {
            return;
        };

        match keycode {
            KeyCode::AltLeft => self.alt_left_is_held = event.state.is_pressed(),
            KeyCode::AltRight => self.alt_right_is_held = event.state.is_pressed(),

            KeyCode::Enter if event.state.is_pressed() => {
                if self.alt_left_is_held || self.alt_right_is_held {
                    match self.display.window.fullscreen() {
                        Some(_) => self.display.window.set_fullscreen(None),
                        None => self
                            .display
                            .window
                            .set_fullscreen(Some(Fullscreen::Borderless(None))),
                    }
                }
            }

            _ => {}
        }
    }

    fn poll_gilrs_events(&mut self, event_loop: &ActiveEventLoop) {
        while let Some(event) = self.gilrs.next_event() {
            let device = DeviceId::Gilrs(event.id);

            let (first, second) = match event.event {
                gilrs::EventType::Connected => (DeviceEvent::Connected, None),
                gilrs::EventType::Disconnected => (DeviceEvent::Disconnected, None),
                gilrs::EventType::AxisChanged(axis, value, _) => {
                    let Some((positive, negative)) = ButtonCode::stick_directions(axis) else {
                        continue;
                    };

                    (
                        DeviceEvent::Button(ButtonEvent {
                            button: positive,
                            value: value.max(0.0),
                        }),
                        Some(DeviceEvent::Button(ButtonEvent {
                            button: negative,
                            value: (-value).max(0.0),
                        })),
                    )
                }
                gilrs::EventType::ButtonChanged(button, value, _) => (
                    DeviceEvent::Button(ButtonEvent {
                        button: ButtonCode::from_gilrs(button),
                        value,
                    }),
                    None,
                ),
                _ => continue,
            };

            for event in std::iter::once(first).chain(second) {
                handle_gameflow!(
                    event_loop,
                    self.game
                        .event(AppEvent::Device { device, event }, self.display.ctx())
                );
            }
        }
    }
}

impl Display {
    fn ctx(&self) -> AppContext<'_> {
        AppContext {
            window: &self.window,
            device: &self.device,
            queue: &self.queue,
            surface_format: self.surface_config.format,
        }
    }

    /// The next swapchain texture. A lost or outdated surface is reconfigured and the frame skipped.
    fn acquire(&self) -> Option<SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(texture) => Some(texture),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping frame");
                None
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.surface_config.width = width;
        self.surface_config.height = height;

        self.surface.configure(&self.device, &self.surface_config);

        tracing::debug!(width, height, "surface resized");
    }
}

macro_rules! handle_gameflow {
    ($event_loop:expr, $flow:expr) => {
        match $flow {
            AppFlow::Continue => {}
            AppFlow::Exit => {
                $event_loop.exit();
                return;
            }
        }
    };
}

use handle_gameflow;
