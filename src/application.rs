use std::time::Instant;

use glam::DVec2;
use wgpu::SurfaceError;
use winit::{
    dpi::PhysicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    window::{CursorGrabMode, Window, WindowBuilder},
};

use crate::{
    animation::FrameTime,
    camera::{InputHandler, InputResponse, Key, KeyAction},
    config::RendererConfig,
    error::{Error, Result},
};

#[derive(Debug)]
pub struct AppState {
    start_time: Instant,
    previous_time: Instant,
    elapsed_time: f32,
}

impl AppState {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            previous_time: now,
            elapsed_time: 0.0,
        }
    }

    pub fn update(&mut self) {
        let current_time = Instant::now();
        self.elapsed_time = current_time
            .duration_since(self.previous_time)
            .as_secs_f32();
        self.previous_time = current_time;
    }

    /// Seconds between the last two updates.
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    pub fn frame_time(&self) -> FrameTime {
        FrameTime {
            elapsed: self.elapsed_time,
            total: self
                .previous_time
                .duration_since(self.start_time)
                .as_secs_f32(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl Key {
    pub fn from_virtual(code: VirtualKeyCode) -> Option<Self> {
        let key = match code {
            VirtualKeyCode::W => Key::W,
            VirtualKeyCode::A => Key::A,
            VirtualKeyCode::S => Key::S,
            VirtualKeyCode::D => Key::D,
            VirtualKeyCode::Space => Key::Space,
            VirtualKeyCode::LControl => Key::LeftControl,
            VirtualKeyCode::LShift => Key::LeftShift,
            VirtualKeyCode::LAlt => Key::LeftAlt,
            VirtualKeyCode::Escape => Key::Escape,
            _ => return None,
        };
        Some(key)
    }
}

impl From<ElementState> for KeyAction {
    fn from(state: ElementState) -> Self {
        match state {
            ElementState::Pressed => KeyAction::Pressed,
            ElementState::Released => KeyAction::Released,
        }
    }
}

/// Forward a window event to the handler. Returns `true` when it asked to exit.
fn dispatch_input(handler: &mut dyn InputHandler, event: &WindowEvent) -> bool {
    match event {
        WindowEvent::KeyboardInput {
            input:
                KeyboardInput {
                    state,
                    virtual_keycode: Some(code),
                    ..
                },
            ..
        } => match Key::from_virtual(*code) {
            Some(key) => handler.key(key, (*state).into()) == InputResponse::Exit,
            None => false,
        },
        WindowEvent::Resized(size) => {
            handler.viewport_resized(size.width, size.height);
            false
        }
        _ => false,
    }
}

/// Feed a raw mouse delta to the handler as a position on an unbounded virtual
/// plane, so look input never stops at the window edge.
fn dispatch_motion(handler: &mut dyn InputHandler, pointer: &mut DVec2, delta: (f64, f64)) {
    *pointer += DVec2::new(delta.0, delta.1);
    handler.pointer_moved(pointer.x, pointer.y);
}

pub struct Application<L: Layer + 'static> {
    layer: Option<L>,
    screen: Screen,
    state: AppState,
    config: RendererConfig,
    pointer: DVec2,
}

impl<L: Layer + 'static> Application<L> {
    pub fn new(screen: Screen, config: RendererConfig) -> Self {
        Self {
            screen,
            layer: None,
            state: AppState::new(),
            config,
            pointer: DVec2::ZERO,
        }
    }

    fn shutdown(&mut self, control_flow: &mut ControlFlow) {
        control_flow.set_exit_with_code(0);
        if let Some(layer) = self.layer.as_mut() {
            if let Err(err) = layer.shutdown(&self.state, &mut self.screen) {
                tracing::error!("shutdown failed: {err}");
                control_flow.set_exit_with_code(1);
            }
        }
    }

    fn run(
        &mut self,
        event: Event<()>,
        _event_loop: &EventLoopWindowTarget<()>,
        control_flow: &mut ControlFlow,
    ) {
        control_flow.set_wait();

        match event {
            Event::NewEvents(StartCause::Init) => {
                match L::start(&mut self.screen, &self.state, &self.config) {
                    Ok(layer) => self.layer = Some(layer),
                    Err(err) if err.is_linkage() => {
                        tracing::error!("scene/shader contract mismatch: {err}");
                        control_flow.set_exit_with_code(1);
                    }
                    Err(err) => {
                        tracing::error!("{err}");
                        control_flow.set_exit_with_code(1);
                    }
                }
            }
            Event::WindowEvent {
                window_id,
                ref event,
            } if self.screen.window().id() == window_id => {
                let Some(layer) = self.layer.as_mut() else {
                    return;
                };
                if dispatch_input(layer.input(), event) {
                    self.shutdown(control_flow);
                    return;
                }
                match event {
                    WindowEvent::CloseRequested => self.shutdown(control_flow),
                    WindowEvent::Resized(physical_size) => {
                        self.screen.resize(*physical_size);
                        layer.resize(*physical_size, &self.state, &mut self.screen);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.screen.resize(**new_inner_size);
                        layer.resize(**new_inner_size, &self.state, &mut self.screen);
                    }
                    _ => {}
                }
            }
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                if let Some(layer) = self.layer.as_mut() {
                    dispatch_motion(layer.input(), &mut self.pointer, delta);
                }
            }
            Event::MainEventsCleared => {
                self.state.update();
                self.screen.window().request_redraw();
            }
            Event::RedrawRequested(window_id) if self.screen.window().id() == window_id => {
                let Some(layer) = self.layer.as_mut() else {
                    return;
                };
                layer.update(&self.state, &mut self.screen);

                match layer.render(&self.state, &mut self.screen) {
                    Ok(_) => {}
                    Err(SurfaceError::Lost) => self.screen.resize_to_current(),
                    Err(SurfaceError::OutOfMemory) => control_flow.set_exit_with_code(137),
                    Err(e) => tracing::error!("{:?}", e),
                }
            }
            _ => {}
        }
    }

    pub async fn init(config: RendererConfig) -> Result<()> {
        let event_loop = EventLoop::new();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let screen = Screen::new(&event_loop, &instance, &config).await?;
        let mut application = Self::new(screen, config);
        event_loop.run(move |event, event_loop, control_flow| {
            application.run(event, event_loop, control_flow);
        });
    }
}

pub struct Screen {
    pub surface: wgpu::Surface,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    window: Window,
}

impl Screen {
    pub async fn new(
        event_loop: &EventLoopWindowTarget<()>,
        instance: &wgpu::Instance,
        config: &RendererConfig,
    ) -> Result<Self> {
        let window = WindowBuilder::new()
            .with_title("RayTracing")
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .build(event_loop)?;

        // Look input comes from raw mouse motion; lock the cursor where the
        // platform allows it, otherwise keep it inside the window.
        if let Err(err) = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        {
            tracing::warn!("cursor grab unavailable: {err}");
        }
        window.set_cursor_visible(false);

        // SAFETY:
        // The surface needs to live as long as the window that created it.
        // Screen owns the window so this should be safe.
        let surface = unsafe { instance.create_surface(&window) }?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(Error::AdapterUnavailable)?;
        tracing::info!("using adapter {:?}", adapter.get_info().name);
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                    label: None,
                },
                None,
            )
            .await?;
        let size = window.inner_size();
        let surface_config = surface
            .get_default_config(&adapter, size.width, size.height)
            .ok_or(Error::AdapterUnavailable)?;
        surface.configure(&device, &surface_config);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config: surface_config,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Resize the screen to new window size.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Resize the screen to current window inner size.
    pub fn resize_to_current(&mut self) {
        self.resize(self.window.inner_size());
    }
}

pub trait Layer: Sized {
    type LayerErr: std::fmt::Display + 'static;

    fn start(screen: &mut Screen, app: &AppState, config: &RendererConfig) -> Result<Self>;
    /// Receiver for key, pointer and resize events.
    fn input(&mut self) -> &mut dyn InputHandler;
    fn resize(&mut self, new_size: PhysicalSize<u32>, app: &AppState, screen: &mut Screen);
    fn update(&mut self, app: &AppState, screen: &mut Screen);
    fn render(
        &mut self,
        app: &AppState,
        screen: &mut Screen,
    ) -> std::result::Result<(), SurfaceError>;
    fn shutdown(
        &mut self,
        app: &AppState,
        screen: &mut Screen,
    ) -> std::result::Result<(), Self::LayerErr>;
}
