use std::time::{Duration, Instant};

use wgpu::SurfaceError;
use winit::{
    dpi::PhysicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    window::{Window, WindowBuilder},
};

use crate::{
    error::{Error, Result},
    texture::Texture,
};

#[derive(Debug)]
pub struct AppState {
    start_time: Instant,
    previous_time: Instant,
    delta: Duration,
}

impl AppState {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            previous_time: now,
            delta: Duration::ZERO,
        }
    }

    pub fn update(&mut self) {
        let current_time = Instant::now();
        self.delta = current_time.duration_since(self.previous_time);
        self.previous_time = current_time;
    }

    /// Seconds since the application started.
    pub fn elapsed(&self) -> f32 {
        (self.previous_time - self.start_time).as_secs_f32()
    }

    /// Seconds between the last two updates.
    pub fn delta(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Application<L: Layer + 'static> {
    layer: Option<L>,
    screen: Screen,
    state: AppState,
}

impl<L: Layer + 'static> Application<L> {
    pub fn new(screen: Screen) -> Self {
        Self {
            screen,
            layer: None,
            state: AppState::new(),
        }
    }

    fn run(
        &mut self,
        event: Event<()>,
        _event_loop: &EventLoopWindowTarget<()>,
        control_flow: &mut ControlFlow,
    ) {
        control_flow.set_poll();

        if let Event::NewEvents(StartCause::Init) = event {
            match L::start(&mut self.screen, &self.state) {
                Ok(layer) => self.layer = Some(layer),
                Err(e) => {
                    tracing::error!("failed to start: {e}");
                    control_flow.set_exit_with_code(1);
                }
            }
            return;
        }

        let Some(layer) = self.layer.as_mut() else {
            return;
        };
        layer.process_event(&event, &mut self.screen);

        match event {
            Event::WindowEvent {
                window_id,
                ref event,
            } if self.screen.window().id() == window_id => match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(VirtualKeyCode::Escape),
                            ..
                        },
                    ..
                } => {
                    control_flow.set_exit_with_code(0);
                    if let Err(e) = layer.shutdown(&self.state, &mut self.screen) {
                        tracing::error!("shutdown failed: {e}");
                        control_flow.set_exit_with_code(1);
                    }
                }
                WindowEvent::Resized(physical_size) => {
                    self.screen.resize(*physical_size);
                    layer.resize(*physical_size, &self.state, &mut self.screen);
                }
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    self.screen.resize(**new_inner_size);
                    layer.resize(**new_inner_size, &self.state, &mut self.screen);
                }
                _ => {}
            },
            Event::MainEventsCleared => {
                self.state.update();
                self.screen.window().request_redraw();
            }
            Event::RedrawRequested(window_id) if self.screen.window().id() == window_id => {
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

    pub async fn init(title: &str, size: PhysicalSize<u32>) -> Result<()> {
        let event_loop = EventLoop::new();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let window = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(size)
            .build(&event_loop)?;
        let screen = Screen::new(window, &instance).await?;
        let mut application = Self::new(screen);
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
    pub async fn new(window: Window, instance: &wgpu::Instance) -> Result<Self> {
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
            .ok_or(Error::NoAdapter)?;
        tracing::info!(adapter = ?adapter.get_info(), "using adapter");

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
        let max = device.limits().max_texture_dimension_2d;
        let size = window.inner_size();
        let (width, height) = Texture::clamp_size(size.width, size.height, max);
        let mut config = surface
            .get_default_config(&adapter, width, height)
            .ok_or(Error::SurfaceConfig)?;
        let formats = surface.get_capabilities(&adapter).formats;
        config.format = linear_surface_format(&formats, config.format);
        tracing::info!(format = ?config.format, width, height, "configuring surface");
        surface.configure(&device, &config);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    /// Resize the screen to new window size, clamped to the texture limit.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            let max = self.device.limits().max_texture_dimension_2d;
            let (width, height) = Texture::clamp_size(new_size.width, new_size.height, max);
            self.config.width = width;
            self.config.height = height;
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

    fn start(screen: &mut Screen, app: &AppState) -> std::result::Result<Self, Self::LayerErr>;
    fn process_event(&mut self, event: &Event<()>, screen: &mut Screen);
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

/// The kernel writes unencoded colour, the same bytes a PNG frame stores.
/// Presenting through an sRGB view would encode them a second time, so the
/// non-sRGB twin of the preferred format is used whenever the surface has one.
pub fn linear_surface_format(
    supported: &[wgpu::TextureFormat],
    preferred: wgpu::TextureFormat,
) -> wgpu::TextureFormat {
    let linear = preferred.remove_srgb_suffix();
    if supported.contains(&linear) {
        linear
    } else {
        preferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_only_advances_on_update() {
        let mut state = AppState::new();
        assert_eq!(state.elapsed(), 0.0);

        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(state.elapsed(), 0.0);

        state.update();
        assert!(state.elapsed() > 0.0);
        assert!((state.delta() - state.elapsed()).abs() < 1e-6);
    }

    #[test]
    fn surface_prefers_the_unencoded_format() {
        use wgpu::TextureFormat::{Bgra8Unorm, Bgra8UnormSrgb, Rgba8Unorm};

        let both = [Bgra8UnormSrgb, Bgra8Unorm];
        assert_eq!(linear_surface_format(&both, Bgra8UnormSrgb), Bgra8Unorm);
        assert_eq!(linear_surface_format(&both, Bgra8Unorm), Bgra8Unorm);

        let srgb_only = [Bgra8UnormSrgb];
        let format = linear_surface_format(&srgb_only, Bgra8UnormSrgb);
        assert_eq!(format, Bgra8UnormSrgb);
        assert_eq!(linear_surface_format(&[], Rgba8Unorm), Rgba8Unorm);
    }
}
