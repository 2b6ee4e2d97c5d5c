use std::process::ExitCode;

use clap::Parser;
use sphere_tracer_lib::{
    application::{AppState, Application, Layer, Screen},
    blit::Blit,
    camera::{CameraController, OrbitCamera},
    config::{Cli, Mode},
    cpu,
    error::{Error, Result},
    headless::Headless,
    ray_tracer::RayTracer,
    scene::{Scene, SceneController},
};
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, event::Event};

struct RayTracingGPU {
    scene: Scene,
    camera: OrbitCamera,
    camera_controller: CameraController,
    scene_controller: SceneController,
    /// Set when the sphere list changed since the last upload.
    scene_dirty: bool,
    ray_tracer: RayTracer,
    blit: Blit,
    /// Animation clock, frozen while paused.
    time: f32,
}

impl Layer for RayTracingGPU {
    type LayerErr = Error;

    fn start(screen: &mut Screen, app: &AppState) -> Result<Self> {
        let scene = Scene::demo();
        let camera = OrbitCamera::default();
        let size = screen.size();
        let uniforms = camera.uniforms(app.elapsed(), size.width, size.height);

        let ray_tracer = RayTracer::new(&screen.device, &uniforms, scene.gpu_spheres());
        let blit = Blit::new(&screen.device, screen.config.format, ray_tracer.output());

        Ok(Self {
            scene,
            camera,
            camera_controller: CameraController::new(0.5),
            scene_controller: SceneController,
            scene_dirty: false,
            ray_tracer,
            blit,
            time: 0.0,
        })
    }

    fn process_event(&mut self, event: &Event<()>, _screen: &mut Screen) {
        let Self {
            scene,
            camera,
            camera_controller,
            scene_controller,
            scene_dirty,
            ..
        } = self;
        if let Event::WindowEvent { event, .. } = event {
            camera_controller.process_events(camera, event);
            *scene_dirty |= scene_controller.process_events(scene, event);
        }
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>, _app: &AppState, screen: &mut Screen) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        let size = screen.size();
        let device = &screen.device;
        if self.ray_tracer.resize(device, size.width, size.height) {
            self.blit.set_source(device, self.ray_tracer.output());
        }
    }

    fn update(&mut self, app: &AppState, screen: &mut Screen) {
        if !self.camera_controller.paused {
            self.time += app.delta();
        }

        let size = screen.size();
        let uniforms = self.camera.uniforms(self.time, size.width, size.height);
        self.ray_tracer.update_uniforms(&screen.queue, &uniforms);
        if self.scene_dirty {
            let spheres = self.scene.gpu_spheres();
            let (device, queue) = (&screen.device, &screen.queue);
            self.ray_tracer.update_spheres(device, queue, spheres);
            self.scene_dirty = false;
            tracing::debug!(spheres = self.scene.spheres.len(), "scene uploaded");
        }
    }

    fn render(
        &mut self,
        _app: &AppState,
        screen: &mut Screen,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = screen.surface.get_current_texture()?;
        let view = output.texture.create_view(&Default::default());
        let mut encoder = screen
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.ray_tracer.dispatch(&mut encoder);
        self.blit.draw(&mut encoder, &view);

        screen.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn shutdown(&mut self, _app: &AppState, _screen: &mut Screen) -> Result<()> {
        tracing::info!("exiting");
        Ok(())
    }
}

fn render_to_file(cli: &Cli, mode: Mode) -> Result<()> {
    let (width, height) = cli.size()?;
    let scene = Scene::demo();
    let uniforms = OrbitCamera::default().uniforms(cli.time, width, height);

    let (image, path) = match mode {
        Mode::Cpu(path) => (cpu::render(&uniforms, &scene.spheres), path),
        Mode::Gpu(path) => {
            let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
            let headless = pollster::block_on(Headless::new(&instance))?;
            (headless.render(&uniforms, scene.gpu_spheres())?, path)
        }
        Mode::Windowed => return Ok(()),
    };

    image.save(&path)?;
    tracing::info!(path = %path.display(), width, height, "frame written");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let result = match cli.mode() {
        Mode::Windowed => cli.size().and_then(|(width, height)| {
            pollster::block_on(Application::<RayTracingGPU>::init(
                "sphere-tracer",
                PhysicalSize::new(width, height),
            ))
        }),
        mode => render_to_file(&cli, mode),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
