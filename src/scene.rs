use winit::event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};

use crate::shader_types::Sphere;

const SPAWN_PALETTE: [glam::Vec3; 4] = [
    glam::Vec3::new(1.0, 0.8, 0.1),
    glam::Vec3::new(0.1, 0.8, 0.3),
    glam::Vec3::new(0.8, 0.2, 0.9),
    glam::Vec3::new(0.9, 0.9, 0.9),
];

#[derive(Debug, Default, Clone)]
pub struct Scene {
    pub spheres: Vec<Sphere>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Red ball on a grey ground, flanked by a mirror and a glossy blue ball.
    pub fn demo() -> Self {
        let mut scene = Self::new();
        scene.push(Sphere::new(
            glam::Vec3::ZERO,
            1.0,
            glam::Vec3::new(1.0, 0.0, 0.0),
            0.2,
        ));
        // ground
        scene.push(Sphere::new(
            glam::Vec3::new(0.0, -101.0, 0.0),
            100.0,
            glam::Vec3::splat(0.5),
            0.0,
        ));
        scene.push(Sphere::new(
            glam::Vec3::new(-2.2, 0.0, -1.0),
            1.0,
            glam::Vec3::splat(0.9),
            0.95,
        ));
        scene.push(Sphere::new(
            glam::Vec3::new(2.2, 0.0, -1.0),
            1.0,
            glam::Vec3::new(0.0, 0.0, 1.0),
            0.5,
        ));
        scene
    }

    pub fn push(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
    }

    pub fn pop(&mut self) -> Option<Sphere> {
        self.spheres.pop()
    }

    /// Drops a small ball on the ground ring, each one a golden angle further
    /// round than the previous.
    pub fn spawn(&mut self) {
        const GOLDEN_ANGLE: f32 = 2.399_963;
        const RING_RADIUS: f32 = 3.5;

        let index = self.spheres.len();
        let (sin, cos) = (index as f32 * GOLDEN_ANGLE).sin_cos();
        let center = glam::Vec3::new(cos * RING_RADIUS, -0.5, sin * RING_RADIUS);
        let color = SPAWN_PALETTE[index % SPAWN_PALETTE.len()];
        let specular = (index as f32 * 0.37).fract();
        self.push(Sphere::new(center, 0.5, color, specular));
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// Spheres in upload order.
    ///
    /// Storage bindings cannot be empty, so an empty scene yields one zeroed
    /// sphere. A zero radius is never hit by the kernel.
    pub fn gpu_spheres(&self) -> &[Sphere] {
        static EMPTY: [Sphere; 1] = [Sphere::new(glam::Vec3::ZERO, 0.0, glam::Vec3::ZERO, 0.0)];

        if self.spheres.is_empty() {
            &EMPTY
        } else {
            &self.spheres
        }
    }
}

/// N adds a sphere, Backspace removes the newest one.
pub struct SceneController;

impl SceneController {
    /// Returns whether the scene changed.
    pub fn process_events(&self, scene: &mut Scene, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state: ElementState::Pressed,
                        virtual_keycode: Some(keycode),
                        ..
                    },
                ..
            } => self.process_key(scene, *keycode),
            _ => false,
        }
    }

    fn process_key(&self, scene: &mut Scene, keycode: VirtualKeyCode) -> bool {
        match keycode {
            VirtualKeyCode::N => {
                scene.spawn();
                tracing::info!(spheres = scene.spheres.len(), "sphere added");
                true
            }
            VirtualKeyCode::Back => match scene.pop() {
                Some(_) => {
                    tracing::info!(spheres = scene.spheres.len(), "sphere removed");
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}
