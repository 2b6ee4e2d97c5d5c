use winit::event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};

use crate::{shader_types::Uniforms, util::math::half_fov_tan};

/// Vertical field of view, also hard coded in the kernel.
pub const FOV_Y_DEGREES: f32 = 60.0;

/// Camera circling the target, reproducing the demo animation.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: glam::Vec3,
    pub radius: f32,
    pub height: f32,
    /// Shifts the orbit center along z.
    pub offset_z: f32,
    /// Angular speed in radians per second.
    pub speed: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: glam::Vec3::ZERO,
            radius: 6.0,
            height: 2.0,
            offset_z: 5.0,
            speed: 0.5,
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self, time: f32) -> glam::Vec3 {
        let angle = time * self.speed;
        glam::Vec3::new(
            angle.sin() * self.radius,
            self.height,
            angle.cos() * self.radius + self.offset_z,
        )
    }

    pub fn uniforms(&self, time: f32, width: u32, height: u32) -> Uniforms {
        Uniforms::new(
            self.eye(time),
            self.target,
            glam::Vec2::new(width as f32, height as f32),
            time,
        )
    }
}

/// Orthonormal frame used to spawn primary rays.
#[derive(Debug, Clone, Copy)]
pub struct RayBasis {
    pub forward: glam::Vec3,
    pub right: glam::Vec3,
    pub up: glam::Vec3,
    /// tan(fov_y / 2)
    pub half_height: f32,
}

impl RayBasis {
    pub fn new(eye: glam::Vec3, target: glam::Vec3) -> Self {
        let forward = (target - eye).normalize_or_zero();
        let forward = if forward == glam::Vec3::ZERO {
            glam::Vec3::NEG_Z
        } else {
            forward
        };

        // looking straight up or down leaves Y parallel to forward
        let world_up = if forward.cross(glam::Vec3::Y).length_squared() < 1e-6 {
            glam::Vec3::Z
        } else {
            glam::Vec3::Y
        };
        let right = forward.cross(world_up).normalize();
        let up = right.cross(forward);

        Self {
            forward,
            right,
            up,
            half_height: half_fov_tan(FOV_Y_DEGREES),
        }
    }

    /// Direction through `ndc` in [-1, 1]², y pointing up.
    pub fn direction(&self, ndc: glam::Vec2, aspect: f32) -> glam::Vec3 {
        (self.forward
            + self.right * (ndc.x * aspect * self.half_height)
            + self.up * (ndc.y * self.half_height))
            .normalize()
    }
}

pub struct CameraController {
    pub step: f32,
    pub paused: bool,
}

impl CameraController {
    pub const MIN_RADIUS: f32 = 1.5;

    pub fn new(step: f32) -> Self {
        Self {
            step,
            paused: false,
        }
    }

    pub fn process_events(&mut self, camera: &mut OrbitCamera, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state,
                        virtual_keycode: Some(keycode),
                        ..
                    },
                ..
            } if *state == ElementState::Pressed => self.process_key(camera, *keycode),
            _ => false,
        }
    }

    fn process_key(&mut self, camera: &mut OrbitCamera, keycode: VirtualKeyCode) -> bool {
        match keycode {
            VirtualKeyCode::W => {
                camera.radius = (camera.radius - self.step).max(Self::MIN_RADIUS);
                tracing::debug!(radius = camera.radius, "orbit closer");
                true
            }
            VirtualKeyCode::S => {
                camera.radius += self.step;
                tracing::debug!(radius = camera.radius, "orbit farther");
                true
            }
            VirtualKeyCode::Space => {
                self.paused = !self.paused;
                tracing::info!(paused = self.paused, "animation toggled");
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_starts_behind_the_target() {
        let camera = OrbitCamera::default();
        let uniforms = camera.uniforms(0.0, 800, 600);

        assert_eq!(uniforms.camera_position, glam::Vec3::new(0.0, 2.0, 11.0));
        assert_eq!(uniforms.camera_target, glam::Vec3::ZERO);
        assert_eq!(uniforms.resolution, glam::Vec2::new(800.0, 600.0));
        assert_eq!(uniforms.time, 0.0);
    }

    #[test]
    fn orbit_follows_time() {
        let camera = OrbitCamera::default();
        let time = std::f32::consts::PI; // quarter turn at 0.5 rad/s
        let eye = camera.eye(time);

        assert!((eye.x - 6.0).abs() < 1e-5);
        assert!((eye.z - 5.0).abs() < 1e-5);
    }

    #[test]
    fn basis_is_orthonormal() {
        let basis = RayBasis::new(glam::Vec3::new(1.0, 2.0, 3.0), glam::Vec3::ZERO);

        assert!((basis.forward.length() - 1.0).abs() < 1e-5);
        assert!((basis.right.length() - 1.0).abs() < 1e-5);
        assert!((basis.up.length() - 1.0).abs() < 1e-5);
        assert!(basis.forward.dot(basis.right).abs() < 1e-5);
        assert!(basis.forward.dot(basis.up).abs() < 1e-5);
        assert!(basis.up.y > 0.0);
    }

    #[test]
    fn basis_survives_looking_straight_down() {
        let basis = RayBasis::new(glam::Vec3::new(0.0, 5.0, 0.0), glam::Vec3::ZERO);

        assert!(basis.right.is_finite());
        assert!(basis.up.is_finite());
        assert_eq!(basis.forward, glam::Vec3::NEG_Y);
    }

    #[test]
    fn center_ray_points_at_target() {
        let basis = RayBasis::new(glam::Vec3::new(0.0, 0.0, 5.0), glam::Vec3::ZERO);
        let direction = basis.direction(glam::Vec2::ZERO, 4.0 / 3.0);

        assert!((direction - glam::Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn controller_clamps_radius_and_toggles_pause() {
        let mut camera = OrbitCamera::default();
        let mut controller = CameraController::new(10.0);

        assert!(controller.process_key(&mut camera, VirtualKeyCode::W));
        assert_eq!(camera.radius, CameraController::MIN_RADIUS);
        assert!(controller.process_key(&mut camera, VirtualKeyCode::S));
        assert_eq!(camera.radius, CameraController::MIN_RADIUS + 10.0);
        assert!(controller.process_key(&mut camera, VirtualKeyCode::Space));
        assert!(controller.paused);
        assert!(!controller.process_key(&mut camera, VirtualKeyCode::Q));
    }
}
