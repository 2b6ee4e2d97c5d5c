//! Host-side twin of the `trace` kernel.
//!
//! Consumes the same [`Sphere`] and [`Uniforms`] records as the GPU and
//! follows the same shading model, so its output can stand in for the kernel
//! in tests and in `--cpu` renders.

use image::{Rgba, RgbaImage};

use crate::{
    camera::RayBasis,
    shader_types::{Sphere, Uniforms},
};

pub const MAX_BOUNCES: u32 = 4;
pub const AMBIENT: f32 = 0.1;
/// Minimum hit distance, keeps secondary rays off their own surface.
pub const T_MIN: f32 = 1e-3;
/// Reflection chains stop once they carry less than this.
pub const MIN_THROUGHPUT: f32 = 1e-3;
/// Radians per second of the light's orbit.
pub const LIGHT_ORBIT_SPEED: f32 = 0.3;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: glam::Vec3,
    pub direction: glam::Vec3,
}

#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub t: f32,
    pub index: usize,
}

/// Nearest intersection with `t > T_MIN`. `direction` must be normalized.
pub fn intersect(ray: &Ray, sphere: &Sphere) -> Option<f32> {
    if sphere.radius <= 0.0 {
        return None;
    }

    // |o + t*d - c|^2 = r^2 with |d| = 1
    // t^2 + 2(oc.d)t + (oc.oc - r^2) = 0
    let oc = ray.origin - sphere.center;
    let half_b = oc.dot(ray.direction);
    let c = oc.dot(oc) - sphere.radius * sphere.radius;
    let discriminant = half_b * half_b - c;

    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let near = -half_b - root;
    if near > T_MIN {
        return Some(near);
    }
    let far = -half_b + root;
    (far > T_MIN).then_some(far)
}

pub fn closest_hit(ray: &Ray, spheres: &[Sphere]) -> Option<Hit> {
    spheres
        .iter()
        .enumerate()
        .filter_map(|(index, sphere)| intersect(ray, sphere).map(|t| Hit { t, index }))
        .min_by(|a, b| a.t.total_cmp(&b.t))
}

/// Direction towards the light, circling the scene over time.
pub fn light_direction(time: f32) -> glam::Vec3 {
    let angle = time * LIGHT_ORBIT_SPEED;
    glam::Vec3::new(angle.cos(), 1.5, angle.sin()).normalize()
}

pub fn sky(direction: glam::Vec3) -> glam::Vec3 {
    let blend = 0.5 * (direction.y + 1.0);
    glam::Vec3::ONE.lerp(glam::Vec3::new(0.5, 0.7, 1.0), blend)
}

pub fn trace(mut ray: Ray, spheres: &[Sphere], time: f32) -> glam::Vec3 {
    let light = light_direction(time);
    let mut color = glam::Vec3::ZERO;
    let mut throughput = glam::Vec3::ONE;

    for _ in 0..MAX_BOUNCES {
        let Some(hit) = closest_hit(&ray, spheres) else {
            color += throughput * sky(ray.direction);
            return color;
        };

        let sphere = &spheres[hit.index];
        let point = ray.origin + ray.direction * hit.t;
        let normal = (point - sphere.center) / sphere.radius;

        let shadow = Ray {
            origin: point + normal * T_MIN,
            direction: light,
        };
        let lit = if closest_hit(&shadow, spheres).is_some() {
            0.0
        } else {
            normal.dot(light).max(0.0)
        };
        let diffuse = sphere.color * (AMBIENT + lit);

        color += throughput * diffuse * (1.0 - sphere.specular);
        throughput *= sphere.specular;
        if throughput.max_element() < MIN_THROUGHPUT {
            return color;
        }

        ray = Ray {
            origin: point + normal * T_MIN,
            direction: reflect(ray.direction, normal),
        };
    }

    color
}

fn reflect(direction: glam::Vec3, normal: glam::Vec3) -> glam::Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Primary ray through the center of pixel (x, y), y growing downwards.
pub fn primary_ray(uniforms: &Uniforms, basis: &RayBasis, x: u32, y: u32) -> Ray {
    let resolution = uniforms.resolution;
    let pixel = glam::Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
    let ndc = glam::Vec2::new(
        pixel.x / resolution.x * 2.0 - 1.0,
        1.0 - pixel.y / resolution.y * 2.0,
    );

    Ray {
        origin: uniforms.camera_position,
        direction: basis.direction(ndc, resolution.x / resolution.y),
    }
}

pub fn trace_pixel(uniforms: &Uniforms, spheres: &[Sphere], x: u32, y: u32) -> glam::Vec3 {
    let basis = RayBasis::new(uniforms.camera_position, uniforms.camera_target);
    trace(primary_ray(uniforms, &basis, x, y), spheres, uniforms.time)
}

pub fn render(uniforms: &Uniforms, spheres: &[Sphere]) -> RgbaImage {
    let width = uniforms.resolution.x as u32;
    let height = uniforms.resolution.y as u32;
    let basis = RayBasis::new(uniforms.camera_position, uniforms.camera_target);

    tracing::info!(width, height, spheres = spheres.len(), "cpu render");

    RgbaImage::from_fn(width, height, |x, y| {
        let color = trace(primary_ray(uniforms, &basis, x, y), spheres, uniforms.time);
        Rgba(convert_rgba(color.extend(1.0)))
    })
}

/// Same quantization as an `rgba8unorm` store.
pub fn convert_rgba(color: glam::Vec4) -> [u8; 4] {
    let scaled = color.clamp(glam::Vec4::ZERO, glam::Vec4::ONE) * 255.0;
    [
        scaled.x.round() as u8,
        scaled.y.round() as u8,
        scaled.z.round() as u8,
        scaled.w.round() as u8,
    ]
}
