//! Records shared between the host and `asset/shader/ray_tracing.wgsl`.
//!
//! Both structs mirror their WGSL declarations byte for byte. WGSL gives
//! `vec3<f32>` a 12 byte size and a 16 byte alignment, so a trailing scalar
//! fills the fourth lane, and a `vec3` that follows another `vec3` needs an
//! explicit padding lane on the Rust side.

use std::mem::{offset_of, size_of};

/// One renderable sphere, stored in the `spheres` storage buffer.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Sphere {
    pub center: glam::Vec3,
    pub radius: f32,
    /// Linear RGB.
    pub color: glam::Vec3,
    /// 0.0 = matte, 1.0 = mirror.
    pub specular: f32,
}

impl Sphere {
    pub const fn new(center: glam::Vec3, radius: f32, color: glam::Vec3, specular: f32) -> Self {
        Self {
            center,
            radius,
            color,
            specular,
        }
    }
}

/// Camera and viewport state for a single frame.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniforms {
    pub camera_position: glam::Vec3,
    _pad0: f32,
    pub camera_target: glam::Vec3,
    _pad1: f32,
    /// Output size in pixels.
    pub resolution: glam::Vec2,
    /// Seconds since the animation started.
    pub time: f32,
    _pad2: f32,
}

impl Uniforms {
    pub const fn new(
        camera_position: glam::Vec3,
        camera_target: glam::Vec3,
        resolution: glam::Vec2,
        time: f32,
    ) -> Self {
        Self {
            camera_position,
            _pad0: 0.0,
            camera_target,
            _pad1: 0.0,
            resolution,
            time,
            _pad2: 0.0,
        }
    }
}

pub mod layout {
    //! Byte offsets of the WGSL declarations.

    pub const SPHERE_SIZE: usize = 32;
    pub const SPHERE_CENTER: usize = 0;
    pub const SPHERE_RADIUS: usize = 12;
    pub const SPHERE_COLOR: usize = 16;
    pub const SPHERE_SPECULAR: usize = 28;

    pub const UNIFORMS_SIZE: usize = 48;
    pub const UNIFORMS_CAMERA_POSITION: usize = 0;
    pub const UNIFORMS_CAMERA_TARGET: usize = 16;
    pub const UNIFORMS_RESOLUTION: usize = 32;
    pub const UNIFORMS_TIME: usize = 40;
}

const _: () = {
    assert!(size_of::<Sphere>() == layout::SPHERE_SIZE);
    assert!(offset_of!(Sphere, center) == layout::SPHERE_CENTER);
    assert!(offset_of!(Sphere, radius) == layout::SPHERE_RADIUS);
    assert!(offset_of!(Sphere, color) == layout::SPHERE_COLOR);
    assert!(offset_of!(Sphere, specular) == layout::SPHERE_SPECULAR);

    assert!(size_of::<Uniforms>() == layout::UNIFORMS_SIZE);
    assert!(offset_of!(Uniforms, camera_position) == layout::UNIFORMS_CAMERA_POSITION);
    assert!(offset_of!(Uniforms, camera_target) == layout::UNIFORMS_CAMERA_TARGET);
    assert!(offset_of!(Uniforms, resolution) == layout::UNIFORMS_RESOLUTION);
    assert!(offset_of!(Uniforms, time) == layout::UNIFORMS_TIME);
    // uniform buffer bindings must be a multiple of 16
    assert!(size_of::<Uniforms>() % 16 == 0);
};

#[cfg(test)]
mod tests {
    use super::*;

    fn read_f32(bytes: &[u8], offset: usize) -> f32 {
        bytemuck::pod_read_unaligned(&bytes[offset..offset + 4])
    }

    fn read_vec3(bytes: &[u8], offset: usize) -> glam::Vec3 {
        bytemuck::pod_read_unaligned(&bytes[offset..offset + 12])
    }

    #[test]
    fn sphere_fields_land_on_wgsl_offsets() {
        let sphere = Sphere::new(
            glam::Vec3::new(0.0, 0.0, -5.0),
            1.0,
            glam::Vec3::new(1.0, 0.0, 0.0),
            0.0,
        );
        let bytes = bytemuck::bytes_of(&sphere);

        assert_eq!(bytes.len(), 32);
        assert_eq!(read_vec3(bytes, layout::SPHERE_CENTER), sphere.center);
        assert_eq!(read_f32(bytes, layout::SPHERE_RADIUS), 1.0);
        assert_eq!(read_vec3(bytes, layout::SPHERE_COLOR), sphere.color);
        assert_eq!(read_f32(bytes, layout::SPHERE_SPECULAR), 0.0);

        let decoded: Sphere = bytemuck::pod_read_unaligned(bytes);
        assert_eq!(decoded, sphere);
    }

    #[test]
    fn uniforms_fields_land_on_wgsl_offsets() {
        let uniforms = Uniforms::new(
            glam::Vec3::ZERO,
            glam::Vec3::new(0.0, 0.0, -1.0),
            glam::Vec2::new(800.0, 600.0),
            0.0,
        );
        let bytes = bytemuck::bytes_of(&uniforms);

        assert_eq!(bytes.len(), 48);
        let position = read_vec3(bytes, layout::UNIFORMS_CAMERA_POSITION);
        let target = read_vec3(bytes, layout::UNIFORMS_CAMERA_TARGET);
        assert_eq!(position, glam::Vec3::ZERO);
        assert_eq!(target, glam::Vec3::new(0.0, 0.0, -1.0));
        let resolution: glam::Vec2 = bytemuck::pod_read_unaligned(
            &bytes[layout::UNIFORMS_RESOLUTION..layout::UNIFORMS_RESOLUTION + 8],
        );
        assert_eq!(resolution, glam::Vec2::new(800.0, 600.0));
        assert_eq!(read_f32(bytes, layout::UNIFORMS_TIME), 0.0);

        // padding lanes stay zeroed
        assert_eq!(read_f32(bytes, 12), 0.0);
        assert_eq!(read_f32(bytes, 28), 0.0);
        assert_eq!(read_f32(bytes, 44), 0.0);
    }

    #[test]
    fn field_values_are_preserved_bit_exact() {
        let sphere = Sphere::new(
            glam::Vec3::new(f32::MIN_POSITIVE, -0.0, 1e30),
            f32::EPSILON,
            glam::Vec3::new(0.1, 0.2, 0.3),
            f32::NAN,
        );
        let decoded: Sphere = bytemuck::pod_read_unaligned(bytemuck::bytes_of(&sphere));

        let bits = |v: glam::Vec3| v.to_array().map(f32::to_bits);
        assert_eq!(bits(decoded.center), bits(sphere.center));
        assert_eq!(decoded.radius.to_bits(), sphere.radius.to_bits());
        assert_eq!(decoded.color, sphere.color);
        assert_eq!(decoded.specular.to_bits(), sphere.specular.to_bits());
    }

    #[test]
    fn sphere_slices_pack_without_gaps() {
        let unit = Sphere::new(glam::Vec3::ONE, 2.0, glam::Vec3::ONE, 1.0);
        let spheres = [Sphere::default(), unit];
        let bytes: &[u8] = bytemuck::cast_slice(&spheres);

        assert_eq!(bytes.len(), 2 * layout::SPHERE_SIZE);
        let second_radius = layout::SPHERE_SIZE + layout::SPHERE_RADIUS;
        assert_eq!(read_f32(bytes, second_radius), 2.0);
    }
}
