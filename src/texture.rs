use crate::error::{Error, Result};

/// Target written by the ray tracing kernel and sampled by the blit pass.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Writable from the kernel and filterable by the blit sampler.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
    pub const BYTES_PER_PIXEL: u32 = 4;

    pub fn storage_target(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        label: Option<&str>,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Zero extents become one, anything past `max` is rejected.
    pub fn check_size(width: u32, height: u32, max: u32) -> Result<(u32, u32)> {
        if width > max || height > max {
            return Err(Error::TextureTooLarge { width, height, max });
        }
        Ok((width.max(1), height.max(1)))
    }

    /// Fits a surface size into `[1, max]` on both axes.
    pub fn clamp_size(width: u32, height: u32, max: u32) -> (u32, u32) {
        (width.clamp(1, max), height.clamp(1, max))
    }

    pub fn size(&self) -> wgpu::Extent3d {
        self.texture.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_targets_are_rejected() {
        assert_eq!(Texture::check_size(800, 600, 8192).unwrap(), (800, 600));
        assert_eq!(Texture::check_size(0, 8192, 8192).unwrap(), (1, 8192));
        assert!(matches!(
            Texture::check_size(10000, 600, 8192),
            Err(Error::TextureTooLarge {
                width: 10000,
                height: 600,
                max: 8192
            })
        ));
    }

    #[test]
    fn window_sizes_are_clamped_to_the_limit() {
        assert_eq!(Texture::clamp_size(10000, 600, 8192), (8192, 600));
        assert_eq!(Texture::clamp_size(0, 0, 8192), (1, 1));
    }
}
