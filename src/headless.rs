//! Single frame rendering without a window.

use image::RgbaImage;

use crate::{
    error::{Error, Result},
    ray_tracer::RayTracer,
    shader_types::{Sphere, Uniforms},
    texture::Texture,
};

pub struct Headless {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl Headless {
    pub async fn new(instance: &wgpu::Instance) -> Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
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

        Ok(Self { device, queue })
    }

    /// Traces one frame and reads the target back into host memory.
    pub fn render(&self, uniforms: &Uniforms, spheres: &[Sphere]) -> Result<RgbaImage> {
        Texture::check_size(
            uniforms.resolution.x as u32,
            uniforms.resolution.y as u32,
            self.device.limits().max_texture_dimension_2d,
        )?;

        let ray_tracer = RayTracer::new(&self.device, uniforms, spheres);
        let size = ray_tracer.output().size();
        let padded_row = padded_bytes_per_row(size.width);

        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Buffer"),
            size: padded_row as u64 * size.height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Headless Encoder"),
            });
        ray_tracer.dispatch(&mut encoder);
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &ray_tracer.output().texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(size.height),
                },
            },
            size,
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = readback.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|_| Error::BufferMap(wgpu::BufferAsyncError))??;

        let pixels = {
            let mapped = slice.get_mapped_range();
            unpad_rows(&mapped, size.width, size.height)
        };
        readback.unmap();
        let pixels = pixels?;

        let actual = pixels.len();
        RgbaImage::from_raw(size.width, size.height, pixels).ok_or(Error::Readback {
            expected: (size.width * size.height * Texture::BYTES_PER_PIXEL) as usize,
            actual,
        })
    }
}

/// Row pitch rounded up to `COPY_BYTES_PER_ROW_ALIGNMENT`.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * Texture::BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (unpadded + align - 1) / align * align
}

/// Drops the per-row alignment padding of a texture copy.
pub fn unpad_rows(padded: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let row = (width * Texture::BYTES_PER_PIXEL) as usize;
    let pitch = padded_bytes_per_row(width) as usize;
    let expected = match height {
        0 => 0,
        rows => pitch * (rows as usize - 1) + row,
    };
    if padded.len() < expected {
        return Err(Error::Readback {
            expected,
            actual: padded.len(),
        });
    }

    let mut pixels = Vec::with_capacity(row * height as usize);
    for chunk in padded.chunks(pitch).take(height as usize) {
        pixels.extend_from_slice(&chunk[..row]);
    }
    Ok(pixels)
}
