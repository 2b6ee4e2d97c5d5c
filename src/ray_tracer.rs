use std::num::NonZeroU64;

use wgpu::include_wgsl;

use crate::{
    renderer::{StorageBuffer, UniformBuffer},
    shader_types::{Sphere, Uniforms},
    texture::Texture,
};

/// Compute stage tracing one pixel per invocation into [`RayTracer::output`].
pub struct RayTracer {
    uniforms: UniformBuffer<Uniforms>,
    spheres: StorageBuffer<Sphere>,
    output: Texture,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::ComputePipeline,
}

impl RayTracer {
    pub const WORKGROUP_SIZE: u32 = 8;

    pub fn new(device: &wgpu::Device, uniforms: &Uniforms, spheres: &[Sphere]) -> Self {
        let shader = device.create_shader_module(include_wgsl!("asset/shader/ray_tracing.wgsl"));

        let uniforms_buffer =
            UniformBuffer::init_immediate(device, uniforms, Some("Uniforms Buffer"));
        let spheres_buffer = StorageBuffer::init_immediate(device, spheres, Some("Spheres Buffer"));
        let (width, height) = output_size(uniforms);
        let output = Texture::storage_target(device, width, height, Some("Ray Tracing Target"));

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(std::mem::size_of::<Uniforms>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(std::mem::size_of::<Sphere>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: Texture::FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
            label: Some("ray_tracing_bind_group_layout"),
        });

        let bind_group = create_bind_group(
            device,
            &bind_group_layout,
            &uniforms_buffer,
            &spheres_buffer,
            &output,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Ray Tracing Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Ray Tracing Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "trace_main",
        });

        tracing::info!(width, height, spheres = spheres.len(), "ray tracer ready");

        Self {
            uniforms: uniforms_buffer,
            spheres: spheres_buffer,
            output,
            bind_group_layout,
            bind_group,
            pipeline,
        }
    }

    pub fn output(&self) -> &Texture {
        &self.output
    }

    /// Must be called before the frame is submitted, the queue orders the
    /// write ahead of the dispatch reading it.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &Uniforms) {
        self.uniforms.write(queue, uniforms);
    }

    pub fn update_spheres(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        spheres: &[Sphere],
    ) {
        if self.spheres.write(device, queue, spheres) {
            self.rebuild_bind_group(device);
        }
    }

    /// Recreates the output target, clamped to the device's texture limit.
    /// Returns false when the size is unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        let max = device.limits().max_texture_dimension_2d;
        let (width, height) = Texture::clamp_size(width, height, max);
        let size = self.output.size();
        if size.width == width && size.height == height {
            return false;
        }

        tracing::debug!(width, height, "resizing ray tracing target");
        self.output = Texture::storage_target(device, width, height, Some("Ray Tracing Target"));
        self.rebuild_bind_group(device);
        true
    }

    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder) {
        let size = self.output.size();
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Ray Tracing Pass"),
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.dispatch_workgroups(workgroup_count(size.width), workgroup_count(size.height), 1);
    }

    fn rebuild_bind_group(&mut self, device: &wgpu::Device) {
        self.bind_group = create_bind_group(
            device,
            &self.bind_group_layout,
            &self.uniforms,
            &self.spheres,
            &self.output,
        );
    }
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniforms: &UniformBuffer<Uniforms>,
    spheres: &StorageBuffer<Sphere>,
    output: &Texture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.buffer().as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: spheres.buffer().as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&output.view),
            },
        ],
        label: Some("ray_tracing_bind_group"),
    })
}

fn output_size(uniforms: &Uniforms) -> (u32, u32) {
    (uniforms.resolution.x as u32, uniforms.resolution.y as u32)
}

pub fn workgroup_count(pixels: u32) -> u32 {
    (pixels + RayTracer::WORKGROUP_SIZE - 1) / RayTracer::WORKGROUP_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workgroups_cover_partial_tiles() {
        assert_eq!(workgroup_count(800), 100);
        assert_eq!(workgroup_count(801), 101);
        assert_eq!(workgroup_count(1), 1);
    }
}
