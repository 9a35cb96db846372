// SPDX-License-Identifier: GPL-3.0-only

//! Bind group layout, compute pipeline and buffer management for one
//! specialised (source, destination) conversion.
//!
//! wgpu's `BindGroupLayout` + `BindGroup` pair is the library's equivalent of
//! a descriptor-set-pool-backed descriptor set: one layout describes the two
//! storage-buffer bindings every kernel uses, and one bind group is rebuilt
//! whenever the backing buffers change. There's no separate "command
//! program" object to build the way a raw Vulkan implementation would —
//! `wgpu::CommandEncoder` already records a pipeline bind plus a dispatch in
//! one pass, so [`ConversionPipeline::record`] is the whole of it.

use crate::frame::VideoFrame;
use crate::gpu::Device;
use crate::shader;

const WORKGROUP_SIZE: u32 = 16;
/// Each invocation produces a 2x2 block of destination pixels, so chroma
/// subsampling can be averaged within one invocation instead of across a
/// workgroup-wide barrier.
const BLOCK_SIZE: u32 = 2;
const COPY_BUFFER_ALIGNMENT: u64 = 4;

fn compute_dispatch_size(dimension: u32, workgroup_size: u32) -> u32 {
    dimension.div_ceil(workgroup_size)
}

fn aligned(size: u64) -> u64 {
    size.next_multiple_of(COPY_BUFFER_ALIGNMENT)
}

/// A compute pipeline and its buffers, specialised for one (source,
/// destination) [`VideoFrame`] pair via [`shader::constants`].
///
/// [`crate::converter::VideoConverter`] rebuilds this whenever
/// [`VideoFrame::layout_equals`] reports the cached frames no longer match.
pub struct ConversionPipeline {
    pipeline: wgpu::ComputePipeline,
    src_buffer: wgpu::Buffer,
    dst_buffer: wgpu::Buffer,
    dst_staging_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    dispatch_x: u32,
    dispatch_y: u32,
    dst_size: u64,
}

impl ConversionPipeline {
    pub fn new(device: &Device, src: &VideoFrame, dst: &VideoFrame) -> Self {
        let wgpu_device = &device.wgpu_device;

        let shader_module = wgpu_device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pixelconv convert shader"),
            source: wgpu::ShaderSource::Wgsl(shader::KERNEL_SOURCE.into()),
        });

        let bind_group_layout = wgpu_device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pixelconv bind group layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = wgpu_device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pixelconv pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let constants = shader::constants(src, dst);
        let pipeline = wgpu_device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("pixelconv convert pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader_module,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions {
                constants: &constants,
                ..Default::default()
            },
            cache: None,
        });

        let src_size = aligned(src.required_buffer_size());
        let dst_size = aligned(dst.required_buffer_size());

        let src_buffer = wgpu_device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pixelconv src buffer"),
            size: src_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let dst_buffer = wgpu_device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pixelconv dst buffer"),
            size: dst_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let dst_staging_buffer = wgpu_device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pixelconv dst staging buffer"),
            size: dst_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let bind_group = wgpu_device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pixelconv bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: src_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: dst_buffer.as_entire_binding(),
                },
            ],
        });

        let dispatch_x = compute_dispatch_size(dst.width.div_ceil(BLOCK_SIZE), WORKGROUP_SIZE);
        let dispatch_y = compute_dispatch_size(dst.height.div_ceil(BLOCK_SIZE), WORKGROUP_SIZE);

        Self {
            pipeline,
            src_buffer,
            dst_buffer,
            dst_staging_buffer,
            bind_group,
            dispatch_x,
            dispatch_y,
            dst_size,
        }
    }

    pub fn src_buffer(&self) -> &wgpu::Buffer {
        &self.src_buffer
    }

    pub fn dst_staging_buffer(&self) -> &wgpu::Buffer {
        &self.dst_staging_buffer
    }

    /// Record the compute dispatch followed by the device-local-to-host-
    /// visible copy into a single command buffer.
    pub fn record(&self, encoder: &mut wgpu::CommandEncoder) {
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("pixelconv convert pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.dispatch_workgroups(self.dispatch_x, self.dispatch_y, 1);
        }
        encoder.copy_buffer_to_buffer(&self.dst_buffer, 0, &self.dst_staging_buffer, 0, self.dst_size);
    }
}
