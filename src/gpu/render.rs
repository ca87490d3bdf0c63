use wgpu::{BindGroup, Device, RenderPipeline as WgpuRenderPipeline, ShaderStages, TextureFormat, TextureView};

use crate::config::FLOOR_COLOR;
use crate::gpu::buffers::{grid_layout_entry, uniform_layout_entry, GridBuffers, RenderParams};

/// Floor pass: lights the floor from whichever grid is current
pub struct RenderPipeline {
    pipeline: WgpuRenderPipeline,
    /// `bind_groups[i]` shows grid `i`
    bind_groups: [BindGroup; 2],
}

impl RenderPipeline {
    pub fn new(device: &Device, format: TextureFormat, buffers: &GridBuffers) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("floor-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/floor.wgsl").into()),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("floor-bind-group-layout"),
            entries: &[
                grid_layout_entry(0, ShaderStages::FRAGMENT, true),
                uniform_layout_entry::<RenderParams>(1, ShaderStages::FRAGMENT),
            ],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("floor-pipeline"),
            layout: Some(&device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("floor-pipeline-layout"),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            })),
            // Fullscreen triangle generated from the vertex index
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(format.into())],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let bind_groups = [0, 1].map(|index: usize| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(if index == 0 { "floor-grid-0" } else { "floor-grid-1" }),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffers.grid(index).as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: buffers.render_params_buffer.as_entire_binding(),
                    },
                ],
            })
        });

        Self {
            pipeline,
            bind_groups,
        }
    }

    /// Draw the floor from grid `active`
    pub fn draw(&self, encoder: &mut wgpu::CommandEncoder, view: &TextureView, active: usize) {
        let floor = wgpu::Color {
            r: FLOOR_COLOR[0] as f64,
            g: FLOOR_COLOR[1] as f64,
            b: FLOOR_COLOR[2] as f64,
            a: 1.0,
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("floor-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(floor),
                    store: wgpu::StoreOp::Store,
                },
            })],
            ..Default::default()
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[active], &[]);
        pass.draw(0..3, 0..1);
    }
}
