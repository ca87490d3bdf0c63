use wgpu::{BindGroup, ComputePipeline as WgpuComputePipeline, Device, ShaderStages};

use crate::config::WORKGROUP_SIZE;
use crate::gpu::buffers::{grid_layout_entry, uniform_layout_entry, GridBuffers};
use crate::simulation::StepUniforms;

/// The trail update rule as a compute pass.
///
/// Both read/write pairings of the grid buffers are bound once up front;
/// a step picks the one whose input is the current grid.
pub struct ComputePipeline {
    pipeline: WgpuComputePipeline,
    /// `bind_groups[i]` reads grid `i` and writes grid `1 - i`
    bind_groups: [BindGroup; 2],
}

impl ComputePipeline {
    pub fn new(device: &Device, buffers: &GridBuffers) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("trail-step-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/trail_step.wgsl").into()),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("trail-step-bind-group-layout"),
            entries: &[
                grid_layout_entry(0, ShaderStages::COMPUTE, true),
                grid_layout_entry(1, ShaderStages::COMPUTE, false),
                uniform_layout_entry::<StepUniforms>(2, ShaderStages::COMPUTE),
            ],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("trail-step-pipeline"),
            layout: Some(&device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("trail-step-pipeline-layout"),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            })),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let bind_groups = [0, 1].map(|source: usize| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(if source == 0 { "trail-step-0-to-1" } else { "trail-step-1-to-0" }),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffers.grid(source).as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: buffers.grid(1 - source).as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffers.step_uniforms_buffer.as_entire_binding(),
                    },
                ],
            })
        });

        Self {
            pipeline,
            bind_groups,
        }
    }

    /// Record one step reading grid `active` into the other grid
    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder, active: usize, width: u32, height: u32) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("trail-step-pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[active], &[]);
        pass.dispatch_workgroups(width.div_ceil(WORKGROUP_SIZE), height.div_ceil(WORKGROUP_SIZE), 1);
    }
}
