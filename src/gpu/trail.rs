use std::sync::Arc;
use wgpu::{Device, Queue};

use crate::error::{Result, TrailError};
use crate::gpu::{ComputePipeline, GridBuffers};
use crate::simulation::{StepUniforms, TrailBackend};

/// GPU backend: the update rule dispatched as a compute pass.
///
/// Each step is submitted on its own before the frame's render submission,
/// so queue order guarantees the write completes before the floor reads it.
pub struct GpuTrail {
    device: Arc<Device>,
    queue: Arc<Queue>,
    buffers: GridBuffers,
    compute: ComputePipeline,
}

impl GpuTrail {
    pub fn new(device: Arc<Device>, queue: Arc<Queue>, width: u32, height: u32) -> Result<Self> {
        let buffers = GridBuffers::new(&device, &queue, width, height)?;
        let compute = ComputePipeline::new(&device, &buffers);
        Ok(Self {
            device,
            queue,
            buffers,
            compute,
        })
    }

    pub fn buffers(&self) -> &GridBuffers {
        &self.buffers
    }
}

impl TrailBackend for GpuTrail {
    fn grid_size(&self) -> (u32, u32) {
        (self.buffers.width, self.buffers.height)
    }

    fn step(&mut self, uniforms: &StepUniforms) -> Result<()> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        self.buffers.write_step_uniforms(&self.queue, uniforms);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("trail-step-encoder"),
            });
        self.compute.dispatch(
            &mut encoder,
            self.buffers.active_index(),
            self.buffers.width,
            self.buffers.height,
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(TrailError::Step(err.to_string()));
        }

        self.buffers.swap();
        Ok(())
    }
}
