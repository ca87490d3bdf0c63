use wgpu::{BindGroupLayoutEntry, Buffer, BufferUsages, Device, Queue, ShaderStages};

use crate::config::{AMBIENT_LIGHT, FLOOR_COLOR, LIGHT_DIRECTION, SCRATCH_RELIEF};
use crate::error::{Result, TrailError};
use crate::simulation::{Grid, ProbeParameters, StepUniforms, TrailCell};

/// Manages ping-pong storage buffers for the trail grid
pub struct GridBuffers {
    /// The two cell buffers; `grids[active]` holds the last completed step
    grids: [Buffer; 2],
    /// Uniform buffer for the update rule
    pub step_uniforms_buffer: Buffer,
    /// Uniform buffer for the floor pass
    pub render_params_buffer: Buffer,
    active: usize,
    /// Grid dimensions
    pub width: u32,
    pub height: u32,
}

/// Render parameters passed to the floor shader (80 bytes, aligned to 16)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderParams {
    // Grid info (16 bytes)
    pub grid_width: u32,
    pub grid_height: u32,
    pub _padding: [u32; 2],

    // Probe marker (16 bytes)
    pub probe_pos: [f32; 2],
    pub probe_radius: f32,
    pub probe_squash: f32,

    // Floor rgb + ambient term (16 bytes)
    pub floor_color: [f32; 4],

    // Light direction + scratch relief (16 bytes)
    pub light_dir: [f32; 4],

    // Current ink color, tints the probe marker (16 bytes)
    pub ink_color: [f32; 4],
}

impl RenderParams {
    pub fn new(grid_size: (u32, u32), probe: &ProbeParameters, thickness: f32, ink_color: [f32; 3]) -> Self {
        let (squash_xz, _) = probe.squash();
        Self {
            grid_width: grid_size.0,
            grid_height: grid_size.1,
            _padding: [0, 0],
            probe_pos: probe.new_pos.to_array(),
            probe_radius: thickness + probe.pressure,
            probe_squash: squash_xz,
            floor_color: [FLOOR_COLOR[0], FLOOR_COLOR[1], FLOOR_COLOR[2], AMBIENT_LIGHT],
            light_dir: [LIGHT_DIRECTION[0], LIGHT_DIRECTION[1], LIGHT_DIRECTION[2], SCRATCH_RELIEF],
            ink_color: [ink_color[0], ink_color[1], ink_color[2], 1.0],
        }
    }
}

/// Layout entry for one of the grid storage buffers
pub(crate) fn grid_layout_entry(binding: u32, visibility: ShaderStages, read_only: bool) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<TrailCell>() as u64),
        },
        count: None,
    }
}

/// Layout entry for a uniform block of type `T`
pub(crate) fn uniform_layout_entry<T>(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

impl GridBuffers {
    /// Create both grid buffers cleared to the neutral state.
    ///
    /// Out-of-memory while allocating is reported as `TrailError::Allocation`.
    pub fn new(device: &Device, queue: &Queue, width: u32, height: u32) -> Result<Self> {
        let cleared = Grid::new(width, height)?;
        let buffer_size = (cleared.cells.len() * std::mem::size_of::<TrailCell>()) as u64;

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let create_grid = |label| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: buffer_size,
                usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let grids = [create_grid("trail-grid-0"), create_grid("trail-grid-1")];

        let step_uniforms_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("step-uniforms-buffer"),
            size: std::mem::size_of::<StepUniforms>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let render_params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("render-params-buffer"),
            size: std::mem::size_of::<RenderParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(TrailError::Allocation {
                width,
                height,
                reason: err.to_string(),
            });
        }

        for grid in &grids {
            queue.write_buffer(grid, 0, bytemuck::cast_slice(&cleared.cells));
        }

        Ok(Self {
            grids,
            step_uniforms_buffer,
            render_params_buffer,
            active: 0,
            width,
            height,
        })
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Grid buffer `index`; `grid(active_index())` holds the last completed step
    pub fn grid(&self, index: usize) -> &Buffer {
        &self.grids[index]
    }

    /// Flip roles once the step writing the other buffer has been submitted
    pub fn swap(&mut self) {
        self.active = 1 - self.active;
    }

    pub fn write_step_uniforms(&self, queue: &Queue, uniforms: &StepUniforms) {
        queue.write_buffer(&self.step_uniforms_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn write_render_params(&self, queue: &Queue, params: &RenderParams) {
        queue.write_buffer(&self.render_params_buffer, 0, bytemuck::bytes_of(params));
    }
}
