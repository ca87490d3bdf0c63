mod context;
mod buffers;
mod compute;
mod render;
mod trail;

pub use context::GpuContext;
pub use buffers::{GridBuffers, RenderParams};
pub use compute::ComputePipeline;
pub use render::RenderPipeline;
pub use trail::GpuTrail;
