use thiserror::Error;

/// Failures raised by the trail engine and its GPU host.
#[derive(Error, Debug)]
pub enum TrailError {
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("No suitable GPU adapter found")]
    NoAdapter,
    #[error("Failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("Surface not supported by adapter")]
    UnsupportedSurface,
    #[error("Failed to allocate {width}x{height} grid: {reason}")]
    Allocation {
        width: u32,
        height: u32,
        reason: String,
    },
    #[error("Simulation step failed: {0}")]
    Step(String),
}

pub type Result<T> = std::result::Result<T, TrailError>;
