pub mod cell;
pub mod driver;
pub mod grid;
pub mod params;
pub mod probe;
pub mod rule;
pub mod sampler;

pub use cell::TrailCell;
pub use driver::{CpuTrail, FrameOutcome, SimulationDriver, TrailBackend};
pub use grid::{Grid, GridStats, PingPongGrid};
pub use params::{SimSettings, StepUniforms, Tunable};
pub use probe::{ProbeInput, ProbeParameters, ProbeTracker, SurfaceProjection, ViewportProjection};
pub use rule::{StepFunction, TrailRule};
pub use sampler::{DisplaySampler, VisualModulation};
