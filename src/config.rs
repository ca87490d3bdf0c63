/// Grid dimensions (1024x1024 = 1M cells, floor texture resolution)
pub const GRID_WIDTH: u32 = 1024;
pub const GRID_HEIGHT: u32 = 1024;

/// Compute shader workgroup size
pub const WORKGROUP_SIZE: u32 = 16;

/// Largest frame delta fed to the simulation (window drags, debugger stops)
pub const MAX_FRAME_DT: f32 = 0.25;

// ============================================
// Tunable defaults and ranges
// ============================================

pub const DEFAULT_PERSISTENCE: f32 = 0.98;
pub const PERSISTENCE_RANGE: (f32, f32) = (0.8, 0.999);

pub const DEFAULT_THICKNESS: f32 = 0.004;
pub const THICKNESS_RANGE: (f32, f32) = (0.0003, 0.02);

pub const DEFAULT_WATER_QUANTITY: f32 = 0.3;
pub const WATER_QUANTITY_RANGE: (f32, f32) = (0.0, 1.0);

pub const DEFAULT_WATER_DIFFUSION: f32 = 0.1;
pub const WATER_DIFFUSION_RANGE: (f32, f32) = (0.01, 1.0);

pub const DEFAULT_GRAVITY: f32 = 0.5;
pub const GRAVITY_RANGE: (f32, f32) = (0.0, 1.0);

/// Keyboard nudge applied to a tunable, as a fraction of its range
pub const TUNE_STEP_FRACTION: f32 = 0.05;

// ============================================
// Probe dynamics
// ============================================

/// Easing rate of the smoothed probe position (per second)
pub const PROBE_FOLLOW_RATE: f32 = 5.0;

/// Pressure gained per second while pressed
pub const PRESSURE_RATE: f32 = 0.02;

/// Pressure ceiling
pub const PRESSURE_MAX: f32 = 0.02;

/// Pressure release: pressure *= BASE^(dt * RATE)
pub const PRESSURE_DECAY_BASE: f32 = 0.9;
pub const PRESSURE_DECAY_RATE: f32 = 30.0;

// ============================================
// Update rule
// ============================================

/// Persistence exponent scale: factor = persistence^(dt * PERSISTENCE_TIME_SCALE)
pub const PERSISTENCE_TIME_SCALE: f32 = 10.0;

/// Ink deposited per unit of probe speed (uv units per frame)
pub const SPEED_GAIN: f32 = 40.0;

/// Ink deposited per unit of pressure
pub const PRESSURE_GAIN: f32 = 50.0;

/// Ink color oscillators: |sin(t * freq + phase)| per channel
pub const INK_COLOR_FREQUENCIES: [f32; 3] = [0.61, 0.43, 0.36];
pub const INK_COLOR_PHASES: [f32; 3] = [0.0, 2.09, 4.18];

/// Floor grain: fresh ink is scaled by 1 - GRAIN_STRENGTH * hash(x, y),
/// with the hash repeating every GRAIN_TILE cells
pub const GRAIN_STRENGTH: f32 = 0.35;
pub const GRAIN_TILE: u32 = 256;

// ============================================
// Floor appearance
// ============================================

/// Floor base color (0x332e2e)
pub const FLOOR_COLOR: [f32; 3] = [0.2, 0.180, 0.180];

/// Direction towards the key light, roughly (2, 3, 1) normalised
pub const LIGHT_DIRECTION: [f32; 3] = [0.535, 0.802, 0.267];

/// Ambient term of the floor lighting
pub const AMBIENT_LIGHT: f32 = 0.35;

/// Relief given to ink ridges when shading the floor
pub const SCRATCH_RELIEF: f32 = 6.0;

// ============================================
// Headless harness
// ============================================

pub const HEADLESS_GRID_SIZE: u32 = 128;
pub const HEADLESS_DEFAULT_FRAMES: u32 = 600;
pub const HEADLESS_DT: f32 = 1.0 / 60.0;
