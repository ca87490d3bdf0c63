use crate::config::{
    DEFAULT_GRAVITY, DEFAULT_PERSISTENCE, DEFAULT_THICKNESS, DEFAULT_WATER_DIFFUSION,
    DEFAULT_WATER_QUANTITY, GRAVITY_RANGE, INK_COLOR_FREQUENCIES, INK_COLOR_PHASES,
    PERSISTENCE_RANGE, PERSISTENCE_TIME_SCALE, THICKNESS_RANGE, WATER_DIFFUSION_RANGE,
    WATER_QUANTITY_RANGE,
};
use crate::simulation::probe::ProbeParameters;

/// Live-tunable simulation settings.
///
/// Setters clamp to the documented ranges instead of rejecting values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimSettings {
    pub persistence: f32,
    pub thickness: f32,
    pub water_quantity: f32,
    pub water_diffusion: f32,
    pub gravity: f32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            persistence: DEFAULT_PERSISTENCE,
            thickness: DEFAULT_THICKNESS,
            water_quantity: DEFAULT_WATER_QUANTITY,
            water_diffusion: DEFAULT_WATER_DIFFUSION,
            gravity: DEFAULT_GRAVITY,
        }
    }
}

/// Identifies one tunable, for keyboard or panel bindings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tunable {
    Persistence,
    Thickness,
    WaterQuantity,
    WaterDiffusion,
    Gravity,
}

impl Tunable {
    pub const ALL: [Tunable; 5] = [
        Tunable::Persistence,
        Tunable::Thickness,
        Tunable::WaterQuantity,
        Tunable::WaterDiffusion,
        Tunable::Gravity,
    ];

    pub fn range(self) -> (f32, f32) {
        match self {
            Tunable::Persistence => PERSISTENCE_RANGE,
            Tunable::Thickness => THICKNESS_RANGE,
            Tunable::WaterQuantity => WATER_QUANTITY_RANGE,
            Tunable::WaterDiffusion => WATER_DIFFUSION_RANGE,
            Tunable::Gravity => GRAVITY_RANGE,
        }
    }

    /// Clamp into range; NaN falls back to the low end
    pub fn clamp(self, value: f32) -> f32 {
        let (lo, hi) = self.range();
        if value.is_nan() {
            lo
        } else {
            value.clamp(lo, hi)
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tunable::Persistence => "persistence",
            Tunable::Thickness => "thickness",
            Tunable::WaterQuantity => "water quantity",
            Tunable::WaterDiffusion => "water diffusion",
            Tunable::Gravity => "gravity",
        }
    }
}

impl SimSettings {
    pub fn get(&self, tunable: Tunable) -> f32 {
        match tunable {
            Tunable::Persistence => self.persistence,
            Tunable::Thickness => self.thickness,
            Tunable::WaterQuantity => self.water_quantity,
            Tunable::WaterDiffusion => self.water_diffusion,
            Tunable::Gravity => self.gravity,
        }
    }

    /// Set a tunable, clamped to its range. Returns the value actually stored.
    pub fn set(&mut self, tunable: Tunable, value: f32) -> f32 {
        let clamped = tunable.clamp(value);
        if clamped != value {
            let (lo, hi) = tunable.range();
            log::warn!(
                "{} {} out of range [{}, {}], clamped to {}",
                tunable.name(),
                value,
                lo,
                hi,
                clamped
            );
        }
        self.store(tunable, clamped);
        clamped
    }

    fn store(&mut self, tunable: Tunable, value: f32) {
        match tunable {
            Tunable::Persistence => self.persistence = value,
            Tunable::Thickness => self.thickness = value,
            Tunable::WaterQuantity => self.water_quantity = value,
            Tunable::WaterDiffusion => self.water_diffusion = value,
            Tunable::Gravity => self.gravity = value,
        }
    }

    /// Copy with every field clamped into range, without logging
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for tunable in Tunable::ALL {
            out.store(tunable, tunable.clamp(self.get(tunable)));
        }
        out
    }

    /// Tunables currently outside their range
    pub fn out_of_range(&self) -> Vec<Tunable> {
        Tunable::ALL
            .into_iter()
            .filter(|&t| t.clamp(self.get(t)) != self.get(t))
            .collect()
    }
}

/// Per-step decay applied to existing ink: persistence^(dt * 10)
pub fn persistence_factor(persistence: f32, dt: f32) -> f32 {
    persistence.powf(dt * PERSISTENCE_TIME_SCALE)
}

/// Fraction of the wet layer that settles in one step
pub fn settle_fraction(gravity: f32, dt: f32) -> f32 {
    (gravity * dt).clamp(0.0, 1.0)
}

/// Ink color active at elapsed time `time`
pub fn ink_color(time: f32) -> [f32; 3] {
    let mut color = [0.0; 3];
    for (i, c) in color.iter_mut().enumerate() {
        *c = (time * INK_COLOR_FREQUENCIES[i] + INK_COLOR_PHASES[i]).sin().abs();
    }
    color
}

/// Everything the update rule reads for one step (96 bytes, aligned to 16).
///
/// Mirrors `StepUniforms` in trail_step.wgsl; vec2 fields sit on 8-byte
/// boundaries and `ink_color` on a 16-byte boundary.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StepUniforms {
    // Grid info (16 bytes)
    pub grid_width: u32,
    pub grid_height: u32,
    pub frame_number: u32,
    pub _padding0: u32,

    // Time-scaled factors (16 bytes)
    pub persistence_factor: f32,
    pub settle_fraction: f32,
    pub radius: f32,
    pub water_quantity: f32,

    // (16 bytes)
    pub water_diffusion: f32,
    pub speed: f32,
    pub pressure: f32,
    pub time: f32,

    // Probe segment (32 bytes)
    pub old_pos: [f32; 2],
    pub new_pos: [f32; 2],
    pub velocity: [f32; 2],
    pub _padding1: [f32; 2],

    // Current ink color (16 bytes), alpha unused
    pub ink_color: [f32; 4],
}

impl StepUniforms {
    /// Build the uniforms for one step of `dt` seconds at elapsed time `time`
    pub fn new(
        grid_size: (u32, u32),
        frame_number: u32,
        dt: f32,
        time: f32,
        probe: &ProbeParameters,
        settings: &SimSettings,
    ) -> Self {
        let [r, g, b] = ink_color(time);
        Self {
            grid_width: grid_size.0,
            grid_height: grid_size.1,
            frame_number,
            _padding0: 0,
            persistence_factor: persistence_factor(settings.persistence, dt),
            settle_fraction: settle_fraction(settings.gravity, dt),
            radius: settings.thickness + probe.pressure,
            water_quantity: settings.water_quantity,
            water_diffusion: settings.water_diffusion,
            speed: probe.speed(),
            pressure: probe.pressure,
            time,
            old_pos: probe.old_pos.to_array(),
            new_pos: probe.new_pos.to_array(),
            velocity: probe.velocity.to_array(),
            _padding1: [0.0, 0.0],
            ink_color: [r, g, b, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size() {
        assert_eq!(std::mem::size_of::<StepUniforms>(), 96);
        assert_eq!(std::mem::size_of::<StepUniforms>() % 16, 0);
    }

    #[test]
    fn test_set_clamps() {
        let mut settings = SimSettings::default();
        assert_eq!(settings.set(Tunable::Persistence, 1.5), 0.999);
        assert_eq!(settings.set(Tunable::Thickness, -1.0), 0.0003);
        assert_eq!(settings.set(Tunable::Gravity, f32::NAN), 0.0);
        assert_eq!(settings.set(Tunable::WaterQuantity, 0.7), 0.7);
        assert_eq!(settings.water_quantity, 0.7);
    }

    #[test]
    fn test_defaults_in_range() {
        let settings = SimSettings::default();
        assert_eq!(settings.clamped(), settings);
        assert!(settings.out_of_range().is_empty());
    }

    #[test]
    fn test_clamped_leaves_original() {
        let settings = SimSettings {
            gravity: 3.0,
            thickness: f32::NAN,
            ..SimSettings::default()
        };
        let clamped = settings.clamped();
        assert_eq!(clamped.gravity, 1.0);
        assert_eq!(clamped.thickness, 0.0003);
        assert_eq!(settings.gravity, 3.0);
        assert_eq!(settings.out_of_range(), vec![Tunable::Thickness, Tunable::Gravity]);
    }

    #[test]
    fn test_persistence_factor_frame_rate_independent() {
        for &p in &[0.8f32, 0.95, 0.98, 0.999] {
            let dt = 1.0 / 60.0;
            let once = persistence_factor(p, 2.0 * dt);
            let twice = persistence_factor(p, dt) * persistence_factor(p, dt);
            assert!((once - twice).abs() < 1e-5, "p={} once={} twice={}", p, once, twice);
        }
    }

    #[test]
    fn test_persistence_factor_below_one() {
        let f = persistence_factor(0.98, 0.016);
        assert!(f > 0.0 && f < 1.0);
        assert_eq!(persistence_factor(0.98, 0.0), 1.0);
    }

    #[test]
    fn test_settle_fraction_clamped() {
        assert_eq!(settle_fraction(0.5, 4.0), 1.0);
        assert_eq!(settle_fraction(0.5, 0.1), 0.05);
    }

    #[test]
    fn test_ink_color_in_unit_range() {
        for step in 0..200 {
            let c = ink_color(step as f32 * 0.37);
            assert!(c.iter().all(|v| (0.0..=1.0).contains(v)));
        }
        let c0 = ink_color(0.0);
        assert_eq!(c0[0], 0.0);
        assert!((c0[1] - 2.09f32.sin().abs()).abs() < 1e-6);
    }
}
