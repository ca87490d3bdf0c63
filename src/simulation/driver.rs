use crate::error::{Result, TrailError};
use crate::simulation::grid::{Grid, PingPongGrid};
use crate::simulation::params::{SimSettings, StepUniforms, Tunable};
use crate::simulation::probe::ProbeParameters;
use crate::simulation::rule::{StepFunction, TrailRule};

/// Something that can advance the trail grid by one step.
///
/// A failed step must leave the previously current grid current.
pub trait TrailBackend {
    fn grid_size(&self) -> (u32, u32);

    fn step(&mut self, uniforms: &StepUniforms) -> Result<()>;
}

/// CPU backend: a ping-pong grid pair driven by a step function
pub struct CpuTrail<F: StepFunction = TrailRule> {
    grids: PingPongGrid,
    rule: F,
}

impl CpuTrail<TrailRule> {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_rule(width, height, TrailRule)
    }
}

impl<F: StepFunction> CpuTrail<F> {
    pub fn with_rule(width: u32, height: u32, rule: F) -> Result<Self> {
        Ok(Self {
            grids: PingPongGrid::new(width, height)?,
            rule,
        })
    }

    /// Current grid, borrowed for at most the rest of the frame
    pub fn current(&self) -> &Grid {
        self.grids.current()
    }

    pub fn active_index(&self) -> usize {
        self.grids.active_index()
    }

    pub fn clear(&mut self) {
        self.grids.clear();
    }
}

impl<F: StepFunction> TrailBackend for CpuTrail<F> {
    fn grid_size(&self) -> (u32, u32) {
        self.grids.size()
    }

    fn step(&mut self, uniforms: &StepUniforms) -> Result<()> {
        if uniforms.grid_width != self.grids.size().0 || uniforms.grid_height != self.grids.size().1 {
            return Err(TrailError::Step(format!(
                "uniforms describe a {}x{} grid, backend holds {:?}",
                uniforms.grid_width,
                uniforms.grid_height,
                self.grids.size()
            )));
        }
        self.grids.step(&self.rule, uniforms);
        Ok(())
    }
}

/// What happened to one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Stepped,
    /// The step failed; the previous grid is still current
    Skipped,
}

/// Runs exactly one backend step per rendered frame
pub struct SimulationDriver<B: TrailBackend> {
    backend: B,
    time: f32,
    frame_number: u32,
    skipped_frames: u64,
    /// Bit pattern of the last out-of-range settings that were reported
    reported_settings: Option<[u32; 5]>,
    settings_warnings: u64,
}

impl<B: TrailBackend> SimulationDriver<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            time: 0.0,
            frame_number: 0,
            skipped_frames: 0,
            reported_settings: None,
            settings_warnings: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Elapsed simulated time in seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn frame_number(&self) -> u32 {
        self.frame_number
    }

    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }

    /// How many distinct out-of-range settings have been reported
    pub fn settings_warnings(&self) -> u64 {
        self.settings_warnings
    }

    /// Uniforms the next `advance(dt, ..)` would hand to the backend
    pub fn uniforms(&self, dt: f32, probe: &ProbeParameters, settings: &SimSettings) -> StepUniforms {
        StepUniforms::new(
            self.backend.grid_size(),
            self.frame_number,
            dt,
            self.time + dt,
            probe,
            settings,
        )
    }

    /// Advance the simulation by one frame of `dt` seconds.
    ///
    /// `probe` must already be updated for this frame. A failing step is
    /// logged and skipped; it never tears the current grid.
    pub fn advance(&mut self, dt: f32, probe: &ProbeParameters, settings: &SimSettings) -> FrameOutcome {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.report_out_of_range(settings);
        let settings = settings.clamped();
        let uniforms = self.uniforms(dt, probe, &settings);

        self.time += dt;
        match self.backend.step(&uniforms) {
            Ok(()) => {
                self.frame_number = self.frame_number.wrapping_add(1);
                FrameOutcome::Stepped
            }
            Err(e) => {
                self.skipped_frames += 1;
                log::warn!("Skipping frame {}: {}", self.frame_number, e);
                FrameOutcome::Skipped
            }
        }
    }
}

impl<B: TrailBackend> SimulationDriver<B> {
    /// Warn once per distinct out-of-range settings value, not every frame
    fn report_out_of_range(&mut self, settings: &SimSettings) {
        let rejected = settings.out_of_range();
        if rejected.is_empty() {
            self.reported_settings = None;
            return;
        }
        let bits = Tunable::ALL.map(|t| settings.get(t).to_bits());
        if self.reported_settings == Some(bits) {
            return;
        }
        self.reported_settings = Some(bits);
        self.settings_warnings += 1;
        for tunable in rejected {
            let (lo, hi) = tunable.range();
            log::warn!(
                "{} {} out of range [{}, {}], using {}",
                tunable.name(),
                settings.get(tunable),
                lo,
                hi,
                tunable.clamp(settings.get(tunable))
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    /// Backend that fails on demand and records what it received
    struct Flaky {
        fail: bool,
        steps: u32,
        last: Option<StepUniforms>,
    }

    impl TrailBackend for Flaky {
        fn grid_size(&self) -> (u32, u32) {
            (8, 8)
        }

        fn step(&mut self, uniforms: &StepUniforms) -> Result<()> {
            self.last = Some(*uniforms);
            if self.fail {
                return Err(TrailError::Step("device busy".into()));
            }
            self.steps += 1;
            Ok(())
        }
    }

    fn probe() -> ProbeParameters {
        ProbeParameters::resting(Vec2::splat(0.5))
    }

    #[test]
    fn test_advance_steps_once() {
        let mut driver = SimulationDriver::new(Flaky { fail: false, steps: 0, last: None });
        let outcome = driver.advance(0.5, &probe(), &SimSettings::default());
        assert_eq!(outcome, FrameOutcome::Stepped);
        assert_eq!(driver.backend().steps, 1);
        assert_eq!(driver.frame_number(), 1);
        assert_eq!(driver.time(), 0.5);
    }

    #[test]
    fn test_failed_step_is_skipped() {
        let mut driver = SimulationDriver::new(Flaky { fail: true, steps: 0, last: None });
        let outcome = driver.advance(0.016, &probe(), &SimSettings::default());
        assert_eq!(outcome, FrameOutcome::Skipped);
        assert_eq!(driver.skipped_frames(), 1);
        assert_eq!(driver.frame_number(), 0);

        driver.backend_mut().fail = false;
        assert_eq!(driver.advance(0.016, &probe(), &SimSettings::default()), FrameOutcome::Stepped);
    }

    #[test]
    fn test_time_scaled_uniforms() {
        let mut driver = SimulationDriver::new(Flaky { fail: false, steps: 0, last: None });
        let mut settings = SimSettings::default();
        settings.gravity = 0.5;
        let mut probe = probe();
        probe.pressure = 0.01;
        driver.advance(0.1, &probe, &settings);
        let u = driver.backend().last.unwrap();
        assert!((u.persistence_factor - 0.98f32.powf(1.0)).abs() < 1e-6);
        assert!((u.settle_fraction - 0.05).abs() < 1e-6);
        assert!((u.radius - (settings.thickness + 0.01)).abs() < 1e-7);
        assert_eq!(u.time, 0.1);
        assert_eq!((u.grid_width, u.grid_height), (8, 8));
    }

    #[test]
    fn test_out_of_range_settings_clamped() {
        let mut driver = SimulationDriver::new(Flaky { fail: false, steps: 0, last: None });
        let settings = SimSettings {
            persistence: 1.5,
            water_diffusion: 0.0,
            ..SimSettings::default()
        };
        driver.advance(0.1, &probe(), &settings);
        let u = driver.backend().last.unwrap();
        assert!(u.persistence_factor < 1.0);
        assert_eq!(u.water_diffusion, 0.01);
    }

    #[test]
    fn test_out_of_range_settings_reported_once() {
        let mut driver = SimulationDriver::new(Flaky { fail: false, steps: 0, last: None });
        let mut settings = SimSettings {
            gravity: 4.0,
            ..SimSettings::default()
        };
        for _ in 0..60 {
            driver.advance(0.016, &probe(), &settings);
        }
        assert_eq!(driver.settings_warnings(), 1);

        settings.thickness = f32::NAN;
        for _ in 0..60 {
            driver.advance(0.016, &probe(), &settings);
        }
        assert_eq!(driver.settings_warnings(), 2);

        for _ in 0..10 {
            driver.advance(0.016, &probe(), &SimSettings::default());
        }
        assert_eq!(driver.settings_warnings(), 2);
        assert_eq!(driver.backend().steps, 130);
    }

    #[test]
    fn test_bad_dt_treated_as_zero() {
        let mut driver = SimulationDriver::new(Flaky { fail: false, steps: 0, last: None });
        driver.advance(f32::NAN, &probe(), &SimSettings::default());
        driver.advance(-1.0, &probe(), &SimSettings::default());
        assert_eq!(driver.time(), 0.0);
        assert_eq!(driver.backend().last.unwrap().persistence_factor, 1.0);
    }

    #[test]
    fn test_cpu_backend_rejects_mismatched_uniforms() {
        let mut cpu = CpuTrail::new(4, 4).unwrap();
        let mut u = StepUniforms::new((4, 4), 0, 0.1, 0.0, &probe(), &SimSettings::default());
        u.grid_width = 8;
        assert!(cpu.step(&u).is_err());
        assert_eq!(cpu.active_index(), 0);
    }
}
