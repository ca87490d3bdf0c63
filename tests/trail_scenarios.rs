//! Behavioural tests for the trail engine, driven frame by frame the way
//! the host loop drives it: tracker update, then one driver advance.

use glam::Vec2;
use ink_trail::simulation::params::{ink_color, persistence_factor, settle_fraction};
use ink_trail::simulation::{
    CpuTrail, DisplaySampler, FrameOutcome, ProbeParameters, ProbeTracker, SimSettings,
    SimulationDriver, Tunable,
};

fn driver(size: u32) -> SimulationDriver<CpuTrail> {
    SimulationDriver::new(CpuTrail::new(size, size).unwrap())
}

fn center_ink(driver: &SimulationDriver<CpuTrail>) -> f32 {
    let grid = driver.backend().current();
    let (x, y) = grid.cell_at(0.5, 0.5);
    grid.get(x, y).ink()
}

#[test]
fn stationary_press_then_release() {
    let mut driver = driver(4);
    let mut settings = SimSettings::default();
    settings.set(Tunable::Persistence, 0.98);
    settings.set(Tunable::WaterQuantity, 0.3);
    let mut tracker = ProbeTracker::new(Vec2::splat(0.5));

    let mut previous = 0.0;
    for frame in 0..3 {
        let probe = tracker.update(Some(Vec2::splat(0.5)), true, 1.0);
        assert_eq!(driver.advance(1.0, &probe, &settings), FrameOutcome::Stepped);

        let ink = center_ink(&driver);
        assert!(ink > previous, "frame {}: center ink {} did not grow past {}", frame, ink, previous);
        previous = ink;

        let grid = driver.backend().current();
        for (x, y) in [(0, 0), (3, 0), (0, 3), (3, 3)] {
            assert_eq!(grid.get(x, y).ink(), 0.0, "corner ({}, {}) inked on frame {}", x, y, frame);
        }
    }
    let peak = previous;

    for _ in 0..10 {
        let probe = tracker.update(None, false, 1.0);
        driver.advance(1.0, &probe, &settings);
    }
    let after = center_ink(&driver);
    assert!(after < 0.1 * peak, "center ink {} not below 10% of peak {}", after, peak);
}

#[test]
fn decay_converges_without_injection() {
    let mut driver = driver(16);
    let mut settings = SimSettings::default();
    let mut tracker = ProbeTracker::new(Vec2::new(0.3, 0.4));

    // Lay down a stroke first
    for frame in 0..20 {
        let target = Vec2::new(0.3 + frame as f32 * 0.02, 0.4);
        let probe = tracker.update(Some(target), true, 0.1);
        driver.advance(0.1, &probe, &settings);
    }
    let total_ink = |driver: &SimulationDriver<CpuTrail>| {
        driver.backend().current().cells.iter().map(|c| c.ink() as f64).sum::<f64>()
    };
    let mut previous_max = driver.backend().current().stats().max_ink;
    let mut previous_total = total_ink(&driver);
    assert!(previous_max > 0.0);

    // Single cells may gain ink from wet neighbours; the floor as a whole
    // and its brightest cell never do.
    settings.set(Tunable::WaterQuantity, 0.0);
    for frame in 0..300 {
        let probe = tracker.update(None, false, 0.1);
        driver.advance(0.1, &probe, &settings);
        let max_ink = driver.backend().current().stats().max_ink;
        let total = total_ink(&driver);
        assert!(max_ink <= previous_max + 1e-7, "max ink rose from {} to {}", previous_max, max_ink);
        assert!(
            total <= previous_total * (1.0 + 1e-6) + 1e-6,
            "frame {}: total ink rose from {} to {}",
            frame,
            previous_total,
            total
        );
        previous_max = max_ink;
        previous_total = total;
    }
    assert!(previous_max < 0.01, "ink did not fade: {}", previous_max);
    assert!(previous_total < 0.01 * 256.0);
}

#[test]
fn decay_factors_independent_of_frame_rate() {
    let dt = 0.01;
    for persistence in [0.8, 0.9, 0.98, 0.999] {
        let once = persistence_factor(persistence, 2.0 * dt);
        let twice = persistence_factor(persistence, dt).powi(2);
        assert!((once - twice).abs() < 1e-5);
    }
    for gravity in [0.0, 0.5, 1.0] {
        let once = 1.0 - settle_fraction(gravity, 2.0 * dt);
        let twice = (1.0 - settle_fraction(gravity, dt)).powi(2);
        assert!((once - twice).abs() < 2e-4);
    }
}

#[test]
fn injection_stays_local() {
    let mut driver = driver(64);
    let settings = SimSettings::default();
    let probe = ProbeParameters {
        pressure: 0.02,
        ..ProbeParameters::resting(Vec2::splat(0.5))
    };
    driver.advance(0.016, &probe, &settings);

    let radius = settings.thickness + probe.pressure;
    let cell_diagonal = std::f32::consts::SQRT_2 / 64.0;
    let grid = driver.backend().current();
    let mut inked = 0;
    for y in 0..64 {
        for x in 0..64 {
            let (u, v) = grid.cell_center(x, y);
            let distance = Vec2::new(u, v).distance(Vec2::splat(0.5));
            let ink = grid.get(x, y).ink();
            if distance > radius + cell_diagonal {
                assert_eq!(ink, 0.0, "cell ({}, {}) at {} inked", x, y, distance);
            }
            if ink > 0.0 {
                inked += 1;
            }
        }
    }
    assert!(inked > 0);
    let (cx, cy) = grid.cell_at(0.5, 0.5);
    assert!(grid.get(cx, cy).ink() > 0.0);
}

#[test]
fn buffers_alternate_every_step() {
    let mut driver = driver(8);
    let settings = SimSettings::default();
    let probe = ProbeParameters::resting(Vec2::splat(0.5));
    assert_eq!(driver.backend().active_index(), 0);
    for n in 1..=7 {
        driver.advance(0.016, &probe, &settings);
        assert_eq!(driver.backend().active_index(), n % 2);
    }
}

#[test]
fn sampling_is_read_only() {
    let mut driver = driver(32);
    let settings = SimSettings::default();
    let mut tracker = ProbeTracker::new(Vec2::splat(0.5));
    for _ in 0..5 {
        let probe = tracker.update(Some(Vec2::new(0.6, 0.5)), true, 0.05);
        driver.advance(0.05, &probe, &settings);
    }

    let grid = driver.backend().current();
    let before = grid.clone();
    let sampler = DisplaySampler::new(grid);
    let uv = Vec2::new(0.52, 0.49);
    let first = sampler.sample(uv);
    let second = sampler.sample(uv);
    assert_eq!(first, second);
    assert!(first.ink > 0.0);
    assert_eq!(*driver.backend().current(), before);
}

#[test]
fn strokes_keep_the_color_they_were_drawn_with() {
    let mut driver = driver(64);
    let settings = SimSettings::default();
    let mut tracker = ProbeTracker::new(Vec2::new(0.2, 0.2));

    // Press at one spot, wait long enough for the ink color to drift, press elsewhere
    for _ in 0..3 {
        let probe = tracker.update(Some(Vec2::new(0.2, 0.2)), true, 0.1);
        driver.advance(0.1, &probe, &settings);
    }
    let grid = driver.backend().current();
    let (x, y) = grid.cell_at(0.2, 0.2);
    let early = grid.get(x, y).color();

    let mut jump = ProbeTracker::new(Vec2::new(0.8, 0.8));
    for _ in 0..30 {
        let probe = jump.update(Some(Vec2::new(0.8, 0.8)), true, 0.1);
        driver.advance(0.1, &probe, &settings);
    }
    let grid = driver.backend().current();
    let still_early = grid.get(x, y).color();
    let (lx, ly) = grid.cell_at(0.8, 0.8);
    let late = grid.get(lx, ly).color();

    // Bleeding only mixes pigment from the same stroke
    let drawn_with: Vec<[f32; 3]> = [0.1, 0.2, 0.3].iter().map(|&t| ink_color(t)).collect();
    for i in 0..3 {
        let lo = drawn_with.iter().map(|c| c[i]).fold(f32::MAX, f32::min);
        let hi = drawn_with.iter().map(|c| c[i]).fold(f32::MIN, f32::max);
        assert!(early[i] >= lo - 1e-3 && early[i] <= hi + 1e-3);
        assert!(still_early[i] >= lo - 1e-3 && still_early[i] <= hi + 1e-3);
    }
    assert!(still_early[0] < 0.25);
    assert!(late[0] > 0.6, "late stroke color {:?}", late);
}
