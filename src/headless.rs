//! Windowless run of the CPU engine along a scripted probe path.

use glam::Vec2;

use crate::config::{HEADLESS_DT, HEADLESS_GRID_SIZE};
use crate::error::Result;
use crate::simulation::{
    CpuTrail, DisplaySampler, FrameOutcome, GridStats, ProbeTracker, SimSettings, SimulationDriver,
};

/// Probe target at `frame`: a slow circle around the floor center
pub fn scripted_target(frame: u32, frames: u32) -> Vec2 {
    let turn = frame as f32 / frames.max(1) as f32;
    let angle = turn * std::f32::consts::TAU * 2.0;
    Vec2::new(0.5 + 0.3 * angle.cos(), 0.5 + 0.3 * angle.sin())
}

/// Run `frames` frames, pressing for the first half. Returns final stats.
pub fn run(frames: u32) -> Result<GridStats> {
    log::info!(
        "Headless run: {} frames on a {}x{} grid",
        frames,
        HEADLESS_GRID_SIZE,
        HEADLESS_GRID_SIZE
    );

    let mut driver = SimulationDriver::new(CpuTrail::new(HEADLESS_GRID_SIZE, HEADLESS_GRID_SIZE)?);
    let mut tracker = ProbeTracker::new(scripted_target(0, frames));
    let settings = SimSettings::default();
    let log_every = (frames / 10).max(1);

    for frame in 0..frames {
        let pressed = frame < frames / 2;
        let probe = tracker.update(Some(scripted_target(frame, frames)), pressed, HEADLESS_DT);
        if driver.advance(HEADLESS_DT, &probe, &settings) == FrameOutcome::Skipped {
            continue;
        }

        if frame % log_every == 0 {
            let grid = driver.backend().current();
            let stats = grid.stats();
            let under_probe = DisplaySampler::new(grid).sample(probe.new_pos);
            log::info!(
                "frame {:>5}: max ink {:.3}, mean ink {:.5}, wet cells {:>6}, ink under probe {:.3}",
                frame,
                stats.max_ink,
                stats.mean_ink,
                stats.wet_cells,
                under_probe.ink
            );
        }
    }

    let stats = driver.backend().current().stats();
    log::info!(
        "Done: max ink {:.3}, mean ink {:.5}, skipped frames {}",
        stats.max_ink,
        stats.mean_ink,
        driver.skipped_frames()
    );
    Ok(stats)
}
