//! Display-side reads of the trail grid.
//!
//! Same arithmetic as `fs_main` in floor.wgsl: bilinear sample, then ink is
//! laid over the floor color and lit by a fixed key light.

use glam::{Vec2, Vec3};

use crate::config::{AMBIENT_LIGHT, FLOOR_COLOR, LIGHT_DIRECTION, SCRATCH_RELIEF};
use crate::simulation::cell::TrailCell;
use crate::simulation::grid::Grid;

/// What the floor shader needs from the trail at one surface point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualModulation {
    /// Interpolated ink intensity
    pub ink: f32,
    /// Interpolated wet marker, drives the glossy look
    pub wetness: f32,
    /// Pigment carried by the trail
    pub pigment: [f32; 3],
    /// Final lit floor color
    pub color: [f32; 3],
}

/// Read-only view of the current grid for one frame
pub struct DisplaySampler<'a> {
    grid: &'a Grid,
}

impl<'a> DisplaySampler<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// Bilinear interpolation at (u, v), clamped to the edge
    pub fn cell_at(&self, uv: Vec2) -> TrailCell {
        let (w, h) = (self.grid.width() as f32, self.grid.height() as f32);
        let px = (uv.x.clamp(0.0, 1.0) * w - 0.5).clamp(0.0, w - 1.0);
        let py = (uv.y.clamp(0.0, 1.0) * h - 0.5).clamp(0.0, h - 1.0);
        let (x0, y0) = (px.floor() as i64, py.floor() as i64);
        let (fx, fy) = (px - x0 as f32, py - y0 as f32);

        let bottom = self
            .grid
            .get_clamped(x0, y0)
            .lerp(self.grid.get_clamped(x0 + 1, y0), fx);
        let top = self
            .grid
            .get_clamped(x0, y0 + 1)
            .lerp(self.grid.get_clamped(x0 + 1, y0 + 1), fx);
        bottom.lerp(&top, fy)
    }

    pub fn sample(&self, uv: Vec2) -> VisualModulation {
        let cell = self.cell_at(uv);
        let ink = cell.ink().clamp(0.0, 1.0);
        let wetness = cell.water().clamp(0.0, 1.0);
        let pigment = Vec3::from(cell.color());

        // Ink ridges tilt the floor normal along their gradient
        let texel = Vec2::new(1.0 / self.grid.width() as f32, 1.0 / self.grid.height() as f32);
        let dx = self.cell_at(uv + Vec2::new(texel.x, 0.0)).ink() - self.cell_at(uv - Vec2::new(texel.x, 0.0)).ink();
        let dy = self.cell_at(uv + Vec2::new(0.0, texel.y)).ink() - self.cell_at(uv - Vec2::new(0.0, texel.y)).ink();
        let normal = Vec3::new(-dx * SCRATCH_RELIEF, 1.0, -dy * SCRATCH_RELIEF).normalize();
        let diffuse = normal.dot(Vec3::from(LIGHT_DIRECTION)).max(0.0);
        let light = AMBIENT_LIGHT + (1.0 - AMBIENT_LIGHT) * diffuse;

        let base = Vec3::from(FLOOR_COLOR);
        let albedo = base.lerp(pigment, ink) * (1.0 - 0.3 * wetness);
        let color = (albedo * light).clamp(Vec3::ZERO, Vec3::ONE);

        VisualModulation {
            ink,
            wetness,
            pigment: pigment.to_array(),
            color: color.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inked_grid() -> Grid {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.get_mut(1, 1).trail = [1.0, 0.5, 0.0, 0.0];
        grid.get_mut(1, 1).pigment = [0.0, 0.8, 1.0, 0.0];
        grid
    }

    #[test]
    fn test_exact_at_cell_center() {
        let grid = inked_grid();
        let sampler = DisplaySampler::new(&grid);
        let (u, v) = grid.cell_center(1, 1);
        let m = sampler.sample(Vec2::new(u, v));
        assert!((m.ink - 1.0).abs() < 1e-6);
        assert!((m.wetness - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let grid = inked_grid();
        let sampler = DisplaySampler::new(&grid);
        // Halfway between cells (1,1) and (2,1)
        let cell = sampler.cell_at(Vec2::new(0.5, 0.375));
        assert!((cell.ink() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_edges_clamp() {
        let grid = inked_grid();
        let sampler = DisplaySampler::new(&grid);
        assert_eq!(sampler.cell_at(Vec2::new(-1.0, -1.0)), *grid.get(0, 0));
        assert_eq!(sampler.cell_at(Vec2::new(2.0, 2.0)), *grid.get(3, 3));
    }

    #[test]
    fn test_empty_floor_uses_base_color() {
        let grid = Grid::new(4, 4).unwrap();
        let m = DisplaySampler::new(&grid).sample(Vec2::splat(0.5));
        assert_eq!(m.ink, 0.0);
        let light = AMBIENT_LIGHT + (1.0 - AMBIENT_LIGHT) * Vec3::from(LIGHT_DIRECTION).y;
        assert!((m.color[0] - FLOOR_COLOR[0] * light).abs() < 1e-4);
    }

    #[test]
    fn test_sample_idempotent() {
        let grid = inked_grid();
        let sampler = DisplaySampler::new(&grid);
        let uv = Vec2::new(0.31, 0.42);
        assert_eq!(sampler.sample(uv), sampler.sample(uv));
    }
}
