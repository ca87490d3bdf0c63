//! The per-cell update rule.
//!
//! CPU reference of the rule dispatched by `trail_step.wgsl`; both evaluate
//! the same arithmetic in the same order so the CPU backend can stand in for
//! the GPU in tests.

use glam::{Vec2, Vec3};

use crate::config::{GRAIN_STRENGTH, GRAIN_TILE, PRESSURE_GAIN, SPEED_GAIN};
use crate::simulation::cell::TrailCell;
use crate::simulation::grid::Grid;
use crate::simulation::params::StepUniforms;

/// Ink below this is treated as absent when mixing pigment
const INK_EPSILON: f32 = 1e-6;

/// A pure update rule evaluated for every cell of the next grid.
///
/// Implementations must be deterministic and read nothing but their
/// arguments.
pub trait StepFunction {
    fn next_cell(&self, x: u32, y: u32, current: &Grid, uniforms: &StepUniforms) -> TrailCell;
}

/// Decay, wet diffusion, settling and capsule injection around the probe
#[derive(Clone, Copy, Debug, Default)]
pub struct TrailRule;

impl StepFunction for TrailRule {
    fn next_cell(&self, x: u32, y: u32, current: &Grid, u: &StepUniforms) -> TrailCell {
        let c = current.get(x, y);
        let (xi, yi) = (x as i64, y as i64);
        let neighbors = [
            current.get_clamped(xi - 1, yi),
            current.get_clamped(xi + 1, yi),
            current.get_clamped(xi, yi - 1),
            current.get_clamped(xi, yi + 1),
        ];

        let water_now = c.water();
        let own_color = Vec3::from(c.color());
        let own_mass = own_color * c.ink();

        // Water spreads freely. Ink, pigment and flow move only between two
        // wet cells, as a symmetric exchange, so mixing conserves ink mass.
        let mut avg_water = 0.0;
        let mut ink = c.ink();
        let mut pigment_mass = own_mass;
        let mut flow = Vec2::from(c.flow());
        for n in neighbors {
            avg_water += n.water() * 0.25;
            let w = bleed_weight(water_now, n.water(), u.water_diffusion);
            ink += (n.ink() - c.ink()) * w;
            pigment_mass += (Vec3::from(n.color()) * n.ink() - own_mass) * w;
            flow += (Vec2::from(n.flow()) - Vec2::from(c.flow())) * w;
        }
        let mut water = water_now + (avg_water - water_now) * u.water_diffusion;
        let mut color = if ink > INK_EPSILON {
            pigment_mass / ink
        } else {
            own_color
        };

        // Settling drains the wet layer and the ink riding on it
        ink *= 1.0 - u.settle_fraction * water_now;
        water *= 1.0 - u.settle_fraction;

        ink *= u.persistence_factor;
        flow *= u.persistence_factor;

        let (fresh, falloff) = injection(current.cell_center(x, y), current.size(), u);
        let fresh = fresh * grain(x, y);
        if fresh > 0.0 {
            let ink_color = Vec3::new(u.ink_color[0], u.ink_color[1], u.ink_color[2]);
            color = (color * ink + ink_color * fresh) / (ink + fresh);
            ink += fresh;
            water += fresh;
            let velocity = Vec2::from(u.velocity);
            if u.speed > 0.0 {
                flow = flow.lerp(velocity / u.speed, falloff);
            }
        }

        let color = color.clamp(Vec3::ZERO, Vec3::ONE);
        let flow = flow.clamp(Vec2::NEG_ONE, Vec2::ONE);
        TrailCell {
            trail: [ink.clamp(0.0, 1.0), water.clamp(0.0, 1.0), flow.x, flow.y],
            pigment: [color.x, color.y, color.z, 0.0],
        }
    }
}

/// Share exchanged with one neighbor: limited by the drier of the two cells
#[inline]
fn bleed_weight(water: f32, neighbor_water: f32, water_diffusion: f32) -> f32 {
    0.25 * water_diffusion * water.min(neighbor_water).clamp(0.0, 1.0)
}

/// PCG hash, the same wrapping u32 arithmetic as `pcg_hash` in trail_step.wgsl
fn pcg_hash(v: u32) -> u32 {
    let state = v.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277_803_737);
    (word >> 22) ^ word
}

/// Fixed floor grain scaling fresh ink at cell (x, y), in
/// [1 - GRAIN_STRENGTH, 1]. Repeats every GRAIN_TILE cells.
pub fn grain(x: u32, y: u32) -> f32 {
    let h = pcg_hash((x % GRAIN_TILE).wrapping_add(pcg_hash(y % GRAIN_TILE)));
    1.0 - GRAIN_STRENGTH * (h & 0xffff) as f32 / 65535.0
}

/// Ink deposited into the cell centered at `center`, with its falloff.
///
/// A cell is touched when its footprint comes within `radius` of the probe
/// segment; probes outside the unit square deposit nothing.
pub fn injection(center: (f32, f32), grid_size: (u32, u32), u: &StepUniforms) -> (f32, f32) {
    let old_pos = Vec2::from(u.old_pos);
    let new_pos = Vec2::from(u.new_pos);
    if !on_surface(old_pos) || !on_surface(new_pos) || u.radius <= 0.0 {
        return (0.0, 0.0);
    }

    let half_cell = Vec2::new(0.5 / grid_size.0 as f32, 0.5 / grid_size.1 as f32);
    let d = footprint_distance(Vec2::new(center.0, center.1), half_cell, old_pos, new_pos);
    if d >= u.radius {
        return (0.0, 0.0);
    }

    let falloff = 1.0 - (d / u.radius) * (d / u.radius);
    let strength = u.speed * SPEED_GAIN + u.pressure * PRESSURE_GAIN;
    (u.water_quantity * falloff * strength, falloff)
}

fn on_surface(p: Vec2) -> bool {
    (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)
}

/// Distance from the segment a→b to the axis-aligned cell box around `center`,
/// measured at the segment point closest to the center.
pub fn footprint_distance(center: Vec2, half_cell: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > 0.0 {
        ((center - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = a + ab * t;
    ((closest - center).abs() - half_cell).max(Vec2::ZERO).length()
}
