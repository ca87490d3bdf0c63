//! Probe state tracking: pointer input in, smoothed position, velocity and
//! pressure out, once per frame.

use glam::Vec2;

use crate::config::{
    PRESSURE_DECAY_BASE, PRESSURE_DECAY_RATE, PRESSURE_MAX, PRESSURE_RATE, PROBE_FOLLOW_RATE,
};

/// Probe state handed to the update rule for one step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeParameters {
    /// Smoothed position at the previous frame
    pub old_pos: Vec2,
    /// Smoothed position at this frame
    pub new_pos: Vec2,
    /// new_pos - old_pos
    pub velocity: Vec2,
    /// In [0, PRESSURE_MAX]
    pub pressure: f32,
}

impl ProbeParameters {
    /// A probe resting at `pos` with no pressure
    pub fn resting(pos: Vec2) -> Self {
        Self {
            old_pos: pos,
            new_pos: pos,
            velocity: Vec2::ZERO,
            pressure: 0.0,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Scale of the probe figure: (horizontal, vertical). Pressing squashes it.
    pub fn squash(&self) -> (f32, f32) {
        (1.0 + self.pressure * 40.0, 1.0 - self.pressure * 10.0)
    }
}

/// Maps a screen point onto the floor, `None` when the point misses it
pub trait SurfaceProjection {
    fn screen_point_to_surface_uv(&self, x: f32, y: f32) -> Option<Vec2>;
}

/// Top-down view where the floor fills the viewport
#[derive(Clone, Copy, Debug)]
pub struct ViewportProjection {
    pub width: f32,
    pub height: f32,
}

impl SurfaceProjection for ViewportProjection {
    fn screen_point_to_surface_uv(&self, x: f32, y: f32) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let u = x / self.width;
        // Screen y grows downwards, v grows away from the viewer
        let v = 1.0 - y / self.height;
        if (0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v) {
            Some(Vec2::new(u, v))
        } else {
            None
        }
    }
}

/// Pointer events collected between frames
#[derive(Clone, Copy, Debug, Default)]
pub struct ProbeInput {
    latest: Option<Vec2>,
    pressed: bool,
}

impl ProbeInput {
    pub fn pointer_moved<P: SurfaceProjection>(&mut self, projection: &P, x: f32, y: f32) {
        if let Some(uv) = projection.screen_point_to_surface_uv(x, y) {
            self.latest = Some(uv);
        }
    }

    pub fn pointer_down(&mut self) {
        self.pressed = true;
    }

    pub fn pointer_up(&mut self) {
        self.pressed = false;
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Surface position received since the last call, if any
    pub fn take_position(&mut self) -> Option<Vec2> {
        self.latest.take()
    }
}

/// Smooths raw input into `ProbeParameters`
#[derive(Clone, Debug)]
pub struct ProbeTracker {
    target: Vec2,
    smoothed: Vec2,
    pressure: f32,
}

impl Default for ProbeTracker {
    fn default() -> Self {
        Self::new(Vec2::splat(0.5))
    }
}

impl ProbeTracker {
    pub fn new(start: Vec2) -> Self {
        Self {
            target: start,
            smoothed: start,
            pressure: 0.0,
        }
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn pressure(&self) -> f32 {
        self.pressure
    }

    /// Advance one frame. `input` is the latest surface position, if any.
    pub fn update(&mut self, input: Option<Vec2>, active: bool, dt: f32) -> ProbeParameters {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        if let Some(uv) = input.filter(|uv| uv.is_finite()) {
            self.target = uv.clamp(Vec2::ZERO, Vec2::ONE);
        }

        let old_pos = self.smoothed;
        let alpha = 1.0 - (-PROBE_FOLLOW_RATE * dt).exp();
        self.smoothed = old_pos.lerp(self.target, alpha);

        if active {
            self.pressure = (self.pressure + dt * PRESSURE_RATE).min(PRESSURE_MAX);
        } else {
            self.pressure *= PRESSURE_DECAY_BASE.powf(dt * PRESSURE_DECAY_RATE);
        }

        ProbeParameters {
            old_pos,
            new_pos: self.smoothed,
            velocity: self.smoothed - old_pos,
            pressure: self.pressure,
        }
    }
}
