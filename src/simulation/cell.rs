/// GPU-compatible trail cell.
///
/// Layout: 32 bytes, two vec4 slots so the WGSL struct needs no padding.
/// - trail: [f32; 4] = (ink, water, flow_x, flow_y)
/// - pigment: [f32; 4] = (r, g, b, reserved)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TrailCell {
    /// Ink intensity, wet marker and the direction the probe was moving
    pub trail: [f32; 4],

    /// Ink color carried with the trail; alpha is unused
    pub pigment: [f32; 4],
}

impl TrailCell {
    pub const INK: usize = 0;
    pub const WATER: usize = 1;
    pub const FLOW_X: usize = 2;
    pub const FLOW_Y: usize = 3;

    pub fn ink(&self) -> f32 {
        self.trail[Self::INK]
    }

    pub fn water(&self) -> f32 {
        self.trail[Self::WATER]
    }

    pub fn flow(&self) -> [f32; 2] {
        [self.trail[Self::FLOW_X], self.trail[Self::FLOW_Y]]
    }

    pub fn color(&self) -> [f32; 3] {
        [self.pigment[0], self.pigment[1], self.pigment[2]]
    }

    /// Component-wise linear blend, used by bilinear sampling
    pub fn lerp(&self, other: &TrailCell, t: f32) -> TrailCell {
        let mut out = *self;
        for i in 0..4 {
            out.trail[i] += (other.trail[i] - self.trail[i]) * t;
            out.pigment[i] += (other.pigment[i] - self.pigment[i]) * t;
        }
        out
    }
}
