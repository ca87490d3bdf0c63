use crate::error::{Result, TrailError};
use crate::simulation::cell::TrailCell;
use crate::simulation::params::StepUniforms;
use crate::simulation::rule::StepFunction;

/// Fixed-size 2D field of trail cells, row-major with v growing along rows
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    pub cells: Vec<TrailCell>,
}

/// Summary of the ink currently on the floor
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridStats {
    pub max_ink: f32,
    pub mean_ink: f32,
    pub wet_cells: usize,
}

impl Grid {
    /// Allocate a zero-filled grid. Fails instead of aborting when the
    /// allocation cannot be satisfied.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let alloc_error = |reason: String| TrailError::Allocation {
            width,
            height,
            reason,
        };
        if width == 0 || height == 0 {
            return Err(alloc_error("grid dimensions must be non-zero".into()));
        }
        let cell_count = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| alloc_error("cell count overflows".into()))?;

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(cell_count)
            .map_err(|e| alloc_error(e.to_string()))?;
        cells.resize(cell_count, TrailCell::default());

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> &TrailCell {
        &self.cells[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: u32, y: u32) -> &mut TrailCell {
        let idx = self.index(x, y);
        &mut self.cells[idx]
    }

    /// Cell at signed coordinates, clamped to the edge
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> &TrailCell {
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        self.get(x, y)
    }

    /// Center of cell (x, y) in surface coordinates
    pub fn cell_center(&self, x: u32, y: u32) -> (f32, f32) {
        (
            (x as f32 + 0.5) / self.width as f32,
            (y as f32 + 0.5) / self.height as f32,
        )
    }

    /// Cell containing surface coordinate (u, v), clamped to the grid
    pub fn cell_at(&self, u: f32, v: f32) -> (u32, u32) {
        let x = (u * self.width as f32).floor().clamp(0.0, self.width as f32 - 1.0);
        let y = (v * self.height as f32).floor().clamp(0.0, self.height as f32 - 1.0);
        (x as u32, y as u32)
    }

    /// Reset every cell to the neutral state
    pub fn clear(&mut self) {
        self.cells.fill(TrailCell::default());
    }

    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats::default();
        let mut total = 0.0f64;
        for cell in &self.cells {
            stats.max_ink = stats.max_ink.max(cell.ink());
            total += cell.ink() as f64;
            if cell.water() > 0.0 {
                stats.wet_cells += 1;
            }
        }
        stats.mean_ink = (total / self.cells.len() as f64) as f32;
        stats
    }
}

/// Two equally sized grids alternating read and write roles.
///
/// `grids[active]` is the last fully written grid and the only one that may
/// be read for display; the other one is the next write target.
#[derive(Debug)]
pub struct PingPongGrid {
    grids: [Grid; 2],
    active: usize,
}

impl PingPongGrid {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            grids: [Grid::new(width, height)?, Grid::new(width, height)?],
            active: 0,
        })
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn size(&self) -> (u32, u32) {
        self.grids[0].size()
    }

    /// Last fully written grid
    pub fn current(&self) -> &Grid {
        &self.grids[self.active]
    }

    /// Run one step: read the active grid, write the other, then swap.
    pub fn step<F: StepFunction + ?Sized>(&mut self, step_fn: &F, uniforms: &StepUniforms) -> &Grid {
        let (first, second) = self.grids.split_at_mut(1);
        let (input, output) = if self.active == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        };

        let width = input.width();
        for y in 0..input.height() {
            for x in 0..width {
                let idx = input.index(x, y);
                output.cells[idx] = step_fn.next_cell(x, y, input, uniforms);
            }
        }

        self.active = 1 - self.active;
        self.current()
    }

    /// Clear both grids and reset to the initial index
    pub fn clear(&mut self) {
        for grid in &mut self.grids {
            grid.clear();
        }
        self.active = 0;
    }
}
