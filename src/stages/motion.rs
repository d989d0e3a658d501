//! Exhaustive block-matching motion search.
//!
//! Every macroblock away from the frame border is compared against all candidate positions in a
//! `[-W, W)` window of the reference frame. Cost is a luma-weighted sum of absolute differences
//! over the three planes; among equal costs the first candidate in `(sy, sx)` row-major order wins.

use crate::{
    foundation::core::{Dimensions, Planes},
    foundation::error::{VidpressError, VidpressResult},
    raster::frame::{Frame, FrameLayout},
};

/// Per-plane weights of the matching cost.
pub const PLANE_WEIGHTS: Planes<f32> = Planes {
    y: 0.5,
    cb: 0.25,
    cr: 0.25,
};

/// Offset from a macroblock in the target frame to its best match in the reference frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MotionVector {
    pub dx: i32,
    pub dy: i32,
}

impl MotionVector {
    pub const ZERO: Self = Self { dx: 0, dy: 0 };

    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// Block and window sizes of the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionSearch {
    /// Macroblock side `B`.
    pub block_size: usize,
    /// Search reach `W` on each side of the block.
    pub window_size: usize,
}

impl Default for MotionSearch {
    fn default() -> Self {
        Self {
            block_size: 16,
            window_size: 16,
        }
    }
}

impl MotionSearch {
    pub fn new(block_size: usize, window_size: usize) -> VidpressResult<Self> {
        if block_size == 0 || window_size == 0 {
            return Err(VidpressError::validation(
                "motion search block_size and window_size must be >= 1",
            ));
        }
        Ok(Self {
            block_size,
            window_size,
        })
    }

    /// Border excluded from the search on every edge.
    pub fn inset(&self) -> usize {
        self.block_size.max(self.window_size)
    }

    /// Macroblocks searched for a frame of `dims`.
    pub fn grid(&self, dims: Dimensions) -> MotionGrid {
        let xs = self.axis_origins(dims.width);
        let ys = self.axis_origins(dims.height);
        let mut origins = Vec::with_capacity(xs.len() * ys.len());
        for &my in &ys {
            for &mx in &xs {
                origins.push((mx, my));
            }
        }
        MotionGrid {
            cols: xs.len(),
            rows: ys.len(),
            origins,
        }
    }

    fn axis_origins(&self, extent: usize) -> Vec<usize> {
        let inset = self.inset();
        let Some(last) = extent.checked_sub(inset + self.window_size) else {
            return Vec::new();
        };
        (inset..=last).step_by(self.block_size).collect()
    }
}

/// Top-left corners of the searched macroblocks, rows outer, columns inner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MotionGrid {
    cols: usize,
    rows: usize,
    origins: Vec<(usize, usize)>,
}

impl MotionGrid {
    pub fn origins(&self) -> &[(usize, usize)] {
        &self.origins
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// `(columns, rows)` of macroblocks.
    pub fn shape(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }
}

/// Sequential motion search over every macroblock of the grid.
pub fn estimate_motion(
    reference: &Frame,
    target: &Frame,
    search: &MotionSearch,
) -> VidpressResult<Vec<MotionVector>> {
    check_pair(reference, target)?;
    let grid = search.grid(target.dims());
    Ok(grid
        .origins()
        .iter()
        .map(|&(mx, my)| search_block(reference, target, mx, my, search))
        .collect())
}

/// Both frames must be full-size and the same size.
pub(crate) fn check_pair(reference: &Frame, target: &Frame) -> VidpressResult<()> {
    reference.expect_layout(FrameLayout::FullSize, "motion search (reference)")?;
    target.expect_layout(FrameLayout::FullSize, "motion search (target)")?;
    if reference.dims() != target.dims() {
        return Err(VidpressError::validation(format!(
            "motion search frames differ in size: reference {}, target {}",
            reference.dims(),
            target.dims()
        )));
    }
    Ok(())
}

/// Best vector for the macroblock at `(mx, my)`.
pub fn search_block(
    reference: &Frame,
    target: &Frame,
    mx: usize,
    my: usize,
    search: &MotionSearch,
) -> MotionVector {
    let mut best = Candidate::NONE;
    for sy in window(my, search.window_size) {
        best = best.keep_first_min(search_row(reference, target, mx, my, sy, search));
    }
    best.vector
}

/// Best candidate among `sx` in the window for one candidate row `sy`.
pub(crate) fn search_row(
    reference: &Frame,
    target: &Frame,
    mx: usize,
    my: usize,
    sy: usize,
    search: &MotionSearch,
) -> Candidate {
    let mut best = Candidate::NONE;
    for sx in window(mx, search.window_size) {
        let cost = weighted_sad(reference, target, (mx, my), (sx, sy), search.block_size);
        best = best.keep_first_min(Candidate {
            cost,
            vector: MotionVector::new(offset(sx, mx), offset(sy, my)),
        });
    }
    best
}

/// Candidate positions `[m - W, m + W)` along one axis.
pub(crate) fn window(m: usize, w: usize) -> std::ops::Range<usize> {
    m - w..m + w
}

fn offset(s: usize, m: usize) -> i32 {
    s as i32 - m as i32
}

/// Weighted SAD between the target block at `t` and the reference block at `s`.
pub fn weighted_sad(
    reference: &Frame,
    target: &Frame,
    t: (usize, usize),
    s: (usize, usize),
    block: usize,
) -> f32 {
    let r = reference.planes();
    let m = target.planes();
    let width = target.dims().width;

    let mut sad = 0.0f32;
    for y in 0..block {
        let t_row = (t.1 + y) * width + t.0;
        let s_row = (s.1 + y) * width + s.0;
        for x in 0..block {
            let ti = t_row + x;
            let si = s_row + x;
            let diff_y = (m.y.data()[ti] - r.y.data()[si]).abs();
            let diff_cb = (m.cb.data()[ti] - r.cb.data()[si]).abs();
            let diff_cr = (m.cr.data()[ti] - r.cr.data()[si]).abs();
            sad += PLANE_WEIGHTS.y * diff_y + PLANE_WEIGHTS.cb * diff_cb + PLANE_WEIGHTS.cr * diff_cr;
        }
    }
    sad
}

/// A scored offset. Folding with [`Candidate::keep_first_min`] in scan order yields the
/// earliest minimum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Candidate {
    pub cost: f32,
    pub vector: MotionVector,
}

impl Candidate {
    pub const NONE: Self = Self {
        cost: f32::INFINITY,
        vector: MotionVector::ZERO,
    };

    /// `self` is earlier in scan order than `later`; ties keep `self`.
    pub fn keep_first_min(self, later: Candidate) -> Candidate {
        if later.cost < self.cost { later } else { self }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stages/motion.rs"]
mod tests;
