use crate::{
    foundation::core::Plane,
    foundation::error::{VidpressError, VidpressResult},
    raster::frame::Frame,
    stages::motion::{MotionSearch, MotionVector, check_pair},
};

/// Subtract the motion-compensated reference from `target`.
///
/// Each searched macroblock becomes `target - reference(shifted by its vector)` on all three planes;
/// samples outside the motion grid keep the target's own values. `vectors` must be in grid order,
/// as returned by [`crate::stages::motion::estimate_motion`].
pub fn build_delta(
    reference: &Frame,
    target: &Frame,
    vectors: &[MotionVector],
    search: &MotionSearch,
) -> VidpressResult<Frame> {
    check_pair(reference, target)?;
    let dims = target.dims();
    let grid = search.grid(dims);
    if grid.len() != vectors.len() {
        return Err(VidpressError::validation(format!(
            "delta expects {} motion vectors for a {dims} frame, got {}",
            grid.len(),
            vectors.len()
        )));
    }

    let block = search.block_size;
    let mut planes = target.planes().clone();
    for (&(mx, my), &mv) in grid.origins().iter().zip(vectors) {
        let (sx, sy) = source_origin(mx, my, mv, block, dims.width, dims.height)?;
        for plane in Plane::ALL {
            let src = reference.plane(plane).data();
            let dst = planes.get_mut(plane).data_mut();
            for y in 0..block {
                let d = (my + y) * dims.width + mx;
                let s = (sy + y) * dims.width + sx;
                for x in 0..block {
                    dst[d + x] -= src[s + x];
                }
            }
        }
    }

    Frame::new(target.layout(), dims, planes)
}

fn source_origin(
    mx: usize,
    my: usize,
    mv: MotionVector,
    block: usize,
    width: usize,
    height: usize,
) -> VidpressResult<(usize, usize)> {
    let sx = mx as i64 + i64::from(mv.dx);
    let sy = my as i64 + i64::from(mv.dy);
    let fits = |s: i64, extent: usize| s >= 0 && (s as usize) + block <= extent;
    if !fits(sx, width) || !fits(sy, height) {
        return Err(VidpressError::validation(format!(
            "motion vector ({}, {}) for block at ({mx}, {my}) points outside the reference frame",
            mv.dx, mv.dy
        )));
    }
    Ok((sx as usize, sy as usize))
}

#[cfg(test)]
#[path = "../../tests/unit/stages/delta.rs"]
mod tests;
