use crate::{
    foundation::core::Planes,
    foundation::error::{VidpressError, VidpressResult},
    raster::channel::Channel,
    raster::frame::{ColorSpace, Frame, FrameLayout, Image},
};

/// Separable 3-tap kernel applied along x, then along y.
pub const LOWPASS_KERNEL: [f32; 3] = [0.25, 0.5, 0.25];

/// Blur one channel with [`LOWPASS_KERNEL`].
///
/// The outermost rows and columns are copied through unfiltered. The horizontal pass reads `src`
/// and writes the output buffer; the vertical pass then filters that buffer in place.
pub fn lowpass_channel(src: &Channel) -> VidpressResult<Channel> {
    let mut out = src.clone();
    let (w, h) = src.dims();
    if w < 3 || h < 3 {
        return Ok(out);
    }

    horizontal_pass(src, &mut out);
    vertical_pass_in_place(&mut out)?;
    Ok(out)
}

/// Smooth the chroma planes of a YCbCr image and wrap the result as a full-size frame.
///
/// Luma is passed through untouched.
pub fn smooth_chroma(image: Image) -> VidpressResult<Frame> {
    if image.color() != ColorSpace::YCbCr {
        return Err(VidpressError::validation(
            "chroma smoothing expects a YCbCr image",
        ));
    }
    let dims = image.dims();
    let Planes { y, cb, cr } = image.into_planes();
    let planes = Planes::new(y, lowpass_channel(&cb)?, lowpass_channel(&cr)?);
    Frame::new(FrameLayout::FullSize, dims, planes)
}

fn horizontal_pass(src: &Channel, dst: &mut Channel) {
    let [a, b, c] = LOWPASS_KERNEL;
    let (w, h) = src.dims();
    for y in 1..h - 1 {
        let row = src.row(y);
        let out = dst.row_mut(y);
        for x in 1..w - 1 {
            out[x] = a * row[x - 1] + b * row[x] + c * row[x + 1];
        }
    }
}

fn row_buffer(w: usize) -> VidpressResult<Vec<f32>> {
    let mut row = Vec::new();
    row.try_reserve_exact(w)
        .map_err(|e| VidpressError::resource(format!("lowpass row buffer: {e}")))?;
    Ok(row)
}

// Rows are overwritten top to bottom, so the unfiltered copy of the row above is kept aside.
fn vertical_pass_in_place(buf: &mut Channel) -> VidpressResult<()> {
    let [a, b, c] = LOWPASS_KERNEL;
    let (w, h) = buf.dims();

    let mut above = row_buffer(w)?;
    above.extend_from_slice(buf.row(0));
    let mut current = row_buffer(w)?;
    current.resize(w, 0.0);

    for y in 1..h - 1 {
        current.copy_from_slice(buf.row(y));
        let below_start = (y + 1) * w;
        let data = buf.data_mut();
        let (head, tail) = data.split_at_mut(below_start);
        let out = &mut head[y * w..];
        let below = &tail[..w];
        for x in 1..w - 1 {
            out[x] = a * above[x] + b * current[x] + c * below[x];
        }
        std::mem::swap(&mut above, &mut current);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/stages/lowpass.rs"]
mod tests;
