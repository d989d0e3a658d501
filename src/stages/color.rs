//! RGB to YCbCr conversion.
//!
//! Coefficients follow BT.601 with the luma blue weight fixed at `0.113`, matching the streams this
//! encoder has always produced.

use crate::{
    foundation::core::Planes,
    foundation::error::{VidpressError, VidpressResult},
    raster::frame::{ColorSpace, Image},
};

/// Convert one pixel. Inputs may be in any range; camera data is 0..=255.
#[inline]
pub fn rgb_to_ycbcr(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let y = 0.299 * r + 0.587 * g + 0.113 * b;
    let cb = 128.0 - 0.168736 * r - 0.331264 * g + 0.5 * b;
    let cr = 128.0 + 0.5 * r - 0.418688 * g - 0.081312 * b;
    (y, cb, cr)
}

/// Convert three equally sized sample runs in place: R becomes Y, G becomes Cb, B becomes Cr.
pub fn convert_in_place(r: &mut [f32], g: &mut [f32], b: &mut [f32]) {
    debug_assert!(r.len() == g.len() && g.len() == b.len());
    for ((r, g), b) in r.iter_mut().zip(g.iter_mut()).zip(b.iter_mut()) {
        let (y, cb, cr) = rgb_to_ycbcr(*r, *g, *b);
        *r = y;
        *g = cb;
        *b = cr;
    }
}

/// Sequential conversion of a whole image.
pub fn convert_image(image: &mut Image) -> VidpressResult<()> {
    ensure_rgb(image)?;
    let Planes { y, cb, cr } = image.planes_mut();
    convert_in_place(y.data_mut(), cb.data_mut(), cr.data_mut());
    image.set_color(ColorSpace::YCbCr);
    Ok(())
}

pub(crate) fn ensure_rgb(image: &Image) -> VidpressResult<()> {
    if image.color() != ColorSpace::Rgb {
        return Err(VidpressError::validation(
            "color conversion expects an RGB image",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/stages/color.rs"]
mod tests;
