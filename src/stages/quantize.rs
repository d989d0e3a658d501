use crate::{
    foundation::error::{VidpressError, VidpressResult},
    raster::channel::Channel,
};

/// Base quantization steps (the standard JPEG luminance table), row-major.
pub const BASE_QUANT: [f32; 64] = [
    16.0, 11.0, 10.0, 16.0, 24.0, 40.0, 51.0, 61.0, //
    12.0, 12.0, 14.0, 19.0, 26.0, 58.0, 60.0, 55.0, //
    14.0, 13.0, 16.0, 24.0, 40.0, 57.0, 69.0, 56.0, //
    14.0, 17.0, 22.0, 29.0, 51.0, 87.0, 80.0, 62.0, //
    18.0, 22.0, 37.0, 56.0, 68.0, 109.0, 103.0, 77.0, //
    24.0, 35.0, 55.0, 64.0, 81.0, 104.0, 113.0, 92.0, //
    49.0, 64.0, 78.0, 87.0, 103.0, 121.0, 120.0, 101.0, //
    72.0, 92.0, 95.0, 98.0, 112.0, 100.0, 103.0, 99.0,
];

/// Effective steps `ceil(base / quality)`.
pub fn quant_steps(quality: f32) -> VidpressResult<[f32; 64]> {
    if !quality.is_finite() || quality <= 0.0 {
        return Err(VidpressError::validation(format!(
            "quality must be finite and > 0, got {quality}"
        )));
    }
    Ok(BASE_QUANT.map(|base| (base / quality).ceil()))
}

/// `round(coeff / step)` for every coefficient of one block; halves round away from zero.
pub fn quantize_block(block: &[f32; 64], steps: &[f32; 64]) -> [f32; 64] {
    let mut out = [0.0f32; 64];
    for i in 0..64 {
        out[i] = (block[i] / steps[i]).round();
    }
    out
}

/// Quantize every 8x8 block of a coefficient channel.
pub fn quantize(src: &Channel, steps: &[f32; 64]) -> VidpressResult<Channel> {
    src.ensure_block_aligned("quantization")?;
    let mut out = Channel::zeroed(src.width(), src.height())?;
    let (bx, by) = src.block_grid();
    for row in 0..by {
        for col in 0..bx {
            let q = quantize_block(&src.read_block8(col * 8, row * 8), steps);
            out.write_block8(col * 8, row * 8, &q);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/stages/quantize.rs"]
mod tests;
