//! 8x8 forward DCT-II.
//!
//! Coefficients are stored row-major per block: row index is vertical frequency, column index is
//! horizontal frequency, DC at offset 0.

use std::sync::LazyLock;

use crate::{foundation::error::VidpressResult, raster::channel::Channel};

/// Offset subtracted from every sample before the transform.
pub const LEVEL_SHIFT: f32 = 128.0;

// BASIS[u][x] = C(u) / 2 * cos((2x + 1) * u * pi / 16), C(0) = 1/sqrt(2), C(u > 0) = 1.
static BASIS: LazyLock<[[f32; 8]; 8]> = LazyLock::new(|| {
    let mut basis = [[0.0f32; 8]; 8];
    for (u, row) in basis.iter_mut().enumerate() {
        let scale = if u == 0 {
            std::f64::consts::FRAC_1_SQRT_2 / 2.0
        } else {
            0.5
        };
        for (x, v) in row.iter_mut().enumerate() {
            let angle = ((2 * x + 1) * u) as f64 * std::f64::consts::PI / 16.0;
            *v = (scale * angle.cos()) as f32;
        }
    }
    basis
});

/// Subtract [`LEVEL_SHIFT`] from every sample, in place.
pub fn level_shift(channel: &mut Channel) {
    for v in channel.data_mut() {
        *v -= LEVEL_SHIFT;
    }
}

/// Transform one row-major 8x8 block.
pub fn dct_block(block: &[f32; 64]) -> [f32; 64] {
    let basis = &*BASIS;

    let mut rows = [0.0f32; 64];
    for y in 0..8 {
        let src = &block[y * 8..y * 8 + 8];
        for u in 0..8 {
            let mut acc = 0.0f32;
            for x in 0..8 {
                acc += basis[u][x] * src[x];
            }
            rows[y * 8 + u] = acc;
        }
    }

    let mut out = [0.0f32; 64];
    for v in 0..8 {
        for u in 0..8 {
            let mut acc = 0.0f32;
            for y in 0..8 {
                acc += basis[v][y] * rows[y * 8 + u];
            }
            out[v * 8 + u] = acc;
        }
    }
    out
}

/// Transform every block of an already level-shifted channel, sequentially.
pub fn forward_dct(src: &Channel) -> VidpressResult<Channel> {
    src.ensure_block_aligned("dct")?;
    let mut out = Channel::zeroed(src.width(), src.height())?;
    let band = 8 * src.width();
    for (src_band, dst_band) in src
        .data()
        .chunks_exact(band)
        .zip(out.data_mut().chunks_exact_mut(band))
    {
        dct_band(src_band, dst_band, src.width());
    }
    Ok(out)
}

/// Transform one horizontal band of 8 rows. Shared by every backend.
pub fn dct_band(src: &[f32], dst: &mut [f32], width: usize) {
    for x0 in (0..width).step_by(8) {
        let mut block = [0.0f32; 64];
        for r in 0..8 {
            let start = r * width + x0;
            block[r * 8..r * 8 + 8].copy_from_slice(&src[start..start + 8]);
        }
        let coeffs = dct_block(&block);
        for r in 0..8 {
            let start = r * width + x0;
            dst[start..start + 8].copy_from_slice(&coeffs[r * 8..r * 8 + 8]);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stages/dct.rs"]
mod tests;
