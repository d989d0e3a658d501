use crate::{
    foundation::error::VidpressResult,
    raster::{channel::Channel, frame::BLOCK_COEFFS},
};

/// Natural (row-major) index of the `i`-th coefficient in zig-zag order.
pub const ZIGZAG_ORDER: [usize; BLOCK_COEFFS] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, //
    12, 19, 26, 33, 40, 48, 41, 34, 27, 20, 13, 6, 7, 14, 21, 28, //
    35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, //
    58, 59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

pub fn zigzag_block(block: &[f32; BLOCK_COEFFS]) -> [f32; BLOCK_COEFFS] {
    ZIGZAG_ORDER.map(|natural| block[natural])
}

/// Reorder every block of `src` into zig-zag order.
///
/// Output is `64` wide with one row per block, blocks in raster order.
pub fn zigzag_scan(src: &Channel) -> VidpressResult<Channel> {
    src.ensure_block_aligned("zig-zag scan")?;
    let (bx, by) = src.block_grid();
    let mut out = Channel::zeroed(BLOCK_COEFFS, bx * by)?;
    for row in 0..by {
        for col in 0..bx {
            let ordered = zigzag_block(&src.read_block8(col * 8, row * 8));
            out.row_mut(row * bx + col).copy_from_slice(&ordered);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/stages/zigzag.rs"]
mod tests;
