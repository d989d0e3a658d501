use crate::{foundation::error::VidpressResult, raster::channel::Channel};

/// Differential DC values of a quantized channel.
///
/// Blocks are visited column by column (outer loop over block columns, inner over block rows).
/// The first value is absolute, each later one is the difference from its predecessor in that
/// order. The result has dimensions `(width / 8, height / 8)` with values stored in visiting order.
pub fn dc_differences(src: &Channel) -> VidpressResult<Channel> {
    src.ensure_block_aligned("dc prediction")?;
    let (bx, by) = src.block_grid();
    let mut values = Vec::with_capacity(bx * by);
    let mut prev = 0.0f32;
    for col in 0..bx {
        for row in 0..by {
            let dc = src.get(col * 8, row * 8);
            values.push(dc - prev);
            prev = dc;
        }
    }
    Channel::from_vec(bx, by, values)
}

/// Undo [`dc_differences`], returning absolute DC values in visiting order.
pub fn accumulate_dc(diffs: &Channel) -> Vec<f32> {
    let mut acc = 0.0f32;
    diffs
        .data()
        .iter()
        .map(|&d| {
            acc += d;
            acc
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/stages/dc_diff.rs"]
mod tests;
