//! Per-frame pipeline stages, in data-flow order.

pub mod color;
pub mod dc_diff;
pub mod dct;
pub mod delta;
pub mod lowpass;
pub mod motion;
pub mod quantize;
pub mod subsample;
pub mod tokens;
pub mod zigzag;
