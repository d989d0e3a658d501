use super::*;

fn idct_block(coeffs: &[f32; 64]) -> [f64; 64] {
    let c = |k: usize| if k == 0 { std::f64::consts::FRAC_1_SQRT_2 } else { 1.0 };
    let mut out = [0.0f64; 64];
    for y in 0..8 {
        for x in 0..8 {
            let mut acc = 0.0;
            for v in 0..8 {
                for u in 0..8 {
                    let cx = (((2 * x + 1) * u) as f64 * std::f64::consts::PI / 16.0).cos();
                    let cy = (((2 * y + 1) * v) as f64 * std::f64::consts::PI / 16.0).cos();
                    acc += c(u) * c(v) * f64::from(coeffs[v * 8 + u]) * cx * cy;
                }
            }
            out[y * 8 + x] = acc / 4.0;
        }
    }
    out
}

#[test]
fn flat_block_has_only_dc() {
    let block = [32.0f32; 64];
    let coeffs = dct_block(&block);
    assert!((coeffs[0] - 256.0).abs() < 1e-3);
    for &ac in &coeffs[1..] {
        assert!(ac.abs() < 1e-3, "ac = {ac}");
    }
}

#[test]
fn horizontal_ramp_lands_in_first_row() {
    let mut block = [0.0f32; 64];
    for y in 0..8 {
        for x in 0..8 {
            block[y * 8 + x] = x as f32;
        }
    }
    let coeffs = dct_block(&block);
    assert!(coeffs[1].abs() > 1.0);
    // No vertical frequencies.
    for v in 1..8 {
        for u in 0..8 {
            assert!(coeffs[v * 8 + u].abs() < 1e-3);
        }
    }
}

#[test]
fn inverse_oracle_reconstructs_block() {
    let mut block = [0.0f32; 64];
    for (i, v) in block.iter_mut().enumerate() {
        *v = ((i * 37 + 11) % 255) as f32 - 128.0;
    }
    let back = idct_block(&dct_block(&block));
    for i in 0..64 {
        assert!((back[i] - f64::from(block[i])).abs() < 1e-2);
    }
}

#[test]
fn level_shift_subtracts_128_in_place() {
    let mut ch = Channel::filled(8, 8, 200.0).unwrap();
    level_shift(&mut ch);
    assert!(ch.data().iter().all(|&v| v == 72.0));
}

#[test]
fn channel_transform_is_blockwise() {
    let src = Channel::from_fn(16, 8, |x, y| if x < 8 { 10.0 } else { (x + y) as f32 }).unwrap();
    let out = forward_dct(&src).unwrap();
    let left = dct_block(&src.read_block8(0, 0));
    let right = dct_block(&src.read_block8(8, 0));
    assert_eq!(out.read_block8(0, 0), left);
    assert_eq!(out.read_block8(8, 0), right);
}

#[test]
fn unaligned_channel_is_rejected() {
    let src = Channel::zeroed(12, 8).unwrap();
    assert!(forward_dct(&src).is_err());
}

#[test]
fn empty_channel_is_rejected() {
    assert!(forward_dct(&Channel::zeroed(0, 8).unwrap()).is_err());
    assert!(forward_dct(&Channel::zeroed(8, 0).unwrap()).is_err());
}
