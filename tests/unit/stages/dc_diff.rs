use super::*;

fn with_dcs(bx: usize, by: usize, dc: impl Fn(usize, usize) -> f32) -> Channel {
    Channel::from_fn(bx * 8, by * 8, |x, y| {
        if x % 8 == 0 && y % 8 == 0 {
            dc(x / 8, y / 8)
        } else {
            // AC positions must not leak into the DC plane.
            99.0
        }
    })
    .unwrap()
}

#[test]
fn traversal_is_column_major_and_first_value_absolute() {
    // Block grid:
    //   col0 col1
    //   5    7
    //   6    2
    let src = with_dcs(2, 2, |c, r| [[5.0, 7.0], [6.0, 2.0]][r][c]);
    let out = dc_differences(&src).unwrap();
    assert_eq!(out.dims(), (2, 2));
    // Visiting order 5, 6, 7, 2.
    assert_eq!(out.data(), &[5.0, 1.0, 1.0, -5.0]);
}

#[test]
fn output_dims_follow_block_grid() {
    let src = with_dcs(4, 2, |c, r| (c * 10 + r) as f32);
    let out = dc_differences(&src).unwrap();
    assert_eq!(out.dims(), (4, 2));
}

#[test]
fn accumulate_recovers_visiting_order() {
    let src = with_dcs(3, 2, |c, r| (c as f32 * 3.0) - (r as f32 * 7.0) + 1.0);
    let diffs = dc_differences(&src).unwrap();
    let absolute = accumulate_dc(&diffs);

    let mut expected = Vec::new();
    for c in 0..3 {
        for r in 0..2 {
            expected.push(src.get(c * 8, r * 8));
        }
    }
    assert_eq!(absolute, expected);
}

#[test]
fn constant_dc_yields_single_nonzero() {
    let src = with_dcs(2, 3, |_, _| 4.0);
    let out = dc_differences(&src).unwrap();
    assert_eq!(out.data()[0], 4.0);
    assert!(out.data()[1..].iter().all(|&d| d == 0.0));
}

#[test]
fn unaligned_channel_is_rejected() {
    let src = Channel::zeroed(12, 8).unwrap();
    assert!(dc_differences(&src).is_err());
}
