use super::*;
use crate::foundation::core::Dimensions;

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn noise(w: usize, h: usize) -> Channel {
    Channel::from_fn(w, h, |x, y| (mix64((y * w + x) as u64) % 256) as f32).unwrap()
}

#[test]
fn constant_channel_is_unchanged() {
    let src = Channel::filled(9, 7, 42.0).unwrap();
    let out = lowpass_channel(&src).unwrap();
    assert_eq!(out, src);
}

#[test]
fn border_is_copied_through() {
    let (w, h) = (8, 6);
    let src = noise(w, h);
    let out = lowpass_channel(&src).unwrap();
    for x in 0..w {
        assert_eq!(out.get(x, 0), src.get(x, 0));
        assert_eq!(out.get(x, h - 1), src.get(x, h - 1));
    }
    for y in 0..h {
        assert_eq!(out.get(0, y), src.get(0, y));
        assert_eq!(out.get(w - 1, y), src.get(w - 1, y));
    }
}

#[test]
fn interior_matches_two_pass_sum_of_original_input() {
    let (w, h) = (10, 9);
    let src = noise(w, h);
    let out = lowpass_channel(&src).unwrap();

    // Horizontal result; border rows and columns stay as the input.
    let horiz = |x: usize, y: usize| -> f32 {
        if y == 0 || y == h - 1 || x == 0 || x == w - 1 {
            src.get(x, y)
        } else {
            0.25 * src.get(x - 1, y) + 0.5 * src.get(x, y) + 0.25 * src.get(x + 1, y)
        }
    };

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let expected = 0.25 * horiz(x, y - 1) + 0.5 * horiz(x, y) + 0.25 * horiz(x, y + 1);
            assert_eq!(out.get(x, y), expected, "mismatch at ({x}, {y})");
        }
    }
}

#[test]
fn impulse_spreads_into_3x3_neighbourhood() {
    let mut src = Channel::zeroed(7, 7).unwrap();
    src.set(3, 3, 16.0);
    let out = lowpass_channel(&src).unwrap();
    assert_eq!(out.get(3, 3), 4.0);
    assert_eq!(out.get(2, 3), 2.0);
    assert_eq!(out.get(3, 2), 2.0);
    assert_eq!(out.get(2, 2), 1.0);
    assert_eq!(out.get(1, 3), 0.0);
    let total: f32 = out.data().iter().sum();
    assert_eq!(total, 16.0);
}

#[test]
fn tiny_channels_pass_through() {
    let src = noise(2, 5);
    assert_eq!(lowpass_channel(&src).unwrap(), src);
}

#[test]
fn smooth_chroma_keeps_luma() {
    let dims = Dimensions::new(6, 6).unwrap();
    let planes = Planes::new(noise(6, 6), noise(6, 6), noise(6, 6));
    let img = Image::from_planes(dims, ColorSpace::YCbCr, planes.clone()).unwrap();
    let frame = smooth_chroma(img).unwrap();
    assert_eq!(frame.layout(), FrameLayout::FullSize);
    assert_eq!(frame.planes().y, planes.y);
    assert_eq!(frame.planes().cb, lowpass_channel(&planes.cb).unwrap());

    let rgb = Image::from_planes(dims, ColorSpace::Rgb, planes).unwrap();
    assert!(smooth_chroma(rgb).is_err());
}
