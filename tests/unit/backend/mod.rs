use super::*;
use crate::{
    foundation::core::{Dimensions, Plane, Planes},
    raster::frame::{ColorSpace, FrameLayout},
    stages::dct::level_shift,
};

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn noise(salt: u64, x: i64, y: i64) -> f32 {
    let key = ((x as u64) << 32) ^ (y as u64) ^ (salt << 60);
    (mix64(key) % 256) as f32
}

fn noisy_rgb(dims: Dimensions) -> Image {
    let planes = Planes::new(1u64, 2, 3).map(|_, salt| {
        Channel::from_fn(dims.width, dims.height, |x, y| noise(salt, x as i64, y as i64)).unwrap()
    });
    Image::from_planes(dims, ColorSpace::Rgb, planes).unwrap()
}

fn shifted_frame(dims: Dimensions, dx: i64, dy: i64) -> Frame {
    let planes = Planes::new(Plane::Y, Plane::Cb, Plane::Cr).map(|plane, _| {
        let salt = plane as u64 + 1;
        Channel::from_fn(dims.width, dims.height, |x, y| {
            noise(salt, x as i64 + dx, y as i64 + dy)
        })
        .unwrap()
    });
    Frame::new(FrameLayout::FullSize, dims, planes).unwrap()
}

fn backends() -> (ReferenceBackend, ParallelBackend) {
    (ReferenceBackend, ParallelBackend::new(Some(3)).unwrap())
}

#[test]
fn factory_returns_requested_backend() {
    let b = create_backend(BackendKind::Reference, None).unwrap();
    assert_eq!(b.name(), "reference");
    let b = create_backend(BackendKind::Parallel, Some(2)).unwrap();
    assert_eq!(b.name(), "parallel");
}

#[test]
fn zero_threads_is_rejected() {
    let err = ParallelBackend::new(Some(0)).unwrap_err();
    assert!(err.to_string().contains("threads"));
    assert!(!err.is_backend());
}

#[test]
fn kind_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&BackendKind::Parallel).unwrap(),
        "\"parallel\""
    );
    let k: BackendKind = serde_json::from_str("\"reference\"").unwrap();
    assert_eq!(k, BackendKind::Reference);
    assert_eq!(BackendKind::default(), BackendKind::Reference);
}

#[test]
fn color_conversion_matches() {
    let (reference, parallel) = backends();
    // Not a multiple of the work-item size.
    let dims = Dimensions::new(96, 80).unwrap();
    let mut a = noisy_rgb(dims);
    let mut b = a.clone();
    reference.convert_to_ycbcr(&mut a).unwrap();
    parallel.convert_to_ycbcr(&mut b).unwrap();
    assert_eq!(a, b);
    assert_eq!(b.color(), ColorSpace::YCbCr);

    // Second conversion is refused and leaves the image alone.
    let before = b.clone();
    assert!(parallel.convert_to_ycbcr(&mut b).is_err());
    assert_eq!(b, before);
}

#[test]
fn motion_search_matches_including_ties() {
    let (reference, parallel) = backends();
    let dims = Dimensions::new(96, 64).unwrap();
    let search = MotionSearch::default();

    let base = shifted_frame(dims, 0, 0);
    let moved = shifted_frame(dims, -4, 9);
    let a = reference.estimate_motion(&base, &moved, &search).unwrap();
    let b = parallel.estimate_motion(&base, &moved, &search).unwrap();
    assert_eq!(a, b);
    assert!(b.iter().all(|&v| v == MotionVector::new(-4, 9)));

    // Every candidate costs the same; only the scan order decides.
    let flat = Frame::new(
        FrameLayout::FullSize,
        dims,
        Planes::new(
            Channel::filled(96, 64, 10.0).unwrap(),
            Channel::filled(96, 64, 20.0).unwrap(),
            Channel::filled(96, 64, 30.0).unwrap(),
        ),
    )
    .unwrap();
    let a = reference.estimate_motion(&flat, &flat, &search).unwrap();
    let b = parallel.estimate_motion(&flat, &flat, &search).unwrap();
    assert_eq!(a, b);
    assert!(b.iter().all(|&v| v == MotionVector::new(-16, -16)));
}

#[test]
fn dct_matches() {
    let (reference, parallel) = backends();
    let mut ch = Channel::from_fn(48, 32, |x, y| noise(9, x as i64, y as i64)).unwrap();
    level_shift(&mut ch);
    let a = reference.forward_dct(&ch).unwrap();
    let b = parallel.forward_dct(&ch).unwrap();
    assert_eq!(a, b);

    assert!(parallel.forward_dct(&Channel::zeroed(12, 8).unwrap()).is_err());
    for empty in [Channel::zeroed(0, 8).unwrap(), Channel::zeroed(8, 0).unwrap()] {
        assert!(reference.forward_dct(&empty).is_err());
        assert!(parallel.forward_dct(&empty).is_err());
    }
}
