use super::*;
use crate::{
    encode::InMemorySink,
    foundation::core::Planes,
    raster::{channel::Channel, frame::ColorSpace},
    source::InMemorySource,
    stages::{motion::MotionVector, tokens::Token},
};

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn dims(w: usize, h: usize) -> Dimensions {
    Dimensions::new(w, h).unwrap()
}

fn noisy_rgb(d: Dimensions, dx: i64, dy: i64) -> Image {
    let planes = Planes::new(1u64, 2, 3).map(|_, salt| {
        Channel::from_fn(d.width, d.height, |x, y| {
            let key = (((x as i64 + dx) as u64) << 32) ^ ((y as i64 + dy) as u64) ^ (salt << 60);
            (mix64(key) % 256) as f32
        })
        .unwrap()
    });
    Image::from_planes(d, ColorSpace::Rgb, planes).unwrap()
}

fn gray(d: Dimensions) -> Image {
    Image::solid_rgb(d, [160.0; 3]).unwrap()
}

struct FailingMotion;

impl KernelBackend for FailingMotion {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn convert_to_ycbcr(&self, image: &mut Image) -> VidpressResult<()> {
        ReferenceBackend.convert_to_ycbcr(image)
    }

    fn estimate_motion(
        &self,
        _reference: &Frame,
        _target: &Frame,
        _search: &MotionSearch,
    ) -> VidpressResult<Vec<MotionVector>> {
        Err(VidpressError::backend("failing", "device lost"))
    }

    fn forward_dct(&self, src: &Channel) -> VidpressResult<Channel> {
        ReferenceBackend.forward_dct(src)
    }
}

#[test]
fn dimensions_must_tile_chroma_blocks() {
    let cfg = EncoderConfig::default();
    assert!(SequenceEncoder::new(cfg.clone(), dims(64, 48)).is_ok());
    let err = SequenceEncoder::new(cfg.clone(), dims(64, 40)).err().unwrap();
    assert!(matches!(err, VidpressError::Validation(_)), "{err}");
    assert!(SequenceEncoder::new(cfg, dims(24, 32)).is_err());
}

#[test]
fn header_carries_sequence_parameters() {
    let cfg = EncoderConfig {
        quality: 2.0,
        ..Default::default()
    };
    let enc = SequenceEncoder::new(cfg, dims(64, 32)).unwrap();
    assert_eq!(
        enc.header(),
        StreamHeader {
            width: 64,
            height: 32,
            quality: 2.0,
            window_size: 16,
            block_size: 16,
        }
    );
}

#[test]
fn flat_gray_iframe_is_dc_only() {
    let mut enc = SequenceEncoder::new(EncoderConfig::default(), dims(64, 64)).unwrap();
    let frame = enc.encode_frame(gray(dims(64, 64))).unwrap();

    assert_eq!(frame.kind, FrameKind::I);
    assert_eq!(frame.reference, None);
    assert_eq!(frame.motion_vectors, None);

    assert_eq!(frame.dc_diff.y.dims(), (8, 8));
    assert_eq!(frame.dc_diff.cb.dims(), (4, 4));
    assert!(frame.dc_diff.y.data()[0] > 0.0);
    assert!(frame.dc_diff.y.data()[1..].iter().all(|&d| d == 0.0));
    // Neutral chroma is exactly zero after the level shift.
    assert!(frame.dc_diff.cb.data().iter().all(|&d| d == 0.0));
    assert!(frame.dc_diff.cr.data().iter().all(|&d| d == 0.0));

    assert_eq!(frame.tokens.y.len(), 64);
    assert_eq!(frame.tokens.cb.len(), 16);
    for (_, blocks) in frame.tokens.iter() {
        for block in blocks {
            assert_eq!(block, &vec![Token::ZeroRun(63)]);
        }
    }
}

#[test]
fn schedule_alternates_and_tracks_reference() {
    let cfg = EncoderConfig {
        i_frame_frequency: 2,
        ..Default::default()
    };
    let d = dims(64, 64);
    let mut enc = SequenceEncoder::new(cfg, d).unwrap();

    let f0 = enc.encode_frame(noisy_rgb(d, 0, 0)).unwrap();
    let f1 = enc.encode_frame(noisy_rgb(d, 0, 0)).unwrap();
    let f2 = enc.encode_frame(noisy_rgb(d, 0, 0)).unwrap();

    assert_eq!((f0.kind, f1.kind, f2.kind), (FrameKind::I, FrameKind::P, FrameKind::I));
    assert_eq!(f1.index, FrameIndex(1));
    assert_eq!(f1.reference, Some(FrameIndex(0)));
    assert_eq!(f2.reference, None);
    assert_eq!(enc.next_index(), FrameIndex(3));

    // Unchanged content: every block matches itself.
    let mvs = f1.motion_vectors.as_ref().unwrap();
    assert_eq!(mvs.len(), 4);
    assert!(mvs.iter().all(|&v| v == MotionVector::ZERO));
}

#[test]
fn static_pframe_zeroes_the_motion_compensated_area() {
    let cfg = EncoderConfig {
        i_frame_frequency: 100,
        ..Default::default()
    };
    let d = dims(64, 64);
    let mut enc = SequenceEncoder::new(cfg, d).unwrap();
    enc.encode_frame(noisy_rgb(d, 0, 0)).unwrap();
    let p = enc.encode_frame(noisy_rgb(d, 0, 0)).unwrap();

    // Luma blocks fully inside the 16..48 grid are all-zero residuals (level shifted to -128).
    // Block (2, 2) in raster order is index 2 * 8 + 2.
    let inner = &p.tokens.y[2 * 8 + 2];
    assert_eq!(inner, &vec![Token::ZeroRun(63)]);
}

#[test]
fn frame_size_change_is_an_input_error() {
    let mut enc = SequenceEncoder::new(EncoderConfig::default(), dims(64, 64)).unwrap();
    let err = enc.encode_frame(gray(dims(64, 32))).unwrap_err();
    assert!(matches!(err, VidpressError::Input(_)), "{err}");
    assert_eq!(enc.next_index(), FrameIndex(0));
}

#[test]
fn backend_failure_falls_back_to_reference() {
    let cfg = EncoderConfig {
        i_frame_frequency: 8,
        ..Default::default()
    };
    let d = dims(64, 64);
    let mut failing = SequenceEncoder::with_backend(cfg.clone(), d, Box::new(FailingMotion)).unwrap();
    let mut reference = SequenceEncoder::new(cfg, d).unwrap();

    for shift in [0i64, 3] {
        let a = failing.encode_frame(noisy_rgb(d, shift, 0)).unwrap();
        let b = reference.encode_frame(noisy_rgb(d, shift, 0)).unwrap();
        assert_eq!(a, b);
    }
    assert_eq!(failing.fallback_count(), 1);
    assert_eq!(reference.fallback_count(), 0);
}

#[test]
fn backend_failure_without_fallback_is_surfaced() {
    let cfg = EncoderConfig {
        fallback_to_reference: false,
        ..Default::default()
    };
    let d = dims(64, 64);
    let mut enc = SequenceEncoder::with_backend(cfg, d, Box::new(FailingMotion)).unwrap();
    enc.encode_frame(gray(d)).unwrap();
    let err = enc.encode_frame(gray(d)).unwrap_err();
    assert!(err.is_backend(), "{err}");
}

#[test]
fn sequence_stops_at_source_end_or_max_frames() {
    let d = dims(64, 64);
    let cfg = EncoderConfig {
        i_frame_frequency: 3,
        ..Default::default()
    };

    let mut source = InMemorySource::new((0..5).map(|_| gray(d)));
    let mut sink = InMemorySink::new();
    let stats = encode_sequence(&mut source, &mut sink, &cfg).unwrap();
    assert_eq!(stats.frames, 5);
    assert_eq!((stats.i_frames, stats.p_frames), (2, 3));
    assert_eq!(stats.motion_vectors, 3 * 4);
    assert!(sink.is_finished());
    assert_eq!(sink.header().unwrap().width, 64);
    assert_eq!(sink.frames().len(), 5);

    let capped = EncoderConfig {
        max_frames: Some(2),
        ..cfg
    };
    let mut source = InMemorySource::new((0..5).map(|_| gray(d)));
    let mut sink = InMemorySink::new();
    let stats = encode_sequence(&mut source, &mut sink, &capped).unwrap();
    assert_eq!(stats.frames, 2);
    assert_eq!(source.remaining(), 3);
}

#[test]
fn empty_source_is_an_input_error() {
    let mut source = InMemorySource::new(Vec::new());
    let mut sink = InMemorySink::new();
    let err = encode_sequence(&mut source, &mut sink, &EncoderConfig::default()).unwrap_err();
    assert!(matches!(err, VidpressError::Input(_)), "{err}");
    assert!(sink.header().is_none());
}

#[test]
fn stage_timings_accumulate() {
    let mut a = StageTimings::default();
    a.record(Stage::Transform, std::time::Duration::from_millis(3));
    let mut b = StageTimings::default();
    b.record(Stage::Transform, std::time::Duration::from_millis(2));
    b.record(Stage::Tokens, std::time::Duration::from_millis(1));
    a.accumulate(&b);
    assert_eq!(a.get(Stage::Transform), std::time::Duration::from_millis(5));
    assert_eq!(a.total(), std::time::Duration::from_millis(6));
    assert_eq!(a.iter().count(), Stage::ALL.len());
}
