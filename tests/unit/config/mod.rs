use super::*;

#[test]
fn defaults_are_valid() {
    let cfg = EncoderConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.quality, 1.0);
    assert_eq!(cfg.i_frame_frequency, 8);
    assert_eq!(cfg.motion_search().unwrap(), MotionSearch::default());
    assert!(cfg.fallback_to_reference);
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg = EncoderConfig::from_reader(
        r#"{ "quality": 2.5, "backend": "parallel", "threads": 2 }"#.as_bytes(),
    )
    .unwrap();
    assert_eq!(cfg.quality, 2.5);
    assert_eq!(cfg.backend, BackendKind::Parallel);
    assert_eq!(cfg.threads, Some(2));
    assert_eq!(cfg.i_frame_frequency, 8);
    assert_eq!(cfg.max_frames, None);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = EncoderConfig::from_reader(r#"{ "qualty": 2 }"#.as_bytes()).unwrap_err();
    assert!(matches!(err, VidpressError::Serde(_)), "{err}");
}

#[test]
fn validation_rules() {
    let bad = [
        EncoderConfig {
            quality: 0.0,
            ..Default::default()
        },
        EncoderConfig {
            i_frame_frequency: 0,
            ..Default::default()
        },
        EncoderConfig {
            block_size: 0,
            ..Default::default()
        },
        EncoderConfig {
            window_size: 0,
            ..Default::default()
        },
        EncoderConfig {
            threads: Some(0),
            ..Default::default()
        },
        EncoderConfig {
            max_frames: Some(0),
            ..Default::default()
        },
    ];
    for cfg in bad {
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, VidpressError::Validation(_)), "{err}");
    }
}

#[test]
fn i_frame_schedule() {
    let cfg = EncoderConfig {
        i_frame_frequency: 3,
        ..Default::default()
    };
    let kinds: Vec<bool> = (0..7).map(|n| cfg.is_i_frame(n)).collect();
    assert_eq!(kinds, [true, false, false, true, false, false, true]);

    let every = EncoderConfig {
        i_frame_frequency: 1,
        ..Default::default()
    };
    assert!((0..5).all(|n| every.is_i_frame(n)));
}

#[test]
fn from_path_reads_and_validates() {
    let dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("unit-config");
    std::fs::create_dir_all(&dir).unwrap();

    let good = dir.join("good.json");
    std::fs::write(&good, r#"{ "i_frame_frequency": 4 }"#).unwrap();
    assert_eq!(EncoderConfig::from_path(&good).unwrap().i_frame_frequency, 4);

    let bad = dir.join("bad.json");
    std::fs::write(&bad, r#"{ "quality": -1.0 }"#).unwrap();
    assert!(EncoderConfig::from_path(&bad).is_err());

    assert!(EncoderConfig::from_path(dir.join("missing.json")).is_err());
}
