//! Sequence-level encoding: frame lifecycle, I/P scheduling and the carried reference frame.

mod stats;

pub use stats::{EncodeStats, Stage, StageTimings};

use std::time::Instant;

use crate::{
    backend::{KernelBackend, ReferenceBackend, create_backend},
    config::EncoderConfig,
    encode::{EncodedFrame, FrameKind, StreamHeader, StreamSink},
    foundation::core::{Dimensions, FrameIndex},
    foundation::error::{VidpressError, VidpressResult},
    raster::frame::{Frame, FrameLayout, Image},
    source::FrameSource,
    stages::{
        dc_diff::dc_differences,
        dct::level_shift,
        delta::build_delta,
        lowpass::smooth_chroma,
        motion::MotionSearch,
        quantize::{quant_steps, quantize},
        subsample::downsample_chroma,
        tokens::encode_blocks,
        zigzag::zigzag_scan,
    },
};

/// Sequence dimensions must be multiples of this so half-size chroma tiles into 8x8 blocks.
pub const DIMENSION_ALIGN: usize = 16;

/// Encodes the frames of one sequence, in order.
///
/// Holds the only cross-frame state: the smoothed frame of the last encoded frame, which becomes
/// the motion reference of the next P-frame.
pub struct SequenceEncoder {
    config: EncoderConfig,
    dims: Dimensions,
    search: MotionSearch,
    steps: [f32; 64],
    backend: Box<dyn KernelBackend>,
    previous: Option<(FrameIndex, Frame)>,
    next_index: FrameIndex,
    fallbacks: u64,
}

impl SequenceEncoder {
    /// Encoder using the backend named by `config`.
    pub fn new(config: EncoderConfig, dims: Dimensions) -> VidpressResult<Self> {
        config.validate()?;
        let backend = create_backend(config.backend, config.threads)?;
        Self::with_backend(config, dims, backend)
    }

    /// Encoder using a caller-supplied backend; `config.backend` is ignored.
    pub fn with_backend(
        config: EncoderConfig,
        dims: Dimensions,
        backend: Box<dyn KernelBackend>,
    ) -> VidpressResult<Self> {
        config.validate()?;
        if !dims.is_multiple_of(DIMENSION_ALIGN) {
            return Err(VidpressError::validation(format!(
                "sequence dimensions {dims} must be multiples of {DIMENSION_ALIGN}"
            )));
        }
        let search = config.motion_search()?;
        let steps = quant_steps(config.quality)?;
        Ok(Self {
            config,
            dims,
            search,
            steps,
            backend,
            previous: None,
            next_index: FrameIndex(0),
            fallbacks: 0,
        })
    }

    pub fn header(&self) -> StreamHeader {
        StreamHeader {
            width: self.dims.width,
            height: self.dims.height,
            quality: self.config.quality,
            window_size: self.search.window_size,
            block_size: self.search.block_size,
        }
    }

    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Index the next call to [`SequenceEncoder::encode_frame`] will assign.
    pub fn next_index(&self) -> FrameIndex {
        self.next_index
    }

    /// Kernel calls re-run on the reference backend so far.
    pub fn fallback_count(&self) -> u64 {
        self.fallbacks
    }

    /// Run the full pipeline on the next RGB frame of the sequence.
    #[tracing::instrument(
        skip(self, image),
        fields(index = self.next_index.0, backend = self.backend.name())
    )]
    pub fn encode_frame(&mut self, mut image: Image) -> VidpressResult<EncodedFrame> {
        let index = self.next_index;
        if image.dims() != self.dims {
            return Err(VidpressError::input(format!(
                "frame {index} is {}, sequence is {}",
                image.dims(),
                self.dims
            )));
        }

        let backend = self.backend.as_ref();
        let allow_fallback = self.config.fallback_to_reference;
        let mut fallbacks = 0u64;
        let mut timings = StageTimings::default();

        let t = Instant::now();
        run_kernel(backend, allow_fallback, &mut fallbacks, "color", |b| {
            b.convert_to_ycbcr(&mut image)
        })?;
        timings.record(Stage::ColorConvert, t.elapsed());

        let t = Instant::now();
        let smoothed = smooth_chroma(image)?;
        timings.record(Stage::Smooth, t.elapsed());

        let reference = match &self.previous {
            Some((ref_index, frame)) if !self.config.is_i_frame(index.0) => {
                Some((*ref_index, frame))
            }
            _ => None,
        };

        let (kind, reference, motion_vectors, delta) = match reference {
            Some((ref_index, ref_frame)) => {
                let t = Instant::now();
                let vectors = run_kernel(backend, allow_fallback, &mut fallbacks, "motion", |b| {
                    b.estimate_motion(ref_frame, &smoothed, &self.search)
                })?;
                timings.record(Stage::MotionSearch, t.elapsed());

                let t = Instant::now();
                let delta = build_delta(ref_frame, &smoothed, &vectors, &self.search)?;
                timings.record(Stage::Delta, t.elapsed());
                (FrameKind::P, Some(ref_index), Some(vectors), delta)
            }
            None => (FrameKind::I, None, None, smoothed.clone()),
        };

        let t = Instant::now();
        let downsampled = downsample_chroma(delta)?;
        timings.record(Stage::Subsample, t.elapsed());

        let t = Instant::now();
        let coeffs = downsampled.into_planes().try_map(|_, mut ch| {
            level_shift(&mut ch);
            run_kernel(backend, allow_fallback, &mut fallbacks, "dct", |b| {
                b.forward_dct(&ch)
            })
        })?;
        timings.record(Stage::Transform, t.elapsed());

        let t = Instant::now();
        let quantized = coeffs.try_map(|_, ch| quantize(&ch, &self.steps))?;
        timings.record(Stage::Quantize, t.elapsed());

        let t = Instant::now();
        let dc = quantized.as_ref().try_map(|_, ch| dc_differences(ch))?;
        let dc = Frame::new(FrameLayout::DcDiff, self.dims, dc)?;
        timings.record(Stage::DcDiff, t.elapsed());

        let t = Instant::now();
        let scanned = quantized.try_map(|_, ch| zigzag_scan(&ch))?;
        let scanned = Frame::new(FrameLayout::ZigZag, self.dims, scanned)?;
        timings.record(Stage::ZigZag, t.elapsed());

        let t = Instant::now();
        let tokens = scanned.planes().as_ref().try_map(|_, ch| encode_blocks(ch))?;
        timings.record(Stage::Tokens, t.elapsed());

        for (stage, elapsed) in timings.iter() {
            tracing::debug!(stage = stage.name(), ?elapsed, "stage done");
        }

        let frame = EncodedFrame {
            index,
            kind,
            reference,
            motion_vectors,
            dc_diff: dc.into_planes(),
            tokens,
            timings,
        };
        tracing::info!(
            frame = index.0,
            kind = ?frame.kind,
            vectors = frame.vector_count(),
            tokens = frame.token_count(),
            "encoded frame"
        );

        self.previous = Some((index, smoothed));
        self.next_index = index.next();
        self.fallbacks += fallbacks;
        Ok(frame)
    }
}

/// Call `kernel` on `backend`, re-running it once on the reference backend when it fails with a
/// backend error and fallback is allowed.
fn run_kernel<T>(
    backend: &dyn KernelBackend,
    allow_fallback: bool,
    fallbacks: &mut u64,
    kernel: &'static str,
    mut call: impl FnMut(&dyn KernelBackend) -> VidpressResult<T>,
) -> VidpressResult<T> {
    match call(backend) {
        Err(err) if err.is_backend() && allow_fallback => {
            tracing::warn!(
                backend = backend.name(),
                kernel,
                error = %err,
                "kernel failed, retrying on reference backend"
            );
            *fallbacks += 1;
            call(&ReferenceBackend)
        }
        result => result,
    }
}

/// Encode every frame `source` yields (up to `config.max_frames`) into `sink`.
///
/// Frame 0 fixes the sequence dimensions; a later frame of another size is an input error. An
/// empty source is an input error too, since the header needs dimensions.
pub fn encode_sequence(
    source: &mut dyn FrameSource,
    sink: &mut dyn StreamSink,
    config: &EncoderConfig,
) -> VidpressResult<EncodeStats> {
    config.validate()?;
    let Some(first) = source.next_frame(FrameIndex(0))? else {
        return Err(VidpressError::input("frame source produced no frames"));
    };

    let mut encoder = SequenceEncoder::new(config.clone(), first.dims())?;
    let header = encoder.header();
    tracing::info!(
        width = header.width,
        height = header.height,
        quality = header.quality,
        backend = encoder.backend_name(),
        "begin sequence"
    );
    sink.begin(header)?;

    let mut stats = EncodeStats::default();
    let mut next = Some(first);
    while let Some(image) = next.take() {
        let frame = encoder.encode_frame(image)?;
        sink.push_frame(&frame)?;

        stats.frames += 1;
        match frame.kind {
            FrameKind::I => stats.i_frames += 1,
            FrameKind::P => stats.p_frames += 1,
        }
        stats.motion_vectors += frame.vector_count() as u64;
        stats.tokens += frame.token_count() as u64;
        stats.timings.accumulate(&frame.timings);

        if config.max_frames.is_some_and(|max| stats.frames >= max) {
            break;
        }
        next = source.next_frame(encoder.next_index())?;
    }
    stats.fallbacks = encoder.fallback_count();
    sink.end()?;

    tracing::info!(
        frames = stats.frames,
        i_frames = stats.i_frames,
        p_frames = stats.p_frames,
        fallbacks = stats.fallbacks,
        elapsed = ?stats.timings.total(),
        "sequence done"
    );
    Ok(stats)
}

#[cfg(test)]
#[path = "../../tests/unit/session/mod.rs"]
mod tests;
