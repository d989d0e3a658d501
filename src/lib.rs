//! vidpress is a block-based, motion-compensated video compression pipeline.
//!
//! Raw RGB frames go through color conversion, chroma smoothing, block motion search (P-frames),
//! residual construction, chroma subsampling, an 8x8 DCT, quantization, DC prediction, zig-zag
//! scanning and run-length tokenization. The public API is sequence-oriented:
//!
//! - Build an [`EncoderConfig`]
//! - Feed frames from a [`FrameSource`] through [`encode_sequence`] (or drive a
//!   [`SequenceEncoder`] yourself)
//! - Collect [`EncodedFrame`]s in a [`StreamSink`]
#![forbid(unsafe_code)]

mod foundation;
mod raster;

/// Kernel backends (reference and rayon).
pub mod backend;
pub mod config;
/// Stream records and sinks.
pub mod encode;
pub mod session;
pub mod source;
/// Individual pipeline stages.
pub mod stages;

pub use crate::foundation::core::{Dimensions, FrameIndex, Plane, Planes};
pub use crate::foundation::error::{VidpressError, VidpressResult};
pub use crate::raster::channel::Channel;
pub use crate::raster::frame::{BLOCK_COEFFS, ColorSpace, Frame, FrameLayout, Image};

pub use crate::backend::{BackendKind, KernelBackend, ParallelBackend, ReferenceBackend, create_backend};
pub use crate::config::EncoderConfig;
pub use crate::encode::{
    EncodedFrame, FrameKind, InMemorySink, JsonlSink, StreamHeader, StreamRecord, StreamSink,
    WrittenStream, read_jsonl_stream,
};
pub use crate::session::{EncodeStats, SequenceEncoder, Stage, StageTimings, encode_sequence};
pub use crate::source::{FrameSource, ImageSequenceSource, InMemorySource};
pub use crate::stages::motion::{MotionSearch, MotionVector};
pub use crate::stages::tokens::{BlockTokens, Token};
