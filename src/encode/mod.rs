//! Output side of the encoder: stream records and the sinks that consume them.

mod jsonl;
mod sink;

pub use jsonl::{JsonlSink, StreamRecord, WrittenStream, read_jsonl_stream};
pub use sink::{EncodedFrame, FrameKind, InMemorySink, StreamHeader, StreamSink};
