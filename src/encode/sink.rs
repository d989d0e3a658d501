use crate::{
    foundation::core::{FrameIndex, Planes},
    foundation::error::{VidpressError, VidpressResult},
    raster::channel::Channel,
    session::StageTimings,
    stages::{motion::MotionVector, tokens::BlockTokens},
};

/// Sequence-wide parameters, emitted once before any frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StreamHeader {
    pub width: usize,
    pub height: usize,
    pub quality: f32,
    pub window_size: usize,
    pub block_size: usize,
}

/// Intra-coded or predicted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FrameKind {
    I,
    P,
}

/// Everything the encoder produces for one frame.
///
/// Equality ignores `timings`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EncodedFrame {
    pub index: FrameIndex,
    pub kind: FrameKind,
    /// Frame the motion vectors point into; `None` for I-frames.
    pub reference: Option<FrameIndex>,
    /// Grid-ordered vectors; `None` for I-frames.
    pub motion_vectors: Option<Vec<MotionVector>>,
    /// Differential DC values per plane.
    pub dc_diff: Planes<Channel>,
    /// AC tokens per plane, one entry per 8x8 block in raster order.
    pub tokens: Planes<Vec<BlockTokens>>,
    #[serde(skip)]
    pub timings: StageTimings,
}

impl PartialEq for EncodedFrame {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.kind == other.kind
            && self.reference == other.reference
            && self.motion_vectors == other.motion_vectors
            && self.dc_diff == other.dc_diff
            && self.tokens == other.tokens
    }
}

impl EncodedFrame {
    /// Tokens across all planes and blocks.
    pub fn token_count(&self) -> usize {
        self.tokens
            .iter()
            .map(|(_, blocks)| blocks.iter().map(Vec::len).sum::<usize>())
            .sum()
    }

    pub fn vector_count(&self) -> usize {
        self.motion_vectors.as_ref().map_or(0, Vec::len)
    }
}

/// Consumer of an encoded stream.
///
/// Call order: `begin` once, `push_frame` in strictly increasing index order, `end` once.
pub trait StreamSink: Send {
    fn begin(&mut self, header: StreamHeader) -> VidpressResult<()>;
    fn push_frame(&mut self, frame: &EncodedFrame) -> VidpressResult<()>;
    fn end(&mut self) -> VidpressResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    header: Option<StreamHeader>,
    frames: Vec<EncodedFrame>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> Option<StreamHeader> {
        self.header
    }

    pub fn frames(&self) -> &[EncodedFrame] {
        &self.frames
    }

    /// `true` once `end` has been called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl StreamSink for InMemorySink {
    fn begin(&mut self, header: StreamHeader) -> VidpressResult<()> {
        self.header = Some(header);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &EncodedFrame) -> VidpressResult<()> {
        if self.header.is_none() {
            return Err(VidpressError::sink("push_frame called before begin"));
        }
        if let Some(last) = self.frames.last()
            && frame.index <= last.index
        {
            return Err(VidpressError::sink(format!(
                "frame {} pushed after frame {}",
                frame.index, last.index
            )));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> VidpressResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
