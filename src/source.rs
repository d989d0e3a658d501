//! Where raw RGB frames come from.

use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};

use crate::{
    foundation::core::{Dimensions, FrameIndex},
    foundation::error::{VidpressError, VidpressResult},
    raster::frame::Image,
};

/// Supplies one RGB image per frame index, in display order.
///
/// `Ok(None)` ends the sequence. Errors are fatal for the run.
pub trait FrameSource {
    fn next_frame(&mut self, idx: FrameIndex) -> VidpressResult<Option<Image>>;
}

/// Serves images prepared in memory, front to back, ignoring the index.
#[derive(Debug, Default)]
pub struct InMemorySource {
    frames: VecDeque<Image>,
}

impl InMemorySource {
    pub fn new(frames: impl IntoIterator<Item = Image>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for InMemorySource {
    fn next_frame(&mut self, _idx: FrameIndex) -> VidpressResult<Option<Image>> {
        Ok(self.frames.pop_front())
    }
}

/// Numbered image files `{prefix}{index}.{extension}` decoded with the `image` crate.
///
/// The first missing file ends the sequence.
#[derive(Clone, Debug)]
pub struct ImageSequenceSource {
    prefix: String,
    extension: String,
}

impl ImageSequenceSource {
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
        }
    }

    /// Path of frame `idx`.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        PathBuf::from(format!("{}{}.{}", self.prefix, idx.0, self.extension))
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self, idx: FrameIndex) -> VidpressResult<Option<Image>> {
        let path = self.frame_path(idx);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(VidpressError::input(format!(
                    "read frame '{}': {e}",
                    path.display()
                )));
            }
        };
        decode_rgb(&path, &bytes).map(Some)
    }
}

fn decode_rgb(path: &Path, bytes: &[u8]) -> VidpressResult<Image> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| VidpressError::input(format!("decode frame '{}': {e}", path.display())))?;
    let rgb = decoded.to_rgb8();
    let (w, h) = rgb.dimensions();
    let dims = Dimensions::new(w as usize, h as usize)
        .map_err(|e| VidpressError::input(format!("frame '{}': {e}", path.display())))?;
    Image::from_rgb8(dims, rgb.as_raw())
}

#[cfg(test)]
#[path = "../tests/unit/source/mod.rs"]
mod tests;
