use std::{fs::File, io::BufReader, path::Path};

use crate::{
    backend::BackendKind,
    foundation::error::{VidpressError, VidpressResult},
    stages::{motion::MotionSearch, quantize::quant_steps},
};

/// Per-run encoder settings.
///
/// Every field has a default, so a JSON file only needs the fields it changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    /// Quantization quality `Q`; steps are `ceil(base / Q)`.
    pub quality: f32,
    /// Frame `n` is intra-coded iff `n % i_frame_frequency == 0`.
    pub i_frame_frequency: u64,
    /// Macroblock side used by motion search.
    pub block_size: usize,
    /// Motion search reach on each side of a macroblock.
    pub window_size: usize,
    pub backend: BackendKind,
    /// Worker threads for the parallel backend. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Retry a failed kernel on the reference backend instead of aborting.
    pub fallback_to_reference: bool,
    /// Stop after this many frames.
    pub max_frames: Option<u64>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            quality: 1.0,
            i_frame_frequency: 8,
            block_size: 16,
            window_size: 16,
            backend: BackendKind::Reference,
            threads: None,
            fallback_to_reference: true,
            max_frames: None,
        }
    }
}

impl EncoderConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> VidpressResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| VidpressError::serde(format!("parse encoder config JSON: {e}")))
    }

    /// Load and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> VidpressResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            VidpressError::validation(format!("open encoder config '{}': {e}", path.display()))
        })?;
        let cfg = Self::from_reader(BufReader::new(f))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> VidpressResult<()> {
        quant_steps(self.quality)?;
        if self.i_frame_frequency == 0 {
            return Err(VidpressError::validation(
                "i_frame_frequency must be >= 1",
            ));
        }
        MotionSearch::new(self.block_size, self.window_size)?;
        if self.threads == Some(0) {
            return Err(VidpressError::validation(
                "threads must be >= 1 when set",
            ));
        }
        if self.max_frames == Some(0) {
            return Err(VidpressError::validation(
                "max_frames must be >= 1 when set",
            ));
        }
        Ok(())
    }

    pub fn motion_search(&self) -> VidpressResult<MotionSearch> {
        MotionSearch::new(self.block_size, self.window_size)
    }

    /// Whether frame `n` is intra-coded.
    pub fn is_i_frame(&self, n: u64) -> bool {
        n % self.i_frame_frequency.max(1) == 0
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/mod.rs"]
mod tests;
