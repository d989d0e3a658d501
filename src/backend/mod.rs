//! Interchangeable implementations of the hot kernels.
//!
//! A backend computes color conversion, motion search and the forward DCT. Every backend must
//! produce the same output as [`ReferenceBackend`] for the same input, and must leave its output
//! buffers untouched when it fails.

mod parallel;
mod reference;

pub use parallel::ParallelBackend;
pub use reference::ReferenceBackend;

use crate::{
    foundation::error::VidpressResult,
    raster::{channel::Channel, frame::Frame, frame::Image},
    stages::motion::{MotionSearch, MotionVector},
};

/// Kernel contract shared by all backends.
pub trait KernelBackend: Send + Sync {
    /// Short stable name used in logs and `Backend` errors.
    fn name(&self) -> &'static str;

    /// RGB to YCbCr, in place.
    fn convert_to_ycbcr(&self, image: &mut Image) -> VidpressResult<()>;

    /// One vector per macroblock of `search.grid(target.dims())`, in grid order.
    fn estimate_motion(
        &self,
        reference: &Frame,
        target: &Frame,
        search: &MotionSearch,
    ) -> VidpressResult<Vec<MotionVector>>;

    /// 8x8 DCT of an already level-shifted channel.
    fn forward_dct(&self, src: &Channel) -> VidpressResult<Channel>;
}

/// Backends selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum BackendKind {
    /// Sequential kernels.
    #[default]
    Reference,
    /// Rayon thread pool.
    Parallel,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Reference => "reference",
            BackendKind::Parallel => "parallel",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the backend for `kind`. `threads` sizes the pool of the parallel backend and is ignored
/// by the reference one.
pub fn create_backend(
    kind: BackendKind,
    threads: Option<usize>,
) -> VidpressResult<Box<dyn KernelBackend>> {
    match kind {
        BackendKind::Reference => Ok(Box::new(ReferenceBackend)),
        BackendKind::Parallel => Ok(Box::new(ParallelBackend::new(threads)?)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/mod.rs"]
mod tests;
