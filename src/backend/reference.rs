use crate::{
    backend::KernelBackend,
    foundation::error::VidpressResult,
    raster::{channel::Channel, frame::Frame, frame::Image},
    stages::{
        color, dct,
        motion::{self, MotionSearch, MotionVector},
    },
};

/// Single-threaded kernels straight from [`crate::stages`]. Always available; the fallback target
/// when another backend fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceBackend;

impl KernelBackend for ReferenceBackend {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn convert_to_ycbcr(&self, image: &mut Image) -> VidpressResult<()> {
        color::convert_image(image)
    }

    fn estimate_motion(
        &self,
        reference: &Frame,
        target: &Frame,
        search: &MotionSearch,
    ) -> VidpressResult<Vec<MotionVector>> {
        motion::estimate_motion(reference, target, search)
    }

    fn forward_dct(&self, src: &Channel) -> VidpressResult<Channel> {
        dct::forward_dct(src)
    }
}
