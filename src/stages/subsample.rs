use crate::{
    foundation::core::Planes,
    foundation::error::VidpressResult,
    raster::channel::Channel,
    raster::frame::{Frame, FrameLayout},
};

/// Halve both sides by keeping the sample at every even `(x, y)`.
///
/// Point sampling, no averaging.
pub fn downsample(src: &Channel) -> VidpressResult<Channel> {
    let (w2, h2) = (src.width() / 2, src.height() / 2);
    Channel::from_fn(w2, h2, |x, y| src.get(2 * x, 2 * y))
}

/// Downsample the chroma planes of a full-size frame; luma is kept as is.
pub fn downsample_chroma(frame: Frame) -> VidpressResult<Frame> {
    frame.expect_layout(FrameLayout::FullSize, "chroma subsampling")?;
    let dims = frame.dims();
    let Planes { y, cb, cr } = frame.into_planes();
    let planes = Planes::new(y, downsample(&cb)?, downsample(&cr)?);
    Frame::new(FrameLayout::Downsampled, dims, planes)
}

#[cfg(test)]
#[path = "../../tests/unit/stages/subsample.rs"]
mod tests;
