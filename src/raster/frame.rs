use crate::{
    foundation::core::{Dimensions, Plane, Planes},
    foundation::error::{VidpressError, VidpressResult},
    raster::channel::Channel,
};

/// Number of coefficients in one 8x8 block.
pub const BLOCK_COEFFS: usize = 64;

/// Color space held by an [`Image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    /// Planes are R, G, B.
    Rgb,
    /// Planes are Y, Cb, Cr.
    YCbCr,
}

/// Three full-resolution planes sharing one size.
///
/// Loaded as RGB, converted in place to YCbCr, then turned into a [`Frame`].
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    dims: Dimensions,
    color: ColorSpace,
    planes: Planes<Channel>,
}

impl Image {
    /// Assemble an image, checking that all planes match `dims`.
    pub fn from_planes(
        dims: Dimensions,
        color: ColorSpace,
        planes: Planes<Channel>,
    ) -> VidpressResult<Self> {
        for (plane, ch) in planes.iter() {
            if ch.dims() != (dims.width, dims.height) {
                return Err(VidpressError::validation(format!(
                    "image plane {plane:?} is {}x{}, expected {dims}",
                    ch.width(),
                    ch.height()
                )));
            }
        }
        Ok(Self {
            dims,
            color,
            planes,
        })
    }

    /// Build an RGB image from tightly packed RGB8 bytes.
    pub fn from_rgb8(dims: Dimensions, bytes: &[u8]) -> VidpressResult<Self> {
        let expected = dims
            .area()
            .checked_mul(3)
            .ok_or_else(|| VidpressError::resource("rgb buffer size overflow"))?;
        if bytes.len() != expected {
            return Err(VidpressError::input(format!(
                "rgb8 buffer for {dims} must hold {expected} bytes, got {}",
                bytes.len()
            )));
        }

        let mut planes = Planes::new(
            Channel::zeroed(dims.width, dims.height)?,
            Channel::zeroed(dims.width, dims.height)?,
            Channel::zeroed(dims.width, dims.height)?,
        );
        for (i, px) in bytes.chunks_exact(3).enumerate() {
            planes.y.data_mut()[i] = f32::from(px[0]);
            planes.cb.data_mut()[i] = f32::from(px[1]);
            planes.cr.data_mut()[i] = f32::from(px[2]);
        }
        Self::from_planes(dims, ColorSpace::Rgb, planes)
    }

    /// A uniformly colored RGB image.
    pub fn solid_rgb(dims: Dimensions, rgb: [f32; 3]) -> VidpressResult<Self> {
        let planes = Planes::new(
            Channel::filled(dims.width, dims.height, rgb[0])?,
            Channel::filled(dims.width, dims.height, rgb[1])?,
            Channel::filled(dims.width, dims.height, rgb[2])?,
        );
        Self::from_planes(dims, ColorSpace::Rgb, planes)
    }

    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    pub fn color(&self) -> ColorSpace {
        self.color
    }

    pub fn planes(&self) -> &Planes<Channel> {
        &self.planes
    }

    pub fn into_planes(self) -> Planes<Channel> {
        self.planes
    }

    /// Mutable access for in-place kernels; `color` must be updated with
    /// [`Image::set_color`] by the kernel that changes it.
    pub fn planes_mut(&mut self) -> &mut Planes<Channel> {
        &mut self.planes
    }

    pub(crate) fn set_color(&mut self, color: ColorSpace) {
        self.color = color;
    }
}

/// Stage resolution of a [`Frame`].
///
/// Each layout fixes the size of every plane relative to the sequence dimensions `W x H`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameLayout {
    /// All planes `W x H`.
    FullSize,
    /// Y `W x H`, chroma `W/2 x H/2`.
    Downsampled,
    /// One DC value per 8x8 block of the downsampled plane.
    DcDiff,
    /// 64 coefficients per row, one row per 8x8 block of the downsampled plane.
    ZigZag,
}

impl FrameLayout {
    /// `(width, height)` of `plane` under this layout.
    pub fn plane_dims(self, dims: Dimensions, plane: Plane) -> (usize, usize) {
        let (dw, dh) = if plane.is_chroma() {
            (dims.width / 2, dims.height / 2)
        } else {
            (dims.width, dims.height)
        };
        match self {
            FrameLayout::FullSize => (dims.width, dims.height),
            FrameLayout::Downsampled => (dw, dh),
            FrameLayout::DcDiff => (dw / 8, dh / 8),
            FrameLayout::ZigZag => (BLOCK_COEFFS, dw * dh / BLOCK_COEFFS),
        }
    }
}

/// Three planes tagged with the pipeline stage resolution they belong to.
///
/// The tag is checked against every plane's size at construction; stages call
/// [`Frame::expect_layout`] before touching data.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Frame {
    layout: FrameLayout,
    dims: Dimensions,
    planes: Planes<Channel>,
}

impl Frame {
    pub fn new(
        layout: FrameLayout,
        dims: Dimensions,
        planes: Planes<Channel>,
    ) -> VidpressResult<Self> {
        for (plane, ch) in planes.iter() {
            let expected = layout.plane_dims(dims, plane);
            if ch.dims() != expected {
                return Err(VidpressError::validation(format!(
                    "{layout:?} frame for {dims}: plane {plane:?} is {}x{}, expected {}x{}",
                    ch.width(),
                    ch.height(),
                    expected.0,
                    expected.1
                )));
            }
        }
        Ok(Self {
            layout,
            dims,
            planes,
        })
    }

    /// Wrap a YCbCr image as a full-size frame.
    pub fn from_image(image: Image) -> VidpressResult<Self> {
        if image.color != ColorSpace::YCbCr {
            return Err(VidpressError::validation(
                "frames are built from YCbCr images; convert the image first",
            ));
        }
        Self::new(FrameLayout::FullSize, image.dims, image.planes)
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// Sequence dimensions (full-resolution luma size), not the size of any one plane.
    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    pub fn planes(&self) -> &Planes<Channel> {
        &self.planes
    }

    pub fn plane(&self, plane: Plane) -> &Channel {
        self.planes.get(plane)
    }

    pub fn into_planes(self) -> Planes<Channel> {
        self.planes
    }

    /// Fail with a validation error naming `stage` unless this frame has `layout`.
    pub fn expect_layout(&self, layout: FrameLayout, stage: &str) -> VidpressResult<()> {
        if self.layout != layout {
            return Err(VidpressError::validation(format!(
                "{stage} expects a {layout:?} frame, got {:?}",
                self.layout
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/frame.rs"]
mod tests;
