use crate::foundation::error::{VidpressError, VidpressResult};

/// A single plane of `f32` samples, row-major.
///
/// Invariant: `data.len() == width * height`. Every constructor checks it, including
/// deserialization.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ChannelRepr")]
pub struct Channel {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

#[derive(serde::Deserialize)]
struct ChannelRepr {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl TryFrom<ChannelRepr> for Channel {
    type Error = VidpressError;

    fn try_from(repr: ChannelRepr) -> VidpressResult<Self> {
        Channel::from_vec(repr.width, repr.height, repr.data)
    }
}

impl Channel {
    /// Allocate a zero-filled channel.
    ///
    /// Size overflow and allocation failure are reported as resource errors.
    pub fn zeroed(width: usize, height: usize) -> VidpressResult<Self> {
        Self::filled(width, height, 0.0)
    }

    /// Allocate a channel with every sample set to `value`.
    pub fn filled(width: usize, height: usize, value: f32) -> VidpressResult<Self> {
        let len = sample_count(width, height)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            VidpressError::resource(format!("allocate {width}x{height} channel: {e}"))
        })?;
        data.resize(len, value);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap existing samples.
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> VidpressResult<Self> {
        let len = sample_count(width, height)?;
        if data.len() != len {
            return Err(VidpressError::validation(format!(
                "channel {width}x{height} expects {len} samples, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a channel by evaluating `f(x, y)` at every sample.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> f32,
    ) -> VidpressResult<Self> {
        let mut out = Self::zeroed(width, height)?;
        for y in 0..height {
            for x in 0..width {
                out.data[y * width + x] = f(x, y);
            }
        }
        Ok(out)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Sample at column `x`, row `y`.
    ///
    /// Panics when out of bounds, like slice indexing.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x] = value;
    }

    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let w = self.width;
        &mut self.data[y * w..(y + 1) * w]
    }

    /// Copy the 8x8 block whose top-left sample is `(x0, y0)` into a row-major array.
    pub fn read_block8(&self, x0: usize, y0: usize) -> [f32; 64] {
        let mut block = [0.0f32; 64];
        for (r, dst) in block.chunks_exact_mut(8).enumerate() {
            let start = (y0 + r) * self.width + x0;
            dst.copy_from_slice(&self.data[start..start + 8]);
        }
        block
    }

    /// Write a row-major 8x8 block back at `(x0, y0)`.
    pub fn write_block8(&mut self, x0: usize, y0: usize, block: &[f32; 64]) {
        for (r, src) in block.chunks_exact(8).enumerate() {
            let start = (y0 + r) * self.width + x0;
            self.data[start..start + 8].copy_from_slice(src);
        }
    }

    /// Fail unless the channel is non-empty and both sides are multiples of 8.
    pub fn ensure_block_aligned(&self, what: &str) -> VidpressResult<()> {
        if self.width == 0
            || self.height == 0
            || !self.width.is_multiple_of(8)
            || !self.height.is_multiple_of(8)
        {
            return Err(VidpressError::validation(format!(
                "{what} expects a non-empty channel with dimensions divisible by 8, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Number of 8x8 blocks along x and y.
    pub fn block_grid(&self) -> (usize, usize) {
        (self.width / 8, self.height / 8)
    }
}

fn sample_count(width: usize, height: usize) -> VidpressResult<usize> {
    width
        .checked_mul(height)
        .ok_or_else(|| VidpressError::resource(format!("channel size overflow: {width}x{height}")))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/channel.rs"]
mod tests;
