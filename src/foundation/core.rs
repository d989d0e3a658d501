use crate::foundation::error::{VidpressError, VidpressResult};

/// Absolute 0-based frame index in display order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// The index immediately after this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequence dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Dimensions {
    /// Create validated non-zero dimensions.
    pub fn new(width: usize, height: usize) -> VidpressResult<Self> {
        if width == 0 || height == 0 {
            return Err(VidpressError::validation(
                "dimensions must be non-zero (width and height)",
            ));
        }
        Ok(Self { width, height })
    }

    /// Number of samples in one full-resolution plane.
    pub fn area(self) -> usize {
        self.width * self.height
    }

    /// `true` when both sides are multiples of `n`.
    pub fn is_multiple_of(self, n: usize) -> bool {
        n != 0 && self.width.is_multiple_of(n) && self.height.is_multiple_of(n)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Which of the three planes of an image or frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    /// Luma (or red, before color conversion).
    Y,
    /// Blue-difference chroma (or green, before color conversion).
    Cb,
    /// Red-difference chroma (or blue, before color conversion).
    Cr,
}

impl Plane {
    /// All planes in stream order.
    pub const ALL: [Plane; 3] = [Plane::Y, Plane::Cb, Plane::Cr];

    /// `true` for the two chroma planes.
    pub fn is_chroma(self) -> bool {
        !matches!(self, Plane::Y)
    }
}

/// One value per plane, in Y/Cb/Cr order.
///
/// Before color conversion the same slots hold R/G/B.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Planes<T> {
    /// Luma slot (red before conversion).
    pub y: T,
    /// Blue-difference slot (green before conversion).
    pub cb: T,
    /// Red-difference slot (blue before conversion).
    pub cr: T,
}

impl<T> Planes<T> {
    pub fn new(y: T, cb: T, cr: T) -> Self {
        Self { y, cb, cr }
    }

    pub fn get(&self, plane: Plane) -> &T {
        match plane {
            Plane::Y => &self.y,
            Plane::Cb => &self.cb,
            Plane::Cr => &self.cr,
        }
    }

    pub fn get_mut(&mut self, plane: Plane) -> &mut T {
        match plane {
            Plane::Y => &mut self.y,
            Plane::Cb => &mut self.cb,
            Plane::Cr => &mut self.cr,
        }
    }

    /// Apply `f` to every plane, keeping plane order.
    pub fn map<U>(self, mut f: impl FnMut(Plane, T) -> U) -> Planes<U> {
        Planes {
            y: f(Plane::Y, self.y),
            cb: f(Plane::Cb, self.cb),
            cr: f(Plane::Cr, self.cr),
        }
    }

    /// Fallible [`Planes::map`]; stops at the first error.
    pub fn try_map<U>(
        self,
        mut f: impl FnMut(Plane, T) -> VidpressResult<U>,
    ) -> VidpressResult<Planes<U>> {
        Ok(Planes {
            y: f(Plane::Y, self.y)?,
            cb: f(Plane::Cb, self.cb)?,
            cr: f(Plane::Cr, self.cr)?,
        })
    }

    pub fn as_ref(&self) -> Planes<&T> {
        Planes {
            y: &self.y,
            cb: &self.cb,
            cr: &self.cr,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Plane, &T)> {
        [
            (Plane::Y, &self.y),
            (Plane::Cb, &self.cb),
            (Plane::Cr, &self.cr),
        ]
        .into_iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
