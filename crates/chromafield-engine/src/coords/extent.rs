use crate::error::{RenderError, RenderResult};

/// Output image size in physical pixels.
///
/// Invariant: both dimensions are at least 1. Construct through
/// [`Extent::new`], which is the dimension-validation step of a job.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Extent {
    width: u32,
    height: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub const fn width(self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(self) -> u32 {
        self.height
    }

    #[inline]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Number of RGB samples (`width * height * 3`), or `None` on overflow of `usize`.
    pub fn rgb_sample_count(self) -> Option<usize> {
        usize::try_from(self.pixel_count()).ok()?.checked_mul(3)
    }

    /// Largest side length.
    #[inline]
    pub fn max_side(self) -> u32 {
        self.width.max(self.height)
    }

    /// Normalized coordinate of the center of pixel `(column, row)`, row 0 at the top.
    ///
    /// Matches what the rasterizer interpolates for a full-screen quad with
    /// `uv = (ndc + 1) / 2`.
    #[inline]
    pub fn pixel_center_uv(self, column: u32, row: u32) -> Uv {
        let x = (column as f32 + 0.5) / self.width as f32;
        let y = 1.0 - (row as f32 + 0.5) / self.height as f32;
        Uv { x, y }
    }
}

/// Normalized texture coordinate in `[0, 1]²`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Uv {
    pub x: f32,
    pub y: f32,
}

impl Uv {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;

    #[test]
    fn zero_width_is_rejected() {
        let err = Extent::new(0, 10).unwrap_err();
        assert_eq!(err.stage(), Stage::Validation);
    }

    #[test]
    fn zero_height_is_rejected() {
        assert!(Extent::new(10, 0).is_err());
    }

    #[test]
    fn one_by_one_is_valid() {
        let e = Extent::new(1, 1).unwrap();
        assert_eq!(e.pixel_count(), 1);
        assert_eq!(e.rgb_sample_count(), Some(3));
    }

    #[test]
    fn large_extent_counts_do_not_overflow_u32() {
        let e = Extent::new(40_000, 40_000).unwrap();
        assert_eq!(e.pixel_count(), 1_600_000_000);
        assert_eq!(e.max_side(), 40_000);
    }

    #[test]
    fn pixel_centers_lie_inside_the_unit_square() {
        let e = Extent::new(4, 2).unwrap();
        let top_left = e.pixel_center_uv(0, 0);
        assert_eq!(top_left, Uv::new(0.125, 0.75));
        let bottom_right = e.pixel_center_uv(3, 1);
        assert_eq!(bottom_right, Uv::new(0.875, 0.25));
    }
}
