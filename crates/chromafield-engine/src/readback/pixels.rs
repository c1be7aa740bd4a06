use crate::coords::Extent;
use crate::error::{RenderError, RenderResult};

/// Which edge of the rendered image row 0 of a buffer holds.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum RowOrder {
    /// Row 0 is the bottom edge. This is classic framebuffer readback order
    /// and the default file layout.
    #[default]
    BottomUp,
    /// Row 0 is the top edge, as most image viewers expect.
    TopDown,
}

impl RowOrder {
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            RowOrder::BottomUp => RowOrder::TopDown,
            RowOrder::TopDown => RowOrder::BottomUp,
        }
    }
}

/// `width * height * 3` 16-bit RGB samples, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    extent: Extent,
    row_order: RowOrder,
    samples: Vec<u16>,
}

impl PixelBuffer {
    /// Reserves an empty buffer for `extent` without aborting on allocation failure.
    ///
    /// Samples are appended row by row with [`PixelBuffer::push_row`].
    pub fn try_alloc(extent: Extent, row_order: RowOrder) -> RenderResult<Self> {
        let readback_error = |reason: String| RenderError::Readback {
            width: extent.width(),
            height: extent.height(),
            reason,
        };

        let len = extent
            .rgb_sample_count()
            .ok_or_else(|| readback_error("sample count overflows the address space".into()))?;

        let mut samples = Vec::new();
        samples.try_reserve_exact(len).map_err(|e| {
            readback_error(format!(
                "cannot allocate {} bytes of host memory: {e}",
                len as u64 * 2
            ))
        })?;

        Ok(Self {
            extent,
            row_order,
            samples,
        })
    }

    /// Wraps existing samples. Fails if the length does not match `extent`.
    pub fn from_samples(extent: Extent, row_order: RowOrder, samples: Vec<u16>) -> RenderResult<Self> {
        let expected = extent.rgb_sample_count();
        if expected != Some(samples.len()) {
            return Err(RenderError::Readback {
                width: extent.width(),
                height: extent.height(),
                reason: format!("expected {expected:?} samples, got {}", samples.len()),
            });
        }
        Ok(Self {
            extent,
            row_order,
            samples,
        })
    }

    /// Appends one row of `width * 3` samples.
    pub fn push_row(&mut self, row: &[u16]) {
        debug_assert_eq!(row.len(), self.row_len());
        debug_assert!(self.samples.len() + row.len() <= self.samples.capacity());
        self.samples.extend_from_slice(row);
    }

    #[inline]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    #[inline]
    pub fn row_order(&self) -> RowOrder {
        self.row_order
    }

    #[inline]
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u16> {
        self.samples
    }

    /// `true` once every row has been written.
    pub fn is_complete(&self) -> bool {
        self.extent.rgb_sample_count() == Some(self.samples.len())
    }

    #[inline]
    fn row_len(&self) -> usize {
        self.extent.width() as usize * 3
    }

    /// Samples of buffer row `row`.
    pub fn row(&self, row: u32) -> &[u16] {
        let len = self.row_len();
        let start = row as usize * len;
        &self.samples[start..start + len]
    }

    /// RGB at `(column, row)` in buffer order.
    pub fn pixel(&self, column: u32, row: u32) -> [u16; 3] {
        let i = column as usize * 3;
        let r = self.row(row);
        [r[i], r[i + 1], r[i + 2]]
    }

    /// Returns the buffer in `order`, reversing rows in place if needed.
    pub fn into_row_order(mut self, order: RowOrder) -> Self {
        if self.row_order != order {
            self.flip_rows();
        }
        self
    }

    fn flip_rows(&mut self) {
        let len = self.row_len();
        let height = self.extent.height() as usize;
        for top in 0..height / 2 {
            let bottom = height - 1 - top;
            let (head, tail) = self.samples.split_at_mut(bottom * len);
            head[top * len..(top + 1) * len].swap_with_slice(&mut tail[..len]);
        }
        self.row_order = self.row_order.flipped();
    }
}
