use half::f16;

use crate::paint::quantize_unorm16;
use crate::render::TargetFormat;

/// Upper bound on one staging band, regardless of the device buffer limit.
pub const MAX_STAGING_BAND_BYTES: u64 = 256 << 20;

/// Byte layout of one texture row in a copy buffer.
///
/// Texture-to-buffer copies require `bytes_per_row` to be a multiple of
/// `wgpu::COPY_BYTES_PER_ROW_ALIGNMENT`; rows are padded at the end.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RowLayout {
    pub unpadded_bytes: u32,
    pub padded_bytes: u32,
}

impl RowLayout {
    pub fn new(width: u32, format: TargetFormat) -> Option<Self> {
        let unpadded_bytes = width.checked_mul(format.bytes_per_pixel())?;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes = unpadded_bytes.checked_add(align - 1)? / align * align;
        Some(Self {
            unpadded_bytes,
            padded_bytes,
        })
    }

    /// How many rows fit one staging buffer of at most `max_buffer_size` bytes,
    /// further capped at [`MAX_STAGING_BAND_BYTES`] unless a single row is larger.
    ///
    /// Returns `None` if not even a single row fits the device limit.
    pub fn rows_per_band(&self, height: u32, max_buffer_size: u64) -> Option<u32> {
        let row = self.padded_bytes as u64;
        if row == 0 || row > max_buffer_size {
            return None;
        }
        let rows = (max_buffer_size.min(MAX_STAGING_BAND_BYTES) / row).max(1);
        Some(rows.min(height as u64) as u32)
    }
}

/// Converts one unpadded texture row into RGB samples, dropping alpha.
pub fn decode_row(format: TargetFormat, bytes: &[u8], out: &mut Vec<u16>) {
    match format {
        TargetFormat::Rgba16Unorm => {
            for px in bytes.chunks_exact(8) {
                out.extend([
                    u16::from_le_bytes([px[0], px[1]]),
                    u16::from_le_bytes([px[2], px[3]]),
                    u16::from_le_bytes([px[4], px[5]]),
                ]);
            }
        }
        TargetFormat::Rgba32Float => {
            for px in bytes.chunks_exact(16) {
                let ch = |o: usize| f32::from_le_bytes([px[o], px[o + 1], px[o + 2], px[o + 3]]);
                out.extend([
                    quantize_unorm16(ch(0)),
                    quantize_unorm16(ch(4)),
                    quantize_unorm16(ch(8)),
                ]);
            }
        }
        TargetFormat::Rgba16Float => {
            for px in bytes.chunks_exact(8) {
                let ch = |o: usize| f16::from_bits(u16::from_le_bytes([px[o], px[o + 1]])).to_f32();
                out.extend([
                    quantize_unorm16(ch(0)),
                    quantize_unorm16(ch(2)),
                    quantize_unorm16(ch(4)),
                ]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_pad_to_copy_alignment() {
        let l = RowLayout::new(4, TargetFormat::Rgba16Unorm).unwrap();
        assert_eq!(l.unpadded_bytes, 32);
        assert_eq!(l.padded_bytes, 256);
    }

    #[test]
    fn aligned_rows_are_not_padded() {
        let l = RowLayout::new(32, TargetFormat::Rgba16Unorm).unwrap();
        assert_eq!(l.unpadded_bytes, 256);
        assert_eq!(l.padded_bytes, 256);
    }

    #[test]
    fn bands_split_by_buffer_limit() {
        let l = RowLayout::new(40_000, TargetFormat::Rgba16Unorm).unwrap();
        // 320_000 bytes per row, padded to 320_000 (already a multiple of 256).
        assert_eq!(l.padded_bytes, 320_000);
        assert_eq!(l.rows_per_band(40_000, 256 << 20), Some(838));
        assert_eq!(l.rows_per_band(4, 256 << 20), Some(4));
        assert_eq!(l.rows_per_band(4, 1024), None);
    }

    #[test]
    fn bands_stay_under_fixed_budget_on_large_devices() {
        let l = RowLayout::new(40_000, TargetFormat::Rgba32Float).unwrap();
        let rows = l.rows_per_band(40_000, 1 << 40).unwrap();
        assert!(rows as u64 * l.padded_bytes as u64 <= MAX_STAGING_BAND_BYTES);
        assert_eq!(rows, 419);
    }

    #[test]
    fn row_larger_than_budget_still_reads_one_at_a_time() {
        let l = RowLayout::new(20_000_000, TargetFormat::Rgba32Float).unwrap();
        assert!(l.padded_bytes as u64 > MAX_STAGING_BAND_BYTES);
        assert_eq!(l.rows_per_band(10, 1 << 40), Some(1));
        assert_eq!(l.rows_per_band(10, MAX_STAGING_BAND_BYTES), None);
    }

    #[test]
    fn unorm16_row_decodes_verbatim() {
        let px: [u16; 8] = [1, 2, 3, 65535, 400, 500, 600, 65535];
        let bytes: Vec<u8> = px.iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut out = Vec::new();
        decode_row(TargetFormat::Rgba16Unorm, &bytes, &mut out);
        assert_eq!(out, vec![1, 2, 3, 400, 500, 600]);
    }

    #[test]
    fn float_row_is_quantized() {
        let px: [f32; 4] = [0.0, 0.5, 1.0, 1.0];
        let bytes: Vec<u8> = px.iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut out = Vec::new();
        decode_row(TargetFormat::Rgba32Float, &bytes, &mut out);
        assert_eq!(out, vec![0, 32768, 65535]);
    }

    #[test]
    fn half_float_row_is_widened_and_quantized() {
        let px = [0.0f32, 0.5, 1.0, 1.0].map(f16::from_f32);
        let bytes: Vec<u8> = px.iter().flat_map(|v| v.to_bits().to_le_bytes()).collect();
        let mut out = Vec::new();
        decode_row(TargetFormat::Rgba16Float, &bytes, &mut out);
        assert_eq!(out, vec![0, 32768, 65535]);
    }
}
