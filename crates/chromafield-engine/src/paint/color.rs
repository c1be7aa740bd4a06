/// Linear RGB color with channels nominally in `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Clamps every channel to `[0, 1]`.
    #[inline]
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    /// Quantizes to 16-bit samples the way a `Unorm16` target stores them.
    #[inline]
    pub fn to_unorm16(self) -> [u16; 3] {
        [
            quantize_unorm16(self.r),
            quantize_unorm16(self.g),
            quantize_unorm16(self.b),
        ]
    }
}

/// Converts a normalized float to a 16-bit unsigned normalized sample.
///
/// Values outside `[0, 1]` saturate; NaN maps to 0.
#[inline]
pub fn quantize_unorm16(c: f32) -> u16 {
    if c.is_nan() {
        return 0;
    }
    (c.clamp(0.0, 1.0) * 65535.0).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_endpoints() {
        assert_eq!(quantize_unorm16(0.0), 0);
        assert_eq!(quantize_unorm16(1.0), u16::MAX);
    }

    #[test]
    fn quantize_saturates_and_rejects_nan() {
        assert_eq!(quantize_unorm16(-0.25), 0);
        assert_eq!(quantize_unorm16(3.0), u16::MAX);
        assert_eq!(quantize_unorm16(f32::NAN), 0);
    }

    #[test]
    fn quantize_rounds_to_nearest() {
        // 0.6 * 65535 = 39321.0
        assert_eq!(quantize_unorm16(0.6), 39321);
        assert_eq!(quantize_unorm16(0.5), 32768);
    }

    #[test]
    fn clamped_limits_each_channel() {
        let c = Rgb::new(-1.0, 0.5, 1.2).clamped();
        assert_eq!(c, Rgb::new(0.0, 0.5, 1.0));
    }
}
