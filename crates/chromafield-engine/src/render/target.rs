use crate::coords::Extent;
use crate::error::{RenderError, RenderResult};

/// Storage format of the off-screen color target.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TargetFormat {
    /// 16-bit normalized; read back samples are stored verbatim.
    Rgba16Unorm,
    /// 32-bit float; read back samples are quantized on the host.
    Rgba32Float,
    /// 16-bit float; widened to f32 and quantized on the host.
    Rgba16Float,
}

impl TargetFormat {
    /// Candidates in order of preference.
    pub const PREFERENCE: [TargetFormat; 3] = [
        TargetFormat::Rgba16Unorm,
        TargetFormat::Rgba32Float,
        TargetFormat::Rgba16Float,
    ];

    pub fn wgpu_format(self) -> wgpu::TextureFormat {
        match self {
            TargetFormat::Rgba16Unorm => wgpu::TextureFormat::Rgba16Unorm,
            TargetFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
            TargetFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
        }
    }

    #[inline]
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            TargetFormat::Rgba16Unorm | TargetFormat::Rgba16Float => 8,
            TargetFormat::Rgba32Float => 16,
        }
    }

    /// Usages a target format must allow: drawn into, then copied out.
    pub fn required_usages() -> wgpu::TextureUsages {
        wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC
    }

    /// Picks the first preferred format for which `allowed` reports the
    /// required usages. `Rgba16Unorm` is skipped unless `unorm16` is set.
    pub fn select(
        unorm16: bool,
        allowed: impl Fn(TargetFormat) -> wgpu::TextureUsages,
    ) -> Option<TargetFormat> {
        Self::PREFERENCE
            .into_iter()
            .filter(|&f| unorm16 || f != TargetFormat::Rgba16Unorm)
            .find(|&f| allowed(f).contains(Self::required_usages()))
    }
}

/// A render target request.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TargetDesc {
    pub extent: Extent,
    pub format: TargetFormat,
}

impl TargetDesc {
    /// Texture size in bytes, unpadded.
    pub fn byte_size(&self) -> u64 {
        self.extent.pixel_count() * self.format.bytes_per_pixel() as u64
    }
}

/// Rejects targets the device cannot hold.
///
/// This is the completeness check: a target passing it has exactly the
/// requested dimensions, never a clamped or truncated size.
pub fn check_target_size(desc: &TargetDesc, max_dimension_2d: u32) -> RenderResult<()> {
    let extent = desc.extent;
    if extent.width() > max_dimension_2d || extent.height() > max_dimension_2d {
        return Err(RenderError::TargetIncomplete {
            width: extent.width(),
            height: extent.height(),
            reason: format!(
                "exceeds the device maximum 2D texture dimension of {max_dimension_2d} px"
            ),
        });
    }
    Ok(())
}
