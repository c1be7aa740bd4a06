/// Backend family to request adapters from.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum BackendChoice {
    /// Let wgpu pick the best available backend.
    #[default]
    Auto,
    Vulkan,
    Metal,
    Dx12,
    Gl,
}

impl BackendChoice {
    pub fn backends(self) -> wgpu::Backends {
        match self {
            BackendChoice::Auto => wgpu::Backends::all(),
            BackendChoice::Vulkan => wgpu::Backends::VULKAN,
            BackendChoice::Metal => wgpu::Backends::METAL,
            BackendChoice::Dx12 => wgpu::Backends::DX12,
            BackendChoice::Gl => wgpu::Backends::GL,
        }
    }
}

/// How device limits are requested.
#[derive(Debug, Clone, Default)]
pub enum LimitsPolicy {
    /// Request everything the adapter supports. Needed for very large targets,
    /// since the wgpu defaults cap 2D textures at 8192 texels per side.
    #[default]
    Adapter,
    /// Request exactly these limits.
    Fixed(wgpu::Limits),
}

/// Initialization parameters for the headless GPU context.
///
/// Keep this structure small. Add flags only when a concrete adapter or
/// backend requirement exists.
#[derive(Debug, Clone)]
pub struct HeadlessInit {
    pub backend: BackendChoice,

    /// Adapter power preference.
    ///
    /// High performance by default; large targets are dominated by fill rate.
    pub power_preference: wgpu::PowerPreference,

    /// Request a software (fallback) adapter.
    pub force_fallback_adapter: bool,

    pub limits: LimitsPolicy,

    /// Use `Rgba16Unorm` targets when the adapter supports 16-bit normalized
    /// formats. Otherwise the first renderable of `Rgba32Float` and
    /// `Rgba16Float` is used.
    pub prefer_unorm16: bool,
}

impl Default for HeadlessInit {
    fn default() -> Self {
        Self {
            backend: BackendChoice::Auto,
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            limits: LimitsPolicy::Adapter,
            prefer_unorm16: true,
        }
    }
}
