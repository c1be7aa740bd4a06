use anyhow::{Context, Result};

use crate::error::{RenderError, RenderResult};
use crate::render::TargetFormat;

use super::{HeadlessInit, LimitsPolicy};

/// What was selected, for logs and error messages.
#[derive(Debug, Clone)]
pub struct AdapterSummary {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension_2d: u32,
    pub max_buffer_size: u64,
}

/// Owns the wgpu device and queue for off-screen work.
///
/// There is no surface and no window: the only color attachments ever used are
/// textures created by the caller. Dropping this value releases the device.
pub struct HeadlessGpu {
    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Limits the device was created with.
    limits: wgpu::Limits,

    /// Storage format for render targets on this adapter.
    target_format: TargetFormat,

    summary: AdapterSummary,
}

impl HeadlessGpu {
    /// Creates a headless GPU context.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: HeadlessInit) -> Result<Self> {
        let HeadlessInit {
            backend,
            power_preference,
            force_fallback_adapter,
            limits,
            prefer_unorm16,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: backend.backends(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter,
            })
            .await
            .with_context(|| format!("no GPU adapter available for backend {backend:?}"))?;

        let info = adapter.get_info();
        let adapter_features = adapter.features();

        let unorm16 = prefer_unorm16
            && adapter_features.contains(wgpu::Features::TEXTURE_FORMAT_16BIT_NORM);
        let target_format = TargetFormat::select(unorm16, |f| {
            adapter
                .get_texture_format_features(f.wgpu_format())
                .allowed_usages
        })
        .with_context(|| {
            format!(
                "adapter {} ({:?}) cannot render to and copy from any of {:?}",
                info.name,
                info.backend,
                TargetFormat::PREFERENCE
            )
        })?;

        let required_features = if target_format == TargetFormat::Rgba16Unorm {
            wgpu::Features::TEXTURE_FORMAT_16BIT_NORM
        } else {
            wgpu::Features::empty()
        };

        let required_limits = match limits {
            LimitsPolicy::Adapter => adapter.limits(),
            LimitsPolicy::Fixed(l) => l,
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("chromafield device"),
                required_features,
                required_limits: required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let limits = device.limits();
        let summary = AdapterSummary {
            name: info.name,
            backend: info.backend,
            device_type: info.device_type,
            max_texture_dimension_2d: limits.max_texture_dimension_2d,
            max_buffer_size: limits.max_buffer_size,
        };

        log::info!(
            "adapter: {} ({:?}, {:?}); max 2D texture {} px, max buffer {} bytes; target format {:?}",
            summary.name,
            summary.backend,
            summary.device_type,
            summary.max_texture_dimension_2d,
            summary.max_buffer_size,
            target_format,
        );

        Ok(Self {
            device,
            queue,
            limits,
            target_format,
            summary,
        })
    }

    /// Blocking constructor mapping failures into the context error class.
    pub fn create(init: HeadlessInit) -> RenderResult<Self> {
        pollster::block_on(Self::new(init)).map_err(|e| RenderError::context(format!("{e:#}")))
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn limits(&self) -> &wgpu::Limits {
        &self.limits
    }

    pub fn target_format(&self) -> TargetFormat {
        self.target_format
    }

    pub fn summary(&self) -> &AdapterSummary {
        &self.summary
    }

    /// Blocks until all submitted work and pending map callbacks have completed.
    pub fn wait_idle(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map(|_| ())
            .context("device poll failed")
    }
}

impl Drop for HeadlessGpu {
    fn drop(&mut self) {
        if let Err(e) = self.wait_idle() {
            log::warn!("GPU not idle at teardown: {e:#}");
        }
        log::debug!("GPU context released ({})", self.summary.name);
    }
}
