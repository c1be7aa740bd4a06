use std::collections::HashMap;
use std::sync::mpsc;

use wgpu::util::DeviceExt;

use crate::coords::Extent;
use crate::device::{HeadlessGpu, HeadlessInit};
use crate::error::{RenderError, RenderResult};
use crate::readback::{decode_row, PixelBuffer, RowLayout, RowOrder};
use crate::render::{
    check_target_size, ClearColor, CommandList, QuadMesh, QuadVertex, RenderCommand,
    ShaderProgramDesc, TargetDesc, TargetFormat,
};

use super::{
    BackendInfo, GeometryId, ProgramId, RenderBackend, ResourceId, ResourceLedger, TargetId,
};

struct GpuGeometry {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

struct GpuTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    desc: TargetDesc,
}

/// Renders on a real adapter through wgpu.
///
/// Field order matters: resource maps drop before `gpu`, so nothing outlives
/// the device.
pub struct WgpuBackend {
    programs: HashMap<ProgramId, wgpu::RenderPipeline>,
    geometries: HashMap<GeometryId, GpuGeometry>,
    targets: HashMap<TargetId, GpuTarget>,
    ledger: ResourceLedger,
    gpu: HeadlessGpu,
}

impl WgpuBackend {
    pub fn new(gpu: HeadlessGpu) -> Self {
        Self {
            programs: HashMap::new(),
            geometries: HashMap::new(),
            targets: HashMap::new(),
            ledger: ResourceLedger::new(),
            gpu,
        }
    }

    /// Acquires a headless context and wraps it.
    pub fn create(init: HeadlessInit) -> RenderResult<Self> {
        HeadlessGpu::create(init).map(Self::new)
    }

    fn target_format(&self) -> TargetFormat {
        self.gpu.target_format()
    }

    /// Records one render pass. `body` is everything between `BeginPass` and `EndPass`.
    fn record_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: TargetId,
        clear: ClearColor,
        body: &[RenderCommand],
    ) -> RenderResult<()> {
        let t = self
            .targets
            .get(&target)
            .ok_or_else(|| RenderError::command(format!("unknown {target:?}")))?;

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("chromafield gradient pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &t.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let mut bound_indices = 0u32;
        for cmd in body {
            match *cmd {
                RenderCommand::SetProgram(id) => {
                    let pipeline = self
                        .programs
                        .get(&id)
                        .ok_or_else(|| RenderError::command(format!("unknown {id:?}")))?;
                    rpass.set_pipeline(pipeline);
                }
                RenderCommand::SetGeometry(id) => {
                    let g = self
                        .geometries
                        .get(&id)
                        .ok_or_else(|| RenderError::command(format!("unknown {id:?}")))?;
                    rpass.set_vertex_buffer(0, g.vbo.slice(..));
                    rpass.set_index_buffer(g.ibo.slice(..), wgpu::IndexFormat::Uint32);
                    bound_indices = g.index_count;
                }
                RenderCommand::DrawIndexed { indices } => {
                    if indices > bound_indices {
                        return Err(RenderError::command(format!(
                            "draw of {indices} indices exceeds the {bound_indices} bound"
                        )));
                    }
                    rpass.draw_indexed(0..indices, 0, 0..1);
                }
                other => {
                    return Err(RenderError::command(format!("{other:?} inside a pass")));
                }
            }
        }
        Ok(())
    }

    /// Copies a target to host memory, one band of rows per staging-buffer fill.
    fn read_target(&self, t: &GpuTarget) -> RenderResult<PixelBuffer> {
        let extent = t.desc.extent;
        let format = t.desc.format;
        let readback_error = |reason: String| RenderError::Readback {
            width: extent.width(),
            height: extent.height(),
            reason,
        };

        let layout = RowLayout::new(extent.width(), format)
            .ok_or_else(|| readback_error("row size overflows u32".into()))?;
        let band_rows = layout
            .rows_per_band(extent.height(), self.gpu.limits().max_buffer_size)
            .ok_or_else(|| {
                readback_error(format!(
                    "a single {}-byte row exceeds the device buffer limit",
                    layout.padded_bytes
                ))
            })?;

        let mut pixels = PixelBuffer::try_alloc(extent, RowOrder::TopDown)?;

        let device = self.gpu.device();
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("chromafield readback staging"),
            size: layout.padded_bytes as u64 * band_rows as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut row = Vec::with_capacity(extent.width() as usize * 3);
        let mut y = 0;
        while y < extent.height() {
            let rows = band_rows.min(extent.height() - y);
            log::debug!("reading rows {y}..{} of {}", y + rows, extent.height());

            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("chromafield readback encoder"),
            });
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    texture: &t.texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d { x: 0, y, z: 0 },
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: &staging,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(layout.padded_bytes),
                        rows_per_image: Some(rows),
                    },
                },
                wgpu::Extent3d {
                    width: extent.width(),
                    height: rows,
                    depth_or_array_layers: 1,
                },
            );
            self.gpu.queue().submit(std::iter::once(encoder.finish()));

            let band_bytes = layout.padded_bytes as u64 * rows as u64;
            let slice = staging.slice(..band_bytes);
            let (tx, rx) = mpsc::channel();
            slice.map_async(wgpu::MapMode::Read, move |res| {
                // Receiver outlives the poll below; a send failure cannot happen.
                let _ = tx.send(res);
            });
            self.gpu
                .wait_idle()
                .map_err(|e| readback_error(format!("{e:#}")))?;
            rx.recv()
                .map_err(|e| readback_error(format!("map callback dropped: {e}")))?
                .map_err(|e| readback_error(format!("staging map failed: {e}")))?;

            {
                let data = slice.get_mapped_range();
                for padded in data.chunks_exact(layout.padded_bytes as usize) {
                    row.clear();
                    decode_row(format, &padded[..layout.unpadded_bytes as usize], &mut row);
                    pixels.push_row(&row);
                }
            }
            staging.unmap();
            y += rows;
        }

        staging.destroy();
        Ok(pixels)
    }
}

/// Runs `f` inside a validation error scope and returns the first error it raised.
fn capture_validation<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    let error = pollster::block_on(scope.pop());
    (value, error)
}

/// Like [`capture_validation`], for out-of-memory errors.
fn capture_oom<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
    let scope = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let value = f();
    let error = pollster::block_on(scope.pop());
    (value, error)
}

impl RenderBackend for WgpuBackend {
    fn info(&self) -> BackendInfo {
        let summary = self.gpu.summary();
        BackendInfo {
            name: format!("{} ({:?})", summary.name, summary.backend),
            max_texture_dimension_2d: summary.max_texture_dimension_2d,
        }
    }

    fn create_program(&mut self, desc: &ShaderProgramDesc<'_>) -> RenderResult<ProgramId> {
        let shader_error = |diagnostic: String| RenderError::Shader {
            label: desc.label.to_owned(),
            diagnostic,
        };
        desc.declared_entry_points().map_err(shader_error)?;

        let device = self.gpu.device();
        let format = self.target_format().wgpu_format();

        let ((pipeline, diagnostics), error) = capture_validation(device, || {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(desc.label),
                source: wgpu::ShaderSource::Wgsl(desc.wgsl.into()),
            });

            let info = pollster::block_on(shader.get_compilation_info());
            let diagnostics: Vec<String> = info
                .messages
                .iter()
                .filter(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error))
                .map(|m| match &m.location {
                    Some(loc) => {
                        format!("{}:{}: {}", loc.line_number, loc.line_position, m.message)
                    }
                    None => m.message.clone(),
                })
                .collect();

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("chromafield pipeline layout"),
                bind_group_layouts: &[],
                immediate_size: 0,
            });

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(desc.vertex_entry),
                    compilation_options: Default::default(),
                    buffers: &[QuadVertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(desc.fragment_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

            (pipeline, diagnostics)
        });

        if !diagnostics.is_empty() {
            return Err(shader_error(diagnostics.join("\n")));
        }
        if let Some(e) = error {
            return Err(shader_error(e.to_string()));
        }

        let id = ProgramId(self.ledger.next_raw_id());
        self.programs.insert(id, pipeline);
        self.ledger.acquire(id.into());
        Ok(id)
    }

    fn create_geometry(&mut self, mesh: &QuadMesh<'_>) -> RenderResult<GeometryId> {
        mesh.validate()?;
        let device = self.gpu.device();

        let (geometry, error) = capture_validation(device, || GpuGeometry {
            vbo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("chromafield quad vbo"),
                contents: bytemuck::cast_slice(mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            ibo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("chromafield quad ibo"),
                contents: bytemuck::cast_slice(mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: mesh.index_count(),
        });
        if let Some(e) = error {
            return Err(RenderError::Geometry {
                reason: e.to_string(),
            });
        }

        let id = GeometryId(self.ledger.next_raw_id());
        self.geometries.insert(id, geometry);
        self.ledger.acquire(id.into());
        Ok(id)
    }

    fn create_target(&mut self, extent: Extent) -> RenderResult<TargetId> {
        let desc = TargetDesc {
            extent,
            format: self.target_format(),
        };
        check_target_size(&desc, self.gpu.limits().max_texture_dimension_2d)?;

        let device = self.gpu.device();
        let ((texture, oom), invalid) = capture_validation(device, || {
            capture_oom(device, || {
                device.create_texture(&wgpu::TextureDescriptor {
                    label: Some("chromafield color target"),
                    size: wgpu::Extent3d {
                        width: extent.width(),
                        height: extent.height(),
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: desc.format.wgpu_format(),
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::COPY_SRC,
                    view_formats: &[],
                })
            })
        });

        if let Some(e) = oom.or(invalid) {
            texture.destroy();
            return Err(RenderError::TargetIncomplete {
                width: extent.width(),
                height: extent.height(),
                reason: e.to_string(),
            });
        }

        log::debug!(
            "allocated {}x{} {:?} target ({} bytes)",
            extent.width(),
            extent.height(),
            desc.format,
            desc.byte_size()
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let id = TargetId(self.ledger.next_raw_id());
        self.targets.insert(id, GpuTarget { texture, view, desc });
        self.ledger.acquire(id.into());
        Ok(id)
    }

    fn execute(&mut self, commands: &CommandList) -> RenderResult<Vec<PixelBuffer>> {
        commands.validate()?;

        let cmds: Vec<RenderCommand> = commands.iter().copied().collect();
        let device = self.gpu.device();
        let new_encoder = || {
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("chromafield frame encoder"),
            })
        };

        let mut out = Vec::new();
        let mut encoder = new_encoder();
        let mut i = 0;
        while i < cmds.len() {
            match cmds[i] {
                RenderCommand::BeginPass { target, clear } => {
                    // validate() guarantees the matching EndPass exists.
                    let end = cmds[i..]
                        .iter()
                        .position(|c| matches!(c, RenderCommand::EndPass))
                        .map(|p| i + p)
                        .ok_or_else(|| RenderError::command("pass never ends"))?;
                    self.record_pass(&mut encoder, target, clear, &cmds[i + 1..end])?;
                    i = end + 1;
                }
                RenderCommand::ReadBack { target } => {
                    let finished = std::mem::replace(&mut encoder, new_encoder());
                    self.gpu.queue().submit(std::iter::once(finished.finish()));

                    let t = self
                        .targets
                        .get(&target)
                        .ok_or_else(|| RenderError::command(format!("unknown {target:?}")))?;
                    out.push(self.read_target(t)?);
                    i += 1;
                }
                other => {
                    return Err(RenderError::command(format!("{other:?} outside a pass")));
                }
            }
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        Ok(out)
    }

    fn release(&mut self, id: ResourceId) {
        match id {
            ResourceId::Program(p) => {
                self.programs.remove(&p);
            }
            ResourceId::Geometry(g) => {
                if let Some(g) = self.geometries.remove(&g) {
                    g.vbo.destroy();
                    g.ibo.destroy();
                }
            }
            ResourceId::Target(t) => {
                if let Some(t) = self.targets.remove(&t) {
                    drop(t.view);
                    t.texture.destroy();
                }
            }
        }
        self.ledger.release(id);
    }

    fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }
}
