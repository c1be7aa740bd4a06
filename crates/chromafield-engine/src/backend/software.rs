//! CPU rasterizer for the gradient program.
//!
//! Rasterizes the uploaded triangles with edge functions at pixel centers and
//! shades covered pixels with [`paint::gradient::shade`]. Output is what a
//! `Rgba16Unorm` GPU target would hold, read back top-down.

use std::collections::HashMap;

use crate::coords::{Extent, Uv};
use crate::error::{RenderError, RenderResult};
use crate::paint::{gradient, Rgb};
use crate::readback::{PixelBuffer, RowOrder};
use crate::render::{CommandList, QuadMesh, RenderCommand, ShaderProgramDesc};

use super::{
    BackendInfo, GeometryId, ProgramId, RenderBackend, ResourceId, ResourceLedger, TargetId,
};

/// Largest side the software backend accepts unless configured otherwise.
pub const DEFAULT_MAX_DIMENSION: u32 = 16_384;

type ShadeFn = fn(Uv) -> Rgb;

struct SoftTarget {
    extent: Extent,
    /// Top-down, quantized.
    texels: Vec<[u16; 3]>,
}

struct SoftGeometry {
    triangles: Vec<[[f32; 2]; 3]>,
    index_count: u32,
}

pub struct SoftwareBackend {
    max_dimension: u32,
    programs: HashMap<ProgramId, ShadeFn>,
    geometries: HashMap<GeometryId, SoftGeometry>,
    targets: HashMap<TargetId, SoftTarget>,
    ledger: ResourceLedger,
}

impl Default for SoftwareBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self::with_max_dimension(DEFAULT_MAX_DIMENSION)
    }

    /// Caps target sides at `max_dimension`, like a device texture limit.
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension,
            programs: HashMap::new(),
            geometries: HashMap::new(),
            targets: HashMap::new(),
            ledger: ResourceLedger::new(),
        }
    }

    fn draw(
        target: &mut SoftTarget,
        shade: ShadeFn,
        geometry: &SoftGeometry,
        indices: u32,
    ) -> RenderResult<()> {
        if indices > geometry.index_count {
            return Err(RenderError::command(format!(
                "draw of {indices} indices exceeds the {} bound",
                geometry.index_count
            )));
        }

        let extent = target.extent;
        let tris = &geometry.triangles[..(indices / 3) as usize];
        for row in 0..extent.height() {
            for column in 0..extent.width() {
                let uv = extent.pixel_center_uv(column, row);
                let p = [uv.x * 2.0 - 1.0, uv.y * 2.0 - 1.0];
                if tris.iter().any(|t| covers(*t, p)) {
                    // uv is affine in position, so interpolating it at the
                    // pixel center gives the center's own mapping.
                    let idx = row as usize * extent.width() as usize + column as usize;
                    target.texels[idx] = shade(uv).to_unorm16();
                }
            }
        }
        Ok(())
    }

    fn read(target: &SoftTarget) -> RenderResult<PixelBuffer> {
        let mut buf = PixelBuffer::try_alloc(target.extent, RowOrder::TopDown)?;
        let mut row = Vec::with_capacity(target.extent.width() as usize * 3);
        for texels in target.texels.chunks_exact(target.extent.width() as usize) {
            row.clear();
            row.extend(texels.iter().flatten());
            buf.push_row(&row);
        }
        Ok(buf)
    }
}

/// Edge-function coverage test, winding-agnostic, edges inclusive.
fn covers(t: [[f32; 2]; 3], p: [f32; 2]) -> bool {
    let edge = |a: [f32; 2], b: [f32; 2]| (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0]);
    let e0 = edge(t[0], t[1]);
    let e1 = edge(t[1], t[2]);
    let e2 = edge(t[2], t[0]);
    (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0) || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0)
}

impl RenderBackend for SoftwareBackend {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "software".into(),
            max_texture_dimension_2d: self.max_dimension,
        }
    }

    fn create_program(&mut self, desc: &ShaderProgramDesc<'_>) -> RenderResult<ProgramId> {
        let shader_error = |diagnostic: String| RenderError::Shader {
            label: desc.label.to_owned(),
            diagnostic,
        };
        desc.declared_entry_points().map_err(shader_error)?;
        if desc.wgsl != ShaderProgramDesc::gradient().wgsl {
            return Err(shader_error(
                "the software backend only runs the built-in gradient program".into(),
            ));
        }

        let id = ProgramId(self.ledger.next_raw_id());
        self.programs.insert(id, gradient::shade);
        self.ledger.acquire(id.into());
        Ok(id)
    }

    fn create_geometry(&mut self, mesh: &QuadMesh<'_>) -> RenderResult<GeometryId> {
        mesh.validate()?;
        let id = GeometryId(self.ledger.next_raw_id());
        self.geometries.insert(
            id,
            SoftGeometry {
                triangles: mesh.triangles().collect(),
                index_count: mesh.index_count(),
            },
        );
        self.ledger.acquire(id.into());
        Ok(id)
    }

    fn create_target(&mut self, extent: Extent) -> RenderResult<TargetId> {
        let incomplete = |reason: String| RenderError::TargetIncomplete {
            width: extent.width(),
            height: extent.height(),
            reason,
        };

        if extent.max_side() > self.max_dimension {
            return Err(incomplete(format!(
                "exceeds the maximum 2D texture dimension of {} px",
                self.max_dimension
            )));
        }

        let len = usize::try_from(extent.pixel_count())
            .map_err(|_| incomplete("texel count overflows the address space".into()))?;
        let mut texels = Vec::new();
        texels
            .try_reserve_exact(len)
            .map_err(|e| incomplete(format!("out of memory: {e}")))?;
        texels.resize(len, [0; 3]);

        let id = TargetId(self.ledger.next_raw_id());
        self.targets.insert(id, SoftTarget { extent, texels });
        self.ledger.acquire(id.into());
        Ok(id)
    }

    fn execute(&mut self, commands: &CommandList) -> RenderResult<Vec<PixelBuffer>> {
        commands.validate()?;

        let mut out = Vec::new();
        let mut pass: Option<TargetId> = None;
        let mut program: Option<ShadeFn> = None;
        let mut geometry: Option<GeometryId> = None;

        for cmd in commands.iter() {
            match *cmd {
                RenderCommand::BeginPass { target, clear } => {
                    let t = self
                        .targets
                        .get_mut(&target)
                        .ok_or_else(|| RenderError::command(format!("unknown {target:?}")))?;
                    let c = Rgb::new(clear.r as f32, clear.g as f32, clear.b as f32);
                    t.texels.fill(c.to_unorm16());
                    pass = Some(target);
                }
                RenderCommand::SetProgram(id) => {
                    let shade = self
                        .programs
                        .get(&id)
                        .ok_or_else(|| RenderError::command(format!("unknown {id:?}")))?;
                    program = Some(*shade);
                }
                RenderCommand::SetGeometry(id) => {
                    if !self.geometries.contains_key(&id) {
                        return Err(RenderError::command(format!("unknown {id:?}")));
                    }
                    geometry = Some(id);
                }
                RenderCommand::DrawIndexed { indices } => {
                    // validate() guarantees all three are bound here.
                    let (Some(target), Some(shade), Some(geometry)) = (pass, program, geometry)
                    else {
                        return Err(RenderError::command("draw without bindings"));
                    };
                    let (Some(t), Some(g)) =
                        (self.targets.get_mut(&target), self.geometries.get(&geometry))
                    else {
                        return Err(RenderError::command("draw on a released resource"));
                    };
                    Self::draw(t, shade, g, indices)?;
                }
                RenderCommand::EndPass => {
                    pass = None;
                    program = None;
                    geometry = None;
                }
                RenderCommand::ReadBack { target } => {
                    let t = self
                        .targets
                        .get(&target)
                        .ok_or_else(|| RenderError::command(format!("unknown {target:?}")))?;
                    out.push(Self::read(t)?);
                }
            }
        }
        Ok(out)
    }

    fn release(&mut self, id: ResourceId) {
        match id {
            ResourceId::Program(p) => {
                self.programs.remove(&p);
            }
            ResourceId::Geometry(g) => {
                self.geometries.remove(&g);
            }
            ResourceId::Target(t) => {
                self.targets.remove(&t);
            }
        }
        self.ledger.release(id);
    }

    fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }
}
