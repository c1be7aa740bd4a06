//! Render backends.
//!
//! A backend owns a rendering context and the resources created on it. The
//! job talks to it only through [`RenderBackend`], so tests can swap the GPU
//! for the software rasterizer or for an instrumented double.
//!
//! Every backend records acquisitions and releases in a [`ResourceLedger`].

mod ledger;
mod software;
mod wgpu_backend;

pub use ledger::{ResourceKind, ResourceLedger};
pub use software::SoftwareBackend;
pub use wgpu_backend::WgpuBackend;

use crate::coords::Extent;
use crate::error::RenderResult;
use crate::readback::PixelBuffer;
use crate::render::{CommandList, QuadMesh, ShaderProgramDesc};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(pub u64);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct GeometryId(pub u64);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TargetId(pub u64);

/// Any resource a backend hands out.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourceId {
    Program(ProgramId),
    Geometry(GeometryId),
    Target(TargetId),
}

impl ResourceId {
    pub fn kind(self) -> ResourceKind {
        match self {
            ResourceId::Program(_) => ResourceKind::Program,
            ResourceId::Geometry(_) => ResourceKind::Geometry,
            ResourceId::Target(_) => ResourceKind::Target,
        }
    }
}

impl From<ProgramId> for ResourceId {
    fn from(id: ProgramId) -> Self {
        ResourceId::Program(id)
    }
}

impl From<GeometryId> for ResourceId {
    fn from(id: GeometryId) -> Self {
        ResourceId::Geometry(id)
    }
}

impl From<TargetId> for ResourceId {
    fn from(id: TargetId) -> Self {
        ResourceId::Target(id)
    }
}

/// Static facts about a backend.
#[derive(Debug, Clone)]
pub struct BackendInfo {
    pub name: String,
    pub max_texture_dimension_2d: u32,
}

pub trait RenderBackend {
    fn info(&self) -> BackendInfo;

    /// Compiles and links a vertex + fragment program.
    fn create_program(&mut self, desc: &ShaderProgramDesc<'_>) -> RenderResult<ProgramId>;

    /// Uploads an indexed mesh.
    fn create_geometry(&mut self, mesh: &QuadMesh<'_>) -> RenderResult<GeometryId>;

    /// Allocates a color target of exactly `extent` and checks it is usable.
    fn create_target(&mut self, extent: Extent) -> RenderResult<TargetId>;

    /// Runs `commands` in order and returns one buffer per `ReadBack`.
    fn execute(&mut self, commands: &CommandList) -> RenderResult<Vec<PixelBuffer>>;

    /// Frees a resource. Releasing an unknown or already released id is a no-op
    /// that the ledger records.
    fn release(&mut self, id: ResourceId);

    fn ledger(&self) -> &ResourceLedger;
}

impl<B: RenderBackend + ?Sized> RenderBackend for Box<B> {
    fn info(&self) -> BackendInfo {
        (**self).info()
    }

    fn create_program(&mut self, desc: &ShaderProgramDesc<'_>) -> RenderResult<ProgramId> {
        (**self).create_program(desc)
    }

    fn create_geometry(&mut self, mesh: &QuadMesh<'_>) -> RenderResult<GeometryId> {
        (**self).create_geometry(mesh)
    }

    fn create_target(&mut self, extent: Extent) -> RenderResult<TargetId> {
        (**self).create_target(extent)
    }

    fn execute(&mut self, commands: &CommandList) -> RenderResult<Vec<PixelBuffer>> {
        (**self).execute(commands)
    }

    fn release(&mut self, id: ResourceId) {
        (**self).release(id)
    }

    fn ledger(&self) -> &ResourceLedger {
        (**self).ledger()
    }
}

impl<B: RenderBackend + ?Sized> RenderBackend for &mut B {
    fn info(&self) -> BackendInfo {
        (**self).info()
    }

    fn create_program(&mut self, desc: &ShaderProgramDesc<'_>) -> RenderResult<ProgramId> {
        (**self).create_program(desc)
    }

    fn create_geometry(&mut self, mesh: &QuadMesh<'_>) -> RenderResult<GeometryId> {
        (**self).create_geometry(mesh)
    }

    fn create_target(&mut self, extent: Extent) -> RenderResult<TargetId> {
        (**self).create_target(extent)
    }

    fn execute(&mut self, commands: &CommandList) -> RenderResult<Vec<PixelBuffer>> {
        (**self).execute(commands)
    }

    fn release(&mut self, id: ResourceId) {
        (**self).release(id)
    }

    fn ledger(&self) -> &ResourceLedger {
        (**self).ledger()
    }
}
