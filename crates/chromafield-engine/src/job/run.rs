use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::backend::{RenderBackend, SoftwareBackend, WgpuBackend};
use crate::coords::Extent;
use crate::error::{RenderError, RenderResult};
use crate::export::write_tiff;
use crate::readback::PixelBuffer;
use crate::render::{CommandList, QuadMesh, ShaderProgramDesc};

use super::{BackendKind, JobConfig, Session};

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub extent: Extent,
    pub output: PathBuf,
    pub backend: String,
    pub render_time: Duration,
    pub export_time: Duration,
}

impl JobReport {
    pub fn success_message(&self) -> String {
        format!(
            "Complex gradient image created successfully! Saved as '{}'.",
            self.output.display()
        )
    }
}

/// Opens the backend `kind` names.
pub fn open_backend(kind: &BackendKind) -> RenderResult<Box<dyn RenderBackend>> {
    Ok(match kind {
        BackendKind::Gpu(init) => Box::new(WgpuBackend::create(init.clone())?),
        BackendKind::Software => Box::new(SoftwareBackend::new()),
    })
}

/// Renders the gradient at `extent` and reads it back.
///
/// The target is released right after readback; program and geometry go when
/// the session drops, which also happens on every error path. The returned
/// buffer is in whatever row order the backend produced.
pub fn render_gradient<B: RenderBackend>(backend: B, extent: Extent) -> RenderResult<PixelBuffer> {
    let mut session = Session::new(backend);
    let info = session.backend().info();
    log::info!(
        "rendering {}x{} on {} (max 2D texture {} px)",
        extent.width(),
        extent.height(),
        info.name,
        info.max_texture_dimension_2d
    );

    let program = session.create_program(&ShaderProgramDesc::gradient())?;
    let mesh = QuadMesh::full_screen();
    let geometry = session.create_geometry(&mesh)?;
    let target = session.create_target(extent)?;

    let commands = CommandList::single_pass(target, program, geometry, mesh.index_count());
    let mut buffers = session.execute(&commands)?;
    session.release(target);

    let pixels = buffers
        .pop()
        .ok_or_else(|| RenderError::command("command list produced no readback"))?;
    if pixels.extent() != extent || !pixels.is_complete() {
        return Err(RenderError::Readback {
            width: extent.width(),
            height: extent.height(),
            reason: format!(
                "backend returned {}x{} with {} samples",
                pixels.extent().width(),
                pixels.extent().height(),
                pixels.samples().len()
            ),
        });
    }
    Ok(pixels)
}

/// Runs the whole job described by `config`.
///
/// Dimensions are validated before any backend is opened. GPU resources and
/// the context are gone before the file is encoded.
pub fn run(config: &JobConfig) -> RenderResult<JobReport> {
    let extent = Extent::new(config.width, config.height)?;

    let started = Instant::now();
    let backend = open_backend(&config.backend)?;
    let backend_name = backend.info().name;
    let pixels = render_gradient(backend, extent)?;
    let render_time = started.elapsed();
    log::info!("rendered and read back in {render_time:.2?}");

    let pixels = pixels.into_row_order(config.row_order);

    let started = Instant::now();
    write_tiff(pixels, &config.output)?;
    let export_time = started.elapsed();
    log::info!("encoded '{}' in {export_time:.2?}", config.output.display());

    Ok(JobReport {
        extent,
        output: config.output.clone(),
        backend: backend_name,
        render_time,
        export_time,
    })
}
