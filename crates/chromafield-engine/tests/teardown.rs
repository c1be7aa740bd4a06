//! Every resource is released exactly once, whichever stage fails.

use chromafield_engine::backend::{
    BackendInfo, GeometryId, ProgramId, RenderBackend, ResourceId, ResourceLedger,
    SoftwareBackend, TargetId,
};
use chromafield_engine::coords::Extent;
use chromafield_engine::job::render_gradient;
use chromafield_engine::readback::PixelBuffer;
use chromafield_engine::render::{CommandList, QuadMesh, ShaderProgramDesc};
use chromafield_engine::{RenderError, RenderResult, Stage};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    CreateProgram,
    CreateGeometry,
    CreateTarget,
    Execute,
    Release(ResourceId),
}

/// Software backend that records calls and can be told to fail one stage.
struct Instrumented {
    inner: SoftwareBackend,
    fail_at: Option<Stage>,
    calls: Vec<Call>,
}

impl Instrumented {
    fn new(fail_at: Option<Stage>) -> Self {
        Self {
            inner: SoftwareBackend::new(),
            fail_at,
            calls: Vec::new(),
        }
    }

    fn injected(&self, stage: Stage) -> RenderResult<()> {
        if self.fail_at != Some(stage) {
            return Ok(());
        }
        Err(match stage {
            Stage::Shader => RenderError::Shader {
                label: "injected".into(),
                diagnostic: "injected failure".into(),
            },
            Stage::Geometry => RenderError::Geometry {
                reason: "injected failure".into(),
            },
            _ => RenderError::Readback {
                width: 0,
                height: 0,
                reason: "injected failure".into(),
            },
        })
    }
}

impl RenderBackend for Instrumented {
    fn info(&self) -> BackendInfo {
        self.inner.info()
    }

    fn create_program(&mut self, desc: &ShaderProgramDesc<'_>) -> RenderResult<ProgramId> {
        self.calls.push(Call::CreateProgram);
        self.injected(Stage::Shader)?;
        self.inner.create_program(desc)
    }

    fn create_geometry(&mut self, mesh: &QuadMesh<'_>) -> RenderResult<GeometryId> {
        self.calls.push(Call::CreateGeometry);
        self.injected(Stage::Geometry)?;
        self.inner.create_geometry(mesh)
    }

    fn create_target(&mut self, extent: Extent) -> RenderResult<TargetId> {
        self.calls.push(Call::CreateTarget);
        self.inner.create_target(extent)
    }

    fn execute(&mut self, commands: &CommandList) -> RenderResult<Vec<PixelBuffer>> {
        self.calls.push(Call::Execute);
        self.injected(Stage::Readback)?;
        self.inner.execute(commands)
    }

    fn release(&mut self, id: ResourceId) {
        self.calls.push(Call::Release(id));
        self.inner.release(id);
    }

    fn ledger(&self) -> &ResourceLedger {
        self.inner.ledger()
    }
}

fn extent() -> Extent {
    Extent::new(8, 8).unwrap()
}

#[test]
fn success_path_releases_target_first_then_reverse_order() {
    let mut backend = Instrumented::new(None);
    render_gradient(&mut backend, extent()).unwrap();

    let releases: Vec<_> = backend
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::Release(id) => Some(*id),
            _ => None,
        })
        .collect();
    assert!(matches!(
        releases.as_slice(),
        [ResourceId::Target(_), ResourceId::Geometry(_), ResourceId::Program(_)]
    ));
    assert!(backend.ledger().is_balanced());
}

#[test]
fn shader_failure_leaks_nothing() {
    let mut backend = Instrumented::new(Some(Stage::Shader));
    let err = render_gradient(&mut backend, extent()).unwrap_err();
    assert_eq!(err.stage(), Stage::Shader);
    assert_eq!(backend.calls, vec![Call::CreateProgram]);
    assert!(backend.ledger().is_balanced());
}

#[test]
fn geometry_failure_releases_program() {
    let mut backend = Instrumented::new(Some(Stage::Geometry));
    let err = render_gradient(&mut backend, extent()).unwrap_err();
    assert_eq!(err.stage(), Stage::Geometry);
    assert_eq!(backend.ledger().acquired(), 1);
    assert!(backend.ledger().is_balanced());
}

#[test]
fn readback_failure_releases_everything() {
    let mut backend = Instrumented::new(Some(Stage::Readback));
    let err = render_gradient(&mut backend, extent()).unwrap_err();
    assert_eq!(err.stage(), Stage::Readback);
    assert_eq!(backend.ledger().acquired(), 3);
    assert_eq!(backend.ledger().released(), 3);
    assert!(backend.ledger().is_balanced());
}

#[test]
fn oversized_target_fails_at_completeness_check() {
    let mut backend = SoftwareBackend::with_max_dimension(16_384);
    let err = render_gradient(&mut backend, Extent::new(40_000, 40_000).unwrap()).unwrap_err();
    assert_eq!(err.stage(), Stage::Target);
    assert!(err.to_string().contains("40000x40000"), "{err}");
    assert!(backend.ledger().is_balanced());
}
