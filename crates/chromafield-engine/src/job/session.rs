use crate::backend::{GeometryId, ProgramId, RenderBackend, ResourceId, TargetId};
use crate::coords::Extent;
use crate::error::RenderResult;
use crate::readback::PixelBuffer;
use crate::render::{CommandList, QuadMesh, ShaderProgramDesc};

/// Scoped owner of a backend and everything created on it.
///
/// Resources are released in reverse creation order when the session drops,
/// on success and on every early return alike. The backend (and with it the
/// rendering context) is dropped after that.
pub struct Session<B: RenderBackend> {
    live: Vec<ResourceId>,
    backend: B,
}

impl<B: RenderBackend> Session<B> {
    pub fn new(backend: B) -> Self {
        Self {
            live: Vec::new(),
            backend,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resources still owned, oldest first.
    pub fn live(&self) -> &[ResourceId] {
        &self.live
    }

    pub fn create_program(&mut self, desc: &ShaderProgramDesc<'_>) -> RenderResult<ProgramId> {
        let id = self.backend.create_program(desc)?;
        self.live.push(id.into());
        Ok(id)
    }

    pub fn create_geometry(&mut self, mesh: &QuadMesh<'_>) -> RenderResult<GeometryId> {
        let id = self.backend.create_geometry(mesh)?;
        self.live.push(id.into());
        Ok(id)
    }

    pub fn create_target(&mut self, extent: Extent) -> RenderResult<TargetId> {
        let id = self.backend.create_target(extent)?;
        self.live.push(id.into());
        Ok(id)
    }

    pub fn execute(&mut self, commands: &CommandList) -> RenderResult<Vec<PixelBuffer>> {
        self.backend.execute(commands)
    }

    /// Releases one resource now. Ids this session does not own are ignored.
    pub fn release(&mut self, id: impl Into<ResourceId>) {
        let id = id.into();
        if let Some(pos) = self.live.iter().position(|&r| r == id) {
            self.live.remove(pos);
            self.backend.release(id);
        }
    }

    fn release_all(&mut self) {
        while let Some(id) = self.live.pop() {
            self.backend.release(id);
        }
    }
}

impl<B: RenderBackend> Drop for Session<B> {
    fn drop(&mut self) {
        if !self.live.is_empty() {
            log::debug!("session teardown: releasing {} resources", self.live.len());
        }
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ResourceKind, SoftwareBackend};

    #[test]
    fn drop_releases_in_reverse_order() {
        let mut backend = SoftwareBackend::new();
        {
            let mut session = Session::new(&mut backend);
            session.create_program(&ShaderProgramDesc::gradient()).unwrap();
            session.create_geometry(&QuadMesh::full_screen()).unwrap();
            session.create_target(Extent::new(2, 2).unwrap()).unwrap();
            assert_eq!(session.live().len(), 3);
            assert_eq!(session.live()[2].kind(), ResourceKind::Target);
        }
        assert!(backend.ledger().is_balanced());
        assert_eq!(backend.ledger().released(), 3);
    }

    #[test]
    fn explicit_release_is_not_repeated_on_drop() {
        let mut backend = SoftwareBackend::new();
        {
            let mut session = Session::new(&mut backend);
            let t = session.create_target(Extent::new(2, 2).unwrap()).unwrap();
            session.release(t);
            session.release(t);
            assert!(session.live().is_empty());
        }
        assert!(backend.ledger().is_balanced());
        assert_eq!(backend.ledger().stray_releases(), 0);
    }

    #[test]
    fn failed_creation_is_not_tracked() {
        let mut backend = SoftwareBackend::with_max_dimension(4);
        {
            let mut session = Session::new(&mut backend);
            session.create_program(&ShaderProgramDesc::gradient()).unwrap();
            assert!(session.create_target(Extent::new(5, 5).unwrap()).is_err());
            assert_eq!(session.live().len(), 1);
        }
        assert!(backend.ledger().is_balanced());
    }
}
