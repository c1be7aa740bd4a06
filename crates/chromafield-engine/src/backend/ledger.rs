use std::collections::HashSet;

use super::ResourceId;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    Program,
    Geometry,
    Target,
}

/// Allocation bookkeeping for one backend.
///
/// Ids are issued from a single counter so they never repeat within a backend.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    next_id: u64,
    live: HashSet<ResourceId>,
    acquired: usize,
    released: usize,
    stray_releases: usize,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh raw id.
    pub fn next_raw_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn acquire(&mut self, id: ResourceId) {
        let fresh = self.live.insert(id);
        debug_assert!(fresh, "{id:?} acquired twice");
        self.acquired += 1;
        log::debug!("acquired {id:?}");
    }

    /// Records a release. Returns `false` if `id` was not live.
    pub fn release(&mut self, id: ResourceId) -> bool {
        if self.live.remove(&id) {
            self.released += 1;
            log::debug!("released {id:?}");
            true
        } else {
            self.stray_releases += 1;
            log::warn!("release of {id:?} which is not live");
            false
        }
    }

    pub fn live(&self) -> usize {
        self.live.len()
    }

    pub fn live_of(&self, kind: ResourceKind) -> usize {
        self.live.iter().filter(|id| id.kind() == kind).count()
    }

    pub fn acquired(&self) -> usize {
        self.acquired
    }

    pub fn released(&self) -> usize {
        self.released
    }

    /// Releases of ids that were never acquired or already released.
    pub fn stray_releases(&self) -> usize {
        self.stray_releases
    }

    /// Everything acquired was released exactly once.
    pub fn is_balanced(&self) -> bool {
        self.live.is_empty() && self.acquired == self.released && self.stray_releases == 0
    }
}
