// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use parking_lot::RwLockReadGuard;

use crate::tree::{Revision, Snapshot};

/// Scoped guard holding a surface at its current revision.
///
/// While a `RevisionLock` is alive, commits to its surface block before
/// publishing a new tree and resume once it drops. Taking the lock may
/// itself wait briefly for a commit that is swapping its tree in. Other
/// reads of the surface stay available while the guard is held, even with a
/// commit waiting.
///
/// Committing to the same surface from the thread holding the lock
/// deadlocks.
#[must_use = "the revision is only held while the guard is alive"]
pub struct RevisionLock<'a> {
    guard: RwLockReadGuard<'a, Option<Arc<Snapshot>>>,
}

impl<'a> RevisionLock<'a> {
    pub(crate) fn new(guard: RwLockReadGuard<'a, Option<Arc<Snapshot>>>) -> Self {
        Self { guard }
    }

    /// The held snapshot, `None` if nothing has been committed.
    #[must_use]
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        self.guard.as_ref()
    }

    /// The held revision.
    #[must_use]
    pub fn revision(&self) -> Revision {
        self.guard
            .as_ref()
            .map_or(Revision::INITIAL, |snapshot| snapshot.revision())
    }
}

impl core::fmt::Debug for RevisionLock<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RevisionLock")
            .field("revision", &self.revision())
            .finish()
    }
}
