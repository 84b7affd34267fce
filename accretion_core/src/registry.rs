// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thread-safe map of live surfaces.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::mounting::SurfaceTree;
use crate::tree::SurfaceId;

/// The live [`SurfaceTree`]s, at most one per [`SurfaceId`].
///
/// `add` and `remove` take the map exclusively; `visit`, `visit_map`, and
/// `enumerate` hold it shared for the duration of their callback, so a tree
/// cannot be removed while a callback is using it. Callbacks must not call
/// back into `add` or `remove` on the same registry.
///
/// A registry must be emptied before it is dropped. Dropping one with live
/// surfaces panics when debug assertions are on and logs a warning
/// otherwise.
#[derive(Default)]
pub struct TreeRegistry {
    surfaces: RwLock<HashMap<SurfaceId, Arc<SurfaceTree>>>,
}

impl TreeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tree`.
    ///
    /// Returns `false`, leaving the existing entry in place, if its surface is
    /// already registered.
    pub fn add(&self, tree: Arc<SurfaceTree>) -> bool {
        let surface_id = tree.surface_id();
        let mut surfaces = self.surfaces.write();
        if surfaces.contains_key(&surface_id) {
            return false;
        }
        surfaces.insert(surface_id, tree);
        debug!(surface = %surface_id, live = surfaces.len(), "registered surface");
        true
    }

    /// Unregisters and returns the surface's tree, or `None` if unknown.
    pub fn remove(&self, surface_id: SurfaceId) -> Option<Arc<SurfaceTree>> {
        let mut surfaces = self.surfaces.write();
        let tree = surfaces.remove(&surface_id)?;
        debug!(surface = %surface_id, live = surfaces.len(), "unregistered surface");
        Some(tree)
    }

    /// Unregisters every surface.
    pub fn drain(&self) -> Vec<Arc<SurfaceTree>> {
        let drained: Vec<_> = self.surfaces.write().drain().map(|(_, tree)| tree).collect();
        if !drained.is_empty() {
            debug!(count = drained.len(), "unregistered all surfaces");
        }
        drained
    }

    /// Calls `f` with the surface's tree while holding the map shared.
    ///
    /// Returns `false` without calling `f` if the surface is unknown.
    pub fn visit(&self, surface_id: SurfaceId, f: impl FnOnce(&SurfaceTree)) -> bool {
        self.visit_map(surface_id, f).is_some()
    }

    /// Like [`visit`](Self::visit), returning `f`'s result.
    pub fn visit_map<R>(
        &self,
        surface_id: SurfaceId,
        f: impl FnOnce(&SurfaceTree) -> R,
    ) -> Option<R> {
        let surfaces = self.surfaces.read();
        let tree = surfaces.get(&surface_id)?;
        Some(f(tree))
    }

    /// Calls `f` for every live surface while holding the map shared.
    ///
    /// Iteration order is unspecified.
    pub fn enumerate(&self, mut f: impl FnMut(&SurfaceTree)) {
        for tree in self.surfaces.read().values() {
            f(tree);
        }
    }

    /// Returns a handle to the surface's tree.
    ///
    /// The handle stays usable after the surface is removed.
    #[must_use]
    pub fn get(&self, surface_id: SurfaceId) -> Option<Arc<SurfaceTree>> {
        self.surfaces.read().get(&surface_id).cloned()
    }

    /// Number of live surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.read().len()
    }

    /// Whether no surface is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.read().is_empty()
    }
}

impl Drop for TreeRegistry {
    fn drop(&mut self) {
        let live = self.surfaces.get_mut().len();
        if live == 0 {
            return;
        }
        if cfg!(debug_assertions) && !std::thread::panicking() {
            panic!("tree registry dropped with {live} live surfaces");
        }
        warn!(live, "tree registry dropped with live surfaces");
    }
}

impl fmt::Debug for TreeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let surfaces = self.surfaces.read();
        let mut ids: Vec<SurfaceId> = surfaces.keys().copied().collect();
        ids.sort_unstable();
        f.debug_struct("TreeRegistry")
            .field("surfaces", &ids)
            .finish()
    }
}
