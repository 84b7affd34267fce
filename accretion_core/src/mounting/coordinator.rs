// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry-backed commit and mount entry points.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use super::{
    CommitError, CommitOptions, Mounter, MountingConfig, RevisionLock, SurfaceTree, Transaction,
};
use crate::registry::TreeRegistry;
use crate::telemetry::{AggregatedTelemetry, TransactionTelemetry};
use crate::tree::{Node, Revision, SurfaceId};

/// Routes commits and pulls to per-surface [`SurfaceTree`]s in a
/// [`TreeRegistry`].
///
/// Surfaces are created on their first commit and live until
/// [`stop_surface`](Self::stop_surface). The registry is an explicit value,
/// so independent coordinators (and tests) never share state.
#[derive(Debug)]
pub struct MountingCoordinator {
    registry: Arc<TreeRegistry>,
    config: MountingConfig,
}

impl MountingCoordinator {
    /// Creates a coordinator over `registry`.
    #[must_use]
    pub fn new(registry: Arc<TreeRegistry>, config: MountingConfig) -> Self {
        Self { registry, config }
    }

    /// The backing registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<TreeRegistry> {
        &self.registry
    }

    /// The configuration new surfaces are created with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> MountingConfig {
        self.config
    }

    /// Returns the surface's tree, creating and registering it if needed.
    fn surface(&self, surface_id: SurfaceId) -> Arc<SurfaceTree> {
        loop {
            if let Some(tree) = self.registry.get(surface_id) {
                return tree;
            }
            let tree = Arc::new(SurfaceTree::new(surface_id, self.config));
            if self.registry.add(tree.clone()) {
                debug!(surface = %surface_id, "started surface");
                return tree;
            }
        }
    }

    /// Commits `root` to `surface_id`. See [`SurfaceTree::commit_with`].
    ///
    /// # Errors
    ///
    /// Returns a [`CommitError`] if the tree is rejected.
    pub fn commit(&self, surface_id: SurfaceId, root: Node) -> Result<Revision, CommitError> {
        self.commit_with(surface_id, root, CommitOptions::default())
    }

    /// Commits `root` to `surface_id` with `options`.
    ///
    /// # Errors
    ///
    /// Returns a [`CommitError`] if the tree is rejected.
    pub fn commit_with(
        &self,
        surface_id: SurfaceId,
        root: Node,
        options: CommitOptions,
    ) -> Result<Revision, CommitError> {
        self.surface(surface_id).commit_with(root, options)
    }

    /// Unmounts a surface's content by committing its root with no children.
    ///
    /// Returns `Ok(None)` for a surface with nothing committed.
    ///
    /// # Errors
    ///
    /// Returns a [`CommitError`] if the commit is rejected.
    pub fn commit_empty(&self, surface_id: SurfaceId) -> Result<Option<Revision>, CommitError> {
        match self.registry.get(surface_id) {
            Some(tree) => tree.commit_empty(),
            None => Ok(None),
        }
    }

    /// Takes the surface's pending transaction. Never blocks on commits.
    pub fn pull_transaction(&self, surface_id: SurfaceId) -> Option<Transaction> {
        self.registry
            .visit_map(surface_id, SurfaceTree::pull_transaction)
            .flatten()
    }

    /// Waits up to `timeout` for a transaction on the surface.
    ///
    /// Returns `None` at once for an unknown surface.
    pub fn wait_for_transaction(
        &self,
        surface_id: SurfaceId,
        timeout: Duration,
    ) -> Option<Transaction> {
        self.registry
            .get(surface_id)?
            .wait_for_transaction(timeout)
    }

    /// Pulls the pending transaction, applies it with `mounter`, and records
    /// the mount stage.
    ///
    /// Returns the completed telemetry record, or `None` if nothing was
    /// pending.
    ///
    /// # Errors
    ///
    /// Returns the mounter's error. The transaction is consumed either way
    /// and the mount stage is not recorded.
    pub fn pull_and_mount<M: Mounter>(
        &self,
        surface_id: SurfaceId,
        mounter: &mut M,
    ) -> Result<Option<TransactionTelemetry>, M::Error> {
        let Some(mut transaction) = self.pull_transaction(surface_id) else {
            return Ok(None);
        };
        let mount_start = Instant::now();
        mounter.apply(&transaction)?;
        transaction
            .telemetry_mut()
            .record_mount(mount_start, mount_start.elapsed());

        let telemetry = *transaction.telemetry();
        self.report_mount_telemetry(surface_id, &telemetry);
        Ok(Some(telemetry))
    }

    /// Runs `f` with the surface held at its current revision.
    ///
    /// Returns `None` for an unknown surface. `f` must not commit to the same
    /// surface.
    pub fn with_revision_lock<R>(
        &self,
        surface_id: SurfaceId,
        f: impl FnOnce(&RevisionLock<'_>) -> R,
    ) -> Option<R> {
        let tree = self.registry.get(surface_id)?;
        let lock = tree.revision_lock();
        Some(f(&lock))
    }

    /// Records the mount stage of a pulled transaction.
    ///
    /// Returns `false` if the surface is gone.
    pub fn report_mount_telemetry(
        &self,
        surface_id: SurfaceId,
        telemetry: &TransactionTelemetry,
    ) -> bool {
        self.registry
            .visit(surface_id, |tree| tree.report_mount_telemetry(telemetry))
    }

    /// Running telemetry totals for the surface.
    #[must_use]
    pub fn aggregated_telemetry(&self, surface_id: SurfaceId) -> Option<AggregatedTelemetry> {
        self.registry
            .visit_map(surface_id, SurfaceTree::aggregated_telemetry)
    }

    /// The surface's recent transaction telemetry, oldest first.
    #[must_use]
    pub fn recent_telemetry(&self, surface_id: SurfaceId) -> Option<Vec<TransactionTelemetry>> {
        self.registry
            .visit_map(surface_id, SurfaceTree::recent_telemetry)
    }

    /// The surface's last committed revision.
    #[must_use]
    pub fn revision(&self, surface_id: SurfaceId) -> Option<Revision> {
        self.registry.visit_map(surface_id, SurfaceTree::revision)
    }

    /// Removes the surface from the registry.
    ///
    /// Any unpulled transaction is dropped with it. A later commit to the same
    /// id starts a fresh surface.
    pub fn stop_surface(&self, surface_id: SurfaceId) -> Option<Arc<SurfaceTree>> {
        let tree = self.registry.remove(surface_id)?;
        debug!(surface = %surface_id, revision = %tree.revision(), "stopped surface");
        Some(tree)
    }
}
