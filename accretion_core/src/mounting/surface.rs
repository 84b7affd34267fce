// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-surface commit and handoff state.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use parking_lot::{Condvar, Mutex, RwLock, RwLockUpgradableReadGuard, RwLockWriteGuard};
use tracing::{debug, error, trace};

use super::{CommitError, CommitOptions, MountingConfig, RevisionLock, Transaction};
use crate::diff;
use crate::telemetry::{AggregatedTelemetry, TelemetryController, TransactionTelemetry};
use crate::tree::{Node, Revision, Snapshot, SurfaceId, Tag};

struct Handoff {
    /// Snapshot of the last pulled transaction; the baseline for diffs.
    mounted: Option<Arc<Snapshot>>,
    /// Latest unpulled transaction.
    pending: Option<Transaction>,
    next_number: u64,
}

impl Handoff {
    fn take(&mut self) -> Option<Transaction> {
        let transaction = self.pending.take()?;
        self.mounted = Some(transaction.snapshot.clone());
        Some(transaction)
    }
}

fn same_snapshot(a: Option<&Arc<Snapshot>>, b: Option<&Arc<Snapshot>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

/// The registry entry for one surface.
///
/// Owns the last committed [`Snapshot`], the single pending [`Transaction`]
/// awaiting the consumer, and the surface's telemetry.
///
/// # Commit protocol
///
/// Commits to one surface are serialized. Each commit diffs the new tree
/// against the *mounted baseline* (the snapshot of the last transaction the
/// consumer pulled), then seals it, swaps it in as the committed snapshot and
/// publishes the transaction. A tree the differ rejects is never swapped in.
/// A newer transaction replaces an unpulled one, so at most one transaction
/// per surface is ever in flight and it always applies cleanly to what the
/// consumer has.
pub struct SurfaceTree {
    surface_id: SurfaceId,
    config: MountingConfig,
    committed: RwLock<Option<Arc<Snapshot>>>,
    handoff: Mutex<Handoff>,
    ready: Condvar,
    telemetry: Mutex<TelemetryController>,
}

impl SurfaceTree {
    /// Creates an empty surface.
    #[must_use]
    pub fn new(surface_id: SurfaceId, config: MountingConfig) -> Self {
        Self {
            surface_id,
            config,
            committed: RwLock::new(None),
            handoff: Mutex::new(Handoff {
                mounted: None,
                pending: None,
                next_number: 1,
            }),
            ready: Condvar::new(),
            telemetry: Mutex::new(TelemetryController::new(config.telemetry_history)),
        }
    }

    /// The surface's id.
    #[inline]
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Commits `root` as the surface's next tree.
    ///
    /// See [`commit_with`](Self::commit_with).
    pub fn commit(&self, root: Node) -> Result<Revision, CommitError> {
        self.commit_with(root, CommitOptions::default())
    }

    /// Commits `root` as the surface's next tree and publishes a transaction.
    ///
    /// Returns the new revision. Blocks while a [`RevisionLock`] on this
    /// surface is held.
    ///
    /// # Errors
    ///
    /// Returns a [`CommitError`] if the tree is rejected, leaving the surface
    /// unchanged.
    ///
    /// # Panics
    ///
    /// Panics instead of returning an error when
    /// [`MountingConfig::panic_on_violation`] is set.
    pub fn commit_with(&self, root: Node, options: CommitOptions) -> Result<Revision, CommitError> {
        let commit_start = Instant::now();
        let committed = self.committed.upgradable_read();
        self.commit_locked(committed, root, options, commit_start)
    }

    /// Commits a tree with the current root and no children, unmounting the
    /// surface's content.
    ///
    /// The root is read under the same guard the commit runs under, so a
    /// concurrent commit either lands entirely before or entirely after.
    /// Returns `Ok(None)` if nothing has been committed yet.
    ///
    /// # Errors
    ///
    /// As for [`commit`](Self::commit).
    pub fn commit_empty(&self) -> Result<Option<Revision>, CommitError> {
        let commit_start = Instant::now();
        let committed = self.committed.upgradable_read();
        let Some(current) = committed.as_ref() else {
            return Ok(None);
        };
        let empty = current.root().with_children([]);
        self.commit_locked(committed, empty, CommitOptions::default(), commit_start)
            .map(Some)
    }

    /// Runs a commit under the upgradable guard that serializes commits.
    ///
    /// Nothing is swapped in until the diff against the current baseline has
    /// succeeded, so a rejected tree leaves the surface untouched.
    fn commit_locked(
        &self,
        mut committed: RwLockUpgradableReadGuard<'_, Option<Arc<Snapshot>>>,
        root: Node,
        options: CommitOptions,
        commit_start: Instant,
    ) -> Result<Revision, CommitError> {
        if let Err(err) = self.validate(&root) {
            return self.reject(err);
        }
        if let Some(current) = committed.as_ref() {
            if !current.root().same_family(&root) {
                let err = CommitError::RootFamilyMismatch {
                    surface: self.surface_id,
                    committed: current.root().tag(),
                    new: root.tag(),
                };
                return self.reject(err);
            }
        }
        let revision = committed
            .as_ref()
            .map_or(Revision::INITIAL, |s| s.revision())
            .next();

        let mut baseline = self.handoff.lock().mounted.clone();
        loop {
            let diff_start = Instant::now();
            let diffed = diff::try_diff(baseline.as_deref().map(Snapshot::root), Some(&root));
            let mutations = match diffed {
                Ok((mutations, _)) => mutations,
                Err(source) => {
                    return self.reject(CommitError::Unreconcilable {
                        surface: self.surface_id,
                        source,
                    });
                }
            };
            let diff_time = diff_start.elapsed();

            // Waits for revision locks, without holding the handoff.
            let mut writer = RwLockUpgradableReadGuard::upgrade(committed);
            let mut handoff = self.handoff.lock();
            if !same_snapshot(handoff.mounted.as_ref(), baseline.as_ref()) {
                // The consumer pulled while we were diffing.
                trace!(surface = %self.surface_id, %revision, "baseline moved, diffing again");
                baseline = handoff.mounted.clone();
                drop(handoff);
                committed = RwLockWriteGuard::downgrade_to_upgradable(writer);
                continue;
            }

            let snapshot = Arc::new(Snapshot::new(self.surface_id, revision, root));
            *writer = Some(snapshot.clone());

            let number = handoff.next_number;
            handoff.next_number += 1;
            let telemetry = TransactionTelemetry {
                surface_id: self.surface_id,
                number,
                revision,
                commit_start,
                layout_time: options.layout_time,
                diff_time,
                commit_time: commit_start.elapsed(),
                mount_start: None,
                mount_time: Duration::ZERO,
                mutation_count: mutations.len(),
            };
            let base_revision = baseline
                .as_ref()
                .map_or(Revision::INITIAL, |s| s.revision());
            let transaction = Transaction {
                surface_id: self.surface_id,
                number,
                revision,
                base_revision,
                snapshot,
                mutations,
                telemetry,
            };
            if let Some(dropped) = handoff.pending.replace(transaction) {
                trace!(
                    surface = %self.surface_id,
                    number = dropped.number,
                    revision = %dropped.revision,
                    "coalesced unpulled transaction"
                );
            }
            drop(handoff);
            drop(writer);
            self.ready.notify_all();

            debug!(
                surface = %self.surface_id,
                %revision,
                %base_revision,
                number,
                mutations = telemetry.mutation_count,
                "published transaction"
            );
            self.telemetry.lock().incorporate(&telemetry);
            return Ok(revision);
        }
    }

    /// Takes the pending transaction, if any. Never blocks on commits.
    ///
    /// The taken transaction's snapshot becomes the baseline for the next
    /// diff.
    pub fn pull_transaction(&self) -> Option<Transaction> {
        let transaction = self.handoff.lock().take()?;
        debug!(
            surface = %self.surface_id,
            revision = %transaction.revision,
            number = transaction.number,
            "pulled transaction"
        );
        Some(transaction)
    }

    /// Waits up to `timeout` for a transaction and takes it.
    pub fn wait_for_transaction(&self, timeout: Duration) -> Option<Transaction> {
        let deadline = Instant::now() + timeout;
        let mut handoff = self.handoff.lock();
        while handoff.pending.is_none() {
            if self.ready.wait_until(&mut handoff, deadline).timed_out() {
                break;
            }
        }
        let transaction = handoff.take()?;
        drop(handoff);
        debug!(
            surface = %self.surface_id,
            revision = %transaction.revision,
            number = transaction.number,
            "pulled transaction after wait"
        );
        Some(transaction)
    }

    /// Whether a transaction is waiting to be pulled.
    #[must_use]
    pub fn has_pending_transaction(&self) -> bool {
        self.handoff.lock().pending.is_some()
    }

    /// The last committed snapshot.
    #[must_use]
    pub fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.committed.read_recursive().clone()
    }

    /// The last committed revision, [`Revision::INITIAL`] if none.
    #[must_use]
    pub fn revision(&self) -> Revision {
        self.committed
            .read_recursive()
            .as_ref()
            .map_or(Revision::INITIAL, |s| s.revision())
    }

    /// The revision of the last pulled transaction.
    #[must_use]
    pub fn mounted_revision(&self) -> Revision {
        self.handoff
            .lock()
            .mounted
            .as_ref()
            .map_or(Revision::INITIAL, |s| s.revision())
    }

    /// Holds the surface at its current revision until the guard drops.
    pub fn revision_lock(&self) -> RevisionLock<'_> {
        RevisionLock::new(self.committed.read_recursive())
    }

    /// Records the mount stage reported by the consumer.
    pub fn report_mount_telemetry(&self, telemetry: &TransactionTelemetry) {
        self.telemetry.lock().incorporate_mount(telemetry);
    }

    /// Running telemetry totals.
    #[must_use]
    pub fn aggregated_telemetry(&self) -> AggregatedTelemetry {
        self.telemetry.lock().aggregated()
    }

    /// Recent per-transaction telemetry, oldest first.
    #[must_use]
    pub fn recent_telemetry(&self) -> Vec<TransactionTelemetry> {
        self.telemetry.lock().recent().copied().collect()
    }

    fn validate(&self, root: &Node) -> Result<(), CommitError> {
        let surface = self.surface_id;
        if root.surface_id() != surface {
            return Err(CommitError::SurfaceMismatch {
                expected: surface,
                actual: root.surface_id(),
                tag: root.tag(),
            });
        }
        if !root.forms_view() {
            return Err(CommitError::RootNotMounted {
                surface,
                root: root.tag(),
            });
        }
        if !self.config.validate_commits {
            return Ok(());
        }

        // Tag -> parent tag of its first occurrence.
        let mut seen: HashMap<Tag, Option<Tag>> = HashMap::new();
        let mut stack: Vec<(&Node, Option<Tag>)> = vec![(root, None)];
        while let Some((node, parent)) = stack.pop() {
            if node.surface_id() != surface {
                return Err(CommitError::SurfaceMismatch {
                    expected: surface,
                    actual: node.surface_id(),
                    tag: node.tag(),
                });
            }
            if let Some(&first_parent) = seen.get(&node.tag()) {
                return Err(match parent {
                    Some(parent) if first_parent == Some(parent) => {
                        CommitError::DuplicateSiblingFamily {
                            surface,
                            parent,
                            child: node.tag(),
                        }
                    }
                    _ => CommitError::DuplicateTag {
                        surface,
                        tag: node.tag(),
                    },
                });
            }
            seen.insert(node.tag(), parent);
            stack.extend(node.children().iter().map(|child| (child, Some(node.tag()))));
        }
        Ok(())
    }

    fn reject<T>(&self, err: CommitError) -> Result<T, CommitError> {
        if self.config.panic_on_violation {
            panic!("rejected commit: {err}");
        }
        error!(surface = %self.surface_id, error = %err, "rejected commit");
        Err(err)
    }
}

impl fmt::Debug for SurfaceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceTree")
            .field("surface_id", &self.surface_id)
            .field("revision", &self.revision())
            .field("pending", &self.has_pending_transaction())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use super::*;
    use crate::diff::{DiffError, MutationKind};
    use crate::tree::{Family, NodeFragment, Props, ROOT, VIEW};

    fn root(surface: u32) -> Node {
        Node::new(
            Family::new(Tag(1), SurfaceId(surface), &ROOT),
            NodeFragment::new(),
        )
    }

    fn view(tag: u32) -> Node {
        Node::new(
            Family::new(Tag(tag), SurfaceId(1), &VIEW),
            NodeFragment::new(),
        )
    }

    fn kinds(transaction: &Transaction) -> Vec<(MutationKind, u32)> {
        transaction
            .mutations()
            .iter()
            .map(|m| (m.kind(), m.tag().0))
            .collect()
    }

    #[test]
    fn first_commit_is_revision_one_and_mounts_from_scratch() {
        let surface = SurfaceTree::new(SurfaceId(1), MountingConfig::development());
        assert_eq!(surface.revision(), Revision::INITIAL);
        assert!(surface.pull_transaction().is_none());

        let revision = surface.commit(root(1).with_children([view(2)])).unwrap();
        assert_eq!(revision, Revision(1));
        assert!(surface.has_pending_transaction());

        let transaction = surface.pull_transaction().unwrap();
        assert_eq!(transaction.number(), 1);
        assert_eq!(transaction.revision(), Revision(1));
        assert_eq!(transaction.base_revision(), Revision::INITIAL);
        assert_eq!(
            kinds(&transaction),
            [
                (MutationKind::Create, 1),
                (MutationKind::Create, 2),
                (MutationKind::Insert, 2)
            ]
        );
        assert!(transaction.snapshot().root().is_sealed());
        assert_eq!(surface.mounted_revision(), Revision(1));
        assert!(surface.pull_transaction().is_none());
    }

    #[test]
    fn unpulled_transactions_coalesce() {
        let surface = SurfaceTree::new(SurfaceId(1), MountingConfig::development());
        let first = root(1).with_children([view(2)]);
        surface.commit(first.clone()).unwrap();
        surface.pull_transaction().unwrap();

        let second = first.with_children([view(3)]);
        surface.commit(second.clone()).unwrap();
        let third = second.with_props(Props::new().with("k", 1));
        surface.commit(third).unwrap();

        let transaction = surface.pull_transaction().unwrap();
        assert_eq!(transaction.revision(), Revision(3));
        assert_eq!(transaction.base_revision(), Revision(1));
        assert_eq!(transaction.number(), 3);
        // Relative to revision 1: the prop change, and 2 replaced by 3.
        assert_eq!(
            kinds(&transaction),
            [
                (MutationKind::UpdateProps, 1),
                (MutationKind::Remove, 2),
                (MutationKind::Delete, 2),
                (MutationKind::Create, 3),
                (MutationKind::Insert, 3)
            ]
        );
        let agg = surface.aggregated_telemetry();
        assert_eq!(agg.transaction_count, 3);
    }

    #[test]
    fn identical_commit_still_publishes() {
        let surface = SurfaceTree::new(SurfaceId(1), MountingConfig::development());
        let tree = root(1).with_children([view(2)]);
        surface.commit(tree.clone()).unwrap();
        surface.pull_transaction().unwrap();

        assert_eq!(surface.commit(tree).unwrap(), Revision(2));
        let transaction = surface.pull_transaction().unwrap();
        assert_eq!(transaction.revision(), Revision(2));
        assert!(transaction.mutations().is_empty());
    }

    #[test]
    fn commit_empty_unmounts_children() {
        let surface = SurfaceTree::new(SurfaceId(1), MountingConfig::development());
        assert_eq!(surface.commit_empty(), Ok(None));

        surface.commit(root(1).with_children([view(2), view(3)])).unwrap();
        surface.pull_transaction().unwrap();
        assert_eq!(surface.commit_empty(), Ok(Some(Revision(2))));

        let transaction = surface.pull_transaction().unwrap();
        assert_eq!(
            kinds(&transaction),
            [
                (MutationKind::Remove, 3),
                (MutationKind::Remove, 2),
                (MutationKind::Delete, 2),
                (MutationKind::Delete, 3)
            ]
        );
    }

    #[test]
    fn wait_for_transaction_times_out_when_idle() {
        let surface = SurfaceTree::new(SurfaceId(1), MountingConfig::development());
        assert!(surface
            .wait_for_transaction(Duration::from_millis(5))
            .is_none());
        surface.commit(root(1)).unwrap();
        assert!(surface
            .wait_for_transaction(Duration::from_millis(5))
            .is_some());
    }

    #[test]
    fn production_config_rejects_without_panicking() {
        let surface = SurfaceTree::new(SurfaceId(1), MountingConfig::production());
        surface.commit(root(1)).unwrap();

        let err = surface.commit(root(1)).unwrap_err();
        assert_eq!(
            err,
            CommitError::RootFamilyMismatch {
                surface: SurfaceId(1),
                committed: Tag(1),
                new: Tag(1),
            }
        );
        assert_eq!(surface.revision(), Revision(1));

        let err = surface.commit(root(2)).unwrap_err();
        assert!(matches!(err, CommitError::SurfaceMismatch { .. }));

        let current = surface.current_snapshot().unwrap().root().clone();
        let child = view(2);
        let err = surface
            .commit(current.with_children([child.clone(), child]))
            .unwrap_err();
        assert_eq!(
            err,
            CommitError::DuplicateSiblingFamily {
                surface: SurfaceId(1),
                parent: Tag(1),
                child: Tag(2),
            }
        );

        let err = surface
            .commit(current.with_children([view(2).with_children([view(2)])]))
            .unwrap_err();
        assert_eq!(
            err,
            CommitError::DuplicateTag {
                surface: SurfaceId(1),
                tag: Tag(2),
            }
        );

        let flattened = current.with_props(Props::new().with(crate::tree::COLLAPSABLE, true));
        // The root component never flattens, so this still commits.
        assert!(surface.commit(flattened).is_ok());
        assert_eq!(surface.revision(), Revision(2));
    }

    #[test]
    fn production_rejects_tag_reused_by_another_family() {
        let surface = SurfaceTree::new(SurfaceId(1), MountingConfig::production());
        let first = root(1).with_children([view(2)]);
        surface.commit(first.clone()).unwrap();
        surface.pull_transaction().unwrap();

        // Same tag, new family.
        let bad = first.with_children([view(2)]);
        let err = surface.commit(bad.clone()).unwrap_err();
        assert_eq!(
            err,
            CommitError::Unreconcilable {
                surface: SurfaceId(1),
                source: DiffError::TagCollision { tag: Tag(2) },
            }
        );
        assert_eq!(surface.revision(), Revision(1));
        assert!(surface.current_snapshot().unwrap().root().ptr_eq(&first));
        assert!(!surface.has_pending_transaction());
        assert!(!bad.is_sealed());

        // The surface keeps working from its last good tree.
        assert_eq!(surface.commit(first.with_children([])).unwrap(), Revision(2));
        let transaction = surface.pull_transaction().unwrap();
        assert_eq!(transaction.base_revision(), Revision(1));
        assert_eq!(
            kinds(&transaction),
            [(MutationKind::Remove, 2), (MutationKind::Delete, 2)]
        );
    }

    #[test]
    fn production_rejects_reparenting_and_keeps_pending_transaction() {
        let surface = SurfaceTree::new(SurfaceId(1), MountingConfig::production());
        let (a, b, x) = (view(2), view(3), view(4));
        let first = root(1).with_children([a.with_children([x.clone()]), b.clone()]);
        surface.commit(first.clone()).unwrap();
        surface.pull_transaction().unwrap();
        let second = first.with_props(Props::new().with("k", 1));
        surface.commit(second.clone()).unwrap();

        let moved = second.with_children([b.with_children([x]), a.with_children([])]);
        let err = surface.commit(moved).unwrap_err();
        assert_eq!(
            err,
            CommitError::Unreconcilable {
                surface: SurfaceId(1),
                source: DiffError::Reparented { tag: Tag(4) },
            }
        );
        assert_eq!(surface.revision(), Revision(2));
        let transaction = surface.pull_transaction().unwrap();
        assert_eq!(transaction.revision(), Revision(2));
        assert_eq!(kinds(&transaction), [(MutationKind::UpdateProps, 1)]);
    }

    #[test]
    fn development_panic_leaves_surface_unchanged() {
        let surface = SurfaceTree::new(SurfaceId(1), MountingConfig::development());
        let first = root(1).with_children([view(2)]);
        surface.commit(first.clone()).unwrap();
        surface.pull_transaction().unwrap();

        let bad = first.with_children([view(2)]);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| surface.commit(bad)));
        assert!(outcome.is_err());
        assert_eq!(surface.revision(), Revision(1));
        assert!(surface.current_snapshot().unwrap().root().ptr_eq(&first));
        assert!(!surface.has_pending_transaction());
        assert_eq!(surface.commit(first).unwrap(), Revision(2));
    }

    #[test]
    fn commit_empty_keeps_latest_root() {
        let surface = SurfaceTree::new(SurfaceId(1), MountingConfig::development());
        let first = root(1).with_children([view(2)]);
        surface.commit(first.clone()).unwrap();
        surface.commit(first.with_props(Props::new().with("k", 2))).unwrap();

        assert_eq!(surface.commit_empty(), Ok(Some(Revision(3))));
        let snapshot = surface.current_snapshot().unwrap();
        assert!(snapshot.root().children().is_empty());
        assert!(snapshot.root().props().get("k").is_some());
    }

    #[test]
    #[should_panic(expected = "rejected commit")]
    fn development_config_panics_on_violation() {
        let surface = SurfaceTree::new(SurfaceId(1), MountingConfig::development());
        surface.commit(root(1)).unwrap();
        let _ = surface.commit(root(1));
    }

    #[test]
    fn revision_lock_reports_held_revision() {
        let surface = SurfaceTree::new(SurfaceId(1), MountingConfig::development());
        assert_eq!(surface.revision_lock().revision(), Revision::INITIAL);
        surface.commit(root(1)).unwrap();
        let lock = surface.revision_lock();
        assert_eq!(lock.revision(), Revision(1));
        assert!(lock.snapshot().is_some());
    }
}
