// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree differentiator.
//!
//! [`diff`] computes the ordered [`Mutation`] list that turns the mount tree
//! of one root into the mount tree of another. It is a pure function of its
//! inputs.
//!
//! # Matching
//!
//! Each view-forming node is paired with its predecessor by [`Family`]
//! identity, never by position. For every pair of mounted parents, the
//! [`mount_children`] of both versions are indexed by tag:
//!
//! - A new child with no old counterpart is created and inserted.
//! - An old child with no new counterpart is removed and deleted, along with
//!   its whole mounted subtree.
//! - Matched children are diffed recursively. The matched children whose old
//!   positions form the longest increasing run (in new order) stay in place;
//!   every other matched child moves with a `Remove`/`Insert` pair.
//!
//! A pair whose nodes are the same allocation is skipped without visiting
//! its subtree. Since cloning shares everything off the changed spine, a
//! localized change costs O(depth) pair visits (see [`DiffStats`]).
//!
//! # Ordering
//!
//! For each mounted parent, mutations are emitted as: teardown of deleted
//! subtrees, updates of matched children, removals in descending index
//! order, deletions, creations, mutations of descendants, then insertions
//! in ascending index order. Applying the list in order never needs an
//! index that does not exist yet.
//!
//! # Preconditions
//!
//! Tags are unique within each tree. A node may switch between flattened
//! and view-forming; its mounted descendants are then deleted and recreated
//! under their new mount parent within the nearest common mounted ancestor.
//!
//! # Errors
//!
//! [`try_diff`] reports trees it cannot reconcile as a [`DiffError`]:
//! roots of different families, a flattened root, two children of one
//! parent sharing a tag, one tag naming two different families, and a
//! family that moved to a different logical parent. [`diff`] and
//! [`diff_with_stats`] panic on them instead.

mod lis;
mod mutation;
mod slice;

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::{HashMap, HashSet};

pub use mutation::{MountView, Mutation, MutationKind};
pub use slice::mount_children;

use crate::tree::{Family, Node, Tag};

/// Work counters from one diff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffStats {
    /// Mounted parent pairs whose children were reconciled.
    pub reconciled: usize,
    /// Pairs skipped because both versions were the same allocation.
    pub short_circuited: usize,
}

/// Why two trees cannot be reconciled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffError {
    /// The roots are not versions of one family.
    RootFamilyMismatch {
        /// Old root tag.
        old: Tag,
        /// New root tag.
        new: Tag,
    },
    /// A root is flattened.
    RootNotMounted {
        /// The root's tag.
        root: Tag,
    },
    /// One tag appears twice among a parent's mounted children.
    DuplicateSiblingFamily {
        /// The mount parent.
        parent: Tag,
        /// The repeated child.
        child: Tag,
    },
    /// A tag names one family in the old tree and another in the new one.
    TagCollision {
        /// The shared tag.
        tag: Tag,
    },
    /// A family is mounted under a different parent than before.
    Reparented {
        /// The moved family's tag.
        tag: Tag,
    },
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootFamilyMismatch { old, new } => {
                write!(f, "cannot diff roots of different families: {old} and {new}")
            }
            Self::RootNotMounted { root } => write!(f, "root {root} must form a view"),
            Self::DuplicateSiblingFamily { parent, child } => {
                write!(f, "duplicate sibling family {child} under {parent}")
            }
            Self::TagCollision { tag } => write!(f, "{tag} names two families"),
            Self::Reparented { tag } => write!(f, "{tag} moved to a different parent"),
        }
    }
}

impl core::error::Error for DiffError {}

/// Computes the mutations that turn `old`'s mount tree into `new`'s.
///
/// `None` for `old` is an initial mount (the root is created but not
/// inserted anywhere); `None` for `new` is a teardown (everything is deleted,
/// the root last).
///
/// # Panics
///
/// Panics if [`try_diff`] would return an error.
#[must_use]
pub fn diff(old: Option<&Node>, new: Option<&Node>) -> Vec<Mutation> {
    diff_with_stats(old, new).0
}

/// Like [`diff`], also reporting how much of the trees was visited.
///
/// # Panics
///
/// Panics if [`try_diff`] would return an error.
#[must_use]
pub fn diff_with_stats(old: Option<&Node>, new: Option<&Node>) -> (Vec<Mutation>, DiffStats) {
    match try_diff(old, new) {
        Ok(result) => result,
        Err(err) => panic!("{err}"),
    }
}

/// Like [`diff_with_stats`], returning an error for trees that cannot be
/// reconciled.
///
/// # Errors
///
/// See the [module docs](self).
pub fn try_diff(
    old: Option<&Node>,
    new: Option<&Node>,
) -> Result<(Vec<Mutation>, DiffStats), DiffError> {
    let mut differ = Differ::default();
    match (old, new) {
        (None, None) => {}
        (None, Some(new)) => {
            let view = root_view(new)?;
            differ.create(&view);
            differ.create_subtree(&view);
        }
        (Some(old), None) => {
            let view = root_view(old)?;
            differ.destroy_subtree(&view)?;
            differ.delete(view)?;
        }
        (Some(old), Some(new)) => {
            if !old.same_family(new) {
                return Err(DiffError::RootFamilyMismatch {
                    old: old.tag(),
                    new: new.tag(),
                });
            }
            let (old, new) = (root_view(old)?, root_view(new)?);
            differ.update_view(None, &old, &new);
            differ.reconcile_children(&old, &new)?;
        }
    }
    Ok((differ.out, differ.stats))
}

fn root_view(root: &Node) -> Result<MountView, DiffError> {
    if !root.forms_view() {
        return Err(DiffError::RootNotMounted { root: root.tag() });
    }
    Ok(MountView::new(root.clone(), root.layout_metrics()))
}

/// Builds a tag index over one child list, rejecting duplicates.
fn index_by_tag(
    parent: &MountView,
    children: &[MountView],
) -> Result<HashMap<Tag, usize>, DiffError> {
    let mut index = HashMap::with_capacity(children.len());
    for (i, child) in children.iter().enumerate() {
        if index.insert(child.tag(), i).is_some() {
            return Err(DiffError::DuplicateSiblingFamily {
                parent: parent.tag(),
                child: child.tag(),
            });
        }
    }
    Ok(index)
}

#[derive(Default)]
struct Differ {
    out: Vec<Mutation>,
    stats: DiffStats,
    /// Tags created so far. A later delete of one means the family moved
    /// between mount parents outside a single reconciliation.
    created: HashSet<Tag>,
}

impl Differ {
    fn create(&mut self, view: &MountView) {
        self.created.insert(view.tag());
        self.out.push(Mutation::Create { view: view.clone() });
    }

    fn delete(&mut self, view: MountView) -> Result<(), DiffError> {
        if self.created.contains(&view.tag()) {
            return Err(DiffError::Reparented { tag: view.tag() });
        }
        self.out.push(Mutation::Delete { view });
        Ok(())
    }

    /// Emits updates for a matched pair, one per changed aspect.
    fn update_view(&mut self, parent: Option<Tag>, old: &MountView, new: &MountView) {
        if old.node().ptr_eq(new.node()) && old.layout_metrics() == new.layout_metrics() {
            return;
        }
        if old.props() != new.props() {
            self.out.push(Mutation::UpdateProps {
                parent,
                old: old.clone(),
                new: new.clone(),
            });
        }
        if old.state() != new.state() {
            self.out.push(Mutation::UpdateState {
                parent,
                old: old.clone(),
                new: new.clone(),
            });
        }
        if old.layout_metrics() != new.layout_metrics() {
            self.out.push(Mutation::Update {
                parent,
                old: old.clone(),
                new: new.clone(),
            });
        }
    }

    /// Emits creation of everything mounted below an already created view.
    fn create_subtree(&mut self, parent: &MountView) {
        let children = mount_children(parent.node());
        for child in &children {
            self.create(child);
        }
        for child in &children {
            self.create_subtree(child);
        }
        for (index, view) in children.into_iter().enumerate() {
            self.out.push(Mutation::Insert {
                parent: parent.tag(),
                view,
                index,
            });
        }
    }

    /// Emits removal and deletion of everything mounted below a view.
    fn destroy_subtree(&mut self, parent: &MountView) -> Result<(), DiffError> {
        let children = mount_children(parent.node());
        for child in &children {
            self.destroy_subtree(child)?;
        }
        for (index, child) in children.iter().enumerate().rev() {
            self.out.push(Mutation::Remove {
                parent: parent.tag(),
                view: child.clone(),
                index,
            });
        }
        for view in children {
            self.delete(view)?;
        }
        Ok(())
    }

    /// Reconciles the mounted children of a matched pair.
    fn reconcile_children(&mut self, old: &MountView, new: &MountView) -> Result<(), DiffError> {
        if old.node().ptr_eq(new.node()) {
            self.stats.short_circuited += 1;
            return Ok(());
        }
        self.stats.reconciled += 1;

        let parent = new.tag();
        let old_children = mount_children(old.node());
        let new_children = mount_children(new.node());
        let old_index = index_by_tag(old, &old_children)?;
        index_by_tag(new, &new_children)?;

        // Old position of each new child, and the reverse.
        let mut new_match: Vec<Option<usize>> = vec![None; new_children.len()];
        let mut old_match: Vec<Option<usize>> = vec![None; old_children.len()];
        for (j, child) in new_children.iter().enumerate() {
            if let Some(&i) = old_index.get(&child.tag()) {
                if !Family::same(old_children[i].family(), child.family()) {
                    return Err(DiffError::TagCollision { tag: child.tag() });
                }
                new_match[j] = Some(i);
                old_match[i] = Some(j);
            }
        }

        let matched: Vec<usize> = new_match.iter().flatten().copied().collect();
        let mut keep = lis::longest_increasing(&matched).into_iter();
        let mut kept_new = vec![false; new_children.len()];
        let mut kept_old = vec![false; old_children.len()];
        for (j, i) in new_match.iter().enumerate() {
            if let Some(i) = *i {
                let k = keep.next().unwrap_or(false);
                kept_new[j] = k;
                kept_old[i] = k;
            }
        }

        for (i, child) in old_children.iter().enumerate() {
            if old_match[i].is_none() {
                self.destroy_subtree(child)?;
            }
        }
        for (j, child) in new_children.iter().enumerate() {
            if let Some(i) = new_match[j] {
                self.update_view(Some(parent), &old_children[i], child);
            }
        }
        for (index, child) in old_children.iter().enumerate().rev() {
            if !kept_old[index] {
                self.out.push(Mutation::Remove {
                    parent,
                    view: child.clone(),
                    index,
                });
            }
        }
        for (i, child) in old_children.iter().enumerate() {
            if old_match[i].is_none() {
                self.delete(child.clone())?;
            }
        }
        for (j, child) in new_children.iter().enumerate() {
            if new_match[j].is_none() {
                self.create(child);
            }
        }
        for (j, child) in new_children.iter().enumerate() {
            match new_match[j] {
                Some(i) => self.reconcile_children(&old_children[i], child)?,
                None => self.create_subtree(child),
            }
        }
        for (index, child) in new_children.iter().enumerate() {
            if !kept_new[index] {
                self.out.push(Mutation::Insert {
                    parent,
                    view: child.clone(),
                    index,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::Rect;

    use super::MutationKind::{Create, Delete, Insert, Remove, Update, UpdateProps, UpdateState};
    use super::*;
    use crate::tree::{
        COLLAPSABLE, LayoutMetrics, NodeFragment, Props, ROOT, State, SurfaceId, VIEW,
    };

    fn root(children: impl IntoIterator<Item = Node>) -> Node {
        Node::new(
            Family::new(Tag(1), SurfaceId(1), &ROOT),
            NodeFragment::new().children(children),
        )
    }

    fn view(tag: u32) -> Node {
        Node::new(
            Family::new(Tag(tag), SurfaceId(1), &VIEW),
            NodeFragment::new(),
        )
    }

    fn summary(mutations: &[Mutation]) -> Vec<(MutationKind, u32, Option<usize>)> {
        mutations
            .iter()
            .map(|m| (m.kind(), m.tag().0, m.index()))
            .collect()
    }

    #[test]
    fn initial_mount_creates_everything() {
        let tree = root([view(2).with_children([view(3)]), view(4)]);
        assert_eq!(
            summary(&diff(None, Some(&tree))),
            [
                (Create, 1, None),
                (Create, 2, None),
                (Create, 4, None),
                (Create, 3, None),
                (Insert, 3, Some(0)),
                (Insert, 2, Some(0)),
                (Insert, 4, Some(1)),
            ]
        );
    }

    #[test]
    fn teardown_deletes_everything() {
        let tree = root([view(2).with_children([view(3)]), view(4)]);
        assert_eq!(
            summary(&diff(Some(&tree), None)),
            [
                (Remove, 3, Some(0)),
                (Delete, 3, None),
                (Remove, 4, Some(1)),
                (Remove, 2, Some(0)),
                (Delete, 2, None),
                (Delete, 4, None),
                (Delete, 1, None),
            ]
        );
    }

    #[test]
    fn same_tree_is_empty_and_short_circuits() {
        let tree = root([view(2), view(3)]);
        let (mutations, stats) = diff_with_stats(Some(&tree), Some(&tree));
        assert!(mutations.is_empty());
        assert_eq!(
            stats,
            DiffStats {
                reconciled: 0,
                short_circuited: 1
            }
        );
    }

    #[test]
    fn appended_child_is_created_and_inserted() {
        let x = view(2);
        let old = root([x.clone()]);
        let new = old.with_children([x, view(3)]);
        assert_eq!(
            summary(&diff(Some(&old), Some(&new))),
            [(Create, 3, None), (Insert, 3, Some(1))]
        );
    }

    #[test]
    fn swap_moves_one_child() {
        let (x, y) = (view(2), view(3));
        let old = root([x.clone(), y.clone()]);
        let new = old.with_children([y, x]);
        assert_eq!(
            summary(&diff(Some(&old), Some(&new))),
            [(Remove, 3, Some(1)), (Insert, 3, Some(0))]
        );
    }

    #[test]
    fn removed_child_is_removed_and_deleted() {
        let (x, y, z) = (view(2), view(3), view(4));
        let old = root([x.clone(), y, z.clone()]);
        let new = old.with_children([x, z]);
        assert_eq!(
            summary(&diff(Some(&old), Some(&new))),
            [(Remove, 3, Some(1)), (Delete, 3, None)]
        );
    }

    #[test]
    fn updates_follow_changed_aspects() {
        let x = view(2);
        let old = root([x.clone()]);
        let changed = x
            .with_props(Props::new().with("opacity", 0.5))
            .with_state(State::new(7_u32))
            .with_layout(LayoutMetrics::from_frame(Rect::new(0., 0., 5., 5.)));
        let new = old.with_children([changed]);
        assert_eq!(
            summary(&diff(Some(&old), Some(&new))),
            [(UpdateProps, 2, None), (UpdateState, 2, None), (Update, 2, None)]
        );
    }

    #[test]
    fn localized_change_visits_only_the_spine() {
        let deep = view(10).with_children([view(11), view(12)]);
        let old = root([
            view(2).with_children([view(3), deep]),
            view(4).with_children([view(5), view(6)]),
        ]);
        let new = old.clone_tree(&[0, 1, 0], |n| n.with_props(Props::new().with("k", 1)));

        let (mutations, stats) = diff_with_stats(Some(&old), Some(&new));
        assert_eq!(summary(&mutations), [(UpdateProps, 11, None)]);
        // Root, 2, 10, and 11 are reconciled; 4, 3, and 12 are skipped.
        assert_eq!(stats.reconciled, 4);
        assert_eq!(stats.short_circuited, 3);
    }

    #[test]
    fn unflattening_recreates_hoisted_children() {
        let flat = view(2)
            .with_props(Props::new().with(COLLAPSABLE, true))
            .with_children([view(3)]);
        let old = root([flat.clone()]);
        let new = old.with_children([flat.with_props(Props::new())]);
        assert_eq!(
            summary(&diff(Some(&old), Some(&new))),
            [
                (Remove, 3, Some(0)),
                (Delete, 3, None),
                (Create, 2, None),
                (Create, 3, None),
                (Insert, 3, Some(0)),
                (Insert, 2, Some(0)),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "cannot diff roots of different families")]
    fn rejects_mismatched_roots() {
        let _ = diff(Some(&root([])), Some(&root([])));
    }

    #[test]
    #[should_panic(expected = "duplicate sibling family")]
    fn rejects_duplicate_siblings() {
        let x = view(2);
        let old = root([]);
        let new = old.with_children([x.clone(), x]);
        let _ = diff(Some(&old), Some(&new));
    }

    #[test]
    #[should_panic(expected = "names two families")]
    fn rejects_tag_reuse_across_families() {
        let old = root([view(2)]);
        let new = old.with_children([view(2)]);
        let _ = diff(Some(&old), Some(&new));
    }

    #[test]
    fn try_diff_reports_tag_reuse() {
        let old = root([view(2)]);
        let new = old.with_children([view(2)]);
        assert_eq!(
            try_diff(Some(&old), Some(&new)).err(),
            Some(DiffError::TagCollision { tag: Tag(2) })
        );
    }

    #[test]
    fn reparented_family_is_reported() {
        // 4 moves from under 2 to under 3, and 2 and 3 swap places.
        let (a, b, x) = (view(2), view(3), view(4));
        let old = root([a.with_children([x.clone()]), b.clone()]);
        let new = old.with_children([b.with_children([x]), a.with_children([])]);
        assert_eq!(
            try_diff(Some(&old), Some(&new)).err(),
            Some(DiffError::Reparented { tag: Tag(4) })
        );
    }

    #[test]
    #[should_panic(expected = "moved to a different parent")]
    fn diff_panics_on_reparented_family() {
        let (a, b, x) = (view(2), view(3), view(4));
        let old = root([a.with_children([x.clone()]), b.clone()]);
        let new = old.with_children([b.with_children([x]), a.with_children([])]);
        let _ = diff(Some(&old), Some(&new));
    }

    #[test]
    fn try_diff_reports_flattened_root() {
        let flat = Node::new(
            Family::new(Tag(1), SurfaceId(1), &VIEW),
            NodeFragment::new().props(Props::new().with(COLLAPSABLE, true)),
        );
        assert_eq!(
            try_diff(None, Some(&flat)).err(),
            Some(DiffError::RootNotMounted { root: Tag(1) })
        );
    }
}
