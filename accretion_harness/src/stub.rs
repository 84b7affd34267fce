// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory stand-in for a native view hierarchy.

use accretion_core::diff::{MountView, Mutation, MutationKind, mount_children};
use accretion_core::mounting::{Mounter, Transaction};
use accretion_core::tree::{LayoutMetrics, Node, Props, Snapshot, State, Tag};
use hashbrown::HashMap;

/// One mounted view.
#[derive(Clone, Debug, PartialEq)]
pub struct StubView {
    /// The view's tag.
    pub tag: Tag,
    /// Component name.
    pub component: &'static str,
    /// Current props.
    pub props: Props,
    /// Current state.
    pub state: Option<State>,
    /// Current layout metrics, relative to the mount parent.
    pub layout: Option<LayoutMetrics>,
    /// Mount parent, `None` while detached.
    pub parent: Option<Tag>,
    /// Mounted children in order.
    pub children: Vec<Tag>,
}

impl StubView {
    fn from_mount(view: &MountView) -> Self {
        Self {
            tag: view.tag(),
            component: view.component().name,
            props: view.props().clone(),
            state: view.state().cloned(),
            layout: view.layout_metrics(),
            parent: None,
            children: Vec::new(),
        }
    }

    fn from_root(root: &Node) -> Self {
        Self {
            tag: root.tag(),
            component: root.component().name,
            props: root.props().clone(),
            state: root.state().cloned(),
            layout: root.layout_metrics(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// A mount-invariant violation found while applying a mutation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StubError {
    /// `Create` of a tag that already has a view.
    #[error("create: {0} already exists")]
    AlreadyExists(Tag),
    /// A mutation named a view that does not exist.
    #[error("{kind}: {tag} does not exist")]
    Missing {
        /// The mutation.
        kind: MutationKind,
        /// The missing view.
        tag: Tag,
    },
    /// `Delete` or `Insert` of a view that is still attached.
    #[error("{kind}: {tag} is still attached to {parent}")]
    Attached {
        /// The mutation.
        kind: MutationKind,
        /// The attached view.
        tag: Tag,
        /// Its current parent.
        parent: Tag,
    },
    /// `Delete` of a view that still has children.
    #[error("delete: {tag} still has {count} children")]
    HasChildren {
        /// The view.
        tag: Tag,
        /// Number of remaining children.
        count: usize,
    },
    /// `Insert` or `Remove` past the end of the child list.
    #[error("{kind}: index {index} out of range for {parent} with {len} children")]
    IndexOutOfRange {
        /// The mutation.
        kind: MutationKind,
        /// The parent.
        parent: Tag,
        /// The requested index.
        index: usize,
        /// The parent's child count.
        len: usize,
    },
    /// `Remove` named a different child than the one at the index.
    #[error("remove: {parent} has {found} at {index}, not {expected}")]
    WrongChild {
        /// The parent.
        parent: Tag,
        /// The index.
        index: usize,
        /// The view the mutation named.
        expected: Tag,
        /// The view actually at that index.
        found: Tag,
    },
}

/// A native view hierarchy that checks every mount invariant.
///
/// Views are keyed by tag. The first view created in an empty tree becomes
/// the root. Two stub trees compare equal when they hold the same views with
/// the same data, parents, and child order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StubViewTree {
    views: HashMap<Tag, StubView>,
    root: Option<Tag>,
}

impl StubViewTree {
    /// An empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the mounted tree of `root` directly, without the
    /// differentiator.
    #[must_use]
    pub fn from_root(root: &Node) -> Self {
        let mut tree = Self::new();
        tree.root = Some(root.tag());
        tree.views.insert(root.tag(), StubView::from_root(root));
        tree.build_children(root);
        tree
    }

    /// Like [`from_root`](Self::from_root), for an optional snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: Option<&Snapshot>) -> Self {
        snapshot.map_or_else(Self::new, |s| Self::from_root(s.root()))
    }

    fn build_children(&mut self, parent: &Node) {
        let children = mount_children(parent);
        let tags: Vec<Tag> = children.iter().map(MountView::tag).collect();
        for child in &children {
            let mut view = StubView::from_mount(child);
            view.parent = Some(parent.tag());
            self.views.insert(child.tag(), view);
            self.build_children(child.node());
        }
        if let Some(view) = self.views.get_mut(&parent.tag()) {
            view.children = tags;
        }
    }

    /// The root view's tag.
    #[must_use]
    pub fn root(&self) -> Option<Tag> {
        self.root
    }

    /// The view tagged `tag`.
    #[must_use]
    pub fn view(&self, tag: Tag) -> Option<&StubView> {
        self.views.get(&tag)
    }

    /// The mounted children of `tag`, empty if unknown.
    #[must_use]
    pub fn children_of(&self, tag: Tag) -> &[Tag] {
        self.views
            .get(&tag)
            .map(|v| v.children.as_slice())
            .unwrap_or_default()
    }

    /// Number of views, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether the tree has no views.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Applies `mutations` in order, stopping at the first violation.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant. Mutations before it stay
    /// applied.
    pub fn apply_all(&mut self, mutations: &[Mutation]) -> Result<(), StubError> {
        mutations.iter().try_for_each(|m| self.apply_mutation(m))
    }

    /// Applies one mutation.
    ///
    /// # Errors
    ///
    /// Returns the violated invariant; the tree is unchanged in that case.
    pub fn apply_mutation(&mut self, mutation: &Mutation) -> Result<(), StubError> {
        let kind = mutation.kind();
        match mutation {
            Mutation::Create { view } => {
                if self.views.contains_key(&view.tag()) {
                    return Err(StubError::AlreadyExists(view.tag()));
                }
                if self.views.is_empty() {
                    self.root = Some(view.tag());
                }
                self.views.insert(view.tag(), StubView::from_mount(view));
            }
            Mutation::Delete { view } => {
                let tag = view.tag();
                let existing = self.get(kind, tag)?;
                if let Some(parent) = existing.parent {
                    return Err(StubError::Attached { kind, tag, parent });
                }
                if !existing.children.is_empty() {
                    return Err(StubError::HasChildren {
                        tag,
                        count: existing.children.len(),
                    });
                }
                self.views.remove(&tag);
                if self.root == Some(tag) {
                    self.root = None;
                }
            }
            Mutation::Insert {
                parent,
                view,
                index,
            } => {
                let tag = view.tag();
                if let Some(current) = self.get(kind, tag)?.parent {
                    return Err(StubError::Attached {
                        kind,
                        tag,
                        parent: current,
                    });
                }
                let len = self.get(kind, *parent)?.children.len();
                if *index > len {
                    return Err(StubError::IndexOutOfRange {
                        kind,
                        parent: *parent,
                        index: *index,
                        len,
                    });
                }
                self.get_mut(kind, *parent)?.children.insert(*index, tag);
                self.get_mut(kind, tag)?.parent = Some(*parent);
            }
            Mutation::Remove {
                parent,
                view,
                index,
            } => {
                let tag = view.tag();
                self.get(kind, tag)?;
                let children = &self.get(kind, *parent)?.children;
                let Some(&found) = children.get(*index) else {
                    return Err(StubError::IndexOutOfRange {
                        kind,
                        parent: *parent,
                        index: *index,
                        len: children.len(),
                    });
                };
                if found != tag {
                    return Err(StubError::WrongChild {
                        parent: *parent,
                        index: *index,
                        expected: tag,
                        found,
                    });
                }
                self.get_mut(kind, *parent)?.children.remove(*index);
                self.get_mut(kind, tag)?.parent = None;
            }
            Mutation::Update { new, .. } => {
                self.get_mut(kind, new.tag())?.layout = new.layout_metrics();
            }
            Mutation::UpdateProps { new, .. } => {
                self.get_mut(kind, new.tag())?.props = new.props().clone();
            }
            Mutation::UpdateState { new, .. } => {
                self.get_mut(kind, new.tag())?.state = new.state().cloned();
            }
        }
        Ok(())
    }

    fn get(&self, kind: MutationKind, tag: Tag) -> Result<&StubView, StubError> {
        self.views.get(&tag).ok_or(StubError::Missing { kind, tag })
    }

    fn get_mut(&mut self, kind: MutationKind, tag: Tag) -> Result<&mut StubView, StubError> {
        self.views
            .get_mut(&tag)
            .ok_or(StubError::Missing { kind, tag })
    }
}

impl Mounter for StubViewTree {
    type Error = StubError;

    fn apply(&mut self, transaction: &Transaction) -> Result<(), StubError> {
        self.apply_all(transaction.mutations())
    }
}

#[cfg(test)]
mod tests {
    use accretion_core::diff::diff;
    use accretion_core::tree::SurfaceId;

    use super::*;
    use crate::TreeBuilder;

    #[test]
    fn from_root_hoists_flattened_children() {
        let mut b = TreeBuilder::new(SurfaceId(1));
        let leaf = b.view([]);
        let flat = b.flattened([leaf]);
        let root = b.root([flat]);

        let stub = StubViewTree::from_root(&root);
        assert_eq!(stub.len(), 2);
        assert_eq!(stub.children_of(Tag(1)), [Tag(2)]);
        assert_eq!(stub.view(Tag(2)).unwrap().parent, Some(Tag(1)));
    }

    #[test]
    fn initial_mount_matches_direct_build() {
        let mut b = TreeBuilder::new(SurfaceId(1));
        let a = b.view([]);
        let c = b.text();
        let inner = b.view([a, c]);
        let root = b.root([inner]);

        let mut stub = StubViewTree::new();
        stub.apply_all(&diff(None, Some(&root))).unwrap();
        assert_eq!(stub, StubViewTree::from_root(&root));
        assert_eq!(stub.root(), Some(root.tag()));
    }

    #[test]
    fn rejects_delete_of_attached_view() {
        let mut b = TreeBuilder::new(SurfaceId(1));
        let child = b.view([]);
        let root = b.root([child]);
        let mut stub = StubViewTree::from_root(&root);

        let delete = diff(Some(&root), None)
            .into_iter()
            .find(|m| m.kind() == MutationKind::Delete)
            .unwrap();
        assert_eq!(
            stub.apply_mutation(&delete),
            Err(StubError::Attached {
                kind: MutationKind::Delete,
                tag: Tag(2),
                parent: Tag(1),
            })
        );
    }

    #[test]
    fn rejects_duplicate_create() {
        let mut b = TreeBuilder::new(SurfaceId(1));
        let root = b.root([]);
        let mut stub = StubViewTree::from_root(&root);
        let create = diff(None, Some(&root)).remove(0);
        assert_eq!(
            stub.apply_mutation(&create),
            Err(StubError::AlreadyExists(Tag(1)))
        );
    }

    #[test]
    fn teardown_empties_the_tree() {
        let mut b = TreeBuilder::new(SurfaceId(1));
        let leaf = b.view([]);
        let mid = b.view([leaf]);
        let root = b.root([mid]);
        let mut stub = StubViewTree::from_root(&root);
        stub.apply_all(&diff(Some(&root), None)).unwrap();
        assert!(stub.is_empty());
        assert_eq!(stub, StubViewTree::new());
    }
}
