// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mutation list entries.

use alloc::sync::Arc;
use core::fmt;

use crate::tree::{ComponentDescriptor, Family, LayoutMetrics, Node, Props, State, Tag};

/// A node as seen by the mount tree.
///
/// Carries the source node plus its layout metrics re-expressed relative to
/// the nearest view-forming ancestor. For a node that is a direct child of
/// its mount parent the metrics equal the node's own; for a node hoisted past
/// flattened ancestors, the frame is offset by each of their origins.
#[derive(Clone, Debug)]
pub struct MountView {
    node: Node,
    layout: Option<LayoutMetrics>,
}

impl MountView {
    pub(crate) fn new(node: Node, layout: Option<LayoutMetrics>) -> Self {
        Self { node, layout }
    }

    /// The source node.
    #[inline]
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The node's tag.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.node.tag()
    }

    /// The node's family.
    #[inline]
    #[must_use]
    pub fn family(&self) -> &Arc<Family> {
        self.node.family()
    }

    /// The node's component type.
    #[inline]
    #[must_use]
    pub fn component(&self) -> &'static ComponentDescriptor {
        self.node.component()
    }

    /// The node's props.
    #[inline]
    #[must_use]
    pub fn props(&self) -> &Props {
        self.node.props()
    }

    /// The node's state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> Option<&State> {
        self.node.state()
    }

    /// Layout metrics in the mount parent's coordinate space.
    #[inline]
    #[must_use]
    pub fn layout_metrics(&self) -> Option<LayoutMetrics> {
        self.layout
    }

    /// Sort key among mounted siblings.
    #[inline]
    #[must_use]
    pub fn order_index(&self) -> i32 {
        self.node.traits().order_index
    }
}

/// The kind of a [`Mutation`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// See [`Mutation::Create`].
    Create,
    /// See [`Mutation::Delete`].
    Delete,
    /// See [`Mutation::Insert`].
    Insert,
    /// See [`Mutation::Remove`].
    Remove,
    /// See [`Mutation::Update`].
    Update,
    /// See [`Mutation::UpdateProps`].
    UpdateProps,
    /// See [`Mutation::UpdateState`].
    UpdateState,
}

impl MutationKind {
    /// Short name, as used in logs and debug output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Delete => "Delete",
            Self::Insert => "Insert",
            Self::Remove => "Remove",
            Self::Update => "Update",
            Self::UpdateProps => "UpdateProps",
            Self::UpdateState => "UpdateState",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One step of turning a mounted tree into the next one.
///
/// Mutation lists must be applied in order. A created view is detached
/// until inserted, and a view must be removed from its parent (and emptied)
/// before it is deleted.
#[derive(Clone, Debug)]
pub enum Mutation {
    /// Create a detached view.
    Create {
        /// The new view.
        view: MountView,
    },
    /// Destroy a detached view with no children.
    Delete {
        /// The view being destroyed.
        view: MountView,
    },
    /// Attach `view` as the `index`th child of `parent`.
    Insert {
        /// Mount parent.
        parent: Tag,
        /// The view being attached.
        view: MountView,
        /// Position in the parent's child list after insertion.
        index: usize,
    },
    /// Detach the `index`th child of `parent`.
    Remove {
        /// Mount parent.
        parent: Tag,
        /// The view being detached.
        view: MountView,
        /// Position in the parent's child list before removal.
        index: usize,
    },
    /// Layout metrics changed.
    Update {
        /// Mount parent, `None` for the root.
        parent: Option<Tag>,
        /// Previous version.
        old: MountView,
        /// Current version.
        new: MountView,
    },
    /// Props changed.
    UpdateProps {
        /// Mount parent, `None` for the root.
        parent: Option<Tag>,
        /// Previous version.
        old: MountView,
        /// Current version.
        new: MountView,
    },
    /// State changed.
    UpdateState {
        /// Mount parent, `None` for the root.
        parent: Option<Tag>,
        /// Previous version.
        old: MountView,
        /// Current version.
        new: MountView,
    },
}

impl Mutation {
    /// The kind of this mutation.
    #[must_use]
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Create { .. } => MutationKind::Create,
            Self::Delete { .. } => MutationKind::Delete,
            Self::Insert { .. } => MutationKind::Insert,
            Self::Remove { .. } => MutationKind::Remove,
            Self::Update { .. } => MutationKind::Update,
            Self::UpdateProps { .. } => MutationKind::UpdateProps,
            Self::UpdateState { .. } => MutationKind::UpdateState,
        }
    }

    /// The view this mutation affects (the current version for updates).
    #[must_use]
    pub fn view(&self) -> &MountView {
        match self {
            Self::Create { view }
            | Self::Delete { view }
            | Self::Insert { view, .. }
            | Self::Remove { view, .. } => view,
            Self::Update { new, .. }
            | Self::UpdateProps { new, .. }
            | Self::UpdateState { new, .. } => new,
        }
    }

    /// Tag of the affected view.
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.view().tag()
    }

    /// Mount parent, if the mutation has one.
    #[must_use]
    pub fn parent(&self) -> Option<Tag> {
        match self {
            Self::Create { .. } | Self::Delete { .. } => None,
            Self::Insert { parent, .. } | Self::Remove { parent, .. } => Some(*parent),
            Self::Update { parent, .. }
            | Self::UpdateProps { parent, .. }
            | Self::UpdateState { parent, .. } => *parent,
        }
    }

    /// Child index for `Insert` and `Remove`.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Insert { index, .. } | Self::Remove { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert { parent, view, index } => {
                write!(f, "Insert {} into {parent} at {index}", view.tag())
            }
            Self::Remove { parent, view, index } => {
                write!(f, "Remove {} from {parent} at {index}", view.tag())
            }
            _ => write!(f, "{} {}", self.kind(), self.tag()),
        }
    }
}
