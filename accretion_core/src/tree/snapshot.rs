// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Committed, sealed tree versions.

use alloc::vec::Vec;

use super::id::{Revision, SurfaceId, Tag};
use super::node::Node;

/// A sealed tree for one surface at one revision.
///
/// Creating a snapshot seals every node reachable from the root. Snapshots
/// are shared between the coordinator and consumers through `Arc` and never
/// change afterwards.
#[derive(Clone, Debug)]
pub struct Snapshot {
    surface_id: SurfaceId,
    revision: Revision,
    root: Node,
}

impl Snapshot {
    /// Seals `root` and wraps it as the tree of `surface_id` at `revision`.
    ///
    /// # Panics
    ///
    /// Panics if `root` belongs to a different surface.
    #[must_use]
    pub fn new(surface_id: SurfaceId, revision: Revision, root: Node) -> Self {
        assert_eq!(
            root.surface_id(),
            surface_id,
            "root {:?} does not belong to {surface_id}",
            root.family()
        );
        root.seal_recursive();
        Self {
            surface_id,
            revision,
            root,
        }
    }

    /// The surface this snapshot belongs to.
    #[inline]
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// The snapshot's revision.
    #[inline]
    #[must_use]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// The root node.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Returns the node tagged `tag`.
    #[must_use]
    pub fn find(&self, tag: Tag) -> Option<&Node> {
        self.root.find(tag)
    }

    /// Returns the child-index path from the root to the node tagged `tag`.
    #[must_use]
    pub fn path_to(&self, tag: Tag) -> Option<Vec<usize>> {
        self.root.path_to(tag)
    }

    /// Number of nodes in the tree, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.root.descendants().count()
    }
}
