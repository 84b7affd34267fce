// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Commit rejection reasons.

use crate::diff::DiffError;
use crate::tree::{SurfaceId, Tag};

/// Why a commit was rejected.
///
/// Every variant is a programming error in the producer. Depending on
/// [`MountingConfig::panic_on_violation`](super::MountingConfig::panic_on_violation)
/// the coordinator either panics with this error's message or returns it,
/// leaving the surface at its previous tree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    /// A node of another surface was committed.
    #[error("node {tag} belongs to {actual}, not {expected}")]
    SurfaceMismatch {
        /// The committing surface.
        expected: SurfaceId,
        /// The node's surface.
        actual: SurfaceId,
        /// The offending node.
        tag: Tag,
    },
    /// The new root is not a version of the committed root.
    #[error("root {new} of {surface} does not continue committed root {committed}")]
    RootFamilyMismatch {
        /// The surface.
        surface: SurfaceId,
        /// Root tag of the committed tree.
        committed: Tag,
        /// Root tag of the rejected tree.
        new: Tag,
    },
    /// The root is flattened, so there is nothing to mount children into.
    #[error("root {root} of {surface} does not form a view")]
    RootNotMounted {
        /// The surface.
        surface: SurfaceId,
        /// Root tag.
        root: Tag,
    },
    /// One family appears twice under the same parent.
    #[error("duplicate sibling family {child} under {parent} in {surface}")]
    DuplicateSiblingFamily {
        /// The surface.
        surface: SurfaceId,
        /// The shared parent.
        parent: Tag,
        /// The repeated child.
        child: Tag,
    },
    /// One tag appears at two places in the tree.
    #[error("{tag} appears more than once in {surface}")]
    DuplicateTag {
        /// The surface.
        surface: SurfaceId,
        /// The repeated tag.
        tag: Tag,
    },
    /// The tree cannot be reconciled with the mounted tree.
    #[error("cannot reconcile {surface} with its mounted tree: {source}")]
    Unreconcilable {
        /// The surface.
        surface: SurfaceId,
        /// What the differentiator found.
        source: DiffError,
    },
}
