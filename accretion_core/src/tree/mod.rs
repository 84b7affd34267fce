// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable scene-tree data model.
//!
//! A *node* is one UI element at one point in time. Each node has:
//!
//! - A [`Family`]: the identity shared by every version of the same logical
//!   node. Families are created once, compared by pointer, and carry the
//!   node's [`Tag`], [`SurfaceId`], and [`ComponentDescriptor`].
//! - Immutable contents set by the caller: [`Props`], an optional [`State`],
//!   ordered children, and optional [`LayoutMetrics`].
//! - Resolved [`NodeTraits`] that decide how the node is mounted.
//!
//! Nodes are never edited in place. A change produces a new version with
//! [`Node::clone_with`], and a change deep in the tree clones only the spine
//! from the root to the changed node with [`Node::clone_tree`]. Everything
//! off the spine is shared between the old and new trees, which is what lets
//! the [`diff`](crate::diff) skip unchanged subtrees by pointer comparison.
//!
//! # Sealing
//!
//! Wrapping a root in a [`Snapshot`] seals every node in it. The only
//! in-place mutation, [`Node::set_layout_metrics`], asserts (in debug
//! builds) that its node is unsealed.

mod component;
mod family;
mod id;
mod layout;
mod node;
mod props;
mod snapshot;
mod state;
mod traverse;

pub use component::{
    COLLAPSABLE, ComponentDescriptor, FRAGMENT, Flattening, IMAGE, NodeTraits, ROOT, TEXT, VIEW,
    Z_INDEX,
};
pub use family::Family;
pub use id::{Revision, SurfaceId, Tag};
pub use layout::{Display, LayoutMetrics};
pub use node::{Node, NodeFragment};
pub use props::{PropValue, Props};
pub use snapshot::Snapshot;
pub use state::State;
pub use traverse::Descendants;
