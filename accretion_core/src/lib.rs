// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable scene trees, tree diffing, and thread-safe mount coordination.
//!
//! `accretion_core` keeps a logical scene tree, produced by application
//! logic, in sync with a tree of native views that is owned by a different
//! thread. The scene tree is a persistent data structure; each change
//! produces a new [`Snapshot`](tree::Snapshot) that shares every unchanged
//! subtree with its predecessor. The mount side only ever sees ordered
//! [`Mutation`](diff::Mutation) lists.
//!
//! # Architecture
//!
//! ```text
//!   Producer thread                         Consumer (UI) thread
//!   ───────────────                         ────────────────────
//!   Node::clone_tree() ──► root
//!                           │
//!                           ▼
//!   MountingCoordinator::commit()
//!       │  seal Snapshot, swap committed
//!       │  diff(mounted baseline, new) ──► Transaction
//!       ▼                                      │
//!   SurfaceTree (pending slot, coalescing) ◄───┘
//!                                              │
//!                 pull_transaction() ──────────┴──► Mounter::apply()
//!                                                         │
//!                 report_mount_telemetry() ◄──────────────┘
//! ```
//!
//! **[`tree`]**: Nodes, families, props, state, layout metrics, and sealed
//! snapshots. Changing a node clones only the spine from the root.
//!
//! **[`diff`]**: The pure differentiator. Pairs nodes by family identity,
//! skips shared subtrees by pointer comparison, hoists the children of
//! flattened nodes, and emits removals and insertions in an order that is
//! always valid to apply.
//!
//! **[`registry`]**: The explicit, thread-safe map of live surfaces.
//!
//! **[`mounting`]**: Per-surface commit protocol, the single-slot
//! transaction handoff, revision locks, and the [`Mounter`](mounting::Mounter)
//! trait consumers implement.
//!
//! **[`telemetry`]**: Per-transaction stage timings and per-surface totals.
//!
//! # Crate features
//!
//! - `std` (enabled by default): Enables the [`registry`], [`mounting`], and
//!   [`telemetry`] modules, which need OS threads, locks, and clocks. Without
//!   it the crate is `no_std` with `alloc`, providing [`tree`] and [`diff`].

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod diff;
pub mod tree;

#[cfg(feature = "std")]
pub mod mounting;
#[cfg(feature = "std")]
pub mod registry;
#[cfg(feature = "std")]
pub mod telemetry;
