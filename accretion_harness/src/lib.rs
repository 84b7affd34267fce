// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference mounting consumer and test helpers for `accretion_core`.
//!
//! - [`StubViewTree`] is an in-memory native view hierarchy. It applies
//!   mutation lists while checking every mount invariant (no duplicate
//!   creates, no deleting attached or non-empty views, valid insert and
//!   remove indices) and implements [`Mounter`](accretion_core::mounting::Mounter).
//!   [`StubViewTree::from_root`] builds the expected hierarchy for a tree
//!   straight from its mount children, without the differentiator, so it can
//!   serve as an oracle for diff results.
//! - [`TreeBuilder`] allocates tags and families for hand-written trees.
//! - [`all_paths`] and [`rebuild`] support randomized edits and deep copies
//!   in property tests.

mod builder;
mod stub;

pub use builder::{TreeBuilder, all_paths, rebuild};
pub use stub::{StubError, StubView, StubViewTree};
