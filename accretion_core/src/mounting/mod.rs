// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Commit and mount coordination between producer and consumer threads.
//!
//! A *producer* builds trees and calls [`MountingCoordinator::commit`]. A
//! *consumer*, usually on the platform UI thread, calls
//! [`MountingCoordinator::pull_transaction`] (or
//! [`pull_and_mount`](MountingCoordinator::pull_and_mount)) and applies each
//! [`Transaction`]'s mutations to its native views.
//!
//! Each surface moves through `Idle → Committing → TransactionReady →
//! (pulled) → Idle`. Only the latest unpulled transaction is kept; it is
//! always diffed against the tree the consumer last pulled, so skipping the
//! intermediate ones is safe. Revisions seen by the consumer strictly
//! increase.
//!
//! A [`RevisionLock`] pins a surface's committed tree for the duration of a
//! multi-step read. Commits wait for it; pulls do not.

mod config;
mod consumer;
mod coordinator;
mod error;
mod lock;
mod surface;
mod transaction;

pub use config::{CommitOptions, MountingConfig};
pub use consumer::Mounter;
pub use coordinator::MountingCoordinator;
pub use error::CommitError;
pub use lock::RevisionLock;
pub use surface::SurfaceTree;
pub use transaction::Transaction;
