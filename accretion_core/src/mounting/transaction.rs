// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The unit of handoff between producer and consumer.

use std::sync::Arc;

use crate::diff::Mutation;
use crate::telemetry::TransactionTelemetry;
use crate::tree::{Revision, Snapshot, SurfaceId};

/// A committed snapshot and the mutations that reach it.
///
/// The mutations transform the tree at [`base_revision`](Self::base_revision)
/// (the revision the consumer last pulled, [`Revision::INITIAL`] if none)
/// into the tree at [`revision`](Self::revision). A transaction is handed to
/// exactly one consumer and is not `Clone`.
#[derive(Debug)]
pub struct Transaction {
    pub(crate) surface_id: SurfaceId,
    pub(crate) number: u64,
    pub(crate) revision: Revision,
    pub(crate) base_revision: Revision,
    pub(crate) snapshot: Arc<Snapshot>,
    pub(crate) mutations: Vec<Mutation>,
    pub(crate) telemetry: TransactionTelemetry,
}

impl Transaction {
    /// The surface.
    #[inline]
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Publication sequence number, starting at 1.
    ///
    /// Numbers skipped between two pulled transactions belong to
    /// transactions that were coalesced away.
    #[inline]
    #[must_use]
    pub fn number(&self) -> u64 {
        self.number
    }

    /// The revision this transaction brings the consumer to.
    #[inline]
    #[must_use]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// The revision the mutations start from.
    #[inline]
    #[must_use]
    pub fn base_revision(&self) -> Revision {
        self.base_revision
    }

    /// The committed tree.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    /// The mutations, in application order.
    #[inline]
    #[must_use]
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Producer-side stage timings.
    #[inline]
    #[must_use]
    pub fn telemetry(&self) -> &TransactionTelemetry {
        &self.telemetry
    }

    /// Mutable access to the telemetry, for recording the mount stage.
    #[inline]
    pub fn telemetry_mut(&mut self) -> &mut TransactionTelemetry {
        &mut self.telemetry
    }

    /// Consumes the transaction, returning its mutations.
    #[must_use]
    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}
