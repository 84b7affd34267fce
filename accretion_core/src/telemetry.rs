// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-transaction timing and per-surface aggregation.
//!
//! Every published [`Transaction`](crate::mounting::Transaction) carries a
//! [`TransactionTelemetry`] record with the producer-side stage timings. The
//! consumer fills in the mount stage once it has applied the mutations and
//! reports the record back. A [`TelemetryController`] folds both halves into
//! an [`AggregatedTelemetry`] and keeps a short history of recent records.
//!
//! Aggregation is plain bookkeeping: it never fails and never blocks the
//! commit or mount paths beyond a short mutex hold.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::tree::{Revision, SurfaceId};

/// Stage timings for one transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionTelemetry {
    /// Surface the transaction belongs to.
    pub surface_id: SurfaceId,
    /// Transaction number, counting every published transaction from 1.
    pub number: u64,
    /// Revision the transaction brings the consumer to.
    pub revision: Revision,
    /// When the commit started.
    pub commit_start: Instant,
    /// Layout time reported by the producer.
    pub layout_time: Duration,
    /// Time spent diffing.
    pub diff_time: Duration,
    /// Total commit time, including the diff.
    pub commit_time: Duration,
    /// When the consumer started mounting, if it has.
    pub mount_start: Option<Instant>,
    /// Time the consumer spent applying the mutations.
    pub mount_time: Duration,
    /// Number of mutations in the transaction.
    pub mutation_count: usize,
}

impl TransactionTelemetry {
    /// Records the mount stage.
    pub fn record_mount(&mut self, start: Instant, duration: Duration) {
        self.mount_start = Some(start);
        self.mount_time = duration;
    }

    /// Whether the mount stage has been recorded.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mount_start.is_some()
    }

    /// Time from the start of the commit to the end of the mount.
    ///
    /// Returns `None` until the mount stage is recorded.
    #[must_use]
    pub fn end_to_end(&self) -> Option<Duration> {
        let mount_start = self.mount_start?;
        Some(mount_start.saturating_duration_since(self.commit_start) + self.mount_time)
    }
}

/// Running totals for one surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggregatedTelemetry {
    /// Total layout time.
    pub layout_time: Duration,
    /// Total diff time.
    pub diff_time: Duration,
    /// Total commit time.
    pub commit_time: Duration,
    /// Total mount time.
    pub mount_time: Duration,
    /// Number of published transactions, coalesced ones included.
    pub transaction_count: u64,
    /// Number of transactions whose mount stage was reported.
    pub mount_count: u64,
    /// Total mutations across published transactions.
    pub mutation_count: u64,
    /// Longest single diff.
    pub max_diff_time: Duration,
    /// Longest single commit.
    pub max_commit_time: Duration,
    /// Longest single mount.
    pub max_mount_time: Duration,
}

impl AggregatedTelemetry {
    /// Mean diff time per transaction.
    #[must_use]
    pub fn average_diff_time(&self) -> Duration {
        average(self.diff_time, self.transaction_count)
    }

    /// Mean commit time per transaction.
    #[must_use]
    pub fn average_commit_time(&self) -> Duration {
        average(self.commit_time, self.transaction_count)
    }

    /// Mean mount time per mounted transaction.
    #[must_use]
    pub fn average_mount_time(&self) -> Duration {
        average(self.mount_time, self.mount_count)
    }
}

fn average(total: Duration, count: u64) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    u64::try_from(total.as_nanos() / u128::from(count)).map_or(Duration::MAX, Duration::from_nanos)
}

/// Aggregates transaction telemetry for one surface.
#[derive(Clone, Debug)]
pub struct TelemetryController {
    aggregated: AggregatedTelemetry,
    history: VecDeque<TransactionTelemetry>,
    capacity: usize,
}

impl TelemetryController {
    /// Creates a controller remembering up to `capacity` recent records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            aggregated: AggregatedTelemetry::default(),
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Folds the producer-side stages of a published transaction into the
    /// totals and appends it to the history.
    pub fn incorporate(&mut self, record: &TransactionTelemetry) {
        let agg = &mut self.aggregated;
        agg.layout_time += record.layout_time;
        agg.diff_time += record.diff_time;
        agg.commit_time += record.commit_time;
        agg.transaction_count += 1;
        agg.mutation_count += record.mutation_count as u64;
        agg.max_diff_time = agg.max_diff_time.max(record.diff_time);
        agg.max_commit_time = agg.max_commit_time.max(record.commit_time);
        if record.is_mounted() {
            self.add_mount(record.mount_time);
        }

        if self.capacity == 0 {
            return;
        }
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(*record);
    }

    /// Folds the mount stage of a record previously passed to
    /// [`incorporate`](Self::incorporate).
    ///
    /// Records without a mount stage are ignored. The matching history entry,
    /// if still retained, is updated in place.
    pub fn incorporate_mount(&mut self, record: &TransactionTelemetry) {
        if !record.is_mounted() {
            return;
        }
        self.add_mount(record.mount_time);
        if let Some(entry) = self
            .history
            .iter_mut()
            .rev()
            .find(|entry| entry.number == record.number)
        {
            entry.mount_start = record.mount_start;
            entry.mount_time = record.mount_time;
        }
    }

    fn add_mount(&mut self, mount_time: Duration) {
        let agg = &mut self.aggregated;
        agg.mount_time += mount_time;
        agg.mount_count += 1;
        agg.max_mount_time = agg.max_mount_time.max(mount_time);
    }

    /// The running totals.
    #[must_use]
    pub fn aggregated(&self) -> AggregatedTelemetry {
        self.aggregated
    }

    /// Recent records, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &TransactionTelemetry> {
        self.history.iter()
    }
}
