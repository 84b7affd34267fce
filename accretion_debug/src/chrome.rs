// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] writes [Chrome Trace Event Format][format] JSON for a list of
//! [`TransactionTelemetry`] records, such as the history returned by
//! [`MountingCoordinator::recent_telemetry`].
//!
//! Each record becomes up to three complete (`"ph": "X"`) events on the
//! surface's process row:
//!
//! - `Commit` on thread 0, spanning the whole commit.
//! - `Diff` on thread 0, nested at the start of the commit.
//! - `Mount` on thread 1, once the consumer has reported the mount stage.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU
//! [`MountingCoordinator::recent_telemetry`]: accretion_core::mounting::MountingCoordinator::recent_telemetry

use std::io::{self, Write};
use std::time::{Duration, Instant};

use serde_json::{Value, json};

use accretion_core::telemetry::TransactionTelemetry;

const COMMIT_THREAD: u32 = 0;
const MOUNT_THREAD: u32 = 1;

/// Exports telemetry records as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are microseconds since `epoch`; instants before it clamp to 0.
pub fn export(
    records: &[TransactionTelemetry],
    epoch: Instant,
    writer: &mut dyn Write,
) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for record in records {
        let pid = record.surface_id.0;
        let commit_ts = since(record.commit_start, epoch);
        events.push(json!({
            "ph": "X",
            "name": "Commit",
            "cat": "Commit",
            "ts": commit_ts,
            "dur": micros(record.commit_time),
            "pid": pid,
            "tid": COMMIT_THREAD,
            "args": {
                "transaction": record.number,
                "revision": record.revision.get(),
                "mutations": record.mutation_count,
                "layout_us": micros(record.layout_time),
            }
        }));
        events.push(json!({
            "ph": "X",
            "name": "Diff",
            "cat": "Commit",
            "ts": commit_ts,
            "dur": micros(record.diff_time),
            "pid": pid,
            "tid": COMMIT_THREAD,
            "args": {
                "transaction": record.number,
            }
        }));
        if let Some(mount_start) = record.mount_start {
            events.push(json!({
                "ph": "X",
                "name": "Mount",
                "cat": "Mount",
                "ts": since(mount_start, epoch),
                "dur": micros(record.mount_time),
                "pid": pid,
                "tid": MOUNT_THREAD,
                "args": {
                    "transaction": record.number,
                    "revision": record.revision.get(),
                    "mutations": record.mutation_count,
                }
            }));
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn since(instant: Instant, epoch: Instant) -> f64 {
    micros(instant.saturating_duration_since(epoch))
}

fn micros(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000_000.0
}
