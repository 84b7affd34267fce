// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and Chrome trace export for accretion diagnostics.
//!
//! - [`pretty::describe_mutations`] and [`pretty::describe_tree`] render
//!   mutation lists and mounted view trees as indented text.
//! - [`chrome::export`] writes Chrome Trace Event Format JSON from recorded
//!   [`TransactionTelemetry`](accretion_core::telemetry::TransactionTelemetry).

pub mod chrome;
pub mod pretty;
