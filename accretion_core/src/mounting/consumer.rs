// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract for mounting consumers.

use super::Transaction;

/// Applies transactions to a native view hierarchy.
///
/// Platform integrations and test doubles implement this trait; the
/// coordinator drives it through
/// [`MountingCoordinator::pull_and_mount`](super::MountingCoordinator::pull_and_mount),
/// which also times the mount.
///
/// # Mount loop pseudocode
///
/// ```rust,ignore
/// fn on_ui_thread(coordinator: &MountingCoordinator, surface: SurfaceId) {
///     // Take the latest transaction, if any, and apply it in list order.
///     if let Some(telemetry) = coordinator.pull_and_mount(surface, &mut views)? {
///         log_frame(telemetry.end_to_end());
///     }
/// }
/// ```
pub trait Mounter {
    /// Why a transaction could not be applied.
    type Error;

    /// Applies `transaction`'s mutations, in order.
    fn apply(&mut self, transaction: &Transaction) -> Result<(), Self::Error>;
}
