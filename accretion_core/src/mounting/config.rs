// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinator configuration.

use std::time::Duration;

/// Configuration shared by every surface of a
/// [`MountingCoordinator`](super::MountingCoordinator).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MountingConfig {
    /// Panic on a rejected commit instead of logging and returning the error.
    pub panic_on_violation: bool,
    /// Walk each committed tree checking that tags are unique and every node
    /// belongs to the committing surface. Without it, such trees reach the
    /// differentiator, which panics on the duplicates it encounters.
    pub validate_commits: bool,
    /// Number of recent transaction telemetry records kept per surface.
    pub telemetry_history: usize,
}

impl MountingConfig {
    /// Fail fast on every detected violation.
    #[must_use]
    pub const fn development() -> Self {
        Self {
            panic_on_violation: true,
            validate_commits: true,
            telemetry_history: 64,
        }
    }

    /// Reject bad commits and keep the surface at its last good tree.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            panic_on_violation: false,
            validate_commits: true,
            telemetry_history: 16,
        }
    }
}

impl Default for MountingConfig {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::production()
        }
    }
}

/// Per-commit inputs besides the tree itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitOptions {
    /// Time the producer spent in layout for this tree.
    pub layout_time: Duration,
}
