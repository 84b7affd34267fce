// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Consumer-produced node state threaded back through cloning.

use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

/// Immutable state attached to a node.
///
/// State originates on the mounting side (e.g. a measured scroll offset) and
/// travels back into the scene tree by cloning the owning node with the new
/// value. Two states are equal only when they share the same payload
/// allocation.
#[derive(Clone)]
pub struct State {
    data: Arc<dyn Any + Send + Sync>,
    revision: u64,
}

impl State {
    /// Creates the first state of a node.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self {
            data: Arc::new(data),
            revision: 1,
        }
    }

    /// Creates the successor of this state carrying `data`.
    #[must_use]
    pub fn next<T: Any + Send + Sync>(&self, data: T) -> Self {
        Self {
            data: Arc::new(data),
            revision: self.revision + 1,
        }
    }

    /// Returns the payload if it has type `T`.
    #[must_use]
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref()
    }

    /// Returns how many times this state has been replaced, starting at 1.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}
