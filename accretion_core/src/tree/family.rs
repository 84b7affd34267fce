// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identity shared by every version of one logical node.

use alloc::sync::Arc;
use core::fmt;

use super::component::ComponentDescriptor;
use super::id::{SurfaceId, Tag};

/// The identity of a logical node across revisions.
///
/// Every clone of a [`Node`](super::Node) shares its family handle; a family
/// is created once and never reconstructed. Family identity is pointer
/// identity of the shared allocation.
pub struct Family {
    tag: Tag,
    surface_id: SurfaceId,
    component: &'static ComponentDescriptor,
}

impl Family {
    /// Creates a new family.
    #[must_use]
    pub fn new(
        tag: Tag,
        surface_id: SurfaceId,
        component: &'static ComponentDescriptor,
    ) -> Arc<Self> {
        Arc::new(Self {
            tag,
            surface_id,
            component,
        })
    }

    /// The node's tag.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// The surface this family belongs to.
    #[inline]
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// The component type of every node in this family.
    #[inline]
    #[must_use]
    pub fn component(&self) -> &'static ComponentDescriptor {
        self.component
    }

    /// Whether `a` and `b` are the same family.
    #[inline]
    #[must_use]
    pub fn same(a: &Arc<Self>, b: &Arc<Self>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl fmt::Debug for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Family({} {} in {:?})",
            self.component.name, self.tag, self.surface_id
        )
    }
}
