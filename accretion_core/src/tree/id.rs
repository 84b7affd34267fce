// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node, surface, and revision identity types.

use core::fmt;

/// Stable identity of a node within a surface.
///
/// A tag is assigned once when a [`Family`](super::Family) is created and is
/// never reused while that family is alive. Mount consumers key their native
/// views by tag.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub u32);

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies one independently rendered surface (a root view hierarchy).
///
/// Surfaces are assigned by the host; the core treats them as opaque keys.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SurfaceId(pub u32);

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({})", self.0)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface {}", self.0)
    }
}

/// Commit counter of a surface.
///
/// Revisions of one surface strictly increase with every accepted commit.
/// [`Revision::INITIAL`] means "nothing committed yet".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Revision(pub u64);

impl Revision {
    /// The revision of a surface before its first commit.
    pub const INITIAL: Self = Self(0);

    /// Returns the revision that follows this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw counter value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Revision({})", self.0)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revisions_increase() {
        let first = Revision::INITIAL.next();
        assert_eq!(first, Revision(1));
        assert!(first.next() > first);
    }

    #[test]
    fn debug_formats() {
        assert_eq!(alloc::format!("{:?}", Tag(7)), "Tag(7)");
        assert_eq!(alloc::format!("{:?}", SurfaceId(2)), "SurfaceId(2)");
        assert_eq!(alloc::format!("{}", Revision(3)), "r3");
    }
}
