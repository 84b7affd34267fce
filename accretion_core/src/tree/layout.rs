// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry produced by the external layout pass.
//!
//! The core never computes layout. A layout collaborator attaches
//! [`LayoutMetrics`] to nodes before a tree is committed; the differentiator
//! only compares and forwards them.

use kurbo::{Insets, Point, Rect, Vec2};

/// How a node participates in layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Display {
    /// Laid out as a flex item.
    #[default]
    Flex,
    /// Excluded from layout and drawing.
    None,
}

/// Geometry of one node, relative to its logical parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutMetrics {
    /// Frame in the parent's coordinate space.
    pub frame: Rect,
    /// Insets of the content area inside the frame.
    pub content_insets: Insets,
    /// Border widths.
    pub border_width: Insets,
    /// Display mode.
    pub display: Display,
    /// Physical pixels per layout point.
    pub point_scale_factor: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            frame: Rect::ZERO,
            content_insets: Insets::ZERO,
            border_width: Insets::ZERO,
            display: Display::Flex,
            point_scale_factor: 1.0,
        }
    }
}

impl LayoutMetrics {
    /// Metrics with the given frame and default everything else.
    #[must_use]
    pub fn from_frame(frame: Rect) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }

    /// Origin of the frame.
    #[must_use]
    pub fn origin(&self) -> Point {
        self.frame.origin()
    }

    /// Returns these metrics with the frame moved by `offset`.
    ///
    /// Used when a node is hoisted past flattened ancestors: its frame is
    /// re-expressed in the coordinate space of the nearest mounted ancestor.
    #[must_use]
    pub fn translated(self, offset: Vec2) -> Self {
        Self {
            frame: self.frame + offset,
            ..self
        }
    }
}
