// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mount-level child lists.

use alloc::vec::Vec;

use kurbo::Vec2;

use super::mutation::MountView;
use crate::tree::Node;

/// Returns the children of `node` as the mount tree sees them.
///
/// Children that form views are listed directly. A flattened child
/// contributes no view of its own; its children are hoisted into the list in
/// its place (recursively), with frames offset by the flattened node's
/// origin. If any resulting entry has a non-zero order index, the list is
/// stably sorted by order index.
#[must_use]
pub fn mount_children(node: &Node) -> Vec<MountView> {
    let mut out = Vec::with_capacity(node.children().len());
    collect(node, Vec2::ZERO, &mut out);
    if out.iter().any(|view| view.order_index() != 0) {
        out.sort_by_key(MountView::order_index);
    }
    out
}

fn collect(node: &Node, offset: Vec2, out: &mut Vec<MountView>) {
    for child in node.children() {
        if child.forms_view() {
            let layout = child.layout_metrics().map(|m| m.translated(offset));
            out.push(MountView::new(child.clone(), layout));
        } else {
            let origin = child
                .layout_metrics()
                .map_or(Vec2::ZERO, |m| m.origin().to_vec2());
            collect(child, offset + origin, out);
        }
    }
}
