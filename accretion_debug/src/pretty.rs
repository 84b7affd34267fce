// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable descriptions of mutation lists and mounted view trees.
//!
//! Both functions return a `String` with one line per item, meant for test
//! failure messages and ad-hoc logging.

use std::fmt::Write;

use accretion_core::diff::{MountView, Mutation, mount_children};
use accretion_core::tree::Node;

/// Describes `mutations`, one numbered line each.
///
/// ```text
///    0  Create #4 View
///    1  Insert #4 into #1 at 0
/// ```
#[must_use]
pub fn describe_mutations(mutations: &[Mutation]) -> String {
    let mut out = String::new();
    for (i, mutation) in mutations.iter().enumerate() {
        match mutation {
            Mutation::Create { view } | Mutation::Delete { view } => {
                let _ = writeln!(out, "{i:>4}  {mutation} {}", view.component().name);
            }
            _ => {
                let _ = writeln!(out, "{i:>4}  {mutation}");
            }
        }
    }
    out
}

/// Describes the host view tree `root` mounts as, indented two spaces per
/// level.
///
/// Flattened nodes do not appear; their children are listed under the nearest
/// view-forming ancestor with their offset frames, as a consumer would mount
/// them.
#[must_use]
pub fn describe_tree(root: &Node) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", root.tag(), root.component().name);
    describe_children(root, 1, &mut out);
    out
}

fn describe_children(node: &Node, depth: usize, out: &mut String) {
    for view in mount_children(node) {
        describe_view(&view, depth, out);
        describe_children(view.node(), depth + 1, out);
    }
}

fn describe_view(view: &MountView, depth: usize, out: &mut String) {
    let indent = depth * 2;
    let _ = write!(out, "{:indent$}{} {}", "", view.tag(), view.component().name);
    if let Some(layout) = view.layout_metrics() {
        let frame = layout.frame;
        let _ = write!(
            out,
            " [{} {} {}x{}]",
            frame.x0,
            frame.y0,
            frame.width(),
            frame.height()
        );
    }
    if view.order_index() != 0 {
        let _ = write!(out, " z={}", view.order_index());
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use accretion_core::diff::diff;
    use accretion_core::tree::{LayoutMetrics, SurfaceId};
    use accretion_harness::TreeBuilder;
    use kurbo::Rect;

    #[test]
    fn mutations_are_numbered() {
        let mut b = TreeBuilder::new(SurfaceId(1));
        let child = b.view([]);
        let root = b.root([child]);

        let text = describe_mutations(&diff(None, Some(&root)));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "   0  Create #1 Root",
                "   1  Create #2 View",
                "   2  Insert #2 into #1 at 0",
            ]
        );
    }

    #[test]
    fn empty_list_describes_as_empty_string() {
        assert!(describe_mutations(&[]).is_empty());
    }

    #[test]
    fn tree_hoists_flattened_children() {
        let mut b = TreeBuilder::new(SurfaceId(1));
        let leaf = b
            .view([])
            .with_layout(LayoutMetrics::from_frame(Rect::new(1.0, 2.0, 11.0, 12.0)));
        let wrapper = b
            .flattened([leaf])
            .with_layout(LayoutMetrics::from_frame(Rect::new(10.0, 10.0, 50.0, 50.0)));
        let root = b.root([wrapper]);

        let text = describe_tree(&root);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["#1 Root", "  #2 View [11 12 10x10]"]);
    }
}
