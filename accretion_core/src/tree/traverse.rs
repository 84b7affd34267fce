// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec;
use alloc::vec::Vec;

use super::node::Node;

/// A pre-order iterator over a node and its descendants.
///
/// Created by [`Node::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(root: &'a Node) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::tree::component::VIEW;
    use crate::tree::{Family, Node, NodeFragment, SurfaceId, Tag};

    fn leaf(tag: u32) -> Node {
        Node::new(
            Family::new(Tag(tag), SurfaceId(1), &VIEW),
            NodeFragment::new(),
        )
    }

    #[test]
    fn visits_in_pre_order() {
        let root = leaf(1).with_children([
            leaf(2).with_children([leaf(3), leaf(4)]),
            leaf(5).with_children([leaf(6)]),
        ]);
        let tags: Vec<u32> = root.descendants().map(|n| n.tag().0).collect();
        assert_eq!(tags, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn single_node() {
        let root = leaf(7);
        assert_eq!(root.descendants().count(), 1);
    }
}
