// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree construction helpers.

use std::sync::Arc;

use accretion_core::tree::{
    COLLAPSABLE, ComponentDescriptor, FRAGMENT, Family, IMAGE, Node, NodeFragment, Props, ROOT,
    SurfaceId, TEXT, Tag, VIEW,
};

/// Allocates tags and families for one surface.
///
/// The root family is created up front with `Tag(1)`, so every
/// [`root`](Self::root) call returns a new version of the same root. Other
/// nodes get fresh tags counting up from 2.
#[derive(Debug)]
pub struct TreeBuilder {
    surface_id: SurfaceId,
    root: Arc<Family>,
    next_tag: u32,
}

impl TreeBuilder {
    /// Creates a builder for `surface_id`.
    #[must_use]
    pub fn new(surface_id: SurfaceId) -> Self {
        Self {
            surface_id,
            root: Family::new(Tag(1), surface_id, &ROOT),
            next_tag: 2,
        }
    }

    /// The surface nodes are built for.
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Creates a family with the next free tag.
    pub fn family(&mut self, component: &'static ComponentDescriptor) -> Arc<Family> {
        let tag = Tag(self.next_tag);
        self.next_tag += 1;
        Family::new(tag, self.surface_id, component)
    }

    /// A version of the surface's root with `children`.
    #[must_use]
    pub fn root(&self, children: impl IntoIterator<Item = Node>) -> Node {
        Node::new(self.root.clone(), NodeFragment::new().children(children))
    }

    /// A new node of `component`.
    pub fn node(
        &mut self,
        component: &'static ComponentDescriptor,
        props: Props,
        children: impl IntoIterator<Item = Node>,
    ) -> Node {
        let family = self.family(component);
        Node::new(family, NodeFragment::new().props(props).children(children))
    }

    /// A new view-forming `View`.
    pub fn view(&mut self, children: impl IntoIterator<Item = Node>) -> Node {
        self.node(&VIEW, Props::new(), children)
    }

    /// A new `View` with `collapsable` set, so it is flattened.
    pub fn flattened(&mut self, children: impl IntoIterator<Item = Node>) -> Node {
        self.node(&VIEW, Props::new().with(COLLAPSABLE, true), children)
    }

    /// A new always-flattened fragment.
    pub fn fragment(&mut self, children: impl IntoIterator<Item = Node>) -> Node {
        self.node(&FRAGMENT, Props::new(), children)
    }

    /// A new childless `Text`.
    pub fn text(&mut self) -> Node {
        self.node(&TEXT, Props::new(), [])
    }

    /// A new childless `Image`.
    pub fn image(&mut self) -> Node {
        self.node(&IMAGE, Props::new(), [])
    }
}

/// Child-index paths of every node under `root`, in pre-order, starting
/// with the empty path for `root` itself.
#[must_use]
pub fn all_paths(root: &Node) -> Vec<Vec<usize>> {
    fn walk(node: &Node, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        out.push(path.clone());
        for (i, child) in node.children().iter().enumerate() {
            path.push(i);
            walk(child, path, out);
            path.pop();
        }
    }

    let mut out = Vec::new();
    walk(root, &mut Vec::new(), &mut out);
    out
}

/// Rebuilds every node of `node`'s subtree as a fresh allocation with the
/// same family and contents.
///
/// The result is deep-equal to the input but shares no nodes with it, which
/// defeats the differentiator's pointer short-circuit.
#[must_use]
pub fn rebuild(node: &Node) -> Node {
    node.with_children(node.children().iter().map(rebuild).collect::<Vec<_>>())
}
