// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable scene nodes with copy-on-write cloning.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use super::component::{ComponentDescriptor, NodeTraits};
use super::family::Family;
use super::id::{SurfaceId, Tag};
use super::layout::LayoutMetrics;
use super::props::Props;
use super::state::State;
use super::traverse::Descendants;

/// The parts of a node to set on construction or replace on clone.
///
/// Fields left as `None` take their default on [`Node::new`] and are shared
/// with the original on [`Node::clone_with`].
#[derive(Clone, Debug, Default)]
pub struct NodeFragment {
    /// Replacement props.
    pub props: Option<Props>,
    /// Replacement state.
    pub state: Option<State>,
    /// Replacement child list.
    pub children: Option<Arc<[Node]>>,
    /// Replacement layout metrics.
    pub layout: Option<LayoutMetrics>,
}

impl NodeFragment {
    /// An empty fragment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the props.
    #[must_use]
    pub fn props(mut self, props: Props) -> Self {
        self.props = Some(props);
        self
    }

    /// Sets the state.
    #[must_use]
    pub fn state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }

    /// Sets the children.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children = Some(children.into_iter().collect());
        self
    }

    /// Sets the layout metrics.
    #[must_use]
    pub fn layout(mut self, layout: LayoutMetrics) -> Self {
        self.layout = Some(layout);
        self
    }
}

struct NodeInner {
    family: Arc<Family>,
    props: Props,
    state: Option<State>,
    children: Arc<[Node]>,
    layout: Option<LayoutMetrics>,
    traits: NodeTraits,
    sealed: AtomicBool,
}

impl Clone for NodeInner {
    // A copy is a fresh, unsealed version.
    fn clone(&self) -> Self {
        Self {
            family: self.family.clone(),
            props: self.props.clone(),
            state: self.state.clone(),
            children: self.children.clone(),
            layout: self.layout,
            traits: self.traits,
            sealed: AtomicBool::new(false),
        }
    }
}

/// One UI element at one point in time.
///
/// A `Node` is a cheap, thread-safe handle to immutable contents. Changing a
/// node means building a new one with [`clone_with`](Self::clone_with) (or a
/// helper such as [`with_props`](Self::with_props)); the new node shares its
/// [`Family`] and every unchanged part with the original.
///
/// Nodes become *sealed* once they are part of a committed
/// [`Snapshot`](super::Snapshot). The single in-place mutation path,
/// [`set_layout_metrics`](Self::set_layout_metrics), asserts that the node is
/// still unsealed.
#[derive(Clone)]
pub struct Node(Arc<NodeInner>);

impl Node {
    /// Creates the first version of a node in `family`.
    #[must_use]
    pub fn new(family: Arc<Family>, fragment: NodeFragment) -> Self {
        let props = fragment.props.unwrap_or_default();
        let traits = NodeTraits::resolve(family.component(), &props);
        Self(Arc::new(NodeInner {
            family,
            props,
            state: fragment.state,
            children: fragment.children.unwrap_or_else(|| Arc::from([])),
            layout: fragment.layout,
            traits,
            sealed: AtomicBool::new(false),
        }))
    }

    /// Returns a new version of this node with the parts in `fragment`
    /// replaced.
    ///
    /// The result shares this node's family and every part the fragment does
    /// not replace. `self` is never modified.
    #[must_use]
    pub fn clone_with(&self, fragment: NodeFragment) -> Self {
        let inner = &self.0;
        let traits = match &fragment.props {
            Some(props) => NodeTraits::resolve(inner.family.component(), props),
            None => inner.traits,
        };
        Self(Arc::new(NodeInner {
            family: inner.family.clone(),
            props: fragment.props.unwrap_or_else(|| inner.props.clone()),
            state: fragment.state.or_else(|| inner.state.clone()),
            children: fragment.children.unwrap_or_else(|| inner.children.clone()),
            layout: fragment.layout.or(inner.layout),
            traits,
            sealed: AtomicBool::new(false),
        }))
    }

    /// Returns a new version with `props`.
    #[must_use]
    pub fn with_props(&self, props: Props) -> Self {
        self.clone_with(NodeFragment::new().props(props))
    }

    /// Returns a new version with `state`.
    #[must_use]
    pub fn with_state(&self, state: State) -> Self {
        self.clone_with(NodeFragment::new().state(state))
    }

    /// Returns a new version with `children`.
    #[must_use]
    pub fn with_children(&self, children: impl IntoIterator<Item = Self>) -> Self {
        self.clone_with(NodeFragment::new().children(children))
    }

    /// Returns a new version with `layout`.
    #[must_use]
    pub fn with_layout(&self, layout: LayoutMetrics) -> Self {
        self.clone_with(NodeFragment::new().layout(layout))
    }

    /// Attaches layout metrics in place.
    ///
    /// This is the entry point for the layout collaborator, which fills in
    /// geometry on freshly built nodes before commit. If the node is shared
    /// with another handle, this handle is detached onto a private copy first
    /// so no other observer sees the change.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the node is sealed.
    pub fn set_layout_metrics(&mut self, layout: LayoutMetrics) {
        debug_assert!(
            !self.is_sealed(),
            "cannot mutate sealed node {:?}",
            self.family()
        );
        Arc::make_mut(&mut self.0).layout = Some(layout);
    }

    /// Clones the spine from this node down to the descendant at `path`.
    ///
    /// `path` lists child indices starting below `self`. The descendant is
    /// replaced with `mutator`'s result, and every ancestor on the path is
    /// cloned with its updated child list. Siblings along the way are shared,
    /// so a localized change allocates O(depth) nodes.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range or if `mutator` returns a node of a
    /// different family.
    #[must_use]
    pub fn clone_tree(&self, path: &[usize], mutator: impl FnOnce(&Self) -> Self) -> Self {
        match path.split_first() {
            None => {
                let replacement = mutator(self);
                assert!(
                    replacement.same_family(self),
                    "clone_tree mutator replaced {:?} with {:?}",
                    self.family(),
                    replacement.family()
                );
                replacement
            }
            Some((&index, rest)) => {
                let children = self.children();
                assert!(
                    index < children.len(),
                    "path index {index} out of range for {:?} with {} children",
                    self.family(),
                    children.len()
                );
                let mut next: Vec<Self> = children.to_vec();
                next[index] = children[index].clone_tree(rest, mutator);
                self.with_children(next)
            }
        }
    }

    /// Clones the spine down to the node of `family`, if it is in this
    /// subtree.
    ///
    /// Returns `None` when the family does not occur below (or at) `self`.
    #[must_use]
    pub fn clone_family(
        &self,
        family: &Arc<Family>,
        mutator: impl FnOnce(&Self) -> Self,
    ) -> Option<Self> {
        let path = self.find_path(|n| Family::same(n.family(), family))?;
        Some(self.clone_tree(&path, mutator))
    }

    /// Returns the child-index path from `self` to the node tagged `tag`.
    #[must_use]
    pub fn path_to(&self, tag: Tag) -> Option<Vec<usize>> {
        self.find_path(|n| n.tag() == tag)
    }

    /// Returns the node tagged `tag` in this subtree.
    #[must_use]
    pub fn find(&self, tag: Tag) -> Option<&Self> {
        self.descendants().find(|n| n.tag() == tag)
    }

    /// Pre-order iterator over this node and all of its descendants.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(self)
    }

    fn find_path(&self, matches: impl Fn(&Self) -> bool + Copy) -> Option<Vec<usize>> {
        fn walk(node: &Node, matches: impl Fn(&Node) -> bool + Copy, path: &mut Vec<usize>) -> bool {
            if matches(node) {
                return true;
            }
            for (i, child) in node.children().iter().enumerate() {
                path.push(i);
                if walk(child, matches, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        walk(self, matches, &mut path).then_some(path)
    }

    /// Marks this subtree as committed.
    ///
    /// Stops descending at nodes that are already sealed, since a sealed
    /// node's descendants were sealed with it.
    pub(crate) fn seal_recursive(&self) {
        if self.0.sealed.swap(true, Ordering::AcqRel) {
            return;
        }
        for child in self.children() {
            child.seal_recursive();
        }
    }

    // -- Accessors --

    /// The family handle.
    #[inline]
    #[must_use]
    pub fn family(&self) -> &Arc<Family> {
        &self.0.family
    }

    /// The node's tag.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.0.family.tag()
    }

    /// The surface the node belongs to.
    #[inline]
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.0.family.surface_id()
    }

    /// The node's component type.
    #[inline]
    #[must_use]
    pub fn component(&self) -> &'static ComponentDescriptor {
        self.0.family.component()
    }

    /// The node's props.
    #[inline]
    #[must_use]
    pub fn props(&self) -> &Props {
        &self.0.props
    }

    /// The node's state, if any.
    #[inline]
    #[must_use]
    pub fn state(&self) -> Option<&State> {
        self.0.state.as_ref()
    }

    /// The ordered children.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.0.children
    }

    /// Layout metrics, if a layout pass has run.
    #[inline]
    #[must_use]
    pub fn layout_metrics(&self) -> Option<LayoutMetrics> {
        self.0.layout
    }

    /// Resolved mount traits.
    #[inline]
    #[must_use]
    pub fn traits(&self) -> NodeTraits {
        self.0.traits
    }

    /// Whether the node is mounted as a native view.
    #[inline]
    #[must_use]
    pub fn forms_view(&self) -> bool {
        self.0.traits.forms_view
    }

    /// Whether the node is part of a committed snapshot.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.0.sealed.load(Ordering::Acquire)
    }

    /// Whether both nodes are versions of the same logical node.
    #[inline]
    #[must_use]
    pub fn same_family(&self, other: &Self) -> bool {
        Family::same(&self.0.family, &other.0.family)
    }

    /// Whether both handles point at the same version.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("family", &self.0.family)
            .field("props", &self.0.props)
            .field("state", &self.0.state)
            .field("layout", &self.0.layout)
            .field("children", &self.0.children)
            .finish_non_exhaustive()
    }
}
