// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component descriptors and per-node mount traits.
//!
//! Component-specific behavior is described by a static
//! [`ComponentDescriptor`] and resolved into [`NodeTraits`] once, when a node
//! is constructed or its props change. The differentiator only ever reads the
//! resolved traits.

use super::props::{PropValue, Props};

/// Whether nodes of a component type contribute a native view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Flattening {
    /// Always mounted as a native view.
    Never,
    /// Never mounted; children are hoisted to the nearest mounted ancestor.
    Always,
    /// Mounted unless the node's props set `collapsable: true`.
    Collapsible,
}

/// Static description of a component type.
///
/// Descriptors are compared by name; two descriptors with the same name are
/// the same component type.
#[derive(Debug)]
pub struct ComponentDescriptor {
    /// Component type name handed to mount consumers.
    pub name: &'static str,
    /// Flattening policy for nodes of this type.
    pub flattening: Flattening,
}

impl ComponentDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub const fn new(name: &'static str, flattening: Flattening) -> Self {
        Self { name, flattening }
    }
}

impl PartialEq for ComponentDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ComponentDescriptor {}

/// Surface root. Never flattened.
pub static ROOT: ComponentDescriptor = ComponentDescriptor::new("Root", Flattening::Never);

/// Generic container, flattened when marked collapsable.
pub static VIEW: ComponentDescriptor = ComponentDescriptor::new("View", Flattening::Collapsible);

/// Text container.
pub static TEXT: ComponentDescriptor = ComponentDescriptor::new("Text", Flattening::Never);

/// Image leaf.
pub static IMAGE: ComponentDescriptor = ComponentDescriptor::new("Image", Flattening::Never);

/// Pure grouping node that never mounts.
pub static FRAGMENT: ComponentDescriptor =
    ComponentDescriptor::new("Fragment", Flattening::Always);

/// Prop key that marks a collapsible node as flattened.
pub const COLLAPSABLE: &str = "collapsable";

/// Prop key holding a node's order index.
pub const Z_INDEX: &str = "zIndex";

/// Mount-relevant traits of one node, resolved at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeTraits {
    /// Whether the node is mounted as a native view.
    pub forms_view: bool,
    /// Sort key among mounted siblings (stable; 0 keeps document order).
    pub order_index: i32,
}

impl NodeTraits {
    /// Resolves the traits of a node of type `component` with `props`.
    #[must_use]
    pub fn resolve(component: &ComponentDescriptor, props: &Props) -> Self {
        let forms_view = match component.flattening {
            Flattening::Never => true,
            Flattening::Always => false,
            Flattening::Collapsible => {
                !matches!(props.get(COLLAPSABLE), Some(PropValue::Bool(true)))
            }
        };
        let order_index = match props.get(Z_INDEX) {
            Some(PropValue::Int(z)) => i32::try_from(*z)
                .unwrap_or(if *z < 0 { i32::MIN } else { i32::MAX }),
            _ => 0,
        };
        Self {
            forms_view,
            order_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_is_collapsible() {
        let plain = NodeTraits::resolve(&VIEW, &Props::new());
        assert!(plain.forms_view);

        let collapsed = NodeTraits::resolve(&VIEW, &Props::new().with(COLLAPSABLE, true));
        assert!(!collapsed.forms_view);
    }

    #[test]
    fn fixed_policies_ignore_props() {
        let props = Props::new().with(COLLAPSABLE, true);
        assert!(NodeTraits::resolve(&TEXT, &props).forms_view);
        assert!(!NodeTraits::resolve(&FRAGMENT, &Props::new()).forms_view);
    }

    #[test]
    fn order_index_reads_z_index() {
        let traits = NodeTraits::resolve(&VIEW, &Props::new().with(Z_INDEX, 3_i64));
        assert_eq!(traits.order_index, 3);

        let clamped = NodeTraits::resolve(&VIEW, &Props::new().with(Z_INDEX, i64::MIN));
        assert_eq!(clamped.order_index, i32::MIN);

        let ignored = NodeTraits::resolve(&VIEW, &Props::new().with(Z_INDEX, 1.5));
        assert_eq!(ignored.order_index, 0);
    }
}
