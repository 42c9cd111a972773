// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frozen layout nodes and trees.

use alloc::vec::Vec;

use kurbo::{Insets, Size};

use crate::component::{ComponentRef, ContextStamp};
use crate::key::GlobalKey;
use crate::solver::LayoutSnapshot;

use super::flags::{InheritedFlags, PropFlags};
use super::id::NodeId;
use super::traverse::Descendants;

/// A contributing component together with its global key.
#[derive(Clone, Debug)]
pub struct ComponentEntry {
    /// The component instance.
    pub component: ComponentRef,
    /// The component's global key.
    pub key: GlobalKey,
}

/// Box-model inputs for a node.
///
/// Only fields whose [`PropFlags`] bit is set are meaningful; the rest hold
/// defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxStyle {
    /// Fixed width, if set.
    pub width: Option<f64>,
    /// Fixed height, if set.
    pub height: Option<f64>,
    /// Padding insets.
    pub padding: Insets,
    /// Border insets.
    pub border: Insets,
    /// Margin insets.
    pub margin: Insets,
}

/// Marks nodes that participate in nested-tree (size-dependent) layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NestedTree {
    /// Holds a size-dependent component whose subtree is resolved only once
    /// the node is measured. Always recreated on reconciliation.
    Holder,
    /// Stands in for a nested tree that has not been resolved yet. A
    /// previous tree rooted at a placeholder cannot be reconciled.
    Placeholder,
}

/// One node of a layout tree.
///
/// Inside a [`LayoutTree`] a node is immutable; only descent into its
/// children is possible. Nodes are created through a
/// [`TreeBuilder`](super::TreeBuilder).
#[derive(Debug)]
pub struct LayoutNode {
    /// Innermost-declared first, head (outermost) last.
    pub(crate) components: Vec<ComponentEntry>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) props: PropFlags,
    pub(crate) style: BoxStyle,
    pub(crate) inherited: InheritedFlags,
    pub(crate) nested: Option<NestedTree>,
    /// Cached solver output from the last measurement.
    pub(crate) measured: Option<Size>,
}

impl LayoutNode {
    pub(crate) fn empty() -> Self {
        Self {
            components: Vec::new(),
            children: Vec::new(),
            props: PropFlags::empty(),
            style: BoxStyle::default(),
            inherited: InheritedFlags::empty(),
            nested: None,
            measured: None,
        }
    }

    /// Copies the documented field set: component snapshot, property bits,
    /// style, nested-tree marker, and cached measurement. Children are left
    /// empty for the caller to fill in.
    pub(crate) fn copied(&self) -> Self {
        Self {
            components: self.components.clone(),
            children: Vec::new(),
            props: self.props,
            style: self.style,
            inherited: InheritedFlags::empty(),
            nested: self.nested,
            measured: self.measured,
        }
    }

    /// Like [`copied`](Self::copied), but with a new component list and the
    /// cached measurement cleared.
    pub(crate) fn with_components(&self, components: Vec<ComponentEntry>) -> Self {
        Self {
            components,
            measured: None,
            ..self.copied()
        }
    }

    /// Returns the contributing components, innermost first.
    #[must_use]
    pub fn components(&self) -> &[ComponentEntry] {
        &self.components
    }

    /// Returns the head (outermost) component, if any.
    #[must_use]
    pub fn head(&self) -> Option<&ComponentEntry> {
        self.components.last()
    }

    /// Returns the head component's key, if any.
    #[must_use]
    pub fn head_key(&self) -> Option<&GlobalKey> {
        self.head().map(|entry| &entry.key)
    }

    /// Returns the node's children in order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns which properties were explicitly set.
    #[must_use]
    pub fn props(&self) -> PropFlags {
        self.props
    }

    /// Returns the box-model inputs.
    #[must_use]
    pub fn style(&self) -> &BoxStyle {
        &self.style
    }

    /// Returns the effective inherited flags.
    #[must_use]
    pub fn inherited(&self) -> InheritedFlags {
        self.inherited
    }

    /// Returns the nested-tree marker, if any.
    #[must_use]
    pub fn nested_tree(&self) -> Option<NestedTree> {
        self.nested
    }

    /// Returns the cached measured size, if this node has been measured and
    /// the cache survived reconciliation.
    #[must_use]
    pub fn measured(&self) -> Option<Size> {
        self.measured
    }

    /// Returns `true` if any contributing component needs its previous
    /// render data.
    #[must_use]
    pub fn needs_previous_render_data(&self) -> bool {
        self.components
            .iter()
            .any(|entry| entry.component.needs_previous_render_data())
    }
}

/// An immutable layout tree.
///
/// Nodes are stored in depth-first pre-order, so the root is always
/// [`NodeId::ROOT`] and every parent precedes its descendants.
#[derive(Debug)]
pub struct LayoutTree {
    pub(crate) nodes: Vec<LayoutNode>,
    pub(crate) stamp: Option<ContextStamp>,
}

impl LayoutTree {
    /// Returns the root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a frozen tree has at least a root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the context stamp the tree was built against, if any.
    #[must_use]
    pub fn stamp(&self) -> Option<ContextStamp> {
        self.stamp
    }

    /// Returns a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &LayoutNode {
        assert!(
            id.index() < self.nodes.len(),
            "{id:?} out of range (len {})",
            self.nodes.len()
        );
        &self.nodes[id.index()]
    }

    /// Returns the children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Iterates all node ids in depth-first pre-order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "nodes were numbered by the builder, which stays within u32"
    )]
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|idx| NodeId(idx as u32))
    }

    /// Iterates `id` and its descendants in depth-first pre-order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants::new(self, id)
    }

    /// Builds the child → parent side map.
    ///
    /// Nodes carry no back-pointers; callers that need parent lookups build
    /// this once per traversal.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "nodes were numbered by the builder, which stays within u32"
    )]
    #[must_use]
    pub fn parent_map(&self) -> Vec<Option<NodeId>> {
        let mut parents = alloc::vec![None; self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            for &child in &node.children {
                parents[child.index()] = Some(NodeId(idx as u32));
            }
        }
        parents
    }

    /// Finds the node whose head component has the given key.
    #[must_use]
    pub fn find_by_key(&self, key: &GlobalKey) -> Option<NodeId> {
        self.iter().find(|&id| self.node(id).head_key() == Some(key))
    }

    /// Consumes the tree and returns it with solver sizes cached on each
    /// measured node.
    ///
    /// # Panics
    ///
    /// Panics if `snapshot` was produced for a tree with a different node
    /// count.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "nodes were numbered by the builder, which stays within u32"
    )]
    #[must_use]
    pub fn with_measurements(mut self, snapshot: &LayoutSnapshot) -> Self {
        assert!(
            snapshot.len() == self.nodes.len(),
            "snapshot covers {} nodes, tree has {}",
            snapshot.len(),
            self.nodes.len()
        );
        for (idx, node) in self.nodes.iter_mut().enumerate() {
            if let Some(layout) = snapshot.get(NodeId(idx as u32)) {
                if !layout.measurement_failed {
                    node.measured = Some(layout.frame.size());
                }
            }
        }
        self
    }
}
