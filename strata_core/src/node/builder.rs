// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mutable builder stage for layout trees.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Insets;

use crate::component::{ComponentRef, ContextStamp};
use crate::key::GlobalKey;

use super::flags::{InheritedFlags, PropFlags};
use super::id::NodeId;
use super::tree::{ComponentEntry, LayoutNode, LayoutTree, NestedTree};

const NO_PARENT: u32 = u32::MAX;

/// Arena of mutable layout nodes.
///
/// Nodes are created detached, wired together with
/// [`add_child`](Self::add_child), and frozen into an immutable
/// [`LayoutTree`] with [`finish`](Self::finish). Freezing is the only way to
/// share a tree; there is no way back to the builder stage.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<LayoutNode>,
    parent: Vec<u32>,
}

impl TreeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Creates a detached node with no components.
    pub fn add_node(&mut self) -> NodeId {
        self.push_node(LayoutNode::empty())
    }

    /// Creates a detached node headed by `component`.
    pub fn add_component_node(&mut self, component: ComponentRef, key: GlobalKey) -> NodeId {
        let id = self.add_node();
        self.push_component(id, component, key);
        id
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "length is checked against the u32 index space above"
    )]
    pub(crate) fn push_node(&mut self, node: LayoutNode) -> NodeId {
        assert!(
            self.nodes.len() < NO_PARENT as usize,
            "layout tree exceeds the u32 index space"
        );
        let idx = self.nodes.len() as u32;
        self.nodes.push(node);
        self.parent.push(NO_PARENT);
        NodeId(idx)
    }

    /// Pushes an outer contributing component onto a node. The most recently
    /// pushed component becomes the node's head.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range or if `key` does not extend the current
    /// head's key.
    pub fn push_component(&mut self, id: NodeId, component: ComponentRef, key: GlobalKey) {
        let node = self.node_mut(id);
        // Outer components wrap inner ones, so their keys are prefixes.
        if let Some(head) = node.components.last() {
            assert!(
                key.is_prefix_of(&head.key),
                "outer component key {key} must prefix inner key {}",
                head.key
            );
        }
        node.components.push(ComponentEntry { component, key });
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is out of range, if `child` already has a
    /// parent, or if both nodes have head components and the child's head
    /// key does not extend the parent's head key.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.check(parent);
        self.check(child);
        assert!(parent != child, "node cannot be its own child");
        assert!(
            self.parent[child.index()] == NO_PARENT,
            "child already has a parent"
        );
        if let (Some(p), Some(c)) = (
            self.nodes[parent.index()].head_key(),
            self.nodes[child.index()].head_key(),
        ) {
            assert!(
                p.is_prefix_of(c),
                "child key {c} is not in the key namespace of {p}"
            );
        }
        self.parent[child.index()] = parent.0;
        self.nodes[parent.index()].children.push(child);
    }

    /// Sets a fixed width.
    pub fn set_width(&mut self, id: NodeId, width: f64) {
        let node = self.node_mut(id);
        node.style.width = Some(width);
        node.props |= PropFlags::WIDTH;
    }

    /// Sets a fixed height.
    pub fn set_height(&mut self, id: NodeId, height: f64) {
        let node = self.node_mut(id);
        node.style.height = Some(height);
        node.props |= PropFlags::HEIGHT;
    }

    /// Sets padding insets.
    pub fn set_padding(&mut self, id: NodeId, padding: Insets) {
        let node = self.node_mut(id);
        node.style.padding = padding;
        node.props |= PropFlags::PADDING;
    }

    /// Sets border insets.
    pub fn set_border(&mut self, id: NodeId, border: Insets) {
        let node = self.node_mut(id);
        node.style.border = border;
        node.props |= PropFlags::BORDER;
    }

    /// Sets margin insets.
    pub fn set_margin(&mut self, id: NodeId, margin: Insets) {
        let node = self.node_mut(id);
        node.style.margin = margin;
        node.props |= PropFlags::MARGIN;
    }

    /// Hides the node and its subtree from accessibility.
    pub fn set_accessibility_hidden(&mut self, id: NodeId) {
        self.node_mut(id).props |= PropFlags::ACCESSIBILITY_HIDDEN;
    }

    /// Disables the node and its subtree.
    pub fn set_disabled(&mut self, id: NodeId) {
        self.node_mut(id).props |= PropFlags::DISABLED;
    }

    /// Marks the node as taking part in nested-tree layout.
    pub fn set_nested_tree(&mut self, id: NodeId, role: NestedTree) {
        self.node_mut(id).nested = Some(role);
    }

    /// Freezes the subtree rooted at `root` into an immutable tree.
    ///
    /// Nodes are renumbered in depth-first pre-order, nodes not reachable
    /// from `root` are dropped, and inherited flags (accessibility-hidden,
    /// disabled) are propagated downward.
    ///
    /// # Panics
    ///
    /// Panics if `root` is out of range or has a parent.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "finish only sees nodes push_node accepted"
    )]
    #[must_use]
    pub fn finish(self, root: NodeId, stamp: Option<ContextStamp>) -> LayoutTree {
        self.check(root);
        assert!(
            self.parent[root.index()] == NO_PARENT,
            "tree root must not have a parent"
        );

        let mut slots: Vec<Option<LayoutNode>> = self.nodes.into_iter().map(Some).collect();
        let mut nodes = Vec::with_capacity(slots.len());
        // (old index, new parent index, parent's inherited flags)
        let mut stack = vec![(root.0, NO_PARENT, InheritedFlags::empty())];

        while let Some((old, new_parent, parent_flags)) = stack.pop() {
            let Some(mut node) = slots[old as usize].take() else {
                unreachable!("node reachable twice; builder topology is corrupt");
            };
            let new_idx = nodes.len() as u32;
            if new_parent != NO_PARENT {
                let parent: &mut LayoutNode = &mut nodes[new_parent as usize];
                parent.children.push(NodeId(new_idx));
            }
            node.inherited = InheritedFlags::inherit(parent_flags, node.props);
            let old_children = core::mem::take(&mut node.children);
            let flags = node.inherited;
            for child in old_children.iter().rev() {
                stack.push((child.0, new_idx, flags));
            }
            nodes.push(node);
        }

        LayoutTree { nodes, stamp }
    }

    fn check(&self, id: NodeId) {
        assert!(
            id.index() < self.nodes.len(),
            "{id:?} out of range (len {})",
            self.nodes.len()
        );
    }

    fn node_mut(&mut self, id: NodeId) -> &mut LayoutNode {
        self.check(id);
        &mut self.nodes[id.index()]
    }
}
