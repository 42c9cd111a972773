// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec;
use alloc::vec::Vec;

use super::id::NodeId;
use super::tree::LayoutTree;

/// A depth-first pre-order iterator over a subtree.
///
/// Created by [`LayoutTree::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    tree: &'a LayoutTree,
    stack: Vec<NodeId>,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(tree: &'a LayoutTree, start: NodeId) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        // Push in reverse so the first child is visited next.
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
