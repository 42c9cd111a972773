// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The box-model solver seam.
//!
//! Assigning pixel bounds is not this crate's job. A [`BoxModelSolver`]
//! consumes a frozen [`LayoutTree`] and hands back an immutable
//! [`LayoutSnapshot`]. Solvers may run on another thread; the snapshot is the
//! only thing that crosses back.
//!
//! [`ColumnSolver`] is a deliberately small reference solver that stacks
//! children vertically. It exists for tests and demos.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Insets, Rect, Size};

use crate::node::{LayoutTree, NodeId};

/// Solver output for one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeLayout {
    /// Bounds relative to the parent's origin.
    pub frame: Rect,
    /// Resolved padding.
    pub padding: Insets,
    /// Resolved border.
    pub border: Insets,
    /// The solver hit an error while measuring this node. No output is
    /// generated for it.
    pub measurement_failed: bool,
}

impl NodeLayout {
    /// Creates a successful layout with zero padding and border.
    #[must_use]
    pub fn new(frame: Rect) -> Self {
        Self {
            frame,
            padding: Insets::ZERO,
            border: Insets::ZERO,
            measurement_failed: false,
        }
    }
}

/// Immutable per-node solver results, keyed by [`NodeId`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutSnapshot {
    layouts: Vec<Option<NodeLayout>>,
}

impl LayoutSnapshot {
    /// Creates an empty snapshot covering `len` nodes.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self {
            layouts: vec![None; len],
        }
    }

    /// Records the layout for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn set(&mut self, id: NodeId, layout: NodeLayout) {
        assert!(
            id.index() < self.layouts.len(),
            "{id:?} out of range (len {})",
            self.layouts.len()
        );
        self.layouts[id.index()] = Some(layout);
    }

    /// Returns the layout for `id`, if the solver produced one.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&NodeLayout> {
        self.layouts.get(id.index()).and_then(Option::as_ref)
    }

    /// Returns the number of nodes this snapshot covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    /// Returns `true` if the snapshot covers no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

/// Assigns bounds to every node of a frozen tree.
pub trait BoxModelSolver {
    /// Solves `tree` within `available` space.
    fn solve(&mut self, tree: &LayoutTree, available: Size) -> LayoutSnapshot;
}

/// Stacks children top to bottom inside their parent's content box.
///
/// Width defaults to the parent's content width (the available width at the
/// root); height defaults to the sum of the children's heights plus insets.
#[derive(Clone, Copy, Debug, Default)]
pub struct ColumnSolver;

impl BoxModelSolver for ColumnSolver {
    fn solve(&mut self, tree: &LayoutTree, available: Size) -> LayoutSnapshot {
        let len = tree.len();
        let mut heights = vec![0.0_f64; len];
        // Pre-order storage: walking backwards visits children first.
        for id in tree.iter().collect::<Vec<_>>().into_iter().rev() {
            let node = tree.node(id);
            let style = node.style();
            heights[id.index()] = style.height.unwrap_or_else(|| {
                let inner: f64 = node.children().iter().map(|c| heights[c.index()]).sum();
                inner + style.padding.y_value() + style.border.y_value()
            });
        }

        let mut widths = vec![0.0_f64; len];
        let mut snapshot = LayoutSnapshot::with_len(len);
        let root = NodeId::ROOT;
        widths[root.index()] = tree.node(root).style().width.unwrap_or(available.width);
        let root_frame = Rect::new(0.0, 0.0, widths[root.index()], heights[root.index()]);
        snapshot.set(root, layout_for(tree, root, root_frame));

        for id in tree.iter() {
            let style = *tree.node(id).style();
            let content_x = style.padding.x0 + style.border.x0;
            let content_width =
                widths[id.index()] - style.padding.x_value() - style.border.x_value();
            let mut y = style.padding.y0 + style.border.y0;
            for &child in tree.children(id) {
                let width = tree.node(child).style().width.unwrap_or(content_width);
                widths[child.index()] = width;
                let height = heights[child.index()];
                snapshot.set(
                    child,
                    layout_for(tree, child, Rect::new(content_x, y, content_x + width, y + height)),
                );
                y += height;
            }
        }
        snapshot
    }
}

fn layout_for(tree: &LayoutTree, id: NodeId, frame: Rect) -> NodeLayout {
    let style = tree.node(id).style();
    NodeLayout {
        frame,
        padding: style.padding,
        border: style.border,
        measurement_failed: false,
    }
}
