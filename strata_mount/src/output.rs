// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mountable outputs of a solved layout tree.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Rect, Vec2};
use strata_core::key::GlobalKey;
use strata_core::node::{LayoutTree, NodeId};
use strata_core::solver::LayoutSnapshot;
use strata_core::window::WindowItem;

/// A keyed node with solved, absolute bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct MountableOutput {
    /// Head key of the node.
    pub key: GlobalKey,
    /// The node in the tree the output was collected from.
    pub node: NodeId,
    /// Bounds in root coordinates.
    pub bounds: Rect,
}

/// Margins applied when deriving window items from outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindowConfig {
    /// How far above an output's top edge its enter band starts.
    pub lead_margin: f64,
    /// How far below an output's bottom edge its enter band ends.
    pub lag_margin: f64,
}

impl WindowConfig {
    /// Creates a config with the given margins.
    #[must_use]
    pub const fn new(lead_margin: f64, lag_margin: f64) -> Self {
        Self {
            lead_margin,
            lag_margin,
        }
    }

    /// Enter bands equal the output bounds.
    pub const EXACT: Self = Self::new(0.0, 0.0);
}

/// Collects every keyed node of `tree` with its absolute bounds, in
/// pre-order.
///
/// Frames in `snapshot` are relative to the parent; offsets are accumulated
/// on the way down. Nodes the solver failed to measure (or left out) produce
/// no output, and neither do their descendants, whose position is unknown.
/// Headless nodes contribute their offset but are not outputs themselves.
///
/// # Panics
///
/// Panics if `snapshot` does not cover exactly the nodes of `tree`.
#[must_use]
pub fn collect_outputs(tree: &LayoutTree, snapshot: &LayoutSnapshot) -> Vec<MountableOutput> {
    assert_eq!(
        snapshot.len(),
        tree.len(),
        "layout snapshot does not match the tree"
    );
    let mut offsets: Vec<Option<Vec2>> = vec![None; tree.len()];
    offsets[tree.root().index()] = Some(Vec2::ZERO);

    let mut outputs = Vec::new();
    for id in tree.iter() {
        let Some(offset) = offsets[id.index()] else {
            continue;
        };
        let Some(layout) = snapshot.get(id).filter(|l| !l.measurement_failed) else {
            continue;
        };
        let bounds = layout.frame + offset;
        let origin = bounds.origin().to_vec2();
        for &child in tree.children(id) {
            offsets[child.index()] = Some(origin);
        }
        if let Some(key) = tree.node(id).head_key() {
            outputs.push(MountableOutput {
                key: key.clone(),
                node: id,
                bounds,
            });
        }
    }
    outputs
}

/// Derives one window item per output, keyed by the output's global key.
///
/// The items carry no callbacks; chain
/// [`WindowItem::on_enter`] / [`WindowItem::on_exit`] onto them as needed.
#[must_use]
pub fn window_items(outputs: &[MountableOutput], config: &WindowConfig) -> Vec<WindowItem> {
    outputs
        .iter()
        .map(|output| {
            WindowItem::new(output.key.as_str(), output.bounds).with_thresholds(
                output.bounds.y0 - config.lead_margin,
                output.bounds.y1 + config.lag_margin,
            )
        })
        .collect()
}
