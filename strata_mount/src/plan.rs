// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mount plan: an ordered sequence of mount instructions for one pass.

use alloc::vec::Vec;

use kurbo::Rect;
use strata_core::key::GlobalKey;
use strata_core::trace::MountPlanSummary;

/// A single step against the host's mounted content.
///
/// `index` is the position among mounted outputs after the instruction has
/// been applied, so applying a plan in order keeps the host's child list in
/// output traversal order.
#[derive(Clone, Debug, PartialEq)]
pub enum MountInstruction {
    /// Mount a new output at `index`.
    Attach {
        /// Output key.
        key: GlobalKey,
        /// Target position.
        index: usize,
        /// Absolute bounds.
        bounds: Rect,
    },
    /// Unmount an output.
    Detach {
        /// Output key.
        key: GlobalKey,
    },
    /// Move a mounted output to `index`, possibly with new bounds.
    Move {
        /// Output key.
        key: GlobalKey,
        /// Target position.
        index: usize,
        /// Absolute bounds.
        bounds: Rect,
    },
    /// Change the bounds of a mounted output in place.
    UpdateBounds {
        /// Output key.
        key: GlobalKey,
        /// Absolute bounds.
        bounds: Rect,
    },
}

impl MountInstruction {
    /// Returns the key of the output this instruction targets.
    #[must_use]
    pub fn key(&self) -> &GlobalKey {
        match self {
            Self::Attach { key, .. }
            | Self::Detach { key }
            | Self::Move { key, .. }
            | Self::UpdateBounds { key, .. } => key,
        }
    }
}

/// Instructions for one pass: detaches first (reverse mounted order), then
/// attaches, moves and bound updates in output traversal order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MountPlan {
    /// Instructions in application order.
    pub instructions: Vec<MountInstruction>,
}

impl MountPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there is nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.instructions.clear();
    }

    /// Counts instructions per kind.
    #[must_use]
    pub fn summary(&self, pass: u64) -> MountPlanSummary {
        let mut summary = MountPlanSummary {
            pass,
            ..MountPlanSummary::default()
        };
        for instruction in &self.instructions {
            match instruction {
                MountInstruction::Attach { .. } => summary.attached += 1,
                MountInstruction::Detach { .. } => summary.detached += 1,
                MountInstruction::Move { .. } => summary.moved += 1,
                MountInstruction::UpdateBounds { .. } => summary.updated += 1,
            }
        }
        summary
    }
}
