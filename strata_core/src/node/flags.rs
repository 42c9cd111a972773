// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node property bitsets.

use bitflags::bitflags;

bitflags! {
    /// Which box-model and behavior properties were explicitly set on a node.
    ///
    /// A cleared bit means "use the default", which is distinct from a value
    /// that happens to equal the default.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PropFlags: u16 {
        /// Fixed width.
        const WIDTH = 1 << 0;
        /// Fixed height.
        const HEIGHT = 1 << 1;
        /// Padding insets.
        const PADDING = 1 << 2;
        /// Border insets.
        const BORDER = 1 << 3;
        /// Margin insets.
        const MARGIN = 1 << 4;
        /// Hidden from the accessibility tree (inherited by descendants).
        const ACCESSIBILITY_HIDDEN = 1 << 5;
        /// Disabled for interaction (inherited by descendants).
        const DISABLED = 1 << 6;
    }
}

bitflags! {
    /// Effective inherited state, computed when a tree is frozen.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct InheritedFlags: u8 {
        /// This node or an ancestor is hidden from accessibility.
        const ACCESSIBILITY_HIDDEN = 1 << 0;
        /// This node or an ancestor is disabled.
        const DISABLED = 1 << 1;
    }
}

impl InheritedFlags {
    /// Combines a parent's effective flags with a node's own property bits.
    #[must_use]
    pub fn inherit(parent: Self, own: PropFlags) -> Self {
        let mut flags = parent;
        if own.contains(PropFlags::ACCESSIBILITY_HIDDEN) {
            flags |= Self::ACCESSIBILITY_HIDDEN;
        }
        if own.contains(PropFlags::DISABLED) {
            flags |= Self::DISABLED;
        }
        flags
    }
}
