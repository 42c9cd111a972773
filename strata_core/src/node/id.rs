// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout node identity.

use core::fmt;

/// A handle to a node in a [`TreeBuilder`](super::TreeBuilder) or
/// [`LayoutTree`](super::LayoutTree) arena.
///
/// Handles are only meaningful for the arena that issued them. Freezing a
/// builder renumbers nodes in depth-first pre-order, so builder handles do
/// not carry over to the frozen tree (except the root, which is always
/// [`NodeId::ROOT`]).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The root of every frozen [`LayoutTree`](super::LayoutTree).
    pub const ROOT: Self = Self(0);

    /// Returns the raw arena index (for diagnostics and indexing snapshots).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}
