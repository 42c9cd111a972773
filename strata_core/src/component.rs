// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The component-resolution seam.
//!
//! Components are authored outside this crate. The reconciler only needs two
//! things from them: a cheap "updated shallow copy" that rebinds an existing
//! component to a new parent context without re-running its render logic,
//! and (for subtrees that must be rebuilt) a [`Resolver`] that turns a
//! component into a fresh layout subtree.

use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

use crate::key::GlobalKey;
use crate::node::{NodeId, TreeBuilder};

/// Shared handle to a component instance.
pub type ComponentRef = Rc<dyn Component>;

/// Identifies the tree a layout pass belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TreeId(pub u32);

/// Context a layout pass resolves components against.
///
/// A previous tree may only be reconciled against a context with the same
/// [`TreeId`]; anything else is treated as stale and rebuilt from scratch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveContext {
    /// The owning tree.
    pub tree: TreeId,
    /// Human-readable tree name, used in error context.
    pub tree_name: String,
    /// Monotonic layout version; bumped once per layout pass.
    pub version: u64,
}

impl ResolveContext {
    /// Creates a context for the first layout pass of a tree.
    #[must_use]
    pub fn new(tree: TreeId, tree_name: impl Into<String>) -> Self {
        Self {
            tree,
            tree_name: tree_name.into(),
            version: 0,
        }
    }

    /// Returns the context for the next layout pass of the same tree.
    #[must_use]
    pub fn next_version(&self) -> Self {
        Self {
            tree: self.tree,
            tree_name: self.tree_name.clone(),
            version: self.version + 1,
        }
    }

    /// Returns the stamp recorded on trees built against this context.
    #[must_use]
    pub fn stamp(&self) -> ContextStamp {
        ContextStamp {
            tree: self.tree,
            version: self.version,
        }
    }
}

/// The part of a [`ResolveContext`] a frozen tree remembers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextStamp {
    /// The owning tree.
    pub tree: TreeId,
    /// Layout version the tree was built at.
    pub version: u64,
}

impl ContextStamp {
    /// Returns `true` if a tree built with this stamp may be reconciled
    /// against `ctx`.
    #[must_use]
    pub fn is_current_for(&self, ctx: &ResolveContext) -> bool {
        self.tree == ctx.tree && self.version <= ctx.version
    }
}

/// A declarative UI component as seen by the reconciler.
pub trait Component: fmt::Debug {
    /// Short type name, used for diagnostics.
    fn type_name(&self) -> &str;

    /// Returns a copy of this component rebound to `ctx` under `key`,
    /// without re-running render logic.
    fn updated_shallow_copy(&self, ctx: &ResolveContext, key: &GlobalKey) -> ComponentRef;

    /// Whether this component needs its previous render output on the next
    /// pass (e.g. accumulating or transition-driving state).
    fn needs_previous_render_data(&self) -> bool {
        false
    }

    /// Whether this component's layout depends on the size it is measured
    /// at. Nodes headed by such components are recreated on every pass
    /// the reconciler inspects them, whether or not they are marked as
    /// nested-tree holders.
    fn is_size_dependent(&self) -> bool {
        false
    }
}

/// Error raised by a [`Resolver`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveError {
    /// Description of the failure.
    pub message: String,
}

impl ResolveError {
    /// Creates a resolve error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for ResolveError {}

/// Builds fresh layout subtrees from components.
///
/// The reconciler calls this for every subtree it classifies as
/// [`Recreate`](crate::reconcile::ReconciliationMode::Recreate).
pub trait Resolver {
    /// Resolves `component` (keyed `key`) into a new subtree inside
    /// `builder` and returns the subtree's root node.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the component cannot be resolved.
    fn resolve(
        &mut self,
        ctx: &ResolveContext,
        component: &ComponentRef,
        key: &GlobalKey,
        builder: &mut TreeBuilder,
    ) -> Result<NodeId, ResolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_matches_same_tree() {
        let ctx = ResolveContext::new(TreeId(1), "feed");
        let stamp = ctx.stamp();
        assert!(stamp.is_current_for(&ctx.next_version()), "later pass, same tree");
        assert!(
            !stamp.is_current_for(&ResolveContext::new(TreeId(2), "other")),
            "different tree is stale"
        );
    }

    #[test]
    fn stamp_from_future_version_is_stale() {
        let ctx = ResolveContext::new(TreeId(1), "feed");
        let later = ctx.next_version().next_version();
        assert!(!later.stamp().is_current_for(&ctx), "tree newer than context");
    }
}
