// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree reconciliation.
//!
//! [`Reconciler::reconcile`] merges a frozen previous [`LayoutTree`] with a
//! newly resolved head component and produces a new tree. Every subtree is
//! classified top-down:
//!
//! ```text
//!   nested-tree holder ─────────────────────────────▶ Recreate
//!   size-dependent head ────────────────────────────▶ Recreate
//!   own component key dirty ────────────────────────▶ Recreate
//!   some dirty key under head key ──────────────────▶ Reconcile (recurse)
//!   otherwise ──────────────────────────────────────▶ Copy (no inspection)
//! ```
//!
//! The previous tree is only read. Copies share component instances with it
//! through reference counting; nothing in it is mutated.

use alloc::vec::Vec;
use core::fmt;

use crate::component::{ComponentRef, ResolveContext, ResolveError, Resolver};
use crate::key::{DirtyKeys, GlobalKey};
use crate::node::{ComponentEntry, LayoutNode, LayoutTree, NestedTree, NodeId, TreeBuilder};
use crate::trace::{PassBeginEvent, PassEndEvent, PassKind, ReconcileSummary, Tracer};

/// How a subtree of the previous tree is carried into the new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReconciliationMode {
    /// Clone the node and its entire subtree without further inspection.
    Copy,
    /// Shallow-copy the node (clearing caches) and classify each child.
    Reconcile,
    /// Discard the subtree and rebuild it through the [`Resolver`].
    Recreate,
}

/// Reconciler limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Deepest node (root is depth 0) the reconciler will recurse into.
    pub max_depth: u32,
}

impl ReconcilerConfig {
    /// Creates a config with the given depth limit.
    #[must_use]
    pub const fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self::new(256)
    }
}

/// One classification decision, recorded in traversal order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Head key of the classified node (the enclosing key for nodes without
    /// components).
    pub key: GlobalKey,
    /// Depth below the reconcile root.
    pub depth: u32,
    /// The chosen mode.
    pub mode: ReconciliationMode,
}

/// Output of a reconciliation.
#[derive(Debug)]
pub struct Reconciled {
    /// The new frozen tree, stamped with the resolve context.
    pub tree: LayoutTree,
    /// Classification decisions in traversal order. Descendants of copied
    /// subtrees are not inspected and have no entry.
    pub classifications: Vec<Classification>,
    /// Components of the new tree that asked to keep their previous render
    /// data reachable, in traversal order.
    pub previous_render_data: Vec<ComponentEntry>,
    /// Counts for diagnostics.
    pub summary: ReconcileSummary,
}

impl Reconciled {
    /// Returns the recorded mode for `key`, if the node was classified.
    #[must_use]
    pub fn mode_of(&self, key: &GlobalKey) -> Option<ReconciliationMode> {
        self.classifications
            .iter()
            .find(|c| &c.key == key)
            .map(|c| c.mode)
    }
}

/// Errors returned by [`Reconciler::reconcile`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileError {
    /// The tree is deeper than [`ReconcilerConfig::max_depth`].
    DepthLimitExceeded {
        /// Depth of the offending node.
        depth: u32,
        /// The offending node's key.
        key: GlobalKey,
    },
    /// The resolver failed to rebuild a subtree.
    Resolve {
        /// Key of the subtree being rebuilt.
        key: GlobalKey,
        /// The resolver's error.
        source: ResolveError,
    },
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DepthLimitExceeded { depth, key } => {
                write!(f, "reconciliation depth {depth} exceeded the limit at {key}")
            }
            Self::Resolve { key, source } => write!(f, "failed to resolve {key}: {source}"),
        }
    }
}

impl core::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Resolve { source, .. } => Some(source),
            Self::DepthLimitExceeded { .. } => None,
        }
    }
}

/// Classifies a single node of a previous tree.
///
/// `scope` is the nearest enclosing head key; it stands in for the head key
/// of nodes that have no contributing components. Nested-tree holders and
/// nodes headed by a size-dependent component are always recreated.
#[must_use]
pub fn classify(node: &LayoutNode, scope: &GlobalKey, dirty: &DirtyKeys) -> ReconciliationMode {
    let Some(head) = node.head() else {
        return if dirty.any_under(scope) {
            ReconciliationMode::Reconcile
        } else {
            ReconciliationMode::Copy
        };
    };
    if node.nested_tree() == Some(NestedTree::Holder) || head.component.is_size_dependent() {
        return ReconciliationMode::Recreate;
    }
    if node.components().iter().any(|entry| dirty.contains(&entry.key)) {
        return ReconciliationMode::Recreate;
    }
    if dirty.any_under(&head.key) {
        ReconciliationMode::Reconcile
    } else {
        ReconciliationMode::Copy
    }
}

/// Merges previous layout trees with new head components.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reconciler {
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Creates a reconciler with the given limits.
    #[must_use]
    pub fn new(config: ReconcilerConfig) -> Self {
        Self { config }
    }

    /// Returns the configured limits.
    #[must_use]
    pub fn config(&self) -> ReconcilerConfig {
        self.config
    }

    /// Produces the tree for `next_head` (keyed `next_head_key`), reusing as
    /// much of `previous` as `dirty` allows.
    ///
    /// The whole tree is rebuilt through `resolver` when there is no
    /// previous tree, its context stamp is missing or stale, its root has no
    /// head component (or a different head key), or its root is a
    /// nested-tree placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::DepthLimitExceeded`] if a reconciled node
    /// lies deeper than the configured limit, and
    /// [`ReconcileError::Resolve`] if the resolver fails.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "builder indices are u32, so node counts fit"
    )]
    pub fn reconcile(
        &self,
        ctx: &ResolveContext,
        previous: Option<&LayoutTree>,
        next_head: ComponentRef,
        next_head_key: &GlobalKey,
        dirty: &DirtyKeys,
        resolver: &mut dyn Resolver,
        tracer: &mut Tracer<'_>,
    ) -> Result<Reconciled, ReconcileError> {
        tracer.pass_begin(&PassBeginEvent {
            kind: PassKind::Reconcile,
            pass: ctx.version,
        });

        let mut pass = Pass {
            ctx,
            dirty,
            resolver,
            builder: TreeBuilder::new(),
            classifications: Vec::new(),
            max_depth: self.config.max_depth,
            summary: ReconcileSummary {
                version: ctx.version,
                ..ReconcileSummary::default()
            },
        };

        let root = match previous.filter(|prev| is_reusable(prev, ctx, next_head_key)) {
            Some(prev) => pass.visit(prev, NodeId::ROOT, Some(&next_head), next_head_key, 0)?,
            None => {
                pass.summary.full_rebuild = true;
                pass.classifications.push(Classification {
                    key: next_head_key.clone(),
                    depth: 0,
                    mode: ReconciliationMode::Recreate,
                });
                pass.recreate(&next_head, next_head_key)?
            }
        };

        let Pass {
            builder,
            classifications,
            mut summary,
            ..
        } = pass;
        let tree = builder.finish(root, Some(ctx.stamp()));
        let previous_render_data: Vec<ComponentEntry> = tree
            .iter()
            .flat_map(|id| tree.node(id).components())
            .filter(|entry| entry.component.needs_previous_render_data())
            .cloned()
            .collect();
        summary.nodes = tree.len() as u32;
        summary.previous_render_data = previous_render_data.len() as u32;

        #[cfg(feature = "trace-rich")]
        for c in &classifications {
            tracer.classification(&crate::trace::ClassificationEvent {
                version: ctx.version,
                depth: c.depth,
                key: c.key.as_str(),
                mode: c.mode,
            });
        }
        tracer.reconcile(&summary);
        tracer.pass_end(&PassEndEvent {
            kind: PassKind::Reconcile,
            pass: ctx.version,
        });

        Ok(Reconciled {
            tree,
            classifications,
            previous_render_data,
            summary,
        })
    }
}

fn is_reusable(prev: &LayoutTree, ctx: &ResolveContext, next_head_key: &GlobalKey) -> bool {
    if !prev.stamp().is_some_and(|stamp| stamp.is_current_for(ctx)) {
        return false;
    }
    let root = prev.node(NodeId::ROOT);
    root.head_key() == Some(next_head_key) && root.nested_tree() != Some(NestedTree::Placeholder)
}

struct Pass<'a> {
    ctx: &'a ResolveContext,
    dirty: &'a DirtyKeys,
    resolver: &'a mut dyn Resolver,
    builder: TreeBuilder,
    classifications: Vec<Classification>,
    max_depth: u32,
    summary: ReconcileSummary,
}

impl Pass<'_> {
    /// Classifies `id` and emits its replacement into the builder.
    ///
    /// `head_override` replaces the head component (only at the reconcile
    /// root, where the caller already resolved the new head).
    fn visit(
        &mut self,
        prev: &LayoutTree,
        id: NodeId,
        head_override: Option<&ComponentRef>,
        scope: &GlobalKey,
        depth: u32,
    ) -> Result<NodeId, ReconcileError> {
        let node = prev.node(id);
        let key = node.head_key().unwrap_or(scope);
        if depth > self.max_depth {
            return Err(ReconcileError::DepthLimitExceeded {
                depth,
                key: key.clone(),
            });
        }

        let mode = classify(node, scope, self.dirty);
        self.classifications.push(Classification {
            key: key.clone(),
            depth,
            mode,
        });

        match mode {
            ReconciliationMode::Copy => {
                self.summary.copied += 1;
                Ok(self.copy_subtree(prev, id, head_override))
            }
            ReconciliationMode::Reconcile => {
                self.summary.reconciled += 1;
                let mut components: Vec<ComponentEntry> = node
                    .components()
                    .iter()
                    .map(|entry| ComponentEntry {
                        component: entry.component.updated_shallow_copy(self.ctx, &entry.key),
                        key: entry.key.clone(),
                    })
                    .collect();
                if let (Some(head), Some(last)) = (head_override, components.last_mut()) {
                    last.component = head.clone();
                }
                let new_id = self.builder.push_node(node.with_components(components));
                for &child in node.children() {
                    let new_child = self.visit(prev, child, None, key, depth + 1)?;
                    self.builder.add_child(new_id, new_child);
                }
                Ok(new_id)
            }
            ReconciliationMode::Recreate => {
                // `classify` only recreates nodes that have a head.
                let component = match (head_override, node.head()) {
                    (Some(head), _) => head.clone(),
                    (None, Some(entry)) => entry.component.updated_shallow_copy(self.ctx, key),
                    (None, None) => unreachable!("recreate classified for a headless node"),
                };
                self.recreate(&component, key)
            }
        }
    }

    fn recreate(
        &mut self,
        component: &ComponentRef,
        key: &GlobalKey,
    ) -> Result<NodeId, ReconcileError> {
        self.summary.recreated += 1;
        self.resolver
            .resolve(self.ctx, component, key, &mut self.builder)
            .map_err(|source| ReconcileError::Resolve {
                key: key.clone(),
                source,
            })
    }

    /// Clones the subtree at `root` without inspecting it.
    ///
    /// Frozen trees are numbered in pre-order, so the subtree occupies the
    /// contiguous index range starting at `root`.
    fn copy_subtree(
        &mut self,
        prev: &LayoutTree,
        root: NodeId,
        head_override: Option<&ComponentRef>,
    ) -> NodeId {
        let base = root.index();
        let mut copies: Vec<NodeId> = Vec::new();
        for old in prev.descendants(root) {
            debug_assert_eq!(
                old.index() - base,
                copies.len(),
                "frozen subtree is not numbered in pre-order"
            );
            let mut node = prev.node(old).copied();
            let head = if old == root { head_override } else { None };
            if let (Some(head), Some(last)) = (head, node.components.last_mut()) {
                last.component = head.clone();
            }
            copies.push(self.builder.push_node(node));
        }
        for old in prev.descendants(root) {
            let parent = copies[old.index() - base];
            for &child in prev.children(old) {
                self.builder.add_child(parent, copies[child.index() - base]);
            }
        }
        copies[0]
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;

    use kurbo::{Rect, Size};

    use super::*;
    use crate::component::{Component, TreeId};
    use crate::solver::{LayoutSnapshot, NodeLayout};

    #[derive(Clone, Copy, Debug)]
    struct Tracked {
        generation: u32,
        needs_previous: bool,
    }

    impl Component for Tracked {
        fn type_name(&self) -> &str {
            "Tracked"
        }

        fn updated_shallow_copy(&self, _: &ResolveContext, _: &GlobalKey) -> ComponentRef {
            Rc::new(Self {
                generation: self.generation + 1,
                ..*self
            })
        }

        fn needs_previous_render_data(&self) -> bool {
            self.needs_previous
        }
    }

    fn tracked() -> ComponentRef {
        Rc::new(Tracked {
            generation: 0,
            needs_previous: false,
        })
    }

    #[derive(Default)]
    struct CountingResolver {
        resolved: Vec<String>,
        fail_on: Option<GlobalKey>,
    }

    impl Resolver for CountingResolver {
        fn resolve(
            &mut self,
            _: &ResolveContext,
            component: &ComponentRef,
            key: &GlobalKey,
            builder: &mut TreeBuilder,
        ) -> Result<NodeId, ResolveError> {
            if self.fail_on.as_ref() == Some(key) {
                return Err(ResolveError::new("boom"));
            }
            self.resolved.push(String::from(key.as_str()));
            Ok(builder.add_component_node(component.clone(), key.clone()))
        }
    }

    fn ctx() -> ResolveContext {
        ResolveContext::new(TreeId(7), "feed")
    }

    /// `root` with three leaf children `root.child[0..3]`.
    fn feed(ctx: &ResolveContext) -> LayoutTree {
        let root_key = GlobalKey::root("root");
        let mut b = TreeBuilder::new();
        let root = b.add_component_node(tracked(), root_key.clone());
        for i in 0..3 {
            let child = b.add_component_node(tracked(), root_key.child("child", i));
            b.add_child(root, child);
        }
        b.finish(root, Some(ctx.stamp()))
    }

    fn measured(tree: LayoutTree) -> LayoutTree {
        let mut snapshot = LayoutSnapshot::with_len(tree.len());
        for id in tree.iter() {
            snapshot.set(id, NodeLayout::new(Rect::new(0.0, 0.0, 10.0, 10.0)));
        }
        tree.with_measurements(&snapshot)
    }

    fn run(
        prev: Option<&LayoutTree>,
        dirty: &[&str],
        resolver: &mut CountingResolver,
    ) -> Result<Reconciled, ReconcileError> {
        let next = ctx().next_version();
        let dirty: DirtyKeys = dirty.iter().map(|k| GlobalKey::from(*k)).collect();
        Reconciler::default().reconcile(
            &next,
            prev,
            tracked(),
            &GlobalKey::root("root"),
            &dirty,
            resolver,
            &mut Tracer::none(),
        )
    }

    fn keys(tree: &LayoutTree) -> Vec<&str> {
        tree.iter()
            .map(|id| tree.node(id).head_key().map_or("", GlobalKey::as_str))
            .collect()
    }

    #[test]
    fn dirty_leaf_is_recreated_and_siblings_copied() {
        let prev = feed(&ctx());
        let mut resolver = CountingResolver::default();
        let out = run(Some(&prev), &["root.child[2]"], &mut resolver).unwrap();

        let modes: Vec<_> = out.classifications.iter().map(|c| c.mode).collect();
        assert_eq!(
            modes,
            [
                ReconciliationMode::Reconcile,
                ReconciliationMode::Copy,
                ReconciliationMode::Copy,
                ReconciliationMode::Recreate,
            ]
        );
        assert_eq!(
            out.mode_of(&GlobalKey::from("root")),
            Some(ReconciliationMode::Reconcile)
        );
        assert_eq!(resolver.resolved, ["root.child[2]"]);
        assert_eq!(keys(&out.tree), keys(&prev), "sibling order preserved");
        assert_eq!(out.summary.copied, 2);
        assert_eq!(out.summary.reconciled, 1);
        assert_eq!(out.summary.recreated, 1);
        assert!(!out.summary.full_rebuild);
    }

    #[test]
    fn clean_tree_is_copied_twice_identically() {
        let prev = measured(feed(&ctx()));
        let mut resolver = CountingResolver::default();
        let first = run(Some(&prev), &[], &mut resolver).unwrap();
        let second = run(Some(&first.tree), &[], &mut resolver).unwrap();

        assert!(resolver.resolved.is_empty(), "copy never resolves");
        assert_eq!(first.classifications.len(), 1, "descendants not inspected");
        assert_eq!(keys(&first.tree), keys(&second.tree));
        for id in first.tree.iter().skip(1) {
            let a = &first.tree.node(id).components()[0].component;
            let b = &second.tree.node(id).components()[0].component;
            assert!(Rc::ptr_eq(a, b), "copy shares component instances");
            assert_eq!(second.tree.node(id).measured(), Some(Size::new(10.0, 10.0)));
        }
    }

    #[test]
    fn reconcile_clears_measurement_and_refreshes_components() {
        let prev = measured(feed(&ctx()));
        let mut resolver = CountingResolver::default();
        let out = run(Some(&prev), &["root.child[1].inner"], &mut resolver).unwrap();

        assert_eq!(
            out.mode_of(&GlobalKey::from("root.child[1]")),
            Some(ReconciliationMode::Reconcile)
        );
        let id = out.tree.find_by_key(&GlobalKey::from("root.child[1]")).unwrap();
        assert_eq!(out.tree.node(id).measured(), None, "reconcile drops the cache");
        let prev_id = prev.find_by_key(&GlobalKey::from("root.child[1]")).unwrap();
        assert!(!Rc::ptr_eq(
            &out.tree.node(id).components()[0].component,
            &prev.node(prev_id).components()[0].component
        ));
        let copied = out.tree.find_by_key(&GlobalKey::from("root.child[0]")).unwrap();
        assert_eq!(out.tree.node(copied).measured(), Some(Size::new(10.0, 10.0)));
    }

    #[test]
    fn previous_tree_is_left_untouched() {
        let prev = measured(feed(&ctx()));
        let before: Vec<_> = prev.iter().map(|id| prev.node(id).measured()).collect();
        let mut resolver = CountingResolver::default();
        let _out = run(Some(&prev), &["root", "root.child[0]"], &mut resolver).unwrap();
        let after: Vec<_> = prev.iter().map(|id| prev.node(id).measured()).collect();
        assert_eq!(before, after);
        assert_eq!(keys(&prev), ["root", "root.child[0]", "root.child[1]", "root.child[2]"]);
    }

    #[test]
    fn root_head_is_replaced_by_next_head() {
        let prev = feed(&ctx());
        let next_head = tracked();
        let out = Reconciler::default()
            .reconcile(
                &ctx().next_version(),
                Some(&prev),
                next_head.clone(),
                &GlobalKey::root("root"),
                &DirtyKeys::new(),
                &mut CountingResolver::default(),
                &mut Tracer::none(),
            )
            .unwrap();
        let head = out.tree.node(NodeId::ROOT).head().unwrap();
        assert!(Rc::ptr_eq(&head.component, &next_head));
    }

    #[test]
    fn stale_or_missing_previous_rebuilds_everything() {
        let mut resolver = CountingResolver::default();
        let out = run(None, &[], &mut resolver).unwrap();
        assert!(out.summary.full_rebuild);
        assert_eq!(resolver.resolved, ["root"]);

        let other = ResolveContext::new(TreeId(99), "other");
        let prev = feed(&other);
        let mut resolver = CountingResolver::default();
        let out = run(Some(&prev), &[], &mut resolver).unwrap();
        assert!(out.summary.full_rebuild, "different tree id is stale");
        assert_eq!(out.classifications.len(), 1);
        assert_eq!(out.classifications[0].mode, ReconciliationMode::Recreate);
    }

    #[test]
    fn placeholder_root_rebuilds_everything() {
        let mut b = TreeBuilder::new();
        let root = b.add_component_node(tracked(), GlobalKey::root("root"));
        b.set_nested_tree(root, NestedTree::Placeholder);
        let prev = b.finish(root, Some(ctx().stamp()));
        let mut resolver = CountingResolver::default();
        let out = run(Some(&prev), &[], &mut resolver).unwrap();
        assert!(out.summary.full_rebuild);
    }

    #[test]
    fn headless_root_rebuilds_everything() {
        let mut b = TreeBuilder::new();
        let root = b.add_node();
        let prev = b.finish(root, Some(ctx().stamp()));
        let mut resolver = CountingResolver::default();
        let out = run(Some(&prev), &[], &mut resolver).unwrap();
        assert!(out.summary.full_rebuild);
    }

    #[test]
    fn nested_tree_holder_is_always_recreated() {
        let root_key = GlobalKey::root("root");
        let mut b = TreeBuilder::new();
        let root = b.add_component_node(tracked(), root_key.clone());
        let holder = b.add_component_node(tracked(), root_key.child("sized", 0));
        b.set_nested_tree(holder, NestedTree::Holder);
        b.add_child(root, holder);
        let prev = b.finish(root, Some(ctx().stamp()));

        let mut resolver = CountingResolver::default();
        // The root must be reconciled for the holder to be inspected at all.
        let out = run(Some(&prev), &["root.sized[0].x"], &mut resolver).unwrap();
        assert_eq!(
            out.mode_of(&GlobalKey::from("root.sized[0]")),
            Some(ReconciliationMode::Recreate)
        );
    }

    #[test]
    fn copied_subtree_keeps_nested_structure() {
        let root_key = GlobalKey::root("root");
        let group_key = root_key.child("group", 0);
        let mut b = TreeBuilder::new();
        let root = b.add_component_node(tracked(), root_key.clone());
        let group = b.add_component_node(tracked(), group_key.clone());
        let inner = b.add_component_node(tracked(), group_key.child("inner", 0));
        let leaf_key = group_key.child("inner", 0).child("leaf", 0);
        let leaf = b.add_component_node(tracked(), leaf_key);
        let sibling = b.add_component_node(tracked(), group_key.child("inner", 1));
        let other = b.add_component_node(tracked(), root_key.child("other", 0));
        b.add_child(inner, leaf);
        b.add_child(group, inner);
        b.add_child(group, sibling);
        b.add_child(root, group);
        b.add_child(root, other);
        let prev = b.finish(root, Some(ctx().stamp()));

        let mut resolver = CountingResolver::default();
        let out = run(Some(&prev), &["root.other[0]"], &mut resolver).unwrap();
        assert_eq!(out.mode_of(&group_key), Some(ReconciliationMode::Copy));
        assert_eq!(keys(&out.tree), keys(&prev));
        let group = out.tree.children(out.tree.root())[0];
        assert_eq!(out.tree.children(group).len(), 2);
        let inner = out.tree.children(group)[0];
        assert_eq!(out.tree.children(inner).len(), 1);
    }

    #[derive(Debug)]
    struct Measured;

    impl Component for Measured {
        fn type_name(&self) -> &str {
            "Measured"
        }

        fn updated_shallow_copy(&self, _: &ResolveContext, _: &GlobalKey) -> ComponentRef {
            Rc::new(Self)
        }

        fn is_size_dependent(&self) -> bool {
            true
        }
    }

    #[test]
    fn size_dependent_heads_are_recreated_without_holder_marker() {
        let root_key = GlobalKey::root("root");
        let mut b = TreeBuilder::new();
        let root = b.add_component_node(tracked(), root_key.clone());
        let sized = b.add_component_node(Rc::new(Measured), root_key.child("s", 0));
        let other = b.add_component_node(Rc::new(Measured), root_key.child("o", 0));
        b.add_child(root, sized);
        b.add_child(root, other);
        let prev = b.finish(root, Some(ctx().stamp()));

        let mut resolver = CountingResolver::default();
        let out = run(Some(&prev), &["root.o[0].x"], &mut resolver).unwrap();
        assert_eq!(
            out.mode_of(&GlobalKey::from("root.s[0]")),
            Some(ReconciliationMode::Recreate),
            "clean size-dependent node must not be copied"
        );
        assert_eq!(
            out.mode_of(&GlobalKey::from("root.o[0]")),
            Some(ReconciliationMode::Recreate)
        );
        assert_eq!(resolver.resolved, ["root.s[0]", "root.o[0]"]);
    }

    #[test]
    fn headless_nodes_use_enclosing_scope() {
        let root_key = GlobalKey::root("root");
        let mut b = TreeBuilder::new();
        let root = b.add_component_node(tracked(), root_key.clone());
        let wrapper = b.add_node();
        let leaf = b.add_component_node(tracked(), root_key.child("leaf", 0));
        b.add_child(root, wrapper);
        b.add_child(wrapper, leaf);
        let prev = b.finish(root, Some(ctx().stamp()));

        let mut resolver = CountingResolver::default();
        let out = run(Some(&prev), &["root.leaf[0]"], &mut resolver).unwrap();
        let modes: Vec<_> = out.classifications.iter().map(|c| c.mode).collect();
        assert_eq!(
            modes,
            [
                ReconciliationMode::Reconcile,
                ReconciliationMode::Reconcile,
                ReconciliationMode::Recreate,
            ]
        );
        assert_eq!(out.tree.len(), 3);
    }

    #[test]
    fn depth_limit_is_enforced() {
        let root_key = GlobalKey::root("root");
        let mut b = TreeBuilder::new();
        let mut key = root_key.clone();
        let root = b.add_component_node(tracked(), key.clone());
        let mut parent = root;
        for _ in 0..3 {
            key = key.child("n", 0);
            let child = b.add_component_node(tracked(), key.clone());
            b.add_child(parent, child);
            parent = child;
        }
        let prev = b.finish(root, Some(ctx().stamp()));
        let dirty: DirtyKeys = [key].into_iter().collect();

        let err = Reconciler::new(ReconcilerConfig::new(1))
            .reconcile(
                &ctx(),
                Some(&prev),
                tracked(),
                &root_key,
                &dirty,
                &mut CountingResolver::default(),
                &mut Tracer::none(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            ReconcileError::DepthLimitExceeded {
                depth: 2,
                key: GlobalKey::from("root.n[0].n[0]"),
            }
        );
    }

    #[test]
    fn resolver_failure_carries_key() {
        let prev = feed(&ctx());
        let mut resolver = CountingResolver {
            fail_on: Some(GlobalKey::from("root.child[0]")),
            ..CountingResolver::default()
        };
        let err = run(Some(&prev), &["root.child[0]"], &mut resolver).unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Resolve { ref key, .. } if key.as_str() == "root.child[0]"
        ));
    }

    #[test]
    fn previous_render_data_components_are_collected() {
        let root_key = GlobalKey::root("root");
        let mut b = TreeBuilder::new();
        let root = b.add_component_node(tracked(), root_key.clone());
        let accumulating: ComponentRef = Rc::new(Tracked {
            generation: 0,
            needs_previous: true,
        });
        let child = b.add_component_node(accumulating, root_key.child("log", 0));
        b.add_child(root, child);
        let prev = b.finish(root, Some(ctx().stamp()));

        let mut resolver = CountingResolver::default();
        let out = run(Some(&prev), &["root.log[0].entry"], &mut resolver).unwrap();
        let collected: Vec<_> = out
            .previous_render_data
            .iter()
            .map(|entry| entry.key.as_str())
            .collect();
        assert_eq!(collected, vec!["root.log[0]"]);
        assert_eq!(out.summary.previous_render_data, 1);
    }
}
