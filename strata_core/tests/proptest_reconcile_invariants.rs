// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property-based invariant tests for the reconciler.
//!
//! 1. Dirty propagation is complete: every node of the previous tree with a
//!    dirty key at or below it is either classified as non-copy or lies
//!    inside a recreated subtree.
//! 2. With nothing dirty, reconciliation is a pure copy: same keys, same
//!    order, same component instances below the root.
//! 3. Every classification of a copy root is clean.

use std::rc::Rc;

use proptest::prelude::*;
use strata_core::component::{
    Component, ComponentRef, ResolveContext, ResolveError, Resolver, TreeId,
};
use strata_core::key::{DirtyKeys, GlobalKey};
use strata_core::node::{LayoutTree, NodeId, TreeBuilder};
use strata_core::reconcile::{ReconciliationMode, Reconciler};
use strata_core::trace::Tracer;

#[derive(Debug)]
struct Widget;

impl Component for Widget {
    fn type_name(&self) -> &str {
        "Widget"
    }

    fn updated_shallow_copy(&self, _: &ResolveContext, _: &GlobalKey) -> ComponentRef {
        Rc::new(Self)
    }
}

struct LeafResolver;

impl Resolver for LeafResolver {
    fn resolve(
        &mut self,
        _: &ResolveContext,
        component: &ComponentRef,
        key: &GlobalKey,
        builder: &mut TreeBuilder,
    ) -> Result<NodeId, ResolveError> {
        Ok(builder.add_component_node(component.clone(), key.clone()))
    }
}

// ── Strategies ────────────────────────────────────────────────────────────

/// Parent picks for nodes `1..=n`; node `i` hangs off `pick % i`.
fn shape_strategy() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(0usize..1000, 0..=40)
}

/// `(node pick, nested)` pairs; `nested` dirties a key inside the node
/// rather than the node's own key.
fn dirty_strategy() -> impl Strategy<Value = Vec<(usize, bool)>> {
    proptest::collection::vec((0usize..1000, any::<bool>()), 0..=6)
}

fn build(shape: &[usize], ctx: &ResolveContext) -> (LayoutTree, Vec<GlobalKey>) {
    let mut builder = TreeBuilder::new();
    let mut keys = vec![GlobalKey::root("root")];
    let mut ids = vec![builder.add_component_node(Rc::new(Widget), keys[0].clone())];
    let mut child_counts = vec![0usize];
    for (offset, &pick) in shape.iter().enumerate() {
        let i = offset + 1;
        let parent = pick % i;
        let key = keys[parent].child("n", child_counts[parent]);
        child_counts[parent] += 1;
        child_counts.push(0);
        let id = builder.add_component_node(Rc::new(Widget), key.clone());
        builder.add_child(ids[parent], id);
        keys.push(key);
        ids.push(id);
    }
    (builder.finish(ids[0], Some(ctx.stamp())), keys)
}

fn dirty_set(picks: &[(usize, bool)], keys: &[GlobalKey]) -> DirtyKeys {
    let mut dirty = DirtyKeys::new();
    for &(pick, nested) in picks {
        let key = &keys[pick % keys.len()];
        dirty.insert(if nested { key.nested("inner") } else { key.clone() });
    }
    dirty
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Dirty-propagation completeness
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn dirty_nodes_are_never_copied(
        shape in shape_strategy(),
        picks in dirty_strategy(),
    ) {
        let ctx = ResolveContext::new(TreeId(1), "feed");
        let (prev, keys) = build(&shape, &ctx);
        let dirty = dirty_set(&picks, &keys);
        let next = ctx.next_version();

        let out = Reconciler::default()
            .reconcile(
                &next,
                Some(&prev),
                Rc::new(Widget),
                &keys[0],
                &dirty,
                &mut LeafResolver,
                &mut Tracer::none(),
            )
            .unwrap();

        let parents = prev.parent_map();
        for id in prev.iter() {
            let key = prev.node(id).head_key().unwrap();
            if !dirty.any_under(key) {
                continue;
            }
            let mut inside_recreated = false;
            let mut cursor = parents[id.index()];
            while let Some(ancestor) = cursor {
                let ancestor_key = prev.node(ancestor).head_key().unwrap();
                if out.mode_of(ancestor_key) == Some(ReconciliationMode::Recreate) {
                    inside_recreated = true;
                    break;
                }
                cursor = parents[ancestor.index()];
            }
            if inside_recreated {
                continue;
            }
            let mode = out.mode_of(key);
            prop_assert!(
                matches!(
                    mode,
                    Some(ReconciliationMode::Reconcile | ReconciliationMode::Recreate)
                ),
                "{} has a dirty key under it but was classified {:?}",
                key,
                mode
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Copy idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clean_pass_copies_everything(shape in shape_strategy()) {
        let ctx = ResolveContext::new(TreeId(1), "feed");
        let (prev, keys) = build(&shape, &ctx);
        let head: ComponentRef = Rc::new(Widget);

        let out = Reconciler::default()
            .reconcile(
                &ctx.next_version(),
                Some(&prev),
                head.clone(),
                &keys[0],
                &DirtyKeys::new(),
                &mut LeafResolver,
                &mut Tracer::none(),
            )
            .unwrap();

        prop_assert_eq!(out.classifications.len(), 1);
        prop_assert_eq!(out.classifications[0].mode, ReconciliationMode::Copy);
        prop_assert_eq!(out.tree.len(), prev.len());

        for (old, new) in prev.iter().zip(out.tree.iter()) {
            let a = prev.node(old);
            let b = out.tree.node(new);
            prop_assert_eq!(a.head_key(), b.head_key());
            prop_assert_eq!(a.children().len(), b.children().len());
            let expected = if old == NodeId::ROOT {
                &head
            } else {
                &a.head().unwrap().component
            };
            prop_assert!(
                Rc::ptr_eq(expected, &b.head().unwrap().component),
                "component instance changed at {:?}",
                b.head_key()
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Copy roots are clean
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn copy_roots_have_no_dirty_descendants(
        shape in shape_strategy(),
        picks in dirty_strategy(),
    ) {
        let ctx = ResolveContext::new(TreeId(1), "feed");
        let (prev, keys) = build(&shape, &ctx);
        let dirty = dirty_set(&picks, &keys);

        let out = Reconciler::default()
            .reconcile(
                &ctx.next_version(),
                Some(&prev),
                Rc::new(Widget),
                &keys[0],
                &dirty,
                &mut LeafResolver,
                &mut Tracer::none(),
            )
            .unwrap();

        for c in &out.classifications {
            if c.mode == ReconciliationMode::Copy {
                prop_assert!(
                    !dirty.any_under(&c.key),
                    "copied {} although it has dirty descendants",
                    c.key
                );
            }
            if dirty.contains(&c.key) {
                prop_assert_eq!(c.mode, ReconciliationMode::Recreate);
            }
        }
    }
}
