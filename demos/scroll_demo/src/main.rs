// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated scroll session that exercises the whole layout/mount pipeline.
//!
//! A feed of rows is resolved, solved and mounted while a viewport scrolls
//! down it. Halfway through, one row's state changes, so the tree is
//! reconciled against the previous one. One row's enter callback requests a
//! further mutation pass from inside the running pass, which the coordinator
//! replays afterwards.
//!
//! Events go to both a
//! [`PrettyPrintSink`](strata_debug::pretty::PrettyPrintSink) on stdout and a
//! [`RecorderSink`](strata_debug::recorder::RecorderSink), which is exported
//! as a Chrome trace JSON file at the end.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Stdout};
use std::rc::Rc;

use kurbo::{Insets, Rect, Size};
use strata_core::component::{
    Component, ComponentRef, ResolveContext, ResolveError, Resolver, TreeId,
};
use strata_core::coordinator::{AdapterError, MountCoordinator, MountHandle, MutationRequest};
use strata_core::key::{DirtyKeys, GlobalKey};
use strata_core::node::{LayoutTree, NodeId, TreeBuilder};
use strata_core::reconcile::Reconciler;
use strata_core::solver::{BoxModelSolver, ColumnSolver};
use strata_core::state::StateContainer;
use strata_core::trace::{
    ClassificationEvent, MountOverflowEvent, MountPlanSummary, MountRequestEvent, PassBeginEvent,
    PassEndEvent, RangeChangeEvent, ReconcileSummary, TraceSink, Tracer, VisibilitySummary,
};
use strata_core::window::WindowItem;
use strata_debug::pretty::PrettyPrintSink;
use strata_debug::recorder::RecorderSink;
use strata_mount::{
    MountAdapter, MountInstruction, Mounter, WindowConfig, collect_outputs, window_items,
};

const ROW_COUNT: usize = 40;
const ROW_HEIGHT: f64 = 48.0;
const WIDTH: f64 = 360.0;
const VIEWPORT_HEIGHT: f64 = 640.0;
const SCROLL_STEP: f64 = 120.0;
const STEPS: u32 = 12;
const EXPAND_AT: u32 = 6;
const EXPANDED_ROW: usize = 9;
const REPLAY_ROW: usize = 14;

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Feed;

#[derive(Debug)]
struct Row;

#[derive(Debug)]
struct Label;

macro_rules! plain_component {
    ($ty:ident) => {
        impl Component for $ty {
            fn type_name(&self) -> &str {
                stringify!($ty)
            }

            fn updated_shallow_copy(&self, _: &ResolveContext, _: &GlobalKey) -> ComponentRef {
                Rc::new(Self)
            }
        }
    };
}

plain_component!(Feed);
plain_component!(Row);
plain_component!(Label);

/// Resolves the feed root and individual rows.
struct FeedResolver {
    root: GlobalKey,
    rows: Vec<GlobalKey>,
    index: BTreeMap<GlobalKey, usize>,
    heights: Vec<f64>,
}

impl FeedResolver {
    fn new(root: GlobalKey, count: usize) -> Self {
        let rows: Vec<GlobalKey> = (0..count).map(|i| root.child("row", i)).collect();
        let index = rows.iter().cloned().enumerate().map(|(i, k)| (k, i)).collect();
        Self {
            root,
            rows,
            index,
            heights: vec![ROW_HEIGHT; count],
        }
    }

    fn build_row(&self, i: usize, builder: &mut TreeBuilder) -> NodeId {
        let key = &self.rows[i];
        let row = builder.add_component_node(Rc::new(Row), key.clone());
        builder.set_padding(row, Insets::uniform(4.0));
        let label = builder.add_component_node(Rc::new(Label), key.child("label", 0));
        builder.set_height(label, self.heights[i] - 8.0);
        builder.add_child(row, label);
        row
    }
}

impl Resolver for FeedResolver {
    fn resolve(
        &mut self,
        _: &ResolveContext,
        component: &ComponentRef,
        key: &GlobalKey,
        builder: &mut TreeBuilder,
    ) -> Result<NodeId, ResolveError> {
        if *key == self.root {
            let root = builder.add_component_node(component.clone(), key.clone());
            for i in 0..self.rows.len() {
                let row = self.build_row(i, builder);
                builder.add_child(root, row);
            }
            return Ok(root);
        }
        match self.index.get(key) {
            Some(&i) => Ok(self.build_row(i, builder)),
            None => Err(ResolveError::new(format!("no component at {key}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Host side
// ---------------------------------------------------------------------------

/// Stands in for a native view hierarchy.
#[derive(Debug, Default)]
struct CountingAdapter {
    mounted: usize,
    applied: usize,
}

impl MountAdapter for CountingAdapter {
    fn apply(&mut self, instruction: &MountInstruction) -> Result<(), AdapterError> {
        match instruction {
            MountInstruction::Attach { .. } => self.mounted += 1,
            MountInstruction::Detach { .. } => self.mounted -= 1,
            MountInstruction::Move { .. } | MountInstruction::UpdateBounds { .. } => {}
        }
        self.applied += 1;
        Ok(())
    }
}

/// Fans events out to the pretty printer and the recorder.
struct Tee {
    pretty: PrettyPrintSink<Stdout>,
    recorder: RecorderSink,
}

impl TraceSink for Tee {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.pretty.on_pass_begin(e);
        self.recorder.on_pass_begin(e);
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        self.pretty.on_pass_end(e);
        self.recorder.on_pass_end(e);
    }

    fn on_reconcile(&mut self, s: &ReconcileSummary) {
        self.pretty.on_reconcile(s);
        self.recorder.on_reconcile(s);
    }

    fn on_visibility(&mut self, s: &VisibilitySummary) {
        self.pretty.on_visibility(s);
        self.recorder.on_visibility(s);
    }

    fn on_mount_request(&mut self, e: &MountRequestEvent) {
        self.pretty.on_mount_request(e);
        self.recorder.on_mount_request(e);
    }

    fn on_mount_overflow(&mut self, e: &MountOverflowEvent) {
        self.pretty.on_mount_overflow(e);
        self.recorder.on_mount_overflow(e);
    }

    fn on_mount_plan(&mut self, s: &MountPlanSummary) {
        self.pretty.on_mount_plan(s);
        self.recorder.on_mount_plan(s);
    }

    fn on_classification(&mut self, e: &ClassificationEvent<'_>) {
        self.pretty.on_classification(e);
        self.recorder.on_classification(e);
    }

    fn on_range_change(&mut self, e: &RangeChangeEvent<'_>) {
        self.pretty.on_range_change(e);
        self.recorder.on_range_change(e);
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

fn with_callbacks(item: WindowItem, replay_id: &str, handle: &MountHandle) -> WindowItem {
    if item.id() != replay_id {
        return item;
    }
    let handle = handle.clone();
    item.on_enter(move |e| {
        // Entering this row asks for one more pass at the same viewport.
        handle.request_mutation(MutationRequest::new(e.viewport));
        Ok(())
    })
}

/// Reconciles, solves and hands the new outputs to the mounter.
fn layout(
    reconciler: &Reconciler,
    ctx: &ResolveContext,
    previous: Option<&LayoutTree>,
    resolver: &mut FeedResolver,
    dirty: &DirtyKeys,
    mounter: &mut Mounter<CountingAdapter>,
    handle: &MountHandle,
    tracer: &mut Tracer<'_>,
) -> LayoutTree {
    let root = resolver.root.clone();
    let reconciled = reconciler
        .reconcile(ctx, previous, Rc::new(Feed), &root, dirty, resolver, tracer)
        .expect("feed failed to reconcile");
    let snapshot = ColumnSolver.solve(&reconciled.tree, Size::new(WIDTH, VIEWPORT_HEIGHT));
    let tree = reconciled.tree.with_measurements(&snapshot);

    let outputs = collect_outputs(&tree, &snapshot);
    let replay_id = resolver.rows[REPLAY_ROW].as_str();
    let items = window_items(&outputs, &WindowConfig::new(SCROLL_STEP, 0.0))
        .into_iter()
        .map(|item| with_callbacks(item, replay_id, handle))
        .collect();
    mounter.set_layout(outputs, items);
    tree
}

fn main() {
    let mut tee = Tee {
        pretty: PrettyPrintSink::new(std::io::stdout()),
        recorder: RecorderSink::new(),
    };
    let mut tracer = Tracer::new(&mut tee);

    let mut resolver = FeedResolver::new(GlobalKey::root("feed"), ROW_COUNT);
    let mut state = StateContainer::new();
    for key in &resolver.rows {
        state.register(key);
    }

    let reconciler = Reconciler::default();
    let coordinator = MountCoordinator::default();
    let handle = coordinator.handle();
    let mut mounter = Mounter::new("feed", CountingAdapter::default());

    let mut ctx = ResolveContext::new(TreeId(1), "feed");
    let mut tree = layout(
        &reconciler,
        &ctx,
        None,
        &mut resolver,
        &DirtyKeys::new(),
        &mut mounter,
        &handle,
        &mut tracer,
    );

    for step in 0..STEPS {
        if step == EXPAND_AT {
            resolver.heights[EXPANDED_ROW] *= 3.0;
            state.mark_updated(&resolver.rows[EXPANDED_ROW]);
        }
        if state.has_pending_updates() {
            ctx = ctx.next_version();
            let dirty = state.take_dirty_keys();
            tree = layout(
                &reconciler,
                &ctx,
                Some(&tree),
                &mut resolver,
                &dirty,
                &mut mounter,
                &handle,
                &mut tracer,
            );
        }

        let top = f64::from(step) * SCROLL_STEP;
        let viewport = Rect::new(0.0, top, WIDTH, top + VIEWPORT_HEIGHT);
        coordinator
            .request_mutation(MutationRequest::new(viewport), &mut mounter, &mut tracer)
            .expect("mount pass failed");
    }
    drop(tracer);

    // -- export Chrome trace -----------------------------------------------
    let path = "scroll_demo.trace.json";
    let file = File::create(path).expect("failed to create trace file");
    let mut writer = BufWriter::new(file);
    strata_debug::chrome::export(tee.recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    let adapter = mounter.adapter();
    println!(
        "Wrote {path} ({} passes, {} instructions, {} outputs mounted at the end)",
        coordinator.passes(),
        adapter.applied,
        adapter.mounted,
    );
}
