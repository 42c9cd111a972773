// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The visibility-driven mutation pass.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;
use strata_core::coordinator::{MountError, MutationPass, MutationRequest};
use strata_core::trace::Tracer;
use strata_core::window::{VisibilityWindowTracker, WindowItem};

use crate::adapter::MountAdapter;
use crate::output::MountableOutput;
use crate::state::MountState;

/// Mounts the outputs whose window items are in range, and unmounts the
/// rest.
///
/// Run it through a
/// [`MountCoordinator`](strata_core::coordinator::MountCoordinator) so that
/// enter/exit callbacks can request further passes without recursing.
pub struct Mounter<A> {
    tree_name: String,
    adapter: A,
    tracker: VisibilityWindowTracker,
    outputs: Vec<MountableOutput>,
    /// Output position by key.
    positions: BTreeMap<String, usize>,
    state: MountState,
    viewport: Option<Rect>,
    dirty: bool,
    passes: u64,
}

impl<A> fmt::Debug for Mounter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mounter")
            .field("tree_name", &self.tree_name)
            .field("tracker", &self.tracker)
            .field("outputs_len", &self.outputs.len())
            .field("state", &self.state)
            .field("viewport", &self.viewport)
            .field("dirty", &self.dirty)
            .field("passes", &self.passes)
            .finish_non_exhaustive()
    }
}

impl<A: MountAdapter> Mounter<A> {
    /// Creates a mounter for the tree named `tree_name`, with nothing to
    /// mount yet.
    #[must_use]
    pub fn new(tree_name: impl Into<String>, adapter: A) -> Self {
        Self {
            tree_name: tree_name.into(),
            adapter,
            tracker: VisibilityWindowTracker::new(),
            outputs: Vec::new(),
            positions: BTreeMap::new(),
            state: MountState::new(),
            viewport: None,
            dirty: true,
            passes: 0,
        }
    }

    /// Installs the outputs of a new layout and their window items.
    ///
    /// Items are matched to outputs by id (the output's global key). The
    /// tracker's content height becomes the lowest output edge. The next
    /// visibility evaluation takes the full-reset path.
    ///
    /// # Panics
    ///
    /// Panics if two items share an id.
    pub fn set_layout(&mut self, outputs: Vec<MountableOutput>, items: Vec<WindowItem>) {
        let content_height = outputs.iter().map(|o| o.bounds.y1).fold(0.0, f64::max);
        self.tracker.set_content_height(content_height);
        self.tracker.replace_items(items);
        self.positions = outputs
            .iter()
            .enumerate()
            .map(|(i, output)| (String::from(output.key.as_str()), i))
            .collect();
        self.outputs = outputs;
        self.dirty = true;
    }

    /// Returns the owning tree's name.
    #[must_use]
    pub fn tree_name(&self) -> &str {
        &self.tree_name
    }

    /// Returns the adapter.
    #[must_use]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Returns the adapter mutably.
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// Returns the visibility tracker.
    #[must_use]
    pub fn tracker(&self) -> &VisibilityWindowTracker {
        &self.tracker
    }

    /// Returns what is currently mounted.
    #[must_use]
    pub fn state(&self) -> &MountState {
        &self.state
    }

    /// Returns the installed outputs.
    #[must_use]
    pub fn outputs(&self) -> &[MountableOutput] {
        &self.outputs
    }

    /// Returns the last viewport visibility was evaluated against.
    #[must_use]
    pub fn viewport(&self) -> Option<Rect> {
        self.viewport
    }

    /// Returns how many passes have run.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Consumes the mounter and returns the adapter.
    pub fn into_adapter(self) -> A {
        self.adapter
    }
}

impl<A: MountAdapter> MutationPass for Mounter<A> {
    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Evaluates visibility (if requested and a viewport is known), then
    /// diffs the in-range outputs against the mounted state and applies the
    /// difference one instruction at a time.
    ///
    /// Without visibility processing the last evaluated window decides what
    /// is mounted.
    fn run(
        &mut self,
        request: &MutationRequest,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), MountError> {
        self.passes += 1;

        if request.process_visibility {
            if let Some(viewport) = request.visible_rect {
                let previous = self.viewport.replace(viewport);
                self.tracker
                    .evaluate(self.dirty, Some(viewport), previous, tracer)
                    .map_err(|err| MountError::from_visibility(&self.tree_name, err))?;
                self.dirty = false;
            }
        }

        // In-range ids come out in key order; mount in traversal order.
        let mut picked: Vec<usize> = self
            .tracker
            .in_range_ids()
            .filter_map(|id| self.positions.get(id).copied())
            .collect();
        picked.sort_unstable();
        let desired: Vec<MountableOutput> =
            picked.iter().map(|&i| self.outputs[i].clone()).collect();
        let plan = self.state.plan(&desired);
        for instruction in &plan.instructions {
            self.adapter
                .apply(instruction)
                .map_err(|source| MountError::Adapter {
                    tree: self.tree_name.clone(),
                    path: String::from(instruction.key().as_str()),
                    source,
                })?;
            self.state.apply(instruction);
        }
        tracer.mount_plan(&plan.summary(self.passes));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    use kurbo::Size;
    use strata_core::component::{Component, ComponentRef, ResolveContext};
    use strata_core::coordinator::{AdapterError, MountCoordinator, MountPhase};
    use strata_core::key::GlobalKey;
    use strata_core::node::{LayoutTree, TreeBuilder};
    use strata_core::solver::{BoxModelSolver, ColumnSolver};
    use strata_core::window::CallbackError;

    use super::*;
    use crate::output::{WindowConfig, collect_outputs, window_items};
    use crate::plan::MountInstruction;

    #[derive(Debug)]
    struct Row;

    impl Component for Row {
        fn type_name(&self) -> &str {
            "Row"
        }

        fn updated_shallow_copy(&self, _: &ResolveContext, _: &GlobalKey) -> ComponentRef {
            Rc::new(Self)
        }
    }

    #[derive(Debug, Default)]
    struct Recorder {
        log: Vec<MountInstruction>,
        fail_on: Option<GlobalKey>,
    }

    impl MountAdapter for Recorder {
        fn apply(&mut self, instruction: &MountInstruction) -> Result<(), AdapterError> {
            if self.fail_on.as_ref() == Some(instruction.key()) {
                return Err(AdapterError::new("host refused"));
            }
            self.log.push(instruction.clone());
            Ok(())
        }
    }

    /// A root holding ten 100-unit rows.
    fn feed() -> (LayoutTree, Vec<MountableOutput>) {
        let root_key = GlobalKey::root("root");
        let mut b = TreeBuilder::new();
        let root = b.add_component_node(Rc::new(Row), root_key.clone());
        for i in 0..10 {
            let row = b.add_component_node(Rc::new(Row), root_key.child("row", i));
            b.set_height(row, 100.0);
            b.add_child(root, row);
        }
        let tree = b.finish(root, None);
        let snapshot = ColumnSolver.solve(&tree, Size::new(100.0, 1000.0));
        let outputs = collect_outputs(&tree, &snapshot);
        (tree, outputs)
    }

    fn view(top: f64, bottom: f64) -> MutationRequest {
        MutationRequest::new(Rect::new(0.0, top, 100.0, bottom))
    }

    fn mounted<A: MountAdapter>(mounter: &Mounter<A>) -> Vec<&str> {
        mounter.state().keys().map(GlobalKey::as_str).collect()
    }

    fn mounter_for(outputs: Vec<MountableOutput>, items: Vec<WindowItem>) -> Mounter<Recorder> {
        let mut mounter = Mounter::new("feed", Recorder::default());
        mounter.set_layout(outputs, items);
        mounter
    }

    #[test]
    fn scrolling_swaps_mounted_rows() {
        let (_, outputs) = feed();
        let items = window_items(&outputs, &WindowConfig::EXACT);
        let mut mounter = mounter_for(outputs, items);
        let coordinator = MountCoordinator::default();

        coordinator
            .request_mutation(view(0.0, 250.0), &mut mounter, &mut Tracer::none())
            .unwrap();
        assert_eq!(
            mounted(&mounter),
            ["root", "root.row[0]", "root.row[1]", "root.row[2]"]
        );

        mounter.adapter_mut().log.clear();
        coordinator
            .request_mutation(view(300.0, 550.0), &mut mounter, &mut Tracer::none())
            .unwrap();
        assert_eq!(
            mounted(&mounter),
            ["root", "root.row[3]", "root.row[4]", "root.row[5]"]
        );
        let detached: Vec<&str> = mounter
            .adapter()
            .log
            .iter()
            .filter(|i| matches!(i, MountInstruction::Detach { .. }))
            .map(|i| i.key().as_str())
            .collect();
        assert_eq!(detached, ["root.row[2]", "root.row[1]", "root.row[0]"]);
        assert_eq!(
            mounter.adapter().log[3],
            MountInstruction::Attach {
                key: GlobalKey::root("root").child("row", 3),
                index: 1,
                bounds: Rect::new(0.0, 300.0, 100.0, 400.0),
            }
        );
    }

    #[test]
    fn exit_callback_replays_after_the_pass() {
        let (_, outputs) = feed();
        let coordinator = MountCoordinator::default();
        let handle = coordinator.handle();
        let phase_seen = Rc::new(Cell::new(MountPhase::Idle));
        let seen = phase_seen.clone();
        let items = window_items(&outputs, &WindowConfig::EXACT)
            .into_iter()
            .map(|item| {
                if item.id() != "root.row[0]" {
                    return item;
                }
                let handle = handle.clone();
                let seen = seen.clone();
                item.on_exit(move |_| {
                    seen.set(handle.phase());
                    handle.request_mutation(view(600.0, 700.0));
                    Ok(())
                })
            })
            .collect();
        let mut mounter = mounter_for(outputs, items);

        coordinator
            .request_mutation(view(0.0, 250.0), &mut mounter, &mut Tracer::none())
            .unwrap();
        coordinator
            .request_mutation(view(300.0, 550.0), &mut mounter, &mut Tracer::none())
            .unwrap();

        assert_eq!(phase_seen.get(), MountPhase::Mutating);
        assert_eq!(coordinator.passes(), 3, "two requested passes and one replay");
        assert_eq!(mounter.passes(), 3);
        assert_eq!(mounted(&mounter), ["root", "root.row[6]"]);
        assert_eq!(coordinator.phase(), MountPhase::Idle);
        assert_eq!(coordinator.queue_len(), 0);
    }

    #[test]
    fn adapter_failure_carries_tree_and_key() {
        let (_, outputs) = feed();
        let items = window_items(&outputs, &WindowConfig::EXACT);
        let mut mounter = mounter_for(outputs, items);
        let bad = GlobalKey::root("root").child("row", 1);
        mounter.adapter_mut().fail_on = Some(bad);

        let err = MountCoordinator::default()
            .request_mutation(view(0.0, 250.0), &mut mounter, &mut Tracer::none())
            .unwrap_err();
        assert_eq!(
            err,
            MountError::Adapter {
                tree: String::from("feed"),
                path: String::from("root.row[1]"),
                source: AdapterError::new("host refused"),
            }
        );
        assert_eq!(
            mounted(&mounter),
            ["root", "root.row[0]"],
            "instructions before the failure stay applied"
        );
    }

    #[test]
    fn callback_failure_carries_tree_and_item() {
        let (_, outputs) = feed();
        let items = window_items(&outputs, &WindowConfig::EXACT)
            .into_iter()
            .map(|item| {
                if item.id() == "root.row[1]" {
                    item.on_enter(|_| Err(CallbackError::new("nope")))
                } else {
                    item
                }
            })
            .collect();
        let mut mounter = mounter_for(outputs, items);

        let err = MountCoordinator::default()
            .request_mutation(view(0.0, 250.0), &mut mounter, &mut Tracer::none())
            .unwrap_err();
        assert_eq!(
            err,
            MountError::Callback {
                tree: String::from("feed"),
                path: String::from("root.row[1]"),
                source: CallbackError::new("nope"),
            }
        );
        assert!(mounter.state().is_empty(), "nothing mounted after a failed evaluation");
    }

    #[test]
    fn lead_margin_mounts_ahead_of_the_viewport() {
        let (_, outputs) = feed();
        let items = window_items(&outputs, &WindowConfig::new(150.0, 0.0));
        let mut mounter = mounter_for(outputs, items);

        MountCoordinator::default()
            .request_mutation(view(0.0, 250.0), &mut mounter, &mut Tracer::none())
            .unwrap();
        assert_eq!(
            mounted(&mounter),
            ["root", "root.row[0]", "root.row[1]", "root.row[2]", "root.row[3]"]
        );
    }

    #[test]
    fn relayout_moves_and_updates_mounted_rows() {
        let (_, outputs) = feed();
        let items = window_items(&outputs, &WindowConfig::EXACT);
        let mut mounter = mounter_for(outputs.clone(), items);
        let coordinator = MountCoordinator::default();
        coordinator
            .request_mutation(view(0.0, 150.0), &mut mounter, &mut Tracer::none())
            .unwrap();

        // Swap the first two rows and shift them down.
        let mut next = outputs;
        next.swap(1, 2);
        next[1].bounds = Rect::new(0.0, 10.0, 100.0, 110.0);
        next[2].bounds = Rect::new(0.0, 110.0, 100.0, 210.0);
        let items = window_items(&next, &WindowConfig::EXACT);
        mounter.set_layout(next, items);
        mounter.adapter_mut().log.clear();
        coordinator
            .request_mutation(view(0.0, 150.0), &mut mounter, &mut Tracer::none())
            .unwrap();

        assert_eq!(mounted(&mounter), ["root", "root.row[1]", "root.row[0]"]);
        assert_eq!(
            mounter.adapter().log,
            vec![
                MountInstruction::Move {
                    key: GlobalKey::root("root").child("row", 1),
                    index: 1,
                    bounds: Rect::new(0.0, 10.0, 100.0, 110.0),
                },
                MountInstruction::UpdateBounds {
                    key: GlobalKey::root("root").child("row", 0),
                    bounds: Rect::new(0.0, 110.0, 100.0, 210.0),
                },
            ]
        );
    }

    #[test]
    fn skipped_visibility_keeps_the_last_window() {
        let (_, outputs) = feed();
        let items = window_items(&outputs, &WindowConfig::EXACT);
        let mut mounter = mounter_for(outputs, items);
        let coordinator = MountCoordinator::default();
        coordinator
            .request_mutation(view(0.0, 150.0), &mut mounter, &mut Tracer::none())
            .unwrap();
        let before = mounter.state().clone();

        let request = MutationRequest {
            visible_rect: Some(Rect::new(0.0, 800.0, 100.0, 900.0)),
            process_visibility: false,
        };
        coordinator
            .request_mutation(request, &mut mounter, &mut Tracer::none())
            .unwrap();
        assert_eq!(mounter.state(), &before);
        assert_eq!(mounter.viewport(), Some(Rect::new(0.0, 0.0, 100.0, 150.0)));
    }

    #[test]
    fn mounts_in_traversal_order_not_key_order() {
        let root_key = GlobalKey::root("root");
        let mut b = TreeBuilder::new();
        let root = b.add_component_node(Rc::new(Row), root_key.clone());
        for i in 0..12 {
            let row = b.add_component_node(Rc::new(Row), root_key.child("row", i));
            b.set_height(row, 100.0);
            b.add_child(root, row);
        }
        let tree = b.finish(root, None);
        let snapshot = ColumnSolver.solve(&tree, Size::new(100.0, 1200.0));
        let outputs = collect_outputs(&tree, &snapshot);
        let expected: Vec<String> = outputs
            .iter()
            .map(|o| String::from(o.key.as_str()))
            .collect();
        let mut items = window_items(&outputs, &WindowConfig::EXACT);
        items.push(WindowItem::new("overlay", Rect::new(0.0, 0.0, 100.0, 50.0)));
        let mut mounter = mounter_for(outputs, items);

        MountCoordinator::default()
            .request_mutation(view(0.0, 1200.0), &mut mounter, &mut Tracer::none())
            .unwrap();
        assert!(
            mounter.tracker().is_in_range("overlay"),
            "items without an output are still tracked"
        );
        assert_eq!(mounted(&mounter), expected);
        let indices: Vec<usize> = mounter
            .adapter()
            .log
            .iter()
            .map(|instruction| match instruction {
                MountInstruction::Attach { index, .. } => *index,
                other => panic!("expected only attaches, got {other:?}"),
            })
            .collect();
        assert_eq!(indices, (0..13).collect::<Vec<_>>());
    }
}
