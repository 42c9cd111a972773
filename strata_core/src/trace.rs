// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the layout/mount pipeline.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! reconciler, the visibility tracker and the mount coordinator call as they
//! run. All method bodies default to no-ops, so implementing only the events
//! you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! The core has no clock. Events carry the emitting subsystem's pass counter
//! instead of timestamps; sinks that need time stamp events themselves.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates the per-node
//!   [`ClassificationEvent`] and per-item [`RangeChangeEvent`] plus the
//!   corresponding `TraceSink` methods.

#[cfg(feature = "trace-rich")]
use crate::reconcile::ReconciliationMode;
#[cfg(feature = "trace-rich")]
use crate::window::Transition;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which pipeline pass is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Tree reconciliation.
    Reconcile,
    /// Visibility-window evaluation.
    Visibility,
    /// A mutation (mount) pass requested from outside.
    Mount,
    /// A mutation pass replayed from the reentrancy queue.
    Drain,
}

/// Which limit a mount overflow hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverflowKind {
    /// Too many requests queued during a single pass.
    Queue,
    /// Draining kept producing new requests for too many rounds.
    DrainRounds,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of a pass.
#[derive(Clone, Copy, Debug)]
pub struct PassBeginEvent {
    /// Which pass is starting.
    pub kind: PassKind,
    /// The emitting subsystem's pass counter.
    pub pass: u64,
}

/// Marks the end of a pass.
#[derive(Clone, Copy, Debug)]
pub struct PassEndEvent {
    /// Which pass is ending.
    pub kind: PassKind,
    /// The emitting subsystem's pass counter.
    pub pass: u64,
}

/// Node counts produced by one reconciliation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Layout version of the resolve context.
    pub version: u64,
    /// The previous tree could not be reused at all.
    pub full_rebuild: bool,
    /// Subtrees cloned without inspection.
    pub copied: u32,
    /// Nodes shallow-copied with their children re-inspected.
    pub reconciled: u32,
    /// Subtree roots rebuilt through the resolver.
    pub recreated: u32,
    /// Nodes in the output tree.
    pub nodes: u32,
    /// Components re-registered for previous render data.
    pub previous_render_data: u32,
}

/// Outcome of one visibility evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisibilitySummary {
    /// Evaluation counter.
    pub evaluation: u64,
    /// The evaluation took the full-reset path.
    pub full_reset: bool,
    /// Enter callbacks fired.
    pub entered: u32,
    /// Exit callbacks fired.
    pub exited: u32,
    /// Items in range after the evaluation.
    pub in_range: u32,
}

/// Emitted for every mutation request the coordinator sees.
#[derive(Clone, Copy, Debug)]
pub struct MountRequestEvent {
    /// Coordinator pass counter at the time of the request.
    pub pass: u64,
    /// The request was queued because a pass was already running.
    pub queued: bool,
    /// Queue length after the request was handled.
    pub queue_len: u32,
}

/// Emitted exactly once per reentrancy overflow.
#[derive(Clone, Copy, Debug)]
pub struct MountOverflowEvent {
    /// Coordinator pass counter at the time of the overflow.
    pub pass: u64,
    /// Which limit was hit.
    pub kind: OverflowKind,
    /// The configured limit.
    pub limit: u32,
    /// Requests discarded, including the one that overflowed.
    pub dropped: u32,
}

/// Instruction counts of one applied mount plan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MountPlanSummary {
    /// Mount pass counter.
    pub pass: u64,
    /// Outputs attached.
    pub attached: u32,
    /// Outputs detached.
    pub detached: u32,
    /// Outputs moved to a new position.
    pub moved: u32,
    /// Outputs whose bounds changed in place.
    pub updated: u32,
}

/// Per-node reconciliation decision.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ClassificationEvent<'a> {
    /// Layout version of the resolve context.
    pub version: u64,
    /// Depth of the node below the reconcile root.
    pub depth: u32,
    /// The node's head key.
    pub key: &'a str,
    /// The chosen mode.
    pub mode: ReconciliationMode,
}

/// One fired enter/exit callback.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct RangeChangeEvent<'a> {
    /// Evaluation counter.
    pub evaluation: u64,
    /// The item id.
    pub item: &'a str,
    /// Direction of the transition.
    pub transition: Transition,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the pipeline.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the beginning of a pass.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called at the end of a pass.
    fn on_pass_end(&mut self, e: &PassEndEvent) {
        _ = e;
    }

    /// Called after a reconciliation completes.
    fn on_reconcile(&mut self, s: &ReconcileSummary) {
        _ = s;
    }

    /// Called after a visibility evaluation that had a viewport.
    fn on_visibility(&mut self, s: &VisibilitySummary) {
        _ = s;
    }

    /// Called for every mutation request.
    fn on_mount_request(&mut self, e: &MountRequestEvent) {
        _ = e;
    }

    /// Called once per reentrancy overflow.
    fn on_mount_overflow(&mut self, e: &MountOverflowEvent) {
        _ = e;
    }

    /// Called after a mount plan is applied.
    fn on_mount_plan(&mut self, s: &MountPlanSummary) {
        _ = s;
    }

    /// Called for every classified node (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_classification(&mut self, e: &ClassificationEvent<'_>) {
        _ = e;
    }

    /// Called for every fired enter/exit callback (requires `trace-rich`
    /// feature).
    #[cfg(feature = "trace-rich")]
    fn on_range_change(&mut self, e: &RangeChangeEvent<'_>) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PassBeginEvent`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PassEndEvent`].
    #[inline]
    pub fn pass_end(&mut self, e: &PassEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ReconcileSummary`].
    #[inline]
    pub fn reconcile(&mut self, s: &ReconcileSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_reconcile(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits a [`VisibilitySummary`].
    #[inline]
    pub fn visibility(&mut self, s: &VisibilitySummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_visibility(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits a [`MountRequestEvent`].
    #[inline]
    pub fn mount_request(&mut self, e: &MountRequestEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_mount_request(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`MountOverflowEvent`].
    #[inline]
    pub fn mount_overflow(&mut self, e: &MountOverflowEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_mount_overflow(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`MountPlanSummary`].
    #[inline]
    pub fn mount_plan(&mut self, s: &MountPlanSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_mount_plan(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits a [`ClassificationEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn classification(&mut self, e: &ClassificationEvent<'_>) {
        if let Some(s) = &mut self.sink {
            s.on_classification(e);
        }
    }

    /// Emits a [`RangeChangeEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn range_change(&mut self, e: &RangeChangeEvent<'_>) {
        if let Some(s) = &mut self.sink {
            s.on_range_change(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
