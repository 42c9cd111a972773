// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout-tree reconciliation, viewport windowing, and reentrant mount
//! coordination for retained-mode UI.
//!
//! `strata_core` turns a declarative component tree into layout trees that
//! can be reused across state updates, tracks which laid-out items overlap a
//! scrolling viewport, and serializes mutation passes that request further
//! passes from inside their own callbacks. It is `no_std` compatible (with
//! `alloc`) and single-threaded: only the immutable [`solver::LayoutSnapshot`]
//! is meant to cross threads.
//!
//! # Architecture
//!
//! ```text
//!   StateContainer ──► DirtyKeys
//!                          │
//!   previous LayoutTree ───┤
//!   next head component ───┴──► Reconciler::reconcile() ──► LayoutTree
//!                                                              │
//!                                    BoxModelSolver::solve() ◄─┘
//!                                              │
//!                                              ▼
//!                                        LayoutSnapshot ──► WindowItems
//!                                                               │
//!   MountCoordinator::request_mutation() ──► MutationPass::run()
//!         ▲                                   │  VisibilityWindowTracker::evaluate()
//!         │ queued via MountHandle            │  enter/exit callbacks
//!         └───────────────────────────────────┘
//! ```
//!
//! **[`key`]**: Path-like [`GlobalKey`](key::GlobalKey)s and the ordered
//! [`DirtyKeys`](key::DirtyKeys) set with prefix queries.
//!
//! **[`state`]**: [`StateContainer`](state::StateContainer) collecting
//! component state updates via `understory_dirty`.
//!
//! **[`dirty`]**: Dirty-tracking channel constants.
//!
//! **[`component`]**: The [`Component`](component::Component) and
//! [`Resolver`](component::Resolver) seams plus resolve contexts.
//!
//! **[`node`]**: Arena-backed layout nodes: a mutable
//! [`TreeBuilder`](node::TreeBuilder) frozen into an immutable
//! [`LayoutTree`](node::LayoutTree).
//!
//! **[`solver`]**: The [`BoxModelSolver`](solver::BoxModelSolver) seam and a
//! small column solver.
//!
//! **[`reconcile`]**: COPY / RECONCILE / RECREATE classification and tree
//! reconstruction.
//!
//! **[`window`]**: Cursor-based incremental visibility tracking.
//!
//! **[`coordinator`]**: The Idle/Mutating/Draining mutation-pass state
//! machine with its bounded replay queue.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-node
//!   classification and per-item range-change events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod component;
pub mod coordinator;
pub mod dirty;
pub mod key;
pub mod node;
pub mod reconcile;
pub mod solver;
pub mod state;
pub mod trace;
pub mod window;
