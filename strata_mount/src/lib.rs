// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mount plans and the visibility-driven mutation pass for strata.
//!
//! This crate sits between [`strata_core`]'s solved layout trees and a
//! host-specific mounting surface. It defines:
//!
//! - [`MountableOutput`] and [`collect_outputs`]: absolute bounds for every
//!   keyed node of a solved tree
//! - [`window_items`]: visibility-window items derived from those outputs
//! - [`MountPlan`] / [`MountInstruction`]: the ordered attach, detach, move
//!   and update steps for one pass
//! - [`MountState`]: what is currently mounted, and the diff against what
//!   should be
//! - [`MountAdapter`]: the host seam that carries instructions out
//! - [`Mounter`]: a [`MutationPass`](strata_core::coordinator::MutationPass)
//!   tying tracker, state and adapter together
//!
//! ```text
//!   LayoutTree + LayoutSnapshot ──► collect_outputs ──► Mounter::set_layout
//!                                                            │
//!   MountCoordinator::request_mutation ──► Mounter::run ─────┤
//!        evaluate visibility ──► MountState::plan ──► MountAdapter::apply
//! ```

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod adapter;
mod mounter;
mod output;
mod plan;
mod state;

pub use adapter::MountAdapter;
pub use mounter::Mounter;
pub use output::{MountableOutput, WindowConfig, collect_outputs, window_items};
pub use plan::{MountInstruction, MountPlan};
pub use state::MountState;
