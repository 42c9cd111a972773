// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Component state changes are collected with [`understory_dirty`]. There is
//! a single channel today; the constant exists so the
//! [`StateContainer`](crate::state::StateContainer) and any future channel
//! (e.g. measurement invalidation) share one numbering.
//!
//! [`STATE`] propagates: marks use
//! [`EagerPolicy`](understory_dirty::EagerPolicy) along dependency edges from
//! a dependent component to the component whose state it reads, so updating
//! a source also dirties every dependent key.

use understory_dirty::Channel;

/// Component state changed: the component (and its dependents) must be
/// re-resolved on the next reconciliation.
pub const STATE: Channel = Channel::new(0);
