// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental visibility-window tracking.
//!
//! A [`VisibilityWindowTracker`] owns a set of [`WindowItem`]s positioned
//! along the vertical axis and fires enter/exit callbacks as a viewport
//! rectangle moves across them.
//!
//! # Data layout
//!
//! Items are kept in two orders: ascending by enter-range top and ascending
//! by enter-range bottom. Two cursors split those sequences:
//!
//! ```text
//!   by bottom:  [ bottom <= viewport top | bottom > viewport top ... ]
//!                                        ^ bottom cursor
//!   by top:     [ top < viewport bottom ...  | top >= viewport bottom ]
//!                                            ^ top cursor
//! ```
//!
//! An item is in range iff it sits right of the bottom cursor **and** left
//! of the top cursor, i.e. its enter band overlaps the viewport:
//! `enter_top < viewport.y1 && enter_bottom > viewport.y0`.
//!
//! When only the viewport moved, each cursor walks forward or backward over
//! exactly the items whose threshold crossed the corresponding viewport edge,
//! so an evaluation costs O(k) for k transitions instead of O(n). A full
//! reset (sort, linear scan, diff against the recorded in-range set) runs
//! when the tree was rebuilt, the items changed, or the previous evaluation
//! failed.

mod error;
mod item;
mod tracker;

use kurbo::Rect;

pub use error::{CallbackError, SortAxis, VisibilityError};
pub use item::{RangeCallback, WindowItem};
pub use tracker::VisibilityWindowTracker;

/// Direction of a visibility transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// The item entered the window.
    Enter,
    /// The item left the window.
    Exit,
}

/// Passed to enter/exit callbacks.
#[derive(Clone, Copy, Debug)]
pub struct RangeEvent<'a> {
    /// Id of the item that changed state.
    pub id: &'a str,
    /// The item's bounds.
    pub bounds: Rect,
    /// The viewport being evaluated.
    pub viewport: Rect,
    /// Direction of the transition.
    pub transition: Transition,
}
