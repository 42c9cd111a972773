// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use kurbo::Rect;

use super::{CallbackError, RangeEvent};

/// Enter or exit callback of a [`WindowItem`].
pub type RangeCallback = Box<dyn FnMut(&RangeEvent<'_>) -> Result<(), CallbackError>>;

/// An entity tracked for entering and exiting the viewport.
///
/// The enter band defaults to the item's vertical bounds; lead/lag margins
/// are expressed by widening it with
/// [`with_thresholds`](Self::with_thresholds).
pub struct WindowItem {
    pub(super) id: String,
    pub(super) bounds: Rect,
    pub(super) enter_top: f64,
    pub(super) enter_bottom: f64,
    pub(super) on_enter: Option<RangeCallback>,
    pub(super) on_exit: Option<RangeCallback>,
}

impl fmt::Debug for WindowItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowItem")
            .field("id", &self.id)
            .field("bounds", &self.bounds)
            .field("enter_top", &self.enter_top)
            .field("enter_bottom", &self.enter_bottom)
            .finish_non_exhaustive()
    }
}

impl WindowItem {
    /// Creates an item whose enter band equals its vertical bounds.
    #[must_use]
    pub fn new(id: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id: id.into(),
            bounds,
            enter_top: bounds.y0,
            enter_bottom: bounds.y1,
            on_enter: None,
            on_exit: None,
        }
    }

    /// Overrides the enter band.
    #[must_use]
    pub fn with_thresholds(mut self, enter_top: f64, enter_bottom: f64) -> Self {
        self.enter_top = enter_top;
        self.enter_bottom = enter_bottom;
        self
    }

    /// Sets the callback fired when the item enters the window.
    #[must_use]
    pub fn on_enter(
        mut self,
        f: impl FnMut(&RangeEvent<'_>) -> Result<(), CallbackError> + 'static,
    ) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    /// Sets the callback fired when the item exits the window.
    #[must_use]
    pub fn on_exit(
        mut self,
        f: impl FnMut(&RangeEvent<'_>) -> Result<(), CallbackError> + 'static,
    ) -> Self {
        self.on_exit = Some(Box::new(f));
        self
    }

    /// Returns the item id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the item bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Returns the enter-range top threshold.
    #[must_use]
    pub fn enter_top(&self) -> f64 {
        self.enter_top
    }

    /// Returns the enter-range bottom threshold.
    #[must_use]
    pub fn enter_bottom(&self) -> f64 {
        self.enter_bottom
    }
}
