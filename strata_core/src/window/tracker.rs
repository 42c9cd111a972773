// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use kurbo::Rect;

use super::{RangeEvent, SortAxis, Transition, VisibilityError, WindowItem};
use crate::trace::{PassBeginEvent, PassEndEvent, PassKind, Tracer, VisibilitySummary};

/// Tracks which [`WindowItem`]s overlap a moving viewport.
///
/// See the [module docs](super) for the cursor layout.
#[derive(Debug, Default)]
pub struct VisibilityWindowTracker {
    items: Vec<WindowItem>,
    /// Id → index into `items`.
    index: BTreeMap<String, usize>,
    /// Items replaced since the last full reset; kept so removed items that
    /// were in range can still receive their exit callback.
    retired: Vec<WindowItem>,
    by_top: Vec<usize>,
    by_bottom: Vec<usize>,
    top_cursor: usize,
    bottom_cursor: usize,
    in_range: BTreeSet<String>,
    content_height: f64,
    min_bottom: f64,
    max_top: f64,
    needs_reset: bool,
    evaluations: u64,
}

impl VisibilityWindowTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the tracked items. The next evaluation takes the full-reset
    /// path; items that were in range keep their state if an item with the
    /// same id is still present.
    ///
    /// # Panics
    ///
    /// Panics if two items share an id.
    pub fn replace_items(&mut self, items: Vec<WindowItem>) {
        let mut index = BTreeMap::new();
        for (i, item) in items.iter().enumerate() {
            let fresh = index.insert(item.id.clone(), i).is_none();
            assert!(fresh, "duplicate window item id {}", item.id);
        }
        let old = core::mem::replace(&mut self.items, items);
        self.retired.extend(old);
        self.index = index;
        self.by_top.clear();
        self.by_bottom.clear();
        self.needs_reset = true;
    }

    /// Sets the tracked content height, used to skip cursor work when the
    /// viewport lies entirely past the content.
    pub fn set_content_height(&mut self, height: f64) {
        self.content_height = height;
    }

    /// Returns the tracked items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[WindowItem] {
        &self.items
    }

    /// Returns the number of tracked items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no item is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if the item with `id` was in range after the last
    /// evaluation.
    #[must_use]
    pub fn is_in_range(&self, id: &str) -> bool {
        self.in_range.contains(id)
    }

    /// Iterates the ids in range after the last evaluation, in id order.
    pub fn in_range_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.in_range.iter().map(String::as_str)
    }

    /// Returns `(top_cursor, bottom_cursor)`.
    #[must_use]
    pub fn cursors(&self) -> (usize, usize) {
        (self.top_cursor, self.bottom_cursor)
    }

    /// Returns the extent outside of which cursor work is skipped: from the
    /// smaller of zero and the lowest enter bottom, to the larger of the
    /// content height and the highest enter top. Only meaningful after a
    /// full reset.
    #[must_use]
    pub fn content_extent(&self) -> (f64, f64) {
        (
            self.min_bottom.min(0.0),
            self.max_top.max(self.content_height),
        )
    }

    /// Forgets all in-range state without firing any callback. The next
    /// evaluation takes the full-reset path and reports every overlapping
    /// item as entered.
    pub fn reset(&mut self) {
        self.in_range.clear();
        self.retired.clear();
        self.by_top.clear();
        self.by_bottom.clear();
        self.top_cursor = 0;
        self.bottom_cursor = 0;
        self.needs_reset = true;
    }

    /// Re-evaluates the window for `current` and fires enter/exit callbacks
    /// for every item whose in-range state changed.
    ///
    /// Takes the full-reset path when `is_dirty` is set, when the items were
    /// replaced or a sorted sequence is empty, when there is no `previous`
    /// viewport, or when the previous evaluation failed. Otherwise only the
    /// cursors move. An undefined `current` viewport is a no-op.
    ///
    /// Returns `true` if any callback fired.
    ///
    /// # Errors
    ///
    /// Returns [`VisibilityError::SortOrder`] if thresholds cannot be
    /// ordered (e.g. `NaN`), and [`VisibilityError::Callback`] if a callback
    /// fails. Transitions fired before the failure stay recorded; the next
    /// evaluation takes the full-reset path.
    pub fn evaluate(
        &mut self,
        is_dirty: bool,
        current: Option<Rect>,
        previous: Option<Rect>,
        tracer: &mut Tracer<'_>,
    ) -> Result<bool, VisibilityError> {
        let Some(viewport) = current else {
            return Ok(false);
        };
        self.evaluations += 1;
        let evaluation = self.evaluations;
        tracer.pass_begin(&PassBeginEvent {
            kind: PassKind::Visibility,
            pass: evaluation,
        });

        let mut summary = VisibilitySummary {
            evaluation,
            ..VisibilitySummary::default()
        };
        let previous = previous.filter(|_| {
            !(is_dirty || self.needs_reset || self.by_top.is_empty() || self.by_bottom.is_empty())
        });
        let result = match previous {
            Some(old) => self.advance(old, viewport, &mut summary, tracer),
            None => {
                summary.full_reset = true;
                self.full_reset(viewport, &mut summary, tracer)
            }
        };
        if result.is_err() {
            self.needs_reset = true;
        } else {
            summary.in_range = u32::try_from(self.in_range.len()).unwrap_or(u32::MAX);
            tracer.visibility(&summary);
        }
        tracer.pass_end(&PassEndEvent {
            kind: PassKind::Visibility,
            pass: evaluation,
        });
        result?;
        Ok(summary.entered + summary.exited > 0)
    }

    fn full_reset(
        &mut self,
        viewport: Rect,
        summary: &mut VisibilitySummary,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), VisibilityError> {
        self.needs_reset = true;
        self.by_top = sorted(&self.items, SortAxis::EnterTop)?;
        self.by_bottom = sorted(&self.items, SortAxis::EnterBottom)?;
        self.min_bottom = self
            .by_bottom
            .first()
            .map_or(0.0, |&i| self.items[i].enter_bottom);
        self.max_top = self
            .by_top
            .last()
            .map_or(0.0, |&i| self.items[i].enter_top);

        self.bottom_cursor = settle(
            &self.items,
            &self.by_bottom,
            viewport.y0,
            SortAxis::EnterBottom,
        );
        self.top_cursor = settle(&self.items, &self.by_top, viewport.y1, SortAxis::EnterTop);

        let n = self.items.len();
        let mut above_bottom_edge = vec![false; n];
        for &i in &self.by_top[..self.top_cursor] {
            above_bottom_edge[i] = true;
        }
        let mut now = vec![false; n];
        for &i in &self.by_bottom[self.bottom_cursor..] {
            now[i] = above_bottom_edge[i];
        }

        // Exits first, in bottom-threshold order, then removed items.
        for &i in &self.by_bottom {
            if !now[i] && self.in_range.contains(&self.items[i].id) {
                fire(
                    &mut self.items[i],
                    Transition::Exit,
                    viewport,
                    &mut self.in_range,
                    summary,
                    tracer,
                )?;
            }
        }
        for item in &mut self.retired {
            if !self.index.contains_key(&item.id) && self.in_range.contains(&item.id) {
                fire(item, Transition::Exit, viewport, &mut self.in_range, summary, tracer)?;
            }
        }
        self.retired.clear();

        for &i in &self.by_top {
            if now[i] && !self.in_range.contains(&self.items[i].id) {
                fire(
                    &mut self.items[i],
                    Transition::Enter,
                    viewport,
                    &mut self.in_range,
                    summary,
                    tracer,
                )?;
            }
        }
        self.needs_reset = false;
        Ok(())
    }

    fn advance(
        &mut self,
        old: Rect,
        new: Rect,
        summary: &mut VisibilitySummary,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), VisibilityError> {
        let (lo, hi) = self.content_extent();
        let n = self.items.len();

        if new.y0 >= lo || old.y0 >= lo {
            while self.bottom_cursor < n {
                let i = self.by_bottom[self.bottom_cursor];
                if self.items[i].enter_bottom > new.y0 {
                    break;
                }
                self.bottom_cursor += 1;
                if self.in_range.contains(&self.items[i].id) {
                    fire(
                        &mut self.items[i],
                        Transition::Exit,
                        new,
                        &mut self.in_range,
                        summary,
                        tracer,
                    )?;
                }
            }
            while self.bottom_cursor > 0 {
                let i = self.by_bottom[self.bottom_cursor - 1];
                if self.items[i].enter_bottom <= new.y0 {
                    break;
                }
                self.bottom_cursor -= 1;
                let item = &self.items[i];
                if item.enter_top < new.y1 && !self.in_range.contains(&item.id) {
                    fire(
                        &mut self.items[i],
                        Transition::Enter,
                        new,
                        &mut self.in_range,
                        summary,
                        tracer,
                    )?;
                }
            }
        }

        if new.y1 <= hi || old.y1 <= hi {
            while self.top_cursor < n {
                let i = self.by_top[self.top_cursor];
                if self.items[i].enter_top >= new.y1 {
                    break;
                }
                self.top_cursor += 1;
                let item = &self.items[i];
                if item.enter_bottom > new.y0 && !self.in_range.contains(&item.id) {
                    fire(
                        &mut self.items[i],
                        Transition::Enter,
                        new,
                        &mut self.in_range,
                        summary,
                        tracer,
                    )?;
                }
            }
            while self.top_cursor > 0 {
                let i = self.by_top[self.top_cursor - 1];
                if self.items[i].enter_top < new.y1 {
                    break;
                }
                self.top_cursor -= 1;
                if self.in_range.contains(&self.items[i].id) {
                    fire(
                        &mut self.items[i],
                        Transition::Exit,
                        new,
                        &mut self.in_range,
                        summary,
                        tracer,
                    )?;
                }
            }
        }
        Ok(())
    }
}

fn threshold(item: &WindowItem, axis: SortAxis) -> f64 {
    match axis {
        SortAxis::EnterTop => item.enter_top,
        SortAxis::EnterBottom => item.enter_bottom,
    }
}

/// Stable-sorts item indices by `axis` and checks the result is totally
/// ordered under `<=`.
fn sorted(items: &[WindowItem], axis: SortAxis) -> Result<Vec<usize>, VisibilityError> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| threshold(&items[a], axis).total_cmp(&threshold(&items[b], axis)));
    for pos in 1..order.len() {
        let a = threshold(&items[order[pos - 1]], axis);
        let b = threshold(&items[order[pos]], axis);
        // Negated so that NaN on either side is caught.
        #[expect(clippy::neg_cmp_op_on_partial_ord, reason = "NaN must fail the check")]
        let out_of_order = !(a <= b);
        if out_of_order {
            return Err(VisibilityError::SortOrder {
                axis,
                sequence: order
                    .iter()
                    .map(|&i| (items[i].id.clone(), threshold(&items[i], axis)))
                    .collect(),
                first: pos - 1,
                second: pos,
            });
        }
    }
    Ok(order)
}

/// Positions a cursor for a fresh viewport edge.
///
/// A linear scan finds the first entry whose threshold is not below `edge`.
/// For the bottom sequence, entries tied at exactly `edge` only touch the
/// viewport without overlapping it, so the cursor then scans forward past
/// every tied entry before settling.
fn settle(items: &[WindowItem], order: &[usize], edge: f64, axis: SortAxis) -> usize {
    let mut idx = order
        .iter()
        .position(|&i| threshold(&items[i], axis) >= edge)
        .unwrap_or(order.len());
    if axis == SortAxis::EnterBottom {
        while idx < order.len() && threshold(&items[order[idx]], axis) == edge {
            idx += 1;
        }
    }
    idx
}

fn fire(
    item: &mut WindowItem,
    transition: Transition,
    viewport: Rect,
    in_range: &mut BTreeSet<String>,
    summary: &mut VisibilitySummary,
    tracer: &mut Tracer<'_>,
) -> Result<(), VisibilityError> {
    match transition {
        Transition::Enter => {
            in_range.insert(item.id.clone());
            summary.entered += 1;
        }
        Transition::Exit => {
            in_range.remove(&item.id);
            summary.exited += 1;
        }
    }
    #[cfg(feature = "trace-rich")]
    tracer.range_change(&crate::trace::RangeChangeEvent {
        evaluation: summary.evaluation,
        item: &item.id,
        transition,
    });
    #[cfg(not(feature = "trace-rich"))]
    {
        _ = tracer;
    }

    let callback = match transition {
        Transition::Enter => item.on_enter.as_mut(),
        Transition::Exit => item.on_exit.as_mut(),
    };
    if let Some(callback) = callback {
        callback(&RangeEvent {
            id: &item.id,
            bounds: item.bounds,
            viewport,
            transition,
        })
        .map_err(|source| VisibilityError::Callback {
            item: item.id.clone(),
            source,
        })?;
    }
    Ok(())
}
