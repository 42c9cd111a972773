// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Which threshold a sorted sequence is ordered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortAxis {
    /// Ascending enter-range top.
    EnterTop,
    /// Ascending enter-range bottom.
    EnterBottom,
}

impl fmt::Display for SortAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EnterTop => "enter top",
            Self::EnterBottom => "enter bottom",
        })
    }
}

/// Error raised by an enter/exit callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackError {
    /// Description of the failure.
    pub message: String,
}

impl CallbackError {
    /// Creates a callback error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for CallbackError {}

/// Errors returned by
/// [`VisibilityWindowTracker::evaluate`](super::VisibilityWindowTracker::evaluate).
#[derive(Clone, Debug, PartialEq)]
pub enum VisibilityError {
    /// Two adjacent items of a sorted sequence compare inconsistently,
    /// typically because a threshold is `NaN`.
    SortOrder {
        /// The threshold the sequence is ordered by.
        axis: SortAxis,
        /// The full sequence as `(id, threshold)` pairs, in sorted order.
        sequence: Vec<(String, f64)>,
        /// Index of the first offending entry.
        first: usize,
        /// Index of the second offending entry.
        second: usize,
    },
    /// An enter or exit callback failed.
    Callback {
        /// Id of the item whose callback failed.
        item: String,
        /// The callback's error.
        source: CallbackError,
    },
}

impl fmt::Display for VisibilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SortOrder {
                axis,
                sequence,
                first,
                second,
            } => {
                write!(
                    f,
                    "window items sorted by {axis} are out of order at indices {first} and {second}: ["
                )?;
                for (i, (id, threshold)) in sequence.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{id}={threshold}")?;
                }
                f.write_str("]")
            }
            Self::Callback { item, source } => {
                write!(f, "range callback for {item} failed: {source}")
            }
        }
    }
}

impl core::error::Error for VisibilityError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Callback { source, .. } => Some(source),
            Self::SortOrder { .. } => None,
        }
    }
}
