// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collects component state updates into the dirty-key set.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::dirty;
use crate::key::{DirtyKeys, GlobalKey};

/// Records which components reported pending state changes.
///
/// Keys are interned to dense `u32` ids for the underlying tracker. Ids are
/// never reused, so a removed key that is registered again gets a fresh id.
///
/// ```
/// use strata_core::key::GlobalKey;
/// use strata_core::state::StateContainer;
///
/// let mut state = StateContainer::new();
/// let counter = GlobalKey::from("root.counter[0]");
/// state.mark_updated(&counter);
/// let dirty = state.take_dirty_keys();
/// assert!(dirty.contains(&counter));
/// assert!(!state.has_pending_updates());
/// ```
pub struct StateContainer {
    ids: BTreeMap<GlobalKey, u32>,
    keys: Vec<Option<GlobalKey>>,
    dirty: DirtyTracker<u32>,
    pending: bool,
}

impl core::fmt::Debug for StateContainer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StateContainer")
            .field("registered", &self.ids.len())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl Default for StateContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl StateContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: BTreeMap::new(),
            keys: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending: false,
        }
    }

    /// Registers a component key and returns its interned id. Registering an
    /// already-known key returns the existing id.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` keys are registered over the
    /// container's lifetime.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "length is checked against u32::MAX above"
    )]
    pub fn register(&mut self, key: &GlobalKey) -> u32 {
        if let Some(&id) = self.ids.get(key) {
            return id;
        }
        assert!(
            self.keys.len() < u32::MAX as usize,
            "state container exhausted the u32 id space"
        );
        let id = self.keys.len() as u32;
        self.keys.push(Some(key.clone()));
        self.ids.insert(key.clone(), id);
        id
    }

    /// Returns the number of live registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if no key is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Declares that `dependent` reads state owned by `source`: updating
    /// `source` also dirties `dependent`. Both keys are registered if needed.
    ///
    /// Returns `false` (and adds nothing) if the edge would create a cycle.
    pub fn add_dependency(&mut self, dependent: &GlobalKey, source: &GlobalKey) -> bool {
        let d = self.register(dependent);
        let s = self.register(source);
        self.dirty.add_dependency(d, s, dirty::STATE).is_ok()
    }

    /// Forgets a key and all of its dependency edges.
    pub fn remove(&mut self, key: &GlobalKey) {
        if let Some(id) = self.ids.remove(key) {
            self.keys[id as usize] = None;
            self.dirty.remove_key(id);
        }
    }

    /// Records a state update for `key` (registering it if needed).
    pub fn mark_updated(&mut self, key: &GlobalKey) {
        let id = self.register(key);
        self.dirty.mark_with(id, dirty::STATE, &EagerPolicy);
        self.pending = true;
    }

    /// Returns `true` if any update was recorded since the last
    /// [`take_dirty_keys`](Self::take_dirty_keys).
    #[must_use]
    pub fn has_pending_updates(&self) -> bool {
        self.pending
    }

    /// Drains the recorded updates into a [`DirtyKeys`] set, including keys
    /// dirtied through dependency edges.
    pub fn take_dirty_keys(&mut self) -> DirtyKeys {
        self.pending = false;
        let ids: Vec<u32> = self
            .dirty
            .drain(dirty::STATE)
            .affected()
            .deterministic()
            .run()
            .collect();
        ids.into_iter()
            .filter_map(|id| self.keys.get(id as usize).cloned().flatten())
            .collect()
    }
}
