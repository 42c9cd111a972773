// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Global component keys and dirty-key sets.
//!
//! Every contributing component in a layout tree is identified by a
//! path-like [`GlobalKey`]. Keys are hierarchical: a child's key always
//! extends its parent's key, so "is `k` inside the subtree keyed `p`" reduces
//! to a string prefix test.
//!
//! ```text
//!   root
//!   ├── root.child[0]
//!   ├── root.child[1]
//!   │   └── root.child[1].text[0]
//!   └── root.child[2]
//! ```

use alloc::collections::BTreeSet;
use alloc::collections::btree_set;
use alloc::format;
use alloc::rc::Rc;
use core::fmt;

/// A path-like identifier for one contributing component.
///
/// Cloning is cheap (reference counted). Ordering is plain lexicographic
/// string ordering, which keeps every key directly after its prefixes in a
/// sorted set.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlobalKey(Rc<str>);

impl GlobalKey {
    /// Creates a root key.
    #[must_use]
    pub fn root(name: &str) -> Self {
        Self(Rc::from(name))
    }

    /// Returns the key of the `index`-th child named `name`: `self.name[index]`.
    #[must_use]
    pub fn child(&self, name: &str, index: usize) -> Self {
        Self(Rc::from(format!("{}.{name}[{index}]", self.0)))
    }

    /// Returns the key of a component nested inside this one without
    /// introducing a new child slot: `self.name`.
    ///
    /// Used for inner contributing components that render into the same
    /// layout node as their parent.
    #[must_use]
    pub fn nested(&self, name: &str) -> Self {
        Self(Rc::from(format!("{}.{name}", self.0)))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if `self` is a string prefix of `other`.
    ///
    /// A key is a prefix of itself.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.starts_with(&*self.0)
    }
}

impl fmt::Debug for GlobalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobalKey({})", self.0)
    }
}

impl fmt::Display for GlobalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GlobalKey {
    fn from(value: &str) -> Self {
        Self::root(value)
    }
}

/// The set of component keys whose state changed since the last render.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirtyKeys {
    keys: BTreeSet<GlobalKey>,
}

impl DirtyKeys {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key to the set.
    pub fn insert(&mut self, key: GlobalKey) {
        self.keys.insert(key);
    }

    /// Returns `true` if `key` itself is dirty.
    #[must_use]
    pub fn contains(&self, key: &GlobalKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns `true` if any dirty key has `prefix` as a string prefix.
    ///
    /// Keys sharing a prefix are contiguous in the ordered set and sort
    /// directly after the prefix itself, so only the first key at or after
    /// `prefix` needs to be checked.
    #[must_use]
    pub fn any_under(&self, prefix: &GlobalKey) -> bool {
        self.keys
            .range(prefix..)
            .next()
            .is_some_and(|k| prefix.is_prefix_of(k))
    }

    /// Returns the number of dirty keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no key is dirty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates the dirty keys in sorted order.
    pub fn iter(&self) -> btree_set::Iter<'_, GlobalKey> {
        self.keys.iter()
    }
}

impl FromIterator<GlobalKey> for DirtyKeys {
    fn from_iter<I: IntoIterator<Item = GlobalKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DirtyKeys {
    type Item = &'a GlobalKey;
    type IntoIter = btree_set::Iter<'a, GlobalKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}
