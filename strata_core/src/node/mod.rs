// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout node data model.
//!
//! A *layout node* is what component resolution produces for one box in the
//! UI. Each node has:
//!
//! - A stack of contributing components ([`ComponentEntry`]), innermost
//!   first. The last entry is the *head*; its [`GlobalKey`](crate::key::GlobalKey)
//!   names the node.
//! - An ordered child list. Child head keys always extend the parent's head
//!   key.
//! - Box-model inputs ([`BoxStyle`]) plus a [`PropFlags`] bitset recording
//!   which of them were explicitly set.
//! - Effective [`InheritedFlags`], computed when the tree is frozen.
//! - An optional [`NestedTree`] marker and a cached measured size.
//!
//! Trees have two stages. A [`TreeBuilder`] is a mutable arena used while
//! resolving or reconciling; [`TreeBuilder::finish`] freezes it into a
//! [`LayoutTree`] whose nodes are read-only and stored in pre-order. Parent
//! lookups use a side map ([`LayoutTree::parent_map`]) rather than
//! back-pointers.

mod builder;
mod flags;
mod id;
mod traverse;
mod tree;

pub use builder::TreeBuilder;
pub use flags::{InheritedFlags, PropFlags};
pub use id::NodeId;
pub use traverse::Descendants;
pub use tree::{BoxStyle, ComponentEntry, LayoutNode, LayoutTree, NestedTree};
