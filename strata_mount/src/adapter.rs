// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for carrying out mount instructions.
//!
//! Strata never touches host views itself. A host integration implements
//! [`MountAdapter`] over its native child list (platform views, DOM nodes,
//! a test recorder) and the [`Mounter`](crate::Mounter) feeds it one
//! instruction at a time.

use strata_core::coordinator::AdapterError;

use crate::plan::MountInstruction;

/// Applies mount instructions to a host's native content.
///
/// Instructions arrive in plan order; see
/// [`MountInstruction`] for the index convention.
pub trait MountAdapter {
    /// Carries out `instruction`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] if the host cannot apply the instruction.
    /// The mounter stops at the first failure; instructions applied before
    /// it stay applied.
    fn apply(&mut self, instruction: &MountInstruction) -> Result<(), AdapterError>;
}

impl<A: MountAdapter + ?Sized> MountAdapter for &mut A {
    fn apply(&mut self, instruction: &MountInstruction) -> Result<(), AdapterError> {
        (**self).apply(instruction)
    }
}
