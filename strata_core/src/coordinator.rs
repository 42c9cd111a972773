// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Serialization of reentrant mutation passes.
//!
//! Mount and range callbacks run inside a mutation pass and may synchronously
//! ask for another pass (an exit callback that triggers a new layout, say).
//! Running that pass inline would recurse without bound. Instead, callbacks
//! hold a [`MountHandle`] whose [`request_mutation`](MountHandle::request_mutation)
//! only enqueues; the [`MountCoordinator`] replays the queue once the running
//! pass has finished.
//!
//! ```text
//!            request_mutation                 pass returns
//!   Idle ─────────────────────▶ Mutating ──────────────────▶ Idle
//!    ▲                            │ handle requests queue       │ queue not empty
//!    │                            ▼                             ▼
//!    └──────────────────────── Draining ◀──────────────── snapshot + clear
//!           queue empty          (mark dirty, run, FIFO)
//! ```
//!
//! The queue is bounded. A request that would exceed the bound is treated as
//! a callback loop: the queue is cleared, the request dropped, and a single
//! [`MountOverflowEvent`] is reported once the pass ends. Drain rounds (a
//! drained pass queueing further requests) are bounded the same way.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::Rect;

use crate::trace::{
    MountOverflowEvent, MountRequestEvent, OverflowKind, PassBeginEvent, PassEndEvent, PassKind,
    Tracer,
};
use crate::window::{CallbackError, VisibilityError};

/// A request to apply visible mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MutationRequest {
    /// The host's visible rectangle, if known.
    pub visible_rect: Option<Rect>,
    /// Whether visibility callbacks should be processed in this pass.
    pub process_visibility: bool,
}

impl MutationRequest {
    /// Creates a request for `visible_rect` that processes visibility.
    #[must_use]
    pub fn new(visible_rect: Rect) -> Self {
        Self {
            visible_rect: Some(visible_rect),
            process_visibility: true,
        }
    }
}

/// Coordinator state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MountPhase {
    /// No pass is running.
    Idle,
    /// A requested pass is running; new requests are queued.
    Mutating,
    /// Queued requests are being replayed; new requests are queued.
    Draining,
}

/// Coordinator limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Maximum number of queued requests.
    pub max_queue_len: u32,
    /// Maximum number of drain rounds after one top-level pass.
    pub max_drain_rounds: u32,
}

impl CoordinatorConfig {
    /// Creates a config with the given limits.
    #[must_use]
    pub const fn new(max_queue_len: u32, max_drain_rounds: u32) -> Self {
        Self {
            max_queue_len,
            max_drain_rounds,
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::new(25, 25)
    }
}

/// Error raised by a mounting adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterError {
    /// Description of the failure.
    pub message: String,
}

impl AdapterError {
    /// Creates an adapter error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for AdapterError {}

/// A failure in the middle of a mutation pass.
///
/// Mount state may be partially applied when one of these surfaces, so they
/// always propagate to the caller together with the owning tree name and the
/// path of the node being processed.
#[derive(Clone, Debug, PartialEq)]
pub enum MountError {
    /// An enter/exit callback failed.
    Callback {
        /// Owning tree name.
        tree: String,
        /// Path (global key or item id) of the node being processed.
        path: String,
        /// The callback's error.
        source: CallbackError,
    },
    /// The mounting adapter failed to apply an instruction.
    Adapter {
        /// Owning tree name.
        tree: String,
        /// Path (global key) of the node being processed.
        path: String,
        /// The adapter's error.
        source: AdapterError,
    },
    /// Visibility evaluation failed for a reason other than a callback.
    Visibility {
        /// Owning tree name.
        tree: String,
        /// The tracker's error.
        source: VisibilityError,
    },
}

impl MountError {
    /// Wraps a visibility error with the owning tree name.
    #[must_use]
    pub fn from_visibility(tree: &str, error: VisibilityError) -> Self {
        match error {
            VisibilityError::Callback { item, source } => Self::Callback {
                tree: String::from(tree),
                path: item,
                source,
            },
            other => Self::Visibility {
                tree: String::from(tree),
                source: other,
            },
        }
    }
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback { tree, path, source } => {
                write!(f, "callback failed while mounting {path} in {tree}: {source}")
            }
            Self::Adapter { tree, path, source } => {
                write!(f, "adapter failed while mounting {path} in {tree}: {source}")
            }
            Self::Visibility { tree, source } => {
                write!(f, "visibility evaluation failed in {tree}: {source}")
            }
        }
    }
}

impl core::error::Error for MountError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Callback { source, .. } => Some(source),
            Self::Adapter { source, .. } => Some(source),
            Self::Visibility { source, .. } => Some(source),
        }
    }
}

/// One mutation pass over mounted content.
pub trait MutationPass {
    /// Forces the next [`run`](Self::run) past any "nothing changed" fast
    /// path.
    fn mark_dirty(&mut self);

    /// Applies `request`.
    ///
    /// # Errors
    ///
    /// Returns [`MountError`] if a callback or the adapter fails.
    fn run(&mut self, request: &MutationRequest, tracer: &mut Tracer<'_>) -> Result<(), MountError>;
}

#[derive(Clone, Copy, Debug)]
enum Diagnostic {
    Request(MountRequestEvent),
    Overflow(MountOverflowEvent),
}

#[derive(Debug)]
struct Shared {
    config: CoordinatorConfig,
    phase: Cell<MountPhase>,
    queue: RefCell<VecDeque<MutationRequest>>,
    passes: Cell<u64>,
    overflow_count: Cell<u64>,
    /// Diagnostics raised through handles, which have no tracer; flushed
    /// after each pass.
    pending: RefCell<Vec<Diagnostic>>,
}

impl Shared {
    fn enqueue(&self, request: MutationRequest) {
        let mut queue = self.queue.borrow_mut();
        let limit = self.config.max_queue_len;
        if queue.len() >= limit as usize {
            let dropped = u32::try_from(queue.len() + 1).unwrap_or(u32::MAX);
            queue.clear();
            self.overflow_count.set(self.overflow_count.get() + 1);
            self.pending
                .borrow_mut()
                .push(Diagnostic::Overflow(MountOverflowEvent {
                    pass: self.passes.get(),
                    kind: OverflowKind::Queue,
                    limit,
                    dropped,
                }));
            return;
        }
        queue.push_back(request);
        self.pending
            .borrow_mut()
            .push(Diagnostic::Request(MountRequestEvent {
                pass: self.passes.get(),
                queued: true,
                queue_len: u32::try_from(queue.len()).unwrap_or(u32::MAX),
            }));
    }

    fn flush(&self, tracer: &mut Tracer<'_>) {
        // Sinks may hold a handle and enqueue while we dispatch.
        let pending = core::mem::take(&mut *self.pending.borrow_mut());
        for diagnostic in pending {
            match diagnostic {
                Diagnostic::Request(e) => tracer.mount_request(&e),
                Diagnostic::Overflow(e) => tracer.mount_overflow(&e),
            }
        }
    }

    fn next_pass(&self) -> u64 {
        let pass = self.passes.get() + 1;
        self.passes.set(pass);
        pass
    }
}

/// Runs mutation passes one at a time and replays requests raised from
/// inside them.
#[derive(Debug)]
pub struct MountCoordinator {
    shared: Rc<Shared>,
}

impl Default for MountCoordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl MountCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                config,
                phase: Cell::new(MountPhase::Idle),
                queue: RefCell::new(VecDeque::new()),
                passes: Cell::new(0),
                overflow_count: Cell::new(0),
                pending: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Returns a handle for callbacks to request passes with.
    #[must_use]
    pub fn handle(&self) -> MountHandle {
        MountHandle {
            shared: Rc::clone(&self.shared),
        }
    }

    /// Returns the configured limits.
    #[must_use]
    pub fn config(&self) -> CoordinatorConfig {
        self.shared.config
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> MountPhase {
        self.shared.phase.get()
    }

    /// Returns the number of queued requests.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.shared.queue.borrow().len()
    }

    /// Returns how many overflows (queue or drain rounds) have occurred.
    #[must_use]
    pub fn overflow_count(&self) -> u64 {
        self.shared.overflow_count.get()
    }

    /// Returns how many passes (requested and replayed) have run.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.shared.passes.get()
    }

    /// Runs `pass` for `request`, then drains any requests queued meanwhile.
    ///
    /// If a pass is already running the request is queued instead.
    ///
    /// # Errors
    ///
    /// Propagates the first [`MountError`] returned by `pass`. The coordinator
    /// returns to [`MountPhase::Idle`]; requests still queued are kept and
    /// drained after the next successful pass.
    pub fn request_mutation(
        &self,
        request: MutationRequest,
        pass: &mut dyn MutationPass,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), MountError> {
        let shared = &*self.shared;
        if shared.phase.get() != MountPhase::Idle {
            shared.enqueue(request);
            return Ok(());
        }

        let id = shared.next_pass();
        tracer.mount_request(&MountRequestEvent {
            pass: id,
            queued: false,
            queue_len: u32::try_from(self.queue_len()).unwrap_or(u32::MAX),
        });
        shared.phase.set(MountPhase::Mutating);
        tracer.pass_begin(&PassBeginEvent {
            kind: PassKind::Mount,
            pass: id,
        });
        let result = pass.run(&request, tracer);
        shared.phase.set(MountPhase::Idle);
        tracer.pass_end(&PassEndEvent {
            kind: PassKind::Mount,
            pass: id,
        });
        shared.flush(tracer);
        result?;
        self.drain(pass, tracer)
    }

    /// Replays queued requests in FIFO order, marking `pass` dirty before
    /// each. Requests queued while draining are replayed in further rounds,
    /// up to [`CoordinatorConfig::max_drain_rounds`].
    ///
    /// Does nothing while a pass is running.
    ///
    /// # Errors
    ///
    /// Propagates the first [`MountError`]; the failed request is dropped and
    /// the rest of its round is put back at the front of the queue.
    pub fn drain(
        &self,
        pass: &mut dyn MutationPass,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), MountError> {
        let shared = &*self.shared;
        if shared.phase.get() != MountPhase::Idle {
            return Ok(());
        }

        let mut rounds = 0;
        loop {
            let batch: Vec<MutationRequest> = shared.queue.borrow_mut().drain(..).collect();
            if batch.is_empty() {
                return Ok(());
            }
            rounds += 1;
            if rounds > shared.config.max_drain_rounds {
                shared.overflow_count.set(shared.overflow_count.get() + 1);
                tracer.mount_overflow(&MountOverflowEvent {
                    pass: shared.passes.get(),
                    kind: OverflowKind::DrainRounds,
                    limit: shared.config.max_drain_rounds,
                    dropped: u32::try_from(batch.len()).unwrap_or(u32::MAX),
                });
                return Ok(());
            }

            shared.phase.set(MountPhase::Draining);
            for (i, request) in batch.iter().enumerate() {
                let id = shared.next_pass();
                tracer.pass_begin(&PassBeginEvent {
                    kind: PassKind::Drain,
                    pass: id,
                });
                pass.mark_dirty();
                let result = pass.run(request, tracer);
                tracer.pass_end(&PassEndEvent {
                    kind: PassKind::Drain,
                    pass: id,
                });
                if let Err(err) = result {
                    shared.phase.set(MountPhase::Idle);
                    let mut queue = shared.queue.borrow_mut();
                    for rest in batch[i + 1..].iter().rev() {
                        queue.push_front(*rest);
                    }
                    drop(queue);
                    shared.flush(tracer);
                    return Err(err);
                }
            }
            shared.phase.set(MountPhase::Idle);
            shared.flush(tracer);
        }
    }
}

/// Lets callbacks request mutation passes.
///
/// Requests made through a handle are always queued, never run inline; the
/// coordinator replays them after its current pass (or on the next
/// [`MountCoordinator::drain`] when idle).
#[derive(Clone, Debug)]
pub struct MountHandle {
    shared: Rc<Shared>,
}

impl MountHandle {
    /// Queues `request`.
    pub fn request_mutation(&self, request: MutationRequest) {
        self.shared.enqueue(request);
    }

    /// Returns the coordinator's current phase.
    #[must_use]
    pub fn phase(&self) -> MountPhase {
        self.shared.phase.get()
    }
}
