// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records, one tag byte followed by fixed-size
//! fields. String payloads (keys, item ids) are a `u32` byte length followed
//! by UTF-8 bytes. [`decode`] reads them back as an iterator of
//! [`RecordedEvent`].

use strata_core::reconcile::ReconciliationMode;
use strata_core::trace::{
    ClassificationEvent, MountOverflowEvent, MountPlanSummary, MountRequestEvent, OverflowKind,
    PassBeginEvent, PassEndEvent, PassKind, RangeChangeEvent, ReconcileSummary, TraceSink,
    VisibilitySummary,
};
use strata_core::window::Transition;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PASS_BEGIN: u8 = 1;
const TAG_PASS_END: u8 = 2;
const TAG_RECONCILE: u8 = 3;
const TAG_VISIBILITY: u8 = 4;
const TAG_MOUNT_REQUEST: u8 = 5;
const TAG_MOUNT_OVERFLOW: u8 = 6;
const TAG_MOUNT_PLAN: u8 = 7;
const TAG_CLASSIFICATION: u8 = 8;
const TAG_RANGE_CHANGE: u8 = 9;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        let len = u32::try_from(s.len()).unwrap_or(u32::MAX);
        self.write_u32(len);
        self.buf.extend_from_slice(&s.as_bytes()[..len as usize]);
    }

    fn write_pass(&mut self, kind: PassKind) {
        self.write_u8(match kind {
            PassKind::Reconcile => 0,
            PassKind::Visibility => 1,
            PassKind::Mount => 2,
            PassKind::Drain => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.write_u8(TAG_PASS_BEGIN);
        self.write_pass(e.kind);
        self.write_u64(e.pass);
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        self.write_u8(TAG_PASS_END);
        self.write_pass(e.kind);
        self.write_u64(e.pass);
    }

    fn on_reconcile(&mut self, s: &ReconcileSummary) {
        self.write_u8(TAG_RECONCILE);
        self.write_u64(s.version);
        self.write_bool(s.full_rebuild);
        self.write_u32(s.copied);
        self.write_u32(s.reconciled);
        self.write_u32(s.recreated);
        self.write_u32(s.nodes);
        self.write_u32(s.previous_render_data);
    }

    fn on_visibility(&mut self, s: &VisibilitySummary) {
        self.write_u8(TAG_VISIBILITY);
        self.write_u64(s.evaluation);
        self.write_bool(s.full_reset);
        self.write_u32(s.entered);
        self.write_u32(s.exited);
        self.write_u32(s.in_range);
    }

    fn on_mount_request(&mut self, e: &MountRequestEvent) {
        self.write_u8(TAG_MOUNT_REQUEST);
        self.write_u64(e.pass);
        self.write_bool(e.queued);
        self.write_u32(e.queue_len);
    }

    fn on_mount_overflow(&mut self, e: &MountOverflowEvent) {
        self.write_u8(TAG_MOUNT_OVERFLOW);
        self.write_u64(e.pass);
        self.write_u8(match e.kind {
            OverflowKind::Queue => 0,
            OverflowKind::DrainRounds => 1,
        });
        self.write_u32(e.limit);
        self.write_u32(e.dropped);
    }

    fn on_mount_plan(&mut self, s: &MountPlanSummary) {
        self.write_u8(TAG_MOUNT_PLAN);
        self.write_u64(s.pass);
        self.write_u32(s.attached);
        self.write_u32(s.detached);
        self.write_u32(s.moved);
        self.write_u32(s.updated);
    }

    fn on_classification(&mut self, e: &ClassificationEvent<'_>) {
        self.write_u8(TAG_CLASSIFICATION);
        self.write_u64(e.version);
        self.write_u32(e.depth);
        self.write_u8(match e.mode {
            ReconciliationMode::Copy => 0,
            ReconciliationMode::Reconcile => 1,
            ReconciliationMode::Recreate => 2,
        });
        self.write_str(e.key);
    }

    fn on_range_change(&mut self, e: &RangeChangeEvent<'_>) {
        self.write_u8(TAG_RANGE_CHANGE);
        self.write_u64(e.evaluation);
        self.write_u8(match e.transition {
            Transition::Enter => 0,
            Transition::Exit => 1,
        });
        self.write_str(e.item);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`PassBeginEvent`].
    PassBegin(PassBeginEvent),
    /// A [`PassEndEvent`].
    PassEnd(PassEndEvent),
    /// A [`ReconcileSummary`].
    Reconcile(ReconcileSummary),
    /// A [`VisibilitySummary`].
    Visibility(VisibilitySummary),
    /// A [`MountRequestEvent`].
    MountRequest(MountRequestEvent),
    /// A [`MountOverflowEvent`].
    MountOverflow(MountOverflowEvent),
    /// A [`MountPlanSummary`].
    MountPlan(MountPlanSummary),
    /// An owned [`ClassificationEvent`].
    Classification {
        /// Layout version of the resolve context.
        version: u64,
        /// Depth below the reconcile root.
        depth: u32,
        /// The node's head key.
        key: String,
        /// The chosen mode.
        mode: ReconciliationMode,
    },
    /// An owned [`RangeChangeEvent`].
    RangeChange {
        /// Evaluation counter.
        evaluation: u64,
        /// The item id.
        item: String,
        /// Direction of the transition.
        transition: Transition,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated record or unknown tag.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Option<&[u8]> {
        if self.remaining() < len {
            return None;
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.read_bytes(4)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.read_bytes(8)?.try_into().ok()?))
    }

    fn read_string(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        String::from_utf8(self.read_bytes(len)?.to_vec()).ok()
    }

    fn read_pass(&mut self) -> Option<PassKind> {
        Some(match self.read_u8()? {
            0 => PassKind::Reconcile,
            1 => PassKind::Visibility,
            2 => PassKind::Mount,
            _ => PassKind::Drain,
        })
    }

    fn decode_pass_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassBegin(PassBeginEvent {
            kind: self.read_pass()?,
            pass: self.read_u64()?,
        }))
    }

    fn decode_pass_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PassEnd(PassEndEvent {
            kind: self.read_pass()?,
            pass: self.read_u64()?,
        }))
    }

    fn decode_reconcile(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Reconcile(ReconcileSummary {
            version: self.read_u64()?,
            full_rebuild: self.read_bool()?,
            copied: self.read_u32()?,
            reconciled: self.read_u32()?,
            recreated: self.read_u32()?,
            nodes: self.read_u32()?,
            previous_render_data: self.read_u32()?,
        }))
    }

    fn decode_visibility(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Visibility(VisibilitySummary {
            evaluation: self.read_u64()?,
            full_reset: self.read_bool()?,
            entered: self.read_u32()?,
            exited: self.read_u32()?,
            in_range: self.read_u32()?,
        }))
    }

    fn decode_mount_request(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::MountRequest(MountRequestEvent {
            pass: self.read_u64()?,
            queued: self.read_bool()?,
            queue_len: self.read_u32()?,
        }))
    }

    fn decode_mount_overflow(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::MountOverflow(MountOverflowEvent {
            pass: self.read_u64()?,
            kind: match self.read_u8()? {
                0 => OverflowKind::Queue,
                _ => OverflowKind::DrainRounds,
            },
            limit: self.read_u32()?,
            dropped: self.read_u32()?,
        }))
    }

    fn decode_mount_plan(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::MountPlan(MountPlanSummary {
            pass: self.read_u64()?,
            attached: self.read_u32()?,
            detached: self.read_u32()?,
            moved: self.read_u32()?,
            updated: self.read_u32()?,
        }))
    }

    fn decode_classification(&mut self) -> Option<RecordedEvent> {
        let version = self.read_u64()?;
        let depth = self.read_u32()?;
        let mode = match self.read_u8()? {
            0 => ReconciliationMode::Copy,
            1 => ReconciliationMode::Reconcile,
            _ => ReconciliationMode::Recreate,
        };
        let key = self.read_string()?;
        Some(RecordedEvent::Classification {
            version,
            depth,
            key,
            mode,
        })
    }

    fn decode_range_change(&mut self) -> Option<RecordedEvent> {
        let evaluation = self.read_u64()?;
        let transition = match self.read_u8()? {
            0 => Transition::Enter,
            _ => Transition::Exit,
        };
        let item = self.read_string()?;
        Some(RecordedEvent::RangeChange {
            evaluation,
            item,
            transition,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_PASS_BEGIN => self.decode_pass_begin(),
            TAG_PASS_END => self.decode_pass_end(),
            TAG_RECONCILE => self.decode_reconcile(),
            TAG_VISIBILITY => self.decode_visibility(),
            TAG_MOUNT_REQUEST => self.decode_mount_request(),
            TAG_MOUNT_OVERFLOW => self.decode_mount_overflow(),
            TAG_MOUNT_PLAN => self.decode_mount_plan(),
            TAG_CLASSIFICATION => self.decode_classification(),
            TAG_RANGE_CHANGE => self.decode_range_change(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
