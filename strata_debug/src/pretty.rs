// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] writes one line per event to any [`Write`]r:
//!
//! ```text
//! [reconcile #2] begin
//! reconcile v2: copied=2 reconciled=1 recreated=1 nodes=5 prev_render=0
//! [reconcile #2] end
//! [mount #3] begin
//! visibility #4 (incremental): +2 -1 in_range=6
//! mount plan #3: attach=2 detach=1 move=0 update=0
//! [mount #3] end
//! ```

use std::io::Write;

use strata_core::trace::{
    ClassificationEvent, MountOverflowEvent, MountPlanSummary, MountRequestEvent, PassBeginEvent,
    PassEndEvent, PassKind, RangeChangeEvent, ReconcileSummary, TraceSink, VisibilitySummary,
};

/// A [`TraceSink`] that formats events as text lines.
///
/// Write errors are ignored; tracing never fails the traced code.
#[derive(Debug)]
pub struct PrettyPrintSink<W> {
    writer: W,
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink writing to `writer`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consumes the sink and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn pass_name(kind: PassKind) -> &'static str {
    match kind {
        PassKind::Reconcile => "reconcile",
        PassKind::Visibility => "visibility",
        PassKind::Mount => "mount",
        PassKind::Drain => "drain",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = writeln!(self.writer, "[{} #{}] begin", pass_name(e.kind), e.pass);
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        let _ = writeln!(self.writer, "[{} #{}] end", pass_name(e.kind), e.pass);
    }

    fn on_reconcile(&mut self, s: &ReconcileSummary) {
        let _ = writeln!(
            self.writer,
            "reconcile v{}{}: copied={} reconciled={} recreated={} nodes={} prev_render={}",
            s.version,
            if s.full_rebuild { " (full rebuild)" } else { "" },
            s.copied,
            s.reconciled,
            s.recreated,
            s.nodes,
            s.previous_render_data,
        );
    }

    fn on_visibility(&mut self, s: &VisibilitySummary) {
        let _ = writeln!(
            self.writer,
            "visibility #{} ({}): +{} -{} in_range={}",
            s.evaluation,
            if s.full_reset { "full reset" } else { "incremental" },
            s.entered,
            s.exited,
            s.in_range,
        );
    }

    fn on_mount_request(&mut self, e: &MountRequestEvent) {
        let _ = writeln!(
            self.writer,
            "mount request @{}: {} (queue {})",
            e.pass,
            if e.queued { "queued" } else { "run" },
            e.queue_len,
        );
    }

    fn on_mount_overflow(&mut self, e: &MountOverflowEvent) {
        let _ = writeln!(
            self.writer,
            "mount overflow @{}: {:?} limit {} hit, dropped {} request(s)",
            e.pass, e.kind, e.limit, e.dropped,
        );
    }

    fn on_mount_plan(&mut self, s: &MountPlanSummary) {
        let _ = writeln!(
            self.writer,
            "mount plan #{}: attach={} detach={} move={} update={}",
            s.pass, s.attached, s.detached, s.moved, s.updated,
        );
    }

    fn on_classification(&mut self, e: &ClassificationEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "  {:indent$}{} -> {:?}",
            "",
            e.key,
            e.mode,
            indent = e.depth as usize * 2,
        );
    }

    fn on_range_change(&mut self, e: &RangeChangeEvent<'_>) {
        let _ = writeln!(self.writer, "  {:?} {}", e.transition, e.item);
    }
}

#[cfg(test)]
mod tests {
    use strata_core::reconcile::ReconciliationMode;
    use strata_core::trace::OverflowKind;
    use strata_core::window::Transition;

    use super::*;

    fn lines(sink: PrettyPrintSink<Vec<u8>>) -> Vec<String> {
        String::from_utf8(sink.into_inner())
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn one_line_per_event() {
        let mut sink = PrettyPrintSink::new(Vec::new());
        sink.on_pass_begin(&PassBeginEvent {
            kind: PassKind::Reconcile,
            pass: 2,
        });
        sink.on_reconcile(&ReconcileSummary {
            version: 2,
            copied: 2,
            reconciled: 1,
            recreated: 1,
            nodes: 5,
            ..ReconcileSummary::default()
        });
        sink.on_pass_end(&PassEndEvent {
            kind: PassKind::Reconcile,
            pass: 2,
        });

        assert_eq!(
            lines(sink),
            [
                "[reconcile #2] begin",
                "reconcile v2: copied=2 reconciled=1 recreated=1 nodes=5 prev_render=0",
                "[reconcile #2] end",
            ]
        );
    }

    #[test]
    fn overflow_and_visibility_lines() {
        let mut sink = PrettyPrintSink::new(Vec::new());
        sink.on_visibility(&VisibilitySummary {
            evaluation: 4,
            full_reset: true,
            entered: 3,
            exited: 0,
            in_range: 3,
        });
        sink.on_mount_overflow(&MountOverflowEvent {
            pass: 1,
            kind: OverflowKind::Queue,
            limit: 25,
            dropped: 26,
        });

        assert_eq!(
            lines(sink),
            [
                "visibility #4 (full reset): +3 -0 in_range=3",
                "mount overflow @1: Queue limit 25 hit, dropped 26 request(s)",
            ]
        );
    }

    #[test]
    fn rich_events_are_indented() {
        let mut sink = PrettyPrintSink::new(Vec::new());
        sink.on_classification(&ClassificationEvent {
            version: 1,
            depth: 2,
            key: "root.a[0].b[1]",
            mode: ReconciliationMode::Copy,
        });
        sink.on_range_change(&RangeChangeEvent {
            evaluation: 1,
            item: "root.row[3]",
            transition: Transition::Enter,
        });

        assert_eq!(
            lines(sink),
            ["      root.a[0].b[1] -> Copy", "  Enter root.row[3]"]
        );
    }
}
