// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Recordings carry no wall-clock time, so each event's position in the
//! recording stands in for its timestamp (one microsecond per event). Pass
//! begin/end pairs become duration slices; everything else is an instant.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// # Errors
///
/// Returns any I/O error raised by `writer`.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (ts, recorded) in decode(bytes).enumerate() {
        let event = match recorded {
            RecordedEvent::PassBegin(e) => json!({
                "ph": "B",
                "name": format!("{:?}", e.kind),
                "cat": "Pass",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "args": { "pass": e.pass }
            }),
            RecordedEvent::PassEnd(e) => json!({
                "ph": "E",
                "name": format!("{:?}", e.kind),
                "cat": "Pass",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "args": { "pass": e.pass }
            }),
            RecordedEvent::Reconcile(s) => json!({
                "ph": "i",
                "name": "Reconcile",
                "cat": "Summary",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "t",
                "args": {
                    "version": s.version,
                    "full_rebuild": s.full_rebuild,
                    "copied": s.copied,
                    "reconciled": s.reconciled,
                    "recreated": s.recreated,
                    "nodes": s.nodes,
                    "previous_render_data": s.previous_render_data,
                }
            }),
            RecordedEvent::Visibility(s) => json!({
                "ph": "i",
                "name": "Visibility",
                "cat": "Summary",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "t",
                "args": {
                    "evaluation": s.evaluation,
                    "full_reset": s.full_reset,
                    "entered": s.entered,
                    "exited": s.exited,
                    "in_range": s.in_range,
                }
            }),
            RecordedEvent::MountRequest(e) => json!({
                "ph": "i",
                "name": "MountRequest",
                "cat": "Coordinator",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "t",
                "args": {
                    "pass": e.pass,
                    "queued": e.queued,
                    "queue_len": e.queue_len,
                }
            }),
            RecordedEvent::MountOverflow(e) => json!({
                "ph": "i",
                "name": "MountOverflow",
                "cat": "Coordinator",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "g",
                "args": {
                    "pass": e.pass,
                    "kind": format!("{:?}", e.kind),
                    "limit": e.limit,
                    "dropped": e.dropped,
                }
            }),
            RecordedEvent::MountPlan(s) => json!({
                "ph": "i",
                "name": "MountPlan",
                "cat": "Summary",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "s": "t",
                "args": {
                    "pass": s.pass,
                    "attached": s.attached,
                    "detached": s.detached,
                    "moved": s.moved,
                    "updated": s.updated,
                }
            }),
            RecordedEvent::Classification {
                version,
                depth,
                key,
                mode,
            } => json!({
                "ph": "i",
                "name": format!("{mode:?}"),
                "cat": "Rich",
                "ts": ts,
                "pid": 0,
                "tid": 1,
                "s": "t",
                "args": {
                    "version": version,
                    "depth": depth,
                    "key": key,
                }
            }),
            RecordedEvent::RangeChange {
                evaluation,
                item,
                transition,
            } => json!({
                "ph": "i",
                "name": format!("{transition:?}"),
                "cat": "Rich",
                "ts": ts,
                "pid": 0,
                "tid": 1,
                "s": "t",
                "args": {
                    "evaluation": evaluation,
                    "item": item,
                }
            }),
        };
        events.push(event);
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}
