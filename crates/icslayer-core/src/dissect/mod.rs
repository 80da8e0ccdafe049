//! Capture dissection.
//!
//! Frames from a [`PacketSource`] are sliced down to their application
//! payload (`frame`), decoded into a [`LayerStack`] and checked against the
//! advisory rules in `compliance`. Everything is folded into a [`Report`].
//!
//! A frame that cannot be sliced is counted and skipped; nothing in a capture
//! aborts the run except source errors.

pub mod compliance;
pub mod error;
pub mod frame;

pub use error::{DissectError, FrameError};
pub use frame::{AppPayload, slice_frame};

use std::collections::BTreeMap;
use std::path::Path;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, info};

use crate::protocols::{ProtocolId, ProtocolLayer};
use crate::source::{CaptureFrame, PacketSource, PcapFileSource};
use crate::stack::{Layer, LayerStack, Registry};
use crate::{
    CaptureSummary, DEFAULT_GENERATED_AT, DissectConfig, LayerSummary, PacketSummary,
    ProtocolSummary, Report, make_stub_report,
};
use compliance::{ComplianceTracker, check_layer, format_example, rejection_findings};

pub fn dissect_capture_file(path: &Path, config: &DissectConfig) -> Result<Report, DissectError> {
    let source = PcapFileSource::open(path)?;
    dissect_source(path, source, config)
}

pub fn dissect_source<S: PacketSource>(
    path: &Path,
    mut source: S,
    config: &DissectConfig,
) -> Result<Report, DissectError> {
    let registry = Registry::from_config(config);
    let mut packets_total = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut protocols: BTreeMap<ProtocolId, ProtocolSummary> = BTreeMap::new();
    let mut packets = Vec::new();
    let mut tracker = ComplianceTracker::new();

    while let Some(frame) = source.next_frame()? {
        packets_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, frame.ts);

        let app = match slice_frame(frame.linktype, &frame.data) {
            Ok(Some(app)) => app,
            Ok(None) => continue,
            Err(err) => {
                debug!(index = frame.index, %err, "frame not sliced");
                continue;
            }
        };
        if app.payload.is_empty() {
            continue;
        }

        let example = || {
            let ts = ts_to_rfc3339(frame.ts);
            format_example(app.source.as_deref(), frame.index, ts.as_deref())
        };

        let stack = LayerStack::decode(app.payload, 0, &app.hint, &registry);
        let Some(first) = stack.layer(0).filter(|layer| layer.protocol() != ProtocolId::Payload)
        else {
            record_rejections(&registry, &app, &mut tracker, &example);
            continue;
        };

        let protocol = first.protocol();
        let entry = protocols.entry(protocol).or_insert_with(|| ProtocolSummary {
            protocol: protocol.as_str().to_string(),
            packets: 0,
            bytes: 0,
        });
        entry.packets += 1;
        entry.bytes += app.payload.len() as u64;
        tracker.record(protocol, &check_layer(&first), &example());

        if config.include_packets {
            packets.push(packet_summary(&frame, app.source.clone(), &stack));
        }
    }

    info!(packets_total, classified = protocols.len(), "capture dissected");

    let mut report = make_stub_report(&path.display().to_string(), path.metadata()?.len());
    report.capture_summary = Some(CaptureSummary {
        packets_total,
        time_start: ts_to_rfc3339(first_ts),
        time_end: ts_to_rfc3339(last_ts),
    });
    report.generated_at = report
        .capture_summary
        .as_ref()
        .and_then(|summary| summary.time_end.clone().or(summary.time_start.clone()))
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.protocols = protocols.into_values().collect();
    report.packets = packets;
    report.compliance = tracker.into_summaries();
    Ok(report)
}

/// The hint pointed at a protocol but its bytes did not build a layer.
fn record_rejections(
    registry: &Registry,
    app: &AppPayload<'_>,
    tracker: &mut ComplianceTracker,
    example: &dyn Fn() -> String,
) {
    for protocol in registry.claiming(&app.hint) {
        let Err(err) = Layer::parse(protocol, app.payload) else {
            continue;
        };
        debug!(protocol = protocol.as_str(), %err, "claimed payload rejected");
        if let Some(findings) = rejection_findings(&err) {
            tracker.record(protocol, &findings, &example());
        }
    }
}

fn packet_summary(frame: &CaptureFrame, source: Option<String>, stack: &LayerStack<'_>) -> PacketSummary {
    let layers = stack
        .iter()
        .zip(stack.layers())
        .map(|(record, layer)| LayerSummary {
            protocol: record.protocol.as_str().to_string(),
            offset: record.range.start,
            length: record.range.len(),
            summary: layer.summary(),
        })
        .collect();
    PacketSummary {
        index: frame.index,
        timestamp: ts_to_rfc3339(frame.ts),
        source,
        layers,
    }
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let Some(ts) = ts else {
        return;
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
