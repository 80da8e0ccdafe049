//! icslayer core library: typed, zero-copy views over industrial protocol
//! headers, and an offline dissector built on top of them.
//!
//! The crate is layered leaf to root:
//! - `wire`: big-endian field descriptors and the `HeaderView` overlay
//! - `protocols`: HART-IP, Modbus/TCP ADU and PN-DCP layers plus the generic
//!   payload layer, all behind the `ProtocolLayer` trait
//! - `stack`: candidate registry and the index-linked layer stack
//! - `source` / `dissect`: pcap/pcapng reading, frame slicing and the
//!   deterministic JSON report
//!
//! Invariants:
//! - A layer validates its buffer once, at construction; getters and setters
//!   never index outside it afterwards.
//! - Multi-byte wire fields are big-endian; accessors speak host integers.
//! - Report ordering is stable across runs.
//!
//! # Examples
//! ```
//! use icslayer_core::protocols::{HartIpLayer, ProtocolLayer};
//!
//! let bytes = [0x01, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x0d];
//! let layer = HartIpLayer::new(&bytes[..])?;
//! assert_eq!(layer.sequence_number(), 2);
//! assert!(layer.summary().starts_with("HART-IP, version: 1"));
//! # Ok::<(), icslayer_core::protocols::LayerError>(())
//! ```
//!
//! ```no_run
//! use std::path::Path;
//!
//! use icslayer_core::{DissectConfig, dissect_capture_file};
//!
//! let report = dissect_capture_file(Path::new("capture.pcapng"), &DissectConfig::default())?;
//! println!("report version: {}", report.report_version);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod config;
pub mod dissect;
pub mod protocols;
pub mod source;
pub mod stack;
pub mod wire;

pub use config::DissectConfig;
pub use dissect::{DissectError, dissect_capture_file, dissect_source};
pub use source::{CaptureFrame, PacketSource, PcapFileSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Dissection report with deterministic ordering.
///
/// # Examples
/// ```
/// use icslayer_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert_eq!(report.report_version, icslayer_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 time of the last captured packet, or the epoch.
    pub generated_at: String,
    pub input: InputInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Classified protocols in stable order.
    pub protocols: Vec<ProtocolSummary>,
    /// One entry per classified packet, in capture order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packets: Vec<PacketSummary>,
    /// Compliance summaries in protocol order.
    pub compliance: Vec<ComplianceSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the dissector.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Basic capture summary (timestamps may be absent).
///
/// # Examples
/// ```
/// use icslayer_core::CaptureSummary;
///
/// let summary = CaptureSummary {
///     packets_total: 10,
///     time_start: None,
///     time_end: None,
/// };
/// assert_eq!(summary.packets_total, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Every frame in the file, classified or not.
    pub packets_total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Packets whose first application layer is `protocol`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSummary {
    /// Lowercase protocol tag (e.g. "modbustcp").
    pub protocol: String,
    pub packets: u64,
    /// Application payload bytes, headers included.
    pub bytes: u64,
}

/// Layer breakdown of one classified packet.
///
/// # Examples
/// ```
/// use icslayer_core::{LayerSummary, PacketSummary};
///
/// let packet = PacketSummary {
///     index: 0,
///     timestamp: None,
///     source: Some("10.0.0.1:502".to_string()),
///     layers: vec![LayerSummary {
///         protocol: "payload".to_string(),
///         offset: 0,
///         length: 2,
///         summary: "Payload Layer, Data length: 2".to_string(),
///     }],
/// };
/// assert_eq!(packet.layers[0].length, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketSummary {
    /// Zero-based frame index in the capture.
    pub index: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Source endpoint in `ip:port` form, absent for link-layer protocols.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub layers: Vec<LayerSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSummary {
    pub protocol: String,
    /// Offset within the application payload.
    pub offset: usize,
    /// Header plus remainder.
    pub length: usize,
    pub summary: String,
}

/// Compliance summary for a protocol.
///
/// # Examples
/// ```
/// use icslayer_core::{ComplianceSummary, Violation};
///
/// let summary = ComplianceSummary {
///     protocol: "modbustcp".to_string(),
///     compliance_percentage: 100.0,
///     violations: vec![Violation {
///         id: "ICS-MODBUS-LENGTH".to_string(),
///         severity: "warning".to_string(),
///         message: "Modbus/TCP length field differs from the bytes that follow it".to_string(),
///         count: 1,
///         examples: Vec::new(),
///     }],
/// };
/// assert_eq!(summary.violations.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub protocol: String,
    /// Share of checked packets without findings (0.0-100.0).
    pub compliance_percentage: f64,
    /// Violations sorted by severity and ID.
    pub violations: Vec<Violation>,
}

/// Single compliance violation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Stable violation identifier (e.g., `ICS-MODBUS-LENGTH`).
    pub id: String,
    /// Severity label (`error` or `warning`).
    pub severity: String,
    pub message: String,
    /// Number of packets aggregated into this violation.
    pub count: u64,
    /// At most three example contexts, formatted as `source ip:port @ ts`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Build a stub report with base fields filled and empty aggregates.
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "icslayer".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        protocols: vec![],
        packets: vec![],
        compliance: vec![],
    }
}
