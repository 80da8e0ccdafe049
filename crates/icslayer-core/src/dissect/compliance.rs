use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::protocols::{LayerError, ProtocolId, modbus};
use crate::stack::Layer;
use crate::{ComplianceSummary, Violation};

const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// A named check with a stable identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub id: &'static str,
    pub severity: Severity,
    pub message: &'static str,
}

pub const HARTIP_TOO_SHORT: Rule = Rule {
    id: "ICS-HARTIP-TOO-SHORT",
    severity: Severity::Error,
    message: "HART-IP port payload shorter than the 8-byte header",
};
pub const HARTIP_BYTE_COUNT: Rule = Rule {
    id: "ICS-HARTIP-BYTE-COUNT",
    severity: Severity::Warning,
    message: "HART-IP byte count differs from message length",
};
pub const MODBUS_TOO_SHORT: Rule = Rule {
    id: "ICS-MODBUS-TOO-SHORT",
    severity: Severity::Error,
    message: "Modbus/TCP port payload shorter than MBAP header plus function code",
};
pub const MODBUS_PROTOCOL_ID: Rule = Rule {
    id: "ICS-MODBUS-PROTOCOL-ID",
    severity: Severity::Warning,
    message: "Modbus/TCP protocol identifier is not 0",
};
pub const MODBUS_LENGTH: Rule = Rule {
    id: "ICS-MODBUS-LENGTH",
    severity: Severity::Warning,
    message: "Modbus/TCP length field differs from the bytes that follow it",
};
pub const PNDCP_TOO_SHORT: Rule = Rule {
    id: "ICS-PNDCP-TOO-SHORT",
    severity: Severity::Error,
    message: "PROFINET frame shorter than the DCP header",
};
pub const PNDCP_DATA_LENGTH: Rule = Rule {
    id: "ICS-PNDCP-DATA-LENGTH",
    severity: Severity::Warning,
    message: "DCP data length exceeds the bytes after the header",
};

/// Rules a decoded layer breaks.
pub fn check_layer(layer: &Layer<'_>) -> Vec<Rule> {
    let mut findings = Vec::new();
    match layer {
        Layer::HartIp(hart) => {
            if !hart.byte_count_matches() {
                findings.push(HARTIP_BYTE_COUNT);
            }
        }
        Layer::ModbusTcp(modbus) => {
            if modbus.wire_protocol_id() != modbus.protocol_id() {
                findings.push(MODBUS_PROTOCOL_ID);
            }
            if !modbus.length_matches() {
                findings.push(MODBUS_LENGTH);
            }
        }
        Layer::PnDcp(dcp) => {
            if !dcp.data_length_fits() {
                findings.push(PNDCP_DATA_LENGTH);
            }
        }
        Layer::Payload(_) => {}
    }
    findings
}

/// Findings for a claimed payload that failed layer construction.
///
/// `None` when the bytes are not the claimed protocol at all (a PROFINET
/// frame id outside the DCP range, e.g. RT cyclic data); nothing is recorded
/// for those. A Modbus/TCP ADU shorter than the full header model but holding
/// at least the MBAP header and function code is a checked packet with no
/// findings.
pub fn rejection_findings(err: &LayerError) -> Option<Vec<Rule>> {
    match err {
        LayerError::TooShort {
            protocol, actual, ..
        } => match protocol {
            ProtocolId::HartIp => Some(vec![HARTIP_TOO_SHORT]),
            ProtocolId::ModbusTcp if *actual >= modbus::layout::MIN_ADU_LEN => Some(Vec::new()),
            ProtocolId::ModbusTcp => Some(vec![MODBUS_TOO_SHORT]),
            ProtocolId::PnDcp => Some(vec![PNDCP_TOO_SHORT]),
            ProtocolId::Payload => None,
        },
        LayerError::SignatureMismatch { .. } => None,
    }
}

#[derive(Debug, Default)]
struct RuleTally {
    rule: Option<Rule>,
    count: u64,
    examples: Vec<String>,
}

#[derive(Debug, Default)]
struct ProtocolTally {
    checked: u64,
    failing: u64,
    rules: BTreeMap<&'static str, RuleTally>,
}

/// Per-protocol pass/fail counts and violation examples.
#[derive(Debug, Default)]
pub struct ComplianceTracker {
    protocols: BTreeMap<ProtocolId, ProtocolTally>,
}

impl ComplianceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one checked packet of `protocol` with its findings.
    pub fn record(&mut self, protocol: ProtocolId, findings: &[Rule], example: &str) {
        let tally = self.protocols.entry(protocol).or_default();
        tally.checked += 1;
        if findings.is_empty() {
            return;
        }
        tally.failing += 1;
        for rule in findings {
            let entry = tally.rules.entry(rule.id).or_default();
            if entry.count == 0 {
                warn!(id = rule.id, example, "{}", rule.message);
            } else {
                debug!(id = rule.id, example, "repeated violation");
            }
            entry.rule = Some(*rule);
            entry.count += 1;
            if entry.examples.len() < MAX_EXAMPLES {
                entry.examples.push(example.to_string());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }

    /// Summaries in protocol order, violations by severity then id.
    pub fn into_summaries(self) -> Vec<ComplianceSummary> {
        self.protocols
            .into_iter()
            .map(|(protocol, tally)| {
                let mut violations: Vec<(Severity, Violation)> = tally
                    .rules
                    .into_values()
                    .filter_map(|entry| {
                        let rule = entry.rule?;
                        Some((
                            rule.severity,
                            Violation {
                                id: rule.id.to_string(),
                                severity: rule.severity.as_str().to_string(),
                                message: rule.message.to_string(),
                                count: entry.count,
                                examples: entry.examples,
                            },
                        ))
                    })
                    .collect();
                violations.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));

                ComplianceSummary {
                    protocol: protocol.as_str().to_string(),
                    compliance_percentage: percentage(tally.checked, tally.failing),
                    violations: violations.into_iter().map(|(_, v)| v).collect(),
                }
            })
            .collect()
    }
}

fn percentage(checked: u64, failing: u64) -> f64 {
    if checked == 0 {
        return 100.0;
    }
    let passing = checked.saturating_sub(failing) as f64;
    (passing / checked as f64 * 10_000.0).round() / 100.0
}

/// Example context in the report's `source ip:port @ ts` form.
pub fn format_example(source: Option<&str>, frame_index: u64, ts: Option<&str>) -> String {
    let origin = match source {
        Some(source) => format!("source {source}"),
        None => format!("frame {frame_index}"),
    };
    match ts {
        Some(ts) => format!("{origin} @ {ts}"),
        None => origin,
    }
}
