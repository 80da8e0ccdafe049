use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{LayerError, UnknownProtocol};
use super::payload::PayloadLayer;

/// Classification tag for a decoded layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolId {
    HartIp,
    ModbusTcp,
    PnDcp,
    Payload,
}

impl ProtocolId {
    pub const ALL: [ProtocolId; 4] = [
        ProtocolId::HartIp,
        ProtocolId::ModbusTcp,
        ProtocolId::PnDcp,
        ProtocolId::Payload,
    ];

    /// Stable lowercase identifier used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolId::HartIp => "hartip",
            ProtocolId::ModbusTcp => "modbustcp",
            ProtocolId::PnDcp => "pndcp",
            ProtocolId::Payload => "payload",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProtocolId::HartIp => "HART-IP",
            ProtocolId::ModbusTcp => "Modbus/TCP",
            ProtocolId::PnDcp => "PN-DCP",
            ProtocolId::Payload => "Payload",
        }
    }

    /// Fixed header length, or `None` for the generic payload layer.
    pub fn fixed_header_len(&self) -> Option<usize> {
        match self {
            ProtocolId::HartIp => Some(super::hartip::layout::HEADER_LEN),
            ProtocolId::ModbusTcp => Some(super::modbus::layout::HEADER_LEN),
            ProtocolId::PnDcp => Some(super::pndcp::layout::HEADER_LEN),
            ProtocolId::Payload => None,
        }
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProtocolId {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hartip" | "hart-ip" | "hart" => Ok(ProtocolId::HartIp),
            "modbustcp" | "modbus-tcp" | "modbus" => Ok(ProtocolId::ModbusTcp),
            "pndcp" | "pn-dcp" | "dcp" => Ok(ProtocolId::PnDcp),
            "payload" => Ok(ProtocolId::Payload),
            _ => Err(UnknownProtocol(s.to_string())),
        }
    }
}

/// Contract shared by every decoded layer.
///
/// A layer is a validated view over its bytes: the header is at the start of
/// `as_bytes()` and everything after `header_len()` is the remainder that may
/// be handed to a successor.
pub trait ProtocolLayer {
    fn protocol(&self) -> ProtocolId;

    fn header_len(&self) -> usize;

    /// Header plus remainder.
    fn as_bytes(&self) -> &[u8];

    /// One-line human-readable rendering of the header fields.
    fn summary(&self) -> String;

    /// Whether trailing bytes become a payload layer.
    fn delegates_remainder(&self) -> bool {
        true
    }

    fn remainder(&self) -> &[u8] {
        self.as_bytes().get(self.header_len()..).unwrap_or_default()
    }

    /// Successor built over the bytes past the header, if any remain.
    fn delegate_remainder(&self) -> Option<PayloadLayer<&[u8]>> {
        if !self.delegates_remainder() {
            return None;
        }
        PayloadLayer::new(self.remainder()).ok()
    }
}

pub(crate) fn require_len(
    protocol: ProtocolId,
    bytes: &[u8],
    needed: usize,
) -> Result<(), LayerError> {
    if bytes.len() < needed {
        return Err(LayerError::TooShort {
            protocol,
            needed,
            actual: bytes.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ProtocolId, require_len};
    use crate::protocols::LayerError;

    #[test]
    fn parses_protocol_aliases() {
        assert_eq!("HART-IP".parse::<ProtocolId>().unwrap(), ProtocolId::HartIp);
        assert_eq!("modbus".parse::<ProtocolId>().unwrap(), ProtocolId::ModbusTcp);
        assert_eq!("pn-dcp".parse::<ProtocolId>().unwrap(), ProtocolId::PnDcp);
        let err = "s7comm".parse::<ProtocolId>().unwrap_err();
        assert!(err.to_string().contains("unknown protocol"));
    }

    #[test]
    fn serializes_as_lowercase_tag() {
        let json = serde_json::to_string(&ProtocolId::ModbusTcp).unwrap();
        assert_eq!(json, "\"modbustcp\"");
        for protocol in ProtocolId::ALL {
            assert_eq!(
                serde_json::to_string(&protocol).unwrap(),
                format!("\"{}\"", protocol.as_str())
            );
        }
    }

    #[test]
    fn require_len_reports_sizes() {
        assert!(require_len(ProtocolId::PnDcp, &[0u8; 12], 12).is_ok());
        let err = require_len(ProtocolId::PnDcp, &[0u8; 3], 12).unwrap_err();
        assert_eq!(
            err,
            LayerError::TooShort {
                protocol: ProtocolId::PnDcp,
                needed: 12,
                actual: 3
            }
        );
    }
}
