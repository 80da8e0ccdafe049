use tracing::debug;

use super::layer::Layer;
use crate::DissectConfig;
use crate::protocols::{ProtocolId, pndcp};

/// Where a run of bytes came from, as far as the enclosing packet knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportHint {
    Udp { src_port: u16, dst_port: u16 },
    Tcp { src_port: u16, dst_port: u16 },
    Link { ether_type: u16 },
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchRule {
    /// Port on either endpoint, over the enabled transports.
    Port { port: u16, udp: bool, tcp: bool },
    /// Link-layer EtherType, or no context at all.
    EtherType(u16),
}

/// One protocol the registry may pick, with the context it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub protocol: ProtocolId,
    rule: MatchRule,
}

impl Candidate {
    pub fn udp_tcp_port(protocol: ProtocolId, port: u16) -> Self {
        Self {
            protocol,
            rule: MatchRule::Port {
                port,
                udp: true,
                tcp: true,
            },
        }
    }

    pub fn tcp_port(protocol: ProtocolId, port: u16) -> Self {
        Self {
            protocol,
            rule: MatchRule::Port {
                port,
                udp: false,
                tcp: true,
            },
        }
    }

    pub fn ether_type(protocol: ProtocolId, ether_type: u16) -> Self {
        Self {
            protocol,
            rule: MatchRule::EtherType(ether_type),
        }
    }

    /// Whether the transport context points at this protocol.
    pub fn claims(&self, hint: &TransportHint) -> bool {
        match (self.rule, *hint) {
            (
                MatchRule::Port { port, udp: true, .. },
                TransportHint::Udp { src_port, dst_port },
            )
            | (
                MatchRule::Port { port, tcp: true, .. },
                TransportHint::Tcp { src_port, dst_port },
            ) => src_port == port || dst_port == port,
            (MatchRule::EtherType(expected), TransportHint::Link { ether_type }) => {
                ether_type == expected
            }
            (MatchRule::EtherType(_), TransportHint::Unknown) => true,
            _ => false,
        }
    }
}

/// Ordered list of candidates consulted while sniffing.
///
/// # Examples
/// ```
/// use icslayer_core::protocols::ProtocolId;
/// use icslayer_core::stack::{Registry, TransportHint};
///
/// let registry = Registry::default();
/// let hint = TransportHint::Tcp { src_port: 49152, dst_port: 502 };
/// assert_eq!(registry.sniff(&[0u8; 14], &hint), Some(ProtocolId::ModbusTcp));
/// assert_eq!(registry.sniff(&[0u8; 13], &hint), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    candidates: Vec<Candidate>,
}

impl Registry {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    pub fn from_config(config: &DissectConfig) -> Self {
        Self::new(vec![
            Candidate::udp_tcp_port(ProtocolId::HartIp, config.hart_ip_port),
            Candidate::tcp_port(ProtocolId::ModbusTcp, config.modbus_tcp_port),
            Candidate::ether_type(ProtocolId::PnDcp, pndcp::layout::ETHER_TYPE),
        ])
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Protocols whose context rule accepts `hint`, regardless of content.
    pub fn claiming<'r>(
        &'r self,
        hint: &'r TransportHint,
    ) -> impl Iterator<Item = ProtocolId> + 'r {
        self.candidates
            .iter()
            .filter(move |candidate| candidate.claims(hint))
            .map(|candidate| candidate.protocol)
    }

    /// First claiming protocol whose validity predicate accepts `bytes`.
    pub fn sniff(&self, bytes: &[u8], hint: &TransportHint) -> Option<ProtocolId> {
        for protocol in self.claiming(hint) {
            if Layer::is_valid(protocol, bytes) {
                return Some(protocol);
            }
            debug!(
                protocol = protocol.as_str(),
                len = bytes.len(),
                "candidate rejected"
            );
        }
        None
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::from_config(&DissectConfig::default())
    }
}
