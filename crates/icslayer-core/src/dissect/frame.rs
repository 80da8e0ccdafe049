use std::net::IpAddr;

use etherparse::{Ethernet2Slice, NetSlice, SingleVlanSlice, SlicedPacket, TransportSlice};
use pcap_parser::Linktype;

use super::error::FrameError;
use crate::stack::TransportHint;

const ETHER_TYPE_IPV4: u16 = 0x0800;
const ETHER_TYPE_IPV6: u16 = 0x86dd;
const VLAN_ETHER_TYPES: [u16; 3] = [0x8100, 0x88a8, 0x9100];

/// The bytes handed to the layer stack, with the context needed to sniff them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPayload<'a> {
    pub hint: TransportHint,
    pub payload: &'a [u8],
    /// `ip:port` for UDP/TCP, `None` for link-layer protocols.
    pub source: Option<String>,
}

/// Strip link, VLAN, IP and UDP/TCP headers.
///
/// `Ok(None)` means the frame carries nothing the stack could classify
/// (unsupported linktype, ICMP, an IP packet without transport).
pub fn slice_frame(linktype: Linktype, data: &[u8]) -> Result<Option<AppPayload<'_>>, FrameError> {
    match linktype {
        Linktype::ETHERNET => slice_ethernet(data),
        Linktype::RAW | Linktype::IPV4 | Linktype::IPV6 => slice_ip(data),
        _ => Ok(None),
    }
}

fn slice_ethernet(data: &[u8]) -> Result<Option<AppPayload<'_>>, FrameError> {
    let eth = Ethernet2Slice::from_slice_without_fcs(data)
        .map_err(|e| FrameError::Link(e.to_string()))?;
    let mut ether_type = eth.ether_type().0;
    let mut payload = eth.payload_slice();

    while VLAN_ETHER_TYPES.contains(&ether_type) {
        let vlan =
            SingleVlanSlice::from_slice(payload).map_err(|e| FrameError::Link(e.to_string()))?;
        ether_type = vlan.ether_type().0;
        payload = vlan.payload_slice();
    }

    match ether_type {
        ETHER_TYPE_IPV4 | ETHER_TYPE_IPV6 => slice_ip(payload),
        _ => Ok(Some(AppPayload {
            hint: TransportHint::Link { ether_type },
            payload,
            source: None,
        })),
    }
}

fn slice_ip(data: &[u8]) -> Result<Option<AppPayload<'_>>, FrameError> {
    let sliced = SlicedPacket::from_ip(data).map_err(|e| FrameError::Slice(e.to_string()))?;
    let Some(net) = sliced.net else {
        return Ok(None);
    };
    let src_ip = match net {
        NetSlice::Ipv4(ref ipv4) => IpAddr::V4(ipv4.header().source_addr()),
        NetSlice::Ipv6(ref ipv6) => IpAddr::V6(ipv6.header().source_addr()),
    };

    let (hint, payload, src_port) = match sliced.transport {
        Some(TransportSlice::Udp(udp)) => (
            TransportHint::Udp {
                src_port: udp.source_port(),
                dst_port: udp.destination_port(),
            },
            udp.payload(),
            udp.source_port(),
        ),
        Some(TransportSlice::Tcp(tcp)) => (
            TransportHint::Tcp {
                src_port: tcp.source_port(),
                dst_port: tcp.destination_port(),
            },
            tcp.payload(),
            tcp.source_port(),
        ),
        _ => return Ok(None),
    };

    Ok(Some(AppPayload {
        hint,
        payload,
        source: Some(format_endpoint(src_ip, src_port)),
    }))
}

fn format_endpoint(ip: IpAddr, port: u16) -> String {
    match ip {
        IpAddr::V4(ip) => format!("{ip}:{port}"),
        IpAddr::V6(ip) => format!("[{ip}]:{port}"),
    }
}
