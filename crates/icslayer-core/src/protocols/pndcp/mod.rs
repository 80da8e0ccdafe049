//! PROFINET Discovery and Configuration Protocol (PN-DCP) header layer.
//!
//! PN-DCP runs directly over Ethernet (EtherType 0x8892) and has no port, so
//! the frame id doubles as its signature: the high byte must be 0xFE and the
//! low byte one of 0xFD (Get/Set), 0xFE (Identify request) or 0xFF
//! (Identify response). The DCP blocks after the header are delegated to a
//! generic payload layer; service ids are exposed but not interpreted.

pub mod layer;
pub mod layout;

pub use layer::{PnDcpHeader, PnDcpLayer, ServiceId};
