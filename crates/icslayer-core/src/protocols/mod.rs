//! Protocol layers.
//!
//! Each protocol follows the same structure:
//! - `layout`: field table, header length and protocol constants (source of
//!   truth for offsets)
//! - `layer`: the typed view over a buffer, with validity predicate, getters,
//!   setters, construction path and summary
//!
//! Layers never read a field before their buffer passed validation, and are
//! generic over the buffer (`&[u8]`, `&mut [u8]` or `Vec<u8>`) so the same
//! code serves decode views and freshly built headers.

pub mod error;
pub mod hartip;
pub mod layer;
pub mod modbus;
pub mod payload;
pub mod pndcp;

pub use error::{LayerError, UnknownProtocol};
pub use hartip::HartIpLayer;
pub use layer::{ProtocolId, ProtocolLayer};
pub use modbus::ModbusTcpLayer;
pub use payload::PayloadLayer;
pub use pndcp::PnDcpLayer;

use crate::wire::FieldDescriptor;

/// Field table of a protocol, or `None` for the generic payload.
pub fn layout_of(protocol: ProtocolId) -> Option<&'static [FieldDescriptor]> {
    match protocol {
        ProtocolId::HartIp => Some(hartip::layout::FIELDS),
        ProtocolId::ModbusTcp => Some(modbus::layout::FIELDS),
        ProtocolId::PnDcp => Some(pndcp::layout::FIELDS),
        ProtocolId::Payload => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{ProtocolId, layout_of};
    use crate::wire::field::layout_len;

    #[test]
    fn layout_tables_match_header_lengths() {
        for protocol in ProtocolId::ALL {
            let fields = layout_of(protocol);
            assert_eq!(fields.map(layout_len), protocol.fixed_header_len());
        }
    }
}
