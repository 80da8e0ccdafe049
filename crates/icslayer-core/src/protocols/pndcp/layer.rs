use std::fmt;

use serde::Serialize;

use super::layout;
use crate::protocols::error::LayerError;
use crate::protocols::layer::{ProtocolId, ProtocolLayer, require_len};
use crate::wire::HeaderView;

/// All PN-DCP header fields, as host values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PnDcpHeader {
    pub frame_id: u16,
    pub service_id: u8,
    pub service_type: u8,
    pub xid: u32,
    pub response_delay: u16,
    pub dcp_data_length: u16,
}

/// DCP service identifier. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceId {
    Get,
    Set,
    Identify,
    Hello,
    Unknown(u8),
}

impl From<u8> for ServiceId {
    fn from(value: u8) -> Self {
        match value {
            layout::SERVICE_GET => ServiceId::Get,
            layout::SERVICE_SET => ServiceId::Set,
            layout::SERVICE_IDENTIFY => ServiceId::Identify,
            layout::SERVICE_HELLO => ServiceId::Hello,
            other => ServiceId::Unknown(other),
        }
    }
}

impl ServiceId {
    pub fn describe(&self) -> &'static str {
        match self {
            ServiceId::Get => "get",
            ServiceId::Set => "set",
            ServiceId::Identify => "identify",
            ServiceId::Hello => "hello",
            ServiceId::Unknown(_) => "unknown service",
        }
    }
}

/// PN-DCP header over a byte buffer.
///
/// # Examples
/// ```
/// use icslayer_core::protocols::pndcp::PnDcpLayer;
///
/// let identify: [u8; 12] = [0xfe, 0xfe, 0x05, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x04];
/// assert!(PnDcpLayer::<&[u8]>::is_valid(&identify));
/// let layer = PnDcpLayer::new(&identify[..])?;
/// assert_eq!(layer.xid(), 16_777_217);
/// # Ok::<(), icslayer_core::protocols::LayerError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PnDcpLayer<B> {
    view: HeaderView<B>,
}

impl<B: AsRef<[u8]>> PnDcpLayer<B> {
    /// Frame-id signature check followed by the length check.
    pub fn is_valid(bytes: &[u8]) -> bool {
        Self::check(bytes).is_ok()
    }

    pub fn new(buffer: B) -> Result<Self, LayerError> {
        Self::check(buffer.as_ref())?;
        Ok(Self {
            view: HeaderView::new(buffer),
        })
    }

    fn check(bytes: &[u8]) -> Result<(), LayerError> {
        let (high, low) = match bytes {
            [high, low, ..] => (*high, *low),
            _ => {
                return Err(LayerError::TooShort {
                    protocol: ProtocolId::PnDcp,
                    needed: layout::HEADER_LEN,
                    actual: bytes.len(),
                });
            }
        };
        if !layout::is_dcp_frame_id(high, low) {
            return Err(LayerError::SignatureMismatch {
                protocol: ProtocolId::PnDcp,
                found: [high, low],
            });
        }
        require_len(ProtocolId::PnDcp, bytes, layout::HEADER_LEN)
    }

    pub fn frame_id(&self) -> u16 {
        self.view.get(layout::FRAME_ID)
    }

    pub fn service_id(&self) -> u8 {
        self.view.get(layout::SERVICE_ID)
    }

    pub fn service_type(&self) -> u8 {
        self.view.get(layout::SERVICE_TYPE)
    }

    /// Transaction identifier.
    pub fn xid(&self) -> u32 {
        self.view.get(layout::XID)
    }

    pub fn response_delay(&self) -> u16 {
        self.view.get(layout::RESPONSE_DELAY)
    }

    /// Declared size of the DCP blocks following the header.
    pub fn dcp_data_length(&self) -> u16 {
        self.view.get(layout::DCP_DATA_LENGTH)
    }

    pub fn header(&self) -> PnDcpHeader {
        PnDcpHeader {
            frame_id: self.frame_id(),
            service_id: self.service_id(),
            service_type: self.service_type(),
            xid: self.xid(),
            response_delay: self.response_delay(),
            dcp_data_length: self.dcp_data_length(),
        }
    }

    /// Whether the bytes past the header cover `dcp_data_length`.
    ///
    /// Ethernet pads short frames, so extra trailing bytes are accepted.
    /// Delegation always follows the buffer; this is only a diagnostic.
    pub fn data_length_fits(&self) -> bool {
        usize::from(self.dcp_data_length()) <= self.remainder().len()
    }

    pub fn get_ref(&self) -> &B {
        self.view.get_ref()
    }

    pub fn into_inner(self) -> B {
        self.view.into_inner()
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> PnDcpLayer<B> {
    pub fn set_frame_id(&mut self, frame_id: u16) {
        self.view.set(layout::FRAME_ID, frame_id);
    }

    pub fn set_service_id(&mut self, service_id: u8) {
        self.view.set(layout::SERVICE_ID, service_id);
    }

    pub fn set_service_type(&mut self, service_type: u8) {
        self.view.set(layout::SERVICE_TYPE, service_type);
    }

    pub fn set_xid(&mut self, xid: u32) {
        self.view.set(layout::XID, xid);
    }

    pub fn set_response_delay(&mut self, response_delay: u16) {
        self.view.set(layout::RESPONSE_DELAY, response_delay);
    }

    pub fn set_dcp_data_length(&mut self, dcp_data_length: u16) {
        self.view.set(layout::DCP_DATA_LENGTH, dcp_data_length);
    }
}

impl PnDcpLayer<Vec<u8>> {
    /// Allocate a zeroed header and fill it from `header`.
    ///
    /// The frame id is written as given, so a header built with an undefined
    /// frame id will not pass `is_valid` once serialized.
    pub fn from_header(header: &PnDcpHeader) -> Self {
        let mut layer = Self {
            view: HeaderView::new(vec![0u8; layout::HEADER_LEN]),
        };
        layer.set_frame_id(header.frame_id);
        layer.set_service_id(header.service_id);
        layer.set_service_type(header.service_type);
        layer.set_xid(header.xid);
        layer.set_response_delay(header.response_delay);
        layer.set_dcp_data_length(header.dcp_data_length);
        layer
    }
}

impl<B: AsRef<[u8]>> ProtocolLayer for PnDcpLayer<B> {
    fn protocol(&self) -> ProtocolId {
        ProtocolId::PnDcp
    }

    fn header_len(&self) -> usize {
        layout::HEADER_LEN
    }

    fn as_bytes(&self) -> &[u8] {
        self.view.as_bytes()
    }

    fn summary(&self) -> String {
        format!(
            "PN-DCP Layer, frame id: {}, service id: {}, service type: {}, xid: {}, response delay: {}, DPC data length: {}",
            self.frame_id(),
            self.service_id(),
            self.service_type(),
            self.xid(),
            self.response_delay(),
            self.dcp_data_length()
        )
    }
}

impl<B: AsRef<[u8]>> fmt::Display for PnDcpLayer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
