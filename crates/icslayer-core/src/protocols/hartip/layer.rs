use std::fmt;

use serde::Serialize;

use super::layout;
use crate::protocols::error::LayerError;
use crate::protocols::layer::{ProtocolId, ProtocolLayer, require_len};
use crate::wire::HeaderView;

/// All HART-IP header fields, as host values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HartIpHeader {
    pub version: u8,
    pub message_type: u8,
    pub message_id: u8,
    pub status: u8,
    pub sequence_number: u16,
    pub byte_count: u16,
}

/// HART-IP message type (request, response, publish, NAK).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Request,
    Response,
    Publish,
    Nak,
    Unknown(u8),
}

impl From<u8> for MessageType {
    fn from(value: u8) -> Self {
        match value {
            layout::MESSAGE_TYPE_REQUEST => MessageType::Request,
            layout::MESSAGE_TYPE_RESPONSE => MessageType::Response,
            layout::MESSAGE_TYPE_PUBLISH => MessageType::Publish,
            layout::MESSAGE_TYPE_NAK => MessageType::Nak,
            other => MessageType::Unknown(other),
        }
    }
}

impl MessageType {
    pub fn describe(&self) -> &'static str {
        match self {
            MessageType::Request => "request",
            MessageType::Response => "response",
            MessageType::Publish => "publish",
            MessageType::Nak => "NAK",
            MessageType::Unknown(_) => "unknown message type",
        }
    }
}

/// HART-IP message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageId {
    SessionInitiate,
    SessionClose,
    KeepAlive,
    TokenPassingPdu,
    Unknown(u8),
}

impl From<u8> for MessageId {
    fn from(value: u8) -> Self {
        match value {
            layout::MESSAGE_ID_SESSION_INITIATE => MessageId::SessionInitiate,
            layout::MESSAGE_ID_SESSION_CLOSE => MessageId::SessionClose,
            layout::MESSAGE_ID_KEEP_ALIVE => MessageId::KeepAlive,
            layout::MESSAGE_ID_TOKEN_PASSING_PDU => MessageId::TokenPassingPdu,
            other => MessageId::Unknown(other),
        }
    }
}

impl MessageId {
    pub fn describe(&self) -> &'static str {
        match self {
            MessageId::SessionInitiate => "session initiate",
            MessageId::SessionClose => "session close",
            MessageId::KeepAlive => "keep alive",
            MessageId::TokenPassingPdu => "HART token-passing PDU",
            MessageId::Unknown(_) => "unknown message id",
        }
    }
}

/// HART-IP header over a byte buffer.
///
/// `HartIpLayer<&[u8]>` is a decode view, `HartIpLayer<&mut [u8]>` edits a
/// captured packet in place and `HartIpLayer<Vec<u8>>` owns a freshly built
/// header.
///
/// # Examples
/// ```
/// use icslayer_core::protocols::hartip::HartIpLayer;
///
/// let bytes: [u8; 8] = [0x01, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x0d];
/// let layer = HartIpLayer::new(&bytes[..])?;
/// assert_eq!(layer.sequence_number(), 2);
/// assert_eq!(layer.byte_count(), 13);
/// # Ok::<(), icslayer_core::protocols::LayerError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HartIpLayer<B> {
    view: HeaderView<B>,
}

impl<B: AsRef<[u8]>> HartIpLayer<B> {
    /// Length-only check: HART-IP has no signature bytes.
    pub fn is_valid(bytes: &[u8]) -> bool {
        bytes.len() >= layout::HEADER_LEN
    }

    pub fn new(buffer: B) -> Result<Self, LayerError> {
        require_len(ProtocolId::HartIp, buffer.as_ref(), layout::HEADER_LEN)?;
        Ok(Self {
            view: HeaderView::new(buffer),
        })
    }

    pub fn version(&self) -> u8 {
        self.view.get(layout::VERSION)
    }

    pub fn message_type(&self) -> u8 {
        self.view.get(layout::MESSAGE_TYPE)
    }

    pub fn message_id(&self) -> u8 {
        self.view.get(layout::MESSAGE_ID)
    }

    pub fn status(&self) -> u8 {
        self.view.get(layout::STATUS)
    }

    pub fn sequence_number(&self) -> u16 {
        self.view.get(layout::SEQUENCE_NUMBER)
    }

    /// Message length as declared by the sender (header included).
    pub fn byte_count(&self) -> u16 {
        self.view.get(layout::BYTE_COUNT)
    }

    pub fn header(&self) -> HartIpHeader {
        HartIpHeader {
            version: self.version(),
            message_type: self.message_type(),
            message_id: self.message_id(),
            status: self.status(),
            sequence_number: self.sequence_number(),
            byte_count: self.byte_count(),
        }
    }

    /// Whether `byte_count` matches the bytes actually present.
    pub fn byte_count_matches(&self) -> bool {
        usize::from(self.byte_count()) == self.view.as_bytes().len()
    }

    pub fn get_ref(&self) -> &B {
        self.view.get_ref()
    }

    pub fn into_inner(self) -> B {
        self.view.into_inner()
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> HartIpLayer<B> {
    pub fn set_version(&mut self, version: u8) {
        self.view.set(layout::VERSION, version);
    }

    pub fn set_message_type(&mut self, message_type: u8) {
        self.view.set(layout::MESSAGE_TYPE, message_type);
    }

    pub fn set_message_id(&mut self, message_id: u8) {
        self.view.set(layout::MESSAGE_ID, message_id);
    }

    pub fn set_status(&mut self, status: u8) {
        self.view.set(layout::STATUS, status);
    }

    pub fn set_sequence_number(&mut self, sequence_number: u16) {
        self.view.set(layout::SEQUENCE_NUMBER, sequence_number);
    }

    pub fn set_byte_count(&mut self, byte_count: u16) {
        self.view.set(layout::BYTE_COUNT, byte_count);
    }

    fn write_header(&mut self, header: &HartIpHeader) {
        self.set_version(header.version);
        self.set_message_type(header.message_type);
        self.set_message_id(header.message_id);
        self.set_status(header.status);
        self.set_sequence_number(header.sequence_number);
        self.set_byte_count(header.byte_count);
    }
}

impl HartIpLayer<Vec<u8>> {
    /// Allocate a zeroed header and fill it from `header`.
    pub fn from_header(header: &HartIpHeader) -> Self {
        let mut layer = Self {
            view: HeaderView::new(vec![0u8; layout::HEADER_LEN]),
        };
        layer.write_header(header);
        layer
    }
}

impl<B: AsRef<[u8]>> ProtocolLayer for HartIpLayer<B> {
    fn protocol(&self) -> ProtocolId {
        ProtocolId::HartIp
    }

    fn header_len(&self) -> usize {
        layout::HEADER_LEN
    }

    fn as_bytes(&self) -> &[u8] {
        self.view.as_bytes()
    }

    fn summary(&self) -> String {
        format!(
            "HART-IP, version: {}, message type: {}, message id: {}, status: {}, sequence number: {}",
            self.version(),
            MessageType::from(self.message_type()).describe(),
            MessageId::from(self.message_id()).describe(),
            self.status(),
            self.sequence_number()
        )
    }

    fn delegates_remainder(&self) -> bool {
        false
    }
}

impl<B: AsRef<[u8]>> fmt::Display for HartIpLayer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
