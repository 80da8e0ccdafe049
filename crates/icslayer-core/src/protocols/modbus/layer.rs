use std::fmt;

use serde::Serialize;

use super::layout;
use crate::protocols::error::LayerError;
use crate::protocols::layer::{ProtocolId, ProtocolLayer, require_len};
use crate::wire::HeaderView;

/// Settable Modbus/TCP header fields. The protocol identifier is not part of
/// it: it is always written as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModbusTcpHeader {
    pub transaction_id: u16,
    pub length: u16,
    pub unit_id: u8,
    pub function_code: u8,
    pub reference_number: u16,
    pub bit_count: u16,
    pub byte_count: u8,
    pub data: u8,
}

/// Modbus/TCP ADU over a byte buffer.
///
/// Every field except the protocol identifier can be rewritten in place.
///
/// # Examples
/// ```
/// use icslayer_core::protocols::modbus::{ModbusTcpHeader, ModbusTcpLayer};
///
/// let mut layer = ModbusTcpLayer::from_header(&ModbusTcpHeader {
///     transaction_id: 0x57de,
///     length: 8,
///     unit_id: 0xff,
///     function_code: 0x0f,
///     ..Default::default()
/// });
/// layer.set_reference_number(5);
/// assert_eq!(layer.reference_number(), 5);
/// assert_eq!(layer.protocol_id(), 0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ModbusTcpLayer<B> {
    view: HeaderView<B>,
}

impl<B: AsRef<[u8]>> ModbusTcpLayer<B> {
    /// Length-only check; pair it with the port hint to classify.
    pub fn is_valid(bytes: &[u8]) -> bool {
        bytes.len() >= layout::HEADER_LEN
    }

    pub fn new(buffer: B) -> Result<Self, LayerError> {
        require_len(ProtocolId::ModbusTcp, buffer.as_ref(), layout::HEADER_LEN)?;
        Ok(Self {
            view: HeaderView::new(buffer),
        })
    }

    pub fn transaction_id(&self) -> u16 {
        self.view.get(layout::TRANSACTION_ID)
    }

    /// Always 0 for Modbus; the buffer value is not consulted.
    pub fn protocol_id(&self) -> u16 {
        u16::from_be_bytes(layout::PROTOCOL_ID_WIRE)
    }

    /// Protocol identifier as actually present in the buffer.
    pub fn wire_protocol_id(&self) -> u16 {
        self.view.get(layout::PROTOCOL_ID)
    }

    /// Number of bytes following the length field.
    pub fn length(&self) -> u16 {
        self.view.get(layout::LENGTH)
    }

    pub fn unit_id(&self) -> u8 {
        self.view.get(layout::UNIT_ID)
    }

    pub fn function_code(&self) -> u8 {
        self.view.get(layout::FUNCTION_CODE)
    }

    pub fn reference_number(&self) -> u16 {
        self.view.get(layout::REFERENCE_NUMBER)
    }

    pub fn bit_count(&self) -> u16 {
        self.view.get(layout::BIT_COUNT)
    }

    pub fn byte_count(&self) -> u8 {
        self.view.get(layout::BYTE_COUNT)
    }

    pub fn data(&self) -> u8 {
        self.view.get(layout::DATA)
    }

    pub fn header(&self) -> ModbusTcpHeader {
        ModbusTcpHeader {
            transaction_id: self.transaction_id(),
            length: self.length(),
            unit_id: self.unit_id(),
            function_code: self.function_code(),
            reference_number: self.reference_number(),
            bit_count: self.bit_count(),
            byte_count: self.byte_count(),
            data: self.data(),
        }
    }

    /// Whether the length field matches the bytes after it.
    pub fn length_matches(&self) -> bool {
        let following = self.view.as_bytes().len() - layout::LENGTH.end();
        usize::from(self.length()) == following
    }

    pub fn get_ref(&self) -> &B {
        self.view.get_ref()
    }

    pub fn into_inner(self) -> B {
        self.view.into_inner()
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ModbusTcpLayer<B> {
    pub fn set_transaction_id(&mut self, transaction_id: u16) {
        self.view.set(layout::TRANSACTION_ID, transaction_id);
    }

    pub fn set_length(&mut self, length: u16) {
        self.view.set(layout::LENGTH, length);
    }

    pub fn set_unit_id(&mut self, unit_id: u8) {
        self.view.set(layout::UNIT_ID, unit_id);
    }

    pub fn set_function_code(&mut self, function_code: u8) {
        self.view.set(layout::FUNCTION_CODE, function_code);
    }

    pub fn set_reference_number(&mut self, reference_number: u16) {
        self.view.set(layout::REFERENCE_NUMBER, reference_number);
    }

    pub fn set_bit_count(&mut self, bit_count: u16) {
        self.view.set(layout::BIT_COUNT, bit_count);
    }

    pub fn set_byte_count(&mut self, byte_count: u8) {
        self.view.set(layout::BYTE_COUNT, byte_count);
    }

    pub fn set_data(&mut self, data: u8) {
        self.view.set(layout::DATA, data);
    }
}

impl ModbusTcpLayer<Vec<u8>> {
    /// Allocate a zeroed ADU and fill it from `header`.
    pub fn from_header(header: &ModbusTcpHeader) -> Self {
        let mut layer = Self {
            view: HeaderView::new(vec![0u8; layout::HEADER_LEN]),
        };
        layer.set_transaction_id(header.transaction_id);
        layer.set_length(header.length);
        layer.set_unit_id(header.unit_id);
        layer.set_function_code(header.function_code);
        layer.set_reference_number(header.reference_number);
        layer.set_bit_count(header.bit_count);
        layer.set_byte_count(header.byte_count);
        layer.set_data(header.data);
        layer
    }
}

impl<B: AsRef<[u8]>> ProtocolLayer for ModbusTcpLayer<B> {
    fn protocol(&self) -> ProtocolId {
        ProtocolId::ModbusTcp
    }

    fn header_len(&self) -> usize {
        layout::HEADER_LEN
    }

    fn as_bytes(&self) -> &[u8] {
        self.view.as_bytes()
    }

    fn summary(&self) -> String {
        format!(
            "MODBUS TCP/ IP ADU Layer, transaction identifier: {}, length: {}, unit identifier: {}, function code: {}, reference number: {}, bit count: {}, byte count: {}, data: {}",
            self.transaction_id(),
            self.length(),
            self.unit_id(),
            self.function_code(),
            self.reference_number(),
            self.bit_count(),
            self.byte_count(),
            self.data()
        )
    }
}

impl<B: AsRef<[u8]>> fmt::Display for ModbusTcpLayer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
