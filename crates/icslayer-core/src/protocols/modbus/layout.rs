use crate::wire::{FieldDescriptor, WireField};

pub const HEADER_LEN: usize = 14;
/// MBAP header plus function code, the smallest well-formed ADU.
pub const MIN_ADU_LEN: usize = 8;
pub const PORT: u16 = 502;

pub const TRANSACTION_ID: WireField<u16> = WireField::new("transaction_id", 0);
pub const PROTOCOL_ID: WireField<u16> = WireField::new("protocol_id", 2);
pub const LENGTH: WireField<u16> = WireField::new("length", 4);
pub const UNIT_ID: WireField<u8> = WireField::new("unit_id", 6);
pub const FUNCTION_CODE: WireField<u8> = WireField::new("function_code", 7);
pub const REFERENCE_NUMBER: WireField<u16> = WireField::new("reference_number", 8);
pub const BIT_COUNT: WireField<u16> = WireField::new("bit_count", 10);
pub const BYTE_COUNT: WireField<u8> = WireField::new("byte_count", 12);
pub const DATA: WireField<u8> = WireField::new("data", 13);

pub const FIELDS: &[FieldDescriptor] = &[
    TRANSACTION_ID.descriptor(),
    PROTOCOL_ID.descriptor(),
    LENGTH.descriptor(),
    UNIT_ID.descriptor(),
    FUNCTION_CODE.descriptor(),
    REFERENCE_NUMBER.descriptor(),
    BIT_COUNT.descriptor(),
    BYTE_COUNT.descriptor(),
    DATA.descriptor(),
];

/// Modbus protocol identifier as it appears on the wire.
pub const PROTOCOL_ID_WIRE: [u8; 2] = [0x00, 0x00];
