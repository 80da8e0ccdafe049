use crate::wire::{FieldDescriptor, WireField};

pub const HEADER_LEN: usize = 8;
pub const PORT: u16 = 5094;

pub const VERSION: WireField<u8> = WireField::new("version", 0);
pub const MESSAGE_TYPE: WireField<u8> = WireField::new("message_type", 1);
pub const MESSAGE_ID: WireField<u8> = WireField::new("message_id", 2);
pub const STATUS: WireField<u8> = WireField::new("status", 3);
pub const SEQUENCE_NUMBER: WireField<u16> = WireField::new("sequence_number", 4);
pub const BYTE_COUNT: WireField<u16> = WireField::new("byte_count", 6);

pub const FIELDS: &[FieldDescriptor] = &[
    VERSION.descriptor(),
    MESSAGE_TYPE.descriptor(),
    MESSAGE_ID.descriptor(),
    STATUS.descriptor(),
    SEQUENCE_NUMBER.descriptor(),
    BYTE_COUNT.descriptor(),
];

pub const MESSAGE_TYPE_REQUEST: u8 = 0x00;
pub const MESSAGE_TYPE_RESPONSE: u8 = 0x01;
pub const MESSAGE_TYPE_PUBLISH: u8 = 0x02;
pub const MESSAGE_TYPE_NAK: u8 = 0x0f;

pub const MESSAGE_ID_SESSION_INITIATE: u8 = 0x00;
pub const MESSAGE_ID_SESSION_CLOSE: u8 = 0x01;
pub const MESSAGE_ID_KEEP_ALIVE: u8 = 0x02;
pub const MESSAGE_ID_TOKEN_PASSING_PDU: u8 = 0x0f;

#[cfg(test)]
mod tests {
    use super::{FIELDS, HEADER_LEN};
    use crate::wire::field::layout_len;

    #[test]
    fn fields_cover_header() {
        assert_eq!(layout_len(FIELDS), HEADER_LEN);
    }
}
