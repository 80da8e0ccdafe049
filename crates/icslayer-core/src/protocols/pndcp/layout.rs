use crate::wire::{FieldDescriptor, WireField};

pub const HEADER_LEN: usize = 12;
pub const ETHER_TYPE: u16 = 0x8892;

pub const FRAME_ID: WireField<u16> = WireField::new("frame_id", 0);
pub const SERVICE_ID: WireField<u8> = WireField::new("service_id", 2);
pub const SERVICE_TYPE: WireField<u8> = WireField::new("service_type", 3);
pub const XID: WireField<u32> = WireField::new("xid", 4);
pub const RESPONSE_DELAY: WireField<u16> = WireField::new("response_delay", 8);
pub const DCP_DATA_LENGTH: WireField<u16> = WireField::new("dcp_data_length", 10);

pub const FIELDS: &[FieldDescriptor] = &[
    FRAME_ID.descriptor(),
    SERVICE_ID.descriptor(),
    SERVICE_TYPE.descriptor(),
    XID.descriptor(),
    RESPONSE_DELAY.descriptor(),
    DCP_DATA_LENGTH.descriptor(),
];

pub const FRAME_ID_HIGH: u8 = 0xfe;
pub const FRAME_ID_GET_SET: u8 = 0xfd;
pub const FRAME_ID_IDENTIFY_REQUEST: u8 = 0xfe;
pub const FRAME_ID_IDENTIFY_RESPONSE: u8 = 0xff;

pub const SERVICE_GET: u8 = 0x01;
pub const SERVICE_SET: u8 = 0x02;
pub const SERVICE_IDENTIFY: u8 = 0x05;
pub const SERVICE_HELLO: u8 = 0x06;

/// Whether `(high, low)` is a defined DCP frame id.
pub fn is_dcp_frame_id(high: u8, low: u8) -> bool {
    high == FRAME_ID_HIGH
        && matches!(
            low,
            FRAME_ID_GET_SET | FRAME_ID_IDENTIFY_REQUEST | FRAME_ID_IDENTIFY_RESPONSE
        )
}

#[cfg(test)]
mod tests {
    use super::{FIELDS, HEADER_LEN, is_dcp_frame_id};
    use crate::wire::field::layout_len;

    #[test]
    fn fields_cover_header() {
        assert_eq!(layout_len(FIELDS), HEADER_LEN);
    }

    #[test]
    fn only_defined_frame_ids_match() {
        for high in 0..=u8::MAX {
            for low in 0..=u8::MAX {
                let expected = high == 0xfe && (0xfd..=0xff).contains(&low);
                assert_eq!(is_dcp_frame_id(high, low), expected, "{high:02x} {low:02x}");
            }
        }
    }
}
