use std::io::{Read, Seek, SeekFrom};

use pcap_parser::Linktype;

use super::error::PcapSourceError;
use super::layout;

/// Read the leading magic and rewind so the capture reader sees the full
/// file header on its first fill.
pub fn read_magic_and_rewind<R: Read + Seek>(reader: &mut R) -> Result<[u8; 4], PcapSourceError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(magic)
}

pub fn is_pcapng_magic(magic: &[u8; 4]) -> bool {
    magic == &layout::PCAPNG_MAGIC
}

/// Interface linktype, Ethernet when the interface was never described.
pub fn linktype_for_interface(linktypes: &[Linktype], if_id: u32) -> Linktype {
    linktypes
        .get(if_id as usize)
        .copied()
        .unwrap_or(Linktype::ETHERNET)
}

pub fn pcapng_ts_to_seconds(ts_high: u32, ts_low: u32) -> f64 {
    let ts = (u64::from(ts_high) << 32) | u64::from(ts_low);
    ts as f64 / layout::PCAPNG_DEFAULT_TS_UNITS_PER_SEC
}

pub fn legacy_ts_to_seconds(ts_sec: u32, ts_frac: u32, nanosecond: bool) -> f64 {
    let scale = if nanosecond { 1e-9 } else { 1e-6 };
    f64::from(ts_sec) + f64::from(ts_frac) * scale
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use pcap_parser::Linktype;

    use super::{
        is_pcapng_magic, legacy_ts_to_seconds, linktype_for_interface, pcapng_ts_to_seconds,
        read_magic_and_rewind,
    };
    use crate::source::pcap::error::PcapSourceError;

    #[test]
    fn magic_is_read_then_rewound() {
        let bytes = vec![0x0a, 0x0d, 0x0d, 0x0a, 0x01];
        let mut cursor = Cursor::new(bytes.clone());
        let magic = read_magic_and_rewind(&mut cursor).unwrap();
        assert!(is_pcapng_magic(&magic));
        assert_eq!(cursor.position(), 0);
        let mut all = Vec::new();
        cursor.read_to_end(&mut all).unwrap();
        assert_eq!(all, bytes);
    }

    #[test]
    fn short_input_is_io_error() {
        let mut cursor = Cursor::new(vec![0xd4, 0xc3]);
        let err = read_magic_and_rewind(&mut cursor).unwrap_err();
        assert!(matches!(err, PcapSourceError::Io(_)));
    }

    #[test]
    fn undescribed_interface_is_ethernet() {
        let linktypes = [Linktype::RAW];
        assert_eq!(linktype_for_interface(&linktypes, 0), Linktype::RAW);
        assert_eq!(linktype_for_interface(&linktypes, 3), Linktype::ETHERNET);
    }

    #[test]
    fn timestamps_scale_to_seconds() {
        assert!((pcapng_ts_to_seconds(0, 2_500_000) - 2.5).abs() < f64::EPSILON);
        assert!((legacy_ts_to_seconds(10, 500_000, false) - 10.5).abs() < 1e-9);
        assert!((legacy_ts_to_seconds(10, 250_000_000, true) - 10.25).abs() < 1e-9);
    }
}
