mod common;

use std::io::Cursor;

use icslayer_core::{PacketSource, PcapFileSource, SourceError};
use pcap_parser::Linktype;

#[test]
fn pcapng_frames_come_back_in_order() {
    let frames = vec![
        common::udp_frame(40000, 5094, &[0u8; 8]),
        common::profinet_frame(&[0xfe, 0xfe, 0x05, 0x00]),
    ];
    let (_dir, path) = common::write_capture(&frames);
    let mut source = PcapFileSource::open(&path).unwrap();

    let mut seen = Vec::new();
    while let Some(frame) = source.next_frame().unwrap() {
        assert_eq!(frame.linktype, Linktype::ETHERNET);
        seen.push((frame.index, frame.ts, frame.data));
    }

    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0, 0);
    assert_eq!(seen[1].1, Some(1.0));
    assert_eq!(seen[1].2, frames[1]);
}

#[test]
fn block_padding_is_not_part_of_the_frame() {
    // 14-byte Ethernet header plus 13 bytes: the block pads 3 zero bytes.
    let frame = common::profinet_frame(&[0xab; 13]);
    assert_ne!(frame.len() % 4, 0);
    let bytes = common::pcapng_bytes(std::slice::from_ref(&frame));
    let mut source = PcapFileSource::from_reader(Cursor::new(bytes)).unwrap();

    let read = source.next_frame().unwrap().unwrap();
    assert_eq!(read.data.len(), 27);
    assert_eq!(read.data, frame);
}

#[test]
fn simple_packet_blocks_have_no_timestamp() {
    let frame = common::profinet_frame(&[0xcd; 5]);
    let bytes = common::pcapng_simple_bytes(std::slice::from_ref(&frame));
    let mut source = PcapFileSource::from_reader(Cursor::new(bytes)).unwrap();

    let read = source.next_frame().unwrap().unwrap();
    assert_eq!(read.ts, None);
    assert_eq!(read.data, frame);
    assert!(source.next_frame().unwrap().is_none());
}

#[test]
fn in_memory_reader_is_accepted() {
    let bytes = common::pcapng_bytes(&[common::tcp_frame(40000, 502, &[0u8; 14])]);
    let mut source = PcapFileSource::from_reader(Cursor::new(bytes)).unwrap();
    assert!(source.next_frame().unwrap().is_some());
    assert!(source.next_frame().unwrap().is_none());
}

#[test]
fn truncated_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.pcapng");
    common::write_bytes(&path, &[0x0a, 0x0d, 0x0d]);

    let err = match PcapFileSource::open(&path) {
        Ok(_) => panic!("expected truncated file to be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, SourceError::Io(_)));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = PcapFileSource::open(&dir.path().join("absent.pcap"));
    assert!(matches!(result, Err(SourceError::Io(_))));
}
