#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use etherparse::{EtherType, Ethernet2Header, PacketBuilder};
use tempfile::TempDir;

pub const CLIENT_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
pub const DEVICE_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x02];
pub const DCP_MULTICAST: [u8; 6] = [0x01, 0x0e, 0xcf, 0x00, 0x00, 0x00];

pub fn udp_frame(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2(CLIENT_MAC, DEVICE_MAC)
        .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
        .udp(src_port, dst_port);
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, payload).unwrap();
    frame
}

pub fn tcp_frame(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2(CLIENT_MAC, DEVICE_MAC)
        .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
        .tcp(src_port, dst_port, 1, 8192);
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, payload).unwrap();
    frame
}

/// Untagged PROFINET frame (EtherType 0x8892).
pub fn profinet_frame(payload: &[u8]) -> Vec<u8> {
    let header = Ethernet2Header {
        source: CLIENT_MAC,
        destination: DCP_MULTICAST,
        ether_type: EtherType(0x8892),
    };
    let mut frame = header.to_bytes().to_vec();
    frame.extend_from_slice(payload);
    frame
}

/// Little-endian pcapng with one Ethernet interface; frame `i` is stamped
/// `i` seconds after the epoch.
pub fn pcapng_bytes(frames: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();

    let mut shb = Vec::new();
    shb.extend_from_slice(&0x1a2b_3c4du32.to_le_bytes());
    shb.extend_from_slice(&1u16.to_le_bytes());
    shb.extend_from_slice(&0u16.to_le_bytes());
    shb.extend_from_slice(&(-1i64).to_le_bytes());
    push_block(&mut out, 0x0a0d_0d0a, &shb);

    let mut idb = Vec::new();
    idb.extend_from_slice(&1u16.to_le_bytes());
    idb.extend_from_slice(&0u16.to_le_bytes());
    idb.extend_from_slice(&0u32.to_le_bytes());
    push_block(&mut out, 1, &idb);

    for (index, frame) in frames.iter().enumerate() {
        let ts_us = index as u64 * 1_000_000;
        let mut epb = Vec::new();
        epb.extend_from_slice(&0u32.to_le_bytes());
        epb.extend_from_slice(&((ts_us >> 32) as u32).to_le_bytes());
        epb.extend_from_slice(&(ts_us as u32).to_le_bytes());
        epb.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        epb.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        epb.extend_from_slice(frame);
        epb.resize(epb.len().next_multiple_of(4), 0);
        push_block(&mut out, 6, &epb);
    }
    out
}

/// Like [`pcapng_bytes`] but every frame is a Simple Packet Block, which
/// carries no timestamp.
pub fn pcapng_simple_bytes(frames: &[Vec<u8>]) -> Vec<u8> {
    let mut out = pcapng_bytes(&[]);
    for frame in frames {
        let mut spb = Vec::new();
        spb.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        spb.extend_from_slice(frame);
        spb.resize(spb.len().next_multiple_of(4), 0);
        push_block(&mut out, 3, &spb);
    }
    out
}

fn push_block(out: &mut Vec<u8>, block_type: u32, body: &[u8]) {
    let total_len = (12 + body.len()) as u32;
    out.extend_from_slice(&block_type.to_le_bytes());
    out.extend_from_slice(&total_len.to_le_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(&total_len.to_le_bytes());
}

/// Write `frames` to `capture.pcapng` in a fresh temp dir.
pub fn write_capture(frames: &[Vec<u8>]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.pcapng");
    write_bytes(&path, &pcapng_bytes(frames));
    (dir, path)
}

pub fn write_bytes(path: &Path, bytes: &[u8]) {
    fs::write(path, bytes).unwrap();
}
