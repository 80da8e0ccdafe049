use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use pcap_parser::traits::{PcapNGPacketBlock, PcapReaderIterator};
use pcap_parser::{Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapNGReader};
use tracing::debug;

use crate::source::{CaptureFrame, PacketSource, SourceError};

use super::error::PcapSourceError;
use super::layout;
use super::reader::{
    is_pcapng_magic, legacy_ts_to_seconds, linktype_for_interface, pcapng_ts_to_seconds,
    read_magic_and_rewind,
};

type BoxedRead = Box<dyn Read>;

/// Frames from a pcap or pcapng stream, format chosen by magic.
pub struct PcapFileSource {
    inner: PcapReader,
    next_index: u64,
}

enum PcapReader {
    Legacy {
        reader: LegacyPcapReader<BoxedRead>,
        linktype: Option<Linktype>,
        nanosecond: bool,
    },
    Ng {
        reader: PcapNGReader<BoxedRead>,
        linktypes: Vec<Linktype>,
    },
}

impl PcapFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read + Seek + 'static>(reader: R) -> Result<Self, SourceError> {
        let inner = create_reader(reader)?;
        Ok(Self {
            inner,
            next_index: 0,
        })
    }
}

impl PacketSource for PcapFileSource {
    fn next_frame(&mut self) -> Result<Option<CaptureFrame>, SourceError> {
        let Some((ts, linktype, data)) = next_record(&mut self.inner)? else {
            return Ok(None);
        };
        let index = self.next_index;
        self.next_index += 1;
        Ok(Some(CaptureFrame {
            index,
            ts,
            linktype,
            data,
        }))
    }
}

fn pcap_error(context: &'static str, err: impl std::fmt::Display) -> PcapSourceError {
    PcapSourceError::Pcap {
        context,
        message: err.to_string(),
    }
}

fn create_reader<R: Read + Seek + 'static>(mut reader: R) -> Result<PcapReader, PcapSourceError> {
    let magic = read_magic_and_rewind(&mut reader)?;
    let reader: BoxedRead = Box::new(reader);

    if is_pcapng_magic(&magic) {
        debug!("pcapng input");
        let reader = PcapNGReader::new(layout::READER_BUFFER_SIZE, reader)
            .map_err(|e| pcap_error("pcapng reader init", e))?;
        Ok(PcapReader::Ng {
            reader,
            linktypes: Vec::new(),
        })
    } else {
        debug!("legacy pcap input");
        let reader = LegacyPcapReader::new(layout::READER_BUFFER_SIZE, reader)
            .map_err(|e| pcap_error("pcap reader init", e))?;
        Ok(PcapReader::Legacy {
            reader,
            linktype: None,
            nanosecond: false,
        })
    }
}

/// Simple Packet Blocks carry no timestamp.
type Record = (Option<f64>, Linktype, Vec<u8>);

fn next_record(reader: &mut PcapReader) -> Result<Option<Record>, PcapSourceError> {
    loop {
        match reader {
            PcapReader::Legacy {
                reader,
                linktype,
                nanosecond,
            } => match reader.next() {
                Ok((offset, block)) => {
                    let record = match block {
                        PcapBlockOwned::LegacyHeader(header) => {
                            *linktype = Some(header.network);
                            *nanosecond = header.is_nanosecond_precision();
                            None
                        }
                        PcapBlockOwned::Legacy(packet) => Some((
                            Some(legacy_ts_to_seconds(
                                packet.ts_sec,
                                packet.ts_usec,
                                *nanosecond,
                            )),
                            linktype.unwrap_or(Linktype::ETHERNET),
                            packet.data.to_vec(),
                        )),
                        _ => None,
                    };
                    reader.consume(offset);
                    if record.is_some() {
                        return Ok(record);
                    }
                }
                Err(PcapError::Eof) => return Ok(None),
                Err(PcapError::Incomplete(_)) => {
                    reader
                        .refill()
                        .map_err(|e| pcap_error("pcap reader refill", e))?;
                }
                Err(e) => return Err(pcap_error("pcap reader next", e)),
            },
            PcapReader::Ng { reader, linktypes } => match reader.next() {
                Ok((offset, block)) => {
                    let record = match block {
                        PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                            linktypes.clear();
                            None
                        }
                        PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                            linktypes.push(intf.linktype);
                            None
                        }
                        PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => Some((
                            Some(pcapng_ts_to_seconds(packet.ts_high, packet.ts_low)),
                            linktype_for_interface(linktypes, packet.if_id),
                            packet.packet_data().to_vec(),
                        )),
                        PcapBlockOwned::NG(Block::SimplePacket(packet)) => Some((
                            None,
                            linktype_for_interface(linktypes, 0),
                            packet.packet_data().to_vec(),
                        )),
                        _ => None,
                    };
                    reader.consume(offset);
                    if record.is_some() {
                        return Ok(record);
                    }
                }
                Err(PcapError::Eof) => return Ok(None),
                Err(PcapError::Incomplete(_)) => {
                    reader
                        .refill()
                        .map_err(|e| pcap_error("pcapng reader refill", e))?;
                }
                Err(e) => return Err(pcap_error("pcapng reader next", e)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pcap_parser::Linktype;

    use super::PcapFileSource;
    use crate::source::{PacketSource, SourceError};

    fn legacy_pcap(frames: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&4u16.to_le_bytes());
        out.extend_from_slice(&0i32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&65535u32.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        for (i, frame) in frames.iter().enumerate() {
            out.extend_from_slice(&(100 + i as u32).to_le_bytes());
            out.extend_from_slice(&250_000u32.to_le_bytes());
            out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
            out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
            out.extend_from_slice(frame);
        }
        out
    }

    #[test]
    fn reads_legacy_frames_in_order() {
        let bytes = legacy_pcap(&[&[0xaa; 20], &[0xbb; 30]]);
        let mut source = PcapFileSource::from_reader(Cursor::new(bytes)).unwrap();

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.linktype, Linktype::ETHERNET);
        assert_eq!(first.data, vec![0xaa; 20]);
        assert!((first.ts.unwrap() - 100.25).abs() < 1e-9);

        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.data.len(), 30);
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let result = PcapFileSource::from_reader(Cursor::new(vec![0x42u8; 64]));
        assert!(matches!(result, Err(SourceError::Capture(_))));
    }

    #[test]
    fn empty_input_is_io_error() {
        let result = PcapFileSource::from_reader(Cursor::new(Vec::<u8>::new()));
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
