//! PCAP and PCAPNG files.
//!
//! `reader` holds the format helpers (magic detection, timestamp scaling),
//! `parser` drives `pcap-parser` and turns records into [`CaptureFrame`]s.
//!
//! [`CaptureFrame`]: crate::source::CaptureFrame

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::PcapFileSource;
