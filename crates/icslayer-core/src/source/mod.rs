//! Offline capture sources.
//!
//! A source yields raw link-layer frames in file order; slicing and protocol
//! decoding happen in [`crate::dissect`].

pub mod pcap;

pub use pcap::PcapFileSource;
pub use pcap::error::PcapSourceError;

use pcap_parser::Linktype;
use thiserror::Error;

/// One captured frame as stored in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureFrame {
    /// Zero-based position among packet records.
    pub index: u64,
    /// Capture time in seconds since the Unix epoch.
    pub ts: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

pub trait PacketSource {
    fn next_frame(&mut self) -> Result<Option<CaptureFrame>, SourceError>;
}

impl<S: PacketSource + ?Sized> PacketSource for &mut S {
    fn next_frame(&mut self) -> Result<Option<CaptureFrame>, SourceError> {
        (**self).next_frame()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture parse error: {0}")]
    Capture(String),
}

impl From<PcapSourceError> for SourceError {
    fn from(value: PcapSourceError) -> Self {
        match value {
            PcapSourceError::Io(err) => SourceError::Io(err),
            PcapSourceError::Pcap { context, message } => {
                SourceError::Capture(format!("{context}: {message}"))
            }
        }
    }
}
