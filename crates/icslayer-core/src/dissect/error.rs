use thiserror::Error;

use crate::source::SourceError;

/// Frame could not be sliced down to an application payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("link layer: {0}")]
    Link(String),
    #[error("network/transport layer: {0}")]
    Slice(String),
}

#[derive(Debug, Error)]
pub enum DissectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
}
