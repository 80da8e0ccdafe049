use std::fmt;

use super::error::LayerError;
use super::layer::{ProtocolId, ProtocolLayer, require_len};

/// Opaque run of bytes that no typed protocol claims.
///
/// Its "header" is the whole buffer, so it never delegates further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLayer<B> {
    buffer: B,
}

impl<B: AsRef<[u8]>> PayloadLayer<B> {
    /// Wrap a non-empty byte run.
    pub fn new(buffer: B) -> Result<Self, LayerError> {
        require_len(ProtocolId::Payload, buffer.as_ref(), 1)?;
        Ok(Self { buffer })
    }

    pub fn data(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    pub fn get_ref(&self) -> &B {
        &self.buffer
    }

    pub fn into_inner(self) -> B {
        self.buffer
    }
}

impl<B: AsRef<[u8]>> ProtocolLayer for PayloadLayer<B> {
    fn protocol(&self) -> ProtocolId {
        ProtocolId::Payload
    }

    fn header_len(&self) -> usize {
        self.data().len()
    }

    fn as_bytes(&self) -> &[u8] {
        self.data()
    }

    fn summary(&self) -> String {
        format!("Payload Layer, Data length: {}", self.data().len())
    }

    fn delegates_remainder(&self) -> bool {
        false
    }
}

impl<B: AsRef<[u8]>> fmt::Display for PayloadLayer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
