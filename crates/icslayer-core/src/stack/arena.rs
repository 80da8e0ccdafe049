use std::ops::Range;

use tracing::trace;

use super::layer::Layer;
use super::registry::{Registry, TransportHint};
use crate::protocols::{LayerError, ProtocolId, ProtocolLayer};

/// One decoded layer: which protocol, where its bytes sit in the buffer, and
/// the indices of its neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRecord {
    pub protocol: ProtocolId,
    pub range: Range<usize>,
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

/// Decoded layers over one borrowed packet buffer.
///
/// Records are stored in push order and linked by index; typed views are
/// rebuilt from the buffer on demand.
///
/// # Examples
/// ```
/// use icslayer_core::protocols::ProtocolId;
/// use icslayer_core::stack::{LayerStack, Registry, TransportHint};
///
/// let bytes = [0u8; 16];
/// let hint = TransportHint::Tcp { src_port: 502, dst_port: 40000 };
/// let stack = LayerStack::decode(&bytes, 0, &hint, &Registry::default());
/// let protocols: Vec<_> = stack.iter().map(|record| record.protocol).collect();
/// assert_eq!(protocols, [ProtocolId::ModbusTcp, ProtocolId::Payload]);
/// ```
#[derive(Debug, Clone)]
pub struct LayerStack<'a> {
    buffer: &'a [u8],
    records: Vec<LayerRecord>,
}

impl<'a> LayerStack<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            records: Vec::new(),
        }
    }

    /// Single left-to-right pass starting at `offset`.
    ///
    /// Bytes the registry does not recognise become one payload layer; an
    /// offset at or past the end yields an empty stack.
    pub fn decode(
        buffer: &'a [u8],
        offset: usize,
        hint: &TransportHint,
        registry: &Registry,
    ) -> Self {
        let mut stack = Self::new(buffer);
        let Some(bytes) = buffer.get(offset..).filter(|bytes| !bytes.is_empty()) else {
            return stack;
        };

        let protocol = registry.sniff(bytes, hint).unwrap_or(ProtocolId::Payload);
        if let Ok(index) = stack.push(protocol, offset) {
            stack.follow_delegation(index);
        }
        stack
    }

    /// Decode with the first layer forced to `protocol` instead of sniffed.
    ///
    /// Fails when the bytes at `offset` are not a valid `protocol` layer.
    pub fn decode_as(
        buffer: &'a [u8],
        offset: usize,
        protocol: ProtocolId,
    ) -> Result<Self, LayerError> {
        let mut stack = Self::new(buffer);
        let index = stack.push(protocol, offset)?;
        stack.follow_delegation(index);
        Ok(stack)
    }

    fn follow_delegation(&mut self, mut index: usize) {
        while let Some(layer) = self.layer(index) {
            let Some(next) = layer.delegate_remainder() else {
                break;
            };
            let start = self.records[index].range.start + layer.header_len();
            match self.push(next.protocol(), start) {
                Ok(pushed) => index = pushed,
                Err(_) => break,
            }
        }
    }

    /// Append a layer of `protocol` covering `offset..` and link it after the
    /// current top.
    pub fn push(&mut self, protocol: ProtocolId, offset: usize) -> Result<usize, LayerError> {
        let bytes = self.buffer.get(offset..).unwrap_or_default();
        let layer = Layer::parse(protocol, bytes)?;
        let index = self.records.len();
        let prev = index.checked_sub(1);
        if let Some(prev) = prev {
            self.records[prev].next = Some(index);
        }
        trace!(
            protocol = protocol.as_str(),
            offset,
            header_len = layer.header_len(),
            "layer pushed"
        );
        self.records.push(LayerRecord {
            protocol,
            range: offset..self.buffer.len(),
            prev,
            next: None,
        });
        Ok(index)
    }

    /// Typed view of record `index`.
    pub fn layer(&self, index: usize) -> Option<Layer<'a>> {
        let record = self.records.get(index)?;
        let bytes = self.buffer.get(record.range.clone())?;
        Layer::parse(record.protocol, bytes).ok()
    }

    pub fn records(&self) -> &[LayerRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LayerRecord> {
        self.records.iter()
    }

    /// Typed views in stack order.
    pub fn layers(&self) -> impl Iterator<Item = Layer<'a>> + '_ {
        (0..self.records.len()).filter_map(|index| self.layer(index))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Innermost layer.
    pub fn top(&self) -> Option<Layer<'a>> {
        self.layer(self.records.len().checked_sub(1)?)
    }

    /// First layer of `protocol`.
    pub fn find(&self, protocol: ProtocolId) -> Option<Layer<'a>> {
        let index = self
            .records
            .iter()
            .position(|record| record.protocol == protocol)?;
        self.layer(index)
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<'s, 'a> IntoIterator for &'s LayerStack<'a> {
    type Item = &'s LayerRecord;
    type IntoIter = std::slice::Iter<'s, LayerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
