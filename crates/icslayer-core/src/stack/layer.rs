use crate::protocols::{
    HartIpLayer, LayerError, ModbusTcpLayer, PayloadLayer, PnDcpLayer, ProtocolId, ProtocolLayer,
};

/// Any decoded layer, borrowing the packet buffer.
#[derive(Debug, Clone, Copy)]
pub enum Layer<'a> {
    HartIp(HartIpLayer<&'a [u8]>),
    ModbusTcp(ModbusTcpLayer<&'a [u8]>),
    PnDcp(PnDcpLayer<&'a [u8]>),
    Payload(PayloadLayer<&'a [u8]>),
}

macro_rules! delegate_layer {
    ($self:expr, $layer:ident => $body:expr) => {
        match $self {
            Layer::HartIp($layer) => $body,
            Layer::ModbusTcp($layer) => $body,
            Layer::PnDcp($layer) => $body,
            Layer::Payload($layer) => $body,
        }
    };
}

impl<'a> Layer<'a> {
    /// Build the layer for `protocol` over `bytes`, validating first.
    pub fn parse(protocol: ProtocolId, bytes: &'a [u8]) -> Result<Self, LayerError> {
        Ok(match protocol {
            ProtocolId::HartIp => Layer::HartIp(HartIpLayer::new(bytes)?),
            ProtocolId::ModbusTcp => Layer::ModbusTcp(ModbusTcpLayer::new(bytes)?),
            ProtocolId::PnDcp => Layer::PnDcp(PnDcpLayer::new(bytes)?),
            ProtocolId::Payload => Layer::Payload(PayloadLayer::new(bytes)?),
        })
    }

    /// Validity predicate of `protocol`, without building anything.
    pub fn is_valid(protocol: ProtocolId, bytes: &[u8]) -> bool {
        match protocol {
            ProtocolId::HartIp => HartIpLayer::<&[u8]>::is_valid(bytes),
            ProtocolId::ModbusTcp => ModbusTcpLayer::<&[u8]>::is_valid(bytes),
            ProtocolId::PnDcp => PnDcpLayer::<&[u8]>::is_valid(bytes),
            ProtocolId::Payload => !bytes.is_empty(),
        }
    }

    /// Buffer slice with the full `'a` lifetime.
    pub fn bytes(&self) -> &'a [u8] {
        delegate_layer!(self, layer => *layer.get_ref())
    }

    /// Successor over the bytes past this header, tied to the buffer rather
    /// than to `self`.
    pub fn delegate_remainder(&self) -> Option<Layer<'a>> {
        if !self.delegates_remainder() {
            return None;
        }
        let rest = self.bytes().get(self.header_len()..)?;
        PayloadLayer::new(rest).ok().map(Layer::Payload)
    }
}

impl ProtocolLayer for Layer<'_> {
    fn protocol(&self) -> ProtocolId {
        delegate_layer!(self, layer => layer.protocol())
    }

    fn header_len(&self) -> usize {
        delegate_layer!(self, layer => layer.header_len())
    }

    fn as_bytes(&self) -> &[u8] {
        delegate_layer!(self, layer => layer.as_bytes())
    }

    fn summary(&self) -> String {
        delegate_layer!(self, layer => layer.summary())
    }

    fn delegates_remainder(&self) -> bool {
        delegate_layer!(self, layer => layer.delegates_remainder())
    }
}
