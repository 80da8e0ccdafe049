use thiserror::Error;

use super::ProtocolId;

/// Reasons a buffer cannot be interpreted as a given protocol.
///
/// Both variants are raised before any field is read; a layer value only
/// exists once its buffer passed validation.
///
/// # Examples
/// ```
/// use icslayer_core::protocols::{LayerError, ProtocolId};
///
/// let err = LayerError::TooShort {
///     protocol: ProtocolId::HartIp,
///     needed: 8,
///     actual: 3,
/// };
/// assert!(err.to_string().contains("need 8 bytes, got 3"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    #[error("{protocol} header too short: need {needed} bytes, got {actual}")]
    TooShort {
        protocol: ProtocolId,
        needed: usize,
        actual: usize,
    },
    #[error("{protocol} signature mismatch: found {found:02x?}")]
    SignatureMismatch {
        protocol: ProtocolId,
        found: [u8; 2],
    },
}

/// Parse error for protocol names given on the command line or in config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown protocol '{0}' (expected hartip, modbus, pndcp or payload)")]
pub struct UnknownProtocol(pub String);
