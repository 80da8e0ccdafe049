//! HART-IP (HART over UDP/TCP) header layer.
//!
//! The 8-byte header carries no magic number, so any buffer of at least
//! `layout::HEADER_LEN` bytes is accepted; classification relies on the
//! well-known port (5094, UDP or TCP). The layer is terminal: the message
//! body past the header is not decoded further.

pub mod layer;
pub mod layout;

pub use layer::{HartIpHeader, HartIpLayer, MessageId, MessageType};
