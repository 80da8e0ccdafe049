//! Modbus/TCP application data unit (MBAP header plus the fixed part of a
//! single-coil/single-register PDU).
//!
//! The fixed header embeds the first data byte so single-value requests can
//! be read and crafted without a separate PDU layer. Bytes past it are handed
//! to a generic payload layer. There is no signature to check; classification
//! uses TCP port 502 on either side of the connection.

pub mod layer;
pub mod layout;

pub use layer::{ModbusTcpHeader, ModbusTcpLayer};
