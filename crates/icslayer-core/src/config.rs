use serde::{Deserialize, Serialize};

use crate::protocols::{hartip, modbus};

/// Knobs for capture dissection.
///
/// # Examples
/// ```
/// use icslayer_core::DissectConfig;
///
/// let config = DissectConfig {
///     modbus_tcp_port: 5020,
///     ..DissectConfig::default()
/// };
/// assert_eq!(config.hart_ip_port, 5094);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DissectConfig {
    /// UDP/TCP port classified as HART-IP.
    pub hart_ip_port: u16,
    /// TCP port classified as Modbus/TCP (either endpoint).
    pub modbus_tcp_port: u16,
    /// Record one entry per matching packet in the report.
    pub include_packets: bool,
}

impl Default for DissectConfig {
    fn default() -> Self {
        Self {
            hart_ip_port: hartip::layout::PORT,
            modbus_tcp_port: modbus::layout::PORT,
            include_packets: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DissectConfig;

    #[test]
    fn missing_keys_use_defaults() {
        let config: DissectConfig = serde_json::from_str(r#"{"modbus_tcp_port": 1502}"#).unwrap();
        assert_eq!(config.modbus_tcp_port, 1502);
        assert_eq!(config.hart_ip_port, 5094);
        assert!(config.include_packets);
    }
}
