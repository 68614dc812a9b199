//! Device configuration

use crate::link::ethernet::ETHERNET_HEADER_LEN;

/// Largest frame the reader will hand out
pub const MTU: usize = 1500;

const DEFAULT_DEVICE_NAME: &str = "tap0";

/// Settings for opening a TAP device and sizing the frame buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Requested interface name. The kernel may assign a different one.
    pub name: String,
    /// Capacity of the receive buffer, in bytes
    pub max_frame_len: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            name: DEFAULT_DEVICE_NAME.to_string(),
            max_frame_len: MTU,
        }
    }
}

impl DeviceConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the receive buffer size, clamped to `14..=MTU`.
    pub fn with_max_frame_len(mut self, len: usize) -> Self {
        self.max_frame_len = len.clamp(ETHERNET_HEADER_LEN, MTU);
        self
    }
}
