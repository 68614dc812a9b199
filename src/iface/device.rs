//! TAP device adapter
//!
//! Opens a Linux TAP interface without the packet-information prefix, so
//! every read yields a bare Ethernet frame.

use std::io;

use tracing::info;
use tun_tap::{Iface, Mode};

use crate::config::DeviceConfig;
use crate::iface::reader::FrameSource;

pub struct TapDevice {
    iface: Iface,
}

impl TapDevice {
    /// Create or attach to the TAP interface named in `config`.
    ///
    /// Requires CAP_NET_ADMIN. Bringing the link up and assigning addresses
    /// is left to the caller.
    pub fn open(config: &DeviceConfig) -> io::Result<Self> {
        let iface = Iface::without_packet_info(&config.name, Mode::Tap)?;
        info!("TAP device opened: {}", iface.name());
        Ok(TapDevice { iface })
    }

    /// Interface name assigned by the kernel
    pub fn name(&self) -> &str {
        self.iface.name()
    }

    /// Write one frame to the device
    pub fn send(&self, frame: &[u8]) -> io::Result<usize> {
        self.iface.send(frame)
    }
}

impl FrameSource for TapDevice {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.iface.recv(buf)
    }
}

/// Lets one thread read through a shared handle while replies go out via
/// [`TapDevice::send`].
impl FrameSource for &TapDevice {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.iface.recv(buf)
    }
}
