//! A user-space TAP endpoint
//!
//! This library reads raw Ethernet frames from a virtual device and
//! classifies them layer by layer:
//! - Ethernet II framing
//! - ARP for IPv4 over Ethernet
//! - IPv4 header validation
//! - ICMP echo and destination-unreachable messages
//!
//! Every parsed structure borrows the frame buffer and is gone once the
//! frame has been dispatched.

pub mod config;
pub mod error;
pub mod iface;
pub mod link;
pub mod network;

// Re-export commonly used types
pub use config::DeviceConfig;
pub use error::{Error, IcmpError, Ipv4Error, Result};
pub use iface::{Dispatched, Dispatcher, FramePath, FrameReader, FrameSource, TapDevice};
pub use link::{ArpOutcome, ArpPacket, EthernetFrame, EthernetHeader, MacAddr};
pub use network::{checksum, IcmpMessage, Ipv4Header, Ipv4Packet};
