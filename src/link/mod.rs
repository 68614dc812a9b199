//! Link layer protocols implementation
//!
//! This module contains implementations for link layer protocols:
//! - Ethernet II framing
//! - ARP: Address Resolution Protocol

pub mod arp;
pub mod ethernet;

// Re-export commonly used items
pub use arp::{arp_reply, ArpOperation, ArpOutcome, ArpPacket};
pub use ethernet::{EtherType, EthernetFrame, EthernetHeader, MacAddr};
