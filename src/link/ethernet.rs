//! Ethernet II framing
//!
//! Splits a raw TAP frame into its 14-byte header and payload.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

pub const ETHERNET_HEADER_LEN: usize = 14;

/// EtherType values
pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;

/// 48-bit hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);
    pub const ZERO: MacAddr = MacAddr([0; 6]);

    /// Read an address from the first six bytes of `data`.
    ///
    /// Callers check the length first.
    pub(crate) fn from_slice(data: &[u8]) -> Self {
        let mut addr = [0u8; 6];
        addr.copy_from_slice(&data[..6]);
        MacAddr(addr)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

/// Payload protocol carried by a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherType {
    Ipv4,
    Arp,
    Other(u16),
}

impl From<u16> for EtherType {
    fn from(value: u16) -> Self {
        match value {
            ETHERTYPE_IPV4 => EtherType::Ipv4,
            ETHERTYPE_ARP => EtherType::Arp,
            other => EtherType::Other(other),
        }
    }
}

impl From<EtherType> for u16 {
    fn from(value: EtherType) -> Self {
        match value {
            EtherType::Ipv4 => ETHERTYPE_IPV4,
            EtherType::Arp => ETHERTYPE_ARP,
            EtherType::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub dst: MacAddr,
    pub src: MacAddr,
    pub ethertype: EtherType,
}

impl EthernetHeader {
    /// Append the 14-byte wire form to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.dst.0);
        out.extend_from_slice(&self.src.0);
        let mut ethertype = [0u8; 2];
        BigEndian::write_u16(&mut ethertype, self.ethertype.into());
        out.extend_from_slice(&ethertype);
    }
}

/// A parsed frame borrowing the receive buffer
#[derive(Debug, Clone, Copy)]
pub struct EthernetFrame<'a> {
    pub header: EthernetHeader,
    payload: &'a [u8],
}

impl<'a> EthernetFrame<'a> {
    /// Parse the Ethernet header off the front of `frame`.
    ///
    /// Unknown ethertypes parse fine; it is up to the caller to ignore them.
    pub fn parse(frame: &'a [u8]) -> Result<Self> {
        if frame.len() < ETHERNET_HEADER_LEN {
            return Err(Error::TruncatedFrame { len: frame.len() });
        }

        let header = EthernetHeader {
            dst: MacAddr::from_slice(&frame[0..6]),
            src: MacAddr::from_slice(&frame[6..12]),
            ethertype: BigEndian::read_u16(&frame[12..14]).into(),
        };

        Ok(EthernetFrame {
            header,
            payload: &frame[ETHERNET_HEADER_LEN..],
        })
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }
}
