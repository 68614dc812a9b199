//! IPv4 protocol implementation
//!
//! This module provides IPv4 packet parsing, validation, and processing capabilities.
//! It handles IPv4 header parsing, checksum calculation, and basic packet validation.
//!
//! Features:
//! - IPv4 header parsing and serialization
//! - Checksum calculation and validation
//! - Header creation with automatic checksum
//! - Payload trimming to the declared total length

use std::net::Ipv4Addr;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Ipv4Error, Result};
use crate::network::{checksum, recompute};

pub const IPV4_HEADER_LEN: usize = 20;
const IPV4_VERSION: u8 = 4;
const MIN_IHL: u8 = 5; // 5 * 4 = 20 bytes (standard header length)
pub const DEFAULT_TTL: u8 = 64;
const CHECKSUM_OFFSET: usize = 10;

/// IPv4 packet header structure
///
/// Represents the fixed 20-byte part of an IPv4 header as defined in RFC 791.
/// Options, when present, are skipped by the parser but still covered by the
/// checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version: u8,
    pub ihl: u8, // Internet Header Length
    pub tos: u8, // Type of Service
    pub total_len: u16,
    pub id: u16,
    pub flags_frag_offset: u16, // Flags and Fragment Offset
    pub ttl: u8,                // Time to Live
    pub protocol: u8,           // Next Protocol
    pub checksum: u16,
    pub src_addr: [u8; 4], // Source IP Address
    pub dst_addr: [u8; 4], // Destination IP Address
}

impl Ipv4Header {
    /// Create a new IPv4 header with specified parameters
    ///
    /// The header length (IHL) is set to 5 (20 bytes) and the checksum is
    /// calculated from the other fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tos: u8,
        total_len: u16,
        id: u16,
        flags_frag_offset: u16,
        ttl: u8,
        protocol: u8,
        src_addr: [u8; 4],
        dst_addr: [u8; 4],
    ) -> Self {
        let mut header = Ipv4Header {
            version: IPV4_VERSION,
            ihl: MIN_IHL,
            tos,
            total_len,
            id,
            flags_frag_offset,
            ttl,
            protocol,
            checksum: 0,
            src_addr,
            dst_addr,
        };
        header.update_checksum();
        header
    }

    /// Create a new IPv4 header with default values
    ///
    /// Only requires the essential parameters.
    pub fn new_simple(
        protocol: u8,
        src_addr: [u8; 4],
        dst_addr: [u8; 4],
        payload_len: u16,
    ) -> Self {
        Self::new(
            0,                                    // TOS: Normal service
            IPV4_HEADER_LEN as u16 + payload_len, // Total length
            0,                                    // ID
            flags::DONT_FRAGMENT,                 // Flags and fragment offset
            DEFAULT_TTL,                          // TTL: 64 hops
            protocol,
            src_addr,
            dst_addr,
        )
    }

    /// Decode the fixed header fields.
    ///
    /// `data` must hold at least 20 bytes.
    fn decode(data: &[u8]) -> Self {
        Ipv4Header {
            version: data[0] >> 4,
            ihl: data[0] & 0x0F,
            tos: data[1],
            total_len: BigEndian::read_u16(&data[2..4]),
            id: BigEndian::read_u16(&data[4..6]),
            flags_frag_offset: BigEndian::read_u16(&data[6..8]),
            ttl: data[8],
            protocol: data[9],
            checksum: BigEndian::read_u16(&data[10..12]),
            src_addr: [data[12], data[13], data[14], data[15]],
            dst_addr: [data[16], data[17], data[18], data[19]],
        }
    }

    /// Update checksum after modifying header fields
    pub fn update_checksum(&mut self) {
        self.checksum = 0;
        self.checksum = checksum(&self.to_bytes());
    }

    /// Convert IPv4 header to bytes
    ///
    /// Serializes the fixed 20-byte header ready for transmission
    pub fn to_bytes(&self) -> [u8; IPV4_HEADER_LEN] {
        let mut bytes = [0u8; IPV4_HEADER_LEN];
        bytes[0] = (self.version << 4) | (self.ihl & 0x0F);
        bytes[1] = self.tos;
        BigEndian::write_u16(&mut bytes[2..4], self.total_len);
        BigEndian::write_u16(&mut bytes[4..6], self.id);
        BigEndian::write_u16(&mut bytes[6..8], self.flags_frag_offset);
        bytes[8] = self.ttl;
        bytes[9] = self.protocol;
        BigEndian::write_u16(&mut bytes[10..12], self.checksum);
        bytes[12..16].copy_from_slice(&self.src_addr);
        bytes[16..20].copy_from_slice(&self.dst_addr);

        bytes
    }

    /// Get the header length in bytes
    pub fn header_len(&self) -> usize {
        (self.ihl as usize) * 4
    }

    /// The three flag bits
    pub fn flags(&self) -> u8 {
        (self.flags_frag_offset >> 13) as u8
    }

    /// Fragment offset in 8-byte units
    pub fn fragment_offset(&self) -> u16 {
        self.flags_frag_offset & flags::FRAGMENT_OFFSET_MASK
    }

    pub fn src(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.src_addr)
    }

    pub fn dst(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.dst_addr)
    }
}

/// A validated IPv4 datagram borrowing the receive buffer
#[derive(Debug, Clone, Copy)]
pub struct Ipv4Packet<'a> {
    pub header: Ipv4Header,
    payload: &'a [u8],
}

impl<'a> Ipv4Packet<'a> {
    /// Validate an Ethernet payload as an IPv4 datagram.
    ///
    /// Checks run in order: version, header length, buffer length against
    /// the header and the declared total length, then the header checksum.
    /// The returned payload stops at `total_len`, so link-layer padding is
    /// never handed on.
    pub fn handle(data: &'a [u8]) -> Result<Self> {
        let available = data.len();
        if available == 0 {
            return Err(Ipv4Error::Truncated {
                needed: 1,
                available,
            }
            .into());
        }

        let version = data[0] >> 4;
        if version != IPV4_VERSION {
            return Err(Ipv4Error::BadVersion(version).into());
        }

        let ihl = data[0] & 0x0F;
        if ihl < MIN_IHL {
            return Err(Ipv4Error::BadHeaderLength(ihl).into());
        }

        let header_len = ihl as usize * 4;
        if available < header_len {
            return Err(Ipv4Error::Truncated {
                needed: header_len,
                available,
            }
            .into());
        }

        let header = Ipv4Header::decode(data);
        let total_len = header.total_len as usize;
        if total_len > available {
            return Err(Ipv4Error::Truncated {
                needed: total_len,
                available,
            }
            .into());
        }
        if total_len < header_len {
            return Err(Ipv4Error::BadHeaderLength(ihl).into());
        }

        let (stored, computed) = recompute(&data[..header_len], CHECKSUM_OFFSET);
        if stored != computed {
            return Err(Ipv4Error::BadChecksum { stored, computed }.into());
        }

        Ok(Ipv4Packet {
            header,
            payload: &data[header_len..total_len],
        })
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    pub fn protocol(&self) -> u8 {
        self.header.protocol
    }
}

/// IPv4 protocol constants
pub mod protocol {
    pub const ICMP: u8 = 1;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
}

/// IPv4 flags constants
pub mod flags {
    pub const DONT_FRAGMENT: u16 = 0x4000;
    pub const FRAGMENT_OFFSET_MASK: u16 = 0x1FFF;
}
