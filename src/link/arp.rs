//! ARP (Address Resolution Protocol) parsing
//!
//! Only the IPv4-over-Ethernet variant is decoded. Messages for other
//! hardware or protocol address types are recognized and reported as
//! unsupported. Nothing is cached; building an ARP table is left to the
//! consumer of [`ArpOutcome`].

use std::net::Ipv4Addr;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};
use crate::link::ethernet::{MacAddr, ETHERTYPE_IPV4};

/// Fixed part: hwtype, protype, hwsize, prosize, opcode
const ARP_FIXED_LEN: usize = 8;

/// Fixed part plus two (MAC, IPv4) address pairs
pub const ARP_IPV4_LEN: usize = 28;

pub const ARP_HW_ETHERNET: u16 = 1;
const MAC_LEN: u8 = 6;
const IPV4_LEN: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOperation {
    Request,
    Reply,
    Other(u16),
}

impl From<u16> for ArpOperation {
    fn from(value: u16) -> Self {
        match value {
            1 => ArpOperation::Request,
            2 => ArpOperation::Reply,
            other => ArpOperation::Other(other),
        }
    }
}

impl From<ArpOperation> for u16 {
    fn from(value: ArpOperation) -> Self {
        match value {
            ArpOperation::Request => 1,
            ArpOperation::Reply => 2,
            ArpOperation::Other(other) => other,
        }
    }
}

/// An IPv4-over-Ethernet ARP message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpPacket {
    pub operation: ArpOperation,
    pub sender_mac: MacAddr,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddr,
    pub target_ip: Ipv4Addr,
}

/// Result of handling an ARP payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOutcome {
    Resolved(ArpPacket),
    /// Well-formed fixed header describing a variant we do not decode
    Unsupported {
        hw_type: u16,
        proto_type: u16,
        hw_size: u8,
        proto_size: u8,
        operation: ArpOperation,
    },
}

impl ArpPacket {
    /// Interpret an Ethernet payload as ARP.
    pub fn handle(payload: &[u8]) -> Result<ArpOutcome> {
        if payload.len() < ARP_FIXED_LEN {
            return Err(Error::MalformedArp { len: payload.len() });
        }

        let hw_type = BigEndian::read_u16(&payload[0..2]);
        let proto_type = BigEndian::read_u16(&payload[2..4]);
        let hw_size = payload[4];
        let proto_size = payload[5];
        let operation = ArpOperation::from(BigEndian::read_u16(&payload[6..8]));

        // Both address pairs must be present, and never less than the
        // IPv4-over-Ethernet minimum
        let declared = ARP_FIXED_LEN + 2 * (hw_size as usize + proto_size as usize);
        if payload.len() < declared.max(ARP_IPV4_LEN) {
            return Err(Error::MalformedArp { len: payload.len() });
        }

        if hw_type != ARP_HW_ETHERNET
            || proto_type != ETHERTYPE_IPV4
            || hw_size != MAC_LEN
            || proto_size != IPV4_LEN
        {
            return Ok(ArpOutcome::Unsupported {
                hw_type,
                proto_type,
                hw_size,
                proto_size,
                operation,
            });
        }

        Ok(ArpOutcome::Resolved(ArpPacket {
            operation,
            sender_mac: MacAddr::from_slice(&payload[8..14]),
            sender_ip: read_ipv4(&payload[14..18]),
            target_mac: MacAddr::from_slice(&payload[18..24]),
            target_ip: read_ipv4(&payload[24..28]),
        }))
    }

    /// Serialize to the 28-byte wire form
    pub fn to_bytes(&self) -> [u8; ARP_IPV4_LEN] {
        let mut bytes = [0u8; ARP_IPV4_LEN];
        BigEndian::write_u16(&mut bytes[0..2], ARP_HW_ETHERNET);
        BigEndian::write_u16(&mut bytes[2..4], ETHERTYPE_IPV4);
        bytes[4] = MAC_LEN;
        bytes[5] = IPV4_LEN;
        BigEndian::write_u16(&mut bytes[6..8], self.operation.into());
        bytes[8..14].copy_from_slice(&self.sender_mac.0);
        bytes[14..18].copy_from_slice(&self.sender_ip.octets());
        bytes[18..24].copy_from_slice(&self.target_mac.0);
        bytes[24..28].copy_from_slice(&self.target_ip.octets());
        bytes
    }

    pub fn is_request(&self) -> bool {
        self.operation == ArpOperation::Request
    }
}

/// Answer `request` as the owner of its target address, using `mac`.
///
/// Returns None for anything other than a request, for gratuitous requests,
/// and for requests sent from 0.0.0.0. Those announce or check an address
/// rather than ask for one.
pub fn arp_reply(request: &ArpPacket, mac: MacAddr) -> Option<ArpPacket> {
    if !request.is_request()
        || request.sender_ip == request.target_ip
        || request.sender_ip.is_unspecified()
    {
        return None;
    }
    Some(ArpPacket {
        operation: ArpOperation::Reply,
        sender_mac: mac,
        sender_ip: request.target_ip,
        target_mac: request.sender_mac,
        target_ip: request.sender_ip,
    })
}

fn read_ipv4(data: &[u8]) -> Ipv4Addr {
    Ipv4Addr::from(BigEndian::read_u32(data))
}
