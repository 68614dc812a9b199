//! ICMP (Internet Control Message Protocol) implementation
//!
//! This module provides ICMP message parsing and validation. Echo Request,
//! Echo Reply and Destination Unreachable bodies are decoded; any other type
//! is passed through raw.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{IcmpError, Result};
use crate::network::ipv4::{protocol, Ipv4Header, DEFAULT_TTL, IPV4_HEADER_LEN};
use crate::network::{checksum, recompute};

/// type, code, checksum
const ICMP_HEADER_LEN: usize = 4;
/// Each decoded body starts with a 4-byte word
const ICMP_BODY_WORD_LEN: usize = 4;
const CHECKSUM_OFFSET: usize = 2;

/// ICMP message types
pub const ICMP_TYPE_ECHO_REPLY: u8 = 0;
pub const ICMP_TYPE_DEST_UNREACHABLE: u8 = 3;
pub const ICMP_TYPE_ECHO_REQUEST: u8 = 8;

/// Echo Request/Reply body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpEcho<'a> {
    pub identifier: u16,
    pub sequence: u16,
    pub data: &'a [u8],
}

/// Destination Unreachable body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpDestUnreachable<'a> {
    pub unused: u8,
    /// Length of the original datagram, in 32-bit words (RFC 4884)
    pub length: u8,
    /// Next-hop MTU for code 4, otherwise unused
    pub next_hop_mtu: u16,
    /// Leading bytes of the datagram that triggered the error
    pub original: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpBody<'a> {
    Echo(IcmpEcho<'a>),
    DestUnreachable(IcmpDestUnreachable<'a>),
    /// Types we do not decode; everything after the checksum
    Other { rest: &'a [u8] },
}

/// A checksum-verified ICMP message borrowing the receive buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpMessage<'a> {
    pub msg_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub body: IcmpBody<'a>,
}

impl<'a> IcmpMessage<'a> {
    /// Interpret an IPv4 payload as an ICMP message.
    pub fn handle(data: &'a [u8]) -> Result<Self> {
        if data.len() < ICMP_HEADER_LEN {
            return Err(truncated(ICMP_HEADER_LEN, data.len()));
        }

        let (stored, computed) = recompute(data, CHECKSUM_OFFSET);
        if stored != computed {
            return Err(IcmpError::BadChecksum { stored, computed }.into());
        }

        let msg_type = data[0];
        let rest = &data[ICMP_HEADER_LEN..];
        let body = match msg_type {
            ICMP_TYPE_ECHO_REPLY | ICMP_TYPE_ECHO_REQUEST => {
                let word = body_word(data)?;
                IcmpBody::Echo(IcmpEcho {
                    identifier: BigEndian::read_u16(&word[0..2]),
                    sequence: BigEndian::read_u16(&word[2..4]),
                    data: &rest[ICMP_BODY_WORD_LEN..],
                })
            }
            ICMP_TYPE_DEST_UNREACHABLE => {
                let word = body_word(data)?;
                IcmpBody::DestUnreachable(IcmpDestUnreachable {
                    unused: word[0],
                    length: word[1],
                    next_hop_mtu: BigEndian::read_u16(&word[2..4]),
                    original: &rest[ICMP_BODY_WORD_LEN..],
                })
            }
            _ => IcmpBody::Other { rest },
        };

        Ok(IcmpMessage {
            msg_type,
            code: data[1],
            checksum: stored,
            body,
        })
    }

    /// Check if this is an Echo Request message
    pub fn is_echo_request(&self) -> bool {
        self.msg_type == ICMP_TYPE_ECHO_REQUEST
    }

    /// Check if this is an Echo Reply message
    pub fn is_echo_reply(&self) -> bool {
        self.msg_type == ICMP_TYPE_ECHO_REPLY
    }
}

impl<'a> IcmpEcho<'a> {
    /// Serialize as a complete ICMP message of the given type, checksum included.
    pub fn to_bytes(&self, msg_type: u8) -> Vec<u8> {
        let mut bytes = vec![0u8; ICMP_HEADER_LEN + ICMP_BODY_WORD_LEN];
        bytes[0] = msg_type;
        BigEndian::write_u16(&mut bytes[4..6], self.identifier);
        BigEndian::write_u16(&mut bytes[6..8], self.sequence);
        bytes.extend_from_slice(self.data);

        let sum = checksum(&bytes);
        BigEndian::write_u16(&mut bytes[2..4], sum);
        bytes
    }
}

/// Build an IPv4 datagram answering `request` with an Echo Reply.
///
/// Addresses are swapped, TTL is reset, and both checksums are recomputed.
/// The identifier, sequence number and data are echoed unchanged.
pub fn echo_reply(request: &Ipv4Header, echo: &IcmpEcho<'_>) -> Vec<u8> {
    let icmp = echo.to_bytes(ICMP_TYPE_ECHO_REPLY);
    let header = Ipv4Header::new(
        0,
        (IPV4_HEADER_LEN + icmp.len()) as u16,
        request.id,
        0,
        DEFAULT_TTL,
        protocol::ICMP,
        request.dst_addr,
        request.src_addr,
    );

    let mut datagram = Vec::with_capacity(IPV4_HEADER_LEN + icmp.len());
    datagram.extend_from_slice(&header.to_bytes());
    datagram.extend_from_slice(&icmp);
    datagram
}

fn body_word(data: &[u8]) -> Result<&[u8]> {
    let needed = ICMP_HEADER_LEN + ICMP_BODY_WORD_LEN;
    data.get(ICMP_HEADER_LEN..needed)
        .ok_or_else(|| truncated(needed, data.len()))
}

fn truncated(needed: usize, available: usize) -> crate::error::Error {
    IcmpError::Truncated { needed, available }.into()
}
