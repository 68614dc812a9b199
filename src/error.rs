//! Error types for frame parsing and the read loop.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while reading or classifying one frame.
#[derive(Error, Debug)]
pub enum Error {
    /// Frame shorter than an Ethernet header
    #[error("truncated ethernet frame: {len} bytes")]
    TruncatedFrame { len: usize },

    /// ARP payload too short for its declared variant
    #[error("malformed ARP message: {len} bytes")]
    MalformedArp { len: usize },

    #[error("malformed IPv4 packet: {0}")]
    MalformedIpv4(#[from] Ipv4Error),

    #[error("malformed ICMP message: {0}")]
    MalformedIcmp(#[from] IcmpError),

    /// I/O errors from the frame source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The device was closed
    #[error("end of stream")]
    EndOfStream,
}

impl Error {
    /// Returns true for errors that stop the read loop.
    ///
    /// Everything else is scoped to a single frame and is dropped by the
    /// dispatcher.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Io(_) | Error::EndOfStream)
    }
}

/// IPv4 header validation failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ipv4Error {
    #[error("bad version {0}")]
    BadVersion(u8),

    #[error("bad header length {0} words")]
    BadHeaderLength(u8),

    #[error("truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("checksum mismatch: stored {stored:#06x}, computed {computed:#06x}")]
    BadChecksum { stored: u16, computed: u16 },
}

/// ICMP message validation failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpError {
    #[error("truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("checksum mismatch: stored {stored:#06x}, computed {computed:#06x}")]
    BadChecksum { stored: u16, computed: u16 },
}
