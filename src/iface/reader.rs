//! Frame reader
//!
//! Pulls one frame at a time from a [`FrameSource`] into a single owned
//! buffer that is reused for every read.

use std::io;

use crate::config::DeviceConfig;
use crate::error::{Error, Result};

/// Something frames can be received from, such as a TAP device.
pub trait FrameSource {
    /// Block until a frame is available and copy it into `buf`.
    ///
    /// Returns the number of bytes written. `Ok(0)` means the source is
    /// closed.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// One received frame, borrowed from the reader's buffer
#[derive(Debug, Clone, Copy)]
pub struct RawFrame<'a> {
    data: &'a [u8],
}

impl<'a> RawFrame<'a> {
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub struct FrameReader<S> {
    source: S,
    buf: Vec<u8>,
}

impl<S: FrameSource> FrameReader<S> {
    pub fn new(source: S, config: &DeviceConfig) -> Self {
        FrameReader {
            source,
            buf: vec![0u8; config.max_frame_len],
        }
    }

    /// Read exactly one frame.
    ///
    /// A closed source yields [`Error::EndOfStream`]; interrupted reads are
    /// retried and any other I/O failure is returned as [`Error::Io`].
    pub fn read(&mut self) -> Result<RawFrame<'_>> {
        loop {
            match self.source.recv(&mut self.buf) {
                Ok(0) => return Err(Error::EndOfStream),
                Ok(n) if n > self.buf.len() => {
                    return Err(Error::Io(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!(
                            "source reported {} bytes for a {} byte buffer",
                            n,
                            self.buf.len()
                        ),
                    )))
                }
                Ok(n) => return Ok(RawFrame { data: &self.buf[..n] }),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Buffer capacity, the largest frame this reader returns
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
