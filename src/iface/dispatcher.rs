//! Frame dispatch
//!
//! Walks each received frame down the protocol layers:
//! Ethernet → ARP, or Ethernet → IPv4 → ICMP. A frame that fails any check
//! is dropped and the loop moves on; only the reader can stop it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::iface::reader::{FrameReader, FrameSource};
use crate::link::arp::{ArpOutcome, ArpPacket};
use crate::link::ethernet::{EtherType, EthernetFrame, EthernetHeader};
use crate::network::icmp::IcmpMessage;
use crate::network::ipv4::{protocol, Ipv4Packet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    AwaitingFrame,
    Stopped,
}

/// Why [`Dispatcher::run`] returned without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    Shutdown,
}

/// Where a frame ended up
#[derive(Debug)]
pub enum FramePath<'a> {
    Arp(ArpOutcome),
    Icmp {
        ip: Ipv4Packet<'a>,
        icmp: IcmpMessage<'a>,
    },
    /// Valid IPv4 carrying something other than ICMP
    IgnoredProtocol(Ipv4Packet<'a>),
    /// Ethertype other than ARP or IPv4
    IgnoredEthertype(u16),
    Dropped(Error),
}

/// Result of dispatching one frame
#[derive(Debug)]
pub struct Dispatched<'a> {
    /// None when the frame was too short for an Ethernet header
    pub ethernet: Option<EthernetHeader>,
    pub path: FramePath<'a>,
}

/// Per-path frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub frames: u64,
    pub arp: u64,
    pub icmp: u64,
    pub ignored: u64,
    pub dropped: u64,
}

/// Classify one frame without touching any state.
pub fn classify(frame: &[u8]) -> Dispatched<'_> {
    let ethernet = match EthernetFrame::parse(frame) {
        Ok(ethernet) => ethernet,
        Err(e) => {
            return Dispatched {
                ethernet: None,
                path: FramePath::Dropped(e),
            }
        }
    };

    let path = match ethernet.header.ethertype {
        EtherType::Arp => match ArpPacket::handle(ethernet.payload()) {
            Ok(outcome) => FramePath::Arp(outcome),
            Err(e) => FramePath::Dropped(e),
        },
        EtherType::Ipv4 => ipv4_path(ethernet.payload()),
        EtherType::Other(ethertype) => FramePath::IgnoredEthertype(ethertype),
    };

    Dispatched {
        ethernet: Some(ethernet.header),
        path,
    }
}

fn ipv4_path(payload: &[u8]) -> FramePath<'_> {
    let ip = match Ipv4Packet::handle(payload) {
        Ok(ip) => ip,
        Err(e) => return FramePath::Dropped(e),
    };

    if ip.protocol() != protocol::ICMP {
        return FramePath::IgnoredProtocol(ip);
    }

    match IcmpMessage::handle(ip.payload()) {
        Ok(icmp) => FramePath::Icmp { ip, icmp },
        Err(e) => FramePath::Dropped(e),
    }
}

pub struct Dispatcher {
    state: State,
    stats: DispatchStats,
    shutdown: Arc<AtomicBool>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            state: State::AwaitingFrame,
            stats: DispatchStats::default(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops [`run`](Self::run) before its next read.
    ///
    /// It is checked once per iteration, never while a frame is being
    /// parsed; a read that is already blocked is not interrupted.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Classify one frame and record the outcome.
    pub fn dispatch<'a>(&mut self, frame: &'a [u8]) -> Dispatched<'a> {
        let dispatched = classify(frame);
        self.stats.frames += 1;

        match &dispatched.path {
            FramePath::Arp(outcome) => {
                self.stats.arp += 1;
                if let ArpOutcome::Unsupported {
                    hw_type, proto_type, ..
                } = outcome
                {
                    trace!(
                        "Unsupported ARP variant: hwtype {:#06x}, protype {:#06x}",
                        hw_type,
                        proto_type
                    );
                }
            }
            FramePath::Icmp { icmp, .. } => {
                self.stats.icmp += 1;
                trace!("ICMP type {} code {}", icmp.msg_type, icmp.code);
            }
            FramePath::IgnoredProtocol(ip) => {
                self.stats.ignored += 1;
                trace!("Unsupported protocol: {}", ip.protocol());
            }
            FramePath::IgnoredEthertype(ethertype) => {
                self.stats.ignored += 1;
                trace!("Unsupported ethertype: {:#06x}", ethertype);
            }
            FramePath::Dropped(e) => {
                self.stats.dropped += 1;
                debug!("Dropped {} byte frame: {}", frame.len(), e);
            }
        }

        self.state = State::AwaitingFrame;
        dispatched
    }

    /// Read and dispatch frames until the source closes, fails, or the
    /// shutdown flag is raised.
    ///
    /// `on_frame` sees every frame, including dropped ones.
    pub fn run<S, F>(&mut self, reader: &mut FrameReader<S>, mut on_frame: F) -> Result<StopReason>
    where
        S: FrameSource,
        F: FnMut(&Dispatched<'_>),
    {
        self.state = State::AwaitingFrame;

        loop {
            if self.shutdown.load(Ordering::Acquire) {
                return Ok(self.stop(StopReason::Shutdown));
            }

            let frame = match reader.read() {
                Ok(frame) => frame,
                Err(Error::EndOfStream) => return Ok(self.stop(StopReason::EndOfStream)),
                Err(e) => {
                    warn!("Frame read failed: {}", e);
                    self.state = State::Stopped;
                    return Err(e);
                }
            };

            let dispatched = self.dispatch(frame.as_bytes());
            on_frame(&dispatched);
        }
    }

    fn stop(&mut self, reason: StopReason) -> StopReason {
        self.state = State::Stopped;
        info!(
            "Dispatcher stopped ({:?}) after {} frames",
            reason, self.stats.frames
        );
        reason
    }
}
