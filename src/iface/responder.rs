//! Replies to dispatched frames
//!
//! Answers ARP requests and ICMP echo requests on behalf of any address on
//! the link, so a host on the other side of the TAP device can ping it.
//! Nothing is remembered between frames.

use crate::iface::dispatcher::{Dispatched, FramePath};
use crate::link::arp::{arp_reply, ArpOutcome};
use crate::link::ethernet::{EtherType, EthernetHeader, MacAddr};
use crate::network::icmp::{echo_reply, IcmpBody};

/// Locally administered unicast address used when none is configured
pub const DEFAULT_MAC: MacAddr = MacAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);

/// Build the Ethernet frame answering `dispatched`, if it needs one.
///
/// `mac` is the hardware address we answer as.
pub fn reply_for(dispatched: &Dispatched<'_>, mac: MacAddr) -> Option<Vec<u8>> {
    let ethernet = dispatched.ethernet?;

    match &dispatched.path {
        FramePath::Arp(ArpOutcome::Resolved(request)) => {
            let reply = arp_reply(request, mac)?;
            let mut frame = Vec::new();
            EthernetHeader {
                dst: request.sender_mac,
                src: mac,
                ethertype: EtherType::Arp,
            }
            .write(&mut frame);
            frame.extend_from_slice(&reply.to_bytes());
            Some(frame)
        }
        FramePath::Icmp { ip, icmp } if icmp.is_echo_request() => {
            let echo = match icmp.body {
                IcmpBody::Echo(echo) => echo,
                _ => return None,
            };
            let mut frame = Vec::new();
            EthernetHeader {
                dst: ethernet.src,
                src: mac,
                ethertype: EtherType::Ipv4,
            }
            .write(&mut frame);
            frame.extend_from_slice(&echo_reply(&ip.header, &echo));
            Some(frame)
        }
        _ => None,
    }
}
