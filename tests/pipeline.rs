//! End-to-end dispatch of canned frames through an in-memory source

use std::collections::VecDeque;
use std::io;
use std::net::Ipv4Addr;
use std::sync::atomic::Ordering;

use tapframe::iface::dispatcher::{FramePath, State, StopReason};
use tapframe::link::arp::ArpOperation;
use tapframe::link::ethernet::{EtherType, MacAddr};
use tapframe::network::icmp::{IcmpBody, IcmpEcho, ICMP_TYPE_ECHO_REQUEST};
use tapframe::network::ipv4::protocol;
use tapframe::{
    ArpOutcome, ArpPacket, DeviceConfig, Dispatcher, Error, EthernetHeader, FrameReader,
    FrameSource, IcmpError, Ipv4Error, Ipv4Header,
};

struct Replay {
    frames: VecDeque<io::Result<Vec<u8>>>,
}

impl Replay {
    fn new(frames: Vec<Vec<u8>>) -> Self {
        Replay {
            frames: frames.into_iter().map(Ok).collect(),
        }
    }
}

impl FrameSource for Replay {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.frames.pop_front() {
            Some(Ok(frame)) => {
                buf[..frame.len()].copy_from_slice(&frame);
                Ok(frame.len())
            }
            Some(Err(e)) => Err(e),
            None => Ok(0),
        }
    }
}

fn ethernet(ethertype: EtherType, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::new();
    EthernetHeader {
        dst: MacAddr::BROADCAST,
        src: MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
        ethertype,
    }
    .write(&mut frame);
    frame.extend_from_slice(payload);
    frame
}

fn arp_request() -> Vec<u8> {
    let arp = ArpPacket {
        operation: ArpOperation::Request,
        sender_mac: MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
        sender_ip: Ipv4Addr::new(10, 0, 0, 1),
        target_mac: MacAddr::ZERO,
        target_ip: Ipv4Addr::new(10, 0, 0, 2),
    };
    ethernet(EtherType::Arp, &arp.to_bytes())
}

/// Ethernet + 20-byte IPv4 header + 8-byte echo request (id 1, seq 1)
fn echo_request() -> Vec<u8> {
    let icmp = IcmpEcho {
        identifier: 1,
        sequence: 1,
        data: &[],
    }
    .to_bytes(ICMP_TYPE_ECHO_REQUEST);
    let header = Ipv4Header::new_simple(
        protocol::ICMP,
        [10, 0, 0, 1],
        [10, 0, 0, 2],
        icmp.len() as u16,
    );
    assert_eq!(header.total_len, 28);

    let mut datagram = header.to_bytes().to_vec();
    datagram.extend_from_slice(&icmp);
    ethernet(EtherType::Ipv4, &datagram)
}

const IP_START: usize = 14;
const ICMP_START: usize = IP_START + 20;

#[test]
fn arp_request_reaches_arp_path() {
    let frame = arp_request();
    assert_eq!(frame.len(), 42);

    let mut dispatcher = Dispatcher::new();
    match dispatcher.dispatch(&frame).path {
        FramePath::Arp(ArpOutcome::Resolved(arp)) => {
            assert_eq!(arp.operation, ArpOperation::Request);
            assert_eq!(arp.sender_mac, MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]));
            assert_eq!(arp.sender_ip, Ipv4Addr::new(10, 0, 0, 1));
            assert_eq!(arp.target_mac, MacAddr::ZERO);
            assert_eq!(arp.target_ip, Ipv4Addr::new(10, 0, 0, 2));
        }
        other => panic!("unexpected path {:?}", other),
    }
}

#[test]
fn echo_request_reaches_icmp_path() {
    let frame = echo_request();
    let mut dispatcher = Dispatcher::new();
    let dispatched = dispatcher.dispatch(&frame);

    assert_eq!(dispatched.ethernet.map(|e| e.ethertype), Some(EtherType::Ipv4));
    match dispatched.path {
        FramePath::Icmp { ip, icmp } => {
            assert_eq!(ip.header.ttl, 64);
            assert_eq!(ip.protocol(), protocol::ICMP);
            assert!(icmp.is_echo_request());
            match icmp.body {
                IcmpBody::Echo(echo) => {
                    assert_eq!(echo.identifier, 1);
                    assert_eq!(echo.sequence, 1);
                }
                other => panic!("unexpected body {:?}", other),
            }
        }
        other => panic!("unexpected path {:?}", other),
    }
}

#[test]
fn oversized_total_length_is_dropped_and_loop_continues() {
    let mut bad = echo_request();
    bad[IP_START + 2..IP_START + 4].copy_from_slice(&100u16.to_be_bytes());

    let mut reader = FrameReader::new(
        Replay::new(vec![bad, echo_request()]),
        &DeviceConfig::default(),
    );
    let mut dispatcher = Dispatcher::new();
    let mut paths = Vec::new();

    let reason = dispatcher
        .run(&mut reader, |dispatched| {
            paths.push(match &dispatched.path {
                FramePath::Dropped(Error::MalformedIpv4(Ipv4Error::Truncated { .. })) => "truncated",
                FramePath::Icmp { .. } => "icmp",
                _ => "other",
            });
        })
        .unwrap();

    assert_eq!(reason, StopReason::EndOfStream);
    assert_eq!(paths, vec!["truncated", "icmp"]);
    assert_eq!(dispatcher.state(), State::Stopped);
    assert_eq!(dispatcher.stats().dropped, 1);
    assert_eq!(dispatcher.stats().icmp, 1);
}

#[test]
fn corrupted_icmp_checksum_is_bad_checksum() {
    let mut frame = echo_request();
    frame[ICMP_START + 3] ^= 0x01;

    let mut dispatcher = Dispatcher::new();
    assert!(matches!(
        dispatcher.dispatch(&frame).path,
        FramePath::Dropped(Error::MalformedIcmp(IcmpError::BadChecksum { .. }))
    ));
    assert_eq!(dispatcher.state(), State::AwaitingFrame);
}

#[test]
fn corrupted_ip_header_bit_is_never_accepted() {
    let frame = echo_request();
    let mut dispatcher = Dispatcher::new();
    for byte in IP_START..ICMP_START {
        for bit in 0..8 {
            let mut corrupt = frame.clone();
            corrupt[byte] ^= 1 << bit;
            assert!(
                matches!(
                    dispatcher.dispatch(&corrupt).path,
                    FramePath::Dropped(Error::MalformedIpv4(_))
                ),
                "byte {} bit {}",
                byte,
                bit
            );
        }
    }
}

#[test]
fn short_frames_are_truncated() {
    let frame = arp_request();
    let mut dispatcher = Dispatcher::new();
    for len in 0..14 {
        assert!(matches!(
            dispatcher.dispatch(&frame[..len]).path,
            FramePath::Dropped(Error::TruncatedFrame { .. })
        ));
    }
}

#[test]
fn mixed_stream_is_fully_consumed() {
    let frames = vec![
        vec![0u8; 6],
        arp_request(),
        ethernet(EtherType::Other(0x86dd), &[0u8; 40]),
        echo_request(),
    ];
    let mut reader = FrameReader::new(Replay::new(frames), &DeviceConfig::default());
    let mut dispatcher = Dispatcher::new();

    let reason = dispatcher.run(&mut reader, |_| {}).unwrap();
    assert_eq!(reason, StopReason::EndOfStream);

    let stats = dispatcher.stats();
    assert_eq!(stats.frames, 4);
    assert_eq!(stats.dropped, 1);
    assert_eq!(stats.arp, 1);
    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.icmp, 1);
}

#[test]
fn io_error_stops_the_loop() {
    let mut source = Replay::new(vec![arp_request()]);
    source
        .frames
        .push_back(Err(io::Error::new(io::ErrorKind::BrokenPipe, "device gone")));
    source.frames.push_back(Ok(arp_request()));

    let mut reader = FrameReader::new(source, &DeviceConfig::default());
    let mut dispatcher = Dispatcher::new();
    let mut seen = 0;

    let result = dispatcher.run(&mut reader, |_| seen += 1);
    assert!(matches!(result, Err(Error::Io(_))));
    assert_eq!(seen, 1);
    assert_eq!(dispatcher.state(), State::Stopped);
    assert_eq!(reader.source().frames.len(), 1);
}

#[test]
fn shutdown_is_checked_between_frames() {
    let mut reader = FrameReader::new(
        Replay::new(vec![arp_request(), arp_request(), arp_request()]),
        &DeviceConfig::default(),
    );
    let mut dispatcher = Dispatcher::new();
    let shutdown = dispatcher.shutdown_handle();

    let reason = dispatcher
        .run(&mut reader, |_| shutdown.store(true, Ordering::Release))
        .unwrap();

    assert_eq!(reason, StopReason::Shutdown);
    assert_eq!(dispatcher.stats().frames, 1);
    assert_eq!(dispatcher.state(), State::Stopped);
}
