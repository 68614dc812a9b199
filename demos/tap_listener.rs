//! A TAP interface listener example
//!
//! Opens a TAP device, prints what arrives on it, and answers ARP requests
//! and pings for any other address on the attached subnet.
//!
//! To run this example:
//!
//! ```sh
//! RUST_LOG=debug cargo run --example tap_listener
//! ```
//!
//! Note: Root/sudo privileges are required to create and configure the TAP device.

use std::io;
use std::process::Command;

use tapframe::iface::dispatcher::FramePath;
use tapframe::iface::responder::{reply_for, DEFAULT_MAC};
use tapframe::{DeviceConfig, Dispatcher, FrameReader, TapDevice};
use tracing::info;
use tracing_subscriber::EnvFilter;

const HOST_CIDR: &str = "10.0.0.254/24";

fn configure_interface(iface_name: &str, ip_cidr: &str) -> io::Result<()> {
    let steps: [&[&str]; 2] = [
        &["addr", "add", ip_cidr, "dev", iface_name],
        &["link", "set", "up", "dev", iface_name],
    ];
    for args in steps {
        let status = Command::new("ip").args(args).status()?;
        if !status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("`ip {}` failed", args.join(" ")),
            ));
        }
    }
    info!("Interface {} configured with IP {}", iface_name, ip_cidr);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = DeviceConfig::default();
    let device = TapDevice::open(&config)?;
    configure_interface(device.name(), HOST_CIDR)?;

    let mut reader = FrameReader::new(&device, &config);
    let mut dispatcher = Dispatcher::new();

    let reason = dispatcher.run(&mut reader, |dispatched| {
        match &dispatched.path {
            FramePath::Arp(outcome) => println!("ARP: {:?}", outcome),
            FramePath::Icmp { ip, icmp } => println!(
                "ICMP type {} code {}: {} -> {}",
                icmp.msg_type,
                icmp.code,
                ip.header.src(),
                ip.header.dst()
            ),
            _ => {}
        }

        if let Some(reply) = reply_for(dispatched, DEFAULT_MAC) {
            match device.send(&reply) {
                Ok(_) => println!("Reply sent as {}", DEFAULT_MAC),
                Err(e) => eprintln!("Failed to send reply: {}", e),
            }
        }
    })?;

    info!("Stopped: {:?}, {:?}", reason, dispatcher.stats());
    Ok(())
}
