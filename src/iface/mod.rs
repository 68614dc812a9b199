//! Network interface abstraction layer
//!
//! This module connects the protocol parsers to a frame source:
//! - Frame reading with a single reusable buffer
//! - TAP device access
//! - Protocol dispatch
//! - ARP and echo replies

pub mod device;
pub mod dispatcher;
pub mod reader;
pub mod responder;

// Re-export commonly used items
pub use device::TapDevice;
pub use dispatcher::{classify, DispatchStats, Dispatched, Dispatcher, FramePath, State, StopReason};
pub use reader::{FrameReader, FrameSource, RawFrame};
pub use responder::{reply_for, DEFAULT_MAC};
