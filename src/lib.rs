//! A small user-space TCP/IP core: reliable byte streams on top of an
//! unordered segment stream, and hop-by-hop forwarding on top of Ethernet.
//!
//! Everything is driven synchronously by the caller. Time only moves when a
//! component's `tick` is called with the elapsed milliseconds.

pub mod config;
pub mod ip;
pub mod link;
pub mod packet;
pub mod router;
pub mod tcp;

// -- Re-export structs for more concise usage

pub use config::{InterfaceConfig, TcpConfig};
pub use ip::{InternetDatagram, IpHeader};
pub use link::{ArpMessage, EthernetAddress, EthernetFrame, NetworkInterface, OutputPort};
pub use router::{Router, RouteError};
pub use tcp::{ByteStream, Reassembler, TcpReceiver, TcpSender, Wrap32};
