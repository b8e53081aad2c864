use crate::tcp::wrap32::Wrap32;

/// Tunables shared by a `TcpSender`/`TcpReceiver` pair.
#[derive(Debug, Clone)]
pub struct TcpConfig {
    /// Capacity of the inbound and outbound byte streams.
    pub capacity: usize,
    /// Largest payload carried by a single segment.
    pub max_payload_size: usize,
    /// Retransmission timeout before any backoff, in milliseconds.
    pub initial_rto_ms: u64,
    /// Initial sequence number of the outbound direction.
    pub isn: Wrap32,
}

impl TcpConfig {
    pub const DEFAULT_CAPACITY: usize = 64000;
    pub const MAX_PAYLOAD_SIZE: usize = 1000;
    pub const TIMEOUT_DEFAULT: u64 = 1000;

    /// Largest window representable in the 16-bit header field
    pub const MAX_WINDOW: u16 = u16::MAX;
}

impl Default for TcpConfig {
    fn default() -> Self {
        TcpConfig {
            capacity: Self::DEFAULT_CAPACITY,
            max_payload_size: Self::MAX_PAYLOAD_SIZE,
            initial_rto_ms: Self::TIMEOUT_DEFAULT,
            isn: Wrap32::new(rand::random()),
        }
    }
}

/// ARP timing for a `NetworkInterface`, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceConfig {
    /// Minimum spacing between two ARP requests for the same address.
    pub arp_request_interval_ms: u64,
    /// How long a learned mapping stays usable after it was last seen.
    pub arp_cache_ttl_ms: u64,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        InterfaceConfig {
            arp_request_interval_ms: 5000,
            arp_cache_ttl_ms: 30000,
        }
    }
}
