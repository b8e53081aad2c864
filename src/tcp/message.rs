use crate::tcp::flags::TcpFlags;
use crate::tcp::wrap32::Wrap32;

/// A segment as produced by a `TcpSender`: the fields the receiving side of
/// the peer cares about.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TcpSenderMessage {
    pub seqno: Wrap32,
    pub flags: TcpFlags,
    pub payload: Vec<u8>,
}

impl TcpSenderMessage {
    pub fn new(seqno: Wrap32, flags: TcpFlags, payload: Vec<u8>) -> Self {
        TcpSenderMessage {
            seqno,
            flags,
            payload,
        }
    }

    /// How many sequence numbers the segment occupies. SYN and FIN count as one each.
    pub fn sequence_length(&self) -> u64 {
        self.payload.len() as u64 + self.syn() as u64 + self.fin() as u64
    }

    pub fn syn(&self) -> bool {
        self.flags.contains(TcpFlags::SYN)
    }

    pub fn fin(&self) -> bool {
        self.flags.contains(TcpFlags::FIN)
    }

    pub fn rst(&self) -> bool {
        self.flags.contains(TcpFlags::RST)
    }
}

/// Acknowledgment and flow-control state produced by a `TcpReceiver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TcpReceiverMessage {
    pub ackno: Option<Wrap32>,
    pub window_size: u16,
    pub rst: bool,
}
