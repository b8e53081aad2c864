use crate::config::TcpConfig;
use crate::tcp::byte_stream::ByteStream;
use crate::tcp::message::{TcpReceiverMessage, TcpSenderMessage};
use crate::tcp::reassembler::Reassembler;
use crate::tcp::wrap32::Wrap32;

/// The receiving end of one TCP direction
#[derive(Debug)]
pub struct TcpReceiver {
    reassembler: Reassembler,   // Handles incoming TCP segments
    zero_point: Option<Wrap32>, // The peer's ISN, once its SYN was seen
    syn_violations: u64,        // SYNs that disagreed with `zero_point`
}

impl TcpReceiver {
    pub fn new(capacity: usize) -> Self {
        Self::with_stream(ByteStream::new(capacity))
    }

    pub fn with_stream(output: ByteStream) -> Self {
        TcpReceiver {
            reassembler: Reassembler::new(output),
            zero_point: None,
            syn_violations: 0,
        }
    }

    /// Process one inbound segment
    pub fn receive(&mut self, message: TcpSenderMessage) {
        if message.rst() {
            self.reassembler.output_mut().set_error();
        }

        if message.syn() {
            match self.zero_point {
                None => self.zero_point = Some(message.seqno),
                Some(isn) if isn != message.seqno => {
                    self.syn_violations += 1;
                    log::warn!(
                        "[receiver] SYN seqno={} disagrees with ISN {}; dropping segment",
                        message.seqno,
                        isn
                    );
                    return;
                }
                Some(_) => {} // Retransmitted SYN
            }
        }

        let Some(zero_point) = self.zero_point else {
            // Can't place data without knowing where the stream starts
            return;
        };

        let abs_seqno = message.seqno.unwrap(zero_point, self.checkpoint());
        let stream_index = if message.syn() {
            0
        } else if abs_seqno == 0 {
            // Data claiming the SYN's slot
            log::debug!("[receiver] segment overlaps SYN slot; dropping");
            return;
        } else {
            abs_seqno - 1
        };

        let fin = message.fin();
        self.reassembler.insert(stream_index, &message.payload, fin);
    }

    /// The acknowledgment and window to advertise to the peer
    pub fn send(&self) -> TcpReceiverMessage {
        let stream = self.reassembler.output();
        let window_size = stream
            .available_capacity()
            .min(TcpConfig::MAX_WINDOW as usize) as u16;

        TcpReceiverMessage {
            ackno: self.zero_point.map(|isn| Wrap32::wrap(self.checkpoint(), isn)),
            window_size,
            rst: stream.has_error(),
        }
    }

    /// Absolute seqno of the next byte wanted: SYN, then the pushed bytes, then FIN
    fn checkpoint(&self) -> u64 {
        let stream = self.reassembler.output();
        stream.bytes_pushed() + 1 + stream.is_closed() as u64
    }

    pub fn reassembler(&self) -> &Reassembler {
        &self.reassembler
    }

    /// Get a reference to the inbound `ByteStream`
    pub fn stream_out(&self) -> &ByteStream {
        self.reassembler.output()
    }

    pub fn stream_out_mut(&mut self) -> &mut ByteStream {
        self.reassembler.output_mut()
    }

    /// How many conflicting SYNs were seen after the first
    pub fn syn_violations(&self) -> u64 {
        self.syn_violations
    }
}

// -- Unit tests --
