use crate::config::TcpConfig;
use crate::tcp::byte_stream::ByteStream;
use crate::tcp::flags::TcpFlags;
use crate::tcp::message::{TcpReceiverMessage, TcpSenderMessage};
use crate::tcp::timer::RetransmissionTimer;
use crate::tcp::wrap32::Wrap32;
use std::collections::VecDeque;

/// The sending end of one TCP direction.
///
/// Reads from the outbound `ByteStream`, frames segments that fit the peer's
/// advertised window, and retransmits the oldest unacknowledged segment on
/// timeout.
#[derive(Debug)]
pub struct TcpSender {
    input: ByteStream,                         // Stream of outgoing data
    isn: Wrap32,                               // Initial seq number
    max_payload_size: usize,                   // Payload cap per segment
    next_seqno: u64,                           // Absolute seqno of the next byte to send
    acked_seqno: u64,                          // Absolute seqno up to which everything is acked
    outstanding: VecDeque<TcpSenderMessage>,   // Sent but un'acked segments, oldest first
    bytes_in_flight: u64,                      // Sum of outstanding sequence lengths
    window_size: u16,                          // Advertised window from receiver
    sent_syn: bool,
    sent_fin: bool,
    timer: RetransmissionTimer,
}

impl TcpSender {
    pub fn new(input: ByteStream, isn: Wrap32, initial_rto_ms: u64) -> Self {
        TcpSender {
            input,
            isn,
            max_payload_size: TcpConfig::MAX_PAYLOAD_SIZE,
            next_seqno: 0,
            acked_seqno: 0,
            outstanding: VecDeque::new(),
            bytes_in_flight: 0,
            window_size: 1, // Enough for the SYN
            sent_syn: false,
            sent_fin: false,
            timer: RetransmissionTimer::new(initial_rto_ms),
        }
    }

    pub fn from_config(config: &TcpConfig) -> Self {
        let mut sender = Self::new(ByteStream::new(config.capacity), config.isn, config.initial_rto_ms);
        sender.max_payload_size = config.max_payload_size;
        sender
    }

    /// Send as many segments as the window allows
    pub fn push<F>(&mut self, mut transmit: F)
    where
        F: FnMut(&TcpSenderMessage),
    {
        // A zero window still gets a one-byte probe
        let window = self.window_size.max(1) as u64;

        while !self.sent_fin {
            let syn = !self.sent_syn;
            let room = window.saturating_sub(self.bytes_in_flight + syn as u64);
            let to_read = (self.max_payload_size as u64).min(room) as usize;
            let payload = self.input.read(to_read);

            let mut flags = TcpFlags::empty();
            if syn {
                flags |= TcpFlags::SYN;
            }
            let with_fin = payload.len() as u64 + self.bytes_in_flight + syn as u64 + 1;
            if with_fin <= window && self.input.is_finished() {
                flags |= TcpFlags::FIN;
            }
            if self.input.has_error() {
                flags |= TcpFlags::RST;
            }

            let msg = TcpSenderMessage::new(Wrap32::wrap(self.next_seqno, self.isn), flags, payload);
            let len = msg.sequence_length();
            if len == 0 {
                break;
            }

            self.sent_syn = true;
            self.sent_fin |= msg.fin();
            self.bytes_in_flight += len;
            self.next_seqno += len;
            transmit(&msg);
            self.outstanding.push_back(msg);
            self.timer.active();
        }
    }

    /// Take in the peer's acknowledgment and window
    pub fn receive(&mut self, msg: &TcpReceiverMessage) {
        if msg.rst {
            self.input.set_error();
        }
        self.window_size = msg.window_size;

        let Some(ackno) = msg.ackno else {
            if msg.window_size == 0 {
                self.input.set_error();
            }
            return;
        };

        let abs_ackno = ackno.unwrap(self.isn, self.next_seqno);
        if abs_ackno > self.next_seqno {
            // Acks something never sent
            return;
        }

        let mut acked = false;
        while let Some(front) = self.outstanding.front() {
            let len = front.sequence_length();
            if abs_ackno < self.acked_seqno + len {
                break;
            }
            self.acked_seqno += len;
            self.bytes_in_flight -= len;
            self.outstanding.pop_front();
            acked = true;
        }

        if acked {
            self.timer.restart();
            if !self.outstanding.is_empty() {
                self.timer.active();
            }
            self.timer.reset_retransmit();
        }
    }

    /// Advance time; resend the oldest outstanding segment on expiry
    pub fn tick<F>(&mut self, ms_since_last_tick: u64, mut transmit: F)
    where
        F: FnMut(&TcpSenderMessage),
    {
        self.timer.tick(ms_since_last_tick);
        if !self.timer.is_expired() {
            return;
        }

        let Some(oldest) = self.outstanding.front() else {
            self.timer.stop();
            return;
        };

        log::debug!(
            "[sender] timeout after {}ms; retransmitting seqno={} len={}",
            self.timer.current_rto(),
            oldest.seqno,
            oldest.sequence_length()
        );
        transmit(oldest);
        self.timer.reset();
        if self.window_size != 0 {
            self.timer.timeout();
        }
        self.timer.add_retransmit();
    }

    /// A segment that occupies no sequence space, e.g. for a bare ACK
    pub fn make_empty_message(&self) -> TcpSenderMessage {
        let flags = if self.input.has_error() {
            TcpFlags::RST
        } else {
            TcpFlags::empty()
        };
        TcpSenderMessage::new(Wrap32::wrap(self.next_seqno, self.isn), flags, Vec::new())
    }

    pub fn sequence_numbers_in_flight(&self) -> u64 {
        self.bytes_in_flight
    }

    pub fn consecutive_retransmissions(&self) -> u64 {
        self.timer.consecutive_retransmissions()
    }

    pub fn input(&self) -> &ByteStream {
        &self.input
    }

    /// The outbound stream; the application writes here
    pub fn input_mut(&mut self) -> &mut ByteStream {
        &mut self.input
    }
}

// -- Unit tests --
