use std::collections::VecDeque;
use std::io;
use std::io::{Read, Write};

/// A bounded FIFO of bytes with a writing end and a reading end.
///
/// Writes past the remaining capacity are truncated, never queued. Callers
/// check `available_capacity()` first if they care about every byte.
#[derive(Debug)]
pub struct ByteStream {
    buffer: VecDeque<u8>,
    capacity: usize,
    bytes_pushed: u64,
    bytes_popped: u64,
    closed: bool,
    error: bool,
}

impl ByteStream {
    pub fn new(capacity: usize) -> Self {
        ByteStream {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            bytes_pushed: 0,
            bytes_popped: 0,
            closed: false,
            error: false,
        }
    }

    // -- Writer side --

    /// Push as much of `data` as fits; returns the number of bytes accepted
    pub fn push(&mut self, data: &[u8]) -> usize {
        if self.closed || self.error {
            return 0;
        }
        let to_write = data.len().min(self.available_capacity());
        self.buffer.extend(&data[..to_write]);
        self.bytes_pushed += to_write as u64;
        to_write
    }

    /// Signal that no more bytes will ever be pushed
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The remaining capacity in the underlying buffer
    pub fn available_capacity(&self) -> usize {
        self.capacity - self.buffer.len()
    }

    /// Total number of bytes ever accepted by `push`
    pub fn bytes_pushed(&self) -> u64 {
        self.bytes_pushed
    }

    // -- Reader side --

    /// The unread bytes at the front of the stream, without consuming them
    pub fn peek(&self) -> &[u8] {
        self.buffer.as_slices().0
    }

    /// Discard up to `len` bytes from the front
    pub fn pop(&mut self, len: usize) {
        let to_pop = len.min(self.buffer.len());
        self.buffer.drain(..to_pop);
        self.bytes_popped += to_pop as u64;
    }

    /// Consume up to `len` bytes and hand them back
    pub fn read(&mut self, len: usize) -> Vec<u8> {
        let to_read = len.min(self.buffer.len());
        let data: Vec<u8> = self.buffer.drain(..to_read).collect();
        self.bytes_popped += to_read as u64;
        data
    }

    /// Closed and fully drained
    pub fn is_finished(&self) -> bool {
        self.closed && self.buffer.is_empty()
    }

    /// Total number of bytes ever popped
    pub fn bytes_popped(&self) -> u64 {
        self.bytes_popped
    }

    /// The number of bytes pushed but not yet popped
    pub fn bytes_buffered(&self) -> usize {
        self.buffer.len()
    }

    // -- Shared --

    /// Mark the stream as faulted. Sticky.
    pub fn set_error(&mut self) {
        self.error = true;
    }

    pub fn has_error(&self) -> bool {
        self.error
    }
}

impl Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let to_read = buf.len().min(self.buffer.len());
        for (dst, src) in buf.iter_mut().zip(self.buffer.drain(..to_read)) {
            *dst = src;
        }
        self.bytes_popped += to_read as u64;
        Ok(to_read)
    }
}

impl Write for ByteStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.push(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// -- Unit tests --
