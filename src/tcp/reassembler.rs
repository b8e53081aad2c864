use crate::tcp::byte_stream::ByteStream;
use std::collections::BTreeMap;

/// Puts byte ranges that arrive at arbitrary absolute offsets back in order
/// and writes them into the output `ByteStream`.
///
/// Only bytes inside the output's free capacity are kept; the rest are
/// dropped and must be sent again by the peer.
#[derive(Debug)]
pub struct Reassembler {
    segments: BTreeMap<u64, Box<[u8]>>, // Out-of-order ranges, never overlapping or touching. key = start index
    output: ByteStream,                 // The assembled ByteStream, ready to be read
    next_index: u64,                    // The next byte index expected to write
    last_index: Option<u64>,            // One past the final byte index, if known
}

impl Reassembler {
    /// New `Reassembler` with the provided `ByteStream` as output
    pub fn new(output: ByteStream) -> Self {
        Reassembler {
            segments: BTreeMap::new(),
            output,
            next_index: 0,
            last_index: None,
        }
    }

    /// Insert a new byte range starting at absolute index `first_index`
    pub fn insert(&mut self, first_index: u64, data: &[u8], is_last_substring: bool) {
        if is_last_substring {
            self.last_index = Some(first_index + data.len() as u64);
        }

        // Buffer in the new range
        self.insert_buffer(first_index, data);

        // Write as much as possible to the output stream
        self.write_output();

        if self.is_done() {
            self.output.close();
        }
    }

    /// The total number of bytes pending reassembly in the buffer
    pub fn bytes_pending(&self) -> usize {
        self.segments.values().map(|segment| segment.len()).sum()
    }

    /// Get the underlying `ByteStream` output
    pub fn output(&self) -> &ByteStream {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut ByteStream {
        &mut self.output
    }

    /// Get the index of the next byte the output expects
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Stage the part of `data` that falls inside the writable window,
    /// merging it with any staged range it overlaps or touches
    fn insert_buffer(&mut self, first_index: u64, data: &[u8]) {
        if data.is_empty() {
            return;
        }

        // Calculate the effective range within buffer capacity
        let start = first_index.max(self.next_index);
        let mut end = (first_index + data.len() as u64)
            .min(self.next_index + self.output.available_capacity() as u64);
        if let Some(last_index) = self.last_index {
            end = end.min(last_index);
        }

        if start >= end {
            return; // Nothing new, or no capacity to buffer
        }

        let window = &data[(start - first_index) as usize..(end - first_index) as usize];

        let neighbors = self.find_touching_segments(start, end);
        let m_start = neighbors.first().map_or(start, |&seg_start| seg_start.min(start));
        let m_end = neighbors
            .last()
            .and_then(|seg_start| self.segments.get(seg_start).map(|seg| seg_start + seg.len() as u64))
            .map_or(end, |seg_end| seg_end.max(end));

        // Lay the staged ranges down first, then the new data on top
        let mut merged = vec![0u8; (m_end - m_start) as usize];
        for seg_start in neighbors {
            if let Some(seg_data) = self.segments.remove(&seg_start) {
                let offset = (seg_start - m_start) as usize;
                merged[offset..offset + seg_data.len()].copy_from_slice(&seg_data);
            }
        }
        let offset = (start - m_start) as usize;
        merged[offset..offset + window.len()].copy_from_slice(window);

        self.segments.insert(m_start, merged.into_boxed_slice());
    }

    /// Start indexes of staged ranges overlapping or adjacent to `[start, end)`, ascending
    fn find_touching_segments(&self, start: u64, end: u64) -> Vec<u64> {
        let mut found: Vec<u64> = self
            .segments
            .range(..=end)
            .rev()
            .take_while(|(&seg_start, seg_data)| seg_start + seg_data.len() as u64 >= start)
            .map(|(&seg_start, _)| seg_start)
            .collect();
        found.reverse();
        found
    }

    /// Write contiguous data from the buffer to the output `ByteStream`
    fn write_output(&mut self) {
        while let Some(data) = self.segments.remove(&self.next_index) {
            let n = self.output.push(&data);
            self.next_index += n as u64;

            if n < data.len() {
                // Partial write; keep the remainder staged
                self.segments.insert(self.next_index, Box::from(&data[n..]));
                break;
            }
        }
    }

    /// All bytes up to the recorded end of stream have been written out
    fn is_done(&self) -> bool {
        self.last_index == Some(self.next_index)
    }
}
