//! Fixed-capacity byte ring between the mixer and the host audio device.

use serde::{Deserialize, Serialize};

/// Buffered bytes: 4096 stereo 16-bit frames.
pub const CAPACITY: usize = 16 * 1024;

/// Power-of-two circular byte buffer.
///
/// Writes drop whatever does not fit; reads return only what is buffered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleBuffer {
    data: Vec<u8>,
    read_index: u64,
    write_index: u64,
}

impl SampleBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: vec![0; CAPACITY],
            read_index: 0,
            write_index: 0,
        }
    }

    fn mask(&self, index: u64) -> usize {
        (index as usize) & (self.data.len() - 1)
    }

    /// Bytes waiting to be read.
    #[must_use]
    pub fn len(&self) -> usize {
        (self.write_index - self.read_index) as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.data.len()
    }

    /// Append bytes, returning how many were accepted.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        let mut written = 0;
        for &b in bytes {
            if self.is_full() {
                break;
            }
            let slot = self.mask(self.write_index);
            self.data[slot] = b;
            self.write_index += 1;
            written += 1;
        }
        written
    }

    /// Fill `out` from the front of the buffer and return the filled prefix.
    pub fn read<'a>(&mut self, out: &'a mut [u8]) -> &'a [u8] {
        let count = out.len().min(self.len());
        for byte in out.iter_mut().take(count) {
            *byte = self.data[self.mask(self.read_index)];
            self.read_index += 1;
        }
        &out[..count]
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_returns_only_available() {
        let mut buf = SampleBuffer::new();
        buf.write(&[1, 2, 3]);
        let mut out = [0u8; 8];
        assert_eq!(buf.read(&mut out), &[1, 2, 3]);
        assert!(buf.is_empty());
        assert!(buf.read(&mut out).is_empty());
    }

    #[test]
    fn overflow_drops_new_bytes() {
        let mut buf = SampleBuffer::new();
        let fill = vec![7u8; CAPACITY];
        assert_eq!(buf.write(&fill), CAPACITY);
        assert_eq!(buf.write(&[9, 9]), 0);
        let mut out = [0u8; 2];
        buf.read(&mut out);
        assert_eq!(buf.write(&[9, 9, 9]), 2);
        assert_eq!(buf.len(), CAPACITY);
    }

    #[test]
    fn wraps_around_capacity() {
        let mut buf = SampleBuffer::new();
        let mut sink = vec![0u8; CAPACITY - 1];
        buf.write(&vec![0u8; CAPACITY - 1]);
        buf.read(&mut sink);
        buf.write(&[0xAA, 0xBB, 0xCC]);
        let mut out = [0u8; 3];
        assert_eq!(buf.read(&mut out), &[0xAA, 0xBB, 0xCC]);
    }
}
