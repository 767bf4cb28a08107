//! Fixed-stride walk over the triangle records of a binary STL buffer.
//!
//! Records start right after the 84-byte header and are exactly 50 bytes each.
//! The declared triangle count is ignored here: the scanner yields every complete
//! record up to the end of the buffer and silently stops before a shorter tail.

use std::iter::FusedIterator;

use crate::types::{HEADER_SIZE, RECORD_SIZE};

/// Number of complete records a buffer of `len` bytes holds.
#[inline]
pub fn record_count(len: usize) -> usize {
    len.saturating_sub(HEADER_SIZE) / RECORD_SIZE
}

/// Bytes after the last complete record that do not form a record.
#[inline]
pub fn trailing_bytes(len: usize) -> usize {
    len.saturating_sub(HEADER_SIZE) % RECORD_SIZE
}

/// Iterator over `(byte_offset, record_bytes)` pairs.
///
/// Cloning yields an independent scanner at the same position, so a scan can be
/// restarted cheaply from [`RecordScanner::new`] or forked mid-way.
#[derive(Debug, Clone)]
pub struct RecordScanner<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> RecordScanner<'a> {
    /// Start scanning at the first record.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: HEADER_SIZE,
        }
    }

    /// Size of the ignored fragment at the end of the buffer.
    pub fn trailing_bytes(&self) -> usize {
        trailing_bytes(self.bytes.len())
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset) / RECORD_SIZE
    }
}

impl<'a> Iterator for RecordScanner<'a> {
    type Item = (usize, &'a [u8; RECORD_SIZE]);

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.offset.checked_add(RECORD_SIZE)?;
        if end > self.bytes.len() {
            return None;
        }

        let record: &[u8; RECORD_SIZE] = self.bytes[self.offset..end].try_into().ok()?;
        let offset = self.offset;
        self.offset = end;
        Some((offset, record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for RecordScanner<'_> {}

impl FusedIterator for RecordScanner<'_> {}
