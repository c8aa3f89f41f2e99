//! Sequential fixed-size chunk reader over the source dump.

use std::io::{ErrorKind, Read};

use crate::errors::{Error, Result};

/// Pulls chunks of at most `chunk_size` bytes from a reader until exhaustion.
///
/// The chunk buffer is allocated once and reused for every read. The read
/// cursor only moves forward.
pub struct ChunkReader<R> {
    inner: R,
    buffer: Vec<u8>,
    bytes_read: u64,
}

impl<R: Read> ChunkReader<R> {
    /// Wraps `inner`, reading at most `chunk_size` bytes per call.
    ///
    /// A `chunk_size` of zero is bumped to one byte.
    #[must_use]
    pub fn new(inner: R, chunk_size: usize) -> Self {
        Self {
            inner,
            buffer: vec![0; chunk_size.max(1)],
            bytes_read: 0,
        }
    }

    /// Reads the next chunk.
    ///
    /// Returns `Ok(None)` once the source is exhausted. A chunk may be
    /// shorter than the configured size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] for any I/O failure other than an interrupted
    /// call, which is simply issued again.
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        let n = loop {
            match self.inner.read(&mut self.buffer) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(Error::Read {
                        offset: self.bytes_read,
                        source,
                    });
                }
            }
        };
        if n == 0 {
            return Ok(None);
        }
        self.bytes_read += n as u64;
        Ok(Some(&self.buffer[..n]))
    }

    /// Total number of bytes read so far.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Maximum size of a chunk.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.buffer.len()
    }
}
