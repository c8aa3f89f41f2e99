//! Streaming statement splitter.
//!
//! [`StatementSplitter`] turns a sequence of byte chunks into a lazy
//! sequence of complete, trimmed [`Statement`]s. Whatever follows the last
//! delimiter of a chunk is carried over and prefixed to the next chunk, so
//! the emitted statements do not depend on where the chunks were cut.
//!
//! Splitting is a heuristic: every `;` ends a statement, including one
//! inside a string literal or a comment.

mod statement;

pub use statement::{Statement, is_valid_statement};
use statement::trim_whitespace;

/// The statement delimiter.
pub const DELIMITER: u8 = b';';

/// Stateful accumulator cutting statements out of a chunk stream.
///
/// The carry lives in `buffer[start..]`. Bytes in `buffer[start..scanned]`
/// are known to hold no delimiter, so every byte is searched once no matter
/// how many chunks a statement spans.
#[derive(Debug, Default)]
pub struct StatementSplitter {
    buffer: Vec<u8>,
    start: usize,
    scanned: usize,
    base_offset: u64,
    finished: bool,
}

impl StatementSplitter {
    /// Creates an empty splitter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the next chunk of the source.
    ///
    /// Already emitted bytes are dropped first; the carry keeps its
    /// allocation.
    pub fn push(&mut self, chunk: &[u8]) {
        debug_assert!(!self.finished, "chunk pushed after end of stream");
        if self.start > 0 {
            self.buffer.drain(..self.start);
            self.base_offset += self.start as u64;
            self.scanned -= self.start;
            self.start = 0;
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Marks the end of the stream.
    ///
    /// Once every delimited statement has been drained, the remaining carry
    /// is emitted by [`next_statement`](Self::next_statement) if it is valid.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Returns the next complete statement, if any.
    ///
    /// Candidates failing [`is_valid_statement`] are skipped silently.
    pub fn next_statement(&mut self) -> Option<Statement> {
        while let Some(found) = self.buffer[self.scanned..]
            .iter()
            .position(|&b| b == DELIMITER)
        {
            let end = self.scanned + found;
            let from = self.start;
            self.start = end + 1;
            self.scanned = self.start;
            if let Some(statement) = self.candidate(from, end, true) {
                return Some(statement);
            }
        }
        self.scanned = self.buffer.len();

        if self.finished && self.start < self.buffer.len() {
            let from = self.start;
            self.start = self.buffer.len();
            return self.candidate(from, self.buffer.len(), false);
        }
        None
    }

    /// Lazily drains the statements available so far.
    pub fn statements(&mut self) -> Statements<'_> {
        Statements { splitter: self }
    }

    /// Pushes `chunk` and collects every statement it completes.
    pub fn ingest(&mut self, chunk: &[u8]) -> Vec<Statement> {
        self.push(chunk);
        self.statements().collect()
    }

    /// Ends the stream and collects the remaining statements.
    pub fn ingest_last(&mut self, chunk: &[u8]) -> Vec<Statement> {
        self.push(chunk);
        self.finish();
        self.statements().collect()
    }

    /// Length of the pending, not yet delimited fragment.
    #[must_use]
    pub fn carry_len(&self) -> usize {
        self.buffer.len() - self.start
    }

    fn candidate(&self, from: usize, to: usize, terminated: bool) -> Option<Statement> {
        let (leading, trimmed) = trim_whitespace(&self.buffer[from..to]);
        if !is_valid_statement(trimmed) {
            return None;
        }
        Some(Statement::new(
            trimmed.to_vec(),
            terminated,
            self.base_offset + (from + leading) as u64,
        ))
    }
}

/// Iterator returned by [`StatementSplitter::statements`].
pub struct Statements<'a> {
    splitter: &'a mut StatementSplitter,
}

impl Iterator for Statements<'_> {
    type Item = Statement;

    fn next(&mut self) -> Option<Statement> {
        self.splitter.next_statement()
    }
}

/// Splits a whole in-memory source in one pass.
#[must_use]
pub fn split_all(source: &[u8]) -> Vec<Statement> {
    StatementSplitter::new().ingest_last(source)
}
