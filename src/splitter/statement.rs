//! A single delimited SQL statement and the rule deciding whether it is kept.

use std::borrow::Cow;

use super::DELIMITER;

/// One trimmed SQL statement cut from the source stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    bytes: Vec<u8>,
    terminated: bool,
    offset: u64,
}

impl Statement {
    pub(crate) fn new(bytes: Vec<u8>, terminated: bool, offset: u64) -> Self {
        Self {
            bytes,
            terminated,
            offset,
        }
    }

    /// The trimmed statement text, without its delimiter.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The statement text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Whether a delimiter ended this statement in the source.
    ///
    /// Only the tail of the stream can be unterminated.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Byte offset of the first non-blank byte in the source.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Length of [`render_into`](Self::render_into) output.
    #[must_use]
    pub fn rendered_len(&self) -> usize {
        self.bytes.len() + usize::from(self.terminated)
    }

    /// Appends the output form: the text, followed by the delimiter when the
    /// source had one.
    pub fn render_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.bytes);
        if self.terminated {
            out.push(DELIMITER);
        }
    }

    /// Consumes the statement, returning its text.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Strips leading and trailing whitespace, returning the number of leading
/// bytes removed and the trimmed slice.
///
/// UTF-8 input is trimmed with Unicode whitespace rules (`\v`, U+00A0,
/// U+3000 and friends); anything else falls back to ASCII whitespace.
pub(crate) fn trim_whitespace(bytes: &[u8]) -> (usize, &[u8]) {
    match std::str::from_utf8(bytes) {
        Ok(text) => {
            let start = text.trim_start();
            (text.len() - start.len(), start.trim_end().as_bytes())
        }
        Err(_) => {
            let start = bytes.trim_ascii_start();
            (bytes.len() - start.len(), start.trim_ascii_end())
        }
    }
}

/// Returns whether a candidate statement is worth emitting.
///
/// A candidate is kept when at least one of its lines, once trimmed, is
/// non-empty and does not start with `--` or `/*`.
#[must_use]
pub fn is_valid_statement(candidate: &[u8]) -> bool {
    candidate.split(|&b| b == b'\n').any(|line| {
        let (_, line) = trim_whitespace(line);
        !line.is_empty() && !line.starts_with(b"--") && !line.starts_with(b"/*")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_only_is_invalid() {
        assert!(!is_valid_statement(b"-- comment\n"));
        assert!(!is_valid_statement(b"/* header */\n  -- more\n"));
    }

    #[test]
    fn test_blank_is_invalid() {
        assert!(!is_valid_statement(b""));
        assert!(!is_valid_statement(b" \t\r\n\n  "));
    }

    #[test]
    fn test_unicode_whitespace_is_blank() {
        assert!(!is_valid_statement("\u{3000}\n".as_bytes()));
        assert!(!is_valid_statement("\u{a0}\x0b\x0c\n\u{3000}".as_bytes()));
        assert!(!is_valid_statement("\u{3000}-- comment".as_bytes()));
    }

    #[test]
    fn test_trim_whitespace_reports_leading_bytes() {
        let source = "\u{3000}\x0bSELECT 1\u{a0} ".as_bytes();
        assert_eq!(trim_whitespace(source), (4, &b"SELECT 1"[..]));
        assert_eq!(trim_whitespace(b"  caf\xe9\t"), (2, &b"caf\xe9"[..]));
    }

    #[test]
    fn test_statement_after_comment_is_valid() {
        assert!(is_valid_statement(b"-- users\nINSERT INTO users VALUES (1)"));
    }

    #[test]
    fn test_block_comment_continuation_counts_as_content() {
        // Only line prefixes are inspected, not comment extents.
        assert!(is_valid_statement(b"/* start\n still comment */"));
    }

    #[test]
    fn test_render_adds_delimiter_only_when_terminated() {
        let mut out = Vec::new();
        Statement::new(b"SELECT 1".to_vec(), true, 0).render_into(&mut out);
        out.push(b'\n');
        Statement::new(b"SELECT 2".to_vec(), false, 9).render_into(&mut out);
        assert_eq!(out, b"SELECT 1;\nSELECT 2");
    }
}
