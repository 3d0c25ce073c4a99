// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NDJSON line framing (§4.A).
//!
//! One JSON value per line. A per-connection buffer accumulates bytes and
//! the parser splits on `\n`; empty lines are ignored; a line that is not
//! valid JSON fires `on_error` but never aborts the connection; the parser
//! resumes correctly across arbitrary chunk boundaries.

use thiserror::Error;

/// A single line may not exceed this many bytes (§4.A).
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    #[error("line exceeds {MAX_LINE_BYTES} byte payload cap")]
    LineTooLong,
}

/// Accumulates bytes across reads and yields complete, newline-delimited,
/// non-empty lines (with the trailing `\n` and surrounding whitespace
/// trimmed).
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Feeds a chunk of bytes, returning every complete line found so far
    /// (in order). Incomplete trailing data is retained for the next call.
    ///
    /// Returns [`FramingError::LineTooLong`] if the buffered, still-incomplete
    /// line exceeds [`MAX_LINE_BYTES`] — the caller should close the
    /// connection with an error reply when this happens.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>, FramingError> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        loop {
            let Some(pos) = self.buf.iter().position(|&b| b == b'\n') else {
                break;
            };
            if pos > MAX_LINE_BYTES {
                return Err(FramingError::LineTooLong);
            }
            let line_bytes: Vec<u8> = self.buf.drain(..=pos).collect();
            let trimmed = String::from_utf8_lossy(&line_bytes).trim().to_string();
            if !trimmed.is_empty() {
                lines.push(trimmed);
            }
        }

        if self.buf.len() > MAX_LINE_BYTES {
            return Err(FramingError::LineTooLong);
        }

        Ok(lines)
    }
}

/// Serializes a value as a single NDJSON line (trailing `\n` included).
pub fn encode_line<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = serde_json::to_vec(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_two_complete_lines_and_buffers_remainder() {
        let mut framer = LineFramer::new();
        let lines = framer.feed(b"{\"a\":1}\n{\"b\":2}\nhalf").unwrap();
        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[test]
    fn resumes_across_arbitrary_split_points() {
        let input = b"{\"a\":1}\n{\"b\":2}\nhalf";
        for split in 0..=input.len() {
            let mut framer = LineFramer::new();
            let mut all = Vec::new();
            all.extend(framer.feed(&input[..split]).unwrap());
            all.extend(framer.feed(&input[split..]).unwrap());
            assert_eq!(all, vec!["{\"a\":1}".to_string(), "{\"b\":2}".to_string()], "split at {split}");
        }
    }

    #[test]
    fn empty_lines_are_ignored() {
        let mut framer = LineFramer::new();
        let lines = framer.feed(b"\n\n{\"a\":1}\n\n").unwrap();
        assert_eq!(lines, vec!["{\"a\":1}"]);
    }

    #[test]
    fn oversized_incomplete_line_errors() {
        let mut framer = LineFramer::new();
        let big = vec![b'x'; MAX_LINE_BYTES + 1];
        assert_eq!(framer.feed(&big), Err(FramingError::LineTooLong));
    }

    #[test]
    fn oversized_complete_line_errors_even_when_terminated_in_the_same_feed() {
        let mut framer = LineFramer::new();
        let mut big = vec![b'x'; MAX_LINE_BYTES + 1];
        big.push(b'\n');
        assert_eq!(framer.feed(&big), Err(FramingError::LineTooLong));
    }

    #[test]
    fn malformed_json_line_is_still_yielded_for_caller_to_reject() {
        // The framer only splits lines; JSON validity is the caller's concern
        // (caller invokes on_error and continues parsing the next line).
        let mut framer = LineFramer::new();
        let lines = framer.feed(b"not json\n{\"ok\":true}\n").unwrap();
        assert_eq!(lines, vec!["not json", "{\"ok\":true}"]);
    }
}
