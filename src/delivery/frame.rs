//! Token-prefixed, newline-terminated frame encoding.
//!
//! A frame is `token + text + '\n'`. The newline is the only delimiter on the
//! wire, so embedded line breaks are replaced with U+2028 LINE SEPARATOR
//! before the terminator is appended.

use std::fmt;

use thiserror::Error;

/// Character substituted for line breaks inside a frame payload.
pub const LINE_SEPARATOR: char = '\u{2028}';

/// Errors produced while encoding a frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The credential token was empty.
    #[error("frame token must not be empty")]
    EmptyToken,
}

/// Immutable, single-line unit of data placed on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Box<[u8]>,
}

impl Frame {
    /// Encode `text` behind `token`, terminating the frame with `\n`.
    pub fn encode(token: &str, text: &str) -> Result<Self, FrameError> {
        if token.is_empty() {
            return Err(FrameError::EmptyToken);
        }
        let mut bytes = Vec::with_capacity(token.len() + text.len() + 1);
        bytes.extend_from_slice(token.as_bytes());
        push_single_line(&mut bytes, text);
        bytes.push(b'\n');
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    /// Encoded bytes including the trailing newline.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Frame")
            .field(&String::from_utf8_lossy(&self.bytes))
            .finish()
    }
}

fn push_single_line(out: &mut Vec<u8>, text: &str) {
    let mut sep = [0u8; 4];
    let sep = LINE_SEPARATOR.encode_utf8(&mut sep).as_bytes();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                // CRLF collapses into a single separator.
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.extend_from_slice(sep);
            }
            '\n' => out.extend_from_slice(sep),
            other => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TOKEN: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[rstest]
    fn encodes_token_text_and_terminator() {
        let frame = Frame::encode(TOKEN, "hello").expect("encode frame");
        assert_eq!(frame.as_bytes(), format!("{TOKEN}hello\n").as_bytes());
    }

    #[rstest]
    fn rejects_empty_token() {
        assert_eq!(Frame::encode("", "hello"), Err(FrameError::EmptyToken));
    }

    #[rstest]
    #[case("line one\nline two", "line one\u{2028}line two")]
    #[case("crlf\r\nbreak", "crlf\u{2028}break")]
    #[case("bare\rcarriage", "bare\u{2028}carriage")]
    #[case("trailing\n", "trailing\u{2028}")]
    #[case("\n\n", "\u{2028}\u{2028}")]
    fn replaces_line_breaks(#[case] input: &str, #[case] expected: &str) {
        let frame = Frame::encode(TOKEN, input).expect("encode frame");
        assert_eq!(frame.as_bytes(), format!("{TOKEN}{expected}\n").as_bytes());
    }

    #[rstest]
    fn multi_line_trace_is_one_wire_line() {
        let trace = "Error: boom\n   at a()\n   at b()\r\n   at c()";
        let frame = Frame::encode(TOKEN, trace).expect("encode frame");
        let bytes = frame.as_bytes();
        let newlines = bytes.iter().filter(|b| **b == b'\n').count();
        assert_eq!(newlines, 1);
        assert_eq!(bytes.last(), Some(&b'\n'));
        assert!(!bytes.contains(&b'\r'));
    }

    #[rstest]
    fn preserves_multibyte_text() {
        let frame = Frame::encode(TOKEN, "héllo ✓").expect("encode frame");
        assert_eq!(frame.as_bytes(), format!("{TOKEN}héllo ✓\n").as_bytes());
        assert_eq!(frame.len(), TOKEN.len() + "héllo ✓".len() + 1);
    }
}
