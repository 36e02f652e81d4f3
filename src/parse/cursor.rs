use winnow::error::{ContextError, ErrMode};

use crate::error::ParseError;

/// A byte in `A-Za-z0-9_-`, the characters a bare key is made of.
pub(crate) fn is_bare_key_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// An ASCII control character (`U+0000..U+001F` plus `U+007F`).
pub(crate) fn is_ascii_ctrl(b: u8) -> bool {
    b < 0x20 || b == 0x7f
}

/// Byte-offset cursor over the source document.
///
/// The offset is only converted to `(line, column)` coordinates when an
/// error is constructed. `\r\n` is not normalised up front (that would
/// prevent borrowing string values from the source); instead every
/// newline-accepting site also accepts the two-byte sequence.
pub(crate) struct Cursor<'i> {
    src: &'i str,
    pos: usize,
}

impl<'i> Cursor<'i> {
    pub(crate) fn new(src: &'i str) -> Self {
        Self { src, pos: 0 }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn len(&self) -> usize {
        self.src.len()
    }

    pub(crate) fn done(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// The next byte, if any. All dispatch decisions are on ASCII bytes;
    /// a multi-byte character simply matches none of them.
    pub(crate) fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    /// The full character at `pos`, for error messages.
    pub(crate) fn char_at(&self, pos: usize) -> char {
        self.src[pos..]
            .chars()
            .next()
            .expect("position is on a character boundary")
    }

    pub(crate) fn bump(&mut self, n: usize) {
        self.pos += n;
    }

    pub(crate) fn rest(&self) -> &'i str {
        &self.src[self.pos..]
    }

    pub(crate) fn starts_with(&self, prefix: &str) -> bool {
        self.src[self.pos..].starts_with(prefix)
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> &'i str {
        &self.src[start..end]
    }

    /// Skip inline whitespace (space and tab).
    pub(crate) fn skip_ws(&mut self) {
        while let Some(b' ' | b'\t') = self.peek() {
            self.pos += 1;
        }
    }

    /// Consume one newline (`\n` or `\r\n`). Returns whether one was there.
    pub(crate) fn eat_newline(&mut self) -> bool {
        if self.peek() == Some(b'\n') {
            self.pos += 1;
            true
        } else if self.starts_with("\r\n") {
            self.pos += 2;
            true
        } else {
            false
        }
    }

    /// Consume a comment if the cursor is on `#`.
    pub(crate) fn skip_comment(&mut self) -> Result<(), ParseError> {
        if self.peek() == Some(b'#') {
            self.comment()?;
        }
        Ok(())
    }

    /// Consume `#` and the comment content, stopping before the newline.
    ///
    /// Control characters other than tab are not permitted in comments; a
    /// lone `\r` counts as one, `\r\n` terminates the comment.
    pub(crate) fn comment(&mut self) -> Result<(), ParseError> {
        self.pos += 1;
        while let Some(b) = self.peek() {
            match b {
                b'\n' => break,
                b'\r' if self.starts_with("\r\n") => break,
                b if is_ascii_ctrl(b) && b != b'\t' => {
                    return Err(self.error(format!(
                        "Illegal character {:?}",
                        self.char_at(self.pos)
                    )));
                }
                _ => self.pos += 1,
            }
        }
        Ok(())
    }

    /// Run a winnow token parser over the remaining input.
    ///
    /// On success the cursor advances past the matched slice; on failure it
    /// is left untouched, like an anchored regex that did not match.
    pub(crate) fn winnow<O>(
        &mut self,
        mut parser: impl winnow::Parser<&'i str, O, ErrMode<ContextError>>,
    ) -> Option<O> {
        let mut rest = self.rest();
        match parser.parse_next(&mut rest) {
            Ok(value) => {
                self.pos = self.src.len() - rest.len();
                Some(value)
            }
            Err(_) => None,
        }
    }

    /// An error at the current position.
    pub(crate) fn error(&self, message: impl Into<Box<str>>) -> ParseError {
        ParseError::new(self.src, self.pos, message)
    }

    /// An error at an earlier position.
    pub(crate) fn error_at(&self, pos: usize, message: impl Into<Box<str>>) -> ParseError {
        ParseError::new(self.src, pos, message)
    }
}
