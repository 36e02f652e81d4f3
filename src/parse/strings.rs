//! String parsing.
//!
//! These are bulk scanners rather than token parsers: they jump from one
//! interesting byte (delimiter, backslash, control character) to the next
//! and keep verbatim stretches of the source as borrowed slices. A string
//! only costs an allocation when an escape sequence or a `\r\n` pair forces
//! a rewrite.

use std::borrow::Cow;

use super::cursor::{is_ascii_ctrl, Cursor};
use crate::error::ParseError;

const UNTERMINATED: &str = "Unterminated string";
const UNESCAPED_BACKSLASH: &str = "Unescaped \"\\\" in a string";

/// Parse a single-line basic string. The cursor is on the opening `"`.
pub(crate) fn basic<'i>(cur: &mut Cursor<'i>) -> Result<Cow<'i, str>, ParseError> {
    cur.bump(1);
    let mut buf: Option<String> = None;
    let mut start = cur.pos();
    loop {
        match cur.peek() {
            None => return Err(cur.error(UNTERMINATED)),
            Some(b'"') => {
                let tail = cur.slice(start, cur.pos());
                cur.bump(1);
                return Ok(assemble(buf, tail));
            }
            Some(b'\\') => {
                flush(&mut buf, cur.slice(start, cur.pos()));
                escape(cur, false, buf.as_mut().expect("flush created the buffer"))?;
                start = cur.pos();
            }
            Some(b) if is_ascii_ctrl(b) && b != b'\t' => return Err(illegal_char(cur)),
            Some(_) => cur.bump(1),
        }
    }
}

/// Parse a multi-line basic string. The cursor is on the opening `"""`.
pub(crate) fn multiline_basic<'i>(cur: &mut Cursor<'i>) -> Result<Cow<'i, str>, ParseError> {
    cur.bump(3);
    cur.eat_newline();
    let mut buf: Option<String> = None;
    let mut start = cur.pos();
    loop {
        match cur.peek() {
            None => return Err(cur.error(UNTERMINATED)),
            Some(b'"') => {
                if cur.starts_with("\"\"\"") {
                    let tail = cur.slice(start, cur.pos());
                    cur.bump(3);
                    let mut value = assemble(buf, tail);
                    take_extra_delimiters(cur, b'"', &mut value);
                    return Ok(value);
                }
                cur.bump(1);
            }
            Some(b'\\') => {
                flush(&mut buf, cur.slice(start, cur.pos()));
                escape(cur, true, buf.as_mut().expect("flush created the buffer"))?;
                start = cur.pos();
            }
            Some(b'\r') => {
                // Only legal as part of `\r\n`, which collapses to a
                // newline in the value.
                if !cur.starts_with("\r\n") {
                    return Err(illegal_char(cur));
                }
                flush(&mut buf, cur.slice(start, cur.pos()));
                buf.as_mut().expect("flush created the buffer").push('\n');
                cur.bump(2);
                start = cur.pos();
            }
            Some(b) if is_ascii_ctrl(b) && b != b'\t' && b != b'\n' => {
                return Err(illegal_char(cur))
            }
            Some(_) => cur.bump(1),
        }
    }
}

/// Parse a single-line literal string. The cursor is on the opening `'`.
pub(crate) fn literal<'i>(cur: &mut Cursor<'i>) -> Result<Cow<'i, str>, ParseError> {
    cur.bump(1);
    let start = cur.pos();
    let offset = match cur.rest().find('\'') {
        Some(offset) => offset,
        None => return Err(cur.error_at(cur.len(), UNTERMINATED)),
    };
    let end = start + offset;
    reject_ctrl_chars(cur, start, end, false)?;
    cur.bump(offset + 1);
    Ok(Cow::Borrowed(cur.slice(start, end)))
}

/// Parse a multi-line literal string. The cursor is on the opening `'''`.
pub(crate) fn multiline_literal<'i>(cur: &mut Cursor<'i>) -> Result<Cow<'i, str>, ParseError> {
    cur.bump(3);
    cur.eat_newline();
    let start = cur.pos();
    let offset = match cur.rest().find("'''") {
        Some(offset) => offset,
        None => return Err(cur.error_at(cur.len(), UNTERMINATED)),
    };
    let end = start + offset;
    reject_ctrl_chars(cur, start, end, true)?;
    cur.bump(offset + 3);
    let segment = cur.slice(start, end);
    let mut value = if segment.contains("\r\n") {
        Cow::Owned(segment.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(segment)
    };
    take_extra_delimiters(cur, b'\'', &mut value);
    Ok(value)
}

/// The closing delimiter run may be four or five characters long; the extra
/// one or two belong to the string.
fn take_extra_delimiters(cur: &mut Cursor<'_>, delim: u8, value: &mut Cow<'_, str>) {
    for _ in 0..2 {
        if cur.peek() == Some(delim) {
            cur.bump(1);
            value.to_mut().push(delim as char);
        }
    }
}

fn flush(buf: &mut Option<String>, segment: &str) {
    buf.get_or_insert_with(String::new).push_str(segment);
}

fn assemble<'i>(buf: Option<String>, tail: &'i str) -> Cow<'i, str> {
    match buf {
        None => Cow::Borrowed(tail),
        Some(mut buf) => {
            buf.push_str(tail);
            Cow::Owned(buf)
        }
    }
}

fn illegal_char(cur: &Cursor<'_>) -> ParseError {
    cur.error(format!("Illegal character {:?}", cur.char_at(cur.pos())))
}

/// Reject control characters in `start..end`. Tab is always allowed; in the
/// multi-line form a newline is too, and `\r` when it is part of `\r\n`.
fn reject_ctrl_chars(
    cur: &Cursor<'_>,
    start: usize,
    end: usize,
    multiline: bool,
) -> Result<(), ParseError> {
    let bytes = cur.slice(start, end).as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if !is_ascii_ctrl(b) || b == b'\t' {
            continue;
        }
        if multiline && b == b'\n' {
            continue;
        }
        if multiline && b == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
            continue;
        }
        return Err(cur.error_at(start + i, format!("Illegal character {:?}", b as char)));
    }
    Ok(())
}

/// Decode one escape sequence. The cursor is on the backslash.
fn escape(cur: &mut Cursor<'_>, multiline: bool, out: &mut String) -> Result<(), ParseError> {
    let backslash = cur.pos();
    match cur.rest().as_bytes().get(1).copied() {
        None => Err(cur.error_at(backslash, UNTERMINATED)),
        Some(b'b') => push_and_bump(cur, out, '\u{8}'),
        Some(b't') => push_and_bump(cur, out, '\t'),
        Some(b'n') => push_and_bump(cur, out, '\n'),
        Some(b'f') => push_and_bump(cur, out, '\u{c}'),
        Some(b'r') => push_and_bump(cur, out, '\r'),
        Some(b'"') => push_and_bump(cur, out, '"'),
        Some(b'\\') => push_and_bump(cur, out, '\\'),
        Some(b'u') => {
            cur.bump(2);
            let decoded = hex_char(cur, 4)?;
            out.push(decoded);
            Ok(())
        }
        Some(b'U') => {
            cur.bump(2);
            let decoded = hex_char(cur, 8)?;
            out.push(decoded);
            Ok(())
        }
        // A backslash at the end of a line (or followed only by whitespace
        // up to the end of the line) swallows everything up to the next
        // non-whitespace character.
        Some(b'\n') if multiline => {
            cur.bump(2);
            skip_ws_and_newlines(cur);
            Ok(())
        }
        Some(b'\r') if multiline && cur.rest().as_bytes().get(2) == Some(&b'\n') => {
            cur.bump(3);
            skip_ws_and_newlines(cur);
            Ok(())
        }
        Some(b' ' | b'\t') if multiline => {
            cur.bump(2);
            cur.skip_ws();
            if cur.done() {
                return Ok(());
            }
            if cur.eat_newline() {
                skip_ws_and_newlines(cur);
                return Ok(());
            }
            Err(cur.error(UNESCAPED_BACKSLASH))
        }
        Some(_) => Err(cur.error_at(backslash, UNESCAPED_BACKSLASH)),
    }
}

fn push_and_bump(cur: &mut Cursor<'_>, out: &mut String, decoded: char) -> Result<(), ParseError> {
    out.push(decoded);
    cur.bump(2);
    Ok(())
}

/// Decode `len` hex digits into a Unicode scalar value.
fn hex_char(cur: &mut Cursor<'_>, len: usize) -> Result<char, ParseError> {
    let rest = cur.rest().as_bytes();
    if rest.len() < len || !rest[..len].iter().all(u8::is_ascii_hexdigit) {
        return Err(cur.error("Invalid hex value"));
    }
    let scalar =
        u32::from_str_radix(&cur.rest()[..len], 16).expect("at most eight hex digits");
    cur.bump(len);
    char::from_u32(scalar).ok_or_else(|| {
        cur.error("Escaped character is not a Unicode scalar value")
    })
}

fn skip_ws_and_newlines(cur: &mut Cursor<'_>) {
    loop {
        match cur.peek() {
            Some(b' ' | b'\t' | b'\n') => cur.bump(1),
            Some(b'\r') if cur.starts_with("\r\n") => cur.bump(2),
            _ => break,
        }
    }
}
