//! The decoder core.
//!
//! A single pass over the document: a statement loop on a byte cursor,
//! dispatching on the next character. Winnow parsers cover the token-level
//! grammar (numbers, date/times); strings and the delimited structures are
//! scanned directly. Namespace rules are enforced through [`nest::Flags`],
//! a trie of per-path annotations beside the value tree.

mod cursor;
mod datetime;
mod nest;
mod numbers;
mod strings;

use std::borrow::Cow;

use cursor::{is_bare_key_char, Cursor};
use nest::{Flag, Flags, Key, NestedTable};

use crate::error::ParseError;
use crate::{Array, Error, Table, Value};

/// Hook deciding how float literals become values.
///
/// The hook receives the exact literal as written, sign, underscores and
/// the special `inf`/`nan` forms included. Returning `None` makes the
/// literal a decode error. The decoder never builds a float on its own; it
/// always goes through the hook.
pub type FloatParser = fn(&str) -> Option<f64>;

/// The default float parser: underscores stripped, then Rust's own `f64`
/// grammar, which handles the signed `inf`/`nan` forms too.
pub fn default_float_parser(literal: &str) -> Option<f64> {
    literal.replace('_', "").parse().ok()
}

/// Arrays and inline tables are the only recursive productions; bound them
/// instead of trusting the call stack.
const MAX_NEST_DEPTH: usize = 128;

/// Parse a TOML document.
pub fn parse(input: &str) -> Result<Table<'_>, Error> {
    parse_with(input, default_float_parser)
}

/// Parse a TOML document, converting float literals with `parse_float`.
pub fn parse_with(input: &str, parse_float: FloatParser) -> Result<Table<'_>, Error> {
    let mut parser = Parser::new(input, parse_float);
    parser.run().map_err(Error::Parse)?;
    Ok(parser.out.into_table())
}

/// Parse a TOML document from bytes.
///
/// The bytes must be UTF-8; an optional BOM is stripped before parsing.
pub fn parse_slice(bytes: &[u8]) -> Result<Table<'_>, Error> {
    parse_slice_with(bytes, default_float_parser)
}

/// Like [`parse_slice`], converting float literals with `parse_float`.
pub fn parse_slice_with(bytes: &[u8], parse_float: FloatParser) -> Result<Table<'_>, Error> {
    let text = core::str::from_utf8(bytes).map_err(Error::Utf8)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    parse_with(text, parse_float)
}

struct Parser<'i> {
    cur: Cursor<'i>,
    out: NestedTable<'i>,
    flags: Flags<'i>,
    /// Path opened by the most recent header; the implicit parent of
    /// key/value statements.
    header: Vec<Key<'i>>,
    parse_float: FloatParser,
}

impl<'i> Parser<'i> {
    fn new(input: &'i str, parse_float: FloatParser) -> Self {
        Self {
            cur: Cursor::new(input),
            out: NestedTable::new(),
            flags: Flags::new(),
            header: Vec::new(),
            parse_float,
        }
    }

    /// The statement loop. One iteration per statement, typically one line
    /// of source.
    fn run(&mut self) -> Result<(), ParseError> {
        loop {
            self.cur.skip_ws();
            let next = match self.cur.peek() {
                Some(next) => next,
                None => return Ok(()),
            };
            match next {
                b'\n' => {
                    self.cur.bump(1);
                    continue;
                }
                b'\r' if self.cur.starts_with("\r\n") => {
                    self.cur.bump(2);
                    continue;
                }
                b'#' => self.cur.comment()?,
                b'[' if self.cur.starts_with("[[") => self.array_of_tables_header()?,
                b'[' => self.table_header()?,
                b'\'' | b'"' => self.key_value()?,
                next if is_bare_key_char(next) => self.key_value()?,
                _ => return Err(self.cur.error("Invalid statement")),
            }
            self.cur.skip_ws();
            self.cur.skip_comment()?;
            if self.cur.done() {
                return Ok(());
            }
            if !self.cur.eat_newline() {
                return Err(self
                    .cur
                    .error("Expected newline or end of document after a statement"));
            }
        }
    }

    /// `[key]`
    fn table_header(&mut self) -> Result<(), ParseError> {
        self.cur.bump(1);
        self.cur.skip_ws();
        let key = self.key()?;

        self.flags.finalize_pending();
        if let Some(prefix) = self.flags.blocking_prefix(&key, Flag::Frozen) {
            return Err(self.cur.error(format!(
                "Can not mutate immutable namespace \"{}\"",
                joined(&key[..prefix])
            )));
        }
        if self.flags.is(&key, Flag::ExplicitNest) {
            return Err(self
                .cur
                .error(format!("Can not declare \"{}\" twice", joined(&key))));
        }
        self.flags.set(&key, Flag::ExplicitNest, false);
        if self.out.get_or_create_nest(&key, true).is_err() {
            return Err(self.cur.error("Can not overwrite a value"));
        }
        self.header = key;

        if self.cur.peek() != Some(b']') {
            return Err(self
                .cur
                .error("Expected ']' at the end of a table declaration"));
        }
        self.cur.bump(1);
        Ok(())
    }

    /// `[[key]]`
    fn array_of_tables_header(&mut self) -> Result<(), ParseError> {
        self.cur.bump(2);
        self.cur.skip_ws();
        let key = self.key()?;

        self.flags.finalize_pending();
        if let Some(prefix) = self.flags.blocking_prefix(&key, Flag::Frozen) {
            return Err(self.cur.error(format!(
                "Can not mutate immutable namespace \"{}\"",
                joined(&key[..prefix])
            )));
        }
        // The new element is a fresh namespace; everything recorded under
        // the previous elements is void.
        self.flags.unset_all(&key);
        self.flags.add_pending(key.clone(), Flag::ExplicitNest);
        if self.out.append_nest_to_list(&key).is_err() {
            return Err(self.cur.error("Can not overwrite a value"));
        }
        self.header = key;

        if !self.cur.starts_with("]]") {
            return Err(self
                .cur
                .error("Expected ']]' at the end of an array declaration"));
        }
        self.cur.bump(2);
        Ok(())
    }

    /// `key = value`, `dotted.key = value`
    fn key_value(&mut self) -> Result<(), ParseError> {
        let (key, value) = self.key_value_pair(0)?;

        // Dotted-key intermediates may not re-open a namespace that an
        // earlier header or dotted key established. The marks they leave
        // stay pending until the next header, so sibling dotted keys of
        // this table section still work.
        for split in 1..key.len() {
            let namespace: Vec<Key<'i>> =
                self.header.iter().chain(&key[..split]).cloned().collect();
            if self.flags.is(&namespace, Flag::ExplicitNest) {
                return Err(self.cur.error(format!(
                    "Can not redefine namespace \"{}\"",
                    joined(&namespace)
                )));
            }
            self.flags.add_pending(namespace, Flag::ExplicitNest);
        }

        let abs_key: Vec<Key<'i>> = self.header.iter().chain(&key).cloned().collect();
        let (stem, abs_parent) = abs_key.split_last().expect("keys have at least one part");

        if let Some(prefix) = self.flags.blocking_prefix(abs_parent, Flag::Frozen) {
            return Err(self.cur.error(format!(
                "Can not mutate immutable namespace \"{}\"",
                joined(&abs_parent[..prefix])
            )));
        }
        let nest = match self.out.get_or_create_nest(abs_parent, true) {
            Ok(nest) => nest,
            Err(_) => return Err(self.cur.error("Can not overwrite a value")),
        };
        if nest.contains_key(stem.as_ref()) {
            return Err(self
                .cur
                .error(format!("Can not define \"{}\" twice", joined(&abs_key))));
        }
        // Inline tables and arrays are immutable from here on.
        if matches!(value, Value::Array(_) | Value::Table(_)) {
            self.flags.set(&abs_key, Flag::Frozen, true);
        }
        nest.insert(stem.clone(), value);
        Ok(())
    }

    fn key_value_pair(&mut self, depth: usize) -> Result<(Vec<Key<'i>>, Value<'i>), ParseError> {
        let key = self.key()?;
        if self.cur.peek() != Some(b'=') {
            return Err(self
                .cur
                .error("Expected '=' after a key in a key/value pair"));
        }
        self.cur.bump(1);
        self.cur.skip_ws();
        let value = self.value(depth)?;
        Ok((key, value))
    }

    /// One or more key parts separated by dots, inline whitespace around
    /// each dot.
    fn key(&mut self) -> Result<Vec<Key<'i>>, ParseError> {
        let mut parts = vec![self.key_part()?];
        self.cur.skip_ws();
        while self.cur.peek() == Some(b'.') {
            self.cur.bump(1);
            self.cur.skip_ws();
            parts.push(self.key_part()?);
            self.cur.skip_ws();
        }
        Ok(parts)
    }

    /// A bare key run, or a single-line quoted string. The multi-line
    /// forms are not keys.
    fn key_part(&mut self) -> Result<Key<'i>, ParseError> {
        match self.cur.peek() {
            Some(next) if is_bare_key_char(next) => {
                let start = self.cur.pos();
                while matches!(self.cur.peek(), Some(next) if is_bare_key_char(next)) {
                    self.cur.bump(1);
                }
                Ok(Cow::Borrowed(self.cur.slice(start, self.cur.pos())))
            }
            Some(b'\'') => strings::literal(&mut self.cur),
            Some(b'"') => strings::basic(&mut self.cur),
            _ => Err(self.cur.error("Invalid initial character for a key part")),
        }
    }

    fn value(&mut self, depth: usize) -> Result<Value<'i>, ParseError> {
        let start = self.cur.pos();
        match self.cur.peek() {
            Some(b'"') => {
                if self.cur.starts_with("\"\"\"") {
                    strings::multiline_basic(&mut self.cur).map(Value::String)
                } else {
                    strings::basic(&mut self.cur).map(Value::String)
                }
            }
            Some(b'\'') => {
                if self.cur.starts_with("'''") {
                    strings::multiline_literal(&mut self.cur).map(Value::String)
                } else {
                    strings::literal(&mut self.cur).map(Value::String)
                }
            }
            Some(b't' | b'f') => match self.cur.winnow(numbers::boolean) {
                Some(value) => Ok(Value::Boolean(value)),
                None => Err(self.cur.error("Invalid value")),
            },
            Some(b'[') => self.array(depth),
            Some(b'{') => self.inline_table(depth),
            Some(next) if next.is_ascii_digit() => {
                // Date/times go first: a bare number parser would eat the
                // year or the hour.
                if let Some(dt) = self.cur.winnow(datetime::date_time) {
                    if dt.date.map_or(false, |date| !datetime::date_exists(&date)) {
                        return Err(self.cur.error_at(start, "Invalid date or datetime"));
                    }
                    return Ok(Value::Datetime(dt));
                }
                if let Some(time) = self.cur.winnow(datetime::local_time) {
                    return Ok(Value::Datetime(time.into()));
                }
                self.number(start)
            }
            Some(b'+' | b'-' | b'i' | b'n') => self.number(start),
            _ => Err(self.cur.error("Invalid value")),
        }
    }

    fn number(&mut self, start: usize) -> Result<Value<'i>, ParseError> {
        let rest = self.cur.rest();
        if rest.starts_with("0x") || rest.starts_with("0o") || rest.starts_with("0b") {
            return match self.cur.winnow(numbers::prefixed_int) {
                Some(value) => Ok(Value::Integer(value)),
                None => Err(self.cur.error("Invalid value")),
            };
        }
        if let Some(literal) = self.cur.winnow(numbers::float_literal) {
            return match (self.parse_float)(literal) {
                Some(value) => Ok(Value::Float(value)),
                None => Err(self.cur.error_at(start, "Invalid value")),
            };
        }
        match self.cur.winnow(numbers::dec_int) {
            Some(literal) => match literal.replace('_', "").parse::<i64>() {
                Ok(value) => Ok(Value::Integer(value)),
                Err(_) => Err(self.cur.error_at(start, "Integer value is out of range")),
            },
            None => Err(self.cur.error("Invalid value")),
        }
    }

    fn array(&mut self, depth: usize) -> Result<Value<'i>, ParseError> {
        if depth >= MAX_NEST_DEPTH {
            return Err(self.cur.error("Maximum nesting depth exceeded"));
        }
        self.cur.bump(1);
        let mut array = Array::new();
        self.skip_array_trivia()?;
        if self.cur.peek() == Some(b']') {
            self.cur.bump(1);
            return Ok(array.into());
        }
        loop {
            array.push(self.value(depth + 1)?);
            self.skip_array_trivia()?;
            match self.cur.peek() {
                Some(b']') => {
                    self.cur.bump(1);
                    return Ok(array.into());
                }
                Some(b',') => self.cur.bump(1),
                _ => return Err(self.cur.error("Unclosed array")),
            }
            // A trailing comma before the closing bracket is fine.
            self.skip_array_trivia()?;
            if self.cur.peek() == Some(b']') {
                self.cur.bump(1);
                return Ok(array.into());
            }
        }
    }

    /// Whitespace, newlines and comments, in any combination — legal
    /// between any two tokens of an array.
    fn skip_array_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            let before = self.cur.pos();
            loop {
                match self.cur.peek() {
                    Some(b' ' | b'\t' | b'\n') => self.cur.bump(1),
                    Some(b'\r') if self.cur.starts_with("\r\n") => self.cur.bump(2),
                    _ => break,
                }
            }
            self.cur.skip_comment()?;
            if self.cur.pos() == before {
                return Ok(());
            }
        }
    }

    fn inline_table(&mut self, depth: usize) -> Result<Value<'i>, ParseError> {
        if depth >= MAX_NEST_DEPTH {
            return Err(self.cur.error("Maximum nesting depth exceeded"));
        }
        self.cur.bump(1);
        // An inline table tracks immutability in its own local namespace:
        // its dotted keys nest within the table and nowhere else, and it
        // never contains an array of tables to descend into.
        let mut out = NestedTable::new();
        let mut flags = Flags::new();
        self.cur.skip_ws();
        if self.cur.peek() == Some(b'}') {
            self.cur.bump(1);
            return Ok(Value::Table(out.into_table()));
        }
        loop {
            let (key, value) = self.key_value_pair(depth + 1)?;
            if let Some(prefix) = flags.blocking_prefix(&key, Flag::Frozen) {
                return Err(self.cur.error(format!(
                    "Can not mutate immutable namespace \"{}\"",
                    joined(&key[..prefix])
                )));
            }
            let (stem, parents) = key.split_last().expect("keys have at least one part");
            let nest = match out.get_or_create_nest(parents, false) {
                Ok(nest) => nest,
                Err(_) => return Err(self.cur.error("Can not overwrite a value")),
            };
            if nest.contains_key(stem.as_ref()) {
                return Err(self
                    .cur
                    .error(format!("Duplicate inline table key \"{stem}\"")));
            }
            if matches!(value, Value::Array(_) | Value::Table(_)) {
                flags.set(&key, Flag::Frozen, true);
            }
            nest.insert(stem.clone(), value);
            self.cur.skip_ws();
            match self.cur.peek() {
                Some(b'}') => {
                    self.cur.bump(1);
                    return Ok(Value::Table(out.into_table()));
                }
                Some(b',') => self.cur.bump(1),
                _ => return Err(self.cur.error("Unclosed inline table")),
            }
            self.cur.skip_ws();
        }
    }
}

fn joined(path: &[Key<'_>]) -> String {
    path.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pathological_nesting_fails_fast() {
        // A long run of unclosed arrays must hit the depth bound, not the
        // call stack or a combinatorial backtracking blowup.
        let doc = format!("a = {}", "[".repeat(10_000));
        let err = parse(&doc).unwrap_err();
        assert!(err.to_string().contains("Maximum nesting depth"));
    }
}
