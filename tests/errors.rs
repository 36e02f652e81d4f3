//! Error messages and their source coordinates.

use tomlet::{parse, Error};

fn err(doc: &str) -> String {
    parse(doc).unwrap_err().to_string()
}

#[test]
fn invalid_statement_and_value_coordinates() {
    assert_eq!(err("val=."), "Invalid value (at line 1, column 5)");
    assert_eq!(err("\n\n."), "Invalid statement (at line 3, column 1)");
    assert_eq!(err("\n\nfwfw="), "Invalid value (at end of document)");
    assert_eq!(
        err("x = 1 y = 2"),
        "Expected newline or end of document after a statement (at line 1, column 7)"
    );
}

#[test]
fn illegal_character_shows_the_character() {
    assert_eq!(
        err("v = '\n'"),
        "Illegal character '\\n' (at line 1, column 6)"
    );
    assert_eq!(
        err("# comment \u{0} here"),
        "Illegal character '\\0' (at line 1, column 11)"
    );
    // A bare carriage return is a control character; only `\r\n` is a
    // newline.
    assert!(err("# comment \r here").starts_with("Illegal character '\\r'"));
    assert!(err("v = \"a\u{7f}b\"").starts_with("Illegal character '\\u{7f}'"));
}

#[test]
fn string_errors() {
    assert_eq!(err("a = \"x"), "Unterminated string (at end of document)");
    assert_eq!(err("a = 'x"), "Unterminated string (at end of document)");
    assert_eq!(
        err("a = \"\"\"x\"\""),
        "Unterminated string (at end of document)"
    );
    assert_eq!(
        err(r#"a = "\q""#),
        "Unescaped \"\\\" in a string (at line 1, column 6)"
    );
    assert_eq!(err(r#"a = "\uZZZZ""#), "Invalid hex value (at line 1, column 8)");
    assert!(err(r#"a = "\ud800""#)
        .starts_with("Escaped character is not a Unicode scalar value"));
}

#[test]
fn key_errors() {
    assert_eq!(
        err("k v"),
        "Expected '=' after a key in a key/value pair (at line 1, column 3)"
    );
    assert_eq!(
        err("[a.]"),
        "Invalid initial character for a key part (at line 1, column 4)"
    );
    assert_eq!(
        err("[a"),
        "Expected ']' at the end of a table declaration (at end of document)"
    );
    assert_eq!(
        err("[[a]"),
        "Expected ']]' at the end of an array declaration (at line 1, column 4)"
    );
}

#[test]
fn number_and_datetime_errors() {
    assert_eq!(
        err("big = 99999999999999999999"),
        "Integer value is out of range (at line 1, column 7)"
    );
    assert_eq!(err("x = 0x"), "Invalid value (at line 1, column 5)");
    assert_eq!(err("x = 0o8"), "Invalid value (at line 1, column 5)");
    assert_eq!(
        err("d = 2021-02-30"),
        "Invalid date or datetime (at line 1, column 5)"
    );
    assert_eq!(
        err("d = 2100-02-29"),
        "Invalid date or datetime (at line 1, column 5)"
    );
}

#[test]
fn container_errors() {
    assert_eq!(err("a = [1 2]"), "Unclosed array (at line 1, column 8)");
    assert_eq!(
        err("a = {x = 1 y = 2}"),
        "Unclosed inline table (at line 1, column 12)"
    );
    assert_eq!(err("a = [1, 2"), "Unclosed array (at end of document)");
}

#[test]
fn coordinates_are_exposed() {
    let doc = "ok = 1\nbroken = .";
    let Err(Error::Parse(error)) = parse(doc) else {
        panic!("expected a parse error");
    };
    assert_eq!(error.message(), "Invalid value");
    assert_eq!(error.line(), Some(2));
    assert_eq!(error.column(), Some(10));

    let Err(Error::Parse(error)) = parse("x =") else {
        panic!("expected a parse error");
    };
    assert_eq!(error.line(), None);
    assert_eq!(error.column(), None);
}

#[test]
fn invalid_utf8_is_its_own_error() {
    let result = tomlet::parse_slice(b"key = \xff\xff");
    assert!(matches!(result, Err(Error::Utf8(_))));
}
