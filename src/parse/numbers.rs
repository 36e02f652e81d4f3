//! Boolean and number grammar.
//!
//! Conversion of float literals is not done here: the matched slice is
//! handed to the active float parser by the value rule.

use core::ops::RangeInclusive;

use winnow::{
    combinator::{alt, fail, opt, peek, preceded, repeat, trace},
    dispatch,
    token::{one_of, take},
    ModalResult, Parser,
};

// ;; Boolean

// boolean = true / false
pub(crate) fn boolean(input: &mut &str) -> ModalResult<bool> {
    trace("boolean", alt(("true".value(true), "false".value(false)))).parse_next(input)
}

// ;; Integer

// hex-int = hex-prefix HEXDIG *( HEXDIG / underscore HEXDIG )
// oct-int = oct-prefix digit0-7 *( digit0-7 / underscore digit0-7 )
// bin-int = bin-prefix digit0-1 *( digit0-1 / underscore digit0-1 )
pub(crate) fn prefixed_int(input: &mut &str) -> ModalResult<i64> {
    trace(
        "prefixed-int",
        dispatch! {peek(opt::<_, &str, _, _>(take(2usize)));
            Some("0x") => hex_int.try_map(|s: &str| i64::from_str_radix(&s.replace('_', ""), 16)),
            Some("0o") => oct_int.try_map(|s: &str| i64::from_str_radix(&s.replace('_', ""), 8)),
            Some("0b") => bin_int.try_map(|s: &str| i64::from_str_radix(&s.replace('_', ""), 2)),
            _ => fail,
        },
    )
    .parse_next(input)
}

// dec-int = [ minus / plus ] unsigned-dec-int
// unsigned-dec-int = DIGIT / digit1-9 1*( DIGIT / underscore DIGIT )
pub(crate) fn dec_int<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    trace(
        "dec-int",
        (
            opt(one_of((b'+', b'-'))),
            alt((
                (one_of(DIGIT1_9), underscored_digits(DIGIT)).void(),
                digit.void(),
            )),
        )
            .take(),
    )
    .parse_next(input)
}
const DIGIT1_9: RangeInclusive<u8> = b'1'..=b'9';

// hex-prefix = %x30.78 ; 0x
fn hex_int<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    preceded("0x", (one_of(HEXDIG), underscored_digits(HEXDIG)).take()).parse_next(input)
}

// oct-prefix = %x30.6F ; 0o
fn oct_int<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    preceded("0o", (one_of(DIGIT0_7), underscored_digits(DIGIT0_7)).take()).parse_next(input)
}
const DIGIT0_7: RangeInclusive<u8> = b'0'..=b'7';

// bin-prefix = %x30.62 ; 0b
fn bin_int<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    preceded("0b", (one_of(DIGIT0_1), underscored_digits(DIGIT0_1)).take()).parse_next(input)
}
const DIGIT0_1: RangeInclusive<u8> = b'0'..=b'1';

/// `*( digit / underscore digit )` — an underscore must sit between two
/// digits, which the tuple in the second branch enforces.
fn underscored_digits<'i, T>(
    digits: T,
) -> impl Parser<&'i str, (), winnow::error::ErrMode<winnow::error::ContextError>>
where
    T: winnow::stream::ContainsToken<char> + Clone,
{
    repeat(
        0..,
        alt((
            one_of(digits.clone()).void(),
            (one_of(b'_'), one_of(digits.clone())).void(),
        )),
    )
    .map(|()| ())
}

// ;; Float

// float = float-int-part ( exp / frac [ exp ] )
// float =/ special-float
// float-int-part = dec-int
pub(crate) fn float_literal<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    trace(
        "float",
        alt((
            (dec_int, alt((exp.void(), (frac, opt(exp)).void()))).take(),
            special_float,
        )),
    )
    .parse_next(input)
}

// frac = decimal-point zero-prefixable-int
// decimal-point = %x2E ; .
fn frac<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    ('.', zero_prefixable_int).take().parse_next(input)
}

// zero-prefixable-int = DIGIT *( DIGIT / underscore DIGIT )
fn zero_prefixable_int<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (digit, underscored_digits(DIGIT)).take().parse_next(input)
}

// exp = "e" float-exp-part
// float-exp-part = [ minus / plus ] zero-prefixable-int
fn exp<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        one_of((b'e', b'E')),
        opt(one_of((b'+', b'-'))),
        zero_prefixable_int,
    )
        .take()
        .parse_next(input)
}

// special-float = [ minus / plus ] ( inf / nan )
fn special_float<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    ((opt(one_of((b'+', b'-')))), alt(("inf", "nan")))
        .take()
        .parse_next(input)
}

// DIGIT = %x30-39 ; 0-9
fn digit(input: &mut &str) -> ModalResult<char> {
    one_of(DIGIT).parse_next(input)
}
const DIGIT: RangeInclusive<u8> = b'0'..=b'9';

// HEXDIG = DIGIT / "A" / "B" / "C" / "D" / "E" / "F"
const HEXDIG: (RangeInclusive<u8>, RangeInclusive<u8>, RangeInclusive<u8>) =
    (DIGIT, b'A'..=b'F', b'a'..=b'f');
