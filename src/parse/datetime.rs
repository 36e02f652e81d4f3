//! Date and time grammar (as defined in RFC 3339).
//!
//! The grammar enforces what a regex could (digit counts and per-field
//! ranges). Whether a day exists in its month is checked by the value rule
//! via [`date_exists`], so a shape-valid but impossible date reports a
//! dedicated error instead of falling through to the number parsers.

use core::ops::RangeInclusive;

use winnow::{
    combinator::{alt, opt, preceded, trace},
    error::{ContextError, ErrMode},
    token::{one_of, take_while},
    ModalResult, Parser,
};

use crate::datetime::{Date, Datetime, Offset, Time};

// date-time = offset-date-time / local-date-time / local-date
// offset-date-time = full-date time-delim full-time
// local-date-time = full-date time-delim partial-time
// local-date = full-date
// full-time = partial-time time-offset
pub(crate) fn date_time(input: &mut &str) -> ModalResult<Datetime> {
    trace(
        "date-time",
        (full_date, opt((time_delim, partial_time, opt(time_offset)))).map(|(date, tail)| {
            match tail {
                Some((_, time, offset)) => Datetime {
                    date: Some(date),
                    time: Some(time),
                    offset,
                },
                None => Datetime {
                    date: Some(date),
                    time: None,
                    offset: None,
                },
            }
        }),
    )
    .parse_next(input)
}

// local-time = partial-time
pub(crate) fn local_time(input: &mut &str) -> ModalResult<Time> {
    trace("local-time", partial_time).parse_next(input)
}

// full-date = date-fullyear "-" date-month "-" date-mday
fn full_date(input: &mut &str) -> ModalResult<Date> {
    (date_fullyear, '-', date_month, '-', date_mday)
        .map(|(year, _, month, _, day)| Date { year, month, day })
        .parse_next(input)
}

/// Whether the day exists in its month; the grammar alone allows up to 31
/// everywhere.
pub(crate) fn date_exists(date: &Date) -> bool {
    let leap = date.year % 4 == 0 && (date.year % 100 != 0 || date.year % 400 == 0);
    let last = match date.month {
        2 if leap => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    };
    date.day <= last
}

// partial-time = time-hour ":" time-minute ":" time-second [ time-secfrac ]
fn partial_time(input: &mut &str) -> ModalResult<Time> {
    (
        time_hour,
        ':',
        time_minute,
        ':',
        time_second,
        opt(time_secfrac),
    )
        .map(|(hour, _, minute, _, second, microsecond)| Time {
            hour,
            minute,
            second,
            microsecond: microsecond.unwrap_or_default(),
        })
        .parse_next(input)
}

// time-offset = "Z" / time-numoffset
// time-numoffset = ( "+" / "-" ) time-hour ":" time-minute
fn time_offset(input: &mut &str) -> ModalResult<Offset> {
    trace(
        "time-offset",
        alt((
            one_of(('Z', 'z')).value(Offset::Z),
            (one_of((b'+', b'-')), time_hour, ':', time_minute).map(
                |(sign, hours, _, minutes)| {
                    let total = i16::from(hours) * 60 + i16::from(minutes);
                    let minutes = if sign == '-' { -total } else { total };
                    Offset::Custom { minutes }
                },
            ),
        )),
    )
    .parse_next(input)
}

// date-fullyear = 4DIGIT
fn date_fullyear(input: &mut &str) -> ModalResult<u16> {
    digits::<4>
        .map(|s: &str| s.parse::<u16>().expect("4DIGIT fits u16"))
        .parse_next(input)
}

// date-month = 2DIGIT ; 01-12
fn date_month(input: &mut &str) -> ModalResult<u8> {
    two_digits_in(1..=12).parse_next(input)
}

// date-mday = 2DIGIT ; 01-28, 01-29, 01-30, 01-31 based on month/year
fn date_mday(input: &mut &str) -> ModalResult<u8> {
    two_digits_in(1..=31).parse_next(input)
}

// time-delim = "T" / %x20 ; T, t, or space
fn time_delim(input: &mut &str) -> ModalResult<char> {
    one_of(TIME_DELIM).parse_next(input)
}
const TIME_DELIM: (u8, u8, u8) = (b'T', b't', b' ');

// time-hour = 2DIGIT ; 00-23
fn time_hour(input: &mut &str) -> ModalResult<u8> {
    two_digits_in(0..=23).parse_next(input)
}

// time-minute = 2DIGIT ; 00-59
fn time_minute(input: &mut &str) -> ModalResult<u8> {
    two_digits_in(0..=59).parse_next(input)
}

// time-second = 2DIGIT ; 00-58, 00-59, 00-60 based on leap second rules
fn time_second(input: &mut &str) -> ModalResult<u8> {
    two_digits_in(0..=60).parse_next(input)
}

// time-secfrac = "." 1*DIGIT
//
// Kept to microsecond precision; additional digits are truncated, not
// rounded.
fn time_secfrac(input: &mut &str) -> ModalResult<u32> {
    static SCALE: [u32; 7] = [0, 100_000, 10_000, 1_000, 100, 10, 1];
    preceded('.', take_while(1.., DIGIT))
        .map(|repr: &str| {
            let digits = &repr[..repr.len().min(6)];
            let value = digits.parse::<u32>().expect("at most six digits");
            value * SCALE[digits.len()]
        })
        .parse_next(input)
}

fn two_digits_in<'i>(
    range: RangeInclusive<u8>,
) -> impl Parser<&'i str, u8, ErrMode<ContextError>> {
    digits::<2>
        .map(|s: &str| s.parse::<u8>().expect("2DIGIT fits u8"))
        .verify(move |d| range.contains(d))
}

fn digits<'i, const N: usize>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(N..=N, DIGIT).parse_next(input)
}

// DIGIT = %x30-39 ; 0-9
const DIGIT: RangeInclusive<u8> = b'0'..=b'9';
