#![forbid(unsafe_code)]
#![deny(
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    missing_docs
)]
#![warn(unreachable_pub)]
#![doc = include_str!("../README.md")]

mod value;
pub use value::Value;
pub mod table;
pub use table::Table;
pub mod array;
pub use array::Array;
mod datetime;
pub use datetime::{Date, Datetime, Offset, Time};
mod parse;
pub use parse::{
    default_float_parser, parse, parse_slice, parse_slice_with, parse_with, FloatParser,
};
#[cfg(feature = "serde")]
mod serde;
#[cfg(feature = "serde")]
pub use crate::serde::from_str;
mod error;
pub use error::{Error, ParseError};
