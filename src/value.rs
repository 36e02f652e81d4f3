use std::borrow::Cow;

use crate::{Array, Datetime, Table};

/// A TOML value.
///
/// Strings borrow from the parsed document whenever their source
/// representation needed no escape decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// A string.
    String(Cow<'a, str>),
    /// A 64-bit signed integer.
    Integer(i64),
    /// A float, converted by the active float parser.
    Float(f64),
    /// A boolean.
    Boolean(bool),
    /// A date, a time, or a combination of both, with an optional offset.
    Datetime(Datetime),
    /// An array of values.
    Array(Array<'a>),
    /// A table.
    Table(Table<'a>),
}

impl<'a> Value<'a> {
    /// The string slice if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer if this is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The float if this is a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The boolean if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The date-time if this is a date-time.
    pub fn as_datetime(&self) -> Option<&Datetime> {
        match self {
            Value::Datetime(dt) => Some(dt),
            _ => None,
        }
    }

    /// The array if this is an array.
    pub fn as_array(&self) -> Option<&Array<'a>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// The table if this is a table.
    pub fn as_table(&self) -> Option<&Table<'a>> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl<'a> From<Cow<'a, str>> for Value<'a> {
    fn from(s: Cow<'a, str>) -> Self {
        Value::String(s)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::String(Cow::Borrowed(s))
    }
}

impl<'a> From<String> for Value<'a> {
    fn from(s: String) -> Self {
        Value::String(Cow::Owned(s))
    }
}

impl<'a> From<i64> for Value<'a> {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl<'a> From<f64> for Value<'a> {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl<'a> From<bool> for Value<'a> {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<'a> From<Datetime> for Value<'a> {
    fn from(dt: Datetime) -> Self {
        Value::Datetime(dt)
    }
}

impl<'a> From<Array<'a>> for Value<'a> {
    fn from(a: Array<'a>) -> Self {
        Value::Array(a)
    }
}

impl<'a> From<Table<'a>> for Value<'a> {
    fn from(t: Table<'a>) -> Self {
        Value::Table(t)
    }
}

impl<'a, V> FromIterator<V> for Value<'a>
where
    V: Into<Value<'a>>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        Value::Array(iter.into_iter().map(Into::into).collect())
    }
}
