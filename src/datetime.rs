//! Parsed TOML date and time values.

use core::fmt;

/// A parsed TOML date-time value.
///
/// Depending on which fields are present, a `Datetime` corresponds to one of
/// the four date-time flavours of the [TOML v1.0.0 spec]:
///
/// | `date`    | `time`    | `offset`  | TOML type        |
/// | --------- | --------- | --------- | ---------------- |
/// | `Some(_)` | `Some(_)` | `Some(_)` | Offset Date-Time |
/// | `Some(_)` | `Some(_)` | `None`    | Local Date-Time  |
/// | `Some(_)` | `None`    | `None`    | Local Date       |
/// | `None`    | `Some(_)` | `None`    | Local Time       |
///
/// [TOML v1.0.0 spec]: https://toml.io/en/v1.0.0
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Datetime {
    /// Optional date.
    /// Required for: *Offset Date-Time*, *Local Date-Time*, *Local Date*.
    pub date: Option<Date>,

    /// Optional time.
    /// Required for: *Offset Date-Time*, *Local Date-Time*, *Local Time*.
    pub time: Option<Time>,

    /// Optional offset.
    /// Required for: *Offset Date-Time*.
    pub offset: Option<Offset>,
}

/// A parsed TOML date value.
///
/// May be part of a [`Datetime`]. Alone, `Date` corresponds to a *Local
/// Date*: it represents an entire day without any relation to an offset or
/// timezone.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Date {
    /// Year: four digits.
    pub year: u16,
    /// Month: 1 to 12.
    pub month: u8,
    /// Day: 1 to {28, 29, 30, 31} (based on month/year).
    pub day: u8,
}

/// A parsed TOML time value.
///
/// May be part of a [`Datetime`]. Alone, `Time` corresponds to a *Local
/// Time*: a time of day without any relation to a specific day, offset or
/// timezone.
///
/// Fractional seconds are kept to microsecond precision; further precision
/// in the document is truncated, not rounded, as the TOML spec directs for
/// excess precision.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Time {
    /// Hour: 0 to 23.
    pub hour: u8,
    /// Minute: 0 to 59.
    pub minute: u8,
    /// Second: 0 to {58, 59, 60} (based on leap second rules).
    pub second: u8,
    /// Microsecond: 0 to 999_999.
    pub microsecond: u32,
}

/// A parsed TOML time offset.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug)]
pub enum Offset {
    /// The `Z` suffix: a UTC offset of 00:00, "Zulu" time.
    Z,

    /// Offset between local time and UTC.
    Custom {
        /// Minutes: `-1_439..=1_439` (offset hours and minutes combined,
        /// the sign applying to both).
        minutes: i16,
    },
}

impl Offset {
    /// The offset in minutes.
    pub fn as_minutes(&self) -> i16 {
        match *self {
            Offset::Z => 0,
            Offset::Custom { minutes } => minutes,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Offset {
    // deserialize as an i16.
    fn deserialize<D>(deserializer: D) -> Result<Offset, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match i16::deserialize(deserializer)? {
            0 => Ok(Offset::Z),
            minutes => Ok(Offset::Custom { minutes }),
        }
    }
}

impl From<Date> for Datetime {
    fn from(other: Date) -> Self {
        Datetime {
            date: Some(other),
            time: None,
            offset: None,
        }
    }
}

impl From<Time> for Datetime {
    fn from(other: Time) -> Self {
        Datetime {
            date: None,
            time: Some(other),
            offset: None,
        }
    }
}

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref date) = self.date {
            write!(f, "{date}")?;
        }
        if let Some(ref time) = self.time {
            if self.date.is_some() {
                write!(f, "T")?;
            }
            write!(f, "{time}")?;
        }
        if let Some(ref offset) = self.offset {
            write!(f, "{offset}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.microsecond != 0 {
            let micros = format!("{:06}", self.microsecond);
            write!(f, ".{}", micros.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Offset::Z => write!(f, "Z"),
            Offset::Custom { mut minutes } => {
                let mut sign = '+';
                if minutes < 0 {
                    minutes *= -1;
                    sign = '-';
                }
                let hours = minutes / 60;
                let minutes = minutes % 60;
                write!(f, "{sign}{hours:02}:{minutes:02}")
            }
        }
    }
}
