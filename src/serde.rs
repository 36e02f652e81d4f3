use std::borrow::Cow;

use serde::de::{
    self,
    value::{BorrowedStrDeserializer, I64Deserializer, StrDeserializer},
    DeserializeSeed, Deserializer, IntoDeserializer, MapAccess, SeqAccess, Visitor,
};

use crate::{array, datetime::Offset, table, Array, Date, Datetime, Error, Table, Time, Value};

/// Deserialize a TOML document from a string. Requires the `serde` feature.
pub fn from_str<'de, T>(s: &'de str) -> Result<T, Error>
where
    T: de::Deserialize<'de>,
{
    let table = crate::parse(s)?;

    T::deserialize(ValueDeserializer::new(Value::Table(table)))
}

#[derive(Debug)]
struct ValueDeserializer<'de> {
    value: Option<Value<'de>>,
    // Set when deserializing the fields of a `Datetime` value.
    date: Option<Date>,
    time: Option<Time>,
}

impl<'de> ValueDeserializer<'de> {
    fn new(value: Value<'de>) -> Self {
        ValueDeserializer {
            value: Some(value),
            date: None,
            time: None,
        }
    }

    fn missing() -> Self {
        ValueDeserializer {
            value: None,
            date: None,
            time: None,
        }
    }
}

impl<'de> Deserializer<'de> for ValueDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::String(Cow::Borrowed(s))) => visitor.visit_borrowed_str(s),
            Some(Value::String(Cow::Owned(s))) => visitor.visit_str(&s),
            Some(Value::Integer(i)) => visitor.visit_i64(i),
            Some(Value::Float(f)) => visitor.visit_f64(f),
            Some(Value::Boolean(b)) => visitor.visit_bool(b),
            Some(Value::Array(array)) => visitor.visit_seq(SeqDeserializer::new(array)),
            Some(Value::Table(table)) => visitor.visit_map(MapDeserializer::new(table)),
            Some(Value::Datetime(_)) => self.deserialize_struct("", &[], visitor),
            None => Err(de::Error::custom("value is missing")),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::String(Cow::Borrowed(s))) => visitor.visit_borrowed_str(s),
            Some(Value::String(Cow::Owned(s))) => visitor.visit_str(&s),
            _ => Err(de::Error::invalid_type(
                de::Unexpected::Other("non-string"),
                &visitor,
            )),
        }
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::Integer(i)) => visitor.visit_i64(i),
            _ => Err(de::Error::invalid_type(
                de::Unexpected::Other("non-integer"),
                &visitor,
            )),
        }
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::Float(f)) => visitor.visit_f64(f),
            _ => Err(de::Error::invalid_type(
                de::Unexpected::Other("non-float"),
                &visitor,
            )),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::Boolean(b)) => visitor.visit_bool(b),
            _ => Err(de::Error::invalid_type(
                de::Unexpected::Other("non-boolean"),
                &visitor,
            )),
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(array)) => visitor.visit_seq(SeqDeserializer::new(array)),
            _ => Err(de::Error::invalid_type(
                de::Unexpected::Other("non-array"),
                &visitor,
            )),
        }
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::Table(table)) => visitor.visit_map(MapDeserializer::new(table)),
            _ => Err(de::Error::invalid_type(
                de::Unexpected::Other("non-map"),
                &visitor,
            )),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(_) => visitor.visit_some(self),
            None => visitor.visit_none(),
        }
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::String(s)) => visitor.visit_enum(s.into_deserializer()),
            // TODO: Support non-unit enums.
            _ => Err(de::Error::invalid_type(
                de::Unexpected::Other("non-string"),
                &visitor,
            )),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::Datetime(dt)) => {
                if let Some(date) = self.date {
                    visitor.visit_map(DateDeserializer::new(date))
                } else if let Some(time) = self.time {
                    visitor.visit_map(TimeDeserializer::new(time))
                } else {
                    visitor.visit_map(DatetimeDeserializer::new(dt))
                }
            }
            _ => self.deserialize_any(visitor),
        }
    }

    serde::forward_to_deserialize_any! {
        i8 i16 i32 i128 u8 u16 u32 u64 u128 f32
        char string bytes byte_buf unit unit_struct
        tuple tuple_struct identifier ignored_any
    }
}

struct SeqDeserializer<'de> {
    iter: array::IntoIter<'de>,
}

impl<'de> SeqDeserializer<'de> {
    fn new(array: Array<'de>) -> Self {
        SeqDeserializer {
            iter: array.into_iter(),
        }
    }
}

impl<'de> SeqAccess<'de> for SeqDeserializer<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        self.iter.next().map_or(Ok(None), |value| {
            seed.deserialize(ValueDeserializer::new(value)).map(Some)
        })
    }
}

struct MapDeserializer<'de> {
    iter: table::IntoIter<'de>,
    value: Option<Value<'de>>,
}

impl<'de> MapDeserializer<'de> {
    fn new(table: Table<'de>) -> Self {
        MapDeserializer {
            iter: table.into_iter(),
            value: None,
        }
    }
}

impl<'de> MapAccess<'de> for MapDeserializer<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        if let Some((key, value)) = self.iter.next() {
            self.value = Some(value);
            match key {
                Cow::Owned(s) => seed.deserialize(StrDeserializer::<Error>::new(&s)),
                Cow::Borrowed(s) => seed.deserialize(BorrowedStrDeserializer::new(s)),
            }
            .map(Some)
        } else {
            Ok(None)
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(de::Error::custom("value is missing")),
        }
    }
}

/// Feeds a `Datetime` to a visitor as a `{date, time, offset}` map, so the
/// derived `Deserialize` impls of the date-time types can pick it apart.
#[derive(Debug)]
struct DatetimeDeserializer {
    dt: Datetime,
    stage: DatetimeStage,
}

impl DatetimeDeserializer {
    fn new(dt: Datetime) -> Self {
        DatetimeDeserializer {
            dt,
            stage: DatetimeStage::Date,
        }
    }
}

#[derive(Debug, PartialEq)]
enum DatetimeStage {
    Date,
    Time,
    Offset,
    Done,
}

impl<'de> MapAccess<'de> for DatetimeDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        let de = match self.stage {
            DatetimeStage::Date => "date".into_deserializer(),
            DatetimeStage::Time => "time".into_deserializer(),
            DatetimeStage::Offset => "offset".into_deserializer(),
            DatetimeStage::Done => return Ok(None),
        };
        seed.deserialize(de).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let de = match self.stage {
            DatetimeStage::Date => {
                self.stage = DatetimeStage::Time;
                match self.dt.date {
                    Some(date) => ValueDeserializer {
                        value: Some(Value::Datetime(self.dt)),
                        date: Some(date),
                        time: None,
                    },
                    None => ValueDeserializer::missing(),
                }
            }
            DatetimeStage::Time => {
                self.stage = DatetimeStage::Offset;
                match self.dt.time {
                    Some(time) => ValueDeserializer {
                        value: Some(Value::Datetime(self.dt)),
                        date: None,
                        time: Some(time),
                    },
                    None => ValueDeserializer::missing(),
                }
            }
            DatetimeStage::Offset => {
                self.stage = DatetimeStage::Done;
                // The offset deserializes from its total minutes.
                let offset = self.dt.offset.map(|offset| match offset {
                    Offset::Custom { minutes } => minutes as i64,
                    Offset::Z => 0,
                });
                match offset {
                    Some(minutes) => ValueDeserializer::new(Value::Integer(minutes)),
                    None => ValueDeserializer::missing(),
                }
            }
            DatetimeStage::Done => return Err(de::Error::custom("unexpected key")),
        };

        seed.deserialize(de)
    }
}

/// Stages the three fields of a [`Date`] for its derived `Deserialize`.
#[derive(Debug)]
struct DateDeserializer {
    date: Date,
    stage: DateStage,
}

impl DateDeserializer {
    fn new(date: Date) -> Self {
        DateDeserializer {
            date,
            stage: DateStage::Year,
        }
    }
}

#[derive(Debug, PartialEq)]
enum DateStage {
    Year,
    Month,
    Day,
    Done,
}

impl<'de> MapAccess<'de> for DateDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        match self.stage {
            DateStage::Year => seed.deserialize("year".into_deserializer()).map(Some),
            DateStage::Month => seed.deserialize("month".into_deserializer()).map(Some),
            DateStage::Day => seed.deserialize("day".into_deserializer()).map(Some),
            DateStage::Done => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let value = match self.stage {
            DateStage::Year => {
                self.stage = DateStage::Month;
                self.date.year as i64
            }
            DateStage::Month => {
                self.stage = DateStage::Day;
                self.date.month as i64
            }
            DateStage::Day => {
                self.stage = DateStage::Done;
                self.date.day as i64
            }
            DateStage::Done => return Err(de::Error::custom("unexpected key")),
        };

        seed.deserialize(I64Deserializer::new(value))
    }
}

/// Stages the four fields of a [`Time`] for its derived `Deserialize`.
#[derive(Debug)]
struct TimeDeserializer {
    time: Time,
    stage: TimeStage,
}

impl TimeDeserializer {
    fn new(time: Time) -> Self {
        TimeDeserializer {
            time,
            stage: TimeStage::Hour,
        }
    }
}

#[derive(Debug, PartialEq)]
enum TimeStage {
    Hour,
    Minute,
    Second,
    Microsecond,
    Done,
}

impl<'de> MapAccess<'de> for TimeDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        match self.stage {
            TimeStage::Hour => seed.deserialize("hour".into_deserializer()).map(Some),
            TimeStage::Minute => seed.deserialize("minute".into_deserializer()).map(Some),
            TimeStage::Second => seed.deserialize("second".into_deserializer()).map(Some),
            TimeStage::Microsecond => seed
                .deserialize("microsecond".into_deserializer())
                .map(Some),
            TimeStage::Done => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let value = match self.stage {
            TimeStage::Hour => {
                self.stage = TimeStage::Minute;
                self.time.hour as i64
            }
            TimeStage::Minute => {
                self.stage = TimeStage::Second;
                self.time.minute as i64
            }
            TimeStage::Second => {
                self.stage = TimeStage::Microsecond;
                self.time.second as i64
            }
            TimeStage::Microsecond => {
                self.stage = TimeStage::Done;
                self.time.microsecond as i64
            }
            TimeStage::Done => return Err(de::Error::custom("unexpected key")),
        };

        seed.deserialize(I64Deserializer::new(value))
    }
}
