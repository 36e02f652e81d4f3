//! A TOML table.

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::Value;

/// A TOML table.
///
/// Keys keep the order in which they were inserted, which for a parsed
/// document is the order in which they appear in the source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table<'a>(IndexMap<Cow<'a, str>, Value<'a>>);

impl<'a> Table<'a> {
    /// Create a new table.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Insert a key-value pair into the table.
    pub fn insert(&mut self, key: impl Into<Cow<'a, str>>, value: Value<'a>) {
        self.0.insert(key.into(), value);
    }

    /// Get the value for the given key.
    pub fn get(&self, key: &str) -> Option<&Value<'a>> {
        self.0.get(key)
    }

    /// If the table contains the given key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Get the number of entries in the table.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// If the table is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get an iterator over the key-value pairs, in insertion order.
    pub fn iter(&self) -> Iter<'_, 'a> {
        Iter {
            iter: self.0.iter(),
        }
    }

    pub(crate) fn entry(
        &mut self,
        key: Cow<'a, str>,
    ) -> indexmap::map::Entry<'_, Cow<'a, str>, Value<'a>> {
        self.0.entry(key)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Value<'a>> {
        self.0.get_mut(key)
    }
}

impl<'a> FromIterator<(Cow<'a, str>, Value<'a>)> for Table<'a> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Cow<'a, str>, Value<'a>)>,
    {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<(&'a str, Value<'a>)> for Table<'a> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Value<'a>)>,
    {
        Self(iter.into_iter().map(|(k, v)| (Cow::Borrowed(k), v)).collect())
    }
}

/// An iterator over the key-value pairs of a table.
#[derive(Debug)]
pub struct Iter<'i, 'a> {
    iter: indexmap::map::Iter<'i, Cow<'a, str>, Value<'a>>,
}

impl<'i, 'a> Iterator for Iter<'i, 'a> {
    type Item = (&'i str, &'i Value<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(k, v)| (k.as_ref(), v))
    }
}

impl<'i, 'a> IntoIterator for &'i Table<'a> {
    type Item = (&'i str, &'i Value<'a>);
    type IntoIter = Iter<'i, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator over the key-value pairs of a table.
#[derive(Debug)]
pub struct IntoIter<'a> {
    iter: indexmap::map::IntoIter<Cow<'a, str>, Value<'a>>,
}

impl<'a> Iterator for IntoIter<'a> {
    type Item = (Cow<'a, str>, Value<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

impl<'a> IntoIterator for Table<'a> {
    type Item = (Cow<'a, str>, Value<'a>);
    type IntoIter = IntoIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            iter: self.0.into_iter(),
        }
    }
}
