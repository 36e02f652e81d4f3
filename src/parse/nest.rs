//! Namespace bookkeeping for the statement rules.
//!
//! [`NestedTable`] grows the document tree along dotted key paths.
//! [`Flags`] is a parallel trie over the same paths recording which
//! namespaces were explicitly opened and which are immutable.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::{Array, Table, Value};

/// One part of a (possibly dotted) key.
pub(crate) type Key<'i> = Cow<'i, str>;

/// Raised when a key path runs into something that is not a table (or an
/// array of tables, where descending into those is allowed).
#[derive(Debug)]
pub(crate) struct NestError;

/// The document tree under construction.
pub(crate) struct NestedTable<'i> {
    root: Table<'i>,
}

impl<'i> NestedTable<'i> {
    pub(crate) fn new() -> Self {
        Self { root: Table::new() }
    }

    pub(crate) fn into_table(self) -> Table<'i> {
        self.root
    }

    /// Walk `path`, creating empty tables at missing segments, and return
    /// the table at the end of it.
    ///
    /// When a segment holds an array and `access_lists` is true, descend
    /// into the array's last element. Anything else that is not a table
    /// fails: there is no nest behind that key.
    pub(crate) fn get_or_create_nest(
        &mut self,
        path: &[Key<'i>],
        access_lists: bool,
    ) -> Result<&mut Table<'i>, NestError> {
        let mut nest = &mut self.root;
        for part in path {
            let slot = nest
                .entry(part.clone())
                .or_insert_with(|| Table::new().into());
            nest = match slot {
                Value::Table(table) => table,
                Value::Array(array) if access_lists => match array.last_mut() {
                    Some(Value::Table(table)) => table,
                    _ => return Err(NestError),
                },
                _ => return Err(NestError),
            };
        }
        Ok(nest)
    }

    /// Append a fresh empty table to the array at the end of `path`,
    /// creating a one-element array if nothing is there yet.
    pub(crate) fn append_nest_to_list(&mut self, path: &[Key<'i>]) -> Result<(), NestError> {
        let (last, parents) = path.split_last().expect("header keys are never empty");
        let nest = self.get_or_create_nest(parents, true)?;
        match nest.get_mut(last.as_ref()) {
            None => {
                let mut array = Array::new();
                array.push(Table::new().into());
                nest.insert(last.clone(), array.into());
            }
            Some(Value::Array(array)) => array.push(Table::new().into()),
            Some(_) => return Err(NestError),
        }
        Ok(())
    }
}

/// Per-path annotations, kept out of the value tree.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flag {
    /// The path was opened by a `[header]`, `[[header]]` or dotted key and
    /// may not be re-opened by a `[header]`.
    ExplicitNest,
    /// The path holds an inline value and is recursively immutable.
    Frozen,
}

impl Flag {
    fn bit(self) -> u8 {
        match self {
            Flag::ExplicitNest => 0b01,
            Flag::Frozen => 0b10,
        }
    }
}

#[derive(Default)]
struct Node<'i> {
    flags: u8,
    recursive_flags: u8,
    nested: HashMap<Key<'i>, Node<'i>>,
}

/// A trie mapping key paths to [`Flag`] sets.
///
/// Each node carries a local set and a recursive set; a recursive flag on a
/// node applies to the whole subtree below it. Lookups are O(path length)
/// and clearing a namespace is a single subtree removal.
pub(crate) struct Flags<'i> {
    root: HashMap<Key<'i>, Node<'i>>,
    pending: Vec<(Vec<Key<'i>>, Flag)>,
}

impl<'i> Flags<'i> {
    pub(crate) fn new() -> Self {
        Self {
            root: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Queue a flag to be applied by [`Flags::finalize_pending`].
    ///
    /// Dotted keys mark their intermediate namespaces this way: the marks
    /// must not be visible to the remaining keys of the same table section,
    /// only from the next header on.
    pub(crate) fn add_pending(&mut self, path: Vec<Key<'i>>, flag: Flag) {
        self.pending.push((path, flag));
    }

    pub(crate) fn finalize_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for (path, flag) in pending {
            self.set(&path, flag, false);
        }
    }

    /// Remove all flags at `path` and below. A new array-of-tables element
    /// is a fresh namespace.
    pub(crate) fn unset_all(&mut self, path: &[Key<'i>]) {
        let (last, parents) = match path.split_last() {
            Some(split) => split,
            None => return,
        };
        let mut nodes = &mut self.root;
        for part in parents {
            match nodes.get_mut(part) {
                Some(node) => nodes = &mut node.nested,
                None => return,
            }
        }
        nodes.remove(last);
    }

    /// Set `flag` at `path`, in the recursive set if `recursive`.
    pub(crate) fn set(&mut self, path: &[Key<'i>], flag: Flag, recursive: bool) {
        let (last, parents) = match path.split_last() {
            Some(split) => split,
            None => return,
        };
        let mut nodes = &mut self.root;
        for part in parents {
            nodes = &mut nodes.entry(part.clone()).or_default().nested;
        }
        let node = nodes.entry(last.clone()).or_default();
        if recursive {
            node.recursive_flags |= flag.bit();
        } else {
            node.flags |= flag.bit();
        }
    }

    /// Whether `flag` applies at `path`: set locally or recursively on the
    /// path itself, or recursively on any ancestor.
    pub(crate) fn is(&self, path: &[Key<'i>], flag: Flag) -> bool {
        self.blocking_prefix(path, flag).is_some()
    }

    /// Like [`Flags::is`], but reports how long the prefix that carries the
    /// flag is, so errors can name the namespace that blocks the operation.
    pub(crate) fn blocking_prefix(&self, path: &[Key<'i>], flag: Flag) -> Option<usize> {
        let (last, parents) = path.split_last()?;
        let mut nodes = &self.root;
        for (depth, part) in parents.iter().enumerate() {
            let node = nodes.get(part)?;
            if node.recursive_flags & flag.bit() != 0 {
                return Some(depth + 1);
            }
            nodes = &node.nested;
        }
        let node = nodes.get(last)?;
        if (node.flags | node.recursive_flags) & flag.bit() != 0 {
            Some(path.len())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path<'i>(parts: &[&'i str]) -> Vec<Key<'i>> {
        parts.iter().map(|p| Cow::Borrowed(*p)).collect()
    }

    #[test]
    fn recursive_flags_cover_subtrees() {
        let mut flags = Flags::new();
        flags.set(&path(&["a"]), Flag::Frozen, true);
        assert!(flags.is(&path(&["a"]), Flag::Frozen));
        assert!(flags.is(&path(&["a", "b", "c"]), Flag::Frozen));
        assert!(!flags.is(&path(&["a"]), Flag::ExplicitNest));
        assert!(!flags.is(&path(&["b"]), Flag::Frozen));
        assert_eq!(
            flags.blocking_prefix(&path(&["a", "b", "c"]), Flag::Frozen),
            Some(1)
        );
    }

    #[test]
    fn local_flags_do_not_cover_subtrees() {
        let mut flags = Flags::new();
        flags.set(&path(&["a", "b"]), Flag::ExplicitNest, false);
        assert!(flags.is(&path(&["a", "b"]), Flag::ExplicitNest));
        assert!(!flags.is(&path(&["a"]), Flag::ExplicitNest));
        assert!(!flags.is(&path(&["a", "b", "c"]), Flag::ExplicitNest));
    }

    #[test]
    fn unset_all_clears_the_subtree() {
        let mut flags = Flags::new();
        flags.set(&path(&["a", "b"]), Flag::ExplicitNest, false);
        flags.set(&path(&["a", "b", "c"]), Flag::Frozen, true);
        flags.unset_all(&path(&["a", "b"]));
        assert!(!flags.is(&path(&["a", "b"]), Flag::ExplicitNest));
        assert!(!flags.is(&path(&["a", "b", "c"]), Flag::Frozen));
    }

    #[test]
    fn pending_flags_apply_on_finalize() {
        let mut flags = Flags::new();
        flags.add_pending(path(&["a"]), Flag::ExplicitNest);
        assert!(!flags.is(&path(&["a"]), Flag::ExplicitNest));
        flags.finalize_pending();
        assert!(flags.is(&path(&["a"]), Flag::ExplicitNest));
    }

    #[test]
    fn nest_descends_into_last_list_element() {
        let mut tree = NestedTable::new();
        tree.append_nest_to_list(&path(&["arr"])).unwrap();
        tree.get_or_create_nest(&path(&["arr", "sub"]), true)
            .unwrap()
            .insert("x", Value::Integer(1));
        tree.append_nest_to_list(&path(&["arr"])).unwrap();

        let table = tree.into_table();
        let arr = table.get("arr").unwrap().as_array().unwrap();
        assert_eq!(arr.len(), 2);
        let first = arr.get(0).unwrap().as_table().unwrap();
        assert!(first.get("sub").is_some());
        assert!(arr.get(1).unwrap().as_table().unwrap().is_empty());
    }

    #[test]
    fn nest_refuses_non_tables() {
        let mut tree = NestedTable::new();
        tree.get_or_create_nest(&path(&["t"]), true)
            .unwrap()
            .insert("x", Value::Integer(1));
        assert!(tree.get_or_create_nest(&path(&["t", "x"]), true).is_err());
        assert!(tree.append_nest_to_list(&path(&["t", "x"])).is_err());
    }
}
