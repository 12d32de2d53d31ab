//! Insertion-ordered document: the core key → [`Value`] container.
//!
//! A [`Document`] keeps a hash lookup plus an explicit list of keys in the
//! order they were first inserted. Every mutation updates both so that the
//! two never disagree:
//!
//! - `set` on a new key appends to the order list; on an existing key it only
//!   replaces the value, so the key keeps its original position.
//! - `delete`/`pop`/`pop_item` remove the key from both structures, leaving no
//!   gap in the order.
//!
//! Equality between two documents is order-sensitive. Equality against a plain
//! `HashMap<String, Value>` compares contents only.

use std::collections::{hash_map, BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::ops::Index;

use crate::error::{Result, SonError};
use crate::value::Value;

/// An insertion-ordered mapping from `String` keys to [`Value`]s.
#[derive(Clone, Default)]
pub struct Document {
    entries: HashMap<String, Value>,
    order: Vec<String>,
}

/// Any keyed container that can list its keys and look values up by key.
///
/// Used by [`UpdateSource::Mapping`]. Keys are applied in the order
/// `mapping_keys` returns them.
pub trait Mapping {
    fn mapping_keys(&self) -> Vec<String>;
    fn lookup(&self, key: &str) -> Option<&Value>;
}

impl<S: BuildHasher> Mapping for HashMap<String, Value, S> {
    fn mapping_keys(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl Mapping for BTreeMap<String, Value> {
    fn mapping_keys(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl Mapping for Document {
    fn mapping_keys(&self) -> Vec<String> {
        self.order.clone()
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

/// The shapes accepted by [`Document::update`].
pub enum UpdateSource<'a> {
    /// Another document; its pairs are applied in its own order.
    Document(&'a Document),
    /// A generic mapping, read through its key list and lookup.
    Mapping(&'a dyn Mapping),
    /// An explicit sequence of `(key, value)` pairs.
    Pairs(Vec<(String, Value)>),
    /// A dynamically shaped value. Only `Value::Document` and an array of
    /// two-element `[key, value]` arrays with string keys are accepted;
    /// anything else is an [`SonError::ArgumentError`].
    Value(&'a Value),
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
        }
    }

    /// Build a document from `(key, value)` pairs. Later duplicates overwrite
    /// the value but keep the first position.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut doc = Self::new();
        doc.extend(pairs);
        doc
    }

    /// Build a document from a generic mapping, in the mapping's key order.
    pub fn from_map<M: Mapping>(map: &M) -> Result<Self> {
        let mut doc = Self::new();
        doc.update(UpdateSource::Mapping(map))?;
        Ok(doc)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Like [`get`](Self::get) but falls back to `default` for a missing key.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.entries.get(key).unwrap_or(default)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Insert or overwrite. Returns the previous value if the key existed.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.entry(key) {
            hash_map::Entry::Occupied(mut slot) => Some(slot.insert(value)),
            hash_map::Entry::Vacant(slot) => {
                self.order.push(slot.key().clone());
                slot.insert(value);
                None
            }
        }
    }

    /// Return the value for `key`, inserting `default` at the end first if the
    /// key is absent.
    pub fn set_default(&mut self, key: impl Into<String>, default: impl Into<Value>) -> &mut Value {
        match self.entries.entry(key.into()) {
            hash_map::Entry::Occupied(slot) => slot.into_mut(),
            hash_map::Entry::Vacant(slot) => {
                self.order.push(slot.key().clone());
                slot.insert(default.into())
            }
        }
    }

    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.remove_entry(key)
            .map(|_| ())
            .ok_or_else(|| SonError::KeyNotFound(key.to_string()))
    }

    /// Remove `key` and return its value.
    pub fn pop(&mut self, key: &str) -> Result<Value> {
        self.pop_with(key, &[])
    }

    /// Remove `key` and return its value, or `default` if it is absent.
    pub fn pop_or(&mut self, key: &str, default: Value) -> Value {
        self.remove_entry(key).unwrap_or(default)
    }

    /// General form of `pop` taking zero or one default.
    ///
    /// More than one default is an [`SonError::ArgumentError`], checked before
    /// the document is touched.
    pub fn pop_with(&mut self, key: &str, defaults: &[Value]) -> Result<Value> {
        if defaults.len() > 1 {
            return Err(SonError::ArgumentError(format!(
                "pop expected at most 2 arguments, got {}",
                1 + defaults.len()
            )));
        }
        match self.remove_entry(key) {
            Some(value) => Ok(value),
            None => defaults
                .first()
                .cloned()
                .ok_or_else(|| SonError::KeyNotFound(key.to_string())),
        }
    }

    /// Remove and return the pair at the earliest surviving position.
    pub fn pop_item(&mut self) -> Result<(String, Value)> {
        if self.order.is_empty() {
            return Err(SonError::EmptyContainer);
        }
        let key = self.order.remove(0);
        let value = self
            .entries
            .remove(&key)
            .expect("every ordered key has an entry");
        Ok((key, value))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// New document with the same keys, order and values.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Apply every pair of `source` through [`set`](Self::set), in source
    /// order.
    ///
    /// The source is validated before anything is written, so a rejected
    /// source leaves the document unchanged.
    pub fn update(&mut self, source: UpdateSource<'_>) -> Result<()> {
        match source {
            UpdateSource::Document(other) => {
                for (key, value) in other.iter() {
                    self.set(key, value.clone());
                }
            }
            UpdateSource::Mapping(map) => {
                let mut pairs = Vec::new();
                for key in map.mapping_keys() {
                    let value = map.lookup(&key).cloned().ok_or_else(|| {
                        SonError::ArgumentError(format!(
                            "mapping lists key {key:?} but has no value for it"
                        ))
                    })?;
                    pairs.push((key, value));
                }
                self.extend(pairs);
            }
            UpdateSource::Pairs(pairs) => self.extend(pairs),
            UpdateSource::Value(Value::Document(other)) => {
                return self.update(UpdateSource::Document(other));
            }
            UpdateSource::Value(Value::Array(items)) => {
                let pairs = items
                    .iter()
                    .map(pair_from_value)
                    .collect::<Result<Vec<_>>>()?;
                self.extend(pairs);
            }
            UpdateSource::Value(other) => {
                return Err(SonError::ArgumentError(format!(
                    "cannot update a document from a value of type {}",
                    other.type_name()
                )));
            }
        }
        Ok(())
    }

    /// [`update`](Self::update) followed by named overrides, which are also
    /// applied through `set` and therefore win over the source.
    pub fn update_with<K, V, I>(&mut self, source: Option<UpdateSource<'_>>, overrides: I) -> Result<()>
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        if let Some(source) = source {
            self.update(source)?;
        }
        self.extend(overrides);
        Ok(())
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator + '_ {
        self.order.iter().map(String::as_str)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &Value> + ExactSizeIterator + '_ {
        self.order.iter().map(move |key| &self.entries[key])
    }

    /// Ordered `(key, value)` pairs, aligned with [`keys`](Self::keys).
    pub fn items(&self) -> Iter<'_> {
        Iter {
            order: self.order.iter(),
            entries: &self.entries,
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        self.items()
    }

    fn remove_entry(&mut self, key: &str) -> Option<Value> {
        let value = self.entries.remove(key)?;
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        Some(value)
    }
}

fn pair_from_value(item: &Value) -> Result<(String, Value)> {
    match item {
        Value::Array(pair) if pair.len() == 2 => match &pair[0] {
            Value::String(key) => Ok((key.clone(), pair[1].clone())),
            other => Err(SonError::ArgumentError(format!(
                "pair key must be a string, got {}",
                other.type_name()
            ))),
        },
        other => Err(SonError::ArgumentError(format!(
            "expected a [key, value] pair, got {}",
            other.type_name()
        ))),
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.entries == other.entries
    }
}

impl<S: BuildHasher> PartialEq<HashMap<String, Value, S>> for Document {
    fn eq(&self, other: &HashMap<String, Value, S>) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<S: BuildHasher> PartialEq<Document> for HashMap<String, Value, S> {
    fn eq(&self, other: &Document) -> bool {
        other == self
    }
}

impl Index<&str> for Document {
    type Output = Value;

    /// Panics if `key` is absent; use [`Document::get`] to avoid that.
    fn index(&self, key: &str) -> &Value {
        match self.entries.get(key) {
            Some(value) => value,
            None => panic!("key not found: {key:?}"),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Document {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Owning iterator over a document's pairs in insertion order.
pub struct IntoIter {
    order: std::vec::IntoIter<String>,
    entries: HashMap<String, Value>,
}

impl Iterator for IntoIter {
    type Item = (String, Value);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.order.next()?;
        let value = self
            .entries
            .remove(&key)
            .expect("every ordered key has an entry");
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl ExactSizeIterator for IntoIter {}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = IntoIter;

    fn into_iter(self) -> IntoIter {
        IntoIter {
            order: self.order.into_iter(),
            entries: self.entries,
        }
    }
}

/// Borrowing iterator over a document's pairs in insertion order.
#[derive(Clone)]
pub struct Iter<'a> {
    order: std::slice::Iter<'a, String>,
    entries: &'a HashMap<String, Value>,
}

impl<'a> Iter<'a> {
    fn pair(&self, key: &'a str) -> (&'a str, &'a Value) {
        (key, &self.entries[key])
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.order.next()?;
        Some(self.pair(key))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let key = self.order.next_back()?;
        Some(self.pair(key))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.items()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Document([")?;
        for (i, (key, value)) in self.items().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "({key:?}, {value:?})")?;
        }
        f.write_str("])")
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Document([")?;
        for (i, (key, value)) in self.items().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "({key:?}, {value})")?;
        }
        f.write_str("])")
    }
}
