//! Tag → decode-rule table.
//!
//! The set of tags is fixed, so each rule is a variant of the closed [`Rule`]
//! enum and the decoder matches on it. The table itself is built once, on
//! first use, and is read-only afterwards; [`DispatchTable::global`] hands out
//! a shared reference that any number of decode calls can use at once.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// How an element's content becomes a [`Value`](crate::Value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Text content as a string; empty if absent.
    Text,
    /// Base64 text → binary.
    Binary,
    /// `true` only for the exact text `"true"`.
    Boolean,
    /// Text wrapped as code; empty if absent.
    Code,
    /// Float milliseconds since the Unix epoch → UTC timestamp.
    Date,
    /// Base-10 integer.
    Int,
    /// Floating point number.
    Number,
    /// Always null; text is ignored.
    Null,
    /// 24 hex digits → object id.
    ObjectId,
    /// Children keyed by their `name` attribute → nested document.
    Document,
    /// Children keyed by index → dense array with null padding.
    Array,
    /// Two children: collection, id.
    Reference,
    /// Two children: pattern, options.
    Regex,
    /// Flag letters → regex option bits.
    Options,
}

/// Every recognised tag and its rule.
pub const TAGS: [(&str, Rule); 16] = [
    ("string", Rule::Text),
    ("ns", Rule::Text),
    ("pattern", Rule::Text),
    ("binary", Rule::Binary),
    ("boolean", Rule::Boolean),
    ("code", Rule::Code),
    ("date", Rule::Date),
    ("int", Rule::Int),
    ("number", Rule::Number),
    ("null", Rule::Null),
    ("oid", Rule::ObjectId),
    ("doc", Rule::Document),
    ("array", Rule::Array),
    ("ref", Rule::Reference),
    ("regex", Rule::Regex),
    ("options", Rule::Options),
];

static GLOBAL: Lazy<DispatchTable> = Lazy::new(DispatchTable::build);

/// Immutable mapping from element tag to [`Rule`].
#[derive(Debug)]
pub struct DispatchTable {
    rules: HashMap<&'static str, Rule>,
}

impl DispatchTable {
    /// The process-wide table.
    pub fn global() -> &'static DispatchTable {
        &GLOBAL
    }

    fn build() -> Self {
        Self {
            rules: TAGS.iter().copied().collect(),
        }
    }

    /// Rule for `tag`, or `None` if the tag is not part of the grammar.
    pub fn lookup(&self, tag: &str) -> Option<Rule> {
        self.rules.get(tag).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }
}
