//! Flattening of a document tree into plain, unordered containers.
//!
//! [`to_dict`] rewrites every [`Document`] into a `HashMap` and every array
//! into a `Vec`, recursing through arrays so documents nested inside them are
//! converted too. Scalars, including the wrapper kinds, are carried over
//! unchanged.
//!
//! The conversion is lossy: `HashMap` has no key order, so the insertion order
//! of every converted document is gone. Callers that need order must keep the
//! [`Document`].

use std::collections::HashMap;

use crate::document::Document;
use crate::value::Value;

/// A node of a flattened tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PlainValue {
    Map(HashMap<String, PlainValue>),
    List(Vec<PlainValue>),
    /// Any value that is neither a document nor an array.
    Scalar(Value),
}

impl PlainValue {
    pub fn as_map(&self) -> Option<&HashMap<String, PlainValue>> {
        match self {
            PlainValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PlainValue]> {
        match self {
            PlainValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            PlainValue::Scalar(value) => Some(value),
            _ => None,
        }
    }
}

/// Flatten `document` and everything below it. Order is discarded at every
/// level.
pub fn to_dict(document: &Document) -> HashMap<String, PlainValue> {
    document
        .items()
        .map(|(key, value)| (key.to_string(), transform_value(value)))
        .collect()
}

/// Flatten a single value.
pub fn transform_value(value: &Value) -> PlainValue {
    match value {
        Value::Document(doc) => PlainValue::Map(to_dict(doc)),
        Value::Array(items) => PlainValue::List(items.iter().map(transform_value).collect()),
        scalar => PlainValue::Scalar(scalar.clone()),
    }
}

impl Document {
    /// See [`to_dict`].
    pub fn to_dict(&self) -> HashMap<String, PlainValue> {
        to_dict(self)
    }
}
