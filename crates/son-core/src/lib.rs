//! # son-core
//!
//! Insertion-ordered documents (SON, a BSON-style document model) and a
//! decoder for their typed XML encoding.
//!
//! A [`Document`] behaves like a map from `String` to [`Value`] that also
//! remembers the order keys were first inserted. The XML decoder rebuilds
//! documents from an element grammar where each tag names a value kind
//! (`<int>`, `<string>`, `<array>`, `<doc>`, `<oid>`, `<regex>`, ...).
//!
//! ## Quick start
//!
//! ```rust
//! use son_core::{Document, Value};
//!
//! let xml = r#"<result>
//!   <meta/>
//!   <doc>
//!     <string name="name">Alice</string>
//!     <array name="scores"><int name="0">95</int><int name="2">92</int></array>
//!   </doc>
//! </result>"#;
//!
//! let doc = Document::from_xml(xml).unwrap();
//! assert_eq!(doc.keys().collect::<Vec<_>>(), ["name", "scores"]);
//! assert_eq!(
//!     doc["scores"],
//!     Value::Array(vec![Value::Int(95), Value::Null, Value::Int(92)])
//! );
//! ```
//!
//! ## Modules
//!
//! - [`document`]: `Document`, the ordered container
//! - [`value`]: `Value` and the wrapper kinds (`ObjectId`, `Binary`, ...)
//! - [`dispatch`]: tag → decode-rule table
//! - [`decoder`]: element tree to `Document`
//! - [`xml`]: the `XmlNode` input abstraction and an owned `Element` tree
//! - [`canonical`]: lossy flattening to plain maps and lists (`to_dict`)
//! - [`json`]: JSON rendering
//! - [`error`]: Error types

pub mod canonical;
pub mod decoder;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod json;
mod scan;
pub mod value;
pub mod xml;

pub use canonical::{to_dict, PlainValue};
pub use decoder::{decode_tree, from_xml, from_xml_with, DecodeOptions, Decoder};
pub use dispatch::{DispatchTable, Rule};
pub use document::{Document, Mapping, UpdateSource};
pub use error::{Result, SonError};
pub use json::{plain_to_json, to_json, to_json_string, to_json_string_pretty};
pub use value::{Binary, Code, DbRef, ObjectId, Regex, RegexFlags, Value};
pub use xml::{Element, XmlNode};
