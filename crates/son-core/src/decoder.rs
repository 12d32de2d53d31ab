//! XML element tree → [`Document`] decoder.
//!
//! The decoder is a plain recursive descent over an already-parsed tree. At
//! each element it looks the tag up in the [`DispatchTable`] and applies the
//! matching [`Rule`]:
//!
//! - scalar rules read the element's text and stop
//! - `doc` and `array` recurse into every child
//! - `ref` and `regex` recurse into exactly two children
//!
//! There is no recovery. The first unknown tag, malformed scalar or
//! grammar-shape violation aborts the whole decode and nothing partial is
//! returned.
//!
//! # Key design decisions
//!
//! - **Tree root**: [`Decoder::decode_tree`] takes the wrapper element and
//!   decodes its *second* child. The first child carries metadata that is not
//!   part of the document.
//! - **Arrays via documents**: an `array` element is first decoded exactly
//!   like a `doc` (keys are the children's `name` attributes), then rebuilt as
//!   a dense `Vec` by parsing each key as an index. Missing indices become
//!   `Null`; repeated indices overwrite.
//! - **Depth limit**: nesting deeper than [`DecodeOptions::max_depth`] is
//!   reported as [`SonError::DepthLimitExceeded`] instead of exhausting the
//!   stack. Text input is checked before parsing, since building the tree
//!   recurses too.

use chrono::DateTime;
use tracing::{debug, trace, warn};

use crate::dispatch::{DispatchTable, Rule};
use crate::document::Document;
use crate::error::{Result, SonError};
use crate::scan;
use crate::value::{Binary, Code, DbRef, ObjectId, Regex, RegexFlags, Value};
use crate::xml::{Element, XmlNode};

/// Limits applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum element nesting below the document root.
    pub max_depth: usize,
    /// Largest array length an `array` element may expand to.
    pub max_array_len: usize,
}

impl DecodeOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 100;
    pub const DEFAULT_MAX_ARRAY_LEN: usize = 1 << 24;

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_array_len(mut self, max_array_len: usize) -> Self {
        self.max_array_len = max_array_len;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_array_len: Self::DEFAULT_MAX_ARRAY_LEN,
        }
    }
}

/// Decodes element trees into documents.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'t> {
    table: &'t DispatchTable,
    options: DecodeOptions,
}

impl Default for Decoder<'static> {
    fn default() -> Self {
        Self::new(DecodeOptions::default())
    }
}

impl Decoder<'static> {
    /// Decoder over the process-wide dispatch table.
    pub fn new(options: DecodeOptions) -> Self {
        Self::with_table(DispatchTable::global(), options)
    }
}

impl<'t> Decoder<'t> {
    pub fn with_table(table: &'t DispatchTable, options: DecodeOptions) -> Self {
        Self { table, options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode a full tree: skip the root's first child (metadata) and decode
    /// the second as a document.
    pub fn decode_tree<N: XmlNode>(&self, root: &N) -> Result<Document> {
        let children = root.children();
        let doc = children.get(1).ok_or_else(|| {
            SonError::MalformedInput(format!(
                "<{}> has {} child element(s); the document root is the second",
                root.tag(),
                children.len()
            ))
        })?;
        debug!(root = root.tag(), doc = doc.tag(), "decoding document tree");
        self.decode_document(doc)
    }

    /// Decode `node`'s children into a document, whatever `node`'s own tag.
    pub fn decode_document<N: XmlNode>(&self, node: &N) -> Result<Document> {
        let doc = self.make_document(node, 0)?;
        debug!(keys = doc.len(), "decoded document");
        Ok(doc)
    }

    /// Decode a single element through its tag's rule.
    pub fn decode_element<N: XmlNode>(&self, node: &N) -> Result<Value> {
        self.make_value(node, 0)
    }

    fn rule_for<N: XmlNode>(&self, node: &N) -> Result<Rule> {
        self.table.lookup(node.tag()).ok_or_else(|| {
            warn!(tag = node.tag(), "unsupported tag");
            SonError::UnsupportedTag(node.tag().to_string())
        })
    }

    fn make_value<N: XmlNode>(&self, node: &N, depth: usize) -> Result<Value> {
        let rule = self.rule_for(node)?;
        trace!(tag = node.tag(), depth, ?rule, "decoding element");
        match rule {
            Rule::Text => Ok(Value::String(make_text(node))),
            Rule::Binary => make_binary(node).map(Value::Binary),
            Rule::Boolean => Ok(Value::Bool(make_boolean(node))),
            Rule::Code => Ok(Value::Code(Code::new(make_text(node)))),
            Rule::Date => make_date(node),
            Rule::Int => make_int(node).map(Value::Int),
            Rule::Number => make_number(node).map(Value::Float),
            Rule::Null => Ok(Value::Null),
            Rule::ObjectId => ObjectId::from_hex(node.text().unwrap_or_default()).map(Value::ObjectId),
            Rule::Document => self.make_document(node, depth).map(Value::Document),
            Rule::Array => self.make_array(node, depth).map(Value::Array),
            Rule::Reference => self.make_ref(node, depth).map(Value::DbRef),
            Rule::Regex => self.make_regex(node, depth).map(Value::Regex),
            Rule::Options => Ok(Value::Int(i64::from(make_options(node).bits()))),
        }
    }

    fn descend(&self, depth: usize) -> Result<usize> {
        let next = depth + 1;
        if next > self.options.max_depth {
            warn!(limit = self.options.max_depth, "nesting depth limit exceeded");
            return Err(SonError::DepthLimitExceeded {
                limit: self.options.max_depth,
            });
        }
        Ok(next)
    }

    fn make_document<N: XmlNode>(&self, node: &N, depth: usize) -> Result<Document> {
        let children = node.children();
        let next = if children.is_empty() { depth } else { self.descend(depth)? };
        let mut doc = Document::with_capacity(children.len());
        for child in &children {
            let key = child.attribute("name").ok_or_else(|| {
                SonError::MalformedInput(format!(
                    "<{}> inside <{}> has no name attribute",
                    child.tag(),
                    node.tag()
                ))
            })?;
            let value = self.make_value(child, next)?;
            doc.set(key, value);
        }
        Ok(doc)
    }

    fn make_array<N: XmlNode>(&self, node: &N, depth: usize) -> Result<Vec<Value>> {
        let doc = self.make_document(node, depth)?;
        let mut items = Vec::with_capacity(doc.len());
        for (key, value) in doc {
            let index: usize = key
                .parse()
                .map_err(|_| SonError::malformed("array", &key, "index is not a base-10 integer"))?;
            if index >= self.options.max_array_len {
                return Err(SonError::malformed(
                    "array",
                    &key,
                    format!("index exceeds the limit of {}", self.options.max_array_len),
                ));
            }
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            items[index] = value;
        }
        Ok(items)
    }

    fn make_ref<N: XmlNode>(&self, node: &N, depth: usize) -> Result<DbRef> {
        let [collection, id] = two_children(node)?;
        let next = self.descend(depth)?;
        let collection = match self.make_value(&collection, next)? {
            Value::String(name) => name,
            other => {
                return Err(SonError::MalformedInput(format!(
                    "<ref> collection must decode to a string, got {}",
                    other.type_name()
                )))
            }
        };
        let id = self.make_value(&id, next)?;
        Ok(DbRef::new(collection, id))
    }

    fn make_regex<N: XmlNode>(&self, node: &N, depth: usize) -> Result<Regex> {
        let [pattern, options] = two_children(node)?;
        let next = self.descend(depth)?;
        let pattern = match self.make_value(&pattern, next)? {
            Value::String(p) => p,
            other => {
                return Err(SonError::MalformedInput(format!(
                    "<regex> pattern must decode to a string, got {}",
                    other.type_name()
                )))
            }
        };
        if self.rule_for(&options)? != Rule::Options {
            return Err(SonError::MalformedInput(format!(
                "<regex> second child must be <options>, got <{}>",
                options.tag()
            )));
        }
        Ok(Regex::new(pattern, make_options(&options)))
    }
}

fn two_children<N: XmlNode>(node: &N) -> Result<[N; 2]> {
    let children = node.children();
    let count = children.len();
    <[N; 2]>::try_from(children).map_err(|_| {
        SonError::MalformedInput(format!(
            "<{}> needs exactly 2 child elements, got {count}",
            node.tag()
        ))
    })
}

fn make_text<N: XmlNode>(node: &N) -> String {
    node.text().unwrap_or_default().to_string()
}

fn make_binary<N: XmlNode>(node: &N) -> Result<Binary> {
    match node.text() {
        Some(text) => Binary::from_base64(text),
        None => Ok(Binary::default()),
    }
}

fn make_boolean<N: XmlNode>(node: &N) -> bool {
    node.text() == Some("true")
}

/// Text of a scalar element that has no meaningful empty form.
fn required_text<'n, N: XmlNode>(node: &'n N, what: &str) -> Result<&'n str> {
    node.text()
        .ok_or_else(|| SonError::malformed(node.tag(), "", format!("missing {what}")))
}

fn make_int<N: XmlNode>(node: &N) -> Result<i64> {
    let text = required_text(node, "integer text")?;
    text.trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| SonError::malformed(node.tag(), text, e.to_string()))
}

fn make_number<N: XmlNode>(node: &N) -> Result<f64> {
    let text = required_text(node, "number text")?;
    text.trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| SonError::malformed(node.tag(), text, e.to_string()))
}

/// Milliseconds since the epoch, rounded to the nearest millisecond.
fn make_date<N: XmlNode>(node: &N) -> Result<Value> {
    let text = required_text(node, "timestamp")?;
    let millis: f64 = text
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| SonError::malformed(node.tag(), text, e.to_string()))?;
    if !millis.is_finite() {
        return Err(SonError::malformed(node.tag(), text, "timestamp is not finite"));
    }
    let rounded = millis.round();
    if rounded < i64::MIN as f64 || rounded > i64::MAX as f64 {
        return Err(SonError::malformed(node.tag(), text, "timestamp out of range"));
    }
    DateTime::from_timestamp_millis(rounded as i64)
        .map(|dt| Value::DateTime(dt.naive_utc()))
        .ok_or_else(|| SonError::malformed(node.tag(), text, "timestamp out of range"))
}

fn make_options<N: XmlNode>(node: &N) -> RegexFlags {
    RegexFlags::from_letters(node.text().unwrap_or_default())
}

/// Decode a full tree (metadata first, document second) with default options.
pub fn decode_tree<N: XmlNode>(root: &N) -> Result<Document> {
    Decoder::default().decode_tree(root)
}

/// Parse XML text and decode it with default options.
pub fn from_xml(xml: &str) -> Result<Document> {
    from_xml_with(xml, DecodeOptions::default())
}

/// Parse XML text and decode it with the given options.
///
/// Nesting is measured on the raw text first, so input deeper than
/// `options.max_depth` fails with [`SonError::DepthLimitExceeded`] before
/// any tree is built.
pub fn from_xml_with(xml: &str, options: DecodeOptions) -> Result<Document> {
    scan::check_depth(xml, options.max_depth)?;
    let tree = roxmltree::Document::parse(xml)?;
    Decoder::new(options).decode_tree(&tree.root_element())
}

impl Document {
    /// Parse an XML-encoded document. See [`from_xml`].
    pub fn from_xml(xml: &str) -> Result<Self> {
        from_xml(xml)
    }

    /// Decode an owned element tree. See [`decode_tree`].
    pub fn from_element(root: &Element) -> Result<Self> {
        decode_tree(&root)
    }
}
