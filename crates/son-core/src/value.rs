//! The value model: every kind a [`Document`] can store.
//!
//! Scalars map onto Rust primitives. The document-database kinds that have no
//! Rust primitive counterpart (binary blobs, object ids, references, code,
//! regular expressions) get small immutable wrapper types.

use std::fmt;

use base64::Engine;
use chrono::NaiveDateTime;

use crate::document::Document;
use crate::error::{Result, SonError};

/// A single storable value.
///
/// Integers and floats are kept apart. Dates are naive timestamps that are
/// always interpreted as UTC.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Binary(Binary),
    Array(Vec<Value>),
    Document(Document),
    DateTime(NaiveDateTime),
    Regex(Regex),
    ObjectId(ObjectId),
    DbRef(DbRef),
    Code(Code),
}

impl Value {
    /// Short lowercase name of the value kind, matching the XML tag that
    /// produces it where one exists.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "int",
            Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Array(_) => "array",
            Value::Document(_) => "doc",
            Value::DateTime(_) => "date",
            Value::Regex(_) => "regex",
            Value::ObjectId(_) => "oid",
            Value::DbRef(_) => "ref",
            Value::Code(_) => "code",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Binary(bin) => write!(f, "Binary({:?})", bin.to_base64()),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Document(doc) => write!(f, "{doc}"),
            Value::DateTime(dt) => write!(f, "DateTime({})", dt.format("%Y-%m-%dT%H:%M:%S%.3f")),
            Value::Regex(re) => write!(f, "Regex({:?}, {:?})", re.pattern, re.flags.to_letters()),
            Value::ObjectId(oid) => write!(f, "ObjectId({:?})", oid.to_hex()),
            Value::DbRef(r) => write!(f, "DBRef({:?}, {})", r.collection, r.id),
            Value::Code(code) => write!(f, "Code({:?})", code.as_str()),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => String,
    &str => String,
    Binary => Binary,
    Vec<Value> => Array,
    Document => Document,
    NaiveDateTime => DateTime,
    Regex => Regex,
    ObjectId => ObjectId,
    DbRef => DbRef,
    Code => Code,
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Opaque binary payload. Subtype 0 is the generic subtype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Binary {
    bytes: Vec<u8>,
    subtype: u8,
}

impl Binary {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self::with_subtype(bytes, 0)
    }

    pub fn with_subtype(bytes: impl Into<Vec<u8>>, subtype: u8) -> Self {
        Self {
            bytes: bytes.into(),
            subtype,
        }
    }

    /// Decode standard base64 text. ASCII whitespace (line breaks included)
    /// is ignored.
    pub fn from_base64(text: &str) -> Result<Self> {
        let compact: String = text.split_ascii_whitespace().collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map(Self::new)
            .map_err(|e| SonError::malformed("binary", text, e.to_string()))
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn subtype(&self) -> u8 {
        self.subtype
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// A 12-byte object identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub const LEN: usize = 12;

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Parse 24 hex digits (either case). Surrounding whitespace is ignored.
    pub fn from_hex(text: &str) -> Result<Self> {
        let hex = text.trim();
        if hex.len() != Self::LEN * 2 {
            return Err(SonError::malformed(
                "oid",
                text,
                format!("expected {} hex digits, got {}", Self::LEN * 2, hex.len()),
            ));
        }
        let mut out = [0u8; 12];
        let digits = hex.as_bytes();
        for (i, slot) in out.iter_mut().enumerate() {
            let hi = hex_digit(digits[2 * i]);
            let lo = hex_digit(digits[2 * i + 1]);
            match (hi, lo) {
                (Some(hi), Some(lo)) => *slot = (hi << 4) | lo,
                _ => return Err(SonError::malformed("oid", text, "invalid hex digit")),
            }
        }
        Ok(Self(out))
    }

    pub fn to_hex(&self) -> String {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut out = String::with_capacity(Self::LEN * 2);
        for b in self.0 {
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0f) as usize] as char);
        }
        out
    }

    pub fn bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A reference to a document in another collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DbRef {
    pub collection: String,
    pub id: Box<Value>,
}

impl DbRef {
    pub fn new(collection: impl Into<String>, id: impl Into<Value>) -> Self {
        Self {
            collection: collection.into(),
            id: Box::new(id.into()),
        }
    }
}

/// A source-code snippet stored as a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Code(String);

impl Code {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Code {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

bitflags::bitflags! {
    /// Regular-expression option bits. The numeric values are fixed so that
    /// stored masks stay stable across versions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RegexFlags: u32 {
        const IGNORE_CASE = 2;
        const LOCALE = 4;
        const MULTILINE = 8;
        const DOT_ALL = 16;
        const UNICODE = 32;
        const VERBOSE = 64;
    }
}

const FLAG_LETTERS: [(char, RegexFlags); 6] = [
    ('i', RegexFlags::IGNORE_CASE),
    ('l', RegexFlags::LOCALE),
    ('m', RegexFlags::MULTILINE),
    ('s', RegexFlags::DOT_ALL),
    ('u', RegexFlags::UNICODE),
    ('x', RegexFlags::VERBOSE),
];

impl RegexFlags {
    /// Build a mask from single-letter options such as `"im"`.
    /// Unknown letters are ignored.
    pub fn from_letters(letters: &str) -> Self {
        let mut flags = RegexFlags::empty();
        for (letter, flag) in FLAG_LETTERS {
            if letters.contains(letter) {
                flags |= flag;
            }
        }
        flags
    }

    /// Letters for the set bits, in canonical `ilmsux` order.
    pub fn to_letters(self) -> String {
        FLAG_LETTERS
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(letter, _)| *letter)
            .collect()
    }
}

/// A regular expression kept as source text plus option bits. It is never
/// compiled here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Regex {
    pub pattern: String,
    pub flags: RegexFlags,
}

impl Regex {
    pub fn new(pattern: impl Into<String>, flags: RegexFlags) -> Self {
        Self {
            pattern: pattern.into(),
            flags,
        }
    }
}
