//! Packed wire encoding for schema-described values.
//!
//! Items are deterministic CBOR (RFC 8949 Core Deterministic Encoding):
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - Map keys sorted by encoded byte comparison
//! - Big integers are byte strings holding the minimal big-endian magnitude
//!
//! A document is a map from text label to a byte string holding that field's
//! own encoded item, so every field can be parsed on its own. A pack (what a
//! [`Writer`] finishes into) is a definite-length array of items; a framed
//! block is a finished pack embedded as a byte string.

use ciborium::value::Value as Item;
use primitive_types::U256;
use std::collections::{BTreeMap, VecDeque};
use std::io::Cursor;

use crate::error::{CodecError, Result};
use crate::schema::Schema;
use crate::value::Value;

/// CBOR major types used by the encoder.
mod major {
    pub const UINT: u8 = 0;
    pub const NINT: u8 = 1;
    pub const BYTES: u8 = 2;
    pub const TEXT: u8 = 3;
    pub const ARRAY: u8 = 4;
    pub const MAP: u8 = 5;
}

const FALSE: u8 = 0xf4;
const TRUE: u8 = 0xf5;
const NULL: u8 = 0xf6;

/// Encode a value under a schema.
pub fn encode_value(value: &Value, schema: &Schema) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value, schema)?;
    Ok(buf)
}

/// Decode a single item under a schema. Trailing bytes are rejected.
pub fn decode_value(bytes: &[u8], schema: &Schema) -> Result<Value> {
    let item = parse_item(bytes)?;
    value_from_item(&item, schema)
}

/// Encode a label-to-value mapping as a document under the given fields.
///
/// Labels absent from `entries` are omitted. Labels not described by
/// `fields` are rejected.
pub fn encode_document(
    entries: &BTreeMap<String, Value>,
    fields: &[(String, Schema)],
) -> Result<Document> {
    if let Some(unknown) = entries
        .keys()
        .find(|label| !fields.iter().any(|(l, _)| l == *label))
    {
        return Err(CodecError::EncodingError(format!(
            "field '{}' is not described by the schema",
            unknown
        )));
    }

    let mut doc = Document::new();
    for (label, schema) in fields {
        if let Some(value) = entries.get(label) {
            doc.insert(label.clone(), encode_value(value, schema)?);
        }
    }
    Ok(doc)
}

/// Decode the bytes of a document into its raw entries.
pub fn decode_document(bytes: &[u8]) -> Result<Document> {
    let item = parse_item(bytes)?;
    document_from_item(&item)
}

/// An encoded document: field labels mapped to encoded field items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    entries: BTreeMap<String, Vec<u8>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw_data(entries: BTreeMap<String, Vec<u8>>) -> Self {
        Self { entries }
    }

    /// Set the encoded item for a label.
    pub fn insert(&mut self, label: impl Into<String>, encoded: Vec<u8>) {
        self.entries.insert(label.into(), encoded);
    }

    /// The encoded item stored under a label.
    pub fn get(&self, label: &str) -> Option<&[u8]> {
        self.entries.get(label).map(Vec::as_slice)
    }

    /// Decode the field stored under `label`, if present.
    pub fn decode_field(&self, label: &str, schema: &Schema) -> Result<Option<Value>> {
        self.get(label)
            .map(|raw| decode_value(raw, schema))
            .transpose()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The wire bytes of the document.
    pub fn bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_document_entries(&mut buf, &self.entries);
        buf
    }

    /// The label-to-encoded-item entries.
    pub fn raw_data(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.entries
    }

    pub fn into_raw_data(self) -> BTreeMap<String, Vec<u8>> {
        self.entries
    }
}

/// Sequential writer producing a pack of items.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
    count: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_integer(&mut self, n: u64) {
        encode_uint(&mut self.buf, major::UINT, n);
        self.count += 1;
    }

    pub fn write_string(&mut self, s: &str) {
        encode_text(&mut self.buf, s);
        self.count += 1;
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        encode_bytes(&mut self.buf, bytes);
        self.count += 1;
    }

    pub fn write_bool(&mut self, b: bool) {
        self.buf.push(if b { TRUE } else { FALSE });
        self.count += 1;
    }

    /// Write a value under a schema. Nothing is written on failure.
    pub fn write_value(&mut self, value: &Value, schema: &Schema) -> Result<()> {
        let encoded = encode_value(value, schema)?;
        self.buf.extend_from_slice(&encoded);
        self.count += 1;
        Ok(())
    }

    /// Write an independently built writer as a length-prefixed block.
    pub fn write_framed(&mut self, child: Writer) {
        let bytes = child.finish();
        self.write_bytes(&bytes);
    }

    /// Number of items written so far.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Finish the pack.
    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.buf.len() + 9);
        encode_uint(&mut out, major::ARRAY, self.count as u64);
        out.extend_from_slice(&self.buf);
        out
    }
}

/// Sequential reader over a finished pack.
#[derive(Debug)]
pub struct Reader {
    items: VecDeque<Item>,
}

impl Reader {
    /// Parse a pack.
    pub fn new(bytes: &[u8]) -> Result<Self> {
        match parse_item(bytes)? {
            Item::Array(items) => Ok(Self {
                items: items.into(),
            }),
            other => Err(CodecError::DecodingError(format!(
                "expected pack, found {}",
                item_name(&other)
            ))),
        }
    }

    pub fn read_integer(&mut self) -> Result<u64> {
        match self.next("integer")? {
            Item::Integer(i) => u64::try_from(i128::from(i))
                .map_err(|_| CodecError::DecodingError("integer out of range".into())),
            other => Err(unexpected("integer", &other)),
        }
    }

    pub fn read_string(&mut self) -> Result<String> {
        match self.next("string")? {
            Item::Text(s) => Ok(s),
            other => Err(unexpected("string", &other)),
        }
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        match self.next("bytes")? {
            Item::Bytes(b) => Ok(b),
            other => Err(unexpected("bytes", &other)),
        }
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.next("bool")? {
            Item::Bool(b) => Ok(b),
            other => Err(unexpected("bool", &other)),
        }
    }

    /// Read a length-prefixed block as its own pack.
    pub fn read_framed(&mut self) -> Result<Reader> {
        let bytes = self.read_bytes()?;
        Reader::new(&bytes)
    }

    pub fn read_value(&mut self, schema: &Schema) -> Result<Value> {
        let item = self.next(schema.kind().as_str())?;
        value_from_item(&item, schema)
    }

    /// Number of unread items.
    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn next(&mut self, expected: &str) -> Result<Item> {
        self.items
            .pop_front()
            .ok_or_else(|| CodecError::DecodingError(format!("pack exhausted, expected {}", expected)))
    }
}

/// Recursively encode a value under its schema.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value, schema: &Schema) -> Result<()> {
    match (schema, value) {
        // Any field may be explicitly null
        (_, Value::Null) => buf.push(NULL),
        (Schema::Bool, Value::Bool(b)) => buf.push(if *b { TRUE } else { FALSE }),
        (Schema::Integer, Value::Integer(n)) => encode_integer(buf, *n)?,
        (Schema::Integer, Value::BigInt(n)) if n.bits() <= 64 => {
            encode_uint(buf, major::UINT, n.low_u64())
        }
        (Schema::BigInt, Value::Integer(_) | Value::BigInt(_)) => {
            let n = value.as_u256().ok_or_else(|| {
                CodecError::EncodingError("bigint must be non-negative".into())
            })?;
            encode_bignum(buf, &n);
        }
        (Schema::String, Value::String(s)) => encode_text(buf, s),
        (Schema::Bytes, Value::Bytes(b)) => encode_bytes(buf, b),
        (Schema::Array { values }, Value::Array(items)) => {
            encode_uint(buf, major::ARRAY, items.len() as u64);
            for item in items {
                encode_value_to(buf, item, values)?;
            }
        }
        (Schema::Map { keys, values }, Value::Map(entries)) => {
            encode_map_canonical(buf, entries, keys, values)?
        }
        (Schema::Struct { fields }, Value::Struct(entries)) => {
            let doc = encode_document(entries, fields)?;
            encode_document_entries(buf, &doc.entries);
        }
        // Pre-encoded documents stand in for structs
        (Schema::Struct { .. } | Schema::Document, Value::Document(entries)) => {
            encode_document_entries(buf, entries)
        }
        _ => {
            return Err(CodecError::EncodingError(format!(
                "cannot encode {} as {}",
                value.kind_name(),
                schema.kind()
            )))
        }
    }
    Ok(())
}

/// Encode an integer in the CBOR range (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, n: i128) -> Result<()> {
    let out_of_range = || CodecError::EncodingError(format!("integer {} out of range", n));
    if n >= 0 {
        encode_uint(buf, major::UINT, u64::try_from(n).map_err(|_| out_of_range())?);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = u64::try_from(-1 - n).map_err(|_| out_of_range())?;
        encode_uint(buf, major::NINT, abs);
    }
    Ok(())
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a big integer as its minimal big-endian magnitude.
fn encode_bignum(buf: &mut Vec<u8>, n: &U256) {
    let mut be = [0u8; 32];
    n.to_big_endian(&mut be);
    let start = be.iter().position(|b| *b != 0).unwrap_or(be.len());
    encode_bytes(buf, &be[start..]);
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, major::BYTES, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, major::TEXT, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(
    buf: &mut Vec<u8>,
    entries: &[(Value, Value)],
    keys: &Schema,
    values: &Schema,
) -> Result<()> {
    let mut pairs = entries
        .iter()
        .map(|(k, v)| Ok((encode_value(k, keys)?, encode_value(v, values)?)))
        .collect::<Result<Vec<_>>>()?;

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    if pairs.windows(2).any(|w| w[0].0 == w[1].0) {
        return Err(CodecError::EncodingError("duplicate map key".into()));
    }

    encode_uint(buf, major::MAP, pairs.len() as u64);
    for (key, value) in pairs {
        buf.extend_from_slice(&key);
        buf.extend_from_slice(&value);
    }
    Ok(())
}

/// Encode document entries: text labels to byte strings, canonically sorted.
fn encode_document_entries(buf: &mut Vec<u8>, entries: &BTreeMap<String, Vec<u8>>) {
    let mut pairs: Vec<(Vec<u8>, &Vec<u8>)> = entries
        .iter()
        .map(|(label, encoded)| {
            let mut key = Vec::with_capacity(label.len() + 1);
            encode_text(&mut key, label);
            (key, encoded)
        })
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, major::MAP, pairs.len() as u64);
    for (key, encoded) in pairs {
        buf.extend_from_slice(&key);
        encode_bytes(buf, encoded);
    }
}

/// Parse exactly one item.
fn parse_item(bytes: &[u8]) -> Result<Item> {
    let mut cursor = Cursor::new(bytes);
    let item: Item = ciborium::from_reader(&mut cursor)
        .map_err(|e| CodecError::DecodingError(e.to_string()))?;

    let consumed = cursor.position() as usize;
    if consumed != bytes.len() {
        return Err(CodecError::DecodingError(format!(
            "{} trailing bytes",
            bytes.len() - consumed
        )));
    }
    Ok(item)
}

/// Convert a parsed item back to a value under its schema.
fn value_from_item(item: &Item, schema: &Schema) -> Result<Value> {
    match (schema, item) {
        (_, Item::Null) => Ok(Value::Null),
        (Schema::Bool, Item::Bool(b)) => Ok(Value::Bool(*b)),
        (Schema::Integer, Item::Integer(i)) => Ok(Value::Integer(i128::from(*i))),
        (Schema::BigInt, Item::Bytes(b)) => {
            if b.len() > 32 {
                return Err(CodecError::DecodingError(format!(
                    "bigint magnitude of {} bytes exceeds 32",
                    b.len()
                )));
            }
            Ok(Value::BigInt(U256::from_big_endian(b)))
        }
        (Schema::BigInt, Item::Integer(i)) => {
            let n = u128::try_from(i128::from(*i))
                .map_err(|_| CodecError::DecodingError("negative bigint".into()))?;
            Ok(Value::BigInt(U256::from(n)))
        }
        (Schema::String, Item::Text(s)) => Ok(Value::String(s.clone())),
        (Schema::Bytes, Item::Bytes(b)) => Ok(Value::Bytes(b.clone())),
        (Schema::Array { values }, Item::Array(items)) => items
            .iter()
            .map(|item| value_from_item(item, values))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        (Schema::Map { keys, values }, Item::Map(entries)) => entries
            .iter()
            .map(|(k, v)| Ok((value_from_item(k, keys)?, value_from_item(v, values)?)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Map),
        (Schema::Struct { fields }, Item::Map(_)) => {
            let doc = document_from_item(item)?;
            if let Some(label) = doc
                .raw_data()
                .keys()
                .find(|label| !fields.iter().any(|(known, _)| known == *label))
            {
                return Err(CodecError::DecodingError(format!(
                    "unknown document field '{}'",
                    label
                )));
            }

            let mut out = BTreeMap::new();
            for (label, field_schema) in fields {
                if let Some(value) = doc.decode_field(label, field_schema)? {
                    out.insert(label.clone(), value);
                }
            }
            Ok(Value::Struct(out))
        }
        (Schema::Document, Item::Map(_)) => {
            Ok(Value::Document(document_from_item(item)?.into_raw_data()))
        }
        _ => Err(unexpected(schema.kind().as_str(), item)),
    }
}

fn document_from_item(item: &Item) -> Result<Document> {
    let entries = match item {
        Item::Map(entries) => entries,
        other => return Err(unexpected("document", other)),
    };

    let mut doc = Document::new();
    for (key, value) in entries {
        match (key, value) {
            (Item::Text(label), Item::Bytes(encoded)) => doc.insert(label.clone(), encoded.clone()),
            _ => {
                return Err(CodecError::DecodingError(
                    "document entries must map text to bytes".into(),
                ))
            }
        }
    }
    Ok(doc)
}

fn unexpected(expected: &str, found: &Item) -> CodecError {
    CodecError::DecodingError(format!("expected {}, found {}", expected, item_name(found)))
}

fn item_name(item: &Item) -> &'static str {
    match item {
        Item::Integer(_) => "integer",
        Item::Bytes(_) => "bytes",
        Item::Float(_) => "float",
        Item::Text(_) => "text",
        Item::Bool(_) => "bool",
        Item::Null => "null",
        Item::Tag(..) => "tag",
        Item::Array(_) => "array",
        Item::Map(_) => "map",
        _ => "unknown item",
    }
}
