//! Schema nodes describing the wire shape of a [`Value`].
//!
//! [`Value`]: crate::value::Value

use std::fmt;

/// The kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Null,
    Bool,
    Integer,
    BigInt,
    String,
    Bytes,
    Array,
    Map,
    Struct,
    Document,
}

impl SchemaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaKind::Null => "null",
            SchemaKind::Bool => "bool",
            SchemaKind::Integer => "integer",
            SchemaKind::BigInt => "bigint",
            SchemaKind::String => "string",
            SchemaKind::Bytes => "bytes",
            SchemaKind::Array => "array",
            SchemaKind::Map => "map",
            SchemaKind::Struct => "struct",
            SchemaKind::Document => "document",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema tree node.
///
/// A `Struct` is written as a document whose fields are described by the
/// node. A `Document` is opaque: its entries are already encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    Null,
    Bool,
    Integer,
    BigInt,
    String,
    Bytes,
    Array { values: Box<Schema> },
    Map { keys: Box<Schema>, values: Box<Schema> },
    Struct { fields: Vec<(String, Schema)> },
    Document,
}

impl Schema {
    pub fn array(values: Schema) -> Self {
        Schema::Array {
            values: Box::new(values),
        }
    }

    pub fn map(keys: Schema, values: Schema) -> Self {
        Schema::Map {
            keys: Box::new(keys),
            values: Box::new(values),
        }
    }

    /// Build a struct node from `(label, schema)` pairs, keeping their order.
    pub fn structure<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Schema::Struct {
            fields: fields.into_iter().map(|(k, s)| (k.into(), s)).collect(),
        }
    }

    pub fn kind(&self) -> SchemaKind {
        match self {
            Schema::Null => SchemaKind::Null,
            Schema::Bool => SchemaKind::Bool,
            Schema::Integer => SchemaKind::Integer,
            Schema::BigInt => SchemaKind::BigInt,
            Schema::String => SchemaKind::String,
            Schema::Bytes => SchemaKind::Bytes,
            Schema::Array { .. } => SchemaKind::Array,
            Schema::Map { .. } => SchemaKind::Map,
            Schema::Struct { .. } => SchemaKind::Struct,
            Schema::Document => SchemaKind::Document,
        }
    }

    /// Whether values of this kind are rewritten before writing when they
    /// appear inside an array or map.
    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            Schema::Array { .. } | Schema::Map { .. } | Schema::Struct { .. } | Schema::Bytes
        )
    }

    /// Field schema of a struct node.
    pub fn field(&self, label: &str) -> Option<&Schema> {
        match self {
            Schema::Struct { fields } => fields.iter().find(|(l, _)| l == label).map(|(_, s)| s),
            _ => None,
        }
    }

    /// Fields of a struct node, empty for every other kind.
    pub fn fields(&self) -> &[(String, Schema)] {
        match self {
            Schema::Struct { fields } => fields,
            _ => &[],
        }
    }
}
