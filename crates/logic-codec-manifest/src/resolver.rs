//! Schema resolution: type descriptors to schema trees.
//!
//! Descriptors follow the manifest grammar:
//! - scalars: `bool`, `string`, `bytes`, `address`, `u8`..`u64`, `i8`..`i64`,
//!   `u128`, `u256`, `i128`, `i256`, `bigint`, `ptr`, `null`
//! - arrays: `[]T`, `[N]T` or `array<T>`
//! - maps: `map[K]V` or `map<K,V>`
//! - classes: any other identifier naming a class element
//!
//! Class references are resolved through the element table. A class that
//! reaches itself is rejected instead of recursing forever.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use logic_codec_core::{CodecError, Result, Schema};

use crate::manifest::{Class, Element, ElementData, Event, Routine, TypeField};

/// Lookup tables over a manifest's elements.
#[derive(Debug, Default)]
pub struct ElementTable {
    elements: HashMap<u64, Element>,
    routines: HashMap<String, u64>,
    events: HashMap<String, u64>,
    classes: HashMap<String, u64>,
}

impl ElementTable {
    /// Index elements by ptr, and routines, events and classes by name.
    ///
    /// When two elements share a name the first one wins.
    pub fn new(elements: &[Element]) -> Self {
        let mut table = Self::default();
        for element in elements {
            let by_name = match &element.data {
                ElementData::Routine(r) | ElementData::Method(r) => Some((&mut table.routines, &r.name)),
                ElementData::Event(e) => Some((&mut table.events, &e.name)),
                ElementData::Class(c) => Some((&mut table.classes, &c.name)),
                _ => None,
            };
            if let Some((index, name)) = by_name {
                index.entry(name.clone()).or_insert(element.ptr);
            }
            table.elements.entry(element.ptr).or_insert_with(|| element.clone());
        }
        table
    }

    pub fn get(&self, ptr: u64) -> Option<&Element> {
        self.elements.get(&ptr)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// A routine or method by name.
    pub fn routine(&self, name: &str) -> Option<&Routine> {
        let ptr = self.routines.get(name)?;
        match &self.get(*ptr)?.data {
            ElementData::Routine(r) | ElementData::Method(r) => Some(r),
            _ => None,
        }
    }

    pub fn event(&self, name: &str) -> Option<&Event> {
        let ptr = self.events.get(name)?;
        match &self.get(*ptr)?.data {
            ElementData::Event(e) => Some(e),
            _ => None,
        }
    }

    pub fn class_ptr(&self, name: &str) -> Option<u64> {
        self.classes.get(name).copied()
    }

    pub fn class(&self, ptr: u64) -> Option<&Class> {
        match &self.get(ptr)?.data {
            ElementData::Class(c) => Some(c),
            _ => None,
        }
    }
}

/// A parsed type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Scalar(Schema),
    Array(Box<TypeDescriptor>),
    Map(Box<TypeDescriptor>, Box<TypeDescriptor>),
    Class(String),
}

impl FromStr for TypeDescriptor {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let unsupported = || CodecError::UnsupportedType(format!("unsupported type '{}'", s));

        if let Some(rest) = s.strip_prefix('[') {
            let close = rest.find(']').ok_or_else(unsupported)?;
            if !rest[..close].bytes().all(|b| b.is_ascii_digit()) {
                return Err(unsupported());
            }
            return Ok(TypeDescriptor::Array(Box::new(rest[close + 1..].parse()?)));
        }
        if let Some(inner) = generic(s, "array") {
            return Ok(TypeDescriptor::Array(Box::new(inner.parse()?)));
        }
        if let Some(rest) = s.strip_prefix("map[") {
            let close = closing_bracket(rest).ok_or_else(unsupported)?;
            let key = rest[..close].parse()?;
            let value = rest[close + 1..].parse()?;
            return Ok(TypeDescriptor::Map(Box::new(key), Box::new(value)));
        }
        if let Some(inner) = generic(s, "map") {
            let (key, value) = split_top_level(inner).ok_or_else(unsupported)?;
            return Ok(TypeDescriptor::Map(
                Box::new(key.parse()?),
                Box::new(value.parse()?),
            ));
        }
        if let Some(schema) = scalar(s) {
            return Ok(TypeDescriptor::Scalar(schema));
        }
        if is_identifier(s) {
            return Ok(TypeDescriptor::Class(s.to_string()));
        }
        Err(unsupported())
    }
}

fn scalar(s: &str) -> Option<Schema> {
    Some(match s {
        "null" => Schema::Null,
        "bool" => Schema::Bool,
        "string" => Schema::String,
        "bytes" | "address" => Schema::Bytes,
        "ptr" | "u8" | "u16" | "u32" | "u64" | "i8" | "i16" | "i32" | "i64" => Schema::Integer,
        "u128" | "u256" | "i128" | "i256" | "bigint" => Schema::BigInt,
        _ => return None,
    })
}

fn generic<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?.strip_prefix('<')?.strip_suffix('>')
}

/// Index of the `]` closing an already opened `[`.
fn closing_bracket(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split `K,V` at the first comma outside any brackets.
fn split_top_level(s: &str) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '<' | '[' => depth += 1,
            '>' | ']' => depth -= 1,
            ',' if depth == 0 => return Some((&s[..i], &s[i + 1..])),
            _ => {}
        }
    }
    None
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Resolves field sets and type descriptors against an element table.
#[derive(Debug, Clone)]
pub struct SchemaResolver {
    table: Arc<ElementTable>,
    max_depth: usize,
}

impl SchemaResolver {
    pub fn new(table: Arc<ElementTable>, max_depth: usize) -> Self {
        Self { table, max_depth }
    }

    /// Resolve a field set into a struct schema keyed by label, in
    /// declaration order.
    pub fn resolve_fields(&self, fields: &[TypeField]) -> Result<Schema> {
        self.fields_schema(fields, &mut HashSet::new(), 0)
    }

    /// Resolve a single type descriptor.
    pub fn resolve_type(&self, descriptor: &str) -> Result<Schema> {
        let descriptor: TypeDescriptor = descriptor.parse()?;
        self.resolve(&descriptor, &mut HashSet::new(), 0)
    }

    fn fields_schema(
        &self,
        fields: &[TypeField],
        visiting: &mut HashSet<u64>,
        depth: usize,
    ) -> Result<Schema> {
        check_slots(fields)?;

        let mut resolved = Vec::with_capacity(fields.len());
        for field in fields {
            let descriptor: TypeDescriptor = field.ty.parse()?;
            resolved.push((
                field.label.clone(),
                self.resolve(&descriptor, visiting, depth + 1)?,
            ));
        }
        Ok(Schema::Struct { fields: resolved })
    }

    fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        visiting: &mut HashSet<u64>,
        depth: usize,
    ) -> Result<Schema> {
        if depth > self.max_depth {
            return Err(CodecError::UnsupportedType(format!(
                "type nesting exceeds depth {}",
                self.max_depth
            )));
        }

        match descriptor {
            TypeDescriptor::Scalar(schema) => Ok(schema.clone()),
            TypeDescriptor::Array(values) => {
                Ok(Schema::array(self.resolve(values, visiting, depth + 1)?))
            }
            TypeDescriptor::Map(keys, values) => Ok(Schema::map(
                self.resolve(keys, visiting, depth + 1)?,
                self.resolve(values, visiting, depth + 1)?,
            )),
            TypeDescriptor::Class(name) => {
                let ptr = self.table.class_ptr(name).ok_or_else(|| {
                    CodecError::UnsupportedType(format!("unknown type '{}'", name))
                })?;
                let class = self.table.class(ptr).ok_or_else(|| {
                    CodecError::UnsupportedType(format!("element {} is not a class", ptr))
                })?;
                if !visiting.insert(ptr) {
                    return Err(CodecError::UnsupportedType(format!(
                        "cyclic reference to class '{}'",
                        name
                    )));
                }

                let schema = self.fields_schema(&class.fields, visiting, depth);
                visiting.remove(&ptr);
                schema
            }
        }
    }
}

/// Slots must be dense `0..N-1` in declaration order, labels unique.
fn check_slots(fields: &[TypeField]) -> Result<()> {
    let mut labels = HashSet::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        if field.slot != i as u64 {
            return Err(CodecError::InvalidArgument(format!(
                "field '{}' has slot {}, expected {}",
                field.label, field.slot, i
            )));
        }
        if !labels.insert(field.label.as_str()) {
            return Err(CodecError::InvalidArgument(format!(
                "duplicate field label '{}'",
                field.label
            )));
        }
    }
    Ok(())
}
