//! Logic manifests: the declarative description of an on-chain program.
//!
//! A manifest is an ordered list of elements addressed by `ptr`. Each element
//! carries a kind-specific payload; kind and payload are one closed variant,
//! so a payload can never disagree with its kind.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use logic_codec_core::{CodecError, Result, Value};

/// A logic manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest syntax version.
    pub syntax: u64,
    /// Execution engine descriptor.
    pub engine: EngineDescriptor,
    /// Elements in declaration order.
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Manifest {
    /// Load a manifest from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CodecError::DecodingError(e.to_string()))
    }

    /// Render the manifest as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CodecError::EncodingError(e.to_string()))
    }

    /// Look up an element by ptr.
    pub fn element(&self, ptr: u64) -> Option<&Element> {
        self.elements.iter().find(|e| e.ptr == ptr)
    }
}

/// The engine a manifest targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDescriptor {
    pub kind: String,
    #[serde(default)]
    pub flags: Vec<String>,
}

impl EngineDescriptor {
    pub fn to_value(&self) -> Value {
        Value::structure([
            ("kind", Value::from(self.kind.as_str())),
            ("flags", strings_value(&self.flags)),
        ])
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            kind: string_field(value, "kind")?,
            flags: strings_field(value, "flags")?,
        })
    }
}

/// The kind of a manifest element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Constant,
    Typedef,
    Class,
    Method,
    Routine,
    Event,
    State,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Constant => "constant",
            ElementKind::Typedef => "typedef",
            ElementKind::Class => "class",
            ElementKind::Method => "method",
            ElementKind::Routine => "routine",
            ElementKind::Event => "event",
            ElementKind::State => "state",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "constant" => Ok(ElementKind::Constant),
            "typedef" => Ok(ElementKind::Typedef),
            "class" => Ok(ElementKind::Class),
            "method" => Ok(ElementKind::Method),
            "routine" => Ok(ElementKind::Routine),
            "event" => Ok(ElementKind::Event),
            "state" => Ok(ElementKind::State),
            other => Err(CodecError::UnsupportedOperation(format!(
                "unsupported element kind '{}'",
                other
            ))),
        }
    }
}

/// One ptr-addressed unit of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ElementRepr")]
pub struct Element {
    pub ptr: u64,
    pub deps: Vec<u64>,
    pub data: ElementData,
}

impl Element {
    pub fn new(ptr: u64, deps: Vec<u64>, data: ElementData) -> Self {
        Self { ptr, deps, data }
    }

    pub fn kind(&self) -> ElementKind {
        self.data.kind()
    }
}

/// Kind-specific element payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementData {
    Constant(Constant),
    Typedef(String),
    Class(Class),
    Method(Routine),
    Routine(Routine),
    Event(Event),
    State(State),
}

impl ElementData {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementData::Constant(_) => ElementKind::Constant,
            ElementData::Typedef(_) => ElementKind::Typedef,
            ElementData::Class(_) => ElementKind::Class,
            ElementData::Method(_) => ElementKind::Method,
            ElementData::Routine(_) => ElementKind::Routine,
            ElementData::Event(_) => ElementKind::Event,
            ElementData::State(_) => ElementKind::State,
        }
    }

    /// Convert to the value written under the kind's fixed schema.
    pub fn to_value(&self) -> Value {
        match self {
            ElementData::Constant(c) => c.to_value(),
            ElementData::Typedef(t) => Value::from(t.as_str()),
            ElementData::Class(c) => c.to_value(),
            ElementData::Method(r) | ElementData::Routine(r) => r.to_value(),
            ElementData::Event(e) => e.to_value(),
            ElementData::State(s) => s.to_value(),
        }
    }

    /// Rebuild a payload decoded under the kind's fixed schema.
    pub fn from_value(kind: ElementKind, value: &Value) -> Result<Self> {
        Ok(match kind {
            ElementKind::Constant => ElementData::Constant(Constant::from_value(value)?),
            ElementKind::Typedef => ElementData::Typedef(
                value
                    .as_str()
                    .ok_or_else(|| mismatch("typedef", "string", value))?
                    .to_string(),
            ),
            ElementKind::Class => ElementData::Class(Class::from_value(value)?),
            ElementKind::Method => ElementData::Method(Routine::from_value(value)?),
            ElementKind::Routine => ElementData::Routine(Routine::from_value(value)?),
            ElementKind::Event => ElementData::Event(Event::from_value(value)?),
            ElementKind::State => ElementData::State(State::from_value(value)?),
        })
    }
}

/// JSON form of an element: the payload is interpreted by `kind`.
#[derive(Deserialize)]
struct ElementRepr {
    ptr: u64,
    #[serde(default)]
    deps: Vec<u64>,
    kind: String,
    data: serde_json::Value,
}

impl TryFrom<ElementRepr> for Element {
    type Error = CodecError;

    fn try_from(repr: ElementRepr) -> Result<Self> {
        fn parse<T: serde::de::DeserializeOwned>(data: serde_json::Value) -> Result<T> {
            serde_json::from_value(data).map_err(|e| CodecError::DecodingError(e.to_string()))
        }

        let data = match repr.kind.parse::<ElementKind>()? {
            ElementKind::Constant => ElementData::Constant(parse(repr.data)?),
            ElementKind::Typedef => ElementData::Typedef(parse(repr.data)?),
            ElementKind::Class => ElementData::Class(parse(repr.data)?),
            ElementKind::Method => ElementData::Method(parse(repr.data)?),
            ElementKind::Routine => ElementData::Routine(parse(repr.data)?),
            ElementKind::Event => ElementData::Event(parse(repr.data)?),
            ElementKind::State => ElementData::State(parse(repr.data)?),
        };

        Ok(Element {
            ptr: repr.ptr,
            deps: repr.deps,
            data,
        })
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Element", 4)?;
        s.serialize_field("ptr", &self.ptr)?;
        s.serialize_field("deps", &self.deps)?;
        s.serialize_field("kind", self.kind().as_str())?;
        match &self.data {
            ElementData::Constant(c) => s.serialize_field("data", c)?,
            ElementData::Typedef(t) => s.serialize_field("data", t)?,
            ElementData::Class(c) => s.serialize_field("data", c)?,
            ElementData::Method(r) | ElementData::Routine(r) => s.serialize_field("data", r)?,
            ElementData::Event(e) => s.serialize_field("data", e)?,
            ElementData::State(st) => s.serialize_field("data", st)?,
        }
        s.end()
    }
}

/// A typed, labelled field with its positional slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeField {
    pub slot: u64,
    pub label: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl TypeField {
    pub fn new(slot: u64, label: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            slot,
            label: label.into(),
            ty: ty.into(),
        }
    }

    fn to_value(&self) -> Value {
        Value::structure([
            ("slot", Value::from(self.slot)),
            ("label", Value::from(self.label.as_str())),
            ("type", Value::from(self.ty.as_str())),
        ])
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            slot: u64_field(value, "slot")?,
            label: string_field(value, "label")?,
            ty: string_field(value, "type")?,
        })
    }
}

/// A class method binding: the method element's ptr and its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodField {
    pub ptr: u64,
    pub code: u64,
}

impl MethodField {
    fn to_value(&self) -> Value {
        Value::structure([("ptr", Value::from(self.ptr)), ("code", Value::from(self.code))])
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            ptr: u64_field(value, "ptr")?,
            code: u64_field(value, "code")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constant {
    #[serde(rename = "type")]
    pub ty: String,
    pub value: String,
}

impl Constant {
    fn to_value(&self) -> Value {
        Value::structure([
            ("type", Value::from(self.ty.as_str())),
            ("value", Value::from(self.value.as_str())),
        ])
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            ty: string_field(value, "type")?,
            value: string_field(value, "value")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<TypeField>,
    #[serde(default)]
    pub methods: Vec<MethodField>,
}

impl Class {
    fn to_value(&self) -> Value {
        Value::structure([
            ("name", Value::from(self.name.as_str())),
            ("fields", type_fields_value(&self.fields)),
            (
                "methods",
                Value::Array(self.methods.iter().map(MethodField::to_value).collect()),
            ),
        ])
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            name: string_field(value, "name")?,
            fields: list_field(value, "fields", TypeField::from_value)?,
            methods: list_field(value, "methods", MethodField::from_value)?,
        })
    }
}

/// Instructions a routine executes, in any of its representations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executes {
    #[serde(default)]
    pub bin: Vec<u8>,
    #[serde(default)]
    pub hex: String,
    #[serde(default)]
    pub asm: Vec<String>,
}

impl Executes {
    fn to_value(&self) -> Value {
        Value::structure([
            ("bin", Value::Bytes(self.bin.clone())),
            ("hex", Value::from(self.hex.as_str())),
            ("asm", strings_value(&self.asm)),
        ])
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            bin: bytes_field(value, "bin")?,
            hex: string_field(value, "hex")?,
            asm: strings_field(value, "asm")?,
        })
    }
}

/// A callable entry point (a `routine` or class `method` element).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub name: String,
    /// Call kind, e.g. `invoke`, `deploy` or `enlist`.
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default)]
    pub accepts: Vec<TypeField>,
    #[serde(default)]
    pub returns: Vec<TypeField>,
    #[serde(default)]
    pub executes: Executes,
    #[serde(default)]
    pub catches: Vec<String>,
}

impl Routine {
    /// A routine with the given signature and no instructions.
    pub fn new(name: impl Into<String>, accepts: Vec<TypeField>, returns: Vec<TypeField>) -> Self {
        Self {
            name: name.into(),
            kind: "invoke".to_string(),
            mode: None,
            accepts,
            returns,
            executes: Executes::default(),
            catches: Vec::new(),
        }
    }

    fn to_value(&self) -> Value {
        let mut fields = vec![
            ("name", Value::from(self.name.as_str())),
            ("kind", Value::from(self.kind.as_str())),
            ("accepts", type_fields_value(&self.accepts)),
            ("returns", type_fields_value(&self.returns)),
            ("executes", self.executes.to_value()),
            ("catches", strings_value(&self.catches)),
        ];
        if let Some(mode) = &self.mode {
            fields.push(("mode", Value::from(mode.as_str())));
        }
        Value::structure(fields)
    }

    fn from_value(value: &Value) -> Result<Self> {
        let executes = match value.field("executes") {
            Some(v @ Value::Struct(_)) => Executes::from_value(v)?,
            _ => Executes::default(),
        };
        let mode = match value.field("mode") {
            Some(Value::String(m)) => Some(m.clone()),
            _ => None,
        };

        Ok(Self {
            name: string_field(value, "name")?,
            kind: string_field(value, "kind")?,
            mode,
            accepts: list_field(value, "accepts", TypeField::from_value)?,
            returns: list_field(value, "returns", TypeField::from_value)?,
            executes,
            catches: strings_field(value, "catches")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(default)]
    pub topics: u64,
    #[serde(default)]
    pub fields: Vec<TypeField>,
}

impl Event {
    fn to_value(&self) -> Value {
        Value::structure([
            ("name", Value::from(self.name.as_str())),
            ("topics", Value::from(self.topics)),
            ("fields", type_fields_value(&self.fields)),
        ])
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            name: string_field(value, "name")?,
            topics: u64_field(value, "topics")?,
            fields: list_field(value, "fields", TypeField::from_value)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub mode: String,
    #[serde(default)]
    pub fields: Vec<TypeField>,
}

impl State {
    fn to_value(&self) -> Value {
        Value::structure([
            ("mode", Value::from(self.mode.as_str())),
            ("fields", type_fields_value(&self.fields)),
        ])
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            mode: string_field(value, "mode")?,
            fields: list_field(value, "fields", TypeField::from_value)?,
        })
    }
}

fn type_fields_value(fields: &[TypeField]) -> Value {
    Value::Array(fields.iter().map(TypeField::to_value).collect())
}

fn strings_value(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| Value::from(s.as_str())).collect())
}

fn mismatch(label: &str, expected: &str, found: &Value) -> CodecError {
    CodecError::DecodingError(format!(
        "field '{}': expected {}, found {}",
        label,
        expected,
        found.kind_name()
    ))
}

// Absent and null fields decode to the type's default.

pub(crate) fn string_field(value: &Value, label: &str) -> Result<String> {
    match value.field(label) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(mismatch(label, "string", other)),
    }
}

pub(crate) fn u64_field(value: &Value, label: &str) -> Result<u64> {
    match value.field(label) {
        None | Some(Value::Null) => Ok(0),
        Some(other) => other.as_u64().ok_or_else(|| mismatch(label, "integer", other)),
    }
}

pub(crate) fn bool_field(value: &Value, label: &str) -> Result<bool> {
    match value.field(label) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(mismatch(label, "bool", other)),
    }
}

fn bytes_field(value: &Value, label: &str) -> Result<Vec<u8>> {
    match value.field(label) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Bytes(b)) => Ok(b.clone()),
        Some(other) => Err(mismatch(label, "bytes", other)),
    }
}

pub(crate) fn list_field<T>(
    value: &Value,
    label: &str,
    parse: impl Fn(&Value) -> Result<T>,
) -> Result<Vec<T>> {
    match value.field(label) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(parse).collect(),
        Some(other) => Err(mismatch(label, "array", other)),
    }
}

pub(crate) fn strings_field(value: &Value, label: &str) -> Result<Vec<String>> {
    list_field(value, label, |item| {
        item.as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(label, "string", item))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "syntax": 1,
        "engine": { "kind": "PISA", "flags": [] },
        "elements": [
            { "ptr": 0, "kind": "typedef", "data": "map[string]u64" },
            {
                "ptr": 1, "deps": [0], "kind": "state",
                "data": { "mode": "persistent", "fields": [{ "slot": 0, "label": "balances", "type": "map[string]u64" }] }
            },
            {
                "ptr": 2, "deps": [1], "kind": "routine",
                "data": {
                    "name": "BalanceOf", "kind": "invoke", "mode": "static",
                    "accepts": [{ "slot": 0, "label": "addr", "type": "address" }],
                    "returns": [{ "slot": 0, "label": "balance", "type": "u64" }],
                    "executes": { "asm": ["PMAP 0x0"] }
                }
            }
        ]
    }"#;

    #[test]
    fn test_manifest_from_json() {
        let manifest = Manifest::from_json(JSON).unwrap();

        assert_eq!(manifest.syntax, 1);
        assert_eq!(manifest.engine.kind, "PISA");
        assert_eq!(manifest.elements.len(), 3);
        assert_eq!(manifest.elements[0].kind(), ElementKind::Typedef);
        assert_eq!(manifest.elements[2].deps, vec![1]);

        match &manifest.element(2).unwrap().data {
            ElementData::Routine(r) => {
                assert_eq!(r.name, "BalanceOf");
                assert_eq!(r.mode.as_deref(), Some("static"));
                assert_eq!(r.accepts[0].ty, "address");
                assert_eq!(r.executes.asm, vec!["PMAP 0x0".to_string()]);
            }
            other => panic!("expected routine, got {:?}", other),
        }
    }

    #[test]
    fn test_manifest_json_roundtrip() {
        let manifest = Manifest::from_json(JSON).unwrap();
        let json = manifest.to_json().unwrap();
        assert_eq!(Manifest::from_json(&json).unwrap(), manifest);
    }

    #[test]
    fn test_unknown_element_kind() {
        let json = r#"{ "syntax": 1, "engine": { "kind": "PISA" },
            "elements": [{ "ptr": 0, "kind": "widget", "data": {} }] }"#;
        let err = Manifest::from_json(json).unwrap_err();
        assert!(err.to_string().contains("unsupported element kind"));
    }

    #[test]
    fn test_element_kind_parse() {
        assert_eq!("event".parse::<ElementKind>().unwrap(), ElementKind::Event);
        assert!(matches!(
            "widget".parse::<ElementKind>(),
            Err(CodecError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_element_data_value_roundtrip() {
        let manifest = Manifest::from_json(JSON).unwrap();
        for element in &manifest.elements {
            let value = element.data.to_value();
            let back = ElementData::from_value(element.kind(), &value).unwrap();
            assert_eq!(back, element.data);
        }
    }

    #[test]
    fn test_field_type_mismatch() {
        let value = Value::structure([("name", Value::Integer(1))]);
        assert!(matches!(
            Event::from_value(&value),
            Err(CodecError::DecodingError(_))
        ));
    }
}
