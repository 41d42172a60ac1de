//! The manifest coder.
//!
//! A [`ManifestCoder`] is bound to one manifest. It encodes routine calldata,
//! decodes routine outputs, event logs and exceptions, and serializes whole
//! manifests into their packed form.
//!
//! All hex inputs and outputs carry the `0x` prefix.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use logic_codec_core::{
    decode_hex, decode_value, encode_hex, encode_value, CodecError, Reader, Result, Schema, Value,
    Writer,
};

use crate::calldata::normalize;
use crate::fixed;
use crate::manifest::{
    bool_field, string_field, strings_field, Element, ElementData, ElementKind, EngineDescriptor,
    Manifest, Routine,
};
use crate::resolver::{ElementTable, SchemaResolver};

/// Event name whose schema is fixed rather than declared by the manifest.
pub const BUILTIN_LOG_EVENT: &str = "builtin.Log";

/// Default maximum nesting depth for schema resolution.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration for a [`ManifestCoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoderConfig {
    /// Maximum nesting of arrays, maps and classes in a resolved type.
    pub max_depth: usize,
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A routine, given either by name or directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutineRef {
    ByName(String),
    ByValue(Routine),
}

impl From<&str> for RoutineRef {
    fn from(name: &str) -> Self {
        RoutineRef::ByName(name.to_string())
    }
}

impl From<String> for RoutineRef {
    fn from(name: String) -> Self {
        RoutineRef::ByName(name)
    }
}

impl From<Routine> for RoutineRef {
    fn from(routine: Routine) -> Self {
        RoutineRef::ByValue(routine)
    }
}

impl From<&Routine> for RoutineRef {
    fn from(routine: &Routine) -> Self {
        RoutineRef::ByValue(routine.clone())
    }
}

/// A decoded execution exception.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exception {
    pub class: String,
    pub error: String,
    pub revert: bool,
    pub trace: Vec<String>,
}

impl Exception {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            class: string_field(value, "class")?,
            error: string_field(value, "error")?,
            revert: bool_field(value, "revert")?,
            trace: strings_field(value, "trace")?,
        })
    }
}

/// Encoder and decoder bound to a single manifest.
///
/// The coder is immutable after construction and can be shared across
/// threads.
#[derive(Debug)]
pub struct ManifestCoder {
    manifest: Manifest,
    table: Arc<ElementTable>,
    resolver: OnceLock<SchemaResolver>,
    config: CoderConfig,
}

impl ManifestCoder {
    pub fn new(manifest: Manifest) -> Self {
        Self::with_config(manifest, CoderConfig::default())
    }

    pub fn with_config(manifest: Manifest, config: CoderConfig) -> Self {
        let table = Arc::new(ElementTable::new(&manifest.elements));
        tracing::debug!(
            syntax = manifest.syntax,
            elements = table.len(),
            "manifest coder ready"
        );

        Self {
            manifest,
            table,
            resolver: OnceLock::new(),
            config,
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn elements(&self) -> &ElementTable {
        &self.table
    }

    pub fn config(&self) -> &CoderConfig {
        &self.config
    }

    /// The schema resolver, built on first use.
    pub fn resolver(&self) -> &SchemaResolver {
        self.resolver
            .get_or_init(|| SchemaResolver::new(Arc::clone(&self.table), self.config.max_depth))
    }

    // ---- manifests ----

    /// Serialize a manifest into its packed form.
    ///
    /// The pack holds the syntax version, the engine descriptor and, when
    /// there are elements, one framed block of per-element packs.
    pub fn encode_manifest(manifest: &Manifest) -> Result<String> {
        let mut writer = Writer::new();
        writer.write_integer(manifest.syntax);
        writer.write_value(&manifest.engine.to_value(), &fixed::engine())?;

        if !manifest.elements.is_empty() {
            let mut block = Writer::new();
            for element in &manifest.elements {
                block.write_framed(encode_element(element)?);
            }
            writer.write_framed(block);
        }

        Ok(encode_hex(&writer.finish()))
    }

    /// Parse a packed manifest.
    pub fn decode_manifest(encoded: &str) -> Result<Manifest> {
        let bytes = decode_hex(encoded)?;
        let mut reader = Reader::new(&bytes)?;

        let syntax = reader.read_integer()?;
        let engine = EngineDescriptor::from_value(&reader.read_value(&fixed::engine())?)?;

        let mut elements = Vec::new();
        if !reader.is_empty() {
            let mut block = reader.read_framed()?;
            while !block.is_empty() {
                elements.push(decode_element(&mut block.read_framed()?)?);
            }
        }

        Ok(Manifest {
            syntax,
            engine,
            elements,
        })
    }

    // ---- calldata ----

    /// Encode positional arguments as routine calldata.
    ///
    /// Arguments are matched to the routine's `accepts` fields by slot. A
    /// `Null` argument is written as null.
    pub fn encode_arguments(
        &self,
        routine: impl Into<RoutineRef>,
        args: &[Value],
    ) -> Result<String> {
        let routine = routine.into();
        let routine = self.routine(&routine)?;
        if args.len() > routine.accepts.len() {
            return Err(CodecError::InvalidArgument(format!(
                "routine '{}' accepts {} arguments, got {}",
                routine.name,
                routine.accepts.len(),
                args.len()
            )));
        }

        let schema = self.resolver().resolve_fields(&routine.accepts)?;
        let mut entries = BTreeMap::new();
        for field in &routine.accepts {
            let arg = args.get(field.slot as usize).ok_or_else(|| {
                CodecError::MissingArgument(format!(
                    "routine '{}' is missing argument '{}'",
                    routine.name, field.label
                ))
            })?;
            entries.insert(field.label.clone(), arg.clone());
        }

        let (value, wire) = normalize(&schema, Value::Struct(entries))?;
        let encoded = encode_value(&value, &wire)?;
        tracing::debug!(routine = %routine.name, len = encoded.len(), "encoded calldata");
        Ok(encode_hex(&encoded))
    }

    /// Decode routine calldata back into positional arguments.
    ///
    /// Returns `None` when the routine accepts nothing or the calldata is
    /// empty. Absent fields decode to `Null`.
    pub fn decode_arguments(
        &self,
        routine: impl Into<RoutineRef>,
        calldata: &str,
    ) -> Result<Option<Vec<Value>>> {
        let routine = routine.into();
        let routine = self.routine(&routine)?;
        let bytes = decode_hex(calldata)?;
        if routine.accepts.is_empty() || bytes.is_empty() {
            return Ok(None);
        }

        let schema = self.resolver().resolve_fields(&routine.accepts)?;
        let decoded = decode_value(&bytes, &schema)?;
        let args = routine
            .accepts
            .iter()
            .map(|field| decoded.field(&field.label).cloned().unwrap_or(Value::Null))
            .collect();
        Ok(Some(args))
    }

    /// Decode a routine's output into a struct keyed by return label.
    ///
    /// Returns `None` for empty output or when the routine returns nothing.
    pub fn decode_output(
        &self,
        routine: impl Into<RoutineRef>,
        output: &str,
    ) -> Result<Option<Value>> {
        let routine = routine.into();
        let routine = self.routine(&routine)?;
        let bytes = decode_hex(output)?;
        if bytes.is_empty() || routine.returns.is_empty() {
            return Ok(None);
        }

        let schema = self.resolver().resolve_fields(&routine.returns)?;
        decode_value(&bytes, &schema).map(Some)
    }

    /// Decode an event log by event name.
    ///
    /// [`BUILTIN_LOG_EVENT`] uses a fixed `{value: string}` schema; any other
    /// name must be declared by the manifest.
    pub fn decode_event_output(&self, event: &str, log: &str) -> Result<Option<Value>> {
        let schema = if event == BUILTIN_LOG_EVENT {
            fixed::log()
        } else {
            let declared = self
                .table
                .event(event)
                .ok_or_else(|| CodecError::NotFound(format!("event '{}'", event)))?;
            self.resolver().resolve_fields(&declared.fields)?
        };

        let bytes = decode_hex(log)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        decode_value(&bytes, &schema).map(Some)
    }

    /// Decode an execution error payload.
    pub fn decode_exception(error: &str) -> Result<Option<Exception>> {
        let bytes = decode_hex(error)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let value = decode_value(&bytes, &fixed::exception())?;
        Exception::from_value(&value).map(Some)
    }

    /// Serialize a payload value under a fixed schema.
    ///
    /// The payload is normalized like calldata first, so structs nested in
    /// the payload are written as sub-documents.
    pub fn encode_payload(schema: &Schema, payload: Value) -> Result<Vec<u8>> {
        let (value, wire) = normalize(schema, payload)?;
        encode_value(&value, &wire)
    }

    fn routine<'a>(&'a self, routine: &'a RoutineRef) -> Result<&'a Routine> {
        match routine {
            RoutineRef::ByName(name) => self
                .table
                .routine(name)
                .ok_or_else(|| CodecError::NotFound(format!("routine '{}'", name))),
            RoutineRef::ByValue(routine) => Ok(routine),
        }
    }
}

fn encode_element(element: &Element) -> Result<Writer> {
    let kind = element.kind();
    let deps = Value::Array(element.deps.iter().map(|d| Value::from(*d)).collect());

    let mut writer = Writer::new();
    writer.write_integer(element.ptr);
    writer.write_value(&deps, &fixed::deps())?;
    writer.write_string(kind.as_str());
    writer.write_value(&element.data.to_value(), &fixed::element(kind))?;
    Ok(writer)
}

fn decode_element(reader: &mut Reader) -> Result<Element> {
    let ptr = reader.read_integer()?;
    let deps = match reader.read_value(&fixed::deps())? {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64().ok_or_else(|| {
                    CodecError::DecodingError(format!("element {}: invalid dependency", ptr))
                })
            })
            .collect::<Result<Vec<_>>>()?,
        _ => Vec::new(),
    };
    let kind: ElementKind = reader.read_string()?.parse()?;
    let data = ElementData::from_value(kind, &reader.read_value(&fixed::element(kind))?)?;
    Ok(Element::new(ptr, deps, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Class, Event, TypeField};

    fn manifest() -> Manifest {
        Manifest::from_json(
            r#"{
            "syntax": 1,
            "engine": { "kind": "PISA", "flags": [] },
            "elements": [
                {
                    "ptr": 0, "kind": "class",
                    "data": { "name": "Point", "fields": [
                        { "slot": 0, "label": "x", "type": "i64" },
                        { "slot": 1, "label": "y", "type": "i64" }
                    ] }
                },
                {
                    "ptr": 1, "deps": [0], "kind": "routine",
                    "data": {
                        "name": "Transfer", "kind": "invoke",
                        "accepts": [
                            { "slot": 0, "label": "to", "type": "address" },
                            { "slot": 1, "label": "amount", "type": "u64" }
                        ],
                        "returns": [{ "slot": 0, "label": "ok", "type": "bool" }]
                    }
                },
                {
                    "ptr": 2, "deps": [0], "kind": "routine",
                    "data": {
                        "name": "Move", "kind": "invoke",
                        "accepts": [
                            { "slot": 0, "label": "path", "type": "[]Point" },
                            { "slot": 1, "label": "origin", "type": "Point" }
                        ]
                    }
                },
                {
                    "ptr": 3, "kind": "event",
                    "data": { "name": "Moved", "topics": 1, "fields": [
                        { "slot": 0, "label": "at", "type": "Point" }
                    ] }
                }
            ]
        }"#,
        )
        .unwrap()
    }

    fn point(x: i64, y: i64) -> Value {
        Value::structure([("x", Value::from(x)), ("y", Value::from(y))])
    }

    #[test]
    fn test_unsorted_map_argument_roundtrip() {
        let routine = Routine::new(
            "Weigh",
            vec![TypeField::new(0, "weights", "map[string]u64")],
            vec![],
        );
        let coder = ManifestCoder::new(manifest());
        let weights = Value::Map(vec![
            (Value::from("b"), Value::from(1u64)),
            (Value::from("a"), Value::from(2u64)),
        ]);

        let calldata = coder.encode_arguments(&routine, &[weights.clone()]).unwrap();
        let decoded = coder.decode_arguments(&routine, &calldata).unwrap().unwrap();
        assert_eq!(decoded, vec![weights]);

        // Entries come back in canonical key order
        assert_eq!(
            decoded[0],
            Value::Map(vec![
                (Value::from("a"), Value::from(2u64)),
                (Value::from("b"), Value::from(1u64)),
            ])
        );
        match &decoded[0] {
            Value::Map(entries) => assert_eq!(entries[0].0, Value::from("a")),
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn test_calldata_for_other_routine_rejected() {
        let coder = ManifestCoder::new(manifest());
        let calldata = coder
            .encode_arguments("Transfer", &[Value::Bytes(vec![7; 32]), Value::from(5u64)])
            .unwrap();

        assert!(matches!(
            coder.decode_arguments("Move", &calldata),
            Err(CodecError::DecodingError(_))
        ));
    }

    #[test]
    fn test_struct_valued_map_roundtrip() {
        let routine = Routine::new(
            "Mark",
            vec![TypeField::new(0, "stops", "map[string]Point")],
            vec![],
        );
        let coder = ManifestCoder::new(manifest());
        let stops = Value::Map(vec![
            (Value::from("home"), point(0, 0)),
            (Value::from("cafe"), point(3, -4)),
        ]);

        let calldata = coder.encode_arguments(&routine, &[stops.clone()]).unwrap();
        assert_eq!(
            coder.decode_arguments(&routine, &calldata).unwrap(),
            Some(vec![stops])
        );
    }

    #[test]
    fn test_encode_single_u64_argument() {
        let routine = Routine::new("Store", vec![TypeField::new(0, "amount", "u64")], vec![]);
        let coder = ManifestCoder::new(manifest());

        let calldata = coder.encode_arguments(&routine, &[Value::from(300u64)]).unwrap();
        assert_eq!(calldata, "0xa166616d6f756e744319012c");
    }

    #[test]
    fn test_arguments_roundtrip_by_name() {
        let coder = ManifestCoder::new(manifest());
        let args = vec![Value::Bytes(vec![7; 32]), Value::from(1000u64)];

        let calldata = coder.encode_arguments("Transfer", &args).unwrap();
        let decoded = coder.decode_arguments("Transfer", &calldata).unwrap();
        assert_eq!(decoded, Some(args));
    }

    #[test]
    fn test_hex_argument_normalized() {
        let coder = ManifestCoder::new(manifest());
        let hex_to = format!("0x{}", "07".repeat(32));

        let from_hex = coder
            .encode_arguments("Transfer", &[Value::from(hex_to.as_str()), Value::from(5u64)])
            .unwrap();
        let from_bytes = coder
            .encode_arguments("Transfer", &[Value::Bytes(vec![7; 32]), Value::from(5u64)])
            .unwrap();
        assert_eq!(from_hex, from_bytes);
    }

    #[test]
    fn test_struct_arguments_roundtrip() {
        let coder = ManifestCoder::new(manifest());
        let args = vec![
            Value::Array(vec![point(1, 2), point(-3, 4)]),
            point(0, 0),
        ];

        let calldata = coder.encode_arguments("Move", &args).unwrap();
        let decoded = coder.decode_arguments("Move", &calldata).unwrap().unwrap();
        assert_eq!(decoded, args);

        // Encoding again with the same coder gives identical bytes
        assert_eq!(coder.encode_arguments("Move", &args).unwrap(), calldata);
    }

    #[test]
    fn test_null_argument() {
        let coder = ManifestCoder::new(manifest());
        let args = vec![Value::Null, Value::from(1u64)];

        let calldata = coder.encode_arguments("Transfer", &args).unwrap();
        assert_eq!(coder.decode_arguments("Transfer", &calldata).unwrap(), Some(args));
    }

    #[test]
    fn test_missing_argument() {
        let coder = ManifestCoder::new(manifest());
        let result = coder.encode_arguments("Transfer", &[Value::Bytes(vec![1; 32])]);
        assert!(matches!(result, Err(CodecError::MissingArgument(_))));
    }

    #[test]
    fn test_too_many_arguments() {
        let coder = ManifestCoder::new(manifest());
        let args = vec![Value::Null, Value::Null, Value::Null];
        assert!(matches!(
            coder.encode_arguments("Transfer", &args),
            Err(CodecError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unknown_routine() {
        let coder = ManifestCoder::new(manifest());
        assert!(matches!(
            coder.encode_arguments("Nope", &[]),
            Err(CodecError::NotFound(_))
        ));
        assert!(matches!(
            coder.decode_output("Nope", "0x"),
            Err(CodecError::NotFound(_))
        ));
    }

    #[test]
    fn test_empty_calldata_and_output() {
        let coder = ManifestCoder::new(manifest());
        assert_eq!(coder.decode_arguments("Transfer", "0x").unwrap(), None);
        assert_eq!(coder.decode_output("Transfer", "0x").unwrap(), None);
        assert_eq!(coder.decode_output("Transfer", "").unwrap(), None);

        let nullary = Routine::new("Ping", vec![], vec![]);
        assert_eq!(coder.decode_arguments(&nullary, "0xa0").unwrap(), None);
    }

    #[test]
    fn test_decode_output() {
        let coder = ManifestCoder::new(manifest());
        let routine = Routine::new("Flag", vec![TypeField::new(0, "ok", "bool")], vec![]);
        let encoded = coder.encode_arguments(&routine, &[Value::Bool(true)]).unwrap();

        let output = coder.decode_output("Transfer", &encoded).unwrap();
        assert_eq!(output, Some(Value::structure([("ok", Value::Bool(true))])));

        // No declared returns
        assert_eq!(coder.decode_output("Move", &encoded).unwrap(), None);
    }

    #[test]
    fn test_decode_builtin_log() {
        let coder = ManifestCoder::new(manifest());
        let value = coder
            .decode_event_output(BUILTIN_LOG_EVENT, "0xa16576616c756543626869")
            .unwrap();
        assert_eq!(value, Some(Value::structure([("value", Value::from("hi"))])));
    }

    #[test]
    fn test_decode_declared_event() {
        let coder = ManifestCoder::new(manifest());
        let encoder = Routine::new("Emit", vec![TypeField::new(0, "at", "Point")], vec![]);
        let log = coder.encode_arguments(&encoder, &[point(9, 9)]).unwrap();

        let value = coder.decode_event_output("Moved", &log).unwrap();
        assert_eq!(value, Some(Value::structure([("at", point(9, 9))])));

        assert!(matches!(
            coder.decode_event_output("Unknown", &log),
            Err(CodecError::NotFound(_))
        ));
        assert_eq!(coder.decode_event_output("Moved", "0x").unwrap(), None);
    }

    #[test]
    fn test_decode_exception() {
        let payload = Value::structure([
            ("class", Value::from("builtin.Error")),
            ("error", Value::from("insufficient balance")),
            ("revert", Value::Bool(true)),
            ("trace", Value::Array(vec![Value::from("Transfer() [0x1]")])),
        ]);
        let bytes = ManifestCoder::encode_payload(&fixed::exception(), payload).unwrap();

        let exception = ManifestCoder::decode_exception(&encode_hex(&bytes))
            .unwrap()
            .unwrap();
        assert_eq!(exception.class, "builtin.Error");
        assert_eq!(exception.error, "insufficient balance");
        assert!(exception.revert);
        assert_eq!(exception.trace, vec!["Transfer() [0x1]".to_string()]);

        assert_eq!(ManifestCoder::decode_exception("0x").unwrap(), None);
    }

    #[test]
    fn test_empty_manifest_encoding() {
        let manifest = Manifest {
            syntax: 1,
            engine: EngineDescriptor {
                kind: "PISA".to_string(),
                flags: vec![],
            },
            elements: vec![],
        };

        let encoded = ManifestCoder::encode_manifest(&manifest).unwrap();
        assert_eq!(encoded, "0x8201a2646b696e6445645049534165666c6167734180");
        assert_eq!(ManifestCoder::decode_manifest(&encoded).unwrap(), manifest);
    }

    #[test]
    fn test_manifest_roundtrip() {
        let manifest = manifest();
        let encoded = ManifestCoder::encode_manifest(&manifest).unwrap();
        let decoded = ManifestCoder::decode_manifest(&encoded).unwrap();

        assert_eq!(decoded, manifest);
        assert_eq!(ManifestCoder::encode_manifest(&decoded).unwrap(), encoded);
    }

    #[test]
    fn test_decode_manifest_unknown_kind() {
        let mut element = Writer::new();
        element.write_integer(0);
        element.write_value(&Value::Array(vec![]), &fixed::deps()).unwrap();
        element.write_string("widget");
        element.write_value(&Value::from("x"), &Schema::String).unwrap();

        let mut block = Writer::new();
        block.write_framed(element);

        let mut writer = Writer::new();
        writer.write_integer(1);
        writer
            .write_value(
                &EngineDescriptor {
                    kind: "PISA".into(),
                    flags: vec![],
                }
                .to_value(),
                &fixed::engine(),
            )
            .unwrap();
        writer.write_framed(block);

        let result = ManifestCoder::decode_manifest(&encode_hex(&writer.finish()));
        assert!(matches!(result, Err(CodecError::UnsupportedOperation(_))));
    }

    #[test]
    fn test_resolution_errors_surface() {
        let mut manifest = manifest();
        manifest.elements.push(Element::new(
            4,
            vec![],
            ElementData::Class(Class {
                name: "Loop".into(),
                fields: vec![TypeField::new(0, "next", "Loop")],
                methods: vec![],
            }),
        ));
        manifest.elements.push(Element::new(
            5,
            vec![],
            ElementData::Event(Event {
                name: "Looped".into(),
                topics: 0,
                fields: vec![TypeField::new(0, "l", "Loop")],
            }),
        ));

        let coder = ManifestCoder::new(manifest);
        assert!(matches!(
            coder.decode_event_output("Looped", "0xa0"),
            Err(CodecError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_coder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ManifestCoder>();
    }
}
