//! Calldata normalization.
//!
//! Before calldata is written, values are brought into canonical form:
//! strings lose their `0x` marker, prefixed hex becomes bytes, and structs
//! are pre-encoded into sub-documents.
//!
//! A pre-encoded struct must then be written as an opaque `document`, so
//! normalization returns the value together with the schema it has to be
//! written under. The resolved schema itself is never modified, which keeps
//! a shared [`ManifestCoder`] safe to use from several threads.
//!
//! [`ManifestCoder`]: crate::coder::ManifestCoder

use std::collections::BTreeMap;

use logic_codec_core::{
    decode_hex, encode_document, is_prefixed_hex, trim_hex_prefix, Document, Result, Schema, Value,
};

/// Normalize `value` for writing under `schema`.
///
/// Returns the normalized value and the schema to write it under. For
/// arrays and maps that schema is taken from the last element, mirroring a
/// collapse of the element schema once the container has been processed.
pub(crate) fn normalize(schema: &Schema, value: Value) -> Result<(Value, Schema)> {
    match (schema, value) {
        (Schema::String, Value::String(s)) => {
            Ok((Value::String(trim_hex_prefix(&s).to_string()), Schema::String))
        }
        (Schema::Bytes, Value::String(s)) if is_prefixed_hex(&s) => {
            Ok((Value::Bytes(decode_hex(&s)?), Schema::Bytes))
        }
        (Schema::Array { values }, Value::Array(items)) if values.is_compound() => {
            let mut wire = values.as_ref().clone();
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let (item, item_wire) = normalize(values, item)?;
                out.push(item);
                wire = item_wire;
            }
            Ok((Value::Array(out), Schema::array(wire)))
        }
        (Schema::Map { keys, values }, Value::Map(entries))
            if keys.is_compound() || values.is_compound() =>
        {
            let mut key_wire = keys.as_ref().clone();
            let mut value_wire = values.as_ref().clone();
            let mut out = Vec::with_capacity(entries.len());
            for (k, v) in entries {
                let (k, kw) = normalize(keys, k)?;
                let (v, vw) = normalize(values, v)?;
                out.push((k, v));
                key_wire = kw;
                value_wire = vw;
            }
            Ok((Value::Map(out), Schema::map(key_wire, value_wire)))
        }
        (Schema::Struct { fields }, Value::Struct(entries)) => {
            let doc = normalize_struct(fields, entries)?;
            Ok((Value::Document(doc.into_raw_data()), Schema::Document))
        }
        // Already pre-encoded
        (Schema::Struct { .. }, value @ Value::Document(_)) => Ok((value, Schema::Document)),
        (schema, value) => Ok((value, schema.clone())),
    }
}

/// Normalize every field of a struct and encode it as a sub-document.
///
/// Immediate struct fields are written as opaque documents, since their
/// values are already encoded.
fn normalize_struct(
    fields: &[(String, Schema)],
    mut entries: BTreeMap<String, Value>,
) -> Result<Document> {
    let mut local = Vec::with_capacity(fields.len());
    for (label, field_schema) in fields {
        let wire = match entries.remove(label) {
            Some(value) => {
                let (value, wire) = normalize(field_schema, value)?;
                entries.insert(label.clone(), value);
                wire
            }
            None => field_schema.clone(),
        };
        let wire = match wire {
            Schema::Struct { .. } => Schema::Document,
            other => other,
        };
        local.push((label.clone(), wire));
    }

    tracing::trace!(fields = local.len(), "encoding struct as sub-document");
    encode_document(&entries, &local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logic_codec_core::{decode_value, encode_value, CodecError};

    fn point() -> Schema {
        Schema::structure([("x", Schema::Integer), ("y", Schema::Integer)])
    }

    fn point_value(x: i64, y: i64) -> Value {
        Value::structure([("x", Value::from(x)), ("y", Value::from(y))])
    }

    #[test]
    fn test_string_prefix_stripped() {
        let (value, wire) = normalize(&Schema::String, Value::from("0xabc")).unwrap();
        assert_eq!(value, Value::from("abc"));
        assert_eq!(wire, Schema::String);

        let (value, _) = normalize(&Schema::String, Value::from("plain")).unwrap();
        assert_eq!(value, Value::from("plain"));
    }

    #[test]
    fn test_hex_bytes_converted() {
        let (value, _) = normalize(&Schema::Bytes, Value::from("0x0102ff")).unwrap();
        assert_eq!(value, Value::Bytes(vec![0x01, 0x02, 0xff]));

        // Not prefixed hex: passed through untouched
        let (value, _) = normalize(&Schema::Bytes, Value::from("hello")).unwrap();
        assert_eq!(value, Value::from("hello"));

        let (value, _) = normalize(&Schema::Bytes, Value::Bytes(vec![9])).unwrap();
        assert_eq!(value, Value::Bytes(vec![9]));
    }

    #[test]
    fn test_scalar_array_passes_through() {
        let schema = Schema::array(Schema::String);
        let input = Value::Array(vec![Value::from("0xkeep")]);
        let (value, wire) = normalize(&schema, input.clone()).unwrap();

        assert_eq!(value, input);
        assert_eq!(wire, schema);
    }

    #[test]
    fn test_struct_becomes_document() {
        let (value, wire) = normalize(&point(), point_value(1, 2)).unwrap();

        assert_eq!(wire, Schema::Document);
        match value {
            Value::Document(entries) => assert_eq!(entries.len(), 2),
            other => panic!("expected document, got {:?}", other),
        }
    }

    #[test]
    fn test_array_of_structs_collapses_element_schema() {
        let schema = Schema::array(point());
        let input = Value::Array(vec![point_value(1, 2), point_value(3, 4)]);
        let (value, wire) = normalize(&schema, input.clone()).unwrap();

        assert_eq!(wire, Schema::array(Schema::Document));
        assert!(matches!(&value, Value::Array(items) if items.iter().all(|i| matches!(i, Value::Document(_)))));

        // Written bytes equal a direct encoding and decode under the original schema
        let bytes = encode_value(&value, &wire).unwrap();
        assert_eq!(bytes, encode_value(&input, &schema).unwrap());
        assert_eq!(decode_value(&bytes, &schema).unwrap(), input);
    }

    #[test]
    fn test_empty_array_keeps_element_schema() {
        let schema = Schema::array(point());
        let (value, wire) = normalize(&schema, Value::Array(vec![])).unwrap();
        assert_eq!(value, Value::Array(vec![]));
        assert_eq!(wire, schema);
    }

    #[test]
    fn test_map_with_bytes_values() {
        let schema = Schema::map(Schema::String, Schema::Bytes);
        let input = Value::Map(vec![(Value::from("k"), Value::from("0x00ff"))]);
        let (value, _) = normalize(&schema, input).unwrap();

        assert_eq!(
            value,
            Value::Map(vec![(Value::from("k"), Value::Bytes(vec![0x00, 0xff]))])
        );
    }

    #[test]
    fn test_map_of_structs_collapses_value_schema() {
        let schema = Schema::map(Schema::String, point());
        let input = Value::Map(vec![
            (Value::from("b"), point_value(1, 2)),
            (Value::from("a"), point_value(-3, 4)),
        ]);
        let (value, wire) = normalize(&schema, input.clone()).unwrap();

        assert_eq!(wire, Schema::map(Schema::String, Schema::Document));
        assert!(matches!(&value, Value::Map(entries) if entries.iter().all(|(_, v)| matches!(v, Value::Document(_)))));

        let bytes = encode_value(&value, &wire).unwrap();
        assert_eq!(bytes, encode_value(&input, &schema).unwrap());
        assert_eq!(decode_value(&bytes, &schema).unwrap(), input);
    }

    #[test]
    fn test_nested_struct_fields() {
        let line = Schema::structure([
            ("label", Schema::String),
            ("from", point()),
            ("to", point()),
            ("owner", Schema::Bytes),
        ]);
        let input = Value::structure([
            ("label", Value::from("0xline")),
            ("from", point_value(0, 0)),
            ("to", point_value(5, 5)),
            ("owner", Value::from("0xaa")),
        ]);

        let (value, wire) = normalize(&line, input).unwrap();
        let bytes = encode_value(&value, &wire).unwrap();

        let expected = Value::structure([
            ("label", Value::from("line")),
            ("from", point_value(0, 0)),
            ("to", point_value(5, 5)),
            ("owner", Value::Bytes(vec![0xaa])),
        ]);
        assert_eq!(decode_value(&bytes, &line).unwrap(), expected);
    }

    #[test]
    fn test_unknown_struct_field_rejected() {
        let input = Value::structure([("z", Value::from(1u64))]);
        assert!(matches!(
            normalize(&point(), input),
            Err(CodecError::EncodingError(_))
        ));
    }

    #[test]
    fn test_invalid_hex_in_bytes_field() {
        // Odd length is not prefixed hex, so it passes through and fails at write time
        let (value, wire) = normalize(&Schema::Bytes, Value::from("0xabc")).unwrap();
        assert!(encode_value(&value, &wire).is_err());
    }
}
