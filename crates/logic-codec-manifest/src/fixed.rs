//! Hand-authored schemas for manifest structure and built-in payloads.
//!
//! These never depend on a manifest's contents.

use logic_codec_core::Schema;

use crate::manifest::ElementKind;

/// Engine descriptor: `{kind, flags}`.
pub fn engine() -> Schema {
    Schema::structure([("kind", Schema::String), ("flags", Schema::array(Schema::String))])
}

/// Element dependency list.
pub fn deps() -> Schema {
    Schema::array(Schema::Integer)
}

fn type_fields() -> Schema {
    Schema::array(Schema::structure([
        ("slot", Schema::Integer),
        ("label", Schema::String),
        ("type", Schema::String),
    ]))
}

fn method_fields() -> Schema {
    Schema::array(Schema::structure([("ptr", Schema::Integer), ("code", Schema::Integer)]))
}

fn constant() -> Schema {
    Schema::structure([("type", Schema::String), ("value", Schema::String)])
}

fn class() -> Schema {
    Schema::structure([
        ("name", Schema::String),
        ("fields", type_fields()),
        ("methods", method_fields()),
    ])
}

fn routine() -> Schema {
    Schema::structure([
        ("name", Schema::String),
        ("kind", Schema::String),
        ("mode", Schema::String),
        ("accepts", type_fields()),
        ("returns", type_fields()),
        (
            "executes",
            Schema::structure([
                ("bin", Schema::Bytes),
                ("hex", Schema::String),
                ("asm", Schema::array(Schema::String)),
            ]),
        ),
        ("catches", Schema::array(Schema::String)),
    ])
}

fn event() -> Schema {
    Schema::structure([
        ("name", Schema::String),
        ("topics", Schema::Integer),
        ("fields", type_fields()),
    ])
}

fn state() -> Schema {
    Schema::structure([("mode", Schema::String), ("fields", type_fields())])
}

/// Payload schema for an element kind.
pub fn element(kind: ElementKind) -> Schema {
    match kind {
        ElementKind::Constant => constant(),
        ElementKind::Typedef => Schema::String,
        ElementKind::Class => class(),
        ElementKind::Method | ElementKind::Routine => routine(),
        ElementKind::Event => event(),
        ElementKind::State => state(),
    }
}

/// Exception payload: `{class, error, revert, trace}`.
pub fn exception() -> Schema {
    Schema::structure([
        ("class", Schema::String),
        ("error", Schema::String),
        ("revert", Schema::Bool),
        ("trace", Schema::array(Schema::String)),
    ])
}

/// Built-in log event: `{value}`.
pub fn log() -> Schema {
    Schema::structure([("value", Schema::String)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use logic_codec_core::SchemaKind;

    #[test]
    fn test_method_and_routine_share_schema() {
        assert_eq!(element(ElementKind::Method), element(ElementKind::Routine));
    }

    #[test]
    fn test_element_schemas() {
        assert_eq!(element(ElementKind::Typedef), Schema::String);
        assert_eq!(element(ElementKind::State).kind(), SchemaKind::Struct);
        assert_eq!(
            element(ElementKind::Event).field("topics"),
            Some(&Schema::Integer)
        );
        assert_eq!(deps(), Schema::array(Schema::Integer));
    }
}
