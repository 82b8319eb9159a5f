//! JSON‑deserializable schema description.
//!
//! These types describe the *shape* of a record. They are intended to be
//! loaded from JSON (for example a protocol definition shipped with your
//! application) and then compiled with `Schema::try_from` or
//! `Schema::from_json`.
//!
//! ```json
//! {
//!   "fields": [
//!     { "name": "Length", "kind": { "type": "Scalar", "scalar": "U16" }, "tag": "sizeof=Data" },
//!     { "name": "Data", "kind": { "type": "Bytes" } }
//!   ],
//!   "options": { "default_endian": "Little" }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Top‑level schema definition: fields in declaration order.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchemaDef {
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub options: Option<OptionsDef>,
}

/// Schema-wide settings.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct OptionsDef {
    /// Byte order for fields without an endian directive.
    #[serde(default)]
    pub default_endian: EndianDef,
    /// Reject decoded size-of values that disagree with the field widths.
    #[serde(default)]
    pub verify_sizeof: bool,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub enum EndianDef {
    #[default]
    Big,
    Little,
}

/// Description of a single field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    /// Field name; becomes the key in encoded and decoded records.
    pub name: String,
    pub kind: FieldKindDef,
    /// Tag directives, e.g. `"little,2B"` or `"sizeof=Cmd+Data"`.
    #[serde(default)]
    pub tag: String,
}

/// Kind of field in the schema.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum FieldKindDef {
    Scalar {
        scalar: ScalarDef,
    },
    /// Fixed‑length array of scalars.
    Array {
        element: ScalarDef,
        count: usize,
    },
    /// Variable‑length byte sequence.
    Bytes,
    /// Zero bytes; the width comes from the tag.
    Padding,
    /// Nested record. Only the empty form compiles.
    Struct {
        fields: Vec<FieldDef>,
    },
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub enum ScalarDef {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

#[cfg(test)]
mod tests {
    use crate::{
        errors::{CompileError, Error},
        schema::Schema,
        value::{Record, Value},
    };

    const PACKET: &str = r#"{
        "fields": [
            { "name": "Protocol", "kind": { "type": "Scalar", "scalar": "U16" } },
            { "name": "Length", "kind": { "type": "Scalar", "scalar": "U16" }, "tag": "sizeof=Data+CRC" },
            { "name": "Data", "kind": { "type": "Bytes" } },
            { "name": "Padding", "kind": { "type": "Padding" }, "tag": "1B" },
            { "name": "CRC", "kind": { "type": "Scalar", "scalar": "U16" }, "tag": "little" }
        ]
    }"#;

    #[test]
    fn test_schema_from_json() {
        let schema = Schema::from_json(PACKET).unwrap();
        let record = Record::new()
            .with("Protocol", Value::U16(1))
            .with("Length", Value::U16(4))
            .with("Data", Value::Bytes(vec![0xAB, 0xCD]))
            .with("Padding", Value::Record(Record::new()))
            .with("CRC", Value::U16(0x0102));

        let bytes = schema.encode(&record).unwrap();
        assert_eq!(bytes, vec![0, 1, 0, 4, 0xAB, 0xCD, 0, 0x02, 0x01]);
        assert_eq!(schema.decode(&bytes).unwrap(), record);
    }

    #[test]
    fn test_options_from_json() {
        let json = r#"{
            "fields": [{ "name": "a", "kind": { "type": "Scalar", "scalar": "U16" } }],
            "options": { "default_endian": "Little", "verify_sizeof": true }
        }"#;
        let schema = Schema::from_json(json).unwrap();

        assert!(schema.options().verify_sizeof);
        let record = Record::new().with("a", Value::U16(0x0102));
        assert_eq!(schema.encode(&record).unwrap(), vec![0x02, 0x01]);
    }

    #[test]
    fn test_nested_struct_rejected() {
        let json = r#"{
            "fields": [{
                "name": "inner",
                "kind": { "type": "Struct", "fields": [
                    { "name": "x", "kind": { "type": "Scalar", "scalar": "U8" } }
                ] }
            }]
        }"#;

        assert!(matches!(
            Schema::from_json(json),
            Err(Error::Compile(CompileError::UnsupportedFieldKind { .. }))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(Schema::from_json("{"), Err(Error::Json(_))));
    }
}
