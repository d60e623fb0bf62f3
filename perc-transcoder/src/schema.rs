//! JSON-serializable schema description.
//!
//! These types describe ASN.1 types declaratively. They are intended
//! to be shipped as JSON (for example a pre-generated schema file)
//! and compiled into codecs by the [builder](crate::builder). The
//! JSON shape is a stable interchange format: a registry parsed from
//! JSON, compiled and applied to a document must behave identically
//! across implementations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::CodecError;

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// A named collection of schema nodes, as serialized to JSON.
pub type SchemaRegistry = BTreeMap<String, SchemaNode>;

/// Declarative description of a single ASN.1 type. `Ref` nodes point
/// at another entry of the enclosing registry and are resolved by
/// [`build_all`](crate::builder::build_all).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SchemaNode {
    #[serde(rename = "BOOLEAN")]
    Boolean,
    #[serde(rename = "NULL")]
    Null,
    #[serde(rename = "OBJECT IDENTIFIER")]
    ObjectIdentifier,
    #[serde(rename = "INTEGER")]
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
        #[serde(default, skip_serializing_if = "is_false")]
        extensible: bool,
    },
    #[serde(rename = "ENUMERATED", rename_all = "camelCase")]
    Enumerated {
        values: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extension_values: Option<Vec<String>>,
    },
    #[serde(rename = "BIT STRING", rename_all = "camelCase")]
    BitString {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fixed_size: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_size: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_size: Option<usize>,
        #[serde(default, skip_serializing_if = "is_false")]
        extensible: bool,
    },
    #[serde(rename = "OCTET STRING", rename_all = "camelCase")]
    OctetString {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fixed_size: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_size: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_size: Option<usize>,
        #[serde(default, skip_serializing_if = "is_false")]
        extensible: bool,
    },
    #[serde(rename = "IA5String", rename_all = "camelCase")]
    Ia5String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fixed_size: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_size: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_size: Option<usize>,
        #[serde(default, skip_serializing_if = "is_false")]
        extensible: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alphabet: Option<String>,
    },
    #[serde(rename = "VisibleString", rename_all = "camelCase")]
    VisibleString {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fixed_size: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_size: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_size: Option<usize>,
        #[serde(default, skip_serializing_if = "is_false")]
        extensible: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alphabet: Option<String>,
    },
    #[serde(rename = "UTF8String", rename_all = "camelCase")]
    Utf8String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fixed_size: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_size: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_size: Option<usize>,
        #[serde(default, skip_serializing_if = "is_false")]
        extensible: bool,
    },
    #[serde(rename = "SEQUENCE", rename_all = "camelCase")]
    Sequence {
        fields: Vec<FieldSchema>,
        /// Present exactly when the source type carried an extension
        /// marker; may be empty.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extension_fields: Option<Vec<FieldSchema>>,
    },
    #[serde(rename = "SEQUENCE OF", rename_all = "camelCase")]
    SequenceOf {
        item: Box<SchemaNode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fixed_size: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_size: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_size: Option<usize>,
        #[serde(default, skip_serializing_if = "is_false")]
        extensible: bool,
    },
    #[serde(rename = "CHOICE", rename_all = "camelCase")]
    Choice {
        alternatives: Vec<FieldSchema>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extension_alternatives: Option<Vec<FieldSchema>>,
    },
    #[serde(rename = "$ref")]
    Ref { name: String },
}

/// A SEQUENCE field or CHOICE alternative. `default_value` is a plain
/// JSON value interpreted against `schema` when the codec is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub name: String,
    pub schema: SchemaNode,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<JsonValue>,
}

impl FieldSchema {
    pub fn new(name: &str, schema: SchemaNode) -> Self {
        Self {
            name: name.into(),
            schema,
            optional: false,
            default_value: None,
        }
    }

    pub fn optional(name: &str, schema: SchemaNode) -> Self {
        Self {
            name: name.into(),
            schema,
            optional: true,
            default_value: None,
        }
    }

    pub fn with_default(name: &str, schema: SchemaNode, default_value: JsonValue) -> Self {
        Self {
            name: name.into(),
            schema,
            optional: false,
            default_value: Some(default_value),
        }
    }
}

/// Parses a `{name: schema-node}` registry from JSON.
pub fn registry_from_json(json: &str) -> Result<SchemaRegistry, CodecError> {
    serde_json::from_str(json)
        .map_err(|error| CodecError::schema(format!("malformed schema JSON: {error}")))
}

/// Serializes a registry back to its JSON interchange form.
pub fn registry_to_json(registry: &SchemaRegistry) -> Result<String, CodecError> {
    serde_json::to_string_pretty(registry)
        .map_err(|error| CodecError::schema(format!("schema not representable as JSON: {error}")))
}
