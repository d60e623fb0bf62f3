//! Compiles schema nodes into codecs.
//!
//! [`build`] compiles a single node and rejects `$ref` nodes, which
//! cannot be resolved without a registry. [`build_all`] compiles a
//! whole registry in two phases: it first allocates one lazy codec
//! slot per name, then compiles every node with `$ref` children
//! pointing at the slots, and finally fills each slot with its
//! finished codec. The first encode or decode that crosses a
//! recursive reference therefore dereferences a fully built codec.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use serde_json::Value as JsonValue;

use crate::error::CodecError;
use crate::schema::{FieldSchema, SchemaNode, SchemaRegistry};
use crate::uper::{
    ChoiceAlternative, Codec, IntegerConstraints, SequenceField, SizeConstraints, StringKind,
};
use crate::value::{BitStringValue, Value};

/// Lazy proxy standing in for a named codec while its registry is
/// being compiled. Effectively immutable once `build_all` returns.
#[derive(Debug, Clone)]
pub struct ReferenceCodec {
    name: String,
    slot: Arc<OnceLock<Codec>>,
}

impl ReferenceCodec {
    fn new(name: &str, slot: Arc<OnceLock<Codec>>) -> Self {
        Self {
            name: name.into(),
            slot,
        }
    }

    /// The referenced type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn peek(&self) -> Option<&Codec> {
        self.slot.get()
    }

    pub(crate) fn resolve(&self) -> Result<&Codec, CodecError> {
        self.slot.get().ok_or_else(|| {
            CodecError::schema(format!("reference '{}' is not resolved", self.name))
        })
    }
}

type Slots = BTreeMap<String, Arc<OnceLock<Codec>>>;

/// Compiles a single schema node into a codec. Fails on `$ref` nodes:
/// references need [`build_all`] and a registry.
pub fn build(node: &SchemaNode) -> Result<Codec, CodecError> {
    compile(node, None)
}

/// Compiles every named schema of a registry, resolving `$ref` nodes
/// (including cycles) against the registry itself.
pub fn build_all(registry: &SchemaRegistry) -> Result<BTreeMap<String, Codec>, CodecError> {
    let slots: Slots = registry
        .keys()
        .map(|name| (name.clone(), Arc::new(OnceLock::new())))
        .collect();
    let mut codecs = BTreeMap::new();
    for (name, node) in registry {
        let codec = compile(node, Some(&slots)).map_err(|error| error.at(name))?;
        codecs.insert(name.clone(), codec);
    }
    for (name, codec) in &codecs {
        let _ = slots[name].set(codec.clone());
    }
    Ok(codecs)
}

fn compile(node: &SchemaNode, slots: Option<&Slots>) -> Result<Codec, CodecError> {
    match node {
        SchemaNode::Boolean => Ok(Codec::boolean()),
        SchemaNode::Null => Ok(Codec::null()),
        SchemaNode::ObjectIdentifier => Ok(Codec::object_identifier()),
        SchemaNode::Integer {
            min,
            max,
            extensible,
        } => {
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    return Err(CodecError::schema(format!(
                        "integer bounds {min}..{max} are inverted"
                    )));
                }
            }
            Ok(Codec::integer(IntegerConstraints {
                min: *min,
                max: *max,
                extensible: *extensible,
            }))
        }
        SchemaNode::Enumerated {
            values,
            extension_values,
        } => {
            if values.is_empty() {
                return Err(CodecError::schema("enumeration has no root values"));
            }
            Ok(Codec::enumerated(values.clone(), extension_values.clone()))
        }
        SchemaNode::BitString {
            fixed_size,
            min_size,
            max_size,
            extensible,
        } => Ok(Codec::bit_string(size_constraints(
            *fixed_size,
            *min_size,
            *max_size,
            *extensible,
        )?)),
        SchemaNode::OctetString {
            fixed_size,
            min_size,
            max_size,
            extensible,
        } => Ok(Codec::octet_string(size_constraints(
            *fixed_size,
            *min_size,
            *max_size,
            *extensible,
        )?)),
        SchemaNode::Ia5String {
            fixed_size,
            min_size,
            max_size,
            extensible,
            alphabet,
        } => Codec::character_string(
            StringKind::Ia5,
            size_constraints(*fixed_size, *min_size, *max_size, *extensible)?,
            alphabet.as_deref(),
        ),
        SchemaNode::VisibleString {
            fixed_size,
            min_size,
            max_size,
            extensible,
            alphabet,
        } => Codec::character_string(
            StringKind::Visible,
            size_constraints(*fixed_size, *min_size, *max_size, *extensible)?,
            alphabet.as_deref(),
        ),
        SchemaNode::Utf8String {
            fixed_size,
            min_size,
            max_size,
            extensible,
        } => Codec::character_string(
            StringKind::Utf8,
            size_constraints(*fixed_size, *min_size, *max_size, *extensible)?,
            None,
        ),
        SchemaNode::Sequence {
            fields,
            extension_fields,
        } => {
            let root = fields
                .iter()
                .map(|field| compile_field(field, slots))
                .collect::<Result<Vec<_>, _>>()?;
            let extensions = extension_fields
                .as_ref()
                .map(|fields| {
                    fields
                        .iter()
                        .map(|field| compile_field(field, slots))
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()?;
            Ok(Codec::sequence(root, extensions))
        }
        SchemaNode::SequenceOf {
            item,
            fixed_size,
            min_size,
            max_size,
            extensible,
        } => Ok(Codec::sequence_of(
            compile(item, slots)?,
            size_constraints(*fixed_size, *min_size, *max_size, *extensible)?,
        )),
        SchemaNode::Choice {
            alternatives,
            extension_alternatives,
        } => {
            if alternatives.is_empty() {
                return Err(CodecError::schema("choice has no root alternatives"));
            }
            let root = alternatives
                .iter()
                .map(|alternative| compile_alternative(alternative, slots))
                .collect::<Result<Vec<_>, _>>()?;
            let extensions = extension_alternatives
                .as_ref()
                .map(|alternatives| {
                    alternatives
                        .iter()
                        .map(|alternative| compile_alternative(alternative, slots))
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()?;
            Ok(Codec::choice(root, extensions))
        }
        SchemaNode::Ref { name } => match slots {
            None => Err(CodecError::schema(format!(
                "cannot resolve reference '{name}' without a registry"
            ))),
            Some(slots) => slots
                .get(name)
                .map(|slot| Codec::Reference(ReferenceCodec::new(name, slot.clone())))
                .ok_or_else(|| {
                    CodecError::schema(format!("reference '{name}' is not in the registry"))
                }),
        },
    }
}

fn compile_field(field: &FieldSchema, slots: Option<&Slots>) -> Result<SequenceField, CodecError> {
    let codec = compile(&field.schema, slots).map_err(|error| error.at(&field.name))?;
    let default = field
        .default_value
        .as_ref()
        .map(|json| default_value(&field.schema, json).map_err(|error| error.at(&field.name)))
        .transpose()?;
    Ok(SequenceField {
        name: field.name.clone(),
        codec,
        optional: field.optional || default.is_some(),
        default,
    })
}

fn compile_alternative(
    alternative: &FieldSchema,
    slots: Option<&Slots>,
) -> Result<ChoiceAlternative, CodecError> {
    let codec = compile(&alternative.schema, slots).map_err(|error| error.at(&alternative.name))?;
    Ok(ChoiceAlternative {
        name: alternative.name.clone(),
        codec,
    })
}

fn size_constraints(
    fixed: Option<usize>,
    min: Option<usize>,
    max: Option<usize>,
    extensible: bool,
) -> Result<SizeConstraints, CodecError> {
    if fixed.is_some() && (min.is_some() || max.is_some()) {
        return Err(CodecError::schema(
            "fixedSize cannot be combined with minSize/maxSize",
        ));
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(CodecError::schema(format!(
                "size bounds {min}..{max} are inverted"
            )));
        }
    }
    Ok(SizeConstraints {
        fixed,
        min,
        max,
        extensible,
    })
}

/// Interprets a JSON default against the field's schema.
fn default_value(schema: &SchemaNode, json: &JsonValue) -> Result<Value, CodecError> {
    let mismatch = || {
        CodecError::schema(format!(
            "default value {json} does not fit the field's type"
        ))
    };
    match schema {
        SchemaNode::Boolean => json.as_bool().map(Value::Boolean).ok_or_else(mismatch),
        SchemaNode::Null => match json {
            JsonValue::Null => Ok(Value::Null),
            _ => Err(mismatch()),
        },
        SchemaNode::Integer { .. } => json.as_i64().map(Value::Integer).ok_or_else(mismatch),
        SchemaNode::Enumerated {
            values,
            extension_values,
        } => {
            let name = json.as_str().ok_or_else(mismatch)?;
            let known = values.iter().any(|value| value == name)
                || extension_values
                    .as_ref()
                    .is_some_and(|values| values.iter().any(|value| value == name));
            if !known {
                return Err(CodecError::schema(format!(
                    "default '{name}' is not an enumeration value"
                )));
            }
            Ok(Value::Text(name.into()))
        }
        SchemaNode::Ia5String { .. }
        | SchemaNode::VisibleString { .. }
        | SchemaNode::Utf8String { .. } => json
            .as_str()
            .map(|text| Value::Text(text.into()))
            .ok_or_else(mismatch),
        SchemaNode::BitString { .. } => {
            let data = json
                .get("data")
                .and_then(JsonValue::as_array)
                .ok_or_else(mismatch)?
                .iter()
                .map(|byte| byte.as_u64().and_then(|byte| u8::try_from(byte).ok()))
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(mismatch)?;
            let bit_length = json
                .get("bitLength")
                .and_then(JsonValue::as_u64)
                .ok_or_else(mismatch)? as usize;
            Ok(Value::Bits(BitStringValue { data, bit_length }))
        }
        SchemaNode::OctetString { .. } => json
            .as_array()
            .ok_or_else(mismatch)?
            .iter()
            .map(|byte| byte.as_u64().and_then(|byte| u8::try_from(byte).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(Value::Bytes)
            .ok_or_else(mismatch),
        SchemaNode::ObjectIdentifier => json
            .as_array()
            .ok_or_else(mismatch)?
            .iter()
            .map(JsonValue::as_u64)
            .collect::<Option<Vec<u64>>>()
            .map(Value::Oid)
            .ok_or_else(mismatch),
        _ => Err(CodecError::schema(
            "default values on composite fields are not supported",
        )),
    }
}
