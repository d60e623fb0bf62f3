//! Transforms a parsed module into a schema-node registry.
//!
//! Referenced types are inlined when the reference is acyclic;
//! recursive references become `$ref` nodes that the schema builder
//! resolves lazily. Cycle detection is a depth-first walk with a
//! currently-visiting set keyed by type name.

use core::fmt::{Display, Formatter};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;

use perc_grammar::{
    constraints::{Constraint, ValueConstraint},
    types::*,
    ASN1Type, ASN1Value, CharacterStringKind, Module,
};
use perc_transcoder::{FieldSchema, SchemaNode, SchemaRegistry};
use serde_json::{json, Value as JsonValue};

/// How `convert` treats top-level OBJECT IDENTIFIER type assignments:
/// `Omit` drops them from the produced registry (references to them
/// still inline fine, since inlining happens before the filter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OidPolicy {
    #[default]
    Keep,
    Omit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub oid: OidPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConverterError {
    pub details: String,
    pub kind: ConverterErrorType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterErrorType {
    /// A referenced name is neither defined in the module nor a
    /// primitive.
    UnresolvedTypeReference,
    /// The notation uses a construct outside the supported subset.
    UnsupportedConstruct,
    /// A literal value cannot be represented (bounds outside the
    /// 64-bit window, negative sizes, malformed defaults).
    UnsupportedValue,
}

impl ConverterError {
    pub fn new(details: &str, kind: ConverterErrorType) -> Self {
        ConverterError {
            details: details.into(),
            kind,
        }
    }

    fn unsupported(details: impl Into<String>) -> Self {
        ConverterError {
            details: details.into(),
            kind: ConverterErrorType::UnsupportedConstruct,
        }
    }

    fn value(details: impl Into<String>) -> Self {
        ConverterError {
            details: details.into(),
            kind: ConverterErrorType::UnsupportedValue,
        }
    }

    fn at(mut self, path: &str) -> Self {
        self.details = format!("{path}: {}", self.details);
        self
    }
}

impl Error for ConverterError {}

impl Display for ConverterError {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(
            f,
            "{:?} converting ASN1 module to schema: {}",
            self.kind, self.details
        )
    }
}

type TypeTable<'a> = BTreeMap<&'a str, &'a ASN1Type>;

/// Converts a parsed module into a schema registry.
pub fn convert(module: &Module, options: ConvertOptions) -> Result<SchemaRegistry, ConverterError> {
    let table: TypeTable = module
        .declarations
        .iter()
        .map(|declaration| (declaration.name.as_str(), &declaration.ty))
        .collect();
    let mut registry = SchemaRegistry::new();
    for declaration in &module.declarations {
        if options.oid == OidPolicy::Omit && declaration.ty == ASN1Type::ObjectIdentifier {
            continue;
        }
        let mut visiting = HashSet::new();
        visiting.insert(declaration.name.as_str());
        let node = convert_type(&declaration.ty, &table, &mut visiting)
            .map_err(|error| error.at(&declaration.name))?;
        registry.insert(declaration.name.clone(), node);
    }
    Ok(registry)
}

fn convert_type<'a>(
    ty: &'a ASN1Type,
    table: &TypeTable<'a>,
    visiting: &mut HashSet<&'a str>,
) -> Result<SchemaNode, ConverterError> {
    match ty {
        ASN1Type::Null => Ok(SchemaNode::Null),
        ASN1Type::Boolean => Ok(SchemaNode::Boolean),
        ASN1Type::ObjectIdentifier => Ok(SchemaNode::ObjectIdentifier),
        ASN1Type::Integer(integer) => convert_integer(integer),
        ASN1Type::BitString(bit_string) => {
            let (fixed_size, min_size, max_size, extensible) =
                size_fields(&bit_string.constraints)?;
            Ok(SchemaNode::BitString {
                fixed_size,
                min_size,
                max_size,
                extensible,
            })
        }
        ASN1Type::OctetString(octet_string) => {
            let (fixed_size, min_size, max_size, extensible) =
                size_fields(&octet_string.constraints)?;
            Ok(SchemaNode::OctetString {
                fixed_size,
                min_size,
                max_size,
                extensible,
            })
        }
        ASN1Type::CharacterString(character_string) => convert_character_string(character_string),
        ASN1Type::Enumerated(enumerated) => Ok(convert_enumerated(enumerated)),
        ASN1Type::Sequence(sequence) => convert_sequence(sequence, table, visiting),
        ASN1Type::SequenceOf(sequence_of) => {
            let (fixed_size, min_size, max_size, extensible) =
                size_fields(&sequence_of.constraints)?;
            Ok(SchemaNode::SequenceOf {
                item: Box::new(convert_type(&sequence_of.item, table, visiting)?),
                fixed_size,
                min_size,
                max_size,
                extensible,
            })
        }
        ASN1Type::Choice(choice) => convert_choice(choice, table, visiting),
        ASN1Type::ElsewhereDeclaredType(elsewhere) => {
            let name = elsewhere.identifier.as_str();
            let Some(target) = table.get(name) else {
                return Err(ConverterError {
                    details: format!("unresolved type reference '{name}'"),
                    kind: ConverterErrorType::UnresolvedTypeReference,
                });
            };
            if visiting.contains(name) {
                if !elsewhere.constraints.is_empty() {
                    return Err(ConverterError::unsupported(format!(
                        "constraints on the recursive reference '{name}' are not supported"
                    )));
                }
                return Ok(SchemaNode::Ref { name: name.into() });
            }
            visiting.insert(name);
            let mut node = convert_type(target, table, visiting)?;
            visiting.remove(name);
            apply_reference_constraints(&mut node, &elsewhere.constraints)?;
            Ok(node)
        }
    }
}

fn convert_integer(integer: &Integer) -> Result<SchemaNode, ConverterError> {
    // Named values are parsed but deliberately not distinguished from
    // a plain INTEGER.
    let constraint = value_constraint_of(&integer.constraints);
    let (min, max, extensible) = match constraint {
        Some(constraint) => (
            bound_to_i64(constraint.min_value)?,
            bound_to_i64(constraint.max_value)?,
            constraint.extensible,
        ),
        None => (None, None, false),
    };
    Ok(SchemaNode::Integer {
        min,
        max,
        extensible,
    })
}

fn convert_character_string(
    character_string: &CharacterString,
) -> Result<SchemaNode, ConverterError> {
    let (fixed_size, min_size, max_size, extensible) =
        size_fields(&character_string.constraints)?;
    let alphabet = alphabet_of(&character_string.constraints).map(String::from);
    match character_string.kind {
        CharacterStringKind::Ia5String => Ok(SchemaNode::Ia5String {
            fixed_size,
            min_size,
            max_size,
            extensible,
            alphabet,
        }),
        CharacterStringKind::VisibleString => Ok(SchemaNode::VisibleString {
            fixed_size,
            min_size,
            max_size,
            extensible,
            alphabet,
        }),
        CharacterStringKind::Utf8String => {
            if alphabet.is_some() {
                return Err(ConverterError::unsupported(
                    "a permitted alphabet on UTF8String",
                ));
            }
            Ok(SchemaNode::Utf8String {
                fixed_size,
                min_size,
                max_size,
                extensible,
            })
        }
    }
}

fn convert_enumerated(enumerated: &Enumerated) -> SchemaNode {
    // Wire indices follow declaration order; explicit numbers do not
    // reorder the root set.
    let split = enumerated
        .extension_index
        .unwrap_or(enumerated.members.len());
    let values = enumerated.members[..split]
        .iter()
        .map(|member| member.name.clone())
        .collect();
    let extension_values = enumerated.extension_index.map(|_| {
        enumerated.members[split..]
            .iter()
            .map(|member| member.name.clone())
            .collect()
    });
    SchemaNode::Enumerated {
        values,
        extension_values,
    }
}

fn convert_sequence<'a>(
    sequence: &'a Sequence,
    table: &TypeTable<'a>,
    visiting: &mut HashSet<&'a str>,
) -> Result<SchemaNode, ConverterError> {
    let split = sequence.extension_index.unwrap_or(sequence.members.len());
    let fields = sequence.members[..split]
        .iter()
        .map(|member| convert_member(member, table, visiting))
        .collect::<Result<Vec<_>, _>>()?;
    let extension_fields = sequence
        .extension_index
        .map(|_| {
            sequence.members[split..]
                .iter()
                .map(|member| convert_member(member, table, visiting))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;
    Ok(SchemaNode::Sequence {
        fields,
        extension_fields,
    })
}

fn convert_member<'a>(
    member: &'a SequenceMember,
    table: &TypeTable<'a>,
    visiting: &mut HashSet<&'a str>,
) -> Result<FieldSchema, ConverterError> {
    let schema =
        convert_type(&member.ty, table, visiting).map_err(|error| error.at(&member.name))?;
    let default_value = member
        .default_value
        .as_ref()
        .map(|value| default_to_json(value).map_err(|error| error.at(&member.name)))
        .transpose()?;
    Ok(FieldSchema {
        name: member.name.clone(),
        schema,
        optional: member.is_optional && default_value.is_none(),
        default_value,
    })
}

fn convert_choice<'a>(
    choice: &'a Choice,
    table: &TypeTable<'a>,
    visiting: &mut HashSet<&'a str>,
) -> Result<SchemaNode, ConverterError> {
    let split = choice.extension_index.unwrap_or(choice.options.len());
    let convert_option = |option: &'a ChoiceOption,
                          visiting: &mut HashSet<&'a str>|
     -> Result<FieldSchema, ConverterError> {
        Ok(FieldSchema::new(
            &option.name,
            convert_type(&option.ty, table, visiting).map_err(|error| error.at(&option.name))?,
        ))
    };
    let alternatives = choice.options[..split]
        .iter()
        .map(|option| convert_option(option, visiting))
        .collect::<Result<Vec<_>, _>>()?;
    let extension_alternatives = choice
        .extension_index
        .map(|_| {
            choice.options[split..]
                .iter()
                .map(|option| convert_option(option, visiting))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;
    Ok(SchemaNode::Choice {
        alternatives,
        extension_alternatives,
    })
}

fn value_constraint_of(constraints: &[Constraint]) -> Option<&ValueConstraint> {
    constraints.iter().find_map(|constraint| match constraint {
        Constraint::Value(value) => Some(value),
        _ => None,
    })
}

fn size_constraint_of(constraints: &[Constraint]) -> Option<&ValueConstraint> {
    constraints.iter().find_map(|constraint| match constraint {
        Constraint::Size(size) => Some(size),
        _ => None,
    })
}

fn alphabet_of(constraints: &[Constraint]) -> Option<&str> {
    constraints.iter().find_map(|constraint| match constraint {
        Constraint::PermittedAlphabet(alphabet) => Some(alphabet.as_str()),
        _ => None,
    })
}

fn size_fields(
    constraints: &[Constraint],
) -> Result<(Option<usize>, Option<usize>, Option<usize>, bool), ConverterError> {
    let Some(constraint) = size_constraint_of(constraints) else {
        return Ok((None, None, None, false));
    };
    let min = constraint.min_value.map(bound_to_usize).transpose()?;
    let max = constraint.max_value.map(bound_to_usize).transpose()?;
    if min.is_some() && min == max {
        Ok((min, None, None, constraint.extensible))
    } else {
        Ok((None, min, max, constraint.extensible))
    }
}

fn bound_to_i64(bound: Option<i128>) -> Result<Option<i64>, ConverterError> {
    bound
        .map(|bound| {
            i64::try_from(bound).map_err(|_| {
                ConverterError::value(format!("bound {bound} exceeds the 64-bit integer window"))
            })
        })
        .transpose()
}

fn bound_to_usize(bound: i128) -> Result<usize, ConverterError> {
    usize::try_from(bound)
        .map_err(|_| ConverterError::value(format!("size bound {bound} is not a valid size")))
}

/// Applies the constraints written on a type reference to the inlined
/// node, e.g. `Identifier (SIZE(3))` narrowing an OCTET STRING.
fn apply_reference_constraints(
    node: &mut SchemaNode,
    constraints: &[Constraint],
) -> Result<(), ConverterError> {
    if constraints.is_empty() {
        return Ok(());
    }
    match node {
        SchemaNode::Integer {
            min,
            max,
            extensible,
        } => {
            if let Some(constraint) = value_constraint_of(constraints) {
                *min = bound_to_i64(constraint.min_value)?;
                *max = bound_to_i64(constraint.max_value)?;
                *extensible = constraint.extensible;
            }
            Ok(())
        }
        SchemaNode::BitString {
            fixed_size,
            min_size,
            max_size,
            extensible,
        }
        | SchemaNode::OctetString {
            fixed_size,
            min_size,
            max_size,
            extensible,
        }
        | SchemaNode::Utf8String {
            fixed_size,
            min_size,
            max_size,
            extensible,
        }
        | SchemaNode::SequenceOf {
            fixed_size,
            min_size,
            max_size,
            extensible,
            ..
        } => {
            let (fixed, min, max, ext) = size_fields(constraints)?;
            *fixed_size = fixed;
            *min_size = min;
            *max_size = max;
            *extensible = ext;
            Ok(())
        }
        SchemaNode::Ia5String {
            fixed_size,
            min_size,
            max_size,
            extensible,
            alphabet,
        }
        | SchemaNode::VisibleString {
            fixed_size,
            min_size,
            max_size,
            extensible,
            alphabet,
        } => {
            if size_constraint_of(constraints).is_some() {
                let (fixed, min, max, ext) = size_fields(constraints)?;
                *fixed_size = fixed;
                *min_size = min;
                *max_size = max;
                *extensible = ext;
            }
            if let Some(characters) = alphabet_of(constraints) {
                *alphabet = Some(characters.into());
            }
            Ok(())
        }
        _ => Err(ConverterError::unsupported(
            "constraints on this kind of type reference",
        )),
    }
}

/// Converts a parsed DEFAULT value to its JSON schema representation.
fn default_to_json(value: &ASN1Value) -> Result<JsonValue, ConverterError> {
    match value {
        ASN1Value::Null => Ok(JsonValue::Null),
        ASN1Value::Boolean(value) => Ok(json!(value)),
        ASN1Value::Integer(value) => {
            let value = i64::try_from(*value).map_err(|_| {
                ConverterError::value(format!(
                    "default {value} exceeds the 64-bit integer window"
                ))
            })?;
            Ok(json!(value))
        }
        ASN1Value::String(text) => Ok(json!(text)),
        ASN1Value::EnumeratedValue(name) => Ok(json!(name)),
        ASN1Value::OctetString(bytes) => Ok(json!(bytes)),
        ASN1Value::BitString(bits) => {
            let mut data = vec![0u8; (bits.len() + 7) / 8];
            for (index, bit) in bits.iter().enumerate() {
                if *bit {
                    data[index / 8] |= 1 << (7 - index % 8);
                }
            }
            Ok(json!({ "data": data, "bitLength": bits.len() }))
        }
    }
}
