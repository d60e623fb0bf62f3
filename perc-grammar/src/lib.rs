//! The `perc-grammar` crate describes the single elements of the ASN1
//! notation that the perc parser understands. It includes constants for
//! the various ASN1 keywords and types to represent the single ASN1
//! data elements from which the converter produces en-/decodable
//! schemas.
#![no_std]
extern crate alloc;

pub mod constraints;
pub mod types;

use alloc::{string::String, vec::Vec};
use constraints::Constraint;
use types::*;

// Comment tokens
pub const BLOCK_COMMENT_START: &str = "/*";
pub const BLOCK_COMMENT_END: &str = "*/";
pub const LINE_COMMENT: &str = "--";

// Bracket tokens
pub const LEFT_PARENTHESIS: char = '(';
pub const RIGHT_PARENTHESIS: char = ')';
pub const LEFT_BRACE: char = '{';
pub const RIGHT_BRACE: char = '}';

// Type tokens
pub const NULL: &str = "NULL";
pub const BOOLEAN: &str = "BOOLEAN";
pub const INTEGER: &str = "INTEGER";
pub const BIT_STRING: &str = "BIT STRING";
pub const OCTET_STRING: &str = "OCTET STRING";
pub const IA5_STRING: &str = "IA5String";
pub const VISIBLE_STRING: &str = "VisibleString";
pub const UTF8_STRING: &str = "UTF8String";
pub const ENUMERATED: &str = "ENUMERATED";
pub const CHOICE: &str = "CHOICE";
pub const SEQUENCE: &str = "SEQUENCE";
pub const OF: &str = "OF";
pub const OBJECT_IDENTIFIER: &str = "OBJECT IDENTIFIER";

// Value tokens
pub const TRUE: &str = "TRUE";
pub const FALSE: &str = "FALSE";

// Header tokens
pub const DEFINITIONS: &str = "DEFINITIONS";
pub const BEGIN: &str = "BEGIN";
pub const END: &str = "END";
pub const AUTOMATIC: &str = "AUTOMATIC";
pub const EXPLICIT: &str = "EXPLICIT";
pub const IMPLICIT: &str = "IMPLICIT";
pub const TAGS: &str = "TAGS";

// Subtyping tokens
pub const SIZE: &str = "SIZE";
pub const FROM: &str = "FROM";
pub const DEFAULT: &str = "DEFAULT";
pub const OPTIONAL: &str = "OPTIONAL";
pub const MIN: &str = "MIN";
pub const MAX: &str = "MAX";

pub const ASSIGN: &str = "::=";
pub const RANGE: &str = "..";
pub const ELLIPSIS: &str = "...";
pub const COMMA: char = ',';
pub const SINGLE_QUOTE: char = '\'';

/// Tagging environment declared in a module header. Tagging has no
/// effect on the PER encoding; the environment is recorded only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaggingEnvironment {
    Automatic,
    Implicit,
    Explicit,
}

/// A parsed ASN1 module header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub name: String,
    pub module_identifier: Option<ObjectIdentifierValue>,
    pub tagging_environment: TaggingEnvironment,
}

impl
    From<(
        &str,
        Option<ObjectIdentifierValue>,
        Option<TaggingEnvironment>,
    )> for Header
{
    fn from(
        value: (
            &str,
            Option<ObjectIdentifierValue>,
            Option<TaggingEnvironment>,
        ),
    ) -> Self {
        Self {
            name: value.0.into(),
            module_identifier: value.1,
            tagging_environment: value.2.unwrap_or(TaggingEnvironment::Explicit),
        }
    }
}

/// An object identifier value as it appears in a module header,
/// e.g. `{ itu-t(0) identified-organization(4) }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectIdentifierValue(pub Vec<ObjectIdentifierArc>);

impl From<Vec<ObjectIdentifierArc>> for ObjectIdentifierValue {
    fn from(value: Vec<ObjectIdentifierArc>) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectIdentifierArc {
    pub name: Option<String>,
    pub number: Option<u64>,
}

impl From<u64> for ObjectIdentifierArc {
    fn from(value: u64) -> Self {
        Self {
            name: None,
            number: Some(value),
        }
    }
}

impl From<&str> for ObjectIdentifierArc {
    fn from(value: &str) -> Self {
        Self {
            name: Some(value.into()),
            number: None,
        }
    }
}

impl From<(&str, u64)> for ObjectIdentifierArc {
    fn from(value: (&str, u64)) -> Self {
        Self {
            name: Some(value.0.into()),
            number: Some(value.1),
        }
    }
}

/// A parsed ASN1 module: header plus type assignments in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub header: Header,
    pub declarations: Vec<ToplevelDeclaration>,
}

/// A single top-level type assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ToplevelDeclaration {
    pub comments: String,
    pub name: String,
    pub ty: ASN1Type,
}

impl From<(Vec<&str>, &str, ASN1Type)> for ToplevelDeclaration {
    fn from(value: (Vec<&str>, &str, ASN1Type)) -> Self {
        Self {
            comments: value.0.join("\n"),
            name: value.1.into(),
            ty: value.2,
        }
    }
}

/// The possible types of an ASN1 data element. The
/// `ElsewhereDeclaredType` enumeral denotes a type specified in
/// another assignment of the same module.
#[derive(Debug, Clone, PartialEq)]
pub enum ASN1Type {
    Null,
    Boolean,
    ObjectIdentifier,
    Integer(Integer),
    BitString(BitString),
    OctetString(OctetString),
    CharacterString(CharacterString),
    Enumerated(Enumerated),
    Choice(Choice),
    Sequence(Sequence),
    SequenceOf(SequenceOf),
    ElsewhereDeclaredType(DeclarationElsewhere),
}

/// The possible types of an ASN1 value, as they occur in DEFAULT
/// clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum ASN1Value {
    Null,
    Boolean(bool),
    Integer(i128),
    String(String),
    BitString(Vec<bool>),
    OctetString(Vec<u8>),
    EnumeratedValue(String),
}

/// The character string flavors understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterStringKind {
    Ia5String,
    VisibleString,
    Utf8String,
}

impl From<&str> for CharacterStringKind {
    fn from(value: &str) -> Self {
        match value {
            IA5_STRING => Self::Ia5String,
            VISIBLE_STRING => Self::VisibleString,
            _ => Self::Utf8String,
        }
    }
}

/// Intermediate placeholder for a type declared in some other part of
/// the ASN1 module that is being parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationElsewhere {
    pub identifier: String,
    pub constraints: Vec<Constraint>,
}

impl From<(&str, Option<Vec<Constraint>>)> for DeclarationElsewhere {
    fn from(value: (&str, Option<Vec<Constraint>>)) -> Self {
        DeclarationElsewhere {
            identifier: value.0.into(),
            constraints: value.1.unwrap_or_default(),
        }
    }
}
