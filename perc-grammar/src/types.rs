//! Representations of the single ASN1 data elements, with their
//! constraints and member lists as they were written in the notation.

use alloc::{boxed::Box, string::String, vec, vec::Vec};

use crate::{constraints::*, ASN1Type, ASN1Value, CharacterStringKind};

/// A named value from an INTEGER value list, e.g. `unavailable (161)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistinguishedValue {
    pub name: String,
    pub value: i128,
}

impl From<(&str, i128)> for DistinguishedValue {
    fn from(value: (&str, i128)) -> Self {
        Self {
            name: value.0.into(),
            value: value.1,
        }
    }
}

/// Representation of an ASN1 INTEGER data element with corresponding
/// constraints and distinguished values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Integer {
    pub constraints: Vec<Constraint>,
    pub distinguished_values: Option<Vec<DistinguishedValue>>,
}

impl From<(Option<Vec<DistinguishedValue>>, Option<ValueConstraint>)> for Integer {
    fn from(value: (Option<Vec<DistinguishedValue>>, Option<ValueConstraint>)) -> Self {
        Self {
            constraints: value.1.map_or(vec![], |c| vec![Constraint::Value(c)]),
            distinguished_values: value.0,
        }
    }
}

/// Representation of an ASN1 BIT STRING data element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BitString {
    pub constraints: Vec<Constraint>,
}

impl From<Option<ValueConstraint>> for BitString {
    fn from(value: Option<ValueConstraint>) -> Self {
        Self {
            constraints: value.map_or(vec![], |c| vec![Constraint::Size(c)]),
        }
    }
}

/// Representation of an ASN1 OCTET STRING data element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OctetString {
    pub constraints: Vec<Constraint>,
}

impl From<Option<ValueConstraint>> for OctetString {
    fn from(value: Option<ValueConstraint>) -> Self {
        Self {
            constraints: value.map_or(vec![], |c| vec![Constraint::Size(c)]),
        }
    }
}

/// Representation of an ASN1 character string with its flavor and any
/// SIZE or FROM constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterString {
    pub kind: CharacterStringKind,
    pub constraints: Vec<Constraint>,
}

impl From<(&str, Option<Vec<Constraint>>)> for CharacterString {
    fn from(value: (&str, Option<Vec<Constraint>>)) -> Self {
        CharacterString {
            kind: value.0.into(),
            constraints: value.1.unwrap_or_default(),
        }
    }
}

/// A single member of an ENUMERATED, with its optional explicit number.
#[derive(Debug, Clone, PartialEq)]
pub struct Enumeral {
    pub name: String,
    pub number: Option<i128>,
}

impl From<(&str, Option<i128>)> for Enumeral {
    fn from(value: (&str, Option<i128>)) -> Self {
        Self {
            name: value.0.into(),
            number: value.1,
        }
    }
}

/// Representation of an ASN1 ENUMERATED data element.
/// `extension_index` is the position of the `...` marker within the
/// member list, if one was present.
#[derive(Debug, Clone, PartialEq)]
pub struct Enumerated {
    pub members: Vec<Enumeral>,
    pub extension_index: Option<usize>,
}

/// A single member of a SEQUENCE.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceMember {
    pub name: String,
    pub ty: ASN1Type,
    pub is_optional: bool,
    pub default_value: Option<ASN1Value>,
}

impl From<(&str, ASN1Type, Option<OptionalMarker>, Option<ASN1Value>)> for SequenceMember {
    fn from(value: (&str, ASN1Type, Option<OptionalMarker>, Option<ASN1Value>)) -> Self {
        Self {
            name: value.0.into(),
            ty: value.1,
            is_optional: value.2.is_some() || value.3.is_some(),
            default_value: value.3,
        }
    }
}

/// Representation of an ASN1 SEQUENCE data element. Members behind the
/// `...` marker are extension additions.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub members: Vec<SequenceMember>,
    pub extension_index: Option<usize>,
}

/// Representation of an ASN1 SEQUENCE OF data element.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceOf {
    pub constraints: Vec<Constraint>,
    pub item: Box<ASN1Type>,
}

impl From<(Option<ValueConstraint>, ASN1Type)> for SequenceOf {
    fn from(value: (Option<ValueConstraint>, ASN1Type)) -> Self {
        Self {
            constraints: value.0.map_or(vec![], |c| vec![Constraint::Size(c)]),
            item: Box::new(value.1),
        }
    }
}

/// A single alternative of a CHOICE.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOption {
    pub name: String,
    pub ty: ASN1Type,
}

impl From<(&str, ASN1Type)> for ChoiceOption {
    fn from(value: (&str, ASN1Type)) -> Self {
        Self {
            name: value.0.into(),
            ty: value.1,
        }
    }
}

/// Representation of an ASN1 CHOICE data element. Alternatives behind
/// the `...` marker are extension additions.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub options: Vec<ChoiceOption>,
    pub extension_index: Option<usize>,
}
