//! Subtype constraints as they appear in the parsed notation.

use alloc::string::String;

/// Marker for an `OPTIONAL` keyword in a SEQUENCE member.
#[derive(Debug, PartialEq)]
pub struct OptionalMarker();

impl From<&str> for OptionalMarker {
    fn from(_: &str) -> Self {
        OptionalMarker()
    }
}

/// Marker for a `..` range separator.
#[derive(Debug)]
pub struct RangeMarker();

/// Marker for a `...` extension marker.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionMarker();

/// A single parenthesized constraint attached to a type.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Value(ValueConstraint),
    Size(ValueConstraint),
    PermittedAlphabet(String),
}

/// A value range with optional bounds. `MIN` and `MAX` keywords map to
/// an absent bound, so `INTEGER (0..MAX)` carries only a minimum.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueConstraint {
    pub min_value: Option<i128>,
    pub max_value: Option<i128>,
    pub extensible: bool,
}

impl From<i128> for ValueConstraint {
    fn from(value: i128) -> Self {
        Self {
            min_value: Some(value),
            max_value: Some(value),
            extensible: false,
        }
    }
}

impl From<(i128, ExtensionMarker)> for ValueConstraint {
    fn from(value: (i128, ExtensionMarker)) -> Self {
        Self {
            min_value: Some(value.0),
            max_value: Some(value.0),
            extensible: true,
        }
    }
}

impl From<(Option<i128>, RangeMarker, Option<i128>)> for ValueConstraint {
    fn from(value: (Option<i128>, RangeMarker, Option<i128>)) -> Self {
        Self {
            min_value: value.0,
            max_value: value.2,
            extensible: false,
        }
    }
}

impl From<(Option<i128>, RangeMarker, Option<i128>, ExtensionMarker)> for ValueConstraint {
    fn from(value: (Option<i128>, RangeMarker, Option<i128>, ExtensionMarker)) -> Self {
        Self {
            min_value: value.0,
            max_value: value.2,
            extensible: true,
        }
    }
}
