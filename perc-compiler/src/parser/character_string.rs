use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::char,
    combinator::{map, opt},
    sequence::{delimited, pair},
    IResult,
};

use perc_grammar::{
    types::CharacterString, ASN1Type, ASN1Value, IA5_STRING, UTF8_STRING, VISIBLE_STRING,
};

use super::common::skip_ws_and_comments;
use super::constraint::constraint;

/// Parses the supported character string flavors with optional SIZE
/// and FROM constraints.
pub fn character_string(input: &str) -> IResult<&str, ASN1Type> {
    map(
        pair(
            skip_ws_and_comments(alt((
                tag(IA5_STRING),
                tag(VISIBLE_STRING),
                tag(UTF8_STRING),
            ))),
            opt(skip_ws_and_comments(constraint)),
        ),
        |(kind, constraints): (&str, _)| {
            ASN1Type::CharacterString(CharacterString {
                kind: kind.into(),
                constraints: constraints.unwrap_or_default(),
            })
        },
    )(input)
}

/// A double-quoted character string literal, as used in DEFAULT
/// clauses.
pub fn quoted_string_value(input: &str) -> IResult<&str, ASN1Value> {
    map(
        skip_ws_and_comments(delimited(char('"'), take_until("\""), char('"'))),
        |text: &str| ASN1Value::String(text.into()),
    )(input)
}

#[cfg(test)]
mod tests {
    use perc_grammar::{
        constraints::{Constraint, ValueConstraint},
        CharacterStringKind,
    };

    use super::*;

    #[test]
    fn parses_string_flavors() {
        for (notation, kind) in [
            ("IA5String", CharacterStringKind::Ia5String),
            ("VisibleString", CharacterStringKind::VisibleString),
            ("UTF8String", CharacterStringKind::Utf8String),
        ] {
            assert_eq!(
                character_string(notation).unwrap().1,
                ASN1Type::CharacterString(CharacterString {
                    kind,
                    constraints: vec![]
                })
            );
        }
    }

    #[test]
    fn parses_sized_string_with_alphabet() {
        assert_eq!(
            character_string(r#"IA5String (SIZE (1..8)) (FROM ("0123456789"))"#)
                .unwrap()
                .1,
            ASN1Type::CharacterString(CharacterString {
                kind: CharacterStringKind::Ia5String,
                constraints: vec![
                    Constraint::Size(ValueConstraint {
                        min_value: Some(1),
                        max_value: Some(8),
                        extensible: false
                    }),
                    Constraint::PermittedAlphabet("0123456789".into())
                ]
            })
        );
    }

    #[test]
    fn parses_quoted_string_values() {
        assert_eq!(
            quoted_string_value(r#" "hello" "#).unwrap().1,
            ASN1Value::String("hello".into())
        );
    }
}
