use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{into, map, opt},
    multi::many0,
    sequence::{preceded, terminated, tuple},
    IResult,
};

use perc_grammar::{
    constraints::{ExtensionMarker, OptionalMarker},
    types::{Sequence, SequenceMember},
    ASN1Type, ASN1Value, COMMA, DEFAULT, OPTIONAL, SEQUENCE,
};

use super::common::{extension_marker, identifier, in_braces, skip_ws_and_comments};
use super::{asn1_type, asn1_value};

enum SequenceItem {
    Member(SequenceMember),
    Marker(ExtensionMarker),
}

/// Parses a SEQUENCE with OPTIONAL and DEFAULT members and an
/// optional extension marker; members behind the marker are extension
/// additions.
pub fn sequence(input: &str) -> IResult<&str, ASN1Type> {
    map(
        preceded(
            skip_ws_and_comments(tag(SEQUENCE)),
            in_braces(many0(terminated(
                skip_ws_and_comments(sequence_item),
                opt(skip_ws_and_comments(char(COMMA))),
            ))),
        ),
        |items| {
            let mut members = Vec::new();
            let mut extension_index = None;
            for item in items {
                match item {
                    SequenceItem::Member(member) => members.push(member),
                    SequenceItem::Marker(_) => {
                        extension_index.get_or_insert(members.len());
                    }
                }
            }
            ASN1Type::Sequence(Sequence {
                members,
                extension_index,
            })
        },
    )(input)
}

fn sequence_item(input: &str) -> IResult<&str, SequenceItem> {
    alt((
        map(extension_marker, SequenceItem::Marker),
        map(sequence_member, SequenceItem::Member),
    ))(input)
}

fn sequence_member(input: &str) -> IResult<&str, SequenceMember> {
    into(tuple((
        skip_ws_and_comments(identifier),
        skip_ws_and_comments(asn1_type),
        optional_marker,
        default,
    )))(input)
}

fn optional_marker(input: &str) -> IResult<&str, Option<OptionalMarker>> {
    opt(into(skip_ws_and_comments(tag(OPTIONAL))))(input)
}

fn default(input: &str) -> IResult<&str, Option<ASN1Value>> {
    opt(preceded(
        skip_ws_and_comments(tag(DEFAULT)),
        skip_ws_and_comments(asn1_value),
    ))(input)
}

#[cfg(test)]
mod tests {
    use perc_grammar::{
        constraints::{Constraint, ValueConstraint},
        types::Integer,
        DeclarationElsewhere,
    };

    use super::*;

    #[test]
    fn parses_optional_marker() {
        assert_eq!(
            optional_marker("\n\tOPTIONAL").unwrap().1,
            Some(OptionalMarker())
        );
        assert_eq!(optional_marker("DEFAULT").unwrap().1, None);
    }

    #[test]
    fn parses_default_values() {
        assert_eq!(
            default("\n\tDEFAULT\t-1").unwrap().1,
            Some(ASN1Value::Integer(-1))
        );
        assert_eq!(
            default("  DEFAULT   TRUE").unwrap().1,
            Some(ASN1Value::Boolean(true))
        );
        assert_eq!(
            default(r#" DEFAULT "hello""#).unwrap().1,
            Some(ASN1Value::String("hello".into()))
        );
        assert_eq!(
            default("  DEFAULT unavailable").unwrap().1,
            Some(ASN1Value::EnumeratedValue("unavailable".into()))
        );
        assert_eq!(
            default("DEFAULT 'F60E'H").unwrap().1,
            Some(ASN1Value::OctetString(vec![0xF6, 0x0E]))
        );
    }

    #[test]
    fn parses_simple_sequence() {
        assert_eq!(
            sequence(
                r#"SEQUENCE {
        value         AccelerationValue,
        confidence    AccelerationConfidence
    }"#
            )
            .unwrap()
            .1,
            ASN1Type::Sequence(Sequence {
                extension_index: None,
                members: vec![
                    SequenceMember {
                        name: "value".into(),
                        ty: ASN1Type::ElsewhereDeclaredType(DeclarationElsewhere {
                            identifier: "AccelerationValue".into(),
                            constraints: vec![]
                        }),
                        default_value: None,
                        is_optional: false
                    },
                    SequenceMember {
                        name: "confidence".into(),
                        ty: ASN1Type::ElsewhereDeclaredType(DeclarationElsewhere {
                            identifier: "AccelerationConfidence".into(),
                            constraints: vec![]
                        }),
                        default_value: None,
                        is_optional: false
                    }
                ]
            })
        )
    }

    #[test]
    fn parses_extended_sequence_with_additions() {
        let parsed = sequence(
            r#"SEQUENCE {
                  unNumber                INTEGER (0..9999), -- primary key
                  limitedQuantity         BOOLEAN DEFAULT FALSE,
                  ...,
                  emergencyActionCode     INTEGER (0..7) OPTIONAL
              }"#,
        )
        .unwrap()
        .1;
        let ASN1Type::Sequence(parsed) = parsed else {
            panic!("expected a sequence");
        };
        assert_eq!(parsed.extension_index, Some(2));
        assert_eq!(parsed.members.len(), 3);
        assert_eq!(
            parsed.members[0].ty,
            ASN1Type::Integer(Integer {
                constraints: vec![Constraint::Value(ValueConstraint {
                    min_value: Some(0),
                    max_value: Some(9999),
                    extensible: false
                })],
                distinguished_values: None,
            })
        );
        assert_eq!(
            parsed.members[1].default_value,
            Some(ASN1Value::Boolean(false))
        );
        assert!(parsed.members[1].is_optional);
        assert!(parsed.members[2].is_optional);
        assert_eq!(parsed.members[2].default_value, None);
    }

    #[test]
    fn parses_nested_sequence() {
        let parsed = sequence(
            r#"SEQUENCE {
                  nested SEQUENCE {
                    wow Wow, -- WOW!
                    this-is-annoying BOOLEAN DEFAULT TRUE
                  },
                  ...
              }"#,
        )
        .unwrap()
        .1;
        let ASN1Type::Sequence(parsed) = parsed else {
            panic!("expected a sequence");
        };
        assert_eq!(parsed.extension_index, Some(1));
        let ASN1Type::Sequence(nested) = &parsed.members[0].ty else {
            panic!("expected a nested sequence");
        };
        assert_eq!(nested.members.len(), 2);
        assert_eq!(nested.members[1].name, "this-is-annoying");
    }
}
