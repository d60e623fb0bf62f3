use nom::{
    bytes::complete::tag,
    combinator::{map, opt},
    sequence::tuple,
    IResult,
};

use perc_grammar::{types::SequenceOf, ASN1Type, OF, SEQUENCE};

use super::common::{in_parentheses, skip_ws_and_comments};
use super::constraint::size_constraint;
use super::asn1_type;

/// Parses `SEQUENCE (SIZE (...)) OF Type`, with the size constraint
/// optional.
pub fn sequence_of(input: &str) -> IResult<&str, ASN1Type> {
    map(
        tuple((
            skip_ws_and_comments(tag(SEQUENCE)),
            opt(in_parentheses(size_constraint)),
            skip_ws_and_comments(tag(OF)),
            skip_ws_and_comments(asn1_type),
        )),
        |(_, size, _, item)| ASN1Type::SequenceOf(SequenceOf::from((size, item))),
    )(input)
}

#[cfg(test)]
mod tests {
    use perc_grammar::{
        constraints::{Constraint, ValueConstraint},
        DeclarationElsewhere,
    };

    use super::*;

    #[test]
    fn parses_unconstrained_sequence_of() {
        assert_eq!(
            sequence_of("SEQUENCE OF Member").unwrap().1,
            ASN1Type::SequenceOf(SequenceOf {
                constraints: vec![],
                item: Box::new(ASN1Type::ElsewhereDeclaredType(DeclarationElsewhere {
                    identifier: "Member".into(),
                    constraints: vec![]
                }))
            })
        );
    }

    #[test]
    fn parses_sized_sequence_of() {
        assert_eq!(
            sequence_of("SEQUENCE (SIZE(1..16, ...)) OF InterferenceManagementZone")
                .unwrap()
                .1,
            ASN1Type::SequenceOf(SequenceOf {
                constraints: vec![Constraint::Size(ValueConstraint {
                    min_value: Some(1),
                    max_value: Some(16),
                    extensible: true
                })],
                item: Box::new(ASN1Type::ElsewhereDeclaredType(DeclarationElsewhere {
                    identifier: "InterferenceManagementZone".into(),
                    constraints: vec![]
                }))
            })
        );
    }

    #[test]
    fn parses_sequence_of_inline_type() {
        let parsed = sequence_of("SEQUENCE OF SEQUENCE { flag BOOLEAN }").unwrap().1;
        let ASN1Type::SequenceOf(parsed) = parsed else {
            panic!("expected a sequence-of");
        };
        assert!(matches!(*parsed.item, ASN1Type::Sequence(_)));
    }
}
