use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::u64,
    combinator::{into, map, value},
    multi::many1,
    sequence::pair,
    IResult,
};

use perc_grammar::{
    ASN1Type, ObjectIdentifierArc, ObjectIdentifierValue, OBJECT_IDENTIFIER,
};

use super::common::{identifier, in_braces, in_parentheses, skip_ws_and_comments};

pub fn object_identifier(input: &str) -> IResult<&str, ASN1Type> {
    value(
        ASN1Type::ObjectIdentifier,
        skip_ws_and_comments(tag(OBJECT_IDENTIFIER)),
    )(input)
}

/// Parses an object identifier value as it appears in module headers,
/// e.g. `{ itu-t(0) identified-organization(4) 473 }`.
pub fn object_identifier_value(input: &str) -> IResult<&str, ObjectIdentifierValue> {
    into(in_braces(many1(skip_ws_and_comments(
        object_identifier_arc,
    ))))(input)
}

fn object_identifier_arc(input: &str) -> IResult<&str, ObjectIdentifierArc> {
    alt((
        into(pair(identifier, in_parentheses(u64))),
        map(u64, ObjectIdentifierArc::from),
        map(identifier, ObjectIdentifierArc::from),
    ))(input)
}
