use nom::{
    bytes::complete::tag,
    character::complete::i128,
    combinator::{map, opt},
    sequence::{pair, preceded},
    IResult,
};

use perc_grammar::{types::Integer, ASN1Type, ASN1Value, INTEGER};

use super::common::{distinguished_values, skip_ws_and_comments};
use super::constraint::constraint;

/// Parses an INTEGER with an optional named-value list and optional
/// constraints, e.g. `INTEGER { ok(0), error(1) } (0..7, ...)`.
pub fn integer(input: &str) -> IResult<&str, ASN1Type> {
    map(
        preceded(
            skip_ws_and_comments(tag(INTEGER)),
            pair(
                opt(skip_ws_and_comments(distinguished_values)),
                opt(skip_ws_and_comments(constraint)),
            ),
        ),
        |(named_values, constraints)| {
            ASN1Type::Integer(Integer {
                constraints: constraints.unwrap_or_default(),
                distinguished_values: named_values,
            })
        },
    )(input)
}

pub fn integer_value(input: &str) -> IResult<&str, ASN1Value> {
    map(skip_ws_and_comments(i128), ASN1Value::Integer)(input)
}
