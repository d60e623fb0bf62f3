use nom::{
    bytes::complete::tag,
    combinator::{map, opt},
    sequence::preceded,
    IResult,
};

use perc_grammar::{types::OctetString, ASN1Type, OCTET_STRING};

use super::common::skip_ws_and_comments;
use super::constraint::constraint;

pub fn octet_string(input: &str) -> IResult<&str, ASN1Type> {
    map(
        preceded(
            skip_ws_and_comments(tag(OCTET_STRING)),
            opt(skip_ws_and_comments(constraint)),
        ),
        |constraints| {
            ASN1Type::OctetString(OctetString {
                constraints: constraints.unwrap_or_default(),
            })
        },
    )(input)
}
