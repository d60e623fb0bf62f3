use nom::{branch::alt, bytes::complete::tag, combinator::value, IResult};

use perc_grammar::{ASN1Type, ASN1Value, BOOLEAN, FALSE, TRUE};

use super::common::skip_ws_and_comments;

pub fn boolean(input: &str) -> IResult<&str, ASN1Type> {
    value(ASN1Type::Boolean, skip_ws_and_comments(tag(BOOLEAN)))(input)
}

pub fn boolean_value(input: &str) -> IResult<&str, ASN1Value> {
    skip_ws_and_comments(alt((
        value(ASN1Value::Boolean(true), tag(TRUE)),
        value(ASN1Value::Boolean(false), tag(FALSE)),
    )))(input)
}
