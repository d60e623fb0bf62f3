use nom::{bytes::complete::tag, combinator::value, IResult};

use perc_grammar::{ASN1Type, ASN1Value, NULL};

use super::common::skip_ws_and_comments;

pub fn null(input: &str) -> IResult<&str, ASN1Type> {
    value(ASN1Type::Null, skip_ws_and_comments(tag(NULL)))(input)
}

pub fn null_value(input: &str) -> IResult<&str, ASN1Value> {
    value(ASN1Value::Null, skip_ws_and_comments(tag(NULL)))(input)
}
