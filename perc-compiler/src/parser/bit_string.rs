use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, one_of},
    combinator::{map, map_res, opt},
    multi::{many0, many1},
    sequence::{delimited, preceded, terminated},
    IResult,
};

use perc_grammar::{types::BitString, ASN1Type, ASN1Value, BIT_STRING, SINGLE_QUOTE};

use super::common::skip_ws_and_comments;
use super::constraint::constraint;

pub fn bit_string(input: &str) -> IResult<&str, ASN1Type> {
    map(
        preceded(
            skip_ws_and_comments(tag(BIT_STRING)),
            opt(skip_ws_and_comments(constraint)),
        ),
        |constraints| {
            ASN1Type::BitString(BitString {
                constraints: constraints.unwrap_or_default(),
            })
        },
    )(input)
}

/// Parses `'0101'B` binary strings and `'F60E'H` hex strings, as used
/// in DEFAULT clauses.
pub fn bit_or_hex_string_value(input: &str) -> IResult<&str, ASN1Value> {
    skip_ws_and_comments(alt((
        map(
            terminated(
                delimited(char(SINGLE_QUOTE), many0(one_of("01")), char(SINGLE_QUOTE)),
                char('B'),
            ),
            |bits: Vec<char>| ASN1Value::BitString(bits.iter().map(|bit| *bit == '1').collect()),
        ),
        map_res(
            terminated(
                delimited(
                    char(SINGLE_QUOTE),
                    many1(one_of("0123456789ABCDEFabcdef")),
                    char(SINGLE_QUOTE),
                ),
                char('H'),
            ),
            |digits: Vec<char>| {
                if digits.len() % 2 != 0 {
                    return Err("odd number of hex digits");
                }
                let bytes = digits
                    .chunks(2)
                    .map(|pair| {
                        let high = pair[0].to_digit(16).unwrap_or(0) as u8;
                        let low = pair[1].to_digit(16).unwrap_or(0) as u8;
                        high << 4 | low
                    })
                    .collect();
                Ok(ASN1Value::OctetString(bytes))
            },
        ),
    )))(input)
}
