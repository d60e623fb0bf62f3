//! Parsers for the generic elements of the ASN1 notation: comments,
//! identifiers, whitespace handling and bracketing.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{alpha1, alphanumeric1, char, i128, multispace0, multispace1, not_line_ending},
    combinator::{into, map, opt, recognize, verify},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

use perc_grammar::{constraints::*, types::DistinguishedValue, *};

use super::util::take_until_or;

/// Parses an ASN1 comment, either a `--` line comment (running to the
/// end of the line or a closing `--`) or a `/* ... */` block comment.
pub fn comment(input: &str) -> IResult<&str, &str> {
    skip_ws(alt((block_comment, line_comment)))(input)
}

pub fn line_comment(input: &str) -> IResult<&str, &str> {
    preceded(tag(LINE_COMMENT), not_line_ending)(input)
}

pub fn block_comment(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(
            tag(BLOCK_COMMENT_START),
            take_until(BLOCK_COMMENT_END),
            tag(BLOCK_COMMENT_END),
        ),
        delimited(
            tag(LINE_COMMENT),
            take_until_or("\n", LINE_COMMENT),
            tag(LINE_COMMENT),
        ),
    ))(input)
}

/// Parses an ASN1 identifier: letters, digits and single hyphens, with
/// no trailing hyphen.
pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alpha1,
        many0(alt((preceded(char('-'), alphanumeric1), alphanumeric1))),
    ))(input)
}

/// An identifier starting with an upper-case letter (a type name).
pub fn type_identifier(input: &str) -> IResult<&str, &str> {
    verify(identifier, |parsed: &str| {
        parsed.starts_with(|first: char| first.is_uppercase())
    })(input)
}

/// An identifier starting with a lower-case letter (a value or member
/// name).
pub fn value_identifier(input: &str) -> IResult<&str, &str> {
    verify(identifier, |parsed: &str| {
        parsed.starts_with(|first: char| first.is_lowercase())
    })(input)
}

pub fn skip_ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    preceded(multispace0, inner)
}

pub fn skip_ws_and_comments<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    preceded(many0(alt((comment, multispace1))), inner)
}

pub fn in_parentheses<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(
        skip_ws_and_comments(char(LEFT_PARENTHESIS)),
        skip_ws_and_comments(inner),
        skip_ws_and_comments(char(RIGHT_PARENTHESIS)),
    )
}

pub fn in_braces<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(
        skip_ws_and_comments(char(LEFT_BRACE)),
        skip_ws_and_comments(inner),
        skip_ws_and_comments(char(RIGHT_BRACE)),
    )
}

pub fn range_marker(input: &str) -> IResult<&str, RangeMarker> {
    map(skip_ws_and_comments(tag(RANGE)), |_| RangeMarker())(input)
}

pub fn extension_marker(input: &str) -> IResult<&str, ExtensionMarker> {
    map(skip_ws_and_comments(tag(ELLIPSIS)), |_| ExtensionMarker())(input)
}

pub fn assignment(input: &str) -> IResult<&str, &str> {
    skip_ws_and_comments(tag(ASSIGN))(input)
}

/// Parses a braced list of named values, e.g.
/// `{ positiveOutOfRange (160), unavailable (161) }`.
pub fn distinguished_values(input: &str) -> IResult<&str, Vec<DistinguishedValue>> {
    in_braces(many0(terminated(
        skip_ws_and_comments(distinguished_val),
        opt(skip_ws_and_comments(char(COMMA))),
    )))(input)
}

fn distinguished_val(input: &str) -> IResult<&str, DistinguishedValue> {
    into(pair(
        skip_ws_and_comments(identifier),
        in_parentheses(i128),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_line_comment() {
        let line = "-- Test, one, two, three/\n";
        assert_eq!(" Test, one, two, three/", comment(line).unwrap().1);
    }

    #[test]
    fn parses_closed_comment() {
        assert_eq!(
            " Very annoying! ",
            comment("-- Very annoying! --").unwrap().1
        );
    }

    #[test]
    fn parses_block_comment() {
        assert_eq!(
            " spanning\nlines ",
            comment("/* spanning\nlines */ rest").unwrap().1
        );
    }

    #[test]
    fn parses_valid_identifiers() {
        assert_eq!(identifier("EEE-DDD"), Ok(("", "EEE-DDD")));
        assert_eq!(identifier("GenericLane "), Ok((" ", "GenericLane")));
        assert_eq!(identifier("NodeXY64"), Ok(("", "NodeXY64")));
        assert_eq!(identifier("Sub-Cause-Code  "), Ok(("  ", "Sub-Cause-Code")));
    }

    #[test]
    fn handles_invalid_identifiers() {
        assert_eq!(identifier("EEE--DDD"), Ok(("--DDD", "EEE")));
        assert!(identifier("-GenericLane").is_err());
        assert!(identifier("64NodeXY").is_err());
        assert_eq!(identifier("Sub-Cause-Code-"), Ok(("-", "Sub-Cause-Code")));
    }

    #[test]
    fn distinguishes_type_and_value_identifiers() {
        assert!(type_identifier("GenericLane").is_ok());
        assert!(type_identifier("genericLane").is_err());
        assert!(value_identifier("genericLane").is_ok());
        assert!(value_identifier("GenericLane").is_err());
    }

    #[test]
    fn discards_whitespace_and_comments() {
        assert_eq!(
            skip_ws_and_comments(identifier)(" -- comment --EEE-DDD"),
            Ok(("", "EEE-DDD"))
        );
        assert_eq!(
            skip_ws_and_comments(identifier)("\r\n\nSub-Cause-Code  "),
            Ok(("  ", "Sub-Cause-Code"))
        );
    }

    #[test]
    fn parses_distinguished_values() {
        let sample = r#"{
    positiveOutOfRange (160), -- ignore this comment
    unavailable        (161)
}"#;
        assert_eq!(
            distinguished_values(sample).unwrap().1,
            [
                DistinguishedValue {
                    name: "positiveOutOfRange".into(),
                    value: 160,
                },
                DistinguishedValue {
                    name: "unavailable".into(),
                    value: 161,
                },
            ]
        )
    }
}
