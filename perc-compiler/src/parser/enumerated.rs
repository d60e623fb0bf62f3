use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, i128},
    combinator::{map, opt},
    multi::many1,
    sequence::{pair, preceded, terminated},
    IResult,
};

use perc_grammar::{
    constraints::ExtensionMarker,
    types::{Enumeral, Enumerated},
    ASN1Type, COMMA, ENUMERATED,
};

use super::common::{extension_marker, identifier, in_braces, in_parentheses, skip_ws_and_comments};

enum EnumeratedItem {
    Enumeral(Enumeral),
    Marker(ExtensionMarker),
}

/// Parses an ENUMERATED with optional explicit numbers and an
/// optional extension marker splitting root from addition values.
pub fn enumerated(input: &str) -> IResult<&str, ASN1Type> {
    map(
        preceded(
            skip_ws_and_comments(tag(ENUMERATED)),
            in_braces(many1(terminated(
                skip_ws_and_comments(enumerated_item),
                opt(skip_ws_and_comments(char(COMMA))),
            ))),
        ),
        |items| {
            let mut members = Vec::new();
            let mut extension_index = None;
            for item in items {
                match item {
                    EnumeratedItem::Enumeral(enumeral) => members.push(enumeral),
                    EnumeratedItem::Marker(_) => {
                        extension_index.get_or_insert(members.len());
                    }
                }
            }
            ASN1Type::Enumerated(Enumerated {
                members,
                extension_index,
            })
        },
    )(input)
}

fn enumerated_item(input: &str) -> IResult<&str, EnumeratedItem> {
    alt((
        map(extension_marker, EnumeratedItem::Marker),
        map(
            pair(identifier, opt(in_parentheses(i128))),
            |(name, number)| EnumeratedItem::Enumeral(Enumeral::from((name, number))),
        ),
    ))(input)
}
