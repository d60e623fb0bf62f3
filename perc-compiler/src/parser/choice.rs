use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{into, map, opt},
    multi::many0,
    sequence::{pair, preceded, terminated},
    IResult,
};

use perc_grammar::{
    constraints::ExtensionMarker,
    types::{Choice, ChoiceOption},
    ASN1Type, CHOICE, COMMA,
};

use super::common::{extension_marker, identifier, in_braces, skip_ws_and_comments};
use super::asn1_type;

enum ChoiceItem {
    Option(ChoiceOption),
    Marker(ExtensionMarker),
}

/// Parses a CHOICE with an optional extension marker; alternatives
/// behind the marker are extension additions.
pub fn choice(input: &str) -> IResult<&str, ASN1Type> {
    map(
        preceded(
            skip_ws_and_comments(tag(CHOICE)),
            in_braces(many0(terminated(
                skip_ws_and_comments(choice_item),
                opt(skip_ws_and_comments(char(COMMA))),
            ))),
        ),
        |items| {
            let mut options = Vec::new();
            let mut extension_index = None;
            for item in items {
                match item {
                    ChoiceItem::Option(option) => options.push(option),
                    ChoiceItem::Marker(_) => {
                        extension_index.get_or_insert(options.len());
                    }
                }
            }
            ASN1Type::Choice(Choice {
                options,
                extension_index,
            })
        },
    )(input)
}

fn choice_item(input: &str) -> IResult<&str, ChoiceItem> {
    alt((
        map(extension_marker, ChoiceItem::Marker),
        map(choice_option, ChoiceItem::Option),
    ))(input)
}

fn choice_option(input: &str) -> IResult<&str, ChoiceOption> {
    into(pair(
        skip_ws_and_comments(identifier),
        skip_ws_and_comments(asn1_type),
    ))(input)
}

#[cfg(test)]
mod tests {
    use perc_grammar::DeclarationElsewhere;

    use super::*;

    #[test]
    fn parses_extensible_choice() {
        let parsed = choice(
            r#"CHOICE {
                success Outcome,
                failure BOOLEAN,
                ...,
                deferred NULL
            }"#,
        )
        .unwrap()
        .1;
        assert_eq!(
            parsed,
            ASN1Type::Choice(Choice {
                options: vec![
                    ChoiceOption {
                        name: "success".into(),
                        ty: ASN1Type::ElsewhereDeclaredType(DeclarationElsewhere {
                            identifier: "Outcome".into(),
                            constraints: vec![]
                        })
                    },
                    ChoiceOption {
                        name: "failure".into(),
                        ty: ASN1Type::Boolean
                    },
                    ChoiceOption {
                        name: "deferred".into(),
                        ty: ASN1Type::Null
                    },
                ],
                extension_index: Some(2),
            })
        );
    }
}
