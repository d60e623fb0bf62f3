use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{into, opt, value},
    sequence::{preceded, terminated, tuple},
    IResult,
};

use perc_grammar::{
    Header, TaggingEnvironment, AUTOMATIC, BEGIN, DEFINITIONS, EXPLICIT, IMPLICIT, TAGS,
};

use super::common::{assignment, skip_ws_and_comments, type_identifier};
use super::object_identifier::object_identifier_value;

/// Parses a module header up to and including the `BEGIN` keyword:
/// `Name { oid } DEFINITIONS AUTOMATIC TAGS ::= BEGIN`.
pub fn module_header(input: &str) -> IResult<&str, Header> {
    into(terminated(
        tuple((
            skip_ws_and_comments(type_identifier),
            opt(skip_ws_and_comments(object_identifier_value)),
            preceded(
                skip_ws_and_comments(tag(DEFINITIONS)),
                opt(tagging_environment),
            ),
        )),
        preceded(assignment, skip_ws_and_comments(tag(BEGIN))),
    ))(input)
}

fn tagging_environment(input: &str) -> IResult<&str, TaggingEnvironment> {
    terminated(
        skip_ws_and_comments(alt((
            value(TaggingEnvironment::Automatic, tag(AUTOMATIC)),
            value(TaggingEnvironment::Implicit, tag(IMPLICIT)),
            value(TaggingEnvironment::Explicit, tag(EXPLICIT)),
        ))),
        skip_ws_and_comments(tag(TAGS)),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_module_header() {
        let (rest, header) = module_header("Intercode DEFINITIONS AUTOMATIC TAGS ::= BEGIN\n").unwrap();
        assert_eq!(rest, "\n");
        assert_eq!(header.name, "Intercode");
        assert_eq!(header.module_identifier, None);
        assert_eq!(header.tagging_environment, TaggingEnvironment::Automatic);
    }

    #[test]
    fn parses_module_header_with_object_identifier() {
        let (_, header) = module_header(
            r#"UicBarcodeHeader { iso(1) standard(0) 24089 } DEFINITIONS IMPLICIT TAGS ::= BEGIN"#,
        )
        .unwrap();
        assert_eq!(header.name, "UicBarcodeHeader");
        let module_identifier = header.module_identifier.unwrap();
        assert_eq!(module_identifier.0.len(), 3);
        assert_eq!(header.tagging_environment, TaggingEnvironment::Implicit);
    }

    #[test]
    fn tagging_environment_defaults_to_explicit() {
        let (_, header) = module_header("M DEFINITIONS ::= BEGIN").unwrap();
        assert_eq!(header.tagging_environment, TaggingEnvironment::Explicit);
    }
}
