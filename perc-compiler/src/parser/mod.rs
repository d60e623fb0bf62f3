//! The `parser` module contains the parser combinators responsible
//! for interpreting the input as ASN1 notation. The parser is made up
//! of a number of sub-parsers that interpret single elements of ASN1
//! syntax.
//!
//! The submodules provide parsers for their respective eponymous ASN1
//! type, with the exception of `common`, which contains parsers for
//! the more generic elements of the notation, and `util`, which
//! contains helper parsers not specific to ASN1.

use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{into, map, opt},
    multi::many0,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use perc_grammar::*;

use self::{
    bit_string::{bit_or_hex_string_value, bit_string},
    boolean::{boolean, boolean_value},
    character_string::{character_string, quoted_string_value},
    choice::choice,
    common::*,
    constraint::constraint,
    enumerated::enumerated,
    integer::{integer, integer_value},
    module_header::module_header,
    null::{null, null_value},
    object_identifier::object_identifier,
    octet_string::octet_string,
    sequence::sequence,
    sequence_of::sequence_of,
};

mod bit_string;
mod boolean;
mod character_string;
mod choice;
pub(crate) mod common;
mod constraint;
mod enumerated;
pub mod error;
mod integer;
mod module_header;
mod null;
mod object_identifier;
mod octet_string;
mod sequence;
mod sequence_of;
mod util;

/// Parses a complete module: header, type assignments, `END`.
pub fn module(input: &str) -> IResult<&str, Module> {
    map(
        pair(
            module_header,
            terminated(
                many0(top_level_declaration),
                skip_ws_and_comments(tag(END)),
            ),
        ),
        |(header, declarations)| Module {
            header,
            declarations,
        },
    )(input)
}

pub fn top_level_declaration(input: &str) -> IResult<&str, ToplevelDeclaration> {
    into(tuple((
        skip_ws(many0(comment)),
        skip_ws(type_identifier),
        preceded(assignment, asn1_type),
    )))(input)
}

pub fn asn1_type(input: &str) -> IResult<&str, ASN1Type> {
    alt((
        null,
        object_identifier,
        sequence_of,
        sequence,
        choice,
        integer,
        enumerated,
        boolean,
        bit_string,
        octet_string,
        character_string,
        elsewhere_declared_type,
    ))(input)
}

pub fn asn1_value(input: &str) -> IResult<&str, ASN1Value> {
    alt((
        null_value,
        boolean_value,
        bit_or_hex_string_value,
        integer_value,
        quoted_string_value,
        enumeral_value,
    ))(input)
}

fn enumeral_value(input: &str) -> IResult<&str, ASN1Value> {
    map(skip_ws_and_comments(value_identifier), |name| {
        ASN1Value::EnumeratedValue(name.into())
    })(input)
}

fn elsewhere_declared_type(input: &str) -> IResult<&str, ASN1Type> {
    map(
        pair(
            skip_ws_and_comments(type_identifier),
            opt(skip_ws_and_comments(constraint)),
        ),
        |parsed| ASN1Type::ElsewhereDeclaredType(parsed.into()),
    )(input)
}
