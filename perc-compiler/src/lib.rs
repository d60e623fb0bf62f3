//! # perc compiler
//! The compiler crate turns textual ASN1 into schema registries for
//! the perc transcoder. It parses a supported subset of the notation
//! with [nom](https://docs.rs/nom/latest/nom/) parser combinators and
//! converts the resulting abstract syntax into the transcoder's
//! declarative schema nodes, inlining acyclic type references and
//! emitting `$ref` nodes for recursive ones.
//!
//! ## Usage
//! ```rust
//! use perc_compiler::{convert, parse, ConvertOptions};
//! use perc_transcoder::{build_all, BitBuffer, Value};
//!
//! let module = parse(
//!     r#"Example DEFINITIONS AUTOMATIC TAGS ::= BEGIN
//!     Greeting ::= SEQUENCE {
//!         message IA5String (SIZE (0..24)),
//!         urgent  BOOLEAN DEFAULT FALSE
//!     }
//!     END"#,
//! )
//! .unwrap();
//! let registry = convert(&module, ConvertOptions::default()).unwrap();
//! let codecs = build_all(&registry).unwrap();
//!
//! let greeting = Value::record(&[("message", Value::from("hi"))]);
//! let mut buf = BitBuffer::new();
//! codecs["Greeting"].encode(&mut buf, &greeting).unwrap();
//! let mut replay = BitBuffer::from_bytes(&buf.to_bytes());
//! let decoded = codecs["Greeting"].decode(&mut replay).unwrap();
//! // The elided DEFAULT comes back on decode.
//! assert_eq!(
//!     decoded,
//!     Value::record(&[
//!         ("message", Value::from("hi")),
//!         ("urgent", Value::Boolean(false)),
//!     ])
//! );
//! ```

mod converter;
mod parser;

pub use converter::{convert, ConvertOptions, ConverterError, ConverterErrorType, OidPolicy};
pub use parser::error::{ParserError, ParserErrorType};

use nom::branch::alt;
use nom::character::complete::multispace1;
use nom::combinator::eof;
use nom::multi::many0;
use nom::sequence::terminated;
use perc_grammar::Module;

/// Parses a complete ASN1 module. Trailing whitespace and comments
/// are allowed; anything else after `END` is a syntax error with a
/// source position.
pub fn parse(input: &str) -> Result<Module, ParserError> {
    let result = terminated(
        parser::module,
        terminated(
            many0(alt((parser::common::comment, multispace1))),
            eof,
        ),
    )(input);
    match result {
        Ok((_, module)) => Ok(module),
        Err(nom::Err::Error(error)) | Err(nom::Err::Failure(error)) => {
            Err(syntax_error(input, error.input))
        }
        Err(nom::Err::Incomplete(_)) => Err(ParserError::new(
            "unexpected end of input",
            ParserErrorType::UnexpectedEndOfInput,
            0,
            0,
        )),
    }
}

fn syntax_error(input: &str, remaining: &str) -> ParserError {
    let offset = input.len() - remaining.len();
    let consumed = &input[..offset];
    let line = consumed.matches('\n').count() + 1;
    let column = consumed
        .rsplit_once('\n')
        .map_or(consumed.len(), |(_, last_line)| last_line.len())
        + 1;
    let kind = if remaining.trim().is_empty() {
        ParserErrorType::UnexpectedEndOfInput
    } else {
        ParserErrorType::SyntaxError
    };
    let snippet: String = remaining.chars().take(24).collect();
    ParserError::new(
        &format!("cannot interpret input starting at '{snippet}'"),
        kind,
        line,
        column,
    )
}
