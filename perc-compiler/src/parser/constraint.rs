//! Parsers for subtype constraints: value ranges (with `MIN`/`MAX`
//! and extension markers), `SIZE` constraints and `FROM` permitted
//! alphabets.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{char, i128},
    combinator::{into, map, value},
    multi::{many1, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use perc_grammar::{constraints::*, COMMA, FROM, MAX, MIN, SIZE};

use super::common::{extension_marker, in_parentheses, range_marker, skip_ws_and_comments};

/// Parses one or more parenthesized constraint groups, flattening
/// intersections: `(SIZE (1..5) ^ FROM ("AB"))` and
/// `(SIZE (1..5))(FROM ("AB"))` yield the same list.
pub fn constraint(input: &str) -> IResult<&str, Vec<Constraint>> {
    map(
        many1(in_parentheses(separated_list1(
            intersection_operator,
            constraint_element,
        ))),
        |groups| groups.into_iter().flatten().collect(),
    )(input)
}

fn intersection_operator(input: &str) -> IResult<&str, &str> {
    skip_ws_and_comments(alt((tag("INTERSECTION"), tag("^"))))(input)
}

fn constraint_element(input: &str) -> IResult<&str, Constraint> {
    skip_ws_and_comments(alt((
        map(size_constraint, Constraint::Size),
        map(permitted_alphabet, Constraint::PermittedAlphabet),
        map(value_constraint_body, Constraint::Value),
    )))(input)
}

/// `SIZE (lower..upper)` with the usual range forms inside.
pub fn size_constraint(input: &str) -> IResult<&str, ValueConstraint> {
    preceded(
        skip_ws_and_comments(tag(SIZE)),
        in_parentheses(value_constraint_body),
    )(input)
}

/// `FROM ("...")`: the permitted alphabet as a literal character set.
pub fn permitted_alphabet(input: &str) -> IResult<&str, String> {
    map(
        preceded(
            skip_ws_and_comments(tag(FROM)),
            in_parentheses(delimited(char('"'), take_until("\""), char('"'))),
        ),
        |characters: &str| characters.into(),
    )(input)
}

/// The body of a value range constraint, most elaborate form first.
pub fn value_constraint_body(input: &str) -> IResult<&str, ValueConstraint> {
    alt((
        extensible_range_constraint,
        range_constraint,
        strict_extensible_constraint,
        strict_constraint,
    ))(input)
}

/// A single bound: an integer literal, or `MIN`/`MAX` standing for an
/// absent bound.
fn bound(input: &str) -> IResult<&str, Option<i128>> {
    alt((
        map(i128, Some),
        value(None, tag(MIN)),
        value(None, tag(MAX)),
    ))(input)
}

fn strict_constraint(input: &str) -> IResult<&str, ValueConstraint> {
    into(i128::<&str, nom::error::Error<&str>>)(input)
}

fn strict_extensible_constraint(input: &str) -> IResult<&str, ValueConstraint> {
    into(pair(
        i128::<&str, nom::error::Error<&str>>,
        preceded(skip_ws_and_comments(char(COMMA)), extension_marker),
    ))(input)
}

fn range_constraint(input: &str) -> IResult<&str, ValueConstraint> {
    into(tuple((bound, range_marker, skip_ws_and_comments(bound))))(input)
}

fn extensible_range_constraint(input: &str) -> IResult<&str, ValueConstraint> {
    into(tuple((
        bound,
        range_marker,
        skip_ws_and_comments(bound),
        preceded(skip_ws_and_comments(char(COMMA)), extension_marker),
    )))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_value_constraints() {
        assert_eq!(
            constraint("(5)").unwrap().1,
            vec![Constraint::Value(ValueConstraint {
                min_value: Some(5),
                max_value: Some(5),
                extensible: false
            })]
        );
        assert_eq!(
            constraint("(-5..9)").unwrap().1,
            vec![Constraint::Value(ValueConstraint {
                min_value: Some(-5),
                max_value: Some(9),
                extensible: false
            })]
        );
        assert_eq!(
            constraint("(-9..-4, ...)").unwrap().1,
            vec![Constraint::Value(ValueConstraint {
                min_value: Some(-9),
                max_value: Some(-4),
                extensible: true
            })]
        );
    }

    #[test]
    fn parses_min_max_bounds() {
        assert_eq!(
            constraint("(0..MAX)").unwrap().1,
            vec![Constraint::Value(ValueConstraint {
                min_value: Some(0),
                max_value: None,
                extensible: false
            })]
        );
        assert_eq!(
            constraint("(MIN..65535)").unwrap().1,
            vec![Constraint::Value(ValueConstraint {
                min_value: None,
                max_value: Some(65535),
                extensible: false
            })]
        );
    }

    #[test]
    fn parses_size_constraints() {
        assert_eq!(
            constraint("(SIZE(4))").unwrap().1,
            vec![Constraint::Size(ValueConstraint {
                min_value: Some(4),
                max_value: Some(4),
                extensible: false
            })]
        );
        assert_eq!(
            constraint("(SIZE (1..63, ...))").unwrap().1,
            vec![Constraint::Size(ValueConstraint {
                min_value: Some(1),
                max_value: Some(63),
                extensible: true
            })]
        );
    }

    #[test]
    fn parses_permitted_alphabets() {
        assert_eq!(
            constraint(r#"(FROM ("0123456789"))"#).unwrap().1,
            vec![Constraint::PermittedAlphabet("0123456789".into())]
        );
    }

    #[test]
    fn parses_intersected_constraints() {
        assert_eq!(
            constraint(r#"(SIZE (1..8) ^ FROM ("AB"))"#).unwrap().1,
            vec![
                Constraint::Size(ValueConstraint {
                    min_value: Some(1),
                    max_value: Some(8),
                    extensible: false
                }),
                Constraint::PermittedAlphabet("AB".into())
            ]
        );
    }

    #[test]
    fn parses_constraints_with_inserted_comments() {
        assert_eq!(
            constraint("(-9-- Very annoying! --..-4,  ...)").unwrap().1,
            vec![Constraint::Value(ValueConstraint {
                min_value: Some(-9),
                max_value: Some(-4),
                extensible: true
            })]
        );
    }
}
