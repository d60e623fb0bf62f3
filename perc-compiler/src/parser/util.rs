//! Helper parsers not specific to the ASN1 notation.

use nom::error::{Error, ErrorKind};
use nom::IResult;

/// Takes input up to whichever of the two tokens appears first.
pub fn take_until_or<'a>(
    token1: &'a str,
    token2: &'a str,
) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input| {
        let position = match (input.find(token1), input.find(token2)) {
            (Some(first), Some(second)) => first.min(second),
            (Some(first), None) => first,
            (None, Some(second)) => second,
            (None, None) => {
                return Err(nom::Err::Error(Error::new(input, ErrorKind::TakeUntil)));
            }
        };
        Ok((&input[position..], &input[..position]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_until_the_earlier_token() {
        assert_eq!(
            take_until_or("\n", "--")("one -- two\n"),
            Ok(("-- two\n", "one "))
        );
        assert_eq!(
            take_until_or("\n", "--")("one two\nthree"),
            Ok(("\nthree", "one two"))
        );
        assert!(take_until_or("\n", "--")("no terminator").is_err());
    }
}
