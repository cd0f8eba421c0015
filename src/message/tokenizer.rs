//! Nom-based IRC line tokenizer.
//!
//! Splits one protocol line into its raw token set: optional tag block,
//! optional prefix, the command, and ordered parameters where the final
//! parameter may be a trailing (`:`-introduced) one.

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::{char, space0},
    combinator::opt,
    error::{context, VerboseError},
    sequence::preceded,
    IResult,
};

use crate::error::MessageParseError;

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// One raw parameter token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawParam<'a> {
    /// The token text (trailing tokens have the leading `:` stripped).
    pub value: &'a str,
    /// Whether this token was the `:`-introduced trailing parameter.
    pub trailing: bool,
}

/// A tokenized IRC line with borrowed string slices.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenizedLine<'a> {
    /// Raw tag block (without the leading `@`), if present.
    pub tags: Option<&'a str>,
    /// Raw prefix (without the leading `:`), if present.
    pub prefix: Option<&'a str>,
    /// The command token, as written on the wire.
    pub command: &'a str,
    /// Ordered parameter tokens; at most one is trailing, and it is last.
    pub params: Vec<RawParam<'a>>,
}

/// Parse the tag block (the part after `@` and before the first space).
fn parse_tags(input: &str) -> ParseResult<&str, &str> {
    context("parsing message tags", preceded(char('@'), take_until(" ")))(input)
}

/// Parse the prefix (the part after `:` and before the first space).
fn parse_prefix(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing message prefix",
        preceded(char(':'), take_while1(|c| c != ' ')),
    )(input)
}

/// Parse the command token (letters or digits).
fn parse_command(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing command",
        take_while1(|c: char| c.is_alphanumeric()),
    )(input)
}

impl<'a> TokenizedLine<'a> {
    /// Tokenize one full protocol line.
    ///
    /// The input may carry a CRLF, which is ignored. Fails when the line is
    /// empty or no command token is found.
    pub fn parse(line: &'a str) -> Result<TokenizedLine<'a>, MessageParseError> {
        if line.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }
        let input = line.trim_end_matches(['\r', '\n']);
        if input.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let (input, tags) = opt(parse_tags)(input).map_err(drop_nom)?;
        let (input, _) = space0::<_, VerboseError<&str>>(input).map_err(drop_nom)?;

        let (input, prefix) = opt(parse_prefix)(input).map_err(drop_nom)?;
        let (input, _) = space0::<_, VerboseError<&str>>(input).map_err(drop_nom)?;

        let (input, command) =
            parse_command(input).map_err(|_| MessageParseError::MissingCommand)?;

        let mut params: Vec<RawParam<'a>> = Vec::new();
        let mut rest = input;

        while let Some(b' ') = rest.as_bytes().first().copied() {
            rest = &rest[1..];

            if let Some(b':') = rest.as_bytes().first().copied() {
                // Trailing parameter: the remainder of the line, verbatim.
                params.push(RawParam {
                    value: &rest[1..],
                    trailing: true,
                });
                break;
            }

            let end = rest.find(' ').unwrap_or(rest.len());
            let value = &rest[..end];
            if value.is_empty() {
                break;
            }
            params.push(RawParam {
                value,
                trailing: false,
            });
            rest = &rest[end..];
        }

        Ok(TokenizedLine {
            tags,
            prefix,
            command,
            params,
        })
    }
}

fn drop_nom(_: nom::Err<VerboseError<&str>>) -> MessageParseError {
    MessageParseError::MissingCommand
}
