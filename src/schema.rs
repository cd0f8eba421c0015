//! Declarative per-command parameter schemas.
//!
//! Each command declares an ordered list of [`ParamDef`] entries. The same
//! entry list drives both directions: resolving positional wire tokens onto
//! named, validated fields ([`resolve_params`]), and serializing
//! application-supplied named values back into a conformant parameter list
//! ([`build_params`] + [`render_params`]).
//!
//! Resolution walks entries in declared order and keeps a countdown of
//! still-unsatisfied required entries, so an optional entry never steals a
//! token that a later required entry needs. An optional entry whose
//! candidate token fails validation is skipped without consuming the token;
//! a greedy (`rest`) entry takes every consecutive non-trailing token; a
//! `trailing` entry ends the walk. Wire tokens left over after the last
//! entry are ignored; servers routinely append parameters a minimal
//! schema does not name.

use std::fmt::{self, Write};

use regex::Regex;

use crate::error::MessageParseError;
use crate::message::tokenizer::RawParam;
use crate::validation::{is_channel_name, is_line_safe, is_token_safe};

/// How a parameter's value is validated beyond its optional pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// Any token.
    Plain,
    /// Must be a channel name for the connection's channel-type prefixes.
    Channel,
}

/// One entry in a command's parameter schema.
#[derive(Clone, Debug)]
pub struct ParamDef {
    /// Field name exposed on resolved messages.
    pub name: &'static str,
    /// Value-kind validation.
    pub kind: ParamKind,
    /// May be absent without failing resolution or construction.
    pub optional: bool,
    /// Greedily consumes consecutive non-trailing tokens, joined by spaces.
    pub rest: bool,
    /// Serializes as the `:`-introduced trailing parameter and ends the
    /// resolution walk.
    pub trailing: bool,
    /// Optional anchored pattern the value must match.
    pub pattern: Option<Regex>,
}

impl ParamDef {
    /// A required, plain, single-token parameter.
    pub fn new(name: &'static str) -> Self {
        ParamDef {
            name,
            kind: ParamKind::Plain,
            optional: false,
            rest: false,
            trailing: false,
            pattern: None,
        }
    }

    /// Mark this parameter optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Validate the value as a channel name.
    pub fn channel(mut self) -> Self {
        self.kind = ParamKind::Channel;
        self
    }

    /// Greedily consume consecutive non-trailing tokens.
    pub fn rest(mut self) -> Self {
        assert!(!self.trailing, "a rest parameter cannot also be trailing");
        self.rest = true;
        self
    }

    /// Serialize as the trailing parameter.
    pub fn trailing(mut self) -> Self {
        assert!(!self.rest, "a trailing parameter cannot also be rest");
        self.trailing = true;
        self
    }

    /// Require the value to match `pattern`.
    ///
    /// Panics on an invalid pattern; schemas are static tables built at
    /// startup.
    pub fn matching(mut self, pattern: &str) -> Self {
        self.pattern = Some(Regex::new(pattern).expect("valid parameter pattern"));
        self
    }

    fn accepts(&self, value: &str, channel_prefixes: &str) -> bool {
        if let Some(re) = &self.pattern {
            if !re.is_match(value) {
                return false;
            }
        }
        match self.kind {
            ParamKind::Plain => true,
            ParamKind::Channel => is_channel_name(value, channel_prefixes),
        }
    }
}

/// A resolved parameter: named (for schema-backed commands) or bare
/// positional (for the generic fallback).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedParam {
    /// Schema field name; `None` for fallback positionals.
    pub name: Option<&'static str>,
    /// The parameter value.
    pub value: String,
    /// Render as the `:`-introduced trailing parameter.
    pub trailing: bool,
    /// Came from a greedy entry; renders bare even though it contains
    /// spaces.
    pub(crate) greedy: bool,
}

impl ResolvedParam {
    pub(crate) fn unnamed(value: String, trailing: bool) -> Self {
        ResolvedParam {
            name: None,
            value,
            trailing,
            greedy: false,
        }
    }
}

/// Count of required entries in a schema.
pub fn min_params(defs: &[ParamDef]) -> usize {
    defs.iter().filter(|d| !d.optional).count()
}

/// Resolve positional wire tokens onto the schema's named fields.
pub fn resolve_params(
    command: &str,
    defs: &[ParamDef],
    tokens: &[RawParam<'_>],
    channel_prefixes: &str,
) -> Result<Vec<ResolvedParam>, MessageParseError> {
    let min = min_params(defs);
    if tokens.len() < min {
        let starved = defs
            .iter()
            .filter(|d| !d.optional)
            .nth(tokens.len())
            .map(|d| d.name)
            .unwrap_or("param");
        return Err(MessageParseError::MissingParam {
            command: command.to_string(),
            param: starved,
        });
    }

    let mut out = Vec::with_capacity(defs.len());
    let mut idx = 0;
    let mut required_left = min;

    for def in defs {
        let remaining = tokens.len() - idx;

        if def.optional {
            // Every remaining token is reserved for a required entry.
            if remaining <= required_left {
                continue;
            }
        } else if remaining < required_left {
            // Unreachable with a well-formed table; a greedy entry placed
            // before a required non-trailing one starves it.
            return Err(MessageParseError::InconsistentSchema {
                command: command.to_string(),
            });
        }

        if def.rest {
            let start = idx;
            while idx < tokens.len() && !tokens[idx].trailing {
                idx += 1;
            }
            if idx == start {
                if def.optional {
                    continue;
                }
                return Err(MessageParseError::MissingParam {
                    command: command.to_string(),
                    param: def.name,
                });
            }
            let joined = tokens[start..idx]
                .iter()
                .map(|t| t.value)
                .collect::<Vec<_>>()
                .join(" ");
            if !def.accepts(&joined, channel_prefixes) {
                if def.optional {
                    idx = start;
                    continue;
                }
                return Err(MessageParseError::InvalidParam {
                    command: command.to_string(),
                    param: def.name,
                    value: joined,
                });
            }
            out.push(ResolvedParam {
                name: Some(def.name),
                value: joined,
                trailing: false,
                greedy: true,
            });
        } else {
            let token = &tokens[idx];
            if !def.accepts(token.value, channel_prefixes) {
                if def.optional {
                    // The token stays put for the next entry.
                    continue;
                }
                return Err(MessageParseError::InvalidParam {
                    command: command.to_string(),
                    param: def.name,
                    value: token.value.to_string(),
                });
            }
            out.push(ResolvedParam {
                name: Some(def.name),
                value: token.value.to_string(),
                trailing: def.trailing || token.trailing,
                greedy: false,
            });
            idx += 1;
        }

        if !def.optional {
            required_left -= 1;
        }
        if def.trailing {
            break;
        }
    }

    Ok(out)
}

/// Build a resolved parameter list from application-supplied named values.
///
/// Values are validated exactly as in resolution, plus wire-safety checks
/// that the parse direction gets for free from tokenization: no NUL/CR/LF
/// anywhere, no spaces or leading `:` outside trailing and greedy entries.
pub fn build_params(
    command: &str,
    defs: &[ParamDef],
    values: &[(&str, &str)],
    channel_prefixes: &str,
) -> Result<Vec<ResolvedParam>, MessageParseError> {
    for (name, _) in values {
        if !defs.iter().any(|d| d.name == *name) {
            return Err(MessageParseError::UnknownParam {
                command: command.to_string(),
                param: name.to_string(),
            });
        }
    }

    let mut out = Vec::with_capacity(defs.len());
    for def in defs {
        let supplied = values.iter().find(|(name, _)| *name == def.name);
        let value = match supplied {
            Some((_, value)) => *value,
            None if def.optional => continue,
            None => {
                return Err(MessageParseError::MissingParam {
                    command: command.to_string(),
                    param: def.name,
                })
            }
        };

        let wire_safe = if def.trailing {
            is_line_safe(value)
        } else if def.rest {
            !value.is_empty() && value.split(' ').all(|word| is_token_safe(word) && !word.is_empty())
        } else {
            is_token_safe(value)
        };
        if !wire_safe || !def.accepts(value, channel_prefixes) {
            return Err(MessageParseError::InvalidParam {
                command: command.to_string(),
                param: def.name,
                value: value.to_string(),
            });
        }

        out.push(ResolvedParam {
            name: Some(def.name),
            value: value.to_string(),
            trailing: def.trailing,
            greedy: def.rest,
        });
    }

    Ok(out)
}

/// Whether a value must be colon-prefixed when rendered last.
fn needs_colon_prefix(value: &str) -> bool {
    value.is_empty() || value.contains(' ') || value.starts_with(':')
}

/// Render resolved parameters in declaration order.
///
/// Only the last parameter may take a `:` prefix: when its trailing flag
/// is set, or when its value would otherwise not survive re-tokenization.
/// Greedy values render bare; their spaces are real token boundaries.
pub fn render_params(f: &mut dyn Write, params: &[ResolvedParam]) -> fmt::Result {
    for (i, p) in params.iter().enumerate() {
        f.write_char(' ')?;
        let last = i + 1 == params.len();
        if last && (p.trailing || (!p.greedy && needs_colon_prefix(&p.value))) {
            f.write_char(':')?;
        }
        f.write_str(&p.value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::tokenizer::TokenizedLine;

    fn toks(line: &str) -> Vec<RawParam<'static>> {
        // Leak the test line so the borrowed tokens live long enough.
        let line: &'static str = Box::leak(line.to_string().into_boxed_str());
        TokenizedLine::parse(line).unwrap().params
    }

    fn privmsg_defs() -> Vec<ParamDef> {
        vec![ParamDef::new("target"), ParamDef::new("text").trailing()]
    }

    fn get<'a>(params: &'a [ResolvedParam], name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|p| p.name == Some(name))
            .map(|p| p.value.as_str())
    }

    #[test]
    fn test_resolve_simple() {
        let defs = privmsg_defs();
        let tokens = toks("PRIVMSG #ch :hello world");
        let params = resolve_params("PRIVMSG", &defs, &tokens, "#&").unwrap();
        assert_eq!(get(&params, "target"), Some("#ch"));
        assert_eq!(get(&params, "text"), Some("hello world"));
        assert!(params[1].trailing);
    }

    #[test]
    fn test_resolve_underflow() {
        let defs = privmsg_defs();
        let tokens = toks("PRIVMSG #ch");
        let err = resolve_params("PRIVMSG", &defs, &tokens, "#&").unwrap_err();
        assert_eq!(
            err,
            MessageParseError::MissingParam {
                command: "PRIVMSG".into(),
                param: "text",
            }
        );
    }

    #[test]
    fn test_optional_reserved_for_required() {
        // WHOIS [server] nicks: with one token the optional entry must not
        // steal it from the required one.
        let defs = vec![ParamDef::new("server").optional(), ParamDef::new("nicks")];
        let tokens = toks("WHOIS someone");
        let params = resolve_params("WHOIS", &defs, &tokens, "#&").unwrap();
        assert_eq!(get(&params, "server"), None);
        assert_eq!(get(&params, "nicks"), Some("someone"));

        let tokens = toks("WHOIS remote.server someone");
        let params = resolve_params("WHOIS", &defs, &tokens, "#&").unwrap();
        assert_eq!(get(&params, "server"), Some("remote.server"));
        assert_eq!(get(&params, "nicks"), Some("someone"));
    }

    #[test]
    fn test_optional_skipped_on_validation_failure() {
        let defs = vec![
            ParamDef::new("version").optional().matching(r"^\d+$"),
            ParamDef::new("name"),
        ];
        // Two tokens: the optional entry gets first pick but rejects "abc",
        // which must remain available for the required entry.
        let tokens = toks("X abc extra");
        let params = resolve_params("X", &defs, &tokens, "#&").unwrap();
        assert_eq!(get(&params, "version"), None);
        assert_eq!(get(&params, "name"), Some("abc"));
    }

    #[test]
    fn test_required_validation_failure() {
        let defs = vec![ParamDef::new("channel").channel()];
        let tokens = toks("JOINISH notachannel");
        let err = resolve_params("JOINISH", &defs, &tokens, "#&").unwrap_err();
        assert!(matches!(
            err,
            MessageParseError::InvalidParam { param: "channel", .. }
        ));
    }

    #[test]
    fn test_rest_greedy_join() {
        let defs = vec![
            ParamDef::new("target"),
            ParamDef::new("modes").optional(),
            ParamDef::new("args").optional().rest(),
        ];
        let tokens = toks("MODE #ch +ov alice bob");
        let params = resolve_params("MODE", &defs, &tokens, "#&").unwrap();
        assert_eq!(get(&params, "modes"), Some("+ov"));
        assert_eq!(get(&params, "args"), Some("alice bob"));
    }

    #[test]
    fn test_rest_stops_at_trailing() {
        let defs = vec![
            ParamDef::new("args").optional().rest(),
            ParamDef::new("reason").optional().trailing(),
        ];
        let tokens = toks("X a b :the reason");
        let params = resolve_params("X", &defs, &tokens, "#&").unwrap();
        assert_eq!(get(&params, "args"), Some("a b"));
        assert_eq!(get(&params, "reason"), Some("the reason"));
    }

    #[test]
    fn test_required_rest_empty_fails() {
        let defs = vec![ParamDef::new("words").rest()];
        let tokens = toks("X :only-trailing");
        let err = resolve_params("X", &defs, &tokens, "#&").unwrap_err();
        assert!(matches!(err, MessageParseError::MissingParam { .. }));
    }

    #[test]
    fn test_inconsistent_schema() {
        // A greedy entry ahead of a required single-token entry starves
        // it; resolution reports the malformed table, not bad input.
        let defs = vec![ParamDef::new("words").rest(), ParamDef::new("after")];
        let tokens = toks("X a b c");
        let err = resolve_params("X", &defs, &tokens, "#&").unwrap_err();
        assert!(matches!(err, MessageParseError::InconsistentSchema { .. }));
    }

    #[test]
    fn test_extra_tokens_ignored() {
        let defs = vec![ParamDef::new("first")];
        let tokens = toks("X one two three");
        let params = resolve_params("X", &defs, &tokens, "#&").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(get(&params, "first"), Some("one"));
    }

    #[test]
    fn test_trailing_entry_stops_walk() {
        let defs = vec![
            ParamDef::new("text").trailing(),
            ParamDef::new("never").optional(),
        ];
        let tokens = toks("X :hi there");
        let params = resolve_params("X", &defs, &tokens, "#&").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(get(&params, "text"), Some("hi there"));
    }

    #[test]
    fn test_build_simple() {
        let defs = privmsg_defs();
        let params =
            build_params("PRIVMSG", &defs, &[("target", "#ch"), ("text", "hi there")], "#&")
                .unwrap();
        let mut s = String::new();
        render_params(&mut s, &params).unwrap();
        assert_eq!(s, " #ch :hi there");
    }

    #[test]
    fn test_build_missing_required() {
        let defs = privmsg_defs();
        let err = build_params("PRIVMSG", &defs, &[("target", "#ch")], "#&").unwrap_err();
        assert_eq!(
            err,
            MessageParseError::MissingParam {
                command: "PRIVMSG".into(),
                param: "text",
            }
        );
    }

    #[test]
    fn test_build_unknown_name() {
        let defs = privmsg_defs();
        let err = build_params(
            "PRIVMSG",
            &defs,
            &[("target", "#ch"), ("text", "x"), ("bogus", "y")],
            "#&",
        )
        .unwrap_err();
        assert!(matches!(err, MessageParseError::UnknownParam { .. }));
    }

    #[test]
    fn test_build_rejects_unsafe_middle_value() {
        let defs = privmsg_defs();
        let err =
            build_params("PRIVMSG", &defs, &[("target", "#a b"), ("text", "x")], "#&").unwrap_err();
        assert!(matches!(
            err,
            MessageParseError::InvalidParam { param: "target", .. }
        ));
    }

    #[test]
    fn test_build_rejects_line_injection() {
        let defs = privmsg_defs();
        let err = build_params(
            "PRIVMSG",
            &defs,
            &[("target", "#ch"), ("text", "hi\r\nQUIT")],
            "#&",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MessageParseError::InvalidParam { param: "text", .. }
        ));
    }

    #[test]
    fn test_build_invalid_optional_fails() {
        let defs = vec![
            ParamDef::new("target"),
            ParamDef::new("version").optional().matching(r"^\d+$"),
        ];
        let err = build_params("X", &defs, &[("target", "t"), ("version", "nope")], "#&")
            .unwrap_err();
        assert!(matches!(
            err,
            MessageParseError::InvalidParam { param: "version", .. }
        ));
    }

    #[test]
    fn test_render_empty_trailing_gets_colon() {
        let defs = privmsg_defs();
        let params =
            build_params("PRIVMSG", &defs, &[("target", "#ch"), ("text", "")], "#&").unwrap();
        let mut s = String::new();
        render_params(&mut s, &params).unwrap();
        assert_eq!(s, " #ch :");
    }

    #[test]
    fn test_render_greedy_stays_bare() {
        let defs = vec![
            ParamDef::new("target"),
            ParamDef::new("args").optional().rest(),
        ];
        let params =
            build_params("MODE", &defs, &[("target", "#ch"), ("args", "alice bob")], "#&")
                .unwrap();
        let mut s = String::new();
        render_params(&mut s, &params).unwrap();
        assert_eq!(s, " #ch alice bob");
    }
}
