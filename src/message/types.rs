//! The typed IRC message value.

use std::fmt;
use std::str::FromStr;

use crate::error::MessageParseError;
use crate::prefix::Prefix;
use crate::registry::{self, Descriptor};
use crate::schema::{build_params, render_params, resolve_params, ResolvedParam};
use crate::validation::DEFAULT_CHANNEL_PREFIXES;

use super::tags::{parse_tag_block, render_tags, Tag};
use super::tokenizer::TokenizedLine;

/// An immutable, schema-resolved IRC message.
///
/// A `Message` is created either by parsing a wire line (the raw line is
/// retained) or by constructing it from named parameter values (no raw
/// line until serialized). Either way its parameters have already passed
/// the command schema's validation.
///
/// # Examples
///
/// ```
/// use slirc_client::Message;
///
/// let msg = Message::parse(":nick!user@host PRIVMSG #channel :Hello!").unwrap();
/// assert_eq!(msg.command(), "PRIVMSG");
/// assert_eq!(msg.param("target"), Some("#channel"));
/// assert_eq!(msg.param("text"), Some("Hello!"));
///
/// let req = Message::build("CAP", &[("subcommand", "REQ"), ("caps", "multi-prefix")]).unwrap();
/// assert_eq!(req.to_string(), "CAP REQ :multi-prefix");
/// ```
#[derive(Clone, Debug)]
pub struct Message {
    descriptor: &'static Descriptor,
    command: String,
    /// Message tags, values unescaped. `None` when the line had no tag block.
    pub tags: Option<Vec<Tag>>,
    /// Sender prefix, when present.
    pub prefix: Option<Prefix>,
    params: Vec<ResolvedParam>,
    raw: Option<String>,
}

impl Message {
    /// Parse one wire line using the default channel-type prefixes.
    pub fn parse(line: &str) -> Result<Message, MessageParseError> {
        Self::parse_with_prefixes(line, DEFAULT_CHANNEL_PREFIXES)
    }

    /// Parse one wire line, validating channel-kind parameters against
    /// the given channel-type prefix set (the ISUPPORT `CHANTYPES`
    /// value).
    pub fn parse_with_prefixes(
        line: &str,
        channel_prefixes: &str,
    ) -> Result<Message, MessageParseError> {
        let tokenized = TokenizedLine::parse(line)?;
        let command = tokenized.command.to_ascii_uppercase();
        let registry = registry::global();

        let (descriptor, params) = match registry.lookup(&command) {
            Some(descriptor) => {
                let params =
                    resolve_params(&command, &descriptor.params, &tokenized.params, channel_prefixes)?;
                (descriptor, params)
            }
            None => {
                let params = tokenized
                    .params
                    .iter()
                    .map(|t| ResolvedParam::unnamed(t.value.to_string(), t.trailing))
                    .collect();
                (registry.fallback(), params)
            }
        };

        Ok(Message {
            descriptor,
            command,
            tags: tokenized.tags.map(parse_tag_block),
            prefix: tokenized.prefix.map(Prefix::parse),
            params,
            raw: Some(line.trim_end_matches(['\r', '\n']).to_string()),
        })
    }

    /// Construct a message from named parameter values, using the default
    /// channel-type prefixes.
    pub fn build(command: &str, values: &[(&str, &str)]) -> Result<Message, MessageParseError> {
        Self::build_with_prefixes(command, values, DEFAULT_CHANNEL_PREFIXES)
    }

    /// Construct a message from named parameter values.
    ///
    /// The command must have a registered schema; every supplied value is
    /// validated before anything can be sent. Unknown commands are built
    /// with [`Message::raw`] instead.
    pub fn build_with_prefixes(
        command: &str,
        values: &[(&str, &str)],
        channel_prefixes: &str,
    ) -> Result<Message, MessageParseError> {
        let command = command.to_ascii_uppercase();
        let descriptor = registry::global()
            .lookup(&command)
            .ok_or_else(|| MessageParseError::UnknownCommand(command.clone()))?;
        let params = build_params(&command, &descriptor.params, values, channel_prefixes)?;

        Ok(Message {
            descriptor,
            command,
            tags: None,
            prefix: None,
            params,
            raw: None,
        })
    }

    /// Construct a message for a command with no schema.
    ///
    /// Arguments are positional and unvalidated; only the final argument
    /// may contain spaces (it serializes as the trailing parameter).
    pub fn raw(command: &str, args: &[&str]) -> Message {
        Message {
            descriptor: registry::global().fallback(),
            command: command.to_ascii_uppercase(),
            tags: None,
            prefix: None,
            params: args
                .iter()
                .map(|a| ResolvedParam::unnamed(a.to_string(), false))
                .collect(),
            raw: None,
        }
    }

    /// The uppercase command name.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The schema this message resolved against.
    pub fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    /// Whether this message's command supports reply capture.
    pub fn supports_capture(&self) -> bool {
        self.descriptor.supports_capture()
    }

    /// A named parameter's value.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == Some(name))
            .map(|p| p.value.as_str())
    }

    /// All resolved parameters in schema order (positional order for
    /// unknown commands).
    pub fn params(&self) -> &[ResolvedParam] {
        &self.params
    }

    /// The value of a tag, if the tag is present and has one.
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .as_deref()?
            .iter()
            .find(|Tag(n, _)| n == name)?
            .1
            .as_deref()
    }

    /// The wire line this message was parsed from, if any.
    pub fn raw_line(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Add or replace a tag.
    pub fn with_tag(mut self, name: &str, value: Option<&str>) -> Message {
        let tags = self.tags.get_or_insert_with(Vec::new);
        let value = value.map(str::to_string);
        if let Some(existing) = tags.iter_mut().find(|Tag(n, _)| n == name) {
            existing.1 = value;
        } else {
            tags.push(Tag(name.to_string(), value));
        }
        self
    }

    /// Set the sender prefix.
    pub fn with_prefix(mut self, prefix: Prefix) -> Message {
        self.prefix = Some(prefix);
        self
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::parse(s)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tags) = &self.tags {
            if !tags.is_empty() {
                f.write_str("@")?;
                render_tags(f, tags)?;
                f.write_str(" ")?;
            }
        }
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix.raw)?;
        }
        f.write_str(&self.command)?;
        render_params(f, &self.params)
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        // The retained raw line is provenance, not identity.
        self.command == other.command
            && self.tags == other.tags
            && self.prefix == other.prefix
            && self.params == other.params
    }
}
