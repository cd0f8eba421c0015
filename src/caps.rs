//! IRCv3 capability negotiation: subcommands and reply matching.
//!
//! This module supplies the CAP-family predicates used by the reply
//! correlator: which inbound `CAP` lines answer an outgoing one, and when
//! a multi-chunk `LS`/`LIST` listing is complete.
//!
//! # Reference
//! - IRCv3 Capability Negotiation: <https://ircv3.net/specs/extensions/capability-negotiation>

use std::fmt;
use std::str::FromStr;

use crate::message::Message;

/// CAP subcommands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapSubCommand {
    /// List capabilities the server supports.
    LS,
    /// List capabilities currently enabled on this connection.
    LIST,
    /// Request enabling/disabling capabilities.
    REQ,
    /// Server acknowledged a REQ.
    ACK,
    /// Server rejected a REQ.
    NAK,
    /// Server advertises newly available capabilities.
    NEW,
    /// Server withdraws capabilities.
    DEL,
    /// End capability negotiation.
    END,
}

impl CapSubCommand {
    /// The wire form of this subcommand.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LS => "LS",
            Self::LIST => "LIST",
            Self::REQ => "REQ",
            Self::ACK => "ACK",
            Self::NAK => "NAK",
            Self::NEW => "NEW",
            Self::DEL => "DEL",
            Self::END => "END",
        }
    }
}

impl fmt::Display for CapSubCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapSubCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("LS") {
            Ok(Self::LS)
        } else if s.eq_ignore_ascii_case("LIST") {
            Ok(Self::LIST)
        } else if s.eq_ignore_ascii_case("REQ") {
            Ok(Self::REQ)
        } else if s.eq_ignore_ascii_case("ACK") {
            Ok(Self::ACK)
        } else if s.eq_ignore_ascii_case("NAK") {
            Ok(Self::NAK)
        } else if s.eq_ignore_ascii_case("NEW") {
            Ok(Self::NEW)
        } else if s.eq_ignore_ascii_case("DEL") {
            Ok(Self::DEL)
        } else if s.eq_ignore_ascii_case("END") {
            Ok(Self::END)
        } else {
            Err(())
        }
    }
}

/// Compare an outgoing capability list with the one a server echoed back.
///
/// Some servers append whitespace to the echoed list; only the inbound
/// side is trimmed. The stored outgoing list is compared verbatim.
pub fn lists_match(requested: Option<&str>, echoed: Option<&str>) -> bool {
    match (requested, echoed) {
        (Some(requested), Some(echoed)) => requested == echoed.trim_end(),
        _ => false,
    }
}

fn subcommand(msg: &Message) -> Option<CapSubCommand> {
    msg.param("subcommand")?.parse().ok()
}

/// Does `candidate` answer the outgoing CAP message `origin`?
///
/// `ACK`/`NAK` answer a `REQ` only when the echoed capability list equals
/// the requested one; `LS`/`LIST` replies answer any origin with the same
/// subcommand.
pub(crate) fn is_cap_response(origin: &Message, candidate: &Message) -> bool {
    if candidate.command() != "CAP" {
        return false;
    }
    let (Some(sent), Some(received)) = (subcommand(origin), subcommand(candidate)) else {
        return false;
    };

    match sent {
        CapSubCommand::REQ => {
            matches!(received, CapSubCommand::ACK | CapSubCommand::NAK)
                && lists_match(origin.param("caps"), candidate.param("caps"))
        }
        CapSubCommand::LS | CapSubCommand::LIST => received == sent,
        _ => false,
    }
}

/// Does an accepted `candidate` complete the exchange?
///
/// A chunked `LS`/`LIST` reply carries a `*` continuation marker before
/// the capability list; the exchange stays open until a reply without it.
/// Every other accepted reply ends the exchange immediately.
pub(crate) fn ends_cap_response(_origin: &Message, candidate: &Message) -> bool {
    match subcommand(candidate) {
        Some(CapSubCommand::LS | CapSubCommand::LIST) => {
            candidate.param("continuation").is_none()
        }
        _ => true,
    }
}
