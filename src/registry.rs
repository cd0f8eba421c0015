//! Command descriptors and the message-type registry.
//!
//! Every known command maps to exactly one [`Descriptor`]: its parameter
//! schema plus, where the command provokes a correlated reply run, the
//! predicates the reply correlator uses. The registry is built once on
//! first use and read-only afterwards. Unknown commands resolve to a
//! shared generic fallback whose parameters stay unnamed and unvalidated,
//! so parsing never fails merely because a command is unrecognized.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::caps;
use crate::message::Message;
use crate::schema::{min_params, ParamDef};

/// Reply-matching predicates for a capture-capable command.
#[derive(Clone, Copy)]
pub struct CaptureSpec {
    /// Does `candidate` answer the outgoing `origin`?
    pub is_response: fn(origin: &Message, candidate: &Message) -> bool,
    /// Does an accepted `candidate` complete the exchange?
    pub ends_response: fn(origin: &Message, candidate: &Message) -> bool,
}

impl std::fmt::Debug for CaptureSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSpec").finish_non_exhaustive()
    }
}

/// The static schema for one message type.
#[derive(Clone, Debug)]
pub struct Descriptor {
    /// Uppercase command name; empty for the generic fallback.
    pub command: &'static str,
    /// Ordered parameter schema.
    pub params: Vec<ParamDef>,
    /// Present when the command supports reply capture.
    pub capture: Option<CaptureSpec>,
}

impl Descriptor {
    fn new(command: &'static str, params: Vec<ParamDef>) -> Self {
        debug_assert!(
            params.iter().filter(|p| p.rest).count() <= 1,
            "{command}: at most one rest parameter"
        );
        debug_assert!(
            params.iter().position(|p| p.trailing).map_or(true, |i| i + 1 == params.len()),
            "{command}: the trailing parameter must be declared last"
        );
        Descriptor {
            command,
            params,
            capture: None,
        }
    }

    fn capturing(mut self, spec: CaptureSpec) -> Self {
        self.capture = Some(spec);
        self
    }

    /// Number of required parameters.
    pub fn min_params(&self) -> usize {
        min_params(&self.params)
    }

    /// Whether this command supports reply capture.
    pub fn supports_capture(&self) -> bool {
        self.capture.is_some()
    }

    /// Whether this is the generic fallback for unknown commands.
    pub fn is_generic(&self) -> bool {
        self.command.is_empty()
    }
}

/// Command-name → descriptor lookup.
pub struct Registry {
    by_command: HashMap<&'static str, Descriptor>,
    fallback: Descriptor,
}

/// Nickname shape per RFC 2812, sized leniently for modern networks.
const NICK_PATTERN: &str = r"^[A-Za-z\[\]\\`_^{|}~][A-Za-z0-9\[\]\\`_^{|}~-]*$";

/// CAP subcommand words.
const CAP_SUB_PATTERN: &str = r"^(?i:LS|LIST|REQ|ACK|NAK|NEW|DEL|END)$";

impl Registry {
    /// Build the registry of client-relevant commands.
    fn builtin() -> Registry {
        let table = vec![
            // Connection registration
            Descriptor::new("PASS", vec![ParamDef::new("password")]),
            Descriptor::new("NICK", vec![ParamDef::new("nickname").matching(NICK_PATTERN)]),
            Descriptor::new(
                "USER",
                vec![
                    ParamDef::new("username"),
                    ParamDef::new("mode"),
                    ParamDef::new("unused"),
                    ParamDef::new("realname").trailing(),
                ],
            ),
            Descriptor::new("OPER", vec![ParamDef::new("name"), ParamDef::new("password")]),
            Descriptor::new("QUIT", vec![ParamDef::new("reason").optional().trailing()]),
            // Channel operations
            Descriptor::new(
                "JOIN",
                vec![ParamDef::new("channels"), ParamDef::new("keys").optional()],
            ),
            Descriptor::new(
                "PART",
                vec![
                    ParamDef::new("channels"),
                    ParamDef::new("reason").optional().trailing(),
                ],
            ),
            Descriptor::new(
                "TOPIC",
                vec![
                    ParamDef::new("channel").channel(),
                    ParamDef::new("topic").optional().trailing(),
                ],
            ),
            Descriptor::new(
                "NAMES",
                vec![
                    ParamDef::new("channels").optional(),
                    ParamDef::new("target").optional(),
                ],
            ),
            Descriptor::new(
                "LIST",
                vec![
                    ParamDef::new("channels").optional(),
                    ParamDef::new("target").optional(),
                ],
            ),
            Descriptor::new(
                "INVITE",
                vec![
                    ParamDef::new("nickname"),
                    ParamDef::new("channel").channel(),
                ],
            ),
            Descriptor::new(
                "KICK",
                vec![
                    ParamDef::new("channel").channel(),
                    ParamDef::new("users"),
                    ParamDef::new("comment").optional().trailing(),
                ],
            ),
            // Messaging
            Descriptor::new(
                "PRIVMSG",
                vec![ParamDef::new("target"), ParamDef::new("text").trailing()],
            ),
            Descriptor::new(
                "NOTICE",
                vec![ParamDef::new("target"), ParamDef::new("text").trailing()],
            ),
            Descriptor::new("TAGMSG", vec![ParamDef::new("target")]),
            // Server queries
            Descriptor::new("MOTD", vec![ParamDef::new("target").optional()]),
            Descriptor::new("VERSION", vec![ParamDef::new("target").optional()]),
            Descriptor::new(
                "PING",
                vec![ParamDef::new("server"), ParamDef::new("server2").optional()],
            ),
            Descriptor::new(
                "PONG",
                vec![ParamDef::new("server"), ParamDef::new("server2").optional()],
            ),
            Descriptor::new("ERROR", vec![ParamDef::new("reason").trailing()]),
            // User state and queries
            Descriptor::new("AWAY", vec![ParamDef::new("text").optional().trailing()]),
            Descriptor::new(
                "WHO",
                vec![
                    ParamDef::new("mask").optional(),
                    ParamDef::new("flags").optional(),
                ],
            ),
            Descriptor::new(
                "WHOIS",
                vec![ParamDef::new("target").optional(), ParamDef::new("nicks")],
            ),
            Descriptor::new(
                "WHOWAS",
                vec![
                    ParamDef::new("nickname"),
                    ParamDef::new("count").optional(),
                    ParamDef::new("target").optional(),
                ],
            ),
            Descriptor::new(
                "MODE",
                vec![
                    ParamDef::new("target"),
                    ParamDef::new("modes").optional(),
                    ParamDef::new("args").optional().rest(),
                ],
            ),
            // IRCv3
            Descriptor::new(
                "CAP",
                vec![
                    ParamDef::new("target").optional(),
                    ParamDef::new("subcommand").matching(CAP_SUB_PATTERN),
                    ParamDef::new("version").optional().matching(r"^\d+$"),
                    ParamDef::new("continuation").optional().matching(r"^\*$"),
                    ParamDef::new("caps").optional().trailing(),
                ],
            )
            .capturing(CaptureSpec {
                is_response: caps::is_cap_response,
                ends_response: caps::ends_cap_response,
            }),
            Descriptor::new("AUTHENTICATE", vec![ParamDef::new("data")]),
            Descriptor::new("ACCOUNT", vec![ParamDef::new("account")]),
            Descriptor::new(
                "MONITOR",
                vec![
                    ParamDef::new("modifier"),
                    ParamDef::new("targets").optional(),
                ],
            ),
            Descriptor::new("SETNAME", vec![ParamDef::new("realname").trailing()]),
        ];

        let mut by_command = HashMap::with_capacity(table.len());
        for descriptor in table {
            by_command.insert(descriptor.command, descriptor);
        }

        Registry {
            by_command,
            fallback: Descriptor::new("", Vec::new()),
        }
    }

    /// Look up the descriptor for an uppercase command name.
    pub fn lookup(&self, command: &str) -> Option<&Descriptor> {
        self.by_command.get(command)
    }

    /// The generic fallback descriptor for unknown commands.
    pub fn fallback(&self) -> &Descriptor {
        &self.fallback
    }

    /// All registered command names.
    pub fn commands(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_command.keys().copied()
    }
}

lazy_static! {
    static ref REGISTRY: Registry = Registry::builtin();
}

/// The process-wide registry, built on first use.
pub fn global() -> &'static Registry {
    &REGISTRY
}
