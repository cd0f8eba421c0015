//! # slirc-client
//!
//! A Rust library for the client side of the IRC wire protocol: typed,
//! schema-validated messages with full IRCv3 tag and capability support,
//! and reply capture: correlating the run of inbound messages a sent
//! command provokes back to its sender.
//!
//! ## Features
//!
//! - IRC line parsing with tags, prefixes, commands, and parameters
//! - Declarative per-command parameter schemas: positional wire tokens
//!   resolve onto named, validated fields, and named values serialize
//!   back to conformant lines
//! - IRCv3 message-tag escaping and capability negotiation matching
//! - Reply capture: send a command, await the correlated reply run
//! - Command-keyed event routing for application handlers
//! - Transport-agnostic: bring your own socket, feed it lines

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Parsing and constructing messages
//!
//! ```rust
//! use slirc_client::Message;
//!
//! let raw = "@time=2023-01-01T12:00:00Z :nick!user@host PRIVMSG #channel :Hello!";
//! let message: Message = raw.parse().expect("valid IRC line");
//! assert_eq!(message.param("target"), Some("#channel"));
//! assert_eq!(message.tag_value("time"), Some("2023-01-01T12:00:00Z"));
//!
//! let notice = Message::build("NOTICE", &[("target", "ops"), ("text", "deploy done")])
//!     .expect("valid parameters");
//! assert_eq!(notice.to_string(), "NOTICE ops :deploy done");
//! ```
//!
//! ### Capturing a reply
//!
//! ```rust,no_run
//! use slirc_client::{Client, LineSink, Message};
//!
//! # struct MySink;
//! # impl LineSink for MySink {
//! #     fn send_line(&self, _line: &str) -> std::io::Result<()> { Ok(()) }
//! # }
//! # async fn negotiate() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(MySink);
//! let req = client.build("CAP", &[("subcommand", "REQ"), ("caps", "multi-prefix")])?;
//! let handle = client.send_and_capture(&req)?;
//! // ... the transport feeds client.receive_line(...) from another task ...
//! let replies = handle.wait().await?;
//! assert_eq!(replies[0].param("subcommand"), Some("ACK"));
//! # Ok(())
//! # }
//! ```

pub mod caps;
pub mod capture;
pub mod client;
pub mod error;
pub mod message;
pub mod prefix;
pub mod registry;
pub mod router;
pub mod schema;
pub mod validation;

pub use self::caps::CapSubCommand;
pub use self::capture::{CaptureHandle, ReplyCorrelator};
pub use self::client::{Client, ClientConfig, LineSink};
pub use self::error::{CaptureError, MessageParseError, ProtocolError};
pub use self::message::{Message, Tag};
pub use self::prefix::Prefix;
pub use self::registry::{CaptureSpec, Descriptor, Registry};
pub use self::router::{EventRouter, HandlerId};
pub use self::schema::{ParamDef, ParamKind, ResolvedParam};
