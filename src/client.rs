//! The connection-facing facade.
//!
//! [`Client`] wires the pieces together over a caller-provided
//! [`LineSink`]: inbound lines are parsed, offered to the reply
//! correlator, then dispatched to handlers; outbound messages are
//! validated before anything touches the sink. The client performs no
//! network I/O itself; the transport owns the socket, feeds
//! [`Client::receive_line`], and calls [`Client::disconnected`] when the
//! connection drops.

use tracing::warn;

use crate::capture::{CaptureHandle, ReplyCorrelator};
use crate::error::{ProtocolError, Result};
use crate::message::Message;
use crate::router::{EventRouter, HandlerId};
use crate::validation::DEFAULT_CHANNEL_PREFIXES;

/// Where outgoing lines go. Implemented by the transport layer.
pub trait LineSink: Send + Sync {
    /// Hand one line (without CRLF) to the transport.
    fn send_line(&self, line: &str) -> std::io::Result<()>;
}

/// Connection-level configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Channel-type prefixes used to validate channel-kind parameters
    /// (the ISUPPORT `CHANTYPES` value).
    pub channel_prefixes: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            channel_prefixes: DEFAULT_CHANNEL_PREFIXES.to_string(),
        }
    }
}

/// A protocol session bound to one connection's line stream.
pub struct Client<S: LineSink> {
    config: ClientConfig,
    sink: S,
    router: EventRouter,
    correlator: ReplyCorrelator,
}

impl<S: LineSink> Client<S> {
    /// Create a client with the default configuration.
    pub fn new(sink: S) -> Client<S> {
        Self::with_config(sink, ClientConfig::default())
    }

    /// Create a client with an explicit configuration.
    pub fn with_config(sink: S, config: ClientConfig) -> Client<S> {
        Client {
            config,
            sink,
            router: EventRouter::new(),
            correlator: ReplyCorrelator::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Register a handler for a command.
    pub fn on<F>(&self, command: &str, handler: F) -> HandlerId
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.router.on(command, handler)
    }

    /// Remove a previously registered handler.
    pub fn off(&self, id: HandlerId) -> bool {
        self.router.off(id)
    }

    /// Construct a message from named values, validated against this
    /// connection's channel prefixes.
    pub fn build(&self, command: &str, values: &[(&str, &str)]) -> Result<Message> {
        Message::build_with_prefixes(command, values, &self.config.channel_prefixes)
            .map_err(|e| e.into_protocol(command))
    }

    /// Serialize a message and hand it to the sink.
    pub fn send(&self, msg: &Message) -> Result<()> {
        self.sink.send_line(&msg.to_string())?;
        Ok(())
    }

    /// Send a message and capture its reply run.
    ///
    /// The capture is registered before the line reaches the sink, so a
    /// reply arriving on another task immediately after the write cannot
    /// be missed. A failed write cancels the registration.
    pub fn send_and_capture(&self, msg: &Message) -> Result<CaptureHandle> {
        let handle = self.correlator.begin_capture(msg)?;
        if let Err(err) = self.sink.send_line(&msg.to_string()) {
            drop(handle);
            return Err(ProtocolError::Io(err));
        }
        Ok(handle)
    }

    /// Process one inbound line.
    ///
    /// A malformed line is logged and dropped; it never disturbs the
    /// receive loop. A parsed message is offered to open captures first,
    /// then dispatched to handlers; matching a capture does not consume
    /// it.
    pub fn receive_line(&self, line: &str) {
        let msg = match Message::parse_with_prefixes(line, &self.config.channel_prefixes) {
            Ok(msg) => msg,
            Err(err) => {
                warn!(%err, line, "dropping malformed line");
                return;
            }
        };
        self.correlator.offer(&msg);
        self.router.dispatch(&msg);
    }

    /// Note that the transport lost the connection: every open capture
    /// fails with the connection-closed error.
    pub fn disconnected(&self) {
        self.correlator.disconnect_all();
    }
}
