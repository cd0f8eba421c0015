//! Error types for the IRC client message framework.
//!
//! This module defines error types for protocol-level errors, message
//! parsing and construction failures, and reply-capture failures.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error while handing a line to the transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse or construct an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The raw line or command involved.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },

    /// A reply capture failed or could not be registered.
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
}

/// Errors encountered when parsing a line or resolving/constructing
/// command parameters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty.
    #[error("empty message")]
    EmptyMessage,

    /// No command token before end of input.
    #[error("missing command")]
    MissingCommand,

    /// Construction was attempted for a command with no schema.
    /// Parsing never produces this; unknown inbound commands fall back
    /// to the generic descriptor.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A required parameter was absent.
    #[error("{command}: missing required parameter <{param}>")]
    MissingParam {
        /// The command being resolved or constructed.
        command: String,
        /// Name of the absent parameter.
        param: &'static str,
    },

    /// A required parameter failed validation.
    #[error("{command}: invalid value {value:?} for parameter <{param}>")]
    InvalidParam {
        /// The command being resolved or constructed.
        command: String,
        /// Name of the failed parameter.
        param: &'static str,
        /// The offending value.
        value: String,
    },

    /// A supplied parameter name is not part of the command's schema.
    /// Only reachable in the construction direction.
    #[error("{command}: unknown parameter <{param}>")]
    UnknownParam {
        /// The command being constructed.
        command: String,
        /// The unrecognized name.
        param: String,
    },

    /// Token-count bookkeeping became impossible mid-resolution.
    /// Indicates a malformed descriptor table, not bad wire input.
    #[error("{command}: inconsistent parameter schema")]
    InconsistentSchema {
        /// The command whose schema is malformed.
        command: String,
    },
}

/// Errors delivered through (or when registering) a reply capture.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum CaptureError {
    /// The message's command does not support reply capture.
    #[error("command {command} does not support reply capture")]
    Unsupported {
        /// The non-capturing command.
        command: String,
    },

    /// The connection closed while the capture was still open.
    #[error("connection closed before the reply completed")]
    Disconnected,

    /// The caller-supplied wait deadline elapsed.
    #[error("timed out waiting for the reply")]
    TimedOut,
}

impl MessageParseError {
    /// Wrap this error with the raw line or command it came from.
    pub(crate) fn into_protocol(self, string: impl Into<String>) -> ProtocolError {
        ProtocolError::InvalidMessage {
            string: string.into(),
            cause: self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MessageParseError::MissingParam {
            command: "PRIVMSG".to_string(),
            param: "text",
        };
        assert_eq!(
            format!("{}", err),
            "PRIVMSG: missing required parameter <text>"
        );

        let err = CaptureError::Unsupported {
            command: "PRIVMSG".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "command PRIVMSG does not support reply capture"
        );
    }

    #[test]
    fn test_error_source_chaining() {
        let cause = MessageParseError::MissingCommand;
        let err = cause.clone().into_protocol(":prefix-only");

        let source = std::error::Error::source(&err);
        assert!(source.is_some());
        assert_eq!(source.unwrap().to_string(), cause.to_string());
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");
        let err: ProtocolError = io_err.into();
        assert!(matches!(err, ProtocolError::Io(_)));

        let err: ProtocolError = CaptureError::Disconnected.into();
        assert!(matches!(
            err,
            ProtocolError::Capture(CaptureError::Disconnected)
        ));
    }
}
