//! Core error type for tag operations
//!
//! Sessions never surface these to their caller; they are folded into a
//! [`SessionReport`](crate::SessionReport). The codec and the command
//! builders return them directly.

use crate::response::status::StatusWord;
use crate::transport::TransportError;

/// Result type for tag operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Core error type that encompasses all possible errors in the crate
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// I/O failure against the tag
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Malformed input to the codec or a command builder
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The card answered with a status word other than 90 00
    #[error("Unexpected status {status} ({})", .status.description())]
    StatusMismatch {
        /// Status word returned by the card
        status: StatusWord,
    },

    /// The card answered but the payload failed a business check
    #[error("{0}")]
    ProtocolMismatch(String),

    /// Key A authentication was rejected for a sector
    #[error("Sector {sector:02}: authentication failed")]
    AuthenticationFailure {
        /// Sector that rejected the key
        sector: usize,
    },
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a protocol mismatch error
    pub fn protocol_mismatch<S: Into<String>>(message: S) -> Self {
        Self::ProtocolMismatch(message.into())
    }

    /// Whether this error came from the transport
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether the card answered, but not the way a tag of ours would
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::StatusMismatch { .. } | Self::ProtocolMismatch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_converts() {
        let err = Error::from(TransportError::TagLost);
        assert_eq!(err, Error::Transport(TransportError::TagLost));
        assert_eq!(err.to_string(), "Tag was lost");
        assert!(err.is_transport());
        assert!(!err.is_mismatch());
    }

    #[test]
    fn test_protocol_mismatch_display() {
        let err = Error::protocol_mismatch("account number wrong");
        assert_eq!(err.to_string(), "account number wrong");
        assert!(err.is_mismatch());
    }

    #[test]
    fn test_status_mismatch_display() {
        let err = Error::StatusMismatch {
            status: StatusWord::new(0x6A, 0x82),
        };
        assert_eq!(err.to_string(), "Unexpected status 6A 82 (File not found)");
        assert!(err.is_mismatch());
    }
}
