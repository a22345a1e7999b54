//! Error types specific to tag transports

use thiserror::Error;

/// Transport error type
///
/// Any I/O failure against the tag. Sessions end when they see one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection error
    #[error("Failed to connect to tag")]
    Connection,

    /// Transmission error
    #[error("Failed to transmit data")]
    Transmission,

    /// The tag left the field or was reset
    #[error("Tag was lost")]
    TagLost,

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Response too short to carry a status word
    #[error("Incomplete response: {0} bytes")]
    IncompleteResponse(usize),

    /// A block read returned something other than 16 bytes
    #[error("Invalid block length: {0} bytes")]
    BlockLength(usize),

    /// Status word error reported by a reader for a pseudo-APDU
    #[error("Status word error: {0:#06X}")]
    StatusWord(u16),

    /// Other error with message
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Create a new status word error from individual bytes
    pub const fn status_word_bytes(sw1: u8, sw2: u8) -> Self {
        Self::StatusWord(((sw1 as u16) << 8) | (sw2 as u16))
    }

    /// Create a general other error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other(message.into())
    }
}
