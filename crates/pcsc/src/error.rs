//! Error types for the PC/SC backend

use tagreader_core::TransportError;

/// PC/SC-specific errors
#[derive(Debug, thiserror::Error)]
pub enum PcscError {
    /// PC/SC error
    #[error("PC/SC error: {0}")]
    Pcsc(#[from] pcsc::Error),

    /// No readers available
    #[error("No readers available")]
    NoReadersAvailable,

    /// Reader not found
    #[error("Reader not found: {0}")]
    ReaderNotFound(String),

    /// No card present in reader
    #[error("No card present in reader: {0}")]
    NoCard(String),

    /// The reader answered a pseudo-APDU with an error status
    #[error("Reader returned status {0:04X}")]
    Status(u16),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<PcscError> for TransportError {
    fn from(error: PcscError) -> Self {
        match error {
            PcscError::Pcsc(pcsc::Error::Timeout) => Self::Timeout,
            PcscError::Pcsc(
                pcsc::Error::RemovedCard | pcsc::Error::ResetCard | pcsc::Error::NoSmartcard,
            )
            | PcscError::NoCard(_) => Self::TagLost,
            PcscError::Pcsc(
                pcsc::Error::UnpoweredCard
                | pcsc::Error::UnresponsiveCard
                | pcsc::Error::ReaderUnavailable
                | pcsc::Error::UnknownReader,
            )
            | PcscError::ReaderNotFound(_)
            | PcscError::NoReadersAvailable => Self::Connection,
            PcscError::Status(sw) => Self::StatusWord(sw),
            PcscError::Pcsc(e) => Self::Other(format!("PC/SC error: {e}")),
            PcscError::Other(message) => Self::Other(message),
        }
    }
}
