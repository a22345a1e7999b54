//! PC/SC transport implementation

use std::{ffi::CString, fmt};

use bytes::Bytes;
use pcsc::{Card, Context, Disposition, MAX_BUFFER_SIZE};
use tagreader_core::{ByteTransport, Response, TransportError};
use tracing::{debug, warn};

use crate::{config::PcscConfig, error::PcscError};

/// Card command that makes the reader return the tag UID
const GET_UID: [u8; 5] = [0xFF, 0xCA, 0x00, 0x00, 0x00];

/// Transport implementation using PC/SC
pub struct PcscTransport {
    /// PC/SC context
    context: Context,
    /// Card connection, if established
    card: Option<Card>,
    /// Reader name
    reader_name: String,
    /// Configuration
    config: PcscConfig,
}

impl fmt::Debug for PcscTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscTransport")
            .field("reader_name", &self.reader_name)
            .field("has_card", &self.card.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl PcscTransport {
    /// Create a new PC/SC transport for the specified reader. No connection is
    /// made until [`ByteTransport::connect`] or [`PcscTransport::connect_card`].
    pub(crate) fn new(context: Context, reader_name: &str, config: PcscConfig) -> Self {
        Self {
            context,
            card: None,
            reader_name: reader_name.to_owned(),
            config,
        }
    }

    /// Connect to the card in the reader, if not connected yet
    pub fn connect_card(&mut self) -> Result<(), PcscError> {
        if self.card.is_some() {
            return Ok(());
        }

        let reader_cstr = CString::new(self.reader_name.clone())
            .map_err(|_| PcscError::ReaderNotFound(self.reader_name.clone()))?;

        match self.context.connect(
            &reader_cstr,
            self.config.share_mode.into(),
            self.config.protocols,
        ) {
            Ok(card) => {
                debug!(reader = %self.reader_name, "Connected to card");
                self.card = Some(card);
                Ok(())
            }
            Err(pcsc::Error::NoSmartcard) => Err(PcscError::NoCard(self.reader_name.clone())),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the ATR of the current card
    pub fn atr(&self) -> Result<Vec<u8>, PcscError> {
        self.card.as_ref().map_or_else(
            || Err(PcscError::NoCard(self.reader_name.clone())),
            |card| {
                card.get_attribute_owned(pcsc::Attribute::AtrString)
                    .map_err(Into::into)
            },
        )
    }

    /// Ask the reader for the tag UID
    pub fn uid(&mut self) -> Result<Bytes, PcscError> {
        let raw = self.transmit_command(&GET_UID)?;
        let response =
            Response::from_bytes(&raw).map_err(|e| PcscError::Other(e.to_string()))?;
        if !response.is_success() {
            return Err(PcscError::Status(response.status().to_u16()));
        }
        Ok(response.payload().clone())
    }

    /// Get the reader name
    pub fn reader_name(&self) -> &str {
        &self.reader_name
    }

    /// Check if the transport is connected to a card
    pub const fn has_card(&self) -> bool {
        self.card.is_some()
    }

    /// Transmit a command to the card. The card must be connected first.
    pub(crate) fn transmit_command(&mut self, command: &[u8]) -> Result<Bytes, PcscError> {
        let Some(card) = &mut self.card else {
            return Err(PcscError::NoCard(self.reader_name.clone()));
        };

        let mut response_buffer = [0u8; MAX_BUFFER_SIZE];
        match card.transmit(command, &mut response_buffer) {
            Ok(response) => Ok(Bytes::copy_from_slice(response)),
            Err(e) => {
                // The handle is useless once the card was reset or removed
                if matches!(e, pcsc::Error::ResetCard | pcsc::Error::RemovedCard) {
                    self.card = None;
                }
                Err(e.into())
            }
        }
    }

    /// Disconnect from the card, leaving it powered
    pub fn disconnect(&mut self) {
        if let Some(card) = self.card.take() {
            if let Err((_, e)) = card.disconnect(Disposition::LeaveCard) {
                warn!(reader = %self.reader_name, error = %e, "Failed to disconnect card");
            }
        }
    }
}

impl ByteTransport for PcscTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        self.connect_card().map_err(Into::into)
    }

    fn do_transceive(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.transmit_command(command).map_err(TransportError::from)
    }

    fn is_connected(&self) -> bool {
        self.card.is_some()
    }

    fn close(&mut self) {
        self.disconnect();
    }
}

impl Drop for PcscTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}
