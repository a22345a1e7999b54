//! Device manager for PC/SC operations

use std::fmt;

use bytes::Bytes;
use pcsc::{Context, Scope};
use tagreader_core::{DiscoveredTag, Technology, codec};
use tracing::{debug, instrument, warn};

use crate::{
    atr::CardKind, config::PcscConfig, error::PcscError, mifare::PcscMifareClassic,
    monitor::PcscMonitor, reader::PcscReader, transport::PcscTransport,
};

/// A tag found on a PC/SC reader, ready for the dispatcher
pub type PcscTag = DiscoveredTag<PcscTransport, PcscMifareClassic>;

/// Manager for PC/SC device operations
pub struct PcscDeviceManager {
    /// PC/SC context
    context: Context,
    config: PcscConfig,
}

impl fmt::Debug for PcscDeviceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscDeviceManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PcscDeviceManager {
    /// Create a new PC/SC device manager
    pub fn new() -> Result<Self, PcscError> {
        Self::with_config(PcscConfig::default())
    }

    /// Create a device manager with custom configuration
    pub fn with_config(config: PcscConfig) -> Result<Self, PcscError> {
        let context = Context::establish(Scope::User)?;
        Ok(Self { context, config })
    }

    /// List all available card readers
    pub fn list_readers(&self) -> Result<Vec<PcscReader>, PcscError> {
        let readers = match self.context.list_readers_owned() {
            Ok(readers) => readers,
            Err(pcsc::Error::NoReadersAvailable) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        if readers.is_empty() {
            return Err(PcscError::NoReadersAvailable);
        }

        let mut result = Vec::with_capacity(readers.len());
        for reader_name in readers {
            let mut reader_states = [pcsc::ReaderState::new(
                reader_name.as_c_str(),
                pcsc::State::UNAWARE,
            )];

            match self.context.get_status_change(None, &mut reader_states) {
                Ok(()) => result.push(PcscReader::from_reader_state(&reader_states[0])),
                // If we can't get status, assume no card
                Err(_) => result.push(PcscReader::new(
                    reader_name.to_string_lossy().into_owned(),
                    None,
                )),
            }
        }

        Ok(result)
    }

    /// Open a transport to a specific reader without connecting to the card
    pub fn open_reader(&self, reader_name: &str) -> PcscTransport {
        PcscTransport::new(self.context.clone(), reader_name, self.config.clone())
    }

    /// Connect to the card on `reader_name` and resolve its capability
    ///
    /// ISO 14443-4 cards come back as [`Technology::IsoDep`], MIFARE Classic
    /// cards as [`Technology::MifareClassic`], and any other storage card as
    /// [`Technology::Unsupported`].
    #[instrument(level = "debug", skip(self))]
    pub fn discover_tag(&self, reader_name: &str) -> Result<PcscTag, PcscError> {
        let mut transport = self.open_reader(reader_name);
        transport.connect_card()?;

        let atr = transport.atr()?;
        let kind = CardKind::from_atr(&atr);
        debug!(atr = %codec::bytes_to_hex(&atr), ?kind, "Card classified");

        let id = transport.uid().unwrap_or_else(|e| {
            warn!(error = %e, "Reader did not report a UID");
            Bytes::new()
        });

        let technology = match kind {
            CardKind::IsoDep => Technology::IsoDep(transport),
            CardKind::MifareClassic(tag_type) => {
                Technology::MifareClassic(PcscMifareClassic::new(transport, tag_type))
            }
            CardKind::UnsupportedStorage(name) => {
                debug!("Unsupported storage card {name:04X}");
                Technology::Unsupported
            }
        };

        Ok(DiscoveredTag::new(id, technology))
    }

    /// Create a monitor for card events
    pub fn monitor(&self) -> PcscMonitor {
        PcscMonitor::new(self.context.clone(), self.config.poll_interval)
    }
}
