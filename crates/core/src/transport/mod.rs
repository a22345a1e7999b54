//! Transport traits for tag communication
//!
//! The sessions in this crate never talk to hardware directly. They are handed
//! one of two capabilities:
//!
//! - [`ByteTransport`]: raw frames in, raw frames out (ISO-DEP)
//! - [`BlockTransport`]: sector authentication and 16-byte block access
//!   (MIFARE Classic)
//!
//! All calls are blocking. Timeouts are the transport's business and surface
//! as [`TransportError::Timeout`].

pub mod error;
#[cfg(test)]
pub(crate) mod mock;

use std::fmt;

use bytes::Bytes;
pub use error::TransportError;
use tracing::{debug, trace};

use crate::mifare::{Block, MifareClassicType, MifareKey};

/// Raw byte exchange with an ISO-DEP tag
///
/// A transport is responsible for sending and receiving raw APDU bytes.
/// It has no knowledge of command structure or status words.
pub trait ByteTransport: fmt::Debug {
    /// Open the link to the tag
    fn connect(&mut self) -> Result<(), TransportError>;

    /// Send raw bytes to the tag and return the raw response
    fn transceive(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        trace!(command = %hex::encode_upper(command), "Transmitting raw command");
        let result = self.do_transceive(command);
        match &result {
            Ok(response) => {
                trace!(response = %hex::encode_upper(response), "Received raw response");
            }
            Err(e) => {
                debug!(error = ?e, "Transport error during transmission");
            }
        }
        result
    }

    /// Internal implementation of transceive
    /// This is the method that concrete implementations should override
    fn do_transceive(&mut self, command: &[u8]) -> Result<Bytes, TransportError>;

    /// Check if the transport is connected to a tag
    fn is_connected(&self) -> bool;

    /// Release the link. Must be safe to call when not connected.
    fn close(&mut self);
}

/// Sector and block access to a MIFARE Classic tag
///
/// Geometry queries default to the layout of [`BlockTransport::tag_type`].
pub trait BlockTransport: fmt::Debug {
    /// Open the link to the tag
    fn connect(&mut self) -> Result<(), TransportError>;

    /// Release the link. Must be safe to call when not connected.
    fn close(&mut self);

    /// Card type as reported by the tag
    fn tag_type(&self) -> MifareClassicType;

    /// Number of sectors
    fn sector_count(&self) -> usize {
        self.tag_type().sector_count()
    }

    /// Total number of blocks
    fn block_count(&self) -> usize {
        self.tag_type().block_count()
    }

    /// Storage size in bytes
    fn size(&self) -> usize {
        self.tag_type().size()
    }

    /// Number of blocks in `sector`
    fn block_count_in_sector(&self, sector: usize) -> usize {
        self.tag_type().blocks_in_sector(sector)
    }

    /// Index of the first block of `sector`
    fn sector_to_block(&self, sector: usize) -> usize {
        self.tag_type().sector_to_block(sector)
    }

    /// Authenticate `sector` with key A. `Ok(false)` means the key was rejected.
    fn authenticate_sector_with_key_a(
        &mut self,
        sector: usize,
        key: &MifareKey,
    ) -> Result<bool, TransportError>;

    /// Read one 16-byte block
    fn read_block(&mut self, block: usize) -> Result<Block, TransportError>;

    /// Write one 16-byte block
    fn write_block(&mut self, block: usize, data: &Block) -> Result<(), TransportError>;
}

impl<T: ByteTransport + ?Sized> ByteTransport for &mut T {
    fn connect(&mut self) -> Result<(), TransportError> {
        (**self).connect()
    }

    fn transceive(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        (**self).transceive(command)
    }

    fn do_transceive(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        (**self).do_transceive(command)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

impl<T: BlockTransport + ?Sized> BlockTransport for &mut T {
    fn connect(&mut self) -> Result<(), TransportError> {
        (**self).connect()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn tag_type(&self) -> MifareClassicType {
        (**self).tag_type()
    }

    fn sector_count(&self) -> usize {
        (**self).sector_count()
    }

    fn block_count(&self) -> usize {
        (**self).block_count()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn block_count_in_sector(&self, sector: usize) -> usize {
        (**self).block_count_in_sector(sector)
    }

    fn sector_to_block(&self, sector: usize) -> usize {
        (**self).sector_to_block(sector)
    }

    fn authenticate_sector_with_key_a(
        &mut self,
        sector: usize,
        key: &MifareKey,
    ) -> Result<bool, TransportError> {
        (**self).authenticate_sector_with_key_a(sector, key)
    }

    fn read_block(&mut self, block: usize) -> Result<Block, TransportError> {
        (**self).read_block(block)
    }

    fn write_block(&mut self, block: usize, data: &Block) -> Result<(), TransportError> {
        (**self).write_block(block, data)
    }
}
