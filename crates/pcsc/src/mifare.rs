//! MIFARE Classic access through PC/SC storage card pseudo-APDUs
//!
//! Contactless readers do not pass MIFARE Classic frames through. Instead
//! they accept class `FF` commands: a key is loaded into a reader slot, a
//! sector is authenticated against that slot, and blocks are then read and
//! updated with `READ BINARY` / `UPDATE BINARY`.

use bytes::Bytes;
use tagreader_core::{
    Block, BlockTransport, ByteTransport, Command, MifareClassicType, MifareKey, Response,
    TransportError, mifare::BLOCK_SIZE, response::status::common,
};
use tracing::{debug, instrument};

use crate::transport::PcscTransport;

/// Pseudo-APDU instruction bytes
mod ins {
    pub(super) const LOAD_KEY: u8 = 0x82;
    pub(super) const GENERAL_AUTHENTICATE: u8 = 0x86;
    pub(super) const READ_BINARY: u8 = 0xB0;
    pub(super) const UPDATE_BINARY: u8 = 0xD6;
}

const CLA: u8 = 0xFF;
/// Volatile reader key slot used for key A
const KEY_SLOT: u8 = 0x00;
/// Key type byte for key A in GENERAL AUTHENTICATE
const KEY_TYPE_A: u8 = 0x60;

fn block_number(block: usize) -> Result<u8, TransportError> {
    u8::try_from(block).map_err(|_| TransportError::other(format!("block {block} out of range")))
}

fn encode(command: &Command) -> Result<Bytes, TransportError> {
    command
        .to_bytes()
        .map_err(|e| TransportError::other(e.to_string()))
}

/// `FF 82 00 <slot> 06 <key>`
pub(crate) fn load_key_command(key: &MifareKey) -> Command {
    Command::new_with_data(
        CLA,
        ins::LOAD_KEY,
        0x00,
        KEY_SLOT,
        Bytes::copy_from_slice(key.as_bytes()),
    )
}

/// `FF 86 00 00 05 01 00 <block> 60 <slot>`
pub(crate) fn authenticate_command(block: u8) -> Command {
    Command::new_with_data(
        CLA,
        ins::GENERAL_AUTHENTICATE,
        0x00,
        0x00,
        Bytes::copy_from_slice(&[0x01, 0x00, block, KEY_TYPE_A, KEY_SLOT]),
    )
}

/// `FF B0 00 <block> 10`
pub(crate) fn read_binary_command(block: u8) -> Command {
    Command::new_with_le(CLA, ins::READ_BINARY, 0x00, block, BLOCK_SIZE as u8)
}

/// `FF D6 00 <block> 10 <data>`
pub(crate) fn update_binary_command(block: u8, data: &Block) -> Command {
    Command::new_with_data(
        CLA,
        ins::UPDATE_BINARY,
        0x00,
        block,
        Bytes::copy_from_slice(data.as_bytes()),
    )
}

/// MIFARE Classic tag behind a PC/SC reader
#[derive(Debug)]
pub struct PcscMifareClassic<T = PcscTransport> {
    transport: T,
    tag_type: MifareClassicType,
}

impl<T: ByteTransport> PcscMifareClassic<T> {
    /// Wrap a transport to a card the reader identified as `tag_type`
    pub const fn new(transport: T, tag_type: MifareClassicType) -> Self {
        Self {
            transport,
            tag_type,
        }
    }

    /// Underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    fn exchange(&mut self, command: &Command) -> Result<Response, TransportError> {
        let raw = self.transport.transceive(&encode(command)?)?;
        Response::from_bytes(&raw)
    }

    fn expect_success(&mut self, command: &Command) -> Result<Response, TransportError> {
        let response = self.exchange(command)?;
        if !response.is_success() {
            let status = response.status();
            return Err(TransportError::status_word_bytes(status.sw1, status.sw2));
        }
        Ok(response)
    }
}

impl<T: ByteTransport> BlockTransport for PcscMifareClassic<T> {
    fn connect(&mut self) -> Result<(), TransportError> {
        self.transport.connect()
    }

    fn close(&mut self) {
        self.transport.close();
    }

    fn tag_type(&self) -> MifareClassicType {
        self.tag_type
    }

    #[instrument(level = "trace", skip(self, key))]
    fn authenticate_sector_with_key_a(
        &mut self,
        sector: usize,
        key: &MifareKey,
    ) -> Result<bool, TransportError> {
        let block = block_number(self.sector_to_block(sector))?;
        self.expect_success(&load_key_command(key))?;

        // Readers answer 63 00 when the key does not open the sector
        let status = self.exchange(&authenticate_command(block))?.status();
        if status.is_success() {
            Ok(true)
        } else if status == common::OPERATION_FAILED {
            debug!(sector, "Reader refused key A");
            Ok(false)
        } else {
            Err(TransportError::StatusWord(status.to_u16()))
        }
    }

    fn read_block(&mut self, block: usize) -> Result<Block, TransportError> {
        let response = self.expect_success(&read_binary_command(block_number(block)?))?;
        Block::try_from(&response.payload()[..])
    }

    fn write_block(&mut self, block: usize, data: &Block) -> Result<(), TransportError> {
        self.expect_success(&update_binary_command(block_number(block)?, data))?;
        Ok(())
    }
}
