//! Scripted transports for tests

use std::collections::{HashSet, VecDeque};

use bytes::Bytes;

use super::{BlockTransport, ByteTransport, TransportError};
use crate::mifare::{Block, MifareClassicType, MifareKey};

/// Mock ISO-DEP transport replaying queued responses
#[derive(Debug, Default)]
pub(crate) struct MockByteTransport {
    /// Responses to return, in order
    pub(crate) responses: VecDeque<Result<Bytes, TransportError>>,
    /// Commands that were sent
    pub(crate) commands: Vec<Bytes>,
    /// Whether connect should fail
    pub(crate) fail_connect: bool,
    pub(crate) connected: bool,
    pub(crate) closed: bool,
}

impl MockByteTransport {
    /// Create a new mock transport with the given responses
    pub(crate) fn new<I, B>(responses: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        Self {
            responses: responses
                .into_iter()
                .map(|r| Ok(Bytes::copy_from_slice(r.as_ref())))
                .collect(),
            ..Self::default()
        }
    }

    /// Queue a failure after the scripted responses
    pub(crate) fn then_fail(mut self, error: TransportError) -> Self {
        self.responses.push_back(Err(error));
        self
    }
}

impl ByteTransport for MockByteTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        if self.fail_connect {
            return Err(TransportError::Connection);
        }
        self.connected = true;
        Ok(())
    }

    fn do_transceive(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        if !self.connected {
            return Err(TransportError::Connection);
        }
        self.commands.push(Bytes::copy_from_slice(command));
        self.responses
            .pop_front()
            .unwrap_or(Err(TransportError::Transmission))
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn close(&mut self) {
        self.connected = false;
        self.closed = true;
    }
}

/// Mock MIFARE Classic tag backed by an in-memory block array
#[derive(Debug)]
pub(crate) struct MockBlockTransport {
    tag_type: MifareClassicType,
    blocks: Vec<Block>,
    rejected_sectors: HashSet<usize>,
    fail_read: Option<(usize, TransportError)>,
    /// Whether connect should fail
    pub(crate) fail_connect: bool,
    /// Block indices read, in order
    pub(crate) reads: Vec<usize>,
    /// Blocks written, in order
    pub(crate) writes: Vec<(usize, Block)>,
    /// Sectors an authentication was attempted for
    pub(crate) authenticated: Vec<usize>,
    pub(crate) closed: bool,
}

impl MockBlockTransport {
    /// Blank tag of the given type
    pub(crate) fn new(tag_type: MifareClassicType) -> Self {
        Self {
            tag_type,
            blocks: vec![Block::ZERO; tag_type.block_count()],
            rejected_sectors: HashSet::new(),
            fail_read: None,
            fail_connect: false,
            reads: Vec::new(),
            writes: Vec::new(),
            authenticated: Vec::new(),
            closed: false,
        }
    }

    pub(crate) fn set_block(&mut self, index: usize, block: Block) {
        self.blocks[index] = block;
    }

    pub(crate) fn block(&self, index: usize) -> Block {
        self.blocks[index]
    }

    /// Make authentication of `sector` fail
    pub(crate) fn reject_sector(&mut self, sector: usize) {
        self.rejected_sectors.insert(sector);
    }

    /// Make reading `index` fail with `error`
    pub(crate) fn fail_read_at(&mut self, index: usize, error: TransportError) {
        self.fail_read = Some((index, error));
    }
}

impl BlockTransport for MockBlockTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        if self.fail_connect {
            Err(TransportError::Connection)
        } else {
            Ok(())
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn tag_type(&self) -> MifareClassicType {
        self.tag_type
    }

    fn authenticate_sector_with_key_a(
        &mut self,
        sector: usize,
        _key: &MifareKey,
    ) -> Result<bool, TransportError> {
        self.authenticated.push(sector);
        Ok(!self.rejected_sectors.contains(&sector))
    }

    fn read_block(&mut self, block: usize) -> Result<Block, TransportError> {
        if let Some((index, error)) = &self.fail_read {
            if *index == block {
                return Err(error.clone());
            }
        }
        self.reads.push(block);
        self.blocks
            .get(block)
            .copied()
            .ok_or(TransportError::Transmission)
    }

    fn write_block(&mut self, block: usize, data: &Block) -> Result<(), TransportError> {
        let slot = self
            .blocks
            .get_mut(block)
            .ok_or(TransportError::Transmission)?;
        *slot = *data;
        self.writes.push((block, *data));
        Ok(())
    }
}
