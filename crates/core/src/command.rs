//! APDU command definitions
//!
//! This module provides the command type used for ISO/IEC 7816-4 requests,
//! including the PC/SC pseudo-APDUs that reach storage tags through a reader.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{Error, Result};

/// Generic APDU command structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
    /// Expected length (optional)
    pub le: Option<u8>,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Create a new command with data
    pub fn new_with_data(cla: u8, ins: u8, p1: u8, p2: u8, data: impl Into<Bytes>) -> Self {
        Self::new(cla, ins, p1, p2).with_data(data)
    }

    /// Create a new command with expected response length (Le)
    pub const fn new_with_le(cla: u8, ins: u8, p1: u8, p2: u8, le: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: Some(le),
        }
    }

    /// Set the command data
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the expected response length
    pub const fn with_le(mut self, le: u8) -> Self {
        self.le = Some(le);
        self
    }

    /// Command class (CLA)
    pub const fn class(&self) -> u8 {
        self.cla
    }

    /// Instruction code (INS)
    pub const fn instruction(&self) -> u8 {
        self.ins
    }

    /// First parameter (P1)
    pub const fn p1(&self) -> u8 {
        self.p1
    }

    /// Second parameter (P2)
    pub const fn p2(&self) -> u8 {
        self.p2
    }

    /// Command payload data (optional)
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Calculate length of serialized command
    pub fn command_length(&self) -> usize {
        // Header (CLA, INS, P1, P2) is always 4 bytes
        4 + self.data.as_ref().map_or(0, |data| 1 + data.len()) + usize::from(self.le.is_some())
    }

    /// Convert to raw APDU bytes
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the data does not fit a short Lc.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buffer = BytesMut::with_capacity(self.command_length());

        // Header: CLA, INS, P1, P2
        buffer.put_u8(self.cla);
        buffer.put_u8(self.ins);
        buffer.put_u8(self.p1);
        buffer.put_u8(self.p2);

        if let Some(data) = &self.data {
            let lc = u8::try_from(data.len()).map_err(|_| {
                Error::invalid_argument(format!("command data too long: {} bytes", data.len()))
            })?;
            buffer.put_u8(lc);
            buffer.put_slice(data);
        }

        if let Some(le) = self.le {
            buffer.put_u8(le);
        }

        Ok(buffer.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_command_with_data() {
        let cmd = Command::new_with_data(0x00, 0xA4, 0x04, 0x00, hex!("F123422222").to_vec());

        assert_eq!(cmd.class(), 0x00);
        assert_eq!(cmd.instruction(), 0xA4);
        assert_eq!(cmd.p1(), 0x04);
        assert_eq!(cmd.p2(), 0x00);
        assert_eq!(cmd.data(), Some(&hex!("F123422222")[..]));
        assert_eq!(cmd.command_length(), 10);
        assert_eq!(cmd.to_bytes().unwrap().as_ref(), hex!("00A4040005F123422222"));
    }

    #[test]
    fn test_command_with_le() {
        let cmd = Command::new_with_le(0xFF, 0xB0, 0x00, 0x04, 0x10);
        assert_eq!(cmd.to_bytes().unwrap().as_ref(), hex!("FFB0000410"));

        let cmd = Command::new(0xFF, 0xCA, 0x00, 0x00).with_le(0x00);
        assert_eq!(cmd.to_bytes().unwrap().as_ref(), hex!("FFCA000000"));
    }

    #[test]
    fn test_oversized_data_is_rejected() {
        let cmd = Command::new_with_data(0x00, 0xD6, 0x00, 0x00, vec![0u8; 300]);
        assert!(cmd.to_bytes().is_err());
    }
}
