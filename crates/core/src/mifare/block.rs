//! Block contents and keys
//!
//! A block is exactly 16 bytes. The URL marker format is ASCII text starting
//! with a prefix (`aoss:` by default) followed by a path fragment, right-padded
//! with zero bytes.

use std::{fmt, str::FromStr};

use derive_more::Deref;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, codec, transport::TransportError};

/// Size of a MIFARE Classic block in bytes
pub const BLOCK_SIZE: usize = 16;

/// One 16-byte MIFARE Classic block
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Deref)]
pub struct Block([u8; BLOCK_SIZE]);

impl Block {
    /// All-zero block
    pub const ZERO: Self = Self([0u8; BLOCK_SIZE]);

    /// Wrap raw block bytes
    pub const fn new(bytes: [u8; BLOCK_SIZE]) -> Self {
        Self(bytes)
    }

    /// Whether every byte is zero
    pub fn is_zeroed(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Uppercase hex of the block
    pub fn to_hex(&self) -> String {
        codec::bytes_to_hex(self.0)
    }

    /// Block decoded as text, trailing zero padding removed.
    /// Invalid UTF-8 sequences are replaced.
    pub fn text(&self) -> String {
        let end = self
            .0
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |last| last + 1);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }

    /// The raw bytes
    pub const fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.0
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Block").field(&self.to_hex()).finish()
    }
}

impl From<[u8; BLOCK_SIZE]> for Block {
    fn from(bytes: [u8; BLOCK_SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Block {
    type Error = TransportError;

    fn try_from(data: &[u8]) -> Result<Self, TransportError> {
        <[u8; BLOCK_SIZE]>::try_from(data)
            .map(Self)
            .map_err(|_| TransportError::BlockLength(data.len()))
    }
}

/// Recognised block encodings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockContent {
    /// All sixteen bytes are zero
    Empty,
    /// Text starting with the marker prefix; holds the path after the prefix
    UrlMarker(String),
    /// Anything else
    Opaque,
}

impl BlockContent {
    /// Classify a block against a marker prefix
    pub fn classify(block: &Block, prefix: &str) -> Self {
        if block.is_zeroed() {
            return Self::Empty;
        }
        match block.text().strip_prefix(prefix) {
            Some(path) => Self::UrlMarker(path.to_owned()),
            None => Self::Opaque,
        }
    }
}

/// Encode `prefix || path` into a zero-padded block
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if the marker does not fit 16 bytes.
pub fn encode_marker(prefix: &str, path: &str) -> Result<Block> {
    let len = prefix.len() + path.len();
    if len > BLOCK_SIZE {
        return Err(Error::invalid_argument(format!(
            "marker {prefix}{path} is {len} bytes, a block holds {BLOCK_SIZE}"
        )));
    }

    let mut bytes = [0u8; BLOCK_SIZE];
    bytes[..prefix.len()].copy_from_slice(prefix.as_bytes());
    bytes[prefix.len()..len].copy_from_slice(path.as_bytes());
    Ok(Block(bytes))
}

/// A 6-byte sector key
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MifareKey([u8; 6]);

impl MifareKey {
    /// Factory default key, `FF FF FF FF FF FF`
    pub const DEFAULT: Self = Self([0xFF; 6]);

    /// Wrap raw key bytes
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// The raw bytes
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl Default for MifareKey {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// Keys stay out of logs.
impl fmt::Debug for MifareKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MifareKey(..)")
    }
}

impl FromStr for MifareKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = codec::hex_to_bytes(s)?;
        <[u8; 6]>::try_from(bytes.as_ref())
            .map(Self)
            .map_err(|_| Error::invalid_argument(format!("key must be 6 bytes, got {}", bytes.len())))
    }
}

impl TryFrom<String> for MifareKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<MifareKey> for String {
    fn from(key: MifareKey) -> Self {
        codec::bytes_to_hex(key.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_marker_pads_with_zeros() {
        let block = encode_marker("aoss:", "/a.jpg").unwrap();
        assert_eq!(&block[..11], b"aoss:/a.jpg");
        assert!(block[11..].iter().all(|&b| b == 0));
        assert_eq!(block.text(), "aoss:/a.jpg");
    }

    #[test]
    fn test_encode_marker_exact_fit() {
        let block = encode_marker("aoss:", "/spacex.jpg").unwrap();
        assert_eq!(block.as_bytes(), b"aoss:/spacex.jpg");
    }

    #[test]
    fn test_encode_marker_too_long() {
        assert!(matches!(
            encode_marker("aoss:", "/much-too-long.jpg"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_classify() {
        assert_eq!(BlockContent::classify(&Block::ZERO, "aoss:"), BlockContent::Empty);

        let marker = encode_marker("aoss:", "/x.png").unwrap();
        assert_eq!(
            BlockContent::classify(&marker, "aoss:"),
            BlockContent::UrlMarker("/x.png".into())
        );

        let mut bytes = [0u8; BLOCK_SIZE];
        bytes[0] = 0x37;
        bytes[1] = 0x70;
        assert_eq!(
            BlockContent::classify(&Block::new(bytes), "aoss:"),
            BlockContent::Opaque
        );
    }

    #[test]
    fn test_block_from_slice() {
        assert!(Block::try_from(&[0u8; 16][..]).is_ok());
        assert_eq!(
            Block::try_from(&[0u8; 4][..]),
            Err(TransportError::BlockLength(4))
        );
    }

    #[test]
    fn test_key_parse_and_hide() {
        let key: MifareKey = "A0A1A2A3A4A5".parse().unwrap();
        assert_eq!(key.as_bytes(), &[0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5]);
        assert_eq!(format!("{key:?}"), "MifareKey(..)");
        assert_eq!(String::from(MifareKey::DEFAULT), "FFFFFFFFFFFF");
        assert!("FFFF".parse::<MifareKey>().is_err());
    }
}
