//! Card classification from the Answer To Reset
//!
//! Contactless readers following PC/SC part 3 synthesise an ATR for storage
//! cards that carries the card standard and a two-byte card name:
//!
//! ```text
//! 3B 8F 80 01 80 4F 0C A0 00 00 03 06 SS NN NN 00 00 00 00 TCK
//! ```
//!
//! Everything else reaching a contactless reader is an ISO 14443-4 card.

use tagreader_core::MifareClassicType;

/// Initial bytes of a PC/SC part 3 storage card ATR, up to the RID and length
const STORAGE_CARD_PREFIX: [u8; 12] = [
    0x3B, 0x8F, 0x80, 0x01, 0x80, 0x4F, 0x0C, 0xA0, 0x00, 0x00, 0x03, 0x06,
];

/// Card names from the PC/SC part 3 supplement
mod card_name {
    pub(super) const MIFARE_CLASSIC_1K: u16 = 0x0001;
    pub(super) const MIFARE_CLASSIC_4K: u16 = 0x0002;
    pub(super) const MIFARE_MINI: u16 = 0x0026;
}

/// What the reader reports about the card in the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    /// ISO 14443-4 card, addressed with APDUs
    IsoDep,
    /// MIFARE Classic storage card
    MifareClassic(MifareClassicType),
    /// Another storage card (Ultralight, FeliCa, ...), with its card name
    UnsupportedStorage(u16),
}

impl CardKind {
    /// Classify a card by its ATR
    pub fn from_atr(atr: &[u8]) -> Self {
        let Some(rest) = atr.strip_prefix(&STORAGE_CARD_PREFIX[..]) else {
            return Self::IsoDep;
        };
        let &[_standard, hi, lo, ..] = rest else {
            return Self::IsoDep;
        };

        match u16::from_be_bytes([hi, lo]) {
            card_name::MIFARE_CLASSIC_1K => Self::MifareClassic(MifareClassicType::Classic1K),
            card_name::MIFARE_CLASSIC_4K => Self::MifareClassic(MifareClassicType::Classic4K),
            card_name::MIFARE_MINI => Self::MifareClassic(MifareClassicType::Mini),
            other => Self::UnsupportedStorage(other),
        }
    }
}
