//! Reader representation for PC/SC devices

use pcsc::{ReaderState, State};

use crate::atr::CardKind;

/// A PC/SC card reader and the card it holds, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcscReader {
    name: String,
    atr: Option<Vec<u8>>,
}

impl PcscReader {
    /// Create a new reader
    pub const fn new(name: String, atr: Option<Vec<u8>>) -> Self {
        Self { name, atr }
    }

    /// Get the reader name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if a card is present in the reader
    pub const fn has_card(&self) -> bool {
        self.atr.is_some()
    }

    /// Get the ATR of the card if present
    pub fn atr(&self) -> Option<&[u8]> {
        self.atr.as_deref()
    }

    /// Classification of the present card
    pub fn card_kind(&self) -> Option<CardKind> {
        self.atr().map(CardKind::from_atr)
    }

    /// Create a reader from a reader state
    pub(crate) fn from_reader_state(reader_state: &ReaderState) -> Self {
        let has_card = reader_state.event_state().contains(State::PRESENT)
            && !reader_state.event_state().contains(State::EMPTY);

        Self {
            name: reader_state.name().to_string_lossy().into_owned(),
            atr: has_card.then(|| reader_state.atr().to_vec()),
        }
    }
}
