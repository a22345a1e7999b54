//! Command encoding and session logic for contactless tags
//!
//! This crate drives the two tag families a reader-mode application talks to:
//!
//! - ISO-DEP smartcards, addressed with ISO/IEC 7816-4 APDUs (SELECT by AID,
//!   status word validation, a follow-up commit command)
//! - MIFARE Classic tags, addressed sector by sector with key A
//!   authentication and 16-byte block reads and writes
//!
//! Both sessions consume an injected transport ([`ByteTransport`] or
//! [`BlockTransport`]) and never fail outright: every outcome, including
//! transport failures, is folded into a [`SessionReport`] holding the log
//! lines and the optional [`ImageUrlSignal`] the surrounding application acts on.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

// Main modules
pub mod codec;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod iso_dep;
pub mod mifare;
pub mod report;
pub mod response;
pub mod transport;

mod error;
pub use error::{Error, Result};

pub use command::Command;
pub use config::ReaderConfig;
pub use dispatcher::{DiscoveredTag, TagDispatcher, Technology};
pub use iso_dep::IsoDepSession;
pub use mifare::{Block, BlockContent, MifareClassicType, MifareKey, MifareSession};
pub use report::{ImageUrlSignal, LogEvent, LogLevel, SessionOutcome, SessionReport};
pub use response::Response;
pub use response::status::StatusWord;
pub use transport::{BlockTransport, ByteTransport, TransportError};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        Block, BlockTransport, ByteTransport, Bytes, Command, Error, ReaderConfig, Response,
        Result, SessionReport, StatusWord, TransportError, codec,
        response::status::common as status,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        let cmd = Command::new(0x00, 0xA4, 0x04, 0x00);
        assert_eq!(cmd.class(), 0x00);
        assert_eq!(cmd.instruction(), 0xA4);

        let resp = Response::from_bytes(&[0x01, 0x02, 0x90, 0x00]).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.payload().as_ref(), &[0x01u8, 0x02]);
        assert_eq!(resp.status(), StatusWord::new(0x90, 0x00));
    }
}
