//! PC/SC reader backend for contactless tags
//!
//! This crate connects the sessions of `tagreader-core` to a PC/SC reader:
//!
//! - [`PcscTransport`] implements [`ByteTransport`](tagreader_core::ByteTransport)
//!   for ISO-DEP cards
//! - [`PcscMifareClassic`] implements
//!   [`BlockTransport`](tagreader_core::BlockTransport) on top of the PC/SC
//!   storage card pseudo-APDUs (load key, general authenticate, read and
//!   update binary)
//! - [`PcscDeviceManager::discover_tag`] classifies the card in a reader by its
//!   ATR and hands back a [`DiscoveredTag`](tagreader_core::DiscoveredTag)
//!
//! # Examples
//!
//! ```no_run
//! use tagreader_core::TagDispatcher;
//! use tagreader_pcsc::PcscDeviceManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = PcscDeviceManager::new()?;
//! let dispatcher = TagDispatcher::default();
//!
//! for reader in manager.list_readers()? {
//!     if !reader.has_card() {
//!         continue;
//!     }
//!     let tag = manager.discover_tag(reader.name())?;
//!     if let Some(report) = dispatcher.on_tag_discovered(Some(tag)) {
//!         for event in report.events() {
//!             println!("{event}");
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

pub mod atr;
mod config;
mod error;
pub mod event;
mod manager;
mod mifare;
mod monitor;
mod reader;
mod transport;

pub use atr::CardKind;
pub use config::{PcscConfig, ShareMode};
pub use error::PcscError;
pub use event::CardEvent;
pub use manager::{PcscDeviceManager, PcscTag};
pub use mifare::PcscMifareClassic;
pub use monitor::{MonitorHandle, PcscMonitor};
pub use reader::PcscReader;
pub use transport::PcscTransport;

// Re-export some pcsc types for convenience
pub use pcsc::{Protocol, Protocols};
