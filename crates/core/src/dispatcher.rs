//! Tag dispatch
//!
//! A discovered tag carries its identifier and the one capability it was
//! resolved to when it was discovered. The dispatcher logs the identifier and
//! hands the capability to the matching session.

use bytes::Bytes;
use tracing::debug;

use crate::{
    IsoDepSession, MifareSession, ReaderConfig, codec,
    report::{SessionOutcome, SessionReport},
    transport::{BlockTransport, ByteTransport},
};

/// Capability a tag exposes
#[derive(Debug)]
pub enum Technology<I, M> {
    /// ISO 14443-4 / ISO-DEP, APDU exchange
    IsoDep(I),
    /// MIFARE Classic sector and block storage
    MifareClassic(M),
    /// Neither supported family
    Unsupported,
}

impl<I, M> Technology<I, M> {
    /// Short name used in logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::IsoDep(_) => "isoDep",
            Self::MifareClassic(_) => "mifareClassic",
            Self::Unsupported => "unsupported",
        }
    }
}

/// A tag handed over by the platform on discovery
#[derive(Debug)]
pub struct DiscoveredTag<I, M> {
    id: Bytes,
    technology: Technology<I, M>,
}

impl<I, M> DiscoveredTag<I, M> {
    /// Create a new discovered tag
    pub fn new(id: impl Into<Bytes>, technology: Technology<I, M>) -> Self {
        Self {
            id: id.into(),
            technology,
        }
    }

    /// Tag identifier (UID)
    pub const fn id(&self) -> &Bytes {
        &self.id
    }

    /// Resolved capability
    pub const fn technology(&self) -> &Technology<I, M> {
        &self.technology
    }

    /// Split into identifier and capability
    pub fn into_parts(self) -> (Bytes, Technology<I, M>) {
        (self.id, self.technology)
    }
}

/// Routes each discovered tag to at most one session
#[derive(Debug, Clone, Default)]
pub struct TagDispatcher {
    iso_dep: IsoDepSession,
    mifare: MifareSession,
}

impl TagDispatcher {
    /// Create a dispatcher sharing one configuration between both sessions
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            iso_dep: IsoDepSession::new(config.clone()),
            mifare: MifareSession::new(config),
        }
    }

    /// Handle one discovery event. An absent tag is a no-op and yields `None`.
    pub fn on_tag_discovered<I, M>(
        &self,
        tag: Option<DiscoveredTag<I, M>>,
    ) -> Option<SessionReport>
    where
        I: ByteTransport,
        M: BlockTransport,
    {
        let (id, technology) = tag?.into_parts();
        let mut report = SessionReport::new();
        report.info(format!(
            "New tag discovered tag id: {}",
            codec::bytes_to_hex(&id)
        ));

        match technology {
            Technology::IsoDep(transport) => {
                report.info("tag is isoDep");
                self.iso_dep.run_into(transport, &mut report);
            }
            Technology::MifareClassic(transport) => {
                report.info("tag is mifareClassic");
                self.mifare.run_into(transport, &mut report);
            }
            Technology::Unsupported => {
                debug!("Ignoring tag of an unsupported family");
                report.set_outcome(SessionOutcome::Unsupported);
            }
        }

        Some(report)
    }
}
