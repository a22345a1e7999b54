//! MIFARE Classic session
//!
//! The session walks every sector: authenticate with key A, read each block,
//! and apply the marker policy to the designated slot (sector 1, block 0 by
//! default):
//!
//! - an all-zero slot is provisioned with the demo marker
//! - a slot holding `aoss:<path>` yields the image URL `<base><path>`
//! - anything else is only logged
//!
//! A sector that rejects the key is logged and skipped. A transport failure
//! ends the scan, but a URL captured before the failure is still emitted.

mod block;
mod geometry;

pub use block::{BLOCK_SIZE, Block, BlockContent, MifareKey, encode_marker};
pub use geometry::MifareClassicType;

use tracing::{debug, instrument};

use crate::{
    Error, ReaderConfig,
    report::{SessionOutcome, SessionReport},
    transport::BlockTransport,
};

/// Drives one MIFARE Classic exchange
#[derive(Debug, Clone, Default)]
pub struct MifareSession {
    config: ReaderConfig,
}

impl MifareSession {
    /// Create a session with the given configuration
    pub const fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// The configuration in use
    pub const fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Run the session to completion and return its report
    pub fn run(&self, transport: impl BlockTransport) -> SessionReport {
        let mut report = SessionReport::new();
        self.run_into(transport, &mut report);
        report
    }

    /// Run the session, appending to an existing report
    #[instrument(level = "debug", skip_all)]
    pub fn run_into(&self, mut transport: impl BlockTransport, report: &mut SessionReport) {
        if let Err(e) = transport.connect() {
            report.error(format!("Error communicating with card: {e}"));
            report.set_outcome(SessionOutcome::Failed);
            transport.close();
            return;
        }

        let mut image_url = None;
        match self.scan(&mut transport, report, &mut image_url) {
            Ok(()) => report.set_outcome(SessionOutcome::Completed),
            Err(e) => {
                report.error(format!("Error communicating with card: {e}"));
                report.set_outcome(SessionOutcome::Failed);
            }
        }
        transport.close();

        if let Some(url) = image_url {
            report.emit_image_url(url);
        }
    }

    fn scan(
        &self,
        transport: &mut impl BlockTransport,
        report: &mut SessionReport,
        image_url: &mut Option<String>,
    ) -> Result<(), Error> {
        let sector_count = transport.sector_count();
        report.info(format!("Tag type: {}", transport.tag_type()));
        report.info(format!("Sector count: {sector_count}"));
        report.info(format!("Block count: {}", transport.block_count()));
        report.info(format!("Tag size: {}", transport.size()));

        for sector in 0..sector_count {
            if !transport.authenticate_sector_with_key_a(sector, &self.config.mifare_key)? {
                report.error(Error::AuthenticationFailure { sector }.to_string());
                continue;
            }

            let first_block = transport.sector_to_block(sector);
            let blocks = transport.block_count_in_sector(sector);
            debug!(sector, first_block, blocks, "Sector authenticated");

            for offset in 0..blocks {
                let index = first_block + offset;
                let block = transport.read_block(index)?;
                report.info(format!(
                    "Sector {sector:02} Block {offset}: {} length: {}",
                    block.to_hex(),
                    block.len()
                ));

                if self.config.is_marker_slot(sector, offset) {
                    self.apply_marker_policy(transport, report, index, &block, image_url)?;
                }
            }
        }

        Ok(())
    }

    fn apply_marker_policy(
        &self,
        transport: &mut impl BlockTransport,
        report: &mut SessionReport,
        index: usize,
        block: &Block,
        image_url: &mut Option<String>,
    ) -> Result<(), Error> {
        match BlockContent::classify(block, &self.config.marker_prefix) {
            BlockContent::Empty => match self.config.provisioning_block() {
                Ok(marker) => {
                    transport.write_block(index, &marker)?;
                    report.info(format!("write success: {} to block {index}", marker.text()));
                }
                Err(e) => report.error(format!("Cannot provision marker block: {e}")),
            },
            BlockContent::UrlMarker(path) => {
                report.info(format!(
                    "hex data: {}, toString is {}",
                    block.to_hex(),
                    block.text()
                ));
                let url = self.config.image_url(&path);
                report.info(format!("url: {url}"));
                *image_url = Some(url);
            }
            BlockContent::Opaque => {
                report.info(format!(
                    "hex data: {}, toString is {}",
                    block.to_hex(),
                    block.text()
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        LogLevel,
        transport::{TransportError, mock::MockBlockTransport},
    };

    const URL: &str = "https://monster-image-backup.oss-cn-shanghai.aliyuncs.com/share/spacex.jpg";

    fn marker_tag() -> MockBlockTransport {
        let mut tag = MockBlockTransport::new(MifareClassicType::Classic1K);
        tag.set_block(4, encode_marker("aoss:", "/spacex.jpg").unwrap());
        tag
    }

    #[test]
    fn test_empty_slot_is_provisioned_once() {
        let mut tag = MockBlockTransport::new(MifareClassicType::Classic1K);
        let report = MifareSession::default().run(&mut tag);

        assert_eq!(tag.writes.len(), 1);
        assert_eq!(tag.writes[0].0, 4);
        assert_eq!(tag.writes[0].1.as_bytes(), b"aoss:/spacex.jpg");
        assert_eq!(tag.block(4).text(), "aoss:/spacex.jpg");
        assert!(report.image_url().is_none());
        assert_eq!(report.outcome(), SessionOutcome::Completed);
        assert!(tag.closed);
    }

    #[test]
    fn test_marker_emits_image_url() {
        let mut tag = marker_tag();
        let report = MifareSession::default().run(&mut tag);

        assert_eq!(report.image_url().map(|s| s.url.as_str()), Some(URL));
        assert!(tag.writes.is_empty());
        assert!(report.messages().any(|m| m == format!("url: {URL}")));
    }

    #[test]
    fn test_marker_with_padding_is_trimmed() {
        let mut tag = MockBlockTransport::new(MifareClassicType::Classic1K);
        tag.set_block(4, encode_marker("aoss:", "/cat.png").unwrap());
        let report = MifareSession::default().run(&mut tag);

        assert_eq!(
            report.image_url().map(|s| s.url.as_str()),
            Some("https://monster-image-backup.oss-cn-shanghai.aliyuncs.com/share/cat.png")
        );
    }

    #[test]
    fn test_opaque_slot_is_only_logged() {
        let mut tag = MockBlockTransport::new(MifareClassicType::Classic1K);
        tag.set_block(4, Block::new(*b"hello, mifare!!!"));
        let report = MifareSession::default().run(&mut tag);

        assert!(tag.writes.is_empty());
        assert!(report.image_url().is_none());
        assert!(
            report
                .messages()
                .any(|m| m.ends_with("toString is hello, mifare!!!"))
        );
    }

    #[test]
    fn test_markers_outside_the_slot_are_ignored() {
        let mut tag = MockBlockTransport::new(MifareClassicType::Classic1K);
        tag.set_block(4, Block::new(*b"not empty at all"));
        tag.set_block(5, encode_marker("aoss:", "/spacex.jpg").unwrap());
        tag.set_block(8, encode_marker("aoss:", "/spacex.jpg").unwrap());
        let report = MifareSession::default().run(&mut tag);

        assert!(report.image_url().is_none());
        assert!(tag.writes.is_empty());
    }

    #[test]
    fn test_failed_sector_is_skipped() {
        let mut tag = MockBlockTransport::new(MifareClassicType::Classic1K);
        tag.reject_sector(3);
        let report = MifareSession::default().run(&mut tag);

        assert_eq!(tag.authenticated.len(), 16);
        // 15 sectors of 4 blocks each were read
        assert_eq!(tag.reads.len(), 60);
        assert!(!tag.reads.iter().any(|b| (12..16).contains(b)));
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Sector 03: authentication failed");
        assert_eq!(errors[0].level, LogLevel::Error);
        assert_eq!(report.outcome(), SessionOutcome::Completed);
    }

    #[test]
    fn test_metadata_and_block_lines() {
        let mut tag = MockBlockTransport::new(MifareClassicType::Classic1K);
        let report = MifareSession::default().run(&mut tag);
        let messages: Vec<_> = report.messages().collect();

        assert_eq!(messages[0], "Tag type: MIFARE Classic 1K");
        assert_eq!(messages[1], "Sector count: 16");
        assert_eq!(messages[2], "Block count: 64");
        assert_eq!(messages[3], "Tag size: 1024");
        assert_eq!(
            messages[4],
            "Sector 00 Block 0: 00000000000000000000000000000000 length: 16"
        );
    }

    #[test]
    fn test_transport_failure_keeps_captured_url() {
        let mut tag = marker_tag();
        tag.fail_read_at(20, TransportError::TagLost);
        let report = MifareSession::default().run(&mut tag);

        assert_eq!(report.outcome(), SessionOutcome::Failed);
        assert_eq!(report.image_url().map(|s| s.url.as_str()), Some(URL));
        assert!(
            report
                .errors()
                .any(|e| e.message == "Error communicating with card: Tag was lost")
        );
        assert!(tag.closed);
    }

    #[test]
    fn test_connect_failure_ends_session() {
        let mut tag = marker_tag();
        tag.fail_connect = true;
        let report = MifareSession::default().run(&mut tag);

        assert_eq!(report.outcome(), SessionOutcome::Failed);
        assert!(tag.reads.is_empty());
        assert!(report.image_url().is_none());
        assert!(tag.closed);
    }

    #[test]
    fn test_custom_marker_slot() {
        let config = ReaderConfig::new().with_marker_slot(2, 1);
        let mut tag = MockBlockTransport::new(MifareClassicType::Classic1K);
        let report = MifareSession::new(config).run(&mut tag);

        assert_eq!(tag.writes.len(), 1);
        assert_eq!(tag.writes[0].0, 9);
        assert_eq!(report.outcome(), SessionOutcome::Completed);
    }

    #[test]
    fn test_unfit_provisioning_path_is_reported() {
        let config = ReaderConfig::new().with_provisioning_path("/a-very-long-name.jpg");
        let mut tag = MockBlockTransport::new(MifareClassicType::Classic1K);
        let report = MifareSession::new(config).run(&mut tag);

        assert!(tag.writes.is_empty());
        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.outcome(), SessionOutcome::Completed);
    }
}
