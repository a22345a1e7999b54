//! Reader configuration
//!
//! The loyalty-card AID, the expected account, the MIFARE key and the image
//! marker layout are all named here. [`ReaderConfig::default`] carries the
//! demo values; every field can be overridden, including from TOML.

use serde::{Deserialize, Serialize};

use crate::{Error, MifareKey, Result, codec, mifare};

/// ISO-DEP command header for selecting an AID: CLA INS P1 P2
pub const SELECT_APDU_HEADER: &str = "00A40400";

/// AID of the loyalty card service
pub const LOYALTY_CARD_AID: &str = "F123422222";

/// Account number the loyalty card must report
pub const EXPECTED_ACCOUNT: &str = "1234567890";

/// Follow-up command sent once the account matched
pub const COMMIT_COMMAND: &str = "0011AB";

/// Prefix of the URL marker stored in a block
pub const MARKER_PREFIX: &str = "aoss:";

/// Base URL the marker path is appended to
pub const IMAGE_BASE_URL: &str = "https://monster-image-backup.oss-cn-shanghai.aliyuncs.com/share";

/// Path written into an empty marker block
pub const PROVISIONING_PATH: &str = "/spacex.jpg";

/// Configuration shared by both sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// SELECT header as hex
    pub select_header: String,
    /// AID to select, as hex
    pub aid: String,
    /// Account number expected in the SELECT response payload
    pub expected_account: String,
    /// Follow-up command as hex
    pub commit_command: String,
    /// Key A used for every sector
    pub mifare_key: MifareKey,
    /// Marker prefix
    pub marker_prefix: String,
    /// Base URL for decoded markers
    pub image_base_url: String,
    /// Path written into an empty marker block
    pub provisioning_path: String,
    /// Sector of the marker block
    pub marker_sector: usize,
    /// Block of the marker, relative to its sector
    pub marker_block: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            select_header: SELECT_APDU_HEADER.to_owned(),
            aid: LOYALTY_CARD_AID.to_owned(),
            expected_account: EXPECTED_ACCOUNT.to_owned(),
            commit_command: COMMIT_COMMAND.to_owned(),
            mifare_key: MifareKey::DEFAULT,
            marker_prefix: MARKER_PREFIX.to_owned(),
            image_base_url: IMAGE_BASE_URL.to_owned(),
            provisioning_path: PROVISIONING_PATH.to_owned(),
            marker_sector: 1,
            marker_block: 0,
        }
    }
}

impl ReaderConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the AID to select
    pub fn with_aid(mut self, aid: impl Into<String>) -> Self {
        self.aid = aid.into();
        self
    }

    /// Set the expected account number
    pub fn with_expected_account(mut self, account: impl Into<String>) -> Self {
        self.expected_account = account.into();
        self
    }

    /// Set the follow-up command
    pub fn with_commit_command(mut self, command: impl Into<String>) -> Self {
        self.commit_command = command.into();
        self
    }

    /// Set the sector key
    pub const fn with_mifare_key(mut self, key: MifareKey) -> Self {
        self.mifare_key = key;
        self
    }

    /// Set the image base URL
    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into();
        self
    }

    /// Set the path written into an empty marker block
    pub fn with_provisioning_path(mut self, path: impl Into<String>) -> Self {
        self.provisioning_path = path.into();
        self
    }

    /// Set the marker slot
    pub const fn with_marker_slot(mut self, sector: usize, block: usize) -> Self {
        self.marker_sector = sector;
        self.marker_block = block;
        self
    }

    /// Whether `(sector, block)` is the marker slot
    pub const fn is_marker_slot(&self, sector: usize, block: usize) -> bool {
        self.marker_sector == sector && self.marker_block == block
    }

    /// Full image URL for a marker path
    pub fn image_url(&self, path: &str) -> String {
        format!("{}{}", self.image_base_url, path)
    }

    /// Block written into an empty marker slot
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if prefix and path exceed 16 bytes.
    pub fn provisioning_block(&self) -> Result<mifare::Block> {
        mifare::encode_marker(&self.marker_prefix, &self.provisioning_path)
    }

    /// Check that every hex field decodes and the marker fits a block
    ///
    /// # Errors
    /// Returns the first [`Error::InvalidArgument`] found.
    pub fn validate(&self) -> Result<()> {
        codec::build_select_apdu(&self.select_header, &self.aid)?;
        codec::hex_to_bytes(&self.commit_command)?;
        self.provisioning_block()?;
        if !self.provisioning_path.starts_with('/') {
            return Err(Error::invalid_argument(format!(
                "provisioning path must start with '/': {}",
                self.provisioning_path
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ReaderConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.is_marker_slot(1, 0));
        assert!(!config.is_marker_slot(0, 1));
        assert_eq!(
            config.image_url("/spacex.jpg"),
            "https://monster-image-backup.oss-cn-shanghai.aliyuncs.com/share/spacex.jpg"
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ReaderConfig::new().with_aid("F12").validate().is_err());
        assert!(ReaderConfig::new().with_commit_command("XY").validate().is_err());
        assert!(
            ReaderConfig::new()
                .with_provisioning_path("/a-very-long-name.jpg")
                .validate()
                .is_err()
        );
        assert!(ReaderConfig::new().with_provisioning_path("x.jpg").validate().is_err());
    }
}
