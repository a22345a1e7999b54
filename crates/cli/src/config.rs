use std::path::Path;

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use tagreader_core::ReaderConfig;

/// Load the reader configuration: built-in defaults, overridden by `path`
pub fn load_config(path: Option<&Path>) -> eyre::Result<ReaderConfig> {
    let mut figment = Figment::from(Serialized::defaults(ReaderConfig::default()));
    if let Some(path) = path {
        if !path.exists() {
            eyre::bail!("config file not found: {}", path.display());
        }
        figment = figment.merge(Toml::file(path));
    }
    extract(figment)
}

fn extract(figment: Figment) -> eyre::Result<ReaderConfig> {
    let config: ReaderConfig = figment.extract()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagreader_core::MifareKey;

    fn from_toml(toml: &str) -> eyre::Result<ReaderConfig> {
        let figment = Figment::from(Serialized::defaults(ReaderConfig::default()));
        extract(figment.merge(Toml::string(toml)))
    }

    #[test]
    fn test_defaults_without_file() {
        assert_eq!(load_config(None).unwrap(), ReaderConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = from_toml(
            r#"
            aid = "A0000000031010"
            mifare_key = "A0A1A2A3A4A5"
            marker_sector = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.aid, "A0000000031010");
        assert_eq!(
            config.mifare_key,
            MifareKey::new([0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5])
        );
        assert_eq!(config.marker_sector, 2);
        assert_eq!(config.expected_account, "1234567890");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(from_toml(r#"aid = "F12""#).is_err());
        assert!(from_toml(r#"mifare_key = "FFFF""#).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(load_config(Some(Path::new("/nonexistent/tagreader.toml"))).is_err());
    }
}
