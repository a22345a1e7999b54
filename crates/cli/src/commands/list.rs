use colored::Colorize;
use tagreader_pcsc::{CardKind, PcscDeviceManager};

/// List all available readers and what is on them
pub fn list_command(manager: &PcscDeviceManager) -> eyre::Result<()> {
    let readers = manager.list_readers()?;

    println!("Available readers:");
    for (i, reader) in readers.iter().enumerate() {
        let status = match reader.card_kind() {
            None => "no card".dimmed().to_string(),
            Some(CardKind::IsoDep) => "ISO-DEP card".green().to_string(),
            Some(CardKind::MifareClassic(tag_type)) => tag_type.to_string().green().to_string(),
            Some(CardKind::UnsupportedStorage(name)) => {
                format!("unsupported storage card {name:04X}").yellow().to_string()
            }
        };
        println!("{}. {} ({})", i + 1, reader.name(), status);
    }

    Ok(())
}
