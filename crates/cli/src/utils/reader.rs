use tagreader_pcsc::{PcscDeviceManager, PcscReader};

/// Find a reader with a specific name
pub fn find_reader_by_name(
    manager: &PcscDeviceManager,
    reader_name: &str,
) -> eyre::Result<PcscReader> {
    let readers = manager.list_readers()?;

    readers
        .into_iter()
        .find(|r| r.name() == reader_name)
        .ok_or_else(|| eyre::eyre!("Reader '{reader_name}' not found"))
}
