use tagreader_core::TagDispatcher;
use tagreader_pcsc::{CardEvent, PcscDeviceManager, event::card_event_channel};
use tracing::{debug, info, warn};

use crate::utils::report::print_summary;

/// Watch the readers and dispatch every tag placed on them
pub fn scan_command(
    manager: &PcscDeviceManager,
    dispatcher: &TagDispatcher,
    only_reader: Option<&str>,
    once: bool,
) -> eyre::Result<()> {
    let (sender, receiver) = card_event_channel();
    let monitor = manager.monitor().monitor_cards_channel(sender);
    info!("Waiting for tags...");

    for event in &receiver {
        let name = match event {
            CardEvent::Inserted { reader, .. } => reader,
            CardEvent::Removed { reader } => {
                debug!(%reader, "Tag removed");
                continue;
            }
        };
        if only_reader.is_some_and(|wanted| wanted != name) {
            continue;
        }

        let tag = match manager.discover_tag(&name) {
            Ok(tag) => tag,
            Err(e) => {
                warn!(reader = %name, error = %e, "Failed to read tag");
                continue;
            }
        };

        if let Some(report) = dispatcher.on_tag_discovered(Some(tag)) {
            print_summary(&report);
        }
        if once {
            break;
        }
    }

    monitor.stop();
    Ok(())
}
