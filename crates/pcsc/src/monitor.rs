//! Monitor for card insertion and removal

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use pcsc::{Context, ReaderState, State};
use tracing::{debug, warn};

use crate::{
    error::PcscError,
    event::{CardEvent, CardEventSender},
    reader::PcscReader,
};

/// Polls the readers and reports cards coming and going
pub struct PcscMonitor {
    context: Context,
    poll_interval: Duration,
    /// ATR of the card last seen on each reader, `None` when empty
    previous_states: HashMap<String, Option<Vec<u8>>>,
}

impl fmt::Debug for PcscMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscMonitor")
            .field("poll_interval", &self.poll_interval)
            .field("previous_states", &self.previous_states)
            .finish_non_exhaustive()
    }
}

impl PcscMonitor {
    pub(crate) fn new(context: Context, poll_interval: Duration) -> Self {
        Self {
            context,
            poll_interval,
            previous_states: HashMap::new(),
        }
    }

    /// Snapshot every reader once and return what changed since the last call
    pub fn poll_card_events(&mut self) -> Result<Vec<CardEvent>, PcscError> {
        let readers = match self.context.list_readers_owned() {
            Ok(readers) => readers,
            Err(pcsc::Error::NoReadersAvailable) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut reader_states: Vec<_> = readers
            .into_iter()
            .map(|name| ReaderState::new(name, State::UNAWARE))
            .collect();
        if !reader_states.is_empty() {
            self.context
                .get_status_change(Some(Duration::ZERO), &mut reader_states)?;
        }

        let snapshot = reader_states
            .iter()
            .map(PcscReader::from_reader_state)
            .collect();
        Ok(diff_states(&mut self.previous_states, snapshot))
    }

    /// Poll on a background thread, sending events until stopped or until the
    /// receiver is dropped
    pub fn monitor_cards_channel(mut self, sender: CardEventSender) -> MonitorHandle {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let thread = thread::spawn(move || {
            while flag.load(Ordering::Relaxed) {
                match self.poll_card_events() {
                    Ok(events) => {
                        for event in events {
                            debug!(?event, "Card event");
                            if sender.send(event).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => warn!(error = %e, "Failed to poll readers"),
                }
                thread::sleep(self.poll_interval);
            }
        });

        MonitorHandle { running, thread }
    }
}

/// Handle to a monitor running on its own thread
#[derive(Debug)]
pub struct MonitorHandle {
    running: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl MonitorHandle {
    /// Stop the monitor and wait for its thread to finish
    pub fn stop(self) {
        self.running.store(false, Ordering::Relaxed);
        if self.thread.join().is_err() {
            warn!("Monitor thread panicked");
        }
    }
}

/// Compare a reader snapshot with the previous one. Readers that disappear
/// are forgotten without a removal event.
fn diff_states(
    previous: &mut HashMap<String, Option<Vec<u8>>>,
    snapshot: Vec<PcscReader>,
) -> Vec<CardEvent> {
    let mut events = Vec::new();
    let mut seen = HashMap::with_capacity(snapshot.len());

    for reader in snapshot {
        let name = reader.name().to_owned();
        let atr = reader.atr().map(<[u8]>::to_vec);

        match (previous.get(&name).cloned().flatten(), &atr) {
            (None, Some(atr)) => events.push(CardEvent::Inserted {
                reader: name.clone(),
                atr: atr.clone(),
            }),
            (Some(old), Some(atr)) if old != *atr => events.push(CardEvent::Inserted {
                reader: name.clone(),
                atr: atr.clone(),
            }),
            (Some(_), None) => events.push(CardEvent::Removed {
                reader: name.clone(),
            }),
            _ => {}
        }
        seen.insert(name, atr);
    }

    *previous = seen;
    events
}
