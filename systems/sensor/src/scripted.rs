use std::collections::{BTreeMap, VecDeque};

use crossbeam_channel::Sender;
use tracing::debug;

use crate::{PositionSource, SensorError, SensorEvent, WatchId, WatchOptions};

/// Position source replaying prepared notifications.
///
/// Notifications queued before anyone subscribes are held back and flushed to
/// the first watcher. Later ones are broadcast to every active watch.
#[derive(Debug, Default)]
pub struct ScriptedPositionSource {
    pending: VecDeque<SensorEvent>,
    sinks: BTreeMap<WatchId, Sender<SensorEvent>>,
    next_id: u64,
    unavailable: bool,
    last_options: Option<WatchOptions>,
}

impl ScriptedPositionSource {
    /// Creates a source that will deliver `script` once watched.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = SensorEvent>) -> Self {
        Self {
            pending: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Creates a source that refuses every subscription.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Delivers `event` to active watchers, or queues it until one subscribes.
    pub fn push(&mut self, event: SensorEvent) {
        if self.sinks.is_empty() {
            self.pending.push_back(event);
            return;
        }
        self.sinks
            .retain(|id, sink| match sink.send(event.clone()) {
                Ok(()) => true,
                Err(_) => {
                    debug!(watch = id.get(), "dropping disconnected watcher");
                    false
                }
            });
    }

    /// Whether any subscription is active.
    #[must_use]
    pub fn is_watched(&self) -> bool {
        !self.sinks.is_empty()
    }

    /// Options supplied by the most recent subscriber.
    #[must_use]
    pub fn last_options(&self) -> Option<WatchOptions> {
        self.last_options
    }

    /// Notifications still waiting for a subscriber.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl PositionSource for ScriptedPositionSource {
    fn watch(
        &mut self,
        options: WatchOptions,
        sink: Sender<SensorEvent>,
    ) -> Result<WatchId, SensorError> {
        if self.unavailable {
            return Err(SensorError::Unavailable);
        }

        self.next_id += 1;
        let id = WatchId::new(self.next_id);
        self.last_options = Some(options);
        let _ = self.sinks.insert(id, sink);
        for event in std::mem::take(&mut self.pending) {
            self.push(event);
        }
        Ok(id)
    }

    fn clear_watch(&mut self, id: WatchId) -> Result<(), SensorError> {
        self.sinks
            .remove(&id)
            .map(drop)
            .ok_or(SensorError::UnknownWatch(id))
    }
}
