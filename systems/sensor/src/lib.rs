#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Position feed plumbing between an external position source and the world.
//!
//! A [`PositionSource`] pushes [`SensorEvent`] values into a channel owned by
//! the [`Sensor`] system. The session drains that channel one event at a time
//! and feeds the resulting commands to the world, so a fix can never be
//! processed while another command is still in flight.

mod scripted;

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use geocache_core::{Command, LatLng, SensorConfig, SensorFailureReason};
use thiserror::Error;
use tracing::{debug, warn};

pub use scripted::ScriptedPositionSource;

/// Options forwarded to the position source when subscribing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchOptions {
    /// Request the most accurate fixes the source can produce.
    pub high_accuracy: bool,
    /// Maximum age of a cached fix the source may report.
    pub maximum_age: Duration,
    /// How long the source may wait for a fix before reporting a timeout.
    pub timeout: Duration,
}

impl From<&SensorConfig> for WatchOptions {
    fn from(config: &SensorConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            maximum_age: config.maximum_age(),
            timeout: config.timeout(),
        }
    }
}

/// Single notification delivered by a position source.
#[derive(Clone, Debug, PartialEq)]
pub enum SensorEvent {
    /// A new position fix.
    Fix(LatLng),
    /// The source could not produce a fix.
    Failure(SensorFailureReason),
}

impl SensorEvent {
    /// World command carrying this notification.
    #[must_use]
    pub fn into_command(self) -> Command {
        match self {
            Self::Fix(position) => Command::ApplyFix { position },
            Self::Failure(reason) => Command::ReportSensorFailure { reason },
        }
    }
}

/// Handle identifying an active subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u64);

impl WatchId {
    /// Wraps a source-specific subscription number.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Source-specific subscription number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Errors raised by position sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SensorError {
    /// The platform offers no position source at all.
    #[error("no position source is available on this platform")]
    Unavailable,
    /// The watch was never registered or has already been cleared.
    #[error("watch {0:?} is not active")]
    UnknownWatch(WatchId),
}

/// External producer of position fixes and failures.
pub trait PositionSource {
    /// Starts delivering notifications into `sink` until the watch is cleared.
    fn watch(
        &mut self,
        options: WatchOptions,
        sink: Sender<SensorEvent>,
    ) -> Result<WatchId, SensorError>;

    /// Stops the subscription identified by `id`.
    fn clear_watch(&mut self, id: WatchId) -> Result<(), SensorError>;
}

/// System translating position notifications into world commands.
#[derive(Debug)]
pub struct Sensor {
    options: WatchOptions,
    sender: Sender<SensorEvent>,
    receiver: Receiver<SensorEvent>,
    watch: Option<WatchId>,
}

impl Sensor {
    /// Creates an unsubscribed sensor using the configured watch options.
    #[must_use]
    pub fn new(config: &SensorConfig) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            options: WatchOptions::from(config),
            sender,
            receiver,
            watch: None,
        }
    }

    /// Options passed to the source on subscription.
    #[must_use]
    pub fn options(&self) -> WatchOptions {
        self.options
    }

    /// Active subscription, if any.
    #[must_use]
    pub fn watch_id(&self) -> Option<WatchId> {
        self.watch
    }

    /// Subscribes to `source`.
    ///
    /// A source that reports [`SensorError::Unavailable`] produces a
    /// [`Command::ReportSensorUnavailable`] so the world keeps its fallback
    /// position.
    pub fn subscribe(&mut self, source: &mut dyn PositionSource, out: &mut Vec<Command>) {
        if self.watch.is_some() {
            debug!("position source already subscribed");
            return;
        }

        match source.watch(self.options, self.sender.clone()) {
            Ok(id) => {
                debug!(watch = id.get(), "subscribed to position source");
                self.watch = Some(id);
            }
            Err(error) => {
                warn!(%error, "position source subscription failed");
                out.push(Command::ReportSensorUnavailable);
            }
        }
    }

    /// Clears the active subscription and drops any undelivered notifications.
    pub fn unsubscribe(&mut self, source: &mut dyn PositionSource) -> Result<(), SensorError> {
        let Some(id) = self.watch else {
            return Ok(());
        };
        source.clear_watch(id)?;
        self.watch = None;
        while self.receiver.try_recv().is_ok() {}
        Ok(())
    }

    /// Next pending notification translated into a command.
    pub fn poll(&self) -> Option<Command> {
        self.receiver
            .try_recv()
            .ok()
            .map(SensorEvent::into_command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Absent;

    impl PositionSource for Absent {
        fn watch(
            &mut self,
            _options: WatchOptions,
            _sink: Sender<SensorEvent>,
        ) -> Result<WatchId, SensorError> {
            Err(SensorError::Unavailable)
        }

        fn clear_watch(&mut self, id: WatchId) -> Result<(), SensorError> {
            Err(SensorError::UnknownWatch(id))
        }
    }

    #[test]
    fn options_follow_configuration() {
        let options = WatchOptions::from(&SensorConfig::default());
        assert!(options.high_accuracy);
        assert_eq!(options.maximum_age, Duration::ZERO);
        assert_eq!(options.timeout, Duration::from_secs(20));
    }

    #[test]
    fn missing_source_reports_unavailable() {
        let mut sensor = Sensor::new(&SensorConfig::default());
        let mut commands = Vec::new();
        sensor.subscribe(&mut Absent, &mut commands);

        assert_eq!(commands, vec![Command::ReportSensorUnavailable]);
        assert!(sensor.watch_id().is_none());
        assert!(sensor.poll().is_none());
    }

    #[test]
    fn unsubscribing_without_watch_is_a_no_op() {
        let mut sensor = Sensor::new(&SensorConfig::default());
        assert_eq!(sensor.unsubscribe(&mut Absent), Ok(()));
    }

    struct Stuck {
        watched: bool,
    }

    impl PositionSource for Stuck {
        fn watch(
            &mut self,
            _options: WatchOptions,
            _sink: Sender<SensorEvent>,
        ) -> Result<WatchId, SensorError> {
            self.watched = true;
            Ok(WatchId::new(3))
        }

        fn clear_watch(&mut self, id: WatchId) -> Result<(), SensorError> {
            Err(SensorError::UnknownWatch(id))
        }
    }

    #[test]
    fn failed_unsubscribe_keeps_the_watch() {
        let mut source = Stuck { watched: false };
        let mut sensor = Sensor::new(&SensorConfig::default());
        let mut commands = Vec::new();
        sensor.subscribe(&mut source, &mut commands);
        assert!(source.watched);

        assert_eq!(
            sensor.unsubscribe(&mut source),
            Err(SensorError::UnknownWatch(WatchId::new(3)))
        );
        assert_eq!(sensor.watch_id(), Some(WatchId::new(3)));
    }

    #[test]
    fn events_map_onto_commands() {
        let position = LatLng::new(1.0, 2.0);
        assert_eq!(
            SensorEvent::Fix(position).into_command(),
            Command::ApplyFix { position }
        );
        assert_eq!(
            SensorEvent::Failure(SensorFailureReason::Timeout).into_command(),
            Command::ReportSensorFailure {
                reason: SensorFailureReason::Timeout
            }
        );
    }
}
