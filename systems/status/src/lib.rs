#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Status panel system summarizing the player's points and the position feed.
//!
//! The system is purely reactive: it folds world events into a handful of
//! human-readable lines that adapters display verbatim.

use geocache_core::{Event, SensorFailureReason, TransitionError};

const NO_POINTS: &str = "No points yet...";
const REQUESTING_LOCATION: &str = "Requesting location...";

/// Quality of the current position feed, used by adapters for styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedHealth {
    /// Waiting for the first notification.
    Pending,
    /// The latest fix was accepted.
    Live,
    /// The latest fix was ignored as a jump.
    Degraded,
    /// The source failed or does not exist.
    Failed,
}

/// Reactive system tracking the status panel text.
#[derive(Clone, Debug)]
pub struct Status {
    held: u32,
    location: String,
    health: FeedHealth,
    notice: Option<String>,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            held: 0,
            location: REQUESTING_LOCATION.to_owned(),
            health: FeedHealth::Pending,
            notice: None,
        }
    }
}

impl Status {
    /// Creates a status panel for a fresh session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a batch of world events into the panel.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            self.observe(event);
        }
    }

    fn observe(&mut self, event: &Event) {
        match event {
            Event::FixAccepted { position, .. } => {
                self.location = format!(
                    "Location: {:.6}, {:.6}",
                    position.lat(),
                    position.lng()
                );
                self.health = FeedHealth::Live;
            }
            Event::FixRejected { jump_meters, .. } => {
                self.location = if jump_meters.is_finite() {
                    format!("GPS jump ignored ({jump_meters:.0}m)")
                } else {
                    "Invalid GPS fix ignored".to_owned()
                };
                self.health = FeedHealth::Degraded;
            }
            Event::SensorFailed { reason } => {
                self.location = format!("{} (using fallback)", failure_text(reason));
                self.health = FeedHealth::Failed;
            }
            Event::SensorUnavailable => {
                self.location = "Geolocation not supported (using fallback)".to_owned();
                self.health = FeedHealth::Failed;
            }
            Event::CacheTaken { held, .. } => {
                self.held = *held;
                self.notice = None;
            }
            Event::CachePlaced { .. } => {
                self.held = 0;
                self.notice = None;
            }
            Event::CacheDestroyed { .. } => self.notice = None,
            Event::TransitionRejected { cell, reason, .. } => {
                self.notice = Some(match reason {
                    TransitionError::OutOfRange => {
                        format!("This cache at \"{},{}\" is too far away!", cell.i(), cell.j())
                    }
                    other => sentence(other),
                });
            }
            _ => {}
        }
    }

    /// Points line, e.g. `"8 points accumulated"`.
    #[must_use]
    pub fn points_line(&self) -> String {
        if self.held == 0 {
            NO_POINTS.to_owned()
        } else {
            format!("{} points accumulated", self.held)
        }
    }

    /// Description of the latest position notification.
    #[must_use]
    pub fn location_line(&self) -> &str {
        &self.location
    }

    /// Health of the position feed.
    #[must_use]
    pub fn health(&self) -> FeedHealth {
        self.health
    }

    /// Message explaining the most recent refused transition, if still relevant.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

fn failure_text(reason: &SensorFailureReason) -> String {
    match reason {
        SensorFailureReason::PermissionDenied => {
            "Location denied - check permissions".to_owned()
        }
        SensorFailureReason::PositionUnavailable => {
            "Location unavailable - GPS signal lost".to_owned()
        }
        SensorFailureReason::Timeout => "Location timeout - taking too long".to_owned(),
        SensorFailureReason::Other { message } => format!("Location error: {message}"),
    }
}

fn sentence(reason: &TransitionError) -> String {
    let text = reason.to_string();
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => format!("{}{}!", first.to_uppercase(), chars.as_str()),
        None => text,
    }
}
