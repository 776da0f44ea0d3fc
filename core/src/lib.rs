#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Geocache engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! views to react to. Every command is processed to completion before the next
//! one is accepted, so the message surface doubles as the serialization point
//! for sensor feeds, movement buttons and cache interactions alike.

mod config;
mod grid;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{
    ConfigError, EconomyConfig, GameConfig, GenerationConfig, GridConfig, PlayerConfig,
    RegistryConfig, SensorConfig, MAX_WINDOW_RADIUS,
};
pub use grid::{distance_meters, Grid, EARTH_RADIUS_METERS, METERS_PER_DEGREE};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Geocache.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Announces the initial position and populates the first cache window.
    Initialize,
    /// Delivers a position fix reported by the external position source.
    ApplyFix {
        /// Position reported by the sensor.
        position: LatLng,
    },
    /// Reports that the position source failed to produce a fix.
    ReportSensorFailure {
        /// Classified failure reason.
        reason: SensorFailureReason,
    },
    /// Reports that no position source exists on this platform.
    ReportSensorUnavailable,
    /// Shifts the player's manual offset one step in the given direction.
    Move {
        /// Direction of travel.
        direction: Direction,
    },
    /// Reports the angular span currently visible in the live view.
    SetViewport {
        /// Visible span, or `None` when no live view exists.
        span: Option<ViewportSpan>,
    },
    /// Requests the interaction dialog for the cache anchored at `cell`.
    InspectCache {
        /// Cell anchoring the cache.
        cell: Cell,
    },
    /// Attempts an economy transition against the cache anchored at `cell`.
    Interact {
        /// Cell anchoring the cache.
        cell: Cell,
        /// Transition requested by the player.
        action: CacheAction,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// The player's effective position changed; views recenter on `effective`.
    PlayerRelocated {
        /// Base position (sensor or fallback).
        base: LatLng,
        /// Base position plus the accumulated manual offset.
        effective: LatLng,
        /// What triggered the relocation.
        cause: RelocationCause,
    },
    /// A sensor fix replaced the base position.
    FixAccepted {
        /// Position that became the new base.
        position: LatLng,
        /// Whether this was the first fix, accepted without jump filtering.
        first: bool,
    },
    /// A sensor fix was discarded as an implausible jump.
    FixRejected {
        /// Position carried by the discarded fix.
        position: LatLng,
        /// Distance between the current base position and the fix.
        jump_meters: f64,
    },
    /// The position source reported a failure.
    SensorFailed {
        /// Classified failure reason.
        reason: SensorFailureReason,
    },
    /// No position source exists; the fallback position stays authoritative.
    SensorUnavailable,
    /// A previously materialized cache was dropped along with its state.
    CacheDiscarded {
        /// Cell that anchored the cache.
        cell: Cell,
    },
    /// A cache entered the registry at its generated initial value.
    CacheMaterialized {
        /// Cell anchoring the cache.
        cell: Cell,
        /// Initial value of the cache.
        value: u32,
        /// Whether the cache center lies within the interaction radius.
        in_range: bool,
    },
    /// The registry finished repopulating a new window.
    WindowRepopulated {
        /// Window that is now materialized.
        window: CellWindow,
        /// Where the window was derived from.
        source: WindowSource,
        /// Number of caches materialized inside the window.
        materialized: usize,
    },
    /// Describes the dialog that should be shown for a cache.
    CacheInspected {
        /// Cell anchoring the cache.
        cell: Cell,
        /// Current cache value.
        value: u32,
        /// Whether transitions are currently permitted by proximity.
        in_range: bool,
    },
    /// The player took the full contents of a cache.
    CacheTaken {
        /// Cell anchoring the cache.
        cell: Cell,
        /// Amount moved into the player's hands.
        amount: u32,
        /// Player's held value after the transition.
        held: u32,
    },
    /// The player deposited everything they held into a cache.
    CachePlaced {
        /// Cell anchoring the cache.
        cell: Cell,
        /// Amount deposited.
        amount: u32,
        /// Cache value after the transition.
        cache_value: u32,
    },
    /// A cache was emptied without transferring its value.
    CacheDestroyed {
        /// Cell anchoring the cache.
        cell: Cell,
        /// Value that left the economy.
        discarded: u32,
    },
    /// A transition was refused; no state changed.
    TransitionRejected {
        /// Cell named by the request.
        cell: Cell,
        /// Transition that was attempted.
        action: CacheAction,
        /// Specific reason for the refusal.
        reason: TransitionError,
    },
    /// A transition carried a ledger balance across the victory threshold.
    VictoryAchieved {
        /// Which side of the ledger crossed the threshold.
        trigger: VictoryTrigger,
        /// Balance that crossed the threshold.
        value: u32,
    },
}

/// Discrete grid coordinate identifying a cache location.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    i: i32,
    j: i32,
}

impl Cell {
    /// Creates a new cell from latitude (`i`) and longitude (`j`) indices.
    #[must_use]
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Index along the latitude axis.
    #[must_use]
    pub const fn i(&self) -> i32 {
        self.i
    }

    /// Index along the longitude axis.
    #[must_use]
    pub const fn j(&self) -> i32 {
        self.j
    }
}

/// Continuous geographic position in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    lat: f64,
    lng: f64,
}

impl LatLng {
    /// Creates a position from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// Returns the position shifted by the provided angular deltas.
    #[must_use]
    pub fn translated(self, delta_lat: f64, delta_lng: f64) -> Self {
        Self::new(self.lat + delta_lat, self.lng + delta_lng)
    }
}

/// Axis-aligned geographic rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeoBounds {
    south_west: LatLng,
    north_east: LatLng,
}

impl GeoBounds {
    /// Creates bounds from the south-west and north-east corners.
    #[must_use]
    pub const fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds spanning `span` centered on `center`.
    #[must_use]
    pub fn centered(center: LatLng, span: ViewportSpan) -> Self {
        let half_lat = span.lat() / 2.0;
        let half_lng = span.lng() / 2.0;
        Self::new(
            center.translated(-half_lat, -half_lng),
            center.translated(half_lat, half_lng),
        )
    }

    /// South-west corner.
    #[must_use]
    pub const fn south_west(&self) -> LatLng {
        self.south_west
    }

    /// North-east corner.
    #[must_use]
    pub const fn north_east(&self) -> LatLng {
        self.north_east
    }

    /// Midpoint of the rectangle.
    #[must_use]
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

/// Angular extent of the live view, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportSpan {
    lat: f64,
    lng: f64,
}

impl ViewportSpan {
    /// Creates a span from its latitude and longitude extents.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Extent along the latitude axis.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Extent along the longitude axis.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// Whether both extents are finite and non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.lat, self.lng]
            .iter()
            .all(|extent| extent.is_finite() && *extent >= 0.0)
    }
}

/// Half-open rectangular range of cells: `min` is included, `max` is not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CellWindow {
    min: Cell,
    max: Cell,
}

impl CellWindow {
    /// Creates a window spanning `[min.i, max.i) x [min.j, max.j)`.
    #[must_use]
    pub const fn new(min: Cell, max: Cell) -> Self {
        Self { min, max }
    }

    /// Inclusive lower corner.
    #[must_use]
    pub const fn min(&self) -> Cell {
        self.min
    }

    /// Exclusive upper corner.
    #[must_use]
    pub const fn max(&self) -> Cell {
        self.max
    }

    /// Reports whether the cell lies inside the window.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        (self.min.i..self.max.i).contains(&cell.i) && (self.min.j..self.max.j).contains(&cell.j)
    }

    /// Number of cells covered by the window.
    #[must_use]
    pub fn len(&self) -> usize {
        let rows = usize::try_from(self.max.i.saturating_sub(self.min.i)).unwrap_or(0);
        let columns = usize::try_from(self.max.j.saturating_sub(self.min.j)).unwrap_or(0);
        rows.saturating_mul(columns)
    }

    /// Reports whether the window covers no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the window row by row in ascending `(i, j)` order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let (min, max) = (self.min, self.max);
        (min.i..max.i).flat_map(move |i| (min.j..max.j).map(move |j| Cell::new(i, j)))
    }
}

/// Cardinal directions accepted by movement commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Increasing latitude.
    North,
    /// Increasing longitude.
    East,
    /// Decreasing latitude.
    South,
    /// Decreasing longitude.
    West,
}

/// Economy transitions offered by the cache dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheAction {
    /// Move the cache's full value into the player's hands.
    Take,
    /// Move everything the player holds into the cache.
    Place,
    /// Empty the cache without transferring its value.
    Destroy,
}

/// Reasons an economy transition may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum TransitionError {
    /// The cache center lies beyond the interaction radius.
    #[error("this cache is too far away")]
    OutOfRange,
    /// Take was attempted on an empty cache.
    #[error("this cache is fully depleted")]
    Depleted,
    /// Take was attempted while holding a different denomination.
    #[error("your hands are full")]
    HandsFull,
    /// Place targeted a cache holding a different denomination.
    #[error("you can only place points into a cache of equal value")]
    DenominationMismatch,
    /// Place was attempted with empty hands.
    #[error("you have no points to place")]
    NoPointsHeld,
    /// Destroy was attempted on an empty cache.
    #[error("this cache is already empty")]
    AlreadyEmpty,
    /// No cache is materialized at the requested cell.
    #[error("there is no cache here")]
    MissingCache,
    /// The resulting stack would exceed the largest representable value.
    #[error("this stack cannot grow any larger")]
    StackOverflow,
}

/// Classified failure reported by the position source.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorFailureReason {
    /// The user or platform refused location access.
    PermissionDenied,
    /// The device could not determine a position.
    PositionUnavailable,
    /// No fix arrived before the configured timeout.
    Timeout,
    /// Any other failure, with the source's description.
    Other {
        /// Human-readable description supplied by the source.
        message: String,
    },
}

/// Trigger of a [`Event::PlayerRelocated`] broadcast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelocationCause {
    /// Initial placement at load.
    Load,
    /// An accepted sensor fix.
    Fix,
    /// A manual movement command.
    Manual,
}

/// Origin of a repopulated cache window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowSource {
    /// Visible bounds of the live view, expanded by the buffer.
    Viewport,
    /// Fixed-radius neighborhood around the player's cell.
    Neighborhood,
}

/// Ledger balance responsible for a victory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VictoryTrigger {
    /// The player's held value reached the threshold.
    Held,
    /// A cache's value reached the threshold.
    Cache {
        /// Cell anchoring the cache.
        cell: Cell,
    },
}
