#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for Geocache adapters.
//!
//! Adapters implement [`View`] and let a [`ViewBridge`] translate world
//! events into calls on it. The bridge owns no game state; everything it
//! forwards is derived from the events and the grid.

use anyhow::Result as AnyResult;
use geocache_core::{
    CacheAction, Cell, Event, GeoBounds, Grid, LatLng, TransitionError, VictoryTrigger,
    ViewportSpan,
};

/// RGBA color used when drawing markers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Fill and label color of caches the player can interact with (`#3388ff`).
pub const REACHABLE_COLOR: Color = Color::from_rgb_u8(0x33, 0x88, 0xff);
/// Fill and label color of caches beyond the interaction radius (`#ff3333`).
pub const DISTANT_COLOR: Color = Color::from_rgb_u8(0xff, 0x33, 0x33);

/// Everything a view needs to draw one cache rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheMarker {
    /// Cell anchoring the cache.
    pub cell: Cell,
    /// Geographic rectangle of the cell.
    pub bounds: GeoBounds,
    /// Midpoint of the cell, where the value label sits.
    pub center: LatLng,
    /// Value shown on the label.
    pub value: u32,
    /// Whether the cache was within reach when materialized.
    pub in_range: bool,
}

impl CacheMarker {
    /// Fill color reflecting reachability.
    #[must_use]
    pub fn color(&self) -> Color {
        if self.in_range {
            REACHABLE_COLOR
        } else {
            DISTANT_COLOR
        }
    }
}

/// Content of the interaction dialog for one cache.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheDialog {
    /// Cell anchoring the cache.
    pub cell: Cell,
    /// Current cache value.
    pub value: u32,
    /// Transitions offered to the player; empty when out of range.
    pub actions: Vec<CacheAction>,
}

impl CacheDialog {
    /// Whether the player is close enough to act on the cache.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        !self.actions.is_empty()
    }
}

/// Presentation surface driven by the [`ViewBridge`].
pub trait View {
    /// Angular span currently visible, or `None` for views without a map.
    fn visible_span(&self) -> Option<ViewportSpan>;

    /// Moves the camera and player marker to `effective`.
    fn recenter(&mut self, effective: LatLng) -> AnyResult<()>;

    /// Draws a newly materialized cache.
    fn show_cache(&mut self, marker: CacheMarker) -> AnyResult<()>;

    /// Updates the label of a cache after a transition.
    fn update_cache(&mut self, cell: Cell, value: u32) -> AnyResult<()>;

    /// Removes a discarded cache.
    fn remove_cache(&mut self, cell: Cell) -> AnyResult<()>;

    /// Opens the dialog for a cache.
    fn show_dialog(&mut self, dialog: CacheDialog) -> AnyResult<()>;

    /// Closes the dialog of `cell` if it is open.
    fn dismiss_dialog(&mut self, cell: Cell) -> AnyResult<()>;

    /// Explains why a requested transition was refused.
    fn show_rejection(
        &mut self,
        cell: Cell,
        action: CacheAction,
        reason: TransitionError,
    ) -> AnyResult<()>;

    /// Presents the victory screen.
    fn show_victory(&mut self, trigger: VictoryTrigger, value: u32) -> AnyResult<()>;
}

/// Routes world events onto a [`View`].
#[derive(Clone, Copy, Debug)]
pub struct ViewBridge {
    grid: Grid,
}

impl ViewBridge {
    /// Creates a bridge that resolves cells through `grid`.
    #[must_use]
    pub const fn new(grid: Grid) -> Self {
        Self { grid }
    }

    /// Forwards each event in order, stopping at the first view error.
    pub fn route(&self, events: &[Event], view: &mut dyn View) -> AnyResult<()> {
        for event in events {
            self.forward(event, view)?;
        }
        Ok(())
    }

    fn forward(&self, event: &Event, view: &mut dyn View) -> AnyResult<()> {
        match *event {
            Event::PlayerRelocated { effective, .. } => view.recenter(effective),
            Event::CacheDiscarded { cell } => {
                view.dismiss_dialog(cell)?;
                view.remove_cache(cell)
            }
            Event::CacheMaterialized {
                cell,
                value,
                in_range,
            } => view.show_cache(CacheMarker {
                cell,
                bounds: self.grid.bounds_of(cell),
                center: self.grid.center_of(cell),
                value,
                in_range,
            }),
            Event::CacheInspected {
                cell,
                value,
                in_range,
            } => {
                let actions = if in_range {
                    vec![CacheAction::Take, CacheAction::Place, CacheAction::Destroy]
                } else {
                    Vec::new()
                };
                view.show_dialog(CacheDialog {
                    cell,
                    value,
                    actions,
                })
            }
            Event::CacheTaken { cell, .. } | Event::CacheDestroyed { cell, .. } => {
                view.update_cache(cell, 0)
            }
            Event::CachePlaced {
                cell, cache_value, ..
            } => view.update_cache(cell, cache_value),
            Event::TransitionRejected {
                cell,
                action,
                reason,
            } => view.show_rejection(cell, action, reason),
            Event::VictoryAchieved { trigger, value } => view.show_victory(trigger, value),
            Event::FixAccepted { .. }
            | Event::FixRejected { .. }
            | Event::SensorFailed { .. }
            | Event::SensorUnavailable
            | Event::WindowRepopulated { .. } => Ok(()),
        }
    }
}
