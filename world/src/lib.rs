#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Geocache.
//!
//! The [`World`] aggregates the player position model, the cache registry and
//! the economy ledger. It is mutated exclusively through [`apply`], one
//! command at a time, and inspected through the [`query`] module.

mod economy;
mod player;
mod registry;

use geocache_core::{
    distance_meters, Cell, CacheAction, CellWindow, Command, Event, GameConfig, GeoBounds, Grid,
    LatLng, RelocationCause, TransitionError, VictoryTrigger, ViewportSpan, WindowSource,
    WELCOME_BANNER,
};
use geocache_system_generator::Generator;
use tracing::{debug, info, warn};

use economy::Ledger;
use player::{FixOutcome, MoveStep, PlayerState};
use registry::{CacheRegistry, Materializer};

/// Represents the authoritative Geocache world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: Grid,
    generator: Generator,
    rules: Rules,
    player: PlayerState,
    registry: CacheRegistry,
    viewport: Option<ViewportSpan>,
}

/// Numeric parameters resolved once from the configuration.
#[derive(Clone, Copy, Debug)]
struct Rules {
    move_step: MoveStep,
    max_jump_meters: f64,
    neighborhood_radius: u32,
    viewport_buffer: u32,
    max_window_cells: usize,
    interaction_radius_meters: f64,
    victory_threshold: u32,
}

impl World {
    /// Creates a world with the player at the configured fallback position.
    ///
    /// No caches exist until [`Command::Initialize`] or a sensor event
    /// populates the first window.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let grid = config.grid.grid();
        let rules = Rules {
            move_step: MoveStep::from_config(&config.player, &grid),
            max_jump_meters: config.player.max_jump_meters,
            neighborhood_radius: config.registry.neighborhood_radius,
            viewport_buffer: config.registry.viewport_buffer,
            max_window_cells: config.registry.max_window_cells,
            interaction_radius_meters: grid
                .tiles_to_meters(config.economy.interaction_radius_tiles),
            victory_threshold: config.economy.victory_threshold,
        };

        Self {
            banner: WELCOME_BANNER,
            grid,
            generator: Generator::new(&config.generation),
            rules,
            player: PlayerState::new(config.player.fallback),
            registry: CacheRegistry::new(),
            viewport: None,
        }
    }

    fn announce_position(&self, cause: RelocationCause, out_events: &mut Vec<Event>) {
        out_events.push(Event::PlayerRelocated {
            base: self.player.base(),
            effective: self.player.effective(),
            cause,
        });
    }

    fn visible_window(&self) -> (CellWindow, WindowSource) {
        let effective = self.player.effective();
        if let Some(span) = self.viewport {
            let window = self.grid.window_covering(
                GeoBounds::centered(effective, span),
                self.rules.viewport_buffer,
            );
            if window.len() <= self.rules.max_window_cells {
                return (window, WindowSource::Viewport);
            }
            warn!(
                cells = window.len(),
                cap = self.rules.max_window_cells,
                "viewport window too large, using neighborhood"
            );
        }

        (
            self.grid
                .window_around(self.grid.cell_of(effective), self.rules.neighborhood_radius),
            WindowSource::Neighborhood,
        )
    }

    fn repopulate(&mut self, out_events: &mut Vec<Event>) {
        let (window, source) = self.visible_window();
        let materializer = Materializer {
            grid: &self.grid,
            generator: &self.generator,
            player: self.player.effective(),
            interaction_radius_meters: self.rules.interaction_radius_meters,
        };
        let materialized = self
            .registry
            .repopulate(window, source, &materializer, out_events);
        debug!(
            ?source,
            cells = window.len(),
            materialized,
            "cache window repopulated"
        );
    }

    fn in_reach(&self, center: LatLng) -> bool {
        distance_meters(self.player.effective(), center) <= self.rules.interaction_radius_meters
    }

    fn interact(&mut self, cell: Cell, action: CacheAction, out_events: &mut Vec<Event>) {
        let reject = |reason: TransitionError, out_events: &mut Vec<Event>| {
            out_events.push(Event::TransitionRejected {
                cell,
                action,
                reason,
            });
        };

        let effective = self.player.effective();
        let Some(cache) = self.registry.get_mut(cell) else {
            reject(TransitionError::MissingCache, out_events);
            return;
        };
        if distance_meters(effective, cache.center) > self.rules.interaction_radius_meters {
            reject(TransitionError::OutOfRange, out_events);
            return;
        }

        let held = self.player.held_mut();
        let before = Ledger {
            held: *held,
            cache: cache.value,
        };
        let mut after = before;
        let amount = match economy::transition(&mut after, action) {
            Ok(amount) => amount,
            Err(reason) => {
                reject(reason, out_events);
                return;
            }
        };
        *held = after.held;
        cache.value = after.cache;

        out_events.push(match action {
            CacheAction::Take => Event::CacheTaken {
                cell,
                amount,
                held: after.held,
            },
            CacheAction::Place => Event::CachePlaced {
                cell,
                amount,
                cache_value: after.cache,
            },
            CacheAction::Destroy => Event::CacheDestroyed {
                cell,
                discarded: amount,
            },
        });

        if action == CacheAction::Destroy {
            return;
        }
        let threshold = self.rules.victory_threshold;
        if economy::crossed_threshold(before, after, threshold) {
            let (trigger, value) = if after.held >= threshold {
                (VictoryTrigger::Held, after.held)
            } else {
                (VictoryTrigger::Cache { cell }, after.cache)
            };
            info!(?trigger, value, "victory threshold reached");
            out_events.push(Event::VictoryAchieved { trigger, value });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Initialize => {
            world.announce_position(RelocationCause::Load, out_events);
            world.repopulate(out_events);
        }
        Command::ApplyFix { position } => {
            match world
                .player
                .receive_fix(position, world.rules.max_jump_meters)
            {
                FixOutcome::Accepted { first } => {
                    out_events.push(Event::FixAccepted { position, first });
                    world.announce_position(RelocationCause::Fix, out_events);
                    world.repopulate(out_events);
                }
                FixOutcome::Rejected { jump_meters } => {
                    warn!(
                        jump_meters,
                        lat = position.lat(),
                        lng = position.lng(),
                        "position jump detected, ignoring fix"
                    );
                    out_events.push(Event::FixRejected {
                        position,
                        jump_meters,
                    });
                }
            }
        }
        Command::ReportSensorFailure { reason } => {
            warn!(?reason, "position source failed, keeping current position");
            out_events.push(Event::SensorFailed { reason });
            if world.registry.window().is_none() {
                world.repopulate(out_events);
            }
        }
        Command::ReportSensorUnavailable => {
            warn!("no position source available, using fallback position");
            out_events.push(Event::SensorUnavailable);
            if world.registry.window().is_none() {
                world.repopulate(out_events);
            }
        }
        Command::Move { direction } => {
            world.player.step(direction, world.rules.move_step);
            world.announce_position(RelocationCause::Manual, out_events);
            world.repopulate(out_events);
        }
        Command::SetViewport { span } => {
            world.viewport = match span {
                Some(span) if !span.is_valid() => {
                    warn!(?span, "ignoring malformed viewport span");
                    None
                }
                other => other,
            };
            if world.registry.window().is_some() {
                world.repopulate(out_events);
            }
        }
        Command::InspectCache { cell } => match world.registry.get(cell) {
            Some(cache) => out_events.push(Event::CacheInspected {
                cell,
                value: cache.value,
                in_range: world.in_reach(cache.center),
            }),
            None => debug!(?cell, "inspected cell holds no cache"),
        },
        Command::Interact { cell, action } => world.interact(cell, action, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use geocache_core::{distance_meters, Cell, CellWindow, GeoBounds, Grid, LatLng};

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the world's coordinate system.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Interaction radius in meters.
    #[must_use]
    pub fn interaction_radius_meters(world: &World) -> f64 {
        world.rules.interaction_radius_meters
    }

    /// Balance that wins the game.
    #[must_use]
    pub fn victory_threshold(world: &World) -> u32 {
        world.rules.victory_threshold
    }

    /// Captures the player's position and inventory.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            base: world.player.base(),
            effective: world.player.effective(),
            held: world.player.held(),
            has_received_first_fix: world.player.has_received_first_fix(),
        }
    }

    /// Window currently materialized, if any has been populated.
    #[must_use]
    pub fn window(world: &World) -> Option<CellWindow> {
        world.registry.window()
    }

    /// Captures the cache anchored at `cell`, if one is materialized.
    #[must_use]
    pub fn cache(world: &World, cell: Cell) -> Option<CacheSnapshot> {
        world
            .registry
            .get(cell)
            .map(|cache| snapshot(world, cache.cell, cache.value, cache.center))
    }

    /// Captures every materialized cache in ascending cell order.
    #[must_use]
    pub fn cache_view(world: &World) -> CacheView {
        let snapshots = world
            .registry
            .iter()
            .map(|cache| snapshot(world, cache.cell, cache.value, cache.center))
            .collect();
        CacheView { snapshots }
    }

    /// Sum of the player's held value and every materialized cache value.
    #[must_use]
    pub fn ledger_total(world: &World) -> u64 {
        let caches: u64 = world
            .registry
            .iter()
            .map(|cache| u64::from(cache.value))
            .sum();
        caches + u64::from(world.player.held())
    }

    fn snapshot(world: &World, cell: Cell, value: u32, center: LatLng) -> CacheSnapshot {
        let distance = distance_meters(world.player.effective(), center);
        CacheSnapshot {
            cell,
            value,
            center,
            bounds: world.grid.bounds_of(cell),
            distance_meters: distance,
            in_range: distance <= world.rules.interaction_radius_meters,
        }
    }

    /// Immutable representation of the player's state.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// Sensor-provided or fallback position.
        pub base: LatLng,
        /// Base position plus the manual offset.
        pub effective: LatLng,
        /// Value currently held by the player.
        pub held: u32,
        /// Whether a sensor fix has replaced the fallback position.
        pub has_received_first_fix: bool,
    }

    /// Immutable representation of a single cache used for queries.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct CacheSnapshot {
        /// Cell anchoring the cache.
        pub cell: Cell,
        /// Current cache value.
        pub value: u32,
        /// Midpoint of the cell.
        pub center: LatLng,
        /// Geographic rectangle of the cell.
        pub bounds: GeoBounds,
        /// Distance from the player's effective position to the center.
        pub distance_meters: f64,
        /// Whether the cache is within the interaction radius.
        pub in_range: bool,
    }

    /// Read-only snapshot describing all materialized caches.
    #[derive(Clone, Debug, Default)]
    pub struct CacheView {
        snapshots: Vec<CacheSnapshot>,
    }

    impl CacheView {
        /// Iterator over the captured caches in ascending cell order.
        pub fn iter(&self) -> impl Iterator<Item = &CacheSnapshot> {
            self.snapshots.iter()
        }

        /// Number of captured caches.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no caches were captured.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<CacheSnapshot> {
            self.snapshots
        }
    }
}
