//! Registry of caches materialized inside the current window.

use std::collections::BTreeMap;

use geocache_core::{distance_meters, Cell, CellWindow, Event, Grid, LatLng, WindowSource};
use geocache_system_generator::Generator;

/// Mutable point holder anchored to a single cell.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Cache {
    pub(crate) cell: Cell,
    pub(crate) value: u32,
    pub(crate) center: LatLng,
}

/// Inputs shared by every materialization within one repopulation.
pub(crate) struct Materializer<'a> {
    pub(crate) grid: &'a Grid,
    pub(crate) generator: &'a Generator,
    pub(crate) player: LatLng,
    pub(crate) interaction_radius_meters: f64,
}

/// Owns the live cache set, keyed by cell.
#[derive(Debug, Default)]
pub(crate) struct CacheRegistry {
    caches: BTreeMap<Cell, Cache>,
    window: Option<CellWindow>,
}

impl CacheRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Window most recently populated, if any.
    pub(crate) fn window(&self) -> Option<CellWindow> {
        self.window
    }

    pub(crate) fn get(&self, cell: Cell) -> Option<&Cache> {
        self.caches.get(&cell)
    }

    pub(crate) fn get_mut(&mut self, cell: Cell) -> Option<&mut Cache> {
        self.caches.get_mut(&cell)
    }

    /// Caches in ascending cell order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Cache> {
        self.caches.values()
    }

    /// Discards every cache and materializes `window` from scratch.
    ///
    /// Discarded caches lose any value accumulated during play; cells that
    /// reappear start again from their generated initial value.
    pub(crate) fn repopulate(
        &mut self,
        window: CellWindow,
        source: WindowSource,
        materializer: &Materializer<'_>,
        out_events: &mut Vec<Event>,
    ) -> usize {
        for cell in std::mem::take(&mut self.caches).into_keys() {
            out_events.push(Event::CacheDiscarded { cell });
        }

        for cell in window.cells() {
            let Some(value) = materializer.generator.generate(cell) else {
                continue;
            };
            let center = materializer.grid.center_of(cell);
            let distance = distance_meters(materializer.player, center);
            let in_range = distance <= materializer.interaction_radius_meters;
            let _ = self.caches.insert(
                cell,
                Cache {
                    cell,
                    value,
                    center,
                },
            );
            out_events.push(Event::CacheMaterialized {
                cell,
                value,
                in_range,
            });
        }

        let materialized = self.caches.len();
        self.window = Some(window);
        out_events.push(Event::WindowRepopulated {
            window,
            source,
            materialized,
        });
        materialized
    }
}
