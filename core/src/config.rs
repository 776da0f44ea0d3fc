//! Tunable gameplay parameters.
//!
//! Every field carries a default matching the shipped game, so adapters may
//! deserialize a partial document and only override what they care about.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::{Grid, LatLng};

/// Complete set of tunables consumed by the world and its adapters.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Cell lattice parameters.
    pub grid: GridConfig,
    /// Procedural generation parameters.
    pub generation: GenerationConfig,
    /// Player position model parameters.
    pub player: PlayerConfig,
    /// Cache registry window parameters.
    pub registry: RegistryConfig,
    /// Economy parameters.
    pub economy: EconomyConfig,
    /// Options forwarded to the position source.
    pub sensor: SensorConfig,
}

impl GameConfig {
    /// Rejects parameter combinations the simulation cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tile = self.grid.tile_degrees;
        if !(tile.is_finite() && tile > 0.0) {
            return Err(ConfigError::TileSize(tile));
        }

        let probability = self.generation.spawn_probability;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::SpawnProbability(probability));
        }

        if self.generation.value_exponents == 0 || self.generation.value_exponents > 31 {
            return Err(ConfigError::ValueExponents(self.generation.value_exponents));
        }

        let ratio = self.player.latitude_step_ratio;
        if !(ratio.is_finite() && ratio >= 0.0) {
            return Err(ConfigError::LatitudeStepRatio(ratio));
        }

        let registry = &self.registry;
        if registry.neighborhood_radius == 0 || registry.neighborhood_radius > MAX_WINDOW_RADIUS {
            return Err(ConfigError::NeighborhoodRadius(registry.neighborhood_radius));
        }
        if registry.viewport_buffer > MAX_WINDOW_RADIUS {
            return Err(ConfigError::ViewportBuffer(registry.viewport_buffer));
        }
        let side = 2 * registry.neighborhood_radius as usize;
        if registry.max_window_cells < side * side {
            return Err(ConfigError::WindowCap {
                cap: registry.max_window_cells,
                neighborhood: side * side,
            });
        }

        if self.economy.victory_threshold == 0 {
            return Err(ConfigError::VictoryThreshold);
        }

        Ok(())
    }
}

/// Errors raised when validating a [`GameConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Tile size must be a positive, finite number of degrees.
    #[error("tile size must be positive and finite (received {0})")]
    TileSize(f64),
    /// Spawn probability must lie within `0.0..=1.0`.
    #[error("spawn probability must lie within 0..=1 (received {0})")]
    SpawnProbability(f64),
    /// Exponent count must produce representable values.
    #[error("value exponent count must lie within 1..=31 (received {0})")]
    ValueExponents(u32),
    /// Latitude ratio must be non-negative and finite.
    #[error("latitude step ratio must be non-negative (received {0})")]
    LatitudeStepRatio(f64),
    /// A zero threshold would declare victory immediately.
    #[error("victory threshold must be positive")]
    VictoryThreshold,
    /// Neighborhood radius must lie within `1..=MAX_WINDOW_RADIUS`.
    #[error("neighborhood radius must lie within 1..=64 (received {0})")]
    NeighborhoodRadius(u32),
    /// Viewport buffer must not exceed `MAX_WINDOW_RADIUS`.
    #[error("viewport buffer must not exceed 64 (received {0})")]
    ViewportBuffer(u32),
    /// The window cap must admit at least the fallback neighborhood.
    #[error("max_window_cells {cap} is smaller than the {neighborhood}-cell neighborhood")]
    WindowCap {
        /// Configured cap.
        cap: usize,
        /// Cells in the configured neighborhood.
        neighborhood: usize,
    },
}

/// Largest neighborhood radius or viewport buffer, in cells.
pub const MAX_WINDOW_RADIUS: u32 = 64;

/// Cell lattice parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Angular width and height of one cell, in degrees.
    pub tile_degrees: f64,
    /// Absolute reference point of cell `(0, 0)`.
    pub origin: LatLng,
}

impl GridConfig {
    /// Builds the coordinate system described by this configuration.
    #[must_use]
    pub fn grid(&self) -> Grid {
        Grid::new(self.tile_degrees, self.origin)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_degrees: 1e-4,
            origin: LatLng::new(0.0, 0.0),
        }
    }
}

/// Procedural generation parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Probability that any given cell holds a cache.
    pub spawn_probability: f64,
    /// Number of power-of-two denominations; values range over `2^0..2^n`.
    pub value_exponents: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            spawn_probability: 0.1,
            value_exponents: 4,
        }
    }
}

/// Player position model parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Position used until the first sensor fix arrives.
    pub fallback: LatLng,
    /// Longitude step of one movement command, in tile widths.
    pub move_tiles: f64,
    /// Fraction of the longitude step applied to latitude commands.
    pub latitude_step_ratio: f64,
    /// Largest accepted distance between consecutive fixes, in meters.
    pub max_jump_meters: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            fallback: LatLng::new(36.997_936_938_057_016, -122.057_035_075_011_51),
            move_tiles: 5.0,
            latitude_step_ratio: 0.5,
            max_jump_meters: 100.0,
        }
    }
}

/// Cache registry window parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Half-width of the fallback neighborhood, in cells.
    pub neighborhood_radius: u32,
    /// Extra cells loaded beyond the visible viewport on every side.
    pub viewport_buffer: u32,
    /// Largest viewport window materialized; bigger ones fall back to the
    /// neighborhood.
    pub max_window_cells: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            neighborhood_radius: 8,
            viewport_buffer: 5,
            max_window_cells: 16_384,
        }
    }
}

/// Economy parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomyConfig {
    /// Interaction radius expressed in tile widths.
    pub interaction_radius_tiles: f64,
    /// Balance that wins the game.
    pub victory_threshold: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            interaction_radius_tiles: 3.0,
            victory_threshold: 64,
        }
    }
}

/// Options forwarded to the position source when subscribing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorConfig {
    /// Requests the most accurate fixes the device can provide.
    pub high_accuracy: bool,
    /// Oldest cached fix the source may deliver, in milliseconds.
    pub maximum_age_ms: u64,
    /// Time allowed for each fix before a timeout failure, in milliseconds.
    pub timeout_ms: u64,
}

impl SensorConfig {
    /// Oldest cached fix the source may deliver.
    #[must_use]
    pub fn maximum_age(&self) -> Duration {
        Duration::from_millis(self.maximum_age_ms)
    }

    /// Time allowed for each fix before a timeout failure.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age_ms: 0,
            timeout_ms: 20_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            [economy]
            victory_threshold = 32

            [grid]
            origin = { lat = 1.5, lng = -2.0 }
            "#,
        )
        .expect("partial config parses");

        assert_eq!(config.economy.victory_threshold, 32);
        assert_eq!(config.economy.interaction_radius_tiles, 3.0);
        assert_eq!(config.grid.origin, LatLng::new(1.5, -2.0));
        assert_eq!(config.grid.tile_degrees, 1e-4);
        assert_eq!(config.player, PlayerConfig::default());
    }

    #[test]
    fn window_sizes_are_bounded() {
        let mut config = GameConfig::default();
        config.registry.neighborhood_radius = MAX_WINDOW_RADIUS + 1;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NeighborhoodRadius(MAX_WINDOW_RADIUS + 1))
        );

        config.registry.neighborhood_radius = 0;
        assert_eq!(config.validate(), Err(ConfigError::NeighborhoodRadius(0)));

        let mut config = GameConfig::default();
        config.registry.viewport_buffer = 1_000;
        assert_eq!(config.validate(), Err(ConfigError::ViewportBuffer(1_000)));

        let mut config = GameConfig::default();
        config.registry.max_window_cells = 100;
        assert_eq!(
            config.validate(),
            Err(ConfigError::WindowCap {
                cap: 100,
                neighborhood: 256
            })
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<GameConfig, _> = toml::from_str("[grid]\ntile_size = 2.0\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        let mut config = GameConfig::default();
        config.grid.tile_degrees = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::TileSize(0.0)));
    }

    #[test]
    fn probability_above_one_is_rejected() {
        let mut config = GameConfig::default();
        config.generation.spawn_probability = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::SpawnProbability(1.5)));
    }

    #[test]
    fn sensor_durations_convert_from_milliseconds() {
        let config = SensorConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.maximum_age(), Duration::ZERO);
    }
}
