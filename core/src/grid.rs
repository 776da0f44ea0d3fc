//! Mapping between continuous positions and discrete cells.

use crate::{Cell, CellWindow, GeoBounds, LatLng};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Flat degree-to-meter conversion used for radii expressed in tiles.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Fixed lattice of square cells anchored at an absolute origin.
///
/// Cell `(i, j)` spans `origin + (i, j) * tile_degrees` to
/// `origin + (i + 1, j + 1) * tile_degrees`, where `i` runs along latitude and
/// `j` along longitude. The origin never follows the player, so the same cell
/// always maps to the same rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    tile_degrees: f64,
    origin: LatLng,
}

impl Grid {
    /// Creates a grid with the given tile size (degrees) and origin.
    #[must_use]
    pub const fn new(tile_degrees: f64, origin: LatLng) -> Self {
        Self {
            tile_degrees,
            origin,
        }
    }

    /// Angular width and height of a single cell.
    #[must_use]
    pub const fn tile_degrees(&self) -> f64 {
        self.tile_degrees
    }

    /// Absolute reference point of cell `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> LatLng {
        self.origin
    }

    /// Cell containing the provided position.
    #[must_use]
    pub fn cell_of(&self, position: LatLng) -> Cell {
        Cell::new(
            self.index_floor(position.lat(), self.origin.lat()),
            self.index_floor(position.lng(), self.origin.lng()),
        )
    }

    /// Geographic rectangle covered by the cell.
    #[must_use]
    pub fn bounds_of(&self, cell: Cell) -> GeoBounds {
        GeoBounds::new(
            self.corner(i64::from(cell.i()), i64::from(cell.j())),
            self.corner(i64::from(cell.i()) + 1, i64::from(cell.j()) + 1),
        )
    }

    /// Midpoint of the cell's rectangle.
    #[must_use]
    pub fn center_of(&self, cell: Cell) -> LatLng {
        self.bounds_of(cell).center()
    }

    /// Square neighborhood `[i - radius, i + radius) x [j - radius, j + radius)`.
    #[must_use]
    pub fn window_around(&self, cell: Cell, radius: u32) -> CellWindow {
        let radius = i32::try_from(radius).unwrap_or(i32::MAX);
        CellWindow::new(
            Cell::new(
                cell.i().saturating_sub(radius),
                cell.j().saturating_sub(radius),
            ),
            Cell::new(
                cell.i().saturating_add(radius),
                cell.j().saturating_add(radius),
            ),
        )
    }

    /// Smallest window covering `bounds`, grown by `buffer` cells on every side.
    #[must_use]
    pub fn window_covering(&self, bounds: GeoBounds, buffer: u32) -> CellWindow {
        let buffer = i32::try_from(buffer).unwrap_or(i32::MAX);
        let south_west = bounds.south_west();
        let north_east = bounds.north_east();
        let min_i = self.index_floor(south_west.lat(), self.origin.lat());
        let min_j = self.index_floor(south_west.lng(), self.origin.lng());
        let max_i = self.index_ceil(north_east.lat(), self.origin.lat());
        let max_j = self.index_ceil(north_east.lng(), self.origin.lng());

        CellWindow::new(
            Cell::new(min_i.saturating_sub(buffer), min_j.saturating_sub(buffer)),
            Cell::new(max_i.saturating_add(buffer), max_j.saturating_add(buffer)),
        )
    }

    /// Converts a distance measured in tile widths into meters.
    #[must_use]
    pub fn tiles_to_meters(&self, tiles: f64) -> f64 {
        tiles * self.tile_degrees * METERS_PER_DEGREE
    }

    fn corner(&self, i: i64, j: i64) -> LatLng {
        LatLng::new(
            self.origin.lat() + i as f64 * self.tile_degrees,
            self.origin.lng() + j as f64 * self.tile_degrees,
        )
    }

    fn index_floor(&self, value: f64, origin: f64) -> i32 {
        ((value - origin) / self.tile_degrees).floor() as i32
    }

    fn index_ceil(&self, value: f64, origin: f64) -> i32 {
        ((value - origin) / self.tile_degrees).ceil() as i32
    }
}

/// Great-circle distance between two positions, in meters.
#[must_use]
pub fn distance_meters(from: LatLng, to: LatLng) -> f64 {
    let lat_from = from.lat().to_radians();
    let lat_to = to.lat().to_radians();
    let sin_d_lat = ((to.lat() - from.lat()).to_radians() / 2.0).sin();
    let sin_d_lng = ((to.lng() - from.lng()).to_radians() / 2.0).sin();
    let a = sin_d_lat * sin_d_lat + lat_from.cos() * lat_to.cos() * sin_d_lng * sin_d_lng;
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}
