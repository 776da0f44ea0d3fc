//! Player position model and single-slot inventory.

use geocache_core::{distance_meters, Direction, Grid, LatLng, PlayerConfig};

/// Angular size of one manual movement step along each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MoveStep {
    lat: f64,
    lng: f64,
}

impl MoveStep {
    /// Derives the step from the configured tile count and latitude ratio.
    pub(crate) fn from_config(config: &PlayerConfig, grid: &Grid) -> Self {
        let lng = config.move_tiles * grid.tile_degrees();
        Self {
            lat: lng * config.latitude_step_ratio,
            lng,
        }
    }
}

/// Result of offering a sensor fix to the position model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum FixOutcome {
    /// The fix replaced the base position.
    Accepted {
        /// Whether the fix bypassed jump filtering as the first one received.
        first: bool,
    },
    /// The fix was farther from the base position than the jump threshold.
    Rejected {
        /// Distance between the base position and the fix.
        jump_meters: f64,
    },
}

/// Authoritative player state owned by the world.
#[derive(Clone, Debug)]
pub(crate) struct PlayerState {
    base: LatLng,
    offset_lat: f64,
    offset_lng: f64,
    held: u32,
    has_received_first_fix: bool,
}

impl PlayerState {
    /// Places a new player at the fallback position with empty hands.
    pub(crate) fn new(fallback: LatLng) -> Self {
        Self {
            base: fallback,
            offset_lat: 0.0,
            offset_lng: 0.0,
            held: 0,
            has_received_first_fix: false,
        }
    }

    pub(crate) fn base(&self) -> LatLng {
        self.base
    }

    /// Base position plus the accumulated manual offset.
    pub(crate) fn effective(&self) -> LatLng {
        self.base.translated(self.offset_lat, self.offset_lng)
    }

    pub(crate) fn held(&self) -> u32 {
        self.held
    }

    pub(crate) fn held_mut(&mut self) -> &mut u32 {
        &mut self.held
    }

    pub(crate) fn has_received_first_fix(&self) -> bool {
        self.has_received_first_fix
    }

    /// Accepts or rejects a fix according to the first-fix and jump rules.
    ///
    /// Jumps are measured from the base position; the manual offset plays no
    /// part in sensor filtering.
    ///
    /// Fixes with non-finite coordinates are always rejected, even as the
    /// first fix, and report an infinite jump.
    pub(crate) fn receive_fix(&mut self, fix: LatLng, max_jump_meters: f64) -> FixOutcome {
        if !(fix.lat().is_finite() && fix.lng().is_finite()) {
            return FixOutcome::Rejected {
                jump_meters: f64::INFINITY,
            };
        }

        if !self.has_received_first_fix {
            self.has_received_first_fix = true;
            self.base = fix;
            return FixOutcome::Accepted { first: true };
        }

        let jump_meters = distance_meters(self.base, fix);
        if jump_meters.is_nan() || jump_meters > max_jump_meters {
            return FixOutcome::Rejected { jump_meters };
        }

        self.base = fix;
        FixOutcome::Accepted { first: false }
    }

    /// Adds one movement step to the manual offset.
    pub(crate) fn step(&mut self, direction: Direction, step: MoveStep) {
        match direction {
            Direction::North => self.offset_lat += step.lat,
            Direction::South => self.offset_lat -= step.lat,
            Direction::East => self.offset_lng += step.lng,
            Direction::West => self.offset_lng -= step.lng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step() -> MoveStep {
        MoveStep::from_config(
            &PlayerConfig::default(),
            &Grid::new(1e-4, LatLng::new(0.0, 0.0)),
        )
    }

    #[test]
    fn latitude_step_is_half_the_longitude_step() {
        let step = step();
        assert!((step.lng - 5e-4).abs() < 1e-12);
        assert!((step.lat - 2.5e-4).abs() < 1e-12);
    }

    #[test]
    fn first_fix_bypasses_jump_filter() {
        let mut player = PlayerState::new(LatLng::new(0.0, 0.0));
        let outcome = player.receive_fix(LatLng::new(45.0, 45.0), 100.0);

        assert_eq!(outcome, FixOutcome::Accepted { first: true });
        assert_eq!(player.base(), LatLng::new(45.0, 45.0));
        assert!(player.has_received_first_fix());
    }

    #[test]
    fn distant_follow_up_fix_is_rejected() {
        let mut player = PlayerState::new(LatLng::new(0.0, 0.0));
        let _ = player.receive_fix(LatLng::new(10.0, 10.0), 100.0);
        let outcome = player.receive_fix(LatLng::new(10.01, 10.0), 100.0);

        assert!(matches!(outcome, FixOutcome::Rejected { jump_meters } if jump_meters > 1_000.0));
        assert_eq!(player.base(), LatLng::new(10.0, 10.0));
    }

    #[test]
    fn non_finite_fix_is_rejected_even_first() {
        let mut player = PlayerState::new(LatLng::new(1.0, 1.0));
        let outcome = player.receive_fix(LatLng::new(f64::NAN, 1.0), 100.0);

        assert_eq!(
            outcome,
            FixOutcome::Rejected {
                jump_meters: f64::INFINITY
            }
        );
        assert!(!player.has_received_first_fix());
        assert_eq!(player.base(), LatLng::new(1.0, 1.0));

        let _ = player.receive_fix(LatLng::new(2.0, 2.0), 100.0);
        let outcome = player.receive_fix(LatLng::new(2.0, f64::NEG_INFINITY), 100.0);
        assert!(matches!(outcome, FixOutcome::Rejected { .. }));
        assert_eq!(player.base(), LatLng::new(2.0, 2.0));
    }

    #[test]
    fn offset_survives_accepted_fixes() {
        let mut player = PlayerState::new(LatLng::new(0.0, 0.0));
        player.step(Direction::East, step());
        player.step(Direction::North, step());
        let _ = player.receive_fix(LatLng::new(1.0, 2.0), 100.0);

        let effective = player.effective();
        assert!((effective.lat() - (1.0 + 2.5e-4)).abs() < 1e-12);
        assert!((effective.lng() - (2.0 + 5e-4)).abs() < 1e-12);
    }

    #[test]
    fn opposite_steps_cancel() {
        let mut player = PlayerState::new(LatLng::new(3.0, 4.0));
        for direction in [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ] {
            player.step(direction, step());
        }
        let effective = player.effective();
        assert!((effective.lat() - 3.0).abs() < 1e-12);
        assert!((effective.lng() - 4.0).abs() < 1e-12);
    }
}
