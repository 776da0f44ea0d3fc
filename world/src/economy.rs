//! Two-party ledger rules between the player's hands and a single cache.

use geocache_core::{CacheAction, TransitionError};

/// Balances of one interaction: the player's held value and the cache value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ledger {
    pub(crate) held: u32,
    pub(crate) cache: u32,
}

impl Ledger {
    /// Largest balance on either side, compared against the victory threshold.
    pub(crate) fn peak(&self) -> u32 {
        self.held.max(self.cache)
    }
}

/// Applies `action` to the ledger, leaving it untouched on rejection.
///
/// Returns the amount that moved (or was destroyed) on success.
pub(crate) fn transition(ledger: &mut Ledger, action: CacheAction) -> Result<u32, TransitionError> {
    match action {
        CacheAction::Take => take(ledger),
        CacheAction::Place => place(ledger),
        CacheAction::Destroy => destroy(ledger),
    }
}

fn take(ledger: &mut Ledger) -> Result<u32, TransitionError> {
    if ledger.cache == 0 {
        return Err(TransitionError::Depleted);
    }
    if ledger.held != 0 && ledger.held != ledger.cache {
        return Err(TransitionError::HandsFull);
    }

    let amount = ledger.cache;
    ledger.held = ledger
        .held
        .checked_add(amount)
        .ok_or(TransitionError::StackOverflow)?;
    ledger.cache = 0;
    Ok(amount)
}

fn place(ledger: &mut Ledger) -> Result<u32, TransitionError> {
    if ledger.held == 0 {
        return Err(TransitionError::NoPointsHeld);
    }
    if ledger.cache != 0 && ledger.cache != ledger.held {
        return Err(TransitionError::DenominationMismatch);
    }

    let amount = ledger.held;
    ledger.cache = ledger
        .cache
        .checked_add(amount)
        .ok_or(TransitionError::StackOverflow)?;
    ledger.held = 0;
    Ok(amount)
}

fn destroy(ledger: &mut Ledger) -> Result<u32, TransitionError> {
    if ledger.cache == 0 {
        return Err(TransitionError::AlreadyEmpty);
    }

    let discarded = ledger.cache;
    ledger.cache = 0;
    Ok(discarded)
}

/// Reports whether a transition carried the ledger across `threshold`.
pub(crate) fn crossed_threshold(before: Ledger, after: Ledger, threshold: u32) -> bool {
    before.peak() < threshold && after.peak() >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(held: u32, cache: u32) -> Ledger {
        Ledger { held, cache }
    }

    fn attempt(
        held: u32,
        cache: u32,
        action: CacheAction,
    ) -> (Result<u32, TransitionError>, Ledger) {
        let mut state = ledger(held, cache);
        let result = transition(&mut state, action);
        (result, state)
    }

    #[test]
    fn take_moves_full_value_into_empty_hands() {
        assert_eq!(attempt(0, 4, CacheAction::Take), (Ok(4), ledger(4, 0)));
    }

    #[test]
    fn take_stacks_matching_denomination() {
        assert_eq!(attempt(8, 8, CacheAction::Take), (Ok(8), ledger(16, 0)));
    }

    #[test]
    fn take_rejects_mismatched_denomination() {
        assert_eq!(
            attempt(2, 8, CacheAction::Take),
            (Err(TransitionError::HandsFull), ledger(2, 8))
        );
    }

    #[test]
    fn take_rejects_depleted_cache_even_with_empty_hands() {
        assert_eq!(
            attempt(0, 0, CacheAction::Take),
            (Err(TransitionError::Depleted), ledger(0, 0))
        );
    }

    #[test]
    fn place_fills_empty_cache() {
        assert_eq!(attempt(4, 0, CacheAction::Place), (Ok(4), ledger(0, 4)));
    }

    #[test]
    fn place_doubles_matching_cache() {
        assert_eq!(attempt(2, 2, CacheAction::Place), (Ok(2), ledger(0, 4)));
    }

    #[test]
    fn place_rejects_mismatched_cache() {
        assert_eq!(
            attempt(8, 2, CacheAction::Place),
            (Err(TransitionError::DenominationMismatch), ledger(8, 2))
        );
    }

    #[test]
    fn place_rejects_empty_hands() {
        assert_eq!(
            attempt(0, 2, CacheAction::Place),
            (Err(TransitionError::NoPointsHeld), ledger(0, 2))
        );
    }

    #[test]
    fn overflowing_stacks_are_rejected_untouched() {
        let top = 1u32 << 31;
        assert_eq!(
            attempt(top, top, CacheAction::Take),
            (Err(TransitionError::StackOverflow), ledger(top, top))
        );
        assert_eq!(
            attempt(top, top, CacheAction::Place),
            (Err(TransitionError::StackOverflow), ledger(top, top))
        );
        assert_eq!(
            attempt(1 << 30, 1 << 30, CacheAction::Place),
            (Ok(1 << 30), ledger(0, top))
        );
    }

    #[test]
    fn destroy_discards_value_without_touching_hands() {
        assert_eq!(attempt(2, 8, CacheAction::Destroy), (Ok(8), ledger(2, 0)));
    }

    #[test]
    fn destroy_rejects_empty_cache() {
        assert_eq!(
            attempt(2, 0, CacheAction::Destroy),
            (Err(TransitionError::AlreadyEmpty), ledger(2, 0))
        );
    }

    #[test]
    fn threshold_crossing_detected_once() {
        let before = ledger(32, 32);
        let after = ledger(64, 0);
        assert!(crossed_threshold(before, after, 64));

        let placed = ledger(0, 64);
        assert!(!crossed_threshold(after, placed, 64));
    }

    #[test]
    fn cache_side_counts_toward_threshold() {
        assert!(crossed_threshold(ledger(32, 32), ledger(0, 64), 64));
    }
}
