use std::collections::HashSet;

use super::slot_clock::{parse_slot_instant, slot_at_offset};
use super::types::NeighborHint;
use crate::config::{AssignConfig, StickyPolicy};
use crate::store::ScheduleStore;

/// Searches the hours around a slot for a callsign already assigned to
/// the same operator, so a contiguous booking block can keep one call.
///
/// Each direction expands outward from 1 hour away up to `lookaround`
/// and stops at its first match. Store trouble fails open to an empty
/// hint rather than blocking the booking flow.
pub fn find_neighbor_calls(
    config: &AssignConfig,
    store: &dyn ScheduleStore,
    date: &str,
    time: &str,
    operator: &str,
    band: &str,
    mode: &str,
) -> NeighborHint {
    if config.sticky == StickyPolicy::None || config.lookaround == 0 {
        return NeighborHint::default();
    }
    let Ok(instant) = parse_slot_instant(date, time) else {
        return NeighborHint::default();
    };
    let band_mode = match config.sticky {
        StickyPolicy::SameBandMode => Some((band, mode)),
        _ => None,
    };

    let mut hint = NeighborHint::default();
    for distance in 1..=i64::from(config.lookaround) {
        if hint.prev.is_none() {
            let (d, t) = slot_at_offset(&instant, -distance);
            match store.assigned_call_for(&d, &t, operator, band_mode) {
                Ok(found) => hint.prev = found,
                Err(e) => {
                    tracing::warn!(error = %e, "neighbor lookup failed, no preference");
                    return NeighborHint::default();
                }
            }
        }
        if hint.next.is_none() {
            let (d, t) = slot_at_offset(&instant, distance);
            match store.assigned_call_for(&d, &t, operator, band_mode) {
                Ok(found) => hint.next = found,
                Err(e) => {
                    tracing::warn!(error = %e, "neighbor lookup failed, no preference");
                    return NeighborHint::default();
                }
            }
        }
        if hint.prev.is_some() && hint.next.is_some() {
            break;
        }
    }
    hint
}

/// Turns a neighbor hint into a preference for the current slot.
/// `prev` beats `next`: operators inherit from where they came from,
/// which keeps a block stable as it is built forward in time.
pub fn prefer_from_neighbors(hint: &NeighborHint, used: &HashSet<String>) -> Option<String> {
    for candidate in [&hint.prev, &hint.next] {
        if let Some(call) = candidate {
            if !call.is_empty() && !used.contains(call) {
                return Some(call.clone());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::{MemoryScheduleStore, ScheduleRow};

    struct DownStore;

    impl ScheduleStore for DownStore {
        fn used_calls(&self, _: &str, _: &str) -> Result<HashSet<String>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        fn assigned_call_for(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: Option<(&str, &str)>,
        ) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        fn record_assignment(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: &str,
            _: &str,
            _: &str,
        ) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        fn clear_assignments(&self) -> Result<usize, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
    }

    fn row(time: &str, operator: &str, band: &str, mode: &str, call: &str) -> ScheduleRow {
        ScheduleRow {
            date: "2025-01-01".to_string(),
            time: time.to_string(),
            operator: operator.to_string(),
            band: band.to_string(),
            mode: mode.to_string(),
            assigned_call: Some(call.to_string()),
        }
    }

    fn config(lookaround: u32, sticky: StickyPolicy) -> AssignConfig {
        AssignConfig {
            lookaround,
            sticky,
            ..AssignConfig::default()
        }
    }

    #[test]
    fn policy_none_returns_no_hint() {
        let store = MemoryScheduleStore::new(vec![row("01:00:00", "K1ABC", "20m", "CW", "K7C")]);
        let hint = find_neighbor_calls(
            &config(2, StickyPolicy::None),
            &store,
            "2025-01-01",
            "02:00:00",
            "K1ABC",
            "20m",
            "CW",
        );
        assert_eq!(hint, NeighborHint::default());
    }

    #[test]
    fn zero_lookaround_returns_no_hint() {
        let store = MemoryScheduleStore::new(vec![row("01:00:00", "K1ABC", "20m", "CW", "K7C")]);
        let hint = find_neighbor_calls(
            &config(0, StickyPolicy::SameBandMode),
            &store,
            "2025-01-01",
            "02:00:00",
            "K1ABC",
            "20m",
            "CW",
        );
        assert_eq!(hint, NeighborHint::default());
    }

    #[test]
    fn finds_prev_and_next_independently() {
        let store = MemoryScheduleStore::new(vec![
            row("01:00:00", "K1ABC", "20m", "CW", "K7C"),
            row("03:00:00", "K1ABC", "20m", "CW", "N7C"),
        ]);
        let hint = find_neighbor_calls(
            &config(1, StickyPolicy::SameBandMode),
            &store,
            "2025-01-01",
            "02:00:00",
            "K1ABC",
            "20m",
            "CW",
        );
        assert_eq!(hint.prev.as_deref(), Some("K7C"));
        assert_eq!(hint.next.as_deref(), Some("N7C"));
    }

    #[test]
    fn search_expands_up_to_lookaround_and_no_further() {
        let store = MemoryScheduleStore::new(vec![row("01:00:00", "K1ABC", "20m", "CW", "K7C")]);
        let near = find_neighbor_calls(
            &config(3, StickyPolicy::SameBandMode),
            &store,
            "2025-01-01",
            "04:00:00",
            "K1ABC",
            "20m",
            "CW",
        );
        assert_eq!(near.prev.as_deref(), Some("K7C"));
        let far = find_neighbor_calls(
            &config(2, StickyPolicy::SameBandMode),
            &store,
            "2025-01-01",
            "04:00:00",
            "K1ABC",
            "20m",
            "CW",
        );
        assert_eq!(far.prev, None);
    }

    #[test]
    fn same_band_mode_policy_ignores_other_bands() {
        let store = MemoryScheduleStore::new(vec![row("01:00:00", "K1ABC", "40m", "CW", "K7C")]);
        let strict = find_neighbor_calls(
            &config(1, StickyPolicy::SameBandMode),
            &store,
            "2025-01-01",
            "02:00:00",
            "K1ABC",
            "20m",
            "CW",
        );
        assert_eq!(strict.prev, None);
        let any = find_neighbor_calls(
            &config(1, StickyPolicy::SameOperatorAny),
            &store,
            "2025-01-01",
            "02:00:00",
            "K1ABC",
            "20m",
            "CW",
        );
        assert_eq!(any.prev.as_deref(), Some("K7C"));
    }

    #[test]
    fn other_operators_never_match() {
        let store = MemoryScheduleStore::new(vec![row("01:00:00", "W2DEF", "20m", "CW", "K7C")]);
        let hint = find_neighbor_calls(
            &config(1, StickyPolicy::SameOperatorAny),
            &store,
            "2025-01-01",
            "02:00:00",
            "K1ABC",
            "20m",
            "CW",
        );
        assert_eq!(hint, NeighborHint::default());
    }

    #[test]
    fn store_failure_fails_open() {
        let hint = find_neighbor_calls(
            &config(2, StickyPolicy::SameBandMode),
            &DownStore,
            "2025-01-01",
            "02:00:00",
            "K1ABC",
            "20m",
            "CW",
        );
        assert_eq!(hint, NeighborHint::default());
    }

    #[test]
    fn prev_beats_next() {
        let hint = NeighborHint {
            prev: Some("K7A".to_string()),
            next: Some("K7B".to_string()),
        };
        let prefer = prefer_from_neighbors(&hint, &HashSet::new());
        assert_eq!(prefer.as_deref(), Some("K7A"));
    }

    #[test]
    fn used_prev_falls_back_to_next() {
        let hint = NeighborHint {
            prev: Some("K7A".to_string()),
            next: Some("K7B".to_string()),
        };
        let used: HashSet<String> = ["K7A".to_string()].into_iter().collect();
        assert_eq!(prefer_from_neighbors(&hint, &used).as_deref(), Some("K7B"));
        let both: HashSet<String> = ["K7A".to_string(), "K7B".to_string()].into_iter().collect();
        assert_eq!(prefer_from_neighbors(&hint, &both), None);
    }
}
