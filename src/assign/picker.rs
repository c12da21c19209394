use std::collections::HashSet;

/// Chooses one callsign from a rotation order, given the set already
/// taken in this exact slot.
///
/// A preferred callsign wins immediately when it is not taken; this is
/// the stickiness short-circuit that keeps an operator on one call
/// through a contiguous block. Otherwise the order is scanned in
/// sequence. `None` means every candidate is taken, a normal outcome
/// when the hour oversubscribes the pool.
pub fn pick_from_order(
    order: &[String],
    used: &HashSet<String>,
    prefer: Option<&str>,
) -> Option<String> {
    if let Some(prefer) = prefer {
        if !prefer.is_empty() && !used.contains(prefer) {
            return Some(prefer.to_string());
        }
    }
    order.iter().find(|call| !used.contains(*call)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(calls: &[&str]) -> Vec<String> {
        calls.iter().map(|c| c.to_string()).collect()
    }

    fn used(calls: &[&str]) -> HashSet<String> {
        calls.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn free_preference_wins_over_the_order() {
        let pick = pick_from_order(&order(&["K7A", "K7B"]), &used(&[]), Some("K7B"));
        assert_eq!(pick.as_deref(), Some("K7B"));
    }

    #[test]
    fn taken_preference_falls_through_to_the_scan() {
        let pick = pick_from_order(&order(&["K7A", "K7B"]), &used(&["K7A"]), Some("K7A"));
        assert_eq!(pick.as_deref(), Some("K7B"));
    }

    #[test]
    fn empty_preference_is_no_preference() {
        let pick = pick_from_order(&order(&["K7A"]), &used(&[]), Some(""));
        assert_eq!(pick.as_deref(), Some("K7A"));
    }

    #[test]
    fn scan_returns_first_free_entry() {
        let pick = pick_from_order(&order(&["K7A", "K7B", "K7C"]), &used(&["K7A"]), None);
        assert_eq!(pick.as_deref(), Some("K7B"));
    }

    #[test]
    fn exhausted_order_returns_none() {
        let pick = pick_from_order(&order(&["K7A", "K7B"]), &used(&["K7A", "K7B"]), None);
        assert_eq!(pick, None);
        assert_eq!(pick_from_order(&[], &used(&[]), None), None);
    }

    #[test]
    fn folding_results_back_into_used_never_collides() {
        let order = order(&["K7A", "K7B", "K7C", "K7D"]);
        let mut used = used(&[]);
        let mut seen = Vec::new();
        while let Some(call) = pick_from_order(&order, &used, None) {
            assert!(!seen.contains(&call), "{} returned twice", call);
            used.insert(call.clone());
            seen.push(call);
        }
        assert_eq!(seen.len(), 4);
    }
}
