use std::path::Path;

use serde::{Deserialize, Serialize};

/// How the neighbor search decides whether an adjacent hour belongs to
/// the same booking block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickyPolicy {
    /// No stickiness, every hour rotates independently.
    None,
    /// Adjacent hour must match operator, band, and mode.
    SameBandMode,
    /// Adjacent hour must match operator; band and mode may differ.
    SameOperatorAny,
}

impl Default for StickyPolicy {
    fn default() -> Self {
        StickyPolicy::SameBandMode
    }
}

fn default_daily_step() -> u32 {
    3
}

fn default_extra_bump_hours() -> u32 {
    8
}

fn default_lookaround() -> u32 {
    1
}

/// Callsign pool and rotation policy for one event.
///
/// Loaded from a JSON config file; every field has a default so a partial
/// config still produces a working (if boring) policy. The pool is
/// normalized on load: trimmed, uppercased, empties dropped, duplicates
/// removed keeping the first occurrence. The configured order is the base
/// rotation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignConfig {
    /// The event's special callsigns, in base rotation order.
    #[serde(default)]
    pub callsigns: Vec<String>,
    /// Rotation increment applied once per elapsed day since the anchor.
    #[serde(default = "default_daily_step")]
    pub daily_step: u32,
    /// Every N hours of the day adds one extra rotation step. 0 disables.
    #[serde(default = "default_extra_bump_hours")]
    pub extra_bump_hours: u32,
    /// Mix the mode name into the rotation offset.
    #[serde(default)]
    pub per_mode_salt: bool,
    /// Mix the band name into the rotation offset.
    #[serde(default)]
    pub per_band_salt: bool,
    /// Which adjacent bookings count as the same block.
    #[serde(default)]
    pub sticky: StickyPolicy,
    /// How many hours to search backward and forward for a neighbor.
    #[serde(default = "default_lookaround")]
    pub lookaround: u32,
    /// Event start timestamp. Unset or unparseable falls back to the
    /// UTC epoch; rotation stays deterministic either way.
    #[serde(default)]
    pub anchor: Option<String>,
    /// Let the first row of a backfill block inherit a callsign from a
    /// booking on the far side of a gap. Off reproduces the block-local
    /// behavior.
    #[serde(default)]
    pub inherit_across_gaps: bool,
}

impl Default for AssignConfig {
    fn default() -> Self {
        AssignConfig {
            callsigns: Vec::new(),
            daily_step: default_daily_step(),
            extra_bump_hours: default_extra_bump_hours(),
            per_mode_salt: false,
            per_band_salt: false,
            sticky: StickyPolicy::default(),
            lookaround: default_lookaround(),
            anchor: None,
            inherit_across_gaps: false,
        }
    }
}

impl AssignConfig {
    /// Loads a config from a JSON file and normalizes the callsign pool.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<AssignConfig, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: AssignConfig = serde_json::from_str(&contents)?;
        config.callsigns = normalize_pool(&config.callsigns);
        Ok(config)
    }

    /// Convenience constructor for callers that only care about the pool.
    pub fn with_pool(calls: &[&str]) -> AssignConfig {
        AssignConfig {
            callsigns: normalize_pool(&calls.iter().map(|c| c.to_string()).collect::<Vec<_>>()),
            ..AssignConfig::default()
        }
    }
}

/// Trims, uppercases, drops empties, and dedupes preserving first-seen order.
pub fn normalize_pool(raw: &[String]) -> Vec<String> {
    let mut pool = Vec::new();
    for call in raw {
        let call = call.trim().to_uppercase();
        if call.is_empty() || pool.contains(&call) {
            continue;
        }
        pool.push(call);
    }
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_dedupes_and_uppercases() {
        let raw = vec![
            " k7c ".to_string(),
            "N7C".to_string(),
            "".to_string(),
            "K7C".to_string(),
        ];
        assert_eq!(normalize_pool(&raw), vec!["K7C", "N7C"]);
    }

    #[test]
    fn defaults_match_documented_policy() {
        let config = AssignConfig::default();
        assert_eq!(config.daily_step, 3);
        assert_eq!(config.extra_bump_hours, 8);
        assert_eq!(config.sticky, StickyPolicy::SameBandMode);
        assert_eq!(config.lookaround, 1);
        assert!(!config.per_mode_salt);
        assert!(!config.per_band_salt);
        assert!(!config.inherit_across_gaps);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AssignConfig =
            serde_json::from_str(r#"{"callsigns": ["K7C"], "daily_step": 5}"#).unwrap();
        assert_eq!(config.callsigns, vec!["K7C"]);
        assert_eq!(config.daily_step, 5);
        assert_eq!(config.extra_bump_hours, 8);
        assert_eq!(config.sticky, StickyPolicy::SameBandMode);
    }

    #[test]
    fn sticky_policy_parses_snake_case() {
        let config: AssignConfig =
            serde_json::from_str(r#"{"sticky": "same_operator_any"}"#).unwrap();
        assert_eq!(config.sticky, StickyPolicy::SameOperatorAny);
    }
}
