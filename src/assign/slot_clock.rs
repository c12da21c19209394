use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use super::types::SlotIndices;
use crate::error::AssignError;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%H%M%S"];

/// Parses a (date, time) pair into a UTC instant.
/// Accepts dashed or compact dates and times with or without seconds.
pub fn parse_slot_instant(date: &str, time: &str) -> Result<DateTime<Utc>, AssignError> {
    let date = date.trim();
    let time = time.trim();
    let d = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(date, f).ok())
        .ok_or_else(|| AssignError::InvalidSlot(format!("unparseable date {:?}", date)))?;
    let t = TIME_FORMATS
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(time, f).ok())
        .ok_or_else(|| AssignError::InvalidSlot(format!("unparseable time {:?}", time)))?;
    Ok(d.and_time(t).and_utc())
}

/// Parses the configured event anchor. Unset or unparseable falls back to
/// the UTC epoch, so rotation stays deterministic without configuration.
pub fn parse_anchor(anchor: Option<&str>) -> DateTime<Utc> {
    let Some(anchor) = anchor.map(str::trim).filter(|a| !a.is_empty()) else {
        return DateTime::<Utc>::UNIX_EPOCH;
    };
    if let Ok(instant) = DateTime::parse_from_rfc3339(anchor) {
        return instant.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(anchor, "%Y-%m-%d %H:%M:%S") {
        return naive.and_utc();
    }
    if let Ok(date) = NaiveDate::parse_from_str(anchor, "%Y-%m-%d") {
        return date.and_time(NaiveTime::MIN).and_utc();
    }
    tracing::warn!(anchor, "unparseable anchor, falling back to epoch");
    DateTime::<Utc>::UNIX_EPOCH
}

/// Maps a slot to its hour-index and day-index counters relative to the
/// anchor. Division is floored, so pre-anchor slots round toward negative
/// infinity instead of truncating toward zero.
pub fn calculate_slot_indices(
    date: &str,
    time: &str,
    anchor: &DateTime<Utc>,
) -> Result<SlotIndices, AssignError> {
    let instant = parse_slot_instant(date, time)?;
    let delta = instant.signed_duration_since(*anchor).num_seconds();
    Ok(SlotIndices {
        hour_index: delta.div_euclid(3600),
        day_index: delta.div_euclid(86400),
        hour_of_day: instant.hour(),
    })
}

/// Canonical string forms for a slot: YYYY-MM-DD and HH:MM:SS.
pub fn canonical_slot(date: &str, time: &str) -> Result<(String, String), AssignError> {
    let instant = parse_slot_instant(date, time)?;
    Ok(format_slot(&instant))
}

/// Formats an instant back into the canonical (date, time) pair.
pub fn format_slot(instant: &DateTime<Utc>) -> (String, String) {
    (
        instant.format("%Y-%m-%d").to_string(),
        instant.format("%H:%M:%S").to_string(),
    )
}

/// The slot exactly `hours` hours away (negative for earlier slots).
pub fn slot_at_offset(instant: &DateTime<Utc>, hours: i64) -> (String, String) {
    format_slot(&(*instant + Duration::hours(hours)))
}
