use crc32c::crc32c;

use super::slot_clock::{calculate_slot_indices, parse_anchor};
use super::types::SlotIndices;
use crate::config::AssignConfig;
use crate::error::AssignError;

/// Stable 32-bit salt for a tagged name. This is crc32c (Castagnoli);
/// changing the checksum changes every assignment for existing events.
fn salt32(tag: &str, value: &str) -> u32 {
    crc32c(format!("{}:{}", tag, value).as_bytes())
}

/// Computes the rotation offset for a slot, normalized into [0, n).
///
/// The offset is the sum of:
/// 1. the hour index mod n
/// 2. one extra step per `extra_bump_hours` hours of the day (if enabled)
/// 3. the day index times (daily_step mod n), mod n
/// 4. optional mode and band salts
/// The final sum is floored-mod n, so it is never negative even for
/// pre-anchor slots.
pub fn rotation_offset(
    config: &AssignConfig,
    indices: &SlotIndices,
    mode: Option<&str>,
    band: Option<&str>,
    pool_size: usize,
) -> usize {
    let n = pool_size as i64;
    let mut offset = indices.hour_index.rem_euclid(n);

    if config.extra_bump_hours > 0 {
        offset += (indices.hour_of_day / config.extra_bump_hours) as i64;
    }

    offset += (indices.day_index * (config.daily_step as i64).rem_euclid(n)).rem_euclid(n);

    if config.per_mode_salt {
        if let Some(mode) = mode.map(str::trim).filter(|m| !m.is_empty()) {
            offset += (salt32("mode", &mode.to_uppercase()) as i64) % n;
        }
    }
    if config.per_band_salt {
        if let Some(band) = band.map(str::trim).filter(|b| !b.is_empty()) {
            offset += (salt32("band", &band.to_lowercase()) as i64) % n;
        }
    }

    offset.rem_euclid(n) as usize
}

/// Produces the full rotation order of the callsign pool for a slot.
///
/// Identical inputs always yield an identical sequence; independent
/// processes converge on the same order with no coordination. An empty
/// pool yields an empty order, never an error.
pub fn order_for_slot(
    config: &AssignConfig,
    date: &str,
    time: &str,
    mode: Option<&str>,
    band: Option<&str>,
) -> Result<Vec<String>, AssignError> {
    if config.callsigns.is_empty() {
        return Ok(Vec::new());
    }

    let anchor = parse_anchor(config.anchor.as_deref());
    let indices = calculate_slot_indices(date, time, &anchor)?;
    let offset = rotation_offset(config, &indices, mode, band, config.callsigns.len());
    tracing::debug!(date, time, offset, "rotation order computed");

    let mut order = config.callsigns.clone();
    order.rotate_left(offset);
    Ok(order)
}
