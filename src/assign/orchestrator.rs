use std::collections::{HashMap, HashSet};

use super::neighbors::{find_neighbor_calls, prefer_from_neighbors};
use super::picker::pick_from_order;
use super::rotation::order_for_slot;
use super::slot_clock::{calculate_slot_indices, canonical_slot, parse_anchor};
use super::types::{BackfillOptions, BackfillReport, RowAssignment};
use crate::config::AssignConfig;
use crate::error::{AssignError, StoreError};
use crate::store::{ScheduleRow, ScheduleStore};

/// Chooses a callsign for a slot from an explicit `used` set, without
/// touching the store. This is the composition of the rotation order and
/// the availability pick, exposed for callers that already know the slot
/// occupancy (and for previews).
pub fn pick_from_used(
    config: &AssignConfig,
    date: &str,
    time: &str,
    used: &HashSet<String>,
    mode: Option<&str>,
    band: Option<&str>,
    prefer: Option<&str>,
) -> Result<Option<String>, AssignError> {
    let order = order_for_slot(config, date, time, mode, band)?;
    Ok(pick_from_order(&order, used, prefer))
}

/// Chooses a callsign for a new booking: reads the slot's used set,
/// derives a stickiness preference from the neighboring hours, and picks
/// from the slot's rotation order. `None` means the hour has no free
/// callsign left.
pub fn choose_assigned_call(
    config: &AssignConfig,
    store: &dyn ScheduleStore,
    date: &str,
    time: &str,
    operator: &str,
    band: &str,
    mode: &str,
) -> Result<Option<String>, AssignError> {
    let (date, time) = canonical_slot(date, time)?;
    let used = store.used_calls(&date, &time)?;
    let hint = find_neighbor_calls(config, store, &date, &time, operator, band, mode);
    let prefer = prefer_from_neighbors(&hint, &used);
    let order = order_for_slot(config, &date, &time, Some(mode), Some(band))?;
    Ok(pick_from_order(&order, &used, prefer.as_deref()))
}

/// Chooses a callsign and writes it onto the booking's row.
///
/// Determinism does not prevent races: two simultaneous bookings can
/// both read `used` before either writes. The store's uniqueness
/// constraint detects the lost race as a `Conflict`, and this path
/// retries exactly once with a fresh read and no preference. A second
/// conflict surfaces as `None`, the same as an exhausted pool.
pub fn assign_and_record(
    config: &AssignConfig,
    store: &dyn ScheduleStore,
    date: &str,
    time: &str,
    operator: &str,
    band: &str,
    mode: &str,
) -> Result<Option<String>, AssignError> {
    let (date, time) = canonical_slot(date, time)?;
    let Some(call) = choose_assigned_call(config, store, &date, &time, operator, band, mode)?
    else {
        return Ok(None);
    };
    match store.record_assignment(&date, &time, operator, band, mode, &call) {
        Ok(()) => Ok(Some(call)),
        Err(StoreError::Conflict { .. }) => {
            tracing::debug!(%date, %time, %call, "lost the slot race, retrying without preference");
            let used = store.used_calls(&date, &time)?;
            let order = order_for_slot(config, &date, &time, Some(mode), Some(band))?;
            let Some(retry) = pick_from_order(&order, &used, None) else {
                return Ok(None);
            };
            match store.record_assignment(&date, &time, operator, band, mode, &retry) {
                Ok(()) => Ok(Some(retry)),
                Err(StoreError::Conflict { .. }) => Ok(None),
                Err(e) => Err(e.into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// A group key for backfill: rows for one operator on one band and mode.
type GroupKey = (String, String, String);

/// Recomputes assigned callsigns for a set of historical schedule rows.
///
/// Rows are grouped by (operator, band, mode), each group sorted
/// chronologically and walked in maximal runs of contiguous hours; a run
/// breaks whenever the gap between consecutive rows is not exactly one
/// hour. The first callsign in a run anchors the block and is preferred
/// for every later row in the run. Rows that already carry a callsign
/// keep it and anchor their block.
///
/// Choices made during this pass join an in-memory used set immediately,
/// so one pass never hands the same callsign to two rows sharing a slot,
/// and `used` is re-read from the store before every decision so a
/// concurrent live booking is seen mid-run.
pub fn backfill_assignments(
    config: &AssignConfig,
    store: &dyn ScheduleStore,
    rows: &[ScheduleRow],
    options: &BackfillOptions,
) -> Result<BackfillReport, AssignError> {
    let anchor = parse_anchor(config.anchor.as_deref());
    let mut report = BackfillReport {
        committed: options.commit,
        ..BackfillReport::default()
    };

    // Group rows by (operator, band, mode), keeping each row's hour index
    // for sorting and gap detection. Rows with unparseable slots are
    // skipped rather than failing the whole pass.
    let mut groups: HashMap<GroupKey, Vec<(i64, ScheduleRow)>> = HashMap::new();
    for row in rows {
        let indices = match calculate_slot_indices(&row.date, &row.time, &anchor) {
            Ok(indices) => indices,
            Err(e) => {
                tracing::warn!(error = %e, date = %row.date, time = %row.time, "skipping row");
                report.skipped += 1;
                continue;
            }
        };
        let (date, time) = canonical_slot(&row.date, &row.time)?;
        let key = (
            row.operator.to_uppercase(),
            row.band.to_uppercase(),
            row.mode.to_uppercase(),
        );
        let mut row = row.clone();
        row.date = date;
        row.time = time;
        groups.entry(key).or_default().push((indices.hour_index, row));
    }

    // A fixed pass order keeps backfill reproducible run to run.
    let mut group_keys: Vec<GroupKey> = groups.keys().cloned().collect();
    group_keys.sort();

    let mut pass_used: HashMap<(String, String), HashSet<String>> = HashMap::new();

    for key in group_keys {
        let mut group = groups.remove(&key).unwrap_or_default();
        group.sort_by_key(|(hour, _)| *hour);

        let mut block_call: Option<String> = None;
        let mut prev_hour: Option<i64> = None;

        for (hour, row) in group {
            // A gap that is not exactly one hour starts a new block.
            if prev_hour.is_some_and(|p| hour - p != 1) {
                block_call = None;
            }
            prev_hour = Some(hour);
            let slot_key = (row.date.clone(), row.time.clone());

            // An existing assignment is kept and anchors the block.
            if let Some(existing) = &row.assigned_call {
                let existing = existing.to_uppercase();
                if block_call.is_none() {
                    block_call = Some(existing.clone());
                }
                pass_used.entry(slot_key).or_default().insert(existing.clone());
                report.kept += 1;
                report.rows.push(RowAssignment {
                    date: row.date.clone(),
                    time: row.time.clone(),
                    operator: row.operator.clone(),
                    band: row.band.clone(),
                    mode: row.mode.clone(),
                    assigned_call: Some(existing),
                    kept_existing: true,
                });
                continue;
            }

            // Fresh view of the slot: the store plus this pass's choices.
            let mut used = store.used_calls(&row.date, &row.time)?;
            if let Some(extra) = pass_used.get(&slot_key) {
                used.extend(extra.iter().cloned());
            }

            let prefer = match &block_call {
                Some(call) => Some(call.clone()),
                None if config.inherit_across_gaps => {
                    let hint = find_neighbor_calls(
                        config,
                        store,
                        &row.date,
                        &row.time,
                        &row.operator,
                        &row.band,
                        &row.mode,
                    );
                    prefer_from_neighbors(&hint, &used)
                }
                None => None,
            };

            let order = order_for_slot(config, &row.date, &row.time, Some(&row.mode), Some(&row.band))?;
            let mut choice = pick_from_order(&order, &used, prefer.as_deref());

            if options.commit {
                if let Some(call) = choice.clone() {
                    choice = commit_row(store, &row, &order, call, &pass_used, &mut report)?;
                }
            }

            match &choice {
                Some(call) => {
                    if block_call.is_none() {
                        block_call = Some(call.clone());
                    }
                    pass_used.entry(slot_key).or_default().insert(call.clone());
                    report.assigned += 1;
                }
                None => report.unassigned += 1,
            }
            report.rows.push(RowAssignment {
                date: row.date.clone(),
                time: row.time.clone(),
                operator: row.operator.clone(),
                band: row.band.clone(),
                mode: row.mode.clone(),
                assigned_call: choice,
                kept_existing: false,
            });
        }
    }

    Ok(report)
}

/// Writes one backfill choice, retrying once on a uniqueness conflict
/// with a fresh used set and no preference.
fn commit_row(
    store: &dyn ScheduleStore,
    row: &ScheduleRow,
    order: &[String],
    call: String,
    pass_used: &HashMap<(String, String), HashSet<String>>,
    report: &mut BackfillReport,
) -> Result<Option<String>, AssignError> {
    match store.record_assignment(&row.date, &row.time, &row.operator, &row.band, &row.mode, &call) {
        Ok(()) => Ok(Some(call)),
        Err(StoreError::Conflict { .. }) => {
            report.conflicts_retried += 1;
            let mut used = store.used_calls(&row.date, &row.time)?;
            if let Some(extra) = pass_used.get(&(row.date.clone(), row.time.clone())) {
                used.extend(extra.iter().cloned());
            }
            let Some(retry) = pick_from_order(order, &used, None) else {
                return Ok(None);
            };
            match store.record_assignment(
                &row.date,
                &row.time,
                &row.operator,
                &row.band,
                &row.mode,
                &retry,
            ) {
                Ok(()) => Ok(Some(retry)),
                Err(StoreError::Conflict { .. }) => Ok(None),
                Err(e) => Err(e.into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}
