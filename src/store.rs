use std::collections::HashSet;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// One bookable hour on the schedule, as stored by the scheduling side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub date: String,
    pub time: String,
    pub operator: String,
    pub band: String,
    pub mode: String,
    pub assigned_call: Option<String>,
}

/// The narrow view of the schedule table the assignment engine needs.
///
/// Implementations must serve fresh reads (no caching across calls) and
/// must reject a duplicate (date, time, assigned_call) write with
/// `StoreError::Conflict` instead of silently accepting it.
pub trait ScheduleStore {
    /// All non-null assigned callsigns on record for this exact slot.
    fn used_calls(&self, date: &str, time: &str) -> Result<HashSet<String>, StoreError>;

    /// The assigned callsign for this operator in this exact slot, if any.
    /// When `band_mode` is given, the row must also match band and mode.
    fn assigned_call_for(
        &self,
        date: &str,
        time: &str,
        operator: &str,
        band_mode: Option<(&str, &str)>,
    ) -> Result<Option<String>, StoreError>;

    /// Writes the chosen callsign onto the operator's row for this slot,
    /// creating the row if the booking does not exist yet.
    fn record_assignment(
        &self,
        date: &str,
        time: &str,
        operator: &str,
        band: &str,
        mode: &str,
        call: &str,
    ) -> Result<(), StoreError>;

    /// Blanks every assigned callsign. Returns how many were cleared.
    fn clear_assignments(&self) -> Result<usize, StoreError>;
}

/// In-memory schedule rows behind a mutex. Stands in for the production
/// database in the batch driver and the tests, and enforces the same
/// uniqueness rule the database constraint would.
pub struct MemoryScheduleStore {
    rows: Mutex<Vec<ScheduleRow>>,
}

/// Pads HH:MM to HH:MM:SS so slot comparisons don't depend on how the
/// caller wrote the seconds.
fn normalize_time(time: &str) -> String {
    let time = time.trim();
    if time.len() == 5 && time.as_bytes()[2] == b':' {
        format!("{}:00", time)
    } else {
        time.to_string()
    }
}

fn same_slot(row: &ScheduleRow, date: &str, time: &str) -> bool {
    row.date.trim() == date.trim() && normalize_time(&row.time) == normalize_time(time)
}

impl MemoryScheduleStore {
    pub fn new(rows: Vec<ScheduleRow>) -> MemoryScheduleStore {
        MemoryScheduleStore {
            rows: Mutex::new(rows),
        }
    }

    pub fn empty() -> MemoryScheduleStore {
        MemoryScheduleStore::new(Vec::new())
    }

    /// Copy of the current rows, for reporting and test assertions.
    pub fn snapshot(&self) -> Vec<ScheduleRow> {
        match self.rows.lock() {
            Ok(rows) => rows.clone(),
            Err(_) => Vec::new(),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<ScheduleRow>>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Unavailable("schedule rows lock poisoned".to_string()))
    }
}

impl ScheduleStore for MemoryScheduleStore {
    fn used_calls(&self, date: &str, time: &str) -> Result<HashSet<String>, StoreError> {
        let rows = self.lock()?;
        Ok(rows
            .iter()
            .filter(|r| same_slot(r, date, time))
            .filter_map(|r| r.assigned_call.as_ref())
            .map(|c| c.to_uppercase())
            .collect())
    }

    fn assigned_call_for(
        &self,
        date: &str,
        time: &str,
        operator: &str,
        band_mode: Option<(&str, &str)>,
    ) -> Result<Option<String>, StoreError> {
        let rows = self.lock()?;
        Ok(rows
            .iter()
            .filter(|r| same_slot(r, date, time))
            .filter(|r| r.operator.eq_ignore_ascii_case(operator))
            .filter(|r| match band_mode {
                Some((band, mode)) => {
                    r.band.eq_ignore_ascii_case(band) && r.mode.eq_ignore_ascii_case(mode)
                }
                None => true,
            })
            .find_map(|r| r.assigned_call.as_ref())
            .map(|c| c.to_uppercase()))
    }

    fn record_assignment(
        &self,
        date: &str,
        time: &str,
        operator: &str,
        band: &str,
        mode: &str,
        call: &str,
    ) -> Result<(), StoreError> {
        let call = call.to_uppercase();
        let mut rows = self.lock()?;

        // Uniqueness check: at most one row per (date, time, assigned_call).
        // Re-writing the same call onto the same operator's row is fine.
        let taken_by_other = rows.iter().any(|r| {
            same_slot(r, date, time)
                && r.assigned_call.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(&call))
                && !(r.operator.eq_ignore_ascii_case(operator)
                    && r.band.eq_ignore_ascii_case(band)
                    && r.mode.eq_ignore_ascii_case(mode))
        });
        if taken_by_other {
            return Err(StoreError::Conflict {
                date: date.to_string(),
                time: time.to_string(),
                call,
            });
        }

        let existing = rows.iter_mut().find(|r| {
            same_slot(r, date, time)
                && r.operator.eq_ignore_ascii_case(operator)
                && r.band.eq_ignore_ascii_case(band)
                && r.mode.eq_ignore_ascii_case(mode)
        });
        match existing {
            Some(row) => row.assigned_call = Some(call),
            None => rows.push(ScheduleRow {
                date: date.to_string(),
                time: normalize_time(time),
                operator: operator.to_uppercase(),
                band: band.to_string(),
                mode: mode.to_string(),
                assigned_call: Some(call),
            }),
        }
        Ok(())
    }

    fn clear_assignments(&self) -> Result<usize, StoreError> {
        let mut rows = self.lock()?;
        let mut cleared = 0;
        for row in rows.iter_mut() {
            if row.assigned_call.take().is_some() {
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}
