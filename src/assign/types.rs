use serde::{Deserialize, Serialize};

/// Hour and day counters for one bookable slot, relative to the event anchor.
/// Both are signed: slots before the anchor go negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotIndices {
    pub hour_index: i64,
    pub day_index: i64,
    /// UTC hour of day, 0-23.
    pub hour_of_day: u32,
}

/// Callsigns found in the adjacent hour slots for the same operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborHint {
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Outcome of one schedule row in a backfill pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowAssignment {
    pub date: String,
    pub time: String,
    pub operator: String,
    pub band: String,
    pub mode: String,
    /// None means the pool was exhausted for this hour.
    pub assigned_call: Option<String>,
    /// The row already had a callsign and it was left alone.
    pub kept_existing: bool,
}

/// Summary of a whole backfill pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackfillReport {
    pub rows: Vec<RowAssignment>,
    pub assigned: u32,
    pub kept: u32,
    pub unassigned: u32,
    pub skipped: u32,
    pub conflicts_retried: u32,
    pub committed: bool,
}

/// Knobs for a backfill pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackfillOptions {
    /// Write choices back to the store. Off computes the report only.
    pub commit: bool,
}
