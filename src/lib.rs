//! Deterministic callsign assignment for special-event schedules.
//!
//! Operators book hour-long slots (date, time, band, mode) and each
//! booking gets one of a small pool of event callsigns. The choice is a
//! pure function of the slot and the configured policy, so the web
//! handler and the batch backfill job converge on the same answer
//! without coordination; the store's uniqueness constraint catches the
//! races determinism cannot.

pub mod assign;
pub mod config;
pub mod display;
pub mod error;
pub mod parser;
pub mod store;

pub use assign::{assign_and_record, backfill_assignments, choose_assigned_call, order_for_slot, pick_from_used};
pub use config::{AssignConfig, StickyPolicy};
pub use error::{AssignError, StoreError};
pub use store::{MemoryScheduleStore, ScheduleRow, ScheduleStore};
