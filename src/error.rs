use thiserror::Error;

/// Failures reported by the schedule store collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached or answered garbage.
    #[error("schedule store unavailable: {0}")]
    Unavailable(String),

    /// Another writer already holds this callsign in this slot.
    /// The uniqueness constraint is (date, time, assigned_call).
    #[error("callsign {call} already assigned at {date} {time}")]
    Conflict {
        date: String,
        time: String,
        call: String,
    },
}

/// Failures of a single assignment decision.
///
/// Pool exhaustion is not an error: an oversubscribed hour surfaces as
/// a `None` assignment, and the caller decides what to do with the booking.
#[derive(Error, Debug)]
pub enum AssignError {
    /// Unparseable slot date/time. Caller bug, never retried.
    #[error("invalid slot: {0}")]
    InvalidSlot(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
