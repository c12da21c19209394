pub mod types;
pub mod slot_clock;
pub mod rotation;
pub mod picker;
pub mod neighbors;
pub mod orchestrator;

pub use types::{BackfillOptions, BackfillReport, NeighborHint, RowAssignment};
pub use rotation::order_for_slot;
pub use picker::pick_from_order;
pub use neighbors::find_neighbor_calls;
pub use orchestrator::{assign_and_record, backfill_assignments, choose_assigned_call, pick_from_used};
