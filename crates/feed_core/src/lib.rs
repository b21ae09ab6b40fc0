//! Feed core: pure ranking, view-window and reconciliation state.
mod op;
mod reconcile;
mod snapshot;
mod state;
mod status;
mod story;

pub use op::Operation;
pub use reconcile::{plan_refresh, PlannedFetch, RefreshPlan};
pub use snapshot::SnapshotEntry;
pub use state::{FeedState, PageRequest, RankedSlot, DEFAULT_PAGE_SIZE};
pub use status::Status;
pub use story::{Story, StoryId};
