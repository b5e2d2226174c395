//! Crawldash core: job model, query codec and the pure list/poll state machine.
mod detail;
mod effect;
mod error;
mod job;
mod msg;
mod poll;
mod query;
mod state;
mod store;
mod update;
mod validate;
mod view_model;

pub use detail::{DetailRequest, DetailState};
pub use effect::{Effect, ListMode};
pub use error::{FailureKind, QueryError, RequestError, ValidationError};
pub use job::{BrokenLink, HeadingCounts, Job, JobDetail, JobId, JobStatus};
pub use msg::Msg;
pub use poll::{
    PollCommand, PollScheduler, StateChange, DEFAULT_POLL_INTERVAL, POLL_INTERVAL_PRESETS,
};
pub use query::{
    ListResponse, PaginationInfo, Query, SortField, SortOrder, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use state::AppState;
pub use store::JobStore;
pub use update::update;
pub use validate::validate_job_url;
pub use view_model::{AppViewModel, JobRowView, PollingView};
