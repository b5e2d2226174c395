use std::time::Duration;

use crate::{Job, JobId, ListMode, ListResponse, Query, RequestError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User changed page, sort, search or filter.
    ListRequested { query: Query },
    /// Poll timer fired.
    PollTick,
    /// A list request came back.
    ListFinished {
        seq: u64,
        query: Query,
        mode: ListMode,
        result: Result<ListResponse, RequestError>,
    },
    /// User submitted a new, already validated URL.
    AddRequested { url: String, auto_start: bool },
    AddFinished {
        seq: u64,
        auto_start: bool,
        result: Result<Job, RequestError>,
    },
    StartRequested { job_id: JobId },
    StartFinished {
        seq: u64,
        job_id: JobId,
        result: Result<(), RequestError>,
    },
    StopRequested { job_id: JobId },
    StopFinished {
        seq: u64,
        job_id: JobId,
        result: Result<(), RequestError>,
    },
    DeleteRequested { job_ids: Vec<JobId> },
    DeleteFinished {
        seq: u64,
        job_ids: Vec<JobId>,
        result: Result<u64, RequestError>,
    },
    RerunRequested { job_ids: Vec<JobId> },
    RerunFinished {
        seq: u64,
        job_ids: Vec<JobId>,
        result: Result<u64, RequestError>,
    },
    /// User turned auto-refresh on.
    PollingResumed,
    /// User turned auto-refresh off.
    PollingPaused,
    PollIntervalChanged(Duration),
    /// User dismissed the error banner.
    ErrorDismissed,
    /// Owning view is being discarded.
    Teardown,
}
