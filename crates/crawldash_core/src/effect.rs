use std::time::Duration;

use crate::{JobId, PollCommand, Query};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchList {
        seq: u64,
        query: Query,
        mode: ListMode,
    },
    CreateJob {
        seq: u64,
        url: String,
        auto_start: bool,
    },
    StartJob { seq: u64, job_id: JobId },
    StopJob { seq: u64, job_id: JobId },
    DeleteJobs { seq: u64, job_ids: Vec<JobId> },
    RerunJobs { seq: u64, job_ids: Vec<JobId> },
    /// Start the poll timer, replacing any running one.
    SchedulePolling { interval: Duration },
    CancelPolling,
}

/// Whether a list failure is shown to the user or only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    Visible,
    Silent,
}

impl From<PollCommand> for Effect {
    fn from(command: PollCommand) -> Self {
        match command {
            PollCommand::Schedule { interval } => Effect::SchedulePolling { interval },
            PollCommand::Cancel => Effect::CancelPolling,
        }
    }
}
