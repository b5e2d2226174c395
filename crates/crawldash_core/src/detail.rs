use crawldash_logging::dash_debug;

use crate::{JobDetail, JobId, RequestError};

/// A detail fetch the caller should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailRequest {
    pub seq: u64,
    pub job_id: JobId,
}

/// State of the single-job detail view. Independent of the list store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailState {
    selected: Option<JobId>,
    detail: Option<JobDetail>,
    loading: bool,
    error: Option<String>,
    seq: u64,
}

impl DetailState {
    pub fn selected(&self) -> Option<JobId> {
        self.selected
    }

    pub fn detail(&self) -> Option<&JobDetail> {
        self.detail.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Selects a job. Only an actual change of id triggers a fetch; `None` clears.
    pub fn select(&mut self, job_id: Option<JobId>) -> Option<DetailRequest> {
        if job_id == self.selected {
            return None;
        }
        self.selected = job_id;
        self.detail = None;
        self.error = None;
        self.begin()
    }

    /// Fetches the current selection again.
    pub fn refresh(&mut self) -> Option<DetailRequest> {
        self.error = None;
        self.begin()
    }

    /// Applies a response. Responses for superseded selections are dropped.
    pub fn apply(&mut self, seq: u64, result: Result<JobDetail, RequestError>) -> bool {
        if seq != self.seq {
            dash_debug!("Discarding detail response seq={} (current={})", seq, self.seq);
            return false;
        }
        self.loading = false;
        match result {
            Ok(detail) => {
                self.detail = Some(detail);
                self.error = None;
            }
            Err(err) => self.error = Some(err.message),
        }
        true
    }

    fn begin(&mut self) -> Option<DetailRequest> {
        self.seq += 1;
        match self.selected {
            Some(job_id) => {
                self.loading = true;
                Some(DetailRequest {
                    seq: self.seq,
                    job_id,
                })
            }
            None => {
                self.loading = false;
                None
            }
        }
    }
}
