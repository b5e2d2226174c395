use std::sync::{Mutex, MutexGuard, PoisonError};

use crawldash_core::{DetailRequest, DetailState, JobDetail, JobId, RequestError};

use crate::api::JobsApi;

/// Loads the full record and broken links of one job.
///
/// Has its own loading and error state; failures here never touch the list.
pub struct DetailFetcher {
    api: JobsApi,
    state: Mutex<DetailState>,
}

impl DetailFetcher {
    pub fn new(api: JobsApi) -> Self {
        Self {
            api,
            state: Mutex::new(DetailState::default()),
        }
    }

    /// Switches to another job. `None` clears the held detail without a request.
    pub async fn select(&self, job_id: Option<JobId>) -> Result<(), RequestError> {
        let request = self.lock().select(job_id);
        self.fetch(request).await
    }

    pub async fn refresh(&self) -> Result<(), RequestError> {
        let request = self.lock().refresh();
        self.fetch(request).await
    }

    pub fn detail(&self) -> Option<JobDetail> {
        self.lock().detail().cloned()
    }

    pub fn selected(&self) -> Option<JobId> {
        self.lock().selected()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error().map(ToOwned::to_owned)
    }

    async fn fetch(&self, request: Option<DetailRequest>) -> Result<(), RequestError> {
        let Some(DetailRequest { seq, job_id }) = request else {
            return Ok(());
        };
        let result = self.api.job_detail(job_id).await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        self.lock().apply(seq, result);
        outcome
    }

    fn lock(&self) -> MutexGuard<'_, DetailState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
