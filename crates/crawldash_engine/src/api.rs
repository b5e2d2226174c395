use std::sync::Arc;

use crawldash_core::{
    FailureKind, Job, JobDetail, JobId, ListResponse, Query, RequestError,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::transport::{ApiRequest, Transport};

const JOBS_PATH: &str = "/urls";

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    deleted: Option<u64>,
    #[serde(default)]
    count: Option<u64>,
}

/// Typed calls against the crawl service's job endpoints.
#[derive(Clone)]
pub struct JobsApi {
    transport: Arc<dyn Transport>,
}

impl JobsApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn list_jobs(&self, query: &Query) -> Result<ListResponse, RequestError> {
        let request = ApiRequest::get(JOBS_PATH).with_query(query.encode());
        decode(self.transport.send(request).await?)
    }

    pub async fn create_job(&self, url: &str) -> Result<Job, RequestError> {
        let request = ApiRequest::post(JOBS_PATH).with_body(json!({ "url": url }));
        decode(self.transport.send(request).await?)
    }

    pub async fn start_job(&self, job_id: JobId) -> Result<(), RequestError> {
        let request = ApiRequest::post(format!("{JOBS_PATH}/{job_id}/start"));
        self.transport.send(request).await.map(|_| ())
    }

    pub async fn stop_job(&self, job_id: JobId) -> Result<(), RequestError> {
        let request = ApiRequest::post(format!("{JOBS_PATH}/{job_id}/stop"));
        self.transport.send(request).await.map(|_| ())
    }

    /// Returns how many jobs the server deleted.
    pub async fn delete_jobs(&self, job_ids: &[JobId]) -> Result<u64, RequestError> {
        let request = ApiRequest::delete(JOBS_PATH).with_body(json!({ "ids": job_ids }));
        let bulk: BulkResponse = decode_or_default(self.transport.send(request).await?)?;
        Ok(bulk.deleted.unwrap_or_default())
    }

    /// Returns how many jobs the server queued again.
    pub async fn rerun_jobs(&self, job_ids: &[JobId]) -> Result<u64, RequestError> {
        let request =
            ApiRequest::post(format!("{JOBS_PATH}/rerun")).with_body(json!({ "ids": job_ids }));
        let bulk: BulkResponse = decode_or_default(self.transport.send(request).await?)?;
        Ok(bulk.count.unwrap_or_default())
    }

    pub async fn job_detail(&self, job_id: JobId) -> Result<JobDetail, RequestError> {
        let request = ApiRequest::get(format!("{JOBS_PATH}/{job_id}"));
        decode(self.transport.send(request).await?)
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, RequestError> {
    serde_json::from_value(value).map_err(|err| {
        RequestError::new(FailureKind::Decode, format!("malformed response: {err}"))
    })
}

fn decode_or_default(value: Value) -> Result<BulkResponse, RequestError> {
    if value.is_null() {
        return Ok(BulkResponse {
            deleted: None,
            count: None,
        });
    }
    decode(value)
}
