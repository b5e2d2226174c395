use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::{Job, JobId, JobStatus, PaginationInfo, Query};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub jobs: Vec<JobRowView>,
    pub pagination: PaginationInfo,
    pub loading: bool,
    pub error: Option<String>,
    pub polling: PollingView,
    pub last_query: Option<Query>,
    pub dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollingView {
    pub active: bool,
    pub paused: bool,
    pub interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub url: String,
    pub status: JobStatus,
    pub page_title: Option<String>,
    pub html_version: Option<String>,
    pub internal_links: u32,
    pub external_links: u32,
    pub broken_links: u32,
    pub has_login_form: bool,
    pub error_message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Job> for JobRowView {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id,
            url: job.url.clone(),
            status: job.status,
            page_title: job.page_title.clone(),
            html_version: job.html_version.clone(),
            internal_links: job.internal_links,
            external_links: job.external_links,
            broken_links: job.broken_links,
            has_login_form: job.has_login_form,
            error_message: job.error_message.clone(),
            created_at: job.created_at,
        }
    }
}
