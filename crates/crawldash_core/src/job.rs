use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::QueryError;

pub type JobId = u64;

/// Server-side lifecycle of a crawl job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Error,
    Stopped,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Queued,
        JobStatus::Running,
        JobStatus::Completed,
        JobStatus::Error,
        JobStatus::Stopped,
    ];

    /// Jobs in these states are still progressing on the server and keep polling alive.
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Running)
    }

    /// Completed and errored jobs never change again without an explicit rerun.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
            JobStatus::Stopped => "stopped",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| QueryError::UnknownStatus(s.to_string()))
    }
}

/// Heading counters in document order (`h1` through `h6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeadingCounts {
    #[serde(default)]
    pub h1_count: u32,
    #[serde(default)]
    pub h2_count: u32,
    #[serde(default)]
    pub h3_count: u32,
    #[serde(default)]
    pub h4_count: u32,
    #[serde(default)]
    pub h5_count: u32,
    #[serde(default)]
    pub h6_count: u32,
}

impl HeadingCounts {
    pub fn as_array(&self) -> [u32; 6] {
        [
            self.h1_count,
            self.h2_count,
            self.h3_count,
            self.h4_count,
            self.h5_count,
            self.h6_count,
        ]
    }

    pub fn total(&self) -> u32 {
        self.as_array().iter().sum()
    }
}

/// One crawl task as last reported by the server.
///
/// Result fields are only meaningful once the status is `completed` or `error`;
/// while a job is queued or running they may be empty or left over from a prior run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub user_id: Option<u64>,
    pub url: String,
    pub status: JobStatus,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub html_version: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_title: Option<String>,
    #[serde(flatten)]
    pub headings: HeadingCounts,
    #[serde(default)]
    pub internal_links: u32,
    #[serde(default)]
    pub external_links: u32,
    #[serde(default)]
    pub broken_links: u32,
    #[serde(default)]
    pub has_login_form: bool,
    #[serde(default)]
    pub has_structured_data: bool,
    #[serde(default)]
    pub structured_data_types: Vec<String>,
    #[serde(default)]
    pub structured_data_snippets: Vec<String>,
    #[serde(default)]
    pub is_orphan: bool,
    #[serde(default)]
    pub inbound_internal_links: u32,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// A freshly submitted job with no results yet.
    pub fn new(id: JobId, url: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id,
            user_id: None,
            url: url.into(),
            status,
            html_version: None,
            page_title: None,
            headings: HeadingCounts::default(),
            internal_links: 0,
            external_links: 0,
            broken_links: 0,
            has_login_form: false,
            has_structured_data: false,
            structured_data_types: Vec::new(),
            structured_data_snippets: Vec::new(),
            is_orphan: false,
            inbound_internal_links: 0,
            error_message: None,
            created_at: None,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn has_results(&self) -> bool {
        self.status.is_terminal()
    }
}

/// A link found on a crawled page that did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLink {
    pub id: u64,
    pub crawl_job_id: JobId,
    pub url: String,
    pub status_code: u16,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Full record for one job as returned by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDetail {
    pub job: Job,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub broken_links: Vec<BrokenLink>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.is_empty()))
}

/// Go encodes a nil slice as `null`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
