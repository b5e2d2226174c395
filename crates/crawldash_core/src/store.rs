use crawldash_logging::dash_debug;

use crate::{Job, JobId, JobStatus, ListResponse, PaginationInfo, Query};

/// Cached page of jobs for one view, plus the bookkeeping around it.
///
/// Every request the store issues is tagged with a sequence number. List
/// responses only apply when newer than the last applied list. Mutation
/// patches always apply and are kept until a list issued after them lands,
/// so an older list is replayed with the newer patches on top.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobStore {
    jobs: Vec<Job>,
    pagination: PaginationInfo,
    last_query: Option<Query>,
    error: Option<String>,
    in_flight: usize,
    next_seq: u64,
    list_seq: u64,
    patches: Vec<(u64, Patch)>,
}

/// A local change made after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Patch {
    Prepend(Job),
    Status(Vec<JobId>, JobStatus),
    Remove(Vec<JobId>),
}

impl JobStore {
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job(&self, job_id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == job_id)
    }

    pub fn pagination(&self) -> PaginationInfo {
        self.pagination
    }

    pub fn last_query(&self) -> Option<&Query> {
        self.last_query.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn has_active_jobs(&self) -> bool {
        self.jobs.iter().any(|job| job.status.is_active())
    }

    pub(crate) fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Marks a user-visible request as started, clearing any previous error.
    pub(crate) fn begin_visible(&mut self) {
        self.in_flight += 1;
        self.error = None;
    }

    pub(crate) fn end_visible(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub(crate) fn clear_error(&mut self) -> bool {
        self.error.take().is_some()
    }

    /// Replaces the page wholesale. Returns false when a newer list already landed.
    pub(crate) fn apply_list(&mut self, seq: u64, query: Query, response: ListResponse) -> bool {
        if seq <= self.list_seq {
            dash_debug!(
                "Discarding stale list response seq={} (applied={})",
                seq,
                self.list_seq
            );
            return false;
        }
        let (jobs, pagination) = response.into_parts();
        self.jobs = jobs;
        self.pagination = pagination;
        self.list_seq = seq;

        self.patches.retain(|(patch_seq, _)| *patch_seq > seq);
        let first_page = query.page <= 1;
        let replay = self.patches.clone();
        if !replay.is_empty() {
            dash_debug!(
                "Replaying {} patch(es) newer than list seq={}",
                replay.len(),
                seq
            );
        }
        for (_, patch) in &replay {
            match patch {
                Patch::Prepend(_) if !first_page => {}
                other => self.apply_patch(other),
            }
        }
        self.last_query = Some(query);
        true
    }

    pub(crate) fn prepend(&mut self, seq: u64, job: Job) {
        self.record(seq, Patch::Prepend(job));
    }

    /// Patches the status of every listed job that is on this page.
    pub(crate) fn patch_status(&mut self, seq: u64, job_ids: &[JobId], status: JobStatus) -> usize {
        let patched = self
            .jobs
            .iter()
            .filter(|job| job_ids.contains(&job.id))
            .count();
        self.record(seq, Patch::Status(job_ids.to_vec(), status));
        patched
    }

    pub(crate) fn remove(&mut self, seq: u64, job_ids: &[JobId]) -> usize {
        let before = self.jobs.len();
        self.record(seq, Patch::Remove(job_ids.to_vec()));
        before - self.jobs.len()
    }

    fn record(&mut self, seq: u64, patch: Patch) {
        self.apply_patch(&patch);
        if seq > self.list_seq {
            self.patches.push((seq, patch));
        }
    }

    fn apply_patch(&mut self, patch: &Patch) {
        match patch {
            Patch::Prepend(job) => {
                self.jobs.retain(|existing| existing.id != job.id);
                self.jobs.insert(0, job.clone());
            }
            Patch::Status(job_ids, status) => {
                for job in self.jobs.iter_mut().filter(|job| job_ids.contains(&job.id)) {
                    job.status = *status;
                }
            }
            Patch::Remove(job_ids) => self.jobs.retain(|job| !job_ids.contains(&job.id)),
        }
    }
}
