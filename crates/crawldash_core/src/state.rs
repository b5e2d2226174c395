use std::time::Duration;

use crate::view_model::{AppViewModel, JobRowView, PollingView};
use crate::{Effect, JobStore, PollScheduler, StateChange};

/// Everything one dashboard view holds: the job page and its poll scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    store: JobStore,
    poll: PollScheduler,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(interval: Duration) -> Self {
        Self {
            poll: PollScheduler::new(interval),
            ..Self::default()
        }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn poll(&self) -> &PollScheduler {
        &self.poll
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            jobs: self.store.jobs().iter().map(JobRowView::from).collect(),
            pagination: self.store.pagination(),
            loading: self.store.is_loading(),
            error: self.store.error().map(ToOwned::to_owned),
            polling: PollingView {
                active: self.poll.is_active(),
                paused: self.poll.is_paused(),
                interval: self.poll.interval(),
            },
            last_query: self.store.last_query().cloned(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn store_mut(&mut self) -> &mut JobStore {
        &mut self.store
    }

    pub(crate) fn poll_mut(&mut self) -> &mut PollScheduler {
        &mut self.poll
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn resume_polling(&mut self) -> Option<Effect> {
        self.poll.resume(self.store.jobs()).map(Effect::from)
    }

    /// Re-runs the polling rule against the current page.
    pub(crate) fn evaluate_polling(&mut self, change: StateChange) -> Option<Effect> {
        let command = self.poll.evaluate(self.store.jobs(), change)?;
        self.dirty = true;
        Some(command.into())
    }
}
