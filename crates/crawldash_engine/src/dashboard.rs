use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use crawldash_core::{
    update, validate_job_url, AppState, AppViewModel, Effect, FailureKind, Job, JobId, Msg, Query,
    RequestError,
};
use crawldash_logging::{dash_debug, dash_info, dash_warn};
use tokio::runtime::Handle;

use crate::api::JobsApi;
use crate::auth::CredentialSource;
use crate::poller::{PollTarget, PollTimer};
use crate::transport::{ReqwestTransport, TransportSettings};
use crate::DashboardError;

/// One dashboard view: the cached job page, its mutations and its poll timer.
///
/// Each view owns its own cache; two dashboards over the same data only
/// reconcile through their own refreshes. Dropping the dashboard cancels
/// polling.
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    state: Mutex<AppState>,
    api: JobsApi,
    timer: Mutex<Option<PollTimer>>,
    runtime: Handle,
    weak: Weak<DashboardInner>,
}

/// Result of executing one effect.
struct Step {
    outcome: Result<Option<Job>, RequestError>,
    follow_ups: Vec<Effect>,
}

impl Step {
    fn local() -> Self {
        Self {
            outcome: Ok(None),
            follow_ups: Vec::new(),
        }
    }
}

impl Dashboard {
    /// Creates a dashboard on the current Tokio runtime.
    pub fn new(api: JobsApi) -> Result<Self, DashboardError> {
        Self::with_state(api, AppState::new())
    }

    pub fn with_poll_interval(api: JobsApi, interval: Duration) -> Result<Self, DashboardError> {
        Self::with_state(api, AppState::with_poll_interval(interval))
    }

    /// Creates a dashboard talking to the crawl service over HTTP.
    pub fn connect(
        settings: TransportSettings,
        credentials: Arc<dyn CredentialSource>,
        poll_interval: Duration,
    ) -> Result<Self, DashboardError> {
        let transport = ReqwestTransport::new(settings, credentials)?;
        Self::with_poll_interval(JobsApi::new(Arc::new(transport)), poll_interval)
    }

    fn with_state(api: JobsApi, state: AppState) -> Result<Self, DashboardError> {
        let runtime =
            Handle::try_current().map_err(|err| DashboardError::Runtime(err.to_string()))?;
        let inner = Arc::new_cyclic(|weak| DashboardInner {
            state: Mutex::new(state),
            api,
            timer: Mutex::new(None),
            runtime,
            weak: weak.clone(),
        });
        Ok(Self { inner })
    }

    pub fn view(&self) -> AppViewModel {
        self.inner.lock_state().view()
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.inner.lock_state().store().jobs().to_vec()
    }

    /// Whether a poll timer is currently running.
    pub fn is_polling(&self) -> bool {
        self.inner.lock_timer().is_some()
    }

    /// Returns whether the view changed since the last call.
    pub fn consume_dirty(&self) -> bool {
        self.inner.lock_state().consume_dirty()
    }

    pub async fn list(&self, query: Query) -> Result<(), RequestError> {
        let effects = self.inner.dispatch(Msg::ListRequested { query });
        self.inner.run(effects).await.map(|_| ())
    }

    /// Re-issues the last applied query, or the default one.
    pub async fn refresh(&self) -> Result<(), RequestError> {
        let query = self
            .inner
            .lock_state()
            .store()
            .last_query()
            .cloned()
            .unwrap_or_default();
        self.list(query).await
    }

    /// Submits a URL. With `auto_start` the new job is started right away; a
    /// failed start is logged and does not undo the add.
    pub async fn add(&self, url: &str, auto_start: bool) -> Result<Job, DashboardError> {
        let url = validate_job_url(url)?;
        let effects = self.inner.dispatch(Msg::AddRequested { url, auto_start });
        let created = self.inner.run(effects).await?;
        created.ok_or_else(|| {
            DashboardError::Request(RequestError::new(
                FailureKind::Decode,
                "server did not return the created job",
            ))
        })
    }

    pub async fn start(&self, job_id: JobId) -> Result<(), RequestError> {
        let effects = self.inner.dispatch(Msg::StartRequested { job_id });
        self.inner.run(effects).await.map(|_| ())
    }

    pub async fn stop(&self, job_id: JobId) -> Result<(), RequestError> {
        let effects = self.inner.dispatch(Msg::StopRequested { job_id });
        self.inner.run(effects).await.map(|_| ())
    }

    pub async fn delete(&self, job_ids: &[JobId]) -> Result<(), RequestError> {
        let effects = self.inner.dispatch(Msg::DeleteRequested {
            job_ids: job_ids.to_vec(),
        });
        self.inner.run(effects).await.map(|_| ())
    }

    pub async fn rerun(&self, job_ids: &[JobId]) -> Result<(), RequestError> {
        let effects = self.inner.dispatch(Msg::RerunRequested {
            job_ids: job_ids.to_vec(),
        });
        self.inner.run(effects).await.map(|_| ())
    }

    /// Turns auto-refresh back on. The timer runs while work is active.
    pub fn start_polling(&self) {
        let effects = self.inner.dispatch(Msg::PollingResumed);
        self.inner.apply_local(effects);
    }

    /// Turns auto-refresh off until resumed or new work is submitted.
    pub fn stop_polling(&self) {
        let effects = self.inner.dispatch(Msg::PollingPaused);
        self.inner.apply_local(effects);
    }

    pub fn set_polling_interval(&self, interval: Duration) {
        let effects = self.inner.dispatch(Msg::PollIntervalChanged(interval));
        self.inner.apply_local(effects);
    }

    pub fn dismiss_error(&self) {
        self.inner.dispatch(Msg::ErrorDismissed);
    }

    /// Cancels polling. Also done on drop.
    pub fn shutdown(&self) {
        self.inner.dispatch(Msg::Teardown);
        self.inner.cancel_polling();
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl DashboardInner {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_timer(&self) -> std::sync::MutexGuard<'_, Option<PollTimer>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        let mut guard = self.lock_state();
        let state = std::mem::take(&mut *guard);
        let (state, effects) = update(state, msg);
        *guard = state;
        effects
    }

    /// Executes effects from one action and everything their responses trigger.
    ///
    /// Only failures of the requests the caller asked for are returned. Failures of
    /// follow-up work such as an auto-start are logged.
    async fn run(&self, effects: Vec<Effect>) -> Result<Option<Job>, RequestError> {
        let mut queue: VecDeque<(Effect, bool)> =
            effects.into_iter().map(|effect| (effect, true)).collect();
        let mut created = None;
        let mut first_error = None;

        while let Some((effect, primary)) = queue.pop_front() {
            let step = self.execute(effect).await;
            queue.extend(step.follow_ups.into_iter().map(|effect| (effect, false)));
            match step.outcome {
                Ok(job) => created = created.or(job),
                Err(err) if primary => {
                    first_error.get_or_insert(err);
                }
                Err(err) => dash_warn!("Follow-up request failed: {}", err),
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(created),
        }
    }

    async fn execute(&self, effect: Effect) -> Step {
        match effect {
            Effect::FetchList { seq, query, mode } => {
                let result = self.api.list_jobs(&query).await;
                let outcome = result.as_ref().map(|_| None).map_err(Clone::clone);
                let follow_ups = self.dispatch(Msg::ListFinished {
                    seq,
                    query,
                    mode,
                    result,
                });
                Step {
                    outcome,
                    follow_ups,
                }
            }
            Effect::CreateJob {
                seq,
                url,
                auto_start,
            } => {
                let result = self.api.create_job(&url).await;
                let outcome = result.as_ref().map(|job| Some(job.clone())).map_err(Clone::clone);
                let follow_ups = self.dispatch(Msg::AddFinished {
                    seq,
                    auto_start,
                    result,
                });
                Step {
                    outcome,
                    follow_ups,
                }
            }
            Effect::StartJob { seq, job_id } => {
                let result = self.api.start_job(job_id).await;
                let outcome = result.clone().map(|()| None);
                let follow_ups = self.dispatch(Msg::StartFinished {
                    seq,
                    job_id,
                    result,
                });
                Step {
                    outcome,
                    follow_ups,
                }
            }
            Effect::StopJob { seq, job_id } => {
                let result = self.api.stop_job(job_id).await;
                let outcome = result.clone().map(|()| None);
                let follow_ups = self.dispatch(Msg::StopFinished {
                    seq,
                    job_id,
                    result,
                });
                Step {
                    outcome,
                    follow_ups,
                }
            }
            Effect::DeleteJobs { seq, job_ids } => {
                let result = self.api.delete_jobs(&job_ids).await;
                let outcome = result.clone().map(|_| None);
                let follow_ups = self.dispatch(Msg::DeleteFinished {
                    seq,
                    job_ids,
                    result,
                });
                Step {
                    outcome,
                    follow_ups,
                }
            }
            Effect::RerunJobs { seq, job_ids } => {
                let result = self.api.rerun_jobs(&job_ids).await;
                let outcome = result.clone().map(|_| None);
                let follow_ups = self.dispatch(Msg::RerunFinished {
                    seq,
                    job_ids,
                    result,
                });
                Step {
                    outcome,
                    follow_ups,
                }
            }
            Effect::SchedulePolling { interval } => {
                self.schedule_polling(interval);
                Step::local()
            }
            Effect::CancelPolling => {
                self.cancel_polling();
                Step::local()
            }
        }
    }

    /// Applies timer effects that need no network round trip.
    fn apply_local(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SchedulePolling { interval } => self.schedule_polling(interval),
                Effect::CancelPolling => self.cancel_polling(),
                other => dash_warn!("Unexpected effect outside a request: {:?}", other),
            }
        }
    }

    fn schedule_polling(&self, interval: Duration) {
        let target: Weak<dyn PollTarget> = self.weak.clone();
        let timer = PollTimer::spawn(&self.runtime, interval, target);
        // Replacing the previous timer drops and cancels it.
        let previous = self.lock_timer().replace(timer);
        match previous {
            Some(old) => dash_info!(
                "Polling interval changed from {:?} to {:?}",
                old.interval(),
                interval
            ),
            None => dash_info!("Polling started every {:?}", interval),
        }
    }

    fn cancel_polling(&self) {
        if self.lock_timer().take().is_some() {
            dash_info!("Polling stopped");
        }
    }
}

#[async_trait::async_trait]
impl PollTarget for DashboardInner {
    async fn poll_once(&self) {
        let effects = self.dispatch(Msg::PollTick);
        // Silent list failures were already logged by `update`.
        if let Err(err) = self.run(effects).await {
            dash_debug!("Poll tick ended with error: {}", err);
        }
    }
}
