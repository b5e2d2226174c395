use crawldash_logging::{dash_info, dash_warn};

use crate::{AppState, Effect, JobStatus, ListMode, Msg, StateChange};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ListRequested { query } => {
            let store = state.store_mut();
            store.begin_visible();
            let seq = store.next_seq();
            state.mark_dirty();
            vec![Effect::FetchList {
                seq,
                query: query.normalized(),
                mode: ListMode::Visible,
            }]
        }
        Msg::PollTick => {
            if !state.poll().is_active() {
                return (state, Vec::new());
            }
            let Some(query) = state.store().last_query().cloned() else {
                return (state, Vec::new());
            };
            let seq = state.store_mut().next_seq();
            vec![Effect::FetchList {
                seq,
                query,
                mode: ListMode::Silent,
            }]
        }
        Msg::ListFinished {
            seq,
            query,
            mode,
            result,
        } => {
            if mode == ListMode::Visible {
                state.store_mut().end_visible();
                state.mark_dirty();
            }
            match result {
                Ok(response) => {
                    if state.store_mut().apply_list(seq, query, response) {
                        state.mark_dirty();
                    }
                    state.evaluate_polling(StateChange::Listed).into_iter().collect()
                }
                Err(err) => {
                    match mode {
                        ListMode::Visible => state.store_mut().set_error(err.message),
                        ListMode::Silent => dash_warn!("Polling fetch failed: {}", err),
                    }
                    Vec::new()
                }
            }
        }
        Msg::AddRequested { url, auto_start } => {
            let store = state.store_mut();
            store.begin_visible();
            let seq = store.next_seq();
            state.mark_dirty();
            vec![Effect::CreateJob {
                seq,
                url,
                auto_start,
            }]
        }
        Msg::AddFinished {
            seq,
            auto_start,
            result,
        } => {
            state.store_mut().end_visible();
            state.mark_dirty();
            match result {
                Ok(job) => {
                    let job_id = job.id;
                    dash_info!("Job {} created for {}", job_id, job.url);
                    state.store_mut().prepend(seq, job);
                    let mut effects = Vec::with_capacity(2);
                    if auto_start {
                        let seq = state.store_mut().next_seq();
                        effects.push(Effect::StartJob { seq, job_id });
                    }
                    effects.extend(state.evaluate_polling(StateChange::Added));
                    effects
                }
                Err(err) => {
                    state.store_mut().set_error(err.message);
                    Vec::new()
                }
            }
        }
        Msg::StartRequested { job_id } => {
            let seq = state.store_mut().next_seq();
            vec![Effect::StartJob { seq, job_id }]
        }
        Msg::StartFinished {
            seq,
            job_id,
            result,
        } => match result {
            Ok(()) => {
                state
                    .store_mut()
                    .patch_status(seq, &[job_id], JobStatus::Running);
                state.mark_dirty();
                state.evaluate_polling(StateChange::Started).into_iter().collect()
            }
            Err(err) => {
                state.store_mut().set_error(err.message);
                state.mark_dirty();
                Vec::new()
            }
        },
        Msg::StopRequested { job_id } => {
            let seq = state.store_mut().next_seq();
            vec![Effect::StopJob { seq, job_id }]
        }
        Msg::StopFinished {
            seq,
            job_id,
            result,
        } => match result {
            Ok(()) => {
                state
                    .store_mut()
                    .patch_status(seq, &[job_id], JobStatus::Stopped);
                state.mark_dirty();
                state.evaluate_polling(StateChange::Stopped).into_iter().collect()
            }
            Err(err) => {
                state.store_mut().set_error(err.message);
                state.mark_dirty();
                Vec::new()
            }
        },
        Msg::DeleteRequested { job_ids } => {
            if job_ids.is_empty() {
                return (state, Vec::new());
            }
            let store = state.store_mut();
            store.begin_visible();
            let seq = store.next_seq();
            state.mark_dirty();
            vec![Effect::DeleteJobs { seq, job_ids }]
        }
        Msg::DeleteFinished {
            seq,
            job_ids,
            result,
        } => {
            state.store_mut().end_visible();
            state.mark_dirty();
            match result {
                Ok(deleted) => {
                    let removed = state.store_mut().remove(seq, &job_ids);
                    dash_info!("Deleted {} job(s), {} on this page", deleted, removed);
                    state.evaluate_polling(StateChange::Deleted).into_iter().collect()
                }
                Err(err) => {
                    state.store_mut().set_error(err.message);
                    Vec::new()
                }
            }
        }
        Msg::RerunRequested { job_ids } => {
            if job_ids.is_empty() {
                return (state, Vec::new());
            }
            let store = state.store_mut();
            store.begin_visible();
            let seq = store.next_seq();
            state.mark_dirty();
            vec![Effect::RerunJobs { seq, job_ids }]
        }
        Msg::RerunFinished {
            seq,
            job_ids,
            result,
        } => {
            state.store_mut().end_visible();
            state.mark_dirty();
            match result {
                Ok(count) => {
                    state
                        .store_mut()
                        .patch_status(seq, &job_ids, JobStatus::Queued);
                    dash_info!("Queued {} job(s) for rerun", count);
                    state.evaluate_polling(StateChange::Rerun).into_iter().collect()
                }
                Err(err) => {
                    state.store_mut().set_error(err.message);
                    Vec::new()
                }
            }
        }
        Msg::PollingResumed => {
            let effect = state.resume_polling();
            state.mark_dirty();
            effect.into_iter().collect()
        }
        Msg::PollingPaused => {
            let command = state.poll_mut().pause();
            state.mark_dirty();
            command.map(Effect::from).into_iter().collect()
        }
        Msg::PollIntervalChanged(interval) => {
            if interval.is_zero() {
                dash_warn!("Ignoring zero poll interval");
                return (state, Vec::new());
            }
            let command = state.poll_mut().set_interval(interval);
            state.mark_dirty();
            command.map(Effect::from).into_iter().collect()
        }
        Msg::ErrorDismissed => {
            if state.store_mut().clear_error() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Teardown => state
            .poll_mut()
            .teardown()
            .map(Effect::from)
            .into_iter()
            .collect(),
    };

    (state, effects)
}
