use std::time::Duration;

use crate::Job;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Refresh intervals offered to users.
pub const POLL_INTERVAL_PRESETS: [Duration; 5] = [
    Duration::from_secs(2),
    Duration::from_secs(5),
    Duration::from_secs(10),
    Duration::from_secs(30),
    Duration::from_secs(60),
];

/// What changed in the store before polling is re-evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Listed,
    Added,
    Started,
    Stopped,
    Deleted,
    Rerun,
}

impl StateChange {
    /// Changes the user caused that put work back in flight. These lift a manual pause.
    pub fn is_fresh_activity(self) -> bool {
        matches!(
            self,
            StateChange::Added | StateChange::Started | StateChange::Rerun
        )
    }
}

/// Instruction for whoever owns the actual timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollCommand {
    /// Start the timer, or restart it if already running.
    Schedule { interval: Duration },
    Cancel,
}

/// Decides when background polling should run.
///
/// Polling is active exactly when a held job is queued or running, unless the
/// user paused it. A pause holds until the user resumes or a fresh add, start
/// or rerun puts work back in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollScheduler {
    interval: Duration,
    active: bool,
    paused: bool,
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl PollScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            active: false,
            paused: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn evaluate(&mut self, jobs: &[Job], change: StateChange) -> Option<PollCommand> {
        if change.is_fresh_activity() {
            self.paused = false;
        }
        self.reconcile(jobs)
    }

    /// Manual start. Clears a pause; the timer still only runs while work is active.
    pub fn resume(&mut self, jobs: &[Job]) -> Option<PollCommand> {
        self.paused = false;
        self.reconcile(jobs)
    }

    /// Manual stop. Idempotent.
    pub fn pause(&mut self) -> Option<PollCommand> {
        self.paused = true;
        self.deactivate()
    }

    /// Changes the period; a running timer is restarted with it right away.
    pub fn set_interval(&mut self, interval: Duration) -> Option<PollCommand> {
        if interval.is_zero() || interval == self.interval {
            return None;
        }
        self.interval = interval;
        self.active.then_some(PollCommand::Schedule { interval })
    }

    /// Owning view is going away.
    pub fn teardown(&mut self) -> Option<PollCommand> {
        self.deactivate()
    }

    fn reconcile(&mut self, jobs: &[Job]) -> Option<PollCommand> {
        let wanted = !self.paused && jobs.iter().any(|job| job.status.is_active());
        match (self.active, wanted) {
            (false, true) => {
                self.active = true;
                Some(PollCommand::Schedule {
                    interval: self.interval,
                })
            }
            (true, false) => self.deactivate(),
            _ => None,
        }
    }

    fn deactivate(&mut self) -> Option<PollCommand> {
        if self.active {
            self.active = false;
            Some(PollCommand::Cancel)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JobStatus;

    fn jobs(statuses: &[JobStatus]) -> Vec<Job> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| Job::new(i as u64 + 1, "https://example.com", *status))
            .collect()
    }

    #[test]
    fn activates_only_for_queued_or_running() {
        let mut poll = PollScheduler::default();
        assert_eq!(
            poll.evaluate(&jobs(&[JobStatus::Stopped, JobStatus::Completed]), StateChange::Listed),
            None
        );
        assert!(!poll.is_active());

        assert_eq!(
            poll.evaluate(&jobs(&[JobStatus::Queued]), StateChange::Listed),
            Some(PollCommand::Schedule {
                interval: DEFAULT_POLL_INTERVAL
            })
        );
        // Already active: idempotent.
        assert_eq!(
            poll.evaluate(&jobs(&[JobStatus::Running]), StateChange::Listed),
            None
        );
        assert_eq!(
            poll.evaluate(&jobs(&[JobStatus::Error]), StateChange::Listed),
            Some(PollCommand::Cancel)
        );
        assert_eq!(poll.pause(), None);
    }

    #[test]
    fn pause_survives_polls_but_not_fresh_activity() {
        let running = jobs(&[JobStatus::Running]);
        let mut poll = PollScheduler::default();
        poll.evaluate(&running, StateChange::Listed);

        assert_eq!(poll.pause(), Some(PollCommand::Cancel));
        assert_eq!(poll.evaluate(&running, StateChange::Listed), None);
        assert!(!poll.is_active());

        assert!(poll.evaluate(&running, StateChange::Added).is_some());
        assert!(poll.is_active());
        assert!(!poll.is_paused());
    }

    #[test]
    fn interval_change_restarts_only_when_active() {
        let mut poll = PollScheduler::default();
        assert_eq!(poll.set_interval(Duration::from_secs(30)), None);
        assert_eq!(poll.interval(), Duration::from_secs(30));

        poll.resume(&jobs(&[JobStatus::Queued]));
        assert_eq!(
            poll.set_interval(Duration::from_secs(2)),
            Some(PollCommand::Schedule {
                interval: Duration::from_secs(2)
            })
        );
        assert_eq!(poll.set_interval(Duration::ZERO), None);
        assert_eq!(poll.interval(), Duration::from_secs(2));
    }
}
