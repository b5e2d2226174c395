use std::sync::Weak;
use std::time::Duration;

use crawldash_logging::dash_debug;
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Something the poll timer refreshes on every tick.
#[async_trait::async_trait]
pub(crate) trait PollTarget: Send + Sync + 'static {
    async fn poll_once(&self);
}

/// A running poll loop. Dropping it cancels the loop, including an in-flight tick.
///
/// Ticks never overlap: the next period starts counting only after the
/// previous refresh returned.
pub(crate) struct PollTimer {
    token: CancellationToken,
    interval: Duration,
}

impl PollTimer {
    pub(crate) fn spawn(runtime: &Handle, interval: Duration, target: Weak<dyn PollTarget>) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let Some(target) = target.upgrade() else {
                    break;
                };
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = target.poll_once() => {}
                }
            }
            dash_debug!("Poll loop ({:?}) stopped", interval);
        });
        Self { token, interval }
    }

    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
