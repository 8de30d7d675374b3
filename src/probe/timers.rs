use std::time::Duration;

use serde::Serialize;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::format::kilobytes;
use crate::memory::{MemorySnapshot, sample};

pub const DEFAULT_TIMER_COUNT: usize = 100_000;
pub const DEFAULT_TIMER_DELAY: Duration = Duration::from_secs(60 * 60);

/// One-shot timer: the receiver yields the instant the timer fired.
///
/// The deadline is fixed when `after` is called. The timer lives in a
/// spawned task. Dropping the receiver does not cancel it; the task and its
/// timer entry stay registered with the runtime until `delay` elapses or the
/// runtime shuts down.
pub fn after(delay: Duration) -> oneshot::Receiver<Instant> {
    let (tx, rx) = oneshot::channel();
    let timer = tokio::time::sleep(delay);
    tokio::spawn(async move {
        timer.await;
        let _ = tx.send(Instant::now());
    });
    rx
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TimerLeak {
    pub timers: usize,
    pub delay_secs: u64,
    pub before: MemorySnapshot,
    pub after: MemorySnapshot,
    pub live_growth_kb: f64,
}

impl TimerLeak {
    pub fn new(
        timers: usize,
        delay: Duration,
        before: MemorySnapshot,
        after: MemorySnapshot,
    ) -> Self {
        Self {
            timers,
            delay_secs: delay.as_secs(),
            before,
            after,
            live_growth_kb: kilobytes(after.live_delta(&before) as f64),
        }
    }
}

/// Schedules `timers` timers of `delay` and throws every receiver away.
///
/// Must run inside a tokio runtime with the time driver enabled.
#[cfg_attr(
    feature = "perf-tracing",
    tracing::instrument(name = "probe.timers", level = "debug")
)]
pub async fn measure_timer_leak(timers: usize, delay: Duration) -> TimerLeak {
    let before = sample();
    for _ in 0..timers {
        drop(after(delay));
    }
    let after = sample();

    #[cfg(feature = "perf-tracing")]
    tracing::debug!(?before, ?after, "timers scheduled");

    TimerLeak::new(timers, delay, before, after)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn after_fires_once_delay_elapses() {
        let start = Instant::now();
        let fired = after(Duration::from_secs(5)).await.unwrap();
        assert!(fired.duration_since(start) >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_is_fixed_when_scheduled() {
        let start = Instant::now();
        let rx = after(Duration::from_secs(5));
        // The timer task is first polled only after the clock has moved on.
        tokio::time::advance(Duration::from_secs(3)).await;
        let fired = rx.await.unwrap();
        let elapsed = fired.duration_since(start);
        assert!(
            elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6),
            "fired after {elapsed:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_receiver_does_not_cancel_timer() {
        let metrics = tokio::runtime::Handle::current().metrics();
        drop(after(Duration::from_secs(60)));
        tokio::task::yield_now().await;
        assert_eq!(metrics.num_alive_tasks(), 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;
        assert_eq!(metrics.num_alive_tasks(), 0);
    }

    #[test]
    fn growth_is_reported_in_kilobytes() {
        let before = MemorySnapshot {
            os_bytes: 0,
            live_bytes: 1_000,
        };
        let after = MemorySnapshot {
            os_bytes: 0,
            live_bytes: 51_000,
        };
        let leak = TimerLeak::new(100, DEFAULT_TIMER_DELAY, before, after);
        assert!((leak.live_growth_kb - 50.0).abs() < 1e-9);
        assert_eq!(leak.delay_secs, 3600);
    }
}
