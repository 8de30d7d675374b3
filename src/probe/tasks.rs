use std::sync::Arc;

use color_eyre::Result;
use color_eyre::eyre::eyre;
use serde::Serialize;

use super::barrier::CompletionBarrier;
use crate::format::kilobytes;
use crate::memory::{MemorySnapshot, sample};

pub const DEFAULT_TASK_COUNT: usize = 10_000;

const WARM_UP_TASKS_PER_WORKER: usize = 4;

/// Memory footprint of parked tasks, averaged over `tasks`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TaskFootprint {
    pub tasks: usize,
    pub before: MemorySnapshot,
    pub after: MemorySnapshot,
    pub os_kb_per_task: f64,
    pub live_kb_per_task: f64,
}

impl TaskFootprint {
    pub fn new(tasks: usize, before: MemorySnapshot, after: MemorySnapshot) -> Self {
        let divisor = tasks.max(1) as f64;
        Self {
            tasks,
            before,
            after,
            os_kb_per_task: kilobytes(after.os_delta(&before) as f64) / divisor,
            live_kb_per_task: kilobytes(after.live_delta(&before) as f64) / divisor,
        }
    }
}

/// Spawns `tasks` tasks that never finish and reports the memory they hold.
///
/// Every task signals a shared barrier and then awaits a future nothing will
/// ever complete, so it stays resident until the runtime shuts down. The
/// second sample is taken only after all of them have signalled. Must run
/// inside a tokio runtime; the tasks are abandoned, not joined.
///
/// Workers are woken once before the first sample, so memory a fresh
/// runtime releases on startup does not offset the tasks being measured.
#[cfg_attr(
    feature = "perf-tracing",
    tracing::instrument(name = "probe.tasks", level = "debug")
)]
pub async fn measure_task_footprint(tasks: usize) -> Result<TaskFootprint> {
    if tasks == 0 {
        return Err(eyre!("task count must be greater than 0"));
    }
    let expected =
        u32::try_from(tasks).map_err(|_| eyre!("task count {tasks} exceeds {}", u32::MAX))?;
    let barrier = Arc::new(CompletionBarrier::new(expected));

    warm_up_workers().await?;
    let before = sample();
    spawn_parked(tasks, &barrier);
    barrier.wait().await?;
    let after = sample();

    #[cfg(feature = "perf-tracing")]
    tracing::debug!(?before, ?after, "all tasks parked");

    Ok(TaskFootprint::new(tasks, before, after))
}

/// Gets the runtime's workers polling before anything is measured.
///
/// The warm-up tasks park like the measured ones instead of finishing, so
/// none of them is freed once the first sample has been taken.
async fn warm_up_workers() -> Result<()> {
    let workers = tokio::runtime::Handle::current().metrics().num_workers();
    let count = workers.max(1) * WARM_UP_TASKS_PER_WORKER;
    let expected =
        u32::try_from(count).map_err(|_| eyre!("{count} warm-up tasks exceed {}", u32::MAX))?;

    let barrier = Arc::new(CompletionBarrier::new(expected));
    spawn_parked(count, &barrier);
    barrier.wait().await?;
    tokio::task::yield_now().await;
    Ok(())
}

fn spawn_parked(count: usize, barrier: &Arc<CompletionBarrier>) {
    for _ in 0..count {
        let barrier = Arc::clone(barrier);
        tokio::spawn(async move {
            barrier.signal();
            std::future::pending::<()>().await;
        });
    }
}
