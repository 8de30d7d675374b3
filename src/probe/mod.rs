pub mod barrier;
pub mod tasks;
pub mod timers;

pub use barrier::CompletionBarrier;
pub use tasks::{TaskFootprint, measure_task_footprint};
pub use timers::{TimerLeak, after, measure_timer_leak};
