use super::allocator::AllocationCounts;
use super::os;
use super::snapshot::MemorySnapshot;

/// Settles the allocator, then reads a [`MemorySnapshot`].
///
/// The settle pass flushes this thread's allocation cache, purges unused
/// pages of every arena back to the OS and refreshes the allocator's
/// statistics. It blocks and disturbs every other thread using the
/// allocator; callers accept that cost in exchange for numbers that do not
/// depend on when the allocator last tidied up. Reading before settling
/// makes the two figures meaningless.
pub fn sample() -> MemorySnapshot {
    #[cfg(feature = "perf-tracing")]
    let _span = tracing::debug_span!("sampler.sample").entered();

    let stats = os::settle();
    let os_bytes = os::os_bytes(stats);
    let live_bytes = AllocationCounts::current().live_bytes();

    MemorySnapshot {
        os_bytes,
        live_bytes,
    }
}
