//! Memory accounting shared by every probe: the counting global allocator
//! and the settle-then-read sampler built on top of it.

pub mod allocator;
mod os;
pub mod sampler;
pub mod snapshot;

pub use allocator::{AllocationCounts, AllocationsPerIteration, measure_allocations};
pub use sampler::sample;
pub use snapshot::MemorySnapshot;
