use std::alloc::{GlobalAlloc, Layout};
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static ALLOCATOR: CountingAllocator<tikv_jemallocator::Jemalloc> =
    CountingAllocator::new(tikv_jemallocator::Jemalloc);

#[cfg(target_env = "msvc")]
#[global_allocator]
static ALLOCATOR: CountingAllocator<std::alloc::System> =
    CountingAllocator::new(std::alloc::System);

/// Wraps another allocator and keeps process-wide counters of every
/// allocation and deallocation routed through it.
pub struct CountingAllocator<A> {
    inner: A,
    allocations: AtomicU64,
    deallocations: AtomicU64,
    bytes_allocated: AtomicU64,
    bytes_freed: AtomicU64,
}

impl<A> CountingAllocator<A> {
    pub const fn new(inner: A) -> Self {
        Self {
            inner,
            allocations: AtomicU64::new(0),
            deallocations: AtomicU64::new(0),
            bytes_allocated: AtomicU64::new(0),
            bytes_freed: AtomicU64::new(0),
        }
    }

    pub fn counts(&self) -> AllocationCounts {
        AllocationCounts {
            allocations: self.allocations.load(Ordering::Relaxed),
            deallocations: self.deallocations.load(Ordering::Relaxed),
            bytes_allocated: self.bytes_allocated.load(Ordering::Relaxed),
            bytes_freed: self.bytes_freed.load(Ordering::Relaxed),
        }
    }

    fn record_alloc(&self, size: usize) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.bytes_allocated.fetch_add(size as u64, Ordering::Relaxed);
    }

    fn record_dealloc(&self, size: usize) {
        self.deallocations.fetch_add(1, Ordering::Relaxed);
        self.bytes_freed.fetch_add(size as u64, Ordering::Relaxed);
    }
}

// SAFETY: every call is forwarded unchanged to `inner`; the wrapper only
// updates atomic counters, which never allocate.
unsafe impl<A: GlobalAlloc> GlobalAlloc for CountingAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { self.inner.alloc(layout) };
        if !ptr.is_null() {
            self.record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { self.inner.alloc_zeroed(layout) };
        if !ptr.is_null() {
            self.record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { self.inner.dealloc(ptr, layout) };
        self.record_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { self.inner.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            self.record_dealloc(layout.size());
            self.record_alloc(new_size);
        }
        new_ptr
    }
}

/// Cumulative allocator counters at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocationCounts {
    pub allocations: u64,
    pub deallocations: u64,
    pub bytes_allocated: u64,
    pub bytes_freed: u64,
}

impl AllocationCounts {
    /// Counters of the process-wide allocator.
    pub fn current() -> Self {
        ALLOCATOR.counts()
    }

    /// Bytes allocated and not yet freed.
    pub fn live_bytes(&self) -> u64 {
        self.bytes_allocated.saturating_sub(self.bytes_freed)
    }

    /// Activity between `earlier` and `self`.
    pub fn since(&self, earlier: &AllocationCounts) -> AllocationCounts {
        AllocationCounts {
            allocations: self.allocations.saturating_sub(earlier.allocations),
            deallocations: self.deallocations.saturating_sub(earlier.deallocations),
            bytes_allocated: self.bytes_allocated.saturating_sub(earlier.bytes_allocated),
            bytes_freed: self.bytes_freed.saturating_sub(earlier.bytes_freed),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AllocationsPerIteration {
    pub iterations: u64,
    pub allocations: f64,
    pub bytes: f64,
}

/// Runs `op` `iterations` times and reports the average allocator activity
/// per call. Counters are process-wide, so concurrent work on other threads
/// shows up in the result.
pub fn measure_allocations<F: FnMut()>(iterations: u64, mut op: F) -> AllocationsPerIteration {
    let before = AllocationCounts::current();
    for _ in 0..iterations {
        op();
    }
    let delta = AllocationCounts::current().since(&before);

    let divisor = iterations.max(1) as f64;
    AllocationsPerIteration {
        iterations,
        allocations: delta.allocations as f64 / divisor,
        bytes: delta.bytes_allocated as f64 / divisor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_subtracts_each_counter() {
        let earlier = AllocationCounts {
            allocations: 10,
            deallocations: 4,
            bytes_allocated: 1_000,
            bytes_freed: 400,
        };
        let later = AllocationCounts {
            allocations: 15,
            deallocations: 9,
            bytes_allocated: 1_800,
            bytes_freed: 900,
        };
        let delta = later.since(&earlier);
        assert_eq!(delta.allocations, 5);
        assert_eq!(delta.deallocations, 5);
        assert_eq!(delta.bytes_allocated, 800);
        assert_eq!(delta.bytes_freed, 500);
    }

    #[test]
    fn live_bytes_never_underflows() {
        let counts = AllocationCounts {
            bytes_allocated: 10,
            bytes_freed: 20,
            ..AllocationCounts::default()
        };
        assert_eq!(counts.live_bytes(), 0);
    }

    #[test]
    fn global_allocator_sees_boxed_value() {
        let before = AllocationCounts::current();
        let boxed = std::hint::black_box(Box::new([7u8; 256]));
        let after = AllocationCounts::current();
        assert!(after.since(&before).allocations >= 1);
        assert!(after.since(&before).bytes_allocated >= 256);
        drop(boxed);
    }

    #[test]
    fn zero_iterations_is_accepted() {
        let per_iter = measure_allocations(0, || {});
        assert_eq!(per_iter.iterations, 0);
    }
}
