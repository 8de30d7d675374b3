use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

pub(super) trait AllocatorStats {
    /// Returns cached memory to the OS and refreshes the statistics the
    /// allocator exposes. Blocks until done. `false` when the statistics
    /// could not be refreshed and still hold an earlier reading.
    fn settle() -> bool;
    /// Physical bytes held by the allocator, if it reports them.
    fn resident_bytes() -> Option<u64>;
}

#[cfg(not(target_env = "msvc"))]
mod jemalloc {
    use std::ffi::CStr;
    use std::ptr;

    use super::AllocatorStats;

    // `MALLCTL_ARENAS_ALL` addresses every arena at once.
    const CONTROLS: [&CStr; 2] = [c"thread.tcache.flush", c"arena.4096.purge"];

    pub struct Stats;

    impl AllocatorStats for Stats {
        fn settle() -> bool {
            for name in CONTROLS {
                // SAFETY: `name` is NUL-terminated and both controls take
                // neither an input nor an output value.
                let rc = unsafe {
                    tikv_jemalloc_sys::mallctl(
                        name.as_ptr(),
                        ptr::null_mut(),
                        ptr::null_mut(),
                        ptr::null_mut(),
                        0,
                    )
                };
                if rc != 0 {
                    #[cfg(feature = "perf-tracing")]
                    tracing::debug!(control = ?name, rc, "jemalloc control failed");
                }
            }
            match tikv_jemalloc_ctl::epoch::advance() {
                Ok(_) => true,
                Err(_e) => {
                    #[cfg(feature = "perf-tracing")]
                    tracing::debug!(error = %_e, "jemalloc epoch did not advance");
                    false
                }
            }
        }

        fn resident_bytes() -> Option<u64> {
            tikv_jemalloc_ctl::stats::resident::read()
                .ok()
                .map(|bytes| bytes as u64)
        }
    }
}

#[cfg(target_env = "msvc")]
mod system {
    use super::AllocatorStats;

    pub struct Stats;

    impl AllocatorStats for Stats {
        fn settle() -> bool {
            false
        }

        fn resident_bytes() -> Option<u64> {
            None
        }
    }
}

#[cfg(not(target_env = "msvc"))]
use jemalloc::Stats as Allocator;
#[cfg(target_env = "msvc")]
use system::Stats as Allocator;

/// Whether the allocator statistics are fresh after settling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum StatsState {
    Fresh,
    Stale,
}

pub(super) fn settle() -> StatsState {
    if Allocator::settle() {
        StatsState::Fresh
    } else {
        StatsState::Stale
    }
}

/// Bytes obtained from the OS: the allocator's own figure when it is fresh,
/// otherwise the resident set size of this process.
pub(super) fn os_bytes(state: StatsState) -> u64 {
    select_os_bytes(state, Allocator::resident_bytes, process_resident_bytes)
}

fn select_os_bytes(
    state: StatsState,
    allocator: impl FnOnce() -> Option<u64>,
    process_rss: impl FnOnce() -> u64,
) -> u64 {
    let resident = match state {
        StatsState::Fresh => allocator(),
        StatsState::Stale => None,
    };
    match resident {
        Some(bytes) if bytes > 0 => bytes,
        _ => {
            #[cfg(feature = "perf-tracing")]
            tracing::debug!(?state, "allocator stats unavailable, using process RSS");
            process_rss()
        }
    }
}

fn process_resident_bytes() -> u64 {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return 0;
    };
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing().with_memory(),
    );
    sys.process(pid).map(|p| p.memory()).unwrap_or(0)
}
