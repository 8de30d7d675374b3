use serde::Serialize;

/// Byte counts captured by one call to [`sample`](super::sample).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MemorySnapshot {
    /// Physical bytes the allocator currently holds from the OS.
    pub os_bytes: u64,
    /// Bytes allocated by the program and not yet freed.
    pub live_bytes: u64,
}

impl MemorySnapshot {
    pub fn os_delta(&self, earlier: &MemorySnapshot) -> i64 {
        signed_delta(earlier.os_bytes, self.os_bytes)
    }

    pub fn live_delta(&self, earlier: &MemorySnapshot) -> i64 {
        signed_delta(earlier.live_bytes, self.live_bytes)
    }
}

fn signed_delta(before: u64, after: u64) -> i64 {
    if after >= before {
        i64::try_from(after - before).unwrap_or(i64::MAX)
    } else {
        i64::try_from(before - after).map_or(i64::MIN, |d| -d)
    }
}
