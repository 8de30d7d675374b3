use std::fmt::Write;

use crate::memory::MemorySnapshot;
use crate::probe::{TaskFootprint, TimerLeak};

const BYTES_PER_KB: f64 = 1000.0;

pub fn kilobytes(bytes: f64) -> f64 {
    bytes / BYTES_PER_KB
}

pub fn format_kb(kb: f64) -> String {
    format!("{kb:.3} kb")
}

pub fn task_footprint_line(footprint: &TaskFootprint) -> String {
    format!(
        "{} memory used per goroutine",
        format_kb(footprint.os_kb_per_task)
    )
}

pub fn allocated_line(snapshot: &MemorySnapshot) -> String {
    format!(
        "{} allocated",
        format_kb(kilobytes(snapshot.live_bytes as f64))
    )
}

pub fn timer_leak_report(leak: &TimerLeak) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Before:");
    let _ = writeln!(out, "{}", allocated_line(&leak.before));
    let _ = writeln!(out, "After:");
    let _ = writeln!(out, "{}", allocated_line(&leak.after));
    out
}
