pub mod config;
pub mod format;
pub mod memory;
#[cfg(feature = "perf-tracing")]
pub mod perf;
pub mod probe;
pub mod returns;
