use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use memprobe::config::load_config_for;
use memprobe::format::timer_leak_report;
use memprobe::probe::measure_timer_leak;

#[derive(Parser)]
#[command(
    name = "timer-leak",
    about = "Live memory before and after scheduling timers whose receivers are dropped"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of timers to schedule (default 100000)
    #[arg(long)]
    count: Option<usize>,

    /// Delay of every timer in seconds (default 3600)
    #[arg(long)]
    delay_secs: Option<u64>,

    /// Print the measurement as a JSON object
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Perf tracing output file (JSON lines). Defaults to stderr.
    #[cfg(feature = "perf-tracing")]
    #[arg(long)]
    trace_output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    #[cfg(feature = "perf-tracing")]
    memprobe::perf::init_tracing_json(cli.trace_output.as_deref())?;

    let config = load_config_for(cli.config.as_deref());
    let count = cli.count.unwrap_or(config.timers.count);
    let delay = cli
        .delay_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.timers.delay());

    let leak = measure_timer_leak(count, delay).await;

    if cli.json {
        println!("{}", serde_json::to_string(&leak)?);
    } else {
        print!("{}", timer_leak_report(&leak));
    }
    Ok(())
}
