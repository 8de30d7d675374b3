use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use memprobe::config::load_config_for;
use memprobe::format::task_footprint_line;
use memprobe::probe::measure_task_footprint;

#[derive(Parser)]
#[command(
    name = "task-footprint",
    about = "Average memory held by one parked tokio task"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of tasks to spawn (default 10000)
    #[arg(long)]
    count: Option<usize>,

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
    let count = cli.count.unwrap_or(config.tasks.count);

    let footprint = measure_task_footprint(count).await?;

    if cli.json {
        println!("{}", serde_json::to_string(&footprint)?);
    } else {
        println!("{}", task_footprint_line(&footprint));
    }
    Ok(())
}
