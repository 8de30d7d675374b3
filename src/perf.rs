use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use tracing_subscriber::fmt::format::FmtSpan;

/// Installs a JSON-lines subscriber at `DEBUG`. Spans are logged when they
/// close, with their busy/idle time. Output goes to `output_path` when given,
/// to stderr otherwise; stdout stays reserved for the probe report.
pub fn init_tracing_json(output_path: Option<&Path>) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_max_level(tracing::Level::DEBUG);

    let result = match output_path {
        Some(path) => {
            ensure_parent_dir(path)?;
            let file = File::create(path)?;
            let subscriber = builder.with_writer(Mutex::new(file)).finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };

    result.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
