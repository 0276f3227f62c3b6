//! Batch heatmapper binary.

use std::io::Write;

use anyhow::{Context, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use batch_heatmapper::args::{renderer_help, usage};
use batch_heatmapper::{run_batch, Args, BatchConfig};

fn main() -> Result<()> {
    let args = Args::parse_argv();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    if args.renderer_help {
        // Own help first so it is shown even when the renderer's is not
        print!("{}\n\n", usage());
        std::io::stdout().flush()?;
        let help = renderer_help(&args).context("Failed to get renderer help")?;
        print!("{}", help);
        return Ok(());
    }

    let config = BatchConfig::from_args(&args).context("Invalid arguments")?;
    let renderer = config.renderer.build();
    let report = run_batch(&config, renderer.as_ref()).context("Batch failed")?;

    for job in &report.jobs {
        info!(
            matrix = %job.matrix.display(),
            output = %job.output.display(),
            "Wrote heatmap"
        );
    }
    Ok(())
}
