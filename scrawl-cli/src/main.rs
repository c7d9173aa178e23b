//! scrawl
//!
//! Lays out answers as handwriting and exports them to PDF.

use anyhow::Context;
use clap::Parser;
use scrawl_cli::{run, CliArgs, ExportJobConfig, RunOutcome};
use scrawl_export::format_file_size;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,scrawl_core=debug,scrawl_export=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    // RUST_LOG_FORMAT=json for machine-readable logs
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = ExportJobConfig::from(args);

    tracing::info!(
        answers = %config.answers_path.display(),
        output = %config.output_path.display(),
        style = %config.style,
        font = %config.font.family,
        "Starting scrawl"
    );

    match run(&config).await? {
        RunOutcome::DryRun(report) => {
            let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
            println!("{report}");
            tracing::debug!(report = %json, "Dry run");
        }
        RunOutcome::Exported { path, pages, bytes } => {
            println!(
                "Wrote {} ({} pages, {})",
                path.display(),
                pages,
                format_file_size(bytes as u64)
            );
        }
    }

    Ok(())
}
