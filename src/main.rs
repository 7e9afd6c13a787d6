use anyhow::{Context, Result};
use clap::Parser;
use schedtally::{
    aggregator, cli::Cli, cli::OutputFormat, config::RunSettings, csv_output::CsvSummaryOutput,
    json_output::JsonOutput, stats::AggregateSummary,
};
use std::io::Write;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Initialize the stderr tracing subscriber
///
/// `--debug` forces TRACE. Otherwise RUST_LOG is honored, falling back to
/// WARN so skipped records are always reported.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print the summary to stdout in the requested format
fn render(settings: &RunSettings, summary: &AggregateSummary) -> Result<()> {
    match settings.format {
        OutputFormat::Text => summary
            .print_summary(&settings.filter)
            .context("Failed to write summary")?,
        OutputFormat::Json => {
            let json = JsonOutput::from_summary(summary, &settings.filter)
                .to_json()
                .context("Failed to serialize JSON")?;
            println!("{}", json);
        }
        OutputFormat::Csv => {
            print!(
                "{}",
                CsvSummaryOutput::from_summary(summary, &settings.filter).to_csv()
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let settings = RunSettings::from_cli(&args).context("Invalid configuration")?;
    tracing::debug!(?settings, "Resolved run settings");

    let start = Instant::now();
    let summary =
        aggregator::aggregate_files(&settings.input, &settings.duplicates, &settings.aggregator)
            .with_context(|| format!("Failed to aggregate {}", settings.input.display()))?;

    render(&settings, &summary)?;

    if settings.extended {
        let stderr = std::io::stderr();
        let mut err = stderr.lock();
        summary
            .write_extended(&mut err)
            .context("Failed to write extended summary")?;
        writeln!(
            err,
            "ran in {:.3} ms",
            start.elapsed().as_secs_f64() * 1e3
        )?;
    }

    Ok(())
}
