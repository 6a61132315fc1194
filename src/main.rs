use anyhow::{Context, Result};
use chrono::Duration;
use clap::Parser;
use slotdist::analyzer::{analyze_log, AnalyzerConfig, VenueAnalysis};
use slotdist::cli::{Cli, OutputFormat};
use slotdist::csv_output::CsvOutput;
use slotdist::html_output::HtmlReport;
use slotdist::ingest::{load_log, IngestOptions};
use slotdist::json_output::JsonReport;
use slotdist::markdown_output::MarkdownReport;
use slotdist::venues::VenueCatalog;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Write one HTML page per venue into the output directory
fn write_html_reports(
    analyses: &[VenueAnalysis],
    catalog: &VenueCatalog,
    output: &Path,
    top: usize,
) -> Result<()> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create output directory {}", output.display()))?;
    let renderer = HtmlReport::new(top);
    for analysis in analyses {
        let path = output.join(HtmlReport::file_name(analysis, catalog));
        std::fs::write(&path, renderer.render(analysis, catalog))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Validate the date range before doing any work
    if let (Some(start), Some(end)) = (args.start, args.end) {
        if start > end {
            anyhow::bail!("start date {} is after end date {}", start, end);
        }
    }

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let catalog = match &args.venues {
        Some(path) => VenueCatalog::load(path)?,
        None => VenueCatalog::default(),
    };

    let options = IngestOptions {
        start: args.start,
        end: args.end,
        utc_offset_hours: args.utc_offset,
    };
    let log = load_log(&args.input, &options, &catalog)?;
    if log.is_empty() {
        eprintln!(
            "no release events found in {} for the selected venues and dates",
            args.input.display()
        );
        return Ok(());
    }

    let config = AnalyzerConfig {
        min_interval: Duration::minutes(args.interval),
        policy: args.policy,
        open: args.open,
        close: args.close,
        bucket_width: Duration::minutes(args.bucket_width),
        zoom_width: args.zoom.then(|| Duration::minutes(args.zoom_width)),
    };
    let analyses = analyze_log(&log, &config)?;

    match args.format {
        OutputFormat::Text => {
            for analysis in &analyses {
                println!("{}", analysis.render_text(&catalog, args.top));
            }
        }
        OutputFormat::Json => {
            let report = JsonReport::build(&analyses, &catalog, config.min_interval, config.policy);
            println!("{}", report.render()?);
        }
        OutputFormat::Csv => {
            print!("{}", CsvOutput::from_analyses(&analyses, &catalog).render());
        }
        OutputFormat::Markdown => {
            let report = MarkdownReport::new(args.top);
            print!(
                "{}",
                report.render(&analyses, &catalog, config.min_interval, config.policy)
            );
        }
        OutputFormat::Html => {
            write_html_reports(&analyses, &catalog, &args.output, args.top)?;
        }
    }

    Ok(())
}
