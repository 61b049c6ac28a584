//! # cellfeed-cli
//!
//! Command-line interface for fetching a worksheet by title.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cellfeed_core::{FeedConfig, Grid, WorksheetFetcher};
use cellfeed_http::{obtain_session, HttpFeedService};
use clap::Parser;
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// cellfeed - read a worksheet from a spreadsheet feed
#[derive(Parser, Debug)]
#[command(name = "cellfeed")]
#[command(author, version, about = "Fetch a worksheet as a grid of text", long_about = None)]
struct Cli {
    /// Service-account key file (JSON)
    #[arg(short = 'k', long = "credentials", value_name = "FILE")]
    credentials: PathBuf,

    /// Title of the spreadsheet
    #[arg(short = 's', long = "spreadsheet", value_name = "TITLE")]
    spreadsheet: String,

    /// Title of the worksheet within the spreadsheet
    #[arg(short = 'w', long = "worksheet", value_name = "TITLE")]
    worksheet: String,

    /// YAML config overriding endpoints and timeouts
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format (json, csv, table)
    #[arg(short = 'f', long = "format", default_value = "table")]
    format: OutputFormat,

    /// Sort cells by row and column before building rows
    #[arg(long = "sort-cells")]
    sort_cells: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// JSON array of rows
    Json,
    /// CSV output
    Csv,
    /// Aligned table output (default)
    #[default]
    Table,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    if let Err(e) = run(cli).await {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    let credentials = File::open(&cli.credentials)
        .with_context(|| format!("Failed to open credentials: {}", cli.credentials.display()))?;
    let session = obtain_session(credentials, &config.scope)
        .with_context(|| format!("Failed to load credentials: {}", cli.credentials.display()))?;
    debug!(client_email = session.client_email(), "obtained session");

    let service = HttpFeedService::new(&config)?;
    let fetcher = WorksheetFetcher::new(service, config);

    let grid = fetcher
        .fetch_worksheet(&session, &cli.spreadsheet, &cli.worksheet)
        .await
        .with_context(|| {
            format!(
                "Failed to fetch worksheet '{}' of spreadsheet '{}'",
                cli.worksheet, cli.spreadsheet
            )
        })?;

    let stdout = std::io::stdout();
    print_grid(&grid, cli.format, &mut stdout.lock())
}

/// Build the effective config from the optional file and command-line flags.
fn load_config(cli: &Cli) -> Result<FeedConfig> {
    let config = match &cli.config {
        Some(path) => FeedConfig::from_path(path)?,
        None => FeedConfig::default(),
    };
    let config = if cli.sort_cells {
        config.with_sort_cells(true)
    } else {
        config
    };
    debug!(
        spreadsheets_url = %config.spreadsheets_url,
        sort_cells = config.sort_cells,
        "loaded config"
    );
    Ok(config)
}

/// Print a grid in the specified format.
fn print_grid(grid: &Grid, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(grid)?)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);
            for row in grid {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            if grid.is_empty() {
                writeln!(out, "(empty worksheet)")?;
            } else {
                write!(out, "{}", format_table(grid))?;
            }
        }
    }
    Ok(())
}

/// Left-align every column to its widest value.
fn format_table(grid: &Grid) -> String {
    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in grid {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(value.chars().count());
        }
    }

    let mut table = String::new();
    for row in grid {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(value, &width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        table.push_str(line.trim_end());
        table.push('\n');
    }
    table
}
