//! scrapbook command-line front end.
//!
//! Scrapes a URL (or extracts a saved HTML file) into an entry draft and
//! prints it as JSON on stdout. Logs go to stderr.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scrapbook_client::{ExtractionResult, Scraper};
use scrapbook_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scrapbook")]
#[command(about = "Pre-fill bookmark entries from web pages")]
struct Args {
    /// Request timeout in milliseconds (overrides SCRAPBOOK_TIMEOUT_MS)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Retry attempts after a retryable failure (overrides SCRAPBOOK_RETRIES)
    #[arg(long, global = true)]
    retries: Option<u32>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a URL and extract an entry draft
    Scrape {
        /// Absolute http(s) URL of the page
        url: String,
    },
    /// Extract an entry draft from a saved HTML file
    Extract {
        /// HTML file to read
        #[arg(long)]
        html: PathBuf,

        /// URL the file was saved from, echoed into the result
        #[arg(long, default_value = "")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args).await {
        Ok(record) => {
            let json = if args.compact {
                serde_json::to_string(&record)
            } else {
                serde_json::to_string_pretty(&record)
            };
            match json {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("error: failed to serialize result: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            eprintln!("could not extract; enter details manually");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<ExtractionResult> {
    let config = load_config(args)?;
    tracing::debug!(
        command = ?args.command,
        timeout_ms = config.timeout_ms,
        max_bytes = config.max_bytes,
        retries = config.retries,
        "running command"
    );
    let scraper = Scraper::from_config(&config)?;

    let record = match &args.command {
        Command::Scrape { url } => scraper.extract(url).await?,
        Command::Extract { html, url } => {
            let bytes = fs::read(html).with_context(|| format!("failed to read {}", html.display()))?;
            let text = scrapbook_client::fetch::decode_body(&bytes, None);
            scraper.extract_html(&text, url)?
        }
    };

    Ok(record)
}

/// Layer command-line overrides on top of the loaded configuration.
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = AppConfig::load().context("failed to load configuration")?;

    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(retries) = args.retries {
        config.retries = retries;
    }

    config.validate().context("invalid command-line options")?;
    Ok(config)
}
