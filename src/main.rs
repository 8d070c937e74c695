use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::bail;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub mod browser;
pub mod config;
pub mod extract;
pub mod fault;
pub mod feed;
pub mod locator;
pub mod logging;
#[cfg(test)]
pub mod mock;
pub mod output;
pub mod phone;
pub mod record;
pub mod session;
pub mod surface;

use crate::browser::Browser;
use crate::config::Settings;
use crate::output::CsvSink;
use crate::session::Harvester;

/// Scrape structured business records from Google Maps search results.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Search keywords, e.g. "cafe near Bakersfield, CA".
    keywords: Vec<String>,
    /// CSV file with one keyword per row (first column).
    #[arg(long)]
    keywords_file: Option<PathBuf>,
    /// Config file merged over the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run the browser without a visible window.
    #[arg(long)]
    headless: bool,
    /// Seconds to wait between page actions.
    #[arg(long)]
    delay: Option<u64>,
    /// Maximum businesses to extract per keyword.
    #[arg(long)]
    max_results: Option<usize>,
    /// Maximum times to scroll the results panel.
    #[arg(long)]
    max_scrolls: Option<usize>,
    /// Directory for result CSVs.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Fallback phone region, e.g. US or ID.
    #[arg(long)]
    region: Option<String>,
    /// Connect to this WebDriver endpoint instead of spawning geckodriver.
    #[arg(long)]
    webdriver_url: Option<String>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.headless {
        settings.headless = true;
    }
    if let Some(delay) = cli.delay {
        settings.delay_secs = delay;
    }
    if let Some(max_results) = cli.max_results {
        settings.max_results = max_results;
    }
    if let Some(max_scrolls) = cli.max_scrolls {
        settings.max_scrolls = max_scrolls;
    }
    if let Some(output) = cli.output {
        settings.output_dir = output;
    }
    if let Some(region) = cli.region {
        settings.default_region = Some(region);
    }
    if let Some(url) = cli.webdriver_url {
        settings.webdriver_url = url;
        settings.spawn_geckodriver = false;
    }

    logging::init(&settings.log_file)?;
    info!("starting up");

    let mut keywords = cli.keywords;
    if let Some(file) = &cli.keywords_file {
        keywords.extend(output::load_keywords(file)?);
    }
    if keywords.is_empty() {
        bail!("no keywords given; pass them as arguments or via --keywords-file");
    }

    std::fs::create_dir_all(&settings.output_dir)?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, finishing current step and shutting down");
                cancel.cancel();
            }
        });
    }

    let browser = Browser::launch(&settings).await?;
    let mut sink = CsvSink::new(settings.output_dir.clone());
    let harvester = Harvester::new(&browser, settings.clone(), cancel);

    let summary = harvester.run_batch(&keywords, &mut sink).await;

    if let Err(err) = output::write_summary(&settings.output_dir, &summary) {
        error!("failed to write summary report: {err}");
    }
    info!("total keywords processed: {}", summary.keywords_processed());
    info!("successful: {}", summary.successes());
    info!("total records: {}", summary.total_records());

    browser.close().await?;
    info!("shutting down");
    Ok(())
}
