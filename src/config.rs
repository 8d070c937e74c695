use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Runtime settings. Defaults match careful interactive use; a config file
/// and `MAPHARVEST_*` environment variables override them, CLI flags win
/// last.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Seconds to wait between page actions.
    pub delay_secs: u64,
    /// Seconds asynchronous content gets to settle after a scroll or when a
    /// detail panel opens.
    pub settle_secs: u64,
    /// Seconds to wait for an expected element before giving up.
    pub element_timeout_secs: u64,
    /// Seconds to pause before retrying a stale or faulted step.
    pub retry_delay_secs: u64,
    /// Maximum businesses to extract per keyword.
    pub max_results: usize,
    /// Maximum times to scroll the results panel.
    pub max_scrolls: usize,
    /// Attempts per detail panel before its record is given up on.
    pub max_retries: usize,
    /// Fallback region for phone numbers without a country prefix.
    pub default_region: Option<String>,
    /// WebDriver endpoint to connect to.
    pub webdriver_url: String,
    /// Spawn a local geckodriver serving the endpoint above.
    pub spawn_geckodriver: bool,
    /// Directory for per-keyword CSVs and the summary report.
    pub output_dir: PathBuf,
    /// Search landing page.
    pub maps_url: String,
    /// Log file path.
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            headless: false,
            delay_secs: 3,
            settle_secs: 2,
            element_timeout_secs: 10,
            retry_delay_secs: 1,
            max_results: 50,
            max_scrolls: 10,
            max_retries: 2,
            default_region: Some("US".to_string()),
            webdriver_url: "http://localhost:4444".to_string(),
            spawn_geckodriver: true,
            output_dir: PathBuf::from("output"),
            maps_url: "https://www.google.com/maps".to_string(),
            log_file: PathBuf::from("scraper_log.txt"),
        }
    }
}

impl Settings {
    /// Defaults, then the optional config file, then the environment.
    pub fn load(path: Option<&Path>) -> color_eyre::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path.to_path_buf()));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("MAPHARVEST"))
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }

    pub fn action_delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Short pause after bringing a listing into view, before clicking it.
    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(500)
    }
}
