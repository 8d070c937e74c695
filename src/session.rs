//! Per-keyword sessions and run-level aggregation.
//!
//! One keyword is one session: search, expand the feed, traverse it. The
//! aggregator runs sessions sequentially against the single shared rendering
//! context and reduces every session-level fault to a `Failed` status; no
//! keyword ever stops its siblings.

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::fault::Fault;
use crate::feed;
use crate::locator::{FEED_PANEL, SEARCH_BOX};
use crate::output::RecordSink;
use crate::phone::PhoneNormalizer;
use crate::record::{Record, RunSummary, SessionOutcome};
use crate::surface::{ENTER_KEY, Surface};

pub struct Harvester<'a, S: Surface> {
    surface: &'a S,
    settings: Settings,
    phones: PhoneNormalizer,
    cancel: CancellationToken,
}

impl<'a, S: Surface> Harvester<'a, S> {
    pub fn new(surface: &'a S, settings: Settings, cancel: CancellationToken) -> Self {
        let phones = PhoneNormalizer::new(settings.default_region.as_deref());
        Self {
            surface,
            settings,
            phones,
            cancel,
        }
    }

    /// Search one keyword and traverse its results feed.
    ///
    /// A fault before the feed is even visible surfaces as `Err`; everything
    /// past that point degrades to partial (possibly empty) results.
    pub async fn run_session(&self, keyword: &str) -> Result<Vec<Record>, Fault> {
        self.search(keyword).await?;
        Ok(feed::traverse(self.surface, &self.phones, &self.settings, &self.cancel).await)
    }

    /// Run one session per keyword, hand each result batch to `sink`, and
    /// aggregate the outcomes. Always completes with a summary, even when
    /// every keyword failed.
    pub async fn run_batch(
        &self,
        keywords: &[String],
        sink: &mut impl RecordSink,
    ) -> RunSummary {
        info!("starting scraping for {} keywords", keywords.len());
        let mut summary = RunSummary::default();

        for (pos, keyword) in keywords.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("batch cancelled after {pos} keywords");
                break;
            }
            info!("processing keyword {}/{}: {keyword}", pos + 1, keywords.len());

            let outcome = match self.run_session(keyword).await {
                Ok(records) => {
                    if let Err(err) = sink.persist(keyword, &records) {
                        error!("failed to persist results for '{keyword}': {err}");
                    }
                    SessionOutcome::completed(keyword, records.len())
                }
                Err(fault) => {
                    error!(%fault, "failed to process '{keyword}'");
                    SessionOutcome::failed(keyword)
                }
            };
            info!("{keyword}: {} records ({})", outcome.records, outcome.status);
            summary.push(outcome);

            sleep(self.settings.action_delay()).await;
        }

        info!(
            keywords = summary.keywords_processed(),
            successes = summary.successes(),
            records = summary.total_records(),
            "batch finished"
        );
        summary
    }

    async fn search(&self, keyword: &str) -> Result<(), Fault> {
        info!("searching for: {keyword}");
        self.surface.navigate(&self.settings.maps_url).await?;
        sleep(self.settings.action_delay()).await;

        let input = self
            .surface
            .await_present(SEARCH_BOX, self.settings.element_timeout())
            .await?;
        let mut query = keyword.to_string();
        query.push(ENTER_KEY);
        self.surface.fill(&input, &query).await?;
        sleep(self.settings.action_delay()).await;

        self.surface
            .await_present(FEED_PANEL, self.settings.element_timeout())
            .await?;
        info!("search results loaded for: {keyword}");
        Ok(())
    }
}
