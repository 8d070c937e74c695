//! Feed pagination and indexed traversal.
//!
//! The results feed is virtualized: it grows as it is scrolled and
//! re-renders whenever a detail panel opens, invalidating every handle
//! obtained before. Traversal therefore walks a logical index and re-queries
//! the live feed on every single iteration.

use std::cmp::min;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::extract::{self, ExtractPolicy};
use crate::fault::Fault;
use crate::locator::{END_MARKER, FEED_ITEMS, FEED_PANEL};
use crate::phone::PhoneNormalizer;
use crate::record::Record;
use crate::surface::Surface;

/// Scroll the feed panel until it stops growing or the scroll budget runs
/// out. One stalled round is enough to stop: with no stronger signal there
/// is no way to tell a slow load from a truly exhausted feed, and
/// termination wins.
pub async fn expand<S: Surface>(surface: &S, settings: &Settings, cancel: &CancellationToken) {
    let mut previous = 0u64;
    for round in 0..settings.max_scrolls {
        if cancel.is_cancelled() {
            info!("pagination cancelled");
            return;
        }
        let extent = surface.scroll_extent(FEED_PANEL).await.unwrap_or(0);
        debug!(round, extent, "scrolling feed panel");
        if let Err(fault) = surface.scroll_to_bottom(FEED_PANEL).await {
            warn!(%fault, "scroll request failed, stopping pagination");
            return;
        }
        sleep(settings.settle()).await;
        let grown = match surface.scroll_extent(FEED_PANEL).await {
            Ok(extent) => extent,
            Err(fault) => {
                warn!(%fault, "could not read feed extent, stopping pagination");
                return;
            }
        };
        if grown == previous {
            match surface.query(END_MARKER).await {
                Ok(_) => info!("reached end of results"),
                Err(_) => warn!(
                    "no new content after scroll {}, stopping without an end marker",
                    round + 1
                ),
            }
            return;
        }
        previous = grown;
        info!("scroll {}/{} loaded more results", round + 1, settings.max_scrolls);
    }
}

enum Visit {
    Extracted(Record),
    Missing,
    OutOfRange,
}

/// Expand the feed, then open each listing in order and extract its record.
///
/// Partial results are always valid results: faults skip single listings,
/// stale handles retry the same index, and cancellation or an exhausted
/// attempt budget return whatever was collected so far.
pub async fn traverse<S: Surface>(
    surface: &S,
    phones: &PhoneNormalizer,
    settings: &Settings,
    cancel: &CancellationToken,
) -> Vec<Record> {
    expand(surface, settings, cancel).await;

    let total_available = surface
        .query_all(FEED_ITEMS)
        .await
        .map(|handles| handles.len())
        .unwrap_or(0);
    info!("found {total_available} listings");

    let target = min(settings.max_results, total_available);
    let attempt_budget = settings.max_results * 2;
    let mut records = Vec::new();
    let mut idx = 0;
    let mut attempts = 0;

    while idx < target && attempts < attempt_budget {
        if cancel.is_cancelled() {
            info!("traversal cancelled, returning partial results");
            break;
        }
        attempts += 1;
        match visit(surface, phones, settings, idx, target).await {
            Ok(Visit::Extracted(record)) => {
                records.push(record);
                idx += 1;
            }
            Ok(Visit::Missing) => {
                warn!("no data extracted for listing {}", idx + 1);
                idx += 1;
            }
            Ok(Visit::OutOfRange) => {
                warn!("no more listings available at index {idx}");
                break;
            }
            Err(Fault::Stale) => {
                // The feed re-rendered under us. Same index, fresh handles
                // on the next pass.
                warn!("stale element at index {idx}, retrying");
                sleep(settings.retry_delay()).await;
            }
            Err(fault) => {
                error!(%fault, "error processing listing {}, skipping", idx + 1);
                idx += 1;
            }
        }
    }

    info!("successfully extracted {} businesses", records.len());
    records
}

async fn visit<S: Surface>(
    surface: &S,
    phones: &PhoneNormalizer,
    settings: &Settings,
    idx: usize,
    target: usize,
) -> Result<Visit, Fault> {
    // Handles go stale across detail-panel excursions; never reuse one from
    // a previous iteration.
    let mut handles = surface.query_all(FEED_ITEMS).await?;
    if idx >= handles.len() {
        return Ok(Visit::OutOfRange);
    }
    info!("processing listing {}/{}", idx + 1, target);
    let handle = handles.swap_remove(idx);

    surface.scroll_into_view(&handle).await?;
    sleep(settings.scroll_pause()).await;
    surface.click(handle).await?;
    sleep(settings.action_delay()).await;

    let policy = ExtractPolicy {
        max_retries: settings.max_retries,
        settle: settings.settle(),
        retry_delay: settings.retry_delay(),
    };
    Ok(match extract::extract(surface, phones, policy).await {
        Some(record) => Visit::Extracted(record),
        None => Visit::Missing,
    })
}
