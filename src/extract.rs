//! Detail-panel extraction with bounded retries.
//!
//! A freshly opened panel populates asynchronously, so each attempt gives the
//! name heading a bounded settle window before reading anything. An empty
//! name is the one condition that retries the whole attempt; missing
//! secondary fields just stay empty. Nothing in here raises past the caller:
//! every failure path resolves to `None`.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::fault::Fault;
use crate::locator::{self, Field};
use crate::phone::PhoneNormalizer;
use crate::record::Record;
use crate::surface::Surface;

/// Knobs for one detail-panel extraction.
#[derive(Debug, Clone, Copy)]
pub struct ExtractPolicy {
    pub max_retries: usize,
    /// Maximum time the panel gets to render its heading per attempt.
    pub settle: Duration,
    /// Pause before retrying after an unexpected fault.
    pub retry_delay: Duration,
}

/// Extract a [`Record`] from the currently open detail panel.
pub async fn extract<S: Surface>(
    surface: &S,
    phones: &PhoneNormalizer,
    policy: ExtractPolicy,
) -> Option<Record> {
    for attempt in 0..policy.max_retries {
        let final_attempt = attempt + 1 == policy.max_retries;
        match attempt_once(surface, phones, policy.settle).await {
            Ok(Some(record)) => {
                info!(name = %record.name, "extracted record");
                return Some(record);
            }
            Ok(None) => {
                if final_attempt {
                    warn!(
                        "no business name after {} attempts, skipping record",
                        policy.max_retries
                    );
                    return None;
                }
                debug!(attempt, "business name not populated yet, retrying");
            }
            Err(fault) => {
                if final_attempt {
                    warn!(%fault, "detail extraction failed on final attempt");
                    return None;
                }
                warn!(%fault, attempt, "detail extraction fault, retrying");
                sleep(policy.retry_delay).await;
            }
        }
    }
    None
}

async fn attempt_once<S: Surface>(
    surface: &S,
    phones: &PhoneNormalizer,
    settle: Duration,
) -> Result<Option<Record>, Fault> {
    // WaitRender: the heading is the readiness signal for the whole panel.
    // A miss here is not conclusive; the fallback probes still get their say.
    let heading = Field::Name.probes()[0].selector;
    match surface.await_present(heading, settle).await {
        Ok(_) | Err(Fault::Timeout) | Err(Fault::NotFound) => {}
        Err(fault) => return Err(fault),
    }

    // ReadName: the one mandatory field.
    let Some(name) = locator::resolve(surface, Field::Name).await? else {
        return Ok(None);
    };

    // ReadSecondaryFields: independent, absence tolerated.
    let description = secondary(surface, Field::Description).await;
    let website = secondary(surface, Field::Website).await;
    let phone = phones.normalize(&secondary(surface, Field::Phone).await);

    // Finalize: the panel URL identifies the record even when fields are thin.
    let source_link = surface.current_location().await.unwrap_or_default();

    Ok(Some(Record {
        name,
        description,
        website,
        phone,
        source_link,
    }))
}

async fn secondary<S: Surface>(surface: &S, field: Field) -> String {
    locator::resolve(surface, field)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}
