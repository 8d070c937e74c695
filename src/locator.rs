//! Selector configuration and the fallback resolver.
//!
//! Google Maps markup shifts between record variants, so every logical field
//! carries an ordered chain of probes. New markup variants are handled by
//! extending these tables, not by touching extraction logic.

use tracing::debug;

use crate::fault::Fault;
use crate::surface::{Selector, Surface};

/// The virtualized results panel.
pub const FEED_PANEL: Selector = Selector::Css("div[role='feed']");

/// Anchor elements for individual listings inside the feed.
pub const FEED_ITEMS: Selector = Selector::Css("div[role='feed'] > div > div > a");

pub const SEARCH_BOX: Selector = Selector::Css("#searchboxinput");

/// Shown by the feed once everything has been loaded.
pub const END_MARKER: Selector =
    Selector::XPath("//span[contains(text(), \"You've reached the end of the list\")]");

/// How to pull a value out of a matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    Text,
    Attr(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub selector: Selector,
    pub extract: Extract,
}

/// Logical fields of a detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Description,
    Website,
    Phone,
}

impl Field {
    /// Ordered fallback chain for this field; first non-empty match wins.
    pub fn probes(self) -> &'static [Probe] {
        match self {
            Field::Name => &[
                Probe {
                    selector: Selector::Css("h1.DUwDvf.lfPIob"),
                    extract: Extract::Text,
                },
                Probe {
                    selector: Selector::Css("h1"),
                    extract: Extract::Text,
                },
            ],
            Field::Description => &[
                Probe {
                    selector: Selector::Css("button[jsaction*='pane.rating.category']"),
                    extract: Extract::Text,
                },
                Probe {
                    selector: Selector::XPath("//button[contains(@class, 'DkEaL')]"),
                    extract: Extract::Text,
                },
            ],
            Field::Website => &[
                Probe {
                    selector: Selector::Css("a[data-item-id='authority']"),
                    extract: Extract::Attr("href"),
                },
                Probe {
                    selector: Selector::XPath("//a[contains(@aria-label, 'Website')]"),
                    extract: Extract::Attr("href"),
                },
            ],
            Field::Phone => &[
                Probe {
                    selector: Selector::Css("button[data-item-id*='phone']"),
                    extract: Extract::Attr("aria-label"),
                },
                Probe {
                    selector: Selector::XPath("//button[contains(@aria-label, 'Phone')]"),
                    extract: Extract::Attr("aria-label"),
                },
            ],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Website => "website",
            Field::Phone => "phone",
        }
    }
}

/// Try each probe for `field` in order and return the first non-empty value.
///
/// `Ok(None)` means every strategy missed; callers leave the field at its
/// default. Faults other than a plain miss bubble up so the extractor can
/// decide whether the whole attempt should be retried.
pub async fn resolve<S: Surface>(surface: &S, field: Field) -> Result<Option<String>, Fault> {
    for probe in field.probes() {
        let handle = match surface.query(probe.selector).await {
            Ok(handle) => handle,
            Err(Fault::NotFound) => continue,
            Err(fault) => return Err(fault),
        };
        let value = match probe.extract {
            Extract::Text => surface.text(&handle).await?,
            Extract::Attr(name) => surface.attribute(&handle, name).await?.unwrap_or_default(),
        };
        let value = value.trim();
        if !value.is_empty() {
            return Ok(Some(value.to_string()));
        }
        debug!(
            field = field.label(),
            selector = probe.selector.value(),
            "matched element but value was empty"
        );
    }
    Ok(None)
}
