//! Scripted stand-in for the live rendering context.
//!
//! Tests describe a feed (extent growth, listing count, stale clicks, what
//! each detail panel shows) and the pipeline runs against it unchanged.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use crate::fault::Fault;
use crate::locator::{END_MARKER, FEED_ITEMS, FEED_PANEL, Field, SEARCH_BOX};
use crate::surface::{Selector, Surface};

#[derive(Debug, Clone)]
pub struct MockHandle {
    value: String,
    index: Option<usize>,
}

impl MockHandle {
    fn plain() -> Self {
        Self {
            value: String::new(),
            index: None,
        }
    }

    fn text(value: String) -> Self {
        Self {
            value,
            index: None,
        }
    }

    fn item(index: usize) -> Self {
        Self {
            value: String::new(),
            index: Some(index),
        }
    }
}

#[derive(Default)]
struct State {
    /// scroll_extent responses in call order; the last value repeats.
    extents: Vec<u64>,
    extent_cursor: usize,
    scrolls: usize,
    end_marker: bool,
    /// Anchors the feed exposes via query_all.
    listing_count: usize,
    /// index -> stale faults still to raise when that listing is clicked.
    stale_clicks: HashMap<usize, usize>,
    /// Listing currently showing its detail panel.
    open: Option<usize>,
    /// Scripted name per render wait; `None` entries mean the heading never
    /// shows. When empty, names derive from the open listing instead.
    name_script: Vec<Option<String>>,
    name_waits: usize,
    /// Secondary field values of the open detail panel.
    details: HashMap<Field, String>,
    /// Search-box waits left to fail with a timeout.
    search_failures: usize,
}

impl State {
    fn current_name(&self) -> Option<String> {
        if !self.name_script.is_empty() {
            let slot = self.name_waits.saturating_sub(1).min(self.name_script.len() - 1);
            return self.name_script[slot].clone();
        }
        self.open.map(|idx| format!("Business {}", idx + 1))
    }
}

#[derive(Default)]
pub struct MockSurface {
    state: RefCell<State>,
}

impl MockSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extents(self, extents: &[u64]) -> Self {
        self.state.borrow_mut().extents = extents.to_vec();
        self
    }

    pub fn with_end_marker(self) -> Self {
        self.state.borrow_mut().end_marker = true;
        self
    }

    pub fn with_listings(self, count: usize) -> Self {
        self.state.borrow_mut().listing_count = count;
        self
    }

    pub fn with_stale_click(self, index: usize, times: usize) -> Self {
        self.state.borrow_mut().stale_clicks.insert(index, times);
        self
    }

    pub fn with_name_script(self, script: &[Option<&str>]) -> Self {
        self.state.borrow_mut().name_script =
            script.iter().map(|s| s.map(str::to_string)).collect();
        self
    }

    pub fn with_detail(self, field: Field, value: &str) -> Self {
        self.state.borrow_mut().details.insert(field, value.to_string());
        self
    }

    pub fn with_unreachable_search(self, failures: usize) -> Self {
        self.state.borrow_mut().search_failures = failures;
        self
    }

    pub fn scrolls(&self) -> usize {
        self.state.borrow().scrolls
    }

    pub fn name_waits(&self) -> usize {
        self.state.borrow().name_waits
    }
}

fn is_probe(field: Field, selector: Selector) -> bool {
    field.probes().iter().any(|probe| probe.selector == selector)
}

impl Surface for MockSurface {
    type Handle = MockHandle;

    async fn navigate(&self, _url: &str) -> Result<(), Fault> {
        Ok(())
    }

    async fn query(&self, selector: Selector) -> Result<MockHandle, Fault> {
        let state = self.state.borrow();
        if selector == SEARCH_BOX || selector == FEED_PANEL {
            return Ok(MockHandle::plain());
        }
        if selector == END_MARKER {
            return if state.end_marker {
                Ok(MockHandle::plain())
            } else {
                Err(Fault::NotFound)
            };
        }
        if is_probe(Field::Name, selector) {
            return state
                .current_name()
                .map(MockHandle::text)
                .ok_or(Fault::NotFound);
        }
        for field in [Field::Description, Field::Website, Field::Phone] {
            if is_probe(field, selector) {
                return state
                    .details
                    .get(&field)
                    .cloned()
                    .map(MockHandle::text)
                    .ok_or(Fault::NotFound);
            }
        }
        Err(Fault::NotFound)
    }

    async fn query_all(&self, selector: Selector) -> Result<Vec<MockHandle>, Fault> {
        if selector == FEED_ITEMS {
            let count = self.state.borrow().listing_count;
            return Ok((0..count).map(MockHandle::item).collect());
        }
        Ok(Vec::new())
    }

    async fn await_present(
        &self,
        selector: Selector,
        _timeout: Duration,
    ) -> Result<MockHandle, Fault> {
        if selector == SEARCH_BOX {
            let mut state = self.state.borrow_mut();
            if state.search_failures > 0 {
                state.search_failures -= 1;
                return Err(Fault::Timeout);
            }
        }
        if is_probe(Field::Name, selector) {
            self.state.borrow_mut().name_waits += 1;
        }
        self.query(selector).await
    }

    async fn text(&self, handle: &MockHandle) -> Result<String, Fault> {
        Ok(handle.value.clone())
    }

    async fn attribute(&self, handle: &MockHandle, _name: &str) -> Result<Option<String>, Fault> {
        Ok(Some(handle.value.clone()))
    }

    async fn fill(&self, _handle: &MockHandle, _text: &str) -> Result<(), Fault> {
        Ok(())
    }

    async fn click(&self, handle: MockHandle) -> Result<(), Fault> {
        let Some(index) = handle.index else {
            return Ok(());
        };
        let mut state = self.state.borrow_mut();
        if let Some(remaining) = state.stale_clicks.get_mut(&index) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Fault::Stale);
            }
        }
        state.open = Some(index);
        Ok(())
    }

    async fn scroll_into_view(&self, _handle: &MockHandle) -> Result<(), Fault> {
        Ok(())
    }

    async fn scroll_extent(&self, _container: Selector) -> Result<u64, Fault> {
        let mut state = self.state.borrow_mut();
        if state.extents.is_empty() {
            return Ok(0);
        }
        let slot = state.extent_cursor.min(state.extents.len() - 1);
        state.extent_cursor += 1;
        Ok(state.extents[slot])
    }

    async fn scroll_to_bottom(&self, _container: Selector) -> Result<(), Fault> {
        self.state.borrow_mut().scrolls += 1;
        Ok(())
    }

    async fn current_location(&self) -> Result<String, Fault> {
        let url = match self.state.borrow().open {
            Some(index) => format!("https://maps.example/place/{}", index + 1),
            None => "https://maps.example/search".to_string(),
        };
        Ok(url)
    }
}
