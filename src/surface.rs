use std::time::Duration;

use crate::fault::Fault;

/// WebDriver code for the Enter key, appended to the search query.
pub const ENTER_KEY: char = '\u{e007}';

/// How to find a piece of content within the rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Css(&'static str),
    XPath(&'static str),
}

impl Selector {
    pub fn value(&self) -> &'static str {
        match self {
            Selector::Css(value) | Selector::XPath(value) => value,
        }
    }
}

/// The rendering context as the pipeline sees it: one live page that can be
/// queried, scrolled and clicked.
///
/// Handles returned by `query`/`query_all` are invalidated whenever the page
/// re-renders; callers re-query instead of caching them. The production
/// implementation is [`crate::browser::Browser`]; the tests script a mock.
#[allow(async_fn_in_trait)]
pub trait Surface {
    type Handle;

    async fn navigate(&self, url: &str) -> Result<(), Fault>;

    /// Immediate lookup; `Fault::NotFound` when nothing matches right now.
    async fn query(&self, selector: Selector) -> Result<Self::Handle, Fault>;

    async fn query_all(&self, selector: Selector) -> Result<Vec<Self::Handle>, Fault>;

    /// Bounded wait for an element to show up; `Fault::Timeout` when the
    /// window elapses first.
    async fn await_present(
        &self,
        selector: Selector,
        timeout: Duration,
    ) -> Result<Self::Handle, Fault>;

    async fn text(&self, handle: &Self::Handle) -> Result<String, Fault>;

    async fn attribute(
        &self,
        handle: &Self::Handle,
        name: &str,
    ) -> Result<Option<String>, Fault>;

    /// Clear an input and type into it.
    async fn fill(&self, handle: &Self::Handle, text: &str) -> Result<(), Fault>;

    async fn click(&self, handle: Self::Handle) -> Result<(), Fault>;

    async fn scroll_into_view(&self, handle: &Self::Handle) -> Result<(), Fault>;

    /// Scroll height of a container, used to detect feed growth.
    async fn scroll_extent(&self, container: Selector) -> Result<u64, Fault>;

    async fn scroll_to_bottom(&self, container: Selector) -> Result<(), Fault>;

    async fn current_location(&self) -> Result<String, Fault>;
}
